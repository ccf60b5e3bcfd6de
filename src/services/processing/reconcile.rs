//! Replace-by-key merge of freshly extracted records into loaded history.
//!
//! Both functions work on an in-memory copy of a store. Nothing reaches disk
//! until the caller commits the reconciled tables.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::reports::models::{MetricsRecord, WellRecord};
use crate::storage::table::HistoryTable;

/// How a re-upload for an existing date treats that date's well rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WellReplacePolicy {
    /// Replace only the wells present in the new upload. Wells missing from it
    /// keep their rows from the earlier upload.
    #[default]
    Partial,
    /// Drop every well row of the date before inserting the new set
    Full,
}

impl FromStr for WellReplacePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "partial" => Ok(Self::Partial),
            "full" => Ok(Self::Full),
            other => Err(format!(
                "unknown well replace policy '{other}', expected 'partial' or 'full'"
            )),
        }
    }
}

impl fmt::Display for WellReplacePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Partial => f.write_str("partial"),
            Self::Full => f.write_str("full"),
        }
    }
}

/// Drop any record for the incoming date, then append the incoming record.
/// Returns how many records were replaced.
pub fn reconcile_metrics(table: &mut HistoryTable<MetricsRecord>, record: MetricsRecord) -> usize {
    let removed = match record.date.as_date() {
        Some(date) => table.remove_where(|key| key.is(date)),
        None => 0,
    };
    table.append([record]);
    removed
}

/// Keep one record per well number: the last one in block order.
pub fn latest_per_well(records: Vec<WellRecord>) -> Vec<WellRecord> {
    let last_index: HashMap<&str, usize> = records
        .iter()
        .enumerate()
        .map(|(index, record)| (record.well_no.as_str(), index))
        .collect();
    let keep: HashSet<usize> = last_index.into_values().collect();
    if keep.len() == records.len() {
        return records;
    }

    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            if keep.contains(&index) {
                Some(record)
            } else {
                tracing::warn!(
                    "Well '{}' is listed more than once for {}; keeping its last row",
                    record.well_no,
                    record.date
                );
                None
            }
        })
        .collect()
}

/// Drop existing rows for `date` according to `policy`, then append
/// `records`, one per well number. Returns how many rows were replaced.
pub fn reconcile_wells(
    table: &mut HistoryTable<WellRecord>,
    records: Vec<WellRecord>,
    date: NaiveDate,
    policy: WellReplacePolicy,
) -> usize {
    let records = latest_per_well(records);
    let removed = match policy {
        WellReplacePolicy::Partial => {
            let incoming: HashSet<&str> = records.iter().map(|w| w.well_no.as_str()).collect();
            table.remove_where(|(row_date, well_no)| {
                row_date.is(date) && incoming.contains(well_no.as_str())
            })
        }
        WellReplacePolicy::Full => table.remove_where(|(row_date, _)| row_date.is(date)),
    };
    table.append(records);
    removed
}
