use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::reports::models::{MetricColumn, MetricsRecord};

/// One date of a metrics trend. Columns whose value is blank or not a
/// number on that date are absent from `values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub values: BTreeMap<String, f64>,
}

/// Project metrics history onto the selected columns, ascending by date.
///
/// Rows without a parseable date are skipped. Should history ever hold two
/// rows for one date, the later row wins.
pub fn project(rows: &[MetricsRecord], columns: &[MetricColumn]) -> Vec<TrendPoint> {
    if columns.is_empty() {
        return Vec::new();
    }

    let mut by_date: BTreeMap<NaiveDate, &MetricsRecord> = BTreeMap::new();
    for record in rows {
        if let Some(date) = record.date.as_date() {
            by_date.insert(date, record);
        }
    }

    by_date
        .into_iter()
        .map(|(date, record)| TrendPoint {
            date,
            values: columns
                .iter()
                .filter_map(|column| {
                    column
                        .value(record)
                        .as_f64()
                        .map(|value| (column.name().to_string(), value))
                })
                .collect(),
        })
        .collect()
}
