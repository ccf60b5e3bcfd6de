use std::fs;
use std::path::{Path, PathBuf};

use super::csv_file::CsvFile;
use super::table::HistoryTable;
use crate::common::errors::{ReportError, ReportResult};
use crate::reports::models::{
    METRICS_COLUMNS, MetricsRecord, ResetConfirmation, ResetOutcome, WELL_COLUMNS, WellRecord,
};

pub const METRICS_FILE: &str = "summary_data.csv";
pub const WELLS_FILE: &str = "well_data.csv";

/// The metrics and well histories of one data directory.
///
/// Opened once at startup and shared behind a single lock, so one ingestion
/// cycle's load, reconcile and save never interleaves with another's.
#[derive(Debug, Clone)]
pub struct HistoryStores {
    data_dir: PathBuf,
    metrics: CsvFile<MetricsRecord>,
    wells: CsvFile<WellRecord>,
}

impl HistoryStores {
    pub fn open(data_dir: impl Into<PathBuf>) -> ReportResult<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|e| {
            ReportError::persistence(format!("create data directory {}", data_dir.display()), e)
        })?;

        tracing::info!("History stores opened in {}", data_dir.display());

        Ok(Self {
            metrics: CsvFile::new("metrics history", data_dir.join(METRICS_FILE), &METRICS_COLUMNS),
            wells: CsvFile::new("well history", data_dir.join(WELLS_FILE), &WELL_COLUMNS),
            data_dir,
        })
    }

    #[cfg(test)]
    fn with_files(
        data_dir: PathBuf,
        metrics: CsvFile<MetricsRecord>,
        wells: CsvFile<WellRecord>,
    ) -> Self {
        Self {
            data_dir,
            metrics,
            wells,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn metrics(&self) -> &CsvFile<MetricsRecord> {
        &self.metrics
    }

    pub fn wells(&self) -> &CsvFile<WellRecord> {
        &self.wells
    }

    /// Persist both reconciled tables.
    ///
    /// Both tables are fully written to temp files before either replaces its
    /// store, so a write failure leaves both stores untouched. Only a failed
    /// rename of the well table, after the metrics rename, leaves the stores
    /// out of step; the error says so.
    pub fn commit(
        &self,
        metrics: &HistoryTable<MetricsRecord>,
        wells: &HistoryTable<WellRecord>,
    ) -> ReportResult<()> {
        let staged_metrics = self.metrics.stage(metrics)?;
        let staged_wells = self.wells.stage(wells)?;

        staged_metrics.commit()?;
        staged_wells.commit().map_err(|e| {
            tracing::error!(
                "Metrics history in {} was saved but well history was not",
                self.data_dir.display()
            );
            match e {
                ReportError::Persistence { operation, message } => ReportError::Persistence {
                    operation,
                    message: format!(
                        "{message}; metrics history was already saved, so the two histories now differ for this report"
                    ),
                },
                other => other,
            }
        })
    }

    /// Delete both stores. Both deletions are attempted; any failure is
    /// reported after the fact.
    pub fn reset(&self, confirmation: &ResetConfirmation) -> ReportResult<ResetOutcome> {
        confirmation.validate()?;

        let metrics_result = self.metrics.remove();
        let wells_result = self.wells.remove();

        match (metrics_result, wells_result) {
            (Ok(()), Ok(())) => {
                tracing::warn!("All history in {} was reset", self.data_dir.display());
                Ok(ResetOutcome {
                    metrics_cleared: true,
                    wells_cleared: true,
                })
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Err(metrics_err), Err(wells_err)) => Err(ReportError::Persistence {
                operation: "clear history".to_string(),
                message: format!("{metrics_err}; {wells_err}"),
            }),
        }
    }
}
