//! Ingestion cycle for daily operation reports
//!
//! One upload runs date validation, extraction, reconciliation and
//! persistence in that order. Every step before the commit works on
//! in-memory copies, so a cycle that fails at any point writes nothing.

use chrono::{NaiveDate, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::models::{
    MetricColumn, MetricsHistory, MetricsRecord, ResetConfirmation, ResetOutcome, UploadSummary,
    WellHistory, WellRecord,
};
use crate::common::errors::{ReportError, ReportResult};
use crate::services::processing::{
    date::extract_date,
    extraction::{extract_metrics, extract_wells},
    grid::load_sheet,
    layout::{SHEET_NAME, validate_layout},
    reconcile::{WellReplacePolicy, reconcile_metrics, reconcile_wells},
};
use crate::services::trend::{TrendPoint, project};
use crate::storage::history::HistoryStores;

/// Everything a report yields before it touches history
#[derive(Debug, Clone)]
pub struct ExtractedReport {
    pub date: NaiveDate,
    pub metrics: MetricsRecord,
    pub wells: Vec<WellRecord>,
}

/// Parse and validate one DOR workbook. Pure: no store is read or written.
pub fn extract_report(file_data: Vec<u8>) -> ReportResult<ExtractedReport> {
    let grid = load_sheet(file_data, SHEET_NAME)?;
    validate_layout(&grid)?;

    let date = extract_date(&grid)?;
    let metrics = extract_metrics(&grid, date);
    let wells = extract_wells(&grid, date);

    Ok(ExtractedReport {
        date,
        metrics,
        wells,
    })
}

fn check_extension(file_name: &str) -> ReportResult<()> {
    let is_excel = Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xls"));

    if is_excel {
        Ok(())
    } else {
        Err(ReportError::InvalidUpload {
            message: format!("'{file_name}' must be an Excel file (.xlsx or .xls)"),
        })
    }
}

/// Service for report ingestion and history queries
#[derive(Clone)]
pub struct ReportService {
    stores: Arc<Mutex<HistoryStores>>,
    data_dir: PathBuf,
    upload_dir: PathBuf,
    well_policy: WellReplacePolicy,
}

impl ReportService {
    pub fn new(stores: HistoryStores, upload_dir: PathBuf, well_policy: WellReplacePolicy) -> Self {
        Self {
            data_dir: stores.data_dir().to_path_buf(),
            stores: Arc::new(Mutex::new(stores)),
            upload_dir,
            well_policy,
        }
    }

    fn lock(&self) -> ReportResult<MutexGuard<'_, HistoryStores>> {
        self.stores
            .lock()
            .map_err(|e| ReportError::persistence("lock history stores", e))
    }

    /// Checked without the store lock, so a running ingestion never stalls it
    pub fn is_reachable(&self) -> bool {
        self.data_dir.is_dir()
    }

    /// Run one ingestion cycle for an uploaded report
    pub fn ingest(&self, file_name: &str, file_data: Vec<u8>) -> ReportResult<UploadSummary> {
        let started_at = Utc::now();
        let start_time = std::time::Instant::now();

        check_extension(file_name)?;
        let archive_copy = file_data.clone();
        let report = extract_report(file_data)?;

        let (metrics_replaced, wells_replaced, metrics_history_len, well_history_len) = {
            let stores = self.lock()?;
            let mut metrics_table = stores.metrics().load()?;
            let mut wells_table = stores.wells().load()?;
            if metrics_table.is_empty() {
                tracing::info!("Starting a new history in {}", stores.data_dir().display());
            }

            let metrics_replaced = reconcile_metrics(&mut metrics_table, report.metrics.clone());
            let wells_replaced = reconcile_wells(
                &mut wells_table,
                report.wells.clone(),
                report.date,
                self.well_policy,
            );

            stores.commit(&metrics_table, &wells_table)?;
            (
                metrics_replaced,
                wells_replaced,
                metrics_table.len(),
                wells_table.len(),
            )
        };

        self.archive_upload(report.date, file_name, &archive_copy);

        tracing::info!(
            "Ingested '{file_name}' for {}: {} wells ({} replaced), metrics {}",
            report.date,
            report.wells.len(),
            wells_replaced,
            if metrics_replaced > 0 { "replaced" } else { "added" }
        );

        Ok(UploadSummary {
            file_name: file_name.to_string(),
            report_date: report.date,
            metrics: report.metrics,
            wells: report.wells,
            metrics_replaced,
            wells_replaced,
            metrics_history_len,
            well_history_len,
            processing_time_ms: start_time.elapsed().as_millis(),
            started_at,
            completed_at: Utc::now(),
        })
    }

    /// Keep a copy of a committed upload. Never fails the cycle.
    fn archive_upload(&self, date: NaiveDate, file_name: &str, file_data: &[u8]) {
        let base_name = Path::new(file_name)
            .file_name()
            .map_or_else(|| "report.xlsx".into(), |name| name.to_string_lossy());
        let target = self
            .upload_dir
            .join(format!("{}_{base_name}", date.format("%Y-%m-%d")));

        let result = fs::create_dir_all(&self.upload_dir).and_then(|()| fs::write(&target, file_data));
        if let Err(e) = result {
            tracing::warn!("Could not archive upload to {}: {e}", target.display());
        }
    }

    pub fn metrics_history(&self) -> ReportResult<MetricsHistory> {
        let stores = self.lock()?;
        let mut rows = stores.metrics().load()?.into_rows();
        rows.sort_by(|a, b| a.date.cmp(&b.date));

        Ok(MetricsHistory {
            columns: stores.metrics().columns().iter().map(ToString::to_string).collect(),
            rows,
        })
    }

    pub fn well_history(&self, date: Option<NaiveDate>) -> ReportResult<WellHistory> {
        let stores = self.lock()?;
        let mut rows = stores.wells().load()?.into_rows();
        if let Some(date) = date {
            rows.retain(|row| row.date.is(date));
        }
        // Stable: wells of one date keep their sheet order
        rows.sort_by(|a, b| a.date.cmp(&b.date));

        Ok(WellHistory {
            columns: stores.wells().columns().iter().map(ToString::to_string).collect(),
            rows,
        })
    }

    pub fn trend(&self, columns: &[MetricColumn]) -> ReportResult<Vec<TrendPoint>> {
        let rows = self.lock()?.metrics().load()?.into_rows();
        Ok(project(&rows, columns))
    }

    pub fn reset(&self, confirmation: &ResetConfirmation) -> ReportResult<ResetOutcome> {
        self.lock()?.reset(confirmation)
    }
}
