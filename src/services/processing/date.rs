use calamine::Data;
use chrono::{Days, NaiveDate, NaiveDateTime};

use super::grid::Grid;
use super::layout::DATE_CELL;
use crate::common::errors::{ReportError, ReportResult};

/// Textual form of the report date, e.g. "31 January 2026"
pub const REPORT_DATE_FORMAT: &str = "%d %B %Y";

/// Read and validate the report's "as of" date.
///
/// This runs before anything else is extracted: a report without a valid
/// date produces no records at all.
pub fn extract_date(grid: &Grid) -> ReportResult<NaiveDate> {
    parse_report_date(grid.read(DATE_CELL).unwrap_or(&Data::Empty))
}

pub fn parse_report_date(cell: &Data) -> ReportResult<NaiveDate> {
    match cell {
        Data::String(text) => parse_date_text(text).ok_or_else(|| date_error(text)),
        // Cells typed as dates carry no textual format to get wrong
        Data::DateTime(excel_dt) => from_serial(excel_dt.as_f64()).ok_or_else(|| date_error(cell)),
        Data::DateTimeIso(text) => NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
            .map(|dt| dt.date())
            .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
            .map_err(|_| date_error(text)),
        other => Err(date_error(other)),
    }
}

/// `%B` also accepts "Jan", so the month must be spelled out in full.
fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    let date = NaiveDate::parse_from_str(trimmed, REPORT_DATE_FORMAT).ok()?;
    let month = trimmed.split_whitespace().nth(1)?;
    month
        .eq_ignore_ascii_case(&date.format("%B").to_string())
        .then_some(date)
}

fn date_error(raw: impl ToString) -> ReportError {
    ReportError::DateFormat {
        raw: raw.to_string(),
    }
}

/// Spreadsheet serial day number to a calendar date, dropping the time of day
fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    // Serial 1 is 1900-01-01 counting the fictitious 1900-02-29
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    // Safe cast: finite and positive, checked above
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let days = serial.floor() as u64;
    epoch.checked_add_days(Days::new(days))
}
