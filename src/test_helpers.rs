/// Shared test helpers: HTTP response decoding, multipart bodies, and an
/// in-memory builder for DOR workbooks laid out like the real template.
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use rust_xlsxwriter::Workbook;
use serde_json::{Value, json};

use crate::services::processing::layout::{
    DATE_CELL, METRIC_CELLS, SHEET_NAME, WELL_BLOCK_COLUMNS, WELL_START_ROW,
};
use crate::reports::models::{MetricColumn, WELL_COLUMNS};

/// Extract response body as JSON for testing
pub async fn extract_response_body(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let body: Value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| json!({"error": "Invalid JSON response"}));
    (status, body)
}

const BOUNDARY: &str = "dor-test-boundary";

/// Build a multipart upload request carrying one file
pub fn upload_request(uri: &str, field_name: &str, file_name: &str, file_data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field_name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(file_data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

enum WellRow {
    Named { well_no: String, remarks: String },
    Unnamed,
}

/// Builds a `.xlsx` DOR with the template's date cell, well block and
/// summary cells.
pub struct DorReportBuilder {
    date: String,
    sheet_name: String,
    metrics: Vec<(MetricColumn, f64)>,
    wells: Vec<WellRow>,
    truncated: bool,
}

impl DorReportBuilder {
    pub fn new(date: &str) -> Self {
        Self {
            date: date.to_string(),
            sheet_name: SHEET_NAME.to_string(),
            metrics: Vec::new(),
            wells: Vec::new(),
            truncated: false,
        }
    }

    pub fn sheet_name(mut self, name: &str) -> Self {
        self.sheet_name = name.to_string();
        self
    }

    pub fn metric(mut self, column: MetricColumn, value: f64) -> Self {
        self.metrics.push((column, value));
        self
    }

    pub fn total_gas(self, value: f64) -> Self {
        self.metric(MetricColumn::TotalGasClosing, value)
    }

    pub fn well(self, well_no: &str) -> Self {
        self.well_with_remarks(well_no, "Flowing")
    }

    pub fn well_with_remarks(mut self, well_no: &str, remarks: &str) -> Self {
        self.wells.push(WellRow::Named {
            well_no: well_no.to_string(),
            remarks: remarks.to_string(),
        });
        self
    }

    /// A block row with readings but no well number
    pub fn unnamed_well_row(mut self) -> Self {
        self.wells.push(WellRow::Unnamed);
        self
    }

    /// Stop the sheet before the flare row
    pub fn truncated(mut self) -> Self {
        self.truncated = true;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let in_sheet = |row: usize| !self.truncated || row < 80;
        let row_num = |row: usize| u32::try_from(row).unwrap();
        let col_num = |col: usize| u16::try_from(col).unwrap();

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.sheet_name).unwrap();

        sheet.write_string(row_num(DATE_CELL.row), 0, "Date:").unwrap();
        if !self.date.is_empty() {
            sheet
                .write_string(row_num(DATE_CELL.row), col_num(DATE_CELL.col), &self.date)
                .unwrap();
        }

        sheet
            .write_string(row_num(WELL_START_ROW - 1), 0, "TBDR Well Status")
            .unwrap();
        for (i, col) in WELL_BLOCK_COLUMNS.iter().enumerate() {
            sheet
                .write_string(row_num(WELL_START_ROW - 1), col_num(*col), WELL_COLUMNS[i + 1])
                .unwrap();
        }

        for (offset, well) in self.wells.iter().enumerate() {
            let row = row_num(WELL_START_ROW + offset);
            match well {
                WellRow::Named { well_no, remarks } => {
                    sheet.write_string(row, col_num(WELL_BLOCK_COLUMNS[0]), well_no).unwrap();
                    sheet.write_number(row, col_num(WELL_BLOCK_COLUMNS[1]), 3500.0).unwrap();
                    sheet.write_string(row, col_num(WELL_BLOCK_COLUMNS[2]), "Open").unwrap();
                    sheet.write_number(row, col_num(WELL_BLOCK_COLUMNS[9]), 12.5).unwrap();
                    sheet.write_string(row, col_num(WELL_BLOCK_COLUMNS[11]), remarks).unwrap();
                }
                WellRow::Unnamed => {
                    sheet.write_string(row, col_num(WELL_BLOCK_COLUMNS[2]), "Shut-in").unwrap();
                }
            }
        }

        for (column, cell) in METRIC_CELLS {
            if !in_sheet(cell.row) {
                continue;
            }
            sheet.write_string(row_num(cell.row), 0, column.name()).unwrap();
            // Unset metrics carry the report's "no reading" marker
            match self.metrics.iter().find(|(c, _)| *c == column) {
                Some((_, value)) => sheet
                    .write_number(row_num(cell.row), col_num(cell.col), *value)
                    .unwrap(),
                None => sheet
                    .write_string(row_num(cell.row), col_num(cell.col), "-")
                    .unwrap(),
            };
        }

        workbook.save_to_buffer().unwrap()
    }
}
