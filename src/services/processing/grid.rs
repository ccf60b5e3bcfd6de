//! Sheet loading and cell access
//!
//! A [`Grid`] holds one worksheet addressed by absolute, zero-indexed
//! coordinates: `(0, 0)` is cell A1 no matter where the sheet's first
//! populated cell is. Every fixed report coordinate is read through
//! [`Grid::read`].

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;

use super::layout::CellRef;
use crate::common::errors::{ReportError, ReportResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Data>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Data>>) -> Self {
        Self { rows }
    }

    /// Re-anchor a calamine range at A1. Ranges start at their first
    /// populated cell, so leading rows and columns are padded back in.
    pub fn from_range(range: &Range<Data>) -> Self {
        let Some((start_row, start_col)) = range.start() else {
            return Self::default();
        };

        let mut rows = vec![Vec::new(); start_row as usize];
        for row in range.rows() {
            let mut cells = vec![Data::Empty; start_col as usize];
            cells.extend_from_slice(row);
            rows.push(cells);
        }
        Self { rows }
    }

    /// Number of rows up to and including the last populated one
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Widest row, in columns
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Value at an absolute address. `None` outside the populated grid.
    pub fn read(&self, cell: CellRef) -> Option<&Data> {
        self.rows.get(cell.row)?.get(cell.col)
    }
}

/// Open a workbook from memory and load one named sheet
pub fn load_sheet(file_data: Vec<u8>, sheet_name: &str) -> ReportResult<Grid> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(file_data)).map_err(|e| {
            ReportError::InvalidUpload {
                message: format!("could not read workbook: {e}"),
            }
        })?;

    let sheet_names = workbook.sheet_names();
    if !sheet_names.iter().any(|name| name == sheet_name) {
        return Err(ReportError::LayoutMismatch {
            expected: format!("a sheet named '{sheet_name}'"),
            found: format!("sheets {sheet_names:?}"),
        });
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| ReportError::InvalidUpload {
            message: format!("could not read sheet '{sheet_name}': {e}"),
        })?;

    let grid = Grid::from_range(&range);
    tracing::debug!(
        "Loaded sheet '{sheet_name}' ({} rows x {} columns)",
        grid.height(),
        grid.width()
    );
    Ok(grid)
}
