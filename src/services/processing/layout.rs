//! The fixed DOR template.
//!
//! Every value the service extracts comes from a named, absolute cell of the
//! `TBC DOR` sheet. The coordinates are zero-indexed: the report's visual
//! row and column, minus one.

use std::fmt;

use super::grid::Grid;
use crate::common::errors::{ReportError, ReportResult};
use crate::reports::models::MetricColumn;

pub const SHEET_NAME: &str = "TBC DOR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Spreadsheet notation, e.g. `H73`
impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut letters = Vec::new();
        let mut col = self.col + 1;
        while col > 0 {
            let rem = (col - 1) % 26;
            letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
            col = (col - 1) / 26;
        }
        let letters: String = letters.into_iter().rev().collect();
        write!(f, "{letters}{}", self.row + 1)
    }
}

/// "As of" date of the report (F3)
pub const DATE_CELL: CellRef = CellRef::new(2, 5);

pub const METRIC_CELLS: [(MetricColumn, CellRef); 4] = [
    (MetricColumn::TotalGasClosing, CellRef::new(72, 7)),
    (MetricColumn::TotalCondensateClosing, CellRef::new(73, 14)),
    (MetricColumn::Co2Content, CellRef::new(78, 14)),
    (MetricColumn::TotalFlare, CellRef::new(97, 6)),
];

/// First row of the well status block (row 31)
pub const WELL_START_ROW: usize = 30;

/// Block columns, in the order of the canonical well columns after `Date`.
/// Column C is not part of the block.
pub const WELL_BLOCK_COLUMNS: [usize; 12] = [1, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13];

fn named_cells() -> impl Iterator<Item = (&'static str, CellRef)> {
    std::iter::once(("report date", DATE_CELL))
        .chain(METRIC_CELLS.iter().map(|(column, cell)| (column.name(), *cell)))
        .chain(std::iter::once((
            "well status block",
            CellRef::new(WELL_START_ROW, WELL_BLOCK_COLUMNS[WELL_BLOCK_COLUMNS.len() - 1]),
        )))
}

/// Check that the loaded sheet covers every named coordinate before any of
/// them is read. A smaller sheet is a different template, not a report with
/// blanks, so it fails loudly.
pub fn validate_layout(grid: &Grid) -> ReportResult<()> {
    let (height, width) = (grid.height(), grid.width());

    for (name, cell) in named_cells() {
        if cell.row >= height || cell.col >= width {
            return Err(ReportError::LayoutMismatch {
                expected: format!("'{SHEET_NAME}' sheet covering {name} at {cell}"),
                found: format!("a sheet of {height} rows x {width} columns"),
            });
        }
    }

    Ok(())
}
