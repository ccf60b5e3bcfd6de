use chrono::NaiveDate;

use super::grid::Grid;
use super::layout::{CellRef, METRIC_CELLS, WELL_BLOCK_COLUMNS, WELL_START_ROW};
use super::reconcile::latest_per_well;
use crate::reports::models::{CellValue, MetricColumn, MetricsRecord, WellRecord};

fn cell_value(grid: &Grid, cell: CellRef) -> CellValue {
    grid.read(cell).map(CellValue::from).unwrap_or_default()
}

/// Bind the four summary cells to the validated report date
pub fn extract_metrics(grid: &Grid, date: NaiveDate) -> MetricsRecord {
    let mut record = MetricsRecord {
        date: date.into(),
        total_gas_closing: CellValue::Empty,
        total_condensate_closing: CellValue::Empty,
        co2_content: CellValue::Empty,
        total_flare: CellValue::Empty,
    };

    for (column, cell) in METRIC_CELLS {
        let value = cell_value(grid, cell);
        match column {
            MetricColumn::TotalGasClosing => record.total_gas_closing = value,
            MetricColumn::TotalCondensateClosing => record.total_condensate_closing = value,
            MetricColumn::Co2Content => record.co2_content = value,
            MetricColumn::TotalFlare => record.total_flare = value,
        }
    }

    record
}

/// Read the well status block from its first row to the end of the sheet.
///
/// Rows keep their sheet order. Rows without a well number are dropped, and
/// a well listed twice keeps only its lower row.
pub fn extract_wells(grid: &Grid, date: NaiveDate) -> Vec<WellRecord> {
    let wells = latest_per_well(
        (WELL_START_ROW..grid.height())
            .filter_map(|row| {
                let cells = WELL_BLOCK_COLUMNS.map(|col| cell_value(grid, CellRef::new(row, col)));
                WellRecord::from_block_row(date, cells)
            })
            .collect(),
    );

    tracing::debug!(
        "Extracted {} wells from {} block rows",
        wells.len(),
        grid.height().saturating_sub(WELL_START_ROW)
    );
    wells
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;
    use rust_decimal::Decimal;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()
    }

    fn blank_grid() -> Vec<Vec<Data>> {
        vec![vec![Data::Empty; 15]; 98]
    }

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    #[test]
    fn test_extract_metrics_reads_fixed_cells() {
        let mut rows = blank_grid();
        rows[72][7] = Data::Float(100.0);
        rows[73][14] = Data::Int(2500);
        rows[78][14] = Data::Float(4.25);
        rows[97][6] = text("not metered");

        let record = extract_metrics(&Grid::new(rows), date());
        assert!(record.date.is(date()));
        assert_eq!(record.total_gas_closing, CellValue::Number(Decimal::from(100)));
        assert_eq!(
            record.total_condensate_closing,
            CellValue::Number(Decimal::from(2500))
        );
        assert_eq!(record.co2_content, CellValue::Number(Decimal::new(425, 2)));
        assert_eq!(record.total_flare, CellValue::Text("not metered".to_string()));
    }

    #[test]
    fn test_blank_metric_cells_stay_blank() {
        let record = extract_metrics(&Grid::new(blank_grid()), date());
        assert!(record.total_gas_closing.is_empty());
        assert!(record.total_flare.is_empty());
    }

    #[test]
    fn test_extract_wells_maps_block_columns() {
        let mut rows = blank_grid();
        let well_row = [
            text("TBDR-01"),
            Data::Float(3500.0),
            text("Open"),
            Data::Float(80.0),
            Data::Float(2100.0),
            Data::Float(65.5),
            Data::Int(32),
            Data::Float(50.0),
            Data::Float(12.3),
            Data::Float(150.0),
            Data::Float(2.0),
            text("Stable"),
        ];
        for (value, col) in well_row.into_iter().zip(WELL_BLOCK_COLUMNS) {
            rows[30][col] = value;
        }
        // Column C is outside the block
        rows[30][2] = text("ignored");

        let wells = extract_wells(&Grid::new(rows), date());
        assert_eq!(wells.len(), 1);
        let well = &wells[0];
        assert_eq!(well.well_no, "TBDR-01");
        assert_eq!(well.sithp, CellValue::Number(Decimal::from(3500)));
        assert_eq!(well.status_at_0600, CellValue::Text("Open".to_string()));
        assert_eq!(well.ftht, CellValue::Number(Decimal::new(655, 1)));
        assert_eq!(well.bean_size, CellValue::Number(Decimal::from(32)));
        assert_eq!(well.water_rate, CellValue::Number(Decimal::from(2)));
        assert_eq!(well.remarks, "Stable");
        assert!(well.date.is(date()));
    }

    #[test]
    fn test_extract_wells_skips_rows_without_well_number_and_keeps_order() {
        let mut rows = blank_grid();
        rows[29][1] = text("Well No.");
        rows[30][1] = text("TBDR-03");
        rows[31][4] = text("Shut-in");
        rows[32][1] = text("   ");
        rows[33][1] = text("TBDR-01");
        rows[34][1] = Data::Int(7);

        let wells = extract_wells(&Grid::new(rows), date());
        let ids: Vec<&str> = wells.iter().map(|w| w.well_no.as_str()).collect();
        assert_eq!(ids, vec!["TBDR-03", "TBDR-01", "7"]);
    }

    #[test]
    fn test_extract_wells_keeps_lower_row_of_a_repeated_well() {
        let mut rows = blank_grid();
        rows[30][1] = text("W1");
        rows[30][13] = text("first entry");
        rows[31][1] = text("W2");
        rows[32][1] = text("W1");
        rows[32][13] = text("corrected entry");

        let wells = extract_wells(&Grid::new(rows), date());
        let seen: Vec<(&str, &str)> = wells
            .iter()
            .map(|w| (w.well_no.as_str(), w.remarks.as_str()))
            .collect();
        assert_eq!(seen, vec![("W2", ""), ("W1", "corrected entry")]);
    }

    #[test]
    fn test_text_well_numbers_are_not_read_as_numbers() {
        let mut rows = blank_grid();
        rows[30][1] = text("007");
        rows[30][13] = text("0010");
        rows[31][1] = text("01");
        rows[32][1] = text("1");

        let wells = extract_wells(&Grid::new(rows), date());
        let ids: Vec<&str> = wells.iter().map(|w| w.well_no.as_str()).collect();
        assert_eq!(ids, vec!["007", "01", "1"]);
        assert_eq!(wells[0].remarks, "0010");
    }

    #[test]
    fn test_extract_wells_on_short_grid() {
        let rows = vec![vec![Data::Empty; 15]; 10];
        assert!(extract_wells(&Grid::new(rows), date()).is_empty());
    }
}
