//! One history table persisted as a CSV file.
//!
//! Saves always rewrite the whole file: rows go to a temp file in the same
//! directory, which is then renamed over the old file. A failed save leaves
//! the previous file as it was.

use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::table::{HistoryTable, Keyed};
use crate::common::errors::{ReportError, ReportResult};

#[derive(Debug, Clone)]
pub struct CsvFile<R> {
    name: &'static str,
    path: PathBuf,
    columns: &'static [&'static str],
    _record: PhantomData<R>,
}

/// A fully written table waiting to be renamed into place
pub struct StagedTable {
    name: &'static str,
    file: NamedTempFile,
    path: PathBuf,
}

impl StagedTable {
    pub fn commit(self) -> ReportResult<()> {
        self.file
            .persist(&self.path)
            .map_err(|e| ReportError::persistence(format!("save {}", self.name), e.error))?;
        Ok(())
    }
}

impl<R> CsvFile<R>
where
    R: Keyed + Serialize + DeserializeOwned,
{
    pub fn new(name: &'static str, path: PathBuf, columns: &'static [&'static str]) -> Self {
        Self {
            name,
            path,
            columns,
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    /// Load every row. A missing file is an empty table.
    pub fn load(&self) -> ReportResult<HistoryTable<R>> {
        let operation = || format!("load {}", self.name);

        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HistoryTable::default()),
            Err(e) => return Err(ReportError::persistence(operation(), e)),
        };

        let mut reader = ReaderBuilder::new().from_reader(file);
        let rows = reader
            .deserialize::<R>()
            .collect::<Result<Vec<R>, _>>()
            .map_err(|e| ReportError::persistence(operation(), e))?;

        tracing::debug!(
            "Loaded {} rows of {} from {}",
            rows.len(),
            self.name,
            self.path.display()
        );
        Ok(HistoryTable::new(rows))
    }

    /// Write the whole table to a temp file beside the target, header first
    pub fn stage(&self, table: &HistoryTable<R>) -> ReportResult<StagedTable> {
        let operation = || format!("save {}", self.name);
        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut file =
            NamedTempFile::new_in(dir).map_err(|e| ReportError::persistence(operation(), e))?;

        {
            let mut writer = WriterBuilder::new()
                .has_headers(false)
                .from_writer(file.as_file_mut());
            writer
                .write_record(self.columns)
                .map_err(|e| ReportError::persistence(operation(), e))?;
            for row in table.rows() {
                writer
                    .serialize(row)
                    .map_err(|e| ReportError::persistence(operation(), e))?;
            }
            writer
                .flush()
                .map_err(|e| ReportError::persistence(operation(), e))?;
        }

        file.as_file()
            .sync_all()
            .map_err(|e| ReportError::persistence(operation(), e))?;

        Ok(StagedTable {
            name: self.name,
            file,
            path: self.path.clone(),
        })
    }

    /// Delete the backing file. Deleting a file that does not exist succeeds.
    pub fn remove(&self) -> ReportResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ReportError::persistence(format!("clear {}", self.name), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::models::{
        CellValue, HistoryDate, METRICS_COLUMNS, MetricsRecord, WELL_COLUMNS, WellRecord,
    };
    use chrono::NaiveDate;

    fn metrics_file(dir: &Path) -> CsvFile<MetricsRecord> {
        CsvFile::new(
            "metrics history",
            dir.join("summary_data.csv"),
            &METRICS_COLUMNS,
        )
    }

    fn save<R: Keyed + Serialize + DeserializeOwned>(file: &CsvFile<R>, table: &HistoryTable<R>) {
        file.stage(table).unwrap().commit().unwrap();
    }

    fn record(day: u32, gas: &str) -> MetricsRecord {
        MetricsRecord {
            date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap().into(),
            total_gas_closing: CellValue::from_text(gas),
            total_condensate_closing: CellValue::from_text("2500"),
            co2_content: CellValue::Empty,
            total_flare: CellValue::from_text("n/a"),
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = metrics_file(dir.path()).load().unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_save_writes_report_headers_and_iso_dates() {
        let dir = tempfile::tempdir().unwrap();
        let file = metrics_file(dir.path());
        save(&file, &HistoryTable::new(vec![record(31, "100.5")]));

        let contents = fs::read_to_string(file.path()).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Date,Total Gas Closing,Total Condensate Closing,CO2 Content,Total Flare"
        );
        assert_eq!(lines.next().unwrap(), "2026-01-31,100.5,2500,,n/a");
        assert!(lines.next().is_none());

        let loaded = file.load().unwrap();
        assert_eq!(loaded.rows(), &[record(31, "100.5")]);
    }

    #[test]
    fn test_empty_table_keeps_schema() {
        let dir = tempfile::tempdir().unwrap();
        let file: CsvFile<WellRecord> =
            CsvFile::new("well history", dir.path().join("well_data.csv"), &WELL_COLUMNS);
        save(&file, &HistoryTable::default());

        let mut reader = ReaderBuilder::new().from_path(file.path()).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, WELL_COLUMNS);
        assert_eq!(reader.records().count(), 0);
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_text_identifiers_round_trip_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let file: CsvFile<WellRecord> =
            CsvFile::new("well history", dir.path().join("well_data.csv"), &WELL_COLUMNS);
        let mut cells: [CellValue; 12] = Default::default();
        cells[0] = CellValue::from_text("007");
        cells[11] = CellValue::from_text("0010");
        let well = WellRecord::from_block_row(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(), cells)
            .unwrap();
        save(&file, &HistoryTable::new(vec![well.clone()]));

        let loaded = file.load().unwrap();
        assert_eq!(loaded.rows(), &[well]);
        assert_eq!(loaded.rows()[0].well_no, "007");
        assert_eq!(loaded.rows()[0].remarks, "0010");
    }

    #[test]
    fn test_legacy_rows_survive_a_save() {
        let dir = tempfile::tempdir().unwrap();
        let file = metrics_file(dir.path());
        fs::write(
            file.path(),
            "Date,Total Gas Closing,Total Condensate Closing,CO2 Content,Total Flare\n\
             31/01/2026,99,,,\n\
             2026-01-30 00:00:00,98,,,\n",
        )
        .unwrap();

        let table = file.load().unwrap();
        assert_eq!(
            table.rows()[0].date,
            HistoryDate::Unparsed("31/01/2026".to_string())
        );
        assert!(table.rows()[1]
            .date
            .is(NaiveDate::from_ymd_opt(2026, 1, 30).unwrap()));

        save(&file, &table);
        let contents = fs::read_to_string(file.path()).unwrap();
        assert!(contents.contains("31/01/2026,99,,,"));
        assert!(contents.contains("2026-01-30,98,,,"));
    }

    #[test]
    fn test_staged_table_does_not_touch_target_until_commit() {
        let dir = tempfile::tempdir().unwrap();
        let file = metrics_file(dir.path());
        save(&file, &HistoryTable::new(vec![record(30, "90")]));

        let staged = file
            .stage(&HistoryTable::new(vec![record(30, "90"), record(31, "100")]))
            .unwrap();
        assert_eq!(file.load().unwrap().len(), 1);

        staged.commit().unwrap();
        assert_eq!(file.load().unwrap().len(), 2);
    }

    #[test]
    fn test_dropped_stage_leaves_no_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let file = metrics_file(dir.path());
        let staged = file.stage(&HistoryTable::new(vec![record(31, "1")])).unwrap();
        drop(staged);

        assert!(!file.path().exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let file = metrics_file(dir.path());
        save(&file, &HistoryTable::new(vec![record(31, "1")]));

        file.remove().unwrap();
        assert!(!file.path().exists());
        file.remove().unwrap();
    }

    #[test]
    fn test_unreadable_row_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = metrics_file(dir.path());
        fs::write(file.path(), "Date,Total Gas Closing\n2026-01-31,1\n").unwrap();

        assert!(matches!(
            file.load(),
            Err(ReportError::Persistence { .. })
        ));
    }
}
