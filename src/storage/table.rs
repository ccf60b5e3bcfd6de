use crate::reports::models::{HistoryDate, MetricsRecord, WellRecord};

/// A history row with a natural key
pub trait Keyed {
    type Key;

    fn key(&self) -> Self::Key;
}

impl Keyed for MetricsRecord {
    type Key = HistoryDate;

    fn key(&self) -> Self::Key {
        self.date.clone()
    }
}

impl Keyed for WellRecord {
    type Key = (HistoryDate, String);

    fn key(&self) -> Self::Key {
        (self.date.clone(), self.well_no.clone())
    }
}

/// In-memory copy of a history store. Rows are never edited in place; they
/// are removed by key and appended whole.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryTable<R> {
    rows: Vec<R>,
}

impl<R> Default for HistoryTable<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R: Keyed> HistoryTable<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Remove every row whose key matches, returning how many were removed
    pub fn remove_where(&mut self, matches: impl Fn(&R::Key) -> bool) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !matches(&row.key()));
        before - self.rows.len()
    }

    pub fn append(&mut self, rows: impl IntoIterator<Item = R>) {
        self.rows.extend(rows);
    }
}
