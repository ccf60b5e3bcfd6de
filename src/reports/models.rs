use crate::common::errors::{ReportError, ReportResult};
use calamine::Data;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

/// On-disk format of every persisted date
pub const STORED_DATE_FORMAT: &str = "%Y-%m-%d";

pub const METRICS_COLUMNS: [&str; 5] = [
    "Date",
    "Total Gas Closing",
    "Total Condensate Closing",
    "CO2 Content",
    "Total Flare",
];

pub const WELL_COLUMNS: [&str; 13] = [
    "Date",
    "Well No.",
    "SITHP (kPa)",
    "Status@0600Hrs",
    "WELL MSFR %",
    "FTHP (kPa)",
    "FTHT (°C)",
    "Bean Size (/64\")",
    "(%) Choke Opening",
    "Gas Rate (mmscfd)",
    "Condy (Sm3/d)",
    "Water (Sm3/d)",
    "REMARKS",
];

/// Date column of a history row.
///
/// Rows written by this service always hold a parsed date. Rows loaded from a
/// hand-edited or legacy file may not; those keep their raw text so a save
/// does not destroy them, but they never match a reconciliation key and never
/// reach a trend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HistoryDate {
    Parsed(NaiveDate),
    Unparsed(String),
}

impl HistoryDate {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, STORED_DATE_FORMAT) {
            return Self::Parsed(date);
        }
        // Timestamps written by older tooling carry a time of day
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
            return Self::Parsed(timestamp.date());
        }
        Self::Unparsed(raw.to_string())
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Parsed(date) => Some(*date),
            Self::Unparsed(_) => None,
        }
    }

    pub fn is(&self, date: NaiveDate) -> bool {
        self.as_date() == Some(date)
    }
}

impl From<NaiveDate> for HistoryDate {
    fn from(date: NaiveDate) -> Self {
        Self::Parsed(date)
    }
}

impl fmt::Display for HistoryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed(date) => write!(f, "{}", date.format(STORED_DATE_FORMAT)),
            Self::Unparsed(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for HistoryDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HistoryDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// A single report value, kept as the spreadsheet gave it.
///
/// Extraction never coerces or rejects values: numeric cells become `Number`,
/// text cells stay `Text` exactly as typed. Numeric meaning only matters to
/// the trend projection, which reads both through [`CellValue::as_f64`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(Decimal),
    Text(String),
}

impl CellValue {
    /// Text as written. Only a blank string is treated as no value.
    pub fn from_text(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(raw.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(number) => number.to_f64(),
            Self::Text(text) => Decimal::from_str(text.trim()).ok()?.to_f64(),
            Self::Empty => None,
        }
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => Self::Empty,
            Data::Int(i) => Self::Number(Decimal::from(*i)),
            Data::Float(f) => Decimal::from_f64(*f)
                .map_or_else(|| Self::Text(f.to_string()), |d| Self::Number(d.normalize())),
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Self::from_text(s),
            other => Self::from_text(&other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_text(&raw))
    }
}

/// Field-wide summary figures of one report. At most one per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MetricsRecord {
    #[serde(rename = "Date")]
    #[schema(value_type = String, format = Date)]
    pub date: HistoryDate,
    #[serde(rename = "Total Gas Closing")]
    #[schema(value_type = String)]
    pub total_gas_closing: CellValue,
    #[serde(rename = "Total Condensate Closing")]
    #[schema(value_type = String)]
    pub total_condensate_closing: CellValue,
    #[serde(rename = "CO2 Content")]
    #[schema(value_type = String)]
    pub co2_content: CellValue,
    #[serde(rename = "Total Flare")]
    #[schema(value_type = String)]
    pub total_flare: CellValue,
}

/// One row of the well status block. At most one per (date, well no.).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WellRecord {
    #[serde(rename = "Date")]
    #[schema(value_type = String, format = Date)]
    pub date: HistoryDate,
    #[serde(rename = "Well No.")]
    pub well_no: String,
    #[serde(rename = "SITHP (kPa)")]
    #[schema(value_type = String)]
    pub sithp: CellValue,
    #[serde(rename = "Status@0600Hrs")]
    #[schema(value_type = String)]
    pub status_at_0600: CellValue,
    #[serde(rename = "WELL MSFR %")]
    #[schema(value_type = String)]
    pub msfr_pct: CellValue,
    #[serde(rename = "FTHP (kPa)")]
    #[schema(value_type = String)]
    pub fthp: CellValue,
    #[serde(rename = "FTHT (°C)")]
    #[schema(value_type = String)]
    pub ftht: CellValue,
    #[serde(rename = "Bean Size (/64\")")]
    #[schema(value_type = String)]
    pub bean_size: CellValue,
    #[serde(rename = "(%) Choke Opening")]
    #[schema(value_type = String)]
    pub choke_opening_pct: CellValue,
    #[serde(rename = "Gas Rate (mmscfd)")]
    #[schema(value_type = String)]
    pub gas_rate: CellValue,
    #[serde(rename = "Condy (Sm3/d)")]
    #[schema(value_type = String)]
    pub condensate_rate: CellValue,
    #[serde(rename = "Water (Sm3/d)")]
    #[schema(value_type = String)]
    pub water_rate: CellValue,
    #[serde(rename = "REMARKS")]
    pub remarks: String,
}

impl WellRecord {
    /// Bind the twelve block cells, in canonical column order, to a date.
    /// Returns `None` when the well number cell is blank.
    pub fn from_block_row(date: NaiveDate, cells: [CellValue; 12]) -> Option<Self> {
        let [
            well_no,
            sithp,
            status_at_0600,
            msfr_pct,
            fthp,
            ftht,
            bean_size,
            choke_opening_pct,
            gas_rate,
            condensate_rate,
            water_rate,
            remarks,
        ] = cells;

        if well_no.is_empty() {
            return None;
        }

        Some(Self {
            date: date.into(),
            well_no: well_no.to_string().trim().to_string(),
            sithp,
            status_at_0600,
            msfr_pct,
            fthp,
            ftht,
            bean_size,
            choke_opening_pct,
            gas_rate,
            condensate_rate,
            water_rate,
            remarks: remarks.to_string(),
        })
    }
}

/// The numeric metric columns a trend can be drawn from
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
pub enum MetricColumn {
    #[serde(rename = "Total Gas Closing")]
    TotalGasClosing,
    #[serde(rename = "Total Condensate Closing")]
    TotalCondensateClosing,
    #[serde(rename = "CO2 Content")]
    Co2Content,
    #[serde(rename = "Total Flare")]
    TotalFlare,
}

impl MetricColumn {
    pub const ALL: [Self; 4] = [
        Self::TotalGasClosing,
        Self::TotalCondensateClosing,
        Self::Co2Content,
        Self::TotalFlare,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::TotalGasClosing => "Total Gas Closing",
            Self::TotalCondensateClosing => "Total Condensate Closing",
            Self::Co2Content => "CO2 Content",
            Self::TotalFlare => "Total Flare",
        }
    }

    pub fn value(self, record: &MetricsRecord) -> &CellValue {
        match self {
            Self::TotalGasClosing => &record.total_gas_closing,
            Self::TotalCondensateClosing => &record.total_condensate_closing,
            Self::Co2Content => &record.co2_content,
            Self::TotalFlare => &record.total_flare,
        }
    }
}

impl FromStr for MetricColumn {
    type Err = ReportError;

    /// Accepts the column header ("Total Gas Closing") or its snake case
    /// form ("total_gas_closing"), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', " ");
        Self::ALL
            .into_iter()
            .find(|column| column.name().to_lowercase() == wanted)
            .ok_or_else(|| ReportError::InvalidColumn {
                column: s.trim().to_string(),
            })
    }
}

/// Parse a comma separated column list. Blank input selects nothing.
pub fn parse_metric_columns(raw: &str) -> ReportResult<Vec<MetricColumn>> {
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Outcome of one committed ingestion cycle, ready for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadSummary {
    pub file_name: String,
    pub report_date: NaiveDate,
    pub metrics: MetricsRecord,
    pub wells: Vec<WellRecord>,
    pub metrics_replaced: usize,
    pub wells_replaced: usize,
    pub metrics_history_len: usize,
    pub well_history_len: usize,
    pub processing_time_ms: u128,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetricsHistory {
    pub columns: Vec<String>,
    pub rows: Vec<MetricsRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WellHistory {
    pub columns: Vec<String>,
    pub rows: Vec<WellRecord>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct WellHistoryQuery {
    /// Only return rows for this report date (YYYY-MM-DD)
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TrendQuery {
    /// Comma separated metric columns. Defaults to "Total Gas Closing" when absent.
    pub columns: Option<String>,
}

/// Phrase the operator must type to confirm a reset
pub const RESET_PHRASE: &str = "RESET";

/// Both halves of the two-step reset: tick the acknowledgement, then type the phrase.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ResetConfirmation {
    pub acknowledged: bool,
    pub confirmation: String,
}

impl ResetConfirmation {
    pub fn confirmed() -> Self {
        Self {
            acknowledged: true,
            confirmation: RESET_PHRASE.to_string(),
        }
    }

    pub fn validate(&self) -> ReportResult<()> {
        if !self.acknowledged {
            return Err(ReportError::ResetConfirmation {
                message: "the permanent deletion of all history was not acknowledged".to_string(),
            });
        }
        if self.confirmation.trim() != RESET_PHRASE {
            return Err(ReportError::ResetConfirmation {
                message: format!("type '{RESET_PHRASE}' to confirm"),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResetOutcome {
    pub metrics_cleared: bool,
    pub wells_cleared: bool,
}
