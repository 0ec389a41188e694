//! Inspection-record inputs
//!
//! The CSV reader itself is an external collaborator: it hands the core
//! already-split records. Fields that need interpretation (dates, AQIM
//! quantity units) arrive as raw strings and are validated here, so a
//! malformed row surfaces as a structured data error that the orchestrator
//! either skips (with a diagnostic) or aborts on, per `strict_input`.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Diagnostic, DiagnosticCategory};

/// Default date format for record and schedule dates.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// One F280 inspection record.
///
/// Field names mirror the F280 column headers so a deserializing reader can
/// map rows directly onto this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct F280Record {
    #[serde(rename = "QUANTITY")]
    pub quantity: usize,
    #[serde(rename = "PATHWAY")]
    pub pathway: String,
    #[serde(rename = "REPORT_DT")]
    pub report_dt: String,
    #[serde(rename = "COMMODITY")]
    pub commodity: String,
    #[serde(rename = "ORIGIN_NM")]
    pub origin_nm: String,
    #[serde(rename = "LOCATION")]
    pub location: String,
}

/// One AQIM inspection record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AqimRecord {
    /// Quantity unit: `Box/Carton` (boxes) or `Stems` (items)
    #[serde(rename = "UNIT")]
    pub unit: String,
    #[serde(rename = "QUANTITY")]
    pub quantity: usize,
    #[serde(rename = "CARGO_FORM")]
    pub cargo_form: String,
    /// Calendar year as `YYYY`
    #[serde(rename = "CALENDAR_YR")]
    pub calendar_yr: String,
    #[serde(rename = "COMMODITY_LIST")]
    pub commodity_list: String,
    #[serde(rename = "ORIGIN")]
    pub origin: String,
    #[serde(rename = "LOCATION")]
    pub location: String,
}

/// One row of a CFRP schedule table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CfrpScheduleRow {
    pub date: String,
    pub commodity: String,
    pub origin: String,
}

/// CFRP schedule: (commodity, origin) -> dates on which that combination is
/// the flower of the day.
pub type CfrpSchedule = HashMap<(String, String), BTreeSet<NaiveDate>>;

/// One preconfigured compliance record for the fixed skip lot program.
///
/// `attributes` carries the tracked attribute values keyed by attribute
/// name (e.g., `origin`, `commodity`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipLotRecord {
    #[serde(flatten)]
    pub attributes: HashMap<String, String>,
    pub compliance_level: usize,
}

/// Errors for record translation and schedule construction.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("{0}")]
    BadRow(Diagnostic),

    #[error("more consignments requested than records provided ({available} available)")]
    Exhausted { available: usize },
}

impl DataError {
    pub fn bad_row(path: impl Into<String>, message: impl Into<String>) -> Self {
        DataError::BadRow(Diagnostic {
            category: DiagnosticCategory::Data,
            path: path.into(),
            message: message.into(),
        })
    }
}

/// Parse a record date, reporting failures as data errors.
pub fn parse_record_date(text: &str, format: &str, path: &str) -> Result<NaiveDate, DataError> {
    NaiveDate::parse_from_str(text, format)
        .map_err(|err| DataError::bad_row(path, format!("invalid date {text:?}: {err}")))
}

/// Build a CFRP schedule from table rows.
///
/// `date_format` defaults to ISO (`%Y-%m-%d`); schedules exported from
/// spreadsheets commonly use `%Y_%m_%d`.
pub fn build_cfrp_schedule(
    rows: &[CfrpScheduleRow],
    date_format: Option<&str>,
) -> Result<CfrpSchedule, DataError> {
    let format = date_format.unwrap_or(DEFAULT_DATE_FORMAT);
    let mut schedule: CfrpSchedule = HashMap::new();
    for (row_index, row) in rows.iter().enumerate() {
        let date = parse_record_date(
            &row.date,
            format,
            &format!("release_programs/cfrp/schedule[{row_index}]/date"),
        )?;
        schedule
            .entry((row.commodity.clone(), row.origin.clone()))
            .or_default()
            .insert(date);
    }
    Ok(schedule)
}
