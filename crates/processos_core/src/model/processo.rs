//! Legal-case record ("processo") model and wire codec.
//!
//! # Responsibility
//! - Define the record stored in the slot and rendered by the list view.
//! - Map Rust field names to the JSON keys used by existing snapshots.
//! - Provide field validation for editor-produced records.
//!
//! # Invariants
//! - Every wire field is required; no field is optional or versioned.
//! - `status` serializes as `"Ativo"` or `"Encerrado"` only.
//! - `filing_date` stays a string so stored snapshots round-trip unchanged.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Date-time layouts accepted after the plain `YYYY-MM-DD` and RFC 3339 forms.
const NAIVE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Case lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusProcesso {
    /// Case is ongoing.
    #[serde(rename = "Ativo")]
    Active,
    /// Case is finished.
    #[serde(rename = "Encerrado")]
    Closed,
}

impl StatusProcesso {
    /// Returns the wire/display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Ativo",
            Self::Closed => "Encerrado",
        }
    }

    /// Parses a wire label, trimming surrounding whitespace.
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim() {
            "Ativo" => Some(Self::Active),
            "Encerrado" => Some(Self::Closed),
            _ => None,
        }
    }
}

impl Display for StatusProcesso {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One legal-case entry.
///
/// Field names follow Rust conventions; serde renames keep the stored JSON
/// shape (`numero`, `reclamante`, ...) intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Processo {
    /// Unique key used for lookup, edit-match and delete-match.
    #[serde(rename = "numero")]
    pub identifier: String,
    #[serde(rename = "reclamante")]
    pub claimant_name: String,
    #[serde(rename = "reclamada")]
    pub respondent_name: String,
    pub status: StatusProcesso,
    /// Currency amount in BRL.
    #[serde(rename = "valorCausa")]
    pub case_value: f64,
    /// ISO-8601 date string, e.g. `2023-05-10`.
    #[serde(rename = "dataAjuizamento")]
    pub filing_date: String,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "uf")]
    pub state_code: String,
    #[serde(rename = "vara")]
    pub court_name: String,
}

/// Validation error for editor-produced records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessoValidationError {
    /// A required text field is empty after trimming.
    EmptyField(&'static str),
    /// `case_value` is NaN or infinite.
    NonFiniteValue,
    /// `filing_date` is not an ISO `YYYY-MM-DD` date.
    InvalidFilingDate(String),
}

impl Display for ProcessoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "field `{field}` cannot be empty"),
            Self::NonFiniteValue => write!(f, "field `valorCausa` must be a finite number"),
            Self::InvalidFilingDate(value) => {
                write!(f, "field `dataAjuizamento` is not an ISO date: `{value}`")
            }
        }
    }
}

impl Error for ProcessoValidationError {}

impl Processo {
    /// Checks required fields before a record leaves the editor.
    ///
    /// The store does not call this; persisted and fetched data are accepted
    /// as-is.
    pub fn validate(&self) -> Result<(), ProcessoValidationError> {
        let required = [
            ("numero", self.identifier.as_str()),
            ("reclamante", self.claimant_name.as_str()),
            ("reclamada", self.respondent_name.as_str()),
            ("cidade", self.city.as_str()),
            ("uf", self.state_code.as_str()),
            ("vara", self.court_name.as_str()),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ProcessoValidationError::EmptyField(field));
            }
        }

        if !self.case_value.is_finite() {
            return Err(ProcessoValidationError::NonFiniteValue);
        }

        if parse_filing_date(&self.filing_date).is_none() {
            return Err(ProcessoValidationError::InvalidFilingDate(
                self.filing_date.clone(),
            ));
        }

        Ok(())
    }

    /// Returns whether this record matches the given identifier exactly.
    pub fn has_identifier(&self, identifier: &str) -> bool {
        self.identifier == identifier
    }
}

/// Decodes a JSON array of records (slot snapshot or fallback body).
pub fn parse_records(json: &str) -> serde_json::Result<Vec<Processo>> {
    serde_json::from_str(json)
}

/// Encodes records as the JSON array stored in the slot.
pub fn records_to_json(records: &[Processo]) -> serde_json::Result<String> {
    serde_json::to_string(records)
}

/// Calendar date of an ISO date or date-time string.
///
/// Offsets are not applied: `2023-05-10T23:59:00-03:00` is 10 May 2023.
/// Returns `None` when the text is not ISO or the date does not exist.
pub(crate) fn parse_filing_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(date_time.date_naive());
    }
    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|date_time| date_time.date())
}
