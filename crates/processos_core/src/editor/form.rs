//! Modal form that turns user input into a record.
//!
//! # Responsibility
//! - Hold string-bound input for the nine record fields.
//! - Convert and validate the input into a `Processo` on confirm.
//!
//! # Invariants
//! - The editor never touches the store; it only emits signals.
//! - In edit mode the identifier is fixed to the record being edited.
//! - A failed `confirm` leaves the form contents untouched.

use crate::model::processo::{Processo, ProcessoValidationError, StatusProcesso};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// `1.500`, `1.500.000`, `1.500,50`: dot-grouped thousands, optional comma decimals.
static GROUPED_AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?\d{1,3}(?:\.\d{3})+)(?:,(\d+))?$").expect("valid grouped amount regex")
});
/// `1500,50`: ungrouped digits with a decimal comma.
static COMMA_DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d+),(\d+)$").expect("valid comma decimal regex"));
/// `1500`, `1500.5`: ungrouped digits with an optional decimal point.
static DOT_DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d+)(?:\.(\d+))?$").expect("valid dot decimal regex"));

/// Editable field selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Identifier,
    Claimant,
    Respondent,
    Status,
    CaseValue,
    FilingDate,
    City,
    StateCode,
    Court,
}

impl FormField {
    pub const ALL: [FormField; 9] = [
        Self::Identifier,
        Self::Claimant,
        Self::Respondent,
        Self::Status,
        Self::CaseValue,
        Self::FilingDate,
        Self::City,
        Self::StateCode,
        Self::Court,
    ];

    /// Wire key of the field.
    pub fn key(self) -> &'static str {
        match self {
            Self::Identifier => "numero",
            Self::Claimant => "reclamante",
            Self::Respondent => "reclamada",
            Self::Status => "status",
            Self::CaseValue => "valorCausa",
            Self::FilingDate => "dataAjuizamento",
            Self::City => "cidade",
            Self::StateCode => "uf",
            Self::Court => "vara",
        }
    }

    /// Parses a wire key back into a field.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

/// Raw form input, one string per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessoForm {
    pub identifier: String,
    pub claimant_name: String,
    pub respondent_name: String,
    pub status: String,
    pub case_value: String,
    pub filing_date: String,
    pub city: String,
    pub state_code: String,
    pub court_name: String,
}

impl Default for ProcessoForm {
    fn default() -> Self {
        Self {
            identifier: String::new(),
            claimant_name: String::new(),
            respondent_name: String::new(),
            status: StatusProcesso::Active.label().to_string(),
            case_value: String::new(),
            filing_date: String::new(),
            city: String::new(),
            state_code: String::new(),
            court_name: String::new(),
        }
    }
}

impl ProcessoForm {
    /// Pre-fills the form from an existing record.
    pub fn from_record(record: &Processo) -> Self {
        Self {
            identifier: record.identifier.clone(),
            claimant_name: record.claimant_name.clone(),
            respondent_name: record.respondent_name.clone(),
            status: record.status.label().to_string(),
            case_value: record.case_value.to_string(),
            filing_date: record.filing_date.clone(),
            city: record.city.clone(),
            state_code: record.state_code.clone(),
            court_name: record.court_name.clone(),
        }
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Identifier => &self.identifier,
            FormField::Claimant => &self.claimant_name,
            FormField::Respondent => &self.respondent_name,
            FormField::Status => &self.status,
            FormField::CaseValue => &self.case_value,
            FormField::FilingDate => &self.filing_date,
            FormField::City => &self.city,
            FormField::StateCode => &self.state_code,
            FormField::Court => &self.court_name,
        }
    }

    fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Identifier => &mut self.identifier,
            FormField::Claimant => &mut self.claimant_name,
            FormField::Respondent => &mut self.respondent_name,
            FormField::Status => &mut self.status,
            FormField::CaseValue => &mut self.case_value,
            FormField::FilingDate => &mut self.filing_date,
            FormField::City => &mut self.city,
            FormField::StateCode => &mut self.state_code,
            FormField::Court => &mut self.court_name,
        }
    }

    /// Converts the input into a validated record.
    ///
    /// Text fields are trimmed; the state code is upper-cased.
    pub fn to_record(&self) -> Result<Processo, FormError> {
        let status = StatusProcesso::from_label(&self.status)
            .ok_or_else(|| FormError::InvalidStatus(self.status.clone()))?;
        let case_value = parse_case_value(&self.case_value)?;

        let record = Processo {
            identifier: self.identifier.trim().to_string(),
            claimant_name: self.claimant_name.trim().to_string(),
            respondent_name: self.respondent_name.trim().to_string(),
            status,
            case_value,
            filing_date: self.filing_date.trim().to_string(),
            city: self.city.trim().to_string(),
            state_code: self.state_code.trim().to_uppercase(),
            court_name: self.court_name.trim().to_string(),
        };
        record.validate()?;
        Ok(record)
    }
}

/// Whether the editor creates a new record or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit { identifier: String },
}

/// What the editor asks its owner to do.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorSignal {
    Save(Processo),
    Close,
}

/// Form input or validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Status is neither `Ativo` nor `Encerrado`.
    InvalidStatus(String),
    /// Currency input is not a number.
    InvalidCaseValue(String),
    /// The identifier cannot change while editing.
    IdentifierLocked,
    Validation(ProcessoValidationError),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStatus(value) => {
                write!(f, "status must be `Ativo` or `Encerrado`, got `{value}`")
            }
            Self::InvalidCaseValue(value) => write!(f, "invalid currency amount: `{value}`"),
            Self::IdentifierLocked => write!(f, "field `numero` cannot change while editing"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FormError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProcessoValidationError> for FormError {
    fn from(value: ProcessoValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Open editor session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    mode: EditorMode,
    form: ProcessoForm,
}

impl Editor {
    /// Blank form for a new record.
    pub fn open_new() -> Self {
        Self {
            mode: EditorMode::Create,
            form: ProcessoForm::default(),
        }
    }

    /// Form pre-filled with `record`.
    pub fn open_edit(record: &Processo) -> Self {
        Self {
            mode: EditorMode::Edit {
                identifier: record.identifier.clone(),
            },
            form: ProcessoForm::from_record(record),
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn form(&self) -> &ProcessoForm {
        &self.form
    }

    /// Replaces one field's input.
    ///
    /// # Errors
    /// `IdentifierLocked` when changing the identifier in edit mode. Setting it
    /// to its current value is accepted.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) -> Result<(), FormError> {
        let value = value.into();
        if let (FormField::Identifier, EditorMode::Edit { identifier }) = (field, &self.mode) {
            if value.trim() != identifier.trim() {
                return Err(FormError::IdentifierLocked);
            }
        }
        *self.form.field_mut(field) = value;
        Ok(())
    }

    /// Builds the record and emits `Save`.
    pub fn confirm(&self) -> Result<EditorSignal, FormError> {
        let mut record = self.form.to_record()?;
        if let EditorMode::Edit { identifier } = &self.mode {
            record.identifier = identifier.clone();
        }
        Ok(EditorSignal::Save(record))
    }

    pub fn cancel(&self) -> EditorSignal {
        EditorSignal::Close
    }
}

/// Parses `1500.5`, `1500,50`, `1.500`, `1.500,50` or `R$ 1.500,50`.
///
/// Dots followed by exact three-digit groups are thousands separators and a
/// comma is the decimal separator. A lone dot with any other digit count is a
/// decimal point (`1.5`). Mixed forms such as `1,500.50` are rejected.
pub fn parse_case_value(input: &str) -> Result<f64, FormError> {
    let invalid = || FormError::InvalidCaseValue(input.to_string());

    let cleaned: String = input
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Err(invalid());
    }

    let (units, decimals) = if let Some(caps) = GROUPED_AMOUNT_RE.captures(&cleaned) {
        (caps[1].replace('.', ""), caps.get(2))
    } else if let Some(caps) = COMMA_DECIMAL_RE.captures(&cleaned) {
        (caps[1].to_string(), caps.get(2))
    } else if let Some(caps) = DOT_DECIMAL_RE.captures(&cleaned) {
        (caps[1].to_string(), caps.get(2))
    } else {
        return Err(invalid());
    };
    let normalized = match decimals {
        Some(decimals) => format!("{units}.{}", decimals.as_str()),
        None => units,
    };

    let value: f64 = normalized.parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{parse_case_value, Editor, EditorMode, EditorSignal, FormError, FormField};
    use crate::model::processo::{Processo, ProcessoValidationError, StatusProcesso};

    fn existing() -> Processo {
        Processo {
            identifier: "0001".to_string(),
            claimant_name: "Carla Dias".to_string(),
            respondent_name: "Mercado W".to_string(),
            status: StatusProcesso::Active,
            case_value: 1500.5,
            filing_date: "2023-05-10".to_string(),
            city: "Natal".to_string(),
            state_code: "RN".to_string(),
            court_name: "3ª Vara".to_string(),
        }
    }

    fn fill(editor: &mut Editor) {
        let inputs = [
            (FormField::Identifier, "0002"),
            (FormField::Claimant, " Paulo Reis "),
            (FormField::Respondent, "Construtora V"),
            (FormField::Status, "Encerrado"),
            (FormField::CaseValue, "1.500,50"),
            (FormField::FilingDate, "2024-03-01"),
            (FormField::City, "Belém"),
            (FormField::StateCode, "pa"),
            (FormField::Court, "1ª Vara"),
        ];
        for (field, value) in inputs {
            editor.set_field(field, value).unwrap();
        }
    }

    #[test]
    fn parse_case_value_accepts_both_decimal_conventions() {
        assert_eq!(parse_case_value("1500.5").unwrap(), 1500.5);
        assert_eq!(parse_case_value("1500,50").unwrap(), 1500.5);
        assert_eq!(parse_case_value("1.500,50").unwrap(), 1500.5);
        assert_eq!(parse_case_value("R$ 2.000,00").unwrap(), 2000.0);
        assert!(matches!(
            parse_case_value("mil reais"),
            Err(FormError::InvalidCaseValue(_))
        ));
        assert!(parse_case_value("").is_err());
    }

    #[test]
    fn parse_case_value_reads_dot_groups_as_thousands() {
        assert_eq!(parse_case_value("1.500").unwrap(), 1500.0);
        assert_eq!(parse_case_value("R$ 1.500").unwrap(), 1500.0);
        assert_eq!(parse_case_value("1.500.000").unwrap(), 1_500_000.0);
        assert_eq!(parse_case_value("R$\u{a0}1.500.000,75").unwrap(), 1_500_000.75);
        assert_eq!(parse_case_value("1.5").unwrap(), 1.5);
        assert_eq!(parse_case_value("1,5").unwrap(), 1.5);
        assert_eq!(parse_case_value("-1.500,50").unwrap(), -1500.5);
    }

    #[test]
    fn parse_case_value_rejects_mixed_or_ambiguous_separators() {
        for input in ["1,500.50", "1.5.0", "1.50.000", "1.500,50,00", "1,500,000", ",50", "1."] {
            assert_eq!(
                parse_case_value(input),
                Err(FormError::InvalidCaseValue(input.to_string())),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn new_editor_confirms_trimmed_record() {
        let mut editor = Editor::open_new();
        assert_eq!(editor.mode(), &EditorMode::Create);
        fill(&mut editor);

        let EditorSignal::Save(record) = editor.confirm().unwrap() else {
            panic!("expected save signal");
        };
        assert_eq!(record.identifier, "0002");
        assert_eq!(record.claimant_name, "Paulo Reis");
        assert_eq!(record.status, StatusProcesso::Closed);
        assert_eq!(record.case_value, 1500.5);
        assert_eq!(record.state_code, "PA");
    }

    #[test]
    fn blank_form_fails_validation() {
        let editor = Editor::open_new();
        assert!(editor.confirm().is_err());

        let mut editor = Editor::open_new();
        fill(&mut editor);
        editor.set_field(FormField::Court, "   ").unwrap();
        assert_eq!(
            editor.confirm(),
            Err(FormError::Validation(ProcessoValidationError::EmptyField(
                "vara"
            )))
        );
    }

    #[test]
    fn edit_mode_prefills_and_locks_identifier() {
        let record = existing();
        let mut editor = Editor::open_edit(&record);
        assert_eq!(editor.form().case_value, "1500.5");
        assert_eq!(editor.form().status, "Ativo");

        assert_eq!(
            editor.set_field(FormField::Identifier, "9999"),
            Err(FormError::IdentifierLocked)
        );
        editor.set_field(FormField::Identifier, "0001").unwrap();
        editor.set_field(FormField::Status, "Encerrado").unwrap();

        let EditorSignal::Save(saved) = editor.confirm().unwrap() else {
            panic!("expected save signal");
        };
        assert_eq!(saved.identifier, "0001");
        assert_eq!(saved.status, StatusProcesso::Closed);
        assert_eq!(editor.cancel(), EditorSignal::Close);
    }

    #[test]
    fn identifier_lock_ignores_surrounding_whitespace_on_both_sides() {
        let mut record = existing();
        record.identifier = " 0001 ".to_string();
        let mut editor = Editor::open_edit(&record);

        editor.set_field(FormField::Identifier, "0001").unwrap();
        editor.set_field(FormField::Identifier, "0001  ").unwrap();
        assert_eq!(
            editor.set_field(FormField::Identifier, "0002"),
            Err(FormError::IdentifierLocked)
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut editor = Editor::open_edit(&existing());
        editor.set_field(FormField::Status, "Suspenso").unwrap();
        assert_eq!(
            editor.confirm(),
            Err(FormError::InvalidStatus("Suspenso".to_string()))
        );
    }

    #[test]
    fn field_keys_round_trip() {
        for field in FormField::ALL {
            assert_eq!(FormField::from_key(field.key()), Some(field));
        }
        assert_eq!(FormField::from_key("desconhecido"), None);
    }
}
