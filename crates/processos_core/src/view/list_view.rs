//! Table projection of the record sequence.
//!
//! # Responsibility
//! - Turn records into display rows (pt-BR currency and date formatting).
//! - Describe the two intents a row can emit: edit-at-index, delete-by-identifier.
//!
//! # Invariants
//! - Rendering is pure: nothing here mutates records or the store.
//! - Row `index` is the record's position in the sequence at render time.

use crate::model::processo::{parse_filing_date, Processo, StatusProcesso};

/// Column headers, in display order.
pub const TABLE_HEADERS: [&str; 9] = [
    "Número",
    "Reclamante",
    "Reclamada",
    "Status",
    "Valor da Causa",
    "Data",
    "Cidade/UF",
    "Vara",
    "Ações",
];

const INVALID_DATE: &str = "Invalid Date";
const NBSP: char = '\u{a0}';

/// User intent emitted by a table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListIntent {
    /// Open the editor on the record at this position.
    Edit(usize),
    /// Remove records with this identifier.
    Delete(String),
}

/// Visual tone of the status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: &'static str,
    pub tone: BadgeTone,
}

impl From<StatusProcesso> for StatusBadge {
    fn from(status: StatusProcesso) -> Self {
        let tone = match status {
            StatusProcesso::Closed => BadgeTone::Danger,
            StatusProcesso::Active => BadgeTone::Success,
        };
        Self {
            label: status.label(),
            tone,
        }
    }
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub index: usize,
    pub identifier: String,
    pub claimant: String,
    pub respondent: String,
    pub status: StatusBadge,
    pub case_value: String,
    pub filing_date: String,
    /// `"<cidade> / <uf>"`.
    pub location: String,
    pub court: String,
}

impl TableRow {
    pub fn from_record(index: usize, record: &Processo) -> Self {
        Self {
            index,
            identifier: record.identifier.clone(),
            claimant: record.claimant_name.clone(),
            respondent: record.respondent_name.clone(),
            status: StatusBadge::from(record.status),
            case_value: format_brl(record.case_value),
            filing_date: format_date_br(&record.filing_date),
            location: format!("{} / {}", record.city, record.state_code),
            court: record.court_name.clone(),
        }
    }

    pub fn edit_intent(&self) -> ListIntent {
        ListIntent::Edit(self.index)
    }

    pub fn delete_intent(&self) -> ListIntent {
        ListIntent::Delete(self.identifier.clone())
    }
}

/// Rendered table: fixed headers plus one row per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub headers: [&'static str; 9],
    pub rows: Vec<TableRow>,
}

impl TableView {
    pub fn from_records(records: &[Processo]) -> Self {
        Self {
            headers: TABLE_HEADERS,
            rows: records
                .iter()
                .enumerate()
                .map(|(index, record)| TableRow::from_record(index, record))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Formats an amount as Brazilian reais, e.g. `R$ 1.500,50` (non-breaking space).
pub fn format_brl(value: f64) -> String {
    let sign = if value.is_sign_negative() && value != 0.0 {
        "-"
    } else {
        ""
    };
    if value.is_nan() {
        return format!("R${NBSP}NaN");
    }
    if value.is_infinite() {
        return format!("{sign}R${NBSP}∞");
    }

    // Saturating cast; amounts beyond u64 cents are not meaningful here.
    let cents = (value.abs() * 100.0).round() as u64;
    let units = group_thousands(cents / 100);
    if cents == 0 {
        return format!("R${NBSP}0,00");
    }
    format!("{sign}R${NBSP}{units},{:02}", cents % 100)
}

/// Formats an ISO date as `dd/mm/yyyy`; unparseable input yields `Invalid Date`.
///
/// Only the calendar part is used, so the rendered day never shifts with the
/// local timezone.
pub fn format_date_br(iso: &str) -> String {
    match parse_filing_date(iso) {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    grouped
}

/// Plain-text rendering of the table for terminal shells.
pub fn render_text_table(view: &TableView) -> String {
    let cells: Vec<[String; 9]> = view
        .rows
        .iter()
        .map(|row| {
            [
                row.identifier.clone(),
                row.claimant.clone(),
                row.respondent.clone(),
                row.status.label.to_string(),
                row.case_value.replace(NBSP, " "),
                row.filing_date.clone(),
                row.location.clone(),
                row.court.clone(),
                format!("editar #{}", row.index),
            ]
        })
        .collect();

    let mut widths = view.headers.map(|header| header.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, view.headers.iter().copied(), &widths);
    let separator: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    push_line(&mut out, separator.iter().map(String::as_str), &widths);
    for row in &cells {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize; 9]) {
    let line = cells
        .zip(widths.iter())
        .map(|(cell, width)| {
            let padding = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join(" | ");
    out.push_str(line.trim_end());
    out.push('\n');
}
