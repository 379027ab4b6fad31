//! Fallback record sources used when the persistent slot is empty.
//!
//! # Responsibility
//! - Fetch the static seed resource exactly once per load.
//! - Map transport, status and decode failures into one human-readable error.
//!
//! # Invariants
//! - Sources never retry; the caller decides what a failure means.
//! - A non-2xx response is reported as `Erro HTTP: <status>`.

mod file;
mod http;

pub use file::FileRecordSource;
pub use http::HttpRecordSource;

use crate::model::processo::Processo;
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub type FetchResult<T> = Result<T, FetchError>;

/// Failure of the one-time fallback fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Server answered with a non-success status code.
    HttpStatus(u16),
    /// Request could not be sent or the body could not be read.
    Network(String),
    /// Body is not a JSON array of records.
    Decode(String),
    /// Local static file could not be read.
    Io(String),
    /// Location cannot be turned into a source.
    InvalidLocation(String),
    /// Site-relative location with no asset base to resolve it against.
    MissingAssetBase(String),
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpStatus(status) => write!(f, "Erro HTTP: {status}"),
            Self::Network(message) => write!(f, "Erro de rede: {message}"),
            Self::Decode(message) => write!(f, "Resposta inválida: {message}"),
            Self::Io(message) => write!(f, "Erro de leitura: {message}"),
            Self::InvalidLocation(location) => write!(f, "Origem inválida: `{location}`"),
            Self::MissingAssetBase(location) => write!(
                f,
                "Origem `{location}` sem base configurada (defina PROCESSOS_ASSET_BASE ou PROCESSOS_FALLBACK_URL)"
            ),
        }
    }
}

impl Error for FetchError {}

/// One-shot provider of the seed record sequence.
pub trait RecordSource {
    /// Fetches the full record sequence.
    fn fetch(&self) -> FetchResult<Vec<Processo>>;

    /// Short description for diagnostics (URL or path).
    fn describe(&self) -> String;
}

impl<T: RecordSource + ?Sized> RecordSource for Box<T> {
    fn fetch(&self) -> FetchResult<Vec<Processo>> {
        (**self).fetch()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Stand-in for a location that could not be resolved.
///
/// Fetching reports the resolution error, so it only surfaces when the slot is
/// empty and the seed is actually needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedRecordSource {
    error: FetchError,
}

impl UnresolvedRecordSource {
    pub fn new(error: FetchError) -> Self {
        Self { error }
    }
}

impl RecordSource for UnresolvedRecordSource {
    fn fetch(&self) -> FetchResult<Vec<Processo>> {
        error!(
            "event=fallback_fetch module=source status=error kind=unresolved error={}",
            self.error
        );
        Err(self.error.clone())
    }

    fn describe(&self) -> String {
        format!("unresolved ({})", self.error)
    }
}

/// Picks an HTTP source for `http(s)://` locations and a file source otherwise.
///
/// # Errors
/// - Returns `InvalidLocation` for blank input.
/// - Returns `Network` when the HTTP client cannot be built.
pub fn resolve_source(
    location: &str,
    timeout: Option<Duration>,
) -> FetchResult<Box<dyn RecordSource>> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(FetchError::InvalidLocation(location.to_string()));
    }

    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(Box::new(HttpRecordSource::new(trimmed, timeout)?))
    } else {
        Ok(Box::new(FileRecordSource::new(trimmed)))
    }
}

fn decode_body(body: &str) -> FetchResult<Vec<Processo>> {
    crate::model::processo::parse_records(body).map_err(|err| FetchError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{resolve_source, FetchError};

    #[test]
    fn http_status_message_is_user_facing() {
        assert_eq!(FetchError::HttpStatus(500).to_string(), "Erro HTTP: 500");
    }

    #[test]
    fn resolve_source_dispatches_on_scheme() {
        let http = resolve_source("https://example.com/processos.json", None).unwrap();
        assert_eq!(http.describe(), "https://example.com/processos.json");

        let file = resolve_source("public/processos.json", None).unwrap();
        assert!(file.describe().ends_with("processos.json"));

        assert!(matches!(
            resolve_source("   ", None),
            Err(FetchError::InvalidLocation(_))
        ));
    }
}
