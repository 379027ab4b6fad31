//! Local SQLite file that holds the `processos` slot.
//!
//! A shell opens it once through [`open_db`]; the returned connection is
//! already migrated and ready for [`crate::repo::slot_repo::SqliteSlotRepository`].
//! The schema is a single key/value table, versioned with `PRAGMA user_version`
//! (see [`migrations`]). A file stamped by a newer build is refused rather than
//! read, so an older shell never rewrites a slot it does not understand.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
pub use rusqlite::Connection;

pub type DbResult<T> = Result<T, DbError>;

/// Failure to open or prepare the slot database.
#[derive(Debug)]
pub enum DbError {
    /// File missing permissions, locked by another process, or not SQLite.
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    /// Pragma, migration or statement failure on an open connection.
    Sqlite(rusqlite::Error),
    /// Slot file was stamped by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "cannot open slot database `{}`: {source}", path.display())
            }
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "slot database schema v{db_version} requires a newer build (this build reads up to v{latest_supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
