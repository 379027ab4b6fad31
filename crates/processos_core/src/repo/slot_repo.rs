//! Persistent key-value slot contracts and implementations.
//!
//! # Responsibility
//! - Provide read/replace/clear access to named durable slots.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - A write fully replaces the previous value of the slot.
//! - Slot keys are non-empty and carry no surrounding whitespace.
//! - Values are opaque strings; decoding belongs to the store.

use crate::db::DbError;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::borrow::Borrow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for slot access.
#[derive(Debug)]
pub enum RepoError {
    InvalidKey(String),
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid slot key: `{key}`"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidKey(_) => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable named-slot storage.
pub trait SlotRepository {
    /// Returns the stored value, or `None` when the slot was never written.
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>>;
    /// Replaces the slot value.
    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()>;
    /// Removes the slot. Returns whether a value existed.
    fn clear_slot(&self, key: &str) -> RepoResult<bool>;
}

impl<T: SlotRepository + ?Sized> SlotRepository for &T {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).read_slot(key)
    }

    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).write_slot(key, value)
    }

    fn clear_slot(&self, key: &str) -> RepoResult<bool> {
        (**self).clear_slot(key)
    }
}

/// SQLite-backed slot repository over the `kv_slots` table.
///
/// Works over a borrowed `&Connection` for scoped use, or owns the
/// `Connection` when it must live as long as the process.
pub struct SqliteSlotRepository<C> {
    conn: C,
}

impl<C: Borrow<Connection>> SqliteSlotRepository<C> {
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    fn conn(&self) -> &Connection {
        self.conn.borrow()
    }
}

impl<C: Borrow<Connection>> SlotRepository for SqliteSlotRepository<C> {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        validate_key(key)?;
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM kv_slots WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()> {
        validate_key(key)?;
        self.conn().execute(
            "INSERT INTO kv_slots (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        debug!(
            "event=slot_write module=repo status=ok backend=sqlite bytes={}",
            value.len()
        );
        Ok(())
    }

    fn clear_slot(&self, key: &str) -> RepoResult<bool> {
        validate_key(key)?;
        let changed = self
            .conn()
            .execute("DELETE FROM kv_slots WHERE key = ?1;", [key])?;
        Ok(changed > 0)
    }
}

/// Process-local slot repository for shells without a database.
#[derive(Debug, Default)]
pub struct MemorySlotRepository {
    slots: RefCell<HashMap<String, String>>,
}

impl MemorySlotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository with one slot already written.
    pub fn with_slot(key: impl Into<String>, value: impl Into<String>) -> Self {
        let repo = Self::new();
        repo.slots.borrow_mut().insert(key.into(), value.into());
        repo
    }
}

impl SlotRepository for MemorySlotRepository {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        validate_key(key)?;
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()> {
        validate_key(key)?;
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear_slot(&self, key: &str) -> RepoResult<bool> {
        validate_key(key)?;
        Ok(self.slots.borrow_mut().remove(key).is_some())
    }
}

fn validate_key(key: &str) -> RepoResult<()> {
    if key.is_empty() || key.trim() != key {
        return Err(RepoError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{MemorySlotRepository, RepoError, SlotRepository};

    #[test]
    fn memory_slot_replaces_and_clears() {
        let repo = MemorySlotRepository::new();
        assert_eq!(repo.read_slot("processos").unwrap(), None);

        repo.write_slot("processos", "[1]").unwrap();
        repo.write_slot("processos", "[2]").unwrap();
        assert_eq!(repo.read_slot("processos").unwrap().as_deref(), Some("[2]"));

        assert!(repo.clear_slot("processos").unwrap());
        assert!(!repo.clear_slot("processos").unwrap());
        assert_eq!(repo.read_slot("processos").unwrap(), None);
    }

    #[test]
    fn rejects_blank_or_padded_keys() {
        let repo = MemorySlotRepository::new();
        assert!(matches!(repo.read_slot(""), Err(RepoError::InvalidKey(_))));
        assert!(matches!(
            repo.write_slot(" processos", "[]"),
            Err(RepoError::InvalidKey(_))
        ));
    }
}
