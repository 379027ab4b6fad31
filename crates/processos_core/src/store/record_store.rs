//! In-memory record sequence mirrored to a persistent slot.
//!
//! # Responsibility
//! - Run the one-time load sequence: slot first, fallback source second.
//! - Apply create/update/delete and keep the slot snapshot in sync.
//! - Publish the new sequence to subscribers after every change.
//!
//! # Invariants
//! - Mutation methods are the only write path to the sequence.
//! - Ordering is insertion order; `update` keeps the element's position.
//! - After a mutation the slot holds the full sequence, except that an empty
//!   result is not written unless `StorePolicy::persist_empty_snapshot` is set.
//! - Subscribers run synchronously, before the mutating call returns.

use crate::model::processo::{parse_records, records_to_json, Processo};
use crate::repo::slot_repo::{RepoError, SlotRepository};
use crate::source::RecordSource;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default slot key holding the serialized record sequence.
pub const DEFAULT_SLOT_KEY: &str = "processos";

pub type StoreResult<T> = Result<T, StoreError>;

/// Record-store failure.
#[derive(Debug)]
pub enum StoreError {
    /// Slot access failed.
    Repo(RepoError),
    /// Persisted snapshot exists but is not a record array. Fatal to startup.
    CorruptSnapshot(String),
    /// Sequence could not be serialized for the slot.
    Encode(String),
    /// `load` was called a second time.
    AlreadyLoaded,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::CorruptSnapshot(message) => {
                write!(f, "persisted snapshot is not a valid record array: {message}")
            }
            Self::Encode(message) => write!(f, "cannot encode records: {message}"),
            Self::AlreadyLoaded => write!(f, "record store was already loaded"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::CorruptSnapshot(_) | Self::Encode(_) | Self::AlreadyLoaded => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Persistence policy knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StorePolicy {
    /// Write `[]` when a mutation empties the sequence.
    ///
    /// Off by default: deleting the last record leaves the previous snapshot in
    /// the slot, which is what existing stored data expects.
    pub persist_empty_snapshot: bool,
}

/// Result of the load sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Sequence restored from the slot.
    FromSlot { records: usize },
    /// Slot was empty; sequence fetched from the fallback and persisted.
    Fetched { records: usize },
    /// Slot was empty and the fallback failed. Carries the display message.
    FetchFailed(String),
}

/// Handle returned by [`RecordStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&[Processo]) + Send>;

/// Owned record store. See module docs for invariants.
pub struct RecordStore<R: SlotRepository> {
    slot: R,
    slot_key: String,
    policy: StorePolicy,
    records: Vec<Processo>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    loaded: bool,
}

impl<R: SlotRepository> RecordStore<R> {
    /// Creates an empty, not yet loaded store.
    pub fn new(slot: R, slot_key: impl Into<String>, policy: StorePolicy) -> Self {
        Self {
            slot,
            slot_key: slot_key.into(),
            policy,
            records: Vec::new(),
            listeners: Vec::new(),
            next_subscription: 0,
            loaded: false,
        }
    }

    /// Creates a store on the default `processos` slot with default policy.
    pub fn with_default_slot(slot: R) -> Self {
        Self::new(slot, DEFAULT_SLOT_KEY, StorePolicy::default())
    }

    /// Runs the load sequence once.
    ///
    /// An absent or blank slot triggers `source.fetch()`. A successful fetch is
    /// written to the slot as-is, even when empty.
    ///
    /// # Errors
    /// - `CorruptSnapshot` when the slot holds malformed JSON.
    /// - `Repo`/`Encode` when the slot cannot be read or written.
    /// - `AlreadyLoaded` on a second call.
    ///
    /// A failed fetch is not an error; it is reported as
    /// `LoadOutcome::FetchFailed`.
    pub fn load(&mut self, source: &dyn RecordSource) -> StoreResult<LoadOutcome> {
        if self.loaded {
            return Err(StoreError::AlreadyLoaded);
        }
        self.loaded = true;

        let stored = self
            .slot
            .read_slot(&self.slot_key)?
            .filter(|snapshot| !snapshot.is_empty());

        if let Some(snapshot) = stored {
            let records = parse_records(&snapshot).map_err(|err| {
                error!(
                    "event=store_load module=store status=error origin=slot error_code=corrupt_snapshot"
                );
                StoreError::CorruptSnapshot(err.to_string())
            })?;
            self.records = records;
            info!(
                "event=store_load module=store status=ok origin=slot records={}",
                self.records.len()
            );
            self.publish();
            return Ok(LoadOutcome::FromSlot {
                records: self.records.len(),
            });
        }

        info!(
            "event=store_load module=store status=start origin=fallback source={}",
            source.describe()
        );
        match source.fetch() {
            Ok(records) => {
                self.records = records;
                self.write_snapshot()?;
                info!(
                    "event=store_load module=store status=ok origin=fallback records={}",
                    self.records.len()
                );
                self.publish();
                Ok(LoadOutcome::Fetched {
                    records: self.records.len(),
                })
            }
            Err(err) => {
                warn!(
                    "event=store_load module=store status=error origin=fallback error={}",
                    err
                );
                Ok(LoadOutcome::FetchFailed(err.to_string()))
            }
        }
    }

    /// Appends a record. Duplicate identifiers are accepted.
    pub fn create(&mut self, record: Processo) -> StoreResult<()> {
        self.records.push(record);
        self.commit("create")
    }

    /// Replaces the first record whose identifier matches, keeping its position.
    ///
    /// Returns `false` (and leaves the sequence unchanged) when nothing matched.
    pub fn update(&mut self, record: Processo) -> StoreResult<bool> {
        let matched = match self
            .records
            .iter_mut()
            .find(|existing| existing.has_identifier(&record.identifier))
        {
            Some(existing) => {
                *existing = record;
                true
            }
            None => false,
        };
        self.commit("update")?;
        Ok(matched)
    }

    /// Removes every record with the identifier. Returns how many were removed.
    pub fn delete(&mut self, identifier: &str) -> StoreResult<usize> {
        let before = self.records.len();
        self.records.retain(|record| !record.has_identifier(identifier));
        let removed = before - self.records.len();
        self.commit("delete")?;
        Ok(removed)
    }

    /// Registers a listener that receives the sequence after every change.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&[Processo]) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn records(&self) -> &[Processo] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Processo> {
        self.records.get(index)
    }

    pub fn find(&self, identifier: &str) -> Option<&Processo> {
        self.records
            .iter()
            .find(|record| record.has_identifier(identifier))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.find(identifier).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn slot_key(&self) -> &str {
        &self.slot_key
    }

    pub fn policy(&self) -> StorePolicy {
        self.policy
    }

    /// Borrow of the underlying slot repository.
    pub fn slot(&self) -> &R {
        &self.slot
    }

    fn commit(&mut self, operation: &'static str) -> StoreResult<()> {
        debug!(
            "event=store_mutation module=store status=ok op={} records={}",
            operation,
            self.records.len()
        );
        self.publish();
        self.sync_slot()
    }

    fn sync_slot(&self) -> StoreResult<()> {
        if self.records.is_empty() && !self.policy.persist_empty_snapshot {
            debug!("event=slot_write module=store status=skipped reason=empty_sequence");
            return Ok(());
        }
        self.write_snapshot()
    }

    fn write_snapshot(&self) -> StoreResult<()> {
        let json =
            records_to_json(&self.records).map_err(|err| StoreError::Encode(err.to_string()))?;
        self.slot.write_slot(&self.slot_key, &json).map_err(|err| {
            error!("event=slot_write module=store status=error error={}", err);
            StoreError::from(err)
        })
    }

    fn publish(&mut self) {
        let records = &self.records;
        for (_, listener) in self.listeners.iter_mut() {
            listener(records);
        }
    }
}
