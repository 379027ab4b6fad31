//! Record store: the owned, slot-mirrored record sequence.
//!
//! # Responsibility
//! - Hold the only mutable copy of the record sequence.
//! - Sequence the initial load (slot, then one-time fallback fetch).
//!
//! # See also
//! - `service::coordinator` for intent routing on top of the store.

pub mod record_store;

pub use record_store::DEFAULT_SLOT_KEY;
