//! Domain model for legal-case records.
//!
//! # Responsibility
//! - Define the canonical record shape shared by store, views and editor.
//! - Own the JSON wire format used by the persistent slot and the fallback resource.
//!
//! # Invariants
//! - Every record is identified by its `identifier` (`numero` on the wire).
//! - Wire keys and status labels match the stored snapshots byte for byte.

pub mod processo;
