//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable slot contract used by the record store.
//! - Isolate SQLite query details from store/coordinator orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`InvalidKey`) in addition to DB
//!   transport errors.

pub mod slot_repo;
