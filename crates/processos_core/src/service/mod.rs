//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store, view and editor into screen-level operations.
//! - Keep shells (FFI, CLI) decoupled from storage details.

pub mod coordinator;
