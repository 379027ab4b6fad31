//! Flutter-facing bindings for the Processos core.

pub mod api;
