//! Core domain logic for the Processos case manager.
//! This crate is the single source of truth for record-store invariants.

pub mod config;
pub mod db;
pub mod editor;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod source;
pub mod store;
pub mod view;

pub use config::{
    CoreConfig, DEFAULT_FALLBACK_LOCATION, ENV_ASSET_BASE, ENV_FALLBACK_LOCATION,
    ENV_FETCH_TIMEOUT_MS,
};
pub use editor::form::{Editor, EditorMode, EditorSignal, FormError, FormField, ProcessoForm};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::processo::{
    parse_records, records_to_json, Processo, ProcessoValidationError, StatusProcesso,
};
pub use repo::slot_repo::{
    MemorySlotRepository, RepoError, RepoResult, SlotRepository, SqliteSlotRepository,
};
pub use service::coordinator::{
    Coordinator, CoordinatorError, CoreResult, RenderPhase, Screen, ADD_BUTTON_LABEL,
    LOADING_MESSAGE, PAGE_TITLE,
};
pub use source::{
    resolve_source, FetchError, FetchResult, FileRecordSource, HttpRecordSource, RecordSource,
    UnresolvedRecordSource,
};
pub use store::record_store::{
    LoadOutcome, RecordStore, StoreError, StorePolicy, StoreResult, SubscriptionId,
};
pub use view::list_view::{
    format_brl, format_date_br, render_text_table, BadgeTone, ListIntent, StatusBadge, TableRow,
    TableView, TABLE_HEADERS,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
