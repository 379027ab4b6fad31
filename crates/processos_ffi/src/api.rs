//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the case list, editor save and delete flows to Dart via FRB.
//! - Flatten core types into plain string/number envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One session lives for the whole process: the connection is opened and the
//!   load sequence runs on first use, then every call reuses that coordinator.
//! - A failed fallback fetch is final for the process; later calls report the
//!   same error instead of fetching again.
//! - Calls are serialized by the session lock.

use log::{info, warn};
use processos_core::db::{open_db, Connection};
use processos_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    BadgeTone, Coordinator, CoreConfig, FormField, ListIntent, RenderPhase, Screen,
    SqliteSlotRepository, TableRow,
};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

const DB_FILE_NAME: &str = "processos.sqlite3";
const ENV_DB_PATH: &str = "PROCESSOS_DB_PATH";

static SESSION: OnceLock<Mutex<FfiSession>> = OnceLock::new();

type SessionCoordinator = Coordinator<SqliteSlotRepository<Connection>>;

struct FfiSettings {
    db_path: PathBuf,
    core: CoreConfig,
}

impl FfiSettings {
    /// `PROCESSOS_DB_PATH` plus the core variables read by [`CoreConfig::from_env`].
    fn from_env() -> Self {
        let db_path = std::env::var(ENV_DB_PATH)
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DB_FILE_NAME));
        Self {
            db_path,
            core: CoreConfig::from_env(),
        }
    }
}

/// Process-lifetime state behind the exported calls.
struct FfiSession {
    settings: FfiSettings,
    /// `None` until the load sequence has run to a phase.
    coordinator: Option<SessionCoordinator>,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and the error message on failure.
/// Repeating the call with the same `level + log_dir` is a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One table row, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessoRowItem {
    /// Position in the current sequence.
    pub index: u32,
    pub numero: String,
    pub reclamante: String,
    pub reclamada: String,
    /// `Ativo` or `Encerrado`.
    pub status: String,
    /// `success` or `danger`.
    pub status_tone: String,
    /// pt-BR currency, e.g. `R$ 1.500,50`.
    pub valor_causa: String,
    /// `dd/mm/yyyy`.
    pub data_ajuizamento: String,
    /// `<cidade> / <uf>`.
    pub local: String,
    pub vara: String,
}

/// List screen envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessosListResponse {
    /// `false` when the records could not be loaded.
    pub ok: bool,
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<ProcessoRowItem>,
    /// Empty on success; user-facing error text otherwise.
    pub message: String,
}

/// Raw editor input. Every field is a string, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessoFormInput {
    pub numero: String,
    pub reclamante: String,
    pub reclamada: String,
    pub status: String,
    pub valor_causa: String,
    pub data_ajuizamento: String,
    pub cidade: String,
    pub uf: String,
    pub vara: String,
}

impl ProcessoFormInput {
    fn entries(&self) -> [(FormField, &str); 9] {
        [
            (FormField::Identifier, self.numero.as_str()),
            (FormField::Claimant, self.reclamante.as_str()),
            (FormField::Respondent, self.reclamada.as_str()),
            (FormField::Status, self.status.as_str()),
            (FormField::CaseValue, self.valor_causa.as_str()),
            (FormField::FilingDate, self.data_ajuizamento.as_str()),
            (FormField::City, self.cidade.as_str()),
            (FormField::StateCode, self.uf.as_str()),
            (FormField::Court, self.vara.as_str()),
        ]
    }
}

/// Mutation envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessoActionResponse {
    pub ok: bool,
    /// Identifier affected by the call.
    pub numero: Option<String>,
    pub message: String,
}

impl ProcessoActionResponse {
    fn success(message: impl Into<String>, numero: String) -> Self {
        Self {
            ok: true,
            numero: Some(numero),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            numero: None,
            message: message.into(),
        }
    }
}

/// Loads the case list, fetching the seed resource on first use.
///
/// # FFI contract
/// - Sync call; the first call may block on the fallback fetch.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn processos_list() -> ProcessosListResponse {
    session().list()
}

/// Saves editor input: updates the record with the same `numero` when
/// `editing` is set, creates a new record otherwise.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; validation failures come back as `ok = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn processos_save(input: ProcessoFormInput, editing: bool) -> ProcessoActionResponse {
    session().save(input, editing)
}

/// Removes every record with `numero`.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; deleting an unknown `numero` succeeds and changes nothing.
#[flutter_rust_bridge::frb(sync)]
pub fn processos_delete(numero: String) -> ProcessoActionResponse {
    session().delete(numero)
}

fn session() -> MutexGuard<'static, FfiSession> {
    SESSION
        .get_or_init(|| Mutex::new(FfiSession::new(FfiSettings::from_env())))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

impl FfiSession {
    fn new(settings: FfiSettings) -> Self {
        Self {
            settings,
            coordinator: None,
        }
    }

    fn list(&mut self) -> ProcessosListResponse {
        let result = self.with_coordinator(|coordinator| Ok(coordinator.render()));
        match result {
            Ok(Screen::Table { title, table, .. }) => ProcessosListResponse {
                ok: true,
                title: title.to_string(),
                headers: table.headers.iter().map(|h| h.to_string()).collect(),
                rows: table.rows.iter().map(to_row_item).collect(),
                message: String::new(),
            },
            Ok(screen) => list_failure(screen.to_string()),
            Err(err) => list_failure(err),
        }
    }

    fn save(&mut self, input: ProcessoFormInput, editing: bool) -> ProcessoActionResponse {
        let numero = input.numero.trim().to_string();
        let result = self.with_coordinator(|coordinator| {
            ensure_loaded(coordinator.phase())?;
            if editing {
                let index = coordinator
                    .records()
                    .iter()
                    .position(|record| record.has_identifier(&numero))
                    .ok_or_else(|| format!("processo `{numero}` not found"))?;
                coordinator
                    .handle_intent(ListIntent::Edit(index))
                    .map_err(|err| err.to_string())?;
            } else {
                coordinator.open_new().map_err(|err| err.to_string())?;
            }

            let applied = apply_input(coordinator, &input);
            if applied.is_err() {
                coordinator.cancel_editor();
            }
            applied
        });

        match result {
            Ok(()) if editing => ProcessoActionResponse::success("Processo atualizado.", numero),
            Ok(()) => ProcessoActionResponse::success("Processo criado.", numero),
            Err(err) => {
                warn!("event=ffi_call module=ffi status=error op=processos_save editing={editing}");
                ProcessoActionResponse::failure(format!("processos_save failed: {err}"))
            }
        }
    }

    fn delete(&mut self, numero: String) -> ProcessoActionResponse {
        let numero = numero.trim().to_string();
        let result = self.with_coordinator(|coordinator| {
            ensure_loaded(coordinator.phase())?;
            coordinator
                .handle_intent(ListIntent::Delete(numero.clone()))
                .map_err(|err| err.to_string())
        });

        match result {
            Ok(()) => ProcessoActionResponse::success("Processo removido.", numero),
            Err(err) => {
                warn!("event=ffi_call module=ffi status=error op=processos_delete");
                ProcessoActionResponse::failure(format!("processos_delete failed: {err}"))
            }
        }
    }

    /// Runs `f` against the session coordinator, starting it on first use.
    ///
    /// Once the load sequence reaches `Ready` or `Failed` the coordinator is
    /// kept; only a startup error (database or corrupt snapshot) leaves the
    /// session unopened so the next call starts over.
    fn with_coordinator<T>(
        &mut self,
        f: impl FnOnce(&mut SessionCoordinator) -> Result<T, String>,
    ) -> Result<T, String> {
        if self.coordinator.is_none() {
            self.coordinator = Some(start_coordinator(&self.settings)?);
        }
        let coordinator = self
            .coordinator
            .as_mut()
            .ok_or_else(|| "session is not open".to_string())?;
        f(coordinator)
    }
}

fn start_coordinator(settings: &FfiSettings) -> Result<SessionCoordinator, String> {
    let conn = open_db(&settings.db_path).map_err(|err| format!("database open failed: {err}"))?;
    let mut coordinator =
        Coordinator::from_config(SqliteSlotRepository::new(conn), &settings.core);
    let source = settings.core.deferred_fallback_source();
    coordinator
        .start(&source)
        .map_err(|err| format!("startup failed: {err}"))?;
    info!(
        "event=ffi_session module=ffi status=started phase={}",
        phase_label(coordinator.phase())
    );
    Ok(coordinator)
}

fn apply_input(coordinator: &mut SessionCoordinator, input: &ProcessoFormInput) -> Result<(), String> {
    let editor = coordinator
        .editor_mut()
        .ok_or_else(|| "editor did not open".to_string())?;
    for (field, value) in input.entries() {
        editor
            .set_field(field, value)
            .map_err(|err| err.to_string())?;
    }
    coordinator.confirm_editor().map_err(|err| err.to_string())
}

fn phase_label(phase: &RenderPhase) -> &'static str {
    match phase {
        RenderPhase::Loading => "loading",
        RenderPhase::Failed(_) => "failed",
        RenderPhase::Ready => "ready",
    }
}

fn list_failure(message: String) -> ProcessosListResponse {
    ProcessosListResponse {
        ok: false,
        title: String::new(),
        headers: Vec::new(),
        rows: Vec::new(),
        message,
    }
}

fn ensure_loaded(phase: &RenderPhase) -> Result<(), String> {
    match phase {
        RenderPhase::Ready => Ok(()),
        RenderPhase::Failed(message) => Err(format!("Erro: {message}")),
        RenderPhase::Loading => Err("records are not loaded".to_string()),
    }
}

fn to_row_item(row: &TableRow) -> ProcessoRowItem {
    ProcessoRowItem {
        index: u32::try_from(row.index).unwrap_or(u32::MAX),
        numero: row.identifier.clone(),
        reclamante: row.claimant.clone(),
        reclamada: row.respondent.clone(),
        status: row.status.label.to_string(),
        status_tone: tone_label(row.status.tone).to_string(),
        valor_causa: row.case_value.clone(),
        data_ajuizamento: row.filing_date.clone(),
        local: row.location.clone(),
        vara: row.court.clone(),
    }
}

fn tone_label(tone: BadgeTone) -> &'static str {
    match tone {
        BadgeTone::Success => "success",
        BadgeTone::Danger => "danger",
    }
}
