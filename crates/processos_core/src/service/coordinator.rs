//! Screen coordinator for the case list.
//!
//! # Responsibility
//! - Drive the load sequence and expose the resulting render phase.
//! - Route list intents and editor signals to record-store mutations.
//!
//! # Invariants
//! - Phase leaves `Loading` at most once, to `Ready` or `Failed`.
//! - Mutations are only accepted in `Ready`.
//! - A save routes to `update` when a record was selected for editing and to
//!   `create` otherwise.
//! - The editor stays open when confirm or save fails.

use crate::config::CoreConfig;
use crate::editor::form::{Editor, EditorSignal, FormError};
use crate::model::processo::Processo;
use crate::repo::slot_repo::SlotRepository;
use crate::source::RecordSource;
use crate::store::record_store::{LoadOutcome, RecordStore, StoreError, SubscriptionId};
use crate::view::list_view::{render_text_table, ListIntent, TableView};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Placeholder shown while the load sequence runs.
pub const LOADING_MESSAGE: &str = "Carregando processos...";
/// Page heading above the table.
pub const PAGE_TITLE: &str = "Gerenciamento de Processos";
/// Label of the action that opens a blank editor.
pub const ADD_BUTTON_LABEL: &str = "Adicionar Novo Processo";

pub type CoreResult<T> = Result<T, CoordinatorError>;

/// Coordinator failure.
#[derive(Debug)]
pub enum CoordinatorError {
    Store(StoreError),
    Form(FormError),
    /// The load sequence has not reached `Ready`.
    NotReady,
    /// An edit intent referenced a row that does not exist.
    RowOutOfRange { index: usize, len: usize },
    /// A new record reused an identifier already in the sequence.
    DuplicateIdentifier(String),
    /// Editor action without an open editor.
    EditorClosed,
}

impl Display for CoordinatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Form(err) => write!(f, "{err}"),
            Self::NotReady => write!(f, "records are not loaded"),
            Self::RowOutOfRange { index, len } => {
                write!(f, "row {index} out of range for {len} records")
            }
            Self::DuplicateIdentifier(identifier) => {
                write!(f, "a record with numero `{identifier}` already exists")
            }
            Self::EditorClosed => write!(f, "editor is not open"),
        }
    }
}

impl Error for CoordinatorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Form(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for CoordinatorError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<FormError> for CoordinatorError {
    fn from(value: FormError) -> Self {
        Self::Form(value)
    }
}

/// Render phase of the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderPhase {
    Loading,
    /// Fallback fetch failed; carries the message shown to the user.
    Failed(String),
    Ready,
}

/// What the screen shows right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Loading { message: &'static str },
    Error { message: String },
    Table {
        title: &'static str,
        table: TableView,
        editor_open: bool,
    },
}

impl Display for Screen {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading { message } => f.write_str(message),
            Self::Error { message } => write!(f, "Erro: {message}"),
            Self::Table { title, table, .. } => {
                writeln!(f, "{title}")?;
                writeln!(f)?;
                f.write_str(&render_text_table(table))
            }
        }
    }
}

/// Owns the store and the editor session for one screen.
pub struct Coordinator<R: SlotRepository> {
    store: RecordStore<R>,
    phase: RenderPhase,
    editor: Option<Editor>,
    selected: Option<Processo>,
}

impl<R: SlotRepository> Coordinator<R> {
    pub fn new(store: RecordStore<R>) -> Self {
        Self {
            store,
            phase: RenderPhase::Loading,
            editor: None,
            selected: None,
        }
    }

    /// Builds the store from `config` over `slot`.
    pub fn from_config(slot: R, config: &CoreConfig) -> Self {
        Self::new(RecordStore::new(
            slot,
            config.slot_key.clone(),
            config.store_policy,
        ))
    }

    /// Runs the load sequence.
    ///
    /// A failed fetch moves the phase to `Failed` and still returns `Ok`.
    ///
    /// # Errors
    /// Slot failures and a corrupt snapshot. These are fatal to startup and
    /// leave the phase at `Loading`.
    pub fn start(&mut self, source: &dyn RecordSource) -> CoreResult<()> {
        match self.store.load(source) {
            Ok(LoadOutcome::FetchFailed(message)) => {
                self.phase = RenderPhase::Failed(message);
                Ok(())
            }
            Ok(outcome) => {
                info!(
                    "event=screen_ready module=service status=ok outcome={:?}",
                    outcome
                );
                self.phase = RenderPhase::Ready;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn render(&self) -> Screen {
        match &self.phase {
            RenderPhase::Loading => Screen::Loading {
                message: LOADING_MESSAGE,
            },
            RenderPhase::Failed(message) => Screen::Error {
                message: message.clone(),
            },
            RenderPhase::Ready => Screen::Table {
                title: PAGE_TITLE,
                table: TableView::from_records(self.store.records()),
                editor_open: self.editor.is_some(),
            },
        }
    }

    /// Opens a blank editor.
    pub fn open_new(&mut self) -> CoreResult<()> {
        self.ensure_ready()?;
        self.selected = None;
        self.editor = Some(Editor::open_new());
        Ok(())
    }

    /// Applies a row intent: edit opens a pre-filled editor, delete removes.
    pub fn handle_intent(&mut self, intent: ListIntent) -> CoreResult<()> {
        self.ensure_ready()?;
        match intent {
            ListIntent::Edit(index) => {
                let record = self.store.get(index).cloned().ok_or(
                    CoordinatorError::RowOutOfRange {
                        index,
                        len: self.store.len(),
                    },
                )?;
                self.editor = Some(Editor::open_edit(&record));
                self.selected = Some(record);
            }
            ListIntent::Delete(identifier) => {
                let removed = self.store.delete(&identifier)?;
                info!(
                    "event=record_delete module=service status=ok removed={}",
                    removed
                );
            }
        }
        Ok(())
    }

    pub fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut Editor> {
        self.editor.as_mut()
    }

    /// Record chosen for editing, if any.
    pub fn selected(&self) -> Option<&Processo> {
        self.selected.as_ref()
    }

    /// Confirms the open editor and saves its record.
    ///
    /// On any error the editor stays open with its input.
    pub fn confirm_editor(&mut self) -> CoreResult<()> {
        let editor = self.editor.as_ref().ok_or(CoordinatorError::EditorClosed)?;
        match editor.confirm()? {
            EditorSignal::Save(record) => self.save(record),
            EditorSignal::Close => {
                self.close_editor();
                Ok(())
            }
        }
    }

    pub fn cancel_editor(&mut self) {
        if let Some(editor) = self.editor.as_ref() {
            if editor.cancel() == EditorSignal::Close {
                self.close_editor();
            }
        }
    }

    /// Saves a record: update when one was selected for editing, create
    /// otherwise. Closes the editor on success.
    pub fn save(&mut self, record: Processo) -> CoreResult<()> {
        self.ensure_ready()?;
        if self.selected.is_some() {
            if !self.store.update(record)? {
                warn!("event=record_update module=service status=skipped reason=no_match");
            }
        } else {
            if self.store.contains(&record.identifier) {
                return Err(CoordinatorError::DuplicateIdentifier(record.identifier));
            }
            self.store.create(record)?;
        }
        self.close_editor();
        Ok(())
    }

    /// Forwards to [`RecordStore::subscribe`].
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&[Processo]) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn phase(&self) -> &RenderPhase {
        &self.phase
    }

    pub fn store(&self) -> &RecordStore<R> {
        &self.store
    }

    pub fn records(&self) -> &[Processo] {
        self.store.records()
    }

    fn close_editor(&mut self) {
        self.editor = None;
        self.selected = None;
    }

    fn ensure_ready(&self) -> CoreResult<()> {
        if self.phase == RenderPhase::Ready {
            Ok(())
        } else {
            Err(CoordinatorError::NotReady)
        }
    }
}
