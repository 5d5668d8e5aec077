//! The engine's public surface: owns the view state, dispatches evaluation
//! to the local processor or the remote source, and emits table updates.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::domain::entities::table::{
    FilterClause, Record, SortClause, TableConfig, TableRequest, TableUpdate, ViewState,
};
use crate::domain::process::process;
use crate::usecase::ports::source::PageSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    #[error("load_all is only available in local mode")]
    NotLocalMode,
}

enum Mode {
    Local { dataset: Mutex<Vec<Record>> },
    Remote { source: Arc<dyn PageSource> },
}

/// State machine over one fixed mode. All view-state mutation goes through
/// the operations below; each bumps a request generation, and only the most
/// recent generation's outcome is ever emitted.
pub struct TableController {
    config: TableConfig,
    mode: Mode,
    state: Mutex<ViewState>,
    generation: AtomicU64,
    updates: watch::Sender<TableUpdate>,
}

impl TableController {
    /// Engine that holds the entire dataset in memory and processes it
    /// itself. Populate the cache with [`TableController::load_all`].
    pub fn local(config: TableConfig) -> Self {
        Self::build(
            config,
            Mode::Local {
                dataset: Mutex::new(Vec::new()),
            },
        )
    }

    /// Engine that delegates filter/sort/paginate to a remote source, one
    /// page at a time.
    pub fn remote(config: TableConfig, source: Arc<dyn PageSource>) -> Self {
        Self::build(config, Mode::Remote { source })
    }

    fn build(config: TableConfig, mode: Mode) -> Self {
        let state = ViewState::new(config.page_size);
        let (updates, _) = watch::channel(TableUpdate::default());
        Self {
            config,
            mode,
            state: Mutex::new(state),
            generation: AtomicU64::new(0),
            updates,
        }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn is_local(&self) -> bool {
        matches!(self.mode, Mode::Local { .. })
    }

    /// Outbound channel to the UI collaborator; always holds the latest
    /// emission.
    pub fn subscribe(&self) -> watch::Receiver<TableUpdate> {
        self.updates.subscribe()
    }

    pub fn view_state(&self) -> ViewState {
        self.state.lock().unwrap().clone()
    }

    pub async fn handle(&self, request: TableRequest) {
        match request {
            TableRequest::PageChange(page) => self.set_page(page).await,
            TableRequest::FilterChange(filters) => self.set_filters(filters).await,
            TableRequest::SortChange(sorters) => self.set_sorters(sorters).await,
            TableRequest::Refresh => self.refresh().await,
        }
    }

    pub async fn set_page(&self, page: i64) {
        let (snapshot, generation) = self.mutate(|state| state.page = page.max(1));
        self.evaluate(snapshot, generation).await;
    }

    pub async fn set_filters(&self, filters: Vec<FilterClause>) {
        let (snapshot, generation) = self.mutate(|state| {
            state.filters = filters;
            state.page = 1;
        });
        self.evaluate(snapshot, generation).await;
    }

    pub async fn set_sorters(&self, sorters: Vec<SortClause>) {
        let (snapshot, generation) = self.mutate(|state| {
            state.sorters = sorters;
            state.page = 1;
        });
        self.evaluate(snapshot, generation).await;
    }

    /// Re-run evaluation against the current state without mutating it.
    pub async fn refresh(&self) {
        let (snapshot, generation) = self.mutate(|_| {});
        self.evaluate(snapshot, generation).await;
    }

    /// Replace the cached dataset (local mode only) and re-evaluate from
    /// page 1.
    pub async fn load_all(&self, records: Vec<Record>) -> Result<(), ControlError> {
        let Mode::Local { dataset } = &self.mode else {
            return Err(ControlError::NotLocalMode);
        };
        *dataset.lock().unwrap() = records;

        let (snapshot, generation) = self.mutate(|state| state.page = 1);
        self.evaluate(snapshot, generation).await;
        Ok(())
    }

    fn mutate(&self, apply: impl FnOnce(&mut ViewState)) -> (ViewState, u64) {
        let mut state = self.state.lock().unwrap();
        apply(&mut state);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        (state.clone(), generation)
    }

    async fn evaluate(&self, state: ViewState, generation: u64) {
        match &self.mode {
            Mode::Local { dataset } => {
                let result = {
                    let records = dataset.lock().unwrap();
                    process(
                        &records,
                        &state.filters,
                        &state.sorters,
                        state.page,
                        state.page_size,
                    )
                };
                self.emit(
                    generation,
                    TableUpdate {
                        rows: result.rows,
                        total_rows: result.total_rows,
                        is_loading: false,
                        error: None,
                    },
                );
            }
            Mode::Remote { source } => {
                if self.is_current(generation) {
                    self.updates.send_modify(|update| {
                        update.is_loading = true;
                        update.error = None;
                    });
                }

                let update = match source.fetch_page(&state).await {
                    Ok(result) => TableUpdate {
                        rows: result.rows,
                        total_rows: result.total_rows,
                        is_loading: false,
                        error: None,
                    },
                    Err(err) => {
                        tracing::warn!(%err, "page evaluation failed");
                        TableUpdate {
                            rows: Vec::new(),
                            total_rows: 0,
                            is_loading: false,
                            error: Some(err.to_string()),
                        }
                    }
                };
                self.emit(generation, update);
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn emit(&self, generation: u64, update: TableUpdate) {
        if !self.is_current(generation) {
            tracing::debug!(generation, "dropping superseded evaluation result");
            return;
        }
        self.updates.send_replace(update);
    }
}
