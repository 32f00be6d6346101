//! Query-lifecycle controller.
//!
//! [`Console`] owns the query buffer and every piece of derived state. Actions
//! (typing, analyze, execute, template loads) are synchronous calls that may
//! spawn network requests; each spawned task reports back as a
//! [`Completion`] on one channel, and the console applies completions one at
//! a time. State therefore has a single writer and needs no locks.

mod analysis;
mod buffer;
mod debounce;
mod execution;
mod registry;
mod render;
mod suggestions;
mod templates;

pub use analysis::{AnalysisInvoker, AnalysisResult};
pub use buffer::QueryBuffer;
pub use debounce::DebounceTimer;
pub use execution::{
    ExecuteOutcome, ExecutionController, ExecutionResult, RefreshPlan, Submission,
    EMPTY_QUERY_MESSAGE,
};
pub use registry::DatabaseRegistry;
pub use render::{AnalysisView, CellValue, ResultGrid, ResultView, TokenLine};
pub use suggestions::{RequestToken, SuggestionController, SuggestionPhase};
pub use templates::Template;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, info};

use crate::api::{
    AnalyzeResponse, ApiClient, AutocompleteResponse, DatabasesResponse, ExecuteResponse,
    HealthResponse, TablesResponse,
};
use crate::error::{ConsoleError, Result};

/// Capacity of the completion channel.
const COMPLETION_CHANNEL_CAPACITY: usize = 64;

type Outcome<T> = std::result::Result<T, ConsoleError>;

/// A finished background task, delivered to the console.
#[derive(Debug)]
pub enum Completion {
    /// The debounce timer armed with this generation elapsed.
    DebounceElapsed { generation: u64 },
    Suggestions {
        token: RequestToken,
        outcome: Outcome<AutocompleteResponse>,
    },
    Analysis(Outcome<AnalyzeResponse>),
    Execution {
        outcome: Outcome<ExecuteResponse>,
        refresh: RefreshPlan,
    },
    Listing(Outcome<DatabasesResponse>),
    Health(Outcome<HealthResponse>),
    Tables(Outcome<TablesResponse>),
}

/// The single owner of query-lifecycle state.
pub struct Console {
    api: Arc<dyn ApiClient>,
    tx: mpsc::Sender<Completion>,
    rx: mpsc::Receiver<Completion>,
    buffer: QueryBuffer,
    suggestions: SuggestionController,
    analysis: AnalysisInvoker,
    execution: ExecutionController,
    registry: DatabaseRegistry,
    focus_requested: bool,
}

impl Console {
    /// Creates a console talking to `api`, debouncing autocomplete by `debounce`.
    pub fn new(api: Arc<dyn ApiClient>, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::channel(COMPLETION_CHANNEL_CAPACITY);
        Self {
            api,
            tx,
            rx,
            buffer: QueryBuffer::new(),
            suggestions: SuggestionController::new(debounce),
            analysis: AnalysisInvoker::new(),
            execution: ExecutionController::new(),
            registry: DatabaseRegistry::new(),
            focus_requested: false,
        }
    }

    /// Issues the startup listing and health check. Neither blocks.
    pub fn start(&mut self) {
        info!("Loading databases and server status");
        self.refresh_listing();
        self.refresh_active();
    }

    pub fn buffer(&self) -> &QueryBuffer {
        &self.buffer
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn suggestions(&self) -> &SuggestionController {
        &self.suggestions
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.result()
    }

    pub fn is_analyzing(&self) -> bool {
        self.analysis.is_pending()
    }

    pub fn execution(&self) -> Option<&ExecutionResult> {
        self.execution.result()
    }

    pub fn is_busy(&self) -> bool {
        self.execution.is_busy()
    }

    pub fn registry(&self) -> &DatabaseRegistry {
        &self.registry
    }

    /// Returns and resets the pending editor-focus request.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    // ----- Buffer -----

    /// Applies an edit to the buffer and notifies the suggestion controller
    /// if the text changed.
    pub fn edit(&mut self, f: impl FnOnce(&mut QueryBuffer)) {
        let before = self.buffer.text().to_string();
        f(&mut self.buffer);
        if self.buffer.text() != before {
            self.on_buffer_changed();
        }
    }

    /// Replaces the whole buffer. Always counts as a change, even when the
    /// new text equals the old.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer.set_text(text);
        self.on_buffer_changed();
    }

    fn on_buffer_changed(&mut self) {
        let blank = self.buffer.is_blank();
        self.suggestions
            .on_buffer_changed(blank, &self.tx, |generation| Completion::DebounceElapsed {
                generation,
            });
    }

    // ----- Suggestions, templates, clear -----

    /// Replaces the buffer with `suggestion` plus a trailing space.
    pub fn apply_suggestion(&mut self, suggestion: &str) {
        self.set_text(format!("{suggestion} "));
        self.suggestions.invalidate();
        self.focus_requested = true;
    }

    /// Applies the highlighted suggestion. Returns false if none is shown.
    pub fn apply_selected_suggestion(&mut self) -> bool {
        match self.suggestions.selected_item().map(str::to_string) {
            Some(suggestion) => {
                self.apply_suggestion(&suggestion);
                true
            }
            None => false,
        }
    }

    pub fn select_next_suggestion(&mut self) {
        self.suggestions.select_next();
    }

    pub fn select_previous_suggestion(&mut self) {
        self.suggestions.select_previous();
    }

    pub fn dismiss_suggestions(&mut self) {
        self.suggestions.hide();
    }

    pub fn load_template(&mut self, template: Template) {
        debug!("Loading template {}", template);
        self.set_text(template.statement());
        self.suggestions.invalidate();
    }

    /// Empties the buffer and drops the result and analysis.
    pub fn clear(&mut self) {
        self.set_text("");
        self.execution.clear();
        self.analysis.clear();
    }

    // ----- Analyze / execute -----

    /// Sends the buffer for analysis. A blank buffer is a no-op.
    pub fn analyze(&mut self) {
        let Some(query) = self.analysis.begin(self.buffer.text()) else {
            return;
        };
        let api = Arc::clone(&self.api);
        self.spawn(async move { Completion::Analysis(api.analyze(&query).await) });
    }

    /// Sends the buffer for execution.
    ///
    /// A blank buffer is a validation error; a running execution makes this
    /// call a no-op that returns [`ExecuteOutcome::Busy`].
    pub fn execute(&mut self) -> Result<ExecuteOutcome> {
        let Some(Submission { query, refresh }) = self.execution.begin(self.buffer.text())? else {
            debug!("Execute ignored: another execution is running");
            return Ok(ExecuteOutcome::Busy);
        };
        self.analysis.clear();

        info!("Executing statement ({} bytes)", query.len());
        let api = Arc::clone(&self.api);
        self.spawn(async move {
            Completion::Execution {
                outcome: api.execute(&query).await,
                refresh,
            }
        });
        Ok(ExecuteOutcome::Submitted)
    }

    // ----- Registry -----

    pub fn refresh_listing(&mut self) {
        let api = Arc::clone(&self.api);
        self.spawn(async move { Completion::Listing(api.databases().await) });
    }

    pub fn refresh_active(&mut self) {
        let api = Arc::clone(&self.api);
        self.spawn(async move { Completion::Health(api.health().await) });
    }

    pub fn refresh_tables(&mut self) {
        let api = Arc::clone(&self.api);
        self.spawn(async move { Completion::Tables(api.tables().await) });
    }

    // ----- Completions -----

    /// Waits for the next completion.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }

    /// Applies a completion to the owned state.
    pub fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::DebounceElapsed { generation } => {
                let blank = self.buffer.is_blank();
                if let Some(token) = self.suggestions.on_timer(generation, blank) {
                    let query = self.buffer.trimmed().to_string();
                    debug!("Requesting suggestions {} for {:?}", token, query);
                    let api = Arc::clone(&self.api);
                    let handle = self.spawn(async move {
                        Completion::Suggestions {
                            token,
                            outcome: api.autocomplete(&query).await,
                        }
                    });
                    self.suggestions.track(handle);
                }
            }
            Completion::Suggestions { token, outcome } => {
                self.suggestions
                    .on_response(token, outcome.map(|r| r.suggestions));
            }
            Completion::Analysis(outcome) => self.analysis.complete(outcome),
            Completion::Execution { outcome, refresh } => {
                let answered = outcome.is_ok();
                if let Some(analysis) = self.execution.complete(outcome) {
                    self.analysis.set(analysis.into());
                }
                if answered {
                    if refresh.listing {
                        self.refresh_listing();
                    }
                    if refresh.health {
                        self.refresh_active();
                    }
                }
            }
            Completion::Listing(outcome) => self.registry.apply_listing(outcome),
            Completion::Health(outcome) => {
                if self.registry.apply_health(outcome) {
                    self.refresh_tables();
                }
            }
            Completion::Tables(outcome) => self.registry.apply_tables(outcome),
        }
    }

    /// Applies every completion that is already queued. Returns how many.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.rx.try_recv() {
            self.apply(completion);
            applied += 1;
        }
        applied
    }

    /// Applies completions until none arrives for `quiet`. Returns how many.
    pub async fn settle(&mut self, quiet: Duration) -> usize {
        let mut applied = 0;
        while let Ok(Some(completion)) = tokio::time::timeout(quiet, self.rx.recv()).await {
            self.apply(completion);
            applied += 1;
        }
        applied
    }

    /// Cancels the debounce timer and aborts in-flight suggestion fetches.
    pub fn shutdown(&mut self) {
        debug!("Console shutting down");
        self.suggestions.shutdown();
    }

    fn spawn<F>(&self, task: F) -> AbortHandle
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let completion = task.await;
            let _ = tx.send(completion).await;
        })
        .abort_handle()
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.suggestions.shutdown();
    }
}
