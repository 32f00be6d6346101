//! Statement execution state.

use crate::api::{AnalyzeResponse, ExecuteResponse, Row};
use crate::error::{ConsoleError, Result};

/// Shown when execute is requested on a blank buffer.
pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a SQL command";

/// Outcome of the last execution, as shown in the result panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionResult {
    pub success: bool,
    pub message: String,
    pub rows: Option<Vec<Row>>,
    pub affected_rows: Option<i64>,
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Result for a request that never got an answer.
    pub fn connection_error(err: &ConsoleError) -> Self {
        Self {
            success: false,
            message: format!("connection error: {}", err.detail()),
            ..Self::default()
        }
    }
}

/// Registry refreshes a statement calls for once it has been answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshPlan {
    pub listing: bool,
    pub health: bool,
}

impl RefreshPlan {
    /// Derives the plan from the submitted statement text.
    ///
    /// This is a substring check, so a statement merely mentioning
    /// `CREATE DATABASE` in a literal also triggers a listing refresh.
    pub fn for_statement(text: &str) -> Self {
        let upper = text.to_uppercase();
        let creates = upper.contains("CREATE DATABASE");
        let drops = upper.contains("DROP DATABASE");
        let uses = upper.trim().starts_with("USE");

        Self {
            listing: creates || drops,
            health: drops || uses,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.listing && !self.health
    }
}

/// A statement accepted for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub query: String,
    pub refresh: RefreshPlan,
}

/// Whether an execute request went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    Submitted,
    /// Another execution is still running.
    Busy,
}

/// Serializes executions and holds the latest result.
#[derive(Debug, Default)]
pub struct ExecutionController {
    busy: bool,
    result: Option<ExecutionResult>,
}

impl ExecutionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn result(&self) -> Option<&ExecutionResult> {
        self.result.as_ref()
    }

    /// Starts an execution of `text`.
    ///
    /// Returns `Ok(None)` while busy, a validation error for blank text, and
    /// otherwise marks the controller busy and clears the previous result.
    pub fn begin(&mut self, text: &str) -> Result<Option<Submission>> {
        if text.trim().is_empty() {
            return Err(ConsoleError::validation(EMPTY_QUERY_MESSAGE));
        }
        if self.busy {
            return Ok(None);
        }

        self.busy = true;
        self.result = None;
        Ok(Some(Submission {
            query: text.to_string(),
            refresh: RefreshPlan::for_statement(text),
        }))
    }

    /// Stores the outcome and clears `busy`.
    ///
    /// Returns the analysis embedded in a successful answer.
    pub fn complete(
        &mut self,
        outcome: std::result::Result<ExecuteResponse, ConsoleError>,
    ) -> Option<AnalyzeResponse> {
        self.busy = false;
        match outcome {
            Ok(response) => {
                self.result = Some(ExecutionResult {
                    success: response.success,
                    message: response.message,
                    rows: response.data,
                    affected_rows: response.affected_rows,
                    error: response.error,
                });
                response.analysis
            }
            Err(e) => {
                self.result = Some(ExecutionResult::connection_error(&e));
                None
            }
        }
    }

    pub fn clear(&mut self) {
        self.result = None;
    }
}
