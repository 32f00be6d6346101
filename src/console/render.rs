//! Display projections of execution and analysis results.
//!
//! Nothing here talks to the service: these are pure conversions from the
//! console state to rows of text the widgets can lay out.

use std::fmt;

use super::analysis::AnalysisResult;
use super::execution::ExecutionResult;
use crate::api::Row;

/// A single cell value from a result row.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    /// Arrays and objects, kept as their JSON text.
    Json(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Strings verbatim, null as `NULL`, everything else as JSON text.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::String(s) => s.clone(),
            Self::Json(s) => s.clone(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.clone()),
            Value::String(s) => Self::String(s.clone()),
            other => Self::Json(other.to_string()),
        }
    }
}

/// Header plus cell grid for a result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultGrid {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ResultGrid {
    /// Projects rows against the key order of the first row.
    ///
    /// Keys that only appear in later rows are not shown; a key missing from
    /// a later row renders as NULL.
    pub fn from_rows(rows: &[Row]) -> Self {
        let Some(first) = rows.first() else {
            return Self::default();
        };
        let columns: Vec<String> = first.keys().cloned().collect();
        let rows = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| row.get(c).map(CellValue::from).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns every cell as display text.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(CellValue::to_display_string).collect())
            .collect()
    }
}

/// What the result panel should show for an execution result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub success: bool,
    pub message: String,
    pub grid: Option<ResultGrid>,
}

impl From<&ExecutionResult> for ResultView {
    fn from(result: &ExecutionResult) -> Self {
        Self {
            success: result.success,
            message: result.message.clone(),
            grid: result
                .rows
                .as_deref()
                .filter(|rows| !rows.is_empty())
                .map(ResultGrid::from_rows),
        }
    }
}

/// One line of the token list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLine {
    pub kind: String,
    pub value: String,
    pub position: usize,
}

/// Display-ready sections of an analysis result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisView {
    pub token_count: Option<usize>,
    pub tokens: Vec<TokenLine>,
    /// `(valid, verdict line, detail message)`.
    pub syntax: Option<(bool, String, String)>,
    pub statement_type: Option<String>,
    pub failure: Option<String>,
}

impl From<&AnalysisResult> for AnalysisView {
    fn from(result: &AnalysisResult) -> Self {
        match result {
            AnalysisResult::Failure { message } => Self {
                failure: Some(message.clone()),
                ..Self::default()
            },
            AnalysisResult::Report { lexical, syntactic } => {
                let mut view = Self::default();
                if let Some(lexical) = lexical {
                    view.token_count = Some(lexical.token_count);
                    view.tokens = lexical
                        .tokens
                        .iter()
                        .map(|t| TokenLine {
                            kind: t.kind.clone(),
                            value: t.value.clone().unwrap_or_else(|| "(symbol)".to_string()),
                            position: t.position,
                        })
                        .collect();
                }
                if let Some(syntactic) = syntactic {
                    let verdict = if syntactic.valid {
                        "Valid syntax"
                    } else {
                        "Syntax error"
                    };
                    view.syntax = Some((
                        syntactic.valid,
                        verdict.to_string(),
                        syntactic.message.clone(),
                    ));
                    view.statement_type = syntactic.statement_type.clone();
                }
                view
            }
        }
    }
}
