//! Wire types for the query service API.
//!
//! Every response field the service may omit is defaulted so that partial
//! bodies (for example the `{error}` bodies sent with 4xx/5xx statuses) still
//! decode.

use serde::{Deserialize, Serialize};

/// A result row as sent by the service: column name to nullable scalar.
///
/// Key order is preserved (`serde_json` is built with `preserve_order`), so the
/// iteration order of the first row defines the column order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Request body shared by `/autocomplete`, `/analyze` and `/execute`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryRequest {
    pub query: String,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: Option<String>,
    /// Database selected by the last `USE`, if any.
    #[serde(default)]
    pub current_database: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `GET /databases`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabasesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub databases: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `GET /tables`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TablesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub tables: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `POST /autocomplete`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutocompleteResponse {
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Response of `POST /analyze`, also embedded in execute responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub lexical: Option<LexicalAnalysis>,
    #[serde(default)]
    pub syntactic: Option<SyntacticAnalysis>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Lexical section of an analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LexicalAnalysis {
    #[serde(default)]
    pub token_count: usize,
    #[serde(default)]
    pub tokens: Vec<TokenInfo>,
}

/// A single token reported by the service lexer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenInfo {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub position: usize,
}

/// Syntactic section of an analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyntacticAnalysis {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub statement_type: Option<String>,
}

/// Response of `POST /execute`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExecuteResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Vec<Row>>,
    #[serde(default)]
    pub analysis: Option<AnalyzeResponse>,
    #[serde(default)]
    pub affected_rows: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}
