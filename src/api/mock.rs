//! Mock query service for testing.
//!
//! Provides an in-memory service that mimics the remote backend closely
//! enough for headless runs and controller tests: a keyword autocompleter, a
//! toy analyzer, and a database catalog that reacts to `CREATE DATABASE`,
//! `DROP DATABASE` and `USE`. Every call is recorded, and per-endpoint delays
//! and failures can be scripted.

use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use super::{
    AnalyzeResponse, ApiClient, AutocompleteResponse, DatabasesResponse, Endpoint,
    ExecuteResponse, HealthResponse, LexicalAnalysis, Row, SyntacticAnalysis, TablesResponse,
    TokenInfo,
};
use crate::error::{ConsoleError, Result};

/// Keywords offered by the mock autocompleter, in the order the backend uses.
const KEYWORDS: &[&str] = &[
    "CREATE DATABASE",
    "CREATE TABLE",
    "USE",
    "INSERT INTO",
    "VALUES",
    "UPDATE",
    "SET",
    "DELETE FROM",
    "DROP DATABASE",
    "DROP TABLE",
    "SELECT",
    "SELECT * FROM",
    "FROM",
    "WHERE",
    "INT",
    "VARCHAR",
    "TEXT",
    "DATE",
    "FLOAT",
    "PRIMARY KEY",
    "NOT NULL",
    "AUTO_INCREMENT",
];

/// Maximum number of suggestions returned per request.
const MAX_SUGGESTIONS: usize = 5;

/// Words the toy lexer classifies as keywords.
const LEXER_KEYWORDS: &[&str] = &[
    "CREATE", "DATABASE", "TABLE", "USE", "INSERT", "INTO", "VALUES", "UPDATE", "SET", "DELETE",
    "FROM", "WHERE", "SELECT", "DROP", "INT", "VARCHAR", "TEXT", "DATE", "FLOAT", "BOOLEAN",
    "PRIMARY", "KEY", "NOT", "NULL", "AUTO_INCREMENT",
];

/// Statement types the toy analyzer accepts, keyed by their leading words.
const STATEMENTS: &[(&str, &str)] = &[
    ("CREATE DATABASE", "CREATE_DATABASE"),
    ("CREATE TABLE", "CREATE_TABLE"),
    ("DROP DATABASE", "DROP_DATABASE"),
    ("DROP TABLE", "DROP_TABLE"),
    ("USE", "USE"),
    ("INSERT INTO", "INSERT"),
    ("UPDATE", "UPDATE"),
    ("DELETE FROM", "DELETE"),
    ("SELECT", "SELECT"),
];

#[derive(Debug)]
struct Catalog {
    databases: Vec<String>,
    current: Option<String>,
    tables: HashMap<String, Vec<String>>,
}

impl Default for Catalog {
    fn default() -> Self {
        let mut tables = HashMap::new();
        tables.insert("shop".to_string(), vec!["users".to_string()]);
        Self {
            databases: vec![
                "information_schema".to_string(),
                "mysql".to_string(),
                "shop".to_string(),
            ],
            current: None,
            tables,
        }
    }
}

/// An in-memory stand-in for the query service.
#[derive(Debug)]
pub struct MockApiClient {
    catalog: Mutex<Catalog>,
    calls: Mutex<Vec<(Endpoint, Option<String>)>>,
    delays: Mutex<HashMap<Endpoint, VecDeque<Duration>>>,
    failing: Mutex<HashSet<Endpoint>>,
    select_rows: Vec<Row>,
}

impl Default for MockApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApiClient {
    /// Creates a mock with a small default catalog.
    pub fn new() -> Self {
        let row = json!({"id": 1, "name": null});
        let select_rows = match row {
            serde_json::Value::Object(map) => vec![map],
            _ => Vec::new(),
        };
        Self {
            catalog: Mutex::new(Catalog::default()),
            calls: Mutex::new(Vec::new()),
            delays: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            select_rows,
        }
    }

    /// Sets the rows returned for `SELECT` statements.
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.select_rows = rows;
        self
    }

    /// Queues per-call delays for an endpoint; call N waits `delays[N]`.
    ///
    /// Calls beyond the queued delays answer immediately.
    pub fn with_delays(self, endpoint: Endpoint, delays: Vec<Duration>) -> Self {
        if let Ok(mut map) = self.delays.lock() {
            map.entry(endpoint).or_default().extend(delays);
        }
        self
    }

    /// Makes every call to `endpoint` fail with a transport error.
    pub fn with_failure(self, endpoint: Endpoint) -> Self {
        self.set_failing(endpoint, true);
        self
    }

    /// Toggles transport failures for an endpoint at runtime.
    pub fn set_failing(&self, endpoint: Endpoint, failing: bool) {
        if let Ok(mut set) = self.failing.lock() {
            if failing {
                set.insert(endpoint);
            } else {
                set.remove(&endpoint);
            }
        }
    }

    /// Returns every recorded call in issue order.
    pub fn calls(&self) -> Vec<(Endpoint, Option<String>)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Returns the request bodies sent to one endpoint, in issue order.
    pub fn queries(&self, endpoint: Endpoint) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(e, _)| *e == endpoint)
            .filter_map(|(_, q)| q)
            .collect()
    }

    /// Returns how many times an endpoint was called.
    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.calls().iter().filter(|(e, _)| *e == endpoint).count()
    }

    /// Forgets recorded calls (startup traffic, for instance).
    pub fn reset_calls(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    /// Records a call, then applies any scripted delay and failure.
    async fn enter(&self, endpoint: Endpoint, query: Option<&str>) -> Result<()> {
        self.calls
            .lock()
            .map_err(|_| ConsoleError::internal("mock call log poisoned"))?
            .push((endpoint, query.map(String::from)));

        let delay = self
            .delays
            .lock()
            .map_err(|_| ConsoleError::internal("mock delays poisoned"))?
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failing
            .lock()
            .map_err(|_| ConsoleError::internal("mock failures poisoned"))?
            .contains(&endpoint);
        if failing {
            return Err(ConsoleError::transport(format!(
                "failed to connect to mock service for {endpoint}"
            )));
        }
        Ok(())
    }

    fn catalog(&self) -> Result<std::sync::MutexGuard<'_, Catalog>> {
        self.catalog
            .lock()
            .map_err(|_| ConsoleError::internal("mock catalog poisoned"))
    }
}

/// Splits a statement into `(type, value, position)` triples.
fn tokenize(sql: &str) -> Vec<TokenInfo> {
    let mut tokens = Vec::new();
    let chars: Vec<(usize, char)> = sql.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].1.is_alphanumeric() || chars[i].1 == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().map(|(_, c)| *c).collect();
            let upper = word.to_uppercase();
            let kind = if LEXER_KEYWORDS.contains(&upper.as_str()) {
                upper
            } else {
                "IDENTIFIER".to_string()
            };
            tokens.push(TokenInfo {
                kind,
                value: Some(word),
                position: pos,
            });
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].1.is_ascii_digit() || chars[i].1 == '.') {
                i += 1;
            }
            tokens.push(TokenInfo {
                kind: "NUMBER".to_string(),
                value: Some(chars[start..i].iter().map(|(_, c)| *c).collect()),
                position: pos,
            });
        } else if c == '\'' || c == '"' {
            let start = i + 1;
            i += 1;
            while i < chars.len() && chars[i].1 != c {
                i += 1;
            }
            let end = i.min(chars.len());
            tokens.push(TokenInfo {
                kind: "STRING".to_string(),
                value: Some(chars[start..end].iter().map(|(_, c)| *c).collect()),
                position: pos,
            });
            i += 1;
        } else {
            let kind = match c {
                '(' | ')' | ',' | ';' | '=' | '*' => c.to_string(),
                _ => "UNKNOWN".to_string(),
            };
            tokens.push(TokenInfo {
                kind,
                value: None,
                position: pos,
            });
            i += 1;
        }
    }

    tokens
}

/// Produces a lexical + syntactic report for a statement.
fn analyze_statement(sql: &str) -> AnalyzeResponse {
    let tokens = tokenize(sql);
    let normalized = sql.trim().to_uppercase();
    let statement = STATEMENTS
        .iter()
        .find(|(prefix, _)| normalized.starts_with(prefix));

    let syntactic = match statement {
        Some((_, kind)) if normalized.ends_with(';') => SyntacticAnalysis {
            valid: true,
            message: "Valid syntax".to_string(),
            statement_type: Some(kind.to_string()),
        },
        Some((_, kind)) => SyntacticAnalysis {
            valid: false,
            message: "Expected ';' at end of statement".to_string(),
            statement_type: Some(kind.to_string()),
        },
        None => SyntacticAnalysis {
            valid: false,
            message: "Unrecognized statement".to_string(),
            statement_type: None,
        },
    };

    AnalyzeResponse {
        lexical: Some(LexicalAnalysis {
            token_count: tokens.len(),
            tokens,
        }),
        syntactic: Some(syntactic),
        error: None,
    }
}

/// Returns the identifier following `prefix` in a statement, if any.
fn target_name(statement: &str, prefix: &str) -> Option<String> {
    let rest = statement.get(prefix.len()..)?.trim_start();
    let name: String = rest
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    (!name.is_empty()).then_some(name)
}

#[async_trait]
impl ApiClient for MockApiClient {
    async fn health(&self) -> Result<HealthResponse> {
        self.enter(Endpoint::Health, None).await?;
        Ok(HealthResponse {
            status: Some("ok".to_string()),
            current_database: self.catalog()?.current.clone(),
            error: None,
        })
    }

    async fn databases(&self) -> Result<DatabasesResponse> {
        self.enter(Endpoint::Databases, None).await?;
        Ok(DatabasesResponse {
            success: true,
            databases: self.catalog()?.databases.clone(),
            error: None,
        })
    }

    async fn tables(&self) -> Result<TablesResponse> {
        self.enter(Endpoint::Tables, None).await?;
        let catalog = self.catalog()?;
        Ok(match &catalog.current {
            Some(db) => TablesResponse {
                success: true,
                tables: catalog.tables.get(db).cloned().unwrap_or_default(),
                error: None,
            },
            None => TablesResponse {
                success: false,
                tables: Vec::new(),
                error: Some("No database selected".to_string()),
            },
        })
    }

    async fn autocomplete(&self, query: &str) -> Result<AutocompleteResponse> {
        self.enter(Endpoint::Autocomplete, Some(query)).await?;
        let partial = query.to_uppercase();
        let suggestions = KEYWORDS
            .iter()
            .filter(|kw| kw.starts_with(&partial))
            .take(MAX_SUGGESTIONS)
            .map(|kw| kw.to_string())
            .collect();
        Ok(AutocompleteResponse { suggestions })
    }

    async fn analyze(&self, query: &str) -> Result<AnalyzeResponse> {
        self.enter(Endpoint::Analyze, Some(query)).await?;
        if query.is_empty() {
            return Ok(AnalyzeResponse {
                error: Some("No command provided".to_string()),
                ..AnalyzeResponse::default()
            });
        }
        Ok(analyze_statement(query))
    }

    async fn execute(&self, query: &str) -> Result<ExecuteResponse> {
        self.enter(Endpoint::Execute, Some(query)).await?;

        let statement = query.trim();
        let analysis = analyze_statement(statement);
        let syntactic = analysis.syntactic.clone().unwrap_or_default();
        if !syntactic.valid {
            return Ok(ExecuteResponse {
                success: false,
                message: syntactic.message,
                error: Some("Syntax error".to_string()),
                analysis: Some(analysis),
                ..ExecuteResponse::default()
            });
        }

        let upper = statement.to_uppercase();
        let mut catalog = self.catalog()?;
        let outcome: std::result::Result<ExecuteResponse, String> =
            if upper.starts_with("CREATE DATABASE") {
                match target_name(statement, "CREATE DATABASE") {
                    Some(name) if catalog.databases.contains(&name) => {
                        Err(format!("Can't create database '{name}'; database exists"))
                    }
                    Some(name) => {
                        catalog.databases.push(name);
                        Ok(affected(1))
                    }
                    None => Err("Missing database name".to_string()),
                }
            } else if upper.starts_with("DROP DATABASE") {
                match target_name(statement, "DROP DATABASE") {
                    Some(name) if catalog.databases.contains(&name) => {
                        catalog.databases.retain(|db| *db != name);
                        catalog.tables.remove(&name);
                        if catalog
                            .current
                            .as_deref()
                            .is_some_and(|c| c.eq_ignore_ascii_case(&name))
                        {
                            catalog.current = None;
                        }
                        Ok(affected(0))
                    }
                    Some(name) => Err(format!("Can't drop database '{name}'; database doesn't exist")),
                    None => Err("Missing database name".to_string()),
                }
            } else if upper.starts_with("USE") {
                match target_name(statement, "USE") {
                    Some(name) if catalog.databases.contains(&name) => {
                        catalog.current = Some(name);
                        Ok(affected(0))
                    }
                    Some(name) => Err(format!("Unknown database '{name}'")),
                    None => Err("Missing database name".to_string()),
                }
            } else if upper.starts_with("SELECT") {
                Ok(ExecuteResponse {
                    success: true,
                    message: format!("{} rows found", self.select_rows.len()),
                    data: Some(self.select_rows.clone()),
                    ..ExecuteResponse::default()
                })
            } else if catalog.current.is_none() {
                Err("No database selected".to_string())
            } else {
                Ok(affected(1))
            };

        Ok(match outcome {
            Ok(mut response) => {
                response.analysis = Some(analysis);
                response
            }
            Err(error) => ExecuteResponse {
                success: false,
                message: format!("MySQL error: {error}"),
                error: Some(error),
                analysis: Some(analysis),
                ..ExecuteResponse::default()
            },
        })
    }
}

fn affected(rows: i64) -> ExecuteResponse {
    ExecuteResponse {
        success: true,
        message: format!("Command executed successfully. Rows affected: {rows}"),
        affected_rows: Some(rows),
        ..ExecuteResponse::default()
    }
}
