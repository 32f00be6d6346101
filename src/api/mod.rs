//! Client side of the query service API.
//!
//! Provides a trait-based interface for the remote service, allowing the HTTP
//! client and the in-memory mock to be used interchangeably.

mod http;
mod mock;
mod types;

pub use http::HttpApiClient;
pub use mock::MockApiClient;
pub use types::{
    AnalyzeResponse, AutocompleteResponse, DatabasesResponse, ExecuteResponse, HealthResponse,
    LexicalAnalysis, QueryRequest, Row, SyntacticAnalysis, TablesResponse, TokenInfo,
};

use crate::config::ApiConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Service endpoints, relative to the API base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Health,
    Databases,
    Tables,
    Autocomplete,
    Analyze,
    Execute,
}

impl Endpoint {
    /// Returns the path of the endpoint below the base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Health => "/health",
            Self::Databases => "/databases",
            Self::Tables => "/tables",
            Self::Autocomplete => "/autocomplete",
            Self::Analyze => "/analyze",
            Self::Execute => "/execute",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Creates the HTTP client for the configured service.
pub fn connect(config: &ApiConfig) -> Result<Arc<dyn ApiClient>> {
    let client = HttpApiClient::new(config)?;
    Ok(Arc::new(client))
}

/// Trait defining the operations of the query service.
///
/// Every call is a single attempt. Errors are transport failures; failures the
/// service reports in-band come back as decoded responses.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Fetches server status, including the active database.
    async fn health(&self) -> Result<HealthResponse>;

    /// Lists the databases known to the server.
    async fn databases(&self) -> Result<DatabasesResponse>;

    /// Lists the tables of the active database.
    async fn tables(&self) -> Result<TablesResponse>;

    /// Requests completion suggestions for a partial statement.
    async fn autocomplete(&self, query: &str) -> Result<AutocompleteResponse>;

    /// Requests lexical and syntactic analysis of a statement.
    async fn analyze(&self, query: &str) -> Result<AnalyzeResponse>;

    /// Executes a statement.
    async fn execute(&self, query: &str) -> Result<ExecuteResponse>;
}
