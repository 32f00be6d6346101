//! Known databases, the active one, and its tables.

use tracing::{debug, warn};

use crate::api::{DatabasesResponse, HealthResponse, TablesResponse};
use crate::error::ConsoleError;

type Outcome<T> = std::result::Result<T, ConsoleError>;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DatabaseRegistry {
    known: Vec<String>,
    active: Option<String>,
    tables: Vec<String>,
}

impl DatabaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn known(&self) -> &[String] {
        &self.known
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.as_deref() == Some(name)
    }

    /// Replaces the known list on a successful listing. Failures keep it.
    pub fn apply_listing(&mut self, outcome: Outcome<DatabasesResponse>) {
        match outcome {
            Ok(response) if response.success => {
                debug!("Database listing: {} entries", response.databases.len());
                self.known = response.databases;
            }
            Ok(response) => warn!(
                "Database listing failed: {}",
                response.error.unwrap_or_default()
            ),
            Err(e) => warn!("Database listing failed: {}", e),
        }
    }

    /// Overwrites the active database when the health answer names one.
    /// An empty name counts as absent.
    ///
    /// Returns true if the active database changed.
    pub fn apply_health(&mut self, outcome: Outcome<HealthResponse>) -> bool {
        match outcome {
            Ok(HealthResponse {
                current_database: Some(db),
                ..
            }) if !db.is_empty() => {
                if self.active.as_deref() == Some(db.as_str()) {
                    return false;
                }
                debug!("Active database is now {}", db);
                self.active = Some(db);
                self.tables.clear();
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!("Health check failed: {}", e);
                false
            }
        }
    }

    /// Replaces the table list on success. Failures keep it.
    pub fn apply_tables(&mut self, outcome: Outcome<TablesResponse>) {
        match outcome {
            Ok(response) if response.success => self.tables = response.tables,
            Ok(response) => debug!(
                "Table listing failed: {}",
                response.error.unwrap_or_default()
            ),
            Err(e) => warn!("Table listing failed: {}", e),
        }
    }
}
