//! Error types for querydesk.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for querydesk operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    /// The query service could not be reached or returned an undecodable body.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The query service answered but reported a failure in-band.
    #[error("Server error: {0}")]
    Server(String),

    /// Local validation rejected an action before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// Configuration errors (invalid config file, bad base URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (terminal setup, closed channels, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConsoleError {
    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a server error with the given message.
    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }

    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport(_) => "Transport Error",
            Self::Server(_) => "Server Error",
            Self::Validation(_) => "Validation Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns the bare message without the category prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::Transport(msg)
            | Self::Server(msg)
            | Self::Validation(msg)
            | Self::Config(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

/// Result type alias using ConsoleError.
pub type Result<T> = std::result::Result<T, ConsoleError>;
