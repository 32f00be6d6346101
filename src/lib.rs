//! querydesk - a terminal console for a remote SQL query service.
//!
//! The library holds everything the binary runs, so integration tests can
//! drive the console and the headless runner directly.

pub mod api;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod tui;
