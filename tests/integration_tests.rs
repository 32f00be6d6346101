//! Integration tests for querydesk.
//!
//! Everything here runs against the in-memory mock service, so no backend is
//! needed.
//!
//! Run with: `cargo test --test integration_tests`

mod integration;
mod tui;
