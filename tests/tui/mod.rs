//! Binary-level tests driving querydesk in headless mode.

mod common;
mod headless_test;
