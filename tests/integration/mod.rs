//! Library-level tests: the console lifecycle and configuration loading.

pub mod config_test;
pub mod console_test;
