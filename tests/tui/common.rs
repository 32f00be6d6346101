//! Common test utilities for headless binary tests.

use std::process::Command;

/// Runs querydesk in headless mode against the mock service.
///
/// The config path points at a file that does not exist so the user's own
/// configuration never leaks into a test.
pub fn run_headless(args: &[&str]) -> (i32, String, String) {
    let config = std::env::temp_dir().join("querydesk-test-missing-config.toml");
    let output = Command::new(env!("CARGO_BIN_EXE_querydesk"))
        .arg("--config")
        .arg(&config)
        .args(["--headless", "--mock-api"])
        .args(args)
        .env_remove("QUERYDESK_API_URL")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute querydesk");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}

/// Runs with JSON output and parses stdout.
pub fn run_headless_json(events: &str) -> (i32, serde_json::Value) {
    let (code, stdout, stderr) = run_headless(&["--events", events, "--output", "json"]);
    let json = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}\nstderr: {stderr}"));
    (code, json)
}
