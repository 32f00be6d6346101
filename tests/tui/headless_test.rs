//! Integration tests for headless mode.

use super::common::{run_headless, run_headless_json};

#[test]
fn test_headless_basic_execution() {
    let (code, stdout, _) = run_headless(&["--events", "key:esc"]);

    assert_eq!(code, 0, "Expected exit code 0");
    assert!(stdout.contains("Events: 1 executed"), "stdout: {stdout}");
}

#[test]
fn test_headless_startup_lists_databases() {
    let (code, json) = run_headless_json(
        "wait:500ms,assert:contains:information_schema,assert:state:database_count=3",
    );

    assert_eq!(code, 0);
    assert_eq!(json["assertions"]["passed"], 2);
    assert_eq!(json["state"]["active_database"], serde_json::Value::Null);
}

#[test]
fn test_headless_use_then_select() {
    let (code, json) = run_headless_json(
        "type:USE shop;,key:f5,wait:500ms,key:ctrl+l,type:SELECT * FROM users;,key:f5,wait:500ms,assert:contains:NULL",
    );

    assert_eq!(code, 0, "{json}");
    assert_eq!(json["state"]["active_database"], "shop");
    assert_eq!(json["state"]["table_count"], 1);
    assert_eq!(json["state"]["result_success"], true);
}

#[test]
fn test_headless_template_shortcut() {
    let (code, json) = run_headless_json("key:alt+7");

    assert_eq!(code, 0);
    assert_eq!(json["state"]["buffer_text"], "SELECT * FROM users;");
}

#[test]
fn test_headless_analyze_shows_tokens() {
    let (code, json) = run_headless_json(
        "type:USE shop;,key:f6,wait:300ms,assert:contains:Valid syntax,assert:contains:Tokens (3)",
    );

    assert_eq!(code, 0, "{json}");
    assert_eq!(json["assertions"]["failed"], 0);
}

#[test]
fn test_headless_blank_execute_shows_message() {
    let (code, json) = run_headless_json("key:f5,assert:contains:Please enter a SQL command");

    assert_eq!(code, 0, "{json}");
    assert_eq!(json["state"]["busy"], false);
}

#[test]
fn test_headless_assertion_fail() {
    let (code, stdout, _) = run_headless(&[
        "--events",
        "type:SELECT 1;,assert:contains:goodbye",
        "--output",
        "json",
    ]);

    assert_eq!(code, 1, "Should exit with code 1 on assertion failure");
    assert!(stdout.contains(r#""passed": 0"#));
    assert!(stdout.contains(r#""failed": 1"#));
}

#[test]
fn test_headless_frames_output() {
    let (code, stdout, _) = run_headless(&[
        "--events",
        "type:USE shop;,key:f5",
        "--output",
        "frames",
        "--size",
        "80x24",
    ]);

    assert_eq!(code, 0);
    assert!(stdout.contains("=== FRAME 0 (initial) ==="));
    assert!(stdout.contains("=== FRAME 2 (key:f5) ==="));
    assert!(stdout.contains("Total: 3 frames"));
}

#[test]
fn test_headless_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("screen.txt");
    let path_str = path.to_str().unwrap();

    let (code, stdout, _) = run_headless(&["--events", "key:alt+2", "--output-file", path_str]);

    assert_eq!(code, 0);
    assert!(stdout.is_empty());
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("USE my_database;"));
}

#[test]
fn test_headless_requires_events() {
    let (code, _, stderr) = run_headless(&[]);

    assert_eq!(code, 1);
    assert!(stderr.contains("--headless requires --events or --script"));
}

#[test]
fn test_headless_rejects_bad_size() {
    let (code, _, _) = run_headless(&["--events", "key:esc", "--size", "wide"]);
    assert_eq!(code, 1);
}
