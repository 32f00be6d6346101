//! Query lifecycle properties, checked against the mock service with tokio's
//! paused clock.

use pretty_assertions::assert_eq;
use querydesk::api::{Endpoint, MockApiClient};
use querydesk::console::{Console, ExecuteOutcome, ResultView, SuggestionPhase};
use std::sync::Arc;
use std::time::Duration;

const DEBOUNCE: Duration = Duration::from_millis(300);
const QUIET: Duration = Duration::from_secs(2);

fn console_with(mock: MockApiClient) -> (Console, Arc<MockApiClient>) {
    let mock = Arc::new(mock);
    (Console::new(mock.clone(), DEBOUNCE), mock)
}

/// Lets the debounce timer fire and applies whatever it produced.
async fn elapse_debounce(console: &mut Console) {
    tokio::time::sleep(DEBOUNCE + Duration::from_millis(50)).await;
    console.drain();
}

#[tokio::test(start_paused = true)]
async fn keystrokes_within_quiet_interval_send_one_request() {
    let (mut console, mock) = console_with(MockApiClient::new());

    for c in "SELECT".chars() {
        console.edit(|b| b.insert(c));
        tokio::time::advance(Duration::from_millis(50)).await;
    }
    console.settle(QUIET).await;

    assert_eq!(mock.queries(Endpoint::Autocomplete), vec!["SELECT"]);
}

#[tokio::test(start_paused = true)]
async fn late_response_for_older_request_is_discarded() {
    let mock = MockApiClient::new().with_delays(
        Endpoint::Autocomplete,
        vec![Duration::from_millis(500), Duration::ZERO],
    );
    let (mut console, mock) = console_with(mock);

    console.edit(|b| b.insert('D'));
    elapse_debounce(&mut console).await;
    console.edit(|b| b.insert('R'));
    elapse_debounce(&mut console).await;
    console.settle(QUIET).await;

    assert_eq!(mock.queries(Endpoint::Autocomplete), vec!["D", "DR"]);
    assert_eq!(
        console.suggestions().items(),
        ["DROP DATABASE".to_string(), "DROP TABLE".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn blank_buffer_never_requests_suggestions() {
    let (mut console, mock) = console_with(MockApiClient::new());

    console.set_text("   \n\t");
    console.settle(QUIET).await;

    assert_eq!(mock.call_count(Endpoint::Autocomplete), 0);
    assert_eq!(console.suggestions().phase(), SuggestionPhase::Suppressed);
}

#[tokio::test(start_paused = true)]
async fn applying_a_suggestion_replaces_the_buffer() {
    let (mut console, _mock) = console_with(MockApiClient::new());

    console.set_text("sel");
    console.settle(QUIET).await;
    assert!(console.suggestions().is_visible());

    console.apply_suggestion("SELECT");

    assert_eq!(console.text(), "SELECT ");
    assert!(!console.suggestions().is_visible());
}

async fn refresh_counts(statement: &str) -> (usize, usize) {
    let (mut console, mock) = console_with(MockApiClient::new());
    console.set_text(statement);
    assert_eq!(console.execute().unwrap(), ExecuteOutcome::Submitted);
    console.settle(QUIET).await;
    (
        mock.call_count(Endpoint::Databases),
        mock.call_count(Endpoint::Health),
    )
}

#[tokio::test(start_paused = true)]
async fn create_database_refreshes_listing_only() {
    assert_eq!(refresh_counts("CREATE DATABASE test;").await, (1, 0));
}

#[tokio::test(start_paused = true)]
async fn drop_database_refreshes_listing_and_health() {
    assert_eq!(refresh_counts("DROP DATABASE test;").await, (1, 1));
}

#[tokio::test(start_paused = true)]
async fn use_refreshes_health_only() {
    assert_eq!(refresh_counts("use test;").await, (0, 1));
}

#[tokio::test(start_paused = true)]
async fn plain_statement_refreshes_nothing() {
    assert_eq!(refresh_counts("SELECT * FROM users;").await, (0, 0));
}

#[tokio::test(start_paused = true)]
async fn created_database_appears_in_registry() {
    let (mut console, mock) = console_with(MockApiClient::new());
    console.start();
    console.settle(QUIET).await;
    mock.reset_calls();

    console.set_text("CREATE DATABASE reports;");
    console.execute().unwrap();
    console.settle(QUIET).await;

    assert!(console
        .registry()
        .known()
        .iter()
        .any(|name| name == "reports"));
    assert_eq!(mock.call_count(Endpoint::Databases), 1);
}

#[tokio::test(start_paused = true)]
async fn null_cells_render_as_null() {
    let (mut console, _mock) = console_with(MockApiClient::new());

    console.set_text("SELECT * FROM users;");
    console.execute().unwrap();
    console.settle(QUIET).await;

    let result = console.execution().expect("execution result");
    let grid = ResultView::from(result).grid.expect("rows");
    assert_eq!(grid.columns, vec!["id", "name"]);
    assert_eq!(grid.display_rows(), vec![vec!["1", "NULL"]]);
}

#[tokio::test(start_paused = true)]
async fn execute_while_busy_sends_nothing() {
    let mock = MockApiClient::new().with_delays(Endpoint::Execute, vec![Duration::from_secs(1)]);
    let (mut console, mock) = console_with(mock);

    console.set_text("SELECT * FROM users;");
    assert_eq!(console.execute().unwrap(), ExecuteOutcome::Submitted);
    assert_eq!(console.execute().unwrap(), ExecuteOutcome::Busy);
    console.settle(QUIET).await;

    assert_eq!(mock.call_count(Endpoint::Execute), 1);
    assert!(!console.is_busy());
}

#[tokio::test(start_paused = true)]
async fn transport_failure_is_shown_as_connection_error() {
    let mock = MockApiClient::new().with_failure(Endpoint::Execute);
    let (mut console, mock) = console_with(mock);

    console.set_text("USE shop;");
    console.execute().unwrap();
    console.settle(QUIET).await;

    let result = console.execution().expect("execution result");
    assert!(!result.success);
    assert!(result.message.starts_with("connection error: "));
    assert_eq!(mock.call_count(Endpoint::Health), 0);
}
