//! Headless mode for scripted testing and automation.
//!
//! Runs the TUI against a `TestBackend`, executing scripted events and
//! capturing output for verification. Background requests keep running
//! between events; `wait:` applies their completions as they arrive.

mod events;
mod output;

pub use events::{Assertion, Event, EventParser};
pub use output::{HeadlessOutput, ScreenRenderer};

use crate::api::{self, ApiClient, MockApiClient};
use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::console::Console;
use crate::error::{ConsoleError, Result};
use crate::tui::app::App;
use crate::tui::ui;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Configuration for headless mode execution.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    pub width: u16,
    pub height: u16,
    pub output_format: OutputFormat,
    /// Whether to stop on first assertion failure.
    pub fail_fast: bool,
    /// Path to write output (None = stdout).
    pub output_file: Option<PathBuf>,
}

impl HeadlessConfig {
    /// Creates a HeadlessConfig from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let (width, height) = cli.parse_screen_size().map_err(ConsoleError::config)?;
        let output_format = cli.parse_output_format().map_err(ConsoleError::config)?;

        Ok(Self {
            width,
            height,
            output_format,
            fail_fast: cli.fail_fast,
            output_file: cli.output_file.clone(),
        })
    }
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 30,
            output_format: OutputFormat::Text,
            fail_fast: false,
            output_file: None,
        }
    }
}

/// Result of headless execution.
#[derive(Debug)]
pub struct HeadlessResult {
    /// Final screen content as text.
    pub screen: String,
    pub screen_lines: Vec<String>,
    pub events_executed: usize,
    pub duration: Duration,
    pub assertions_passed: usize,
    pub assertions_failed: usize,
    /// Description of each failed assertion.
    pub failures: Vec<String>,
    pub state: HeadlessState,
    /// Frame captures (for frames output mode).
    pub frames: Vec<Frame>,
}

/// Snapshot of application state, used by `assert:state:` and JSON output.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HeadlessState {
    pub buffer_text: String,
    pub focus: String,
    pub busy: bool,
    pub analyzing: bool,
    pub suggestions_visible: bool,
    pub suggestion_count: usize,
    pub suggestion_selected: usize,
    pub active_database: Option<String>,
    pub database_count: usize,
    pub table_count: usize,
    /// Success flag of the last execution, if any.
    pub result_success: Option<bool>,
    pub running: bool,
}

impl HeadlessState {
    pub fn from_app(app: &App) -> Self {
        let console = &app.console;
        let suggestions = console.suggestions();
        let registry = console.registry();
        Self {
            buffer_text: console.text().to_string(),
            focus: format!("{:?}", app.focus),
            busy: console.is_busy(),
            analyzing: console.is_analyzing(),
            suggestions_visible: suggestions.is_visible(),
            suggestion_count: suggestions.items().len(),
            suggestion_selected: suggestions.selected(),
            active_database: registry.active().map(String::from),
            database_count: registry.known().len(),
            table_count: registry.tables().len(),
            result_success: console.execution().map(|r| r.success),
            running: app.running,
        }
    }

    /// Looks up a field by name for state assertions. Absent values read as
    /// `none`.
    pub fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "buffer_text" => self.buffer_text.clone(),
            "focus" => self.focus.clone(),
            "busy" => self.busy.to_string(),
            "analyzing" => self.analyzing.to_string(),
            "suggestions_visible" => self.suggestions_visible.to_string(),
            "suggestion_count" => self.suggestion_count.to_string(),
            "suggestion_selected" => self.suggestion_selected.to_string(),
            "active_database" => self
                .active_database
                .clone()
                .unwrap_or_else(|| "none".to_string()),
            "database_count" => self.database_count.to_string(),
            "table_count" => self.table_count.to_string(),
            "result_success" => self
                .result_success
                .map_or_else(|| "none".to_string(), |s| s.to_string()),
            "running" => self.running.to_string(),
            _ => return None,
        };
        Some(value)
    }
}

/// A captured frame (screen state after an event).
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame number (0 = initial state).
    pub number: usize,
    /// Event that produced this frame (None for initial).
    pub event: Option<String>,
    pub screen: String,
}

/// Runs the TUI in headless mode.
pub struct HeadlessRunner {
    config: HeadlessConfig,
    terminal: Terminal<TestBackend>,
    app: App,
    events: Vec<Event>,
    frames: Vec<Frame>,
    failures: Vec<String>,
    assertions_passed: usize,
}

impl HeadlessRunner {
    /// Creates a runner around an already constructed application.
    pub fn new(config: HeadlessConfig, app: App) -> Result<Self> {
        let backend = TestBackend::new(config.width, config.height);
        let terminal = Terminal::new(backend)
            .map_err(|e| ConsoleError::internal(format!("Failed to create test terminal: {e}")))?;

        Ok(Self {
            config,
            terminal,
            app,
            events: Vec::new(),
            frames: Vec::new(),
            failures: Vec::new(),
            assertions_passed: 0,
        })
    }

    /// Loads events from a string (comma-separated or newline-separated).
    pub fn load_events(&mut self, input: &str) -> Result<()> {
        self.events = EventParser::new().parse_all(input)?;
        Ok(())
    }

    /// Loads events from a script file, or stdin when `path` is `-`.
    pub fn load_script(&mut self, path: &str) -> Result<()> {
        let content = if path == "-" {
            std::io::read_to_string(std::io::stdin())
                .map_err(|e| ConsoleError::internal(format!("Failed to read stdin: {e}")))?
        } else {
            std::fs::read_to_string(path)
                .map_err(|e| ConsoleError::internal(format!("Failed to read script file: {e}")))?
        };

        self.load_events(&content)
    }

    /// Runs the scripted events and returns the result.
    pub async fn run(mut self) -> Result<HeadlessResult> {
        let start_time = Instant::now();

        self.capture_frame(None)?;

        let events = std::mem::take(&mut self.events);
        let mut events_executed = 0;

        for event in events {
            debug!("Headless event: {}", event);
            let description = event.to_string();

            match &event {
                Event::Key(key) => {
                    self.app.handle_event(crate::tui::Event::Key(*key));
                }
                Event::Type(text) => {
                    self.app.console.edit(|buffer| {
                        for c in text.chars() {
                            buffer.insert(c);
                        }
                    });
                    self.app.sync();
                }
                Event::Wait(duration) => self.pump(*duration).await,
                Event::Resize(width, height) => {
                    self.terminal
                        .resize(Rect::new(0, 0, *width, *height))
                        .map_err(|e| ConsoleError::internal(format!("Resize failed: {e}")))?;
                }
                Event::Assert(assertion) => {
                    self.draw()?;
                    let screen = self.render_screen();
                    let state = HeadlessState::from_app(&self.app);
                    if assertion.check(&screen, &state) {
                        self.assertions_passed += 1;
                    } else {
                        warn!("Assertion failed: {}", description);
                        self.failures.push(description.clone());
                        if self.config.fail_fast {
                            events_executed += 1;
                            break;
                        }
                    }
                }
            }

            // Completions that are already queued belong to this step.
            if self.app.console.drain() > 0 {
                self.app.sync();
            }

            events_executed += 1;

            if self.config.output_format == OutputFormat::Frames {
                self.capture_frame(Some(description))?;
            }

            if !self.app.running {
                break;
            }
        }

        self.draw()?;
        let screen = self.render_screen();
        let screen_lines = screen.lines().map(String::from).collect();
        self.app.console.shutdown();

        Ok(HeadlessResult {
            screen,
            screen_lines,
            events_executed,
            duration: start_time.elapsed(),
            assertions_passed: self.assertions_passed,
            assertions_failed: self.failures.len(),
            failures: self.failures,
            state: HeadlessState::from_app(&self.app),
            frames: self.frames,
        })
    }

    /// Applies completions as they arrive until `duration` has passed.
    async fn pump(&mut self, duration: Duration) {
        let deadline = tokio::time::Instant::now() + duration;
        while let Ok(Some(completion)) =
            tokio::time::timeout_at(deadline, self.app.console.next_completion()).await
        {
            self.app.console.apply(completion);
            self.app.sync();
        }
    }

    fn draw(&mut self) -> Result<()> {
        self.terminal
            .draw(|frame| ui::render(frame, &self.app))
            .map_err(|e| ConsoleError::internal(format!("Failed to render: {e}")))?;
        Ok(())
    }

    fn render_screen(&self) -> String {
        ScreenRenderer::render(self.terminal.backend().buffer())
    }

    fn capture_frame(&mut self, event: Option<String>) -> Result<()> {
        self.draw()?;
        let screen = self.render_screen();
        let number = self.frames.len();
        self.frames.push(Frame {
            number,
            event,
            screen,
        });
        Ok(())
    }
}

/// Runs headless mode from CLI arguments. Returns the process exit code.
pub async fn run_headless(cli: &Cli, config: &Config) -> Result<i32> {
    cli.validate_headless().map_err(ConsoleError::config)?;

    let headless = HeadlessConfig::from_cli(cli)?;

    let (api, service_info): (Arc<dyn ApiClient>, String) = if cli.mock_api {
        info!("Using in-memory mock service");
        (Arc::new(MockApiClient::new()), "mock".to_string())
    } else {
        (api::connect(&config.api)?, config.api.display_string())
    };

    let mut console = Console::new(api, config.editor.debounce());
    console.start();

    let mut runner = HeadlessRunner::new(headless.clone(), App::new(console, service_info))?;
    if let Some(events) = &cli.events {
        runner.load_events(events)?;
    } else if let Some(script) = &cli.script {
        runner.load_script(script)?;
    }

    let result = runner.run().await?;

    let output = HeadlessOutput::new(headless.output_format).format(&result);
    match &headless.output_file {
        Some(path) => std::fs::write(path, &output)
            .map_err(|e| ConsoleError::internal(format!("Failed to write output file: {e}")))?,
        None => print!("{output}"),
    }

    Ok(if result.assertions_failed > 0 { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(script: &str) -> HeadlessRunner {
        let mut console = Console::new(
            Arc::new(MockApiClient::new()),
            Duration::from_millis(300),
        );
        console.start();
        let mut runner =
            HeadlessRunner::new(HeadlessConfig::default(), App::new(console, "mock")).unwrap();
        runner.load_events(script).unwrap();
        runner
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_populates_databases() {
        let result = runner("wait:1s,assert:state:database_count=3,assert:contains:information_schema")
            .run()
            .await
            .unwrap();
        assert_eq!(result.failures, Vec::<String>::new());
        assert_eq!(result.assertions_passed, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_use_statement_switches_database() {
        let result = runner(
            "type:USE shop;\nkey:f5\nwait:1s\nassert:state:active_database=shop\nassert:contains:users",
        )
        .run()
        .await
        .unwrap();
        assert_eq!(result.failures, Vec::<String>::new());
        assert_eq!(result.state.result_success, Some(true));
        assert_eq!(result.state.table_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_assertion_is_counted() {
        let result = runner("assert:contains:no such text,assert:state:busy=false")
            .run()
            .await
            .unwrap();
        assert_eq!(result.assertions_failed, 1);
        assert_eq!(result.assertions_passed, 1);
        assert_eq!(result.failures, vec!["assert:contains:no such text"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_fast_stops() {
        let mut console = Console::new(
            Arc::new(MockApiClient::new()),
            Duration::from_millis(300),
        );
        console.start();
        let config = HeadlessConfig {
            fail_fast: true,
            ..HeadlessConfig::default()
        };
        let mut runner = HeadlessRunner::new(config, App::new(console, "mock")).unwrap();
        runner
            .load_events("assert:state:busy=true,type:SELECT 1;")
            .unwrap();

        let result = runner.run().await.unwrap();
        assert_eq!(result.events_executed, 1);
        assert_eq!(result.state.buffer_text, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_requests_suggestions_after_wait() {
        let result = runner("type:SEL,wait:1s,assert:state:suggestions_visible=true")
            .run()
            .await
            .unwrap();
        assert_eq!(result.failures, Vec::<String>::new());
        assert_eq!(result.state.suggestion_count, 2);
    }

    #[test]
    fn test_state_field_lookup() {
        let state = HeadlessState {
            buffer_text: String::new(),
            focus: "Editor".to_string(),
            busy: false,
            analyzing: false,
            suggestions_visible: false,
            suggestion_count: 0,
            suggestion_selected: 0,
            active_database: None,
            database_count: 0,
            table_count: 0,
            result_success: None,
            running: true,
        };
        assert_eq!(state.field("active_database").as_deref(), Some("none"));
        assert_eq!(state.field("focus").as_deref(), Some("Editor"));
        assert_eq!(state.field("nope"), None);
    }
}
