//! Command-line argument parsing for querydesk.

use clap::Parser;
use std::path::PathBuf;

/// Output format for headless mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text output of the final screen.
    #[default]
    Text,
    /// JSON output with screen, state, and metadata.
    Json,
    /// Frame-by-frame output showing state after each event.
    Frames,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "frames" => Ok(Self::Frames),
            _ => Err(format!(
                "Invalid output format: {s}. Expected: text, json, or frames"
            )),
        }
    }
}

/// A terminal console for composing, analyzing and running SQL against a
/// remote query service.
#[derive(Parser, Debug)]
#[command(name = "querydesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the query service API (e.g., http://localhost:5000/api)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Quiet interval before autocomplete is requested, in milliseconds
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    // === Headless mode options ===
    /// Run in headless mode (no terminal UI, for testing/automation)
    #[arg(long)]
    pub headless: bool,

    /// Use the in-memory mock service instead of HTTP
    #[arg(long)]
    pub mock_api: bool,

    /// Comma-separated events to execute in headless mode (e.g., "type:USE shop;,key:f5")
    #[arg(long, value_name = "EVENTS")]
    pub events: Option<String>,

    /// Path to script file with events (use "-" for stdin)
    #[arg(long, value_name = "PATH")]
    pub script: Option<String>,

    /// Screen size for headless mode (WIDTHxHEIGHT, e.g., "100x30")
    #[arg(long, value_name = "SIZE", default_value = "100x30")]
    pub size: String,

    /// Output format for headless mode
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub output: String,

    /// Write output to file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Stop on first assertion failure
    #[arg(long)]
    pub fail_fast: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }

    /// Returns true if headless mode is enabled.
    pub fn is_headless(&self) -> bool {
        self.headless
    }

    /// Parses the screen size from the --size argument.
    /// Returns (width, height) or an error.
    pub fn parse_screen_size(&self) -> std::result::Result<(u16, u16), String> {
        let (width, height) = self.size.split_once('x').ok_or_else(|| {
            format!(
                "Invalid size format: '{}'. Expected WIDTHxHEIGHT (e.g., 100x30)",
                self.size
            )
        })?;
        let width = width
            .parse::<u16>()
            .map_err(|_| format!("Invalid width: '{width}'"))?;
        let height = height
            .parse::<u16>()
            .map_err(|_| format!("Invalid height: '{height}'"))?;
        Ok((width, height))
    }

    /// Parses the output format from the --output argument.
    pub fn parse_output_format(&self) -> std::result::Result<OutputFormat, String> {
        self.output.parse()
    }

    /// Validates headless mode arguments.
    pub fn validate_headless(&self) -> std::result::Result<(), String> {
        if !self.headless {
            return Ok(());
        }

        if self.events.is_none() && self.script.is_none() {
            return Err("--headless requires --events or --script".to_string());
        }

        self.parse_screen_size()?;
        self.parse_output_format()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_parse_api_url_and_debounce() {
        let cli = parse_args(&[
            "querydesk",
            "--api-url",
            "http://db:5000/api",
            "--debounce-ms",
            "120",
        ]);
        assert_eq!(cli.api_url.as_deref(), Some("http://db:5000/api"));
        assert_eq!(cli.debounce_ms, Some(120));
        assert!(!cli.is_headless());
    }

    #[test]
    fn test_config_path_default() {
        let cli = parse_args(&["querydesk"]);
        assert!(cli.config_path().ends_with("querydesk/config.toml"));
    }

    #[test]
    fn test_config_path_custom() {
        let cli = parse_args(&["querydesk", "--config", "/tmp/custom.toml"]);
        assert_eq!(cli.config_path(), PathBuf::from("/tmp/custom.toml"));
    }

    #[test]
    fn test_headless_flags() {
        let cli = parse_args(&[
            "querydesk",
            "--headless",
            "--mock-api",
            "--events",
            "type:USE shop;,key:f5",
            "--size",
            "120x40",
            "--output",
            "json",
            "--fail-fast",
        ]);

        assert!(cli.headless);
        assert!(cli.mock_api);
        assert_eq!(cli.events.as_deref(), Some("type:USE shop;,key:f5"));
        assert_eq!(cli.parse_screen_size(), Ok((120, 40)));
        assert_eq!(cli.parse_output_format(), Ok(OutputFormat::Json));
        assert!(cli.fail_fast);
        assert!(cli.validate_headless().is_ok());
    }

    #[test]
    fn test_headless_requires_events_or_script() {
        let cli = parse_args(&["querydesk", "--headless"]);
        let err = cli.validate_headless().unwrap_err();
        assert!(err.contains("--events or --script"));
    }

    #[test]
    fn test_invalid_size_rejected() {
        let cli = parse_args(&["querydesk", "--headless", "--events", "x", "--size", "80"]);
        assert!(cli.validate_headless().unwrap_err().contains("Invalid size"));

        let cli = parse_args(&["querydesk", "--size", "80xtall"]);
        assert_eq!(cli.parse_screen_size(), Err("Invalid height: 'tall'".to_string()));
    }

    #[test]
    fn test_invalid_output_format() {
        let cli = parse_args(&["querydesk", "--output", "html"]);
        assert!(cli.parse_output_format().is_err());
    }
}
