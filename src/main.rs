//! querydesk - a terminal console for a remote SQL query service.

use querydesk::cli::Cli;
use querydesk::config::{Config, API_URL_ENV};
use querydesk::error::Result;
use querydesk::{api, logging, tui};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env before the environment is read for overrides
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();

    if cli.is_headless() {
        logging::init_stderr_logging();
    } else {
        logging::init_file_logging();
    }

    match run(&cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            if !cli.is_headless() {
                eprintln!("Error: {e}");
            }
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> Result<i32> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;

    config.apply_overrides(
        cli.api_url.as_deref(),
        std::env::var(API_URL_ENV).ok(),
        cli.debounce_ms,
    );
    config.api.validate()?;
    info!("Query service: {}", config.api.display_string());

    if cli.is_headless() {
        return tui::headless::run_headless(cli, &config).await;
    }

    let api = api::connect(&config.api)?;
    tui::run(&config, api).await?;
    Ok(0)
}
