//! BalanceWatch CLI
//!
//! Runs a single oracle admin balance check. Meant to be invoked on a schedule.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use balancewatch::alerting::{BalanceMonitor, MonitorSettings, TelegramNotifier};
use balancewatch::config::LoggingConfig;
use balancewatch::models::RunOutcome;
use balancewatch::sources::{http_client, CoinGeckoClient, ExplorerClient};
use balancewatch::store::RedisStore;
use balancewatch::{Config, Error};

/// Exit code when the explorer balance is not an integer
const EXIT_INVALID_BALANCE: u8 = 1;

/// Exit code for every other fatal error
const EXIT_FATAL: u8 = 2;

/// BalanceWatch - oracle admin balance alerts
#[derive(Parser)]
#[command(name = "balancewatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Load environment variables from this file instead of `./.env`
    #[arg(long, env = "BALANCEWATCH_ENV_FILE")]
    env_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let dotenv = match &cli.env_file {
        Some(path) => dotenvy::from_path(path).map(|()| Some(path.clone())),
        None => Ok(dotenvy::dotenv().ok()),
    };
    let env_file = match dotenv {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error loading environment file: {e}");
            return ExitCode::from(EXIT_FATAL);
        }
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::from(EXIT_FATAL);
        }
    };

    init_logging(&config.logging, cli.verbose);
    if let Some(path) = env_file {
        info!(path = %path.display(), "Loaded environment file");
    }

    let result = run(&config).await;
    report(&result);
    ExitCode::from(exit_code(&result))
}

/// Log the run result; the invalid-balance notice goes to stdout
fn report(result: &balancewatch::Result<RunOutcome>) {
    match result {
        Ok(RunOutcome::Alerted { threshold, balance_usd }) => {
            info!(threshold = %threshold.label, balance_usd, "Alert sent");
        }
        Ok(RunOutcome::NoAlert { balance_usd }) => {
            info!(balance_usd, "No alert needed");
        }
        Err(e @ Error::InvalidBalance(_)) => {
            error!(error = %e, "Cannot get oracle admin balance");
            println!("Error: cannot get oracle admin balance");
        }
        Err(e) => {
            error!(error = %e, "Balance check failed");
            eprintln!("Error: {e}");
        }
    }
}

/// Process exit status for a finished run
fn exit_code(result: &balancewatch::Result<RunOutcome>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(e) if e.is_invalid_balance() => EXIT_INVALID_BALANCE,
        Err(_) => EXIT_FATAL,
    }
}

async fn run(config: &Config) -> balancewatch::Result<RunOutcome> {
    let client = http_client()?;

    let monitor = BalanceMonitor::new(
        CoinGeckoClient::new(client.clone(), &config.price.api_url),
        ExplorerClient::new(
            client.clone(),
            &config.explorer.api_url,
            config.explorer.api_keys.clone(),
        ),
        RedisStore::new(&config.redis)?,
        TelegramNotifier::new(client, &config.telegram),
        MonitorSettings::from(config),
    );

    monitor.run().await
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let log_level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
