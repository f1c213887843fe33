//! SAN schedule updater CLI.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use san_plan_lib::infrastructure::config::ConfigManager;
use san_plan_lib::infrastructure::init_logging;
use san_plan_lib::UpdateRunner;

#[derive(Parser)]
#[command(name = "san-plan")]
#[command(version)]
#[command(
    about = "SAN schedule updater - fetch, parse and publish the Zarządzanie timetable",
    long_about = None
)]
struct Cli {
    /// Configuration file, created with defaults when missing
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Ignore the stored hash and process the PDF regardless of changes
    #[arg(long)]
    force: bool,

    /// Parse and log entries but do not persist anything
    #[arg(long)]
    dry_run: bool,

    /// Logging verbosity, overrides the configured level
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging needs the configured level and log directory, so the
    // configuration file is read before the subscriber comes up.
    let config = match ConfigManager::new(cli.config.clone()).load_config().await {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let level = cli
        .log_level
        .unwrap_or_else(|| config.logging.level.clone());
    let log_dir = config
        .logging
        .file_output
        .then(|| config.paths.log_dir.clone());
    if let Err(err) = init_logging(&level, log_dir.as_deref()) {
        eprintln!("Failed to initialise logging: {err:#}");
        return ExitCode::FAILURE;
    }

    let runner = UpdateRunner::new(config)
        .force(cli.force)
        .dry_run(cli.dry_run);

    match runner.run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Update failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}
