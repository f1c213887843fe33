//! Logging system configuration and initialization
//!
//! Sets up tracing with:
//! - Console output for interactive runs
//! - Optional non-blocking file output under the configured log directory
//! - Level control via CLI/config with RUST_LOG override
//! - Noise suppression for sqlx/reqwest internals below TRACE

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use std::path::Path;
use std::sync::Mutex;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Log file name, kept stable so operators can tail it across runs.
const LOG_FILE_NAME: &str = "schedule_update.log";

// Global guard keeping the non-blocking file writer alive for process lifetime
static LOG_GUARDS: Lazy<Mutex<Vec<non_blocking::WorkerGuard>>> =
    Lazy::new(|| Mutex::new(Vec::new()));

/// Initialize the logging system.
///
/// `level` is the default filter for our own crate; dependencies are kept
/// quieter unless TRACE is requested or RUST_LOG overrides the whole filter.
/// When `log_dir` is given, output additionally goes to a file inside it.
pub fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = EnvFilter::new(level);

        if !level.to_lowercase().contains("trace") {
            filter = filter
                .add_directive("sqlx::query=warn".parse().unwrap())
                .add_directive("sqlx::sqlite=warn".parse().unwrap())
                .add_directive("reqwest=info".parse().unwrap())
                .add_directive("hyper=warn".parse().unwrap())
                .add_directive("h2=warn".parse().unwrap())
                .add_directive(format!("san_plan_lib={}", level).parse().unwrap());
        }

        filter
    });

    let registry = Registry::default().with(env_filter);

    // The console layer is built per match arm: its subscriber type parameter
    // is fixed by inference, and the two stacks below differ in shape.
    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", dir, e))?;

            let file_appender = rolling::never(dir, LOG_FILE_NAME);
            let (file_writer, file_guard) = non_blocking(file_appender);
            LOG_GUARDS.lock().unwrap().push(file_guard);

            // File layer with minimal formatting (time + level + message only)
            let file_layer = fmt::Layer::new()
                .with_writer(file_writer)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(false);

            let console_layer = fmt::Layer::new()
                .with_writer(std::io::stdout)
                .with_target(false);

            registry.with(file_layer).with(console_layer).init();
        }
        None => {
            let console_layer = fmt::Layer::new()
                .with_writer(std::io::stdout)
                .with_target(false);

            registry.with(console_layer).init();
        }
    }

    Ok(())
}
