//! Tracing setup. The daemon and TUI log to a rolling file under the
//! cache directory (their stdout is busy or owned by raw mode); the
//! one-shot modes stay silent unless `--verbose` sends logs to stderr.

use crate::cli::Cli;
use anyhow::Result;
use ppulse_core::config::Config;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "PPULSE_LOG";

pub fn init(config: &Config, cli: &Cli) -> Result<()> {
    if cli.daemon || cli.tui {
        let log_dir = config.cache_dir.join("logs");
        std::fs::create_dir_all(&log_dir)?;
        let appender = tracing_appender::rolling::daily(log_dir, "ppulse.log");
        // The guard must outlive the process; leaking it keeps the
        // non-blocking writer flushing until exit.
        let (writer, guard) = tracing_appender::non_blocking(appender);
        Box::leak(Box::new(guard));
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        return Ok(());
    }

    let filter = if cli.verbose {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("error"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
