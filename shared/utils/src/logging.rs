use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::sync::Arc;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = build_filter(&config.level);
    let registry = tracing_subscriber::registry().with(env_filter);
    let log_file = config.file_path.as_deref().map(open_log_file).transpose()?;

    let json = config.format.eq_ignore_ascii_case("json");
    let installed = match (json, log_file) {
        (true, Some(file)) => registry
            .with(fmt::layer().json().with_span_events(FmtSpan::CLOSE).with_writer(Arc::new(file)))
            .try_init(),
        (true, None) => registry
            .with(fmt::layer().json().with_span_events(FmtSpan::CLOSE))
            .try_init(),
        (false, Some(file)) => registry
            .with(fmt::layer().with_ansi(false).with_target(false).with_writer(Arc::new(file)))
            .try_init(),
        (false, None) => registry.with(fmt::layer().with_target(false)).try_init(),
    };
    installed.context("Failed to install tracing subscriber")?;

    tracing::info!(level = %config.level, format = %config.format, "Logging initialized");
    Ok(())
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn open_log_file(path: &str) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_falls_back() {
        // Must not panic on a malformed directive.
        let _ = build_filter("not a level ===");
    }

    #[test]
    fn test_open_log_file_reports_path() {
        let err = open_log_file("/nonexistent-dir/cv-mailer.log").unwrap_err();
        assert!(err.to_string().contains("/nonexistent-dir/cv-mailer.log"));
    }
}
