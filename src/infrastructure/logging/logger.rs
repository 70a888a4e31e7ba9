use anyhow::Result;
use std::io;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::domain::models::config::LoggingConfig;

/// Logger implementation using tracing
///
/// The engine itself only emits `tracing` events; installing a subscriber
/// is optional by construction, nothing in the evaluation path fails when
/// no logger was initialized.
pub struct LoggerImpl;

impl LoggerImpl {
    /// Initialize the global subscriber with the given configuration.
    ///
    /// # Errors
    /// Returns an error on an unknown level or format, or when a global
    /// subscriber is already installed.
    pub fn init(config: &LoggingConfig) -> Result<()> {
        let default_level = parse_log_level(&config.level)?;

        let env_filter = EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy();

        match config.format.as_str() {
            "json" => {
                let stdout_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stdout)
                    .with_current_span(true)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(env_filter);

                tracing_subscriber::registry().with(stdout_layer).try_init()?;
            }
            "pretty" => {
                let stdout_layer = tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(io::stdout)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_filter(env_filter);

                tracing_subscriber::registry().with(stdout_layer).try_init()?;
            }
            other => anyhow::bail!("Invalid log format: {other}"),
        }

        tracing::info!(
            level = %config.level,
            format = %config.format,
            "logger initialized"
        );

        Ok(())
    }
}

/// Parse log level string to Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {level}"),
    }
}

// Re-export tracing macros for convenience
pub use tracing::{debug, error, info, instrument, trace, warn};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert!(matches!(parse_log_level("trace"), Ok(Level::TRACE)));
        assert!(matches!(parse_log_level("debug"), Ok(Level::DEBUG)));
        assert!(matches!(parse_log_level("info"), Ok(Level::INFO)));
        assert!(matches!(parse_log_level("warn"), Ok(Level::WARN)));
        assert!(matches!(parse_log_level("error"), Ok(Level::ERROR)));
        assert!(matches!(parse_log_level("TRACE"), Ok(Level::TRACE)));
        assert!(parse_log_level("invalid").is_err());
    }

    #[test]
    fn test_init_rejects_unknown_format() {
        let config = LoggingConfig {
            level: "info".to_string(),
            format: "xml".to_string(),
        };
        assert!(LoggerImpl::init(&config).is_err());
    }

    #[test]
    fn test_logger_init_stdout_only() {
        let config = LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        };

        // First initialization in this process wins; tests running after it
        // see the already-installed subscriber error, which is also fine.
        let _ = LoggerImpl::init(&config);
    }
}
