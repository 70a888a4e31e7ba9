use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Coverage directory cannot be empty")]
    EmptyCoverageDir,

    #[error("Coverage CSV name cannot be empty")]
    EmptyCsvName,

    #[error("Style report path cannot be empty")]
    EmptyStyleReport,

    #[error("Style root marker cannot be empty")]
    EmptyRootMarker,

    #[error("Style rule allow-list cannot be empty")]
    NoStyleRules,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .testquest/config.yaml (project config)
    /// 3. .testquest/local.yaml (project local overrides, optional)
    /// 4. Environment variables (TESTQUEST_* prefix, highest priority)
    ///
    /// Configuration is always project-local (pwd/.testquest/) so each CI
    /// project can point at its own report layout.
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".testquest/config.yaml"))
            .merge(Yaml::file(".testquest/local.yaml"))
            .merge(Env::prefixed("TESTQUEST_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.reports.coverage_dir.is_empty() {
            return Err(ConfigError::EmptyCoverageDir);
        }

        if config.reports.csv_name.is_empty() {
            return Err(ConfigError::EmptyCsvName);
        }

        if config.reports.style_report.is_empty() {
            return Err(ConfigError::EmptyStyleReport);
        }

        if config.reports.style_root_marker.is_empty() {
            return Err(ConfigError::EmptyRootMarker);
        }

        if config.challenges.style_rules.is_empty() {
            return Err(ConfigError::NoStyleRules);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
