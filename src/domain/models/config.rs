use serde::{Deserialize, Serialize};

/// Main configuration structure for Testquest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Report location configuration
    #[serde(default)]
    pub reports: ReportsConfig,

    /// Challenge curation configuration
    #[serde(default)]
    pub challenges: ChallengesConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where a build leaves its analysis reports, relative to the workspace root
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReportsConfig {
    /// Directory holding the per-package coverage HTML views
    #[serde(default = "default_coverage_dir")]
    pub coverage_dir: String,

    /// Name of the aggregate coverage CSV inside `coverage_dir`
    #[serde(default = "default_csv_name")]
    pub csv_name: String,

    /// Path of the style-check HTML report
    #[serde(default = "default_style_report")]
    pub style_report: String,

    /// Path component marking the source root; everything before it is
    /// discarded when building the style report anchor name
    #[serde(default = "default_style_root_marker")]
    pub style_root_marker: String,
}

fn default_coverage_dir() -> String {
    "target/site/coverage".to_string()
}

fn default_csv_name() -> String {
    "coverage.csv".to_string()
}

fn default_style_report() -> String {
    "target/site/style.html".to_string()
}

fn default_style_root_marker() -> String {
    "src".to_string()
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            coverage_dir: default_coverage_dir(),
            csv_name: default_csv_name(),
            style_report: default_style_report(),
            style_root_marker: default_style_root_marker(),
        }
    }
}

/// Which findings are worth challenging
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChallengesConfig {
    /// Style rules eligible for challenges. A curation filter, not a
    /// technical constraint: rules can be added or removed as desired.
    #[serde(default = "default_style_rules")]
    pub style_rules: Vec<String>,
}

fn default_style_rules() -> Vec<String> {
    [
        "MissingJavadocMethod",
        "FinalLocalVariable",
        "InnerAssignment",
        "SimplifyBooleanExpression",
        "FinalClass",
        "HideUtilityClassConstructor",
        "InnerTypeLast",
        "OneTopLevelClass",
        "MutableException",
        "UnusedImports",
        "JavadocMissingWhitespaceAfterAsterisk",
        "MissingJavadocPackage",
        "JavadocContentLocation",
        "TrailingComment",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

impl Default for ChallengesConfig {
    fn default() -> Self {
        Self {
            style_rules: default_style_rules(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
