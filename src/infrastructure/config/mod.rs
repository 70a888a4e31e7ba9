//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment: programmatic defaults,
//! project YAML files, and `TESTQUEST_*` environment overrides, validated
//! after extraction. The config itself (report locations, rule allow-list,
//! logging) lives in the domain layer.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
