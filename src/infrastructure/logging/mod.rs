//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty log formatting
//! - EnvFilter-based level control

pub mod logger;

pub use logger::LoggerImpl;
