//! # runtime
//!
//! Ambient process support for the demo server: layered YAML/env
//! configuration loading (`figment`) and structured logging setup
//! (`tracing`/`tracing-subscriber` with rotating log files).

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{AppConfig, CliArgs, LoggingConfig, Section, ServerConfig};
