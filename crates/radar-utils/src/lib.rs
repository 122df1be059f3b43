//! Shared utilities for stock-radar
//!
//! Logging setup and process-level settings used by the binary.

pub mod config;
pub mod logging;

pub use config::{LogFormat, Settings};
pub use logging::init_tracing;
