//! # jitmap Utilities
//!
//! Shared utilities and logging setup for jitmap.
//!
//! This crate provides the `tracing` subscriber setup a JIT host can install
//! before creating a listener.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_with_level, LogFormat, LogLevel, LoggingError};
pub use tracing::{debug, error, info, trace, warn};
