//! # Symres Utilities
//!
//! Shared utilities for the symres workspace.
//!
//! Currently this is the logging setup built on `tracing`, shared by the
//! command-line front end and any harness that embeds `symres-core`.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_with_format, init_logging_with_level, LogFormat, LogLevel, LoggingError, LoggingGuard};
pub use tracing::{debug, error, info, trace, warn};
