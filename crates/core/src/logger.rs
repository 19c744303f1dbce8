//! Debug logging capability
//!
//! Request and response dumps are handed to a [`DebugLogger`]. Dumps are
//! already redacted by the time they reach the logger.

use std::fmt;

/// Sink for request/response debug dumps
pub trait DebugLogger: Send + Sync + fmt::Debug {
    fn log(&self, dump: &str);
}

/// Forwards dumps to `tracing` at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl DebugLogger for TracingLogger {
    fn log(&self, dump: &str) {
        tracing::debug!(target: "bunny_storage::http", "{dump}");
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl DebugLogger for NoopLogger {
    fn log(&self, _dump: &str) {}
}
