//! Error-reporting sinks for failed delivery attempts.

use std::error::Error as StdError;

/// Write-only sink for failed attempts.
///
/// Called inline on the sending task, so implementations must return
/// promptly. Reporting cannot fail the send.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, description: &str, cause: &(dyn StdError + 'static));
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn report(&self, _description: &str, _cause: &(dyn StdError + 'static)) {}
}

/// Emits each report as a `tracing` error event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, description: &str, cause: &(dyn StdError + 'static)) {
        tracing::error!(error = %cause, "{}", description);
    }
}
