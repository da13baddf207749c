//! Result output port for writing per-frame and per-session results.

use crate::domain::{FrameResult, SessionSummary};

/// Port for outputting monitoring results.
pub trait ResultOutput: Send + Sync {
    /// Writes the result of one frame.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_frame(&self, source: &str, result: &FrameResult) -> anyhow::Result<()>;

    /// Writes the summary of one session.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_summary(&self, summary: &SessionSummary) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
