//! Landmark source port for recorded or live sessions.

use crate::domain::SessionRecord;

/// Port for reading a session's frame and control records in order.
pub trait LandmarkSource: Send + Sync {
    /// Human-readable name of the session (usually a file path).
    fn name(&self) -> &str;

    /// Returns an iterator over the session's records.
    ///
    /// # Errors
    ///
    /// Individual items may be errors if a record cannot be read or parsed;
    /// consumers skip them and keep going.
    fn records(&self) -> Box<dyn Iterator<Item = anyhow::Result<SessionRecord>> + Send + '_>;
}
