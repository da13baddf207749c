//! Baseline persistence port.

use crate::domain::MetricSet;

/// Port for loading and saving the flat baseline form.
pub trait BaselineStore: Send + Sync {
    /// Loads the stored baseline, or `None` if nothing has been saved.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored baseline exists but cannot be read.
    fn load(&self) -> anyhow::Result<Option<MetricSet>>;

    /// Replaces the stored baseline.
    ///
    /// # Errors
    ///
    /// Returns an error if the baseline cannot be written.
    fn save(&self, baseline: &MetricSet) -> anyhow::Result<()>;

    /// Removes the stored baseline. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored baseline exists but cannot be removed.
    fn clear(&self) -> anyhow::Result<bool>;
}
