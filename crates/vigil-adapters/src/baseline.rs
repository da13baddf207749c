//! JSON file storage for calibrated baselines.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};
use vigil_core::{BaselineStore, MetricSet};

/// Baseline persisted as a flat JSON object of metric name to value.
pub struct JsonBaselineStore {
    path: PathBuf,
}

impl JsonBaselineStore {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Returns the default baseline file path.
///
/// Uses `XDG_DATA_HOME/vigil/baseline.json` or `~/.local/share/vigil/baseline.json`.
#[must_use]
pub fn default_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vigil")
        .join("baseline.json")
}

impl BaselineStore for JsonBaselineStore {
    fn load(&self) -> Result<Option<MetricSet>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No baseline at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read baseline: {}", self.path.display()))
            }
        };

        let baseline: MetricSet = serde_json::from_str(&content)
            .with_context(|| format!("Invalid baseline file: {}", self.path.display()))?;
        debug!(
            "Loaded baseline with {} metrics from {}",
            baseline.len(),
            self.path.display()
        );
        Ok(Some(baseline))
    }

    fn save(&self, baseline: &MetricSet) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create baseline directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(baseline)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write baseline: {}", self.path.display()))?;
        info!("Saved baseline to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Removed baseline {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove baseline: {}", self.path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_file_name() {
        let path = default_path();
        assert!(path.ends_with("vigil/baseline.json"));
    }
}
