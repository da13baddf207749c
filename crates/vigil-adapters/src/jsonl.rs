//! JSON Lines adapter for recorded landmark sessions.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};
use vigil_core::{LandmarkSource, SessionRecord};

/// Extension of recorded session files.
const SESSION_EXTENSION: &str = "jsonl";

/// A recorded session stored as one JSON record per line.
///
/// Blank lines and lines starting with `#` are ignored. Lines that fail to
/// parse are yielded as errors carrying the line number, so the replay can
/// skip them and carry on.
pub struct JsonlSessionSource {
    path: PathBuf,
    name: String,
}

impl JsonlSessionSource {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        let name = path.to_string_lossy().into_owned();
        Self { path, name }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LandmarkSource for JsonlSessionSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn records(&self) -> Box<dyn Iterator<Item = Result<SessionRecord>> + Send + '_> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                let err = anyhow::Error::new(e)
                    .context(format!("Failed to open session: {}", self.path.display()));
                return Box::new(std::iter::once(Err(err)));
            }
        };

        let lines = BufReader::new(file).lines().enumerate();
        Box::new(lines.filter_map(|(index, line)| {
            let number = index + 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e).with_context(|| format!("line {number}"))),
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            Some(parse_record(trimmed).with_context(|| format!("line {number}")))
        }))
    }
}

/// Parses one session record.
///
/// # Errors
///
/// Returns an error if the line is not a valid frame or calibrate record.
pub fn parse_record(line: &str) -> Result<SessionRecord> {
    serde_json::from_str(line).context("Invalid session record")
}

/// Expands files and directories into a sorted list of session files.
///
/// Directories contribute their `*.jsonl` files (descending into
/// subdirectories when `recursive` is set). Files given explicitly are kept
/// regardless of extension. Missing paths are logged and skipped.
#[must_use]
pub fn discover_sessions(paths: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let start = files.len();
            collect_from_dir(path, recursive, &mut files);
            files[start..].sort();
        } else {
            warn!("Path does not exist: {}", path.display());
        }
    }

    debug!("Found {} session files", files.len());
    files
}

fn collect_from_dir(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!("Failed to read directory {}: {e}", dir.display());
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() && is_session_file(&path) {
            files.push(path);
        } else if path.is_dir() && recursive {
            collect_from_dir(&path, recursive, files);
        }
    }
}

fn is_session_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(SESSION_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_session_file() {
        assert!(is_session_file(Path::new("morning.jsonl")));
        assert!(is_session_file(Path::new("MORNING.JSONL")));
        assert!(!is_session_file(Path::new("morning.json")));
        assert!(!is_session_file(Path::new("jsonl")));
    }

    #[test]
    fn test_parse_calibrate_record() {
        let record = parse_record(r#"{"type":"calibrate","timestamp":1.5,"target":"posture"}"#);
        assert!(matches!(
            record,
            Ok(SessionRecord::Calibrate {
                target: vigil_core::CalibrationTarget::Posture,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        assert!(parse_record(r#"{"type":"keypress","timestamp":1.0}"#).is_err());
        assert!(parse_record("not json").is_err());
    }
}
