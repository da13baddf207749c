//! Stateful per-frame detectors.
//!
//! Each detector is total over `(metric, now)`: every input has a defined
//! next state. Callers skip a detector entirely on frames without metrics.

mod blink;
mod drowsiness;
mod posture;
mod yawn;

pub use blink::{BlinkConfig, BlinkStateMachine, BlinkUpdate};
pub use drowsiness::{DrowsinessMonitor, DrowsinessState};
pub use posture::{PostureClassifier, PostureThresholds};
pub use yawn::{YawnConfig, YawnDetector};
