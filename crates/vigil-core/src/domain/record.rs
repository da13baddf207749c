//! Recorded session wire format.
//!
//! A recorded session is a sequence of records, one per line in JSONL form:
//!
//! ```json
//! {"type":"frame","timestamp":0.033,"width":640,"height":480,"landmarks":{"nose":[0.5,0.4]}}
//! {"type":"calibrate","timestamp":0.066,"target":"both"}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{CalibrationTarget, LandmarkFrame, Point};

/// One entry of a recorded session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionRecord {
    /// A landmark frame captured at `timestamp`.
    Frame {
        timestamp: f64,
        width: u32,
        height: u32,
        landmarks: BTreeMap<String, Point>,
    },
    /// A calibration request (the user pressed the calibrate key).
    Calibrate {
        timestamp: f64,
        target: CalibrationTarget,
    },
}

impl SessionRecord {
    /// Wraps a landmark frame.
    #[must_use]
    pub fn frame(timestamp: f64, frame: LandmarkFrame) -> Self {
        Self::Frame {
            timestamp,
            width: frame.width,
            height: frame.height,
            landmarks: frame.points,
        }
    }

    /// Timestamp of the record.
    #[must_use]
    pub const fn timestamp(&self) -> f64 {
        match self {
            Self::Frame { timestamp, .. } | Self::Calibrate { timestamp, .. } => *timestamp,
        }
    }

    /// Converts a frame record into a [`LandmarkFrame`], canonicalizing names.
    #[must_use]
    pub fn into_frame(self) -> Option<LandmarkFrame> {
        match self {
            Self::Frame {
                width,
                height,
                landmarks,
                ..
            } => {
                let mut frame = LandmarkFrame::new(width, height);
                for (name, point) in landmarks {
                    frame.insert(&name, point);
                }
                Some(frame)
            }
            Self::Calibrate { .. } => None,
        }
    }
}
