//! Classification outcomes reported per frame.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Posture category relative to the calibrated baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureState {
    /// No posture baseline has been captured yet.
    NotCalibrated,
    /// No deviation rule matched.
    Good,
    /// Eyes dropped towards the shoulders.
    Hunchback,
    /// Shoulder line tilted away from the baseline angle.
    UnevenShoulders,
    /// Head shifted sideways/forward relative to the shoulders.
    ForwardHead,
}

impl fmt::Display for PostureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotCalibrated => "not calibrated",
            Self::Good => "good posture",
            Self::Hunchback => "possible hunchback",
            Self::UnevenShoulders => "uneven shoulders",
            Self::ForwardHead => "forward head posture",
        })
    }
}

/// Summary of the eye signal for status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeStatus {
    Normal,
    /// Eyes held below the drowsiness threshold for too long.
    Drowsy,
    /// Calibrated and blinking less than the status threshold.
    LowBlinkRate,
}

impl fmt::Display for EyeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "eyes normal",
            Self::Drowsy => "getting drowsy",
            Self::LowBlinkRate => "low blink rate",
        })
    }
}

/// Why an alert was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertReason {
    /// No blink for longer than the focus limit.
    FocusWithoutBlinking,
    /// Blink rate stayed low for the sustain window.
    LowBlinkRate,
    /// Drowsiness or a yawn was detected.
    Tired,
    /// Session limit reached; time for a 20-20-20 break.
    BreakReminder,
}

impl AlertReason {
    /// User-facing alert text.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::FocusWithoutBlinking => "Focusing too long without blinking",
            Self::LowBlinkRate => "Low blink rate - possible eye strain",
            Self::Tired => "You look tired - take a break",
            Self::BreakReminder => "20-20-20 reminder: look 20 feet away for 20 seconds",
        }
    }
}

impl fmt::Display for AlertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Which calibration(s) a control event starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationTarget {
    Eyes,
    Posture,
    Both,
}

impl CalibrationTarget {
    #[must_use]
    pub const fn includes_eyes(self) -> bool {
        matches!(self, Self::Eyes | Self::Both)
    }

    #[must_use]
    pub const fn includes_posture(self) -> bool {
        matches!(self, Self::Posture | Self::Both)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posture_labels() {
        assert_eq!(PostureState::Hunchback.to_string(), "possible hunchback");
        assert_eq!(PostureState::NotCalibrated.to_string(), "not calibrated");
    }

    #[test]
    fn test_alert_reason_serializes_snake_case() {
        let json = serde_json::to_string(&AlertReason::BreakReminder).unwrap_or_default();
        assert_eq!(json, "\"break_reminder\"");
    }

    #[test]
    fn test_calibration_target_parts() {
        assert!(CalibrationTarget::Both.includes_eyes());
        assert!(CalibrationTarget::Both.includes_posture());
        assert!(!CalibrationTarget::Eyes.includes_posture());
        assert!(!CalibrationTarget::Posture.includes_eyes());
    }
}
