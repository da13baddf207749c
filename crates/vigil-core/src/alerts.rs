//! Alert rules, cooldown gating and the 20-20-20 break timer.
//!
//! Rules are evaluated in a fixed order and the last matching rule decides the
//! candidate reason. A candidate is only surfaced once the cooldown since the
//! previously surfaced alert has elapsed.

use tracing::{debug, info};

use crate::domain::AlertReason;

/// Alert engine configuration, all durations in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertConfig {
    /// Time without a blink before the focus alert fires.
    pub focus_limit: f64,
    /// Blinks per minute under which the low-blink timer runs.
    pub low_blink_rate: f64,
    /// How long the low blink rate must persist.
    pub low_blink_sustain: f64,
    /// Work time before a break reminder.
    pub session_limit: f64,
    /// Length of the break.
    pub break_duration: f64,
    /// Minimum gap between surfaced alerts.
    pub cooldown: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            focus_limit: 10.0,
            low_blink_rate: 8.0,
            low_blink_sustain: 60.0,
            session_limit: 20.0 * 60.0,
            break_duration: 20.0,
            cooldown: 30.0,
        }
    }
}

/// Detector outputs the rules look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertInputs {
    /// Whether eye calibration has completed.
    pub eyes_calibrated: bool,
    /// Blinks per minute.
    pub blink_rate: f64,
    /// Seconds since the last committed blink.
    pub since_last_blink: f64,
    pub drowsy: bool,
    pub yawning: bool,
}

/// One entry of the ordered rule list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlertRule {
    FocusWithoutBlinking,
    LowBlinkRate,
    Tired,
    BreakReminder,
}

/// Evaluation order; a later match overrides an earlier one.
const RULES: [AlertRule; 4] = [
    AlertRule::FocusWithoutBlinking,
    AlertRule::LowBlinkRate,
    AlertRule::Tired,
    AlertRule::BreakReminder,
];

impl AlertRule {
    const fn reason(self) -> AlertReason {
        match self {
            Self::FocusWithoutBlinking => AlertReason::FocusWithoutBlinking,
            Self::LowBlinkRate => AlertReason::LowBlinkRate,
            Self::Tired => AlertReason::Tired,
            Self::BreakReminder => AlertReason::BreakReminder,
        }
    }
}

/// Work-session start plus break state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionClock {
    session_start: f64,
    break_start: Option<f64>,
}

impl SessionClock {
    #[must_use]
    pub const fn new(start: f64) -> Self {
        Self {
            session_start: start,
            break_start: None,
        }
    }

    /// Seconds of work time since the session clock was last reset.
    #[must_use]
    pub fn elapsed(&self, now: f64) -> f64 {
        now - self.session_start
    }

    #[must_use]
    pub const fn in_break(&self) -> bool {
        self.break_start.is_some()
    }

    #[must_use]
    pub const fn session_start(&self) -> f64 {
        self.session_start
    }

    fn start_break(&mut self, now: f64) {
        self.break_start = Some(now);
        self.session_start = now;
    }

    /// Advances the break timer; returns the remaining break time while a
    /// break is (or was, until this frame) active.
    fn tick_break(&mut self, now: f64, duration: f64) -> Option<f64> {
        let start = self.break_start?;
        let elapsed = now - start;
        let remaining = (duration - elapsed).max(0.0);
        if elapsed >= duration {
            self.break_start = None;
            self.session_start = now;
            info!("break complete");
        }
        Some(remaining)
    }
}

/// Outcome of one alert evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertDecision {
    /// Reason chosen by the rule list before cooldown gating.
    pub candidate: Option<AlertReason>,
    /// Reason surfaced to the user this frame.
    pub surfaced: Option<AlertReason>,
    /// Remaining break time while in a break.
    pub break_remaining: Option<f64>,
}

/// Rule list, cooldown gate and session clock.
#[derive(Debug, Clone)]
pub struct AlertEngine {
    config: AlertConfig,
    clock: SessionClock,
    low_blink_since: Option<f64>,
    last_surfaced: Option<f64>,
    current: Option<AlertReason>,
}

impl AlertEngine {
    #[must_use]
    pub const fn new(config: AlertConfig, start: f64) -> Self {
        Self {
            config,
            clock: SessionClock::new(start),
            low_blink_since: None,
            last_surfaced: None,
            current: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &AlertConfig {
        &self.config
    }

    #[must_use]
    pub const fn clock(&self) -> &SessionClock {
        &self.clock
    }

    /// Most recently surfaced reason.
    #[must_use]
    pub const fn current(&self) -> Option<AlertReason> {
        self.current
    }

    /// Runs the rule list for one frame.
    pub fn evaluate(&mut self, inputs: &AlertInputs, now: f64) -> AlertDecision {
        if !inputs.eyes_calibrated {
            self.low_blink_since = None;
        }

        let mut candidate = None;
        for rule in RULES {
            if self.matches(rule, inputs, now) {
                candidate = Some(rule.reason());
            }
        }

        let surfaced = candidate.filter(|_| self.cooldown_elapsed(now));
        if let Some(reason) = surfaced {
            self.last_surfaced = Some(now);
            self.current = Some(reason);
            info!("alert at {now:.2}s: {reason}");
        } else if let Some(reason) = candidate {
            debug!("alert suppressed by cooldown: {reason}");
        }

        let break_remaining = self.clock.tick_break(now, self.config.break_duration);

        AlertDecision {
            candidate,
            surfaced,
            break_remaining,
        }
    }

    fn matches(&mut self, rule: AlertRule, inputs: &AlertInputs, now: f64) -> bool {
        match rule {
            AlertRule::FocusWithoutBlinking => {
                inputs.eyes_calibrated && inputs.since_last_blink > self.config.focus_limit
            }
            AlertRule::LowBlinkRate => {
                if !inputs.eyes_calibrated {
                    return false;
                }
                if inputs.blink_rate >= self.config.low_blink_rate {
                    self.low_blink_since = None;
                    return false;
                }
                let since = *self.low_blink_since.get_or_insert(now);
                now - since > self.config.low_blink_sustain
            }
            AlertRule::Tired => inputs.drowsy || inputs.yawning,
            AlertRule::BreakReminder => {
                if self.clock.in_break() || self.clock.elapsed(now) < self.config.session_limit {
                    return false;
                }
                info!("session limit reached; break started");
                self.clock.start_break(now);
                true
            }
        }
    }

    fn cooldown_elapsed(&self, now: f64) -> bool {
        self.last_surfaced
            .map_or(true, |last| now - last > self.config.cooldown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calm() -> AlertInputs {
        AlertInputs {
            eyes_calibrated: true,
            blink_rate: 15.0,
            since_last_blink: 1.0,
            drowsy: false,
            yawning: false,
        }
    }

    #[test]
    fn test_no_alert_when_calm() {
        let mut engine = AlertEngine::new(AlertConfig::default(), 0.0);
        let decision = engine.evaluate(&calm(), 5.0);
        assert_eq!(decision.candidate, None);
        assert_eq!(decision.surfaced, None);
        assert_eq!(decision.break_remaining, None);
    }

    #[test]
    fn test_focus_rule_needs_calibration() {
        let mut engine = AlertEngine::new(AlertConfig::default(), 0.0);
        let staring = AlertInputs {
            since_last_blink: 12.0,
            ..calm()
        };
        let uncalibrated = AlertInputs {
            eyes_calibrated: false,
            ..staring
        };
        assert_eq!(engine.evaluate(&uncalibrated, 12.0).candidate, None);
        assert_eq!(
            engine.evaluate(&staring, 12.1).surfaced,
            Some(AlertReason::FocusWithoutBlinking)
        );
    }

    #[test]
    fn test_low_blink_must_be_sustained() {
        let mut engine = AlertEngine::new(AlertConfig::default(), 0.0);
        let low = AlertInputs {
            blink_rate: 4.0,
            ..calm()
        };
        assert_eq!(engine.evaluate(&low, 1.0).candidate, None);
        assert_eq!(engine.evaluate(&low, 61.0).candidate, None);
        assert_eq!(
            engine.evaluate(&low, 61.5).candidate,
            Some(AlertReason::LowBlinkRate)
        );
    }

    #[test]
    fn test_low_blink_timer_resets_on_recovery() {
        let mut engine = AlertEngine::new(AlertConfig::default(), 0.0);
        let low = AlertInputs {
            blink_rate: 4.0,
            ..calm()
        };
        engine.evaluate(&low, 1.0);
        engine.evaluate(&calm(), 50.0);
        assert_eq!(engine.evaluate(&low, 70.0).candidate, None);
        assert_eq!(engine.evaluate(&low, 120.0).candidate, None);
        assert_eq!(
            engine.evaluate(&low, 131.0).candidate,
            Some(AlertReason::LowBlinkRate)
        );
    }

    #[test]
    fn test_last_match_wins() {
        let mut engine = AlertEngine::new(AlertConfig::default(), 0.0);
        let both = AlertInputs {
            since_last_blink: 30.0,
            drowsy: true,
            ..calm()
        };
        assert_eq!(engine.evaluate(&both, 30.0).candidate, Some(AlertReason::Tired));
    }

    #[test]
    fn test_yawn_is_tired_even_uncalibrated() {
        let mut engine = AlertEngine::new(AlertConfig::default(), 0.0);
        let yawn = AlertInputs {
            eyes_calibrated: false,
            yawning: true,
            ..calm()
        };
        assert_eq!(engine.evaluate(&yawn, 3.0).surfaced, Some(AlertReason::Tired));
    }

    #[test]
    fn test_cooldown_suppresses_second_alert() {
        let mut engine = AlertEngine::new(AlertConfig::default(), 0.0);
        let tired = AlertInputs {
            drowsy: true,
            ..calm()
        };
        assert_eq!(engine.evaluate(&tired, 10.0).surfaced, Some(AlertReason::Tired));

        let decision = engine.evaluate(&tired, 25.0);
        assert_eq!(decision.candidate, Some(AlertReason::Tired));
        assert_eq!(decision.surfaced, None);

        assert_eq!(engine.evaluate(&tired, 40.0).surfaced, None);
        assert_eq!(engine.evaluate(&tired, 40.5).surfaced, Some(AlertReason::Tired));
        assert_eq!(engine.current(), Some(AlertReason::Tired));
    }

    #[test]
    fn test_break_cycle() {
        let config = AlertConfig::default();
        let mut engine = AlertEngine::new(config, 0.0);

        let decision = engine.evaluate(&calm(), 1199.0);
        assert_eq!(decision.candidate, None);

        let decision = engine.evaluate(&calm(), 1200.0);
        assert_eq!(decision.surfaced, Some(AlertReason::BreakReminder));
        assert_eq!(decision.break_remaining, Some(20.0));
        assert!(engine.clock().in_break());
        assert!((engine.clock().session_start() - 1200.0).abs() < f64::EPSILON);

        let mut last = 20.0;
        for t in [1205.0, 1210.0, 1219.0] {
            let remaining = engine.evaluate(&calm(), t).break_remaining.unwrap_or(-1.0);
            assert!(remaining < last);
            last = remaining;
        }

        let decision = engine.evaluate(&calm(), 1221.0);
        assert_eq!(decision.break_remaining, Some(0.0));
        assert!(!engine.clock().in_break());
        assert!((engine.clock().session_start() - 1221.0).abs() < f64::EPSILON);

        assert_eq!(engine.evaluate(&calm(), 1222.0).break_remaining, None);
    }

    #[test]
    fn test_no_second_reminder_during_break() {
        let config = AlertConfig {
            session_limit: 10.0,
            break_duration: 20.0,
            cooldown: 0.0,
            ..AlertConfig::default()
        };
        let mut engine = AlertEngine::new(config, 0.0);
        assert_eq!(
            engine.evaluate(&calm(), 10.0).surfaced,
            Some(AlertReason::BreakReminder)
        );
        assert_eq!(engine.evaluate(&calm(), 25.0).candidate, None);
    }
}
