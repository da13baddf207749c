use proptest::prelude::*;

use vigil_core::domain::names;
use vigil_core::signals::compute_ear;
use vigil_core::{
    AlertConfig, AlertEngine, AlertInputs, Baseline, BlinkConfig, BlinkStateMachine,
    CalibrationKind, CalibrationStatus, Calibrator, LandmarkFrame, MetricSet, MonitorConfig,
    Point, PostureClassifier, PostureMetrics, PostureState, WellnessMonitor,
};

fn point() -> impl Strategy<Value = Point> {
    (-1000.0_f64..1000.0, -1000.0_f64..1000.0).prop_map(|(x, y)| Point::new(x, y))
}

/// Minimal face frame: both eyes share the same contour shape.
fn frame(upper: f64, lower: f64) -> LandmarkFrame {
    let mut f = LandmarkFrame::new(640, 480);
    for (keys, cx) in [(names::LEFT_EYE, 0.35), (names::RIGHT_EYE, 0.65)] {
        let pts = [
            (cx - 0.05, 0.4),
            (cx - 0.02, 0.4 - upper),
            (cx + 0.02, 0.4 - upper),
            (cx + 0.05, 0.4),
            (cx + 0.02, 0.4 + lower),
            (cx - 0.02, 0.4 + lower),
        ];
        for (name, (x, y)) in keys.iter().zip(pts) {
            f = f.with_point(name, x, y);
        }
    }
    f
}

proptest! {
    #[test]
    fn pt_ear_finite_and_non_negative(
        p in prop::array::uniform6(point()),
    ) {
        let ear = compute_ear(&p);
        prop_assert!(ear.is_finite());
        prop_assert!(ear >= 0.0);
    }

    #[test]
    fn pt_ear_scale_invariant(
        p in prop::array::uniform6(point()),
        k in 0.1_f64..10.0,
    ) {
        prop_assume!(p[0].distance(&p[3]) > 1e-3);
        let scaled = p.map(|q| Point::new(q.x * k, q.y * k));
        let a = compute_ear(&p);
        let b = compute_ear(&scaled);
        prop_assert!((a - b).abs() <= 1e-9 * a.max(1.0));
    }

    #[test]
    fn pt_blink_rate_decays_to_zero(
        ears in prop::collection::vec(0.0_f64..0.4, 1..200),
        window in 5.0_f64..120.0,
    ) {
        let mut sm = BlinkStateMachine::new(BlinkConfig {
            window_seconds: window,
            ..BlinkConfig::default()
        });
        let mut t = 0.0;
        for ear in &ears {
            sm.update(*ear, 0.21, t);
            prop_assert!(sm.blink_rate() >= 0.0);
            t += 0.05;
        }
        sm.update(0.3, 0.21, t + window + 1.0);
        prop_assert!(sm.blink_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn pt_calibration_completes_once_with_mean(
        values in prop::collection::vec(0.05_f64..0.5, 1..80),
    ) {
        let mut cal = Calibrator::new(CalibrationKind::Eye);
        cal.start(values.len());
        let mut completed = Vec::new();
        for v in &values {
            if let CalibrationStatus::Completed(b) =
                cal.feed(Some(&MetricSet::new().with("avg_ear", *v)))
            {
                completed.push(b);
            }
        }
        // Extra samples after completion are ignored.
        let after = cal.feed(Some(&MetricSet::new().with("avg_ear", 1.0)));
        prop_assert_eq!(after, CalibrationStatus::Idle);
        prop_assert_eq!(completed.len(), 1);

        #[allow(clippy::cast_precision_loss)]
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let got = completed[0].get("avg_ear").unwrap_or(f64::NAN);
        prop_assert!((got - mean).abs() < 1e-9);
    }

    #[test]
    fn pt_posture_matches_own_baseline(
        ratio in 0.1_f64..3.0,
        angle in -180.0_f64..180.0,
        head in 0.0_f64..0.5,
    ) {
        let current = PostureMetrics {
            eye_shoulder_ratio: ratio,
            shoulder_angle: angle,
            head_forward: head,
        };
        let classifier = PostureClassifier::default();
        prop_assert_eq!(classifier.classify(&current, None), PostureState::NotCalibrated);

        let baseline = Baseline::new(current.to_metric_set());
        prop_assert_eq!(classifier.classify(&current, Some(&baseline)), PostureState::Good);
    }

    #[test]
    fn pt_surfaced_alerts_respect_cooldown(
        flags in prop::collection::vec(any::<bool>(), 1..300),
        cooldown in 1.0_f64..60.0,
    ) {
        let config = AlertConfig { cooldown, ..AlertConfig::default() };
        let mut engine = AlertEngine::new(config, 0.0);
        let mut last: Option<f64> = None;
        for (i, drowsy) in flags.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let now = i as f64 * 0.5;
            let inputs = AlertInputs {
                eyes_calibrated: false,
                blink_rate: 0.0,
                since_last_blink: 0.0,
                drowsy: *drowsy,
                yawning: false,
            };
            if engine.evaluate(&inputs, now).surfaced.is_some() {
                if let Some(prev) = last {
                    prop_assert!(now - prev > cooldown);
                }
                last = Some(now);
            }
        }
    }

    #[test]
    fn pt_monitor_is_deterministic(
        gaps in prop::collection::vec((0.0_f64..0.02, 0.0_f64..0.02), 1..120),
    ) {
        let mut a = WellnessMonitor::new(MonitorConfig::default(), 0.0);
        let mut b = WellnessMonitor::new(MonitorConfig::default(), 0.0);
        a.start_eye_calibration();
        b.start_eye_calibration();
        for (i, (upper, lower)) in gaps.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let now = i as f64 / 30.0;
            let f = frame(*upper, *lower);
            prop_assert_eq!(a.update(&f, now), b.update(&f, now));
        }
    }
}
