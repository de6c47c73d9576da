//! Rotation check: peak board rotation across the attempt window must land in
//! the rule's band. Only the magnitude is measured; direction and
//! consistency of the spin are not.

use serde::{Deserialize, Serialize};

use super::{format_degrees, format_degrees_outside};
use crate::arbitration::config::ArbitrationConfig;
use crate::arbitration::phases::TrickPhases;
use crate::models::{FrameSample, TrickRule};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RotationCheck {
    pub valid: bool,
    /// Peak rotation in degrees; absent when rotation was not checked
    pub angle: Option<f64>,
    /// Label disputing the requested trick, if the analysis produced one
    pub detected_trick: Option<String>,
    /// User-facing explanation on failure
    pub reason: Option<String>,
}

impl RotationCheck {
    fn not_required() -> Self {
        Self { valid: true, ..Self::default() }
    }
}

/// Largest `|angle(i) - angle(attempt.start)|` over the attempt window.
pub fn max_rotation(sequence: &[FrameSample], phases: &TrickPhases) -> Option<f64> {
    let attempt = phases.attempt?;
    let initial = sequence.get(attempt.start).map(FrameSample::board_angle).unwrap_or(0.0);

    let peak = sequence[attempt.clamped(sequence.len())]
        .iter()
        .map(|frame| (frame.board_angle() - initial).abs())
        .fold(0.0_f64, f64::max);
    Some(peak)
}

/// Check the attempt window against the rule's rotation band.
///
/// Rules without a required rotation pass without reporting an angle.
pub fn check_rotation(
    sequence: &[FrameSample],
    phases: &TrickPhases,
    rule: &TrickRule,
    config: &ArbitrationConfig,
) -> RotationCheck {
    if !rule.checks_rotation() {
        return RotationCheck::not_required();
    }
    let Some(measured) = max_rotation(sequence, phases) else {
        return RotationCheck::not_required();
    };

    let min = rule.min_rotation_deg.unwrap_or(config.default_min_rotation_deg);
    let max = rule.max_rotation_deg.unwrap_or(config.default_max_rotation_deg);
    let valid = measured >= min && measured <= max;

    RotationCheck {
        valid,
        angle: Some(measured),
        detected_trick: None,
        reason: (!valid).then(|| {
            format!(
                "rotation of {}° outside accepted band [{}-{}]°",
                format_degrees_outside(measured, min, max),
                format_degrees(min),
                format_degrees(max)
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitration::detectors::test_support::frames_with_angles;
    use crate::arbitration::phases::segment;

    /// 20 frames ramping linearly from 0 at attempt.start (6) to `top` at attempt.end (14).
    fn ramp_to(top: f64) -> Vec<FrameSample> {
        let angles: Vec<f64> = (0..20)
            .map(|i| match i {
                0..=6 => 0.0,
                7..=13 => top * (i - 6) as f64 / 8.0,
                _ => top,
            })
            .collect();
        frames_with_angles(&angles)
    }

    fn kickflip() -> TrickRule {
        TrickRule::rotation(360.0, 320.0, 420.0).with_catch(true)
    }

    #[test]
    fn test_full_flip_in_band() {
        let frames = ramp_to(360.0);
        let check = check_rotation(&frames, &segment(&frames), &kickflip(), &ArbitrationConfig::default());
        assert!(check.valid);
        assert!((check.angle.unwrap() - 360.0).abs() < 1e-9);
        assert!(check.reason.is_none());
    }

    #[test]
    fn test_quarter_turn_out_of_band() {
        let frames = ramp_to(90.0);
        let check = check_rotation(&frames, &segment(&frames), &kickflip(), &ArbitrationConfig::default());
        assert!(!check.valid);
        let reason = check.reason.unwrap();
        assert!(reason.contains("90"), "{}", reason);
        assert!(reason.contains("[320-420]"), "{}", reason);
    }

    #[test]
    fn test_just_below_band_reports_unrounded_side() {
        let frames = ramp_to(319.96);
        let check = check_rotation(&frames, &segment(&frames), &kickflip(), &ArbitrationConfig::default());
        assert!(!check.valid);
        let reason = check.reason.unwrap();
        assert!(reason.starts_with("rotation of 319.9°"), "{}", reason);
        assert!(!reason.contains("rotation of 320°"), "{}", reason);
    }

    #[test]
    fn test_just_above_band_reports_unrounded_side() {
        let frames = ramp_to(420.04);
        let check = check_rotation(&frames, &segment(&frames), &kickflip(), &ArbitrationConfig::default());
        assert!(!check.valid);
        assert!(check.reason.unwrap().starts_with("rotation of 420.1°"));
    }

    #[test]
    fn test_over_rotation_fails() {
        let frames = ramp_to(540.0);
        let check = check_rotation(&frames, &segment(&frames), &kickflip(), &ArbitrationConfig::default());
        assert!(!check.valid);
        assert_eq!(check.angle, Some(540.0));
    }

    #[test]
    fn test_band_is_inclusive() {
        let frames = ramp_to(320.0);
        let check = check_rotation(&frames, &segment(&frames), &kickflip(), &ArbitrationConfig::default());
        assert!(check.valid);
    }

    #[test]
    fn test_no_required_rotation_is_vacuous() {
        let frames = ramp_to(720.0);
        let check = check_rotation(
            &frames,
            &segment(&frames),
            &TrickRule::ollie(),
            &ArbitrationConfig::default(),
        );
        assert!(check.valid);
        assert!(check.angle.is_none());
        assert!(check.reason.is_none());
    }

    #[test]
    fn test_unset_band_defaults_to_0_720() {
        let rule = TrickRule {
            required_rotation_deg: Some(180.0),
            ..TrickRule::default()
        };
        let frames = ramp_to(700.0);
        let check = check_rotation(&frames, &segment(&frames), &rule, &ArbitrationConfig::default());
        assert!(check.valid);
    }

    #[test]
    fn test_frames_after_attempt_are_ignored() {
        let mut angles = vec![0.0; 20];
        angles[18] = 360.0;
        let frames = frames_with_angles(&angles);
        let check = check_rotation(&frames, &segment(&frames), &kickflip(), &ArbitrationConfig::default());
        assert_eq!(check.angle, Some(0.0));
        assert!(!check.valid);
    }
}
