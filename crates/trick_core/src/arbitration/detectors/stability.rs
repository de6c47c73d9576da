//! Stability check: after landing the board angle has to stay steady for
//! long enough.

use serde::{Deserialize, Serialize};

use crate::arbitration::config::ArbitrationConfig;
use crate::arbitration::phases::TrickPhases;
use crate::models::{FrameSample, TrickRule};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StabilityCheck {
    pub valid: bool,
    /// Landing window duration in ms, reported even on failure
    pub duration: Option<f64>,
    /// Population variance of the landing angles (deg²)
    pub variance: Option<f64>,
}

/// Population variance; 0 for an empty slice.
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

pub fn check_stability(
    sequence: &[FrameSample],
    phases: &TrickPhases,
    rule: &TrickRule,
    config: &ArbitrationConfig,
) -> StabilityCheck {
    let Some(land) = phases.land else {
        return StabilityCheck::default();
    };

    let timestamp_at = |pos: usize| sequence.get(pos).map(FrameSample::timestamp_or_zero).unwrap_or(0.0);
    let duration = timestamp_at(land.end) - timestamp_at(land.start);

    let angles: Vec<f64> = sequence[land.clamped(sequence.len())]
        .iter()
        .map(FrameSample::board_angle)
        .collect();
    let variance = population_variance(&angles);

    let min_duration = rule.min_stability_duration_ms.unwrap_or(config.default_min_stability_ms);
    let valid = variance < config.stability_max_variance && duration >= min_duration;

    StabilityCheck { valid, duration: Some(duration), variance: Some(variance) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitration::detectors::test_support::frames_with_angles;
    use crate::arbitration::phases::segment;

    #[test]
    fn test_variance() {
        assert_eq!(population_variance(&[]), 0.0);
        assert_eq!(population_variance(&[5.0, 5.0, 5.0]), 0.0);
        assert!((population_variance(&[178.0, 182.0]) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_steady_long_landing_is_stable() {
        // 50ms spacing, land window 14..=19 => 250ms
        let frames = frames_with_angles(&[180.0; 20]);
        let check = check_stability(&frames, &segment(&frames), &TrickRule::ollie(), &ArbitrationConfig::default());
        assert!(check.valid);
        assert_eq!(check.duration, Some(250.0));
    }

    #[test]
    fn test_short_landing_fails_but_reports_duration() {
        let frames = frames_with_angles(&[180.0; 20]);
        let rule = TrickRule::ollie().with_stability_ms(300.0);
        let check = check_stability(&frames, &segment(&frames), &rule, &ArbitrationConfig::default());
        assert!(!check.valid);
        assert_eq!(check.duration, Some(250.0));
    }

    #[test]
    fn test_wobbly_landing_fails() {
        let mut angles = vec![180.0; 20];
        for (i, a) in angles.iter_mut().enumerate().skip(14) {
            *a = if i % 2 == 0 { 170.0 } else { 190.0 };
        }
        let frames = frames_with_angles(&angles);
        let check = check_stability(&frames, &segment(&frames), &TrickRule::ollie(), &ArbitrationConfig::default());
        assert!(!check.valid);
        assert!(check.variance.unwrap() >= 50.0);
    }

    #[test]
    fn test_repeated_timestamps_give_zero_duration() {
        let frames: Vec<FrameSample> = frames_with_angles(&[0.0; 20])
            .into_iter()
            .map(|mut f| {
                f.timestamp_ms = Some(1000.0);
                f
            })
            .collect();
        let check = check_stability(&frames, &segment(&frames), &TrickRule::ollie(), &ArbitrationConfig::default());
        assert_eq!(check.duration, Some(0.0));
        assert!(!check.valid);
    }

    #[test]
    fn test_unset_duration_defaults_to_300() {
        let frames = frames_with_angles(&[0.0; 20]);
        let rule = TrickRule { min_stability_duration_ms: None, ..TrickRule::ollie() };
        let check = check_stability(&frames, &segment(&frames), &rule, &ArbitrationConfig::default());
        assert!(!check.valid, "250ms landing should miss the 300ms default");
    }

    #[test]
    fn test_no_land_phase() {
        let frames = frames_with_angles(&[0.0; 20]);
        let check = check_stability(&frames, &TrickPhases::default(), &TrickRule::ollie(), &ArbitrationConfig::default());
        assert!(!check.valid);
        assert!(check.duration.is_none());
    }
}
