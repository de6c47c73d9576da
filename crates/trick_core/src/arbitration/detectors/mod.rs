//! # Criterion detectors
//!
//! Four independent analyzers over the phase windows. Each one is a pure
//! function of the frame slice, the phases, the rule and the config, so they
//! can run in any order.
//!
//! - `pop` - board angle impulse between attempt start and peak
//! - `rotation` - peak rotation magnitude across the attempt window
//! - `catch` - ankle contacts in the landing window
//! - `stability` - landing angle variance and landing duration

pub mod catch;
pub mod pop;
pub mod rotation;
pub mod stability;

pub use catch::{check_catch, count_ankle_contacts, CatchCheck};
pub use pop::{detect_pop, pop_angle_change};
pub use rotation::{check_rotation, RotationCheck};
pub use stability::{check_stability, population_variance, StabilityCheck};

/// Degrees for user-facing messages: whole numbers without a decimal point.
pub(crate) fn format_degrees(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    trimmed_tenths(rounded)
}

/// Degrees for a value that fell outside `[min, max]`, rounded away from the
/// band so the printed value is never one of its bounds.
pub(crate) fn format_degrees_outside(value: f64, min: f64, max: f64) -> String {
    let tenths = value * 10.0;
    let rounded = if value < min {
        tenths.floor() / 10.0
    } else if value > max {
        tenths.ceil() / 10.0
    } else {
        tenths.round() / 10.0
    };
    trimmed_tenths(rounded)
}

fn trimmed_tenths(rounded: f64) -> String {
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::{BoardVector, FrameSample, Keypoint, COCO_KEYPOINT_COUNT};

    /// Frames at 50ms spacing with the given board roll per frame.
    pub fn frames_with_angles(angles: &[f64]) -> Vec<FrameSample> {
        angles
            .iter()
            .enumerate()
            .map(|(i, &a)| FrameSample::new(i as u64, i as f64 * 50.0).with_board(BoardVector::roll(a)))
            .collect()
    }

    /// Full COCO skeleton with both ankles at the given position.
    pub fn skeleton_with_ankles(y: f64, confidence: f64) -> Vec<Keypoint> {
        let mut keypoints = vec![Keypoint::new(0.5, 0.4, 0.9); COCO_KEYPOINT_COUNT];
        keypoints[15] = Keypoint::new(0.45, y, confidence);
        keypoints[16] = Keypoint::new(0.55, y, confidence);
        keypoints
    }
}
