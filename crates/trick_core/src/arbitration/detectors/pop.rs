//! Pop detection: the board must kick up between the start of the attempt
//! and its apex.

use crate::arbitration::config::ArbitrationConfig;
use crate::arbitration::phases::TrickPhases;
use crate::models::FrameSample;

/// Absolute board angle change from attempt start to peak.
///
/// `None` when there is no attempt window or the peak does not come strictly
/// after the start inside the sequence.
pub fn pop_angle_change(sequence: &[FrameSample], phases: &TrickPhases) -> Option<f64> {
    let attempt = phases.attempt?;
    if !(attempt.start < attempt.peak && attempt.peak < sequence.len()) {
        return None;
    }

    let initial = sequence[attempt.start].board_angle();
    let peak = sequence[attempt.peak].board_angle();
    Some((peak - initial).abs())
}

/// True when the board angle moved more than the pop threshold.
pub fn detect_pop(sequence: &[FrameSample], phases: &TrickPhases, config: &ArbitrationConfig) -> bool {
    pop_angle_change(sequence, phases)
        .map(|change| change > config.pop_angle_threshold_deg)
        .unwrap_or(false)
}
