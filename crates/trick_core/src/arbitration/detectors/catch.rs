//! Catch check: the rider's feet are back on the board in the landing window.
//!
//! Board proximity is approximated by ankle height: an ankle in the lower part
//! of the frame with a confident estimate counts as one contact. Contacts
//! accumulate across frames and both ankles.

use serde::{Deserialize, Serialize};

use crate::arbitration::config::ArbitrationConfig;
use crate::arbitration::phases::TrickPhases;
use crate::models::{CocoKeypoint, FrameSample, TrickRule};

/// Frames with fewer landmarks than this are skipped.
pub const MIN_KEYPOINTS_FOR_CATCH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatchCheck {
    pub valid: bool,
    pub foot_contacts: u32,
}

/// Ankle contacts in one frame (0, 1 or 2).
pub fn count_ankle_contacts(frame: &FrameSample, config: &ArbitrationConfig) -> u32 {
    if frame.keypoints.len() < MIN_KEYPOINTS_FOR_CATCH {
        return 0;
    }

    [CocoKeypoint::LeftAnkle, CocoKeypoint::RightAnkle]
        .into_iter()
        .filter_map(|landmark| frame.keypoint(landmark))
        .filter(|ankle| {
            ankle.y > config.ankle_contact_min_y && ankle.confidence > config.ankle_min_confidence
        })
        .count() as u32
}

pub fn check_catch(
    sequence: &[FrameSample],
    phases: &TrickPhases,
    rule: &TrickRule,
    config: &ArbitrationConfig,
) -> CatchCheck {
    let Some(land) = phases.land else {
        return CatchCheck::default();
    };

    let foot_contacts: u32 = sequence[land.clamped(sequence.len())]
        .iter()
        .map(|frame| count_ankle_contacts(frame, config))
        .sum();

    let required = rule.required_foot_contacts.unwrap_or(config.default_foot_contacts);
    CatchCheck { valid: foot_contacts >= required, foot_contacts }
}
