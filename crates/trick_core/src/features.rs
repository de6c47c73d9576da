//! Temporal feature vectors for trick classifiers.
//!
//! Flattens a window of frames into one `f32` vector, laid out in three
//! blocks:
//!
//! 1. per frame with a full skeleton: ankle spread, then knee spread
//! 2. per consecutive pair: velocity of the head landmark `(vx, vy)` in
//!    units per ms
//! 3. per frame: normalized board orientation `(roll/360, pitch/90, yaw/180)`
//!
//! The vector length depends on what was detected, so it is only meaningful
//! for models trained on the same layout.

use serde::{Deserialize, Serialize};

use crate::models::{CocoKeypoint, FrameSample};

/// Frames need at least this many landmarks for the distance block.
pub const MIN_KEYPOINTS_FOR_DISTANCES: usize = 16;

fn spread(frame: &FrameSample, left: CocoKeypoint, right: CocoKeypoint) -> Option<f32> {
    let l = frame.keypoint(left)?;
    let r = frame.keypoint(right)?;
    Some(l.distance_to(r) as f32)
}

/// Feature vector for a window; empty for fewer than two frames.
pub fn extract_features(sequence: &[FrameSample]) -> Vec<f32> {
    if sequence.len() < 2 {
        return Vec::new();
    }

    let mut features = Vec::with_capacity(sequence.len() * 7);

    for frame in sequence.iter().filter(|f| f.keypoints.len() >= MIN_KEYPOINTS_FOR_DISTANCES) {
        features.extend(spread(frame, CocoKeypoint::LeftAnkle, CocoKeypoint::RightAnkle));
        features.extend(spread(frame, CocoKeypoint::LeftKnee, CocoKeypoint::RightKnee));
    }

    for pair in sequence.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        let dt = curr.timestamp_or_zero() - prev.timestamp_or_zero();
        if dt <= 0.0 {
            continue;
        }
        if let (Some(p), Some(c)) = (prev.keypoint(CocoKeypoint::Nose), curr.keypoint(CocoKeypoint::Nose)) {
            features.push(((c.x - p.x) / dt) as f32);
            features.push(((c.y - p.y) / dt) as f32);
        }
    }

    for frame in sequence {
        match frame.board_vector {
            Some(b) => features.extend([
                (b.angle / 360.0) as f32,
                (b.pitch / 90.0) as f32,
                (b.yaw / 180.0) as f32,
            ]),
            None => features.extend([0.0, 0.0, 0.0]),
        }
    }

    features
}

/// Feature vector with the window it was computed over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureWindow {
    pub window_start_frame: u64,
    pub window_end_frame: u64,
    pub window_duration_ms: f64,
    pub features_vector: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trick_prediction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_confidence: Option<f64>,
}

impl FeatureWindow {
    /// `None` for fewer than two frames. The prediction, if any, is taken
    /// from the newest frame.
    pub fn from_sequence(sequence: &[FrameSample]) -> Option<Self> {
        let (first, last) = match sequence {
            [first, .., last] => (first, last),
            _ => return None,
        };

        Some(Self {
            window_start_frame: first.frame_index,
            window_end_frame: last.frame_index,
            window_duration_ms: last.timestamp_or_zero() - first.timestamp_or_zero(),
            features_vector: extract_features(sequence),
            trick_prediction: last.trick_prediction.clone(),
            prediction_confidence: last.trick_prediction.as_ref().and(last.confidence),
        })
    }
}
