//! Frame samples produced by the capture + inference pipeline.
//!
//! Every optional perception field stays an `Option` here. Defaults (angle 0,
//! timestamp 0) are applied by the detectors at the point of use, never when
//! the sample is built.

use serde::{Deserialize, Serialize};

/// Number of body landmarks in the COCO layout.
pub const COCO_KEYPOINT_COUNT: usize = 17;

/// COCO landmark indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CocoKeypoint {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl CocoKeypoint {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One body landmark estimate in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    pub confidence: f64,
}

impl Keypoint {
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    /// Euclidean distance in normalized image space.
    pub fn distance_to(&self, other: &Keypoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Estimated board orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoardVector {
    /// Roll around the board's long axis
    pub angle: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl BoardVector {
    pub fn new(angle: f64, pitch: f64, yaw: f64) -> Self {
        Self { angle, pitch, yaw }
    }

    pub fn roll(angle: f64) -> Self {
        Self { angle, pitch: 0.0, yaw: 0.0 }
    }
}

/// A single observation of the rider and board.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSample {
    pub frame_index: u64,
    #[serde(default, alias = "timestamp")]
    pub timestamp_ms: Option<f64>,
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
    #[serde(default)]
    pub board_vector: Option<BoardVector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trick_prediction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl FrameSample {
    pub fn new(frame_index: u64, timestamp_ms: f64) -> Self {
        Self {
            frame_index,
            timestamp_ms: Some(timestamp_ms),
            ..Default::default()
        }
    }

    pub fn with_board(mut self, board: BoardVector) -> Self {
        self.board_vector = Some(board);
        self
    }

    pub fn with_keypoints(mut self, keypoints: Vec<Keypoint>) -> Self {
        self.keypoints = keypoints;
        self
    }

    /// Board roll, or 0 when the board was not localized.
    #[inline]
    pub fn board_angle(&self) -> f64 {
        self.board_vector.map(|b| b.angle).unwrap_or(0.0)
    }

    /// Timestamp, or 0 when the sampler did not provide one.
    #[inline]
    pub fn timestamp_or_zero(&self) -> f64 {
        self.timestamp_ms.unwrap_or(0.0)
    }

    #[inline]
    pub fn keypoint(&self, landmark: CocoKeypoint) -> Option<&Keypoint> {
        self.keypoints.get(landmark.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_board_defaults_to_zero_angle() {
        let frame = FrameSample::new(0, 0.0);
        assert_eq!(frame.board_angle(), 0.0);

        let frame = frame.with_board(BoardVector::roll(42.0));
        assert_eq!(frame.board_angle(), 42.0);
    }

    #[test]
    fn test_deserialize_wire_names() {
        let json = r#"{
            "frameIndex": 3,
            "timestamp": 120.5,
            "keypoints": [{"x": 0.5, "y": 0.8, "confidence": 0.9}],
            "boardVector": null
        }"#;
        let frame: FrameSample = serde_json::from_str(json).unwrap();
        assert_eq!(frame.frame_index, 3);
        assert_eq!(frame.timestamp_ms, Some(120.5));
        assert_eq!(frame.keypoints.len(), 1);
        assert!(frame.board_vector.is_none());
        assert!(frame.trick_prediction.is_none());
    }

    #[test]
    fn test_missing_timestamp_defaults_to_zero() {
        let frame: FrameSample = serde_json::from_str(r#"{"frameIndex": 1}"#).unwrap();
        assert_eq!(frame.timestamp_or_zero(), 0.0);
    }

    #[test]
    fn test_coco_ankle_indices() {
        assert_eq!(CocoKeypoint::LeftAnkle.index(), 15);
        assert_eq!(CocoKeypoint::RightAnkle.index(), 16);
        assert_eq!(CocoKeypoint::LeftKnee.index(), 13);
    }
}
