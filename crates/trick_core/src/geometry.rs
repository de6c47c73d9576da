//! Board orientation from board landmarks.
//!
//! A board detector reports four landmarks in image coordinates, in this
//! order: nose, tail, left truck, right truck. Roll comes from the
//! nose→tail axis, pitch from how far the trucks sit below the nose/tail
//! line. Yaw needs depth and is always 0.

use crate::models::{BoardVector, Keypoint};

/// Landmarks a board detector must provide.
pub const BOARD_KEYPOINT_COUNT: usize = 4;

/// Pitch scale: a truck offset of one full frame width maps to 90°.
const PITCH_SCALE_DEG: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardLandmark {
    Nose = 0,
    Tail = 1,
    LeftTruck = 2,
    RightTruck = 3,
}

impl BoardLandmark {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Estimate the board vector, or `None` when fewer than four landmarks were
/// detected or the frame width is unusable.
pub fn estimate_board_vector(board_keypoints: &[Keypoint], frame_width: f64) -> Option<BoardVector> {
    if board_keypoints.len() < BOARD_KEYPOINT_COUNT || frame_width.is_nan() || frame_width <= 0.0 {
        return None;
    }

    let nose = &board_keypoints[BoardLandmark::Nose.index()];
    let tail = &board_keypoints[BoardLandmark::Tail.index()];
    let left_truck = &board_keypoints[BoardLandmark::LeftTruck.index()];
    let right_truck = &board_keypoints[BoardLandmark::RightTruck.index()];

    let roll = (tail.y - nose.y).atan2(tail.x - nose.x).to_degrees();

    let avg_truck_y = (left_truck.y + right_truck.y) / 2.0;
    let avg_nose_tail_y = (nose.y + tail.y) / 2.0;
    let pitch = (avg_truck_y - avg_nose_tail_y) / frame_width * PITCH_SCALE_DEG;

    Some(BoardVector::new(roll, pitch, 0.0))
}
