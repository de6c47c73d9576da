//! Model boundaries
//!
//! Pose estimation and trick classification run outside this crate (ONNX,
//! a remote service, a replay file). They plug in through two traits, and
//! [`FrameAssembler`] turns their output into the [`FrameSample`]s the judge
//! consumes.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::capture::CaptureWindow;
use crate::error::Result;
use crate::geometry::estimate_board_vector;
use crate::models::{BoardVector, FrameSample, Keypoint};

/// One decoded camera frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawFrame {
    pub timestamp_ms: f64,
    pub width: u32,
    pub height: u32,
    /// RGBA, row-major
    pub pixels: Vec<u8>,
}

/// Output of a pose model for one frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseEstimate {
    /// COCO-ordered rider landmarks
    pub keypoints: Vec<Keypoint>,
    /// Nose, tail, left truck, right truck when the model localizes the board
    #[serde(default)]
    pub board_keypoints: Vec<Keypoint>,
    /// Board orientation if the model reports it directly
    #[serde(default)]
    pub board_vector: Option<BoardVector>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrickPrediction {
    pub trick: String,
    pub confidence: f64,
}

pub trait PoseEstimator: Send + Sync {
    fn infer(&self, frame: &RawFrame) -> Result<PoseEstimate>;
}

/// Classifies a window of frames; `None` when nothing recognizable happened.
pub trait TrickClassifier: Send + Sync {
    fn classify(&self, window: &[FrameSample]) -> Result<Option<TrickPrediction>>;
}

/// Runs the models over raw frames and numbers the results.
pub struct FrameAssembler<P: PoseEstimator> {
    estimator: P,
    classifier: Option<Box<dyn TrickClassifier>>,
    frames_assembled: u64,
}

impl<P: PoseEstimator> FrameAssembler<P> {
    pub fn new(estimator: P) -> Self {
        Self { estimator, classifier: None, frames_assembled: 0 }
    }

    pub fn with_classifier(mut self, classifier: Box<dyn TrickClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn frames_assembled(&self) -> u64 {
        self.frames_assembled
    }

    /// Run pose estimation on one frame. Frame indices start at 1.
    ///
    /// A board vector reported by the model wins over one derived from its
    /// board landmarks.
    pub fn assemble(&mut self, raw: &RawFrame) -> Result<FrameSample> {
        let estimate = self.estimator.infer(raw)?;
        self.frames_assembled += 1;

        let board_vector = estimate
            .board_vector
            .or_else(|| estimate_board_vector(&estimate.board_keypoints, raw.width as f64));

        Ok(FrameSample {
            frame_index: self.frames_assembled,
            timestamp_ms: Some(raw.timestamp_ms),
            keypoints: estimate.keypoints,
            board_vector,
            trick_prediction: None,
            confidence: Some(estimate.confidence),
        })
    }

    /// Feed one camera frame into a capture window.
    ///
    /// Frames the window would throttle are skipped before inference. When a
    /// classifier is attached, the window is classified after each kept frame
    /// and the label stored on that frame. Returns whether the frame was kept.
    pub fn capture(&mut self, raw: &RawFrame, window: &mut CaptureWindow) -> Result<bool> {
        if !window.is_due(raw.timestamp_ms) {
            trace!(timestamp_ms = raw.timestamp_ms, "skipping inference for throttled frame");
            return Ok(false);
        }

        let frame = self.assemble(raw)?;
        if !window.push(frame) {
            return Ok(false);
        }

        if let Some(classifier) = &self.classifier {
            let prediction = classifier.classify(window.frames())?;
            if let Some(prediction) = prediction {
                debug!(trick = %prediction.trick, confidence = prediction.confidence, "window classified");
                if let Some(latest) = window.latest_mut() {
                    latest.trick_prediction = Some(prediction.trick);
                }
            }
        }
        Ok(true)
    }
}
