//! Rolling capture window
//!
//! Holds the last few seconds of sampled frames while the rider attempts a
//! trick. The camera usually delivers far more frames than the judge needs,
//! so incoming frames are throttled to a target rate before they are kept.
//!
//! ```text
//! camera 30fps ──> FrameSampler (15fps) ──> CaptureWindow (30 frames, ~2s)
//!                                                   │
//!                                  stop capture ──> to_sequence() ──> engine
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::models::{FrameSample, TrickValidation};

/// Default sampling rate of the capture loop
pub const DEFAULT_TARGET_FPS: u32 = 15;

/// Default window length in seconds
pub const DEFAULT_WINDOW_SECS: u32 = 2;

/// Lifecycle of one judged attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Capturing,
    Analyzing,
    Validated,
    Failed,
}

impl SessionState {
    /// Validated and Failed are final.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Validated | SessionState::Failed)
    }

    pub fn from_validation(validation: &TrickValidation) -> Self {
        if validation.is_valid {
            SessionState::Validated
        } else {
            SessionState::Failed
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Capturing => "capturing",
            SessionState::Analyzing => "analyzing",
            SessionState::Validated => "validated",
            SessionState::Failed => "failed",
        }
    }
}

/// Drops frames that arrive sooner than one sampling interval after the last
/// accepted one.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSampler {
    interval_ms: f64,
    last_accepted_ms: Option<f64>,
}

impl FrameSampler {
    /// A rate of 0 accepts every frame.
    pub fn new(target_fps: u32) -> Self {
        let interval_ms = if target_fps == 0 { 0.0 } else { 1000.0 / target_fps as f64 };
        Self { interval_ms, last_accepted_ms: None }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Whether a frame at `timestamp_ms` would be kept, without recording it.
    pub fn would_accept(&self, timestamp_ms: f64) -> bool {
        match self.last_accepted_ms {
            Some(last) => timestamp_ms - last >= self.interval_ms,
            None => true,
        }
    }

    /// Record the frame if it is due. Returns whether it was kept.
    pub fn accept(&mut self, timestamp_ms: f64) -> bool {
        if !self.would_accept(timestamp_ms) {
            return false;
        }
        self.last_accepted_ms = Some(timestamp_ms);
        true
    }

    pub fn reset(&mut self) {
        self.last_accepted_ms = None;
    }
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_FPS)
    }
}

/// Bounded, chronologically ordered frame buffer for one attempt.
#[derive(Debug, Clone)]
pub struct CaptureWindow {
    frames: VecDeque<FrameSample>,
    capacity: usize,
    sampler: FrameSampler,
    state: SessionState,
}

impl CaptureWindow {
    /// Window of `target_fps * window_secs` frames (at least one).
    pub fn new(target_fps: u32, window_secs: u32) -> Self {
        let capacity = (target_fps as usize * window_secs as usize).max(1);
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
            sampler: FrameSampler::new(target_fps),
            state: SessionState::Idle,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Frames currently held, oldest first, as one slice.
    ///
    /// Takes `&mut self` because a wrapped ring buffer is rotated in place
    /// first. Use [`iter`](Self::iter) for read-only access.
    pub fn frames(&mut self) -> &[FrameSample] {
        self.frames.make_contiguous()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameSample> {
        self.frames.iter()
    }

    pub fn latest_mut(&mut self) -> Option<&mut FrameSample> {
        self.frames.back_mut()
    }

    /// Whether a frame stamped `timestamp_ms` would pass the sampler.
    pub fn is_due(&self, timestamp_ms: f64) -> bool {
        match self.state {
            SessionState::Idle => true,
            SessionState::Capturing => self.sampler.would_accept(timestamp_ms),
            _ => false,
        }
    }

    /// Start a fresh capture, discarding anything buffered.
    pub fn start(&mut self) {
        self.frames.clear();
        self.sampler.reset();
        self.state = SessionState::Capturing;
    }

    /// Offer a frame to the window.
    ///
    /// Starts capturing on the first frame. Frames without a timestamp bypass
    /// the sampler. Once the window is full the oldest frame is dropped.
    /// Returns false when the frame was throttled or the capture already
    /// stopped.
    pub fn push(&mut self, frame: FrameSample) -> bool {
        match self.state {
            SessionState::Idle => self.start(),
            SessionState::Capturing => {}
            _ => {
                trace!(state = self.state.as_str(), "capture stopped, frame ignored");
                return false;
            }
        }

        if let Some(ts) = frame.timestamp_ms {
            if !self.sampler.accept(ts) {
                trace!(timestamp_ms = ts, "frame throttled");
                return false;
            }
        }

        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
        true
    }

    /// Enough frames to be worth judging.
    pub fn is_ready(&self, min_frames: usize) -> bool {
        self.frames.len() >= min_frames
    }

    /// Copy of the buffer, oldest first.
    pub fn to_sequence(&self) -> Vec<FrameSample> {
        self.frames.iter().cloned().collect()
    }

    /// Stop capturing and hand the buffer over for analysis.
    pub fn drain(&mut self) -> Vec<FrameSample> {
        self.state = SessionState::Analyzing;
        debug!(frames = self.frames.len(), "capture drained for analysis");
        Vec::from(std::mem::take(&mut self.frames))
    }

    /// Record the verdict of the drained attempt.
    pub fn finish(&mut self, validation: &TrickValidation) -> SessionState {
        self.state = SessionState::from_validation(validation);
        self.state
    }

    /// Back to idle with an empty buffer.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.sampler.reset();
        self.state = SessionState::Idle;
    }
}

impl Default for CaptureWindow {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_FPS, DEFAULT_WINDOW_SECS)
    }
}
