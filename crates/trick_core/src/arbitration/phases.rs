//! Phase segmentation
//!
//! Splits a trimmed capture buffer into SET / ATTEMPT / LAND windows by
//! position in the sequence:
//!
//! ```text
//! 0          0.3n               0.7n           n-1
//! |--- set ---|----- attempt -----|---- land ----|
//!                      ^ peak (midpoint)
//! ```
//!
//! Boundaries are shared: `set.end == attempt.start` and
//! `attempt.end == land.start`.

use serde::{Deserialize, Serialize};

/// Set window ends at 3/10 of the sequence.
pub const SET_TENTHS: usize = 3;
/// Attempt window ends at 7/10 of the sequence.
pub const ATTEMPT_END_TENTHS: usize = 7;

/// Inclusive frame-position range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRange {
    pub start: usize,
    pub end: usize,
}

impl PhaseRange {
    /// Positions in `[start, end]` that exist in a sequence of `len` frames.
    pub fn clamped(&self, len: usize) -> std::ops::Range<usize> {
        let end = (self.end + 1).min(len);
        self.start.min(end)..end
    }
}

/// Attempt window with its apex reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRange {
    pub start: usize,
    pub peak: usize,
    pub end: usize,
}

impl AttemptRange {
    pub fn clamped(&self, len: usize) -> std::ops::Range<usize> {
        PhaseRange { start: self.start, end: self.end }.clamped(len)
    }
}

/// Phase windows of one attempt. Positions index the frame slice, not
/// `frame_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrickPhases {
    pub set: Option<PhaseRange>,
    pub attempt: Option<AttemptRange>,
    pub land: Option<PhaseRange>,
}

impl TrickPhases {
    pub fn is_complete(&self) -> bool {
        self.set.is_some() && self.attempt.is_some() && self.land.is_some()
    }
}

/// Segment a sequence of `len` frames.
///
/// An empty sequence has no phases; every other length yields all three.
pub fn segment_len(len: usize) -> TrickPhases {
    if len == 0 {
        return TrickPhases::default();
    }

    let last = len - 1;
    // Integer tenths keep floor(0.3n) exact
    let set_end = (len * SET_TENTHS / 10).min(last);
    let attempt_end = (len * ATTEMPT_END_TENTHS / 10).min(last);
    let peak = (set_end + attempt_end) / 2;

    TrickPhases {
        set: Some(PhaseRange { start: 0, end: set_end }),
        attempt: Some(AttemptRange { start: set_end, peak, end: attempt_end }),
        land: Some(PhaseRange { start: attempt_end, end: last }),
    }
}

/// Segment a frame sequence. Only its length matters.
pub fn segment<T>(sequence: &[T]) -> TrickPhases {
    segment_len(sequence.len())
}
