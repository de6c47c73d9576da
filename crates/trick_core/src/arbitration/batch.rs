//! Parallel judging of independent attempts.
//!
//! Each attempt is a pure function of its own frames, so a batch is a plain
//! `par_iter` map. Output order matches input order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::engine::ArbitrationEngine;
use crate::models::{FrameSample, TrickValidation};

/// One attempt to judge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub trick: String,
    pub frames: Vec<FrameSample>,
}

impl AttemptRequest {
    pub fn new(trick: impl Into<String>, frames: Vec<FrameSample>) -> Self {
        Self { session_id: None, trick: trick.into(), frames }
    }
}

/// Verdict paired with the attempt it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub trick_requested: String,
    pub validation: TrickValidation,
}

impl ArbitrationEngine {
    /// Judge many attempts on the rayon pool.
    pub fn validate_batch(&self, attempts: &[AttemptRequest]) -> Vec<AttemptOutcome> {
        debug!(attempts = attempts.len(), "judging batch");
        attempts
            .par_iter()
            .map(|attempt| AttemptOutcome {
                session_id: attempt.session_id.clone(),
                trick_requested: attempt.trick.clone(),
                validation: self.validate(&attempt.frames, &attempt.trick),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitration::detectors::test_support::frames_with_angles;

    #[test]
    fn test_batch_matches_sequential_and_keeps_order() {
        let engine = ArbitrationEngine::default();
        let attempts: Vec<AttemptRequest> = (0..32)
            .map(|i| {
                let trick = if i % 2 == 0 { "kickflip" } else { "ollie" };
                let len = 5 + i;
                let angles: Vec<f64> = (0..len).map(|f| (f * i) as f64).collect();
                let mut req = AttemptRequest::new(trick, frames_with_angles(&angles));
                req.session_id = Some(format!("s{}", i));
                req
            })
            .collect();

        let outcomes = engine.validate_batch(&attempts);
        assert_eq!(outcomes.len(), attempts.len());
        for (attempt, outcome) in attempts.iter().zip(&outcomes) {
            assert_eq!(outcome.session_id, attempt.session_id);
            assert_eq!(outcome.trick_requested, attempt.trick);
            assert_eq!(outcome.validation, engine.validate(&attempt.frames, &attempt.trick));
        }
    }

    #[test]
    fn test_empty_batch() {
        assert!(ArbitrationEngine::default().validate_batch(&[]).is_empty());
    }
}
