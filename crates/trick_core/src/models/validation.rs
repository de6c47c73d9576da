//! Verdict returned by the arbitration engine.

use serde::{Deserialize, Serialize};

/// Label used when the sequence is too short to say anything.
pub const UNKNOWN_TRICK: &str = "unknown";

/// Pass/fail flag per criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrickCriteria {
    pub pop: bool,
    pub rotation: bool,
    pub catch: bool,
    pub stability: bool,
    pub foot_contact: bool,
}

impl TrickCriteria {
    pub fn passed_count(&self) -> usize {
        [self.pop, self.rotation, self.catch, self.stability, self.foot_contact]
            .iter()
            .filter(|&&passed| passed)
            .count()
    }
}

/// Outcome of judging one trick attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrickValidation {
    pub is_valid: bool,
    /// Weighted criterion score in [0, 1]
    pub confidence: f64,
    pub detected_trick: String,
    pub criteria: TrickCriteria,
    /// One entry per failed check, in check order
    pub failure_reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability_duration: Option<f64>,
    /// Ankle contacts counted in the landing window
    #[serde(default)]
    pub foot_contacts: u32,
}

impl TrickValidation {
    /// Verdict for a sequence too short to segment.
    pub fn insufficient_data(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            confidence: 0.0,
            detected_trick: UNKNOWN_TRICK.to_string(),
            criteria: TrickCriteria::default(),
            failure_reasons: vec![reason.into()],
            rotation_angle: None,
            stability_duration: None,
            foot_contacts: 0,
        }
    }
}
