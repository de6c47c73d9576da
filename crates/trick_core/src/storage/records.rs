//! Database-shaped records (snake_case columns).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capture::SessionState;
use crate::features::FeatureWindow;
use crate::models::{FrameSample, Keypoint, TrickCriteria, TrickValidation};

/// One judged attempt, from the start of capture to the verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub trick_requested: String,
    pub state: SessionState,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub detected_trick: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// New session, already capturing.
    pub fn new(trick_requested: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), trick_requested)
    }

    /// Session under a caller-chosen id (e.g. one issued by a match server).
    pub fn with_id(id: Uuid, trick_requested: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            match_id: None,
            turn_id: None,
            user_id: None,
            trick_requested: trick_requested.into(),
            state: SessionState::Capturing,
            confidence_score: None,
            detected_trick: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn set_state(&mut self, state: SessionState) {
        self.state = state;
        self.updated_at = Utc::now();
        if state.is_terminal() {
            self.completed_at = Some(self.updated_at);
        }
    }

    /// Close the session with the engine's verdict.
    pub fn complete(&mut self, validation: &TrickValidation) {
        self.confidence_score = Some(validation.confidence);
        self.detected_trick = Some(validation.detected_trick.clone());
        self.set_state(SessionState::from_validation(validation));
    }
}

/// One sampled frame. Missing board angles are stored as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypointRecord {
    pub session_id: Uuid,
    pub frame_index: u64,
    pub timestamp_ms: i64,
    pub rider_keypoints: Vec<Keypoint>,
    #[serde(default)]
    pub board_keypoints: Option<Vec<Keypoint>>,
    pub board_angle_roll: f64,
    pub board_angle_pitch: f64,
    pub board_angle_yaw: f64,
}

impl KeypointRecord {
    pub fn from_frame(session_id: Uuid, frame: &FrameSample) -> Self {
        let board = frame.board_vector.unwrap_or_default();
        Self {
            session_id,
            frame_index: frame.frame_index,
            timestamp_ms: frame.timestamp_or_zero().round() as i64,
            rider_keypoints: frame.keypoints.clone(),
            board_keypoints: None,
            board_angle_roll: board.angle,
            board_angle_pitch: board.pitch,
            board_angle_yaw: board.yaw,
        }
    }
}

/// Classifier input for one window. A window without a prediction stores a
/// confidence of 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub session_id: Uuid,
    pub window_start_frame: u64,
    pub window_end_frame: u64,
    pub window_duration_ms: f64,
    pub features_vector: Vec<f32>,
    #[serde(default)]
    pub trick_prediction: Option<String>,
    pub prediction_confidence: f64,
}

impl FeatureRecord {
    pub fn from_window(session_id: Uuid, window: &FeatureWindow) -> Self {
        Self {
            session_id,
            window_start_frame: window.window_start_frame,
            window_end_frame: window.window_end_frame,
            window_duration_ms: window.window_duration_ms,
            features_vector: window.features_vector.clone(),
            trick_prediction: window.trick_prediction.clone(),
            prediction_confidence: window.prediction_confidence.unwrap_or(0.0),
        }
    }
}

/// Stored verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub id: Uuid,
    pub session_id: Uuid,
    pub trick_requested: String,
    pub trick_detected: String,
    pub is_valid: bool,
    /// Engine confidence
    pub validation_score: f64,
    pub criteria: TrickCriteria,
    pub failure_reasons: Vec<String>,
    #[serde(default)]
    pub stability_duration_ms: Option<f64>,
    #[serde(default)]
    pub rotation_angle_deg: Option<f64>,
    pub foot_contact_count: u32,
    pub created_at: DateTime<Utc>,
}

impl ValidationRecord {
    pub fn from_validation(session_id: Uuid, trick_requested: &str, validation: &TrickValidation) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            trick_requested: trick_requested.to_string(),
            trick_detected: validation.detected_trick.clone(),
            is_valid: validation.is_valid,
            validation_score: validation.confidence,
            criteria: validation.criteria,
            failure_reasons: validation.failure_reasons.clone(),
            stability_duration_ms: validation.stability_duration,
            rotation_angle_deg: validation.rotation_angle,
            foot_contact_count: validation.foot_contacts,
            created_at: Utc::now(),
        }
    }
}

/// Any row a [`RecordSink`](super::RecordSink) accepts, tagged with its
/// table name on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "table", rename_all = "snake_case")]
pub enum StoredRecord {
    Session(SessionRecord),
    Keypoints(KeypointRecord),
    Features(FeatureRecord),
    Validation(ValidationRecord),
}

impl StoredRecord {
    pub fn session_id(&self) -> Uuid {
        match self {
            StoredRecord::Session(r) => r.id,
            StoredRecord::Keypoints(r) => r.session_id,
            StoredRecord::Features(r) => r.session_id,
            StoredRecord::Validation(r) => r.session_id,
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            StoredRecord::Session(_) => "session",
            StoredRecord::Keypoints(_) => "keypoints",
            StoredRecord::Features(_) => "features",
            StoredRecord::Validation(_) => "validation",
        }
    }
}
