//! # trick_core - Skateboard Trick Arbitration Engine
//!
//! Judges whether a captured attempt matches the trick the rider called,
//! from a short sequence of pose keypoints and board orientation samples.
//!
//! ## Features
//! - Deterministic verdicts (same frames + same trick = same result)
//! - Data-driven rule table (embedded YAML, overridable per request)
//! - Tunable thresholds with practice/contest presets
//! - Capture window, board geometry and feature helpers for the camera loop
//! - JSON API for hosts that only speak strings

pub mod api;
pub mod arbitration;
pub mod capture;
pub mod data;
pub mod error;
pub mod features;
pub mod geometry;
pub mod inference;
pub mod models;
pub mod storage;

// Re-export main API functions
pub use api::{
    analyze_trick_json, analyze_trick_json_with_config, validate_batch_json, validate_batch_json_with_config,
    validate_trick_json, validate_trick_json_with_config, SCHEMA_VERSION,
};
pub use arbitration::{
    validate_trick, ArbitrationConfig, ArbitrationEngine, ArbitrationReport, AttemptOutcome,
    AttemptRequest, TrickPhases,
};
pub use error::{ArbitrationError, Result};

// Re-export data model
pub use data::RuleTable;
pub use models::{
    BoardVector, CocoKeypoint, FrameSample, Keypoint, TrickCriteria, TrickRule, TrickValidation,
};

// Re-export capture pipeline
pub use capture::{CaptureWindow, FrameSampler, SessionState};
pub use features::{extract_features, FeatureWindow};
pub use geometry::estimate_board_vector;
pub use inference::{FrameAssembler, PoseEstimate, PoseEstimator, RawFrame, TrickClassifier, TrickPrediction};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
