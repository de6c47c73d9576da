//! # Trick arbitration
//!
//! Phase segmentation, the four criterion detectors and the engine that
//! combines them into a verdict.
//!
//! ```rust
//! use trick_core::arbitration::validate_trick;
//! use trick_core::models::FrameSample;
//!
//! let frames: Vec<FrameSample> = (0..5).map(|i| FrameSample::new(i, i as f64 * 66.0)).collect();
//! let verdict = validate_trick(&frames, "kickflip");
//! assert!(!verdict.is_valid);
//! assert_eq!(verdict.detected_trick, "unknown");
//! ```

pub mod batch;
pub mod config;
pub mod detectors;
pub mod engine;
pub mod phases;


pub use batch::{AttemptOutcome, AttemptRequest};
pub use config::{ArbitrationConfig, CriterionWeights};
pub use engine::{validate_trick, ArbitrationEngine, ArbitrationReport};
pub use phases::{segment, AttemptRange, PhaseRange, TrickPhases};
