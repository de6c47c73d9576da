//! # Data model
//!
//! Per-frame observations coming out of the inference collaborator, the
//! per-trick rule record and the verdict handed back to the application.

pub mod frame;
pub mod rules;
pub mod validation;

pub use frame::{BoardVector, CocoKeypoint, FrameSample, Keypoint, COCO_KEYPOINT_COUNT};
pub use rules::TrickRule;
pub use validation::{TrickCriteria, TrickValidation};
