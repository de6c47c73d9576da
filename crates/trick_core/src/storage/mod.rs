//! Persistence records for judged attempts.
//!
//! Row shapes for sessions, sampled keypoints, feature windows and verdicts,
//! plus the [`RecordSink`] seam where they leave the process. The engine never
//! writes anything itself; callers record after judging.

pub mod records;
pub mod sink;

pub use records::{FeatureRecord, KeypointRecord, SessionRecord, StoredRecord, ValidationRecord};
pub use sink::{latest_session, JsonLinesSink, MemorySink, RecordSink};
