//! Trick judge library
//!
//! File handling behind the `trick_judge` binary: loading recorded frames,
//! rule tables and threshold profiles, judging, and recording verdicts.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use trick_core::storage::{
    FeatureRecord, JsonLinesSink, KeypointRecord, RecordSink, SessionRecord, ValidationRecord,
};
use trick_core::{
    ArbitrationConfig, ArbitrationEngine, AttemptOutcome, AttemptRequest, FeatureWindow, FrameSample,
    RuleTable, SessionState, TrickValidation,
};

/// Frames file: either a bare array or an object with a `frames` field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FramesFile {
    List(Vec<FrameSample>),
    Wrapped { frames: Vec<FrameSample> },
}

/// Batch manifest. Frame paths are relative to the manifest's directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchManifest {
    pub attempts: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    #[serde(default)]
    pub session_id: Option<String>,
    pub trick: String,
    pub frames: PathBuf,
}

/// Load recorded frames from a JSON file.
pub fn load_frames(path: &Path) -> Result<Vec<FrameSample>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read frames file: {}", path.display()))?;
    let file: FramesFile = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse frames file: {}", path.display()))?;

    let frames = match file {
        FramesFile::List(frames) | FramesFile::Wrapped { frames } => frames,
    };
    if frames.is_empty() {
        bail!("Frames file contains no frames: {}", path.display());
    }
    Ok(frames)
}

/// Built-in rule table, or the YAML table at `path`.
pub fn load_rules(path: Option<&Path>) -> Result<RuleTable> {
    match path {
        Some(path) => RuleTable::from_yaml_file(path)
            .with_context(|| format!("Failed to load rule table: {}", path.display())),
        None => Ok(RuleTable::builtin().clone()),
    }
}

/// Thresholds from a JSON file, a named profile, or the environment, in
/// that order of precedence.
pub fn resolve_config(profile: Option<&str>, config_path: Option<&Path>) -> Result<ArbitrationConfig> {
    if let Some(path) = config_path {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = ArbitrationConfig::from_json(&json)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        return Ok(config);
    }
    if let Some(name) = profile {
        return ArbitrationConfig::from_profile(name)
            .with_context(|| format!("Unknown profile '{}' (expected default, lenient or strict)", name));
    }
    Ok(ArbitrationConfig::from_env_or_default())
}

fn judge(engine: &ArbitrationEngine, frames: &[FrameSample], trick: &str) -> TrickValidation {
    let validation = engine.validate(frames, trick);
    info!(trick, valid = validation.is_valid, confidence = validation.confidence, "attempt judged");
    validation
}

/// Judge one recorded attempt.
///
/// With a record file, the whole attempt is appended as JSON lines: the
/// session as captured, one keypoint row per frame, the feature window, the
/// closed session and the verdict.
pub fn judge_file(
    engine: &ArbitrationEngine,
    frames_path: &Path,
    trick: &str,
    record: Option<(&Path, Option<&str>)>,
) -> Result<TrickValidation> {
    let frames = load_frames(frames_path)?;
    let Some((record_path, session_id)) = record else {
        return Ok(judge(engine, &frames, trick));
    };

    let mut session = match session_id {
        Some(id) => {
            let id = Uuid::parse_str(id).with_context(|| format!("Invalid session id: {}", id))?;
            SessionRecord::with_id(id, trick)
        }
        None => SessionRecord::new(trick),
    };
    let mut sink = JsonLinesSink::open(record_path)
        .with_context(|| format!("Failed to open record file: {}", record_path.display()))?;
    let failed = || format!("Failed to record attempt: {}", record_path.display());

    sink.save_session(&session).with_context(failed)?;
    let keypoints: Vec<_> = frames.iter().map(|f| KeypointRecord::from_frame(session.id, f)).collect();
    sink.save_keypoints(&keypoints).with_context(failed)?;
    if let Some(window) = FeatureWindow::from_sequence(&frames) {
        sink.save_features(&FeatureRecord::from_window(session.id, &window))
            .with_context(failed)?;
    }

    session.set_state(SessionState::Analyzing);
    let validation = judge(engine, &frames, trick);
    session.complete(&validation);
    sink.save_session(&session).with_context(failed)?;
    sink.save_validation(&ValidationRecord::from_validation(session.id, trick, &validation))
        .with_context(failed)?;

    Ok(validation)
}

/// Judge every attempt in a manifest.
pub fn judge_manifest(engine: &ArbitrationEngine, manifest_path: &Path) -> Result<Vec<AttemptOutcome>> {
    let json = fs::read_to_string(manifest_path)
        .with_context(|| format!("Failed to read manifest: {}", manifest_path.display()))?;
    let manifest: BatchManifest = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse manifest: {}", manifest_path.display()))?;
    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    let attempts = manifest
        .attempts
        .into_iter()
        .map(|entry| {
            let frames = load_frames(&base.join(&entry.frames))?;
            Ok(AttemptRequest { session_id: entry.session_id, trick: entry.trick, frames })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(engine.validate_batch(&attempts))
}

/// One line per trick: name, rotation band, contacts, stability, catch.
pub fn describe_rules(table: &RuleTable) -> String {
    let mut out = format!(
        "{:<16} {:>9} {:>13} {:>8} {:>10} {:>6}\n",
        "trick", "rotation", "band", "contacts", "stable_ms", "catch"
    );
    let show = |v: Option<f64>| v.map(|v| format!("{}", v)).unwrap_or_else(|| "-".to_string());

    for (name, rule) in table.iter() {
        let band = match (rule.min_rotation_deg, rule.max_rotation_deg) {
            (None, None) => "-".to_string(),
            (min, max) => format!("{}-{}", show(min), show(max)),
        };
        let marker = if name == table.fallback_name() { " (fallback)" } else { "" };
        out.push_str(&format!(
            "{:<16} {:>9} {:>13} {:>8} {:>10} {:>6}{}\n",
            name,
            show(rule.required_rotation_deg),
            band,
            rule.required_foot_contacts.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
            show(rule.min_stability_duration_ms),
            if rule.requires_catch { "yes" } else { "no" },
            marker
        ));
    }
    out
}

pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty { serde_json::to_string_pretty(value)? } else { serde_json::to_string(value)? };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;
    use trick_core::storage::{latest_session, StoredRecord};

    fn write_frames(dir: &Path, name: &str, count: usize) -> PathBuf {
        let frames: Vec<_> = (0..count)
            .map(|i| {
                let angle = if i == 10 { 25.0 } else { 0.0 };
                json!({
                    "frameIndex": i,
                    "timestampMs": i as f64 * 66.0,
                    "keypoints": [],
                    "boardVector": { "angle": angle, "pitch": 0.0, "yaw": 0.0 }
                })
            })
            .collect();
        let path = dir.join(name);
        fs::write(&path, serde_json::to_string(&frames).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_load_frames_accepts_both_layouts() {
        let dir = tempdir().unwrap();
        let bare = write_frames(dir.path(), "bare.json", 12);
        assert_eq!(load_frames(&bare).unwrap().len(), 12);

        let wrapped = dir.path().join("wrapped.json");
        let frames: serde_json::Value = serde_json::from_str(&fs::read_to_string(&bare).unwrap()).unwrap();
        fs::write(&wrapped, json!({ "frames": frames }).to_string()).unwrap();
        assert_eq!(load_frames(&wrapped).unwrap().len(), 12);
    }

    #[test]
    fn test_load_frames_errors_name_the_file() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty.json");
        fs::write(&empty, "[]").unwrap();
        let err = load_frames(&empty).unwrap_err();
        assert!(err.to_string().contains("empty.json"));

        let missing = dir.path().join("missing.json");
        let err = load_frames(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_resolve_config_precedence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "pop_angle_threshold_deg": 12.0 }"#).unwrap();

        let config = resolve_config(Some("strict"), Some(path.as_path())).unwrap();
        assert_eq!(config.pop_angle_threshold_deg, 12.0);

        let config = resolve_config(Some("strict"), None).unwrap();
        assert_eq!(config, ArbitrationConfig::strict());

        assert!(resolve_config(Some("olympic"), None).is_err());

        fs::write(&path, r#"{ "validity_threshold": 1.5 }"#).unwrap();
        assert!(resolve_config(None, Some(path.as_path())).is_err());
    }

    #[test]
    fn test_judge_file_records_verdict() {
        let dir = tempdir().unwrap();
        let frames = write_frames(dir.path(), "ollie.json", 20);
        let record = dir.path().join("out/verdicts.jsonl");
        let engine = ArbitrationEngine::default();

        let session = "6f9619ff-8b86-d011-b42d-00cf4fc964ff";
        let v = judge_file(&engine, &frames, "ollie", Some((record.as_path(), Some(session)))).unwrap();
        assert!(v.criteria.pop);

        judge_file(&engine, &frames, "kickflip", Some((record.as_path(), None))).unwrap();

        let records = JsonLinesSink::read_all(&record).unwrap();
        let verdicts: Vec<_> = records
            .iter()
            .filter_map(|r| match r {
                StoredRecord::Validation(v) => Some(v),
                _ => None,
            })
            .collect();
        assert_eq!(verdicts.len(), 2);
        assert_eq!(verdicts[0].session_id.to_string(), session);
        assert_eq!(verdicts[1].trick_requested, "kickflip");
        assert_ne!(verdicts[1].session_id, verdicts[0].session_id);
    }

    #[test]
    fn test_judge_file_records_whole_attempt() {
        let dir = tempdir().unwrap();
        let frames = write_frames(dir.path(), "ollie.json", 20);
        let record = dir.path().join("attempt.jsonl");
        let session = "6f9619ff-8b86-d011-b42d-00cf4fc964ff";

        let v = judge_file(&ArbitrationEngine::default(), &frames, "ollie", Some((record.as_path(), Some(session))))
            .unwrap();

        let records = JsonLinesSink::read_all(&record).unwrap();
        let count = |table: &str| records.iter().filter(|r| r.table() == table).count();
        assert_eq!(count("session"), 2);
        assert_eq!(count("keypoints"), 20);
        assert_eq!(count("features"), 1);
        assert_eq!(count("validation"), 1);
        assert_eq!(records.len(), 24);
        assert!(records.iter().all(|r| r.session_id().to_string() == session));

        match &records[0] {
            StoredRecord::Session(s) => assert_eq!(s.state, SessionState::Capturing),
            other => panic!("expected session row first, got {:?}", other),
        }
        let closed = latest_session(&records, Uuid::parse_str(session).unwrap()).unwrap();
        assert_eq!(closed.state, SessionState::from_validation(&v));
        assert_eq!(closed.confidence_score, Some(v.confidence));
        assert!(closed.completed_at.is_some());

        let angles: Vec<f64> = records
            .iter()
            .filter_map(|r| match r {
                StoredRecord::Keypoints(k) => Some(k.board_angle_roll),
                _ => None,
            })
            .collect();
        assert_eq!(angles[10], 25.0);
    }

    #[test]
    fn test_judge_file_without_record_writes_nothing() {
        let dir = tempdir().unwrap();
        let frames = write_frames(dir.path(), "ollie.json", 20);
        judge_file(&ArbitrationEngine::default(), &frames, "ollie", None).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_judge_file_rejects_bad_session_id() {
        let dir = tempdir().unwrap();
        let frames = write_frames(dir.path(), "f.json", 12);
        let record = dir.path().join("r.jsonl");
        let err = judge_file(&ArbitrationEngine::default(), &frames, "ollie", Some((record.as_path(), Some("nope"))))
            .unwrap_err();
        assert!(err.to_string().contains("Invalid session id"));
    }

    #[test]
    fn test_judge_manifest_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        write_frames(dir.path(), "a.json", 20);
        write_frames(dir.path(), "b.json", 5);
        let manifest = dir.path().join("manifest.json");
        fs::write(
            &manifest,
            json!({
                "attempts": [
                    { "sessionId": "first", "trick": "ollie", "frames": "a.json" },
                    { "trick": "heelflip", "frames": "b.json" }
                ]
            })
            .to_string(),
        )
        .unwrap();

        let outcomes = judge_manifest(&ArbitrationEngine::default(), &manifest).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].session_id.as_deref(), Some("first"));
        assert!(outcomes[0].validation.criteria.pop);
        assert_eq!(outcomes[1].validation.detected_trick, "unknown");
    }

    #[test]
    fn test_describe_rules_lists_builtin_table() {
        let listing = describe_rules(RuleTable::builtin());
        assert!(listing.starts_with("trick"));
        assert!(listing.contains("kickflip"));
        assert!(listing.contains("320-420"));
        assert!(listing.contains("(fallback)"));
        assert_eq!(listing.lines().count(), 1 + RuleTable::builtin().len());
    }
}
