//! JSON entry points for hosts that only speak strings (mobile shells,
//! scripting bridges).
//!
//! Requests carry an optional `schemaVersion` (default 1). Malformed input is
//! an error; a poor attempt is not, it is a verdict with `isValid: false`.
//!
//! The plain entry points judge with [`ArbitrationConfig::default`]. Hosts
//! that tune thresholds resolve a config once and pass it to the `_with_config`
//! variants; nothing here reads the environment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arbitration::{ArbitrationConfig, ArbitrationEngine, AttemptRequest};
use crate::data::RuleTable;
use crate::error::{ArbitrationError, Result};
use crate::models::{FrameSample, TrickRule};

/// Wire schema version of requests and responses
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Judge one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub trick: String,
    pub frames: Vec<FrameSample>,
    /// Extra or replacement rules layered over the built-in table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<BTreeMap<String, TrickRule>>,
}

/// Judge several independent attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub attempts: Vec<AttemptRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<BTreeMap<String, TrickRule>>,
}

fn check_schema_version(found: u32) -> Result<()> {
    if found != SCHEMA_VERSION {
        return Err(ArbitrationError::SchemaVersion { found, expected: SCHEMA_VERSION });
    }
    Ok(())
}

/// Built-in table with the request's rules layered on top.
fn rule_table(overrides: Option<&BTreeMap<String, TrickRule>>) -> Result<RuleTable> {
    let mut table = RuleTable::builtin().clone();
    for (name, rule) in overrides.into_iter().flatten() {
        rule.validate(name)?;
        table = table.with_rule(name, rule.clone());
    }
    Ok(table)
}

fn engine_for(
    overrides: Option<&BTreeMap<String, TrickRule>>,
    config: &ArbitrationConfig,
) -> Result<ArbitrationEngine> {
    Ok(ArbitrationEngine::new(rule_table(overrides)?, config.clone()))
}

fn parse_request(request_json: &str) -> Result<ValidationRequest> {
    let request: ValidationRequest = serde_json::from_str(request_json)?;
    check_schema_version(request.schema_version)?;
    if request.frames.is_empty() {
        return Err(ArbitrationError::EmptySequence);
    }
    Ok(request)
}

/// Judge one attempt and return the serialized `TrickValidation`.
pub fn validate_trick_json(request_json: &str) -> Result<String> {
    validate_trick_json_with_config(request_json, &ArbitrationConfig::default())
}

pub fn validate_trick_json_with_config(request_json: &str, config: &ArbitrationConfig) -> Result<String> {
    let request = parse_request(request_json)?;
    debug!(trick = %request.trick, frames = request.frames.len(), "validate_trick_json");

    let engine = engine_for(request.rules.as_ref(), config)?;
    let validation = engine.validate(&request.frames, &request.trick);
    Ok(serde_json::to_string(&validation)?)
}

/// Like [`validate_trick_json`] but returns the full `ArbitrationReport`
/// with phases and per-detector measurements.
pub fn analyze_trick_json(request_json: &str) -> Result<String> {
    analyze_trick_json_with_config(request_json, &ArbitrationConfig::default())
}

pub fn analyze_trick_json_with_config(request_json: &str, config: &ArbitrationConfig) -> Result<String> {
    let request = parse_request(request_json)?;
    let engine = engine_for(request.rules.as_ref(), config)?;
    let report = engine.analyze(&request.frames, &request.trick);
    Ok(serde_json::to_string(&report)?)
}

/// Judge a batch; the response is an array of outcomes in request order.
pub fn validate_batch_json(request_json: &str) -> Result<String> {
    validate_batch_json_with_config(request_json, &ArbitrationConfig::default())
}

pub fn validate_batch_json_with_config(request_json: &str, config: &ArbitrationConfig) -> Result<String> {
    let request: BatchRequest = serde_json::from_str(request_json)?;
    check_schema_version(request.schema_version)?;
    if request.attempts.iter().any(|a| a.frames.is_empty()) {
        return Err(ArbitrationError::EmptySequence);
    }
    debug!(attempts = request.attempts.len(), "validate_batch_json");

    let engine = engine_for(request.rules.as_ref(), config)?;
    Ok(serde_json::to_string(&engine.validate_batch(&request.attempts))?)
}
