//! Arbitration engine
//!
//! Runs the fixed SET → ATTEMPT → LAND pipeline over one finished capture
//! buffer and produces a [`TrickValidation`]:
//!
//! 1. length guard (the only early return)
//! 2. rule lookup, unknown tricks judged as an ollie
//! 3. phase segmentation
//! 4. pop, rotation, catch and stability detectors, all always evaluated
//! 5. weighted confidence and verdict
//!
//! Failure reasons accumulate in check order. Missing board vectors,
//! low-confidence landmarks and absent timestamps lower the pass rate of the
//! detectors; they are never errors.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::ArbitrationConfig;
use super::detectors::{
    check_catch, check_rotation, check_stability, detect_pop, pop_angle_change, CatchCheck,
    RotationCheck, StabilityCheck,
};
use super::phases::{segment, TrickPhases};
use crate::data::RuleTable;
use crate::models::{FrameSample, TrickCriteria, TrickRule, TrickValidation};

pub const REASON_TOO_SHORT: &str = "sequence too short for analysis";
pub const REASON_PHASES_INCOMPLETE: &str = "trick phases incomplete (set/attempt/land)";
pub const REASON_NO_POP: &str = "insufficient pop (weak take-off)";
pub const REASON_ROTATION: &str = "rotation incomplete or incorrect";
pub const REASON_MISSED_CATCH: &str = "missed catch (no foot contact after rotation)";

/// Everything the pipeline measured for one attempt, next to the verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbitrationReport {
    pub trick_requested: String,
    /// Whether the requested name matched a rule (false means the fallback was used)
    pub rule_matched: bool,
    pub rule: TrickRule,
    pub phases: TrickPhases,
    pub pop_angle_change: Option<f64>,
    pub rotation: RotationCheck,
    pub catch: CatchCheck,
    pub stability: StabilityCheck,
    pub validation: TrickValidation,
}

/// Judge for trick attempts, holding an injected rule table and thresholds.
///
/// The engine is immutable and `Sync`; one instance can serve any number of
/// threads.
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitrationEngine {
    rules: RuleTable,
    config: ArbitrationConfig,
}

impl Default for ArbitrationEngine {
    fn default() -> Self {
        Self::new(RuleTable::default(), ArbitrationConfig::default())
    }
}

impl ArbitrationEngine {
    pub fn new(rules: RuleTable, config: ArbitrationConfig) -> Self {
        Self { rules, config }
    }

    pub fn with_config(mut self, config: ArbitrationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn config(&self) -> &ArbitrationConfig {
        &self.config
    }

    /// Judge one attempt.
    pub fn validate(&self, sequence: &[FrameSample], trick_requested: &str) -> TrickValidation {
        arbitrate(sequence, trick_requested, &self.rules, &self.config)
    }

    /// Judge one attempt and keep every intermediate measurement.
    pub fn analyze(&self, sequence: &[FrameSample], trick_requested: &str) -> ArbitrationReport {
        let rule = self.rules.lookup(trick_requested);
        let phases = segment(sequence);

        ArbitrationReport {
            trick_requested: trick_requested.to_string(),
            rule_matched: self.rules.is_known(trick_requested),
            rule: rule.clone(),
            phases,
            pop_angle_change: pop_angle_change(sequence, &phases),
            rotation: check_rotation(sequence, &phases, rule, &self.config),
            catch: check_catch(sequence, &phases, rule, &self.config),
            stability: check_stability(sequence, &phases, rule, &self.config),
            validation: self.validate(sequence, trick_requested),
        }
    }
}

/// Judge one attempt with the built-in rule table and default thresholds.
pub fn validate_trick(sequence: &[FrameSample], trick_requested: &str) -> TrickValidation {
    arbitrate(sequence, trick_requested, RuleTable::builtin(), &ArbitrationConfig::default())
}

fn arbitrate(
    sequence: &[FrameSample],
    trick_requested: &str,
    rules: &RuleTable,
    config: &ArbitrationConfig,
) -> TrickValidation {
    if sequence.len() < config.min_frames {
        debug!(frames = sequence.len(), min = config.min_frames, "sequence too short");
        return TrickValidation::insufficient_data(REASON_TOO_SHORT);
    }

    let rule = rules.lookup(trick_requested);
    let mut failure_reasons = Vec::new();

    let phases = segment(sequence);
    if !phases.is_complete() {
        failure_reasons.push(REASON_PHASES_INCOMPLETE.to_string());
    }

    let pop = detect_pop(sequence, &phases, config);
    if !pop {
        failure_reasons.push(REASON_NO_POP.to_string());
    }

    let rotation = check_rotation(sequence, &phases, rule, config);
    if !rotation.valid {
        failure_reasons.push(rotation.reason.clone().unwrap_or_else(|| REASON_ROTATION.to_string()));
    }

    // Catch is always scored, but only blocks the verdict when the rule asks for it
    let catch = check_catch(sequence, &phases, rule, config);
    if rule.requires_catch && !catch.valid {
        failure_reasons.push(REASON_MISSED_CATCH.to_string());
    }

    let stability = check_stability(sequence, &phases, rule, config);
    if !stability.valid {
        let min_ms = rule.min_stability_duration_ms.unwrap_or(config.default_min_stability_ms);
        failure_reasons.push(format!("insufficient stability (minimum {}ms required)", min_ms));
    }

    debug!(
        pop,
        rotation = rotation.valid,
        rotation_angle = ?rotation.angle,
        catch = catch.valid,
        foot_contacts = catch.foot_contacts,
        stability = stability.valid,
        landing_ms = ?stability.duration,
        "criteria evaluated"
    );

    let weights = &config.weights;
    let confidence = ((if pop { weights.pop } else { 0.0 })
        + (if rotation.valid { weights.rotation } else { 0.0 })
        + (if catch.valid { weights.catch } else { 0.0 })
        + (if stability.valid { weights.stability } else { 0.0 }))
    .clamp(0.0, 1.0);

    let is_valid = failure_reasons.is_empty() && confidence >= config.validity_threshold;
    let required_contacts = rule.required_foot_contacts.unwrap_or(config.default_foot_contacts);

    let validation = TrickValidation {
        is_valid,
        confidence,
        detected_trick: rotation.detected_trick.clone().unwrap_or_else(|| trick_requested.to_string()),
        criteria: TrickCriteria {
            pop,
            rotation: rotation.valid,
            catch: catch.valid,
            stability: stability.valid,
            foot_contact: catch.foot_contacts >= required_contacts,
        },
        failure_reasons,
        rotation_angle: rotation.angle,
        stability_duration: stability.duration,
        foot_contacts: catch.foot_contacts,
    };

    info!(
        trick = trick_requested,
        valid = validation.is_valid,
        confidence = validation.confidence,
        failures = validation.failure_reasons.len(),
        "trick judged"
    );
    validation
}
