//! Arbitration thresholds
//!
//! Every numeric constant the detectors and the scorer use lives here, so a
//! practice mode or a contest mode is a preset rather than a code change.
//!
//! | Field | Default | Used by |
//! |-------|---------|---------|
//! | `min_frames` | 10 | length guard |
//! | `pop_angle_threshold_deg` | 20 | pop |
//! | `ankle_contact_min_y` | 0.7 | catch |
//! | `ankle_min_confidence` | 0.6 | catch |
//! | `stability_max_variance` | 50 | stability |
//! | `validity_threshold` | 0.7 | verdict |
//!
//! ## Environment Variables
//!
//! - `TRICK_ARB_PROFILE`: preset (`default`, `lenient`, `strict`)
//! - `TRICK_ARB_CONFIG_PATH`: JSON config file, takes precedence over the profile

use std::{env, fs};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ArbitrationError, Result};

pub const PROFILE_ENV: &str = "TRICK_ARB_PROFILE";
pub const CONFIG_PATH_ENV: &str = "TRICK_ARB_CONFIG_PATH";

/// Per-criterion contribution to the confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriterionWeights {
    pub pop: f64,
    pub rotation: f64,
    pub catch: f64,
    pub stability: f64,
}

impl Default for CriterionWeights {
    fn default() -> Self {
        Self { pop: 0.2, rotation: 0.3, catch: 0.2, stability: 0.3 }
    }
}

impl CriterionWeights {
    pub fn total(&self) -> f64 {
        self.pop + self.rotation + self.catch + self.stability
    }
}

/// Thresholds and defaults for one arbitration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbitrationConfig {
    /// Sequences shorter than this are rejected before segmentation
    pub min_frames: usize,
    /// Board angle change between attempt start and peak that counts as a pop
    pub pop_angle_threshold_deg: f64,
    /// Ankles lower in the frame than this normalized y count as touching the board
    pub ankle_contact_min_y: f64,
    pub ankle_min_confidence: f64,
    /// Max population variance of landing angles (deg²)
    pub stability_max_variance: f64,
    /// Used when a rule has no `min_stability_duration_ms`
    pub default_min_stability_ms: f64,
    /// Used when a rule has no `required_foot_contacts`
    pub default_foot_contacts: u32,
    /// Used when a rule has no rotation bounds
    pub default_min_rotation_deg: f64,
    pub default_max_rotation_deg: f64,
    pub weights: CriterionWeights,
    /// Minimum confidence for a valid verdict
    pub validity_threshold: f64,
}

impl Default for ArbitrationConfig {
    fn default() -> Self {
        Self {
            min_frames: 10,
            pop_angle_threshold_deg: 20.0,
            ankle_contact_min_y: 0.7,
            ankle_min_confidence: 0.6,
            stability_max_variance: 50.0,
            default_min_stability_ms: 300.0,
            default_foot_contacts: 2,
            default_min_rotation_deg: 0.0,
            default_max_rotation_deg: 720.0,
            weights: CriterionWeights::default(),
            validity_threshold: 0.7,
        }
    }
}

impl ArbitrationConfig {
    /// Practice sessions: noisier landings and softer pops still count.
    pub fn lenient() -> Self {
        Self {
            pop_angle_threshold_deg: 15.0,
            ankle_min_confidence: 0.5,
            stability_max_variance: 80.0,
            validity_threshold: 0.6,
            ..Self::default()
        }
    }

    /// Judged games: cleaner landings and a stricter confidence gate.
    pub fn strict() -> Self {
        Self {
            pop_angle_threshold_deg: 25.0,
            ankle_min_confidence: 0.7,
            stability_max_variance: 30.0,
            validity_threshold: 0.8,
            ..Self::default()
        }
    }

    /// Preset by name; unknown names yield `None`.
    pub fn from_profile(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "default" | "" => Some(Self::default()),
            "lenient" | "practice" => Some(Self::lenient()),
            "strict" | "contest" => Some(Self::strict()),
            _ => None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Config file from `TRICK_ARB_CONFIG_PATH`, else the `TRICK_ARB_PROFILE`
    /// preset, else defaults. Problems are logged and the default is used.
    pub fn from_env_or_default() -> Self {
        match Self::from_env() {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                warn!("Ignoring arbitration config from environment: {}", e);
                Self::default()
            }
        }
    }

    /// Strict variant of [`from_env_or_default`](Self::from_env_or_default).
    pub fn from_env() -> Result<Option<Self>> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            let path = path.trim();
            if !path.is_empty() {
                let content = fs::read_to_string(path)?;
                let config = Self::from_json(&content)?;
                config.validate()?;
                return Ok(Some(config));
            }
        }

        if let Ok(profile) = env::var(PROFILE_ENV) {
            return Self::from_profile(&profile).map(Some).ok_or_else(|| {
                ArbitrationError::InvalidConfig(format!("unknown {} '{}'", PROFILE_ENV, profile))
            });
        }

        Ok(None)
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("pop", self.weights.pop),
            ("rotation", self.weights.rotation),
            ("catch", self.weights.catch),
            ("stability", self.weights.stability),
        ];
        for (name, w) in weights {
            if !(0.0..=1.0).contains(&w) {
                return Err(ArbitrationError::InvalidConfig(format!(
                    "weight '{}' must be within [0, 1], got {}",
                    name, w
                )));
            }
        }
        if (self.weights.total() - 1.0).abs() > 1e-6 {
            return Err(ArbitrationError::InvalidConfig(format!(
                "weights must sum to 1.0, got {}",
                self.weights.total()
            )));
        }
        for (name, v) in [
            ("ankle_contact_min_y", self.ankle_contact_min_y),
            ("ankle_min_confidence", self.ankle_min_confidence),
            ("validity_threshold", self.validity_threshold),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(ArbitrationError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, v
                )));
            }
        }
        for (name, v) in [
            ("pop_angle_threshold_deg", self.pop_angle_threshold_deg),
            ("stability_max_variance", self.stability_max_variance),
            ("default_min_stability_ms", self.default_min_stability_ms),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ArbitrationError::InvalidConfig(format!(
                    "{} must be non-negative, got {}",
                    name, v
                )));
            }
        }
        if self.default_min_rotation_deg > self.default_max_rotation_deg {
            return Err(ArbitrationError::InvalidConfig(
                "default rotation band is inverted".to_string(),
            ));
        }
        if self.min_frames == 0 {
            return Err(ArbitrationError::InvalidConfig("min_frames must be at least 1".to_string()));
        }
        Ok(())
    }
}
