//! Per-trick validation thresholds.

use serde::{Deserialize, Serialize};

use crate::error::{ArbitrationError, Result};

/// Thresholds a single trick must satisfy.
///
/// Unset fields fall back to the engine defaults (see
/// [`ArbitrationConfig`](crate::arbitration::ArbitrationConfig)) when a
/// detector reads them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrickRule {
    /// Canonical rotation (e.g. 180, 360). `None` disables the rotation check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_rotation_deg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rotation_deg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rotation_deg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_foot_contacts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_stability_duration_ms: Option<f64>,
    #[serde(default)]
    pub requires_catch: bool,
}

impl TrickRule {
    /// Flat-ground rule: no rotation, two contacts, short stability window.
    pub fn ollie() -> Self {
        Self {
            required_rotation_deg: None,
            min_rotation_deg: Some(0.0),
            max_rotation_deg: Some(30.0),
            required_foot_contacts: Some(2),
            min_stability_duration_ms: Some(250.0),
            requires_catch: false,
        }
    }

    /// Rotation trick with a symmetric-ish acceptance band.
    pub fn rotation(required: f64, min: f64, max: f64) -> Self {
        Self {
            required_rotation_deg: Some(required),
            min_rotation_deg: Some(min),
            max_rotation_deg: Some(max),
            required_foot_contacts: Some(2),
            min_stability_duration_ms: Some(300.0),
            requires_catch: false,
        }
    }

    pub fn with_catch(mut self, requires_catch: bool) -> Self {
        self.requires_catch = requires_catch;
        self
    }

    pub fn with_stability_ms(mut self, ms: f64) -> Self {
        self.min_stability_duration_ms = Some(ms);
        self
    }

    pub fn with_foot_contacts(mut self, contacts: u32) -> Self {
        self.required_foot_contacts = Some(contacts);
        self
    }

    /// Whether the rotation detector has anything to check.
    ///
    /// A zero canonical rotation counts as "no rotation required".
    pub fn checks_rotation(&self) -> bool {
        matches!(self.required_rotation_deg, Some(deg) if deg > 0.0)
    }

    /// Reject bands that can never pass and negative durations.
    pub fn validate(&self, trick: &str) -> Result<()> {
        let invalid = |reason: String| ArbitrationError::InvalidRule {
            trick: trick.to_string(),
            reason,
        };

        if let (Some(min), Some(max)) = (self.min_rotation_deg, self.max_rotation_deg) {
            if min > max {
                return Err(invalid(format!("rotation band [{}-{}] is inverted", min, max)));
            }
        }
        for (name, value) in [
            ("required_rotation_deg", self.required_rotation_deg),
            ("min_rotation_deg", self.min_rotation_deg),
            ("max_rotation_deg", self.max_rotation_deg),
            ("min_stability_duration_ms", self.min_stability_duration_ms),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(invalid(format!("{} must be a non-negative number, got {}", name, v)));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollie_does_not_check_rotation() {
        assert!(!TrickRule::ollie().checks_rotation());
        assert!(TrickRule::rotation(180.0, 160.0, 200.0).checks_rotation());
    }

    #[test]
    fn test_zero_required_rotation_is_unchecked() {
        let rule = TrickRule { required_rotation_deg: Some(0.0), ..TrickRule::ollie() };
        assert!(!rule.checks_rotation());
    }

    #[test]
    fn test_inverted_band_rejected() {
        let rule = TrickRule::rotation(180.0, 200.0, 160.0);
        let err = rule.validate("bad-180").unwrap_err();
        assert!(err.to_string().contains("bad-180"));
        assert!(err.to_string().contains("inverted"));
    }

    #[test]
    fn test_negative_stability_rejected() {
        let rule = TrickRule::ollie().with_stability_ms(-1.0);
        assert!(rule.validate("ollie").is_err());
    }

    #[test]
    fn test_yaml_fields_are_optional() {
        let rule: TrickRule = serde_yaml::from_str("requires_catch: true").unwrap();
        assert!(rule.requires_catch);
        assert!(rule.required_rotation_deg.is_none());
        assert!(rule.required_foot_contacts.is_none());
    }
}
