//! Static data embedded in the crate.

pub mod rules;

pub use rules::{RuleTable, RULE_SCHEMA_VERSION, TRICK_RULES_YAML};
