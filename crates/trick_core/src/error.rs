use thiserror::Error;

/// Errors raised at the edges of the arbitration core.
///
/// Judging itself never fails: short sequences, missing board vectors and
/// unknown tricks all produce a verdict. These variants cover caller bugs
/// and configuration problems only.
#[derive(Error, Debug)]
pub enum ArbitrationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("Unsupported schema version: found {found}, expected {expected}")]
    SchemaVersion { found: u32, expected: u32 },

    #[error("Rule table has no fallback rule '{name}'")]
    MissingFallback { name: String },

    #[error("Invalid rule for '{trick}': {reason}")]
    InvalidRule { trick: String, reason: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ArbitrationError {
    /// True when the error points at the caller's input rather than at the
    /// environment (files, sinks, models).
    pub fn is_caller_error(&self) -> bool {
        match self {
            ArbitrationError::Json(_) => true,
            ArbitrationError::EmptySequence => true,
            ArbitrationError::SchemaVersion { .. } => true,
            ArbitrationError::InvalidRule { .. } => true,
            ArbitrationError::InvalidConfig(_) => true,
            ArbitrationError::MissingFallback { .. } => true,
            ArbitrationError::Yaml(_) => true,
            ArbitrationError::Io(_) => false,
            ArbitrationError::Inference(_) => false,
            ArbitrationError::Storage(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ArbitrationError>;
