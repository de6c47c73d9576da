pub mod json_api;

pub use json_api::{
    analyze_trick_json, analyze_trick_json_with_config, validate_batch_json,
    validate_batch_json_with_config, validate_trick_json, validate_trick_json_with_config, BatchRequest,
    ValidationRequest, SCHEMA_VERSION,
};
