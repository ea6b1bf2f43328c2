//! [`ValidationResult`] → YAML / JSON text.

use crate::error::SerializeError;
use crate::types::ValidationResult;

/// Serialize a result to YAML in its nested record shape.
pub fn to_yaml(result: &ValidationResult) -> Result<String, SerializeError> {
    serde_saphyr::to_string(&result.to_value()).map_err(|e| SerializeError {
        message: format!("failed to serialize to YAML: {}", e),
    })
}

/// Serialize a result to JSON in its nested record shape.
pub fn to_json(result: &ValidationResult, pretty: bool) -> Result<String, SerializeError> {
    let value = result.to_value();
    let text = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    text.map_err(|e| SerializeError {
        message: format!("failed to serialize to JSON: {}", e),
    })
}
