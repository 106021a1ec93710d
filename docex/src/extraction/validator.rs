//! JSON Schema validation of extracted data.

use serde_json::Value;

use super::error::ExtractionError;
use crate::registry::Schema;

/// Collect all validation errors from jsonschema validation.
///
/// Returns formatted error strings with instance paths; empty when `instance`
/// conforms.
///
/// # Errors
///
/// Returns `ExtractionError::InvalidSchema` if the schema does not compile.
pub fn collect_validation_errors(
    schema: &Value,
    instance: &Value,
) -> Result<Vec<String>, ExtractionError> {
    let validator = jsonschema::Validator::new(schema)
        .map_err(|e| ExtractionError::InvalidSchema(e.to_string()))?;

    Ok(validator
        .iter_errors(instance)
        .map(|error| {
            let path = error.instance_path.to_string();
            if path.is_empty() {
                error.to_string()
            } else {
                format!("At path '{path}': {error}")
            }
        })
        .collect())
}

/// Checks `data` against the schema's validation rules.
///
/// # Errors
///
/// Returns `ExtractionError::SchemaValidation` listing every violation, or
/// `ExtractionError::InvalidSchema` if the schema does not compile.
pub fn validate_against_schema(data: &Value, schema: &Schema) -> Result<(), ExtractionError> {
    let errors = collect_validation_errors(schema.document(), data)?;

    if let Some(first) = errors.first() {
        return Err(ExtractionError::SchemaValidation {
            message: first.clone(),
            errors,
        });
    }

    tracing::info!("Validation successful.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema_1040() -> Schema {
        Schema::new(json!({
            "$id": "1040",
            "version": "1.0",
            "type": "object",
            "properties": {
                "taxpayer_name": {"type": "string"},
                "income": {"type": "number"},
                "dependents": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {"name": {"type": "string"}},
                        "required": ["name"]
                    }
                }
            },
            "required": ["taxpayer_name", "income"],
            "additionalProperties": false
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_data_passes() {
        let data = json!({"taxpayer_name": "John", "income": 1200.5});
        assert!(validate_against_schema(&data, &schema_1040()).is_ok());
    }

    #[test]
    fn test_missing_required_field() {
        let data = json!({"taxpayer_name": "John"});
        let err = validate_against_schema(&data, &schema_1040()).unwrap_err();
        match &err {
            ExtractionError::SchemaValidation { message, errors } => {
                assert!(message.contains("income"));
                assert_eq!(errors.len(), 1);
            }
            other => panic!("expected schema validation error, got {other:?}"),
        }
        assert!(err.to_string().starts_with("Schema validation failed: "));
    }

    #[test]
    fn test_collects_every_violation() {
        let data = json!({
            "taxpayer_name": 42,
            "income": "lots",
            "extra": true,
            "dependents": [{"age": 3}]
        });
        let errors = collect_validation_errors(schema_1040().document(), &data).unwrap();
        assert!(errors.len() >= 4, "got {errors:?}");
        assert!(errors.iter().any(|e| e.contains("/taxpayer_name")));
        assert!(errors.iter().any(|e| e.contains("/dependents/0")));
    }

    #[test]
    fn test_wrong_top_level_type() {
        let err = validate_against_schema(&json!(["a"]), &schema_1040()).unwrap_err();
        assert!(matches!(err, ExtractionError::SchemaValidation { .. }));
    }

    #[test]
    fn test_invalid_schema_is_reported() {
        let schema = Schema::new(json!({"$id": "bad", "type": "no-such-type"})).unwrap();
        let err = validate_against_schema(&json!({}), &schema).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidSchema(_)));
    }
}
