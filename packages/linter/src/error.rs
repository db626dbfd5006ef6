use blocksmith_common::{schema_source, ParsedSchema};
use thiserror::Error;

/// Why a template has no usable schema
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("No schema block to validate")]
    Missing,

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Schema must be a JSON object")]
    NotAnObject,
}

/// Strictly decode the schema block of a template.
pub fn load_schema(code: &str) -> Result<ParsedSchema, SchemaError> {
    let source = schema_source(code).ok_or(SchemaError::Missing)?;
    let value: serde_json::Value = serde_json::from_str(source)?;
    if !value.is_object() {
        return Err(SchemaError::NotAnObject);
    }
    Ok(serde_json::from_value(value)?)
}
