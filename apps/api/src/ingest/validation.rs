//! Schema validation for résumé JSON.
//!
//! This is the only way untrusted JSON becomes a `ResumeData`: user uploads and
//! model replies both pass through `parse_resume` / `validate_resume` with the
//! same strictness.
//!
//! Rules:
//! - missing fields take their defaults (null scalars, empty sequences, default sub-objects)
//! - unrecognized fields are ignored
//! - a recognized field holding the wrong JSON type fails the whole record

use serde_json::Value;
use thiserror::Error;

use crate::models::ResumeData;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Input is not valid JSON: {0}")]
    NotJson(#[source] serde_json::Error),

    #[error("JSON does not match the resume schema: {0}")]
    WrongShape(String),
}

impl SchemaError {
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaError::NotJson(_) => "not_json",
            SchemaError::WrongShape(_) => "wrong_shape",
        }
    }
}

/// Parses text as JSON, then validates it against the résumé schema.
pub fn parse_resume(text: &str) -> Result<ResumeData, SchemaError> {
    let value: Value = serde_json::from_str(text).map_err(SchemaError::NotJson)?;
    validate_resume(value)
}

/// Validates an already-parsed JSON value against the résumé schema.
pub fn validate_resume(value: Value) -> Result<ResumeData, SchemaError> {
    require_object_shapes(&value)?;
    serde_json::from_value(value).map_err(|e| SchemaError::WrongShape(e.to_string()))
}

/// Positions that must hold JSON objects. Serde would otherwise accept a
/// positional array for a struct, which the schema does not allow.
const OBJECT_FIELDS: &[&str] = &["contact", "assets"];
const OBJECT_LISTS: &[&str] = &["experience", "projects", "education"];

fn require_object_shapes(value: &Value) -> Result<(), SchemaError> {
    let root = value.as_object().ok_or_else(|| {
        SchemaError::WrongShape(format!(
            "expected a JSON object at the top level, found {}",
            json_type(value)
        ))
    })?;

    for &field in OBJECT_FIELDS {
        if let Some(v) = root.get(field) {
            expect_object(v, field)?;
        }
    }

    for &field in OBJECT_LISTS {
        let Some(Value::Array(items)) = root.get(field) else {
            continue;
        };
        for (i, item) in items.iter().enumerate() {
            expect_object(item, &format!("{field}[{i}]"))?;
            if field == "projects" {
                if let Some(links) = item.get("links") {
                    expect_object(links, &format!("projects[{i}].links"))?;
                }
            }
        }
    }

    Ok(())
}

fn expect_object(value: &Value, path: &str) -> Result<(), SchemaError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(SchemaError::WrongShape(format!(
            "{path}: expected an object, found {}",
            json_type(value)
        )))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
