// 📐 Response Validator - Shape checks for classifier replies
// All-or-nothing: any failure here sends the whole batch to fallback.

use serde_json::Value;
use thiserror::Error;

use crate::record::value_to_text;

const CATEGORY_KEYS: &[&str] = &["categoryId", "category", "category_id"];
const SUBCATEGORY_KEYS: &[&str] = &["subcategoryId", "subcategory", "subcategory_id"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    #[error("no text in the first candidate")]
    MissingText,

    #[error("candidate text is not valid JSON: {0}")]
    Parse(String),

    #[error("expected a JSON array, got {0}")]
    NotArray(&'static str),

    #[error("expected {expected} results, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// One untrusted element of the classifier's array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationResult {
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
}

impl ClassificationResult {
    /// Read an element, accepting camel/snake aliases. Non-objects yield an
    /// empty result; the normalizer decides what that means.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return ClassificationResult::default();
        };
        let pick = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| object.get(*key))
                .find(|v| !v.is_null())
                .and_then(scalar_text)
        };
        ClassificationResult {
            category_id: pick(CATEGORY_KEYS),
            subcategory_id: pick(SUBCATEGORY_KEYS),
        }
    }
}

/// Trimmed text of a scalar; empty strings and containers count as absent.
fn scalar_text(value: &Value) -> Option<String> {
    if value.is_array() || value.is_object() {
        return None;
    }
    let text = value_to_text(value)?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Concatenate the text parts of the first candidate.
pub fn extract_text(body: &Value) -> Result<String, ResponseError> {
    let parts = body
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or(ResponseError::MissingText)?;

    let texts: Vec<&str> = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .filter(|text| !text.is_empty())
        .collect();

    let joined = texts.join("\n");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        return Err(ResponseError::MissingText);
    }
    Ok(trimmed.to_string())
}

/// Parse candidate text into exactly `expected_len` results.
pub fn parse_results(text: &str, expected_len: usize) -> Result<Vec<ClassificationResult>, ResponseError> {
    let parsed: Value = serde_json::from_str(text).map_err(|e| ResponseError::Parse(e.to_string()))?;

    let items = match parsed {
        Value::Array(items) => items,
        other => return Err(ResponseError::NotArray(kind(&other))),
    };
    if items.len() != expected_len {
        return Err(ResponseError::LengthMismatch {
            expected: expected_len,
            actual: items.len(),
        });
    }

    Ok(items.iter().map(ClassificationResult::from_value).collect())
}

// ============================================================================
// TESTS
// ============================================================================
