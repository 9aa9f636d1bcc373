// 🧾 Receipt Records - Open key/value records with alias fallbacks
// Following the "aggregates as maps, not structs" approach: unknown fields
// ride along untouched, the pipeline only adds classification fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// FIELD ALIASES
// ============================================================================

/// Accepted keys per logical field, first non-null wins.
pub mod aliases {
    pub const AMOUNT: &[&str] = &["amount", "total"];
    pub const CURRENCY: &[&str] = &["currency"];
    pub const PAYEE: &[&str] = &["payee", "vendor"];
    pub const NOTE: &[&str] = &["note", "description"];
    pub const LABELS: &[&str] = &["labels"];
    pub const OCCURRED_AT: &[&str] = &["occurredAt", "date"];
    pub const EXISTING_CATEGORY: &[&str] = &["category"];
    pub const EXISTING_SUBCATEGORY: &[&str] = &["subcategoryId"];

    /// Text the keyword heuristics look at. Description comes first here,
    /// unlike the prompt's `note` projection.
    pub const HEURISTIC_TEXT: &[&str] = &["description", "note", "payee"];
}

/// Output keys written by classification
pub mod fields {
    pub const CATEGORY: &str = "category";
    pub const SUBCATEGORY_ID: &str = "subcategoryId";
    pub const SUBCATEGORY: &str = "subcategory";
}

/// Display name used when a subcategory id has no entry in the taxonomy
pub const UNKNOWN_SUBCATEGORY_NAME: &str = "Unknown";

// ============================================================================
// RECEIPT RECORD
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptRecord {
    fields: Map<String, Value>,
}

impl ReceiptRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// First non-null value among `keys`
    pub fn first_present(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|key| self.fields.get(*key))
            .find(|value| !value.is_null())
    }

    /// Like [`ReceiptRecord::first_present`] but yields `Value::Null` when absent,
    /// so projections never drop a key.
    pub fn project(&self, keys: &[&str]) -> Value {
        self.first_present(keys).cloned().unwrap_or(Value::Null)
    }

    /// Lowercased text for keyword matching, `None` when nothing usable is set.
    pub fn heuristic_text(&self) -> Option<String> {
        let text = value_to_text(self.first_present(aliases::HEURISTIC_TEXT)?)?;
        let lowered = text.to_lowercase();
        if lowered.is_empty() {
            None
        } else {
            Some(lowered)
        }
    }

    /// Return a copy with the classification fields merged over the originals.
    pub fn enriched(&self, enrichment: &Enrichment) -> ReceiptRecord {
        let mut record = self.clone();
        record.apply(enrichment);
        record
    }

    pub fn apply(&mut self, enrichment: &Enrichment) {
        self.fields.insert(
            fields::CATEGORY.to_string(),
            Value::String(enrichment.category_id.clone()),
        );
        self.fields.insert(
            fields::SUBCATEGORY_ID.to_string(),
            Value::String(enrichment.subcategory_id.clone()),
        );
        self.fields.insert(
            fields::SUBCATEGORY.to_string(),
            Value::String(enrichment.subcategory_name.clone()),
        );
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

#[cfg(test)]
impl ReceiptRecord {
    fn new() -> Self {
        Self::default()
    }

    fn len(&self) -> usize {
        self.fields.len()
    }
}

impl From<Map<String, Value>> for ReceiptRecord {
    fn from(fields: Map<String, Value>) -> Self {
        ReceiptRecord { fields }
    }
}

impl TryFrom<Value> for ReceiptRecord {
    type Error = Value;

    /// Only JSON objects are records; anything else is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(ReceiptRecord { fields }),
            other => Err(other),
        }
    }
}

/// Render a scalar JSON value as text. Strings are used as-is, numbers and
/// booleans via their JSON form; null yields `None`, containers their JSON text.
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ============================================================================
// ENRICHMENT
// ============================================================================

/// A validated `(category, subcategory, display name)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    pub category_id: String,
    pub subcategory_id: String,
    pub subcategory_name: String,
}

// ============================================================================
// TESTS
// ============================================================================
