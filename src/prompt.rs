// 📝 Prompt Builder - Batch classification request text
// Pure: same records + same taxonomy -> byte-identical prompt.

use crate::record::{aliases, ReceiptRecord};
use crate::taxonomy::Taxonomy;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

const PREAMBLE: &str = "You categorize receipt line items into the known categories.";
const EXAMPLE_RESPONSE: &str = "Respond with: [{\"categoryId\":\"foodAndDrinks\",\"subcategoryId\":\"foodAndDrinks:groceries\"}, ...].";

/// Compact projection of one record, key order is part of the prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRecord {
    pub index: usize,
    pub amount: Value,
    pub currency: Value,
    pub payee: Value,
    pub note: Value,
    pub labels: Value,
    pub occurred_at: Value,
    pub existing_category: Value,
    pub existing_subcategory: Value,
}

impl PromptRecord {
    pub fn from_record(index: usize, record: &ReceiptRecord) -> Self {
        PromptRecord {
            index,
            amount: record.project(aliases::AMOUNT),
            currency: record.project(aliases::CURRENCY),
            payee: record.project(aliases::PAYEE),
            note: record.project(aliases::NOTE),
            labels: record.project(aliases::LABELS),
            occurred_at: record.project(aliases::OCCURRED_AT),
            existing_category: record.project(aliases::EXISTING_CATEGORY),
            existing_subcategory: record.project(aliases::EXISTING_SUBCATEGORY),
        }
    }
}

pub struct PromptBuilder<'a> {
    taxonomy: &'a Taxonomy,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        PromptBuilder { taxonomy }
    }

    pub fn project(records: &[ReceiptRecord]) -> Vec<PromptRecord> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| PromptRecord::from_record(index, record))
            .collect()
    }

    /// Build the full prompt for a batch.
    pub fn build(&self, records: &[ReceiptRecord]) -> String {
        let projected = Self::project(records);
        // Serializing plain structs of JSON values cannot fail.
        let records_json = serde_json::to_string_pretty(&projected).unwrap_or_else(|_| "[]".to_string());
        let count = records.len();

        let sections = [
            PREAMBLE.to_string(),
            self.taxonomy.reference_text().to_string(),
            "Rules:".to_string(),
            "IMPORTANT: Only return valid JSON array — do not include extra commentary or explanations.".to_string(),
            format!(
                "1. Always return JSON with the same number of items as the input. The input has {count} records, so the array must have exactly {count} elements in the same order."
            ),
            "2. Use exact category and subcategory ids.".to_string(),
            format!(
                "3. If nothing matches, use {} and {}.",
                self.taxonomy.default_category_id(),
                self.taxonomy.default_subcategory_id()
            ),
            "4. Match by payee, description, and amount when possible.".to_string(),
            EXAMPLE_RESPONSE.to_string(),
            "Input records:".to_string(),
            records_json,
        ];

        sections.join("\n\n")
    }

    /// SHA-256 of a prompt, for correlating identical batches in logs.
    pub fn fingerprint(prompt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(prompt.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

// ============================================================================
// TESTS
// ============================================================================
