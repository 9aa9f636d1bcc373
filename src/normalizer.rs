// 🧭 Normalizer - Reconcile classifier output with the taxonomy
// Never fails: every input, however malformed, yields a valid pair.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::record::{Enrichment, UNKNOWN_SUBCATEGORY_NAME};
use crate::taxonomy::Taxonomy;
use crate::validator::ClassificationResult;

/// How forgiving the pipeline is with classifier output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchingMode {
    /// Exact ids, then name/slug lookups; fallback uses keyword heuristics.
    #[default]
    Lenient,

    /// Exact ids only, anything else becomes the default pair; fallback
    /// skips heuristics.
    Strict,
}

impl MatchingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchingMode::Lenient => "lenient",
            MatchingMode::Strict => "strict",
        }
    }
}

impl FromStr for MatchingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(MatchingMode::Lenient),
            "strict" => Ok(MatchingMode::Strict),
            other => Err(format!("unknown matching mode '{}' (expected lenient or strict)", other)),
        }
    }
}

pub struct Normalizer {
    taxonomy: Arc<Taxonomy>,
    mode: MatchingMode,
}

impl Normalizer {
    pub fn new(taxonomy: Arc<Taxonomy>, mode: MatchingMode) -> Self {
        Normalizer { taxonomy, mode }
    }

    pub fn normalize(&self, result: &ClassificationResult) -> Enrichment {
        let (category_id, subcategory_id) = match self.mode {
            MatchingMode::Lenient => self.lenient_pair(result),
            MatchingMode::Strict => self.strict_pair(result),
        };
        self.enrichment(category_id, subcategory_id)
    }

    /// Triple for an already-valid pair, with the display name looked up.
    pub fn enrichment(&self, category_id: String, subcategory_id: String) -> Enrichment {
        let subcategory_name = self
            .taxonomy
            .subcategory_name(&subcategory_id)
            .unwrap_or(UNKNOWN_SUBCATEGORY_NAME)
            .to_string();
        Enrichment {
            category_id,
            subcategory_id,
            subcategory_name,
        }
    }

    pub fn default_enrichment(&self) -> Enrichment {
        self.enrichment(
            self.taxonomy.default_category_id().to_string(),
            self.taxonomy.default_subcategory_id().to_string(),
        )
    }

    pub fn resolve_category(&self, raw: Option<&str>) -> String {
        let taxonomy = &self.taxonomy;
        let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
            return taxonomy.default_category_id().to_string();
        };
        if taxonomy.is_valid_category(raw) {
            return raw.to_string();
        }
        taxonomy
            .resolve_category(raw)
            .unwrap_or(taxonomy.default_category_id())
            .to_string()
    }

    fn lenient_pair(&self, result: &ClassificationResult) -> (String, String) {
        let taxonomy = &self.taxonomy;
        let category_id = self.resolve_category(result.category_id.as_deref());

        let raw_subcategory = result
            .subcategory_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let Some(raw) = raw_subcategory else {
            return self.primary_pair(category_id);
        };

        // A known id is only kept under its own parent; a cross-category id
        // falls through to the name lookup and then the primary subcategory.
        if taxonomy.is_valid_pair(&category_id, raw) {
            return (category_id, raw.to_string());
        }
        if let Some(matched) = taxonomy.resolve_subcategory_within(&category_id, raw) {
            let matched = matched.to_string();
            return (category_id, matched);
        }

        self.primary_pair(category_id)
    }

    fn strict_pair(&self, result: &ClassificationResult) -> (String, String) {
        let taxonomy = &self.taxonomy;
        if let (Some(category_id), Some(subcategory_id)) = (
            result.category_id.as_deref().map(str::trim),
            result.subcategory_id.as_deref().map(str::trim),
        ) {
            if taxonomy.is_valid_pair(category_id, subcategory_id) {
                return (category_id.to_string(), subcategory_id.to_string());
            }
        }
        (
            taxonomy.default_category_id().to_string(),
            taxonomy.default_subcategory_id().to_string(),
        )
    }

    /// Category plus its primary subcategory. A category without
    /// subcategories cannot form a valid pair, so it collapses to the default.
    fn primary_pair(&self, category_id: String) -> (String, String) {
        let taxonomy = &self.taxonomy;
        match taxonomy.primary_subcategory_of(&category_id) {
            Some(primary) => {
                let primary = primary.to_string();
                (category_id, primary)
            }
            None => (
                taxonomy.default_category_id().to_string(),
                taxonomy.default_subcategory_id().to_string(),
            ),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
