// 🛟 Fallback Engine - Local classification without the classifier
// Keyword heuristics first, then the hard default pair.

use std::fmt;
use std::sync::Arc;

use crate::normalizer::{MatchingMode, Normalizer};
use crate::record::{Enrichment, ReceiptRecord};
use crate::rules::RuleEngine;
use crate::taxonomy::Taxonomy;

/// Why a batch skipped (or lost) the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    MissingCredential,
    ClassifierFailed(String),
    InvalidResponse(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::MissingCredential => write!(f, "classifier credential missing"),
            FallbackReason::ClassifierFailed(msg) => write!(f, "classifier failed: {}", msg),
            FallbackReason::InvalidResponse(msg) => write!(f, "invalid classifier response: {}", msg),
        }
    }
}

pub struct FallbackEngine {
    rules: RuleEngine,
    normalizer: Normalizer,
    use_heuristics: bool,
}

impl FallbackEngine {
    /// Rules that do not form a valid taxonomy pair are dropped here.
    pub fn new(taxonomy: Arc<Taxonomy>, rules: RuleEngine, mode: MatchingMode) -> Self {
        let rules = rules.retain_valid(&taxonomy);
        FallbackEngine {
            rules,
            normalizer: Normalizer::new(taxonomy, mode),
            use_heuristics: mode == MatchingMode::Lenient,
        }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.rule_count()
    }

    pub fn classify(&self, record: &ReceiptRecord) -> Enrichment {
        if self.use_heuristics {
            if let Some(hit) = record.heuristic_text().and_then(|text| self.rules.classify(&text)) {
                return self.normalizer.enrichment(hit.category_id, hit.subcategory_id);
            }
        }
        self.normalizer.default_enrichment()
    }

    pub fn apply(&self, record: &ReceiptRecord) -> ReceiptRecord {
        record.enriched(&self.classify(record))
    }

    pub fn apply_all(&self, records: &[ReceiptRecord]) -> Vec<ReceiptRecord> {
        records.iter().map(|record| self.apply(record)).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
