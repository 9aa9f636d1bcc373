// 🔄 Categorization Pipeline - records → prompt → classifier → normalizer
// Any classifier or validation failure sends the whole batch through fallback.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classifier::{call_with_policy, CallPolicy, Classifier, GeminiClient};
use crate::config::CategorizerConfig;
use crate::fallback::{FallbackEngine, FallbackReason};
use crate::normalizer::{MatchingMode, Normalizer};
use crate::prompt::PromptBuilder;
use crate::record::ReceiptRecord;
use crate::rules::RuleEngine;
use crate::taxonomy::Taxonomy;
use crate::validator::{extract_text, parse_results};

const LOG_PREVIEW_CHARS: usize = 512;

/// Where the categories of a batch came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationSource {
    /// Empty input, nothing to classify
    Empty,
    Classifier,
    Fallback(FallbackReason),
}

impl ClassificationSource {
    pub fn label(&self) -> &'static str {
        match self {
            ClassificationSource::Empty => "empty",
            ClassificationSource::Classifier => "classifier",
            ClassificationSource::Fallback(_) => "fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub batch_id: Uuid,
    pub source: ClassificationSource,
    pub records: Vec<ReceiptRecord>,
}

// ============================================================================
// CATEGORIZER
// ============================================================================

pub struct Categorizer {
    taxonomy: Arc<Taxonomy>,
    classifier: Option<Arc<dyn Classifier>>,
    normalizer: Normalizer,
    fallback: FallbackEngine,
    policy: CallPolicy,

    /// Advisory only: suppresses repeated missing-credential warnings
    missing_credential_warned: AtomicBool,
}

impl Categorizer {
    pub fn builder() -> CategorizerBuilder {
        CategorizerBuilder::default()
    }

    /// Assemble a categorizer from configuration. Fails only on a bad rules file.
    pub fn from_config(config: &CategorizerConfig) -> Result<Self> {
        let rules = match &config.rules_path {
            Some(path) => RuleEngine::from_file(path)?,
            None => RuleEngine::receipt_defaults(),
        };

        let mut builder = Categorizer::builder()
            .rules(rules)
            .matching(config.matching)
            .call_policy(config.call_policy.clone());
        if let Some(gemini) = config.gemini() {
            builder = builder.classifier(Arc::new(GeminiClient::new(gemini)));
        }
        Ok(builder.build())
    }

    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        &self.taxonomy
    }

    pub fn fallback(&self) -> &FallbackEngine {
        &self.fallback
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Categorize a batch, returning only the enriched records.
    pub async fn categorize(&self, records: Vec<ReceiptRecord>) -> Vec<ReceiptRecord> {
        self.categorize_batch(records).await.records
    }

    pub async fn categorize_batch(&self, records: Vec<ReceiptRecord>) -> BatchOutcome {
        let batch_id = Uuid::new_v4();

        if records.is_empty() {
            return BatchOutcome {
                batch_id,
                source: ClassificationSource::Empty,
                records,
            };
        }

        let Some(classifier) = &self.classifier else {
            if !self.missing_credential_warned.swap(true, Ordering::Relaxed) {
                warn!("classifier credential is not set; falling back to local category defaults");
            }
            return self.fallback_outcome(batch_id, &records, FallbackReason::MissingCredential);
        };

        let prompt = PromptBuilder::new(&self.taxonomy).build(&records);
        info!(
            %batch_id,
            records = records.len(),
            classifier = classifier.name(),
            prompt_fingerprint = %PromptBuilder::fingerprint(&prompt),
            "categorizing batch"
        );

        let body = match call_with_policy(classifier, &prompt, &self.policy).await {
            Ok(body) => body,
            Err(err) => {
                warn!(%batch_id, error = %err, "classifier call failed");
                return self.fallback_outcome(batch_id, &records, FallbackReason::ClassifierFailed(err.to_string()));
            }
        };

        let text = match extract_text(&body) {
            Ok(text) => text,
            Err(err) => {
                warn!(%batch_id, error = %err, "no text extracted from classifier response");
                return self.fallback_outcome(batch_id, &records, FallbackReason::InvalidResponse(err.to_string()));
            }
        };
        debug!(%batch_id, text = %preview(&text), "extracted classifier text");

        let results = match parse_results(&text, records.len()) {
            Ok(results) => results,
            Err(err) => {
                warn!(%batch_id, error = %err, raw = %preview(&text), "unusable classifier response");
                return self.fallback_outcome(batch_id, &records, FallbackReason::InvalidResponse(err.to_string()));
            }
        };

        let enriched = records
            .iter()
            .zip(results.iter())
            .map(|(record, result)| record.enriched(&self.normalizer.normalize(result)))
            .collect();

        BatchOutcome {
            batch_id,
            source: ClassificationSource::Classifier,
            records: enriched,
        }
    }

    fn fallback_outcome(&self, batch_id: Uuid, records: &[ReceiptRecord], reason: FallbackReason) -> BatchOutcome {
        info!(%batch_id, records = records.len(), %reason, "categorizing batch with local fallback");
        BatchOutcome {
            batch_id,
            records: self.fallback.apply_all(records),
            source: ClassificationSource::Fallback(reason),
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(LOG_PREVIEW_CHARS).collect()
}

// ============================================================================
// BUILDER
// ============================================================================

#[derive(Default)]
pub struct CategorizerBuilder {
    taxonomy: Option<Arc<Taxonomy>>,
    classifier: Option<Arc<dyn Classifier>>,
    rules: Option<RuleEngine>,
    matching: MatchingMode,
    policy: CallPolicy,
}

impl CategorizerBuilder {
    /// Defaults to [`Taxonomy::standard`]
    pub fn taxonomy(mut self, taxonomy: Arc<Taxonomy>) -> Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Defaults to [`RuleEngine::receipt_defaults`]
    pub fn rules(mut self, rules: RuleEngine) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn matching(mut self, matching: MatchingMode) -> Self {
        self.matching = matching;
        self
    }

    pub fn call_policy(mut self, policy: CallPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Categorizer {
        let taxonomy = self.taxonomy.unwrap_or_else(Taxonomy::standard);
        let rules = self.rules.unwrap_or_else(RuleEngine::receipt_defaults);

        Categorizer {
            normalizer: Normalizer::new(Arc::clone(&taxonomy), self.matching),
            fallback: FallbackEngine::new(Arc::clone(&taxonomy), rules, self.matching),
            taxonomy,
            classifier: self.classifier,
            policy: self.policy,
            missing_credential_warned: AtomicBool::new(false),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
