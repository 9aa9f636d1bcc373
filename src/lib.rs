// Receipt Categorizer - Core Library
// Assigns taxonomy categories to receipt line records, using a generative-text
// classifier when available and local heuristics otherwise.

pub mod taxonomy;
pub mod record;
pub mod prompt;
pub mod classifier;
pub mod validator;
pub mod normalizer;
pub mod rules;
pub mod fallback;
pub mod pipeline;
pub mod config;
pub mod input;

// Re-export commonly used types
pub use taxonomy::{
    CategoryDefinition, CategoryType, SubcategoryDefinition, Taxonomy, TaxonomyError,
    DEFAULT_CATEGORY_ID, DEFAULT_SUBCATEGORY_ID,
};
pub use record::{Enrichment, ReceiptRecord, UNKNOWN_SUBCATEGORY_NAME};
pub use prompt::{PromptBuilder, PromptRecord};
pub use classifier::{
    call_with_policy, CallPolicy, Classifier, ClassifierError, GeminiClient, GeminiConfig,
};
pub use validator::{ClassificationResult, ResponseError};
pub use normalizer::{MatchingMode, Normalizer};
pub use rules::{KeywordRule, RuleEngine, RuleMatch};
pub use fallback::{FallbackEngine, FallbackReason};
pub use pipeline::{BatchOutcome, Categorizer, CategorizerBuilder, ClassificationSource};
pub use config::CategorizerConfig;
pub use input::{load_records, records_from_value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the `tracing` subscriber used by the binaries (`RUST_LOG`, default `info`).
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
