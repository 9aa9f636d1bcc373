// 🏷️ Keyword Rules - Rules as Data
// Ordered keyword sets mapped to a category/subcategory pair.

use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::taxonomy::Taxonomy;

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRule {
    /// Rule ID for tracking
    pub id: String,

    /// Any keyword found as a substring of the record text triggers the rule
    pub keywords: Vec<String>,

    pub category_id: String,

    pub subcategory_id: String,

    /// Priority (higher = applied first, ties keep declaration order)
    #[serde(default)]
    pub priority: i32,
}

impl KeywordRule {
    pub fn new(id: &str, keywords: &[&str], category_id: &str, subcategory_id: &str) -> Self {
        KeywordRule {
            id: id.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            category_id: category_id.to_string(),
            subcategory_id: subcategory_id.to_string(),
            priority: 0,
        }
    }

    /// `text` must already be lowercased.
    pub fn matches(&self, text: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| !keyword.is_empty() && text.contains(keyword.as_str()))
    }
}

// ============================================================================
// RULE MATCH
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub rule_id: String,
    pub category_id: String,
    pub subcategory_id: String,
}

// ============================================================================
// RULE ENGINE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: Vec<KeywordRule>,
}

impl RuleEngine {
    /// Create a new empty rule engine
    pub fn new() -> Self {
        RuleEngine { rules: Vec::new() }
    }

    /// Built-in heuristics for common receipt items. Overlapping keywords
    /// ("soap") resolve to the earlier rule.
    pub fn receipt_defaults() -> Self {
        RuleEngine::from_rules(vec![
            KeywordRule::new(
                "electronics",
                &["charger", "usb", "cable", "wall charger"],
                "shopping",
                "shopping:electronics-accessories",
            ),
            KeywordRule::new(
                "dental-care",
                &["toothpaste", "tooth brush", "toothbrush", "tooth"],
                "shopping",
                "shopping:drug-store-chemist",
            ),
            KeywordRule::new(
                "personal-care",
                &["lotion", "soap", "shampoo", "body lotion", "bath"],
                "shopping",
                "shopping:health-beauty",
            ),
            KeywordRule::new(
                "cookware",
                &["pan", "saute", "skillet", "bake", "cook"],
                "shopping",
                "shopping:home-green",
            ),
            KeywordRule::new(
                "tableware",
                &["plate", "spoon", "fork", "utensil", "spoons"],
                "shopping",
                "shopping:home-green",
            ),
            KeywordRule::new(
                "paper-goods",
                &["paper towel", "paper towels", "towel"],
                "shopping",
                "shopping:home-green",
            ),
            KeywordRule::new(
                "cleaning",
                &["detergent", "dishwashing", "vim", "soap"],
                "shopping",
                "shopping:home-green",
            ),
        ])
    }

    /// Load rules from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read rules file: {:?}", path.as_ref()))?;

        let rules: Vec<KeywordRule> = serde_json::from_str(&content)
            .context("Failed to parse keyword rules JSON")?;

        Ok(RuleEngine::from_rules(rules))
    }

    /// Create engine from a list of rules
    pub fn from_rules(rules: Vec<KeywordRule>) -> Self {
        let mut rules: Vec<KeywordRule> = rules
            .into_iter()
            .map(|mut rule| {
                rule.keywords = rule.keywords.iter().map(|k| k.to_lowercase()).collect();
                rule
            })
            .collect();
        // Stable sort: equal priorities keep their order
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        RuleEngine { rules }
    }

    /// Drop rules that do not name a valid category/subcategory pair.
    pub fn retain_valid(mut self, taxonomy: &Taxonomy) -> Self {
        self.rules.retain(|rule| {
            let valid = taxonomy.is_valid_pair(&rule.category_id, &rule.subcategory_id);
            if !valid {
                warn!(
                    rule = %rule.id,
                    category = %rule.category_id,
                    subcategory = %rule.subcategory_id,
                    "dropping keyword rule with invalid taxonomy pair"
                );
            }
            valid
        });
        self
    }

    /// First matching rule for already-lowercased text
    pub fn classify(&self, text: &str) -> Option<RuleMatch> {
        self.rules
            .iter()
            .find(|rule| rule.matches(text))
            .map(|rule| RuleMatch {
                rule_id: rule.id.clone(),
                category_id: rule.category_id.clone(),
                subcategory_id: rule.subcategory_id.clone(),
            })
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// Get number of rules loaded
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

// ============================================================================
// TESTS
// ============================================================================
