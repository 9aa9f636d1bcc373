// 🏷️ Taxonomy Registry - Fixed category/subcategory catalog
// Built once from declarative data, read-only afterwards.
//
// Every lookup used by the prompt, the normalizer and the fallback engine
// goes through this registry.

pub mod catalog;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

pub use catalog::{DEFAULT_CATEGORY_ID, DEFAULT_SUBCATEGORY_ID};

/// Separator between a subcategory's parent id and its slug.
pub const SUBCATEGORY_SEPARATOR: char = ':';

// ============================================================================
// DEFINITIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    /// Money coming in
    Income,

    /// Money going out
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryDefinition {
    /// Conventionally `<categoryId>:<slug>`
    pub id: String,
    pub parent_id: String,
    pub name: String,
    pub icon: String,
}

impl SubcategoryDefinition {
    /// Trailing part of the id after the separator (`groceries` for
    /// `foodAndDrinks:groceries`). Ids without a separator are their own slug.
    pub fn slug(&self) -> &str {
        self.id
            .rsplit(SUBCATEGORY_SEPARATOR)
            .next()
            .unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyError {
    #[error("duplicate category id '{0}'")]
    DuplicateCategory(String),

    #[error("duplicate subcategory id '{0}'")]
    DuplicateSubcategory(String),

    #[error("subcategory '{subcategory}' references unknown parent '{parent}'")]
    UnknownParent { subcategory: String, parent: String },

    #[error("default category '{0}' is not defined")]
    MissingDefaultCategory(String),

    #[error("default subcategory '{0}' is not defined")]
    MissingDefaultSubcategory(String),

    #[error("default subcategory '{subcategory}' belongs to '{parent}', not to the default category")]
    DefaultParentMismatch { subcategory: String, parent: String },
}

// ============================================================================
// REGISTRY
// ============================================================================

static STANDARD: Lazy<Arc<Taxonomy>> = Lazy::new(|| {
    let taxonomy = Taxonomy::from_definitions(
        catalog::standard_categories(),
        catalog::standard_subcategories(),
        DEFAULT_CATEGORY_ID,
        DEFAULT_SUBCATEGORY_ID,
    )
    .expect("standard catalog violates taxonomy invariants");
    Arc::new(taxonomy)
});

/// Immutable category catalog plus derived lookup indices.
#[derive(Debug)]
pub struct Taxonomy {
    categories: Vec<CategoryDefinition>,
    subcategories: Vec<SubcategoryDefinition>,

    category_by_id: HashMap<String, usize>,
    subcategory_by_id: HashMap<String, usize>,

    /// Subcategory positions per category, in declaration order
    children: HashMap<String, Vec<usize>>,

    /// Lowercased id or display name -> category id
    category_lookup: HashMap<String, String>,

    /// Lowercased id, display name or slug -> subcategory id
    subcategory_lookup: HashMap<String, String>,

    default_category_id: String,
    default_subcategory_id: String,
    reference_text: String,
}

impl Taxonomy {
    /// The process-wide catalog, built on first use.
    pub fn standard() -> Arc<Taxonomy> {
        Arc::clone(&STANDARD)
    }

    /// Build a registry from definitions, checking every invariant up front.
    pub fn from_definitions(
        categories: Vec<CategoryDefinition>,
        subcategories: Vec<SubcategoryDefinition>,
        default_category_id: &str,
        default_subcategory_id: &str,
    ) -> Result<Self, TaxonomyError> {
        let mut category_by_id = HashMap::new();
        let mut category_lookup = HashMap::new();
        let mut children: HashMap<String, Vec<usize>> = HashMap::new();

        for (pos, category) in categories.iter().enumerate() {
            if category_by_id.insert(category.id.clone(), pos).is_some() {
                return Err(TaxonomyError::DuplicateCategory(category.id.clone()));
            }
            category_lookup.insert(category.name.to_lowercase(), category.id.clone());
            category_lookup.insert(category.id.to_lowercase(), category.id.clone());
            children.insert(category.id.clone(), Vec::new());
        }

        let mut subcategory_by_id = HashMap::new();
        let mut subcategory_lookup = HashMap::new();

        for (pos, subcategory) in subcategories.iter().enumerate() {
            let Some(siblings) = children.get_mut(&subcategory.parent_id) else {
                return Err(TaxonomyError::UnknownParent {
                    subcategory: subcategory.id.clone(),
                    parent: subcategory.parent_id.clone(),
                });
            };
            if subcategory_by_id.insert(subcategory.id.clone(), pos).is_some() {
                return Err(TaxonomyError::DuplicateSubcategory(subcategory.id.clone()));
            }
            siblings.push(pos);

            // Later declarations win on collisions; callers check the parent.
            subcategory_lookup.insert(subcategory.name.to_lowercase(), subcategory.id.clone());
            subcategory_lookup.insert(subcategory.id.to_lowercase(), subcategory.id.clone());
            subcategory_lookup.insert(subcategory.slug().to_lowercase(), subcategory.id.clone());
        }

        if !category_by_id.contains_key(default_category_id) {
            return Err(TaxonomyError::MissingDefaultCategory(default_category_id.to_string()));
        }
        let Some(&default_pos) = subcategory_by_id.get(default_subcategory_id) else {
            return Err(TaxonomyError::MissingDefaultSubcategory(default_subcategory_id.to_string()));
        };
        let default_parent = &subcategories[default_pos].parent_id;
        if default_parent != default_category_id {
            return Err(TaxonomyError::DefaultParentMismatch {
                subcategory: default_subcategory_id.to_string(),
                parent: default_parent.clone(),
            });
        }

        let mut taxonomy = Taxonomy {
            categories,
            subcategories,
            category_by_id,
            subcategory_by_id,
            children,
            category_lookup,
            subcategory_lookup,
            default_category_id: default_category_id.to_string(),
            default_subcategory_id: default_subcategory_id.to_string(),
            reference_text: String::new(),
        };
        taxonomy.reference_text = taxonomy.render_reference();
        Ok(taxonomy)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn default_category_id(&self) -> &str {
        &self.default_category_id
    }

    pub fn default_subcategory_id(&self) -> &str {
        &self.default_subcategory_id
    }

    pub fn categories(&self) -> &[CategoryDefinition] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&CategoryDefinition> {
        self.category_by_id.get(id).map(|&pos| &self.categories[pos])
    }

    pub fn subcategory(&self, id: &str) -> Option<&SubcategoryDefinition> {
        self.subcategory_by_id.get(id).map(|&pos| &self.subcategories[pos])
    }

    pub fn subcategories_of<'a>(
        &'a self,
        category_id: &str,
    ) -> impl Iterator<Item = &'a SubcategoryDefinition> + 'a {
        self.children
            .get(category_id)
            .into_iter()
            .flatten()
            .map(move |&pos| &self.subcategories[pos])
    }

    pub fn is_valid_category(&self, id: &str) -> bool {
        self.category_by_id.contains_key(id)
    }

    /// Parent category id of a subcategory
    pub fn parent_of(&self, subcategory_id: &str) -> Option<&str> {
        self.subcategory(subcategory_id).map(|sub| sub.parent_id.as_str())
    }

    /// True when `subcategory_id` exists and belongs to `category_id`
    pub fn is_valid_pair(&self, category_id: &str, subcategory_id: &str) -> bool {
        self.parent_of(subcategory_id) == Some(category_id)
    }

    pub fn subcategory_name(&self, subcategory_id: &str) -> Option<&str> {
        self.subcategory(subcategory_id).map(|sub| sub.name.as_str())
    }

    /// First subcategory declared for the category
    pub fn primary_subcategory_of(&self, category_id: &str) -> Option<&str> {
        self.subcategories_of(category_id)
            .next()
            .map(|sub| sub.id.as_str())
    }

    // ========================================================================
    // FUZZY LOOKUPS
    // ========================================================================

    /// Case-insensitive match against category id or display name.
    pub fn resolve_category(&self, text: &str) -> Option<&str> {
        let key = text.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        self.category_lookup.get(&key).map(String::as_str)
    }

    /// Case-insensitive match against subcategory id, display name or slug.
    ///
    /// Names and slugs are not unique across categories ("Child Support",
    /// "gifts"); the index keeps the last declaration, so callers that care
    /// about the parent should prefer [`Taxonomy::resolve_subcategory_within`].
    pub fn resolve_subcategory(&self, text: &str) -> Option<&str> {
        let key = text.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        self.subcategory_lookup.get(&key).map(String::as_str)
    }

    /// Like [`Taxonomy::resolve_subcategory`] but only considers children of
    /// `category_id`, so shared names resolve to the right sibling.
    pub fn resolve_subcategory_within(&self, category_id: &str, text: &str) -> Option<&str> {
        let key = text.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        self.subcategories_of(category_id)
            .find(|sub| {
                sub.id.to_lowercase() == key
                    || sub.name.to_lowercase() == key
                    || sub.slug().to_lowercase() == key
            })
            .map(|sub| sub.id.as_str())
            .or_else(|| {
                self.resolve_subcategory(&key)
                    .filter(|id| self.is_valid_pair(category_id, id))
            })
    }

    // ========================================================================
    // REFERENCE TEXT
    // ========================================================================

    /// Stable rendering of the whole catalog for classifier prompts.
    pub fn reference_text(&self) -> &str {
        &self.reference_text
    }

    fn render_reference(&self) -> String {
        let groups: Vec<String> = self
            .categories
            .iter()
            .map(|category| {
                let lines: Vec<String> = self
                    .subcategories_of(&category.id)
                    .map(|sub| format!("    - {} -> {}", sub.id, sub.name))
                    .collect();
                let body = if lines.is_empty() {
                    "    - none".to_string()
                } else {
                    lines.join("\n")
                };
                format!("- {} -> {}\n{}", category.id, category.name, body)
            })
            .collect();

        format!(
            "Valid categories and subcategories (use the exact ids):\n{}\nIf nothing fits, use {} with subcategory {}.",
            groups.join("\n"),
            self.default_category_id,
            self.default_subcategory_id
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, name: &str) -> CategoryDefinition {
        CategoryDefinition {
            id: id.to_string(),
            name: name.to_string(),
            color: "#000000".to_string(),
            icon: "dot".to_string(),
            category_type: CategoryType::Expense,
        }
    }

    fn subcategory(id: &str, parent: &str, name: &str) -> SubcategoryDefinition {
        SubcategoryDefinition {
            id: id.to_string(),
            parent_id: parent.to_string(),
            name: name.to_string(),
            icon: "dot".to_string(),
        }
    }

    #[test]
    fn test_standard_catalog_is_consistent() {
        let taxonomy = Taxonomy::standard();

        assert_eq!(taxonomy.categories().len(), 11);
        assert!(taxonomy.is_valid_category(DEFAULT_CATEGORY_ID));
        assert!(taxonomy.is_valid_pair(DEFAULT_CATEGORY_ID, DEFAULT_SUBCATEGORY_ID));

        for category in taxonomy.categories() {
            for sub in taxonomy.subcategories_of(&category.id) {
                assert_eq!(sub.parent_id, category.id);
                assert!(sub.id.starts_with(&format!("{}:", category.id)));
            }
        }
        assert_eq!(taxonomy.category("income").map(|c| c.category_type), Some(CategoryType::Income));
    }

    #[test]
    fn test_resolve_category_by_name_or_id() {
        let taxonomy = Taxonomy::standard();

        assert_eq!(taxonomy.resolve_category("foodAndDrinks"), Some("foodAndDrinks"));
        assert_eq!(taxonomy.resolve_category("FOODANDDRINKS"), Some("foodAndDrinks"));
        assert_eq!(taxonomy.resolve_category("food & drinks"), Some("foodAndDrinks"));
        assert_eq!(taxonomy.resolve_category("  Shopping "), Some("shopping"));
        assert_eq!(taxonomy.resolve_category("Groceries"), None);
        assert_eq!(taxonomy.resolve_category(""), None);
    }

    #[test]
    fn test_resolve_subcategory_by_name_id_or_slug() {
        let taxonomy = Taxonomy::standard();

        assert_eq!(taxonomy.resolve_subcategory("Groceries"), Some("foodAndDrinks:groceries"));
        assert_eq!(taxonomy.resolve_subcategory("groceries"), Some("foodAndDrinks:groceries"));
        assert_eq!(
            taxonomy.resolve_subcategory("FOODANDDRINKS:GROCERIES"),
            Some("foodAndDrinks:groceries")
        );
        assert_eq!(
            taxonomy.resolve_subcategory("electronics-accessories"),
            Some("shopping:electronics-accessories")
        );
        assert_eq!(taxonomy.resolve_subcategory("no such thing"), None);
    }

    #[test]
    fn test_resolve_within_prefers_sibling_on_shared_names() {
        let taxonomy = Taxonomy::standard();

        // "Child Support" exists under both financialExpenses and income
        assert_eq!(
            taxonomy.resolve_subcategory_within("financialExpenses", "Child Support"),
            Some("financialExpenses:child-support")
        );
        assert_eq!(
            taxonomy.resolve_subcategory_within("income", "child-support"),
            Some("income:child-support")
        );
        assert_eq!(taxonomy.resolve_subcategory_within("housing", "Groceries"), None);
    }

    #[test]
    fn test_primary_subcategory_is_first_declared() {
        let taxonomy = Taxonomy::standard();

        assert_eq!(taxonomy.primary_subcategory_of("foodAndDrinks"), Some("foodAndDrinks:bar-cafe"));
        assert_eq!(taxonomy.primary_subcategory_of("others"), Some("others:missing"));
        assert_eq!(taxonomy.primary_subcategory_of("unknown"), None);
    }

    #[test]
    fn test_reference_text_is_stable() {
        let first = Taxonomy::standard();
        let second = Taxonomy::from_definitions(
            catalog::standard_categories(),
            catalog::standard_subcategories(),
            DEFAULT_CATEGORY_ID,
            DEFAULT_SUBCATEGORY_ID,
        )
        .unwrap();

        assert_eq!(first.reference_text(), second.reference_text());

        let text = first.reference_text();
        assert!(text.starts_with("Valid categories and subcategories (use the exact ids):\n- foodAndDrinks -> Food & Drinks\n    - foodAndDrinks:bar-cafe -> Bar, Cafe"));
        assert!(text.ends_with("If nothing fits, use others with subcategory others:missing."));
    }

    #[test]
    fn test_reference_text_marks_empty_categories() {
        let taxonomy = Taxonomy::from_definitions(
            vec![category("others", "Others"), category("empty", "Empty")],
            vec![subcategory("others:missing", "others", "Missing")],
            "others",
            "others:missing",
        )
        .unwrap();

        assert!(taxonomy.reference_text().contains("- empty -> Empty\n    - none"));
        assert_eq!(taxonomy.primary_subcategory_of("empty"), None);
    }

    #[test]
    fn test_invariant_violations_are_rejected() {
        let unknown_parent = Taxonomy::from_definitions(
            vec![category("others", "Others")],
            vec![
                subcategory("others:missing", "others", "Missing"),
                subcategory("ghost:thing", "ghost", "Thing"),
            ],
            "others",
            "others:missing",
        );
        assert!(matches!(unknown_parent, Err(TaxonomyError::UnknownParent { .. })));

        let missing_default = Taxonomy::from_definitions(
            vec![category("others", "Others")],
            vec![subcategory("others:missing", "others", "Missing")],
            "fallback",
            "others:missing",
        );
        assert_eq!(
            missing_default.unwrap_err(),
            TaxonomyError::MissingDefaultCategory("fallback".to_string())
        );

        let wrong_parent = Taxonomy::from_definitions(
            vec![category("others", "Others"), category("misc", "Misc")],
            vec![
                subcategory("others:missing", "others", "Missing"),
                subcategory("misc:other", "misc", "Other"),
            ],
            "others",
            "misc:other",
        );
        assert!(matches!(wrong_parent, Err(TaxonomyError::DefaultParentMismatch { .. })));

        let duplicate = Taxonomy::from_definitions(
            vec![category("others", "Others"), category("others", "Again")],
            vec![subcategory("others:missing", "others", "Missing")],
            "others",
            "others:missing",
        );
        assert!(matches!(duplicate, Err(TaxonomyError::DuplicateCategory(_))));

        let duplicate_subcategory = Taxonomy::from_definitions(
            vec![category("others", "Others")],
            vec![
                subcategory("others:missing", "others", "Missing"),
                subcategory("others:missing", "others", "Missing Again"),
            ],
            "others",
            "others:missing",
        );
        assert_eq!(
            duplicate_subcategory.unwrap_err(),
            TaxonomyError::DuplicateSubcategory("others:missing".to_string())
        );

        let missing_default_subcategory = Taxonomy::from_definitions(
            vec![category("others", "Others")],
            vec![subcategory("others:other", "others", "Other")],
            "others",
            "others:missing",
        );
        assert_eq!(
            missing_default_subcategory.unwrap_err(),
            TaxonomyError::MissingDefaultSubcategory("others:missing".to_string())
        );
    }
}
