//! Category model
//!
//! Categories group articles and are keyed by a unique slug. The diagnostics
//! read them together with a derived article count.

use serde::{Deserialize, Serialize};

/// Category entity as stored by the newsdesk backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Display name
    pub name: String,
}

impl Category {
    pub fn new(id: i64, slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
            name: name.into(),
        }
    }
}

/// Category with the number of articles that reference it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    /// Number of articles whose category reference points here
    pub article_count: i64,
}

impl CategoryWithCount {
    pub fn new(category: Category, article_count: i64) -> Self {
        Self {
            category,
            article_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_new() {
        let category = Category::new(7, "technology", "Technology");

        assert_eq!(category.id, 7);
        assert_eq!(category.slug, "technology");
        assert_eq!(category.name, "Technology");
    }

    #[test]
    fn test_category_with_count_serializes_flat() {
        let entry = CategoryWithCount::new(Category::new(1, "sports", "Sports"), 4);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["slug"], "sports");
        assert_eq!(json["article_count"], 4);
        assert!(json.get("category").is_none());
    }
}
