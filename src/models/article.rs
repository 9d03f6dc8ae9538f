//! Article model
//!
//! This module provides:
//! - `Article` entity as read by the diagnostics
//! - `ArticleStatus` enum for publication states
//! - `ArticleWithCategory` pairing an article with its resolved category
//! - `ArticleStats` aggregate counts

use serde::{Deserialize, Serialize};

use super::Category;

/// Article entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Article title
    pub title: String,
    /// Free-text topic line
    pub topic: Option<String>,
    /// Category reference; `None` means the article is uncategorized
    pub category_id: Option<i64>,
    /// Publication status
    pub status: ArticleStatus,
}

/// Article publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    /// Draft - not visible to public
    #[default]
    Draft,
    /// Published - visible to public
    Published,
    /// Archived - hidden but not deleted
    Archived,
}

impl ArticleStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
            ArticleStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ArticleStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(ArticleStatus::Draft),
            "published" => Ok(ArticleStatus::Published),
            "archived" => Ok(ArticleStatus::Archived),
            _ => Err(anyhow::anyhow!("Invalid article status: {}", s)),
        }
    }
}

/// Article joined with the category its reference resolves to.
///
/// `category` is `None` both when the reference is null and when it points at
/// a row that no longer exists; compare with `article.category_id` to tell the
/// two apart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArticleWithCategory {
    #[serde(flatten)]
    pub article: Article,
    pub category: Option<Category>,
}

impl ArticleWithCategory {
    /// Reference set but no category row behind it
    pub fn is_dangling(&self) -> bool {
        self.article.category_id.is_some() && self.category.is_none()
    }
}

/// Aggregate article counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArticleStats {
    pub total: i64,
    pub with_category: i64,
    pub without_category: i64,
}

impl ArticleStats {
    /// Whether the two partitions add up to the total
    pub fn is_consistent(&self) -> bool {
        self.with_category + self.without_category == self.total
    }
}
