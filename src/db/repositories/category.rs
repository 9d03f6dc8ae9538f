//! Category repository
//!
//! This module provides:
//! - `CategoryRepository` trait defining read access to categories
//! - `SqlxCategoryRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Category, CategoryWithCount};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use super::{mysql_pool, sqlite_pool};

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// List every category with the number of articles referencing it,
    /// ordered by slug
    async fn list_with_article_counts(&self) -> Result<Vec<CategoryWithCount>>;
}

/// SQLx-based category repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn list_with_article_counts(&self) -> Result<Vec<CategoryWithCount>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_with_article_counts_sqlite(sqlite_pool(&self.pool)?).await
            }
            DatabaseDriver::Mysql => list_with_article_counts_mysql(mysql_pool(&self.pool)?).await,
        }
    }
}

const LIST_WITH_COUNTS_SQL: &str = r#"
    SELECT c.id, c.slug, c.name, COUNT(a.id) AS article_count
    FROM categories c
    LEFT JOIN articles a ON a.category_id = c.id
    GROUP BY c.id, c.slug, c.name
    ORDER BY c.slug
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn list_with_article_counts_sqlite(pool: &SqlitePool) -> Result<Vec<CategoryWithCount>> {
    let rows = sqlx::query(LIST_WITH_COUNTS_SQL)
        .fetch_all(pool)
        .await
        .context("Failed to list categories with article counts")?;

    Ok(rows
        .iter()
        .map(|row| {
            CategoryWithCount::new(
                Category {
                    id: row.get("id"),
                    slug: row.get("slug"),
                    name: row.get("name"),
                },
                row.get("article_count"),
            )
        })
        .collect())
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn list_with_article_counts_mysql(pool: &MySqlPool) -> Result<Vec<CategoryWithCount>> {
    let rows = sqlx::query(LIST_WITH_COUNTS_SQL)
        .fetch_all(pool)
        .await
        .context("Failed to list categories with article counts")?;

    Ok(rows
        .iter()
        .map(|row| {
            CategoryWithCount::new(
                Category {
                    id: row.get("id"),
                    slug: row.get("slug"),
                    name: row.get("name"),
                },
                row.get("article_count"),
            )
        })
        .collect())
}
