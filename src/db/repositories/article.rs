//! Article repository
//!
//! Read access to articles for the category diagnostics:
//! - uncategorized articles
//! - aggregate counts split by category presence
//! - a small sample joined with the category each reference resolves to

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Article, ArticleStats, ArticleStatus, ArticleWithCategory, Category};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use super::{mysql_pool, sqlite_pool};

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Articles whose category reference is null, oldest first
    async fn list_uncategorized(&self) -> Result<Vec<Article>>;

    /// Total, categorized and uncategorized counts taken in one query
    async fn stats(&self) -> Result<ArticleStats>;

    /// First `limit` articles by id, each with its resolved category
    async fn sample_with_category(&self, limit: i64) -> Result<Vec<ArticleWithCategory>>;
}

/// SQLx-based article repository implementation
pub struct SqlxArticleRepository {
    pool: DynDatabasePool,
}

impl SqlxArticleRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn list_uncategorized(&self) -> Result<Vec<Article>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_uncategorized_sqlite(sqlite_pool(&self.pool)?).await,
            DatabaseDriver::Mysql => list_uncategorized_mysql(mysql_pool(&self.pool)?).await,
        }
    }

    async fn stats(&self) -> Result<ArticleStats> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => stats_sqlite(sqlite_pool(&self.pool)?).await,
            DatabaseDriver::Mysql => stats_mysql(mysql_pool(&self.pool)?).await,
        }
    }

    async fn sample_with_category(&self, limit: i64) -> Result<Vec<ArticleWithCategory>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sample_with_category_sqlite(sqlite_pool(&self.pool)?, limit).await
            }
            DatabaseDriver::Mysql => {
                sample_with_category_mysql(mysql_pool(&self.pool)?, limit).await
            }
        }
    }
}

const UNCATEGORIZED_SQL: &str = r#"
    SELECT id, slug, title, topic, category_id, status
    FROM articles
    WHERE category_id IS NULL
    ORDER BY id
"#;

const STATS_SQL: &str = r#"
    SELECT COUNT(*) AS total, COUNT(category_id) AS with_category
    FROM articles
"#;

const SAMPLE_SQL: &str = r#"
    SELECT a.id, a.slug, a.title, a.topic, a.category_id, a.status,
           c.id AS resolved_id, c.slug AS resolved_slug, c.name AS resolved_name
    FROM articles a
    LEFT JOIN categories c ON c.id = a.category_id
    ORDER BY a.id
    LIMIT ?
"#;

fn parse_status(raw: &str) -> Result<ArticleStatus> {
    raw.parse()
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn list_uncategorized_sqlite(pool: &SqlitePool) -> Result<Vec<Article>> {
    let rows = sqlx::query(UNCATEGORIZED_SQL)
        .fetch_all(pool)
        .await
        .context("Failed to list uncategorized articles")?;

    rows.iter().map(row_to_article_sqlite).collect()
}

async fn stats_sqlite(pool: &SqlitePool) -> Result<ArticleStats> {
    let row = sqlx::query(STATS_SQL)
        .fetch_one(pool)
        .await
        .context("Failed to count articles")?;

    let total: i64 = row.get("total");
    let with_category: i64 = row.get("with_category");
    Ok(ArticleStats {
        total,
        with_category,
        without_category: total - with_category,
    })
}

async fn sample_with_category_sqlite(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<ArticleWithCategory>> {
    let rows = sqlx::query(SAMPLE_SQL)
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("Failed to sample articles")?;

    let mut sample = Vec::with_capacity(rows.len());
    for row in &rows {
        let resolved_id: Option<i64> = row.get("resolved_id");
        let category = match resolved_id {
            Some(id) => Some(Category {
                id,
                slug: row.get("resolved_slug"),
                name: row.get("resolved_name"),
            }),
            None => None,
        };
        sample.push(ArticleWithCategory {
            article: row_to_article_sqlite(row)?,
            category,
        });
    }

    Ok(sample)
}

fn row_to_article_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Article> {
    let status: String = row.get("status");
    Ok(Article {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        topic: row.get("topic"),
        category_id: row.get("category_id"),
        status: parse_status(&status)?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn list_uncategorized_mysql(pool: &MySqlPool) -> Result<Vec<Article>> {
    let rows = sqlx::query(UNCATEGORIZED_SQL)
        .fetch_all(pool)
        .await
        .context("Failed to list uncategorized articles")?;

    rows.iter().map(row_to_article_mysql).collect()
}

async fn stats_mysql(pool: &MySqlPool) -> Result<ArticleStats> {
    let row = sqlx::query(STATS_SQL)
        .fetch_one(pool)
        .await
        .context("Failed to count articles")?;

    let total: i64 = row.get("total");
    let with_category: i64 = row.get("with_category");
    Ok(ArticleStats {
        total,
        with_category,
        without_category: total - with_category,
    })
}

async fn sample_with_category_mysql(
    pool: &MySqlPool,
    limit: i64,
) -> Result<Vec<ArticleWithCategory>> {
    let rows = sqlx::query(SAMPLE_SQL)
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("Failed to sample articles")?;

    let mut sample = Vec::with_capacity(rows.len());
    for row in &rows {
        let resolved_id: Option<i64> = row.get("resolved_id");
        let category = match resolved_id {
            Some(id) => Some(Category {
                id,
                slug: row.get("resolved_slug"),
                name: row.get("resolved_name"),
            }),
            None => None,
        };
        sample.push(ArticleWithCategory {
            article: row_to_article_mysql(row)?,
            category,
        });
    }

    Ok(sample)
}

fn row_to_article_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Article> {
    let status: String = row.get("status");
    Ok(Article {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        topic: row.get("topic"),
        category_id: row.get("category_id"),
        status: parse_status(&status)?,
    })
}
