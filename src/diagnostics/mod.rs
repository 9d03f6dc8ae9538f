//! Category diagnostics
//!
//! Compares the categories stored in the database with the static navigation
//! configuration and reports on article categorization:
//!
//! 1. categories with their article counts
//! 2. slugs missing from the database / not present in the navigation
//! 3. articles with a null category reference
//! 4. total / categorized / uncategorized counts
//! 5. a small sample of articles with their resolved category
//!
//! Every step is a read. The report is written as it is produced so a failure
//! part-way through still leaves the earlier sections on screen.

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;

use crate::db::repositories::{
    ArticleRepository, CategoryRepository, SqlxArticleRepository, SqlxCategoryRepository,
};
use crate::db::DynDatabasePool;
use crate::models::{Article, ArticleStats, ArticleWithCategory, CategoryWithCount};
use crate::navigation;

/// Number of articles shown in the sample section
pub const SAMPLE_SIZE: i64 = 3;

/// Shown in place of a missing topic
pub const TOPIC_PLACEHOLDER: &str = "N/A";

/// Shown in place of a missing category reference or category row
pub const NULL_MARKER: &str = "null";

/// Result of comparing database slugs with navigation keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlugComparison {
    /// In the navigation config but not in the database, sorted
    pub missing: Vec<String>,
    /// In the database but not in the navigation config, sorted
    pub extra: Vec<String>,
}

impl SlugComparison {
    /// `missing` = config − database, `extra` = database − config
    pub fn compare<'a, D, C>(database: D, config: C) -> Self
    where
        D: IntoIterator<Item = &'a str>,
        C: IntoIterator<Item = &'a str>,
    {
        let database: BTreeSet<&str> = database.into_iter().collect();
        let config: BTreeSet<&str> = config.into_iter().collect();

        Self {
            missing: config
                .difference(&database)
                .map(|s| s.to_string())
                .collect(),
            extra: database
                .difference(&config)
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Both sides hold exactly the same slugs
    pub fn is_match(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Everything a diagnostic run observed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticReport {
    pub categories: Vec<CategoryWithCount>,
    pub comparison: SlugComparison,
    pub uncategorized: Vec<Article>,
    pub stats: ArticleStats,
    pub sample: Vec<ArticleWithCategory>,
}

/// Category consistency checker
pub struct CategoryDoctor {
    categories: Arc<dyn CategoryRepository>,
    articles: Arc<dyn ArticleRepository>,
    nav_keys: Vec<String>,
}

impl CategoryDoctor {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        articles: Arc<dyn ArticleRepository>,
        nav_keys: Vec<String>,
    ) -> Self {
        Self {
            categories,
            articles,
            nav_keys,
        }
    }

    /// Doctor over the SQLx repositories and the built-in navigation config
    pub fn from_pool(pool: DynDatabasePool) -> Self {
        Self::new(
            SqlxCategoryRepository::boxed(pool.clone()),
            SqlxArticleRepository::boxed(pool),
            navigation::category_keys(),
        )
    }

    /// Run every check in order, writing the report to `out`.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<DiagnosticReport> {
        let mut report = DiagnosticReport::default();

        writeln!(out, "🔍 Checking categories in database...")?;
        report.categories = self.categories.list_with_article_counts().await?;
        tracing::debug!(count = report.categories.len(), "Loaded categories");
        write_categories(out, &report.categories)?;

        writeln!(
            out,
            "\n🧭 Comparing with navigation config ({} categories)...",
            self.nav_keys.len()
        )?;
        report.comparison = SlugComparison::compare(
            report.categories.iter().map(|c| c.category.slug.as_str()),
            self.nav_keys.iter().map(String::as_str),
        );
        write_comparison(out, &report.comparison)?;

        writeln!(out, "\n📰 Checking articles without a category...")?;
        report.uncategorized = self.articles.list_uncategorized().await?;
        write_uncategorized(out, &report.uncategorized)?;

        report.stats = self.articles.stats().await?;
        write_stats(out, &report.stats)?;

        report.sample = self.articles.sample_with_category(SAMPLE_SIZE).await?;
        write_sample(out, &report.sample)?;

        writeln!(out, "\n✅ Diagnosis complete")?;
        Ok(report)
    }
}

/// Run the doctor against `pool`, then close the pool whatever the outcome.
///
/// A failure is logged and written to `out`; it is never retried or returned.
pub async fn run_and_close<W: Write>(
    pool: DynDatabasePool,
    out: &mut W,
) -> Option<DiagnosticReport> {
    let doctor = CategoryDoctor::from_pool(pool.clone());
    let outcome = doctor.run(out).await;

    pool.close().await;
    tracing::info!("Database connection closed");

    match outcome {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::error!("Category diagnosis failed: {:#}", e);
            let _ = writeln!(out, "\n❌ Diagnosis failed: {:#}", e);
            None
        }
    }
}

fn write_categories<W: Write>(
    out: &mut W,
    categories: &[CategoryWithCount],
) -> std::io::Result<()> {
    if categories.is_empty() {
        writeln!(out, "⚠️  No categories found in database!")?;
        writeln!(
            out,
            "💡 Seed the default categories with the backend's seed command, then run this check again."
        )?;
        return Ok(());
    }

    writeln!(out, "📁 Found {} categories in database:", categories.len())?;
    for entry in categories {
        writeln!(
            out,
            "   - {} ({}): {} {}",
            entry.category.slug,
            entry.category.name,
            entry.article_count,
            if entry.article_count == 1 { "article" } else { "articles" }
        )?;
    }
    Ok(())
}

fn write_comparison<W: Write>(out: &mut W, comparison: &SlugComparison) -> std::io::Result<()> {
    if comparison.is_match() {
        writeln!(out, "✅ Database categories match the navigation config exactly")?;
        return Ok(());
    }

    if !comparison.missing.is_empty() {
        writeln!(out, "❌ Missing in database (defined in navigation config):")?;
        for slug in &comparison.missing {
            match navigation::lookup(slug) {
                Some(nav) => writeln!(out, "   - {} → {} ({})", slug, nav.label, nav.href)?,
                None => writeln!(out, "   - {}", slug)?,
            }
        }
    }

    if !comparison.extra.is_empty() {
        writeln!(out, "⚠️  Extra in database (not in navigation config):")?;
        for slug in &comparison.extra {
            writeln!(out, "   - {}", slug)?;
        }
    }
    Ok(())
}

fn write_uncategorized<W: Write>(out: &mut W, articles: &[Article]) -> std::io::Result<()> {
    if articles.is_empty() {
        writeln!(out, "✅ Every article has a category")?;
        return Ok(());
    }

    writeln!(out, "⚠️  Found {} articles without a category:", articles.len())?;
    for article in articles {
        writeln!(
            out,
            "   - \"{}\" ({}) | topic: {}",
            article.title,
            article.slug,
            article.topic.as_deref().unwrap_or(TOPIC_PLACEHOLDER)
        )?;
    }
    Ok(())
}

fn write_stats<W: Write>(out: &mut W, stats: &ArticleStats) -> std::io::Result<()> {
    writeln!(out, "\n📊 Article statistics:")?;
    writeln!(out, "   Total articles:   {}", stats.total)?;
    writeln!(out, "   With category:    {}", stats.with_category)?;
    writeln!(out, "   Without category: {}", stats.without_category)?;
    if !stats.is_consistent() {
        writeln!(
            out,
            "⚠️  Counts disagree: {} + {} != {}",
            stats.with_category, stats.without_category, stats.total
        )?;
    }
    Ok(())
}

fn write_sample<W: Write>(out: &mut W, sample: &[ArticleWithCategory]) -> std::io::Result<()> {
    writeln!(out, "\n🔬 Sample articles with their category:")?;
    if sample.is_empty() {
        return writeln!(out, "   (no articles)");
    }

    for (index, entry) in sample.iter().enumerate() {
        let reference = entry
            .article
            .category_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| NULL_MARKER.to_string());
        let resolved = match &entry.category {
            Some(c) => format!("{} ({})", c.slug, c.name),
            None if entry.is_dangling() => format!("{} (no such category)", NULL_MARKER),
            None => NULL_MARKER.to_string(),
        };

        writeln!(out, "   {}. \"{}\"", index + 1, entry.article.title)?;
        writeln!(out, "      categoryId: {}", reference)?;
        writeln!(out, "      category:   {}", resolved)?;
        writeln!(
            out,
            "      topic:      {}",
            entry.article.topic.as_deref().unwrap_or(TOPIC_PLACEHOLDER)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{
        dangle_article, insert_article, insert_category, migrated_pool,
    };
    use crate::db::create_test_pool;
    use crate::models::{ArticleStatus, Category};
    use async_trait::async_trait;

    fn keys(slugs: &[&str]) -> Vec<String> {
        slugs.iter().map(|s| s.to_string()).collect()
    }

    fn doctor_for(pool: DynDatabasePool, nav: &[&str]) -> CategoryDoctor {
        CategoryDoctor::new(
            SqlxCategoryRepository::boxed(pool.clone()),
            SqlxArticleRepository::boxed(pool),
            keys(nav),
        )
    }

    async fn run_to_string(doctor: &CategoryDoctor) -> (Result<DiagnosticReport>, String) {
        let mut out = Vec::new();
        let result = doctor.run(&mut out).await;
        (result, String::from_utf8(out).expect("report is UTF-8"))
    }

    #[test]
    fn test_compare_reports_missing_only() {
        let comparison = SlugComparison::compare(["tech"], ["tech", "sports"]);

        assert_eq!(comparison.missing, keys(&["sports"]));
        assert!(comparison.extra.is_empty());
        assert!(!comparison.is_match());
    }

    #[test]
    fn test_compare_reports_both_sides() {
        let comparison = SlugComparison::compare(["weather", "tech"], ["tech", "sports", "world"]);

        assert_eq!(comparison.missing, keys(&["sports", "world"]));
        assert_eq!(comparison.extra, keys(&["weather"]));
    }

    #[test]
    fn test_compare_empty_database() {
        let comparison = SlugComparison::compare(Vec::<&str>::new(), ["b", "a"]);

        assert_eq!(comparison.missing, keys(&["a", "b"]));
        assert!(comparison.extra.is_empty());
        assert!(!comparison.is_match());
    }

    #[test]
    fn test_compare_match_ignores_order_and_duplicates() {
        let comparison = SlugComparison::compare(["b", "a", "a"], ["a", "b"]);

        assert!(comparison.is_match());
    }

    #[tokio::test]
    async fn test_empty_database_suggests_seeding() {
        let pool = migrated_pool().await;
        let doctor = doctor_for(pool, &["tech", "sports"]);

        let (result, output) = run_to_string(&doctor).await;
        let report = result.expect("run should succeed");

        assert!(output.contains("No categories found in database!"));
        assert!(output.contains("Seed the default categories"));
        assert!(output.contains("Missing in database"));
        assert!(!output.contains("match the navigation config exactly"));
        assert_eq!(report.comparison.missing, keys(&["sports", "tech"]));
        assert_eq!(report.stats, ArticleStats::default());
        assert!(output.contains("(no articles)"));
    }

    #[tokio::test]
    async fn test_tech_present_sports_missing() {
        let pool = migrated_pool().await;
        let tech = insert_category(&pool, "tech", "Tech").await;
        for i in 0..5 {
            insert_article(&pool, &format!("story-{}", i), "Story", None, Some(tech)).await;
        }
        let doctor = doctor_for(pool, &["tech", "sports"]);

        let (result, output) = run_to_string(&doctor).await;
        let report = result.unwrap();

        assert!(output.contains("   - tech (Tech): 5 articles"));
        assert_eq!(report.comparison.missing, keys(&["sports"]));
        assert!(report.comparison.extra.is_empty());
        assert!(output.contains("   - sports → Sports (/category/sports)"));
        assert!(!output.contains("Extra in database"));
    }

    #[tokio::test]
    async fn test_perfect_match_hides_lists() {
        let pool = migrated_pool().await;
        insert_category(&pool, "world", "World").await;
        insert_category(&pool, "opinion", "Opinion").await;
        let doctor = doctor_for(pool, &["opinion", "world"]);

        let (result, output) = run_to_string(&doctor).await;

        assert!(result.unwrap().comparison.is_match());
        assert!(output.contains("match the navigation config exactly"));
        assert!(!output.contains("Missing in database"));
        assert!(!output.contains("Extra in database"));
    }

    #[tokio::test]
    async fn test_uncategorized_articles_and_sample() {
        let pool = migrated_pool().await;
        let sports = insert_category(&pool, "sports", "Sports").await;
        insert_article(&pool, "derby", "Derby day", Some("football"), Some(sports)).await;
        insert_article(&pool, "lost", "Lost story", None, None).await;
        insert_article(&pool, "tagged", "Tagged story", Some("elections"), None).await;
        insert_article(&pool, "fourth", "Fourth", None, Some(sports)).await;
        let doctor = doctor_for(pool, &["sports"]);

        let (result, output) = run_to_string(&doctor).await;
        let report = result.unwrap();

        assert!(output.contains("Found 2 articles without a category"));
        assert!(output.contains("   - \"Lost story\" (lost) | topic: N/A"));
        assert!(output.contains("   - \"Tagged story\" (tagged) | topic: elections"));

        assert_eq!(report.stats.total, 4);
        assert_eq!(report.stats.with_category, 2);
        assert_eq!(report.stats.without_category, 2);
        assert!(output.contains("Total articles:   4"));

        assert_eq!(report.sample.len(), 3);
        assert!(output.contains("      category:   sports (Sports)"));
        assert!(output.contains("      categoryId: null"));
        assert!(output.contains("      category:   null"));
        assert!(!output.contains("Fourth"));
        assert!(output.ends_with("✅ Diagnosis complete\n"));
    }

    #[tokio::test]
    async fn test_sample_marks_deleted_category() {
        let pool = migrated_pool().await;
        let world = insert_category(&pool, "world", "World").await;
        let article = insert_article(&pool, "gone", "Gone", None, Some(world)).await;
        dangle_article(&pool, article, 404).await;
        let doctor = doctor_for(pool, &["world"]);

        let (result, output) = run_to_string(&doctor).await;

        assert!(result.unwrap().sample[0].is_dangling());
        assert!(output.contains("      categoryId: 404"));
        assert!(output.contains("      category:   null (no such category)"));
    }

    #[test]
    fn test_inconsistent_stats_are_flagged() {
        let mut out = Vec::new();
        write_stats(
            &mut out,
            &ArticleStats {
                total: 5,
                with_category: 2,
                without_category: 1,
            },
        )
        .unwrap();
        let output = String::from_utf8(out).unwrap();

        assert!(output.contains("⚠️  Counts disagree: 2 + 1 != 5"));
    }

    #[test]
    fn test_consistent_stats_have_no_warning() {
        let mut out = Vec::new();
        write_stats(
            &mut out,
            &ArticleStats {
                total: 3,
                with_category: 2,
                without_category: 1,
            },
        )
        .unwrap();

        assert!(!String::from_utf8(out).unwrap().contains("Counts disagree"));
    }

    #[tokio::test]
    async fn test_every_article_categorized() {
        let pool = migrated_pool().await;
        let tech = insert_category(&pool, "tech", "Tech").await;
        insert_article(&pool, "one", "One", None, Some(tech)).await;
        let doctor = doctor_for(pool, &["tech"]);

        let (_, output) = run_to_string(&doctor).await;

        assert!(output.contains("Every article has a category"));
        assert!(output.contains("1 article\n"));
    }

    #[tokio::test]
    async fn test_run_and_close_closes_pool_on_success() {
        let pool = migrated_pool().await;
        let handle = pool.clone();

        let mut out = Vec::new();
        let report = run_and_close(pool, &mut out).await;

        assert!(report.is_some());
        assert!(handle.as_sqlite().unwrap().is_closed());
    }

    #[tokio::test]
    async fn test_run_and_close_reports_failure_and_closes() {
        // No migrations: the first query fails on the missing table
        let pool = create_test_pool().await.unwrap();
        let handle = pool.clone();

        let mut out = Vec::new();
        let report = run_and_close(pool, &mut out).await;
        let output = String::from_utf8(out).unwrap();

        assert!(report.is_none());
        assert!(output.contains("❌ Diagnosis failed"));
        assert!(output.contains("Failed to list categories"));
        assert!(handle.as_sqlite().unwrap().is_closed());
    }

    struct FixedCategories(Vec<CategoryWithCount>);

    #[async_trait]
    impl CategoryRepository for FixedCategories {
        async fn list_with_article_counts(&self) -> Result<Vec<CategoryWithCount>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenStats;

    #[async_trait]
    impl ArticleRepository for BrokenStats {
        async fn list_uncategorized(&self) -> Result<Vec<Article>> {
            Ok(vec![Article {
                id: 1,
                slug: "lost".to_string(),
                title: "Lost".to_string(),
                topic: None,
                category_id: None,
                status: ArticleStatus::Draft,
            }])
        }

        async fn stats(&self) -> Result<ArticleStats> {
            Err(anyhow::anyhow!("connection reset"))
        }

        async fn sample_with_category(&self, _limit: i64) -> Result<Vec<ArticleWithCategory>> {
            panic!("sample must not run after a failed step");
        }
    }

    #[tokio::test]
    async fn test_failure_stops_after_earlier_sections() {
        let doctor = CategoryDoctor::new(
            Arc::new(FixedCategories(vec![CategoryWithCount::new(
                Category::new(1, "tech", "Tech"),
                0,
            )])),
            Arc::new(BrokenStats),
            keys(&["tech"]),
        );

        let (result, output) = run_to_string(&doctor).await;

        assert!(result.unwrap_err().to_string().contains("connection reset"));
        assert!(output.contains("tech (Tech): 0 articles"));
        assert!(output.contains("\"Lost\" (lost)"));
        assert!(!output.contains("Article statistics"));
    }
}
