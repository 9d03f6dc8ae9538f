//! Database repositories
//!
//! Read-only repository implementations for the rows the diagnostics inspect.

pub mod article;
pub mod category;

pub use article::{ArticleRepository, SqlxArticleRepository};
pub use category::{CategoryRepository, SqlxCategoryRepository};

use crate::db::pool::{mysql_pool, sqlite_pool};
