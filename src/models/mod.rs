//! Data models
//!
//! Entities the diagnostics read:
//! - Database rows (Category, Article) and their derived views
//! - GraphQL shapes for registration requests

mod article;
mod category;
mod registration;

pub use article::{Article, ArticleStats, ArticleStatus, ArticleWithCategory};
pub use category::{Category, CategoryWithCount};
pub use registration::{
    RegistrationFilter, RegistrationPage, RegistrationRequest, RegistrationStats,
    RegistrationStatus,
};
