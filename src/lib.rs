//! Newsdesk operator tools
//!
//! Two read-only diagnostics for the newsdesk backend:
//!
//! - `category-doctor` compares database categories with the site navigation
//!   and reports articles without a category.
//! - `registration-probe` runs a fixed battery of registration queries
//!   against the admin GraphQL API.

pub mod config;
pub mod db;
pub mod diagnostics;
pub mod graphql;
pub mod models;
pub mod navigation;
pub mod probe;
pub mod telemetry;
