//! Database layer
//!
//! Read access to the newsdesk backend's data store. Both backends the
//! platform runs on are supported:
//! - SQLite (local and single-binary deployments)
//! - MySQL
//!
//! The driver is selected from configuration.
//!
//! # Usage
//!
//! ```ignore
//! use newsdesk_ops::config::DatabaseConfig;
//! use newsdesk_ops::db::create_pool;
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! pool.ping().await?;
//! // ...
//! pool.close().await;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, create_writable_pool, AccessMode, DatabasePool,
    DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
