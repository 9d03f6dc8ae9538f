//! Category diagnostic tool
//!
//! Reads `config.yml` from the working directory; NEWSDESK_DATABASE_DRIVER and
//! NEWSDESK_DATABASE_URL override it.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use clap::Parser;

use newsdesk_ops::{config::Config, db, diagnostics, telemetry};

#[derive(Parser)]
#[command(name = "category-doctor")]
#[command(about = "Compare database categories with the navigation config", long_about = None)]
#[command(version)]
struct Cli {}

const CONFIG_PATH: &str = "config.yml";

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    Cli::parse();

    let config = Config::load_with_env(Path::new(CONFIG_PATH))?;
    tracing::info!("Configuration loaded");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let pool = match db::create_pool(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Could not connect to database: {:#}", e);
            writeln!(out, "❌ Diagnosis failed: {:#}", e)?;
            return Ok(());
        }
    };
    tracing::info!("Database connected: {:?}", config.database.driver);

    diagnostics::run_and_close(pool, &mut out).await;
    out.flush()?;
    Ok(())
}
