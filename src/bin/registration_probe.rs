//! Registration API probe
//!
//! Usage:
//!   registration-probe             print instructions
//!   ADMIN_TOKEN=... registration-probe --run

use std::io::Write;

use anyhow::Result;
use clap::Parser;

use newsdesk_ops::{
    config::ProbeConfig,
    graphql::{GraphqlClient, GraphqlRegistrationApi},
    probe::{self, ProbeOutcome},
    telemetry,
};

#[derive(Parser)]
#[command(name = "registration-probe")]
#[command(
    about = "Run read-only registration queries against the admin GraphQL API",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Execute the queries; without it only instructions are printed
    #[arg(long)]
    run: bool,

    /// Other arguments are accepted and ignored
    #[arg(hide = true)]
    ignored: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();
    if !cli.ignored.is_empty() {
        tracing::debug!(ignored = ?cli.ignored, "Ignoring extra arguments");
    }
    let config = ProbeConfig::from_env(cli.run);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let outcome = probe::execute(&config, &mut out, |endpoint, token| {
        GraphqlClient::new(endpoint, token).map(GraphqlRegistrationApi::new)
    })
    .await?;
    out.flush()?;

    if let ProbeOutcome::Completed { failed_statuses } = &outcome {
        if !failed_statuses.is_empty() {
            tracing::warn!("{} status queries failed", failed_statuses.len());
        }
    }
    tracing::debug!(?outcome, "Probe finished");
    Ok(())
}
