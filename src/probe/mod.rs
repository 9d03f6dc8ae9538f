//! Registration API probe
//!
//! Runs a fixed, read-only battery of registration queries against the admin
//! GraphQL API and prints what comes back:
//!
//! 1. aggregate statistics
//! 2. unfiltered first page
//! 3. the pending-approval queue
//! 4. one filtered query per remaining status
//!
//! Nothing runs without `--run`, and nothing touches the network without a
//! usable admin token. Queries are awaited one at a time so a failure can be
//! tied to the query that caused it.

use std::io::Write;

use crate::config::{ConfigError, ProbeConfig, ADMIN_TOKEN_ENV, ENDPOINT_ENV};
use crate::graphql::{GraphqlError, RegistrationApi};
use crate::models::{RegistrationFilter, RegistrationRequest, RegistrationStatus};

/// Page size used by every listing query
pub const PAGE_SIZE: i64 = 10;

/// Entries printed from the unfiltered listing
pub const PREVIEW_COUNT: usize = 3;

/// Status queried on its own in step 3
pub const FOCUS_STATUS: RegistrationStatus = RegistrationStatus::PendingApproval;

/// Statuses swept in step 4
pub const SWEEP_STATUSES: [RegistrationStatus; 4] = [
    RegistrationStatus::PendingVerification,
    RegistrationStatus::Approved,
    RegistrationStatus::Rejected,
    RegistrationStatus::Expired,
];

/// How a probe invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// `--run` was absent; only instructions were printed
    InstructionsOnly,
    /// No usable credential; setup instructions were printed
    MissingCredential,
    /// The battery finished; lists statuses whose sweep query failed
    Completed {
        failed_statuses: Vec<RegistrationStatus>,
    },
    /// One of the first three queries failed
    Failed,
}

/// Gate on `--run` and the credential, then run the battery.
///
/// `connect` receives the endpoint and token and is only called once both
/// gates pass, so no client exists, let alone a request, before that.
pub async fn execute<W, A, F>(
    config: &ProbeConfig,
    out: &mut W,
    connect: F,
) -> std::io::Result<ProbeOutcome>
where
    W: Write,
    A: RegistrationApi,
    F: FnOnce(&str, &str) -> Result<A, GraphqlError>,
{
    write_instructions(out, config)?;

    if !config.run {
        writeln!(out, "\nℹ️  Pass --run to execute the queries.")?;
        return Ok(ProbeOutcome::InstructionsOnly);
    }

    let token = match config.credential() {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!("Registration probe not started: {}", e);
            write_setup_instructions(out, &e)?;
            return Ok(ProbeOutcome::MissingCredential);
        }
    };

    let api = match connect(&config.endpoint, token) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!("Could not create GraphQL client: {}", e.detail());
            writeln!(out, "\n❌ Could not create GraphQL client: {}", e.detail())?;
            return Ok(ProbeOutcome::Failed);
        }
    };

    tracing::info!(endpoint = %config.endpoint, "Running registration probe");
    RegistrationProbe::new(api).run(out).await
}

/// The query battery over any [`RegistrationApi`]
pub struct RegistrationProbe<A> {
    api: A,
}

impl<A: RegistrationApi> RegistrationProbe<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Run steps 1 to 4, catching and reporting failures.
    ///
    /// Only writing to `out` can fail this function.
    pub async fn run<W: Write>(&self, out: &mut W) -> std::io::Result<ProbeOutcome> {
        match self.run_core(out).await? {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Registration probe failed: {}", e.detail());
                write_failure(out, &e)?;
                return Ok(ProbeOutcome::Failed);
            }
        }

        let failed_statuses = self.sweep_statuses(out).await?;
        writeln!(out, "\n✅ Probe complete")?;
        Ok(ProbeOutcome::Completed { failed_statuses })
    }

    /// Steps 1 to 3; the outer result is the writer, the inner one the API.
    async fn run_core<W: Write>(
        &self,
        out: &mut W,
    ) -> std::io::Result<Result<(), GraphqlError>> {
        writeln!(out, "\n1️⃣  Registration statistics")?;
        let stats = match self.api.stats().await {
            Ok(stats) => stats,
            Err(e) => return Ok(Err(e)),
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;

        writeln!(
            out,
            "\n2️⃣  All registration requests (limit {}, offset 0)",
            PAGE_SIZE
        )?;
        let page = match self.api.list(RegistrationFilter::first_page(PAGE_SIZE)).await {
            Ok(page) => page,
            Err(e) => return Ok(Err(e)),
        };
        writeln!(out, "   Returned: {}", page.items.len())?;
        writeln!(out, "   Total:    {}", page.total)?;
        writeln!(out, "   Has more: {}", page.has_more)?;
        if !page.items.is_empty() {
            writeln!(out, "   First {}:", PREVIEW_COUNT.min(page.items.len()))?;
            for request in page.items.iter().take(PREVIEW_COUNT) {
                write_request_line(out, request)?;
            }
        }

        writeln!(out, "\n3️⃣  Requests in {}", FOCUS_STATUS)?;
        let focus = match self
            .api
            .list(RegistrationFilter::with_status(FOCUS_STATUS, PAGE_SIZE))
            .await
        {
            Ok(page) => page,
            Err(e) => return Ok(Err(e)),
        };
        writeln!(
            out,
            "   Returned: {} (statistics report {})",
            focus.items.len(),
            stats.count_for(FOCUS_STATUS)
        )?;

        Ok(Ok(()))
    }

    /// Step 4: one query per status, failures reported per status
    async fn sweep_statuses<W: Write>(
        &self,
        out: &mut W,
    ) -> std::io::Result<Vec<RegistrationStatus>> {
        writeln!(out, "\n4️⃣  Requests by status")?;
        let mut failed = Vec::new();

        for status in SWEEP_STATUSES {
            match self
                .api
                .list(RegistrationFilter::with_status(status, PAGE_SIZE))
                .await
            {
                Ok(page) => writeln!(out, "   {}: {}", status, page.items.len())?,
                Err(e) => {
                    tracing::warn!(
                        %status,
                        sub_errors = e.sub_errors().len(),
                        "Status query failed: {}",
                        e.detail()
                    );
                    writeln!(out, "   {}: ❌ {}", status, e.detail())?;
                    failed.push(status);
                }
            }
        }

        Ok(failed)
    }
}

/// Usage banner, printed on every invocation
pub fn write_instructions<W: Write>(out: &mut W, config: &ProbeConfig) -> std::io::Result<()> {
    writeln!(out, "🧪 Registration API probe")?;
    writeln!(out, "   Endpoint: {}", config.endpoint)?;
    writeln!(
        out,
        "   Runs read-only registration queries with an admin bearer token."
    )?;
    writeln!(out)?;
    writeln!(out, "   Usage:")?;
    writeln!(out, "     {}=<token> registration-probe --run", ADMIN_TOKEN_ENV)?;
    writeln!(
        out,
        "     {}=<url> {}=<token> registration-probe --run",
        ENDPOINT_ENV, ADMIN_TOKEN_ENV
    )
}

/// How to obtain and provide a credential
pub fn write_setup_instructions<W: Write>(
    out: &mut W,
    error: &ConfigError,
) -> std::io::Result<()> {
    writeln!(out, "\n❌ {}", error)?;
    writeln!(out, "   To get an admin token:")?;
    writeln!(out, "   1. Sign in to the admin dashboard with an ADMIN account")?;
    writeln!(out, "   2. Copy the access token from the session")?;
    writeln!(out, "   3. export {}=<token> and rerun with --run", ADMIN_TOKEN_ENV)
}

fn write_request_line<W: Write>(out: &mut W, request: &RegistrationRequest) -> std::io::Result<()> {
    let created = request
        .created_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string());
    writeln!(
        out,
        "   - {} | {} | {} | {} | {}",
        request.email,
        request.name,
        request.status,
        request.requested_role.as_deref().unwrap_or("-"),
        created
    )
}

fn write_failure<W: Write>(out: &mut W, error: &GraphqlError) -> std::io::Result<()> {
    writeln!(out, "\n❌ Probe failed: {}", error.detail())?;

    let subs = error.sub_errors();
    if subs.is_empty() {
        return Ok(());
    }

    writeln!(out, "   GraphQL errors:")?;
    for sub in subs {
        writeln!(out, "   - {}", sub.message)?;
        if let Some(path) = sub.path_display() {
            writeln!(out, "     path: {}", path)?;
        }
        if !sub.locations.is_empty() {
            let locations: Vec<String> = sub
                .locations
                .iter()
                .map(|l| format!("{}:{}", l.line, l.column))
                .collect();
            writeln!(out, "     locations: {}", locations.join(", "))?;
        }
        if let Some(extensions) = &sub.extensions {
            writeln!(
                out,
                "     extensions: {}",
                serde_json::Value::Object(extensions.clone())
            )?;
        }
    }
    Ok(())
}
