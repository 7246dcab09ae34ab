use anyhow::{Context, Result};
use sheetsync::{
    auth::ServiceAccountCredentials,
    sheets::SheetsClient,
    JobConfig, SheetSyncJob,
};
use std::{env, process::ExitCode};
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    // ─── 1) init logging ─────────────────────────────────────────────
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "sync aborted");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // ─── 2) configuration ────────────────────────────────────────────
    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "ignoring unreadable .env"),
    }
    let config = JobConfig::from_env().context("loading configuration")?;
    info!(
        source = %config.source.tab,
        destination = %config.destination.tab,
        cycle = %config.cycle.tab,
        columns = config.columns.len(),
        "startup"
    );

    // ─── 3) authenticate ─────────────────────────────────────────────
    let http = SheetsClient::http_client().context("building HTTP client")?;
    let credentials =
        ServiceAccountCredentials::from_env(http.clone()).context("reading service account")?;
    info!(account = credentials.client_email(), "authenticating");
    let client = SheetsClient::connect(http, &credentials).context("authenticating")?;

    // ─── 4) run ──────────────────────────────────────────────────────
    let job = SheetSyncJob::new(client, config)?;
    let report = job.run()?;
    if report.is_partial() {
        warn!("sync finished with recoverable errors");
    }
    Ok(())
}
