//! Bulk connection-request example.
//!
//! Run with: cargo run --example bulk_connect -- handle-one handle-two
//!
//! Configuration via .env file or environment variables:
//!   LINKEDIN_SID       - li_at session cookie value (required)
//!   OUTREACH_MESSAGE   - note attached to each request (optional)

use std::env;
use std::sync::Arc;

use outreach::{
    BatchRunner, BudgetTracker, ConnectionExecutor, OutreachConfig, SessionGuard,
    StaticCredentialSource, VoyagerApi, VoyagerClient, VoyagerConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let token = env::var("LINKEDIN_SID")
        .map_err(|_| "LINKEDIN_SID not set; export your li_at session cookie value")?;

    let handles: Vec<String> = env::args().skip(1).collect();
    if handles.is_empty() {
        eprintln!("usage: bulk_connect <handle> [handle ...]");
        std::process::exit(1);
    }

    let config = OutreachConfig::default();
    let client = VoyagerClient::new(VoyagerConfig::default())?;

    let source = StaticCredentialSource::single("default", token);
    let guard = SessionGuard::new(source, "default");
    let budget = Arc::new(BudgetTracker::new(config.budgets.clone()));

    let mut executor = ConnectionExecutor::new(VoyagerApi::new(client), guard, budget);
    if let Ok(message) = env::var("OUTREACH_MESSAGE") {
        executor = executor.with_message(message);
    }

    let runner = BatchRunner::new(executor, config.pacing.clone());

    println!("Connecting with {} profile(s)...\n", handles.len());
    let report = runner.run(&handles).await;

    println!("\n--- Outreach results ---");
    for outcome in &report.outcomes {
        let marker = if outcome.connection_exists() { "ok " } else { "err" };
        println!(
            "[{}] {}: {:?}{}",
            marker,
            outcome.handle,
            outcome.classification,
            outcome
                .evidence
                .as_deref()
                .map(|evidence| format!(" ({})", evidence))
                .unwrap_or_default()
        );
    }

    let summary = report.summary();
    println!(
        "\nSummary: {}/{} connected ({} new, {} already connected or pending)",
        summary.succeeded + summary.duplicate,
        summary.attempted,
        summary.succeeded,
        summary.duplicate
    );

    if report.rate_limited {
        println!(
            "Rate limited; resume tomorrow from handle index {}.",
            report.next_index
        );
    }
    if let Some(e) = &report.aborted {
        eprintln!("Batch aborted: {}", e);
    }

    Ok(())
}
