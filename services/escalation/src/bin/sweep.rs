//! One-shot escalation sweep for external schedulers (cron, k8s CronJob).

use chrono::Utc;
use clap::Parser;
use serde::Serialize;

use checkin_core::tracing::init_tracing;
use checkin_escalation::config::EscalationConfig;
use checkin_escalation::handlers::escalation::ScanSummaryResponse;
use checkin_escalation::state::AppState;

#[derive(Parser)]
#[command(name = "sweep", about = "Escalate overdue check-ins once and print a JSON summary")]
struct Args {
    /// Maximum overdue check-ins to handle (defaults to SCAN_BATCH_LIMIT).
    #[arg(long)]
    limit: Option<u64>,

    /// List what would be escalated without changing anything.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Serialize)]
struct PendingEntry {
    check_in_id: String,
    owner_id: String,
    escalation_deadline: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = EscalationConfig::from_env();
    if let Some(limit) = args.limit {
        config.scan_batch_limit = limit;
    }
    config.require_database_url()?;
    let state = AppState::connect(&config).await?;
    let scanner = state.scanner();
    let now = Utc::now();

    let output = if args.dry_run {
        let pending: Vec<PendingEntry> = scanner
            .pending(now)
            .await?
            .check_ins
            .into_iter()
            .map(|c| PendingEntry {
                check_in_id: c.id.to_string(),
                owner_id: c.owner_id.to_string(),
                escalation_deadline: c.escalation_deadline.to_rfc3339(),
            })
            .collect();
        serde_json::to_string_pretty(&pending)?
    } else {
        let summary = scanner.run_once(now).await?;
        serde_json::to_string_pretty(&ScanSummaryResponse::from(summary))?
    };
    println!("{output}");
    Ok(())
}
