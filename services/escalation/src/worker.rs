use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::state::AppState;

/// Run a sweep every `period` until the task is aborted.
///
/// A sweep that overruns the period delays the next tick instead of
/// queueing a burst; a failed sweep is logged and retried on the next tick.
pub fn spawn_scanner(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(period_secs = period.as_secs(), "escalation scanner started");
        let scanner = state.scanner();
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = scanner.run_once(Utc::now()).await {
                error!(error = ?e, "escalation sweep failed");
            }
        }
    })
}
