use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use checkin_domain::status::CheckInStatus;

use crate::domain::repository::{CheckInStore, ContactRepository, MessagingTransport};
use crate::domain::types::{CheckIn, OverdueBatch, Transition};
use crate::error::CheckInServiceError;
use crate::usecase::contact::resolve_recipients;
use crate::usecase::dispatch::{DispatchReport, NotificationDispatcher};

/// A check-in this sweep moved to `escalated`, with its alert fan-out result.
#[derive(Debug, Clone)]
pub struct Escalation {
    pub check_in: CheckIn,
    pub dispatch: DispatchReport,
}

#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Overdue entries examined.
    pub processed: usize,
    pub escalated: usize,
    /// Resolved elsewhere between the index query and the conditional write.
    pub skipped: usize,
    pub failed: usize,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
    pub escalations: Vec<Escalation>,
}

/// One sweep over overdue scheduled check-ins.
///
/// Stateless between invocations and safe to re-run for the same `now`:
/// escalated records leave the deadline index, so a repeated sweep only
/// sees what is still scheduled.
pub struct EscalationScanner<S, C, T>
where
    S: CheckInStore,
    C: ContactRepository,
    T: MessagingTransport,
{
    pub check_ins: S,
    pub contacts: C,
    pub dispatcher: NotificationDispatcher<T>,
    pub batch_limit: u64,
}

impl<S, C, T> EscalationScanner<S, C, T>
where
    S: CheckInStore,
    C: ContactRepository,
    T: MessagingTransport,
{
    /// Overdue entries a sweep at `now` would pick up, without touching them.
    pub async fn pending(&self, now: DateTime<Utc>) -> Result<OverdueBatch, CheckInServiceError> {
        self.check_ins.list_overdue(now, self.batch_limit).await
    }

    /// Only the index query is fatal; every per-item failure, including a
    /// record the store could not decode, is counted and the sweep moves on.
    ///
    /// Recipients are resolved before the escalating write, so a failed
    /// contact lookup keeps the record scheduled for the next sweep.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<ScanSummary, CheckInServiceError> {
        let overdue = self.pending(now).await?;
        let mut summary = ScanSummary {
            processed: overdue.unreadable.len(),
            failed: overdue.unreadable.len(),
            ..ScanSummary::default()
        };

        for check_in in overdue.check_ins {
            summary.processed += 1;
            let check_in_id = check_in.id;
            match self.escalate(check_in, now).await {
                Ok(escalation) => {
                    summary.escalated += 1;
                    summary.notifications_sent += escalation.dispatch.sent;
                    summary.notifications_failed += escalation.dispatch.failed;
                    summary.escalations.push(escalation);
                }
                Err(CheckInServiceError::StatusConflict { current }) => {
                    debug!(check_in_id = %check_in_id, status = %current, "already resolved, skipping");
                    summary.skipped += 1;
                }
                Err(e) => {
                    warn!(check_in_id = %check_in_id, error = ?e, "escalation failed");
                    summary.failed += 1;
                }
            }
        }

        info!(
            processed = summary.processed,
            escalated = summary.escalated,
            skipped = summary.skipped,
            failed = summary.failed,
            notifications_sent = summary.notifications_sent,
            notifications_failed = summary.notifications_failed,
            "escalation sweep finished"
        );
        Ok(summary)
    }

    async fn escalate(
        &self,
        check_in: CheckIn,
        now: DateTime<Utc>,
    ) -> Result<Escalation, CheckInServiceError> {
        // Resolve first: a failed lookup leaves the record scheduled for the next sweep.
        let recipients = resolve_recipients(&self.contacts, &check_in).await?;

        let escalated = self
            .check_ins
            .transition(check_in.id, CheckInStatus::Scheduled, &Transition::escalate(now))
            .await?;
        info!(
            check_in_id = %escalated.id,
            owner_id = %escalated.owner_id,
            recipients = recipients.len(),
            "check-in escalated"
        );

        let dispatch = self.dispatcher.notify(&escalated, &recipients).await;
        Ok(Escalation {
            check_in: escalated,
            dispatch,
        })
    }
}
