use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CheckInServiceError;
use crate::state::AppState;
use crate::usecase::dispatch::{ChannelOutcome, ContactDelivery};
use crate::usecase::scan::{Escalation, ScanSummary};

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelOutcomeResponse {
    Delivered,
    Failed { error: String },
}

impl From<ChannelOutcome> for ChannelOutcomeResponse {
    fn from(outcome: ChannelOutcome) -> Self {
        match outcome {
            ChannelOutcome::Delivered => Self::Delivered,
            ChannelOutcome::Failed { error } => Self::Failed { error },
        }
    }
}

#[derive(Serialize)]
pub struct ContactDeliveryResponse {
    pub contact_id: Option<String>,
    pub name: String,
    pub sms: Option<ChannelOutcomeResponse>,
    pub email: Option<ChannelOutcomeResponse>,
}

impl From<ContactDelivery> for ContactDeliveryResponse {
    fn from(d: ContactDelivery) -> Self {
        Self {
            contact_id: d.contact_id.map(|id| id.to_string()),
            name: d.name,
            sms: d.sms.map(Into::into),
            email: d.email.map(Into::into),
        }
    }
}

#[derive(Serialize)]
pub struct EscalationResponse {
    pub check_in_id: String,
    pub owner_id: String,
    pub title: String,
    #[serde(serialize_with = "checkin_core::serde::to_rfc3339_ms_opt")]
    pub escalated_at: Option<DateTime<Utc>>,
    pub sent: usize,
    pub failed: usize,
    pub contacts: Vec<ContactDeliveryResponse>,
}

impl From<Escalation> for EscalationResponse {
    fn from(e: Escalation) -> Self {
        Self {
            check_in_id: e.check_in.id.to_string(),
            owner_id: e.check_in.owner_id.to_string(),
            title: e.check_in.title,
            escalated_at: e.check_in.escalated_at,
            sent: e.dispatch.sent,
            failed: e.dispatch.failed,
            contacts: e.dispatch.contacts.into_iter().map(Into::into).collect(),
        }
    }
}

/// Sweep result as returned by the internal trigger and printed by the `sweep` CLI.
#[derive(Serialize)]
pub struct ScanSummaryResponse {
    pub processed: usize,
    pub escalated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
    pub escalations: Vec<EscalationResponse>,
}

impl From<ScanSummary> for ScanSummaryResponse {
    fn from(s: ScanSummary) -> Self {
        Self {
            processed: s.processed,
            escalated: s.escalated,
            skipped: s.skipped,
            failed: s.failed,
            notifications_sent: s.notifications_sent,
            notifications_failed: s.notifications_failed,
            escalations: s.escalations.into_iter().map(Into::into).collect(),
        }
    }
}

// ── POST /internal/escalations/run ───────────────────────────────────────────

pub async fn run_escalations(
    State(state): State<AppState>,
) -> Result<Json<ScanSummaryResponse>, CheckInServiceError> {
    let summary = state.scanner().run_once(Utc::now()).await?;
    Ok(Json(summary.into()))
}
