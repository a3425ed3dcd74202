use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use checkin_auth_types::identity::IdentityHeaders;
use checkin_domain::code::VerificationCode;
use checkin_domain::id::OwnerId;
use checkin_domain::status::CheckInStatus;

use crate::error::CheckInServiceError;
use crate::handlers::parse_check_in_id;
use crate::state::AppState;
use crate::usecase::verify::{SubmitCodeInput, VerifyCheckInUseCase, VerifyOutcome};

#[derive(Deserialize)]
pub struct SubmitCodeRequest {
    pub code: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub id: String,
    pub status: CheckInStatus,
    /// `false` when the check-in had already been acknowledged.
    pub newly_acknowledged: bool,
    #[serde(serialize_with = "checkin_core::serde::to_rfc3339_ms_opt")]
    pub acknowledged_at: Option<DateTime<Utc>>,
}

impl From<VerifyOutcome> for VerifyResponse {
    fn from(outcome: VerifyOutcome) -> Self {
        let newly_acknowledged = matches!(outcome, VerifyOutcome::Acknowledged(_));
        let check_in = outcome.check_in();
        Self {
            id: check_in.id.to_string(),
            status: check_in.status,
            newly_acknowledged,
            acknowledged_at: check_in.acknowledged_at,
        }
    }
}

async fn submit(
    state: AppState,
    id: &str,
    body: Result<Json<SubmitCodeRequest>, JsonRejection>,
    owner_id: Option<OwnerId>,
) -> Result<Json<VerifyResponse>, CheckInServiceError> {
    // A body without a string code is a malformed code, not an unprocessable entity.
    let Ok(Json(SubmitCodeRequest { code })) = body else {
        return Err(CheckInServiceError::MalformedCode);
    };
    // Format is checked before the id so a malformed code never costs a lookup.
    if VerificationCode::parse(code.trim()).is_err() {
        return Err(CheckInServiceError::MalformedCode);
    }
    let usecase = VerifyCheckInUseCase {
        check_ins: state.check_in_store(),
    };
    let outcome = usecase
        .execute(SubmitCodeInput {
            check_in_id: parse_check_in_id(id)?,
            code,
            owner_id,
            now: Utc::now(),
        })
        .await?;
    Ok(Json(outcome.into()))
}

// ── POST /checkins/{id}/verify ───────────────────────────────────────────────

/// Public web path: no identity, looked up by id alone.
pub async fn verify_check_in(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<SubmitCodeRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, CheckInServiceError> {
    submit(state, &id, body, None).await
}

// ── POST /checkins/{id}/acknowledge ──────────────────────────────────────────

pub async fn acknowledge_check_in(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<SubmitCodeRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, CheckInServiceError> {
    submit(state, &id, body, Some(identity.owner_id)).await
}
