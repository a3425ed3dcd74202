use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use checkin_auth_types::identity::IdentityHeaders;
use checkin_domain::status::CheckInStatus;

use crate::domain::types::{CheckIn, ContactEntry};
use crate::error::CheckInServiceError;
use crate::handlers::parse_check_in_id;
use crate::state::AppState;
use crate::usecase::checkin::{
    CancelCheckInUseCase, CreateCheckInInput, CreateCheckInUseCase, GetCheckInUseCase,
};
use crate::usecase::token::GetVerificationLinkUseCase;

#[derive(Serialize)]
pub struct CheckInResponse {
    pub id: String,
    pub owner_name: String,
    pub title: String,
    #[serde(serialize_with = "checkin_core::serde::to_rfc3339_ms")]
    pub scheduled_time: DateTime<Utc>,
    #[serde(serialize_with = "checkin_core::serde::to_rfc3339_ms")]
    pub escalation_deadline: DateTime<Utc>,
    pub status: CheckInStatus,
    pub verification_code: String,
    pub contacts: Vec<ContactEntry>,
    #[serde(serialize_with = "checkin_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "checkin_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
    #[serde(serialize_with = "checkin_core::serde::to_rfc3339_ms_opt")]
    pub acknowledged_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "checkin_core::serde::to_rfc3339_ms_opt")]
    pub escalated_at: Option<DateTime<Utc>>,
}

impl From<CheckIn> for CheckInResponse {
    fn from(c: CheckIn) -> Self {
        Self {
            id: c.id.to_string(),
            owner_name: c.owner_name,
            title: c.title,
            scheduled_time: c.scheduled_time,
            escalation_deadline: c.escalation_deadline,
            status: c.status,
            verification_code: c.verification_code.as_str().to_owned(),
            contacts: c.contacts,
            created_at: c.created_at,
            updated_at: c.updated_at,
            acknowledged_at: c.acknowledged_at,
            escalated_at: c.escalated_at,
        }
    }
}

// ── POST /checkins ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateCheckInRequest {
    pub owner_name: String,
    pub title: String,
    pub scheduled_time: DateTime<Utc>,
    pub escalation_deadline: DateTime<Utc>,
    pub contacts: Vec<ContactEntry>,
}

pub async fn create_check_in(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateCheckInRequest>,
) -> Result<(StatusCode, Json<CheckInResponse>), CheckInServiceError> {
    let usecase = CreateCheckInUseCase {
        check_ins: state.check_in_store(),
        contacts: state.contact_repo(),
    };
    let check_in = usecase
        .execute(
            identity.owner_id,
            CreateCheckInInput {
                owner_name: body.owner_name,
                title: body.title,
                scheduled_time: body.scheduled_time,
                escalation_deadline: body.escalation_deadline,
                contacts: body.contacts,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(check_in.into())))
}

// ── GET /checkins/{id} ───────────────────────────────────────────────────────

pub async fn get_check_in(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CheckInResponse>, CheckInServiceError> {
    let usecase = GetCheckInUseCase {
        check_ins: state.check_in_store(),
    };
    let check_in = usecase
        .execute(identity.owner_id, parse_check_in_id(&id)?)
        .await?;
    Ok(Json(check_in.into()))
}

// ── DELETE /checkins/{id} ────────────────────────────────────────────────────

pub async fn cancel_check_in(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, CheckInServiceError> {
    let usecase = CancelCheckInUseCase {
        check_ins: state.check_in_store(),
    };
    usecase
        .execute(identity.owner_id, parse_check_in_id(&id)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /checkins/{id}/verification-link ─────────────────────────────────────

#[derive(Serialize)]
pub struct VerificationLinkResponse {
    pub token: String,
    pub url: String,
}

pub async fn get_verification_link(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VerificationLinkResponse>, CheckInServiceError> {
    let usecase = GetVerificationLinkUseCase {
        check_ins: state.check_in_store(),
        signer: state.signer.clone(),
        base_url: state.public_base_url.clone(),
    };
    let link = usecase
        .execute(identity.owner_id, parse_check_in_id(&id)?)
        .await?;
    Ok(Json(VerificationLinkResponse {
        token: link.token,
        url: link.url,
    }))
}
