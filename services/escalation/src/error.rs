use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use checkin_domain::status::CheckInStatus;

/// Escalation service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum CheckInServiceError {
    #[error("malformed verification code")]
    MalformedCode,
    #[error("invalid verification code")]
    InvalidCode,
    #[error("check-in not found")]
    CheckInNotFound,
    #[error("contact not found")]
    ContactNotFound,
    #[error("check-in already exists")]
    CheckInAlreadyExists,
    /// The conditional write lost: the record is no longer in the expected status.
    #[error("check-in is already {current}")]
    StatusConflict { current: CheckInStatus },
    #[error("cannot transition from {from} to {to}")]
    InvalidTransition {
        from: CheckInStatus,
        to: CheckInStatus,
    },
    #[error("escalation deadline has passed")]
    DeadlinePassed,
    #[error("contact needs a phone number or an email address")]
    InvalidContact,
    #[error("missing data")]
    MissingData,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl CheckInServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedCode => "MALFORMED_CODE",
            Self::InvalidCode => "INVALID_CODE",
            Self::CheckInNotFound => "CHECK_IN_NOT_FOUND",
            Self::ContactNotFound => "CONTACT_NOT_FOUND",
            Self::CheckInAlreadyExists => "CHECK_IN_ALREADY_EXISTS",
            Self::StatusConflict { .. } => "STATUS_CONFLICT",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::DeadlinePassed => "DEADLINE_PASSED",
            Self::InvalidContact => "INVALID_CONTACT",
            Self::MissingData => "MISSING_DATA",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for CheckInServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MalformedCode
            | Self::InvalidCode
            | Self::InvalidContact
            | Self::MissingData => StatusCode::BAD_REQUEST,
            Self::CheckInNotFound | Self::ContactNotFound => StatusCode::NOT_FOUND,
            Self::CheckInAlreadyExists
            | Self::StatusConflict { .. }
            | Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::DeadlinePassed => StatusCode::GONE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Only 500s are logged here; the trace layer already records every status.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

/// Failure of a single notification channel attempt.
///
/// Recorded in the dispatch report; never propagated as a service error.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("transport unavailable: {0}")]
    Transport(String),
    #[error("rejected by gateway with status {0}")]
    Rejected(u16),
    #[error("{0} channel is not configured")]
    NotConfigured(&'static str),
}
