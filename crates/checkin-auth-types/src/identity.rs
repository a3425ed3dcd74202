//! Gateway-injected identity header extractor.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;

use checkin_domain::id::OwnerId;

use crate::OWNER_ID_HEADER;

/// Owner identity injected by the gateway via `x-checkin-user-id`.
///
/// Returns 401 if the header is absent or cannot be parsed as UUID.
/// Public routes (code verification from a web link) simply do not extract it.
#[derive(Debug, Clone, Copy)]
pub struct IdentityHeaders {
    pub owner_id: OwnerId,
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Header parsing is synchronous; returning a `'static` future avoids
    // capturing the `parts` borrow.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let owner_id = parts
            .headers
            .get(OWNER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<OwnerId>().ok());

        async move {
            let owner_id = owner_id.ok_or(StatusCode::UNAUTHORIZED)?;
            Ok(Self { owner_id })
        }
    }
}
