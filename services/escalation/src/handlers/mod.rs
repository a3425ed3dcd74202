use checkin_domain::id::CheckInId;

use crate::error::CheckInServiceError;

pub mod checkin;
pub mod contact;
pub mod escalation;
pub mod health;
pub mod verify;

/// Path ids that are not UUIDs cannot name a check-in, so they are reported
/// as not found rather than as a bad request.
pub(crate) fn parse_check_in_id(raw: &str) -> Result<CheckInId, CheckInServiceError> {
    raw.parse().map_err(|_| CheckInServiceError::CheckInNotFound)
}
