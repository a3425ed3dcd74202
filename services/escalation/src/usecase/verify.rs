use chrono::{DateTime, Utc};
use tracing::info;

use checkin_domain::code::VerificationCode;
use checkin_domain::id::{CheckInId, OwnerId};
use checkin_domain::status::CheckInStatus;

use crate::domain::repository::CheckInStore;
use crate::domain::types::{CheckIn, Transition};
use crate::error::CheckInServiceError;

pub struct SubmitCodeInput {
    pub check_in_id: CheckInId,
    pub code: String,
    /// `None` on the public path, where the record is looked up by id alone.
    pub owner_id: Option<OwnerId>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum VerifyOutcome {
    Acknowledged(CheckIn),
    /// The record was acknowledged earlier; resubmission is harmless.
    AlreadyAcknowledged(CheckIn),
}

impl VerifyOutcome {
    pub fn check_in(&self) -> &CheckIn {
        match self {
            Self::Acknowledged(c) | Self::AlreadyAcknowledged(c) => c,
        }
    }
}

/// Validates a submitted code and acknowledges the check-in.
///
/// Races against the scanner are settled by the store's conditional write:
/// if acknowledging loses, the record is re-read and answered from its
/// current status.
pub struct VerifyCheckInUseCase<S: CheckInStore> {
    pub check_ins: S,
}

impl<S: CheckInStore> VerifyCheckInUseCase<S> {
    pub async fn execute(&self, input: SubmitCodeInput) -> Result<VerifyOutcome, CheckInServiceError> {
        let code = VerificationCode::parse(input.code.trim())
            .map_err(|_| CheckInServiceError::MalformedCode)?;

        let check_in = match input.owner_id {
            Some(owner_id) => {
                self.check_ins
                    .get_by_owner_and_id(owner_id, input.check_in_id)
                    .await?
            }
            None => self.check_ins.get_by_id(input.check_in_id).await?,
        };

        if check_in.status != CheckInStatus::Scheduled {
            return resolved_outcome(check_in);
        }
        if !check_in.verification_code.matches(&code) {
            return Err(CheckInServiceError::InvalidCode);
        }
        // Overdue but not yet swept: the scanner owns it now.
        if check_in.is_overdue(input.now) {
            return Err(CheckInServiceError::DeadlinePassed);
        }

        match self
            .check_ins
            .transition(
                check_in.id,
                CheckInStatus::Scheduled,
                &Transition::acknowledge(input.now),
            )
            .await
        {
            Ok(acknowledged) => {
                info!(check_in_id = %acknowledged.id, "check-in acknowledged");
                Ok(VerifyOutcome::Acknowledged(acknowledged))
            }
            Err(CheckInServiceError::StatusConflict { .. }) => {
                let current = self.check_ins.get_by_id(check_in.id).await?;
                resolved_outcome(current)
            }
            Err(e) => Err(e),
        }
    }
}

fn resolved_outcome(check_in: CheckIn) -> Result<VerifyOutcome, CheckInServiceError> {
    match check_in.status {
        CheckInStatus::Acknowledged => Ok(VerifyOutcome::AlreadyAcknowledged(check_in)),
        CheckInStatus::Escalated => Err(CheckInServiceError::DeadlinePassed),
        CheckInStatus::Cancelled => Err(CheckInServiceError::CheckInNotFound),
        CheckInStatus::Scheduled => Err(CheckInServiceError::StatusConflict {
            current: CheckInStatus::Scheduled,
        }),
    }
}
