use chrono::{DateTime, Utc};
use rand::RngExt;
use tracing::info;

use checkin_domain::code::{VERIFICATION_CODE_LEN, VerificationCode};
use checkin_domain::id::{CheckInId, OwnerId};
use checkin_domain::status::CheckInStatus;

use crate::domain::repository::{CheckInStore, ContactRepository};
use crate::domain::types::{CheckIn, ContactEntry, InlineContact, Transition, normalize_channel};
use crate::error::CheckInServiceError;

fn generate_code() -> Result<VerificationCode, CheckInServiceError> {
    let mut rng = rand::rng();
    let digits: String = (0..VERIFICATION_CODE_LEN)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect();
    VerificationCode::parse(&digits)
        .map_err(|e| CheckInServiceError::Internal(anyhow::anyhow!(e)))
}

fn normalize_entry(entry: ContactEntry) -> Result<ContactEntry, CheckInServiceError> {
    match entry {
        ContactEntry::Saved { .. } => Ok(entry),
        ContactEntry::Inline(contact) => {
            let name = contact.name.trim().to_owned();
            if name.is_empty() {
                return Err(CheckInServiceError::MissingData);
            }
            let phone = normalize_channel(contact.phone);
            let email = normalize_channel(contact.email);
            if phone.is_none() && email.is_none() {
                return Err(CheckInServiceError::InvalidContact);
            }
            Ok(ContactEntry::Inline(InlineContact { name, phone, email }))
        }
    }
}

// ── CreateCheckIn ────────────────────────────────────────────────────────────

pub struct CreateCheckInInput {
    pub owner_name: String,
    pub title: String,
    pub scheduled_time: DateTime<Utc>,
    pub escalation_deadline: DateTime<Utc>,
    pub contacts: Vec<ContactEntry>,
}

pub struct CreateCheckInUseCase<S, C>
where
    S: CheckInStore,
    C: ContactRepository,
{
    pub check_ins: S,
    pub contacts: C,
}

impl<S, C> CreateCheckInUseCase<S, C>
where
    S: CheckInStore,
    C: ContactRepository,
{
    pub async fn execute(
        &self,
        owner_id: OwnerId,
        input: CreateCheckInInput,
    ) -> Result<CheckIn, CheckInServiceError> {
        let title = input.title.trim().to_owned();
        let owner_name = input.owner_name.trim().to_owned();
        if title.is_empty() || owner_name.is_empty() || input.contacts.is_empty() {
            return Err(CheckInServiceError::MissingData);
        }
        let contacts = input
            .contacts
            .into_iter()
            .map(normalize_entry)
            .collect::<Result<Vec<_>, _>>()?;

        let now = Utc::now();
        let check_in = CheckIn {
            id: CheckInId::generate(),
            owner_id,
            owner_name,
            title,
            scheduled_time: input.scheduled_time,
            escalation_deadline: input.escalation_deadline,
            status: CheckInStatus::Scheduled,
            verification_code: generate_code()?,
            contacts,
            created_at: now,
            updated_at: now,
            acknowledged_at: None,
            escalated_at: None,
        };

        let saved_ids = check_in.saved_contact_ids();
        if !saved_ids.is_empty() {
            let found = self
                .contacts
                .find_by_owner_and_ids(owner_id, &saved_ids)
                .await?;
            if found.len() != saved_ids.len() {
                return Err(CheckInServiceError::ContactNotFound);
            }
        }

        self.check_ins.create(&check_in).await?;
        info!(
            check_in_id = %check_in.id,
            owner_id = %owner_id,
            deadline = %check_in.escalation_deadline,
            "check-in scheduled"
        );
        Ok(check_in)
    }
}

// ── GetCheckIn ───────────────────────────────────────────────────────────────

pub struct GetCheckInUseCase<S: CheckInStore> {
    pub check_ins: S,
}

impl<S: CheckInStore> GetCheckInUseCase<S> {
    pub async fn execute(
        &self,
        owner_id: OwnerId,
        id: CheckInId,
    ) -> Result<CheckIn, CheckInServiceError> {
        self.check_ins.get_by_owner_and_id(owner_id, id).await
    }
}

// ── CancelCheckIn ────────────────────────────────────────────────────────────

pub struct CancelCheckInUseCase<S: CheckInStore> {
    pub check_ins: S,
}

impl<S: CheckInStore> CancelCheckInUseCase<S> {
    /// Cancelling twice succeeds; cancelling an acknowledged or escalated
    /// check-in is a `StatusConflict`.
    pub async fn execute(
        &self,
        owner_id: OwnerId,
        id: CheckInId,
    ) -> Result<CheckIn, CheckInServiceError> {
        let check_in = self.check_ins.get_by_owner_and_id(owner_id, id).await?;
        if check_in.status == CheckInStatus::Cancelled {
            return Ok(check_in);
        }

        match self
            .check_ins
            .transition(id, CheckInStatus::Scheduled, &Transition::cancel(Utc::now()))
            .await
        {
            Ok(cancelled) => {
                info!(check_in_id = %id, "check-in cancelled");
                Ok(cancelled)
            }
            Err(CheckInServiceError::StatusConflict {
                current: CheckInStatus::Cancelled,
            }) => self.check_ins.get_by_owner_and_id(owner_id, id).await,
            Err(e) => Err(e),
        }
    }
}
