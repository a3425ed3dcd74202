#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use checkin_domain::id::{CheckInId, ContactId, OwnerId};
use checkin_domain::status::CheckInStatus;

use crate::domain::types::{CheckIn, Contact, OverdueBatch, Transition};
use crate::error::{CheckInServiceError, DeliveryError};

/// Durable check-in records plus the deadline index over scheduled ones.
///
/// Every status change goes through [`CheckInStore::transition`]; implementations
/// keep the index in step with it atomically.
pub trait CheckInStore: Send + Sync {
    /// Persist a new `scheduled` record and index it. `InvalidTransition` for any
    /// other status, `CheckInAlreadyExists` if the id is taken.
    async fn create(&self, check_in: &CheckIn) -> Result<(), CheckInServiceError>;

    async fn get_by_owner_and_id(
        &self,
        owner_id: OwnerId,
        id: CheckInId,
    ) -> Result<CheckIn, CheckInServiceError>;

    /// Identity-less lookup used by public verification.
    async fn get_by_id(&self, id: CheckInId) -> Result<CheckIn, CheckInServiceError>;

    /// Conditional write: applies `transition` only if the current status equals
    /// `expected`, otherwise fails with `StatusConflict` and changes nothing.
    /// Leaving `scheduled` removes the record from the deadline index.
    async fn transition(
        &self,
        id: CheckInId,
        expected: CheckInStatus,
        transition: &Transition,
    ) -> Result<CheckIn, CheckInServiceError>;

    /// Scheduled records with `escalation_deadline <= cutoff`, oldest deadline first.
    /// Only a failed index query is an error; an undecodable record lands in
    /// `unreadable`.
    async fn list_overdue(
        &self,
        cutoff: DateTime<Utc>,
        limit: u64,
    ) -> Result<OverdueBatch, CheckInServiceError>;
}

/// Repository for an owner's saved emergency contacts.
pub trait ContactRepository: Send + Sync {
    async fn create(&self, contact: &Contact) -> Result<(), CheckInServiceError>;

    async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Contact>, CheckInServiceError>;

    /// Contacts among `ids` that belong to `owner_id`. Unknown ids are omitted.
    async fn find_by_owner_and_ids(
        &self,
        owner_id: OwnerId,
        ids: &[ContactId],
    ) -> Result<Vec<Contact>, CheckInServiceError>;
}

/// Port for the SMS/email gateway. Fire-and-forget: `Ok` means the gateway
/// accepted the message, nothing more.
pub trait MessagingTransport: Send + Sync {
    async fn send_sms(&self, phone: &str, text: &str) -> Result<(), DeliveryError>;

    async fn send_email(&self, email: &str, subject: &str, body: &str)
    -> Result<(), DeliveryError>;
}
