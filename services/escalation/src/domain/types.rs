use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use checkin_domain::code::VerificationCode;
use checkin_domain::id::{CheckInId, ContactId, OwnerId};
use checkin_domain::status::CheckInStatus;

use crate::error::CheckInServiceError;

/// A promise to confirm safety before `escalation_deadline`.
#[derive(Debug, Clone)]
pub struct CheckIn {
    pub id: CheckInId,
    pub owner_id: OwnerId,
    /// Display name used in alert messages.
    pub owner_name: String,
    pub title: String,
    pub scheduled_time: DateTime<Utc>,
    /// Immutable once set. Not validated against `scheduled_time`.
    pub escalation_deadline: DateTime<Utc>,
    pub status: CheckInStatus,
    pub verification_code: VerificationCode,
    pub contacts: Vec<ContactEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub escalated_at: Option<DateTime<Utc>>,
}

impl CheckIn {
    /// Scheduled and at or past its deadline.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == CheckInStatus::Scheduled && self.escalation_deadline <= now
    }

    /// New records enter the store only as `scheduled`.
    pub fn ensure_insertable(&self) -> Result<(), CheckInServiceError> {
        if self.status != CheckInStatus::Scheduled {
            return Err(CheckInServiceError::InvalidTransition {
                from: self.status,
                to: CheckInStatus::Scheduled,
            });
        }
        Ok(())
    }

    /// Referenced saved-contact ids in first-seen order, without duplicates.
    pub fn saved_contact_ids(&self) -> Vec<ContactId> {
        let mut ids: Vec<ContactId> = Vec::new();
        for entry in &self.contacts {
            if let ContactEntry::Saved { contact_id } = entry {
                if !ids.contains(contact_id) {
                    ids.push(*contact_id);
                }
            }
        }
        ids
    }
}

/// One element of a check-in's ordered contact list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContactEntry {
    /// Reference into the owner's saved contacts.
    Saved { contact_id: ContactId },
    /// Ad-hoc contact data stored on the check-in itself.
    Inline(InlineContact),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineContact {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Saved emergency contact. At least one of `phone`/`email` is present.
#[derive(Debug, Clone)]
pub struct Contact {
    pub id: ContactId,
    pub owner_id: OwnerId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A resolved contact, ready to be alerted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// `None` for inline contacts.
    pub contact_id: Option<ContactId>,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl From<&Contact> for Recipient {
    fn from(contact: &Contact) -> Self {
        Self {
            contact_id: Some(contact.id),
            name: contact.name.clone(),
            phone: contact.phone.clone(),
            email: contact.email.clone(),
        }
    }
}

impl From<&InlineContact> for Recipient {
    fn from(contact: &InlineContact) -> Self {
        Self {
            contact_id: None,
            name: contact.name.clone(),
            phone: contact.phone.clone(),
            email: contact.email.clone(),
        }
    }
}

/// Trim a channel value, treating blank input as absent.
pub fn normalize_channel(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// A status change requested through the conditional-write primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub to: CheckInStatus,
    pub at: DateTime<Utc>,
}

impl Transition {
    pub fn acknowledge(at: DateTime<Utc>) -> Self {
        Self {
            to: CheckInStatus::Acknowledged,
            at,
        }
    }

    pub fn escalate(at: DateTime<Utc>) -> Self {
        Self {
            to: CheckInStatus::Escalated,
            at,
        }
    }

    pub fn cancel(at: DateTime<Utc>) -> Self {
        Self {
            to: CheckInStatus::Cancelled,
            at,
        }
    }

    /// Reject edges the state machine does not have, before touching storage.
    pub fn ensure_valid_from(&self, expected: CheckInStatus) -> Result<(), CheckInServiceError> {
        if expected.can_transition_to(self.to) {
            Ok(())
        } else {
            Err(CheckInServiceError::InvalidTransition {
                from: expected,
                to: self.to,
            })
        }
    }

    /// Write the new status and its timestamp fields onto `check_in`.
    pub fn apply(&self, check_in: &mut CheckIn) {
        check_in.status = self.to;
        check_in.updated_at = self.at;
        match self.to {
            CheckInStatus::Acknowledged => check_in.acknowledged_at = Some(self.at),
            CheckInStatus::Escalated => check_in.escalated_at = Some(self.at),
            CheckInStatus::Scheduled | CheckInStatus::Cancelled => {}
        }
    }
}

/// One page of the deadline index.
///
/// Rows the store could not decode are reported by id so the sweep can count
/// them and carry on with the rest of the batch.
#[derive(Debug, Clone, Default)]
pub struct OverdueBatch {
    pub check_ins: Vec<CheckIn>,
    pub unreadable: Vec<CheckInId>,
}

/// Default cap on overdue check-ins handled in one sweep.
pub const DEFAULT_SCAN_BATCH_LIMIT: u64 = 500;
