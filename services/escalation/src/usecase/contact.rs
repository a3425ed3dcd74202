use std::collections::{HashMap, HashSet};

use chrono::Utc;
use tracing::warn;

use checkin_domain::id::{ContactId, OwnerId};

use crate::domain::repository::ContactRepository;
use crate::domain::types::{CheckIn, Contact, ContactEntry, Recipient, normalize_channel};
use crate::error::CheckInServiceError;

// ── CreateContact ────────────────────────────────────────────────────────────

pub struct CreateContactInput {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

pub struct CreateContactUseCase<R: ContactRepository> {
    pub repo: R,
}

impl<R: ContactRepository> CreateContactUseCase<R> {
    pub async fn execute(
        &self,
        owner_id: OwnerId,
        input: CreateContactInput,
    ) -> Result<Contact, CheckInServiceError> {
        let name = input.name.trim().to_owned();
        if name.is_empty() {
            return Err(CheckInServiceError::MissingData);
        }
        let phone = normalize_channel(input.phone);
        let email = normalize_channel(input.email);
        if phone.is_none() && email.is_none() {
            return Err(CheckInServiceError::InvalidContact);
        }

        let contact = Contact {
            id: ContactId::generate(),
            owner_id,
            name,
            phone,
            email,
            created_at: Utc::now(),
        };
        self.repo.create(&contact).await?;
        Ok(contact)
    }
}

// ── ListContacts ─────────────────────────────────────────────────────────────

pub struct ListContactsUseCase<R: ContactRepository> {
    pub repo: R,
}

impl<R: ContactRepository> ListContactsUseCase<R> {
    pub async fn execute(&self, owner_id: OwnerId) -> Result<Vec<Contact>, CheckInServiceError> {
        self.repo.list_by_owner(owner_id).await
    }
}

// ── Recipient resolution ─────────────────────────────────────────────────────

/// Expand a check-in's contact list into recipients, in list order.
///
/// Saved references are fetched from the owner's contacts in one query and
/// deduplicated. A reference whose contact no longer exists is skipped.
pub async fn resolve_recipients<R: ContactRepository>(
    repo: &R,
    check_in: &CheckIn,
) -> Result<Vec<Recipient>, CheckInServiceError> {
    let ids = check_in.saved_contact_ids();
    let saved = if ids.is_empty() {
        Vec::new()
    } else {
        repo.find_by_owner_and_ids(check_in.owner_id, &ids).await?
    };
    let by_id: HashMap<ContactId, &Contact> = saved.iter().map(|c| (c.id, c)).collect();

    let mut seen = HashSet::new();
    let mut recipients = Vec::with_capacity(check_in.contacts.len());
    for entry in &check_in.contacts {
        match entry {
            ContactEntry::Saved { contact_id } => {
                if !seen.insert(*contact_id) {
                    continue;
                }
                match by_id.get(contact_id) {
                    Some(contact) => recipients.push(Recipient::from(*contact)),
                    None => warn!(
                        check_in_id = %check_in.id,
                        contact_id = %contact_id,
                        "referenced contact not found, skipping"
                    ),
                }
            }
            ContactEntry::Inline(contact) => recipients.push(Recipient::from(contact)),
        }
    }
    Ok(recipients)
}
