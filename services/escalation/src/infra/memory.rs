use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use checkin_domain::id::{CheckInId, ContactId, OwnerId};
use checkin_domain::status::CheckInStatus;

use crate::domain::repository::{CheckInStore, ContactRepository};
use crate::domain::types::{CheckIn, Contact, OverdueBatch, Transition};
use crate::error::CheckInServiceError;
use crate::infra::index::ScheduledIndex;

#[derive(Debug, Default)]
struct MemoryState {
    check_ins: HashMap<CheckInId, CheckIn>,
    scheduled: ScheduledIndex,
    contacts: HashMap<ContactId, Contact>,
}

/// Process-local store used when no database is configured, and by tests.
///
/// One mutex guards records and index together, so a conditional write and
/// its index update are observed atomically. The lock is never held across
/// an `.await`.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        // A panic while holding the lock cannot leave a half-applied write:
        // every mutation below completes before the guard drops.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of check-ins currently in the deadline index.
    pub fn scheduled_len(&self) -> usize {
        self.state().scheduled.len()
    }
}

impl CheckInStore for MemoryStore {
    async fn create(&self, check_in: &CheckIn) -> Result<(), CheckInServiceError> {
        check_in.ensure_insertable()?;
        let mut state = self.state();
        if state.check_ins.contains_key(&check_in.id) {
            return Err(CheckInServiceError::CheckInAlreadyExists);
        }
        state
            .scheduled
            .insert(check_in.id, check_in.escalation_deadline);
        state.check_ins.insert(check_in.id, check_in.clone());
        Ok(())
    }

    async fn get_by_owner_and_id(
        &self,
        owner_id: OwnerId,
        id: CheckInId,
    ) -> Result<CheckIn, CheckInServiceError> {
        self.state()
            .check_ins
            .get(&id)
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .ok_or(CheckInServiceError::CheckInNotFound)
    }

    async fn get_by_id(&self, id: CheckInId) -> Result<CheckIn, CheckInServiceError> {
        self.state()
            .check_ins
            .get(&id)
            .cloned()
            .ok_or(CheckInServiceError::CheckInNotFound)
    }

    async fn transition(
        &self,
        id: CheckInId,
        expected: CheckInStatus,
        transition: &Transition,
    ) -> Result<CheckIn, CheckInServiceError> {
        transition.ensure_valid_from(expected)?;

        let mut state = self.state();
        let check_in = state
            .check_ins
            .get_mut(&id)
            .ok_or(CheckInServiceError::CheckInNotFound)?;
        if check_in.status != expected {
            return Err(CheckInServiceError::StatusConflict {
                current: check_in.status,
            });
        }
        transition.apply(check_in);
        let updated = check_in.clone();
        if expected == CheckInStatus::Scheduled {
            state.scheduled.remove(id);
        }
        Ok(updated)
    }

    async fn list_overdue(
        &self,
        cutoff: DateTime<Utc>,
        limit: u64,
    ) -> Result<OverdueBatch, CheckInServiceError> {
        let state = self.state();
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(OverdueBatch {
            check_ins: state
                .scheduled
                .overdue(cutoff, limit)
                .into_iter()
                .filter_map(|id| state.check_ins.get(&id).cloned())
                .collect(),
            unreadable: vec![],
        })
    }
}

impl ContactRepository for MemoryStore {
    async fn create(&self, contact: &Contact) -> Result<(), CheckInServiceError> {
        self.state().contacts.insert(contact.id, contact.clone());
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Contact>, CheckInServiceError> {
        let mut contacts: Vec<Contact> = self
            .state()
            .contacts
            .values()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        contacts.sort_by_key(|c| (c.created_at, c.id));
        Ok(contacts)
    }

    async fn find_by_owner_and_ids(
        &self,
        owner_id: OwnerId,
        ids: &[ContactId],
    ) -> Result<Vec<Contact>, CheckInServiceError> {
        let state = self.state();
        Ok(ids
            .iter()
            .filter_map(|id| state.contacts.get(id))
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect())
    }
}
