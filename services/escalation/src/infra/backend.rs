use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use checkin_domain::id::{CheckInId, ContactId, OwnerId};
use checkin_domain::status::CheckInStatus;

use crate::domain::repository::{CheckInStore, ContactRepository};
use crate::domain::types::{CheckIn, Contact, OverdueBatch, Transition};
use crate::error::CheckInServiceError;
use crate::infra::db::{DbCheckInStore, DbContactRepository};
use crate::infra::memory::MemoryStore;

/// Storage selected at startup: Postgres when `DATABASE_URL` is set,
/// otherwise a process-local store.
#[derive(Clone)]
pub enum Backend {
    Postgres(DatabaseConnection),
    Memory(MemoryStore),
}

impl Backend {
    /// Readiness probe: a round trip to Postgres, always ready in memory.
    pub async fn ping(&self) -> anyhow::Result<()> {
        match self {
            Self::Postgres(db) => db.ping().await.context("database ping failed"),
            Self::Memory(_) => Ok(()),
        }
    }

    pub fn check_in_store(&self) -> BackendCheckInStore {
        match self {
            Self::Postgres(db) => BackendCheckInStore::Postgres(DbCheckInStore { db: db.clone() }),
            Self::Memory(store) => BackendCheckInStore::Memory(store.clone()),
        }
    }

    pub fn contact_repo(&self) -> BackendContactRepository {
        match self {
            Self::Postgres(db) => {
                BackendContactRepository::Postgres(DbContactRepository { db: db.clone() })
            }
            Self::Memory(store) => BackendContactRepository::Memory(store.clone()),
        }
    }
}

#[derive(Clone)]
pub enum BackendCheckInStore {
    Postgres(DbCheckInStore),
    Memory(MemoryStore),
}

impl CheckInStore for BackendCheckInStore {
    async fn create(&self, check_in: &CheckIn) -> Result<(), CheckInServiceError> {
        match self {
            Self::Postgres(s) => s.create(check_in).await,
            Self::Memory(s) => CheckInStore::create(s, check_in).await,
        }
    }

    async fn get_by_owner_and_id(
        &self,
        owner_id: OwnerId,
        id: CheckInId,
    ) -> Result<CheckIn, CheckInServiceError> {
        match self {
            Self::Postgres(s) => s.get_by_owner_and_id(owner_id, id).await,
            Self::Memory(s) => s.get_by_owner_and_id(owner_id, id).await,
        }
    }

    async fn get_by_id(&self, id: CheckInId) -> Result<CheckIn, CheckInServiceError> {
        match self {
            Self::Postgres(s) => s.get_by_id(id).await,
            Self::Memory(s) => s.get_by_id(id).await,
        }
    }

    async fn transition(
        &self,
        id: CheckInId,
        expected: CheckInStatus,
        transition: &Transition,
    ) -> Result<CheckIn, CheckInServiceError> {
        match self {
            Self::Postgres(s) => s.transition(id, expected, transition).await,
            Self::Memory(s) => s.transition(id, expected, transition).await,
        }
    }

    async fn list_overdue(
        &self,
        cutoff: DateTime<Utc>,
        limit: u64,
    ) -> Result<OverdueBatch, CheckInServiceError> {
        match self {
            Self::Postgres(s) => s.list_overdue(cutoff, limit).await,
            Self::Memory(s) => s.list_overdue(cutoff, limit).await,
        }
    }
}

#[derive(Clone)]
pub enum BackendContactRepository {
    Postgres(DbContactRepository),
    Memory(MemoryStore),
}

impl ContactRepository for BackendContactRepository {
    async fn create(&self, contact: &Contact) -> Result<(), CheckInServiceError> {
        match self {
            Self::Postgres(r) => r.create(contact).await,
            Self::Memory(r) => ContactRepository::create(r, contact).await,
        }
    }

    async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Contact>, CheckInServiceError> {
        match self {
            Self::Postgres(r) => r.list_by_owner(owner_id).await,
            Self::Memory(r) => r.list_by_owner(owner_id).await,
        }
    }

    async fn find_by_owner_and_ids(
        &self,
        owner_id: OwnerId,
        ids: &[ContactId],
    ) -> Result<Vec<Contact>, CheckInServiceError> {
        match self {
            Self::Postgres(r) => r.find_by_owner_and_ids(owner_id, ids).await,
            Self::Memory(r) => r.find_by_owner_and_ids(owner_id, ids).await,
        }
    }
}
