use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use checkin_domain::code::VerificationCode;
use checkin_domain::id::{CheckInId, ContactId, OwnerId};
use checkin_domain::status::CheckInStatus;

use checkin_escalation::domain::repository::{CheckInStore, ContactRepository, MessagingTransport};
use checkin_escalation::domain::types::{
    CheckIn, Contact, ContactEntry, InlineContact, OverdueBatch, Transition,
};
use checkin_escalation::error::{CheckInServiceError, DeliveryError};
use checkin_escalation::infra::memory::MemoryStore;
use checkin_escalation::usecase::dispatch::NotificationDispatcher;
use checkin_escalation::usecase::scan::EscalationScanner;

// ── RecordingTransport ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Sms { to: String, text: String },
    Email { to: String, subject: String },
}

/// Records every send; addresses listed in `failing` are rejected by the "gateway".
#[derive(Clone, Default)]
pub struct RecordingTransport {
    pub sent: Arc<Mutex<Vec<Sent>>>,
    pub failing: Arc<HashSet<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(addresses: &[&str]) -> Self {
        Self {
            sent: Arc::default(),
            failing: Arc::new(addresses.iter().map(|a| (*a).to_owned()).collect()),
        }
    }

    /// Returns a shared handle to the delivered messages for post-execution inspection.
    pub fn sent_handle(&self) -> Arc<Mutex<Vec<Sent>>> {
        Arc::clone(&self.sent)
    }
}

impl MessagingTransport for RecordingTransport {
    async fn send_sms(&self, phone: &str, text: &str) -> Result<(), DeliveryError> {
        if self.failing.contains(phone) {
            return Err(DeliveryError::Rejected(502));
        }
        self.sent.lock().unwrap().push(Sent::Sms {
            to: phone.to_owned(),
            text: text.to_owned(),
        });
        Ok(())
    }

    async fn send_email(
        &self,
        email: &str,
        subject: &str,
        _body: &str,
    ) -> Result<(), DeliveryError> {
        if self.failing.contains(email) {
            return Err(DeliveryError::Transport("connection refused".to_owned()));
        }
        self.sent.lock().unwrap().push(Sent::Email {
            to: email.to_owned(),
            subject: subject.to_owned(),
        });
        Ok(())
    }
}

// ── UnavailableContactRepo ───────────────────────────────────────────────────

/// Contact storage that is down.
pub struct UnavailableContactRepo;

impl ContactRepository for UnavailableContactRepo {
    async fn create(&self, _contact: &Contact) -> Result<(), CheckInServiceError> {
        Err(anyhow::anyhow!("contacts unavailable").into())
    }

    async fn list_by_owner(&self, _owner_id: OwnerId) -> Result<Vec<Contact>, CheckInServiceError> {
        Err(anyhow::anyhow!("contacts unavailable").into())
    }

    async fn find_by_owner_and_ids(
        &self,
        _owner_id: OwnerId,
        _ids: &[ContactId],
    ) -> Result<Vec<Contact>, CheckInServiceError> {
        Err(anyhow::anyhow!("contacts unavailable").into())
    }
}

// ── CorruptRowsStore ─────────────────────────────────────────────────────────

/// Memory store whose listed records come back from the index as undecodable.
#[derive(Clone)]
pub struct CorruptRowsStore {
    pub inner: MemoryStore,
    pub corrupt: Arc<HashSet<CheckInId>>,
}

impl CheckInStore for CorruptRowsStore {
    async fn create(&self, check_in: &CheckIn) -> Result<(), CheckInServiceError> {
        CheckInStore::create(&self.inner, check_in).await
    }

    async fn get_by_owner_and_id(
        &self,
        owner_id: OwnerId,
        id: CheckInId,
    ) -> Result<CheckIn, CheckInServiceError> {
        self.inner.get_by_owner_and_id(owner_id, id).await
    }

    async fn get_by_id(&self, id: CheckInId) -> Result<CheckIn, CheckInServiceError> {
        self.inner.get_by_id(id).await
    }

    async fn transition(
        &self,
        id: CheckInId,
        expected: CheckInStatus,
        transition: &Transition,
    ) -> Result<CheckIn, CheckInServiceError> {
        self.inner.transition(id, expected, transition).await
    }

    async fn list_overdue(
        &self,
        cutoff: DateTime<Utc>,
        limit: u64,
    ) -> Result<OverdueBatch, CheckInServiceError> {
        let batch = self.inner.list_overdue(cutoff, limit).await?;
        let (unreadable, check_ins): (Vec<CheckIn>, Vec<CheckIn>) = batch
            .check_ins
            .into_iter()
            .partition(|c| self.corrupt.contains(&c.id));
        Ok(OverdueBatch {
            check_ins,
            unreadable: unreadable.into_iter().map(|c| c.id).collect(),
        })
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub const CODE: &str = "4821";

pub fn inline(name: &str, phone: Option<&str>, email: Option<&str>) -> ContactEntry {
    ContactEntry::Inline(InlineContact {
        name: name.to_owned(),
        phone: phone.map(str::to_owned),
        email: email.map(str::to_owned),
    })
}

/// A scheduled check-in created at `created` with the given deadline.
pub fn check_in_at(
    owner_id: OwnerId,
    created: DateTime<Utc>,
    deadline: DateTime<Utc>,
    contacts: Vec<ContactEntry>,
) -> CheckIn {
    CheckIn {
        id: CheckInId::generate(),
        owner_id,
        owner_name: "Dana".to_owned(),
        title: "Solo trail run".to_owned(),
        scheduled_time: created,
        escalation_deadline: deadline,
        status: CheckInStatus::Scheduled,
        verification_code: VerificationCode::parse(CODE).unwrap(),
        contacts,
        created_at: created,
        updated_at: created,
        acknowledged_at: None,
        escalated_at: None,
    }
}

/// A check-in whose deadline is one hour after `t`, with one SMS contact.
pub fn hour_long_check_in(t: DateTime<Utc>) -> CheckIn {
    check_in_at(
        OwnerId::generate(),
        t,
        t + Duration::seconds(3600),
        vec![inline("Sam", Some("+15550100"), None)],
    )
}

pub async fn store_with(check_ins: &[CheckIn]) -> MemoryStore {
    let store = MemoryStore::new();
    for c in check_ins {
        CheckInStore::create(&store, c).await.unwrap();
    }
    store
}

pub fn scanner(
    store: &MemoryStore,
    transport: RecordingTransport,
) -> EscalationScanner<MemoryStore, MemoryStore, RecordingTransport> {
    EscalationScanner {
        check_ins: store.clone(),
        contacts: store.clone(),
        dispatcher: NotificationDispatcher { transport },
        batch_limit: 500,
    }
}
