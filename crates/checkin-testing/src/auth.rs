//! Mock identity helpers for router tests.
//!
//! Services behind the gateway receive an `x-checkin-user-id` header injected
//! by the gateway. In tests, `MockAuth` produces that header directly so no real
//! gateway is needed.

use http::{HeaderName, HeaderValue};
use uuid::Uuid;

use checkin_auth_types::OWNER_ID_HEADER;
use checkin_domain::id::OwnerId;

/// Configurable identity injected into test requests.
#[derive(Debug, Clone, Copy)]
pub struct MockAuth {
    pub owner_id: OwnerId,
}

impl MockAuth {
    pub fn new(owner_id: OwnerId) -> Self {
        Self { owner_id }
    }

    /// A fresh random owner.
    pub fn random() -> Self {
        Self::new(OwnerId(Uuid::new_v4()))
    }

    /// The header pair as if the gateway injected it.
    pub fn header(&self) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static(OWNER_ID_HEADER),
            HeaderValue::from_str(&self.owner_id.to_string()).unwrap(),
        )
    }
}
