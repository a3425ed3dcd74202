use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use checkin_domain::id::{CheckInId, OwnerId};

use crate::domain::repository::CheckInStore;
use crate::domain::types::CheckIn;
use crate::error::CheckInServiceError;

type HmacSha256 = Hmac<Sha256>;

/// Keyed one-way derivation of the token embedded in verification links.
///
/// The input is `(id, code, scheduled_time)`, all immutable after creation,
/// so every resend yields the same token.
#[derive(Clone)]
pub struct DeliveryTokenSigner {
    key: Arc<[u8]>,
}

impl DeliveryTokenSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: Arc::from(secret.as_ref()),
        }
    }

    pub fn token(&self, check_in: &CheckIn) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC can take keys of any size");
        mac.update(check_in.id.to_string().as_bytes());
        mac.update(b":");
        mac.update(check_in.verification_code.as_str().as_bytes());
        mac.update(b":");
        mac.update(check_in.scheduled_time.timestamp_millis().to_string().as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    pub fn verification_link(&self, base_url: &str, check_in: &CheckIn) -> VerificationLink {
        let token = self.token(check_in);
        let url = format!(
            "{}/verify/{}?token={}",
            base_url.trim_end_matches('/'),
            check_in.id,
            token
        );
        VerificationLink { token, url }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationLink {
    pub token: String,
    pub url: String,
}

// ── GetVerificationLink ──────────────────────────────────────────────────────

pub struct GetVerificationLinkUseCase<S: CheckInStore> {
    pub check_ins: S,
    pub signer: DeliveryTokenSigner,
    pub base_url: String,
}

impl<S: CheckInStore> GetVerificationLinkUseCase<S> {
    pub async fn execute(
        &self,
        owner_id: OwnerId,
        id: CheckInId,
    ) -> Result<VerificationLink, CheckInServiceError> {
        let check_in = self.check_ins.get_by_owner_and_id(owner_id, id).await?;
        Ok(self.signer.verification_link(&self.base_url, &check_in))
    }
}
