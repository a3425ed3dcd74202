use anyhow::Context as _;
use sea_orm::Database;
use tracing::{info, warn};

use crate::config::EscalationConfig;
use crate::infra::backend::{Backend, BackendCheckInStore, BackendContactRepository};
use crate::infra::memory::MemoryStore;
use crate::infra::messaging::{HttpMessagingTransport, LogTransport, Messaging};
use crate::usecase::dispatch::NotificationDispatcher;
use crate::usecase::scan::EscalationScanner;
use crate::usecase::token::DeliveryTokenSigner;

/// Shared application state passed to every handler via axum `State`.
///
/// Store and transport handles are built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
    pub messaging: Messaging,
    pub signer: DeliveryTokenSigner,
    pub public_base_url: String,
    pub scan_batch_limit: u64,
}

impl AppState {
    pub async fn connect(config: &EscalationConfig) -> anyhow::Result<Self> {
        let backend = match &config.database_url {
            Some(url) => {
                let db = Database::connect(url)
                    .await
                    .context("failed to connect to database")?;
                Backend::Postgres(db)
            }
            None => {
                info!("DATABASE_URL not set, using in-memory store");
                Backend::Memory(MemoryStore::new())
            }
        };

        let messaging = if config.sms_webhook_url.is_none() && config.email_webhook_url.is_none() {
            warn!("no messaging webhook configured, alerts will only be logged and counted as sent");
            Messaging::Log(LogTransport)
        } else {
            Messaging::Http(HttpMessagingTransport::new(
                config.sms_webhook_url.clone(),
                config.email_webhook_url.clone(),
                config.messaging_api_key.clone(),
            )?)
        };

        Ok(Self {
            backend,
            messaging,
            signer: DeliveryTokenSigner::new(&config.delivery_token_secret),
            public_base_url: config.public_base_url.clone(),
            scan_batch_limit: config.scan_batch_limit,
        })
    }

    pub fn check_in_store(&self) -> BackendCheckInStore {
        self.backend.check_in_store()
    }

    pub fn contact_repo(&self) -> BackendContactRepository {
        self.backend.contact_repo()
    }

    pub fn scanner(&self) -> EscalationScanner<BackendCheckInStore, BackendContactRepository, Messaging> {
        EscalationScanner {
            check_ins: self.check_in_store(),
            contacts: self.contact_repo(),
            dispatcher: NotificationDispatcher {
                transport: self.messaging.clone(),
            },
            batch_limit: self.scan_batch_limit,
        }
    }
}
