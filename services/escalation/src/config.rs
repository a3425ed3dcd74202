use std::time::Duration;

use crate::domain::types::DEFAULT_SCAN_BATCH_LIMIT;

/// Escalation service configuration loaded from environment variables.
#[derive(Debug)]
pub struct EscalationConfig {
    /// PostgreSQL connection URL. When unset the service runs on the in-memory store.
    pub database_url: Option<String>,
    /// TCP port for the HTTP server (default 3120). Env var: `ESCALATION_PORT`.
    pub escalation_port: u16,
    /// HMAC key for verification-link tokens. Env var: `DELIVERY_TOKEN_SECRET`.
    pub delivery_token_secret: String,
    /// Base URL used when building verification links.
    pub public_base_url: String,
    pub sms_webhook_url: Option<String>,
    pub email_webhook_url: Option<String>,
    /// Bearer token sent to the messaging gateway.
    pub messaging_api_key: Option<String>,
    /// In-process sweep cadence (default 300s). Zero leaves sweeps to an external trigger.
    pub scan_interval: Duration,
    pub scan_batch_limit: u64,
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl EscalationConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: optional("DATABASE_URL"),
            escalation_port: std::env::var("ESCALATION_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3120),
            delivery_token_secret: std::env::var("DELIVERY_TOKEN_SECRET")
                .expect("DELIVERY_TOKEN_SECRET"),
            public_base_url: optional("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:3120".to_owned()),
            sms_webhook_url: optional("SMS_WEBHOOK_URL"),
            email_webhook_url: optional("EMAIL_WEBHOOK_URL"),
            messaging_api_key: optional("MESSAGING_API_KEY"),
            scan_interval: Duration::from_secs(
                std::env::var("SCAN_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(300),
            ),
            scan_batch_limit: std::env::var("SCAN_BATCH_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SCAN_BATCH_LIMIT),
        }
    }

    /// Database URL for tools that only work against the shared store, such as
    /// the one-shot sweep.
    pub fn require_database_url(&self) -> anyhow::Result<&str> {
        match self.database_url.as_deref() {
            Some(url) => Ok(url),
            None => anyhow::bail!("DATABASE_URL must be set to sweep the shared store"),
        }
    }
}
