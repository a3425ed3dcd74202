use std::time::Duration;

use anyhow::Context as _;
use serde::Serialize;
use tracing::info;

use crate::domain::repository::MessagingTransport;
use crate::error::DeliveryError;

const GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct SmsPayload<'a> {
    to: &'a str,
    body: &'a str,
}

#[derive(Serialize)]
struct EmailPayload<'a> {
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Sends alerts by POSTing JSON to SMS and email gateway webhooks.
///
/// Any 2xx response counts as delivered; the gateway owns retries after that.
#[derive(Clone)]
pub struct HttpMessagingTransport {
    client: reqwest::Client,
    sms_url: Option<String>,
    email_url: Option<String>,
    api_key: Option<String>,
}

impl HttpMessagingTransport {
    pub fn new(
        sms_url: Option<String>,
        email_url: Option<String>,
        api_key: Option<String>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(GATEWAY_TIMEOUT)
            .build()
            .context("build messaging HTTP client")?;
        Ok(Self {
            client,
            sms_url,
            email_url,
            api_key,
        })
    }

    async fn post<T: Serialize>(&self, url: &str, payload: &T) -> Result<(), DeliveryError> {
        let mut request = self.client.post(url).json(payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Rejected(status.as_u16()))
        }
    }
}

impl MessagingTransport for HttpMessagingTransport {
    async fn send_sms(&self, phone: &str, text: &str) -> Result<(), DeliveryError> {
        let url = self
            .sms_url
            .as_deref()
            .ok_or(DeliveryError::NotConfigured("sms"))?;
        self.post(url, &SmsPayload { to: phone, body: text }).await
    }

    async fn send_email(
        &self,
        email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        let url = self
            .email_url
            .as_deref()
            .ok_or(DeliveryError::NotConfigured("email"))?;
        self.post(
            url,
            &EmailPayload {
                to: email,
                subject,
                body,
            },
        )
        .await
    }
}

/// Development transport: logs each alert instead of sending it.
#[derive(Clone, Default)]
pub struct LogTransport;

impl MessagingTransport for LogTransport {
    async fn send_sms(&self, phone: &str, text: &str) -> Result<(), DeliveryError> {
        info!(channel = "sms", to = %phone, text = %text, "alert not sent (log transport)");
        Ok(())
    }

    async fn send_email(
        &self,
        email: &str,
        subject: &str,
        _body: &str,
    ) -> Result<(), DeliveryError> {
        info!(channel = "email", to = %email, subject = %subject, "alert not sent (log transport)");
        Ok(())
    }
}

/// Transport chosen at startup from configuration.
#[derive(Clone)]
pub enum Messaging {
    Http(HttpMessagingTransport),
    Log(LogTransport),
}

impl MessagingTransport for Messaging {
    async fn send_sms(&self, phone: &str, text: &str) -> Result<(), DeliveryError> {
        match self {
            Self::Http(t) => t.send_sms(phone, text).await,
            Self::Log(t) => t.send_sms(phone, text).await,
        }
    }

    async fn send_email(
        &self,
        email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        match self {
            Self::Http(t) => t.send_email(email, subject, body).await,
            Self::Log(t) => t.send_email(email, subject, body).await,
        }
    }
}
