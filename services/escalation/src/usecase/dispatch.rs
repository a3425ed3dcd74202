use futures::future::join_all;
use tracing::warn;

use checkin_domain::id::{CheckInId, ContactId};

use crate::domain::message::AlertMessage;
use crate::domain::repository::MessagingTransport;
use crate::domain::types::{CheckIn, Recipient};
use crate::error::DeliveryError;

/// Result of one channel attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    Delivered,
    Failed { error: String },
}

impl ChannelOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Per-contact detail. A channel is `None` when the contact has no address for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDelivery {
    pub contact_id: Option<ContactId>,
    pub name: String,
    pub sms: Option<ChannelOutcome>,
    pub email: Option<ChannelOutcome>,
}

impl ContactDelivery {
    fn outcomes(&self) -> impl Iterator<Item = &ChannelOutcome> {
        self.sms.iter().chain(self.email.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
    pub contacts: Vec<ContactDelivery>,
}

/// Fans an alert out to every recipient over every channel they have.
///
/// Sends run concurrently and independently. A failed channel is recorded in
/// the report and logged; it never aborts the other sends and never surfaces
/// as an error.
pub struct NotificationDispatcher<T: MessagingTransport> {
    pub transport: T,
}

impl<T: MessagingTransport> NotificationDispatcher<T> {
    pub async fn notify(&self, check_in: &CheckIn, recipients: &[Recipient]) -> DispatchReport {
        let message = AlertMessage::for_check_in(check_in);
        let deliveries = join_all(
            recipients
                .iter()
                .map(|recipient| self.deliver(check_in.id, recipient, &message)),
        )
        .await;

        let mut report = DispatchReport::default();
        for delivery in deliveries {
            for outcome in delivery.outcomes() {
                if outcome.is_delivered() {
                    report.sent += 1;
                } else {
                    report.failed += 1;
                }
            }
            report.contacts.push(delivery);
        }
        report
    }

    async fn deliver(
        &self,
        check_in_id: CheckInId,
        recipient: &Recipient,
        message: &AlertMessage,
    ) -> ContactDelivery {
        let sms = async {
            let phone = recipient.phone.as_deref()?;
            let result = self.transport.send_sms(phone, &message.sms_text).await;
            Some(record(check_in_id, "sms", recipient, result))
        };
        let email = async {
            let address = recipient.email.as_deref()?;
            let result = self
                .transport
                .send_email(address, &message.email_subject, &message.email_body)
                .await;
            Some(record(check_in_id, "email", recipient, result))
        };
        let (sms, email) = futures::join!(sms, email);

        ContactDelivery {
            contact_id: recipient.contact_id,
            name: recipient.name.clone(),
            sms,
            email,
        }
    }
}

fn record(
    check_in_id: CheckInId,
    channel: &'static str,
    recipient: &Recipient,
    result: Result<(), DeliveryError>,
) -> ChannelOutcome {
    match result {
        Ok(()) => ChannelOutcome::Delivered,
        Err(e) => {
            warn!(
                check_in_id = %check_in_id,
                channel,
                contact = %recipient.name,
                error = %e,
                "alert delivery failed"
            );
            ChannelOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}
