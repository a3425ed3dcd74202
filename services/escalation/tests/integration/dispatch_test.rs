use chrono::{Duration, Utc};

use checkin_domain::id::{ContactId, OwnerId};

use checkin_escalation::domain::types::Recipient;
use checkin_escalation::usecase::dispatch::{ChannelOutcome, NotificationDispatcher};

use crate::helpers::{RecordingTransport, Sent, check_in_at};

fn recipient(name: &str, phone: Option<&str>, email: Option<&str>) -> Recipient {
    Recipient {
        contact_id: Some(ContactId::generate()),
        name: name.to_owned(),
        phone: phone.map(str::to_owned),
        email: email.map(str::to_owned),
    }
}

#[tokio::test]
async fn should_try_each_channel_independently() {
    let t = Utc::now();
    let check_in = check_in_at(OwnerId::generate(), t, t + Duration::hours(1), vec![]);
    let transport = RecordingTransport::failing_for(&["sam@example.com"]);
    let sent = transport.sent_handle();
    let dispatcher = NotificationDispatcher { transport };

    let report = dispatcher
        .notify(
            &check_in,
            &[recipient("Sam", Some("+15550100"), Some("sam@example.com"))],
        )
        .await;

    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 1);
    let delivery = &report.contacts[0];
    assert_eq!(delivery.sms, Some(ChannelOutcome::Delivered));
    match &delivery.email {
        Some(ChannelOutcome::Failed { error }) => assert!(error.contains("connection refused")),
        other => panic!("expected failed email, got {other:?}"),
    }
    assert_eq!(sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_skip_channels_a_contact_does_not_have() {
    let t = Utc::now();
    let check_in = check_in_at(OwnerId::generate(), t, t + Duration::hours(1), vec![]);
    let transport = RecordingTransport::new();
    let sent = transport.sent_handle();
    let dispatcher = NotificationDispatcher { transport };

    let report = dispatcher
        .notify(&check_in, &[recipient("Lee", None, Some("lee@example.com"))])
        .await;

    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.contacts[0].sms, None);
    assert_eq!(
        *sent.lock().unwrap(),
        vec![Sent::Email {
            to: "lee@example.com".to_owned(),
            subject: "Safety alert: Dana missed a check-in".to_owned(),
        }]
    );
}

#[tokio::test]
async fn should_report_contacts_in_recipient_order() {
    let t = Utc::now();
    let check_in = check_in_at(OwnerId::generate(), t, t + Duration::hours(1), vec![]);
    let dispatcher = NotificationDispatcher {
        transport: RecordingTransport::failing_for(&["+15550101"]),
    };
    let recipients = [
        recipient("A", Some("+15550100"), None),
        recipient("B", Some("+15550101"), None),
        recipient("C", Some("+15550102"), None),
    ];

    let report = dispatcher.notify(&check_in, &recipients).await;

    let names: Vec<_> = report.contacts.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
    assert_eq!(report.contacts[1].contact_id, recipients[1].contact_id);
    assert_eq!((report.sent, report.failed), (2, 1));
}

#[tokio::test]
async fn should_return_empty_report_without_recipients() {
    let t = Utc::now();
    let check_in = check_in_at(OwnerId::generate(), t, t + Duration::hours(1), vec![]);
    let dispatcher = NotificationDispatcher {
        transport: RecordingTransport::new(),
    };
    let report = dispatcher.notify(&check_in, &[]).await;
    assert_eq!((report.sent, report.failed), (0, 0));
    assert!(report.contacts.is_empty());
}
