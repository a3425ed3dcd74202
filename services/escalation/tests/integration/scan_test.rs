use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};

use checkin_domain::id::OwnerId;
use checkin_domain::status::CheckInStatus;

use checkin_escalation::domain::repository::{CheckInStore, ContactRepository};
use checkin_escalation::domain::types::{Contact, ContactEntry};
use checkin_escalation::usecase::dispatch::{ChannelOutcome, NotificationDispatcher};
use checkin_escalation::usecase::scan::EscalationScanner;

use crate::helpers::{
    CorruptRowsStore, RecordingTransport, Sent, UnavailableContactRepo, check_in_at,
    hour_long_check_in, inline, scanner, store_with,
};

#[tokio::test]
async fn should_escalate_overdue_and_leave_future_check_ins_alone() {
    let t = Utc::now();
    let overdue = hour_long_check_in(t - Duration::hours(2));
    let future = hour_long_check_in(t);
    let store = store_with(&[overdue.clone(), future.clone()]).await;

    let transport = RecordingTransport::new();
    let sent = transport.sent_handle();
    let summary = scanner(&store, transport).run_once(t).await.unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.escalated, 1);
    assert_eq!(summary.escalations[0].check_in.id, overdue.id);
    assert_eq!(summary.escalations[0].check_in.escalated_at, Some(t));
    assert_eq!(sent.lock().unwrap().len(), 1);

    let stored = store.get_by_id(future.id).await.unwrap();
    assert_eq!(stored.status, CheckInStatus::Scheduled);
    assert_eq!(store.scheduled_len(), 1);
}

#[tokio::test]
async fn should_not_escalate_twice_when_rerun_at_same_instant() {
    let t = Utc::now();
    let store = store_with(&[
        hour_long_check_in(t - Duration::hours(3)),
        hour_long_check_in(t - Duration::hours(2)),
    ])
    .await;
    let transport = RecordingTransport::new();
    let sent = transport.sent_handle();
    let scanner = scanner(&store, transport);

    let first = scanner.run_once(t).await.unwrap();
    let second = scanner.run_once(t).await.unwrap();

    assert_eq!(first.escalated, 2);
    assert_eq!(second.processed, 0);
    assert_eq!(second.escalated, 0);
    assert_eq!(sent.lock().unwrap().len(), 2, "no alert may be sent twice");
}

#[tokio::test]
async fn should_escalate_oldest_deadline_first_within_batch_limit() {
    let t = Utc::now();
    let oldest = hour_long_check_in(t - Duration::hours(5));
    let middle = hour_long_check_in(t - Duration::hours(4));
    let newest = hour_long_check_in(t - Duration::hours(3));
    let store = store_with(&[newest.clone(), oldest.clone(), middle.clone()]).await;

    let mut scanner = scanner(&store, RecordingTransport::new());
    scanner.batch_limit = 2;
    let summary = scanner.run_once(t).await.unwrap();

    let ids: Vec<_> = summary.escalations.iter().map(|e| e.check_in.id).collect();
    assert_eq!(ids, vec![oldest.id, middle.id]);
    // The remainder is picked up by the next sweep.
    let next = scanner.run_once(t).await.unwrap();
    assert_eq!(next.escalations[0].check_in.id, newest.id);
}

#[tokio::test]
async fn should_isolate_failed_channel_and_report_partial_delivery() {
    let t = Utc::now();
    let check_in = check_in_at(
        OwnerId::generate(),
        t - Duration::hours(2),
        t - Duration::hours(1),
        vec![
            inline("Sam", Some("+15550100"), None),
            inline("Lee", Some("+15550101"), None),
            inline("Kim", Some("+15550102"), None),
        ],
    );
    let store = store_with(&[check_in]).await;

    let summary = scanner(&store, RecordingTransport::failing_for(&["+15550101"]))
        .run_once(t)
        .await
        .unwrap();

    assert_eq!(summary.escalated, 1);
    assert_eq!(summary.failed, 0, "a failed channel is not a failed escalation");
    assert_eq!(summary.notifications_sent, 2);
    assert_eq!(summary.notifications_failed, 1);

    let contacts = &summary.escalations[0].dispatch.contacts;
    assert_eq!(contacts[0].sms, Some(ChannelOutcome::Delivered));
    assert!(matches!(contacts[1].sms, Some(ChannelOutcome::Failed { .. })));
    assert_eq!(contacts[2].sms, Some(ChannelOutcome::Delivered));
}

#[tokio::test]
async fn should_alert_saved_contacts_over_every_channel() {
    let t = Utc::now();
    let owner_id = OwnerId::generate();
    let saved = Contact {
        id: checkin_domain::id::ContactId::generate(),
        owner_id,
        name: "Robin".to_owned(),
        phone: Some("+15550110".to_owned()),
        email: Some("robin@example.com".to_owned()),
        created_at: t,
    };
    let check_in = check_in_at(
        owner_id,
        t - Duration::hours(2),
        t - Duration::minutes(1),
        vec![ContactEntry::Saved {
            contact_id: saved.id,
        }],
    );
    let store = store_with(&[check_in]).await;
    ContactRepository::create(&store, &saved).await.unwrap();

    let transport = RecordingTransport::new();
    let sent = transport.sent_handle();
    let summary = scanner(&store, transport).run_once(t).await.unwrap();

    assert_eq!(summary.notifications_sent, 2);
    let sent = sent.lock().unwrap();
    assert!(sent.iter().any(|s| matches!(s, Sent::Sms { to, text }
        if to == "+15550110" && text.contains("Solo trail run"))));
    assert!(sent.iter().any(|s| matches!(s, Sent::Email { to, subject }
        if to == "robin@example.com" && subject.contains("Dana"))));
}

#[tokio::test]
async fn should_leave_check_in_scheduled_when_contacts_cannot_be_resolved() {
    let t = Utc::now();
    let check_in = check_in_at(
        OwnerId::generate(),
        t - Duration::hours(2),
        t - Duration::hours(1),
        vec![ContactEntry::Saved {
            contact_id: checkin_domain::id::ContactId::generate(),
        }],
    );
    let store = store_with(&[check_in.clone()]).await;

    let scanner = EscalationScanner {
        check_ins: store.clone(),
        contacts: UnavailableContactRepo,
        dispatcher: NotificationDispatcher {
            transport: RecordingTransport::new(),
        },
        batch_limit: 500,
    };
    let summary = scanner.run_once(t).await.unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.escalated, 0);
    let stored = store.get_by_id(check_in.id).await.unwrap();
    assert_eq!(stored.status, CheckInStatus::Scheduled);
    assert_eq!(store.scheduled_len(), 1, "retried by the next sweep");
}

#[tokio::test]
async fn should_escalate_exactly_at_the_deadline() {
    let t = Utc::now();
    let check_in = hour_long_check_in(t);
    let store = store_with(&[check_in.clone()]).await;
    let scanner = scanner(&store, RecordingTransport::new());

    let early = scanner
        .run_once(t + Duration::seconds(3599))
        .await
        .unwrap();
    assert_eq!(early.processed, 0);

    let on_time = scanner
        .run_once(t + Duration::seconds(3600))
        .await
        .unwrap();
    assert_eq!(on_time.escalated, 1);
}

#[tokio::test]
async fn should_count_undecodable_record_and_escalate_the_rest() {
    let t = Utc::now();
    let corrupt = hour_long_check_in(t - Duration::hours(3));
    let healthy = hour_long_check_in(t - Duration::hours(2));
    let store = store_with(&[corrupt.clone(), healthy.clone()]).await;
    let transport = RecordingTransport::new();
    let sent = transport.sent_handle();
    let scanner = EscalationScanner {
        check_ins: CorruptRowsStore {
            inner: store.clone(),
            corrupt: Arc::new(HashSet::from([corrupt.id])),
        },
        contacts: store.clone(),
        dispatcher: NotificationDispatcher { transport },
        batch_limit: 500,
    };

    let summary = scanner.run_once(t).await.unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.escalated, 1);
    assert_eq!(summary.escalations[0].check_in.id, healthy.id);
    assert_eq!(sent.lock().unwrap().len(), 1);
    assert_eq!(
        store.get_by_id(corrupt.id).await.unwrap().status,
        CheckInStatus::Scheduled
    );
}
