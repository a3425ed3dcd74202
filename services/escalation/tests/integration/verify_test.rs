use chrono::{Duration, Utc};

use checkin_domain::id::{CheckInId, OwnerId};
use checkin_domain::status::CheckInStatus;

use checkin_escalation::domain::repository::CheckInStore;
use checkin_escalation::error::CheckInServiceError;
use checkin_escalation::usecase::checkin::CancelCheckInUseCase;
use checkin_escalation::usecase::verify::{SubmitCodeInput, VerifyCheckInUseCase, VerifyOutcome};

use crate::helpers::{CODE, RecordingTransport, hour_long_check_in, scanner, store_with};

fn submit(id: CheckInId, code: &str, now: chrono::DateTime<Utc>) -> SubmitCodeInput {
    SubmitCodeInput {
        check_in_id: id,
        code: code.to_owned(),
        owner_id: None,
        now,
    }
}

#[tokio::test]
async fn should_acknowledge_before_deadline_and_send_nothing() {
    let t = Utc::now();
    let check_in = hour_long_check_in(t);
    let store = store_with(&[check_in.clone()]).await;
    let uc = VerifyCheckInUseCase {
        check_ins: store.clone(),
    };

    let outcome = uc
        .execute(submit(check_in.id, CODE, t + Duration::seconds(3500)))
        .await
        .unwrap();
    assert!(matches!(outcome, VerifyOutcome::Acknowledged(_)));
    assert_eq!(outcome.check_in().status, CheckInStatus::Acknowledged);
    assert_eq!(
        outcome.check_in().acknowledged_at,
        Some(t + Duration::seconds(3500))
    );

    let transport = RecordingTransport::new();
    let sent = transport.sent_handle();
    let summary = scanner(&store, transport)
        .run_once(t + Duration::seconds(3600))
        .await
        .unwrap();
    assert_eq!(summary.processed, 0);
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_code_after_sweep_escalated_the_check_in() {
    let t = Utc::now();
    let check_in = hour_long_check_in(t);
    let store = store_with(&[check_in.clone()]).await;

    let transport = RecordingTransport::new();
    let sent = transport.sent_handle();
    let summary = scanner(&store, transport)
        .run_once(t + Duration::seconds(3600))
        .await
        .unwrap();
    assert_eq!(summary.escalated, 1);
    assert_eq!(sent.lock().unwrap().len(), 1);

    let uc = VerifyCheckInUseCase {
        check_ins: store.clone(),
    };
    let result = uc
        .execute(submit(check_in.id, CODE, t + Duration::seconds(3601)))
        .await;
    assert!(
        matches!(result, Err(CheckInServiceError::DeadlinePassed)),
        "expected DeadlinePassed, got {result:?}"
    );
    let stored = store.get_by_id(check_in.id).await.unwrap();
    assert_eq!(stored.status, CheckInStatus::Escalated);
}

#[tokio::test]
async fn should_reject_wrong_code_repeatedly_without_mutation() {
    let t = Utc::now();
    let check_in = hour_long_check_in(t);
    let store = store_with(&[check_in.clone()]).await;
    let uc = VerifyCheckInUseCase {
        check_ins: store.clone(),
    };

    for _ in 0..3 {
        let result = uc
            .execute(submit(check_in.id, "0000", t + Duration::seconds(10)))
            .await;
        assert!(matches!(result, Err(CheckInServiceError::InvalidCode)));
    }

    let stored = store.get_by_id(check_in.id).await.unwrap();
    assert_eq!(stored.status, CheckInStatus::Scheduled);
    assert_eq!(stored.updated_at, check_in.updated_at);
    assert_eq!(store.scheduled_len(), 1);

    // Still verifiable with the right code.
    let outcome = uc
        .execute(submit(check_in.id, CODE, t + Duration::seconds(20)))
        .await;
    assert!(matches!(outcome, Ok(VerifyOutcome::Acknowledged(_))));
}

#[tokio::test]
async fn should_reject_malformed_code_before_lookup() {
    let uc = VerifyCheckInUseCase {
        check_ins: store_with(&[]).await,
    };
    for code in ["", "48", "48210", "48a1"] {
        let result = uc
            .execute(submit(CheckInId::generate(), code, Utc::now()))
            .await;
        assert!(
            matches!(result, Err(CheckInServiceError::MalformedCode)),
            "code {code:?} should be malformed, got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_return_not_found_for_unknown_id() {
    let t = Utc::now();
    let existing = hour_long_check_in(t);
    let store = store_with(&[existing.clone()]).await;
    let uc = VerifyCheckInUseCase {
        check_ins: store.clone(),
    };

    let result = uc.execute(submit(CheckInId::generate(), CODE, t)).await;
    assert!(matches!(result, Err(CheckInServiceError::CheckInNotFound)));
    assert_eq!(
        store.get_by_id(existing.id).await.unwrap().status,
        CheckInStatus::Scheduled
    );
}

#[tokio::test]
async fn should_treat_resubmission_after_success_as_success() {
    let t = Utc::now();
    let check_in = hour_long_check_in(t);
    let store = store_with(&[check_in.clone()]).await;
    let uc = VerifyCheckInUseCase {
        check_ins: store.clone(),
    };

    uc.execute(submit(check_in.id, CODE, t)).await.unwrap();
    let again = uc
        .execute(submit(check_in.id, CODE, t + Duration::seconds(5)))
        .await
        .unwrap();
    assert!(matches!(again, VerifyOutcome::AlreadyAcknowledged(_)));
    assert_eq!(again.check_in().acknowledged_at, Some(t));
}

#[tokio::test]
async fn should_hide_cancelled_check_in_from_verification() {
    let t = Utc::now();
    let check_in = hour_long_check_in(t);
    let store = store_with(&[check_in.clone()]).await;
    CancelCheckInUseCase {
        check_ins: store.clone(),
    }
    .execute(check_in.owner_id, check_in.id)
    .await
    .unwrap();

    let result = VerifyCheckInUseCase {
        check_ins: store.clone(),
    }
    .execute(submit(check_in.id, CODE, t))
    .await;
    assert!(matches!(result, Err(CheckInServiceError::CheckInNotFound)));
}

#[tokio::test]
async fn should_reject_correct_code_once_deadline_reached_even_before_sweep() {
    let t = Utc::now();
    let check_in = hour_long_check_in(t);
    let store = store_with(&[check_in.clone()]).await;

    let result = VerifyCheckInUseCase {
        check_ins: store.clone(),
    }
    .execute(submit(check_in.id, CODE, t + Duration::seconds(3600)))
    .await;
    assert!(matches!(result, Err(CheckInServiceError::DeadlinePassed)));
    // The sweep still owns it.
    assert_eq!(store.scheduled_len(), 1);
}

#[tokio::test]
async fn should_scope_owner_verification_to_owner() {
    let t = Utc::now();
    let check_in = hour_long_check_in(t);
    let store = store_with(&[check_in.clone()]).await;
    let uc = VerifyCheckInUseCase {
        check_ins: store.clone(),
    };

    let stranger = uc
        .execute(SubmitCodeInput {
            owner_id: Some(OwnerId::generate()),
            ..submit(check_in.id, CODE, t)
        })
        .await;
    assert!(matches!(stranger, Err(CheckInServiceError::CheckInNotFound)));

    let owner = uc
        .execute(SubmitCodeInput {
            owner_id: Some(check_in.owner_id),
            ..submit(check_in.id, CODE, t)
        })
        .await;
    assert!(matches!(owner, Ok(VerifyOutcome::Acknowledged(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_let_exactly_one_of_acknowledge_and_escalate_win() {
    for _ in 0..50 {
        let t = Utc::now();
        let check_in = hour_long_check_in(t);
        let store = store_with(&[check_in.clone()]).await;

        let verify = {
            let uc = VerifyCheckInUseCase {
                check_ins: store.clone(),
            };
            let id = check_in.id;
            tokio::spawn(async move {
                uc.execute(submit(id, CODE, t + Duration::seconds(3599)))
                    .await
            })
        };
        let sweep = {
            let scanner = scanner(&store, RecordingTransport::new());
            tokio::spawn(async move { scanner.run_once(t + Duration::seconds(3600)).await })
        };

        let verified = verify.await.unwrap();
        let summary = sweep.await.unwrap().unwrap();
        let stored = store.get_by_id(check_in.id).await.unwrap();

        match verified {
            Ok(VerifyOutcome::Acknowledged(_)) => {
                assert_eq!(summary.escalated, 0);
                assert_eq!(stored.status, CheckInStatus::Acknowledged);
            }
            Err(CheckInServiceError::DeadlinePassed) => {
                assert_eq!(summary.escalated, 1);
                assert_eq!(stored.status, CheckInStatus::Escalated);
            }
            other => panic!("unexpected verification result: {other:?}"),
        }
        assert_eq!(store.scheduled_len(), 0);
    }
}
