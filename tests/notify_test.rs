use httpmock::prelude::*;
use serde_json::json;
use skingen::notify::{ReminderNotifier, ReminderOutcome};
use skingen::{RoutineResult, SkinGenError};

#[tokio::test]
async fn posts_email_and_routine() {
    let server = MockServer::start_async().await;
    let hook = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/hooks/catch/1/2")
                .json_body(json!({ "email": "ana@example.com", "routine": "Morning: ..." }));
            then.status(200);
        })
        .await;

    let notifier = ReminderNotifier::new(server.url("/hooks/catch/1/2"));
    let outcome = notifier.notify(Some(" ana@example.com "), &RoutineResult::new("Morning: ...")).await;
    hook.assert_async().await;
    assert!(outcome.is_registered());
}

#[tokio::test]
async fn blank_email_sends_nothing() {
    let server = MockServer::start_async().await;
    let hook = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200);
        })
        .await;

    let notifier = ReminderNotifier::new(server.url("/hook"));
    let routine = RoutineResult::new("r");
    assert!(matches!(notifier.notify(None, &routine).await, ReminderOutcome::Skipped));
    assert!(matches!(notifier.notify(Some("  "), &routine).await, ReminderOutcome::Skipped));
    assert_eq!(hook.hits_async().await, 0);
}

#[tokio::test]
async fn only_http_200_counts_as_success() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/hook");
            then.status(201);
        })
        .await;

    let notifier = ReminderNotifier::new(server.url("/hook"));
    let outcome = notifier.notify(Some("a@b.c"), &RoutineResult::new("r")).await;
    assert!(matches!(outcome, ReminderOutcome::Failed(SkinGenError::Notification(_))));
}

#[tokio::test]
async fn transport_failure_is_a_soft_failure() {
    let notifier = ReminderNotifier::new("http://127.0.0.1:1/hook");
    let outcome = notifier.notify(Some("a@b.c"), &RoutineResult::new("r")).await;
    assert!(matches!(outcome, ReminderOutcome::Failed(SkinGenError::Notification(_))));
}
