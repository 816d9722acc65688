#![allow(clippy::unwrap_used, clippy::expect_used)]

use newsletter_gate::features::newsletter::{
    FormState, PopupVariant, SubmissionPhase, SubmissionResult,
    controller::{CHALLENGE_INCOMPLETE_MESSAGE, CHALLENGE_NOT_READY_MESSAGE},
    types::TOKEN_HEADER,
};
use serde_json::json;
use std::{cell::RefCell, rc::Rc};
use test_support::{Harness, SUCCESS_WINDOW_MS};

async fn ready_harness() -> Harness {
    let harness = Harness::builder().preloaded().build();
    harness.mount().await.expect("widget should render");
    harness
}

#[tokio::test]
async fn bypass_posts_email_without_verification_header() {
    let harness = Harness::builder().bypass_verification(true).build();

    assert_eq!(harness.mount().await, Ok(None));
    assert_eq!(harness.host.injections(), 0);

    let result = harness.controller.submit("user@example.com").await;
    assert_eq!(result, Some(SubmissionResult::Success));

    let requests = harness.backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        serde_json::to_value(&requests[0]).unwrap(),
        json!({ "email": "user@example.com" })
    );
    assert!(requests[0].headers().is_empty());
    assert_eq!(harness.sdk.renders(), 0);
}

#[tokio::test]
async fn malformed_emails_never_reach_the_backend() {
    let harness = ready_harness().await;
    harness.sdk.complete("token-ok");

    for raw in [
        "not-an-email",
        "user@",
        "user@example",
        "@example.com",
        "user name@example.com",
    ] {
        let result = harness.controller.submit(raw).await;
        assert_eq!(
            result,
            Some(SubmissionResult::ValidationFailed(
                "Please enter a valid email address".to_string()
            )),
            "{raw:?} should be rejected"
        );
        assert_eq!(harness.controller.phase(), SubmissionPhase::Idle);
    }

    let result = harness.controller.submit("   ").await;
    assert_eq!(
        result,
        Some(SubmissionResult::ValidationFailed(
            "Please enter your email address".to_string()
        ))
    );

    assert_eq!(harness.backend.calls(), 0);
    // The token is still unused, so the widget keeps it.
    assert_eq!(harness.sdk.resets(), 0);
}

#[tokio::test]
async fn missing_token_fails_verification_without_a_request() {
    let harness = ready_harness().await;

    let result = harness.controller.submit("user@example.com").await;

    assert_eq!(
        result,
        Some(SubmissionResult::VerificationFailed(
            CHALLENGE_INCOMPLETE_MESSAGE.to_string()
        ))
    );
    assert_eq!(harness.backend.calls(), 0);
    assert_eq!(harness.sdk.resets(), 1);

    let state = harness.controller.state();
    assert_eq!(state.email, "user@example.com");
    assert_eq!(state.error.as_deref(), Some(CHALLENGE_INCOMPLETE_MESSAGE));
    assert!(!state.is_submitting);
    assert_eq!(harness.controller.phase(), SubmissionPhase::Idle);
}

#[tokio::test]
async fn submit_before_the_widget_exists_fails_verification() {
    let harness = Harness::new();

    let result = harness.controller.submit("user@example.com").await;

    assert_eq!(
        result,
        Some(SubmissionResult::VerificationFailed(
            CHALLENGE_NOT_READY_MESSAGE.to_string()
        ))
    );
    assert_eq!(harness.backend.calls(), 0);
}

#[tokio::test]
async fn server_error_surfaces_message_and_resets_widget() {
    let harness = ready_harness().await;
    harness.sdk.complete("token-500");
    harness.backend.fail_next(500, "rate limited");

    let result = harness.controller.submit("user@example.com").await;

    assert_eq!(
        result,
        Some(SubmissionResult::NetworkOrServerFailed(
            "rate limited".to_string()
        ))
    );
    let requests = harness.backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].headers(),
        vec![(TOKEN_HEADER.to_string(), "token-500".to_string())]
    );

    assert_eq!(harness.sdk.resets(), 1);
    let handle = harness.controller.widget().current().unwrap();
    assert_eq!(harness.controller.widget().get_token(&handle), None);

    let state = harness.controller.state();
    assert_eq!(state.email, "user@example.com");
    assert_eq!(state.error.as_deref(), Some("rate limited"));
    assert_eq!(harness.controller.phase(), SubmissionPhase::Idle);
}

#[tokio::test]
async fn immediate_double_submit_issues_one_request() {
    let harness = ready_harness().await;
    harness.sdk.complete("token-once");
    let release = harness.backend.hold_next();

    let (first, second, ()) = tokio::join!(
        harness.controller.submit("user@example.com"),
        harness.controller.submit("user@example.com"),
        async {
            let _ = release.send(());
        }
    );

    assert_eq!(first, Some(SubmissionResult::Success));
    assert_eq!(second, None);
    assert_eq!(harness.backend.calls(), 1);
}

#[tokio::test]
async fn success_window_clears_email_then_returns_to_idle() {
    let harness = ready_harness().await;
    harness.sdk.complete("token-ok");

    let result = harness.controller.submit("  user@example.com  ").await;
    assert_eq!(result, Some(SubmissionResult::Success));
    assert_eq!(harness.backend.requests()[0].email, "user@example.com");

    let state = harness.controller.state();
    assert!(state.is_success);
    assert!(state.email.is_empty());
    assert_eq!(state.error, None);
    assert_eq!(harness.controller.phase(), SubmissionPhase::Success);
    assert_eq!(harness.sdk.resets(), 1);
    assert_eq!(harness.scheduler.pending_delays(), vec![SUCCESS_WINDOW_MS]);

    // Still inside the window: new intents are ignored.
    assert_eq!(harness.controller.submit("other@example.com").await, None);

    assert_eq!(harness.scheduler.run_all(), 1);
    assert_eq!(harness.controller.phase(), SubmissionPhase::Idle);
    assert!(!harness.controller.state().is_success);
}

#[tokio::test]
async fn two_column_popup_uses_its_shorter_window() {
    let window_ms = PopupVariant::TwoColumn.success_window_ms().unwrap();
    let harness = Harness::builder()
        .preloaded()
        .success_window_ms(window_ms)
        .build();
    harness.mount().await.unwrap();
    harness.sdk.complete("token-ok");

    harness.controller.submit("user@example.com").await;

    assert_eq!(harness.scheduler.pending_delays(), vec![3_000]);
    harness.scheduler.run_all();
    assert!(!harness.controller.state().is_success);
}

#[tokio::test]
async fn next_submission_needs_a_fresh_token() {
    let harness = ready_harness().await;
    harness.sdk.complete("token-first");
    assert_eq!(
        harness.controller.submit("user@example.com").await,
        Some(SubmissionResult::Success)
    );
    harness.scheduler.run_all();

    let reused = harness.controller.submit("user@example.com").await;
    assert_eq!(
        reused,
        Some(SubmissionResult::VerificationFailed(
            CHALLENGE_INCOMPLETE_MESSAGE.to_string()
        ))
    );

    harness.sdk.complete("token-second");
    assert_eq!(
        harness.controller.submit("user@example.com").await,
        Some(SubmissionResult::Success)
    );

    let tokens: Vec<_> = harness
        .backend
        .requests()
        .into_iter()
        .map(|request| request.verification_token)
        .collect();
    assert_eq!(
        tokens,
        vec![
            Some("token-first".to_string()),
            Some("token-second".to_string())
        ]
    );
}

#[tokio::test]
async fn editing_clears_a_validation_error() {
    let harness = ready_harness().await;

    harness.controller.submit("not-an-email").await;
    assert!(harness.controller.state().error.is_some());

    harness.controller.edit_email("user@");
    let state = harness.controller.state();
    assert_eq!(state.email, "user@");
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn observers_see_the_submitting_state() {
    let harness = ready_harness().await;
    harness.sdk.complete("token-ok");

    let seen: Rc<RefCell<Vec<FormState>>> = Rc::default();
    let sink = Rc::clone(&seen);
    harness
        .controller
        .subscribe(move |state| sink.borrow_mut().push(state.clone()));

    harness.controller.submit("user@example.com").await;

    let seen = seen.borrow();
    assert!(seen.iter().any(|state| state.is_submitting));
    let last = seen.last().unwrap();
    assert!(last.is_success);
    assert!(!last.is_submitting);
}

#[tokio::test]
async fn teardown_while_subscribing_discards_the_result() {
    let harness = ready_harness().await;
    harness.sdk.complete("token-ok");
    let release = harness.backend.hold_next();

    let notified = Rc::new(RefCell::new(0_usize));
    let counter = Rc::clone(&notified);
    harness
        .controller
        .subscribe(move |_| *counter.borrow_mut() += 1);

    let (result, ()) = tokio::join!(harness.controller.submit("user@example.com"), async {
        harness.controller.teardown();
        let _ = release.send(());
    });

    assert_eq!(result, None);
    assert_eq!(harness.backend.calls(), 1);
    assert!(harness.controller.is_torn_down());
    assert!(harness.scheduler.pending_delays().is_empty());
    assert!(harness.sdk.live_widgets().is_empty());

    let before = *notified.borrow();
    harness.controller.edit_email("late@example.com");
    assert_eq!(*notified.borrow(), before);
}

#[tokio::test]
async fn teardown_before_the_window_closes_keeps_state() {
    let harness = ready_harness().await;
    harness.sdk.complete("token-ok");
    harness.controller.submit("user@example.com").await;

    harness.controller.teardown();
    harness.scheduler.run_all();

    assert_eq!(harness.controller.phase(), SubmissionPhase::Success);
    assert!(harness.controller.state().is_success);
}
