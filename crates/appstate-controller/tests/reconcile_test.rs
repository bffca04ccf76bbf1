// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Tests for the reconciliation engine and the two-phase restart against the
//! mock client.

use std::time::Duration;

use appstate_client::{MockClient, methods};
use appstate_controller::reconcile::{ReconcileRequest, reconcile};
use appstate_controller::resolve::DRIFT_SUMMARY;
use appstate_controller::triggers::restart;
use appstate_controller::{Action, Diagnostics, Error};

const TIMEOUT: Duration = Duration::from_secs(120);

fn request<'a>(desired: &'a str, actual: &'a str) -> ReconcileRequest<'a> {
    ReconcileRequest {
        name: "web",
        prior_desired: None,
        desired,
        actual,
        timeout: TIMEOUT,
    }
}

async fn mock_with(state: &str) -> MockClient {
    let mock = MockClient::new();
    mock.insert_app("web", state).await;
    mock
}

// ============================================================================
// No-op fast path
// ============================================================================

#[tokio::test]
async fn test_satisfied_pairs_issue_no_calls() {
    let pairs = [
        ("running", "RUNNING"),
        ("stopped", "STOPPED"),
        ("stopped", "CRASHED"),
        ("running", "DEPLOYING"),
        ("stopped", "DEPLOYING"),
        ("Running", "running"),
    ];

    for (desired, actual) in pairs {
        let mock = mock_with(actual).await;
        let mut diags = Diagnostics::new();

        let issued = reconcile(&mock, &request(desired, actual), &mut diags)
            .await
            .unwrap();

        assert_eq!(issued, None, "{} / {}", desired, actual);
        assert!(mock.calls().await.is_empty(), "{} / {}", desired, actual);
    }
}

#[tokio::test]
async fn test_unactionable_desired_issues_no_calls() {
    let mock = mock_with("STOPPED").await;
    let mut diags = Diagnostics::new();

    let issued = reconcile(&mock, &request("DEPLOYING", "STOPPED"), &mut diags)
        .await
        .unwrap();

    assert_eq!(issued, None);
    assert!(mock.calls().await.is_empty());
}

// ============================================================================
// Converging actions
// ============================================================================

#[tokio::test]
async fn test_running_from_stopped_starts_once() {
    let mock = mock_with("STOPPED").await;
    let mut diags = Diagnostics::new();

    let issued = reconcile(&mock, &request("running", "STOPPED"), &mut diags)
        .await
        .unwrap();

    assert_eq!(issued, Some(Action::Start));
    assert_eq!(mock.actions().await, vec![methods::APP_START]);
    assert_eq!(mock.calls().await[0].timeout, Some(TIMEOUT));
}

#[tokio::test]
async fn test_running_from_crashed_starts_once() {
    let mock = mock_with("CRASHED").await;
    let mut diags = Diagnostics::new();

    let issued = reconcile(&mock, &request("running", "CRASHED"), &mut diags)
        .await
        .unwrap();

    assert_eq!(issued, Some(Action::Start));
    assert_eq!(mock.actions().await, vec![methods::APP_START]);
}

#[tokio::test]
async fn test_stopped_from_running_stops_once() {
    let mock = mock_with("RUNNING").await;
    let mut diags = Diagnostics::new();

    let issued = reconcile(&mock, &request("stopped", "RUNNING"), &mut diags)
        .await
        .unwrap();

    assert_eq!(issued, Some(Action::Stop));
    assert_eq!(mock.actions().await, vec![methods::APP_STOP]);
}

#[tokio::test]
async fn test_engine_does_not_requery() {
    let mock = mock_with("STOPPED").await;
    let mut diags = Diagnostics::new();

    reconcile(&mock, &request("running", "STOPPED"), &mut diags)
        .await
        .unwrap();

    let calls = mock.calls().await;
    assert_eq!(calls.len(), 1);
    assert!(calls.iter().all(|c| c.method != methods::APP_QUERY));
}

#[tokio::test]
async fn test_timeout_is_passed_through() {
    let mock = mock_with("RUNNING").await;
    let mut diags = Diagnostics::new();
    let req = ReconcileRequest {
        timeout: Duration::from_secs(7),
        ..request("stopped", "RUNNING")
    };

    reconcile(&mock, &req, &mut diags).await.unwrap();

    assert_eq!(mock.calls().await[0].timeout, Some(Duration::from_secs(7)));
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_start_failure_names_start() {
    let mock = mock_with("STOPPED").await;
    mock.fail_method(methods::APP_START, "image pull failed").await;
    let mut diags = Diagnostics::new();

    let err = reconcile(&mock, &request("running", "STOPPED"), &mut diags)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Start { .. }));
    assert!(err.to_string().contains("start"));
    assert!(err.to_string().contains("image pull failed"));
}

#[tokio::test]
async fn test_stop_failure_names_stop() {
    let mock = mock_with("RUNNING").await;
    mock.fail_method(methods::APP_STOP, "busy").await;
    let mut diags = Diagnostics::new();

    let err = reconcile(&mock, &request("stopped", "RUNNING"), &mut diags)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Stop { .. }));
    assert!(err.to_string().contains("stop"));
}

// ============================================================================
// Drift reporting
// ============================================================================

#[tokio::test]
async fn test_violated_prior_desired_warns() {
    let mock = mock_with("STOPPED").await;
    let mut diags = Diagnostics::new();
    let req = ReconcileRequest {
        prior_desired: Some("running"),
        ..request("running", "STOPPED")
    };

    reconcile(&mock, &req, &mut diags).await.unwrap();

    assert_eq!(diags.warnings().count(), 1);
    assert_eq!(diags.warnings().next().unwrap().summary, DRIFT_SUMMARY);
    assert_eq!(mock.actions().await, vec![methods::APP_START]);
}

#[tokio::test]
async fn test_changed_intent_is_not_drift() {
    let mock = mock_with("RUNNING").await;
    let mut diags = Diagnostics::new();
    let req = ReconcileRequest {
        prior_desired: Some("running"),
        ..request("stopped", "RUNNING")
    };

    reconcile(&mock, &req, &mut diags).await.unwrap();

    assert!(diags.is_empty());
    assert_eq!(mock.actions().await, vec![methods::APP_STOP]);
}

// ============================================================================
// Restart
// ============================================================================

#[tokio::test]
async fn test_restart_stops_then_starts() {
    let mock = mock_with("RUNNING").await;

    restart(&mock, "web", TIMEOUT).await.unwrap();

    assert_eq!(
        mock.actions().await,
        vec![methods::APP_STOP, methods::APP_START]
    );
    assert!(
        mock.calls()
            .await
            .iter()
            .all(|c| c.timeout == Some(TIMEOUT))
    );
}

#[tokio::test]
async fn test_restart_stop_failure_skips_start() {
    let mock = mock_with("RUNNING").await;
    mock.fail_method(methods::APP_STOP, "busy").await;

    let err = restart(&mock, "web", TIMEOUT).await.unwrap_err();

    assert!(matches!(err, Error::RestartStop { .. }));
    assert!(err.to_string().contains("stop phase"));
    assert_eq!(mock.actions().await, vec![methods::APP_STOP]);
}

#[tokio::test]
async fn test_restart_start_failure_after_stop() {
    let mock = mock_with("RUNNING").await;
    mock.fail_method(methods::APP_START, "port in use").await;

    let err = restart(&mock, "web", TIMEOUT).await.unwrap_err();

    assert!(matches!(err, Error::RestartStart { .. }));
    assert!(err.to_string().contains("start phase"));
    assert_eq!(
        mock.actions().await,
        vec![methods::APP_STOP, methods::APP_START]
    );
    assert_eq!(mock.app("web").await.unwrap()["state"], "STOPPED");
}
