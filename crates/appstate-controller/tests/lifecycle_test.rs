// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! End-to-end lifecycle tests for AppController over the mock client.

use std::sync::Arc;
use std::time::Duration;

use appstate_client::{MockClient, methods};
use appstate_controller::resolve::DRIFT_SUMMARY;
use appstate_controller::{
    AppConfig, AppController, AppState, Config, Diagnostics, Error, ReadOutcome,
};
use serde_json::json;

fn controller(mock: &Arc<MockClient>) -> AppController {
    AppController::new(mock.clone(), Config::default())
}

fn present(outcome: ReadOutcome) -> AppState {
    match outcome {
        ReadOutcome::Present(state) => state,
        ReadOutcome::Removed => panic!("expected the app to be present"),
    }
}

/// Create `web` with `plan` and forget the calls it made.
async fn created(mock: &Arc<MockClient>, plan: &AppConfig) -> AppState {
    let mut diags = Diagnostics::new();
    let state = controller(mock).create(plan, &mut diags).await.unwrap();
    mock.clear_calls().await;
    state
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_running_needs_no_action() {
    let mock = Arc::new(MockClient::new());
    let plan = AppConfig::new("web").with_desired_state("running");
    let mut diags = Diagnostics::new();

    let state = controller(&mock).create(&plan, &mut diags).await.unwrap();

    assert_eq!(mock.actions().await, vec![methods::APP_CREATE]);
    assert_eq!(state.id, "web");
    assert_eq!(state.actual_state.as_deref(), Some("RUNNING"));
    assert_eq!(state.desired_state.as_deref(), Some("running"));
    assert_eq!(state.state_timeout, Some(120));
    assert_eq!(state.version.as_deref(), Some("1.0.0"));
    assert!(state.custom_app);
    assert!(diags.is_empty());
}

#[tokio::test]
async fn test_create_stopped_issues_create_then_stop() {
    let mock = Arc::new(MockClient::new());
    let plan = AppConfig::new("web")
        .with_compose_config("services: {}")
        .with_desired_state("stopped")
        .with_state_timeout(30);
    let mut diags = Diagnostics::new();

    let state = controller(&mock).create(&plan, &mut diags).await.unwrap();

    assert_eq!(
        mock.actions().await,
        vec![methods::APP_CREATE, methods::APP_STOP]
    );
    assert_eq!(state.actual_state.as_deref(), Some("STOPPED"));
    assert_eq!(state.compose_config.as_deref(), Some("services: {}"));

    let calls = mock.calls().await;
    let create = &calls[0];
    assert_eq!(create.params[0]["app_name"], "web");
    assert_eq!(create.params[0]["custom_app"], true);
    assert_eq!(
        create.params[0]["custom_compose_config_string"],
        "services: {}"
    );
    assert_eq!(create.timeout, Some(Duration::from_secs(600)));

    let stop = calls.iter().find(|c| c.method == methods::APP_STOP).unwrap();
    assert_eq!(stop.params, vec![json!("web")]);
    assert_eq!(stop.timeout, Some(Duration::from_secs(30)));

    // Re-queried after the stop.
    assert_eq!(calls.last().unwrap().method, methods::APP_QUERY);
}

#[tokio::test]
async fn test_create_without_desired_adopts_observed() {
    let mock = Arc::new(MockClient::with_created_state("STOPPED"));
    let plan = AppConfig::new("web");
    let mut diags = Diagnostics::new();

    let state = controller(&mock).create(&plan, &mut diags).await.unwrap();

    assert_eq!(mock.actions().await, vec![methods::APP_CREATE]);
    assert_eq!(state.desired_state.as_deref(), Some("STOPPED"));
    assert_eq!(state.actual_state.as_deref(), Some("STOPPED"));
}

#[tokio::test]
async fn test_create_running_from_crashed_starts() {
    let mock = Arc::new(MockClient::with_created_state("CRASHED"));
    let plan = AppConfig::new("web").with_desired_state("running");
    let mut diags = Diagnostics::new();

    let state = controller(&mock).create(&plan, &mut diags).await.unwrap();

    assert_eq!(
        mock.actions().await,
        vec![methods::APP_CREATE, methods::APP_START]
    );
    assert_eq!(state.actual_state.as_deref(), Some("RUNNING"));
}

#[tokio::test]
async fn test_create_without_compose_is_not_custom() {
    let mock = Arc::new(MockClient::new());
    let mut diags = Diagnostics::new();

    controller(&mock)
        .create(&AppConfig::new("web"), &mut diags)
        .await
        .unwrap();

    let create = &mock.calls().await[0];
    assert_eq!(create.method, methods::APP_CREATE);
    assert_eq!(create.params[0], json!({ "app_name": "web" }));
}

#[tokio::test]
async fn test_create_rejects_invalid_plan_without_calls() {
    let mock = Arc::new(MockClient::new());
    let mut diags = Diagnostics::new();

    let err = controller(&mock)
        .create(&AppConfig::new(""), &mut diags)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPlan(_)));

    let err = controller(&mock)
        .create(
            &AppConfig::new("web").with_desired_state("paused"),
            &mut diags,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPlan(_)));

    assert!(mock.calls().await.is_empty());
}

#[tokio::test]
async fn test_create_failure_is_fatal() {
    let mock = Arc::new(MockClient::new());
    mock.fail_method(methods::APP_CREATE, "invalid compose").await;
    let mut diags = Diagnostics::new();

    let err = controller(&mock)
        .create(&AppConfig::new("web"), &mut diags)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Create { .. }));
    assert!(err.to_string().contains("invalid compose"));
    assert_eq!(mock.calls().await.len(), 1);
}

#[tokio::test]
async fn test_create_missing_after_create() {
    let mock = Arc::new(MockClient::new());
    mock.override_query(json!([])).await;
    let mut diags = Diagnostics::new();

    let err = controller(&mock)
        .create(&AppConfig::new("web"), &mut diags)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MissingAfterCreate { .. }));
}

#[tokio::test]
async fn test_create_query_failure_is_distinct() {
    let mock = Arc::new(MockClient::new());
    mock.fail_method(methods::APP_QUERY, "connection reset").await;
    let mut diags = Diagnostics::new();

    let err = controller(&mock)
        .create(&AppConfig::new("web"), &mut diags)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::QueryAfterCreate { .. }));
    assert!(err.to_string().contains("connection reset"));
}

#[tokio::test]
async fn test_create_stop_failure_surfaces_stop_error() {
    let mock = Arc::new(MockClient::new());
    mock.fail_method(methods::APP_STOP, "busy").await;
    let mut diags = Diagnostics::new();

    let err = controller(&mock)
        .create(
            &AppConfig::new("web").with_desired_state("stopped"),
            &mut diags,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Stop { .. }));
}

// ============================================================================
// Read
// ============================================================================

#[tokio::test]
async fn test_read_resolves_absent_desired_without_warning() {
    let mock = Arc::new(MockClient::new());
    mock.insert_app("web", "RUNNING").await;
    let ctl = controller(&mock);
    let mut diags = Diagnostics::new();

    let state = present(ctl.read(&AppState::seed("web"), &mut diags).await.unwrap());

    assert_eq!(state.desired_state.as_deref(), Some("RUNNING"));
    assert_eq!(state.actual_state.as_deref(), Some("RUNNING"));
    assert_eq!(state.state_timeout, Some(120));
    assert!(diags.is_empty());
    assert!(mock.actions().await.is_empty());
}

#[tokio::test]
async fn test_read_drift_warns_and_keeps_desired() {
    let mock = Arc::new(MockClient::new());
    let prior = created(&mock, &AppConfig::new("web").with_desired_state("running")).await;
    mock.set_state("web", "STOPPED").await;
    let mut diags = Diagnostics::new();

    let state = present(controller(&mock).read(&prior, &mut diags).await.unwrap());

    assert_eq!(state.desired_state.as_deref(), Some("running"));
    assert_eq!(state.actual_state.as_deref(), Some("STOPPED"));
    assert_eq!(diags.warnings().count(), 1);
    assert_eq!(diags.warnings().next().unwrap().summary, DRIFT_SUMMARY);
    assert!(mock.actions().await.is_empty());
}

#[tokio::test]
async fn test_read_crashed_is_not_drift_from_stopped() {
    let mock = Arc::new(MockClient::new());
    let prior = created(&mock, &AppConfig::new("web").with_desired_state("stopped")).await;
    mock.set_state("web", "CRASHED").await;
    let mut diags = Diagnostics::new();

    let state = present(controller(&mock).read(&prior, &mut diags).await.unwrap());

    assert_eq!(state.actual_state.as_deref(), Some("CRASHED"));
    assert!(diags.is_empty());
}

#[tokio::test]
async fn test_read_running_while_deploying_warns() {
    let mock = Arc::new(MockClient::new());
    mock.insert_app("web", "DEPLOYING").await;
    let mut prior = AppState::seed("web");
    prior.desired_state = Some("running".to_string());
    let mut diags = Diagnostics::new();

    let state = present(controller(&mock).read(&prior, &mut diags).await.unwrap());

    assert_eq!(state.desired_state.as_deref(), Some("running"));
    assert_eq!(state.actual_state.as_deref(), Some("DEPLOYING"));
    assert_eq!(diags.warnings().count(), 1);
    assert_eq!(diags.warnings().next().unwrap().summary, DRIFT_SUMMARY);
    assert!(mock.actions().await.is_empty());
}

#[tokio::test]
async fn test_read_missing_app_is_removed() {
    let mock = Arc::new(MockClient::new());
    let prior = created(&mock, &AppConfig::new("web")).await;
    mock.remove_app("web").await;
    let mut diags = Diagnostics::new();

    let outcome = controller(&mock).read(&prior, &mut diags).await.unwrap();

    assert_eq!(outcome, ReadOutcome::Removed);
}

#[tokio::test]
async fn test_read_query_failure_is_fatal() {
    let mock = Arc::new(MockClient::new());
    mock.fail_method(methods::APP_QUERY, "unauthorized").await;
    let mut diags = Diagnostics::new();

    let err = controller(&mock)
        .read(&AppState::seed("web"), &mut diags)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Query { .. }));
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_converges_drifted_app_and_warns() {
    let mock = Arc::new(MockClient::new());
    let plan = AppConfig::new("web").with_desired_state("running");
    let prior = created(&mock, &plan).await;
    mock.set_state("web", "STOPPED").await;
    let mut diags = Diagnostics::new();

    let state = controller(&mock)
        .update(&prior, &plan, &mut diags)
        .await
        .unwrap();

    assert_eq!(mock.actions().await, vec![methods::APP_START]);
    assert_eq!(state.actual_state.as_deref(), Some("RUNNING"));
    assert_eq!(diags.warnings().count(), 1);
}

#[tokio::test]
async fn test_update_identical_plan_is_noop() {
    let mock = Arc::new(MockClient::new());
    let plan = AppConfig::new("web")
        .with_compose_config("services: {}")
        .with_desired_state("running")
        .with_restart_triggers([("config", "abc")]);
    let prior = created(&mock, &plan).await;
    let mut diags = Diagnostics::new();

    controller(&mock)
        .update(&prior, &plan, &mut diags)
        .await
        .unwrap();

    assert!(mock.actions().await.is_empty());
    assert!(diags.is_empty());
}

#[tokio::test]
async fn test_update_compose_change_sends_update() {
    let mock = Arc::new(MockClient::new());
    let prior = created(&mock, &AppConfig::new("web").with_compose_config("v1")).await;
    let plan = AppConfig::new("web").with_compose_config("v2");
    let mut diags = Diagnostics::new();

    let state = controller(&mock)
        .update(&prior, &plan, &mut diags)
        .await
        .unwrap();

    assert_eq!(mock.actions().await, vec![methods::APP_UPDATE]);
    let calls = mock.calls().await;
    assert_eq!(
        calls[0].params,
        vec![json!("web"), json!({ "custom_compose_config_string": "v2" })]
    );
    assert_eq!(state.compose_config.as_deref(), Some("v2"));
    // Desired state omitted from the plan keeps the prior resolved value.
    assert_eq!(state.desired_state, prior.desired_state);
}

#[tokio::test]
async fn test_update_rejects_rename() {
    let mock = Arc::new(MockClient::new());
    let prior = created(&mock, &AppConfig::new("web")).await;
    let mut diags = Diagnostics::new();

    let err = controller(&mock)
        .update(&prior, &AppConfig::new("api"), &mut diags)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidPlan(_)));
    assert!(mock.calls().await.is_empty());
}

#[tokio::test]
async fn test_update_changed_triggers_restart_running_app() {
    let mock = Arc::new(MockClient::new());
    let prior = created(
        &mock,
        &AppConfig::new("web")
            .with_desired_state("running")
            .with_restart_triggers([("config", "abc")]),
    )
    .await;
    let plan = AppConfig::new("web")
        .with_desired_state("running")
        .with_restart_triggers([("config", "def")]);
    let mut diags = Diagnostics::new();

    let state = controller(&mock)
        .update(&prior, &plan, &mut diags)
        .await
        .unwrap();

    assert_eq!(
        mock.actions().await,
        vec![methods::APP_STOP, methods::APP_START]
    );
    assert_eq!(state.actual_state.as_deref(), Some("RUNNING"));
    assert_eq!(
        state.restart_triggers.unwrap().get("config").map(String::as_str),
        Some("def")
    );
}

#[tokio::test]
async fn test_update_triggers_appearing_do_not_restart() {
    let mock = Arc::new(MockClient::new());
    let prior = created(&mock, &AppConfig::new("web").with_desired_state("running")).await;
    let plan = AppConfig::new("web")
        .with_desired_state("running")
        .with_restart_triggers([("config", "abc")]);
    let mut diags = Diagnostics::new();

    controller(&mock)
        .update(&prior, &plan, &mut diags)
        .await
        .unwrap();

    assert!(mock.actions().await.is_empty());
}

#[tokio::test]
async fn test_update_triggers_removed_do_not_restart() {
    let mock = Arc::new(MockClient::new());
    let prior = created(
        &mock,
        &AppConfig::new("web")
            .with_desired_state("running")
            .with_restart_triggers([("config", "abc")]),
    )
    .await;
    let plan = AppConfig::new("web").with_desired_state("running");
    let mut diags = Diagnostics::new();

    let state = controller(&mock)
        .update(&prior, &plan, &mut diags)
        .await
        .unwrap();

    assert!(mock.actions().await.is_empty());
    assert_eq!(state.restart_triggers, None);
    assert_eq!(state.actual_state.as_deref(), Some("RUNNING"));
}

#[tokio::test]
async fn test_update_changed_triggers_on_stopped_app_do_not_restart() {
    let mock = Arc::new(MockClient::new());
    let prior = created(
        &mock,
        &AppConfig::new("web")
            .with_desired_state("stopped")
            .with_restart_triggers([("config", "abc")]),
    )
    .await;
    let plan = AppConfig::new("web")
        .with_desired_state("stopped")
        .with_restart_triggers([("config", "def")]);
    let mut diags = Diagnostics::new();

    controller(&mock)
        .update(&prior, &plan, &mut diags)
        .await
        .unwrap();

    assert!(mock.actions().await.is_empty());
}

#[tokio::test]
async fn test_update_restart_then_stop_when_desired_changes() {
    let mock = Arc::new(MockClient::new());
    let prior = created(
        &mock,
        &AppConfig::new("web")
            .with_desired_state("running")
            .with_restart_triggers([("config", "abc")]),
    )
    .await;
    let plan = AppConfig::new("web")
        .with_desired_state("stopped")
        .with_restart_triggers([("config", "def")]);
    let mut diags = Diagnostics::new();

    let state = controller(&mock)
        .update(&prior, &plan, &mut diags)
        .await
        .unwrap();

    assert_eq!(
        mock.actions().await,
        vec![methods::APP_STOP, methods::APP_START, methods::APP_STOP]
    );
    assert_eq!(state.actual_state.as_deref(), Some("STOPPED"));
    assert!(diags.is_empty());
}

#[tokio::test]
async fn test_update_restart_stop_failure_is_fatal() {
    let mock = Arc::new(MockClient::new());
    let prior = created(
        &mock,
        &AppConfig::new("web")
            .with_desired_state("running")
            .with_restart_triggers([("config", "abc")]),
    )
    .await;
    mock.fail_method(methods::APP_STOP, "busy").await;
    let plan = AppConfig::new("web")
        .with_desired_state("running")
        .with_restart_triggers([("config", "def")]);
    let mut diags = Diagnostics::new();

    let err = controller(&mock)
        .update(&prior, &plan, &mut diags)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RestartStop { .. }));
    assert_eq!(mock.actions().await, vec![methods::APP_STOP]);
}

#[tokio::test]
async fn test_update_missing_app_fails() {
    let mock = Arc::new(MockClient::new());
    let prior = created(&mock, &AppConfig::new("web")).await;
    mock.remove_app("web").await;
    let mut diags = Diagnostics::new();

    let err = controller(&mock)
        .update(&prior, &AppConfig::new("web"), &mut diags)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound { .. }));
}

// ============================================================================
// Delete and import
// ============================================================================

#[tokio::test]
async fn test_delete_issues_single_call() {
    let mock = Arc::new(MockClient::new());
    let prior = created(&mock, &AppConfig::new("web")).await;

    controller(&mock).delete(&prior).await.unwrap();

    let calls = mock.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, methods::APP_DELETE);
    assert_eq!(calls[0].params, vec![json!("web")]);
    assert!(mock.app("web").await.is_none());
}

#[tokio::test]
async fn test_delete_failure_is_fatal() {
    let mock = Arc::new(MockClient::new());
    mock.fail_method(methods::APP_DELETE, "in use").await;

    let err = controller(&mock)
        .delete(&AppState::seed("web"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Delete { .. }));
}

#[tokio::test]
async fn test_import_then_read_fills_state() {
    let mock = Arc::new(MockClient::new());
    mock.insert_app("web", "STOPPED").await;
    let ctl = controller(&mock);

    let seed = ctl.import(" web ").unwrap();
    assert_eq!(seed.id, "web");
    assert_eq!(seed.name, "web");
    assert!(mock.calls().await.is_empty());

    let mut diags = Diagnostics::new();
    let state = present(ctl.read(&seed, &mut diags).await.unwrap());

    assert_eq!(state.desired_state.as_deref(), Some("STOPPED"));
    assert_eq!(state.actual_state.as_deref(), Some("STOPPED"));
    assert!(diags.is_empty());
}

#[tokio::test]
async fn test_import_rejects_empty_id() {
    let mock = Arc::new(MockClient::new());

    let err = controller(&mock).import("  ").unwrap_err();

    assert!(matches!(err, Error::InvalidPlan(_)));
}
