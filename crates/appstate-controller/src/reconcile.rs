// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Desired-state reconciliation engine.
//!
//! [`plan_action`] is a pure function from (desired, observed) to the action
//! that converges them. [`reconcile`] executes that action as a single
//! act-and-wait call. The split keeps the decision table testable without a
//! remote host.
//!
//! The engine is one-shot: it issues at most one call, never retries, and
//! does not re-query afterwards. The orchestrator owns the authoritative
//! re-query.

use std::fmt;
use std::time::Duration;

use appstate_client::{ClientError, RemoteClient, methods};
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::resolve::{drift_detected, report_drift};
use crate::state::{DesiredState, ObservedState};

/// A run-state action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start the app.
    Start,
    /// Stop the app.
    Stop,
}

impl Action {
    /// Remote method implementing this action.
    pub fn method(&self) -> &'static str {
        match self {
            Action::Start => methods::APP_START,
            Action::Stop => methods::APP_STOP,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Start => f.write_str("start"),
            Action::Stop => f.write_str("stop"),
        }
    }
}

/// Decide the action that moves `observed` to `desired`.
///
/// Crashed is stopped-equivalent: it needs a start to reach running but no
/// stop to reach stopped. Unmodelled states are left alone.
pub fn plan_action(desired: DesiredState, observed: &ObservedState) -> Option<Action> {
    match (desired, observed) {
        (DesiredState::Running, ObservedState::Stopped | ObservedState::Crashed) => {
            Some(Action::Start)
        }
        (DesiredState::Stopped, ObservedState::Running) => Some(Action::Stop),
        _ => None,
    }
}

/// Issue `action` for `name` and wait for it to finish.
pub(crate) async fn execute_action(
    client: &dyn RemoteClient,
    name: &str,
    action: Action,
    timeout: Duration,
) -> std::result::Result<(), ClientError> {
    info!(app = %name, action = %action, timeout_secs = timeout.as_secs(), "Issuing action");
    client
        .call_and_wait(action.method(), vec![json!(name)], timeout)
        .await?;
    Ok(())
}

/// Inputs to one reconciliation.
#[derive(Debug, Clone)]
pub struct ReconcileRequest<'a> {
    /// Application name.
    pub name: &'a str,
    /// Desired state persisted before this operation, if any.
    pub prior_desired: Option<&'a str>,
    /// Desired state to converge to.
    pub desired: &'a str,
    /// Run-state reported by the remote host, verbatim.
    pub actual: &'a str,
    /// Cap for the start/stop call.
    pub timeout: Duration,
}

/// Converge the app's run-state to the desired state.
///
/// Returns the action that was issued, or `None` when nothing had to be done
/// (zero remote calls). When the previously persisted desired state is
/// violated by the observed state, a drift warning is added to `diags`
/// before acting.
#[instrument(skip(client, request, diags), fields(app = %request.name, desired = %request.desired, actual = %request.actual))]
pub async fn reconcile(
    client: &dyn RemoteClient,
    request: &ReconcileRequest<'_>,
    diags: &mut Diagnostics,
) -> Result<Option<Action>> {
    if let Some(prior) = request.prior_desired
        && drift_detected(prior, request.actual)
    {
        report_drift(request.name, prior, request.actual, diags);
    }

    let Some(desired) = DesiredState::parse(request.desired) else {
        debug!("Desired state is not actionable, leaving app alone");
        return Ok(None);
    };

    let observed = ObservedState::parse(request.actual);
    let Some(action) = plan_action(desired, &observed) else {
        debug!("Nothing to reconcile");
        return Ok(None);
    };

    let name = request.name.to_string();
    execute_action(client, request.name, action, request.timeout)
        .await
        .map_err(|source| match action {
            Action::Start => Error::Start { name, source },
            Action::Stop => Error::Stop { name, source },
        })?;

    Ok(Some(action))
}
