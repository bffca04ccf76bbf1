// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Drift detection and default resolution on refresh.
//!
//! A refresh records what the remote host reports and resolves the fields the
//! user left unset. It never corrects drift; that only happens on update.

use tracing::{debug, warn};

use crate::diagnostics::Diagnostics;
use crate::state::{AppRecord, AppState, DEFAULT_STATE_TIMEOUT_SECS, DesiredState, ObservedState};

/// Diagnostic summary for drift warnings.
pub const DRIFT_SUMMARY: &str = "App state changed outside of management";

/// Whether the reported `actual` state differs from `desired`.
///
/// Comparison is case-insensitive and crashed counts as stopped. Any other
/// difference is drift, including unmodelled states on either side; whether
/// the engine can act on it is decided separately by the action table.
pub fn drift_detected(desired: &str, actual: &str) -> bool {
    if desired.trim().eq_ignore_ascii_case(actual.trim()) {
        return false;
    }
    !(DesiredState::parse(desired) == Some(DesiredState::Stopped)
        && ObservedState::parse(actual) == ObservedState::Crashed)
}

/// Emit the drift warning for `name`.
pub(crate) fn report_drift(name: &str, desired: &str, actual: &str, diags: &mut Diagnostics) {
    warn!(app = %name, desired = %desired, actual = %actual, "App state drifted");
    diags.warn(
        DRIFT_SUMMARY,
        format!(
            "app {} is {} but its desired state is {}",
            name, actual, desired
        ),
    );
}

/// Apply a freshly queried record to `state` and resolve defaults.
///
/// - absent `desired_state` resolves to the observed state, without warning
/// - absent `state_timeout` resolves to the default
/// - present `desired_state` that the observed state violates is reported as
///   drift and left untouched
pub fn resolve_refresh(state: &mut AppState, record: &AppRecord, diags: &mut Diagnostics) {
    state.apply_record(record);

    if state.state_timeout.is_none() {
        state.state_timeout = Some(DEFAULT_STATE_TIMEOUT_SECS);
    }

    match &state.desired_state {
        None => {
            debug!(app = %state.name, state = %record.state, "Defaulting desired state to observed");
            state.desired_state = Some(record.state.clone());
        }
        Some(desired) => {
            if drift_detected(desired, &record.state) {
                report_drift(&state.name, desired, &record.state, diags);
            }
        }
    }
}
