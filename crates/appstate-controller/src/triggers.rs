// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Restart-trigger comparison and the two-phase restart.
//!
//! Restart triggers are opaque fingerprints (content checksums and the like).
//! A change between two non-empty trigger sets means the running app is
//! serving stale configuration. Adding triggers for the first time, or
//! removing them, establishes or drops a baseline and is not a change.

use std::time::Duration;

use appstate_client::RemoteClient;
use tracing::{info, instrument};

use crate::error::{Error, Result};
use crate::reconcile::{Action, execute_action};
use crate::state::{ObservedState, RestartTriggers};

/// Whether the trigger set changed between two present values.
pub fn triggers_changed(prior: Option<&RestartTriggers>, next: Option<&RestartTriggers>) -> bool {
    match (prior, next) {
        (Some(prior), Some(next)) => prior != next,
        _ => false,
    }
}

/// Whether a restart is warranted.
///
/// Only a running app is restarted; bringing a stopped app up is the
/// reconciliation engine's job, not a restart.
pub fn restart_warranted(
    prior: Option<&RestartTriggers>,
    next: Option<&RestartTriggers>,
    observed: &ObservedState,
) -> bool {
    triggers_changed(prior, next) && *observed == ObservedState::Running
}

/// Restart the app as two independent act-and-wait calls.
///
/// Each phase is capped by `timeout`. A failed stop aborts before start is
/// attempted; the error names the failing phase either way.
#[instrument(skip(client), fields(app = %name, timeout_secs = timeout.as_secs()))]
pub async fn restart(client: &dyn RemoteClient, name: &str, timeout: Duration) -> Result<()> {
    info!("Restart triggers changed, restarting app");

    execute_action(client, name, Action::Stop, timeout)
        .await
        .map_err(|source| Error::RestartStop {
            name: name.to_string(),
            source,
        })?;

    execute_action(client, name, Action::Start, timeout)
        .await
        .map_err(|source| Error::RestartStart {
            name: name.to_string(),
            source,
        })?;

    Ok(())
}
