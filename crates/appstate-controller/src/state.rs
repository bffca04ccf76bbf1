// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Plan, persisted state and remote record types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default `state_timeout` in seconds.
pub const DEFAULT_STATE_TIMEOUT_SECS: u64 = 120;

/// Restart trigger fingerprints. Ordered so equality is set equality.
pub type RestartTriggers = BTreeMap<String, String>;

/// Run-state the user asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesiredState {
    /// The app should be running.
    Running,
    /// The app should not be running.
    Stopped,
}

impl DesiredState {
    /// Parse a desired state, case-insensitively.
    ///
    /// Returns `None` for anything but "running" and "stopped".
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "running" => Some(DesiredState::Running),
            "stopped" => Some(DesiredState::Stopped),
            _ => None,
        }
    }

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DesiredState::Running => "running",
            DesiredState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run-state reported by the remote host.
///
/// Only running, stopped and crashed carry meaning; every other value is
/// kept verbatim in `Other` and never acted upon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedState {
    /// The app is running.
    Running,
    /// The app is stopped.
    Stopped,
    /// The app should be running and is not.
    Crashed,
    /// Any state the controller does not model (deploying, ...).
    Other(String),
}

impl ObservedState {
    /// Classify a reported state string, case-insensitively.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "running" => ObservedState::Running,
            "stopped" => ObservedState::Stopped,
            "crashed" => ObservedState::Crashed,
            _ => ObservedState::Other(value.to_string()),
        }
    }

    /// Whether this observed state already meets `desired`.
    ///
    /// Crashed counts as stopped. Unmodelled states satisfy nothing.
    pub fn satisfies(&self, desired: DesiredState) -> bool {
        matches!(
            (desired, self),
            (DesiredState::Running, ObservedState::Running)
                | (
                    DesiredState::Stopped,
                    ObservedState::Stopped | ObservedState::Crashed
                )
        )
    }

    /// Whether the controller models this state.
    pub fn is_modelled(&self) -> bool {
        !matches!(self, ObservedState::Other(_))
    }
}

/// Application record as returned by `app.query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppRecord {
    /// Application name.
    pub name: String,
    /// Reported run-state, verbatim.
    pub state: String,
    /// Reported identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Reported version.
    #[serde(default)]
    pub version: Option<String>,
    /// Whether the app was created from a custom compose payload.
    #[serde(default)]
    pub custom_app: bool,
}

impl AppRecord {
    /// Classified run-state.
    pub fn observed(&self) -> ObservedState {
        ObservedState::parse(&self.state)
    }
}

/// Desired configuration supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name (immutable).
    pub name: String,
    /// Compose payload; opaque to the controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compose_config: Option<String>,
    /// Desired run-state ("running" or "stopped", any case).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_state: Option<String>,
    /// Start/stop timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_timeout: Option<u64>,
    /// Restart trigger fingerprints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_triggers: Option<RestartTriggers>,
}

impl AppConfig {
    /// Create a plan for the named app with everything else unset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the compose payload.
    pub fn with_compose_config(mut self, compose: impl Into<String>) -> Self {
        self.compose_config = Some(compose.into());
        self
    }

    /// Set the desired state.
    pub fn with_desired_state(mut self, state: impl Into<String>) -> Self {
        self.desired_state = Some(state.into());
        self
    }

    /// Set the start/stop timeout in seconds.
    pub fn with_state_timeout(mut self, secs: u64) -> Self {
        self.state_timeout = Some(secs);
        self
    }

    /// Set the restart triggers.
    pub fn with_restart_triggers<K, V>(mut self, triggers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.restart_triggers = Some(
            triggers
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Validate the plan.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidPlan("name must not be empty".to_string()));
        }
        if let Some(desired) = &self.desired_state
            && DesiredState::parse(desired).is_none()
        {
            return Err(Error::InvalidPlan(format!(
                "desired_state must be \"running\" or \"stopped\", got {:?}",
                desired
            )));
        }
        if self.state_timeout == Some(0) {
            return Err(Error::InvalidPlan(
                "state_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective start/stop timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.state_timeout.unwrap_or(DEFAULT_STATE_TIMEOUT_SECS))
    }
}

/// Persisted resource state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Resource identifier; equal to the name.
    pub id: String,
    /// Application name.
    pub name: String,
    /// Compose payload last applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compose_config: Option<String>,
    /// Resolved desired run-state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_state: Option<String>,
    /// Start/stop timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_timeout: Option<u64>,
    /// Last observed run-state, verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_state: Option<String>,
    /// Restart trigger fingerprints last applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_triggers: Option<RestartTriggers>,
    /// Reported app version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Whether the app is a custom compose app.
    #[serde(default)]
    pub custom_app: bool,
}

impl AppState {
    /// Seed state for an imported app: identity only.
    pub fn seed(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            ..Self::default()
        }
    }

    /// State carrying the plan's user-owned fields.
    pub fn from_plan(plan: &AppConfig) -> Self {
        Self {
            id: plan.name.clone(),
            name: plan.name.clone(),
            compose_config: plan.compose_config.clone(),
            desired_state: plan.desired_state.clone(),
            state_timeout: plan.state_timeout,
            restart_triggers: plan.restart_triggers.clone(),
            ..Self::default()
        }
    }

    /// Copy the remote-reported attributes of `record` into this state.
    pub fn apply_record(&mut self, record: &AppRecord) {
        self.actual_state = Some(record.state.clone());
        self.version = record.version.clone();
        self.custom_app = record.custom_app;
    }

    /// Effective start/stop timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.state_timeout.unwrap_or(DEFAULT_STATE_TIMEOUT_SECS))
    }
}
