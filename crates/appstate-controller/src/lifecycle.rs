// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Lifecycle orchestration: create, read, update, delete and import.
//!
//! Every operation runs to completion or failure on the caller's task. There
//! is no background loop and no state shared between calls; whatever a
//! decision needs is either passed in or freshly queried. Fatal errors abort
//! the operation immediately and nothing is retried.

use std::sync::Arc;

use appstate_client::{RemoteClient, methods};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::query::{QueryOutcome, query_app};
use crate::reconcile::{ReconcileRequest, reconcile};
use crate::resolve::resolve_refresh;
use crate::state::{AppConfig, AppRecord, AppState, DEFAULT_STATE_TIMEOUT_SECS};
use crate::triggers::{restart, restart_warranted};

/// Result of a refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// The app exists; persist this state.
    Present(AppState),
    /// The app is gone remotely; drop it from persisted state.
    Removed,
}

/// Managed-resource controller for one application at a time.
pub struct AppController {
    client: Arc<dyn RemoteClient>,
    config: Config,
}

impl AppController {
    /// Create a controller on top of `client`.
    pub fn new(client: Arc<dyn RemoteClient>, config: Config) -> Self {
        Self { client, config }
    }

    /// Get the controller configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Query `name`, treating absence as an error.
    async fn require(&self, name: &str) -> Result<AppRecord> {
        query_app(self.client.as_ref(), name)
            .await?
            .into_record()
            .ok_or_else(|| Error::NotFound {
                name: name.to_string(),
            })
    }

    /// Create the app, then bring it to the desired state.
    ///
    /// Remote create → query → reconcile once if the resolved desired state
    /// differs from what the new app reports → re-query.
    #[instrument(skip(self, plan, diags), fields(app = %plan.name))]
    pub async fn create(&self, plan: &AppConfig, diags: &mut Diagnostics) -> Result<AppState> {
        plan.validate()?;
        let name = plan.name.as_str();
        info!("Creating app");

        // Only a compose payload makes this a custom app.
        let mut values = json!({ "app_name": name });
        if let Some(compose) = &plan.compose_config {
            values["custom_app"] = json!(true);
            values["custom_compose_config_string"] = json!(compose);
        }
        self.client
            .call_and_wait(methods::APP_CREATE, vec![values], self.config.job_timeout)
            .await
            .map_err(|source| Error::Create {
                name: name.to_string(),
                source,
            })?;

        let mut record = match query_app(self.client.as_ref(), name).await {
            Ok(QueryOutcome::Found(record)) => record,
            Ok(QueryOutcome::NotFound) => {
                return Err(Error::MissingAfterCreate {
                    name: name.to_string(),
                });
            }
            Err(err) => {
                return Err(Error::QueryAfterCreate {
                    name: name.to_string(),
                    source: Box::new(err),
                });
            }
        };

        let desired = plan
            .desired_state
            .clone()
            .unwrap_or_else(|| record.state.clone());

        let issued = {
            let request = ReconcileRequest {
                name,
                prior_desired: None,
                desired: &desired,
                actual: &record.state,
                timeout: plan.timeout(),
            };
            reconcile(self.client.as_ref(), &request, diags).await?
        };
        if issued.is_some() {
            record = self.require(name).await?;
        }

        let mut state = AppState::from_plan(plan);
        state.desired_state = Some(desired);
        state.state_timeout = Some(plan.state_timeout.unwrap_or(DEFAULT_STATE_TIMEOUT_SECS));
        state.apply_record(&record);

        info!(actual_state = %record.state, "App created");
        Ok(state)
    }

    /// Refresh persisted state from the remote host.
    ///
    /// Never starts or stops anything. Drift is reported as a warning.
    #[instrument(skip(self, state, diags), fields(app = %state.name))]
    pub async fn read(&self, state: &AppState, diags: &mut Diagnostics) -> Result<ReadOutcome> {
        if state.name.trim().is_empty() {
            return Err(Error::InvalidPlan("state has no name".to_string()));
        }

        match query_app(self.client.as_ref(), &state.name).await? {
            QueryOutcome::NotFound => {
                warn!("App no longer exists, dropping it from state");
                Ok(ReadOutcome::Removed)
            }
            QueryOutcome::Found(record) => {
                let mut next = state.clone();
                if next.id.is_empty() {
                    next.id = next.name.clone();
                }
                resolve_refresh(&mut next, &record, diags);
                Ok(ReadOutcome::Present(next))
            }
        }
    }

    /// Apply `plan` to an existing app.
    ///
    /// Configuration update (when the compose payload changed) → restart if
    /// the restart triggers changed while running → reconcile the desired
    /// state against the freshly observed state → re-query.
    #[instrument(skip(self, state, plan, diags), fields(app = %plan.name))]
    pub async fn update(
        &self,
        state: &AppState,
        plan: &AppConfig,
        diags: &mut Diagnostics,
    ) -> Result<AppState> {
        plan.validate()?;
        if plan.name != state.name {
            return Err(Error::InvalidPlan(format!(
                "name is immutable (state has {:?}, plan has {:?})",
                state.name, plan.name
            )));
        }
        let name = plan.name.as_str();
        let timeout = plan.timeout();

        if plan.compose_config != state.compose_config
            && let Some(compose) = &plan.compose_config
        {
            info!("Applying configuration update");
            self.client
                .call_and_wait(
                    methods::APP_UPDATE,
                    vec![
                        json!(name),
                        json!({ "custom_compose_config_string": compose }),
                    ],
                    self.config.job_timeout,
                )
                .await
                .map_err(|source| Error::Update {
                    name: name.to_string(),
                    source,
                })?;
        }

        let mut record = self.require(name).await?;

        if restart_warranted(
            state.restart_triggers.as_ref(),
            plan.restart_triggers.as_ref(),
            &record.observed(),
        ) {
            restart(self.client.as_ref(), name, timeout).await?;
            record = self.require(name).await?;
        }

        // An unset desired state keeps whatever was resolved before.
        let desired = plan
            .desired_state
            .clone()
            .or_else(|| state.desired_state.clone())
            .unwrap_or_else(|| record.state.clone());

        let issued = {
            let request = ReconcileRequest {
                name,
                prior_desired: state.desired_state.as_deref(),
                desired: &desired,
                actual: &record.state,
                timeout,
            };
            reconcile(self.client.as_ref(), &request, diags).await?
        };
        if issued.is_some() {
            record = self.require(name).await?;
        }

        let mut next = AppState::from_plan(plan);
        next.desired_state = Some(desired);
        next.state_timeout = Some(plan.state_timeout.unwrap_or(DEFAULT_STATE_TIMEOUT_SECS));
        next.apply_record(&record);

        info!(actual_state = %record.state, "App updated");
        Ok(next)
    }

    /// Delete the app. A single remote call; no reconciliation.
    #[instrument(skip(self, state), fields(app = %state.name))]
    pub async fn delete(&self, state: &AppState) -> Result<()> {
        info!("Deleting app");
        self.client
            .call_and_wait(
                methods::APP_DELETE,
                vec![json!(state.name)],
                self.config.job_timeout,
            )
            .await
            .map_err(|source| Error::Delete {
                name: state.name.clone(),
                source,
            })?;
        Ok(())
    }

    /// Adopt an existing app by name. A subsequent read fills in the rest.
    pub fn import(&self, id: &str) -> Result<AppState> {
        let name = id.trim();
        if name.is_empty() {
            return Err(Error::InvalidPlan("import id must not be empty".to_string()));
        }
        info!(app = %name, "Importing app");
        Ok(AppState::seed(name))
    }
}
