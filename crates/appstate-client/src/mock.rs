// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Mock client for testing.
//!
//! Simulates the remote application API with an in-memory application table.
//! Every call is recorded so tests can assert on the exact sequence of remote
//! actions a lifecycle operation issued.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::client::RemoteClient;
use crate::error::{ClientError, Result};
use crate::methods;

/// A call observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Remote method name.
    pub method: String,
    /// Positional parameters.
    pub params: Vec<Value>,
    /// Timeout of an act-and-wait call, `None` for plain calls.
    pub timeout: Option<Duration>,
}

impl RecordedCall {
    /// Whether this call went through `call_and_wait`.
    pub fn waited(&self) -> bool {
        self.timeout.is_some()
    }
}

/// Mock client for testing.
pub struct MockClient {
    apps: Mutex<BTreeMap<String, Value>>,
    calls: Mutex<Vec<RecordedCall>>,
    failures: Mutex<HashMap<String, String>>,
    query_override: Mutex<Option<Value>>,
    /// State reported for freshly created applications.
    pub created_state: String,
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClient {
    /// Create a new mock client with no applications.
    pub fn new() -> Self {
        Self {
            apps: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            query_override: Mutex::new(None),
            created_state: "RUNNING".to_string(),
        }
    }

    /// Create a mock where newly created applications report `state`.
    pub fn with_created_state(state: &str) -> Self {
        Self {
            created_state: state.to_string(),
            ..Self::new()
        }
    }

    /// Add an application that already exists on the remote side.
    pub async fn insert_app(&self, name: &str, state: &str) {
        let mut apps = self.apps.lock().await;
        apps.insert(name.to_string(), app_record(name, state, None));
    }

    /// Change an application's reported state (simulates out-of-band drift).
    pub async fn set_state(&self, name: &str, state: &str) {
        let mut apps = self.apps.lock().await;
        if let Some(app) = apps.get_mut(name) {
            app["state"] = json!(state);
        }
    }

    /// Remove an application behind the controller's back.
    pub async fn remove_app(&self, name: &str) {
        self.apps.lock().await.remove(name);
    }

    /// Get the current record of an application.
    pub async fn app(&self, name: &str) -> Option<Value> {
        self.apps.lock().await.get(name).cloned()
    }

    /// Make every subsequent call to `method` fail with `message`.
    pub async fn fail_method(&self, method: &str, message: &str) {
        let mut failures = self.failures.lock().await;
        failures.insert(method.to_string(), message.to_string());
    }

    /// Return `response` verbatim for every subsequent `app.query`.
    pub async fn override_query(&self, response: Value) {
        *self.query_override.lock().await = Some(response);
    }

    /// All recorded calls, in order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    /// Method names of the act-and-wait calls, in order.
    pub async fn actions(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| call.waited())
            .map(|call| call.method.clone())
            .collect()
    }

    /// Forget the recorded calls.
    pub async fn clear_calls(&self) {
        self.calls.lock().await.clear();
    }

    async fn dispatch(
        &self,
        method: &str,
        params: Vec<Value>,
        timeout: Option<Duration>,
    ) -> Result<Value> {
        self.calls.lock().await.push(RecordedCall {
            method: method.to_string(),
            params: params.clone(),
            timeout,
        });

        if let Some(message) = self.failures.lock().await.get(method) {
            return Err(remote_error(method, message));
        }

        match method {
            methods::APP_QUERY => self.query(&params).await,
            methods::APP_CREATE => self.create(&params).await,
            methods::APP_UPDATE => {
                let name = name_param(method, &params)?;
                let compose = params
                    .get(1)
                    .and_then(|values| values.get("custom_compose_config_string"))
                    .cloned();
                let mut apps = self.apps.lock().await;
                let app = apps
                    .get_mut(&name)
                    .ok_or_else(|| remote_error(method, &format!("app {} not found", name)))?;
                if let Some(compose) = compose {
                    app["custom_compose_config_string"] = compose;
                }
                Ok(app.clone())
            }
            methods::APP_START => self.transition(method, &params, "RUNNING").await,
            methods::APP_STOP => self.transition(method, &params, "STOPPED").await,
            methods::APP_DELETE => {
                let name = name_param(method, &params)?;
                match self.apps.lock().await.remove(&name) {
                    Some(_) => Ok(Value::Bool(true)),
                    None => Err(remote_error(method, &format!("app {} not found", name))),
                }
            }
            other => Err(remote_error(other, "method not supported by mock")),
        }
    }

    async fn query(&self, params: &[Value]) -> Result<Value> {
        if let Some(response) = self.query_override.lock().await.clone() {
            return Ok(response);
        }

        let wanted = params
            .first()
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_array)
            .find(|filter| filter.first() == Some(&json!("name")))
            .and_then(|filter| filter.get(2))
            .and_then(Value::as_str)
            .map(str::to_string);

        let apps = self.apps.lock().await;
        let matches: Vec<Value> = apps
            .iter()
            .filter(|(name, _)| wanted.as_deref().is_none_or(|wanted| wanted == name.as_str()))
            .map(|(_, app)| app.clone())
            .collect();
        Ok(Value::Array(matches))
    }

    async fn create(&self, params: &[Value]) -> Result<Value> {
        let values = params.first().cloned().unwrap_or(Value::Null);
        let name = values
            .get("app_name")
            .and_then(Value::as_str)
            .ok_or_else(|| remote_error(methods::APP_CREATE, "app_name is required"))?
            .to_string();

        let mut apps = self.apps.lock().await;
        if apps.contains_key(&name) {
            return Err(remote_error(
                methods::APP_CREATE,
                &format!("app {} already exists", name),
            ));
        }
        let compose = values.get("custom_compose_config_string").cloned();
        let app = app_record(&name, &self.created_state, compose);
        apps.insert(name, app.clone());
        Ok(app)
    }

    async fn transition(&self, method: &str, params: &[Value], state: &str) -> Result<Value> {
        let name = name_param(method, params)?;
        let mut apps = self.apps.lock().await;
        let app = apps
            .get_mut(&name)
            .ok_or_else(|| remote_error(method, &format!("app {} not found", name)))?;
        app["state"] = json!(state);
        Ok(Value::Null)
    }
}

fn app_record(name: &str, state: &str, compose: Option<Value>) -> Value {
    let mut app = json!({
        "name": name,
        "id": name,
        "state": state,
        "version": "1.0.0",
        "custom_app": true,
    });
    if let Some(compose) = compose {
        app["custom_compose_config_string"] = compose;
    }
    app
}

fn name_param(method: &str, params: &[Value]) -> Result<String> {
    params
        .first()
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| remote_error(method, "app name parameter is required"))
}

fn remote_error(method: &str, message: &str) -> ClientError {
    ClientError::Remote {
        method: method.to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl RemoteClient for MockClient {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        self.dispatch(method, params, None).await
    }

    async fn call_and_wait(
        &self,
        method: &str,
        params: Vec<Value>,
        timeout: Duration,
    ) -> Result<Value> {
        self.dispatch(method, params, Some(timeout)).await
    }
}
