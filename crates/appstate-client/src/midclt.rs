// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Remote control CLI transport.
//!
//! Each call spawns `midclt [-u URL] [-U USER] [-P PASS] call [-job] METHOD ARG...`
//! where every positional argument is JSON-encoded. The process is killed when
//! the call's timeout elapses or the calling future is dropped.
//!
//! Credentials travel on the command line (`-P`), so they are visible to other
//! users of the host through the process list.

use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::client::RemoteClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// RemoteClient backed by the `midclt` command line tool.
pub struct MidcltClient {
    config: ClientConfig,
}

impl MidcltClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the argument vector for a call.
    pub fn command_args(&self, method: &str, params: &[Value], job: bool) -> Vec<String> {
        let mut args = Vec::with_capacity(params.len() + 8);

        if let Some(url) = &self.config.remote_url {
            args.push("-u".to_string());
            args.push(url.clone());
        }
        if let Some(username) = &self.config.username {
            args.push("-U".to_string());
            args.push(username.clone());
        }
        if let Some(password) = &self.config.password {
            args.push("-P".to_string());
            args.push(password.clone());
        }

        args.push("call".to_string());
        if job {
            args.push("-job".to_string());
        }
        args.push(method.to_string());
        // Bare strings are still JSON-encoded so the remote side sees `"name"`.
        args.extend(params.iter().map(Value::to_string));

        args
    }

    async fn invoke(
        &self,
        method: &str,
        params: &[Value],
        job: bool,
        timeout: Duration,
    ) -> Result<Value> {
        let args = self.command_args(method, params, job);

        let mut cmd = Command::new(&self.config.midclt_path);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ClientError::Transport {
                    method: method.to_string(),
                    message: format!(
                        "failed to run {}: {}",
                        self.config.midclt_path.display(),
                        e
                    ),
                });
            }
            Err(_) => {
                return Err(ClientError::Timeout {
                    method: method.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            return Err(ClientError::Remote {
                method: method.to_string(),
                message,
            });
        }

        debug!(bytes = output.stdout.len(), "Call completed");
        Ok(parse_output(&output.stdout))
    }
}

/// Interpret CLI stdout: JSON when it parses, otherwise the raw text.
fn parse_output(stdout: &[u8]) -> Value {
    let text = String::from_utf8_lossy(stdout);
    let text = text.trim();
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[async_trait]
impl RemoteClient for MidcltClient {
    #[instrument(skip(self, params), fields(method = %method))]
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        self.invoke(method, &params, false, self.config.call_timeout)
            .await
    }

    #[instrument(skip(self, params), fields(method = %method, timeout_ms = timeout.as_millis() as u64))]
    async fn call_and_wait(
        &self,
        method: &str,
        params: Vec<Value>,
        timeout: Duration,
    ) -> Result<Value> {
        self.invoke(method, &params, true, timeout).await
    }
}
