// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration for the remote control client.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ClientError, Result};

/// Configuration for the MidcltClient.
#[derive(Clone)]
pub struct ClientConfig {
    /// Path of the remote control CLI.
    pub midclt_path: PathBuf,
    /// Remote endpoint URL. The local middleware socket is used when unset.
    pub remote_url: Option<String>,
    /// Username for the remote endpoint.
    pub username: Option<String>,
    /// Password for the remote endpoint.
    ///
    /// The CLI only accepts it as `-P <password>`, so it is visible in the
    /// process list of the controller host while a call is running. Prefer
    /// the local socket, which needs no credentials, where possible.
    pub password: Option<String>,
    /// Timeout for fire-and-return calls.
    pub call_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            midclt_path: PathBuf::from("midclt"),
            remote_url: None,
            username: None,
            password: None,
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("midclt_path", &self.midclt_path)
            .field("remote_url", &self.remote_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `APPSTATE_MIDCLT_PATH`: Remote control CLI (default: "midclt")
    /// - `APPSTATE_REMOTE_URL`: Remote endpoint URL (default: local socket)
    /// - `APPSTATE_REMOTE_USER`: Username for the remote endpoint
    /// - `APPSTATE_REMOTE_PASSWORD`: Password for the remote endpoint
    /// - `APPSTATE_CALL_TIMEOUT_MS`: Timeout for queries in milliseconds (default: 30000)
    pub fn from_env() -> Result<Self> {
        let midclt_path = PathBuf::from(
            std::env::var("APPSTATE_MIDCLT_PATH").unwrap_or_else(|_| "midclt".to_string()),
        );

        let remote_url = non_empty_var("APPSTATE_REMOTE_URL");
        let username = non_empty_var("APPSTATE_REMOTE_USER");
        let password = non_empty_var("APPSTATE_REMOTE_PASSWORD");

        if password.is_some() && username.is_none() {
            return Err(ClientError::Config(
                "APPSTATE_REMOTE_PASSWORD requires APPSTATE_REMOTE_USER".to_string(),
            ));
        }

        let call_timeout_ms: u64 = std::env::var("APPSTATE_CALL_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse()
            .map_err(|e| ClientError::Config(format!("invalid APPSTATE_CALL_TIMEOUT_MS: {}", e)))?;

        Ok(Self {
            midclt_path,
            remote_url,
            username,
            password,
            call_timeout: Duration::from_millis(call_timeout_ms),
        })
    }

    /// Set the remote control CLI path.
    pub fn with_midclt_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.midclt_path = path.into();
        self
    }

    /// Set the remote endpoint URL.
    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.remote_url = Some(url.into());
        self
    }

    /// Set the credentials for the remote endpoint.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the timeout for fire-and-return calls.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
