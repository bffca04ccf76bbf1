// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration for appstate-controller.

use std::time::Duration;

/// Default timeout for create/update/delete jobs.
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(600);

/// Controller configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Timeout for the create, update and delete act-and-wait calls.
    /// Start and stop use the resource's own `state_timeout`.
    pub job_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            job_timeout: DEFAULT_JOB_TIMEOUT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let job_timeout = match std::env::var("APPSTATE_JOB_TIMEOUT_MS") {
            Ok(value) => {
                let ms: u64 = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("APPSTATE_JOB_TIMEOUT_MS"))?;
                if ms == 0 {
                    return Err(ConfigError::InvalidValue("APPSTATE_JOB_TIMEOUT_MS"));
                }
                Duration::from_millis(ms)
            }
            Err(_) => DEFAULT_JOB_TIMEOUT,
        };

        Ok(Self { job_timeout })
    }

    /// Set the job timeout.
    pub fn with_job_timeout(mut self, timeout: Duration) -> Self {
        self.job_timeout = timeout;
        self
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable holds an unusable value.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
