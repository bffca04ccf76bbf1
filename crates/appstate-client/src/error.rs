// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for appstate-client.

use thiserror::Error;

/// Result type using ClientError.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the remote host.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error (missing or invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The call could not be delivered (process spawn, connection, I/O).
    #[error("transport error calling {method}: {message}")]
    Transport { method: String, message: String },

    /// The remote host reported a failure for the call.
    #[error("remote error from {method}: {message}")]
    Remote { method: String, message: String },

    /// The call did not complete within its timeout.
    #[error("{method} timed out after {timeout_ms}ms")]
    Timeout { method: String, timeout_ms: u64 },
}

impl ClientError {
    /// Name of the remote method the error belongs to, if any.
    pub fn method(&self) -> Option<&str> {
        match self {
            ClientError::Config(_) => None,
            ClientError::Transport { method, .. }
            | ClientError::Remote { method, .. }
            | ClientError::Timeout { method, .. } => Some(method),
        }
    }

    /// Check if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout { .. })
    }
}
