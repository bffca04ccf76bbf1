// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for appstate-controller.

use appstate_client::ClientError;
use thiserror::Error;

/// Controller errors.
///
/// Every variant is fatal to the lifecycle operation that produced it.
/// Action failures name the phase that failed so operators can tell a
/// possibly-still-running app (stop failed) from a definitely-down one
/// (start failed after a successful stop).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration loading failed.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// The plan or persisted state is unusable.
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    /// The state query could not be delivered or was rejected.
    #[error("Failed to query app {name}: {source}")]
    Query {
        /// Application name.
        name: String,
        /// Underlying client error.
        #[source]
        source: ClientError,
    },

    /// The state query response did not decode.
    #[error("Failed to decode query response for app {name}: {source}")]
    Decode {
        /// Application name.
        name: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The app was expected to exist but the remote listing does not have it.
    #[error("App {name} not found")]
    NotFound {
        /// Application name.
        name: String,
    },

    /// The remote create call failed.
    #[error("Failed to create app {name}: {source}")]
    Create {
        /// Application name.
        name: String,
        /// Underlying client error.
        #[source]
        source: ClientError,
    },

    /// Create reported success but the app is not listed afterwards.
    #[error("App {name} not found after a successful create")]
    MissingAfterCreate {
        /// Application name.
        name: String,
    },

    /// Create succeeded but the follow-up query failed.
    #[error("Failed to read app {name} after create: {source}")]
    QueryAfterCreate {
        /// Application name.
        name: String,
        /// The query or decode error.
        #[source]
        source: Box<Error>,
    },

    /// The remote update call failed.
    #[error("Failed to update app {name}: {source}")]
    Update {
        /// Application name.
        name: String,
        /// Underlying client error.
        #[source]
        source: ClientError,
    },

    /// The remote delete call failed.
    #[error("Failed to delete app {name}: {source}")]
    Delete {
        /// Application name.
        name: String,
        /// Underlying client error.
        #[source]
        source: ClientError,
    },

    /// Starting the app to reach the desired state failed.
    #[error("Failed to start app {name} (desired state running): {source}")]
    Start {
        /// Application name.
        name: String,
        /// Underlying client error.
        #[source]
        source: ClientError,
    },

    /// Stopping the app to reach the desired state failed.
    #[error("Failed to stop app {name} (desired state stopped): {source}")]
    Stop {
        /// Application name.
        name: String,
        /// Underlying client error.
        #[source]
        source: ClientError,
    },

    /// The stop phase of a restart failed; start was not attempted.
    #[error("Restart of app {name} failed in stop phase: {source}")]
    RestartStop {
        /// Application name.
        name: String,
        /// Underlying client error.
        #[source]
        source: ClientError,
    },

    /// The start phase of a restart failed after a successful stop.
    #[error("Restart of app {name} failed in start phase, app is stopped: {source}")]
    RestartStart {
        /// Application name.
        name: String,
        /// Underlying client error.
        #[source]
        source: ClientError,
    },

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization of persisted state failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Short, stable summary used for host diagnostics.
    pub fn summary(&self) -> &'static str {
        match self {
            Error::Config(_) => "Invalid configuration",
            Error::InvalidPlan(_) => "Invalid plan",
            Error::Query { .. } => "Query failed",
            Error::Decode { .. } => "Unreadable query response",
            Error::NotFound { .. } => "App not found",
            Error::Create { .. } => "Create failed",
            Error::MissingAfterCreate { .. } => "App missing after create",
            Error::QueryAfterCreate { .. } => "Query after create failed",
            Error::Update { .. } => "Update failed",
            Error::Delete { .. } => "Delete failed",
            Error::Start { .. } => "Start failed",
            Error::Stop { .. } => "Stop failed",
            Error::RestartStop { .. } => "Restart failed (stop phase)",
            Error::RestartStart { .. } => "Restart failed (start phase)",
            Error::Io(_) => "I/O error",
            Error::Json(_) => "Invalid state file",
        }
    }
}

/// Result type using controller Error.
pub type Result<T> = std::result::Result<T, Error>;
