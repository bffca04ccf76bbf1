// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! appstate Controller - Desired-State Lifecycle Management
//!
//! This crate implements the managed-resource controller for a remotely
//! hosted containerized application. An external host persists the
//! resource's configuration and last-known state and invokes the lifecycle
//! operations; the controller turns the declared desired state into a
//! bounded sequence of remote calls.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Host (appstate-ctl, IaC framework, ...)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//!                                    │ create / read / update / delete / import
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Lifecycle Orchestrator (AppController)               │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐     │
//! │  │   State     │  │  Drift &    │  │  Restart    │  │ Reconcile   │     │
//! │  │   Query     │  │  Defaults   │  │  Triggers   │  │  Engine     │     │
//! │  └─────────────┘  └─────────────┘  └─────────────┘  └─────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//!                                    │ call / call_and_wait
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    RemoteClient (appstate-client)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Reconciliation State Machine
//!
//! | Desired | Observed | Action |
//! |---------|----------|--------|
//! | running | running  | none   |
//! | running | stopped  | start  |
//! | running | crashed  | start  |
//! | running | other    | none   |
//! | stopped | stopped  | none   |
//! | stopped | crashed  | none   |
//! | stopped | running  | stop   |
//! | stopped | other    | none   |
//!
//! Each action is a single act-and-wait call capped by the resource's
//! `state_timeout` (default 120s). Nothing is retried.
//!
//! # Configuration
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `APPSTATE_JOB_TIMEOUT_MS` | `600000` | Timeout for create/update/delete jobs |
//!
//! Client variables (`APPSTATE_MIDCLT_PATH`, `APPSTATE_REMOTE_URL`, ...) are
//! documented in `appstate-client`.
//!
//! # Modules
//!
//! - [`config`]: Controller configuration from environment variables
//! - [`diagnostics`]: Non-fatal warnings and host-facing error reports
//! - [`error`]: Error types for lifecycle operations
//! - [`host`]: File-backed state persistence used by `appstate-ctl`
//! - [`lifecycle`]: Create, read, update, delete and import
//! - [`query`]: Remote state lookup by application name
//! - [`reconcile`]: Desired-state decision function and its executor
//! - [`resolve`]: Drift detection and default resolution on refresh
//! - [`state`]: Plan, persisted state and remote record types
//! - [`triggers`]: Restart-trigger comparison and two-phase restart

#![deny(missing_docs)]

/// Controller configuration loaded from environment variables.
pub mod config;

/// Diagnostics reported back to the host.
pub mod diagnostics;

/// Error types for lifecycle operations.
pub mod error;

/// File-backed state persistence for the command line host.
pub mod host;

/// Lifecycle orchestration (create, read, update, delete, import).
pub mod lifecycle;

/// Remote state lookup.
pub mod query;

/// Desired-state reconciliation engine.
pub mod reconcile;

/// Drift detection and default resolution.
pub mod resolve;

/// Resource state model.
pub mod state;

/// Restart-trigger comparison.
pub mod triggers;

pub use config::Config;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{Error, Result};
pub use lifecycle::{AppController, ReadOutcome};
pub use reconcile::Action;
pub use state::{AppConfig, AppRecord, AppState, DesiredState, ObservedState};
