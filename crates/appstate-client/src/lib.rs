// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! appstate Remote Control Client
//!
//! Narrow client surface used by the appstate controller to talk to the
//! remote application host.
//!
//! # Architecture
//!
//! The controller only ever needs two kinds of remote operations:
//! - `call`: fire-and-return, used for queries (`app.query`)
//! - `call_and_wait`: act-and-wait, used for state-changing actions
//!   (`app.create`, `app.update`, `app.start`, `app.stop`, `app.delete`).
//!   The remote side polls the job to completion; the caller only sees the
//!   terminal outcome or a timeout.
//!
//! Both are expressed by the [`RemoteClient`] trait. Two implementations ship
//! with this crate:
//! - [`MidcltClient`]: spawns the remote control CLI (`midclt`) per call
//! - [`MockClient`]: in-memory application table that records every call
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use appstate_client::{MidcltClient, RemoteClient, methods};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MidcltClient::from_env()?;
//!
//! let apps = client
//!     .call(methods::APP_QUERY, vec![serde_json::json!([["name", "=", "web"]])])
//!     .await?;
//! println!("apps: {}", apps);
//!
//! client
//!     .call_and_wait(
//!         methods::APP_START,
//!         vec![serde_json::json!("web")],
//!         Duration::from_secs(120),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod midclt;
mod mock;

pub mod methods;

pub use client::RemoteClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use midclt::MidcltClient;
pub use mock::{MockClient, RecordedCall};
