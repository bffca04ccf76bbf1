// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! RemoteClient trait definition.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::error::Result;

/// Trait for remote application hosts.
///
/// Implementations are pure transports: they know how to deliver a method
/// call and how to wait for a job, nothing about desired state. Parameters
/// are positional JSON arguments.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Issue a call and return its result without job semantics.
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value>;

    /// Issue a call and block until the remote job reaches a terminal
    /// outcome, or until `timeout` elapses.
    ///
    /// Dropping the returned future aborts the in-flight call.
    async fn call_and_wait(
        &self,
        method: &str,
        params: Vec<Value>,
        timeout: Duration,
    ) -> Result<Value>;
}

