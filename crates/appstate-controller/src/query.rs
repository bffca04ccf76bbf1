// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Remote state lookup by application name.

use appstate_client::{RemoteClient, methods};
use serde_json::json;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::state::AppRecord;

/// Outcome of a state query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The app is listed; first match.
    Found(AppRecord),
    /// The listing is empty for this name.
    NotFound,
}

impl QueryOutcome {
    /// The record, if found.
    pub fn into_record(self) -> Option<AppRecord> {
        match self {
            QueryOutcome::Found(record) => Some(record),
            QueryOutcome::NotFound => None,
        }
    }
}

/// Query the remote listing for `name`. Never mutates remote state.
#[instrument(skip(client), fields(app = %name))]
pub async fn query_app(client: &dyn RemoteClient, name: &str) -> Result<QueryOutcome> {
    let response = client
        .call(methods::APP_QUERY, vec![json!([["name", "=", name]])])
        .await
        .map_err(|source| Error::Query {
            name: name.to_string(),
            source,
        })?;

    let records: Vec<AppRecord> =
        serde_json::from_value(response).map_err(|source| Error::Decode {
            name: name.to_string(),
            source,
        })?;

    match records.into_iter().next() {
        Some(record) => {
            debug!(state = %record.state, "App found");
            Ok(QueryOutcome::Found(record))
        }
        None => {
            debug!("App not found");
            Ok(QueryOutcome::NotFound)
        }
    }
}
