// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! File-backed state persistence for the command line host.
//!
//! State and plan files are pretty-printed JSON documents with the shape of
//! [`AppState`] and [`AppConfig`]. Writes go through a sibling temporary file
//! and a rename so a failed operation never leaves a truncated state file.

use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;

use crate::error::Result;
use crate::state::{AppConfig, AppState};

/// Load a plan file.
pub async fn load_plan(path: &Path) -> Result<AppConfig> {
    let bytes = fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Load a state file.
pub async fn load_state(path: &Path) -> Result<AppState> {
    let bytes = fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Persist `state` to `path`.
pub async fn save_state(path: &Path, state: &AppState) -> Result<()> {
    let mut json = serde_json::to_vec_pretty(state)?;
    json.push(b'\n');

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, &json).await?;
    fs::rename(&tmp, path).await?;

    debug!(path = %path.display(), "State saved");
    Ok(())
}

/// Remove a state file. A missing file is not an error.
pub async fn remove_state(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// SHA-256 hex digest of a file's contents, for use as a restart trigger.
pub async fn fingerprint_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).await?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}
