// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Remote method names for the application API.

/// List applications, optionally filtered (`[["name", "=", <name>]]`).
pub const APP_QUERY: &str = "app.query";

/// Create an application from a compose payload.
pub const APP_CREATE: &str = "app.create";

/// Update an application's configuration.
pub const APP_UPDATE: &str = "app.update";

/// Start an application.
pub const APP_START: &str = "app.start";

/// Stop an application.
pub const APP_STOP: &str = "app.stop";

/// Delete an application.
pub const APP_DELETE: &str = "app.delete";
