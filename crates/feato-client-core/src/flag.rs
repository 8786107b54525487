// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Flag snapshot and update event types.
//!
//! # Wire format
//!
//! Snapshot (`GET /feature-flag`):
//!
//! ```json
//! { "environment": "prod", "flags": { "checkout.new_flow": true } }
//! ```
//!
//! Update (one SSE message on `/hub`):
//!
//! ```json
//! { "key": "checkout.new_flow", "value": false, "updatedAt": "2025-01-01T00:00:00Z" }
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Environment;

/// Flag key to boolean value.
pub type FlagSet = HashMap<String, bool>;

/// Full flag mapping for one environment, fetched once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagsSnapshot {
	/// The environment this snapshot belongs to.
	pub environment: Environment,
	/// Map of flag key to enabled.
	pub flags: FlagSet,
}

/// A single flag change pushed over the live-update stream.
///
/// `updated_at` is carried for diagnostics only. Updates are applied in
/// delivery order regardless of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagUpdateEvent {
	pub key: String,
	pub value: bool,
	/// Defaults to the Unix epoch when the server omits it.
	#[serde(rename = "updatedAt", default = "unix_epoch")]
	pub updated_at: DateTime<Utc>,
}

fn unix_epoch() -> DateTime<Utc> {
	DateTime::<Utc>::UNIX_EPOCH
}

impl FlagUpdateEvent {
	/// Creates an update stamped with the current time.
	pub fn new(key: impl Into<String>, value: bool) -> Self {
		Self {
			key: key.into(),
			value,
			updated_at: Utc::now(),
		}
	}

	/// Parses the `data` field of an SSE message.
	pub fn from_message(data: &str) -> serde_json::Result<Self> {
		serde_json::from_str(data)
	}
}
