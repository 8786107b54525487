// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Flag-backed access checks for routers and request handlers.

use feato_client_core::{GuardOptions, GuardOutcome};
use tracing::debug;

use crate::client::FeatoClient;

/// Gate keyed on a single flag.
///
/// ```ignore
/// let guard = FlagGuard::new("checkout.new_flow", GuardOptions::new().with_redirect("/"));
/// match guard.check(&client) {
///     GuardOutcome::Allow => render_checkout(),
///     GuardOutcome::Redirect(to) => redirect(to),
///     GuardOutcome::Deny => not_found(),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FlagGuard {
	key: String,
	options: GuardOptions,
}

impl FlagGuard {
	pub fn new(key: impl Into<String>, options: GuardOptions) -> Self {
		Self {
			key: key.into(),
			options,
		}
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	/// Decides against the client's current flags. Never touches the network.
	pub fn check(&self, client: &FeatoClient) -> GuardOutcome {
		let value = client.flag(&self.key);
		let outcome = self.options.resolve(value);
		debug!(flag_key = %self.key, value = ?value, outcome = ?outcome, "Guard evaluated");
		outcome
	}
}
