// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Deployment context that scopes which flag values apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
	Prod,
	Dev,
	Stage,
	Qa,
	Preview,
}

impl Environment {
	/// Every supported environment, in the order the server documents them.
	pub const ALL: [Environment; 5] = [
		Environment::Prod,
		Environment::Dev,
		Environment::Stage,
		Environment::Qa,
		Environment::Preview,
	];

	/// The wire name, as sent in the `environment` query parameter.
	pub fn as_str(&self) -> &'static str {
		match self {
			Environment::Prod => "prod",
			Environment::Dev => "dev",
			Environment::Stage => "stage",
			Environment::Qa => "qa",
			Environment::Preview => "preview",
		}
	}
}

impl fmt::Display for Environment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Environment {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Environment::ALL
			.into_iter()
			.find(|env| env.as_str() == s.trim())
			.ok_or_else(|| CoreError::UnknownEnvironment(s.to_string()))
	}
}
