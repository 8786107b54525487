// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client configuration.
//!
//! A [`ClientConfig`] is supplied once at construction and never mutated.
//! It can be built in code or loaded from the environment:
//!
//! | Variable                  | Meaning                                        |
//! |---------------------------|------------------------------------------------|
//! | `FEATO_PROJECT_KEY`       | Project key (secret)                           |
//! | `FEATO_PROJECT_KEY_FILE`  | Path to a file holding the project key         |
//! | `FEATO_ENVIRONMENT`       | One of `prod`, `dev`, `stage`, `qa`, `preview` |
//! | `FEATO_BASE_URL`          | API base URL, optional                         |
//!
//! `FEATO_PROJECT_KEY_FILE` takes precedence over `FEATO_PROJECT_KEY`, which
//! fits Docker and Kubernetes secret mounts.

use std::path::PathBuf;
use std::time::Duration;

use feato_client_core::{Environment, ProjectKey};

use crate::error::{FeatoError, Result};
use crate::sse::SseConfig;

/// Default Feato API base URL.
pub const DEFAULT_BASE_URL: &str = "https://feato-hub-service-229218510057.us-central1.run.app/v1";

pub const ENV_PROJECT_KEY: &str = "FEATO_PROJECT_KEY";
pub const ENV_ENVIRONMENT: &str = "FEATO_ENVIRONMENT";
pub const ENV_BASE_URL: &str = "FEATO_BASE_URL";

/// Configuration for the Feato client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
	/// Project key, sent as the `secret` query parameter.
	pub project_key: ProjectKey,
	/// Environment whose flag values apply.
	pub environment: Environment,
	/// API base URL without a trailing slash.
	pub base_url: String,
	/// Timeout for the initial snapshot request.
	pub request_timeout: Duration,
	/// Whether to open the live-update stream after the snapshot loads.
	pub enable_streaming: bool,
	/// Live-update stream behavior.
	pub sse_config: SseConfig,
}

impl ClientConfig {
	/// Creates a configuration with default transport settings.
	pub fn new(project_key: ProjectKey, environment: Environment) -> Self {
		Self {
			project_key,
			environment,
			base_url: DEFAULT_BASE_URL.to_string(),
			request_timeout: Duration::from_secs(10),
			enable_streaming: true,
			sse_config: SseConfig::default(),
		}
	}

	/// Loads configuration from the process environment.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|var| std::env::var(var).ok())
	}

	/// Loads configuration through an arbitrary variable lookup.
	pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let project_key = load_secret(&lookup, ENV_PROJECT_KEY)?.ok_or_else(|| {
			FeatoError::MissingEnv {
				var: ENV_PROJECT_KEY.to_string(),
			}
		})?;

		let environment: Environment = lookup(ENV_ENVIRONMENT)
			.ok_or(FeatoError::MissingEnvironment)?
			.parse()?;

		let mut config = ClientConfig::new(project_key, environment);
		if let Some(base_url) = lookup(ENV_BASE_URL).filter(|s| !s.trim().is_empty()) {
			config.base_url = normalize_base_url(&base_url)?;
		}

		Ok(config)
	}
}

/// Validates an http(s) base URL and strips trailing slashes.
pub(crate) fn normalize_base_url(url: &str) -> Result<String> {
	let trimmed = url.trim().trim_end_matches('/');

	let has_host = trimmed
		.strip_prefix("https://")
		.or_else(|| trimmed.strip_prefix("http://"))
		.is_some_and(|rest| !rest.is_empty());

	if !has_host {
		return Err(FeatoError::InvalidBaseUrl(url.to_string()));
	}

	Ok(trimmed.to_string())
}

/// Reads `{var}_FILE` if set, else `{var}`.
///
/// Trailing line endings (LF or CRLF) in the file are stripped.
fn load_secret<F>(lookup: &F, var: &str) -> Result<Option<ProjectKey>>
where
	F: Fn(&str) -> Option<String>,
{
	let file_var = format!("{var}_FILE");

	if let Some(path) = lookup(&file_var) {
		if path.is_empty() {
			return Err(FeatoError::MissingEnv { var: var.to_string() });
		}

		let path = PathBuf::from(path);
		let content = std::fs::read_to_string(&path)
			.map_err(|source| FeatoError::SecretFile { path, source })?;
		let key = content.trim_end_matches(['\r', '\n']);

		return ProjectKey::parse(key)
			.map(Some)
			.map_err(|_| FeatoError::InvalidProjectKey);
	}

	match lookup(var) {
		Some(value) => ProjectKey::parse(value)
			.map(Some)
			.map_err(|_| FeatoError::InvalidProjectKey),
		None => Ok(None),
	}
}
