// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the Feato client.
//!
//! Only construction and configuration errors reach the caller. Failures of
//! the snapshot fetch and the live stream are logged and absorbed by the
//! client; they use these types internally so the log lines stay structured.

use std::path::PathBuf;

use feato_client_core::CoreError;
use thiserror::Error;

/// Result type alias for the Feato client.
pub type Result<T> = std::result::Result<T, FeatoError>;

/// Errors that can occur in the Feato client.
#[derive(Error, Debug)]
pub enum FeatoError {
	/// Project key is missing or empty.
	#[error("invalid or missing project key")]
	InvalidProjectKey,

	/// No environment was configured.
	#[error("environment is required")]
	MissingEnvironment,

	/// Base URL is not an http(s) URL.
	#[error("invalid base URL: {0}")]
	InvalidBaseUrl(String),

	/// A core type failed to parse or validate.
	#[error(transparent)]
	Core(#[from] CoreError),

	/// A required environment variable is not set.
	#[error("{var} (or {var}_FILE) is not set")]
	MissingEnv {
		/// The variable name.
		var: String,
	},

	/// A `*_FILE` secret could not be read.
	#[error("failed to read secret file at {path}: {source}")]
	SecretFile {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// The HTTP client could not be constructed.
	#[error("failed to build HTTP client: {0}")]
	HttpClient(#[source] reqwest::Error),

	/// The request never produced a response.
	#[error("failed to connect to server: {0}")]
	ConnectionFailed(#[source] reqwest::Error),

	/// Server returned a non-success status.
	#[error("server returned an error: {status} - {message}")]
	ServerError {
		/// HTTP status code.
		status: u16,
		/// Response body, if any.
		message: String,
	},

	/// Response body did not match the expected shape.
	#[error("failed to parse server response: {0}")]
	ParseFailed(String),

	/// The live-update stream failed mid-flight.
	#[error("SSE stream error: {0}")]
	SseStreamError(String),

	/// A pushed message was not a valid flag update.
	#[error("malformed flag update: {0}")]
	MalformedUpdate(String),

	/// The client was constructed outside a Tokio runtime.
	#[error("the Feato client must be created inside a Tokio runtime")]
	NoRuntime,

	/// The snapshot did not arrive in time.
	#[error("client initialization timed out")]
	InitializationTimeout,

	/// The client was dropped while a caller was still waiting on it.
	#[error("client has been closed")]
	ClientClosed,
}

impl FeatoError {
	/// Returns true if retrying the same operation may succeed.
	pub fn is_retryable(&self) -> bool {
		matches!(
			self,
			FeatoError::ConnectionFailed(_)
				| FeatoError::SseStreamError(_)
				| FeatoError::ServerError {
					status: 429 | 500..=599,
					..
				}
		)
	}
}
