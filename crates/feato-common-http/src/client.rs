// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP client construction with the Feato User-Agent header.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

/// SDK name reported in the User-Agent.
pub const SDK_NAME: &str = "feato-client-rust";

/// Creates a client builder carrying the standard User-Agent.
///
/// Use this when the caller needs to customize the client, e.g. a timeout
/// for the snapshot fetch. Streaming clients must not set a total timeout,
/// since the event stream is held open indefinitely.
///
/// # Example
/// ```ignore
/// let client = feato_common_http::builder()
///     .timeout(Duration::from_secs(10))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Creates a client builder with a caller-provided User-Agent.
pub fn builder_with_user_agent(user_agent: impl Into<String>) -> ClientBuilder {
	Client::builder().user_agent(user_agent.into())
}

/// Builds a client with the standard User-Agent and a total request timeout.
pub fn new_client_with_timeout(timeout: Duration) -> reqwest::Result<Client> {
	builder().timeout(timeout).build()
}

/// Returns the standard User-Agent string.
///
/// Format: `feato-client-rust/{version} ({os}-{arch})`
pub fn user_agent() -> String {
	format!(
		"{}/{} ({}-{})",
		SDK_NAME,
		env!("CARGO_PKG_VERSION"),
		std::env::consts::OS,
		std::env::consts::ARCH
	)
}
