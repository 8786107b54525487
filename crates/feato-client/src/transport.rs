// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Network access for the client.
//!
//! The client never talks to the network directly. It goes through a
//! [`FlagTransport`], which fetches the snapshot, reports whether live
//! streaming is available on this host, and opens the update stream. The
//! default [`HttpFlagTransport`] speaks plain HTTP and server-sent events.

use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::{EventStreamError, Eventsource};
use feato_client_core::{Environment, FlagsSnapshot, ProjectKey, PROTOCOL_VERSION};
use futures::stream::BoxStream;
use futures::{future, StreamExt};
use reqwest::Client;
use tracing::debug;

use crate::error::{FeatoError, Result};

/// Stream of raw message payloads from the live-update connection.
///
/// Each item is the `data` of one SSE message. An `Err` item means the
/// transport failed; the stream is not polled again after it.
pub type MessageStream = BoxStream<'static, Result<String>>;

/// Capability the client uses to reach the Feato service.
#[async_trait]
pub trait FlagTransport: Send + Sync + 'static {
	/// Fetches the full flag mapping for one environment.
	async fn fetch_snapshot(
		&self,
		project_key: &ProjectKey,
		environment: Environment,
	) -> Result<FlagsSnapshot>;

	/// Whether this host can hold a live-update connection at all.
	///
	/// When false the client silently skips streaming.
	fn supports_streaming(&self) -> bool {
		true
	}

	/// Opens the live-update stream. Resolves once the server has accepted it.
	async fn open_stream(
		&self,
		project_key: &ProjectKey,
		environment: Environment,
	) -> Result<MessageStream>;
}

/// HTTP + SSE transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFlagTransport {
	base_url: String,
	/// Client with a total request timeout, for the snapshot.
	snapshot_client: Client,
	/// Client without a total timeout, since the stream stays open.
	stream_client: Client,
}

impl HttpFlagTransport {
	/// Creates a transport for `base_url` (no trailing slash).
	pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self> {
		let snapshot_client =
			feato_common_http::new_client_with_timeout(request_timeout).map_err(FeatoError::HttpClient)?;
		let stream_client = feato_common_http::builder()
			.connect_timeout(request_timeout)
			.build()
			.map_err(FeatoError::HttpClient)?;

		Ok(Self {
			base_url: base_url.into(),
			snapshot_client,
			stream_client,
		})
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}
}

#[async_trait]
impl FlagTransport for HttpFlagTransport {
	async fn fetch_snapshot(
		&self,
		project_key: &ProjectKey,
		environment: Environment,
	) -> Result<FlagsSnapshot> {
		let url = format!("{}/feature-flag", self.base_url);

		let response = self
			.snapshot_client
			.get(&url)
			.query(&[
				("secret", project_key.expose().as_str()),
				("environment", environment.as_str()),
			])
			.send()
			.await
			.map_err(|e| FeatoError::ConnectionFailed(e.without_url()))?;

		let status = response.status();
		if !status.is_success() {
			return Err(FeatoError::ServerError {
				status: status.as_u16(),
				message: response.text().await.unwrap_or_default(),
			});
		}

		response
			.json::<FlagsSnapshot>()
			.await
			.map_err(|e| FeatoError::ParseFailed(e.without_url().to_string()))
	}

	async fn open_stream(
		&self,
		project_key: &ProjectKey,
		environment: Environment,
	) -> Result<MessageStream> {
		let url = format!("{}/hub", self.base_url);
		let version = PROTOCOL_VERSION.to_string();

		let response = self
			.stream_client
			.get(&url)
			.query(&[
				("secret", project_key.expose().as_str()),
				("environment", environment.as_str()),
				("version", version.as_str()),
			])
			.header("Accept", "text/event-stream")
			.header("Cache-Control", "no-cache")
			.send()
			.await
			.map_err(|e| FeatoError::ConnectionFailed(e.without_url()))?;

		let status = response.status();
		if !status.is_success() {
			return Err(FeatoError::ServerError {
				status: status.as_u16(),
				message: response.text().await.unwrap_or_default(),
			});
		}

		let messages = response
			.bytes_stream()
			.eventsource()
			.filter_map(|event| {
				future::ready(match event {
					// Keep-alives and comments carry no data
					Ok(event) if event.data.is_empty() => None,
					Ok(event) if !event.event.is_empty() && event.event != "message" => {
						debug!(event_type = %event.event, "Ignoring named SSE event");
						None
					}
					Ok(event) => Some(Ok(event.data)),
					Err(EventStreamError::Transport(e)) => {
						Some(Err(FeatoError::SseStreamError(e.without_url().to_string())))
					}
					Err(e) => Some(Err(FeatoError::SseStreamError(e.to_string()))),
				})
			});

		Ok(messages.boxed())
	}
}
