// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Feature flags client that mirrors one environment's flags locally.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use feato_client_core::{ConnectionState, Environment, FlagSet, ProjectKey};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::{normalize_base_url, ClientConfig, DEFAULT_BASE_URL};
use crate::error::{FeatoError, Result};
use crate::sse::{SseConfig, SseConnection, StreamStatus};
use crate::store::{FlagStore, FlagWatch};
use crate::transport::{FlagTransport, HttpFlagTransport};

/// Builder for constructing a FeatoClient.
pub struct FeatoClientBuilder {
	project_key: Option<ProjectKey>,
	environment: Option<Environment>,
	base_url: String,
	request_timeout: Duration,
	enable_streaming: bool,
	sse_config: SseConfig,
	transport: Option<Arc<dyn FlagTransport>>,
}

impl FeatoClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			project_key: None,
			environment: None,
			base_url: DEFAULT_BASE_URL.to_string(),
			request_timeout: Duration::from_secs(10),
			enable_streaming: true,
			sse_config: SseConfig::default(),
			transport: None,
		}
	}

	/// Starts from a complete configuration, e.g. one loaded with
	/// [`ClientConfig::from_env`].
	pub fn config(mut self, config: ClientConfig) -> Self {
		self.project_key = Some(config.project_key);
		self.environment = Some(config.environment);
		self.base_url = config.base_url;
		self.request_timeout = config.request_timeout;
		self.enable_streaming = config.enable_streaming;
		self.sse_config = config.sse_config;
		self
	}

	/// Sets the project key used to authenticate with the Feato service.
	pub fn project_key(mut self, key: impl Into<String>) -> Self {
		self.project_key = Some(ProjectKey::new(key.into()));
		self
	}

	/// Sets the environment whose flags the client mirrors.
	pub fn environment(mut self, environment: Environment) -> Self {
		self.environment = Some(environment);
		self
	}

	/// Overrides the API base URL.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = url.into();
		self
	}

	/// Sets the timeout for the initial snapshot request.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	/// Enables or disables the live-update stream.
	pub fn enable_streaming(mut self, enable: bool) -> Self {
		self.enable_streaming = enable;
		self
	}

	/// Sets the SSE configuration.
	pub fn sse_config(mut self, config: SseConfig) -> Self {
		self.sse_config = config;
		self
	}

	/// Replaces the default HTTP transport.
	pub fn transport(mut self, transport: Arc<dyn FlagTransport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Validates the configuration and starts the client.
	///
	/// Returns as soon as initialization has been scheduled; flags arrive in
	/// the background. Must be called from within a Tokio runtime.
	pub fn build(self) -> Result<FeatoClient> {
		let project_key = self
			.project_key
			.filter(|key| !key.expose().trim().is_empty())
			.ok_or(FeatoError::InvalidProjectKey)?;
		let environment = self.environment.ok_or(FeatoError::MissingEnvironment)?;
		let base_url = normalize_base_url(&self.base_url)?;

		let transport: Arc<dyn FlagTransport> = match self.transport {
			Some(transport) => transport,
			None => Arc::new(HttpFlagTransport::new(
				base_url.clone(),
				self.request_timeout,
			)?),
		};

		let config = ClientConfig {
			project_key,
			environment,
			base_url,
			request_timeout: self.request_timeout,
			enable_streaming: self.enable_streaming,
			sse_config: self.sse_config,
		};

		FeatoClient::new(config, transport)
	}
}

impl Default for FeatoClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Client that keeps a local, live copy of one environment's feature flags.
///
/// Construction fetches the current flags in the background and then keeps
/// them current over a server-sent event stream, reconnecting with
/// exponential backoff whenever the stream drops. All reads are served from
/// memory and never block on the network.
///
/// Cloning is cheap; all clones share one connection and one flag set.
#[derive(Clone)]
pub struct FeatoClient {
	inner: Arc<ClientInner>,
}

struct ClientInner {
	config: ClientConfig,
	transport: Arc<dyn FlagTransport>,
	store: FlagStore,
	status: Arc<StreamStatus>,
	sse: Mutex<SseConnection>,
	/// Set by `disconnect()`; the stream is never opened afterwards.
	closed: AtomicBool,
}

impl FeatoClient {
	/// Creates a new builder for constructing a FeatoClient.
	pub fn builder() -> FeatoClientBuilder {
		FeatoClientBuilder::new()
	}

	/// Starts a client with an explicit configuration and transport.
	pub fn new(config: ClientConfig, transport: Arc<dyn FlagTransport>) -> Result<Self> {
		let runtime = tokio::runtime::Handle::try_current().map_err(|_| FeatoError::NoRuntime)?;

		let sse = SseConnection::new();
		let inner = Arc::new(ClientInner {
			config,
			transport,
			store: FlagStore::new(),
			status: sse.status(),
			sse: Mutex::new(sse),
			closed: AtomicBool::new(false),
		});

		debug!(
			environment = %inner.config.environment,
			base_url = %inner.config.base_url,
			"Starting Feato client"
		);
		runtime.spawn(initialize(Arc::clone(&inner)));

		Ok(Self { inner })
	}

	/// Closes the live-update stream and cancels any pending reconnect.
	///
	/// Safe to call at any time and any number of times. The stream is not
	/// opened again by this client, including by an initialization that is
	/// still in flight. Flags already loaded stay readable.
	pub async fn disconnect(&self) {
		self.inner.closed.store(true, Ordering::SeqCst);
		self.inner.sse.lock().await.stop().await;
	}

	/// Current value of a flag, or `None` if it is unknown.
	pub fn flag(&self, key: &str) -> Option<bool> {
		self.inner.store.get(key)
	}

	/// Live view of a single flag.
	pub fn watch_flag(&self, key: impl Into<String>) -> FlagWatch {
		self.inner.store.watch_flag(key)
	}

	/// Snapshot of every flag.
	pub fn flags(&self) -> Arc<FlagSet> {
		self.inner.store.snapshot()
	}

	/// Receiver woken whenever the flag set changes.
	pub fn subscribe(&self) -> watch::Receiver<Arc<FlagSet>> {
		self.inner.store.subscribe()
	}

	/// Whether the initial snapshot has been applied.
	pub fn initialized(&self) -> bool {
		self.inner.store.is_initialized()
	}

	pub fn subscribe_initialized(&self) -> watch::Receiver<bool> {
		self.inner.store.subscribe_initialized()
	}

	/// Waits until the initial snapshot has been applied.
	///
	/// A failed initialization is never retried, so this returns
	/// [`FeatoError::InitializationTimeout`] once `timeout` elapses.
	pub async fn wait_initialized(&self, timeout: Duration) -> Result<()> {
		let mut rx = self.inner.store.subscribe_initialized();
		let ready = async { rx.wait_for(|ready| *ready).await.map(|_| ()) };
		match tokio::time::timeout(timeout, ready).await {
			Ok(Ok(())) => Ok(()),
			Ok(Err(_)) => Err(FeatoError::ClientClosed),
			Err(_) => Err(FeatoError::InitializationTimeout),
		}
	}

	pub fn connection_state(&self) -> ConnectionState {
		self.inner.status.state()
	}

	pub fn subscribe_connection_state(&self) -> watch::Receiver<ConnectionState> {
		self.inner.status.subscribe()
	}

	/// Consecutive stream failures since the last applied update.
	pub fn reconnect_attempts(&self) -> u32 {
		self.inner.status.reconnect_attempts()
	}

	/// Messages received over the live-update stream.
	pub fn events_received(&self) -> u64 {
		self.inner.status.events_received()
	}

	/// Returns true while the live-update stream is open.
	pub fn is_streaming(&self) -> bool {
		self.connection_state().is_connected()
	}

	pub fn environment(&self) -> Environment {
		self.inner.config.environment
	}

	pub fn config(&self) -> &ClientConfig {
		&self.inner.config
	}
}

impl fmt::Debug for FeatoClient {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FeatoClient")
			.field("environment", &self.inner.config.environment)
			.field("base_url", &self.inner.config.base_url)
			.field("initialized", &self.initialized())
			.field("connection_state", &self.connection_state())
			.finish_non_exhaustive()
	}
}

impl ClientInner {
	/// Opens the live-update stream unless it is already open or the client
	/// has been disconnected.
	async fn connect(&self) {
		let mut sse = self.sse.lock().await;
		if self.closed.load(Ordering::SeqCst) {
			debug!("Client disconnected, not opening flag stream");
			return;
		}

		sse.start(
			Arc::clone(&self.transport),
			self.config.project_key.clone(),
			self.config.environment,
			self.store.clone(),
			self.config.sse_config.clone(),
		);
	}
}

/// Fetches the snapshot once, then opens the stream.
async fn initialize(inner: Arc<ClientInner>) {
	let environment = inner.config.environment;

	let snapshot = match inner
		.transport
		.fetch_snapshot(&inner.config.project_key, environment)
		.await
	{
		Ok(snapshot) => snapshot,
		Err(e) => {
			error!(error = %e, environment = %environment, "Failed to load feature flags");
			return;
		}
	};

	if snapshot.environment != environment {
		warn!(
			requested = %environment,
			received = %snapshot.environment,
			"Server returned flags for a different environment"
		);
	}

	let count = snapshot.flags.len();
	inner.store.replace_all(snapshot.flags);
	inner.store.mark_initialized();
	info!(flags = count, environment = %environment, "Feato client initialized");

	if inner.config.enable_streaming {
		inner.connect().await;
	}
}
