// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SSE (Server-Sent Events) connection for real-time flag updates.
//!
//! This module owns the live-update stream and the reconnect timer. Both live
//! inside one background task, so there is never more than one open stream or
//! one pending reconnect per connection manager. Transport failures are
//! retried forever with capped exponential backoff.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use feato_client_core::{ConnectionState, Environment, FlagUpdateEvent, ProjectKey};
use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{FeatoError, Result};
use crate::store::FlagStore;
use crate::transport::FlagTransport;

/// Configuration for SSE connection behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseConfig {
	/// Delay before the first reconnect after a failure.
	pub reconnect_base_delay: Duration,
	/// Ceiling for the reconnect delay.
	pub reconnect_max_delay: Duration,
}

impl Default for SseConfig {
	fn default() -> Self {
		Self {
			reconnect_base_delay: Duration::from_secs(1),
			reconnect_max_delay: Duration::from_secs(30),
		}
	}
}

impl SseConfig {
	/// Delay before the reconnect that follows `attempts` consecutive failures.
	///
	/// `min(base * 2^attempts, max)`.
	pub fn backoff_delay(&self, attempts: u32) -> Duration {
		let factor = 2u64.saturating_pow(attempts.min(32));
		let base_ms = self.reconnect_base_delay.as_millis() as u64;
		let max_ms = self.reconnect_max_delay.as_millis() as u64;
		Duration::from_millis(base_ms.saturating_mul(factor).min(max_ms))
	}
}

/// Observable status of the live-update connection.
#[derive(Debug)]
pub(crate) struct StreamStatus {
	state: watch::Sender<ConnectionState>,
	/// Consecutive failures since the last applied update or explicit stop.
	reconnect_attempts: AtomicU32,
	events_received: AtomicU64,
}

impl StreamStatus {
	fn new() -> Self {
		let (state, _) = watch::channel(ConnectionState::Disconnected);
		Self {
			state,
			reconnect_attempts: AtomicU32::new(0),
			events_received: AtomicU64::new(0),
		}
	}

	fn set_state(&self, state: ConnectionState) {
		self.state.send_if_modified(|current| {
			if *current == state {
				false
			} else {
				*current = state;
				true
			}
		});
	}

	pub(crate) fn state(&self) -> ConnectionState {
		*self.state.borrow()
	}

	pub(crate) fn subscribe(&self) -> watch::Receiver<ConnectionState> {
		self.state.subscribe()
	}

	pub(crate) fn reconnect_attempts(&self) -> u32 {
		self.reconnect_attempts.load(Ordering::SeqCst)
	}

	pub(crate) fn events_received(&self) -> u64 {
		self.events_received.load(Ordering::SeqCst)
	}
}

/// Manages an SSE connection for real-time flag updates.
#[derive(Debug)]
pub struct SseConnection {
	status: Arc<StreamStatus>,
	/// Handle to the background task.
	task_handle: Option<JoinHandle<()>>,
	/// Channel to signal shutdown.
	shutdown_tx: Option<mpsc::Sender<()>>,
}

impl SseConnection {
	/// Creates a new, idle SSE connection manager.
	pub fn new() -> Self {
		Self {
			status: Arc::new(StreamStatus::new()),
			task_handle: None,
			shutdown_tx: None,
		}
	}

	pub(crate) fn status(&self) -> Arc<StreamStatus> {
		Arc::clone(&self.status)
	}

	/// Starts the connection loop in a background task.
	///
	/// Returns false without doing anything if a loop is already running or
	/// the transport cannot stream on this host. Must be called from within a
	/// Tokio runtime.
	pub fn start(
		&mut self,
		transport: Arc<dyn FlagTransport>,
		project_key: ProjectKey,
		environment: Environment,
		store: FlagStore,
		config: SseConfig,
	) -> bool {
		if self.is_running() {
			debug!("SSE connection already running");
			return false;
		}

		if !transport.supports_streaming() {
			debug!("Streaming transport unavailable, skipping live updates");
			return false;
		}

		let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
		self.shutdown_tx = Some(shutdown_tx);

		let status = Arc::clone(&self.status);
		let handle = tokio::spawn(async move {
			run_sse_loop(
				transport,
				project_key,
				environment,
				store,
				config,
				status,
				shutdown_rx,
			)
			.await;
		});

		self.task_handle = Some(handle);
		true
	}

	/// Stops the connection and any pending reconnect.
	///
	/// Idempotent: a second call finds nothing to stop.
	pub async fn stop(&mut self) {
		if let Some(tx) = self.shutdown_tx.take() {
			let _ = tx.try_send(());
		}
		if let Some(handle) = self.task_handle.take() {
			handle.abort();
			let _ = handle.await;
			info!("SSE connection stopped");
		}
		self.status.reconnect_attempts.store(0, Ordering::SeqCst);
		self.status.set_state(ConnectionState::Disconnected);
	}

	fn is_running(&self) -> bool {
		self
			.task_handle
			.as_ref()
			.is_some_and(|handle| !handle.is_finished())
	}

	/// Returns true if the SSE connection is currently active.
	pub fn is_connected(&self) -> bool {
		self.status.state().is_connected()
	}

	pub fn state(&self) -> ConnectionState {
		self.status.state()
	}

	/// Consecutive failures since the last applied update.
	pub fn reconnect_attempts(&self) -> u32 {
		self.status.reconnect_attempts()
	}

	/// Number of messages received since the manager was created.
	pub fn events_received(&self) -> u64 {
		self.status.events_received()
	}
}

impl Default for SseConnection {
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for SseConnection {
	fn drop(&mut self) {
		if let Some(handle) = self.task_handle.take() {
			handle.abort();
		}
	}
}

/// Runs the SSE connection loop with reconnection logic.
async fn run_sse_loop(
	transport: Arc<dyn FlagTransport>,
	project_key: ProjectKey,
	environment: Environment,
	store: FlagStore,
	config: SseConfig,
	status: Arc<StreamStatus>,
	mut shutdown_rx: mpsc::Receiver<()>,
) {
	loop {
		status.set_state(ConnectionState::Connecting);
		info!(environment = %environment, "Connecting to flag stream");

		let result = tokio::select! {
			result = connect_and_process(transport.as_ref(), &project_key, environment, &store, &status) => result,
			_ = shutdown_rx.recv() => {
				info!("SSE connection received shutdown signal");
				break;
			}
		};

		// Dropping the stream inside connect_and_process closed it
		status.set_state(ConnectionState::Disconnected);

		match result {
			Ok(()) => debug!("Flag stream ended by server"),
			Err(e) => warn!(error = %e, "Flag stream error"),
		}

		let failures = status.reconnect_attempts.load(Ordering::SeqCst);
		let delay = config.backoff_delay(failures);
		let attempts = failures.saturating_add(1);
		status.reconnect_attempts.store(attempts, Ordering::SeqCst);

		warn!(
			delay_ms = delay.as_millis() as u64,
			attempts,
			"Reconnecting to flag stream"
		);

		tokio::select! {
			_ = tokio::time::sleep(delay) => {}
			_ = shutdown_rx.recv() => {
				info!("SSE connection received shutdown signal during reconnect wait");
				break;
			}
		}
	}

	status.set_state(ConnectionState::Disconnected);
}

/// Opens the stream and applies messages until it fails or ends.
async fn connect_and_process(
	transport: &dyn FlagTransport,
	project_key: &ProjectKey,
	environment: Environment,
	store: &FlagStore,
	status: &StreamStatus,
) -> Result<()> {
	let mut messages = transport.open_stream(project_key, environment).await?;

	status.set_state(ConnectionState::Connected);
	info!(environment = %environment, "Flag stream connected");

	while let Some(message) = messages.next().await {
		let data = message?;
		status.events_received.fetch_add(1, Ordering::SeqCst);

		match process_message(&data, store) {
			Ok(_) => status.reconnect_attempts.store(0, Ordering::SeqCst),
			Err(e) => warn!(error = %e, "Dropping flag stream message"),
		}
	}

	Ok(())
}

/// Parses one message payload and applies it to the store.
pub(crate) fn process_message(data: &str, store: &FlagStore) -> Result<FlagUpdateEvent> {
	let event =
		FlagUpdateEvent::from_message(data).map_err(|e| FeatoError::MalformedUpdate(e.to_string()))?;

	let previous = store.upsert(&event.key, event.value);
	debug!(
		flag_key = %event.key,
		value = event.value,
		previous = ?previous,
		updated_at = %event.updated_at,
		"Flag updated"
	);

	Ok(event)
}
