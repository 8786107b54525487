// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scripted in-memory transport for unit tests.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use feato_client_core::{Environment, FlagSet, FlagsSnapshot, ProjectKey};
use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use tokio::time::Instant;

use crate::error::{FeatoError, Result};
use crate::transport::{FlagTransport, MessageStream};

type MessageSender = mpsc::UnboundedSender<Result<String>>;
type MessageReceiver = mpsc::UnboundedReceiver<Result<String>>;

#[derive(Default)]
struct Script {
	/// Outcome of each future `open_stream` call, in order. `None` fails the
	/// open. Once the queue is empty every open fails.
	streams: VecDeque<Option<MessageReceiver>>,
	open_times: Vec<Instant>,
	snapshot_calls: usize,
}

pub(crate) struct ScriptedTransport {
	snapshot: Option<FlagsSnapshot>,
	snapshot_delay: Duration,
	streaming: bool,
	script: Mutex<Script>,
	closes: Arc<AtomicUsize>,
}

impl ScriptedTransport {
	/// Empty `dev` snapshot, streaming supported, no streams scripted.
	pub(crate) fn new() -> Self {
		Self {
			snapshot: Some(FlagsSnapshot {
				environment: Environment::Dev,
				flags: FlagSet::new(),
			}),
			snapshot_delay: Duration::ZERO,
			streaming: true,
			script: Mutex::new(Script::default()),
			closes: Arc::new(AtomicUsize::new(0)),
		}
	}

	pub(crate) fn with_snapshot(mut self, environment: Environment, flags: &[(&str, bool)]) -> Self {
		self.snapshot = Some(FlagsSnapshot {
			environment,
			flags: flags.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
		});
		self
	}

	pub(crate) fn with_failing_snapshot(mut self) -> Self {
		self.snapshot = None;
		self
	}

	pub(crate) fn with_snapshot_delay(mut self, delay: Duration) -> Self {
		self.snapshot_delay = delay;
		self
	}

	pub(crate) fn without_streaming(mut self) -> Self {
		self.streaming = false;
		self
	}

	/// Queues a successful open and returns the server side of that stream.
	pub(crate) fn push_stream(&self) -> StreamHandle {
		let (tx, rx) = mpsc::unbounded();
		self.script().streams.push_back(Some(rx));
		StreamHandle { tx }
	}

	/// Queues a failed open.
	pub(crate) fn push_failure(&self) {
		self.script().streams.push_back(None);
	}

	pub(crate) fn open_count(&self) -> usize {
		self.script().open_times.len()
	}

	pub(crate) fn open_times(&self) -> Vec<Instant> {
		self.script().open_times.clone()
	}

	pub(crate) fn snapshot_calls(&self) -> usize {
		self.script().snapshot_calls
	}

	/// Number of opened streams that have since been dropped.
	pub(crate) fn close_count(&self) -> usize {
		self.closes.load(Ordering::SeqCst)
	}

	fn script(&self) -> std::sync::MutexGuard<'_, Script> {
		self.script.lock().unwrap()
	}
}

#[async_trait]
impl FlagTransport for ScriptedTransport {
	async fn fetch_snapshot(
		&self,
		_project_key: &ProjectKey,
		_environment: Environment,
	) -> Result<FlagsSnapshot> {
		self.script().snapshot_calls += 1;
		if !self.snapshot_delay.is_zero() {
			tokio::time::sleep(self.snapshot_delay).await;
		}
		self.snapshot.clone().ok_or(FeatoError::ServerError {
			status: 500,
			message: "internal error".to_string(),
		})
	}

	fn supports_streaming(&self) -> bool {
		self.streaming
	}

	async fn open_stream(
		&self,
		_project_key: &ProjectKey,
		_environment: Environment,
	) -> Result<MessageStream> {
		let next = {
			let mut script = self.script();
			script.open_times.push(Instant::now());
			script.streams.pop_front().flatten()
		};

		match next {
			Some(inner) => Ok(Tracked {
				inner,
				closes: Arc::clone(&self.closes),
			}
			.boxed()),
			None => Err(FeatoError::ServerError {
				status: 503,
				message: "unavailable".to_string(),
			}),
		}
	}
}

/// Server side of a scripted stream.
pub(crate) struct StreamHandle {
	tx: MessageSender,
}

impl StreamHandle {
	pub(crate) fn send_update(&self, key: &str, value: bool) {
		self.send_raw(&serde_json::json!({ "key": key, "value": value }).to_string());
	}

	pub(crate) fn send_raw(&self, data: &str) {
		let _ = self.tx.unbounded_send(Ok(data.to_string()));
	}

	pub(crate) fn send_error(&self, message: &str) {
		let _ = self
			.tx
			.unbounded_send(Err(FeatoError::SseStreamError(message.to_string())));
	}

	/// Ends the stream as if the server closed it.
	pub(crate) fn end(self) {}
}

/// Counts a close when the client drops the stream.
struct Tracked {
	inner: MessageReceiver,
	closes: Arc<AtomicUsize>,
}

impl Stream for Tracked {
	type Item = Result<String>;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		self.inner.poll_next_unpin(cx)
	}
}

impl Drop for Tracked {
	fn drop(&mut self) {
		self.closes.fetch_add(1, Ordering::SeqCst);
	}
}
