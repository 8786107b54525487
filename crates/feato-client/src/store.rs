// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Copy-on-write flag state shared between the sync tasks and readers.
//!
//! The store holds one `Arc<FlagSet>` inside a `watch` channel. Every
//! mutation builds a new map from the current one plus one change and swaps
//! it in, so a reader either sees the old snapshot or the new one, never a
//! partial write. The same channel backs both styles of access: point-in-time
//! reads borrow the latest value, subscribers are woken on every swap.

use std::sync::Arc;

use feato_client_core::FlagSet;
use tokio::sync::watch;

use crate::error::{FeatoError, Result};

/// Shared flag state.
///
/// Cloning is cheap and every clone sees the same state.
#[derive(Debug, Clone)]
pub struct FlagStore {
	inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
	flags: watch::Sender<Arc<FlagSet>>,
	initialized: watch::Sender<bool>,
}

impl FlagStore {
	/// Creates an empty, uninitialized store.
	pub fn new() -> Self {
		let (flags, _) = watch::channel(Arc::new(FlagSet::new()));
		let (initialized, _) = watch::channel(false);
		Self {
			inner: Arc::new(StoreInner { flags, initialized }),
		}
	}

	/// Current value of one flag.
	pub fn get(&self, key: &str) -> Option<bool> {
		self.inner.flags.borrow().get(key).copied()
	}

	/// The current snapshot. Later mutations do not affect it.
	pub fn snapshot(&self) -> Arc<FlagSet> {
		Arc::clone(&self.inner.flags.borrow())
	}

	/// Receiver woken on every swap.
	pub fn subscribe(&self) -> watch::Receiver<Arc<FlagSet>> {
		self.inner.flags.subscribe()
	}

	/// Replaces the whole set.
	pub fn replace_all(&self, flags: FlagSet) {
		self.inner.flags.send_replace(Arc::new(flags));
	}

	/// Sets one key, returning its previous value.
	pub fn upsert(&self, key: &str, value: bool) -> Option<bool> {
		let mut previous = None;
		self.inner.flags.send_modify(|current| {
			let mut next = FlagSet::clone(&**current);
			previous = next.insert(key.to_string(), value);
			*current = Arc::new(next);
		});
		previous
	}

	pub fn len(&self) -> usize {
		self.inner.flags.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn is_initialized(&self) -> bool {
		*self.inner.initialized.borrow()
	}

	/// Marks the store initialized. There is no way back.
	pub fn mark_initialized(&self) {
		self.inner.initialized.send_if_modified(|initialized| {
			if *initialized {
				false
			} else {
				*initialized = true;
				true
			}
		});
	}

	pub fn subscribe_initialized(&self) -> watch::Receiver<bool> {
		self.inner.initialized.subscribe()
	}

	/// Live view of a single flag.
	pub fn watch_flag(&self, key: impl Into<String>) -> FlagWatch {
		FlagWatch::new(key.into(), self.subscribe())
	}
}

impl Default for FlagStore {
	fn default() -> Self {
		Self::new()
	}
}

/// Live view of one flag's value.
///
/// [`FlagWatch::get`] always reflects the latest state, and
/// [`FlagWatch::changed`] resolves only when this flag's value differs from
/// what the watch last reported.
#[derive(Debug, Clone)]
pub struct FlagWatch {
	key: String,
	rx: watch::Receiver<Arc<FlagSet>>,
	last: Option<bool>,
}

impl FlagWatch {
	fn new(key: String, mut rx: watch::Receiver<Arc<FlagSet>>) -> Self {
		let last = rx.borrow_and_update().get(&key).copied();
		Self { key, rx, last }
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	/// Current value, or `None` if the flag has never been populated.
	pub fn get(&self) -> Option<bool> {
		self.rx.borrow().get(&self.key).copied()
	}

	/// Waits for this flag's value to change and returns the new value.
	pub async fn changed(&mut self) -> Result<Option<bool>> {
		loop {
			self.rx.changed().await.map_err(|_| FeatoError::ClientClosed)?;
			let value = self.rx.borrow_and_update().get(&self.key).copied();
			if value != self.last {
				self.last = value;
				return Ok(value);
			}
		}
	}
}
