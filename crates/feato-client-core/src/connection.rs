// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

/// Lifecycle of the live-update connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
	/// No stream is open and none is being opened.
	#[default]
	Disconnected,
	/// A stream is being opened, either for the first time or after a backoff wait.
	Connecting,
	/// The stream is open and delivering updates.
	Connected,
}

impl ConnectionState {
	pub fn is_connected(&self) -> bool {
		matches!(self, ConnectionState::Connected)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			ConnectionState::Disconnected => "disconnected",
			ConnectionState::Connecting => "connecting",
			ConnectionState::Connected => "connected",
		}
	}
}

impl fmt::Display for ConnectionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
