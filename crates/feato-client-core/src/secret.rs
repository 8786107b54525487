// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redacting wrapper for the project secret.
//!
//! The project key travels as the `secret` query parameter, so request URLs
//! built from it must never be logged verbatim. [`Secret`] keeps the value out
//! of `Debug`/`Display` output and zeroizes it on drop.
//!
//! ```
//! use feato_client_core::ProjectKey;
//!
//! let key = ProjectKey::new("project-key-123".to_string());
//! assert_eq!(format!("{key}"), "[REDACTED]");
//! assert_eq!(format!("{key:?}"), "Secret(\"[REDACTED]\")");
//! assert_eq!(key.expose(), "project-key-123");
//! ```

use std::fmt;

use zeroize::Zeroize;

use crate::error::CoreError;

pub const REDACTED: &str = "[REDACTED]";

/// A value that never appears in logs.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

/// The project key issued by Feato.
pub type ProjectKey = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Explicit access to the wrapped value.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl ProjectKey {
	/// Wraps a project key, rejecting empty or whitespace-only input.
	pub fn parse(key: impl Into<String>) -> Result<Self, CoreError> {
		let key = key.into();
		if key.trim().is_empty() {
			return Err(CoreError::EmptyProjectKey);
		}
		Ok(Secret::new(key))
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}
