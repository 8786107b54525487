// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Navigation guard decision logic.
//!
//! Router integrations ask the client for a flag value and feed it through
//! [`GuardOptions::resolve`]. The decision itself is independent of any router.

/// Options for a flag-backed navigation guard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardOptions {
	/// Value to use when the flag is not loaded or missing. Defaults to `false`.
	pub fallback: Option<bool>,
	/// Where to send the user when access is denied.
	pub redirect_to: Option<String>,
}

/// Result of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
	Allow,
	Deny,
	Redirect(String),
}

impl GuardOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_fallback(mut self, fallback: bool) -> Self {
		self.fallback = Some(fallback);
		self
	}

	pub fn with_redirect(mut self, target: impl Into<String>) -> Self {
		self.redirect_to = Some(target.into());
		self
	}

	/// Decides the outcome for the current flag value.
	///
	/// A present value wins over the fallback. A denial becomes a redirect
	/// when `redirect_to` is set.
	pub fn resolve(&self, value: Option<bool>) -> GuardOutcome {
		let allowed = value.or(self.fallback).unwrap_or(false);

		if allowed {
			return GuardOutcome::Allow;
		}

		match &self.redirect_to {
			Some(target) => GuardOutcome::Redirect(target.clone()),
			None => GuardOutcome::Deny,
		}
	}
}

impl GuardOutcome {
	pub fn is_allowed(&self) -> bool {
		matches!(self, GuardOutcome::Allow)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_true_flag_allows() {
		assert_eq!(GuardOptions::new().resolve(Some(true)), GuardOutcome::Allow);
	}

	#[test]
	fn test_false_flag_denies() {
		assert_eq!(GuardOptions::new().resolve(Some(false)), GuardOutcome::Deny);
	}

	#[test]
	fn test_missing_flag_defaults_to_deny() {
		assert_eq!(GuardOptions::new().resolve(None), GuardOutcome::Deny);
	}

	#[test]
	fn test_missing_flag_uses_fallback() {
		let opts = GuardOptions::new().with_fallback(true);
		assert_eq!(opts.resolve(None), GuardOutcome::Allow);
	}

	#[test]
	fn test_present_value_beats_fallback() {
		let opts = GuardOptions::new().with_fallback(true);
		assert_eq!(opts.resolve(Some(false)), GuardOutcome::Deny);
	}

	#[test]
	fn test_false_flag_with_redirect_redirects() {
		let opts = GuardOptions::new().with_redirect("/no-access");
		assert_eq!(
			opts.resolve(Some(false)),
			GuardOutcome::Redirect("/no-access".to_string())
		);
	}

	#[test]
	fn test_redirect_ignored_when_allowed() {
		let opts = GuardOptions::new().with_redirect("/no-access");
		assert_eq!(opts.resolve(Some(true)), GuardOutcome::Allow);
	}

	proptest! {
		#[test]
		fn redirect_iff_denied(value in proptest::option::of(proptest::bool::ANY), fallback in proptest::option::of(proptest::bool::ANY)) {
			let opts = GuardOptions { fallback, redirect_to: Some("/nope".to_string()) };
			let allowed = value.or(fallback).unwrap_or(false);
			let outcome = opts.resolve(value);
			prop_assert_eq!(outcome.is_allowed(), allowed);
			prop_assert_eq!(matches!(outcome, GuardOutcome::Redirect(_)), !allowed);
		}
	}
}
