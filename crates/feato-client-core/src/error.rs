// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors produced while parsing or validating core types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
	#[error("unknown environment: {0} (expected one of prod, dev, stage, qa, preview)")]
	UnknownEnvironment(String),

	#[error("project key must not be empty")]
	EmptyProjectKey,
}

pub type Result<T> = std::result::Result<T, CoreError>;
