// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for the Feato client.
//!
//! Every request the SDK makes goes through a client built here so the
//! User-Agent is consistent across the snapshot fetch and the event stream.

mod client;

pub use client::{builder, builder_with_user_agent, new_client_with_timeout, user_agent, SDK_NAME};
