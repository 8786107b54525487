// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Feature flags Rust SDK for Feato.
//!
//! This crate keeps a local, always-readable copy of one environment's
//! boolean feature flags. It loads a snapshot over HTTP, then applies pushed
//! updates from a server-sent event stream.
//!
//! # Features
//!
//! - **Non-blocking reads**: every accessor is served from memory
//! - **Real-time updates**: SSE streaming with unbounded exponential backoff
//! - **Reactive access**: `watch` receivers and per-flag [`FlagWatch`] views
//! - **Route guards**: [`FlagGuard`] turns a flag into allow/deny/redirect
//!
//! # Example
//!
//! ```ignore
//! use feato_client::{Environment, FeatoClient};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FeatoClient::builder()
//!         .project_key("my-project-key")
//!         .environment(Environment::Prod)
//!         .build()?;
//!
//!     client.wait_initialized(Duration::from_secs(5)).await?;
//!
//!     if client.flag("checkout.new_flow").unwrap_or(false) {
//!         // ...
//!     }
//!
//!     let mut watch = client.watch_flag("checkout.new_flow");
//!     while let Ok(value) = watch.changed().await {
//!         println!("checkout.new_flow is now {value:?}");
//!     }
//!
//!     client.disconnect().await;
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod guard;
mod sse;
mod store;
mod transport;

#[cfg(test)]
mod testing;

pub use client::{FeatoClient, FeatoClientBuilder};
pub use config::{ClientConfig, DEFAULT_BASE_URL, ENV_BASE_URL, ENV_ENVIRONMENT, ENV_PROJECT_KEY};
pub use error::{FeatoError, Result};
pub use guard::FlagGuard;
pub use sse::{SseConfig, SseConnection};
pub use store::{FlagStore, FlagWatch};
pub use transport::{FlagTransport, HttpFlagTransport, MessageStream};

// Re-export core types for convenience
pub use feato_client_core::{
	ConnectionState, Environment, FlagSet, FlagUpdateEvent, FlagsSnapshot, GuardOptions,
	GuardOutcome, ProjectKey,
};
