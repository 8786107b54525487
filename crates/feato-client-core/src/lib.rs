// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Feato feature flags client.
//!
//! This crate holds the wire and domain types shared by the client SDK
//! (`feato-client`) and anything that wants to speak the Feato protocol
//! without pulling in the HTTP stack.
//!
//! # Overview
//!
//! - [`Environment`]: the deployment context a flag snapshot belongs to
//! - [`FlagSet`]: flag key to boolean value
//! - [`FlagsSnapshot`]: the body of the initial `GET /feature-flag` call
//! - [`FlagUpdateEvent`]: a single pushed update from the `/hub` stream
//! - [`ConnectionState`]: lifecycle of the live-update connection
//! - [`ProjectKey`]: the project secret, redacted in all output
//! - [`GuardOptions`] / [`GuardOutcome`]: route guard decision logic
//!
//! # Example
//!
//! ```
//! use feato_client_core::{FlagUpdateEvent, FlagsSnapshot, Environment};
//!
//! let snapshot: FlagsSnapshot = serde_json::from_str(
//!     r#"{"environment":"dev","flags":{"featureA":true,"featureB":false}}"#,
//! ).unwrap();
//! assert_eq!(snapshot.environment, Environment::Dev);
//! assert_eq!(snapshot.flags.get("featureA"), Some(&true));
//!
//! let event: FlagUpdateEvent = serde_json::from_str(r#"{"key":"featureA","value":false}"#).unwrap();
//! assert!(!event.value);
//! ```

pub mod connection;
pub mod environment;
pub mod error;
pub mod flag;
pub mod guard;
pub mod secret;

pub use connection::ConnectionState;
pub use environment::Environment;
pub use error::{CoreError, Result};
pub use flag::{FlagSet, FlagUpdateEvent, FlagsSnapshot};
pub use guard::{GuardOptions, GuardOutcome};
pub use secret::{ProjectKey, Secret, REDACTED};

/// Protocol version tag sent when opening the live-update stream.
pub const PROTOCOL_VERSION: u32 = 1;
