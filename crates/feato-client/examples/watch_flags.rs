// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Prints an environment's flags and every change pushed afterwards.
//!
//! ```text
//! FEATO_PROJECT_KEY=... FEATO_ENVIRONMENT=dev RUST_LOG=feato_client=debug \
//!     cargo run -p feato-client --example watch_flags
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use feato_client::{ClientConfig, FeatoClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let config = ClientConfig::from_env()?;
	let client = FeatoClient::builder().config(config).build()?;

	client.wait_initialized(Duration::from_secs(15)).await?;

	let mut rx = client.subscribe();
	let mut previous: BTreeMap<String, bool> = rx
		.borrow_and_update()
		.iter()
		.map(|(k, v)| (k.clone(), *v))
		.collect();

	println!("{} flags in {}:", previous.len(), client.environment());
	for (key, value) in &previous {
		println!("  {key} = {value}");
	}

	loop {
		tokio::select! {
			changed = rx.changed() => {
				if changed.is_err() {
					break;
				}
				let current: BTreeMap<String, bool> = rx
					.borrow_and_update()
					.iter()
					.map(|(k, v)| (k.clone(), *v))
					.collect();
				for (key, value) in &current {
					if previous.get(key) != Some(value) {
						println!("  {key} -> {value}");
					}
				}
				previous = current;
			}
			_ = tokio::signal::ctrl_c() => break,
		}
	}

	client.disconnect().await;
	Ok(())
}
