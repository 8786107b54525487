// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP transport tests against a mock Feato service.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use feato_client::{
	Environment, FeatoClient, FeatoError, FlagTransport, FlagUpdateEvent, HttpFlagTransport,
	ProjectKey,
};
use futures::StreamExt;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROJECT_KEY: &str = "project-key-123";

fn project_key() -> ProjectKey {
	ProjectKey::new(PROJECT_KEY.to_string())
}

fn transport_for(server: &MockServer) -> HttpFlagTransport {
	HttpFlagTransport::new(server.uri(), Duration::from_secs(5)).unwrap()
}

fn sse_body(events: &[&str]) -> String {
	events.iter().map(|e| format!("{e}\n\n")).collect()
}

async fn mount_snapshot(server: &MockServer, body: serde_json::Value) {
	Mock::given(method("GET"))
		.and(path("/feature-flag"))
		.and(query_param("secret", PROJECT_KEY))
		.and(query_param("environment", "dev"))
		.respond_with(ResponseTemplate::new(200).set_body_json(body))
		.mount(server)
		.await;
}

#[tokio::test]
async fn test_fetch_snapshot_parses_flags() {
	let server = MockServer::start().await;
	mount_snapshot(
		&server,
		serde_json::json!({
			"environment": "dev",
			"flags": { "featureA": true, "featureB": false }
		}),
	)
	.await;

	let transport = transport_for(&server);
	let snapshot =
		tokio_test::assert_ok!(transport.fetch_snapshot(&project_key(), Environment::Dev).await);

	assert_eq!(snapshot.environment, Environment::Dev);
	assert_eq!(snapshot.flags.get("featureA"), Some(&true));
	assert_eq!(snapshot.flags.get("featureB"), Some(&false));
}

#[tokio::test]
async fn test_fetch_snapshot_non_success_status() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/feature-flag"))
		.respond_with(ResponseTemplate::new(401).set_body_string("invalid secret"))
		.mount(&server)
		.await;

	let transport = transport_for(&server);
	let result = transport.fetch_snapshot(&project_key(), Environment::Dev).await;

	match result {
		Err(FeatoError::ServerError { status, message }) => {
			assert_eq!(status, 401);
			assert_eq!(message, "invalid secret");
		}
		other => panic!("expected server error, got {other:?}"),
	}
}

#[tokio::test]
async fn test_fetch_snapshot_malformed_body() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/feature-flag"))
		.respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
		.mount(&server)
		.await;

	let transport = transport_for(&server);
	let result = transport.fetch_snapshot(&project_key(), Environment::Dev).await;

	assert!(matches!(result, Err(FeatoError::ParseFailed(_))));
}

#[tokio::test]
async fn test_connection_error_does_not_leak_project_key() {
	let transport = HttpFlagTransport::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
	let err = transport
		.fetch_snapshot(&project_key(), Environment::Dev)
		.await
		.unwrap_err();

	assert!(matches!(err, FeatoError::ConnectionFailed(_)));
	assert!(err.is_retryable());
	assert!(!err.to_string().contains(PROJECT_KEY));
	assert!(!format!("{err:?}").contains(PROJECT_KEY));
}

#[tokio::test]
async fn test_open_stream_yields_message_data() {
	let server = MockServer::start().await;
	let body = sse_body(&[
		": keep-alive",
		r#"data: {"key":"featureA","value":false,"updatedAt":"2025-01-01T00:00:00Z"}"#,
		"event: ping\ndata: pong",
		r#"data: {"key":"newFlag","value":true}"#,
	]);

	Mock::given(method("GET"))
		.and(path("/hub"))
		.and(query_param("secret", PROJECT_KEY))
		.and(query_param("environment", "dev"))
		.and(query_param("version", "1"))
		.and(header("accept", "text/event-stream"))
		.and(header("cache-control", "no-cache"))
		.respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
		.expect(1)
		.mount(&server)
		.await;

	let transport = transport_for(&server);
	let stream = tokio_test::assert_ok!(transport.open_stream(&project_key(), Environment::Dev).await);
	let messages: Vec<String> = stream.map(|item| item.unwrap()).collect().await;

	assert_eq!(messages.len(), 2);

	let first = FlagUpdateEvent::from_message(&messages[0]).unwrap();
	assert_eq!(first.key, "featureA");
	assert!(!first.value);
	assert_eq!(
		first.updated_at,
		Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
	);

	let second = FlagUpdateEvent::from_message(&messages[1]).unwrap();
	assert_eq!(second.key, "newFlag");
	assert!(second.value);
}

#[tokio::test]
async fn test_open_stream_rejected_by_server() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/hub"))
		.respond_with(ResponseTemplate::new(503))
		.mount(&server)
		.await;

	let transport = transport_for(&server);
	let err = transport
		.open_stream(&project_key(), Environment::Dev)
		.await
		.err()
		.unwrap();

	assert!(matches!(err, FeatoError::ServerError { status: 503, .. }));
	assert!(err.is_retryable());
}

#[tokio::test]
async fn test_client_applies_snapshot_and_pushed_update() {
	let server = MockServer::start().await;
	mount_snapshot(
		&server,
		serde_json::json!({
			"environment": "dev",
			"flags": { "featureA": true, "featureB": false }
		}),
	)
	.await;

	Mock::given(method("GET"))
		.and(path("/hub"))
		.and(query_param("secret", PROJECT_KEY))
		.respond_with(ResponseTemplate::new(200).set_body_raw(
			sse_body(&[r#"data: {"key":"featureA","value":false}"#]),
			"text/event-stream",
		))
		.mount(&server)
		.await;

	let client = FeatoClient::builder()
		.project_key(PROJECT_KEY)
		.environment(Environment::Dev)
		.base_url(server.uri())
		.build()
		.unwrap();

	client.wait_initialized(Duration::from_secs(5)).await.unwrap();
	assert_eq!(client.flag("featureB"), Some(false));

	let mut flags = client.subscribe();
	tokio::time::timeout(
		Duration::from_secs(5),
		flags.wait_for(|flags| flags.get("featureA") == Some(&false)),
	)
	.await
	.expect("pushed update was not applied")
	.unwrap();

	client.disconnect().await;
	assert!(!client.is_streaming());
}

#[tokio::test]
async fn test_failed_snapshot_never_opens_stream() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/feature-flag"))
		.respond_with(ResponseTemplate::new(500))
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/hub"))
		.respond_with(ResponseTemplate::new(200))
		.expect(0)
		.mount(&server)
		.await;

	let client = FeatoClient::builder()
		.project_key(PROJECT_KEY)
		.environment(Environment::Dev)
		.base_url(server.uri())
		.build()
		.unwrap();

	let result = client.wait_initialized(Duration::from_millis(500)).await;
	assert!(matches!(result, Err(FeatoError::InitializationTimeout)));
	assert!(client.flags().is_empty());

	server.verify().await;
}

#[tokio::test]
async fn test_custom_transport_is_used() {
	let server = MockServer::start().await;
	mount_snapshot(
		&server,
		serde_json::json!({ "environment": "dev", "flags": { "featureA": true } }),
	)
	.await;

	let transport: Arc<dyn FlagTransport> = Arc::new(transport_for(&server));
	let client = FeatoClient::builder()
		.project_key(PROJECT_KEY)
		.environment(Environment::Dev)
		.enable_streaming(false)
		.transport(transport)
		.build()
		.unwrap();

	client.wait_initialized(Duration::from_secs(5)).await.unwrap();
	assert_eq!(client.flag("featureA"), Some(true));
}
