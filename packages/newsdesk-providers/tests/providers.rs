use reqwest::{StatusCode, header::AUTHORIZATION};
use serde_json::Map;

use newsdesk_providers::{Credentials, Error, elasticsearch::ElasticsearchClient};
use newsdesk_testkit::{FakeSearchServer, TEST_INDEX};

#[test]
fn builds_basic_auth_header() {
	let credentials =
		Credentials::Basic { username: "elastic".to_string(), password: "changeme".to_string() };
	let headers =
		newsdesk_providers::auth_headers(&credentials, &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Basic ZWxhc3RpYzpjaGFuZ2VtZQ==");
	assert!(value.is_sensitive());
}

#[test]
fn credentials_prefer_api_key() {
	let mut cfg = newsdesk_testkit::test_config("http://localhost:9200").elasticsearch;

	assert!(matches!(Credentials::from_config(&cfg), Credentials::Basic { .. }));

	cfg.api_key = Some("encoded".to_string());

	assert_eq!(Credentials::from_config(&cfg), Credentials::ApiKey("encoded".to_string()));

	cfg.api_key = None;
	cfg.username = None;
	cfg.password = None;

	assert_eq!(Credentials::from_config(&cfg), Credentials::None);
}

#[test]
fn rejects_non_string_default_headers() {
	let mut headers = Map::new();

	headers.insert("x-opaque-id".to_string(), serde_json::json!(42));

	let err = newsdesk_providers::auth_headers(&Credentials::None, &headers)
		.expect_err("Expected header validation error.");

	assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[tokio::test]
async fn posts_query_to_index_search_endpoint() {
	let server = FakeSearchServer::with_hits(Vec::new()).await.expect("Failed to start server.");
	let cfg = newsdesk_testkit::test_config(server.url()).elasticsearch;
	let client = ElasticsearchClient::new(&cfg).expect("Failed to build client.");
	let body = serde_json::json!({ "size": 3, "query": { "match_all": {} } });
	let response = client.search(TEST_INDEX, &body).await.expect("Search failed.");

	assert!(response["hits"]["hits"].as_array().is_some_and(Vec::is_empty));

	let request = server.last_request().expect("Server saw no request.");

	assert_eq!(request.index, TEST_INDEX);
	assert_eq!(request.body, body);
	assert_eq!(request.authorization.as_deref(), Some("Basic ZWxhc3RpYzpjaGFuZ2VtZQ=="));
}

#[tokio::test]
async fn maps_error_status_to_reason() {
	let server = FakeSearchServer::start(|_, _| {
		(
			StatusCode::BAD_REQUEST,
			newsdesk_testkit::error_response("search_phase_execution_exception", "all shards failed"),
		)
	})
	.await
	.expect("Failed to start server.");
	let cfg = newsdesk_testkit::test_config(server.url()).elasticsearch;
	let client = ElasticsearchClient::new(&cfg).expect("Failed to build client.");
	let err = client
		.search(TEST_INDEX, &serde_json::json!({}))
		.await
		.expect_err("Expected status error.");

	match err {
		Error::Status { status, reason } => {
			assert_eq!(status, 400);
			assert_eq!(reason, "all shards failed");
		},
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
	let mut cfg = newsdesk_testkit::test_config("http://127.0.0.1:1").elasticsearch;

	cfg.timeout_ms = 500;

	let client = ElasticsearchClient::new(&cfg).expect("Failed to build client.");
	let err = client
		.search(TEST_INDEX, &serde_json::json!({}))
		.await
		.expect_err("Expected transport error.");

	assert!(matches!(err, Error::Reqwest(_)));
}
