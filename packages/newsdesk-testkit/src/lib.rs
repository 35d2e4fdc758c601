mod error;

pub use error::{Error, Result};

use std::{
	net::SocketAddr,
	sync::{Arc, Mutex},
};

use axum::{
	Json, Router,
	extract::{Path, State},
	http::{HeaderMap, StatusCode, header::AUTHORIZATION},
	response::IntoResponse,
	routing,
};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::oneshot};

use newsdesk_config::{Config, Elasticsearch, Search, SearchKeyword, SearchSemantic, Service};

pub const TEST_INDEX: &str = "bbc-news-elser";

type Responder = dyn Fn(&str, &Value) -> (StatusCode, Value) + Send + Sync;

/// One `_search` call received by [`FakeSearchServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
	pub index: String,
	pub body: Value,
	pub authorization: Option<String>,
}

#[derive(Clone)]
struct FakeState {
	responder: Arc<Responder>,
	requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Local stand-in for the search service. Answers `POST /{index}/_search` with whatever the
/// responder returns and records every request.
pub struct FakeSearchServer {
	url: String,
	requests: Arc<Mutex<Vec<RecordedRequest>>>,
	shutdown: Option<oneshot::Sender<()>>,
}
impl FakeSearchServer {
	pub async fn start<F>(responder: F) -> Result<Self>
	where
		F: Fn(&str, &Value) -> (StatusCode, Value) + Send + Sync + 'static,
	{
		let requests = Arc::new(Mutex::new(Vec::new()));
		let state = FakeState { responder: Arc::new(responder), requests: requests.clone() };
		let app =
			Router::new().route("/{index}/_search", routing::post(search_handler)).with_state(state);
		let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
		let addr = listener.local_addr()?;
		let (tx, rx) = oneshot::channel::<()>();
		let server = axum::serve(listener, app).with_graceful_shutdown(async move {
			let _ = rx.await;
		});

		tokio::spawn(async move {
			let _ = server.await;
		});

		Ok(Self { url: format!("http://{addr}"), requests, shutdown: Some(tx) })
	}

	/// Serves the same hit list for every query.
	pub async fn with_hits(hits: Vec<Value>) -> Result<Self> {
		let response = hits_response(hits);

		Self::start(move |_, _| (StatusCode::OK, response.clone())).await
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn last_request(&self) -> Option<RecordedRequest> {
		self.requests().pop()
	}
}
impl Drop for FakeSearchServer {
	fn drop(&mut self) {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}
	}
}

async fn search_handler(
	State(state): State<FakeState>,
	Path(index): Path<String>,
	headers: HeaderMap,
	Json(body): Json<Value>,
) -> impl IntoResponse {
	let authorization =
		headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()).map(str::to_string);

	state
		.requests
		.lock()
		.unwrap_or_else(|err| err.into_inner())
		.push(RecordedRequest { index: index.clone(), body: body.clone(), authorization });

	let (status, payload) = (state.responder)(&index, &body);

	(status, Json(payload)).into_response()
}

pub fn hit(id: &str, title: &str, pub_date: &str, tags: Value) -> Value {
	serde_json::json!({
		"_id": id,
		"_score": 1.0,
		"_source": {
			"title": title,
			"description": format!("{title} description"),
			"pubDate": pub_date,
			"url": format!("https://news.example/{id}"),
			"tags": tags,
		}
	})
}

pub fn hits_response(hits: Vec<Value>) -> Value {
	serde_json::json!({
		"took": 3,
		"timed_out": false,
		"hits": { "total": { "value": hits.len(), "relation": "eq" }, "hits": hits }
	})
}

/// Answers the date-range aggregations, `None` meaning an empty corpus.
pub fn aggregation_response(body: &Value, min: Option<&str>, max: Option<&str>) -> Value {
	let aggs = body.get("aggs").and_then(Value::as_object).cloned().unwrap_or_default();
	let mut out = Map::new();

	for name in aggs.keys() {
		let value = if aggs[name].get("min").is_some() { min } else { max };
		let bucket = match value {
			Some(raw) => serde_json::json!({ "value": 0, "value_as_string": raw }),
			None => serde_json::json!({ "value": null }),
		};

		out.insert(name.clone(), bucket);
	}

	serde_json::json!({
		"hits": { "total": { "value": 0, "relation": "eq" }, "hits": [] },
		"aggregations": out,
	})
}

pub fn error_response(kind: &str, reason: &str) -> Value {
	serde_json::json!({ "error": { "type": kind, "reason": reason }, "status": 400 })
}

pub fn test_config(url: &str) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		elasticsearch: Elasticsearch {
			url: Some(url.to_string()),
			cloud_id: None,
			username: Some("elastic".to_string()),
			password: Some("changeme".to_string()),
			api_key: None,
			indices: vec![TEST_INDEX.to_string(), "archive".to_string()],
			timeout_ms: 2_000,
			default_headers: Map::new(),
		},
		search: Search {
			page_size: 10,
			max_page_size: 50,
			timestamp_field: "pubDate".to_string(),
			semantic: SearchSemantic::default(),
			keyword: SearchKeyword::default(),
		},
	}
}
