use std::time::Duration;

use reqwest::{Client, StatusCode, header::HeaderMap};
use serde_json::Value;

use crate::{Credentials, Error, Result};

pub struct ElasticsearchClient {
	client: Client,
	base_url: String,
	headers: HeaderMap,
}
impl ElasticsearchClient {
	pub fn new(cfg: &newsdesk_config::Elasticsearch) -> Result<Self> {
		let base_url = match (cfg.url.as_deref(), cfg.cloud_id.as_deref()) {
			(Some(url), _) => url.trim_end_matches('/').to_string(),
			(None, Some(cloud_id)) => crate::cloud_id_to_url(cloud_id)?,
			(None, None) =>
				return Err(Error::InvalidConfig {
					message: "Either url or cloud_id is required.".to_string(),
				}),
		};
		let headers = crate::auth_headers(&Credentials::from_config(cfg), &cfg.default_headers)?;
		let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

		Ok(Self { client, base_url, headers })
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Runs `POST /{index}/_search` and returns the raw response body.
	pub async fn search(&self, index: &str, body: &Value) -> Result<Value> {
		let url = format!("{}/{}/_search", self.base_url, index);

		tracing::debug!(%url, "Sending search request.");

		let res = self.client.post(url).headers(self.headers.clone()).json(body).send().await?;
		let status = res.status();

		if !status.is_success() {
			let text = res.text().await.unwrap_or_default();

			return Err(status_error(status, &text));
		}

		let json: Value = res.json().await?;

		if !json.is_object() {
			return Err(Error::InvalidResponse {
				message: "Search response must be a JSON object.".to_string(),
			});
		}

		Ok(json)
	}
}

/// Pulls `error.reason` (or `error.type`) out of an Elasticsearch error body.
fn status_error(status: StatusCode, body: &str) -> Error {
	let parsed: Option<Value> = serde_json::from_str(body).ok();
	let error = parsed.as_ref().and_then(|json| json.get("error"));
	let reason = error
		.and_then(|error| {
			error
				.get("reason")
				.or_else(|| error.get("type"))
				.and_then(Value::as_str)
				.or_else(|| error.as_str())
		})
		.map(str::to_string)
		.unwrap_or_else(|| {
			let trimmed = body.trim();

			if trimmed.is_empty() {
				status.canonical_reason().unwrap_or("unknown error").to_string()
			} else {
				trimmed.chars().take(512).collect()
			}
		});

	Error::Status { status: status.as_u16(), reason }
}
