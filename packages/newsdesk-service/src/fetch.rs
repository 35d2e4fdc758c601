use serde::Serialize;
use serde_json::Value;

use newsdesk_domain::Record;

use crate::{
	NewsService,
	query::{self, QueryDocument},
};

/// Result of one round trip. Keeps "nothing matched" apart from "the fetch failed".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
	Matches { records: Vec<Record> },
	NoMatches,
	Failed { message: String },
}
impl FetchOutcome {
	pub fn from_records(records: Vec<Record>) -> Self {
		if records.is_empty() { Self::NoMatches } else { Self::Matches { records } }
	}

	/// Held records; empty for both `NoMatches` and `Failed`.
	pub fn records(&self) -> &[Record] {
		match self {
			Self::Matches { records } => records,
			Self::NoMatches | Self::Failed { .. } => &[],
		}
	}

	pub fn error(&self) -> Option<&str> {
		match self {
			Self::Failed { message } => Some(message.as_str()),
			_ => None,
		}
	}

	pub fn is_failed(&self) -> bool {
		matches!(self, Self::Failed { .. })
	}
}

/// Projects `hits.hits` in service order.
pub fn project_hits(response: &Value) -> Result<Vec<Record>, String> {
	let hits = response
		.get("hits")
		.and_then(|hits| hits.get("hits"))
		.and_then(Value::as_array)
		.ok_or_else(|| "Search response is missing hits.hits array.".to_string())?;

	Ok(hits.iter().map(Record::from_hit).collect())
}

impl NewsService {
	/// Runs `document` against `index`. Errors never escape; they become `FetchOutcome::Failed`.
	pub async fn fetch(&self, index: &str, document: &QueryDocument) -> FetchOutcome {
		let response = match self.backend.search(index, document.as_value()).await {
			Ok(response) => response,
			Err(err) => {
				tracing::error!(%index, error = %err, "Search request failed.");

				return failed(err.to_string());
			},
		};

		match project_hits(&response) {
			Ok(records) => {
				tracing::debug!(%index, hits = records.len(), "Search request completed.");

				FetchOutcome::from_records(records)
			},
			Err(message) => {
				tracing::error!(%index, error = %message, "Search response was malformed.");

				failed(message)
			},
		}
	}

	/// Newest records first, for the default view.
	pub async fn fetch_recent(&self, index: &str, page_size: Option<u32>) -> FetchOutcome {
		let document = query::recent(page_size, &self.cfg.search);

		self.fetch(index, &document).await
	}
}

fn failed(detail: String) -> FetchOutcome {
	FetchOutcome::Failed {
		message: format!("Error fetching data from the search service: {detail}"),
	}
}
