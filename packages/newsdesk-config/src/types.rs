use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub elasticsearch: Elasticsearch,
	#[serde(default)]
	pub search: Search,
}
impl Config {
	/// The index used when a request does not name one.
	pub fn default_index(&self) -> &str {
		self.elasticsearch.indices.first().map(String::as_str).unwrap_or_default()
	}

	pub fn has_index(&self, index: &str) -> bool {
		self.elasticsearch.indices.iter().any(|known| known == index)
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Elasticsearch {
	/// Explicit base URL, e.g. "https://localhost:9200". Mutually exclusive with `cloud_id`.
	pub url: Option<String>,
	/// Elastic Cloud deployment id. Decoded into the base URL at connect time.
	pub cloud_id: Option<String>,
	pub username: Option<String>,
	pub password: Option<String>,
	/// Encoded API key. Takes precedence over basic auth when both are present.
	pub api_key: Option<String>,
	pub indices: Vec<String>,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub page_size: u32,
	pub max_page_size: u32,
	pub timestamp_field: String,
	pub semantic: SearchSemantic,
	pub keyword: SearchKeyword,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			page_size: 10,
			max_page_size: 100,
			timestamp_field: "pubDate".to_string(),
			semantic: SearchSemantic::default(),
			keyword: SearchKeyword::default(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSemantic {
	pub model_id: String,
	pub title_field: String,
	pub description_field: String,
	pub boost: f32,
}
impl Default for SearchSemantic {
	fn default() -> Self {
		Self {
			model_id: ".elser_model_2".to_string(),
			title_field: "ml-elser-title.tokens".to_string(),
			description_field: "ml-elser-description.tokens".to_string(),
			boost: 9.0,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchKeyword {
	pub boost: f32,
}
impl Default for SearchKeyword {
	fn default() -> Self {
		Self { boost: 8.0 }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_timeout_ms() -> u64 {
	10_000
}
