pub mod date_range;
pub mod fetch;
pub mod query;
pub mod session;

mod error;

pub use error::{Error, Result};
pub use fetch::FetchOutcome;
pub use query::{QueryDocument, QueryRequest};
pub use session::{SearchSession, SessionItem, SessionView};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use newsdesk_config::Config;
use newsdesk_providers::elasticsearch::ElasticsearchClient;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The external search service: takes a query body for an index, returns the raw response.
pub trait SearchBackend
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		index: &'a str,
		body: &'a Value,
	) -> BoxFuture<'a, newsdesk_providers::Result<Value>>;
}

impl SearchBackend for ElasticsearchClient {
	fn search<'a>(
		&'a self,
		index: &'a str,
		body: &'a Value,
	) -> BoxFuture<'a, newsdesk_providers::Result<Value>> {
		Box::pin(ElasticsearchClient::search(self, index, body))
	}
}

pub struct NewsService {
	pub cfg: Config,
	pub backend: Arc<dyn SearchBackend>,
}
impl NewsService {
	pub fn new(cfg: Config) -> Result<Self> {
		let client = ElasticsearchClient::new(&cfg.elasticsearch)?;

		tracing::info!(base_url = %client.base_url(), "Search service client ready.");

		Ok(Self::with_backend(cfg, Arc::new(client)))
	}

	pub fn with_backend(cfg: Config, backend: Arc<dyn SearchBackend>) -> Self {
		Self { cfg, backend }
	}

	/// Returns `index` if it is configured, or the default index when `None`.
	pub fn resolve_index(&self, index: Option<&str>) -> Result<String> {
		match index.map(str::trim).filter(|index| !index.is_empty()) {
			None => Ok(self.cfg.default_index().to_string()),
			Some(index) if self.cfg.has_index(index) => Ok(index.to_string()),
			Some(index) =>
				Err(Error::InvalidRequest { message: format!("Unknown index '{index}'.") }),
		}
	}
}
