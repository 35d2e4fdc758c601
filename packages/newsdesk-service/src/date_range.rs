use serde_json::Value;

use newsdesk_domain::DateRange;

use crate::{
	NewsService,
	query::{self, MAX_DATE_AGG, MIN_DATE_AGG, QueryDocument},
};

/// `aggregations.<name>.value_as_string`, absent for an empty corpus.
pub fn aggregation_string(response: &Value, name: &str) -> Option<String> {
	response
		.get("aggregations")
		.and_then(|aggs| aggs.get(name))
		.and_then(|bucket| bucket.get("value_as_string"))
		.and_then(Value::as_str)
		.filter(|raw| !raw.trim().is_empty())
		.map(str::to_string)
}

impl NewsService {
	/// Oldest and newest publication dates in `index`. Never fails: service errors and
	/// unparseable values fall back to today's date.
	pub async fn resolve_date_range(&self, index: &str) -> DateRange {
		let (min_doc, max_doc) = query::date_range_aggregations(&self.cfg.search.timestamp_field);
		let min = self.aggregate(index, &min_doc, MIN_DATE_AGG).await;
		let max = self.aggregate(index, &max_doc, MAX_DATE_AGG).await;

		match (min, max) {
			(Ok(min), Ok(max)) => DateRange::from_raw(min.as_deref(), max.as_deref()),
			(Err(err), _) | (_, Err(err)) => {
				tracing::warn!(%index, error = %err, "Date range lookup failed. Using today.");

				DateRange::today()
			},
		}
	}

	async fn aggregate(
		&self,
		index: &str,
		document: &QueryDocument,
		name: &str,
	) -> newsdesk_providers::Result<Option<String>> {
		let response = self.backend.search(index, document.as_value()).await?;

		Ok(aggregation_string(&response, name))
	}
}
