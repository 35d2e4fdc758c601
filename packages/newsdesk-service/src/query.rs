use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use time::Date;

use newsdesk_config::Search;
use newsdesk_domain::{date_serde, timestamp};

use crate::{Error, Result};

pub const MIN_DATE_AGG: &str = "min_date";
pub const MAX_DATE_AGG: &str = "max_date";

/// What the caller asked for. Every part is optional; an empty request means "most recent".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
	#[serde(default)]
	pub semantic_text: Option<String>,
	#[serde(default)]
	pub keyword_text: Option<String>,
	#[serde(default, with = "date_serde::option")]
	pub start_date: Option<Date>,
	#[serde(default, with = "date_serde::option")]
	pub end_date: Option<Date>,
	#[serde(default)]
	pub page_size: Option<u32>,
	#[serde(default)]
	pub index: Option<String>,
}
impl QueryRequest {
	pub fn semantic(&self) -> Option<&str> {
		non_blank(self.semantic_text.as_deref())
	}

	pub fn keyword(&self) -> Option<&str> {
		non_blank(self.keyword_text.as_deref())
	}

	pub fn has_date_bounds(&self) -> bool {
		self.start_date.is_some() || self.end_date.is_some()
	}

	/// No text and no bounds.
	pub fn is_empty(&self) -> bool {
		self.semantic().is_none() && self.keyword().is_none() && !self.has_date_bounds()
	}

	pub fn validate(&self) -> Result<()> {
		if let (Some(start), Some(end)) = (self.start_date, self.end_date)
			&& end < start
		{
			return Err(Error::InvalidRequest {
				message: format!("end_date {end} is before start_date {start}."),
			});
		}

		Ok(())
	}
}

/// Request body for the search service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryDocument(Value);
impl QueryDocument {
	pub fn as_value(&self) -> &Value {
		&self.0
	}

	pub fn into_value(self) -> Value {
		self.0
	}
}

/// Clamps the requested page size into `1..=max_page_size`, defaulting to `page_size`.
pub fn resolve_page_size(requested: Option<u32>, search: &Search) -> u32 {
	requested.unwrap_or(search.page_size).clamp(1, search.max_page_size.max(1))
}

/// Composes the hybrid query: semantic and keyword clauses as OR, the date range as AND.
pub fn build(request: &QueryRequest, search: &Search) -> Result<QueryDocument> {
	let mut should = Vec::new();

	if let Some(text) = request.semantic() {
		should.push(semantic_clause(text, search));
	}
	if let Some(text) = request.keyword() {
		should.push(json!({
			"query_string": { "query": text, "boost": search.keyword.boost }
		}));
	}

	let mut bool_query = json!({ "should": should });

	if request.has_date_bounds() {
		bool_query["must"] =
			json!([range_clause(&search.timestamp_field, request.start_date, request.end_date)?]);
	}

	Ok(QueryDocument(json!({
		"size": resolve_page_size(request.page_size, search),
		"query": { "bool": bool_query },
	})))
}

/// Newest first, no scoring clauses.
pub fn recent(page_size: Option<u32>, search: &Search) -> QueryDocument {
	QueryDocument(json!({
		"size": resolve_page_size(page_size, search),
		"sort": [{ search.timestamp_field.as_str(): { "order": "desc" } }],
		"query": { "match_all": {} },
	}))
}

/// The two aggregation-only queries used to find the corpus date bounds.
pub fn date_range_aggregations(timestamp_field: &str) -> (QueryDocument, QueryDocument) {
	let min = json!({
		"size": 0,
		"aggs": { MIN_DATE_AGG: { "min": { "field": timestamp_field } } },
	});
	let max = json!({
		"size": 0,
		"aggs": { MAX_DATE_AGG: { "max": { "field": timestamp_field } } },
	});

	(QueryDocument(min), QueryDocument(max))
}

// Title and description expansions are separate clauses; a single object keyed twice by
// `text_expansion` would keep only the last one.
fn semantic_clause(text: &str, search: &Search) -> Value {
	let semantic = &search.semantic;
	let expansion = |field: &str| {
		json!({
			"text_expansion": {
				field: {
					"model_text": text,
					"model_id": semantic.model_id,
					"boost": semantic.boost,
				}
			}
		})
	};

	json!({
		"bool": {
			"should": [expansion(&semantic.title_field), expansion(&semantic.description_field)]
		}
	})
}

fn range_clause(field: &str, start: Option<Date>, end: Option<Date>) -> Result<Value> {
	let mut bounds = serde_json::Map::new();

	if let Some(start) = start {
		bounds.insert("gte".to_string(), format_bound(timestamp::format_start_of_day(start))?);
	}
	if let Some(end) = end {
		bounds.insert("lte".to_string(), format_bound(timestamp::format_end_of_day(end))?);
	}

	Ok(json!({ "range": { field: bounds } }))
}

fn format_bound(formatted: Result<String, time::error::Format>) -> Result<Value> {
	formatted.map(Value::String).map_err(|err| Error::InvalidRequest {
		message: format!("Unformattable date bound: {err}."),
	})
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
	use time::macros::date;

	use super::*;

	fn search() -> Search {
		Search::default()
	}

	fn request() -> QueryRequest {
		QueryRequest::default()
	}

	#[test]
	fn empty_request_has_empty_should_and_no_must() {
		let document = build(&request(), &search()).expect("build failed");
		let query = &document.as_value()["query"]["bool"];

		assert_eq!(query["should"], json!([]));
		assert!(query.get("must").is_none());
		assert_eq!(document.as_value()["size"], 10);
	}

	#[test]
	fn blank_text_is_ignored() {
		let request = QueryRequest {
			semantic_text: Some("   ".to_string()),
			keyword_text: Some(String::new()),
			..request()
		};
		let document = build(&request, &search()).expect("build failed");

		assert!(request.is_empty());
		assert_eq!(document.as_value()["query"]["bool"]["should"], json!([]));
	}

	#[test]
	fn semantic_clause_expands_title_and_description() {
		let request =
			QueryRequest { semantic_text: Some("flood defences".to_string()), ..request() };
		let document = build(&request, &search()).expect("build failed");
		let should = &document.as_value()["query"]["bool"]["should"];

		assert_eq!(should.as_array().map(Vec::len), Some(1));

		let expansions = &should[0]["bool"]["should"];

		assert_eq!(
			expansions,
			&json!([
				{ "text_expansion": { "ml-elser-title.tokens": {
					"model_text": "flood defences", "model_id": ".elser_model_2", "boost": 9.0
				} } },
				{ "text_expansion": { "ml-elser-description.tokens": {
					"model_text": "flood defences", "model_id": ".elser_model_2", "boost": 9.0
				} } }
			])
		);
	}

	#[test]
	fn keyword_clause_uses_query_string() {
		let request = QueryRequest { keyword_text: Some(" budget ".to_string()), ..request() };
		let document = build(&request, &search()).expect("build failed");

		assert_eq!(
			document.as_value()["query"]["bool"]["should"],
			json!([{ "query_string": { "query": "budget", "boost": 8.0 } }])
		);
	}

	#[test]
	fn hybrid_request_orders_semantic_before_keyword() {
		let request = QueryRequest {
			semantic_text: Some("election".to_string()),
			keyword_text: Some("polls".to_string()),
			..request()
		};
		let document = build(&request, &search()).expect("build failed");
		let should = &document.as_value()["query"]["bool"]["should"];

		assert!(should[0].get("bool").is_some());
		assert!(should[1].get("query_string").is_some());
	}

	#[test]
	fn date_bounds_round_trip_through_corpus_format() {
		let start = date!(2022 - 03 - 07);
		let end = date!(2024 - 02 - 29);
		let request = QueryRequest { start_date: Some(start), end_date: Some(end), ..request() };
		let document = build(&request, &search()).expect("build failed");
		let bool_query = &document.as_value()["query"]["bool"];
		let range = &bool_query["must"][0]["range"]["pubDate"];
		let gte = range["gte"].as_str().expect("gte missing");
		let lte = range["lte"].as_str().expect("lte missing");

		assert_eq!(bool_query["should"], json!([]));
		assert_eq!(gte, "Mon, 07 Mar 2022 00:00:00 GMT");
		assert_eq!(lte, "Thu, 29 Feb 2024 23:59:59 GMT");
		assert_eq!(timestamp::parse_date(gte), Some(start));
		assert_eq!(timestamp::parse_date(lte), Some(end));
	}

	#[test]
	fn single_bound_omits_the_other() {
		let request = QueryRequest { end_date: Some(date!(2024 - 01 - 01)), ..request() };
		let document = build(&request, &search()).expect("build failed");
		let range = &document.as_value()["query"]["bool"]["must"][0]["range"]["pubDate"];

		assert!(range.get("gte").is_none());
		assert_eq!(range["lte"], "Mon, 01 Jan 2024 23:59:59 GMT");
	}

	#[test]
	fn page_size_is_clamped() {
		let search = search();

		assert_eq!(resolve_page_size(None, &search), 10);
		assert_eq!(resolve_page_size(Some(0), &search), 1);
		assert_eq!(resolve_page_size(Some(25), &search), 25);
		assert_eq!(resolve_page_size(Some(10_000), &search), 100);
	}

	#[test]
	fn recent_sorts_by_timestamp_without_clauses() {
		let document = recent(Some(5), &search());

		assert_eq!(
			document.into_value(),
			json!({
				"size": 5,
				"sort": [{ "pubDate": { "order": "desc" } }],
				"query": { "match_all": {} },
			})
		);
	}

	#[test]
	fn aggregations_target_timestamp_field() {
		let (min, max) = date_range_aggregations("pubDate");

		assert_eq!(min.as_value()["aggs"][MIN_DATE_AGG]["min"]["field"], "pubDate");
		assert_eq!(max.as_value()["aggs"][MAX_DATE_AGG]["max"]["field"], "pubDate");
		assert_eq!(max.as_value()["size"], 0);
	}

	#[test]
	fn rejects_inverted_range() {
		let request = QueryRequest {
			start_date: Some(date!(2024 - 02 - 01)),
			end_date: Some(date!(2024 - 01 - 01)),
			..request()
		};

		assert!(matches!(request.validate(), Err(Error::InvalidRequest { .. })));
	}

	#[test]
	fn deserializes_calendar_dates_and_blank_bounds() {
		let request: QueryRequest = serde_json::from_value(json!({
			"semantic_text": "storm",
			"start_date": "2024-01-02",
			"end_date": "",
		}))
		.expect("deserialize failed");

		assert_eq!(request.start_date, Some(date!(2024 - 01 - 02)));
		assert_eq!(request.end_date, None);
		assert_eq!(request.page_size, None);
	}
}
