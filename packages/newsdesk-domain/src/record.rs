use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entity tags keyed by category (`LOC`, `PER`, `MISC`, ...). Unknown categories are kept as-is.
pub type Tags = BTreeMap<String, Vec<String>>;

/// A news article projected from a search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
	pub id: String,
	pub title: String,
	pub description: String,
	#[serde(rename = "pubDate")]
	pub pub_date: String,
	pub url: String,
	pub tags: Tags,
}
impl Record {
	/// Projects one entry of `hits.hits`. Missing or mistyped fields become empty values.
	pub fn from_hit(hit: &Value) -> Self {
		let source = hit.get("_source");
		let field = |name: &str| {
			source
				.and_then(|source| source.get(name))
				.and_then(Value::as_str)
				.unwrap_or_default()
				.to_string()
		};

		Self {
			id: hit.get("_id").and_then(Value::as_str).unwrap_or_default().to_string(),
			title: field("title"),
			description: field("description"),
			pub_date: field("pubDate"),
			url: field("url"),
			tags: source.and_then(|source| source.get("tags")).map(parse_tags).unwrap_or_default(),
		}
	}

	pub fn tag_values(&self, category: &str) -> &[String] {
		self.tags.get(category).map(Vec::as_slice).unwrap_or_default()
	}
}

fn parse_tags(raw: &Value) -> Tags {
	let Some(object) = raw.as_object() else {
		return Tags::new();
	};

	object
		.iter()
		.map(|(category, values)| {
			let values = match values {
				Value::Array(items) =>
					items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
				Value::String(single) => vec![single.clone()],
				_ => Vec::new(),
			};

			(category.clone(), values)
		})
		.collect()
}
