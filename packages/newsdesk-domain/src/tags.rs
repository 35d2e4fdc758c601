use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::Record;

pub const DEFAULT_TAG_COLOR: &str = "#555555";

/// Selected tag values per category. An empty or absent set leaves that category unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSelection(BTreeMap<String, BTreeSet<String>>);
impl TagSelection {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn select(mut self, category: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.entry(category.into()).or_default().insert(value.into());

		self
	}

	pub fn selected(&self, category: &str) -> Option<&BTreeSet<String>> {
		self.0.get(category)
	}

	/// True when no category carries a constraint.
	pub fn is_empty(&self) -> bool {
		self.0.values().all(BTreeSet::is_empty)
	}

	/// Categories with at least one selected value.
	pub fn active(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
		self.0
			.iter()
			.filter(|(_, values)| !values.is_empty())
			.map(|(category, values)| (category.as_str(), values))
	}

	pub fn matches(&self, record: &Record) -> bool {
		self.active().all(|(category, selected)| {
			record.tag_values(category).iter().any(|value| selected.contains(value))
		})
	}
}
impl FromIterator<(String, BTreeSet<String>)> for TagSelection {
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (String, BTreeSet<String>)>,
	{
		Self(iter.into_iter().collect())
	}
}

/// One rendered tag: category, value and the chip colour for the category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagChip {
	pub category: String,
	pub value: String,
	pub color: &'static str,
}

/// Keeps the records whose tags intersect every non-empty selected category, in input order.
pub fn filter(records: &[Record], selection: &TagSelection) -> Vec<Record> {
	if selection.is_empty() {
		return records.to_vec();
	}

	records.iter().filter(|record| selection.matches(record)).cloned().collect()
}

/// Sorted, deduplicated values of one category across `records`.
pub fn unique_values(records: &[Record], category: &str) -> Vec<String> {
	records
		.iter()
		.flat_map(|record| record.tag_values(category))
		.cloned()
		.collect::<BTreeSet<_>>()
		.into_iter()
		.collect()
}

/// `unique_values` for every category present in `records`.
pub fn facets(records: &[Record]) -> BTreeMap<String, Vec<String>> {
	let categories: BTreeSet<&str> =
		records.iter().flat_map(|record| record.tags.keys().map(String::as_str)).collect();

	categories
		.into_iter()
		.map(|category| (category.to_string(), unique_values(records, category)))
		.collect()
}

pub fn category_color(category: &str) -> &'static str {
	match category {
		"LOC" => "#3498db",
		"PER" => "#2ecc71",
		"MISC" => "#e74c3c",
		_ => DEFAULT_TAG_COLOR,
	}
}

pub fn chips(record: &Record) -> Vec<TagChip> {
	record
		.tags
		.iter()
		.flat_map(|(category, values)| {
			values.iter().map(move |value| TagChip {
				category: category.clone(),
				value: value.clone(),
				color: category_color(category),
			})
		})
		.collect()
}

/// Zero-based page of `items`. Out-of-range pages are empty.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
	if per_page == 0 {
		return &[];
	}

	let start = page.saturating_mul(per_page).min(items.len());
	let end = start.saturating_add(per_page).min(items.len());

	&items[start..end]
}

#[cfg(test)]
mod tests {
	use super::*;

	fn record(id: &str, tags: &[(&str, &[&str])]) -> Record {
		Record {
			id: id.to_string(),
			title: String::new(),
			description: String::new(),
			pub_date: String::new(),
			url: String::new(),
			tags: tags
				.iter()
				.map(|(category, values)| {
					(category.to_string(), values.iter().map(|value| value.to_string()).collect())
				})
				.collect(),
		}
	}

	fn ids(records: &[Record]) -> Vec<&str> {
		records.iter().map(|record| record.id.as_str()).collect()
	}

	fn sample() -> Vec<Record> {
		vec![
			record("1", &[("LOC", &["Paris"]), ("PER", &["Macron"])]),
			record("2", &[("LOC", &["Rome"])]),
			record("3", &[("LOC", &["Paris", "Lyon"]), ("MISC", &["Tour de France"])]),
			record("4", &[]),
		]
	}

	#[test]
	fn selects_matching_location() {
		let records = vec![record("1", &[("LOC", &["Paris"])]), record("2", &[("LOC", &["Rome"])])];
		let selection = TagSelection::new().select("LOC", "Paris");

		assert_eq!(ids(&filter(&records, &selection)), ["1"]);
	}

	#[test]
	fn empty_selection_is_identity() {
		let records = sample();
		let selection: TagSelection =
			[("LOC".to_string(), BTreeSet::new()), ("PER".to_string(), BTreeSet::new())]
				.into_iter()
				.collect();

		assert!(selection.is_empty());
		assert_eq!(filter(&records, &selection), records);
		assert_eq!(filter(&records, &TagSelection::new()), records);
	}

	#[test]
	fn any_match_within_category() {
		let selection = TagSelection::new().select("LOC", "Rome").select("LOC", "Lyon");

		assert_eq!(ids(&filter(&sample(), &selection)), ["2", "3"]);
	}

	#[test]
	fn all_categories_must_match() {
		let selection = TagSelection::new().select("LOC", "Paris").select("PER", "Macron");

		assert_eq!(ids(&filter(&sample(), &selection)), ["1"]);

		let selection = TagSelection::new().select("LOC", "Rome").select("PER", "Macron");

		assert!(filter(&sample(), &selection).is_empty());
	}

	#[test]
	fn filter_is_idempotent() {
		let records = sample();

		for selection in [
			TagSelection::new(),
			TagSelection::new().select("LOC", "Paris"),
			TagSelection::new().select("LOC", "Paris").select("MISC", "Tour de France"),
			TagSelection::new().select("ORG", "UN"),
		] {
			let once = filter(&records, &selection);
			let twice = filter(&once, &selection);

			assert_eq!(once, twice);
		}
	}

	#[test]
	fn unique_values_are_sorted_and_deduplicated() {
		assert_eq!(unique_values(&sample(), "LOC"), ["Lyon", "Paris", "Rome"]);
		assert!(unique_values(&sample(), "ORG").is_empty());
		assert!(unique_values(&[record("x", &[])], "LOC").is_empty());
		assert!(unique_values(&[], "LOC").is_empty());
	}

	#[test]
	fn facets_cover_present_categories() {
		let facets = facets(&sample());

		assert_eq!(facets.keys().map(String::as_str).collect::<Vec<_>>(), ["LOC", "MISC", "PER"]);
		assert_eq!(facets["PER"], ["Macron"]);
	}

	#[test]
	fn known_categories_have_colors() {
		assert_eq!(category_color("LOC"), "#3498db");
		assert_eq!(category_color("PER"), "#2ecc71");
		assert_eq!(category_color("MISC"), "#e74c3c");
		assert_eq!(category_color("ORG"), DEFAULT_TAG_COLOR);

		let chips = chips(&sample()[0]);

		assert_eq!(chips.len(), 2);
		assert_eq!(chips[0].category, "LOC");
		assert_eq!(chips[0].color, "#3498db");
	}

	#[test]
	fn paginates_locally() {
		let items = [1, 2, 3, 4, 5];

		assert_eq!(paginate(&items, 0, 2), [1, 2]);
		assert_eq!(paginate(&items, 2, 2), [5]);
		assert!(paginate(&items, 3, 2).is_empty());
		assert!(paginate(&items, 0, 0).is_empty());
		assert!(paginate(&items, usize::MAX, usize::MAX).is_empty());
	}

	#[test]
	fn selection_deserializes_from_lists() {
		let selection: TagSelection =
			serde_json::from_value(serde_json::json!({ "LOC": ["Paris", "Paris"], "PER": [] }))
				.expect("deserialize failed");

		assert_eq!(selection.selected("LOC").map(BTreeSet::len), Some(1));
		assert_eq!(selection.active().count(), 1);
	}
}
