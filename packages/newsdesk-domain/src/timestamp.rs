//! Codec for the corpus timestamp format, e.g. `Mon, 01 Jan 2024 00:00:00 GMT`.
//!
//! Every range bound sent to the index and every aggregation value read back from it uses this
//! exact shape. The zone is always the literal `GMT`, so values are handled as UTC wall-clock
//! times.

use serde::{Deserialize, Serialize};
use time::{
	Date, OffsetDateTime, PrimitiveDateTime, Time, format_description::BorrowedFormatItem,
	macros::{format_description, time},
};

pub const CORPUS_FORMAT: &[BorrowedFormatItem<'_>] = format_description!(
	"[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

const END_OF_DAY: Time = time!(23:59:59);

/// Inclusive calendar-date bounds of the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
	#[serde(with = "crate::date_serde")]
	pub start: Date,
	#[serde(with = "crate::date_serde")]
	pub end: Date,
}
impl DateRange {
	/// Both bounds collapse to `today` when the corpus gives nothing usable.
	pub fn today() -> Self {
		let today = today();

		Self { start: today, end: today }
	}

	/// Builds a range from raw aggregation values, falling back to today per bound.
	pub fn from_raw(min: Option<&str>, max: Option<&str>) -> Self {
		let today = today();

		Self {
			start: min.and_then(parse_date).unwrap_or(today),
			end: max.and_then(parse_date).unwrap_or(today),
		}
	}
}

pub fn parse(raw: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
	PrimitiveDateTime::parse(raw.trim(), CORPUS_FORMAT)
}

pub fn parse_date(raw: &str) -> Option<Date> {
	parse(raw).ok().map(PrimitiveDateTime::date)
}

pub fn format(value: PrimitiveDateTime) -> Result<String, time::error::Format> {
	value.format(CORPUS_FORMAT)
}

/// Lower range bound: midnight at the start of `date`.
pub fn format_start_of_day(date: Date) -> Result<String, time::error::Format> {
	format(date.midnight())
}

/// Upper range bound: the last second of `date`, so the whole day is included.
pub fn format_end_of_day(date: Date) -> Result<String, time::error::Format> {
	format(PrimitiveDateTime::new(date, END_OF_DAY))
}

pub fn today() -> Date {
	OffsetDateTime::now_utc().date()
}

#[cfg(test)]
mod tests {
	use time::macros::{date, datetime};

	use super::*;

	#[test]
	fn parses_corpus_timestamp() {
		let parsed = parse("Mon, 01 Jan 2024 13:45:09 GMT").expect("parse failed");

		assert_eq!(parsed, datetime!(2024-01-01 13:45:09));
	}

	#[test]
	fn formats_corpus_timestamp() {
		let formatted = format(datetime!(2022-03-07 08:00:00)).expect("format failed");

		assert_eq!(formatted, "Mon, 07 Mar 2022 08:00:00 GMT");
	}

	#[test]
	fn day_bounds_cover_the_whole_day() {
		let day = date!(2023 - 12 - 31);

		assert_eq!(format_start_of_day(day).expect("format failed"), "Sun, 31 Dec 2023 00:00:00 GMT");
		assert_eq!(format_end_of_day(day).expect("format failed"), "Sun, 31 Dec 2023 23:59:59 GMT");
	}

	#[test]
	fn rejects_other_formats() {
		assert!(parse("2024-01-01T00:00:00Z").is_err());
		assert!(parse("").is_err());
		assert_eq!(parse_date("not a date"), None);
	}

	#[test]
	fn range_falls_back_to_today_per_bound() {
		let range = DateRange::from_raw(Some("Tue, 02 Jan 2024 00:00:00 GMT"), None);

		assert_eq!(range.start, date!(2024 - 01 - 02));
		assert_eq!(range.end, today());

		let range = DateRange::from_raw(Some("garbage"), Some("Wed, 03 Jan 2024 10:00:00 GMT"));

		assert_eq!(range.start, today());
		assert_eq!(range.end, date!(2024 - 01 - 03));
	}

	#[test]
	fn range_serializes_as_calendar_dates() {
		let range = DateRange { start: date!(2024 - 01 - 02), end: date!(2024 - 02 - 29) };
		let json = serde_json::to_value(range).expect("serialize failed");

		assert_eq!(json, serde_json::json!({ "start": "2024-01-02", "end": "2024-02-29" }));
	}
}
