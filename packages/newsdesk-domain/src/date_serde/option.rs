use serde::{Deserialize as _, Deserializer, Serializer};
use time::Date;

use crate::date_serde::CALENDAR_DATE;

pub fn serialize<S>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	match value {
		Some(value) => crate::date_serde::serialize(value, serializer),
		None => serializer.serialize_none(),
	}
}

/// Blank strings count as absent so form-style clients can send `""` for an unset bound.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<String>::deserialize(deserializer)?;

	match raw.as_deref().map(str::trim) {
		Some("") | None => Ok(None),
		Some(value) => Date::parse(value, CALENDAR_DATE).map(Some).map_err(serde::de::Error::custom),
	}
}
