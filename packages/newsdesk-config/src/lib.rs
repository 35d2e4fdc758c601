mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Elasticsearch, Search, SearchKeyword, SearchSemantic, Service};

use std::{env, fs, path::Path};

pub const ENV_CLOUD_ID: &str = "NEWSDESK_CLOUD_ID";
pub const ENV_USERNAME: &str = "NEWSDESK_USERNAME";
pub const ENV_PASSWORD: &str = "NEWSDESK_PASSWORD";
pub const ENV_API_KEY: &str = "NEWSDESK_API_KEY";

pub fn load(path: &Path) -> Result<Config> {
	load_with_env(path, |key| env::var(key).ok())
}

/// Loads the config file, then lets `lookup` override credentials before validation.
pub fn load_with_env<F>(path: &Path, lookup: F) -> Result<Config>
where
	F: Fn(&str) -> Option<String>,
{
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	apply_env_overrides(&mut cfg, lookup);
	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn apply_env_overrides<F>(cfg: &mut Config, lookup: F)
where
	F: Fn(&str) -> Option<String>,
{
	let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
	let es = &mut cfg.elasticsearch;

	if let Some(cloud_id) = lookup(ENV_CLOUD_ID) {
		es.cloud_id = Some(cloud_id);
		es.url = None;
	}
	if let Some(username) = lookup(ENV_USERNAME) {
		es.username = Some(username);
	}
	if let Some(password) = lookup(ENV_PASSWORD) {
		es.password = Some(password);
	}
	if let Some(api_key) = lookup(ENV_API_KEY) {
		es.api_key = Some(api_key);
	}
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	let es = &cfg.elasticsearch;

	match (es.url.as_deref(), es.cloud_id.as_deref()) {
		(Some(_), Some(_)) =>
			return Err(Error::Validation {
				message: "elasticsearch.url and elasticsearch.cloud_id are mutually exclusive."
					.to_string(),
			}),
		(None, None) =>
			return Err(Error::Validation {
				message: "One of elasticsearch.url or elasticsearch.cloud_id must be set."
					.to_string(),
			}),
		_ => {},
	}

	if es.password.is_some() && es.username.is_none() {
		return Err(Error::Validation {
			message: "elasticsearch.username must be set when elasticsearch.password is set."
				.to_string(),
		});
	}
	if es.indices.is_empty() {
		return Err(Error::Validation {
			message: "elasticsearch.indices must be non-empty.".to_string(),
		});
	}
	if es.indices.iter().any(|index| index.trim().is_empty()) {
		return Err(Error::Validation {
			message: "elasticsearch.indices must not contain blank names.".to_string(),
		});
	}
	if es.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "elasticsearch.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if es.default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation {
			message: "elasticsearch.default_headers values must be strings.".to_string(),
		});
	}

	let search = &cfg.search;

	if search.page_size == 0 {
		return Err(Error::Validation {
			message: "search.page_size must be greater than zero.".to_string(),
		});
	}
	if search.max_page_size < search.page_size {
		return Err(Error::Validation {
			message: "search.max_page_size must be greater than or equal to search.page_size."
				.to_string(),
		});
	}

	for (label, value) in [
		("search.timestamp_field", &search.timestamp_field),
		("search.semantic.model_id", &search.semantic.model_id),
		("search.semantic.title_field", &search.semantic.title_field),
		("search.semantic.description_field", &search.semantic.description_field),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	for (label, boost) in
		[("search.semantic.boost", search.semantic.boost), ("search.keyword.boost", search.keyword.boost)]
	{
		if !boost.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if boost <= 0.0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let es = &mut cfg.elasticsearch;

	for slot in [&mut es.url, &mut es.cloud_id, &mut es.username, &mut es.password, &mut es.api_key]
	{
		if slot.as_deref().map(|value| value.trim().is_empty()).unwrap_or(false) {
			*slot = None;
		}
	}

	if let Some(url) = es.url.as_mut() {
		let trimmed = url.trim_end_matches('/').len();

		url.truncate(trimmed);
	}
}
