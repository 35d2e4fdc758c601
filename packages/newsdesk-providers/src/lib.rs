pub mod elasticsearch;

mod error;

pub use error::{Error, Result};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

/// Credentials accepted by the search service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
	ApiKey(String),
	Basic { username: String, password: String },
	None,
}
impl Credentials {
	/// API keys win over basic auth when both are configured.
	pub fn from_config(cfg: &newsdesk_config::Elasticsearch) -> Self {
		if let Some(api_key) = cfg.api_key.as_ref() {
			return Self::ApiKey(api_key.clone());
		}

		match cfg.username.as_ref() {
			Some(username) => Self::Basic {
				username: username.clone(),
				password: cfg.password.clone().unwrap_or_default(),
			},
			None => Self::None,
		}
	}
}

pub fn auth_headers(
	credentials: &Credentials,
	default_headers: &Map<String, Value>,
) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	match credentials {
		Credentials::ApiKey(key) => {
			headers.insert(AUTHORIZATION, format!("ApiKey {key}").parse()?);
		},
		Credentials::Basic { username, password } => {
			let encoded = STANDARD.encode(format!("{username}:{password}"));
			let mut value: HeaderValue = format!("Basic {encoded}").parse()?;

			value.set_sensitive(true);
			headers.insert(AUTHORIZATION, value);
		},
		Credentials::None => {},
	}

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

/// Decodes an Elastic Cloud id (`<name>:<base64 of host$es_uuid$kibana_uuid>`) into the
/// Elasticsearch base URL.
pub fn cloud_id_to_url(cloud_id: &str) -> Result<String> {
	let invalid =
		|message: &str| Error::InvalidConfig { message: format!("Invalid cloud_id: {message}") };
	let (_, encoded) = cloud_id.split_once(':').ok_or_else(|| invalid("missing ':' separator."))?;
	let decoded = STANDARD.decode(encoded.trim()).map_err(|_| invalid("payload is not base64."))?;
	let decoded = String::from_utf8(decoded).map_err(|_| invalid("payload is not UTF-8."))?;
	let mut parts = decoded.split('$');
	let host = parts.next().filter(|host| !host.is_empty()).ok_or_else(|| invalid("missing host."))?;
	let es_uuid =
		parts.next().filter(|uuid| !uuid.is_empty()).ok_or_else(|| invalid("missing cluster id."))?;

	match host.rsplit_once(':') {
		Some((domain, port)) if port.parse::<u16>().is_ok() =>
			Ok(format!("https://{es_uuid}.{domain}:{port}")),
		_ => Ok(format!("https://{es_uuid}.{host}")),
	}
}
