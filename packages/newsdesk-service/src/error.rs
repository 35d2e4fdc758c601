pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
}
impl From<newsdesk_providers::Error> for Error {
	fn from(err: newsdesk_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
