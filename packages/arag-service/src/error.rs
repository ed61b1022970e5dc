pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error(
		"Invalid feedback outcome {outcome:?}. Terminal outcomes: blocked, interview, \
		 no_response, offer, rejected, response."
	)]
	InvalidOutcome { outcome: String },
	#[error("{rejection}")]
	PiiDetected { rejection: arag_domain::piigate::Rejection },
	#[error("Index is missing or not built. Run build first.")]
	IndexUnavailable,
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Sampling error: {message}")]
	Sampling { message: String },
}
impl From<arag_storage::Error> for Error {
	fn from(err: arag_storage::Error) -> Self {
		match err {
			arag_storage::Error::IndexUnavailable => Self::IndexUnavailable,
			arag_storage::Error::NotFound(message) => Self::NotFound { message },
			other => Self::Storage { message: other.to_string() },
		}
	}
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}
impl From<arag_domain::piigate::Rejection> for Error {
	fn from(rejection: arag_domain::piigate::Rejection) -> Self {
		Self::PiiDetected { rejection }
	}
}
impl From<arag_bandit::Error> for Error {
	fn from(err: arag_bandit::Error) -> Self {
		Self::Sampling { message: err.to_string() }
	}
}
