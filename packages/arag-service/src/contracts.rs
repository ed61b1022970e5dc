use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{Error, Result};
use arag_domain::{Method, Status};

pub const CONTRACT_RETRIEVE_V1: &str = "rag.retrieve.v1";
pub const CONTRACT_VERSION: &str = "2026-02-19";

const MAX_RESULTS: usize = 200;

/// Validated retrieve request. Construction is the validation step; a value
/// of this type is always within contract limits.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RetrieveRequest {
	pub query: String,
	pub k: u32,
	pub status: Option<Status>,
	pub method: Option<Method>,
}
impl RetrieveRequest {
	pub fn new(
		query: &str,
		k: u32,
		status: Option<&str>,
		method: Option<&str>,
		limits: &arag_config::Retrieve,
	) -> Result<Self> {
		let query = query.trim().to_string();

		if query.is_empty() {
			return Err(Error::InvalidRequest {
				message: "retrieve query must be a non-empty string.".to_string(),
			});
		}
		if query.chars().count() > limits.max_query_chars as usize {
			return Err(Error::InvalidRequest {
				message: format!(
					"retrieve query exceeds {} characters.",
					limits.max_query_chars
				),
			});
		}
		if k < 1 || k > limits.max_k {
			return Err(Error::InvalidRequest {
				message: format!("retrieve k must be in [1, {}].", limits.max_k),
			});
		}

		let status = parse_filter(status, "status", limits, Status::parse)?;
		let method = parse_filter(method, "method", limits, Method::parse)?;

		Ok(Self { query, k, status, method })
	}
}

/// One canonical retrieve result. Context is truncated and scores rounded at
/// construction so both output shapes serve identical items.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RetrieveItem {
	pub app_id: String,
	pub company: String,
	pub role: String,
	pub status: Status,
	pub method: Method,
	pub category: String,
	pub score: f32,
	pub context: String,
	pub evidence: Vec<String>,
}

/// The strict response wrapper for automation callers.
#[derive(Clone, Debug, Serialize)]
pub struct Envelope {
	pub contract: &'static str,
	pub contract_version: &'static str,
	pub provider: String,
	pub generated_at: String,
	pub request: RetrieveRequest,
	pub results: Vec<RetrieveItem>,
}

pub fn build_envelope(
	request: RetrieveRequest,
	results: Vec<RetrieveItem>,
	provider: &str,
	generated_at: OffsetDateTime,
) -> Result<Envelope> {
	let provider = provider.trim();

	if provider.is_empty() {
		return Err(Error::InvalidRequest {
			message: "envelope provider must be a non-empty string.".to_string(),
		});
	}
	if results.len() > MAX_RESULTS {
		return Err(Error::InvalidRequest {
			message: format!("retrieve payload cannot exceed {MAX_RESULTS} results."),
		});
	}

	let generated_at = generated_at
		.format(&Rfc3339)
		.map_err(|err| Error::InvalidRequest { message: err.to_string() })?;

	Ok(Envelope {
		contract: CONTRACT_RETRIEVE_V1,
		contract_version: CONTRACT_VERSION,
		provider: provider.to_string(),
		generated_at,
		request,
		results,
	})
}

pub fn round_score(score: f32) -> f32 {
	(score * 10_000.0).round() / 10_000.0
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
	text.chars().take(max_chars).collect()
}

fn parse_filter<T>(
	raw: Option<&str>,
	name: &str,
	limits: &arag_config::Retrieve,
	parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>> {
	let Some(raw) = raw else {
		return Ok(None);
	};
	let trimmed = raw.trim();

	if trimmed.is_empty() {
		return Ok(None);
	}
	if trimmed.chars().count() > limits.max_filter_chars as usize {
		return Err(Error::InvalidRequest {
			message: format!("retrieve {name} exceeds {} characters.", limits.max_filter_chars),
		});
	}

	parse(trimmed).map(Some).ok_or_else(|| Error::InvalidRequest {
		message: format!("retrieve {name} {trimmed:?} is not a known value."),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn limits() -> arag_config::Retrieve {
		arag_config::Retrieve {
			default_k: 5,
			max_k: 50,
			max_query_chars: 512,
			max_filter_chars: 120,
			context_chars: 320,
		}
	}

	#[test]
	fn accepts_a_plain_request() {
		let request = RetrieveRequest::new("infra engineer", 5, Some("Applied"), None, &limits())
			.expect("Request must validate.");

		assert_eq!(request.query, "infra engineer");
		assert_eq!(request.status, Some(Status::Applied));
		assert_eq!(request.method, None);
	}

	#[test]
	fn rejects_empty_query() {
		assert!(matches!(
			RetrieveRequest::new("   ", 5, None, None, &limits()),
			Err(Error::InvalidRequest { .. }),
		));
	}

	#[test]
	fn rejects_oversized_query() {
		let query = "q".repeat(513);

		assert!(RetrieveRequest::new(&query, 5, None, None, &limits()).is_err());
	}

	#[test]
	fn rejects_out_of_range_k() {
		assert!(RetrieveRequest::new("infra", 0, None, None, &limits()).is_err());
		assert!(RetrieveRequest::new("infra", 51, None, None, &limits()).is_err());
	}

	#[test]
	fn rejects_unknown_filter_values() {
		assert!(RetrieveRequest::new("infra", 5, Some("ghosted"), None, &limits()).is_err());
		assert!(RetrieveRequest::new("infra", 5, None, Some("carrier-pigeon"), &limits()).is_err());
	}

	#[test]
	fn envelope_requires_provider() {
		let request =
			RetrieveRequest::new("infra", 5, None, None, &limits()).expect("Request must validate.");

		assert!(
			build_envelope(request, Vec::new(), "  ", OffsetDateTime::UNIX_EPOCH).is_err()
		);
	}

	#[test]
	fn scores_round_to_four_decimals() {
		assert_eq!(round_score(0.123_456), 0.123_5);
		assert_eq!(round_score(0.0), 0.0);
	}

	#[test]
	fn truncation_is_char_safe() {
		assert_eq!(truncate_chars("résumé", 4), "résu");
	}
}
