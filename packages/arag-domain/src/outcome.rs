use serde::{Deserialize, Serialize};

use crate::record::Status;

/// Terminal outcome signals. "applied" and "draft" are statuses, not
/// outcomes, and must be rejected as feedback inputs.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
	Blocked,
	NoResponse,
	Rejected,
	Response,
	Interview,
	Offer,
}
impl Outcome {
	pub const ALL: [Self; 6] = [
		Self::Blocked,
		Self::NoResponse,
		Self::Rejected,
		Self::Response,
		Self::Interview,
		Self::Offer,
	];

	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"blocked" => Some(Self::Blocked),
			"no_response" => Some(Self::NoResponse),
			"rejected" => Some(Self::Rejected),
			"response" => Some(Self::Response),
			"interview" => Some(Self::Interview),
			"offer" => Some(Self::Offer),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Blocked => "blocked",
			Self::NoResponse => "no_response",
			Self::Rejected => "rejected",
			Self::Response => "response",
			Self::Interview => "interview",
			Self::Offer => "offer",
		}
	}

	/// Success feeds the arm's alpha count; failure feeds beta.
	pub fn is_success(self) -> bool {
		matches!(self, Self::Response | Self::Interview | Self::Offer)
	}

	/// Recency weight used by the episodic memory boost.
	pub fn score_hint(self) -> f32 {
		match self {
			Self::Blocked => 0.2,
			Self::NoResponse => 0.3,
			Self::Rejected => 0.4,
			Self::Response => 0.7,
			Self::Interview => 0.9,
			Self::Offer => 1.0,
		}
	}

	/// The record status this outcome implies, when it implies one.
	/// Hearing nothing does not move the record.
	pub fn implied_status(self) -> Option<Status> {
		match self {
			Self::Blocked => Some(Status::Blocked),
			Self::NoResponse => None,
			Self::Rejected => Some(Status::Rejected),
			Self::Response => Some(Status::Response),
			Self::Interview => Some(Status::Interview),
			Self::Offer => Some(Status::Offer),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_non_terminal_kinds() {
		assert!(Outcome::parse("applied").is_none());
		assert!(Outcome::parse("draft").is_none());
		assert!(Outcome::parse("").is_none());
	}

	#[test]
	fn parses_terminal_kinds() {
		assert_eq!(Outcome::parse(" Interview "), Some(Outcome::Interview));
		assert_eq!(Outcome::parse("no_response"), Some(Outcome::NoResponse));
	}

	#[test]
	fn success_taxonomy_is_fixed() {
		assert!(Outcome::Response.is_success());
		assert!(Outcome::Interview.is_success());
		assert!(Outcome::Offer.is_success());
		assert!(!Outcome::Rejected.is_success());
		assert!(!Outcome::NoResponse.is_success());
		assert!(!Outcome::Blocked.is_success());
	}
}
