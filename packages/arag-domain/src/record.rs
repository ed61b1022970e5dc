use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// ATS host patterns ordered by specificity. Hosts without a dedicated
/// variant collapse into `Method::Other`.
static ATS_PATTERNS: LazyLock<Vec<(Method, Regex)>> = LazyLock::new(|| {
	[
		(Method::Ashby, r"ashbyhq\.com"),
		(Method::Greenhouse, r"greenhouse\.io|job-boards\.greenhouse\.io"),
		(Method::Linkedin, r"linkedin\.com/jobs"),
		(Method::Other, r"jobs\.lever\.co"),
		(Method::Other, r"wellfound\.com|angel\.co"),
		(Method::Other, r"myworkdayjobs\.com|workday\.com"),
	]
	.into_iter()
	.map(|(method, pattern)| {
		(method, Regex::new(pattern).expect("ATS patterns are static and must compile."))
	})
	.collect()
});

static NON_ALNUM: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("Slug pattern is static and must compile."));

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Status {
	Draft,
	Applied,
	Blocked,
	Rejected,
	Response,
	Interview,
	Offer,
	Closed,
}
impl Status {
	pub const ALL: [Self; 8] = [
		Self::Applied,
		Self::Draft,
		Self::Blocked,
		Self::Closed,
		Self::Rejected,
		Self::Response,
		Self::Interview,
		Self::Offer,
	];

	/// Lenient tracker parse. Empty means not yet submitted; unknown labels
	/// are a row-level validation error, not a silent default.
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"" | "draft" | "in progress" => Some(Self::Draft),
			"applied" => Some(Self::Applied),
			"blocked" => Some(Self::Blocked),
			"rejected" => Some(Self::Rejected),
			"response" => Some(Self::Response),
			"interview" => Some(Self::Interview),
			"offer" => Some(Self::Offer),
			"closed" => Some(Self::Closed),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Draft => "Draft",
			Self::Applied => "Applied",
			Self::Blocked => "Blocked",
			Self::Rejected => "Rejected",
			Self::Response => "Response",
			Self::Interview => "Interview",
			Self::Offer => "Offer",
			Self::Closed => "Closed",
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
	Direct,
	Ashby,
	Greenhouse,
	Linkedin,
	Referral,
	Other,
}
impl Method {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"direct" => Some(Self::Direct),
			"ashby" => Some(Self::Ashby),
			"greenhouse" => Some(Self::Greenhouse),
			"linkedin" => Some(Self::Linkedin),
			"referral" => Some(Self::Referral),
			"other" => Some(Self::Other),
			_ => None,
		}
	}

	/// Infer the application method from a job URL. Unrecognized hosts are
	/// treated as a direct application.
	pub fn infer_from_url(url: &str) -> Self {
		let url = url.trim().to_ascii_lowercase();

		if url.is_empty() {
			return Self::Direct;
		}

		for (method, pattern) in ATS_PATTERNS.iter() {
			if pattern.is_match(&url) {
				return *method;
			}
		}

		Self::Direct
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Direct => "direct",
			Self::Ashby => "ashby",
			Self::Greenhouse => "greenhouse",
			Self::Linkedin => "linkedin",
			Self::Referral => "referral",
			Self::Other => "other",
		}
	}
}

/// Artifact paths resolved by company-directory convention. Paths only;
/// artifact content never enters the record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Artifacts {
	pub resumes: Vec<String>,
	pub cover_letters: Vec<String>,
	pub cover_letter_used: Option<String>,
	pub evidence: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ApplicationRecord {
	pub app_id: String,
	pub company: String,
	pub role: String,
	pub status: Status,
	pub method: Method,
	pub category: String,
	pub url: String,
	pub date_applied: String,
	pub follow_up_date: String,
	pub notes: String,
	pub artifacts: Artifacts,
	/// Compact pipe-joined field bundle served as retrieval context.
	pub context: String,
	/// Full keyword-searchable blob; also the embedding input.
	pub text: String,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
}

pub fn slug(raw: &str) -> String {
	let lowered = raw.trim().to_ascii_lowercase();
	let slugged = NON_ALNUM.replace_all(&lowered, "-");
	let trimmed = slugged.trim_matches('-');

	if trimmed.is_empty() { "unknown".to_string() } else { trimmed.to_string() }
}

/// Stable application identity: readable company/role slugs plus a short
/// content hash so renamed URLs do not collide.
pub fn stable_id(company: &str, role: &str, url: &str) -> String {
	let company = slug(company);
	let role = slug(role);
	let base = format!("{company}__{role}__{}", url.trim());
	let digest = blake3::hash(base.as_bytes()).to_hex();

	format!("{company}__{role}__{}", &digest.as_str()[..10])
}

pub fn normalize_category(raw: &str) -> String {
	let category = slug(raw);

	if category == "unknown" { "other".to_string() } else { category }
}
