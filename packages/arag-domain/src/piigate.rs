use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SSN: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("SSN pattern is static and must compile.")
});

// Dates count as DOB only with nearby birth context. This keeps application
// dates and follow-up timelines indexable.
static DOB_CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)\b(dob|date of birth|born)\b")
		.expect("DOB context pattern is static and must compile.")
});
static DATE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"\b(0[1-9]|1[0-2])/(0[1-9]|[12]\d|3[01])/(19\d{2}|20\d{2})\b|\b(19\d{2}|20\d{2})-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])\b",
	)
	.expect("Date pattern is static and must compile.")
});

const CONTEXT_WINDOW_BYTES: usize = 40;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiKind {
	Ssn,
	Dob,
}
impl PiiKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Ssn => "ssn",
			Self::Dob => "dob",
		}
	}
}

/// A high-risk match. Offsets are byte positions into the scanned text; the
/// matched content itself is never carried.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Finding {
	pub kind: PiiKind,
	pub start: usize,
	pub end: usize,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rejection {
	pub field: String,
	pub kinds: Vec<PiiKind>,
}
impl Rejection {
	pub fn kinds_label(&self) -> String {
		let mut labels: Vec<&str> = self.kinds.iter().map(|kind| kind.as_str()).collect();

		labels.sort_unstable();
		labels.dedup();
		labels.join(", ")
	}
}
impl std::fmt::Display for Rejection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "High-risk PII detected in {}: {}.", self.field, self.kinds_label())
	}
}

pub fn scan(text: &str) -> Vec<Finding> {
	let mut findings = Vec::new();

	for matched in SSN.find_iter(text) {
		findings.push(Finding { kind: PiiKind::Ssn, start: matched.start(), end: matched.end() });
	}

	for matched in DATE.find_iter(text) {
		let window_start = floor_char_boundary(text, matched.start().saturating_sub(CONTEXT_WINDOW_BYTES));
		let window_end = ceil_char_boundary(text, (matched.end() + CONTEXT_WINDOW_BYTES).min(text.len()));
		let window = &text[window_start..window_end];

		if DOB_CONTEXT.is_match(window) {
			findings.push(Finding {
				kind: PiiKind::Dob,
				start: matched.start(),
				end: matched.end(),
			});
		}
	}

	findings
}

/// The hard gate. Every text bound for the index, the journals, or the
/// event log goes through here; on a match the write is rejected whole.
pub fn gate(text: &str, field: &str) -> Result<(), Rejection> {
	let findings = scan(text);

	if findings.is_empty() {
		return Ok(());
	}

	Err(Rejection {
		field: field.to_string(),
		kinds: findings.into_iter().map(|finding| finding.kind).collect(),
	})
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
	while index > 0 && !text.is_char_boundary(index) {
		index -= 1;
	}

	index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
	while index < text.len() && !text.is_char_boundary(index) {
		index += 1;
	}

	index
}
