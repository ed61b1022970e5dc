use std::collections::HashMap;

use arag_config::Ranking;
use arag_domain::text::word_tokens;
use arag_storage::models::IndexedApplication;

use crate::search::ScoreBreakdown;

/// Resolved fusion weights. Fixed configuration, not learned.
#[derive(Clone, Copy, Debug)]
pub struct Weights {
	pub dense: f32,
	pub lexical: f32,
	pub memory: f32,
	pub bandit: f32,
}
impl From<&Ranking> for Weights {
	fn from(cfg: &Ranking) -> Self {
		Self {
			dense: cfg.dense_weight,
			lexical: cfg.lexical_weight,
			memory: cfg.memory_weight,
			bandit: cfg.bandit_weight,
		}
	}
}

pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
	if a.len() != b.len() {
		return 0.0;
	}

	// Embeddings are L2-normalized at construction, so the dot product is
	// the cosine.
	a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Fraction of query terms present in the row's searchable fields.
pub fn lexical_overlap(query_tokens: &[String], row: &IndexedApplication) -> f32 {
	if query_tokens.is_empty() {
		return 0.0;
	}

	let haystack = [
		row.company.as_str(),
		row.role.as_str(),
		row.method.as_str(),
		row.category.as_str(),
		row.context.as_str(),
		row.notes.as_str(),
	]
	.join(" ")
	.to_lowercase();
	let hits = query_tokens.iter().filter(|token| haystack.contains(token.as_str())).count();

	(hits as f32 / query_tokens.len() as f32).min(1.0)
}

/// FTS5 MATCH string from free text: word tokens, quoted, OR-joined.
/// Quoting keeps user punctuation from reaching the MATCH parser.
pub fn fts_match_query(query: &str) -> Option<String> {
	let tokens = word_tokens(query);

	if tokens.is_empty() {
		return None;
	}

	let quoted: Vec<String> =
		tokens.iter().map(|token| format!("\"{}\"", token.replace('"', ""))).collect();

	Some(quoted.join(" OR "))
}

/// SQLite bm25() emits lower-is-better ranks (negative for good matches).
/// Flip and squash into [0, 1).
pub fn normalize_bm25(rank: f64) -> f32 {
	let raw = (-rank).max(0.0);

	(raw / (1.0 + raw)) as f32
}

pub struct ScoreInputs<'a> {
	pub weights: Weights,
	pub query_vec: Option<&'a [f32]>,
	pub query_tokens: &'a [String],
	/// app_id -> normalized BM25 keyword score.
	pub keyword: &'a HashMap<String, f32>,
	/// app_id -> recency-weighted episodic boost.
	pub memory: &'a HashMap<String, f32>,
	pub model: &'a arag_bandit::ThompsonModel,
}

/// The fusion rule: a weighted sum of dense similarity, keyword overlap,
/// episodic memory recency, and the bandit prior for the record's arm.
/// BM25 serves as the keyword score where the FTS channel matched the row;
/// plain term overlap covers rows recalled by the dense channel alone.
pub fn score_row(inputs: &ScoreInputs<'_>, row: &IndexedApplication) -> (f32, ScoreBreakdown) {
	let dense = inputs
		.query_vec
		.map(|query| cosine(query, &row.embedding_f32()).max(0.0))
		.unwrap_or(0.0);
	let lexical = inputs
		.keyword
		.get(&row.app_id)
		.copied()
		.unwrap_or_else(|| lexical_overlap(inputs.query_tokens, row));
	let memory = inputs.memory.get(&row.app_id).copied().unwrap_or(0.0);
	let bandit = arag_domain::Method::parse(&row.method)
		.map(|method| inputs.model.mean(&row.category, method) as f32)
		.unwrap_or(0.0);
	let breakdown = ScoreBreakdown { dense, lexical, memory, bandit };
	let score = inputs.weights.dense * dense
		+ inputs.weights.lexical * lexical
		+ inputs.weights.memory * memory
		+ inputs.weights.bandit * bandit;

	(score, breakdown)
}
