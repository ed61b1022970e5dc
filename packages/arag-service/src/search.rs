pub mod ranking;

use std::collections::HashMap;

use serde::Serialize;
use time::OffsetDateTime;

use crate::{
	RagService, Result,
	contracts::{self, Envelope, RetrieveItem, RetrieveRequest},
	search::ranking::{ScoreInputs, Weights, fts_match_query, normalize_bm25, score_row},
};
use arag_domain::{ApplicationRecord, Method, Status, memory::recency_scores, text::word_tokens};
use arag_storage::queries;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct ScoreBreakdown {
	pub dense: f32,
	pub lexical: f32,
	pub memory: f32,
	pub bandit: f32,
}

/// One ranked result with its full record and score decomposition.
#[derive(Clone, Debug, Serialize)]
pub struct RankedRecord {
	pub record: ApplicationRecord,
	pub score: f32,
	pub breakdown: ScoreBreakdown,
}

/// Both output shapes of `retrieve`, derived from one ranked list without
/// re-querying.
#[derive(Debug, Serialize)]
pub struct RetrieveResult {
	pub request: RetrieveRequest,
	pub items: Vec<RetrieveItem>,
}
impl RetrieveResult {
	pub fn into_envelope(self, provider: &str) -> Result<Envelope> {
		contracts::build_envelope(
			self.request,
			self.items,
			provider,
			OffsetDateTime::now_utc(),
		)
	}
}

impl RagService {
	/// Free-text search. An empty query is valid and returns every indexed
	/// record, ranked by memory and bandit priors alone.
	pub async fn query(
		&self,
		query: &str,
		status: Option<Status>,
		method: Option<Method>,
		k: usize,
	) -> Result<Vec<RankedRecord>> {
		let status = status.map(|status| status.as_str());
		let method = method.map(|method| method.as_str());
		let ranked = self.ranked(query, status, method, k).await?;

		self.remember_results(
			"query",
			query,
			ranked.iter().map(|item| item.record.app_id.clone()).collect(),
		);

		Ok(ranked)
	}

	/// The strict retrieval endpoint for automation. Validation happens at
	/// request construction; filters are hard pre-filters.
	pub async fn retrieve(&self, request: RetrieveRequest) -> Result<RetrieveResult> {
		let status = request.status.map(|status| status.as_str());
		let method = request.method.map(|method| method.as_str());
		let ranked = self.ranked(&request.query, status, method, request.k as usize).await?;
		let context_chars = self.cfg.retrieve.context_chars as usize;
		let items: Vec<RetrieveItem> = ranked
			.into_iter()
			.map(|item| RetrieveItem {
				app_id: item.record.app_id,
				company: item.record.company,
				role: item.record.role,
				status: item.record.status,
				method: item.record.method,
				category: item.record.category,
				score: contracts::round_score(item.score),
				context: contracts::truncate_chars(&item.record.context, context_chars),
				evidence: item.record.artifacts.evidence,
			})
			.collect();

		self.remember_results(
			"retrieve",
			&request.query,
			items.iter().map(|item| item.app_id.clone()).collect(),
		);

		Ok(RetrieveResult { request, items })
	}

	/// Shared scoring pipeline: SQL pre-filter, dense + keyword channels,
	/// memory and bandit boosts, weighted fusion, recency tie-break.
	pub(crate) async fn ranked(
		&self,
		query: &str,
		status: Option<&str>,
		method: Option<&str>,
		k: usize,
	) -> Result<Vec<RankedRecord>> {
		self.store.ensure_available().await?;

		let rows = queries::fetch_filtered(&self.store.db, status, method).await?;

		if rows.is_empty() {
			return Ok(Vec::new());
		}

		let query = query.trim();
		let query_tokens = word_tokens(query);
		let query_vec = if query.is_empty() {
			None
		} else {
			Some(self.embed_one(query).await?)
		};
		let keyword: HashMap<String, f32> = match fts_match_query(query) {
			Some(match_query) => {
				queries::keyword_ranks(&self.store.db, &match_query, status, method)
					.await?
					.into_iter()
					.map(|(app_id, rank)| (app_id, normalize_bm25(rank)))
					.collect()
			},
			None => HashMap::new(),
		};
		let now = OffsetDateTime::now_utc();
		let short = self.read_short(None)?;
		let memory = recency_scores(&short.events, now, self.cfg.ranking.half_life_days);
		let model = self.load_model()?;
		let inputs = ScoreInputs {
			weights: Weights::from(&self.cfg.ranking),
			query_vec: query_vec.as_deref(),
			query_tokens: &query_tokens,
			keyword: &keyword,
			memory: &memory,
			model: &model,
		};
		let mut ranked = Vec::with_capacity(rows.len());

		for row in rows {
			let (score, breakdown) = score_row(&inputs, &row);
			let record = row.to_record()?;

			ranked.push(RankedRecord { record, score, breakdown });
		}

		// Ties break on freshness, newest first.
		ranked.sort_by(|a, b| {
			b.score
				.total_cmp(&a.score)
				.then_with(|| b.record.updated_at.cmp(&a.record.updated_at))
				.then_with(|| a.record.app_id.cmp(&b.record.app_id))
		});
		ranked.truncate(k);

		Ok(ranked)
	}
}
