use std::collections::BTreeMap;

use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
	Error, RagService, Result,
	ingest::{self, TrackerRow},
};
use arag_bandit::{Arm, ThompsonModel};
use arag_domain::{EpisodicEvent, Method, Outcome, Status};
use arag_storage::{journal, queries};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BatchSource {
	ShortMemory,
	Events,
}
impl BatchSource {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"memory_short" | "short" => Some(Self::ShortMemory),
			"events" => Some(Self::Events),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::ShortMemory => "memory_short",
			Self::Events => "events",
		}
	}
}

#[derive(Debug, Serialize)]
pub struct FeedbackReport {
	pub app_id: String,
	pub company: String,
	pub role: String,
	pub outcome: Outcome,
	pub category: String,
	pub method: Method,
	pub alpha: f64,
	pub beta: f64,
	pub mean: f64,
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
	pub source: &'static str,
	pub processed: u64,
	pub skipped: u64,
	pub duplicates: u64,
	pub corrupt_lines: u64,
	pub arms_touched: u64,
	pub failures: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SyncReport {
	pub processed: u64,
	pub skipped: u64,
}

impl RagService {
	pub(crate) fn load_model(&self) -> Result<ThompsonModel> {
		let arms: BTreeMap<String, Arm> =
			journal::load_json(&self.store.paths.arms())?.unwrap_or_default();

		Ok(ThompsonModel::from_arms(arms, self.cfg.bandit.prior_alpha, self.cfg.bandit.prior_beta))
	}

	pub(crate) fn save_model(&self, model: &ThompsonModel) -> Result<()> {
		journal::save_json(&self.store.paths.arms(), model.arms())?;

		Ok(())
	}

	/// Record one terminal outcome. Fail-fast and atomic: an unknown
	/// outcome or application mutates nothing.
	pub async fn feedback(&self, app_id: &str, outcome_raw: &str) -> Result<FeedbackReport> {
		let Some(outcome) = Outcome::parse(outcome_raw) else {
			return Err(Error::InvalidOutcome { outcome: outcome_raw.trim().to_string() });
		};

		self.store.ensure_available().await?;

		let row = queries::fetch_by_app_id(&self.store.db, app_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: format!("app_id {app_id:?} is not indexed.") })?;
		let record = row.to_record()?;
		let now = OffsetDateTime::now_utc();
		let mut model = self.load_model()?;
		let arm = model.observe(&record.category, record.method, outcome, now);
		let (alpha, beta, mean) = (arm.alpha, arm.beta, arm.mean());

		self.save_model(&model)?;

		if let Some(status) = outcome.implied_status() {
			let updated_at = now
				.format(&Rfc3339)
				.map_err(|err| Error::Storage { message: err.to_string() })?;

			queries::update_status(&self.store.db, app_id, status.as_str(), &updated_at).await?;
		}

		self.append_event(
			Some(app_id),
			"feedback",
			&format!(
				"outcome={} category={} method={}",
				outcome.as_str(),
				record.category,
				record.method.as_str(),
			),
			Some(outcome),
			Some((&record.category, record.method)),
		)?;
		tracing::info!(app_id, outcome = outcome.as_str(), "Recorded outcome.");

		Ok(FeedbackReport {
			app_id: app_id.to_string(),
			company: record.company,
			role: record.role,
			outcome,
			category: record.category,
			method: record.method,
			alpha,
			beta,
			mean,
		})
	}

	/// Replay a stream of historical outcomes into the model exactly once
	/// per event. The ledger of applied event ids makes a second replay of
	/// the same stream a no-op.
	pub async fn feedback_batch(&self, source: BatchSource) -> Result<BatchReport> {
		self.store.ensure_available().await?;

		let (events, corrupt_lines) = self.batch_events(source)?;
		let mut ledger = journal::load_ledger(&self.store.paths.feedback_ledger())?;
		let mut model = self.load_model()?;
		let now = OffsetDateTime::now_utc();
		let mut report = BatchReport {
			source: source.as_str(),
			processed: 0,
			skipped: 0,
			duplicates: 0,
			corrupt_lines,
			arms_touched: 0,
			failures: Vec::new(),
		};
		let mut touched = std::collections::BTreeSet::new();

		for event in events {
			let Some(outcome) = event.outcome else {
				report.skipped += 1;

				continue;
			};
			let key = event.event_id.to_string();

			if ledger.contains(&key) {
				report.duplicates += 1;

				continue;
			}

			let arm = match self.resolve_arm(&event).await {
				Ok(Some(arm)) => arm,
				Ok(None) => {
					report.skipped += 1;

					continue;
				},
				Err(message) => {
					report.failures.push(message);

					continue;
				},
			};

			model.observe(&arm.0, arm.1, outcome, now);
			touched.insert(ThompsonModel::key(&arm.0, arm.1));
			ledger.insert(key);
			report.processed += 1;
		}

		report.arms_touched = touched.len() as u64;

		self.save_model(&model)?;
		journal::save_ledger(&self.store.paths.feedback_ledger(), &ledger)?;
		self.append_event(
			None,
			"feedback_batch",
			&format!(
				"source={} processed={} skipped={} duplicates={} arms={}",
				report.source, report.processed, report.skipped, report.duplicates,
				report.arms_touched,
			),
			None,
			None,
		)?;

		Ok(report)
	}

	/// Infer explicit outcomes from tracker response columns and replay
	/// them through the same ledger discipline as feedback-batch.
	pub async fn sync(&self) -> Result<SyncReport> {
		self.store.ensure_available().await?;

		let rows = ingest::read_tracker(&self.cfg.paths.tracker_csv)?;
		let mut ledger = journal::load_ledger(&self.store.paths.tracker_ledger())?;
		let mut model = self.load_model()?;
		let now = OffsetDateTime::now_utc();
		let mut processed = 0;
		let mut skipped = 0;

		for row in &rows {
			let Ok(normalized) = ingest::normalize_row(row) else {
				skipped += 1;

				continue;
			};
			let Some(outcome) = infer_tracker_outcome(row, normalized.status) else {
				skipped += 1;

				continue;
			};
			let dedupe_key = [
				normalized.app_id.as_str(),
				outcome.as_str(),
				normalized.status.as_str(),
				row.response.trim(),
				row.interview_stage.trim(),
				row.response_type.trim(),
			]
			.join("|")
			.to_lowercase();

			if ledger.contains(&dedupe_key) {
				skipped += 1;

				continue;
			}

			// Prefer the indexed record's arm; fall back to the normalized
			// row when the application is not indexed yet.
			let (category, method) = match queries::fetch_by_app_id(&self.store.db, &normalized.app_id)
				.await?
			{
				Some(indexed) => match indexed.to_record() {
					Ok(record) => (record.category, record.method),
					Err(_) => (normalized.category.clone(), normalized.method),
				},
				None => (normalized.category.clone(), normalized.method),
			};

			model.observe(&category, method, outcome, now);
			self.append_event(
				Some(&normalized.app_id),
				"tracker_outcome_sync",
				&format!(
					"outcome={} status={} method={}",
					outcome.as_str(),
					normalized.status.as_str(),
					method.as_str(),
				),
				Some(outcome),
				Some((&category, method)),
			)?;
			ledger.insert(dedupe_key);
			processed += 1;
		}

		self.save_model(&model)?;
		journal::save_ledger(&self.store.paths.tracker_ledger(), &ledger)?;
		self.append_event(
			None,
			"tracker_feedback_sync",
			&format!("processed={processed} skipped={skipped}"),
			None,
			None,
		)?;

		Ok(SyncReport { processed, skipped })
	}

	/// Quick up/down vote alias. The target application falls back to the
	/// most recent query results, then the freshest indexed application.
	pub async fn thumb(&self, app_id: Option<&str>, vote: &str) -> Result<FeedbackReport> {
		let outcome = outcome_from_thumb(vote)?;
		let app_id = match app_id {
			Some(app_id) if !app_id.trim().is_empty() => app_id.trim().to_string(),
			_ => self.infer_thumb_target().await?,
		};

		self.feedback(&app_id, outcome.as_str()).await
	}

	async fn infer_thumb_target(&self) -> Result<String> {
		let session = self.load_session()?;

		if let Some(last) = session.last_results
			&& let Some(app_id) = last.app_ids.into_iter().find(|app_id| !app_id.is_empty())
		{
			return Ok(app_id);
		}

		self.store.ensure_available().await?;

		queries::latest_app_id(&self.store.db).await?.ok_or_else(|| Error::InvalidRequest {
			message: "Cannot infer app_id for thumb feedback. Run query/retrieve first or pass \
			          --app-id."
				.to_string(),
		})
	}

	fn batch_events(&self, source: BatchSource) -> Result<(Vec<EpisodicEvent>, u64)> {
		match source {
			BatchSource::ShortMemory => {
				let read = self.read_short(None)?;

				Ok((read.events, read.skipped_lines))
			},
			BatchSource::Events => {
				let read: journal::JournalRead<crate::events::OperationalEvent> =
					journal::read_lines(&self.store.paths.events())?;
				let events = read
					.entries
					.into_iter()
					.map(|event| {
						let mut episodic = EpisodicEvent::new(
							event.ts,
							event.app_id,
							&event.event_type,
							event.outcome,
							event.msg,
						);

						// Replay identity is the original event id, not a
						// fresh one.
						episodic.event_id = event.event_id;

						episodic
					})
					.collect();

				Ok((events, read.skipped as u64))
			},
		}
	}

	/// The arm an event feeds: the event's own (category, method) when it
	/// carries one, otherwise the indexed record's.
	async fn resolve_arm(&self, event: &EpisodicEvent) -> Result<Option<(String, Method)>, String> {
		if let (Some(category), Some(method)) = (event.category.as_ref(), event.method) {
			return Ok(Some((category.clone(), method)));
		}

		let Some(app_id) = event.app_id.as_deref() else {
			return Ok(None);
		};
		let row = queries::fetch_by_app_id(&self.store.db, app_id)
			.await
			.map_err(|err| format!("event {}: {err}", event.event_id))?;
		let Some(row) = row else {
			return Ok(None);
		};
		let record =
			row.to_record().map_err(|err| format!("event {}: {err}", event.event_id))?;

		Ok(Some((record.category, record.method)))
	}
}

fn outcome_from_thumb(vote: &str) -> Result<Outcome> {
	match vote.trim().to_lowercase().as_str() {
		"up" | "thumbs_up" | "+1" | "👍" => Ok(Outcome::Response),
		"down" | "thumbs_down" | "-1" | "👎" => Ok(Outcome::NoResponse),
		other => Err(Error::InvalidRequest {
			message: format!(
				"Unknown thumb vote {other:?}. Use one of: up, down, thumbs_up, thumbs_down, +1, \
				 -1."
			),
		}),
	}
}

/// Port of the tracker heuristics: explicit response/stage columns beat the
/// bare status, and only Applied rows are eligible for the softer signals.
fn infer_tracker_outcome(row: &TrackerRow, status: Status) -> Option<Outcome> {
	let combined = [
		row.response.trim().to_lowercase(),
		row.interview_stage.trim().to_lowercase(),
		row.response_type.trim().to_lowercase(),
	]
	.join(" | ");

	if status == Status::Offer || combined.contains("offer") {
		return Some(Outcome::Offer);
	}
	if status == Status::Rejected || combined.contains("reject") {
		return Some(Outcome::Rejected);
	}
	if status == Status::Blocked
		|| combined.contains("blocked")
		|| combined.contains("captcha")
	{
		return Some(Outcome::Blocked);
	}
	if status == Status::Interview {
		return Some(Outcome::Interview);
	}
	if status == Status::Response {
		return Some(Outcome::Response);
	}
	if status != Status::Applied {
		return None;
	}

	const INTERVIEW_MARKERS: [&str; 5] =
		["interview", "phone screen", "screening", "onsite", "final round"];

	if INTERVIEW_MARKERS.iter().any(|marker| combined.contains(marker)) {
		return Some(Outcome::Interview);
	}

	const RESPONSE_MARKERS: [&str; 5] =
		["recruiter", "reached out", "reply", "responded", "response"];

	if RESPONSE_MARKERS.iter().any(|marker| combined.contains(marker)) {
		return Some(Outcome::Response);
	}

	None
}

#[cfg(test)]
mod tests {
	use super::*;

	fn row(response: &str, stage: &str, response_type: &str) -> TrackerRow {
		TrackerRow {
			company: "Acme".to_string(),
			role: "Engineer".to_string(),
			url: String::new(),
			status: String::new(),
			method: String::new(),
			category: String::new(),
			date_applied: String::new(),
			follow_up_date: String::new(),
			notes: String::new(),
			cover_letter_used: String::new(),
			response: response.to_string(),
			interview_stage: stage.to_string(),
			response_type: response_type.to_string(),
		}
	}

	#[test]
	fn explicit_signals_beat_status() {
		assert_eq!(
			infer_tracker_outcome(&row("We'd like to extend an offer", "", ""), Status::Applied),
			Some(Outcome::Offer),
		);
		assert_eq!(
			infer_tracker_outcome(&row("", "reCAPTCHA wall", ""), Status::Applied),
			Some(Outcome::Blocked),
		);
	}

	#[test]
	fn soft_signals_require_applied_status() {
		assert_eq!(
			infer_tracker_outcome(&row("recruiter reached out", "", ""), Status::Applied),
			Some(Outcome::Response),
		);
		assert_eq!(
			infer_tracker_outcome(&row("recruiter reached out", "", ""), Status::Draft),
			None,
		);
	}

	#[test]
	fn silent_rows_yield_nothing() {
		assert_eq!(infer_tracker_outcome(&row("", "", ""), Status::Applied), None);
	}

	#[test]
	fn thumb_votes_map_to_outcomes() {
		assert_eq!(outcome_from_thumb("up").ok(), Some(Outcome::Response));
		assert_eq!(outcome_from_thumb("👎").ok(), Some(Outcome::NoResponse));
		assert!(outcome_from_thumb("sideways").is_err());
	}
}
