use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, RagService, Result};
use arag_domain::{
	EpisodicEvent, Method, Outcome, TargetingSummary,
	memory::summarize_targeting,
	piigate,
};
use arag_storage::journal;

/// One line of the operational event log. Carries the same identity and
/// outcome fields as the episodic entry so `feedback-batch --source events`
/// can replay it through the same ledger.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OperationalEvent {
	pub event_id: Uuid,
	#[serde(with = "arag_domain::time_serde")]
	pub ts: OffsetDateTime,
	pub app_id: Option<String>,
	#[serde(rename = "type")]
	pub event_type: String,
	pub outcome: Option<Outcome>,
	pub msg: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct LogReport {
	pub event_id: Uuid,
	pub app_id: String,
	pub event_type: String,
}

#[derive(Debug, Serialize)]
pub struct ShortMemoryRead {
	pub events: Vec<EpisodicEvent>,
	pub skipped_lines: u64,
}

impl RagService {
	/// Append one event to the operational log and the episodic memory.
	/// The PII gate runs first; on a match neither file is touched.
	pub(crate) fn append_event(
		&self,
		app_id: Option<&str>,
		event_type: &str,
		message: &str,
		outcome: Option<Outcome>,
		arm: Option<(&str, Method)>,
	) -> Result<EpisodicEvent> {
		piigate::gate(message, "message")?;

		let now = OffsetDateTime::now_utc();
		let mut event = EpisodicEvent::new(
			now,
			app_id.map(str::to_string),
			event_type,
			outcome,
			message.to_string(),
		);

		if let Some((category, method)) = arm {
			event = event.with_arm(category, method);
		}

		let operational = OperationalEvent {
			event_id: event.event_id,
			ts: now,
			app_id: app_id.map(str::to_string),
			event_type: event_type.to_string(),
			outcome,
			msg: message.to_string(),
		};

		journal::append_line(&self.store.paths.events(), &operational)?;
		journal::append_line(&self.store.paths.memory_short(), &event)?;

		Ok(event)
	}

	/// The `log` operation: a manual, PII-gated note tied to an application.
	/// Fail-fast and atomic: a rejected message leaves both journals
	/// untouched.
	pub async fn log(&self, app_id: &str, event_type: &str, message: &str) -> Result<LogReport> {
		let app_id = app_id.trim();
		let event_type = event_type.trim();

		if app_id.is_empty() {
			return Err(Error::InvalidRequest { message: "app_id must be non-empty.".to_string() });
		}
		if event_type.is_empty() || event_type.chars().count() > 64 {
			return Err(Error::InvalidRequest {
				message: "event type must be a short non-empty label.".to_string(),
			});
		}

		// Weak reference: attach the arm when the application is indexed,
		// accept the note either way.
		let arm = if self.store.db.is_initialized().await? {
			arag_storage::queries::fetch_by_app_id(&self.store.db, app_id)
				.await?
				.and_then(|row| row.to_record().ok())
				.map(|record| (record.category, record.method))
		} else {
			None
		};
		let event = self.append_event(
			Some(app_id),
			event_type,
			message,
			None,
			arm.as_ref().map(|(category, method)| (category.as_str(), *method)),
		)?;

		Ok(LogReport {
			event_id: event.event_id,
			app_id: app_id.to_string(),
			event_type: event_type.to_string(),
		})
	}

	/// Read the episodic stream, optionally bounded to events at or after
	/// `since`. Corrupt lines are skipped and counted.
	pub fn read_short(&self, since: Option<OffsetDateTime>) -> Result<ShortMemoryRead> {
		let read: journal::JournalRead<EpisodicEvent> =
			journal::read_lines(&self.store.paths.memory_short())?;
		let events = match since {
			Some(since) => read.entries.into_iter().filter(|event| event.ts >= since).collect(),
			None => read.entries,
		};

		Ok(ShortMemoryRead { events, skipped_lines: read.skipped as u64 })
	}

	/// Manually add one distilled summary to the long-term view.
	pub fn append_long(&self, summary: &TargetingSummary) -> Result<()> {
		journal::append_line(&self.store.paths.memory_long(), summary)?;

		Ok(())
	}

	/// Recompute the long-term view from the episodic stream and replace it
	/// wholesale. Safe on an empty stream.
	pub fn recompute_long(&self, now: OffsetDateTime) -> Result<Vec<TargetingSummary>> {
		let read = self.read_short(None)?;
		let summaries = summarize_targeting(&read.events, now);

		journal::replace_lines(&self.store.paths.memory_long(), &summaries)?;

		Ok(summaries)
	}

	pub fn read_long(&self) -> Result<Vec<TargetingSummary>> {
		let read: journal::JournalRead<TargetingSummary> =
			journal::read_lines(&self.store.paths.memory_long())?;

		Ok(read.entries)
	}
}
