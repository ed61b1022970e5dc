use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{RagService, Result};
use arag_storage::journal;

/// Operator session scratchpad. Only used for quality-of-life inference
/// (thumb votes without an explicit app id); never an input to scoring.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SessionState {
	pub last_results: Option<LastResults>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LastResults {
	pub source: String,
	pub query: String,
	pub app_ids: Vec<String>,
	#[serde(with = "arag_domain::time_serde")]
	pub ts: OffsetDateTime,
}

impl RagService {
	pub(crate) fn remember_results(&self, source: &str, query: &str, app_ids: Vec<String>) {
		let state = SessionState {
			last_results: Some(LastResults {
				source: source.to_string(),
				query: query.to_string(),
				app_ids,
				ts: OffsetDateTime::now_utc(),
			}),
		};

		// Session state is advisory; losing it must never fail a query.
		if let Err(err) = journal::save_json(&self.store.paths.session_state(), &state) {
			tracing::warn!(error = %err, "Failed to persist session state.");
		}
	}

	pub(crate) fn load_session(&self) -> Result<SessionState> {
		Ok(journal::load_json(&self.store.paths.session_state())?.unwrap_or_default())
	}
}
