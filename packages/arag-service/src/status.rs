use std::collections::HashMap;

use serde::Serialize;

use crate::{RagService, Result};
use arag_bandit::Recommendation;
use arag_domain::{Status, TargetingSummary};
use arag_storage::queries;

#[derive(Debug, Serialize)]
pub struct StatusCount {
	pub status: String,
	pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct PendingItem {
	pub app_id: String,
	pub company: String,
	pub role: String,
	pub method: String,
	pub category: String,
}

/// The dashboard summary: one machine-readable shape for everything the
/// operator sees.
#[derive(Debug, Serialize)]
pub struct StatusReport {
	pub total: u64,
	pub schema_version: Option<u32>,
	pub counts: Vec<StatusCount>,
	pub drafts: Vec<PendingItem>,
	pub blocked: Vec<PendingItem>,
	pub arms: Vec<Recommendation>,
	pub targeting: Vec<TargetingSummary>,
	pub short_events: u64,
	pub corrupt_short_lines: u64,
}

impl RagService {
	pub async fn status(&self) -> Result<StatusReport> {
		self.store.ensure_available().await?;

		let total = queries::count(&self.store.db).await?;
		let schema_version = queries::schema_version(&self.store.db).await?;
		let by_status: HashMap<String, u64> =
			queries::status_counts(&self.store.db).await?.into_iter().collect();
		let mut counts: Vec<StatusCount> = Status::ALL
			.iter()
			.map(|status| StatusCount {
				status: status.as_str().to_string(),
				count: by_status.get(status.as_str()).copied().unwrap_or(0),
			})
			.collect();

		// Anything the enum does not know about still shows up.
		for (status, count) in &by_status {
			if !Status::ALL.iter().any(|known| known.as_str() == status) {
				counts.push(StatusCount { status: status.clone(), count: *count });
			}
		}

		let mut drafts = Vec::new();
		let mut blocked = Vec::new();

		for row in queries::fetch_filtered(&self.store.db, None, None).await? {
			let item = PendingItem {
				app_id: row.app_id.clone(),
				company: row.company.clone(),
				role: row.role.clone(),
				method: row.method.clone(),
				category: row.category.clone(),
			};

			match row.status.as_str() {
				"Draft" => drafts.push(item),
				"Blocked" => blocked.push(item),
				_ => {},
			}
		}

		let short = self.read_short(None)?;

		Ok(StatusReport {
			total,
			schema_version,
			counts,
			drafts,
			blocked,
			arms: self.arm_stats()?,
			targeting: self.read_long()?,
			short_events: short.events.len() as u64,
			corrupt_short_lines: short.skipped_lines,
		})
	}
}
