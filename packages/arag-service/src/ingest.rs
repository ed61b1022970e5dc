use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{Error, RagService, Result};
use arag_domain::{
	ApplicationRecord, Artifacts, Method, Status,
	piigate,
	record::{normalize_category, slug, stable_id},
};
use arag_storage::{journal, models::IndexedApplication, queries, schema};

/// One raw tracker row. Optional columns default to empty so a sparse
/// tracker still deserializes; validation happens in [`normalize_row`].
#[derive(Clone, Debug, Deserialize)]
pub struct TrackerRow {
	#[serde(rename = "Company", default)]
	pub company: String,
	#[serde(rename = "Role", default)]
	pub role: String,
	#[serde(rename = "Career Page URL", default)]
	pub url: String,
	#[serde(rename = "Status", default)]
	pub status: String,
	#[serde(rename = "Method", default)]
	pub method: String,
	#[serde(rename = "Category", default)]
	pub category: String,
	#[serde(rename = "Date Applied", default)]
	pub date_applied: String,
	#[serde(rename = "Follow Up Date", default)]
	pub follow_up_date: String,
	#[serde(rename = "Notes", default)]
	pub notes: String,
	#[serde(rename = "Cover Letter Used", default)]
	pub cover_letter_used: String,
	#[serde(rename = "Response", default)]
	pub response: String,
	#[serde(rename = "Interview Stage", default)]
	pub interview_stage: String,
	#[serde(rename = "Response Type", default)]
	pub response_type: String,
}

#[derive(Clone, Debug)]
pub struct NormalizedRow {
	pub app_id: String,
	pub company: String,
	pub role: String,
	pub url: String,
	pub status: Status,
	pub method: Method,
	pub category: String,
	pub date_applied: String,
	pub follow_up_date: String,
	pub notes: String,
	pub cover_letter_used: String,
}

#[derive(Debug, Serialize)]
pub struct BuildReport {
	pub indexed: u64,
	pub skipped: Vec<String>,
	pub schema_version: u32,
}

pub fn read_tracker(path: &Path) -> Result<Vec<TrackerRow>> {
	if !path.exists() {
		return Err(Error::NotFound { message: format!("Tracker CSV not found at {path:?}.") });
	}

	let mut reader = csv::ReaderBuilder::new()
		.flexible(true)
		.trim(csv::Trim::All)
		.from_path(path)
		.map_err(|err| Error::Storage { message: err.to_string() })?;
	let mut rows = Vec::new();

	for row in reader.deserialize::<TrackerRow>() {
		let row = row.map_err(|err| Error::Storage { message: err.to_string() })?;

		if row.company.is_empty()
			&& row.role.is_empty()
			&& row.url.is_empty()
			&& row.status.is_empty()
		{
			continue;
		}

		rows.push(row);
	}

	Ok(rows)
}

/// Row-level validation. An `Err` here is a soft failure: the row is
/// skipped and reported, never aborting the build.
pub fn normalize_row(row: &TrackerRow) -> Result<NormalizedRow, String> {
	let company = row.company.trim().to_string();
	let role = row.role.trim().to_string();
	let url = row.url.trim().to_string();

	if company.is_empty() {
		return Err("missing company".to_string());
	}
	if role.is_empty() {
		return Err("missing role".to_string());
	}

	let status = Status::parse(&row.status)
		.ok_or_else(|| format!("unknown status {:?}", row.status.trim()))?;
	let method = if row.method.trim().is_empty() {
		Method::infer_from_url(&url)
	} else {
		Method::parse(&row.method)
			.ok_or_else(|| format!("unknown method {:?}", row.method.trim()))?
	};

	Ok(NormalizedRow {
		app_id: stable_id(&company, &role, &url),
		company,
		role,
		url,
		status,
		method,
		category: normalize_category(&row.category),
		date_applied: row.date_applied.trim().to_string(),
		follow_up_date: row.follow_up_date.trim().to_string(),
		notes: row.notes.trim().to_string(),
		cover_letter_used: row.cover_letter_used.trim().to_string(),
	})
}

impl RagService {
	/// Rebuild the index from the current tracker state. Wholesale: the
	/// index afterwards is a pure function of the tracker, and an empty
	/// tracker still yields a valid zero-row index.
	pub async fn build(&self) -> Result<BuildReport> {
		let now = OffsetDateTime::now_utc();
		let rows = read_tracker(&self.cfg.paths.tracker_csv)?;
		let mut records: Vec<ApplicationRecord> = Vec::with_capacity(rows.len());
		let mut skipped = Vec::new();

		for (index, row) in rows.iter().enumerate() {
			let line = index + 2;

			match self.build_record(row, now) {
				Ok(record) => {
					if records.iter().any(|existing| existing.app_id == record.app_id) {
						continue;
					}

					records.push(record);
				},
				Err(message) => {
					tracing::warn!(line, %message, "Skipping tracker row.");
					skipped.push(format!("row {line}: {message}"));
				},
			}
		}

		let inputs: Vec<String> =
			records.iter().map(arag_providers::hashing::record_embedding_input).collect();
		let vectors = self.embed_many(&inputs).await?;
		let mut indexed = Vec::with_capacity(records.len());

		for (record, vector) in records.iter().zip(&vectors) {
			indexed.push(IndexedApplication::from_record(record, vector)?);
		}

		let built_at = now
			.format(&Rfc3339)
			.map_err(|err| Error::Storage { message: err.to_string() })?;

		self.store.db.ensure_schema().await?;
		queries::replace_applications(&self.store.db, &indexed, &built_at).await?;

		// Derived memory: replace the long-term view, make sure the episodic
		// journal exists even before the first event.
		journal::touch(&self.store.paths.memory_short())?;
		self.recompute_long(now)?;

		self.append_event(
			None,
			"build_ok",
			&format!("Indexed {} applications, skipped {} rows", indexed.len(), skipped.len()),
			None,
			None,
		)?;
		tracing::info!(indexed = indexed.len(), skipped = skipped.len(), "Index rebuilt.");

		Ok(BuildReport {
			indexed: indexed.len() as u64,
			skipped,
			schema_version: schema::SCHEMA_VERSION,
		})
	}

	/// One tracker row to one record. Soft-fails with a reason string; the
	/// PII gate makes the row ineligible rather than aborting the build.
	fn build_record(
		&self,
		row: &TrackerRow,
		now: OffsetDateTime,
	) -> Result<ApplicationRecord, String> {
		let normalized = normalize_row(row)?;
		let artifacts = self.collect_artifacts(&normalized);
		let context = [
			format!("company={}", normalized.company),
			format!("role={}", normalized.role),
			format!("status={}", normalized.status.as_str()),
			format!("method={}", normalized.method.as_str()),
			format!("category={}", normalized.category),
		]
		.join(" | ");
		let text = [
			format!("Company: {}", normalized.company),
			format!("Role: {}", normalized.role),
			format!("Status: {}", normalized.status.as_str()),
			format!("Application Method: {}", normalized.method.as_str()),
			format!("Category: {}", normalized.category),
			format!("Career Page URL: {}", normalized.url),
			format!("Notes: {}", normalized.notes),
			format!("Cover Letter Used: {}", normalized.cover_letter_used),
		]
		.join("\n");

		for (field, value) in [
			("company", normalized.company.as_str()),
			("role", normalized.role.as_str()),
			("notes", normalized.notes.as_str()),
			("context", context.as_str()),
			("text", text.as_str()),
		] {
			piigate::gate(value, field).map_err(|rejection| rejection.to_string())?;
		}

		Ok(ApplicationRecord {
			app_id: normalized.app_id,
			company: normalized.company,
			role: normalized.role,
			status: normalized.status,
			method: normalized.method,
			category: normalized.category,
			url: normalized.url,
			date_applied: normalized.date_applied,
			follow_up_date: normalized.follow_up_date,
			notes: normalized.notes,
			artifacts,
			context,
			text,
			updated_at: now,
		})
	}

	/// Resolve artifact paths by company-directory convention. Paths only;
	/// content never enters the record.
	fn collect_artifacts(&self, row: &NormalizedRow) -> Artifacts {
		let root = &self.cfg.paths.applications_dir;
		let company_dir = root.join(slug(&row.company));
		let files = crate::scan::walk_files(&company_dir);
		let rel = |path: &Path| {
			path.strip_prefix(root).unwrap_or(path).to_string_lossy().replace('\\', "/")
		};
		let mut artifacts = Artifacts::default();

		for file in &files {
			let path = rel(file);

			if path.contains("/submissions/") {
				artifacts.evidence.push(path);
			} else if path.contains("/tailored_resumes/") {
				artifacts.resumes.push(path);
			} else if path.contains("/cover_letters/") {
				artifacts.cover_letters.push(path);
			}
		}

		artifacts.resumes.sort();
		artifacts.cover_letters.sort();
		artifacts.evidence.sort();
		artifacts.cover_letter_used = resolve_cover_letter(
			&row.cover_letter_used,
			&[company_dir.join("cover_letters"), root.join("cover_letters")],
		)
		.map(|path| rel(&path));

		artifacts
	}
}

/// Match a tracker cover-letter key against the conventional directories.
fn resolve_cover_letter(key: &str, search_dirs: &[PathBuf]) -> Option<PathBuf> {
	let key = key.trim().to_lowercase();

	if key.is_empty() {
		return None;
	}

	for dir in search_dirs {
		let Ok(entries) = std::fs::read_dir(dir) else {
			continue;
		};
		let mut files: Vec<PathBuf> =
			entries.flatten().map(|entry| entry.path()).filter(|path| path.is_file()).collect();

		files.sort();

		for file in files {
			let stem = file.file_stem().map(|stem| stem.to_string_lossy().to_lowercase());

			if stem.is_some_and(|stem| stem.contains(&key)) {
				return Some(file);
			}
		}
	}

	None
}
