use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{Error, Result};
use arag_domain::{ApplicationRecord, Artifacts, Method, Status};

/// One row of the `applications` table: the read-only index projection of
/// an [`ApplicationRecord`]. Fully rebuildable; never hand-edited.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct IndexedApplication {
	pub app_id: String,
	pub company: String,
	pub role: String,
	pub status: String,
	pub method: String,
	pub category: String,
	pub url: String,
	pub date_applied: String,
	pub follow_up_date: String,
	pub notes: String,
	pub artifacts: String,
	pub context: String,
	pub text: String,
	pub embedding: Vec<u8>,
	pub updated_at: String,
}
impl IndexedApplication {
	pub fn from_record(record: &ApplicationRecord, embedding: &[f32]) -> Result<Self> {
		let updated_at = record
			.updated_at
			.format(&Rfc3339)
			.map_err(|_| Error::Decode(record.app_id.clone()))?;

		Ok(Self {
			app_id: record.app_id.clone(),
			company: record.company.clone(),
			role: record.role.clone(),
			status: record.status.as_str().to_string(),
			method: record.method.as_str().to_string(),
			category: record.category.clone(),
			url: record.url.clone(),
			date_applied: record.date_applied.clone(),
			follow_up_date: record.follow_up_date.clone(),
			notes: record.notes.clone(),
			artifacts: serde_json::to_string(&record.artifacts)?,
			context: record.context.clone(),
			text: record.text.clone(),
			embedding: encode_embedding(embedding),
			updated_at,
		})
	}

	pub fn to_record(&self) -> Result<ApplicationRecord> {
		let status =
			Status::parse(&self.status).ok_or_else(|| Error::Decode(self.app_id.clone()))?;
		let method =
			Method::parse(&self.method).ok_or_else(|| Error::Decode(self.app_id.clone()))?;
		let artifacts: Artifacts = serde_json::from_str(&self.artifacts)?;
		let updated_at = OffsetDateTime::parse(&self.updated_at, &Rfc3339)
			.map_err(|_| Error::Decode(self.app_id.clone()))?;

		Ok(ApplicationRecord {
			app_id: self.app_id.clone(),
			company: self.company.clone(),
			role: self.role.clone(),
			status,
			method,
			category: self.category.clone(),
			url: self.url.clone(),
			date_applied: self.date_applied.clone(),
			follow_up_date: self.follow_up_date.clone(),
			notes: self.notes.clone(),
			artifacts,
			context: self.context.clone(),
			text: self.text.clone(),
			updated_at,
		})
	}

	pub fn embedding_f32(&self) -> Vec<f32> {
		decode_embedding(&self.embedding)
	}
}

pub fn encode_embedding(vector: &[f32]) -> Vec<u8> {
	let mut bytes = Vec::with_capacity(vector.len() * 4);

	for value in vector {
		bytes.extend_from_slice(&value.to_le_bytes());
	}

	bytes
}

pub fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
	bytes
		.chunks_exact(4)
		.map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
		.collect()
}
