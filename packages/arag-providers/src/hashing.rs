use arag_domain::{ApplicationRecord, text::tokenize};

/// Offline deterministic embedding: every unigram/bigram token hashes into
/// one of `dims` buckets, the bucket counts form the vector, and the vector
/// is L2-normalized. No model download, no network, stable across rebuilds.
pub fn hash_embedding(text: &str, dims: usize) -> Vec<f32> {
	let mut vec = vec![0.0_f32; dims.max(1)];

	for token in tokenize(text) {
		let digest = blake3::hash(token.as_bytes());
		let mut bytes = [0_u8; 8];

		bytes.copy_from_slice(&digest.as_bytes()[..8]);

		let bucket = (u64::from_le_bytes(bytes) % vec.len() as u64) as usize;

		vec[bucket] += 1.0;
	}

	let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();

	if norm > 0.0 {
		for v in &mut vec {
			*v /= norm;
		}
	}

	vec
}

/// Field-boosted embedding input: identity fields are repeated so a query
/// like "baseten infra" lands on the right record even when the artifact
/// text is long.
pub fn record_embedding_input(record: &ApplicationRecord) -> String {
	let mut parts: Vec<&str> = Vec::new();

	for _ in 0..5 {
		parts.push(&record.company);
	}
	for _ in 0..4 {
		parts.push(&record.role);
	}
	for _ in 0..3 {
		parts.push(&record.category);
	}
	for _ in 0..2 {
		parts.push(record.method.as_str());
	}

	parts.push(record.status.as_str());
	parts.push(&record.notes);
	parts.push(&record.context);
	parts.push(&record.context);
	parts.push(&record.text);

	parts.join(" ")
}

pub fn record_embedding(record: &ApplicationRecord, dims: usize) -> Vec<f32> {
	hash_embedding(&record_embedding_input(record), dims)
}

#[cfg(test)]
mod tests {
	use time::OffsetDateTime;

	use super::*;
	use arag_domain::{Artifacts, Method, Status};

	fn record(company: &str, role: &str, category: &str) -> ApplicationRecord {
		ApplicationRecord {
			app_id: format!("{company}-{role}"),
			company: company.to_string(),
			role: role.to_string(),
			status: Status::Applied,
			method: Method::Ashby,
			category: category.to_string(),
			url: String::new(),
			date_applied: String::new(),
			follow_up_date: String::new(),
			notes: String::new(),
			artifacts: Artifacts::default(),
			context: String::new(),
			text: format!("{company} {role} {category}"),
			updated_at: OffsetDateTime::UNIX_EPOCH,
		}
	}

	fn cosine(a: &[f32], b: &[f32]) -> f32 {
		a.iter().zip(b).map(|(x, y)| x * y).sum()
	}

	#[test]
	fn embeddings_are_deterministic_and_normalized() {
		let a = hash_embedding("infra engineer remote", 256);
		let b = hash_embedding("infra engineer remote", 256);

		assert_eq!(a, b);
		assert!((a.iter().map(|v| v * v).sum::<f32>().sqrt() - 1.0).abs() < 1e-5);
	}

	#[test]
	fn empty_text_embeds_to_zero_vector() {
		let vec = hash_embedding("", 64);

		assert!(vec.iter().all(|v| *v == 0.0));
	}

	#[test]
	fn related_text_scores_above_unrelated() {
		let infra = record_embedding(&record("Baseten", "Infra Engineer", "infra"), 512);
		let mobile = record_embedding(&record("Acme", "Mobile Developer", "mobile"), 512);
		let query = hash_embedding("infra engineer", 512);

		assert!(cosine(&query, &infra) > cosine(&query, &mobile));
	}
}
