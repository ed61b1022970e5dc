pub mod contracts;
pub mod events;
pub mod feedback;
pub mod ingest;
pub mod recommend;
pub mod scan;
pub mod search;
pub mod session;
pub mod status;

mod error;

use std::{future::Future, pin::Pin, sync::Arc};

pub use contracts::{Envelope, RetrieveItem, RetrieveRequest};
pub use error::{Error, Result};
pub use events::{LogReport, ShortMemoryRead};
pub use feedback::{BatchReport, BatchSource, FeedbackReport, SyncReport};
pub use ingest::BuildReport;
pub use scan::ScanReport;
pub use search::{RankedRecord, RetrieveResult, ScoreBreakdown};
pub use status::StatusReport;

use arag_config::Config;
use arag_storage::Store;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a arag_config::Embedding,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
}

/// The service owns the injected store handle for the duration of one
/// command: open at command start, closed at command end.
pub struct RagService {
	pub cfg: Config,
	pub store: Store,
	pub providers: Providers,
}
impl RagService {
	pub fn new(cfg: Config, store: Store) -> Self {
		let providers = default_providers(&cfg);

		Self::with_providers(cfg, store, providers)
	}

	pub fn with_providers(cfg: Config, store: Store, providers: Providers) -> Self {
		Self { cfg, store, providers }
	}

	pub async fn close(self) {
		self.store.close().await;
	}

	pub(crate) async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		if texts.is_empty() {
			return Ok(Vec::new());
		}

		let vectors = self
			.providers
			.embedding
			.embed(&self.cfg.embedding, texts)
			.await
			.map_err(|err| Error::Provider { message: err.to_string() })?;

		if vectors.len() != texts.len() {
			return Err(Error::Provider {
				message: format!(
					"Embedding provider returned {} vectors for {} inputs.",
					vectors.len(),
					texts.len(),
				),
			});
		}

		Ok(vectors)
	}

	pub(crate) async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
		let mut vectors = self.embed_many(&[text.to_string()]).await?;

		vectors.pop().ok_or_else(|| Error::Provider {
			message: "Embedding provider returned no vectors.".to_string(),
		})
	}
}

pub fn default_providers(cfg: &Config) -> Providers {
	let embedding: Arc<dyn EmbeddingProvider> = match cfg.embedding.provider.as_str() {
		"http" => Arc::new(HttpEmbedding),
		_ => Arc::new(HashEmbedding),
	};

	Providers { embedding }
}

struct HashEmbedding;

impl EmbeddingProvider for HashEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a arag_config::Embedding,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		let dims = cfg.dimensions as usize;
		let vectors =
			texts.iter().map(|text| arag_providers::hashing::hash_embedding(text, dims)).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

struct HttpEmbedding;

impl EmbeddingProvider for HttpEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a arag_config::Embedding,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			let Some(http) = cfg.http.as_ref() else {
				return Err(color_eyre::eyre::eyre!("embedding.http is not configured."));
			};

			arag_providers::embedding::embed(http, cfg.dimensions, texts).await
		})
	}
}
