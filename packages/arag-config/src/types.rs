use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub paths: Paths,
	pub embedding: Embedding,
	pub retrieve: Retrieve,
	pub ranking: Ranking,
	pub bandit: Bandit,
	pub watch: Watch,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
	/// Identity stamped into retrieve envelopes.
	#[serde(default = "default_provider_name")]
	pub provider_name: String,
}

/// Filesystem layout. Relative entries are resolved against the config
/// file's directory at load time.
#[derive(Debug, Deserialize)]
pub struct Paths {
	pub tracker_csv: PathBuf,
	pub applications_dir: PathBuf,
	pub data_dir: PathBuf,
	pub log_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct Embedding {
	/// "hash" (offline deterministic) or "http" (OpenAI-compatible endpoint).
	pub provider: String,
	pub dimensions: u32,
	pub http: Option<HttpEmbedding>,
}

#[derive(Debug, Deserialize)]
pub struct HttpEmbedding {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Retrieve {
	pub default_k: u32,
	pub max_k: u32,
	pub max_query_chars: u32,
	pub max_filter_chars: u32,
	pub context_chars: u32,
}

#[derive(Debug, Deserialize)]
pub struct Ranking {
	pub dense_weight: f32,
	pub lexical_weight: f32,
	pub memory_weight: f32,
	pub bandit_weight: f32,
	pub half_life_days: f32,
}

#[derive(Debug, Deserialize)]
pub struct Bandit {
	pub prior_alpha: f64,
	pub prior_beta: f64,
}

#[derive(Debug, Deserialize)]
pub struct Watch {
	pub interval_secs: u64,
}

fn default_provider_name() -> String {
	"local_fusion_v1".to_string()
}
