mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Bandit, Config, Embedding, HttpEmbedding, Paths, Ranking, Retrieve, Service, Watch,
};

use std::path::Path;

pub fn load(path: &Path) -> Result<Config> {
	let raw = std::fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg, path.parent().unwrap_or_else(|| Path::new(".")));

	validate(&cfg)?;

	Ok(cfg)
}

pub fn normalize(cfg: &mut Config, base: &Path) {
	cfg.embedding.provider = cfg.embedding.provider.trim().to_ascii_lowercase();
	cfg.service.provider_name = cfg.service.provider_name.trim().to_string();

	for path in [
		&mut cfg.paths.tracker_csv,
		&mut cfg.paths.applications_dir,
		&mut cfg.paths.data_dir,
		&mut cfg.paths.log_dir,
	] {
		if path.is_relative() {
			*path = base.join(path.as_path());
		}
	}
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation { message: "service.log_level must be non-empty.".to_string() });
	}
	if cfg.service.provider_name.is_empty() {
		return Err(Error::Validation {
			message: "service.provider_name must be non-empty.".to_string(),
		});
	}

	if !matches!(cfg.embedding.provider.as_str(), "hash" | "http") {
		return Err(Error::Validation {
			message: "embedding.provider must be one of hash or http.".to_string(),
		});
	}
	if cfg.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.embedding.provider == "http" {
		let Some(http) = cfg.embedding.http.as_ref() else {
			return Err(Error::Validation {
				message: "embedding.http is required when embedding.provider is http.".to_string(),
			});
		};

		if http.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: "embedding.http.api_base must be non-empty.".to_string(),
			});
		}
		if http.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "embedding.http.timeout_ms must be greater than zero.".to_string(),
			});
		}
	}

	if cfg.retrieve.default_k == 0 {
		return Err(Error::Validation {
			message: "retrieve.default_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieve.max_k == 0 || cfg.retrieve.max_k > 200 {
		return Err(Error::Validation {
			message: "retrieve.max_k must be in [1, 200].".to_string(),
		});
	}
	if cfg.retrieve.default_k > cfg.retrieve.max_k {
		return Err(Error::Validation {
			message: "retrieve.default_k must not exceed retrieve.max_k.".to_string(),
		});
	}
	if cfg.retrieve.max_query_chars == 0 {
		return Err(Error::Validation {
			message: "retrieve.max_query_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieve.max_filter_chars == 0 {
		return Err(Error::Validation {
			message: "retrieve.max_filter_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieve.context_chars == 0 {
		return Err(Error::Validation {
			message: "retrieve.context_chars must be greater than zero.".to_string(),
		});
	}

	let weights = [
		("ranking.dense_weight", cfg.ranking.dense_weight),
		("ranking.lexical_weight", cfg.ranking.lexical_weight),
		("ranking.memory_weight", cfg.ranking.memory_weight),
		("ranking.bandit_weight", cfg.ranking.bandit_weight),
	];

	for (name, weight) in weights {
		if !weight.is_finite() {
			return Err(Error::Validation { message: format!("{name} must be a finite number.") });
		}
		if weight < 0.0 {
			return Err(Error::Validation { message: format!("{name} must be zero or greater.") });
		}
	}
	if weights.iter().map(|(_, weight)| weight).sum::<f32>() <= 0.0 {
		return Err(Error::Validation {
			message: "ranking weights must not all be zero.".to_string(),
		});
	}
	if !cfg.ranking.half_life_days.is_finite() || cfg.ranking.half_life_days <= 0.0 {
		return Err(Error::Validation {
			message: "ranking.half_life_days must be a finite number greater than zero.".to_string(),
		});
	}

	if !cfg.bandit.prior_alpha.is_finite() || cfg.bandit.prior_alpha <= 0.0 {
		return Err(Error::Validation {
			message: "bandit.prior_alpha must be a finite number greater than zero.".to_string(),
		});
	}
	if !cfg.bandit.prior_beta.is_finite() || cfg.bandit.prior_beta <= 0.0 {
		return Err(Error::Validation {
			message: "bandit.prior_beta must be a finite number greater than zero.".to_string(),
		});
	}

	if cfg.watch.interval_secs == 0 {
		return Err(Error::Validation {
			message: "watch.interval_secs must be greater than zero.".to_string(),
		});
	}

	Ok(())
}
