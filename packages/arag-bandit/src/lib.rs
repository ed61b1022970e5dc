mod error;

pub use error::{Error, Result};

use std::collections::BTreeMap;

use rand::Rng;
use rand_distr::{Beta, Distribution};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use arag_domain::{Method, Outcome};

/// One Beta-distributed success/failure posterior. Alpha counts successes,
/// beta counts failures, both on top of the configured prior.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Arm {
	pub alpha: f64,
	pub beta: f64,
	pub pulls: u64,
	#[serde(default, with = "arag_domain::time_serde::option")]
	pub last_outcome_at: Option<OffsetDateTime>,
}
impl Arm {
	fn with_prior(prior_alpha: f64, prior_beta: f64) -> Self {
		Self { alpha: prior_alpha, beta: prior_beta, pulls: 0, last_outcome_at: None }
	}

	pub fn mean(&self) -> f64 {
		self.alpha / (self.alpha + self.beta)
	}

	fn observe(&mut self, success: bool, at: OffsetDateTime) {
		if success {
			self.alpha += 1.0;
		} else {
			self.beta += 1.0;
		}

		self.pulls += 1;
		self.last_outcome_at = Some(at);
	}

	fn sample(&self, key: &str, rng: &mut impl Rng) -> Result<f64> {
		let beta = Beta::new(self.alpha, self.beta).map_err(|_| Error::InvalidBeta {
			arm: key.to_string(),
			alpha: self.alpha,
			beta: self.beta,
		})?;

		Ok(beta.sample(rng))
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct Recommendation {
	pub category: String,
	pub method: Method,
	pub sampled: f64,
	pub mean: f64,
	pub pulls: u64,
	pub alpha: f64,
	pub beta: f64,
}

/// Thompson Sampling over (category, method) arms. Pure state and math;
/// persistence belongs to the caller. Arms are created lazily on the first
/// observed outcome and never deleted.
#[derive(Clone, Debug)]
pub struct ThompsonModel {
	arms: BTreeMap<String, Arm>,
	prior_alpha: f64,
	prior_beta: f64,
}
impl ThompsonModel {
	pub fn new(prior_alpha: f64, prior_beta: f64) -> Self {
		Self { arms: BTreeMap::new(), prior_alpha, prior_beta }
	}

	pub fn from_arms(arms: BTreeMap<String, Arm>, prior_alpha: f64, prior_beta: f64) -> Self {
		Self { arms, prior_alpha, prior_beta }
	}

	pub fn key(category: &str, method: Method) -> String {
		format!("{category}/{}", method.as_str())
	}

	/// Splits a persisted arm key back into (category, method). Categories
	/// are slugs and cannot contain '/'.
	pub fn parse_key(key: &str) -> Option<(String, Method)> {
		let (category, method) = key.rsplit_once('/')?;

		Some((category.to_string(), Method::parse(method)?))
	}

	pub fn arms(&self) -> &BTreeMap<String, Arm> {
		&self.arms
	}

	pub fn into_arms(self) -> BTreeMap<String, Arm> {
		self.arms
	}

	pub fn is_empty(&self) -> bool {
		self.arms.is_empty()
	}

	pub fn prior_mean(&self) -> f64 {
		self.prior_alpha / (self.prior_alpha + self.prior_beta)
	}

	/// Posterior mean for an arm; unobserved arms report the prior mean.
	pub fn mean(&self, category: &str, method: Method) -> f64 {
		self.arms
			.get(&Self::key(category, method))
			.map(Arm::mean)
			.unwrap_or_else(|| self.prior_mean())
	}

	/// Apply one terminal outcome: success bumps alpha by 1, failure bumps
	/// beta by 1.
	pub fn observe(
		&mut self,
		category: &str,
		method: Method,
		outcome: Outcome,
		at: OffsetDateTime,
	) -> &Arm {
		let key = Self::key(category, method);
		let arm = self
			.arms
			.entry(key)
			.or_insert_with(|| Arm::with_prior(self.prior_alpha, self.prior_beta));

		arm.observe(outcome.is_success(), at);

		arm
	}

	/// Draw one Thompson sample per arm and return the top-k arms by sampled
	/// value. Stochastic: successive calls with identical state may order
	/// arms differently.
	pub fn recommend(&self, k: usize, rng: &mut impl Rng) -> Result<Vec<Recommendation>> {
		let mut sampled = Vec::with_capacity(self.arms.len());

		for (key, arm) in &self.arms {
			let Some((category, method)) = Self::parse_key(key) else {
				continue;
			};

			sampled.push(Recommendation {
				category,
				method,
				sampled: arm.sample(key, rng)?,
				mean: arm.mean(),
				pulls: arm.pulls,
				alpha: arm.alpha,
				beta: arm.beta,
			});
		}

		sampled.sort_by(|a, b| b.sampled.total_cmp(&a.sampled));
		sampled.truncate(k);

		Ok(sampled)
	}

	/// Arm statistics sorted by posterior mean descending.
	pub fn stats(&self) -> Vec<Recommendation> {
		let mut rows: Vec<Recommendation> = self
			.arms
			.iter()
			.filter_map(|(key, arm)| {
				let (category, method) = Self::parse_key(key)?;

				Some(Recommendation {
					category,
					method,
					sampled: 0.0,
					mean: arm.mean(),
					pulls: arm.pulls,
					alpha: arm.alpha,
					beta: arm.beta,
				})
			})
			.collect();

		rows.sort_by(|a, b| b.mean.total_cmp(&a.mean));

		rows
	}
}
