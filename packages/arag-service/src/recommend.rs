use rand::{SeedableRng, rngs::StdRng};

use crate::{RagService, Result};
use arag_bandit::Recommendation;

impl RagService {
	/// Thompson-sampled top-k arms. Intentionally stochastic when unseeded;
	/// a fixed seed makes the draw reproducible for tests and scripting.
	pub fn recommend(&self, k: usize, seed: Option<u64>) -> Result<Vec<Recommendation>> {
		let model = self.load_model()?;
		let mut rng = match seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_entropy(),
		};

		Ok(model.recommend(k, &mut rng)?)
	}

	/// Arm statistics by posterior mean, for dashboards.
	pub fn arm_stats(&self) -> Result<Vec<Recommendation>> {
		Ok(self.load_model()?.stats())
	}
}
