mod error;

pub use error::{Error, Result};

use std::{fs, path::Path};

use arag_config::{Bandit, Config, Embedding, Paths, Ranking, Retrieve, Service, Watch};

pub const TRACKER_HEADER: &str = "Company,Role,Career Page URL,Status,Method,Category,Date \
                                  Applied,Follow Up Date,Notes,Cover Letter Used,Response,\
                                  Interview Stage,Response Type";

/// One tracker row fixture. Field values must stay comma-free; the writer
/// does no CSV quoting.
#[derive(Clone, Debug, Default)]
pub struct RowFixture {
	pub company: String,
	pub role: String,
	pub url: String,
	pub status: String,
	pub method: String,
	pub category: String,
	pub date_applied: String,
	pub follow_up_date: String,
	pub notes: String,
	pub cover_letter_used: String,
	pub response: String,
	pub interview_stage: String,
	pub response_type: String,
}
impl RowFixture {
	pub fn new(company: &str, role: &str, status: &str, method: &str, category: &str) -> Self {
		Self {
			company: company.to_string(),
			role: role.to_string(),
			url: format!("https://jobs.example.com/{company}"),
			status: status.to_string(),
			method: method.to_string(),
			category: category.to_string(),
			..Self::default()
		}
	}

	pub fn with_notes(mut self, notes: &str) -> Self {
		self.notes = notes.to_string();

		self
	}

	pub fn with_response(mut self, response: &str) -> Self {
		self.response = response.to_string();

		self
	}

	fn to_csv_line(&self) -> String {
		[
			self.company.as_str(),
			self.role.as_str(),
			self.url.as_str(),
			self.status.as_str(),
			self.method.as_str(),
			self.category.as_str(),
			self.date_applied.as_str(),
			self.follow_up_date.as_str(),
			self.notes.as_str(),
			self.cover_letter_used.as_str(),
			self.response.as_str(),
			self.interview_stage.as_str(),
			self.response_type.as_str(),
		]
		.join(",")
	}
}

/// An isolated on-disk workspace: tracker CSV, artifact directories, data
/// and log directories, and a config pointing at all of them. Dropped with
/// the temp directory.
pub struct TestWorkspace {
	dir: tempfile::TempDir,
}
impl TestWorkspace {
	pub fn new() -> Result<Self> {
		let dir = tempfile::tempdir()?;
		let workspace = Self { dir };

		fs::create_dir_all(workspace.root().join("applications"))?;
		workspace.write_tracker(&[])?;

		Ok(workspace)
	}

	pub fn root(&self) -> &Path {
		self.dir.path()
	}

	/// Small deterministic config: 128-dim hashing embedder, the default
	/// fusion weights, priors of (1, 1).
	pub fn config(&self) -> Config {
		Config {
			service: Service {
				log_level: "info".to_string(),
				provider_name: "local_fusion_v1".to_string(),
			},
			paths: Paths {
				tracker_csv: self.root().join("applications/application_tracker.csv"),
				applications_dir: self.root().join("applications"),
				data_dir: self.root().join("data"),
				log_dir: self.root().join("logs"),
			},
			embedding: Embedding {
				provider: "hash".to_string(),
				dimensions: 128,
				http: None,
			},
			retrieve: Retrieve {
				default_k: 5,
				max_k: 50,
				max_query_chars: 512,
				max_filter_chars: 120,
				context_chars: 320,
			},
			ranking: Ranking {
				dense_weight: 0.48,
				lexical_weight: 0.22,
				memory_weight: 0.10,
				bandit_weight: 0.20,
				half_life_days: 14.0,
			},
			bandit: Bandit { prior_alpha: 1.0, prior_beta: 1.0 },
			watch: Watch { interval_secs: 1 },
		}
	}

	pub fn tracker_path(&self) -> std::path::PathBuf {
		self.root().join("applications/application_tracker.csv")
	}

	pub fn write_tracker(&self, rows: &[RowFixture]) -> Result<()> {
		let mut payload = String::from(TRACKER_HEADER);

		payload.push('\n');

		for row in rows {
			payload.push_str(&row.to_csv_line());
			payload.push('\n');
		}

		fs::create_dir_all(self.tracker_path().parent().ok_or_else(|| {
			Error::Message("Tracker path must have a parent.".to_string())
		})?)?;
		fs::write(self.tracker_path(), payload)?;

		Ok(())
	}

	pub fn write_tracker_raw(&self, payload: &str) -> Result<()> {
		fs::write(self.tracker_path(), payload)?;

		Ok(())
	}

	/// Drop an artifact file under the conventional company directory, e.g.
	/// `add_artifact("baseten", "submissions/confirmation.md", "...")`.
	pub fn add_artifact(&self, company_slug: &str, relative: &str, content: &str) -> Result<()> {
		let path = self.root().join("applications").join(company_slug).join(relative);

		fs::create_dir_all(path.parent().ok_or_else(|| {
			Error::Message("Artifact path must have a parent.".to_string())
		})?)?;
		fs::write(path, content)?;

		Ok(())
	}
}
