pub mod db;
pub mod journal;
pub mod models;
pub mod queries;
pub mod schema;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

use std::path::PathBuf;

use crate::db::Db;

/// Every persisted artifact lives under the configured data/log directories.
/// All path derivation happens here so no operation invents its own layout.
#[derive(Clone, Debug)]
pub struct DataPaths {
	pub data_dir: PathBuf,
	pub log_dir: PathBuf,
}
impl DataPaths {
	pub fn new(data_dir: PathBuf, log_dir: PathBuf) -> Self {
		Self { data_dir, log_dir }
	}

	pub fn index_db(&self) -> PathBuf {
		self.data_dir.join("index.db")
	}

	pub fn arms(&self) -> PathBuf {
		self.data_dir.join("arms.json")
	}

	pub fn memory_short(&self) -> PathBuf {
		self.data_dir.join("memory_short.jsonl")
	}

	pub fn memory_long(&self) -> PathBuf {
		self.data_dir.join("memory_long.jsonl")
	}

	pub fn feedback_ledger(&self) -> PathBuf {
		self.data_dir.join("feedback_seen.json")
	}

	pub fn tracker_ledger(&self) -> PathBuf {
		self.data_dir.join("tracker_feedback_seen.json")
	}

	pub fn session_state(&self) -> PathBuf {
		self.data_dir.join("session_state.json")
	}

	pub fn events(&self) -> PathBuf {
		self.log_dir.join("events.jsonl")
	}
}

/// The injected store handle: opened at command start, closed at command
/// end. No module-level singletons; operations receive this explicitly.
pub struct Store {
	pub db: Db,
	pub paths: DataPaths,
}
impl Store {
	pub async fn open(paths: DataPaths) -> Result<Self> {
		std::fs::create_dir_all(&paths.data_dir)
			.map_err(|err| Error::Io { path: paths.data_dir.clone(), source: err })?;
		std::fs::create_dir_all(&paths.log_dir)
			.map_err(|err| Error::Io { path: paths.log_dir.clone(), source: err })?;

		let db = Db::connect(&paths.index_db()).await?;

		Ok(Self { db, paths })
	}

	/// Guard for read paths: the index must have been built at least once.
	pub async fn ensure_available(&self) -> Result<()> {
		if self.db.is_initialized().await? { Ok(()) } else { Err(Error::IndexUnavailable) }
	}

	pub async fn close(self) {
		self.db.close().await;
	}
}
