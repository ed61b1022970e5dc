use std::path::Path;

use sqlx::{
	SqlitePool,
	sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

use crate::{Error, Result, schema};

pub struct Db {
	pub pool: SqlitePool,
}
impl Db {
	pub async fn connect(path: &Path) -> Result<Self> {
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)
				.map_err(|err| Error::Io { path: parent.to_path_buf(), source: err })?;
		}

		let options = SqliteConnectOptions::new()
			.filename(path)
			.create_if_missing(true)
			.journal_mode(SqliteJournalMode::Wal);
		// Single-operator tool; one connection keeps SQLite writer semantics
		// trivial.
		let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await?;

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema();
		let mut tx = self.pool.begin().await?;

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		Ok(())
	}

	/// True once `build` has materialized the index tables at least once.
	pub async fn is_initialized(&self) -> Result<bool> {
		let row: Option<(String,)> = sqlx::query_as(
			"SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'applications'",
		)
		.fetch_optional(&self.pool)
		.await?;

		Ok(row.is_some())
	}

	pub async fn close(&self) {
		self.pool.close().await;
	}
}
