#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("I/O failure at {path:?}.")]
	Io { path: std::path::PathBuf, source: std::io::Error },
	#[error(transparent)]
	Json(#[from] serde_json::Error),
	#[error("Row for {0} cannot be decoded.")]
	Decode(String),
	#[error("Not found: {0}")]
	NotFound(String),
	#[error("Index is missing or not built. Run build first.")]
	IndexUnavailable,
}
