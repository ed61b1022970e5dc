/// Bumped whenever the index layout changes; stamped into `meta` on every
/// rebuild so readers can detect a stale index.
pub const SCHEMA_VERSION: u32 = 1;

/// The whole index schema. The FTS5 shadow table carries the keyword side of
/// retrieval; embeddings live as BLOB columns on the base table.
pub fn render_schema() -> String {
	"\
CREATE TABLE IF NOT EXISTS meta (
	key TEXT PRIMARY KEY,
	value TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS applications (
	app_id TEXT PRIMARY KEY,
	company TEXT NOT NULL,
	role TEXT NOT NULL,
	status TEXT NOT NULL,
	method TEXT NOT NULL,
	category TEXT NOT NULL,
	url TEXT NOT NULL,
	date_applied TEXT NOT NULL,
	follow_up_date TEXT NOT NULL,
	notes TEXT NOT NULL,
	artifacts TEXT NOT NULL,
	context TEXT NOT NULL,
	text TEXT NOT NULL,
	embedding BLOB NOT NULL,
	updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_applications_status ON applications (status);
CREATE INDEX IF NOT EXISTS idx_applications_method ON applications (method);
CREATE VIRTUAL TABLE IF NOT EXISTS applications_fts USING fts5 (
	app_id UNINDEXED,
	company,
	role,
	category,
	notes,
	context,
	text
)"
	.to_string()
}
