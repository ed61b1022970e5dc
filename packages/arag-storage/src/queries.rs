use sqlx::QueryBuilder;

use crate::{Result, db::Db, models::IndexedApplication, schema};

/// Wholesale index replacement: the prior content is wiped and every row is
/// reinserted inside one transaction, so readers never observe a partial
/// index and the index stays a pure function of the current record set.
pub async fn replace_applications(
	db: &Db,
	rows: &[IndexedApplication],
	built_at: &str,
) -> Result<()> {
	let mut tx = db.pool.begin().await?;

	sqlx::query("DELETE FROM applications").execute(&mut *tx).await?;
	sqlx::query("DELETE FROM applications_fts").execute(&mut *tx).await?;

	for row in rows {
		sqlx::query(
			"\
INSERT INTO applications (
	app_id, company, role, status, method, category, url, date_applied,
	follow_up_date, notes, artifacts, context, text, embedding, updated_at
)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
		)
		.bind(&row.app_id)
		.bind(&row.company)
		.bind(&row.role)
		.bind(&row.status)
		.bind(&row.method)
		.bind(&row.category)
		.bind(&row.url)
		.bind(&row.date_applied)
		.bind(&row.follow_up_date)
		.bind(&row.notes)
		.bind(&row.artifacts)
		.bind(&row.context)
		.bind(&row.text)
		.bind(&row.embedding)
		.bind(&row.updated_at)
		.execute(&mut *tx)
		.await?;

		sqlx::query(
			"\
INSERT INTO applications_fts (app_id, company, role, category, notes, context, text)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
		)
		.bind(&row.app_id)
		.bind(&row.company)
		.bind(&row.role)
		.bind(&row.category)
		.bind(&row.notes)
		.bind(&row.context)
		.bind(&row.text)
		.execute(&mut *tx)
		.await?;
	}

	for (key, value) in [
		("schema_version", schema::SCHEMA_VERSION.to_string()),
		("built_at", built_at.to_string()),
		("count", rows.len().to_string()),
	] {
		sqlx::query(
			"INSERT INTO meta (key, value) VALUES (?1, ?2) \
			 ON CONFLICT (key) DO UPDATE SET value = excluded.value",
		)
		.bind(key)
		.bind(value)
		.execute(&mut *tx)
		.await?;
	}

	tx.commit().await?;

	Ok(())
}

pub async fn count(db: &Db) -> Result<u64> {
	let (count,): (i64,) =
		sqlx::query_as("SELECT COUNT(*) FROM applications").fetch_one(&db.pool).await?;

	Ok(count.max(0) as u64)
}

pub async fn schema_version(db: &Db) -> Result<Option<u32>> {
	let row: Option<(String,)> =
		sqlx::query_as("SELECT value FROM meta WHERE key = 'schema_version'")
			.fetch_optional(&db.pool)
			.await?;

	Ok(row.and_then(|(value,)| value.parse().ok()))
}

/// Candidate rows with status/method applied as a hard SQL pre-filter, not
/// a soft boost. Ordered by recency so downstream tie-breaks are stable.
pub async fn fetch_filtered(
	db: &Db,
	status: Option<&str>,
	method: Option<&str>,
) -> Result<Vec<IndexedApplication>> {
	let mut builder = QueryBuilder::new(
		"SELECT app_id, company, role, status, method, category, url, date_applied, \
		 follow_up_date, notes, artifacts, context, text, embedding, updated_at \
		 FROM applications WHERE 1 = 1",
	);

	if let Some(status) = status {
		builder.push(" AND status = ");
		builder.push_bind(status);
	}
	if let Some(method) = method {
		builder.push(" AND method = ");
		builder.push_bind(method);
	}

	builder.push(" ORDER BY updated_at DESC, app_id ASC");

	Ok(builder.build_query_as().fetch_all(&db.pool).await?)
}

pub async fn fetch_by_app_id(db: &Db, app_id: &str) -> Result<Option<IndexedApplication>> {
	Ok(sqlx::query_as(
		"SELECT app_id, company, role, status, method, category, url, date_applied, \
		 follow_up_date, notes, artifacts, context, text, embedding, updated_at \
		 FROM applications WHERE app_id = ?1",
	)
	.bind(app_id)
	.fetch_optional(&db.pool)
	.await?)
}

/// FTS5 keyword scores for a sanitized MATCH query. BM25 rank is returned
/// as emitted by SQLite (lower is better); normalization happens at the
/// scoring layer.
pub async fn keyword_ranks(
	db: &Db,
	match_query: &str,
	status: Option<&str>,
	method: Option<&str>,
) -> Result<Vec<(String, f64)>> {
	let mut builder = QueryBuilder::new(
		"SELECT applications_fts.app_id, bm25(applications_fts) AS rank \
		 FROM applications_fts \
		 JOIN applications a ON a.app_id = applications_fts.app_id \
		 WHERE applications_fts MATCH ",
	);

	builder.push_bind(match_query);

	if let Some(status) = status {
		builder.push(" AND a.status = ");
		builder.push_bind(status);
	}
	if let Some(method) = method {
		builder.push(" AND a.method = ");
		builder.push_bind(method);
	}

	builder.push(" ORDER BY rank");

	Ok(builder.build_query_as().fetch_all(&db.pool).await?)
}

pub async fn status_counts(db: &Db) -> Result<Vec<(String, u64)>> {
	let rows: Vec<(String, i64)> =
		sqlx::query_as("SELECT status, COUNT(*) FROM applications GROUP BY status")
			.fetch_all(&db.pool)
			.await?;

	Ok(rows.into_iter().map(|(status, count)| (status, count.max(0) as u64)).collect())
}

/// Feedback-driven record mutation: status and freshness only, never the
/// indexed text. Returns false when the application is unknown.
pub async fn update_status(
	db: &Db,
	app_id: &str,
	status: &str,
	updated_at: &str,
) -> Result<bool> {
	let result = sqlx::query(
		"UPDATE applications SET status = ?1, updated_at = ?2 WHERE app_id = ?3",
	)
	.bind(status)
	.bind(updated_at)
	.bind(app_id)
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected() > 0)
}

/// Most recently applied-or-updated application, for thumb-vote inference.
pub async fn latest_app_id(db: &Db) -> Result<Option<String>> {
	let row: Option<(String,)> = sqlx::query_as(
		"SELECT app_id FROM applications \
		 ORDER BY date_applied DESC, updated_at DESC, app_id DESC LIMIT 1",
	)
	.fetch_optional(&db.pool)
	.await?;

	Ok(row.map(|(app_id,)| app_id))
}
