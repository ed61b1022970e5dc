use super::{acme_row, baseten_row, service};

use arag_service::Error;
use arag_testkit::{RowFixture, TestWorkspace};

#[tokio::test]
async fn empty_tracker_builds_a_valid_empty_index() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");
	let service = service(&workspace).await;
	let report = service.build().await.expect("Empty build must succeed.");

	assert_eq!(report.indexed, 0);
	assert!(report.skipped.is_empty());

	let results = service.query("anything", None, None, 5).await.expect("Query must succeed, not error.");

	assert!(results.is_empty());

	let status = service.status().await.expect("Status must succeed.");

	assert_eq!(status.total, 0);
	assert_eq!(status.schema_version, Some(report.schema_version));
}

#[tokio::test]
async fn query_before_build_is_an_actionable_error() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");
	let service = service(&workspace).await;

	assert!(matches!(service.query("infra", None, None, 5).await, Err(Error::IndexUnavailable)));
}

#[tokio::test]
async fn empty_query_returns_every_indexed_record() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace
		.write_tracker(&[
			baseten_row(),
			acme_row(),
			RowFixture::new("Umbrella", "Platform Engineer", "Applied", "greenhouse", "infra"),
		])
		.expect("Tracker must be written.");

	let service = service(&workspace).await;
	let report = service.build().await.expect("Build must succeed.");

	assert_eq!(report.indexed, 3);

	let results = service.query("", None, None, 10).await.expect("Empty query must succeed.");

	assert_eq!(results.len(), 3);

	let status = service.status().await.expect("Status must succeed.");

	assert_eq!(status.total, 3);
	assert_eq!(status.counts.iter().map(|count| count.count).sum::<u64>(), 3);
}

#[tokio::test]
async fn build_is_idempotent() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace.write_tracker(&[baseten_row(), acme_row()]).expect("Tracker must be written.");

	let service = service(&workspace).await;

	service.build().await.expect("First build must succeed.");

	let first = service.query("infra engineer", None, None, 10).await.expect("Query must succeed.");

	service.build().await.expect("Second build must succeed.");

	let second = service.query("infra engineer", None, None, 10).await.expect("Query must succeed.");

	assert_eq!(first.len(), second.len());

	for (a, b) in first.iter().zip(&second) {
		assert_eq!(a.record.app_id, b.record.app_id);
		assert!((a.score - b.score).abs() < 1e-5);
	}
}

#[tokio::test]
async fn malformed_rows_are_skipped_not_fatal() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace
		.write_tracker(&[
			baseten_row(),
			RowFixture::new("Ghost", "", "Applied", "direct", "infra"),
			RowFixture::new("Acme", "Mobile Developer", "ghosted", "linkedin", "mobile"),
		])
		.expect("Tracker must be written.");

	let service = service(&workspace).await;
	let report = service.build().await.expect("Build must survive bad rows.");

	assert_eq!(report.indexed, 1);
	assert_eq!(report.skipped.len(), 2);
	assert!(report.skipped.iter().any(|message| message.contains("missing role")));
	assert!(report.skipped.iter().any(|message| message.contains("unknown status")));
}

#[tokio::test]
async fn duplicate_tracker_rows_collapse_to_one_record() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace
		.write_tracker(&[baseten_row(), baseten_row()])
		.expect("Tracker must be written.");

	let service = service(&workspace).await;
	let report = service.build().await.expect("Build must succeed.");

	assert_eq!(report.indexed, 1);
}

#[tokio::test]
async fn artifacts_resolve_by_company_convention() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace.write_tracker(&[baseten_row()]).expect("Tracker must be written.");
	workspace
		.add_artifact("baseten", "submissions/confirmation.md", "submitted")
		.expect("Artifact must be written.");
	workspace
		.add_artifact("baseten", "tailored_resumes/resume_v3.md", "resume")
		.expect("Artifact must be written.");

	let service = service(&workspace).await;

	service.build().await.expect("Build must succeed.");

	let results = service.query("", None, None, 5).await.expect("Query must succeed.");
	let artifacts = &results[0].record.artifacts;

	assert_eq!(artifacts.evidence, vec!["baseten/submissions/confirmation.md".to_string()]);
	assert_eq!(artifacts.resumes, vec!["baseten/tailored_resumes/resume_v3.md".to_string()]);
}

/// The end-to-end example scenario: one tracked Baseten application flows
/// through build, query, feedback, and recommend.
#[tokio::test]
async fn baseten_scenario() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace.write_tracker(&[baseten_row()]).expect("Tracker must be written.");

	let service = service(&workspace).await;
	let report = service.build().await.expect("Build must succeed.");

	assert_eq!(report.indexed, 1);

	let results = service.query("infra engineer", None, None, 5).await.expect("Query must succeed.");

	assert_eq!(results.len(), 1);
	assert_eq!(results[0].record.company, "Baseten");
	assert!(results[0].score > 0.0);

	let app_id = results[0].record.app_id.clone();
	let feedback = service.feedback(&app_id, "response").await.expect("Feedback must succeed.");

	assert_eq!(feedback.category, "infra");
	assert!((feedback.alpha - 2.0).abs() < 1e-9);
	assert!((feedback.beta - 1.0).abs() < 1e-9);

	let top = service.recommend(1, Some(7)).expect("Recommend must succeed.");

	assert_eq!(top.len(), 1);
	assert_eq!(top[0].category, "infra");
	assert_eq!(top[0].method, arag_domain::Method::Ashby);
}

#[tokio::test]
async fn feedback_moves_record_status() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace.write_tracker(&[baseten_row()]).expect("Tracker must be written.");

	let service = service(&workspace).await;

	service.build().await.expect("Build must succeed.");

	let results = service.query("", None, None, 5).await.expect("Query must succeed.");
	let app_id = results[0].record.app_id.clone();

	service.feedback(&app_id, "interview").await.expect("Feedback must succeed.");

	let results = service.query("", None, None, 5).await.expect("Query must succeed.");

	assert_eq!(results[0].record.status, arag_domain::Status::Interview);
}
