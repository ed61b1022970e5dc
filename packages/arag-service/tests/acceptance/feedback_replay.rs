use std::fs;

use time::OffsetDateTime;

use super::{acme_row, baseten_row, service};

use arag_domain::{EpisodicEvent, Method, Outcome};
use arag_service::{BatchSource, Error};
use arag_storage::journal;
use arag_testkit::TestWorkspace;

fn outcome_event(app_id: &str, category: &str, method: Method, outcome: Outcome) -> EpisodicEvent {
	EpisodicEvent::new(
		OffsetDateTime::now_utc(),
		Some(app_id.to_string()),
		"outcome",
		Some(outcome),
		format!("outcome={}", outcome.as_str()),
	)
	.with_arm(category, method)
}

#[tokio::test]
async fn replaying_a_stream_twice_counts_once() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace.write_tracker(&[baseten_row(), acme_row()]).expect("Tracker must be written.");

	let service = service(&workspace).await;

	service.build().await.expect("Build must succeed.");

	let short_path = service.store.paths.memory_short();

	journal::append_line(
		&short_path,
		&outcome_event("baseten__x", "infra", Method::Ashby, Outcome::Response),
	)
	.expect("Fixture event must append.");
	journal::append_line(
		&short_path,
		&outcome_event("acme__x", "mobile", Method::Linkedin, Outcome::Rejected),
	)
	.expect("Fixture event must append.");

	let first = service
		.feedback_batch(BatchSource::ShortMemory)
		.await
		.expect("First replay must succeed.");

	assert_eq!(first.processed, 2);
	assert_eq!(first.duplicates, 0);
	assert_eq!(first.arms_touched, 2);

	let arms_after_first =
		fs::read_to_string(service.store.paths.arms()).expect("Arms must persist.");
	let second = service
		.feedback_batch(BatchSource::ShortMemory)
		.await
		.expect("Second replay must succeed.");

	assert_eq!(second.processed, 0);
	assert_eq!(second.duplicates, 2);

	let arms_after_second =
		fs::read_to_string(service.store.paths.arms()).expect("Arms must persist.");

	assert_eq!(arms_after_first, arms_after_second);
}

#[tokio::test]
async fn corrupt_journal_lines_are_counted_not_fatal() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace.write_tracker(&[baseten_row()]).expect("Tracker must be written.");

	let service = service(&workspace).await;

	service.build().await.expect("Build must succeed.");

	let short_path = service.store.paths.memory_short();

	journal::append_line(
		&short_path,
		&outcome_event("baseten__x", "infra", Method::Ashby, Outcome::Interview),
	)
	.expect("Fixture event must append.");

	let mut raw = fs::read_to_string(&short_path).expect("Journal must be readable.");

	raw.push_str("{broken line\n");
	fs::write(&short_path, raw).expect("Journal must be writable.");

	let report = service
		.feedback_batch(BatchSource::ShortMemory)
		.await
		.expect("Replay must survive corruption.");

	assert_eq!(report.processed, 1);
	assert_eq!(report.corrupt_lines, 1);
}

#[tokio::test]
async fn events_log_replays_through_the_same_ledger() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace.write_tracker(&[baseten_row()]).expect("Tracker must be written.");

	let service = service(&workspace).await;

	service.build().await.expect("Build must succeed.");

	let results = service.query("", None, None, 5).await.expect("Query must succeed.");
	let app_id = results[0].record.app_id.clone();

	// One real outcome; its event log line carries the same event id as the
	// episodic entry, so replaying both sources cannot double-count.
	service.feedback(&app_id, "response").await.expect("Feedback must succeed.");

	let from_short = service
		.feedback_batch(BatchSource::ShortMemory)
		.await
		.expect("Replay must succeed.");

	assert_eq!(from_short.processed, 1);

	let from_events =
		service.feedback_batch(BatchSource::Events).await.expect("Replay must succeed.");

	assert_eq!(from_events.processed, 0);
	assert_eq!(from_events.duplicates, 1);
}

#[tokio::test]
async fn non_terminal_outcomes_are_rejected_without_mutation() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace.write_tracker(&[baseten_row()]).expect("Tracker must be written.");

	let service = service(&workspace).await;

	service.build().await.expect("Build must succeed.");

	let results = service.query("", None, None, 5).await.expect("Query must succeed.");
	let app_id = results[0].record.app_id.clone();

	for outcome in ["applied", "draft", "maybe"] {
		assert!(matches!(
			service.feedback(&app_id, outcome).await,
			Err(Error::InvalidOutcome { .. }),
		));
	}

	assert!(!service.store.paths.arms().exists());
}

#[tokio::test]
async fn feedback_for_unknown_application_is_not_found() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace.write_tracker(&[baseten_row()]).expect("Tracker must be written.");

	let service = service(&workspace).await;

	service.build().await.expect("Build must succeed.");

	assert!(matches!(
		service.feedback("ghost__role__0000000000", "response").await,
		Err(Error::NotFound { .. }),
	));
}

#[tokio::test]
async fn sync_infers_tracker_outcomes_once() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace
		.write_tracker(&[
			baseten_row().with_response("recruiter reached out"),
			acme_row(),
		])
		.expect("Tracker must be written.");

	let service = service(&workspace).await;

	service.build().await.expect("Build must succeed.");

	let first = service.sync().await.expect("Sync must succeed.");

	assert_eq!(first.processed, 1);

	let second = service.sync().await.expect("Second sync must succeed.");

	assert_eq!(second.processed, 0);

	let stats = service.arm_stats().expect("Stats must load.");
	let infra = stats
		.iter()
		.find(|arm| arm.category == "infra" && arm.method == Method::Ashby)
		.expect("Synced arm must exist.");

	assert!((infra.alpha - 2.0).abs() < 1e-9);
	assert_eq!(infra.pulls, 1);
}

#[tokio::test]
async fn seeded_recommendations_are_reproducible() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace.write_tracker(&[baseten_row(), acme_row()]).expect("Tracker must be written.");

	let service = service(&workspace).await;

	service.build().await.expect("Build must succeed.");

	let results = service.query("", None, None, 5).await.expect("Query must succeed.");

	for item in &results {
		let outcome = if item.record.company == "Baseten" { "interview" } else { "rejected" };

		service.feedback(&item.record.app_id, outcome).await.expect("Feedback must succeed.");
	}

	let first = service.recommend(2, Some(11)).expect("Recommend must succeed.");
	let second = service.recommend(2, Some(11)).expect("Recommend must succeed.");

	assert_eq!(first.len(), second.len());

	for (a, b) in first.iter().zip(&second) {
		assert_eq!(a.category, b.category);
		assert!((a.sampled - b.sampled).abs() < 1e-12);
	}
}

#[tokio::test]
async fn thumb_votes_reuse_the_last_results() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace.write_tracker(&[baseten_row()]).expect("Tracker must be written.");

	let service = service(&workspace).await;

	service.build().await.expect("Build must succeed.");
	service.query("infra engineer", None, None, 5).await.expect("Query must succeed.");

	let report = service.thumb(None, "up").await.expect("Thumb must resolve a target.");

	assert_eq!(report.outcome, Outcome::Response);
	assert_eq!(report.company, "Baseten");
}
