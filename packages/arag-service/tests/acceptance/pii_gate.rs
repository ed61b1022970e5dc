use std::fs;

use super::{baseten_row, service};

use arag_service::Error;
use arag_testkit::TestWorkspace;

#[tokio::test]
async fn log_rejects_dob_and_leaves_journals_untouched() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace.write_tracker(&[baseten_row()]).expect("Tracker must be written.");

	let service = service(&workspace).await;

	service.build().await.expect("Build must succeed.");

	let results = service.query("", None, None, 5).await.expect("Query must succeed.");
	let app_id = results[0].record.app_id.clone();
	let short_path = service.store.paths.memory_short();
	let events_path = service.store.paths.events();
	let short_len = fs::metadata(&short_path).expect("Journal must exist.").len();
	let events_len = fs::metadata(&events_path).expect("Event log must exist.").len();
	let result = service.log(&app_id, "note", "DOB: 01/02/1990").await;

	match result {
		Err(Error::PiiDetected { rejection }) => {
			assert_eq!(rejection.field, "message");
			assert_eq!(rejection.kinds_label(), "dob");
		},
		other => panic!("Expected a PII rejection, got {other:?}."),
	}

	assert_eq!(fs::metadata(&short_path).expect("Journal must exist.").len(), short_len);
	assert_eq!(fs::metadata(&events_path).expect("Event log must exist.").len(), events_len);
}

#[tokio::test]
async fn ssn_rows_never_reach_persistence() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace
		.write_tracker(&[
			baseten_row(),
			arag_testkit::RowFixture::new("Leaky", "Backend Engineer", "Applied", "direct", "infra")
				.with_notes("candidate ssn 123-45-6789"),
		])
		.expect("Tracker must be written.");

	let service = service(&workspace).await;
	let report = service.build().await.expect("Build must continue past the PII row.");

	assert_eq!(report.indexed, 1);
	assert_eq!(report.skipped.len(), 1);
	assert!(report.skipped[0].contains("ssn"));

	// Nothing under the data or log directories may carry the raw value.
	for dir in [&service.cfg.paths.data_dir, &service.cfg.paths.log_dir] {
		for file in walk(dir) {
			let bytes = fs::read(&file).expect("Persisted file must be readable.");

			assert!(
				!contains(&bytes, b"123-45-6789"),
				"{file:?} leaked the SSN-shaped value",
			);
		}
	}
}

#[tokio::test]
async fn clean_log_appends_one_line() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace.write_tracker(&[baseten_row()]).expect("Tracker must be written.");

	let service = service(&workspace).await;

	service.build().await.expect("Build must succeed.");

	let results = service.query("", None, None, 5).await.expect("Query must succeed.");
	let app_id = results[0].record.app_id.clone();

	service
		.log(&app_id, "note", "followed up with the recruiter")
		.await
		.expect("Clean note must be accepted.");

	let read = service.read_short(None).expect("Read must succeed.");
	let note = read
		.events
		.iter()
		.find(|event| event.event_type == "note")
		.expect("Note must be in the episodic stream.");

	assert_eq!(note.app_id.as_deref(), Some(app_id.as_str()));
	assert_eq!(note.category.as_deref(), Some("infra"));
}

#[tokio::test]
async fn scan_reports_planted_pii_without_mutating() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace.write_tracker(&[baseten_row()]).expect("Tracker must be written.");
	workspace
		.add_artifact("baseten", "submissions/notes.md", "applicant DOB: 01/02/1990")
		.expect("Artifact must be written.");
	workspace
		.add_artifact("baseten", "submissions/clean.md", "submitted on 01/02/2026")
		.expect("Artifact must be written.");

	let service = service(&workspace).await;
	let report = service.scan(None).expect("Scan must succeed.");

	assert!(report.files_scanned >= 2);
	assert_eq!(report.findings.len(), 1);
	assert!(report.findings[0].path.ends_with("notes.md"));
	assert_eq!(report.findings[0].kinds, vec![arag_domain::PiiKind::Dob]);
}

fn walk(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
	let mut files = Vec::new();
	let mut stack = vec![dir.to_path_buf()];

	while let Some(current) = stack.pop() {
		let Ok(entries) = fs::read_dir(&current) else {
			continue;
		};

		for entry in entries.flatten() {
			let path = entry.path();

			if path.is_dir() {
				stack.push(path);
			} else {
				files.push(path);
			}
		}
	}

	files
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
	haystack.windows(needle.len()).any(|window| window == needle)
}
