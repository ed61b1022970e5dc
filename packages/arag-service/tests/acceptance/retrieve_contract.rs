use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use super::{acme_row, baseten_row, service};

use arag_service::{Error, RetrieveRequest};
use arag_testkit::{RowFixture, TestWorkspace};

#[tokio::test]
async fn envelope_and_plain_list_come_from_one_ranked_list() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace.write_tracker(&[baseten_row(), acme_row()]).expect("Tracker must be written.");

	let service = service(&workspace).await;

	service.build().await.expect("Build must succeed.");

	let request = RetrieveRequest::new("infra engineer", 5, None, None, &service.cfg.retrieve)
		.expect("Request must validate.");
	let result = service.retrieve(request).await.expect("Retrieve must succeed.");
	let items = result.items.clone();
	let envelope = result.into_envelope("local_fusion_v1").expect("Envelope must build.");

	assert_eq!(envelope.contract, "rag.retrieve.v1");
	assert_eq!(envelope.provider, "local_fusion_v1");
	assert_eq!(envelope.results.len(), items.len());

	for (plain, wrapped) in items.iter().zip(&envelope.results) {
		assert_eq!(plain.app_id, wrapped.app_id);
		assert_eq!(plain.score, wrapped.score);
	}

	OffsetDateTime::parse(&envelope.generated_at, &Rfc3339)
		.expect("generated_at must be Rfc3339.");

	let json = serde_json::to_value(&envelope).expect("Envelope must serialize.");

	assert_eq!(json["contract"], "rag.retrieve.v1");
	assert_eq!(json["contract_version"], arag_service::contracts::CONTRACT_VERSION);
	assert!(json["request"]["query"].is_string());
	assert!(json["results"].is_array());
}

#[tokio::test]
async fn filters_are_hard_not_soft() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace
		.write_tracker(&[
			baseten_row(),
			acme_row(),
			RowFixture::new("Umbrella", "Platform Engineer", "Applied", "greenhouse", "infra"),
		])
		.expect("Tracker must be written.");

	let service = service(&workspace).await;

	service.build().await.expect("Build must succeed.");

	let request =
		RetrieveRequest::new("engineer", 10, Some("Applied"), Some("ashby"), &service.cfg.retrieve)
			.expect("Request must validate.");
	let result = service.retrieve(request).await.expect("Retrieve must succeed.");

	assert_eq!(result.items.len(), 1);
	assert_eq!(result.items[0].company, "Baseten");
}

#[tokio::test]
async fn over_asking_returns_all_without_error() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace.write_tracker(&[baseten_row(), acme_row()]).expect("Tracker must be written.");

	let service = service(&workspace).await;

	service.build().await.expect("Build must succeed.");

	let request = RetrieveRequest::new("engineer", 50, None, None, &service.cfg.retrieve)
		.expect("Request must validate.");
	let result = service.retrieve(request).await.expect("Retrieve must succeed.");

	assert_eq!(result.items.len(), 2);
}

#[tokio::test]
async fn context_is_truncated_to_the_contract_limit() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");
	let long_role = "Distributed Systems ".repeat(30);

	workspace
		.write_tracker(&[RowFixture::new(
			"Verbose",
			long_role.trim(),
			"Applied",
			"direct",
			"infra",
		)])
		.expect("Tracker must be written.");

	let service = service(&workspace).await;

	service.build().await.expect("Build must succeed.");

	let request = RetrieveRequest::new("distributed", 5, None, None, &service.cfg.retrieve)
		.expect("Request must validate.");
	let result = service.retrieve(request).await.expect("Retrieve must succeed.");

	assert_eq!(result.items.len(), 1);
	assert!(result.items[0].context.chars().count() <= 320);
}

#[tokio::test]
async fn retrieve_before_build_is_an_actionable_error() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");
	let service = service(&workspace).await;
	let request = RetrieveRequest::new("infra", 5, None, None, &service.cfg.retrieve)
		.expect("Request must validate.");

	assert!(matches!(service.retrieve(request).await, Err(Error::IndexUnavailable)));
}

#[tokio::test]
async fn evidence_paths_ride_along() {
	let workspace = TestWorkspace::new().expect("Workspace must be created.");

	workspace.write_tracker(&[baseten_row()]).expect("Tracker must be written.");
	workspace
		.add_artifact("baseten", "submissions/receipt.md", "submitted")
		.expect("Artifact must be written.");

	let service = service(&workspace).await;

	service.build().await.expect("Build must succeed.");

	let request = RetrieveRequest::new("infra", 5, None, None, &service.cfg.retrieve)
		.expect("Request must validate.");
	let result = service.retrieve(request).await.expect("Retrieve must succeed.");

	assert_eq!(result.items[0].evidence, vec!["baseten/submissions/receipt.md".to_string()]);
}
