mod acceptance {
	mod build_and_query;
	mod feedback_replay;
	mod pii_gate;
	mod retrieve_contract;

	use arag_service::RagService;
	use arag_storage::{DataPaths, Store};
	use arag_testkit::{RowFixture, TestWorkspace};

	pub async fn service(workspace: &TestWorkspace) -> RagService {
		let cfg = workspace.config();
		let paths = DataPaths::new(cfg.paths.data_dir.clone(), cfg.paths.log_dir.clone());
		let store = Store::open(paths).await.expect("Store must open.");

		RagService::new(cfg, store)
	}

	pub fn baseten_row() -> RowFixture {
		RowFixture::new("Baseten", "Infra Engineer", "Applied", "ashby", "infra")
	}

	pub fn acme_row() -> RowFixture {
		RowFixture::new("Acme", "Mobile Developer", "Draft", "linkedin", "mobile")
	}
}
