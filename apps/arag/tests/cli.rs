use clap::Parser;

use arag::{Args, Command};

#[test]
fn parses_retrieve_with_filters() {
	let args = Args::try_parse_from([
		"arag",
		"retrieve",
		"infra engineer",
		"-k",
		"5",
		"--status",
		"Applied",
		"--method",
		"ashby",
		"--json",
		"--envelope",
	])
	.expect("Args must parse.");

	match args.command {
		Command::Retrieve { query, k, status, method, json, envelope } => {
			assert_eq!(query, "infra engineer");
			assert_eq!(k, Some(5));
			assert_eq!(status.as_deref(), Some("Applied"));
			assert_eq!(method.as_deref(), Some("ashby"));
			assert!(json);
			assert!(envelope);
		},
		other => panic!("Expected retrieve, got {other:?}."),
	}
}

#[test]
fn kebab_case_subcommands_resolve() {
	let args = Args::try_parse_from(["arag", "feedback-batch", "--source", "events"])
		.expect("Args must parse.");

	match args.command {
		Command::FeedbackBatch { source, json } => {
			assert_eq!(source, "events");
			assert!(!json);
		},
		other => panic!("Expected feedback-batch, got {other:?}."),
	}
}

#[test]
fn recommend_accepts_a_seed() {
	let args = Args::try_parse_from(["arag", "recommend", "-k", "3", "--seed", "42"])
		.expect("Args must parse.");

	match args.command {
		Command::Recommend { k, seed, json } => {
			assert_eq!(k, 3);
			assert_eq!(seed, Some(42));
			assert!(!json);
		},
		other => panic!("Expected recommend, got {other:?}."),
	}
}

#[test]
fn config_defaults_to_workspace_toml() {
	let args = Args::try_parse_from(["arag", "status"]).expect("Args must parse.");

	assert_eq!(args.config, std::path::PathBuf::from("arag.toml"));
}
