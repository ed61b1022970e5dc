pub mod output;
pub mod watch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use arag_domain::{Method, Status};
use arag_service::{BatchSource, RagService, RetrieveRequest};
use arag_storage::{DataPaths, Store};

#[derive(Debug, Parser)]
#[command(
	version = arag_cli::VERSION,
	rename_all = "kebab",
	styles = arag_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE", default_value = "arag.toml")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Rebuild the index and derived memory from the tracker CSV.
	Build {
		#[arg(long)]
		json: bool,
	},
	/// Free-text search over indexed applications.
	Query {
		query: String,
		#[arg(short, default_value_t = 8)]
		k: u32,
		#[arg(long)]
		status: Option<String>,
		#[arg(long)]
		method: Option<String>,
		#[arg(long)]
		json: bool,
	},
	/// Strict retrieval endpoint for automation agents.
	Retrieve {
		query: String,
		#[arg(short)]
		k: Option<u32>,
		#[arg(long)]
		status: Option<String>,
		#[arg(long)]
		method: Option<String>,
		#[arg(long)]
		json: bool,
		/// Wrap the results in the versioned contract envelope (requires
		/// --json).
		#[arg(long)]
		envelope: bool,
	},
	/// Dashboard: counts per status, pending drafts, arm statistics.
	Status {
		#[arg(long)]
		json: bool,
	},
	/// Rebuild when the tracker CSV changes (polling).
	Watch {
		#[arg(long)]
		interval: Option<u64>,
	},
	/// Continuous loop: rebuild plus outcome sync on tracker changes.
	Autonomous {
		#[arg(long)]
		interval: Option<u64>,
	},
	/// Infer explicit outcomes from tracker columns and update the model.
	Sync {
		#[arg(long)]
		json: bool,
	},
	/// Record a terminal outcome for one application.
	Feedback {
		#[arg(long)]
		app_id: String,
		#[arg(long)]
		outcome: String,
		#[arg(long)]
		json: bool,
	},
	/// Replay historical outcome events into the model, exactly once each.
	FeedbackBatch {
		#[arg(long, default_value = "memory_short")]
		source: String,
		#[arg(long)]
		json: bool,
	},
	/// Quick up/down vote alias for feedback.
	Thumb {
		#[arg(long)]
		app_id: Option<String>,
		#[arg(long)]
		vote: String,
		#[arg(long)]
		json: bool,
	},
	/// Thompson-sampled ranking of (category, method) arms.
	Recommend {
		#[arg(short, default_value_t = 8)]
		k: u32,
		#[arg(long)]
		seed: Option<u64>,
		#[arg(long)]
		json: bool,
	},
	/// Append a PII-gated note to the event log and episodic memory.
	Log {
		#[arg(long)]
		app_id: String,
		#[arg(long, value_name = "TYPE")]
		r#type: String,
		#[arg(long)]
		msg: String,
		#[arg(long)]
		json: bool,
	},
	/// Audit text artifacts (or a literal payload) for high-risk PII.
	Scan {
		#[arg(long)]
		path: Option<PathBuf>,
		#[arg(long)]
		text: Option<String>,
		#[arg(long)]
		json: bool,
	},
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let cfg = arag_config::load(&args.config)?;
	let filter = EnvFilter::new(cfg.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let paths = DataPaths::new(cfg.paths.data_dir.clone(), cfg.paths.log_dir.clone());
	let store = Store::open(paths).await?;
	let service = RagService::new(cfg, store);
	let result = dispatch(&service, args.command).await;

	service.close().await;

	result
}

fn parse_filter<T>(
	raw: Option<&str>,
	name: &str,
	parse: impl Fn(&str) -> Option<T>,
) -> color_eyre::Result<Option<T>> {
	match raw {
		None => Ok(None),
		Some(raw) => parse(raw)
			.map(Some)
			.ok_or_else(|| color_eyre::eyre::eyre!("Unknown {name} {raw:?}.")),
	}
}

async fn dispatch(service: &RagService, command: Command) -> color_eyre::Result<()> {
	match command {
		Command::Build { json } => {
			let report = service.build().await?;

			output::build(&report, json)?;
		},
		Command::Query { query, k, status, method, json } => {
			let status = parse_filter(status.as_deref(), "status", Status::parse)?;
			let method = parse_filter(method.as_deref(), "method", Method::parse)?;
			let results = service.query(&query, status, method, k as usize).await?;

			output::query(&results, json)?;
		},
		Command::Retrieve { query, k, status, method, json, envelope } => {
			if envelope && !json {
				return Err(color_eyre::eyre::eyre!("--envelope requires --json"));
			}

			let request = RetrieveRequest::new(
				&query,
				k.unwrap_or(service.cfg.retrieve.default_k),
				status.as_deref(),
				method.as_deref(),
				&service.cfg.retrieve,
			)?;
			let result = service.retrieve(request).await?;

			if envelope {
				let envelope = result.into_envelope(&service.cfg.service.provider_name)?;

				println!("{}", serde_json::to_string_pretty(&envelope)?);
			} else {
				output::retrieve(&result, json)?;
			}
		},
		Command::Status { json } => {
			let report = service.status().await?;

			output::status(&report, json)?;
		},
		Command::Watch { interval } => {
			watch::run(service, interval, watch::Mode::Rebuild).await?;
		},
		Command::Autonomous { interval } => {
			watch::run(service, interval, watch::Mode::RebuildAndSync).await?;
		},
		Command::Sync { json } => {
			let report = service.sync().await?;

			output::sync(&report, json)?;
		},
		Command::Feedback { app_id, outcome, json } => {
			let report = service.feedback(&app_id, &outcome).await?;

			output::feedback(&report, json)?;
		},
		Command::FeedbackBatch { source, json } => {
			let source = BatchSource::parse(&source).ok_or_else(|| {
				color_eyre::eyre::eyre!("Unknown source {source:?}. Use memory_short or events.")
			})?;
			let report = service.feedback_batch(source).await?;

			output::feedback_batch(&report, json)?;
		},
		Command::Thumb { app_id, vote, json } => {
			let report = service.thumb(app_id.as_deref(), &vote).await?;

			output::feedback(&report, json)?;
		},
		Command::Recommend { k, seed, json } => {
			let top = service.recommend(k as usize, seed)?;

			output::recommend(&top, json)?;
		},
		Command::Log { app_id, r#type, msg, json } => {
			let report = service.log(&app_id, &r#type, &msg).await?;

			if json {
				println!("{}", serde_json::to_string_pretty(&report)?);
			} else {
				println!(
					"Logged {:?} for {} ({}).",
					report.event_type, report.app_id, report.event_id,
				);
			}
		},
		Command::Scan { path, text, json } => {
			if let Some(text) = text {
				let findings = service.scan_text(&text);

				output::scan_text(&findings, json)?;
			} else {
				let report = service.scan(path.as_deref())?;

				output::scan(&report, json)?;
			}
		},
	}

	Ok(())
}
