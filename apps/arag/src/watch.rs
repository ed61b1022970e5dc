use std::time::{Duration, SystemTime};

use tokio::time::{self, MissedTickBehavior};

use arag_service::RagService;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
	/// Rebuild the index on tracker change.
	Rebuild,
	/// Rebuild, then sync tracker outcomes into the model.
	RebuildAndSync,
}

/// Poll the tracker CSV and rebuild on modification. One build runs to
/// completion before the next tick is considered, so the persisted index
/// is never left half-written; ctrl-c stops the loop between iterations.
pub async fn run(
	service: &RagService,
	interval: Option<u64>,
	mode: Mode,
) -> color_eyre::Result<()> {
	let interval = interval.unwrap_or(service.cfg.watch.interval_secs);
	let tracker = service.cfg.paths.tracker_csv.clone();
	let mut ticker = time::interval(Duration::from_secs(interval.max(1)));

	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	let mut last_mtime: Option<SystemTime> = None;

	println!("Watching {} every {interval}s. Ctrl-C to stop.", tracker.display());

	loop {
		tokio::select! {
			_ = tokio::signal::ctrl_c() => {
				println!("Stopped.");

				return Ok(());
			},
			_ = ticker.tick() => {},
		}

		let mtime = match std::fs::metadata(&tracker).and_then(|meta| meta.modified()) {
			Ok(mtime) => mtime,
			Err(_) => {
				println!("Tracker CSV not found: {}", tracker.display());

				continue;
			},
		};
		let changed = match mode {
			// Plain watch only reacts to changes after the first
			// observation; autonomous mode also runs an initial pass.
			Mode::Rebuild => last_mtime.is_some_and(|prev| prev != mtime),
			Mode::RebuildAndSync => last_mtime != Some(mtime),
		};

		if changed {
			println!("Change detected, rebuilding...");

			match rebuild(service, mode).await {
				Ok(()) => {},
				Err(err) => {
					tracing::error!(error = %err, "Watch iteration failed.");
					println!("Watch iteration failed: {err}");

					continue;
				},
			}
		}

		last_mtime = Some(mtime);
	}
}

async fn rebuild(service: &RagService, mode: Mode) -> color_eyre::Result<()> {
	let report = service.build().await?;

	println!("Built {} applications ({} rows skipped).", report.indexed, report.skipped.len());

	if mode == Mode::RebuildAndSync {
		let sync = service.sync().await?;

		println!(
			"Synced tracker feedback: processed={} skipped={}",
			sync.processed, sync.skipped,
		);
	}

	Ok(())
}
