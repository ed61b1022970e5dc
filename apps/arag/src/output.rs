use serde::Serialize;

use arag_bandit::Recommendation;
use arag_domain::piigate::Finding;
use arag_service::{
	BatchReport, BuildReport, FeedbackReport, RankedRecord, RetrieveResult, ScanReport,
	StatusReport, SyncReport,
};

fn emit_json<T: Serialize>(value: &T) -> color_eyre::Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);

	Ok(())
}

pub fn build(report: &BuildReport, json: bool) -> color_eyre::Result<()> {
	if json {
		return emit_json(report);
	}

	println!("Built {} applications (schema v{}).", report.indexed, report.schema_version);

	for message in &report.skipped {
		println!("  skipped {message}");
	}

	Ok(())
}

pub fn query(results: &[RankedRecord], json: bool) -> color_eyre::Result<()> {
	if json {
		return emit_json(&results);
	}
	if results.is_empty() {
		println!("No results.");

		return Ok(());
	}

	for item in results {
		let record = &item.record;

		println!(
			"- {} | {:<22} | {:<45} | {:<9} | score={:.4} | {:<10} | {}",
			record.app_id,
			record.company,
			record.role,
			record.status.as_str(),
			item.score,
			record.method.as_str(),
			record.category,
		);
	}

	Ok(())
}

pub fn retrieve(result: &RetrieveResult, json: bool) -> color_eyre::Result<()> {
	if json {
		return emit_json(&result.items);
	}
	if result.items.is_empty() {
		println!("No results.");

		return Ok(());
	}

	for item in &result.items {
		println!(
			"- {} | {:<22} | {:<45} | {:<9} | score={:.4} | {:<10} | {}",
			item.app_id,
			item.company,
			item.role,
			item.status.as_str(),
			item.score,
			item.method.as_str(),
			item.category,
		);
		println!("  context: {}", item.context);
	}

	Ok(())
}

pub fn status(report: &StatusReport, json: bool) -> color_eyre::Result<()> {
	if json {
		return emit_json(report);
	}

	println!("\n-- Application Status Dashboard ----------------------------");

	for count in &report.counts {
		let bar = "#".repeat(count.count.min(60) as usize);

		println!("  {:<10} {:>3}  {bar}", count.status, count.count);
	}

	if !report.drafts.is_empty() {
		println!("\n-- Pending Drafts ({}) --------------------------------------", report.drafts.len());

		for draft in &report.drafts {
			println!(
				"  [{:<10}] {:<22}  {:<45}  [{}]",
				draft.method, draft.company, draft.role, draft.category,
			);
		}
	}
	if !report.blocked.is_empty() {
		println!("\n-- Blocked ({}) ---------------------------------------------", report.blocked.len());

		for item in &report.blocked {
			println!("  [{:<10}] {:<22}  {}", item.method, item.company, item.role);
		}
	}
	if !report.arms.is_empty() {
		println!("\n-- Arms (by posterior mean) --------------------------------");

		for arm in &report.arms {
			println!(
				"  {:<30} mean={:.3}  pulls={:<4} a={:.1} b={:.1}",
				format!("{}/{}", arm.category, arm.method.as_str()),
				arm.mean,
				arm.pulls,
				arm.alpha,
				arm.beta,
			);
		}
	}

	println!("\n  Total: {} applications tracked", report.total);

	if report.corrupt_short_lines > 0 {
		println!("  Warning: {} corrupt episodic log lines skipped", report.corrupt_short_lines);
	}

	println!();

	Ok(())
}

pub fn sync(report: &SyncReport, json: bool) -> color_eyre::Result<()> {
	if json {
		return emit_json(report);
	}

	println!("Synced tracker feedback: processed={} skipped={}", report.processed, report.skipped);

	Ok(())
}

pub fn feedback(report: &FeedbackReport, json: bool) -> color_eyre::Result<()> {
	if json {
		return emit_json(report);
	}

	println!(
		"Recorded outcome={} for {} / {} (arm {}/{} mean={:.3})",
		report.outcome.as_str(),
		report.company,
		report.role,
		report.category,
		report.method.as_str(),
		report.mean,
	);

	Ok(())
}

pub fn feedback_batch(report: &BatchReport, json: bool) -> color_eyre::Result<()> {
	if json {
		return emit_json(report);
	}

	println!(
		"Replayed feedback batch: source={} processed={} skipped={} duplicates={} arms={}",
		report.source, report.processed, report.skipped, report.duplicates, report.arms_touched,
	);

	for failure in &report.failures {
		println!("  failed {failure}");
	}
	if report.corrupt_lines > 0 {
		println!("  {} corrupt lines skipped", report.corrupt_lines);
	}

	Ok(())
}

pub fn recommend(top: &[Recommendation], json: bool) -> color_eyre::Result<()> {
	if json {
		return emit_json(&top);
	}
	if top.is_empty() {
		println!("No arm data yet. Record outcomes via feedback or sync first.");

		return Ok(());
	}

	println!("\n-- Thompson Sampling Recommendations -----------------------");
	println!("  {:<30} {:>7} {:>6} {:>6} {:>6}", "Arm", "Sample", "Mean", "a", "b");

	for arm in top {
		println!(
			"  {:<30} {:>7.3} {:>6.3} {:>6.1} {:>6.1}",
			format!("{}/{}", arm.category, arm.method.as_str()),
			arm.sampled,
			arm.mean,
			arm.alpha,
			arm.beta,
		);
	}

	println!();

	Ok(())
}

pub fn scan(report: &ScanReport, json: bool) -> color_eyre::Result<()> {
	if json {
		return emit_json(report);
	}
	if report.findings.is_empty() {
		println!("No high-risk PII patterns detected in {} files.", report.files_scanned);

		return Ok(());
	}

	println!("PII findings:");

	for finding in &report.findings {
		let kinds: Vec<&str> = finding.kinds.iter().map(|kind| kind.as_str()).collect();

		println!("  - {}: {} ({} matches)", finding.path, kinds.join(", "), finding.matches);
	}

	Ok(())
}

pub fn scan_text(findings: &[Finding], json: bool) -> color_eyre::Result<()> {
	if json {
		return emit_json(&findings);
	}
	if findings.is_empty() {
		println!("Clean: no high-risk patterns.");

		return Ok(());
	}

	for finding in findings {
		println!(
			"  - {} at bytes {}..{}",
			finding.kind.as_str(),
			finding.start,
			finding.end,
		);
	}

	Ok(())
}
