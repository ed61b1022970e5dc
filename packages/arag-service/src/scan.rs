use std::{
	fs,
	path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{RagService, Result};
use arag_domain::piigate::{self, PiiKind};

const SCANNABLE_EXTENSIONS: [&str; 5] = ["md", "txt", "html", "csv", "jsonl"];
const MAX_SCAN_BYTES: usize = 300_000;

#[derive(Debug, Serialize)]
pub struct ScanFinding {
	pub path: String,
	pub kinds: Vec<PiiKind>,
	pub matches: u64,
}

#[derive(Debug, Serialize)]
pub struct ScanReport {
	pub files_scanned: u64,
	pub findings: Vec<ScanFinding>,
}

impl RagService {
	/// PII audit over text artifacts. Read-only: reports matches, mutates
	/// nothing. Defaults to the applications directory plus the data and
	/// log directories, so persisted journals are audited too.
	pub fn scan(&self, root: Option<&Path>) -> Result<ScanReport> {
		let roots: Vec<PathBuf> = match root {
			Some(root) => vec![root.to_path_buf()],
			None => vec![
				self.cfg.paths.applications_dir.clone(),
				self.cfg.paths.data_dir.clone(),
				self.cfg.paths.log_dir.clone(),
			],
		};
		let mut report = ScanReport { files_scanned: 0, findings: Vec::new() };

		for root in roots {
			let files = if root.is_file() { vec![root] } else { walk_files(&root) };

			for file in files {
				let scannable = file
					.extension()
					.and_then(|ext| ext.to_str())
					.is_some_and(|ext| {
						SCANNABLE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
					});

				if !scannable {
					continue;
				}

				let Some(text) = read_text_prefix(&file) else {
					continue;
				};

				report.files_scanned += 1;

				let findings = piigate::scan(&text);

				if findings.is_empty() {
					continue;
				}

				let mut kinds: Vec<PiiKind> =
					findings.iter().map(|finding| finding.kind).collect();

				kinds.sort_by_key(|kind| kind.as_str());
				kinds.dedup();
				report.findings.push(ScanFinding {
					path: file.to_string_lossy().into_owned(),
					kinds,
					matches: findings.len() as u64,
				});
			}
		}

		report.findings.sort_by(|a, b| a.path.cmp(&b.path));

		Ok(report)
	}

	/// Audit a single text payload without touching any store.
	pub fn scan_text(&self, text: &str) -> Vec<piigate::Finding> {
		piigate::scan(text)
	}
}

/// Depth-first file listing. Unreadable directories are skipped; an audit
/// over a partially readable tree is still useful.
pub(crate) fn walk_files(dir: &Path) -> Vec<PathBuf> {
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
			} else if path.is_file() {
				files.push(path);
			}
		}
	}

	files.sort();

	files
}

fn read_text_prefix(path: &Path) -> Option<String> {
	let bytes = fs::read(path).ok()?;
	let slice = if bytes.len() > MAX_SCAN_BYTES { &bytes[..MAX_SCAN_BYTES] } else { &bytes[..] };

	Some(String::from_utf8_lossy(slice).into_owned())
}
