use std::{
	collections::BTreeSet,
	fs::{self, OpenOptions},
	io::Write,
	path::Path,
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result};

/// A journal read never aborts on a bad line: valid entries are returned,
/// unparseable lines are counted.
#[derive(Debug)]
pub struct JournalRead<T> {
	pub entries: Vec<T>,
	pub skipped: usize,
}

/// Line-atomic append: one serialized entry, one `\n`, one flush. Existing
/// lines are never rewritten in place.
pub fn append_line<T: Serialize>(path: &Path, entry: &T) -> Result<()> {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent)
			.map_err(|err| Error::Io { path: parent.to_path_buf(), source: err })?;
	}

	let mut line = serde_json::to_string(entry)?;

	line.push('\n');

	let mut file = OpenOptions::new()
		.create(true)
		.append(true)
		.open(path)
		.map_err(|err| Error::Io { path: path.to_path_buf(), source: err })?;

	file.write_all(line.as_bytes())
		.and_then(|()| file.flush())
		.map_err(|err| Error::Io { path: path.to_path_buf(), source: err })?;

	Ok(())
}

pub fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<JournalRead<T>> {
	if !path.exists() {
		return Ok(JournalRead { entries: Vec::new(), skipped: 0 });
	}

	let raw = fs::read_to_string(path)
		.map_err(|err| Error::Io { path: path.to_path_buf(), source: err })?;
	let mut entries = Vec::new();
	let mut skipped = 0;

	for line in raw.lines() {
		let line = line.trim();

		if line.is_empty() {
			continue;
		}

		match serde_json::from_str(line) {
			Ok(entry) => entries.push(entry),
			Err(_) => skipped += 1,
		}
	}

	Ok(JournalRead { entries, skipped })
}

/// Replace a derived view wholesale: write to a sibling temp file, then
/// rename over the target so readers never see a half-written view.
pub fn replace_lines<T: Serialize>(path: &Path, entries: &[T]) -> Result<()> {
	let mut payload = String::new();

	for entry in entries {
		payload.push_str(&serde_json::to_string(entry)?);
		payload.push('\n');
	}

	write_atomic(path, payload.as_bytes())
}

pub fn touch(path: &Path) -> Result<()> {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent)
			.map_err(|err| Error::Io { path: parent.to_path_buf(), source: err })?;
	}

	OpenOptions::new()
		.create(true)
		.append(true)
		.open(path)
		.map_err(|err| Error::Io { path: path.to_path_buf(), source: err })?;

	Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
	if !path.exists() {
		return Ok(None);
	}

	let raw = fs::read_to_string(path)
		.map_err(|err| Error::Io { path: path.to_path_buf(), source: err })?;

	Ok(Some(serde_json::from_str(&raw)?))
}

pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
	let payload = serde_json::to_string_pretty(value)?;

	write_atomic(path, payload.as_bytes())
}

/// Idempotency ledgers are flat sorted JSON arrays of applied keys.
pub fn load_ledger(path: &Path) -> Result<BTreeSet<String>> {
	Ok(load_json::<Vec<String>>(path)?.unwrap_or_default().into_iter().collect())
}

pub fn save_ledger(path: &Path, keys: &BTreeSet<String>) -> Result<()> {
	let sorted: Vec<&String> = keys.iter().collect();

	save_json(path, &sorted)
}

fn write_atomic(path: &Path, payload: &[u8]) -> Result<()> {
	let parent = path.parent().unwrap_or_else(|| Path::new("."));

	fs::create_dir_all(parent)
		.map_err(|err| Error::Io { path: parent.to_path_buf(), source: err })?;

	let mut tmp = path.as_os_str().to_os_string();

	tmp.push(".tmp");

	let tmp = std::path::PathBuf::from(tmp);

	fs::write(&tmp, payload).map_err(|err| Error::Io { path: tmp.clone(), source: err })?;
	fs::rename(&tmp, path).map_err(|err| Error::Io { path: path.to_path_buf(), source: err })?;

	Ok(())
}
