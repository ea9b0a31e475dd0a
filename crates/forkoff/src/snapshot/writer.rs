// SPDX-License-Identifier: GPL-3.0

//! Streaming persistence of a snapshot to a JSON cache file.
//!
//! A full chain snapshot can be far larger than available memory, so entries
//! are appended to the cache file batch by batch as they arrive from the
//! fetchers. The file is a single well-formed JSON array once
//! [`SnapshotWriter::finish`] has run; the writer only ever holds one batch in
//! memory.

use crate::{error::snapshot::SnapshotError, helpers::to_hex};
use serde::{Deserialize, Serialize};
use std::{
	fs::{File, OpenOptions},
	io::{BufWriter, Write},
	path::Path,
};

/// A single storage entry: the canonical hex-encoded storage key and its
/// hex-encoded value, `null` if the key had no value at the snapshot block.
///
/// Serializes as a two-element JSON array, the cache file's entry format.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct StorageEntry(pub String, pub Option<String>);

impl StorageEntry {
	/// Build an entry from raw key and value bytes.
	pub fn from_bytes(key: &[u8], value: Option<&[u8]>) -> Self {
		Self(to_hex(key), value.map(to_hex))
	}

	/// The hex-encoded storage key.
	pub fn key(&self) -> &str {
		&self.0
	}

	/// The hex-encoded value, if the key had one.
	pub fn value(&self) -> Option<&str> {
		self.1.as_deref()
	}
}

/// Incremental writer for the snapshot cache file.
///
/// Owns the "has anything been written yet" separator state, so multiple
/// writers never interfere with each other. Batches of size zero are accepted
/// without corrupting the separator state.
pub struct SnapshotWriter {
	out: BufWriter<File>,
	wrote_any: bool,
}

impl SnapshotWriter {
	/// Open the cache file for appending and write the array opener.
	///
	/// The caller is expected to have checked that no complete cache already
	/// exists at `path`; appending to one would corrupt it.
	pub fn create(path: &Path) -> Result<Self, SnapshotError> {
		let file = OpenOptions::new().append(true).create(true).open(path)?;
		let mut out = BufWriter::new(file);
		out.write_all(b"[")?;
		Ok(Self { out, wrote_any: false })
	}

	/// Append a batch of entries as raw array-element fragments.
	pub fn write_batch(&mut self, entries: &[StorageEntry]) -> Result<(), SnapshotError> {
		for entry in entries {
			if self.wrote_any {
				self.out.write_all(b",")?;
			} else {
				self.wrote_any = true;
			}
			serde_json::to_writer(&mut self.out, entry)?;
		}
		Ok(())
	}

	/// Write the array closer and flush.
	pub fn finish(mut self) -> Result<(), SnapshotError> {
		self.out.write_all(b"]")?;
		self.out.flush()?;
		Ok(())
	}
}

/// Read a previously persisted snapshot cache.
///
/// A cache file that is not valid JSON or whose entries are not two-element
/// `[key, value]` arrays is a fatal [`SnapshotError::MalformedCache`], never
/// silently treated as empty.
pub fn read_snapshot(path: &Path) -> Result<Vec<StorageEntry>, SnapshotError> {
	let contents = std::fs::read_to_string(path)?;
	serde_json::from_str(&contents).map_err(|e| SnapshotError::MalformedCache {
		path: path.display().to_string(),
		message: e.to_string(),
	})
}
