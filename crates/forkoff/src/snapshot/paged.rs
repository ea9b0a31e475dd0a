// SPDX-License-Identifier: GPL-3.0

//! Cursor-based enumeration of the full key space.

use super::{FetchReport, SnapshotWriter, StorageEntry};
use crate::{error::snapshot::SnapshotError, rpc::StateSource};
use subxt::config::substrate::H256;

/// Default number of keys listed and resolved per batch.
pub const DEFAULT_BATCH_SIZE: u32 = 128;

/// Progress is logged every this many batches.
const PROGRESS_INTERVAL: u64 = 20;

/// Download the complete key-value state at block `at`, in ascending key
/// order, flushing each resolved batch to `writer` immediately.
///
/// Each iteration lists up to `batch_size` keys strictly greater than the
/// cursor, resolves the values for exactly those keys at the same block, and
/// advances the cursor to the batch's last key. Because both the block and the
/// cursor are fixed, repeated pagination can neither skip nor duplicate keys.
/// Enumeration terminates when a batch comes back short.
///
/// The cursor is not persisted: an interrupted run cannot resume and leaves a
/// partial cache file that must be deleted before retrying.
pub async fn fetch_paged(
	source: &impl StateSource,
	writer: &mut SnapshotWriter,
	at: H256,
	batch_size: u32,
) -> Result<FetchReport, SnapshotError> {
	let mut cursor: Option<Vec<u8>> = None;
	let mut report = FetchReport::default();

	loop {
		let keys = source.keys_paged(&[], batch_size, cursor.as_deref(), at).await?;
		if keys.is_empty() {
			break;
		}

		let key_refs: Vec<&[u8]> = keys.iter().map(|k| k.as_slice()).collect();
		let values = source.values_at(&key_refs, at).await?;

		let entries: Vec<StorageEntry> = keys
			.iter()
			.zip(values.iter())
			.map(|(key, value)| StorageEntry::from_bytes(key, value.as_deref()))
			.collect();
		writer.write_batch(&entries)?;

		report.batches += 1;
		report.keys += entries.len();
		if report.batches % PROGRESS_INTERVAL == 1 {
			log::info!("Batch {} finished ({} keys so far)", report.batches, report.keys);
		}

		let short = (keys.len() as u32) < batch_size;
		cursor = keys.into_iter().next_back();
		if short {
			break;
		}
	}

	log::info!("State fetching finished: {} keys in {} batches", report.keys, report.batches);
	Ok(report)
}
