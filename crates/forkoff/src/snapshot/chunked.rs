// SPDX-License-Identifier: GPL-3.0

//! Fixed-depth prefix partitioning of the key space.

use super::{FetchReport, SnapshotWriter, StorageEntry};
use crate::{error::snapshot::SnapshotError, rpc::StateSource};
use futures::{StreamExt, stream};
use std::collections::VecDeque;
use subxt::config::substrate::H256;

/// Upper bound on concurrently outstanding leaf requests in quick mode.
///
/// All leaves share one underlying connection, which is not assumed to be safe
/// against unbounded concurrent requests, so the fan-out width is capped below
/// the 256 siblings of a group.
pub const MAX_QUICK_FANOUT: usize = 64;

/// Download the complete key-value state at block `at` by partitioning the key
/// space into `256^depth` leaf partitions of a fixed byte-prefix tree.
///
/// Each leaf is fetched with a single all-pairs-under-prefix request and
/// flushed to `writer` as one batch. Greater depth bounds the size of any
/// single response at the cost of a request-count explosion, so depth is
/// operator-tunable. Parent levels are walked sequentially from an explicit
/// worklist; with `quick`, the 256 sibling leaves of each group are fetched
/// concurrently (width-capped at [`MAX_QUICK_FANOUT`]) and flushed in
/// completion order. Cache ordering is not significant to the merge, which
/// relies only on key uniqueness.
///
/// A key shorter than `depth` bytes starts with no leaf prefix and falls
/// outside every partition. Chain storage keys are hash-prefixed and never
/// that short at the depths this strategy is used with, but the constraint
/// bounds how deep partitioning can meaningfully go.
pub async fn fetch_chunked(
	source: &impl StateSource,
	writer: &mut SnapshotWriter,
	at: H256,
	depth: u32,
	quick: bool,
) -> Result<FetchReport, SnapshotError> {
	let total = 256u64.saturating_pow(depth);
	let mut report = FetchReport::default();

	if depth == 0 {
		let pairs = source.pairs_with_prefix(&[], at).await?;
		flush_partition(writer, pairs, &mut report, total)?;
		log::info!("State fetching finished: {} keys in one partition", report.keys);
		return Ok(report);
	}

	// Parents of the leaf level, in lexicographic order.
	let mut parents: VecDeque<Vec<u8>> = VecDeque::from([Vec::new()]);
	for _ in 1..depth {
		for _ in 0..parents.len() {
			let parent = parents.pop_front().expect("length checked above; qed");
			for byte in 0..=255u8 {
				let mut child = parent.clone();
				child.push(byte);
				parents.push_back(child);
			}
		}
	}

	while let Some(parent) = parents.pop_front() {
		if quick {
			let mut partitions = stream::iter((0..=255u8).map(|byte| {
				let mut prefix = parent.clone();
				prefix.push(byte);
				async move { source.pairs_with_prefix(&prefix, at).await }
			}))
			.buffer_unordered(MAX_QUICK_FANOUT);

			while let Some(pairs) = partitions.next().await {
				flush_partition(writer, pairs?, &mut report, total)?;
			}
		} else {
			for byte in 0..=255u8 {
				let mut prefix = parent.clone();
				prefix.push(byte);
				let pairs = source.pairs_with_prefix(&prefix, at).await?;
				flush_partition(writer, pairs, &mut report, total)?;
			}
		}
	}

	log::info!("State fetching finished: {} keys in {} partitions", report.keys, report.batches);
	Ok(report)
}

fn flush_partition(
	writer: &mut SnapshotWriter,
	pairs: Vec<(Vec<u8>, Vec<u8>)>,
	report: &mut FetchReport,
	total: u64,
) -> Result<(), SnapshotError> {
	let entries: Vec<StorageEntry> =
		pairs.iter().map(|(key, value)| StorageEntry::from_bytes(key, Some(value))).collect();
	writer.write_batch(&entries)?;
	report.batches += 1;
	report.keys += entries.len();
	log::debug!("Partition {}/{total} fetched ({} entries)", report.batches, entries.len());
	Ok(())
}
