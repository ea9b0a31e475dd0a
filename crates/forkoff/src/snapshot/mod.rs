// SPDX-License-Identifier: GPL-3.0

//! State snapshot acquisition.
//!
//! Two interchangeable strategies enumerate the entire key space of a live
//! chain at a fixed block and stream the results to the cache file:
//!
//! - [`fetch_paged`] walks the key space with a resumable cursor, batch by
//!   batch, in ascending key order.
//! - [`fetch_chunked`] partitions the key space by leading byte prefix into a
//!   fixed-depth tree and downloads each leaf partition in one request,
//!   optionally fanning the deepest level out concurrently.
//!
//! Both flush every batch through the [`SnapshotWriter`] immediately, so peak
//! memory stays bounded by the batch size regardless of chain size.

mod chunked;
mod paged;
mod writer;

pub use chunked::{MAX_QUICK_FANOUT, fetch_chunked};
pub use paged::{DEFAULT_BATCH_SIZE, fetch_paged};
pub use writer::{SnapshotWriter, StorageEntry, read_snapshot};

/// Outcome of a snapshot fetch.
///
/// Accumulators are returned rather than kept as ambient counters so each
/// fetch is deterministic and testable in isolation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FetchReport {
	/// Number of non-empty batches flushed (paginated) or leaf partitions
	/// processed, empty ones included (hierarchical).
	pub batches: u64,
	/// Total number of entries written.
	pub keys: usize,
}
