// SPDX-License-Identifier: GPL-3.0

//! Snapshot fetching and cache file error types.

use super::rpc::RpcClientError;
use thiserror::Error;

/// Errors that can occur while fetching a snapshot or reading the cache file.
#[derive(Debug, Error)]
pub enum SnapshotError {
	/// IO error while writing or reading the cache file.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Failed to serialize a snapshot entry.
	#[error("Failed to serialize snapshot entry: {0}")]
	Serialize(#[from] serde_json::Error),
	/// An existing cache file is not a valid snapshot.
	///
	/// Surfaced as fatal rather than silently treated as an empty snapshot,
	/// since a truncated cache would otherwise produce an incomplete fork.
	#[error("Malformed snapshot cache at {path}: {message}")]
	MalformedCache {
		/// Path of the offending cache file.
		path: String,
		/// The parse failure.
		message: String,
	},
	/// RPC error during fetching.
	#[error("RPC error: {0}")]
	Rpc(#[from] RpcClientError),
}
