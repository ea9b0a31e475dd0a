// SPDX-License-Identifier: GPL-3.0

//! Chain spec loading and merge error types.

use thiserror::Error;

/// Errors that can occur while loading, merging or writing chain specs.
#[derive(Debug, Error)]
pub enum MergeError {
	/// IO error while reading or writing a chain spec file.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// A chain spec file could not be parsed.
	#[error("Chain spec {path} could not be parsed: {message}")]
	InvalidSpec {
		/// Path of the offending chain spec file.
		path: String,
		/// The parse failure.
		message: String,
	},
	/// A storage key that must be removed from the forked spec could not be
	/// derived because the owning pallet is not present in the chain metadata.
	///
	/// Silently continuing would produce a genesis inconsistent with the live
	/// chain, so this is fatal.
	#[error("Cannot resolve storage key for {pallet}.{item}: pallet not present in chain metadata")]
	SkippedKeyUnresolved {
		/// The pallet owning the storage item.
		pallet: String,
		/// The storage item name.
		item: String,
	},
	/// Failed to serialize the forked chain spec.
	#[error("Failed to serialize chain spec: {0}")]
	Serialize(#[from] serde_json::Error),
}
