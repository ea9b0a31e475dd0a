// SPDX-License-Identifier: GPL-3.0

//! Fork a live chain's state into a new genesis specification.
//!
//! This crate downloads the complete key-value state of a running
//! Polkadot-SDK chain at a fixed block, persists it as a streaming JSON cache
//! and deterministically merges it, together with a substituted runtime, into
//! a forked genesis spec for rehearsing upgrades against realistic data.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐    ┌─────────────────────────────┐    ┌────────────────┐
//! │ NodeRpcClient │───▶│ fetch_paged / fetch_chunked │───▶│ SnapshotWriter │
//! └───────────────┘    └─────────────────────────────┘    └───────┬────────┘
//!                                                                 ▼
//! ┌────────────────┐   ┌─────────────────────────────┐    ┌────────────────┐
//! │ PrefixRegistry │──▶│ merge → forked GenesisSpec  │◀───│  storage.json  │
//! └────────────────┘   └─────────────────────────────┘    └────────────────┘
//! ```
//!
//! The fetchers consume the [`StateSource`] trait, not a concrete client, so
//! the pagination and partitioning logic is testable without a node.

pub mod error;
mod genesis;
mod helpers;
mod prefixes;
mod rpc;
mod snapshot;
mod strings;
#[cfg(test)]
pub(crate) mod testing;

pub use error::{MergeError, RpcClientError, SnapshotError};
pub use genesis::{
	Genesis, GenesisSpec, MergeReport, MergeSettings, RawGenesis, WellKnownKeys, load_spec, merge,
	parachain_skipped_keys, write_spec,
};
pub use helpers::to_hex;
pub use prefixes::{
	ModuleDescriptor, PrefixRegistry, SYSTEM_ACCOUNT_PREFIX, module_prefix, modules_from_metadata,
	storage_value_key,
};
pub use rpc::{NodeRpcClient, StateSource};
pub use snapshot::{
	DEFAULT_BATCH_SIZE, FetchReport, MAX_QUICK_FANOUT, SnapshotWriter, StorageEntry, fetch_chunked,
	fetch_paged, read_snapshot,
};
