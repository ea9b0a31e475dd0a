// SPDX-License-Identifier: GPL-3.0

//! Error types for fork-off operations.
//!
//! This module contains all error types used throughout the `forkoff` crate,
//! organized by context:
//!
//! - [`rpc::RpcClientError`] - Errors from RPC client operations.
//! - [`snapshot::SnapshotError`] - Errors from snapshot fetching and the cache file.
//! - [`genesis::MergeError`] - Errors from chain spec loading and merging.

pub mod genesis;
pub mod rpc;
pub mod snapshot;

pub use genesis::MergeError;
pub use rpc::RpcClientError;
pub use snapshot::SnapshotError;
