// SPDX-License-Identifier: GPL-3.0

//! RPC client wrapper for connecting to live Polkadot-SDK chains.
//!
//! Provides the state-query surface needed to download a full snapshot of a
//! chain's key-value storage at a fixed block.
//!
//! # Design Decision: Why This Wrapper Exists
//!
//! This module wraps subxt's [`LegacyRpcMethods`], which means we are
//! **duplicating** some of subxt's API surface. We could use `LegacyRpcMethods`
//! directly throughout the codebase, but we chose to add this layer for the
//! following reasons:
//!
//! 1. **Focused API surface**: `LegacyRpcMethods` exposes many methods we don't need. This wrapper
//!    exposes only what's relevant for snapshotting, making the crate easier to understand and use.
//!
//! 2. **Ergonomic error handling**: subxt's errors are generic. This wrapper provides
//!    [`RpcClientError`] with variants carrying the failing method name.
//!
//! 3. **An abstraction seam**: the fetchers consume the [`StateSource`] trait rather than a
//!    concrete client, so pagination and partitioning logic is testable against an in-memory state.
//!
//! # Why Legacy RPCs?
//!
//! We use subxt's `LegacyRpcMethods` (`state_*`, `chain_*`) rather than the
//! newer `chainHead_v1_*` or `archive_v1_*` specifications because the legacy
//! request/response methods work with all Polkadot SDK nodes and need no
//! subscription lifecycle management for our use case of querying a single
//! fixed block. `state_getPairs` is not surfaced by `LegacyRpcMethods` at all,
//! so it is issued as a raw request on the underlying [`RpcClient`].

use crate::{
	error::rpc::RpcClientError,
	helpers::{from_hex, to_hex},
	prefixes::{ModuleDescriptor, modules_from_metadata},
	strings::methods,
};
use async_trait::async_trait;
use subxt::{
	Metadata, SubstrateConfig,
	backend::{legacy::LegacyRpcMethods, rpc::RpcClient},
	config::substrate::H256,
	ext::codec::Decode,
	ext::subxt_rpcs::rpc_params,
};
use url::Url;

/// Abstract capability to query a node's key-value state at a fixed block.
///
/// This is the seam between the snapshot fetchers and the network: the
/// production implementation is [`NodeRpcClient`], tests substitute an
/// in-memory state.
#[async_trait]
pub trait StateSource: Send + Sync {
	/// List up to `count` storage keys matching `prefix`, strictly greater
	/// than `start_key`, at block `at`, in ascending key order.
	async fn keys_paged(
		&self,
		prefix: &[u8],
		count: u32,
		start_key: Option<&[u8]>,
		at: H256,
	) -> Result<Vec<Vec<u8>>, RpcClientError>;

	/// Resolve the values of `keys` at block `at`, in input order.
	async fn values_at(
		&self,
		keys: &[&[u8]],
		at: H256,
	) -> Result<Vec<Option<Vec<u8>>>, RpcClientError>;

	/// Fetch every key-value pair whose key starts with `prefix` at block `at`.
	async fn pairs_with_prefix(
		&self,
		prefix: &[u8],
		at: H256,
	) -> Result<Vec<(Vec<u8>, Vec<u8>)>, RpcClientError>;
}

/// RPC client wrapper for snapshot operations.
///
/// Wraps subxt's [`LegacyRpcMethods`] to provide a focused API for fetching
/// state from live Polkadot-SDK chains. See the module-level documentation for
/// why this wrapper exists rather than using `LegacyRpcMethods` directly.
///
/// # Example
///
/// ```ignore
/// use forkoff::NodeRpcClient;
///
/// let client = NodeRpcClient::connect(&"wss://rpc.polkadot.io".parse()?).await?;
/// let at = client.block_hash().await?;
/// let keys = client.keys_paged(&[], 128, None, at).await?;
/// ```
#[derive(Clone, Debug)]
pub struct NodeRpcClient {
	raw: RpcClient,
	legacy: LegacyRpcMethods<SubstrateConfig>,
	endpoint: Url,
}

impl NodeRpcClient {
	/// Connect to a live Polkadot-SDK chain.
	///
	/// # Arguments
	/// * `endpoint` - WebSocket URL of the chain's RPC endpoint (e.g., `wss://rpc.polkadot.io`)
	pub async fn connect(endpoint: &Url) -> Result<Self, RpcClientError> {
		let raw = RpcClient::from_url(endpoint.as_str()).await.map_err(|e| {
			RpcClientError::ConnectionFailed {
				endpoint: endpoint.to_string(),
				message: e.to_string(),
			}
		})?;

		let legacy = LegacyRpcMethods::new(raw.clone());

		Ok(Self { raw, legacy, endpoint: endpoint.clone() })
	}

	/// Get the endpoint URL this client is connected to.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	/// Get the current (best) block hash.
	///
	/// The snapshot is taken at this fixed block so that repeated pagination
	/// cannot skip or duplicate keys.
	pub async fn block_hash(&self) -> Result<H256, RpcClientError> {
		self.legacy
			.chain_get_block_hash(None)
			.await
			.map_err(|e| RpcClientError::RequestFailed {
				method: methods::CHAIN_GET_BLOCK_HASH,
				message: e.to_string(),
			})?
			.ok_or_else(|| {
				RpcClientError::InvalidResponse("No block hash returned for best block".to_string())
			})
	}

	/// Get runtime metadata at a specific block, as raw bytes.
	pub async fn metadata(&self, at: H256) -> Result<Vec<u8>, RpcClientError> {
		let metadata = self.legacy.state_get_metadata(Some(at)).await.map_err(|e| {
			RpcClientError::RequestFailed {
				method: methods::STATE_GET_METADATA,
				message: e.to_string(),
			}
		})?;

		Ok(metadata.into_raw())
	}

	/// Enumerate the runtime's modules at a specific block.
	///
	/// Fetches and decodes the metadata, returning one [`ModuleDescriptor`]
	/// per pallet. Used to populate the prefix registry.
	pub async fn modules(&self, at: H256) -> Result<Vec<ModuleDescriptor>, RpcClientError> {
		let bytes = self.metadata(at).await?;
		let metadata = Metadata::decode(&mut bytes.as_slice()).map_err(|e| {
			RpcClientError::InvalidResponse(format!("Failed to decode metadata: {e}"))
		})?;
		Ok(modules_from_metadata(&metadata))
	}

	/// Get the chain name.
	pub async fn system_chain(&self) -> Result<String, RpcClientError> {
		self.legacy.system_chain().await.map_err(|e| RpcClientError::RequestFailed {
			method: methods::SYSTEM_CHAIN,
			message: e.to_string(),
		})
	}
}

#[async_trait]
impl StateSource for NodeRpcClient {
	async fn keys_paged(
		&self,
		prefix: &[u8],
		count: u32,
		start_key: Option<&[u8]>,
		at: H256,
	) -> Result<Vec<Vec<u8>>, RpcClientError> {
		self.legacy
			.state_get_keys_paged(prefix, count, start_key, Some(at))
			.await
			.map_err(|e| RpcClientError::RequestFailed {
				method: methods::STATE_GET_KEYS_PAGED,
				message: e.to_string(),
			})
	}

	async fn values_at(
		&self,
		keys: &[&[u8]],
		at: H256,
	) -> Result<Vec<Option<Vec<u8>>>, RpcClientError> {
		if keys.is_empty() {
			return Ok(vec![]);
		}

		let result = self
			.legacy
			.state_query_storage_at(keys.iter().copied(), Some(at))
			.await
			.map_err(|e| RpcClientError::RequestFailed {
				method: methods::STATE_QUERY_STORAGE_AT,
				message: e.to_string(),
			})?;

		// Build a map of key -> value from the response
		let mut changes: std::collections::HashMap<Vec<u8>, Option<Vec<u8>>> = result
			.into_iter()
			.flat_map(|change_set| {
				change_set.changes.into_iter().map(|(k, v)| {
					let key_bytes = k.0.to_vec();
					let value_bytes = v.map(|v| v.0.to_vec());
					(key_bytes, value_bytes)
				})
			})
			.collect();

		// Return values in the same order as input keys.
		// Use remove() to avoid cloning potentially large storage values.
		let values = keys.iter().map(|key| changes.remove(*key).flatten()).collect();

		Ok(values)
	}

	async fn pairs_with_prefix(
		&self,
		prefix: &[u8],
		at: H256,
	) -> Result<Vec<(Vec<u8>, Vec<u8>)>, RpcClientError> {
		// Not surfaced by LegacyRpcMethods; issue as a raw request.
		let pairs: Vec<(String, String)> = self
			.raw
			.request(methods::STATE_GET_PAIRS, rpc_params![to_hex(prefix), at])
			.await
			.map_err(|e| RpcClientError::RequestFailed {
				method: methods::STATE_GET_PAIRS,
				message: e.to_string(),
			})?;

		pairs
			.into_iter()
			.map(|(k, v)| {
				Ok((
					from_hex(&k).map_err(|e| {
						RpcClientError::InvalidResponse(format!("Invalid key in pair: {e}"))
					})?,
					from_hex(&v).map_err(|e| {
						RpcClientError::InvalidResponse(format!("Invalid value in pair: {e}"))
					})?,
				))
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn error_display_connection_failed() {
		let err = RpcClientError::ConnectionFailed {
			endpoint: "wss://example.com".to_string(),
			message: "connection refused".to_string(),
		};
		assert_eq!(err.to_string(), "Failed to connect to wss://example.com: connection refused");
	}

	#[test]
	fn error_display_request_failed() {
		let err = RpcClientError::RequestFailed {
			method: methods::STATE_GET_KEYS_PAGED,
			message: "connection reset".to_string(),
		};
		assert_eq!(
			err.to_string(),
			format!("RPC request `{}` failed: connection reset", methods::STATE_GET_KEYS_PAGED)
		);
	}

	#[test]
	fn error_display_invalid_response() {
		let err = RpcClientError::InvalidResponse("missing field".to_string());
		assert_eq!(err.to_string(), "Invalid RPC response: missing field");
	}

	#[tokio::test]
	async fn connect_to_invalid_endpoint_fails() {
		// Use a port that's unlikely to have anything listening
		let endpoint: Url = "ws://127.0.0.1:19999".parse().unwrap();
		let result = NodeRpcClient::connect(&endpoint).await;

		assert!(result.is_err());
		let err = result.unwrap_err();
		assert!(
			matches!(err, RpcClientError::ConnectionFailed { .. }),
			"Expected ConnectionFailed, got: {err:?}"
		);
	}
}
