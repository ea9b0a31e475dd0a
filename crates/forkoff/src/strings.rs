// SPDX-License-Identifier: GPL-3.0

//! String constants for the RPC client module.

/// JSON-RPC method names used for error reporting.
///
/// These match the actual RPC method names in the Polkadot SDK JSON-RPC
/// specification.
pub mod methods {
	pub const CHAIN_GET_BLOCK_HASH: &str = "chain_getBlockHash";
	pub const STATE_GET_KEYS_PAGED: &str = "state_getKeysPaged";
	pub const STATE_QUERY_STORAGE_AT: &str = "state_queryStorageAt";
	pub const STATE_GET_PAIRS: &str = "state_getPairs";
	pub const STATE_GET_METADATA: &str = "state_getMetadata";
	pub const SYSTEM_CHAIN: &str = "system_chain";
}
