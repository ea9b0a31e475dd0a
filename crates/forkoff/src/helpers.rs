// SPDX-License-Identifier: GPL-3.0

//! Hex encoding helpers for storage keys and values.
//!
//! Storage keys and values cross the RPC boundary as raw bytes but are
//! persisted and merged as `0x`-prefixed lowercase hex strings, matching the
//! snapshot cache and chain spec formats.

use hex::FromHexError;

/// Encode bytes as a `0x`-prefixed lowercase hex string.
pub fn to_hex(bytes: &[u8]) -> String {
	format!("0x{}", hex::encode(bytes))
}

/// Decode a hex string, with or without a `0x` prefix, into bytes.
pub fn from_hex(s: &str) -> Result<Vec<u8>, FromHexError> {
	hex::decode(s.strip_prefix("0x").unwrap_or(s))
}
