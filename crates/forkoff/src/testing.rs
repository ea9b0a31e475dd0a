// SPDX-License-Identifier: GPL-3.0

//! Shared testing utilities for forkoff tests.

use crate::{error::rpc::RpcClientError, rpc::StateSource};
use async_trait::async_trait;
use std::{
	collections::BTreeMap,
	sync::atomic::{AtomicUsize, Ordering},
};
use subxt::config::substrate::H256;

/// In-memory key-value state implementing [`StateSource`].
///
/// Serves queries from a sorted map, so listings come back in byte-
/// lexicographic key order exactly like a node would return them. Counts the
/// requests it serves so tests can assert on request complexity.
pub(crate) struct MemoryState {
	entries: BTreeMap<Vec<u8>, Vec<u8>>,
	list_calls: AtomicUsize,
	value_calls: AtomicUsize,
	pairs_calls: AtomicUsize,
}

impl MemoryState {
	pub(crate) fn from_pairs(pairs: impl IntoIterator<Item = (Vec<u8>, Vec<u8>)>) -> Self {
		Self {
			entries: pairs.into_iter().collect(),
			list_calls: AtomicUsize::new(0),
			value_calls: AtomicUsize::new(0),
			pairs_calls: AtomicUsize::new(0),
		}
	}

	/// All entries, in key order.
	pub(crate) fn pairs(&self) -> impl Iterator<Item = (Vec<u8>, Vec<u8>)> + '_ {
		self.entries.iter().map(|(k, v)| (k.clone(), v.clone()))
	}

	/// Number of key-listing requests served.
	pub(crate) fn list_calls(&self) -> usize {
		self.list_calls.load(Ordering::Relaxed)
	}

	/// Number of value-resolution requests served.
	pub(crate) fn value_calls(&self) -> usize {
		self.value_calls.load(Ordering::Relaxed)
	}

	/// Number of all-pairs requests served.
	pub(crate) fn pairs_calls(&self) -> usize {
		self.pairs_calls.load(Ordering::Relaxed)
	}
}

#[async_trait]
impl StateSource for MemoryState {
	async fn keys_paged(
		&self,
		prefix: &[u8],
		count: u32,
		start_key: Option<&[u8]>,
		_at: H256,
	) -> Result<Vec<Vec<u8>>, RpcClientError> {
		self.list_calls.fetch_add(1, Ordering::Relaxed);
		Ok(self
			.entries
			.keys()
			.filter(|key| key.starts_with(prefix))
			.filter(|key| start_key.is_none_or(|start| key.as_slice() > start))
			.take(count as usize)
			.cloned()
			.collect())
	}

	async fn values_at(
		&self,
		keys: &[&[u8]],
		_at: H256,
	) -> Result<Vec<Option<Vec<u8>>>, RpcClientError> {
		self.value_calls.fetch_add(1, Ordering::Relaxed);
		Ok(keys.iter().map(|key| self.entries.get(*key).cloned()).collect())
	}

	async fn pairs_with_prefix(
		&self,
		prefix: &[u8],
		_at: H256,
	) -> Result<Vec<(Vec<u8>, Vec<u8>)>, RpcClientError> {
		self.pairs_calls.fetch_add(1, Ordering::Relaxed);
		Ok(self
			.entries
			.iter()
			.filter(|(key, _)| key.starts_with(prefix))
			.map(|(key, value)| (key.clone(), value.clone()))
			.collect())
	}
}
