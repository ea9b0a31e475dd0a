// SPDX-License-Identifier: GPL-3.0

//! The `fork` command: snapshot a live chain's state and merge it into a
//! forked genesis spec.

use crate::{artifacts::Artifacts, node};
use anyhow::Result;
use clap::{Args, ValueEnum};
use forkoff::{
	DEFAULT_BATCH_SIZE, MergeSettings, NodeRpcClient, PrefixRegistry, SnapshotWriter,
	WellKnownKeys, fetch_chunked, fetch_paged, load_spec, merge, parachain_skipped_keys,
	read_snapshot, write_spec,
};
use std::path::PathBuf;
use url::Url;

/// Strategy used to enumerate the chain's key space.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub(crate) enum Strategy {
	/// Walk the key space with a resumable cursor, batch by batch.
	#[default]
	Paged,
	/// Partition the key space by byte prefix and download each partition in
	/// a single request.
	Chunked,
}

#[derive(Args)]
pub(crate) struct ForkCommand {
	/// WebSocket URL of the node's state RPC endpoint.
	#[arg(long, default_value = "ws://127.0.0.1:9944")]
	pub(crate) endpoint: Url,
	/// Endpoint used to identify the chain [default: the state endpoint].
	#[arg(long)]
	pub(crate) identity_endpoint: Option<Url>,
	/// How the key space is enumerated.
	#[arg(long, value_enum, default_value = "paged")]
	pub(crate) strategy: Strategy,
	/// Keys listed and resolved per batch (paged strategy).
	#[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
	pub(crate) batch_size: u32,
	/// Split the download into 256^level partitions (chunked strategy).
	#[arg(long, default_value_t = 1)]
	pub(crate) chunk_level: u32,
	/// Fetch the deepest partition level concurrently (chunked strategy).
	#[arg(long)]
	pub(crate) quick: bool,
	/// Chain identifier the original spec template is built from
	/// [default: the node's default chain].
	#[arg(long)]
	pub(crate) original_chain: Option<String>,
	/// Chain identifier the forked spec template is built from
	/// [default: the node's development chain].
	#[arg(long)]
	pub(crate) fork_chain: Option<String>,
	/// Relay chain recorded in the forked spec.
	#[arg(long, default_value = "tokyo")]
	pub(crate) relay_chain: String,
	/// Parachain identifier recorded in the forked spec.
	#[arg(long, default_value_t = 1000)]
	pub(crate) para_id: u32,
	/// Hex-encoded account installed as sudo [default: keep the template's].
	#[arg(long)]
	pub(crate) root_account: Option<String>,
	/// Skip the parachain-specific key deletions (solo chains).
	#[arg(long)]
	pub(crate) no_parachain_fixes: bool,
	/// Directory holding the node binary, runtime blob and produced files.
	#[arg(long, default_value = "./data")]
	pub(crate) data_dir: PathBuf,
}

impl ForkCommand {
	/// Executes the command.
	pub(crate) async fn execute(self) -> Result<()> {
		let artifacts = Artifacts::new(&self.data_dir)?;
		let binary = artifacts.ensure_node_binary()?;
		let runtime_hex = artifacts.convert_runtime_to_hex()?;

		let rpc = NodeRpcClient::connect(&self.endpoint).await?;
		let chain = match &self.identity_endpoint {
			Some(endpoint) => NodeRpcClient::connect(endpoint).await?.system_chain().await?,
			None => rpc.system_chain().await?,
		};
		log::info!("Chain name: {chain}");

		let at = rpc.block_hash().await?;
		log::info!("Forking state at block {at:?}");

		let snapshot_path = artifacts.snapshot();
		if snapshot_path.exists() {
			log::warn!(
				"Reusing cached storage at {}. Delete it and rerun to fetch the latest state",
				snapshot_path.display()
			);
		} else {
			log::info!("Fetching the current state of the live chain. This can take a while depending on the size of the chain");
			let mut writer = SnapshotWriter::create(&snapshot_path)?;
			let report = match self.strategy {
				Strategy::Paged => fetch_paged(&rpc, &mut writer, at, self.batch_size).await?,
				Strategy::Chunked =>
					fetch_chunked(&rpc, &mut writer, at, self.chunk_level, self.quick).await?,
			};
			writer.finish()?;
			log::info!("Fetched {} keys in {} batches", report.keys, report.batches);
		}

		let modules = rpc.modules(at).await?;
		let mut registry = PrefixRegistry::new();
		registry.extend_from_modules(&modules);

		// Chain spec templates for the live chain and the fork.
		node::build_raw_spec(
			&binary,
			self.original_chain.as_deref(),
			false,
			&artifacts.original_spec(),
		)?;
		node::build_raw_spec(&binary, self.fork_chain.as_deref(), true, &artifacts.forked_spec())?;

		let snapshot = read_snapshot(&snapshot_path)?;
		log::info!("Storage length: {}", snapshot.len());
		let original = load_spec(&artifacts.original_spec())?;
		let mut forked = load_spec(&artifacts.forked_spec())?;

		let skipped_keys = if self.no_parachain_fixes {
			vec![]
		} else {
			parachain_skipped_keys(&modules)?
		};
		let settings = MergeSettings {
			relay_chain: self.relay_chain,
			para_id: self.para_id,
			root_account: self.root_account,
			skipped_keys,
			keys: WellKnownKeys::default(),
		};
		let report = merge(&snapshot, &original, &mut forked, &registry, &runtime_hex, &settings);
		log::info!("Key-value count: {}", report.merged);

		write_spec(&artifacts.forked_spec(), &forked)?;
		log::info!(
			"Forked genesis generated successfully. Find it at {}",
			artifacts.forked_spec().display()
		);
		Ok(())
	}
}
