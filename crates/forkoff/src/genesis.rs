// SPDX-License-Identifier: GPL-3.0

//! Deterministic merging of a state snapshot into a forked genesis spec.
//!
//! Given the cached snapshot, the original chain's genesis document and a
//! template for the fork, the merge filters the snapshot through the prefix
//! registry, copies the retained entries into the fork's raw top storage and
//! applies a fixed sequence of key deletions and overrides. Later steps win
//! over earlier ones, so a fetched value at an overridden key never survives.
//!
//! The well-known keys touched by the fixed steps default to the standard
//! FRAME storage layout but are carried as [`WellKnownKeys`] configuration,
//! since chains built on other layouts place them elsewhere.

use crate::{
	error::genesis::MergeError,
	helpers::to_hex,
	prefixes::{ModuleDescriptor, PrefixRegistry, storage_value_key},
	snapshot::StorageEntry,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// System.LastRuntimeUpgrade: twox128("System") ++ twox128("LastRuntimeUpgrade").
const LAST_RUNTIME_UPGRADE_KEY: &str =
	"0x26aa394eea5630e07c48ae0c9558cef7f9cce9c888469bb1a0dceaa129672ef8";

/// Staking.ForceEra: twox128("Staking") ++ twox128("ForceEra").
const FORCE_ERA_KEY: &str =
	"0x5f3e4907f716ac89b6347d15ececedcaf7dad0317324aecae8744b87fc95f2f3";

/// Sudo.Key: twox128("Sudo") ++ twox128("Key").
const SUDO_KEY: &str = "0x5c0d1176a568c1f92944340dbfed9e9c530ebca703c85910e7164cb7d1c9e47b";

/// SCALE encoding of `Forcing::ForceNone`, which disables era transitions.
const FORCE_NONE: &str = "0x02";

/// Pallet and storage item whose key must be dropped from parachain forks.
const PARAS_SCHEDULER: &str = "ParasScheduler";
const SESSION_START_BLOCK: &str = "SessionStartBlock";

/// A chain's genesis specification.
///
/// Only the fields the merge touches are modeled; everything else the node
/// emitted (chain type, properties, boot nodes, child storage defaults, ...)
/// is preserved verbatim through flattened maps.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GenesisSpec {
	/// Human-readable chain name.
	pub name: String,
	/// Chain identifier.
	pub id: String,
	/// Network protocol identifier.
	#[serde(rename = "protocolId", default, skip_serializing_if = "Option::is_none")]
	pub protocol_id: Option<String>,
	/// Relay chain this parachain connects to.
	#[serde(rename = "relayChain", default, skip_serializing_if = "Option::is_none")]
	pub relay_chain: Option<String>,
	/// Parachain identifier on the relay chain.
	#[serde(rename = "paraId", default, skip_serializing_if = "Option::is_none")]
	pub para_id: Option<u32>,
	/// The genesis state.
	pub genesis: Genesis,
	/// All other top-level fields, passed through untouched.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// The `genesis` object of a spec.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Genesis {
	/// The raw storage section.
	pub raw: RawGenesis,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// The `genesis.raw` object: flat key-value state as hex strings.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RawGenesis {
	/// Top-level storage entries.
	pub top: Map<String, Value>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// The fixed storage keys the merge deletes or overrides.
///
/// Defaults match the standard FRAME layout; chains with a different storage
/// layout substitute their own keys.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WellKnownKeys {
	/// The `:code` key holding the runtime executable.
	pub code: String,
	/// The last-runtime-upgrade marker, deleted so the upgrade hook fires on
	/// the fork's first block.
	pub last_runtime_upgrade: String,
	/// The era-forcing key, overridden so the validator set cannot rotate
	/// mid-test.
	pub force_era: String,
	/// The sudo key storage entry.
	pub sudo_key: String,
}

impl Default for WellKnownKeys {
	fn default() -> Self {
		Self {
			code: to_hex(sp_core::storage::well_known_keys::CODE),
			last_runtime_upgrade: LAST_RUNTIME_UPGRADE_KEY.to_string(),
			force_era: FORCE_ERA_KEY.to_string(),
			sudo_key: SUDO_KEY.to_string(),
		}
	}
}

/// Configuration for a merge run.
#[derive(Clone, Debug)]
pub struct MergeSettings {
	/// Relay chain identifier installed in the forked spec.
	pub relay_chain: String,
	/// Parachain identifier installed in the forked spec.
	pub para_id: u32,
	/// Hex-encoded account installed as sudo, if any.
	pub root_account: Option<String>,
	/// Keys deleted from the forked spec because their live values are
	/// inconsistent with a fresh start (see [`parachain_skipped_keys`]).
	pub skipped_keys: Vec<String>,
	/// The fixed keys the merge deletes or overrides.
	pub keys: WellKnownKeys,
}

/// Outcome of a merge.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MergeReport {
	/// Number of snapshot entries copied into the forked spec.
	pub merged: usize,
}

/// Derive the storage keys that must be dropped from a parachain fork.
///
/// Currently the parachain scheduler's session-start marker. The key is
/// derived from the module enumeration rather than assumed, and a chain whose
/// metadata does not report the owning pallet fails the merge: silently
/// continuing would produce a genesis inconsistent with the live chain.
pub fn parachain_skipped_keys(modules: &[ModuleDescriptor]) -> Result<Vec<String>, MergeError> {
	if !modules.iter().any(|module| module.name == PARAS_SCHEDULER) {
		return Err(MergeError::SkippedKeyUnresolved {
			pallet: PARAS_SCHEDULER.to_string(),
			item: SESSION_START_BLOCK.to_string(),
		});
	}
	Ok(vec![storage_value_key(PARAS_SCHEDULER, SESSION_START_BLOCK)])
}

/// Merge the snapshot into the forked genesis spec.
///
/// Steps, in order (later steps override earlier ones):
///
/// 1. Copy identity fields from `original`, suffixing name and id with
///    `-fork`.
/// 2. Install the configured relay chain and para id.
/// 3. Copy every snapshot entry retained by `registry` into the fork's raw
///    top storage, overwriting template values.
/// 4. Delete the last-runtime-upgrade marker.
/// 5. Delete the configured skipped keys.
/// 6. Overwrite the code key with `runtime_hex`, the hex-encoded substituted
///    runtime.
/// 7. Freeze era transitions via the era-forcing key.
/// 8. Install the configured sudo account, if any.
///
/// The snapshot is only read; serialization of the result is a separate step
/// ([`write_spec`]).
pub fn merge(
	snapshot: &[StorageEntry],
	original: &GenesisSpec,
	forked: &mut GenesisSpec,
	registry: &PrefixRegistry,
	runtime_hex: &str,
	settings: &MergeSettings,
) -> MergeReport {
	forked.name = format!("{}-fork", original.name);
	forked.id = format!("{}-fork", original.id);
	forked.protocol_id = original.protocol_id.clone();

	forked.relay_chain = Some(settings.relay_chain.clone());
	forked.para_id = Some(settings.para_id);

	let top = &mut forked.genesis.raw.top;
	let mut merged = 0;
	for entry in snapshot.iter().filter(|entry| registry.retains(entry.key())) {
		// Keys without a value at the snapshot block carry no state.
		if let Some(value) = entry.value() {
			top.insert(entry.key().to_string(), Value::String(value.to_string()));
			merged += 1;
		}
	}

	// The upgrade hook must fire on the fork's first block.
	top.remove(&settings.keys.last_runtime_upgrade);

	for key in &settings.skipped_keys {
		top.remove(key);
	}

	let runtime_hex = runtime_hex.trim();
	let code = if runtime_hex.starts_with("0x") {
		runtime_hex.to_string()
	} else {
		format!("0x{runtime_hex}")
	};
	top.insert(settings.keys.code.clone(), Value::String(code));

	// ForceNone keeps the validator set fixed for the lifetime of the fork.
	top.insert(settings.keys.force_era.clone(), Value::String(FORCE_NONE.to_string()));

	if let Some(root) = &settings.root_account {
		top.insert(settings.keys.sudo_key.clone(), Value::String(root.clone()));
	}

	MergeReport { merged }
}

/// Load a genesis spec from a JSON file.
pub fn load_spec(path: &Path) -> Result<GenesisSpec, MergeError> {
	let contents = std::fs::read_to_string(path)?;
	serde_json::from_str(&contents).map_err(|e| MergeError::InvalidSpec {
		path: path.display().to_string(),
		message: e.to_string(),
	})
}

/// Serialize a genesis spec to a pretty-printed JSON file.
///
/// Field and entry ordering is stable, so repeated merges of the same inputs
/// produce byte-identical output.
pub fn write_spec(path: &Path, spec: &GenesisSpec) -> Result<(), MergeError> {
	let mut buf = Vec::new();
	let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
	let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
	spec.serialize(&mut serializer)?;
	std::fs::write(path, buf)?;
	Ok(())
}
