// SPDX-License-Identifier: GPL-3.0

//! Storage-key prefix registry driving the genesis merge.
//!
//! A module's storage namespace is addressed by the 128-bit twox hash of its
//! name. The registry holds the set of prefixes whose entries survive the
//! merge: every storage-bearing module reported by the chain metadata, minus
//! a fixed exclusion list of consensus-critical modules, plus the well-known
//! account namespace and any manually supplied literal prefixes.

use crate::helpers::to_hex;
use subxt::Metadata;

/// System.Account storage prefix: twox128("System") ++ twox128("Account").
///
/// Always retained, even though the System module itself is excluded:
/// account balances and nonces are the point of forking real state.
pub const SYSTEM_ACCOUNT_PREFIX: &str =
	"0x26aa394eea5630e07c48ae0c9558cef7b99d880ec681799c0cf30e8886371da9";

/// Modules whose live state is never copied into the fork. Carrying their
/// state over would break finality or block authoring on the forked chain.
const SKIPPED_MODULES: &[&str] = &[
	"System",
	"Session",
	"Babe",
	"Grandpa",
	"GrandpaFinality",
	"FinalityTracker",
	"Authorship",
	"ParachainSystem",
];

/// A runtime module as reported by node metadata.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModuleDescriptor {
	/// The module (pallet) name.
	pub name: String,
	/// Whether the module declares at least one storage item.
	pub has_storage: bool,
}

/// Enumerate the runtime's modules from decoded metadata.
pub fn modules_from_metadata(metadata: &Metadata) -> Vec<ModuleDescriptor> {
	metadata
		.pallets()
		.map(|pallet| ModuleDescriptor {
			name: pallet.name().to_string(),
			has_storage: pallet.storage().is_some(),
		})
		.collect()
}

/// The storage prefix owned by a module: `0x` + twox128(name).
pub fn module_prefix(name: &str) -> String {
	to_hex(&sp_core::twox_128(name.as_bytes()))
}

/// The storage key of a plain storage value:
/// `0x` + twox128(pallet) ++ twox128(item).
pub fn storage_value_key(pallet: &str, item: &str) -> String {
	let mut key = Vec::with_capacity(32);
	key.extend(sp_core::twox_128(pallet.as_bytes()));
	key.extend(sp_core::twox_128(item.as_bytes()));
	to_hex(&key)
}

/// The set of storage-key prefixes retained by the genesis merge.
#[derive(Clone, Debug)]
pub struct PrefixRegistry {
	prefixes: Vec<String>,
}

impl PrefixRegistry {
	/// Create a registry seeded with [`SYSTEM_ACCOUNT_PREFIX`].
	pub fn new() -> Self {
		Self { prefixes: vec![SYSTEM_ACCOUNT_PREFIX.to_string()] }
	}

	/// Add the derived prefix of every storage-bearing module that is not in
	/// the exclusion list.
	pub fn extend_from_modules(&mut self, modules: &[ModuleDescriptor]) {
		for module in modules {
			if module.has_storage && !SKIPPED_MODULES.contains(&module.name.as_str()) {
				self.insert(module_prefix(&module.name));
			}
		}
	}

	/// Add a literal prefix, for one-off inclusion of an otherwise-skipped
	/// module or a specific storage item.
	pub fn insert(&mut self, prefix: impl Into<String>) {
		self.prefixes.push(prefix.into());
	}

	/// Whether a hex-encoded storage key falls under any retained prefix.
	pub fn retains(&self, key: &str) -> bool {
		self.prefixes.iter().any(|prefix| key.starts_with(prefix.as_str()))
	}

	/// The retained prefixes.
	pub fn prefixes(&self) -> &[String] {
		&self.prefixes
	}
}

impl Default for PrefixRegistry {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn module_prefix_matches_known_hash() {
		// twox128("System")
		assert_eq!(module_prefix("System"), "0x26aa394eea5630e07c48ae0c9558cef7");
		// twox128("Staking")
		assert_eq!(module_prefix("Staking"), "0x5f3e4907f716ac89b6347d15ececedca");
	}

	#[test]
	fn account_prefix_is_derivable() {
		assert_eq!(storage_value_key("System", "Account"), SYSTEM_ACCOUNT_PREFIX);
	}

	#[test]
	fn storage_value_key_extends_module_prefix() {
		let key = storage_value_key("ParasScheduler", "SessionStartBlock");
		assert!(key.starts_with(&module_prefix("ParasScheduler")));
		// 0x + two 16-byte hashes
		assert_eq!(key.len(), 2 + 64);
	}

	#[test]
	fn registry_is_seeded_with_account_prefix() {
		let registry = PrefixRegistry::new();
		assert_eq!(registry.prefixes(), &[SYSTEM_ACCOUNT_PREFIX.to_string()]);
	}

	#[test]
	fn skipped_and_storageless_modules_are_not_registered() {
		let modules = vec![
			ModuleDescriptor { name: "System".into(), has_storage: true },
			ModuleDescriptor { name: "Babe".into(), has_storage: true },
			ModuleDescriptor { name: "Balances".into(), has_storage: true },
			ModuleDescriptor { name: "Utility".into(), has_storage: false },
			ModuleDescriptor { name: "Staking".into(), has_storage: true },
		];
		let mut registry = PrefixRegistry::new();
		registry.extend_from_modules(&modules);

		let expected = vec![
			SYSTEM_ACCOUNT_PREFIX.to_string(),
			module_prefix("Balances"),
			module_prefix("Staking"),
		];
		assert_eq!(registry.prefixes(), &expected);
	}

	#[test]
	fn retains_matches_by_prefix() {
		let mut registry = PrefixRegistry::new();
		registry.extend_from_modules(&[ModuleDescriptor {
			name: "Balances".into(),
			has_storage: true,
		}]);

		// A System.Account entry is retained through the seed prefix.
		let account_key = format!("{SYSTEM_ACCOUNT_PREFIX}aabbccdd");
		assert!(registry.retains(&account_key));
		// Another System storage item is not.
		assert!(!registry.retains(&storage_value_key("System", "Number")));
		// An entry under a registered module is.
		assert!(registry.retains(&storage_value_key("Balances", "TotalIssuance")));
		// An entry under an unregistered module is not.
		assert!(!registry.retains(&storage_value_key("Treasury", "Proposals")));
	}

	#[test]
	fn literal_overrides_are_honored() {
		let mut registry = PrefixRegistry::new();
		let item = storage_value_key("Babe", "Authorities");
		assert!(!registry.retains(&item));

		registry.insert(item.clone());
		assert!(registry.retains(&item));
	}
}
