// SPDX-License-Identifier: GPL-3.0

//! Layout of the data directory holding the fork run's file artifacts.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

const BINARY_FILE: &str = "binary";
const WASM_FILE: &str = "runtime.wasm";
const HEX_FILE: &str = "runtime.hex";
const ORIGINAL_SPEC_FILE: &str = "genesis.json";
const FORKED_SPEC_FILE: &str = "fork.json";
const SNAPSHOT_FILE: &str = "storage.json";

/// The data directory: node binary and runtime blob in, generated chain
/// specs, runtime hex and snapshot cache out.
pub(crate) struct Artifacts {
	data_dir: PathBuf,
}

impl Artifacts {
	pub(crate) fn new(data_dir: &Path) -> Result<Self> {
		std::fs::create_dir_all(data_dir)
			.with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
		Ok(Self { data_dir: data_dir.to_path_buf() })
	}

	/// Path of the original chain's generated spec template.
	pub(crate) fn original_spec(&self) -> PathBuf {
		self.data_dir.join(ORIGINAL_SPEC_FILE)
	}

	/// Path of the forked spec: first the generated template, finally the
	/// merged output.
	pub(crate) fn forked_spec(&self) -> PathBuf {
		self.data_dir.join(FORKED_SPEC_FILE)
	}

	/// Path of the snapshot cache file.
	pub(crate) fn snapshot(&self) -> PathBuf {
		self.data_dir.join(SNAPSHOT_FILE)
	}

	/// Check the node binary is present and executable.
	pub(crate) fn ensure_node_binary(&self) -> Result<PathBuf> {
		let binary = self.data_dir.join(BINARY_FILE);
		if !binary.exists() {
			bail!(
				"Node binary missing. Copy the binary of your node to {} and rename it to \"{BINARY_FILE}\"",
				self.data_dir.display()
			);
		}
		#[cfg(unix)]
		{
			use std::os::unix::fs::PermissionsExt;
			let mut permissions = std::fs::metadata(&binary)?.permissions();
			permissions.set_mode(permissions.mode() | 0o755);
			std::fs::set_permissions(&binary, permissions)?;
		}
		Ok(binary)
	}

	/// Convert the runtime blob to its hex representation.
	///
	/// Reads the WASM blob, persists the lowercase hex string next to it and
	/// returns it. A missing blob is fatal.
	pub(crate) fn convert_runtime_to_hex(&self) -> Result<String> {
		let wasm = self.data_dir.join(WASM_FILE);
		if !wasm.exists() {
			bail!(
				"WASM missing. Copy the runtime WASM blob of your node to {} and rename it to \"{WASM_FILE}\"",
				self.data_dir.display()
			);
		}
		let bytes = std::fs::read(&wasm)
			.with_context(|| format!("Failed to read runtime blob {}", wasm.display()))?;
		let hex = hex::encode(bytes);
		std::fs::write(self.data_dir.join(HEX_FILE), &hex)?;
		Ok(hex)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::tempdir;

	#[test]
	fn new_creates_the_data_directory() {
		let dir = tempdir().unwrap();
		let data_dir = dir.path().join("data");
		Artifacts::new(&data_dir).unwrap();
		assert!(data_dir.is_dir());
	}

	#[test]
	fn missing_binary_is_fatal() {
		let dir = tempdir().unwrap();
		let artifacts = Artifacts::new(dir.path()).unwrap();
		let err = artifacts.ensure_node_binary().unwrap_err();
		assert!(err.to_string().contains("Node binary missing"));
	}

	#[test]
	fn missing_runtime_blob_is_fatal() {
		let dir = tempdir().unwrap();
		let artifacts = Artifacts::new(dir.path()).unwrap();
		let err = artifacts.convert_runtime_to_hex().unwrap_err();
		assert!(err.to_string().contains("WASM missing"));
	}

	#[test]
	fn runtime_blob_is_hex_converted_and_persisted() {
		let dir = tempdir().unwrap();
		let artifacts = Artifacts::new(dir.path()).unwrap();
		std::fs::write(dir.path().join(WASM_FILE), [0x00, 0x61, 0x73, 0x6d]).unwrap();

		let hex = artifacts.convert_runtime_to_hex().unwrap();
		assert_eq!(hex, "0061736d");
		assert_eq!(std::fs::read_to_string(dir.path().join(HEX_FILE)).unwrap(), "0061736d");
	}

	#[cfg(unix)]
	#[test]
	fn binary_is_made_executable() {
		use std::os::unix::fs::PermissionsExt;
		let dir = tempdir().unwrap();
		let artifacts = Artifacts::new(dir.path()).unwrap();
		std::fs::write(dir.path().join(BINARY_FILE), "#!/bin/sh\n").unwrap();

		let binary = artifacts.ensure_node_binary().unwrap();
		let mode = std::fs::metadata(binary).unwrap().permissions().mode();
		assert_eq!(mode & 0o755, 0o755);
	}
}
