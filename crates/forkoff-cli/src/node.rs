// SPDX-License-Identifier: GPL-3.0

//! Invocation of the external node binary to produce chain spec templates.

use anyhow::{Context, Result, anyhow};
use duct::cmd;
use std::path::Path;

/// Generate a raw chain spec with the node binary's `build-spec` command.
///
/// # Arguments
/// * `binary` - The node binary providing the `build-spec` command.
/// * `chain` - The chain identifier to build the spec from; `None` uses the node's default chain,
///   or its development chain when `dev_fallback` is set.
/// * `dev_fallback` - Whether an absent `chain` falls back to `--dev`.
/// * `output` - Where the generated spec is written.
pub(crate) fn build_raw_spec(
	binary: &Path,
	chain: Option<&str>,
	dev_fallback: bool,
	output: &Path,
) -> Result<()> {
	let mut args = vec!["build-spec".to_string()];
	match chain {
		Some(chain) => {
			args.push("--chain".to_string());
			args.push(chain.to_string());
		},
		None if dev_fallback => args.push("--dev".to_string()),
		None => {},
	}
	args.push("--raw".to_string());

	// Write to a temporary file and atomically replace the output.
	let dir = output.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
	let temp_file = tempfile::NamedTempFile::new_in(dir)?;
	cmd(binary, &args)
		.stdout_path(temp_file.path())
		.stderr_null()
		.run()
		.with_context(|| format!("Failed to run `build-spec` with {}", binary.display()))?;
	temp_file
		.persist(output)
		.map_err(|e| anyhow!("Failed to replace {} with the generated spec: {e}", output.display()))?;
	Ok(())
}
