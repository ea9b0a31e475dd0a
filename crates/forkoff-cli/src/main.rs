// SPDX-License-Identifier: GPL-3.0

//! CLI for forking a live chain's state into a new genesis specification.

mod artifacts;
mod commands;
mod node;

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
#[command(subcommand_required = true)]
enum Commands {
	/// Fork a live chain's state into a new genesis spec.
	#[clap(alias = "f")]
	Fork(commands::fork::ForkCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
	env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
	let cli = Cli::parse();
	match cli.command {
		Commands::Fork(cmd) => cmd.execute().await,
	}
}

#[test]
fn verify_cli() {
	// https://docs.rs/clap/latest/clap/_derive/_tutorial/chapter_4/index.html
	use clap::CommandFactory;
	Cli::command().debug_assert()
}
