//! Offline star octree builder.
//!
//! Builds the LOD hierarchy from a raw star file once and persists it, so
//! a viewer only has to load the result. Also inspects persisted files.
//!
//! Raw input: little-endian `i32 values_per_star`, then `values_per_star`
//! f32 values per star until end of file.

mod commands;
mod config;
mod raw;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::BuildOptions;

/// Star octree builder.
#[derive(Parser, Debug)]
#[command(name = "build_octree")]
#[command(about = "Builds and inspects persisted star octrees")]
struct Args {
	/// Log at debug level (overridden by RUST_LOG).
	#[arg(short, long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Build an octree file from a raw star file.
	Build {
		/// Raw star file.
		#[arg(short, long)]
		input: PathBuf,

		/// Octree file to write.
		#[arg(short, long)]
		output: PathBuf,

		/// Configuration TOML with [octree] and [layout] tables.
		#[arg(short, long)]
		config: Option<PathBuf>,

		/// Leaf capacity (overrides the config file).
		#[arg(long)]
		max_stars: Option<u32>,
	},

	/// Load an octree file and report its statistics.
	Inspect {
		/// Octree file to read.
		#[arg(short, long)]
		input: PathBuf,

		/// Configuration TOML with [octree] and [layout] tables.
		#[arg(short, long)]
		config: Option<PathBuf>,

		/// Print the per-node structure.
		#[arg(long)]
		tree: bool,
	},
}

fn main() -> Result<()> {
	let args = Args::parse();

	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	match args.command {
		Command::Build {
			input,
			output,
			config,
			max_stars,
		} => {
			let report = commands::build(&BuildOptions {
				input,
				output: output.clone(),
				config,
				max_stars,
			})?;
			println!(
				"Wrote {} stars in {} nodes (depth {}) to {}",
				report.inserted,
				report.stats.total_nodes(),
				report.stats.total_depth,
				output.display()
			);
			if report.skipped > 0 {
				println!("Skipped {} stars sharing a position with a full leaf", report.skipped);
			}
		}
		Command::Inspect { input, config, tree } => {
			let octree = commands::inspect(&input, config.as_deref())?;
			let stats = octree.stats();
			println!("{}", input.display());
			println!("  stars:              {}", stats.num_stars);
			println!("  max stars per node: {}", octree.max_stars_per_node());
			println!("  leaf nodes:         {}", stats.num_leaf_nodes);
			println!("  inner nodes:        {}", stats.num_inner_nodes);
			println!("  depth:              {}", stats.total_depth);
			if tree {
				print!("{}", octree.describe());
			}
		}
	}

	Ok(())
}
