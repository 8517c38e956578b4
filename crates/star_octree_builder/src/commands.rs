//! `build` and `inspect` subcommands.

use anyhow::{Context, Result};
use star_octree::{OctreeError, StarOctree, TreeStats};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::raw::RawStarReader;

/// Inputs of `build`.
#[derive(Debug)]
pub struct BuildOptions {
	pub input: PathBuf,
	pub output: PathBuf,
	pub config: Option<PathBuf>,
	pub max_stars: Option<u32>,
}

/// Outcome of `build`.
#[derive(Debug)]
pub struct BuildReport {
	/// Stars stored in the tree.
	pub inserted: u64,
	/// Stars dropped because too many share one position.
	pub skipped: u64,
	pub stats: TreeStats,
}

/// Build an octree from a raw star file and write it to `output`.
pub fn build(options: &BuildOptions) -> Result<BuildReport> {
	let config = Config::load_or_default(options.config.as_deref())?;
	let mut octree_config = config.octree_config();
	if let Some(max_stars) = options.max_stars {
		octree_config.max_stars_per_node = max_stars;
	}
	let layout = config.layout()?;

	let file = File::open(&options.input)
		.with_context(|| format!("Failed to open star file: {}", options.input.display()))?;
	let mut reader = RawStarReader::new(BufReader::new(file), layout.values_per_star())
		.with_context(|| format!("Unsupported star file: {}", options.input.display()))?;

	info!(input = %options.input.display(), "building octree");
	let mut octree = StarOctree::new(octree_config, layout)?;
	let mut skipped = 0u64;
	while let Some(star) = reader.next_star()? {
		match octree.insert(star) {
			Ok(()) => {}
			Err(OctreeError::DepthLimit { .. }) => skipped += 1,
			Err(e) => return Err(e).context("Failed to insert star"),
		}
	}
	if skipped > 0 {
		warn!(skipped, "dropped stars sharing a position with a full leaf");
	}

	octree.log_summary();
	octree
		.save(&options.output)
		.with_context(|| format!("Failed to write octree: {}", options.output.display()))?;

	Ok(BuildReport {
		inserted: octree.num_stars(),
		skipped,
		stats: *octree.stats(),
	})
}

/// Load an octree file and log its statistics.
pub fn inspect(input: &Path, config: Option<&Path>) -> Result<StarOctree> {
	let config = Config::load_or_default(config)?;
	let octree = StarOctree::load(input, config.octree_config(), config.layout()?)
		.with_context(|| format!("Failed to load octree: {}", input.display()))?;
	octree.log_summary();
	Ok(octree)
}

#[cfg(test)]
#[path = "commands_test.rs"]
mod commands_test;
