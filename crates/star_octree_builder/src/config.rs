//! Configuration parsing for octree building and inspection.

use anyhow::{Context, Result};
use serde::Deserialize;
use star_octree::{OctreeConfig, RebuildPolicy, StarLayout};
use star_octree::octree::Fraction;
use std::path::Path;

/// Root configuration. Every table and key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Tree shape and LOD thresholds.
	pub octree: OctreeSection,
	/// Per-star attribute widths.
	pub layout: LayoutSection,
}

/// `[octree]` table.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OctreeSection {
	/// Half extent of the domain.
	pub max_dist: f32,
	/// Leaf capacity.
	pub max_stars_per_node: u32,
	/// Nodes at or above this depth keep no LOD cache.
	pub first_lod_depth: u32,
	/// Pixel footprint per depth level below which the LOD cache is drawn.
	pub min_total_pixels_lod: f32,
	/// Subdivision depth limit.
	pub max_depth: u32,
	/// Tree units to world units.
	pub world_scale: f64,
	/// Rebuild when the high-water mark exceeds this fraction [num, den].
	pub rebuild_high_water: [u32; 2],
	/// ...and more than this fraction [num, den] of slots is free.
	pub rebuild_free: [u32; 2],
}

impl Default for OctreeSection {
	fn default() -> Self {
		let defaults = OctreeConfig::default();
		Self {
			max_dist: defaults.max_dist,
			max_stars_per_node: defaults.max_stars_per_node,
			first_lod_depth: defaults.first_lod_depth,
			min_total_pixels_lod: defaults.min_total_pixels_lod,
			max_depth: defaults.max_depth,
			world_scale: defaults.world_scale,
			rebuild_high_water: [defaults.rebuild.high_water.num, defaults.rebuild.high_water.den],
			rebuild_free: [defaults.rebuild.free.num, defaults.rebuild.free.den],
		}
	}
}

/// `[layout]` table.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutSection {
	pub pos_size: usize,
	pub col_size: usize,
	pub vel_size: usize,
}

impl Default for LayoutSection {
	fn default() -> Self {
		let defaults = StarLayout::default();
		Self {
			pos_size: defaults.pos_size,
			col_size: defaults.col_size,
			vel_size: defaults.vel_size,
		}
	}
}

impl Config {
	/// Load configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;
		Self::parse(&content).with_context(|| format!("Invalid config: {}", path.display()))
	}

	/// Load `path` if given, defaults otherwise.
	pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
		match path {
			Some(path) => Self::load(path),
			None => Ok(Self::default()),
		}
	}

	/// Parse and validate TOML text.
	pub fn parse(content: &str) -> Result<Self> {
		let config: Config = toml::from_str(content).context("Failed to parse config TOML")?;

		for (name, [num, den]) in [
			("rebuild_high_water", config.octree.rebuild_high_water),
			("rebuild_free", config.octree.rebuild_free),
		] {
			if den == 0 || num > den {
				anyhow::bail!("{} must be a fraction in [0, 1], got {}/{}", name, num, den);
			}
		}
		config.octree_config().validate()?;
		config.layout()?;

		Ok(config)
	}

	/// Library configuration for the `[octree]` table.
	pub fn octree_config(&self) -> OctreeConfig {
		let o = &self.octree;
		OctreeConfig {
			max_dist: o.max_dist,
			max_stars_per_node: o.max_stars_per_node,
			first_lod_depth: o.first_lod_depth,
			min_total_pixels_lod: o.min_total_pixels_lod,
			max_depth: o.max_depth,
			world_scale: o.world_scale,
			rebuild: RebuildPolicy {
				high_water: Fraction::new(o.rebuild_high_water[0], o.rebuild_high_water[1]),
				free: Fraction::new(o.rebuild_free[0], o.rebuild_free[1]),
			},
		}
	}

	/// Star layout for the `[layout]` table.
	pub fn layout(&self) -> Result<StarLayout> {
		let l = &self.layout;
		Ok(StarLayout::new(l.pos_size, l.col_size, l.vel_size)?)
	}
}
