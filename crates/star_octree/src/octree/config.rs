//! OctreeConfig - tree shape, LOD selection and rebuild thresholds.

use crate::constants::{
  FIRST_LOD_DEPTH, MAX_DEPTH, MAX_DIST, MAX_STARS_PER_NODE, MIN_TOTAL_PIXELS_LOD,
};
use crate::error::{OctreeError, Result};

use super::RebuildPolicy;

/// Configuration for building and traversing a star octree.
#[derive(Clone, Debug, PartialEq)]
pub struct OctreeConfig {
  /// Half extent of the domain along each axis.
  pub max_dist: f32,

  /// Leaf capacity. Also the star count every emitted chunk is padded to.
  pub max_stars_per_node: u32,

  /// Nodes at or above this depth keep no LOD cache.
  pub first_lod_depth: u32,

  /// Pixel footprint (per depth level) below which an inner node is drawn
  /// from its LOD cache instead of its children.
  pub min_total_pixels_lod: f32,

  /// Subdivision depth limit.
  pub max_depth: u32,

  /// Multiplier from tree units to the units the visibility oracle expects.
  pub world_scale: f64,

  /// When the slot allocator is reset to defragment the buffer.
  pub rebuild: RebuildPolicy,
}

impl OctreeConfig {
  /// Check that the configuration describes a usable tree.
  pub fn validate(&self) -> Result<()> {
    if !(self.max_dist > 0.0 && self.max_dist.is_finite()) {
      return Err(OctreeError::InvalidLayout(format!(
        "max_dist must be positive and finite, got {}",
        self.max_dist
      )));
    }
    if self.max_stars_per_node == 0 {
      return Err(OctreeError::InvalidLayout(
        "max_stars_per_node must be at least 1".into(),
      ));
    }
    Ok(())
  }

  /// Pixel threshold for drawing a node at `depth` from its LOD cache.
  #[inline]
  pub fn lod_pixel_threshold(&self, depth: u32) -> f32 {
    self.min_total_pixels_lod * depth as f32
  }

  /// Whether nodes at `depth` carry an LOD cache.
  #[inline]
  pub fn uses_lod_cache(&self, depth: u32) -> bool {
    depth > self.first_lod_depth
  }
}

impl Default for OctreeConfig {
  fn default() -> Self {
    Self {
      max_dist: MAX_DIST,
      max_stars_per_node: MAX_STARS_PER_NODE,
      first_lod_depth: FIRST_LOD_DEPTH,
      min_total_pixels_lod: MIN_TOTAL_PIXELS_LOD,
      max_depth: MAX_DEPTH,
      world_scale: 1.0,
      rebuild: RebuildPolicy::default(),
    }
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
