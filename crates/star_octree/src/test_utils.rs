//! Shared fixtures: deterministic star generators, small configs and a
//! scriptable visibility oracle.

use glam::{DMat4, DVec3, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::octree::{OctreeConfig, RebuildPolicy, StarOctree};
use crate::types::StarLayout;
use crate::visibility::VisibilityOracle;

/// A star at `(x, y, z)` with color and velocity derived from the position.
pub fn star(x: f32, y: f32, z: f32) -> [f32; 8] {
  [x, y, z, x * 0.5, y * 0.25, z * 0.1, -x, 0.75]
}

/// `count` stars uniformly distributed in `[-extent, extent)³`.
pub fn random_stars(seed: u64, count: usize, extent: f32) -> Vec<[f32; 8]> {
  let mut rng = StdRng::seed_from_u64(seed);
  (0..count)
    .map(|_| {
      let mut s = star(
        rng.random_range(-extent..extent),
        rng.random_range(-extent..extent),
        rng.random_range(-extent..extent),
      );
      s[7] = rng.random_range(0.0..1.0);
      s
    })
    .collect()
}

/// Default config with a small leaf capacity and LOD caches from depth 1.
pub fn small_config(max_stars_per_node: u32) -> OctreeConfig {
  OctreeConfig {
    max_stars_per_node,
    first_lod_depth: 0,
    ..OctreeConfig::default()
  }
}

/// Same as [`small_config`] but the allocator is never defragmented.
pub fn small_config_no_rebuild(max_stars_per_node: u32) -> OctreeConfig {
  OctreeConfig {
    rebuild: RebuildPolicy::NEVER,
    ..small_config(max_stars_per_node)
  }
}

/// Build a tree from `stars`, panicking on rejection.
pub fn build(config: OctreeConfig, stars: &[[f32; 8]]) -> StarOctree {
  let mut octree = StarOctree::new(config, StarLayout::default()).unwrap();
  for s in stars {
    octree.insert(s).unwrap();
  }
  octree
}

/// Oracle that sees axis-aligned boxes overlapping a region and reports a
/// pixel footprint proportional to the box's edge length.
#[derive(Clone, Copy, Debug)]
pub struct TestOracle {
  /// Visible region, `None` for everything.
  pub region: Option<(DVec3, DVec3)>,
  /// Pixels per world unit of edge length.
  pub pixels_per_unit: f64,
}

impl TestOracle {
  /// Everything visible.
  pub fn everything(pixels_per_unit: f64) -> Self {
    Self {
      region: None,
      pixels_per_unit,
    }
  }

  /// Nothing visible.
  pub fn nothing() -> Self {
    Self {
      region: Some((DVec3::splat(1e9), DVec3::splat(1e9))),
      pixels_per_unit: 1.0,
    }
  }

  /// Only boxes overlapping `[min, max]`.
  pub fn region(min: DVec3, max: DVec3, pixels_per_unit: f64) -> Self {
    Self {
      region: Some((min, max)),
      pixels_per_unit,
    }
  }
}

fn corner_box(corners: &[DVec3; 8]) -> (DVec3, DVec3) {
  corners.iter().fold(
    (DVec3::splat(f64::INFINITY), DVec3::splat(f64::NEG_INFINITY)),
    |(lo, hi), c| (lo.min(*c), hi.max(*c)),
  )
}

impl VisibilityOracle for TestOracle {
  fn is_visible(&self, corners: &[DVec3; 8], _view_projection: &DMat4) -> bool {
    let Some((min, max)) = self.region else {
      return true;
    };
    let (lo, hi) = corner_box(corners);
    lo.cmple(max).all() && hi.cmpge(min).all()
  }

  fn projected_size_in_pixels(
    &self,
    corners: &[DVec3; 8],
    _view_projection: &DMat4,
    _screen_size: Vec2,
  ) -> Vec2 {
    let (lo, hi) = corner_box(corners);
    Vec2::splat(((hi.x - lo.x) * self.pixels_per_unit) as f32)
  }
}
