//! LOD cache maintenance for inner nodes.
//!
//! A cache starts with one virtual star at the node origin (zero color and
//! velocity) and admits a candidate only if it lies more than
//! `half_dimension / 2` from the most recently admitted star. The result is
//! a spatially decimated sample of the subtree, capped at
//! `max_stars_per_node` stars so it fits one chunk.

use glam::Vec3;

use super::OctreeNode;
use crate::types::StarLayout;

/// Replace the node's payload with the single origin seed.
pub(crate) fn seed(node: &mut OctreeNode, layout: &StarLayout) {
  let mut pos = vec![0.0; layout.pos_size];
  pos[..3].copy_from_slice(&node.bounds.origin.to_array());
  node.pos_data = pos;
  node.col_data = vec![0.0; layout.col_size];
  node.vel_data = vec![0.0; layout.vel_size];
}

/// Offer a star to the node's cache. Returns whether it was admitted.
pub(crate) fn admit(node: &mut OctreeNode, layout: &StarLayout, star: &[f32], max_stars: u32) -> bool {
  let cached = node.payload_stars(layout);
  if cached >= max_stars as usize {
    return false;
  }

  let candidate = Vec3::from_slice(&star[..3]);
  if cached > 0 {
    let last = node.star_position(layout, cached - 1);
    if last.distance(candidate) <= node.bounds.half_dimension / 2.0 {
      return false;
    }
  }

  node.push_star(layout, star);
  true
}
