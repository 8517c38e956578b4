//! Insertion and leaf subdivision.
//!
//! A star descends from its depth-1 octant to the containing leaf. Every
//! inner node on the way counts it and, below `first_lod_depth`, offers it
//! to the node's LOD cache. A full leaf is subdivided first: its stored
//! stars are redistributed into 8 fresh children and, when the node is deep
//! enough, the same stars rebuild its LOD cache.

use glam::Vec3;
use smallvec::SmallVec;
use tracing::debug;

use super::{lod, OctreeConfig, OctreeNode, StarOctree, TreeStats};
use crate::constants::ROOT_CHILD_DEPTH;
use crate::error::{OctreeError, Result};
use crate::types::StarLayout;

/// Borrowed build parameters threaded through the recursion.
struct BuildContext<'a> {
  config: &'a OctreeConfig,
  layout: &'a StarLayout,
}

impl StarOctree {
  /// Insert one star, `values_per_star` floats (position, color, velocity).
  ///
  /// Fails without touching the tree if the sample has the wrong width or
  /// if storing it would subdivide past `max_depth` (too many stars at one
  /// point).
  #[tracing::instrument(name = "octree::insert", level = "trace", skip_all)]
  pub fn insert(&mut self, star: &[f32]) -> Result<()> {
    let expected = self.layout.values_per_star();
    if star.len() != expected {
      return Err(OctreeError::SampleWidth {
        expected,
        found: star.len(),
      });
    }

    let pos = Vec3::from_slice(&star[..3]);
    let ctx = BuildContext {
      config: &self.config,
      layout: &self.layout,
    };
    check_depth(&ctx, &self.root, pos)?;

    let index = self.root.bounds.child_index(pos);
    if let Some(octants) = self.root.children.as_deref_mut() {
      insert_into(&ctx, &mut octants[index], star, ROOT_CHILD_DEPTH, &mut self.stats);
    }
    self.stats.num_stars += 1;
    Ok(())
  }

  /// Insert a flat array of stars, `values_per_star` floats each.
  ///
  /// Stops at the first rejected star; everything before it stays inserted.
  pub fn insert_all(&mut self, data: &[f32]) -> Result<()> {
    let width = self.layout.values_per_star();
    if data.len() % width != 0 {
      return Err(OctreeError::SampleWidth {
        expected: width,
        found: data.len() % width,
      });
    }
    for star in data.chunks_exact(width) {
      self.insert(star)?;
    }
    Ok(())
  }
}

/// Reject an insertion that would need a node deeper than `max_depth`.
///
/// Follows the star to its leaf. If that leaf is full, replays the
/// subdivisions it would trigger: each split passes the stored stars that
/// share the new star's octant down one level, and the cascade ends once
/// fewer than a full leaf's worth go the same way.
fn check_depth(ctx: &BuildContext, root: &OctreeNode, pos: Vec3) -> Result<()> {
  let mut node = root;
  let mut depth = 0;
  while let Some(children) = node.children.as_deref() {
    node = &children[node.bounds.child_index(pos)];
    depth += 1;
  }

  let max_stars = ctx.config.max_stars_per_node;
  if node.num_stars < max_stars {
    return Ok(());
  }

  let mut bounds = node.bounds;
  loop {
    if depth >= ctx.config.max_depth {
      return Err(OctreeError::DepthLimit {
        depth: ctx.config.max_depth,
      });
    }
    let octant = bounds.child_index(pos);
    let following = node
      .pos_data
      .chunks_exact(ctx.layout.pos_size)
      .filter(|p| bounds.child_index(Vec3::from_slice(&p[..3])) == octant)
      .count();
    if following < max_stars as usize {
      return Ok(());
    }
    bounds = bounds.child(octant);
    depth += 1;
  }
}

fn insert_into(ctx: &BuildContext, node: &mut OctreeNode, star: &[f32], depth: u32, stats: &mut TreeStats) {
  if node.is_leaf() {
    if node.num_stars < ctx.config.max_stars_per_node {
      node.push_star(ctx.layout, star);
      node.num_stars += 1;
      stats.total_depth = stats.total_depth.max(depth);
      return;
    }
    subdivide(ctx, node, depth, stats);
  }

  if ctx.config.uses_lod_cache(depth) {
    lod::admit(node, ctx.layout, star, ctx.config.max_stars_per_node);
  }
  node.num_stars += 1;

  let index = node.bounds.child_index(Vec3::from_slice(&star[..3]));
  if let Some(children) = node.children.as_deref_mut() {
    insert_into(ctx, &mut children[index], star, depth + 1, stats);
  }
}

/// Turn a full leaf into an inner node.
///
/// `num_stars` is kept as the subtree total.
fn subdivide(ctx: &BuildContext, node: &mut OctreeNode, depth: u32, stats: &mut TreeStats) {
  let layout = ctx.layout;
  let pos = std::mem::take(&mut node.pos_data);
  let col = std::mem::take(&mut node.col_data);
  let vel = std::mem::take(&mut node.vel_data);
  let stored = pos.len() / layout.pos_size;

  node.children = Some(OctreeNode::empty_children(&node.bounds));
  stats.num_leaf_nodes += 7;
  stats.num_inner_nodes += 1;
  stats.subdivisions += 1;

  let build_lod = ctx.config.uses_lod_cache(depth);
  let mut cache = OctreeNode::leaf(node.bounds);
  if build_lod {
    lod::seed(&mut cache, layout);
  }

  let mut scratch: SmallVec<[f32; 16]> = SmallVec::new();
  for i in 0..stored {
    scratch.clear();
    scratch.extend_from_slice(&pos[i * layout.pos_size..(i + 1) * layout.pos_size]);
    scratch.extend_from_slice(&col[i * layout.col_size..(i + 1) * layout.col_size]);
    scratch.extend_from_slice(&vel[i * layout.vel_size..(i + 1) * layout.vel_size]);

    let index = node.bounds.child_index(Vec3::from_slice(&scratch[..3]));
    if let Some(children) = node.children.as_deref_mut() {
      insert_into(ctx, &mut children[index], &scratch, depth + 1, stats);
    }
    if build_lod {
      lod::admit(&mut cache, layout, &scratch, ctx.config.max_stars_per_node);
    }
  }

  if build_lod {
    node.pos_data = cache.pos_data;
    node.col_data = cache.col_data;
    node.vel_data = cache.vel_data;
  }

  debug!(
    depth,
    stars = stored,
    lod = node.payload_stars(layout),
    "subdivided leaf"
  );
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod builder_test;
