//! OctreeNode - one octant of space and its render bookkeeping.
//!
//! A leaf stores raw star attributes (at most `max_stars_per_node` stars).
//! An inner node owns exactly 8 children and stores an LOD-sampled subset of
//! its subtree (possibly empty near the root).

use glam::Vec3;

use super::NodeBounds;
use crate::slots::Slot;
use crate::types::{RenderOption, StarLayout};

/// Octree node - owns its children exclusively.
#[derive(Clone, Debug)]
pub struct OctreeNode {
  /// Cubic bounding volume.
  pub bounds: NodeBounds,

  /// Leaf: stars stored here. Inner: cumulative stars in the subtree.
  pub num_stars: u32,

  /// Flat positions, `pos_size` floats per star.
  pub pos_data: Vec<f32>,
  /// Flat colors, `col_size` floats per star.
  pub col_data: Vec<f32>,
  /// Flat velocities, `vel_size` floats per star.
  pub vel_data: Vec<f32>,

  /// Children, present iff this is an inner node.
  pub children: Option<Box<[OctreeNode; 8]>>,

  /// Buffer slot holding this node's chunk, `None` when not resident.
  pub vbo_index: Option<Slot>,

  /// Floats of this node's LOD cache currently in the buffer
  /// (0 for leaves and non-resident nodes).
  pub lod_in_use: u32,

  /// Stars this node currently contributes to the buffer.
  pub resident_stars: u32,
}

impl OctreeNode {
  /// Create an empty, non-resident leaf.
  pub fn leaf(bounds: NodeBounds) -> Self {
    Self {
      bounds,
      num_stars: 0,
      pos_data: Vec::new(),
      col_data: Vec::new(),
      vel_data: Vec::new(),
      children: None,
      vbo_index: None,
      lod_in_use: 0,
      resident_stars: 0,
    }
  }

  /// Create the 8 empty leaves covering this node's octants.
  pub fn empty_children(bounds: &NodeBounds) -> Box<[OctreeNode; 8]> {
    Box::new(std::array::from_fn(|octant| {
      OctreeNode::leaf(bounds.child(octant))
    }))
  }

  /// Check if this node is a leaf.
  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.children.is_none()
  }

  /// Check if this node holds a buffer slot.
  #[inline]
  pub fn is_resident(&self) -> bool {
    self.vbo_index.is_some()
  }

  /// Stars in this node's own payload (raw stars or LOD cache).
  #[inline]
  pub fn payload_stars(&self, layout: &StarLayout) -> usize {
    self.pos_data.len() / layout.pos_size
  }

  /// Floats in this node's own payload.
  #[inline]
  pub fn payload_len(&self) -> usize {
    self.pos_data.len() + self.col_data.len() + self.vel_data.len()
  }

  /// Position of the star at `index` in the payload.
  #[inline]
  pub fn star_position(&self, layout: &StarLayout, index: usize) -> Vec3 {
    let start = index * layout.pos_size;
    Vec3::from_slice(&self.pos_data[start..start + 3])
  }

  /// Append one star to the payload arrays.
  pub fn push_star(&mut self, layout: &StarLayout, star: &[f32]) {
    let (pos, col, vel) = layout.split(star);
    self.pos_data.extend_from_slice(pos);
    self.col_data.extend_from_slice(col);
    self.vel_data.extend_from_slice(vel);
  }

  /// Build the fixed-size chunk this node uploads into its slot.
  ///
  /// Each included attribute array is zero-padded to
  /// `max_stars_per_node` stars so the consumer's attribute offsets are
  /// constant per chunk and stale values from a previous tenant are
  /// overwritten.
  pub fn chunk(&self, layout: &StarLayout, max_stars: u32, option: RenderOption) -> Vec<f32> {
    let max_stars = max_stars as usize;
    let mut data = Vec::with_capacity(layout.values_for(option) * max_stars);

    data.extend_from_slice(&self.pos_data);
    data.resize(layout.pos_size * max_stars, 0.0);

    if option.includes_color() {
      data.extend_from_slice(&self.col_data);
      data.resize((layout.pos_size + layout.col_size) * max_stars, 0.0);

      if option.includes_velocity() {
        data.extend_from_slice(&self.vel_data);
        data.resize(layout.values_per_star() * max_stars, 0.0);
      }
    }
    data
  }

  /// Forget any buffer residency in this subtree.
  pub fn clear_residency(&mut self) {
    self.vbo_index = None;
    self.lod_in_use = 0;
    self.resident_stars = 0;
    if let Some(children) = self.children.as_deref_mut() {
      for child in children.iter_mut() {
        child.clear_residency();
      }
    }
  }

  /// Visit this node and every descendant in pre-order.
  pub fn for_each(&self, f: &mut impl FnMut(&OctreeNode)) {
    f(self);
    if let Some(children) = self.children.as_deref() {
      for child in children {
        child.for_each(f);
      }
    }
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
