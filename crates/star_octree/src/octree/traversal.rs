//! Per-frame traversal: decide which nodes are resident and at what detail.
//!
//! Every frame walks the tree from the 8 octants down:
//!
//! - an invisible node evicts itself and every resident descendant;
//! - a visible leaf with stars is admitted with its raw payload;
//! - a visible inner node whose LOD cache is non-empty and whose projected
//!   footprint is below `min_total_pixels_lod * depth` pixels is admitted
//!   with the cache, evicting its descendants;
//! - any other visible inner node evicts itself and recurses.
//!
//! A node already resident is rewritten only when its content changed (new
//! stars in a leaf, a grown LOD cache). Evictions release slots into the
//! allocator's pending set and report the slot with an empty payload.
//!
//! On a rebuild frame the allocator is reset before the walk: every visible
//! node is re-admitted at a fresh compact slot, evictions report nothing,
//! and afterwards every previously held slot that was not reassigned is
//! reported with an empty payload.

use std::collections::HashMap;

use glam::{DMat4, Vec2};
use tracing::{info, info_span};
use web_time::Instant;

use super::{OctreeConfig, OctreeNode, StarOctree};
use crate::constants::ROOT_CHILD_DEPTH;
use crate::error::Result;
use crate::slots::{Slot, SlotAllocator};
use crate::types::{RenderOption, StarLayout};
use crate::visibility::VisibilityOracle;

/// Buffer changes produced by one traversal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameUpdate {
  /// Slot to chunk. An empty chunk means the slot was vacated.
  pub slots: HashMap<Slot, Vec<f32>>,
  /// Change in the number of stars drawn from the buffer.
  pub delta_stars: i64,
  /// The allocator was reset and every resident node re-placed.
  pub rebuilt: bool,
}

impl FrameUpdate {
  /// No buffer changes this frame.
  pub fn is_empty(&self) -> bool {
    self.slots.is_empty()
  }

  /// Slots given a new chunk.
  pub fn written(&self) -> impl Iterator<Item = (Slot, &[f32])> + '_ {
    self
      .slots
      .iter()
      .filter(|(_, chunk)| !chunk.is_empty())
      .map(|(slot, chunk)| (*slot, chunk.as_slice()))
  }

  /// Slots vacated this frame.
  pub fn cleared(&self) -> impl Iterator<Item = Slot> + '_ {
    self
      .slots
      .iter()
      .filter(|(_, chunk)| chunk.is_empty())
      .map(|(slot, _)| *slot)
  }
}

/// Mutable state of one traversal.
struct Frame<'a, O: ?Sized> {
  oracle: &'a O,
  view_projection: &'a DMat4,
  screen_size: Vec2,
  option: RenderOption,
  config: &'a OctreeConfig,
  layout: &'a StarLayout,
  slots: &'a mut SlotAllocator,
  rebuild: bool,
  /// Slots held before a rebuild reset, to be cleared if not reassigned.
  stale: Vec<Slot>,
  update: FrameUpdate,
}

impl StarOctree {
  /// Run one frame.
  ///
  /// Reclaims the slots released last frame, optionally resets the
  /// allocator (see [`RebuildPolicy`](super::RebuildPolicy)), then walks the
  /// tree. Fails with `SlotsExhausted` when the buffer cannot hold every
  /// node that must be resident; the residency state is then partial and
  /// [`init_slots`](Self::init_slots) should be called before the next
  /// frame.
  pub fn traverse<O: VisibilityOracle + ?Sized>(
    &mut self,
    oracle: &O,
    view_projection: &DMat4,
    screen_size: Vec2,
    option: RenderOption,
  ) -> Result<FrameUpdate> {
    let _span = info_span!("octree::traverse").entered();
    let start = Instant::now();

    self.slots.reclaim_pending();
    let rebuild = self.config.rebuild.should_rebuild(
      self.slots.high_water_mark(),
      self.slots.free_count(),
      self.slots.capacity(),
    );
    if rebuild {
      info!(
        high_water_mark = self.slots.high_water_mark(),
        free = self.slots.free_count(),
        capacity = self.slots.capacity(),
        "rebuilding slot layout"
      );
      let capacity = self.slots.capacity();
      self.slots.initialize(capacity);
    }

    let mut frame = Frame {
      oracle,
      view_projection,
      screen_size,
      option,
      config: &self.config,
      layout: &self.layout,
      slots: &mut self.slots,
      rebuild,
      stale: Vec::new(),
      update: FrameUpdate::default(),
    };

    if let Some(octants) = self.root.children.as_deref_mut() {
      for octant in octants.iter_mut() {
        frame.visit(octant, ROOT_CHILD_DEPTH)?;
      }
    }

    let Frame {
      stale, mut update, ..
    } = frame;
    if rebuild {
      for slot in stale {
        update.slots.entry(slot).or_default();
      }
      update.rebuilt = true;
      info!(
        resident = self.slots.in_use(),
        high_water_mark = self.slots.high_water_mark(),
        "slot layout rebuilt"
      );
    }

    let elapsed_us = start.elapsed().as_micros() as u64;
    self.metrics.record_traversal(&update, elapsed_us, &self.slots);
    Ok(update)
  }
}

impl<O: VisibilityOracle + ?Sized> Frame<'_, O> {
  fn visit(&mut self, node: &mut OctreeNode, depth: u32) -> Result<()> {
    let corners = node.bounds.world_corners(self.config.world_scale);
    if !self.oracle.is_visible(&corners, self.view_projection) {
      self.evict(node, true);
      return Ok(());
    }

    if node.is_leaf() {
      if node.num_stars == 0 {
        self.evict(node, false);
        return Ok(());
      }
      let stars = node.num_stars;
      return self.admit(node, stars);
    }

    if !node.pos_data.is_empty() {
      let pixels = self
        .oracle
        .projected_size_in_pixels(&corners, self.view_projection, self.screen_size);
      if pixels.x * pixels.y < self.config.lod_pixel_threshold(depth) {
        let stars = node.payload_stars(self.layout) as u32;
        return self.admit(node, stars);
      }
    }

    self.evict(node, false);
    if let Some(children) = node.children.as_deref_mut() {
      for child in children.iter_mut() {
        self.visit(child, depth + 1)?;
      }
    }
    Ok(())
  }

  /// Make `node` resident with its own payload (`stars` stars).
  fn admit(&mut self, node: &mut OctreeNode, stars: u32) -> Result<()> {
    let lod_floats = if node.is_leaf() { 0 } else { node.payload_len() as u32 };

    let current = node.vbo_index;
    let slot = match current {
      Some(slot) if !self.rebuild => {
        if node.resident_stars == stars && node.lod_in_use == lod_floats {
          return Ok(());
        }
        slot
      }
      previous => {
        if let Some(old) = previous {
          self.stale.push(old);
        }
        let slot = self.slots.acquire()?;
        node.vbo_index = Some(slot);
        if let Some(children) = node.children.as_deref_mut() {
          for child in children.iter_mut() {
            self.evict(child, true);
          }
        }
        slot
      }
    };

    let chunk = node.chunk(self.layout, self.config.max_stars_per_node, self.option);
    self.update.slots.insert(slot, chunk);
    self.update.delta_stars += stars as i64 - node.resident_stars as i64;
    node.resident_stars = stars;
    node.lod_in_use = lod_floats;
    Ok(())
  }

  /// Drop `node` from the buffer, and its whole subtree if `recursive`.
  fn evict(&mut self, node: &mut OctreeNode, recursive: bool) {
    if let Some(slot) = node.vbo_index.take() {
      if self.rebuild {
        self.stale.push(slot);
      } else {
        self.slots.release(slot);
        self.update.slots.insert(slot, Vec::new());
      }
      self.update.delta_stars -= node.resident_stars as i64;
      node.resident_stars = 0;
      node.lod_in_use = 0;
    }

    if recursive {
      if let Some(children) = node.children.as_deref_mut() {
        for child in children.iter_mut() {
          self.evict(child, true);
        }
      }
    }
  }
}

#[cfg(test)]
#[path = "traversal_test.rs"]
mod traversal_test;
