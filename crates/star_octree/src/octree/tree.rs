//! StarOctree - owning handle over the node tree, its slot allocator and
//! statistics.

use std::fmt::Write as _;

use tracing::info;

use super::{NodeBounds, OctreeConfig, OctreeNode};
use crate::constants::{CHILD_COUNT, ROOT_CHILD_DEPTH};
use crate::error::Result;
use crate::metrics::OctreeMetrics;
use crate::slots::SlotAllocator;
use crate::types::{RenderOption, StarLayout};

/// Structural statistics, maintained during construction and recomputed on
/// load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
  /// Leaves, including empty ones.
  pub num_leaf_nodes: usize,
  /// Inner nodes below the root.
  pub num_inner_nodes: usize,
  /// Deepest level any star has been stored at.
  pub total_depth: u32,
  /// Leaf subdivisions performed.
  pub subdivisions: u64,
  /// Stars inserted.
  pub num_stars: u64,
}

impl TreeStats {
  /// Stats of a freshly created tree: the 8 empty root octants.
  pub(crate) fn empty() -> Self {
    Self {
      num_leaf_nodes: CHILD_COUNT,
      ..Self::default()
    }
  }

  /// Nodes below the root.
  #[inline]
  pub fn total_nodes(&self) -> usize {
    self.num_leaf_nodes + self.num_inner_nodes
  }
}

/// Out-of-core star octree.
///
/// Exclusively owns the node tree. One tree is driven by one caller at a
/// time: [`insert`] while building, [`traverse`] once per frame.
///
/// [`insert`]: StarOctree::insert
/// [`traverse`]: StarOctree::traverse
#[derive(Clone, Debug)]
pub struct StarOctree {
  pub(crate) config: OctreeConfig,
  pub(crate) layout: StarLayout,
  /// Covers the whole domain; always inner, never holds a payload.
  pub(crate) root: OctreeNode,
  pub(crate) slots: SlotAllocator,
  pub(crate) stats: TreeStats,
  pub(crate) metrics: OctreeMetrics,
}

impl StarOctree {
  /// Create an empty tree: the root split into 8 empty octants at depth 1.
  ///
  /// The slot allocator starts with zero capacity; call
  /// [`init_slots`](Self::init_slots) before traversing.
  pub fn new(config: OctreeConfig, layout: StarLayout) -> Result<Self> {
    config.validate()?;
    layout.validate()?;

    let bounds = NodeBounds::domain(config.max_dist);
    let mut root = OctreeNode::leaf(bounds);
    root.children = Some(OctreeNode::empty_children(&bounds));

    Ok(Self {
      config,
      layout,
      root,
      slots: SlotAllocator::default(),
      stats: TreeStats::empty(),
      metrics: OctreeMetrics::default(),
    })
  }

  /// (Re)size the output buffer: every slot becomes free and no node is
  /// resident anymore.
  pub fn init_slots(&mut self, capacity: u32) {
    self.slots.initialize(capacity);
    self.root.clear_residency();
  }

  pub fn config(&self) -> &OctreeConfig {
    &self.config
  }

  pub fn layout(&self) -> &StarLayout {
    &self.layout
  }

  pub fn stats(&self) -> &TreeStats {
    &self.stats
  }

  pub fn slots(&self) -> &SlotAllocator {
    &self.slots
  }

  pub fn metrics(&self) -> &OctreeMetrics {
    &self.metrics
  }

  /// Leaf capacity and chunk size in stars.
  #[inline]
  pub fn max_stars_per_node(&self) -> u32 {
    self.config.max_stars_per_node
  }

  /// One past the highest slot currently handed out.
  #[inline]
  pub fn biggest_chunk_index_in_use(&self) -> u32 {
    self.slots.high_water_mark()
  }

  /// Stars inserted so far.
  #[inline]
  pub fn num_stars(&self) -> u64 {
    self.stats.num_stars
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.stats.num_stars == 0
  }

  /// The 8 fixed depth-1 octants.
  pub fn octants(&self) -> &[OctreeNode] {
    match self.root.children.as_deref() {
      Some(children) => children,
      None => &[],
    }
  }

  /// Floats in one chunk under `option`.
  #[inline]
  pub fn chunk_len(&self, option: RenderOption) -> usize {
    self.layout.values_for(option) * self.config.max_stars_per_node as usize
  }

  /// Concatenated chunks of every leaf (empty ones as zero padding), in
  /// pre-order.
  ///
  /// Full-detail snapshot independent of visibility.
  pub fn all_data(&self, option: RenderOption) -> Vec<f32> {
    let mut data = Vec::new();
    for octant in self.octants() {
      octant.for_each(&mut |node| {
        if node.is_leaf() {
          data.extend(node.chunk(&self.layout, self.config.max_stars_per_node, option));
        }
      });
    }
    data
  }

  /// Indented pre-order dump of the tree structure.
  ///
  /// One line per node: the octant path from the root, the star count, and
  /// either `[Leaf]` or the LOD cache size and `[Parent]`.
  pub fn describe(&self) -> String {
    let mut out = String::new();
    let mut path = Vec::new();
    for (octant, node) in self.octants().iter().enumerate() {
      path.push(octant);
      self.describe_node(node, &mut path, &mut out);
      path.pop();
    }
    out
  }

  fn describe_node(&self, node: &OctreeNode, path: &mut Vec<usize>, out: &mut String) {
    let indent = "  ".repeat(path.len() - 1);
    let route = path.iter().map(|p| p.to_string()).collect::<Vec<_>>().join("->");
    if node.is_leaf() {
      let _ = writeln!(out, "{}{{{}}} : {} - [Leaf]", indent, route, node.num_stars);
      return;
    }

    let _ = writeln!(
      out,
      "{}{{{}}} : {} LOD: {} - [Parent]",
      indent,
      route,
      node.num_stars,
      node.payload_stars(&self.layout)
    );
    if let Some(children) = node.children.as_deref() {
      for (octant, child) in children.iter().enumerate() {
        path.push(octant);
        self.describe_node(child, path, out);
        path.pop();
      }
    }
  }

  /// Log structural statistics at info level.
  pub fn log_summary(&self) {
    info!(
      stars = self.stats.num_stars,
      leaves = self.stats.num_leaf_nodes,
      inner = self.stats.num_inner_nodes,
      total_nodes = self.stats.total_nodes(),
      depth = self.stats.total_depth,
      subdivisions = self.stats.subdivisions,
      max_stars_per_node = self.config.max_stars_per_node,
      "star octree summary"
    );
  }

  /// Recount every statistic from the node tree.
  pub(crate) fn recompute_stats(&mut self) {
    let mut stats = TreeStats::default();
    for octant in self.octants() {
      count_subtree(octant, ROOT_CHILD_DEPTH, &mut stats);
      stats.num_stars += octant.num_stars as u64;
    }
    self.stats = stats;
  }
}

fn count_subtree(node: &OctreeNode, depth: u32, stats: &mut TreeStats) {
  match node.children.as_deref() {
    None => {
      stats.num_leaf_nodes += 1;
      if node.num_stars > 0 {
        stats.total_depth = stats.total_depth.max(depth);
      }
    }
    Some(children) => {
      stats.num_inner_nodes += 1;
      stats.subdivisions += 1;
      for child in children {
        count_subtree(child, depth + 1, stats);
      }
    }
  }
}
