//! star_octree - out-of-core star octree with view-dependent LOD.
//!
//! Tens of millions of stars (position, color and velocity attributes) do not
//! fit in a bounded GPU buffer at once. This crate organizes them in an octree
//! whose inner nodes carry spatially-decimated LOD caches, decides each frame
//! which nodes are visible and at what detail, and maps the visible nodes onto
//! slots of a fixed-capacity buffer.
//!
//! # Features
//!
//! - **Tree builder**: insertion with leaf subdivision and incremental LOD
//!   caches
//! - **Frame traversal**: per-frame admission/eviction producing a slot delta
//! - **Slot allocator**: free list with one-frame-delayed reclamation and
//!   defragmenting rebuilds
//! - **Serializer**: compact pre-order binary format
//!
//! # Example
//!
//! ```ignore
//! use star_octree::{OctreeConfig, RenderOption, StarLayout, StarOctree};
//!
//! let mut octree = StarOctree::new(OctreeConfig::default(), StarLayout::default())?;
//! for star in stars.chunks_exact(8) {
//!     octree.insert(star)?;
//! }
//! octree.init_slots(4096);
//!
//! // Each frame:
//! let update = octree.traverse(&culler, &view_projection, screen_size, RenderOption::Motion)?;
//! for (slot, chunk) in &update.slots {
//!     upload(*slot, chunk);
//! }
//! ```

pub mod constants;
pub mod error;
pub mod types;

pub use error::{OctreeError, Result};
pub use types::{RenderOption, StarLayout};

// Octree module: nodes, builder, traversal, persistence
pub mod octree;
pub use octree::{
  FrameUpdate, NodeBounds, OctreeConfig, OctreeNode, RebuildPolicy, StarOctree, TreeStats,
};

// Fixed-capacity buffer slot bookkeeping
pub mod slots;
pub use slots::{Slot, SlotAllocator};

// External visibility test seam
pub mod visibility;
pub use visibility::VisibilityOracle;

pub mod metrics;

#[cfg(test)]
pub(crate) mod test_utils;
