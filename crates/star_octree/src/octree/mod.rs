//! Star octree: spatial nodes, construction, per-frame traversal and
//! persistence.
//!
//! The domain `[-max_dist, max_dist]³` is split once into 8 fixed octants
//! (depth 1). The root itself never stores stars; each octant is a subtree
//! that subdivides when a leaf overflows.
//!
//! # Module Structure
//!
//! - [`bounds`]: `NodeBounds` - cube geometry and the octant convention
//! - [`node`]: `OctreeNode` - payload arrays, children, residency
//! - [`config`]: `OctreeConfig` - tree shape and LOD thresholds
//! - [`budget`]: `RebuildPolicy` - when the slot allocator is defragmented
//! - [`tree`]: `StarOctree` - the owning handle and its statistics
//! - `builder`: insertion and subdivision
//! - `lod`: LOD cache admission
//! - [`traversal`]: per-frame admission/eviction, `FrameUpdate`
//! - `io`: binary pre-order format

pub mod bounds;
pub mod budget;
pub mod config;
pub mod node;
pub mod traversal;
pub mod tree;

mod builder;
mod io;
mod lod;

// Re-exports
pub use bounds::NodeBounds;
pub use budget::{Fraction, RebuildPolicy};
pub use config::OctreeConfig;
pub use node::OctreeNode;
pub use traversal::FrameUpdate;
pub use tree::{StarOctree, TreeStats};
