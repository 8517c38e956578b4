//! Default tree and layout constants.
//!
//! # Domain
//!
//! ```text
//!            +MAX_DIST
//!      ┌────────┬────────┐
//!      │ oct 1  │ oct 0  │    Root: virtual node, never stores stars.
//!      │ (-x,+y)│ (+x,+y)│    8 children cover [-MAX_DIST, MAX_DIST]³,
//!      ├────────┼────────┤    each with half dimension MAX_DIST / 2.
//!      │ oct 3  │ oct 2  │
//!      │ (-x,-y)│ (+x,-y)│    Octant bit set = coordinate below origin:
//!      └────────┴────────┘    bit 0 = x, bit 1 = y, bit 2 = z.
//!            -MAX_DIST
//! ```
//!
//! Distances are in kiloparsecs; `OctreeConfig::world_scale` converts node
//! corners into the renderer's world units.

/// Half extent of the whole domain along each axis.
pub const MAX_DIST: f32 = 10.0;

/// Leaf capacity before subdivision.
pub const MAX_STARS_PER_NODE: u32 = 2000;

/// Nodes at or above this depth keep no LOD cache.
pub const FIRST_LOD_DEPTH: u32 = 4;

/// Pixel footprint below which an inner node is drawn from its LOD cache,
/// multiplied by the node depth.
pub const MIN_TOTAL_PIXELS_LOD: f32 = 10.0;

/// Hard limit on subdivision depth.
pub const MAX_DEPTH: u32 = 32;

/// Depth of the root's children.
pub const ROOT_CHILD_DEPTH: u32 = 1;

/// Number of children of every inner node.
pub const CHILD_COUNT: usize = 8;

/// Floats per star position (x, y, z).
pub const POS_SIZE: usize = 3;

/// Floats per star color (magnitude, color index).
pub const COL_SIZE: usize = 2;

/// Floats per star velocity.
pub const VEL_SIZE: usize = 3;

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
