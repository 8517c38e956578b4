//! Visibility oracle consumed by frame traversal.
//!
//! The geometry (frustum or horizon tests, screen-space projection) lives
//! with the renderer. Traversal only asks two questions per node.

use glam::{DMat4, DVec3, Vec2};

/// Answers visibility and footprint queries for node bounding volumes.
///
/// Corners are in world units (tree coordinates multiplied by
/// `OctreeConfig::world_scale`) and ordered by the octant convention.
pub trait VisibilityOracle {
  /// Whether the volume spanned by `corners` is visible under `view_projection`.
  fn is_visible(&self, corners: &[DVec3; 8], view_projection: &DMat4) -> bool;

  /// Projected width and height of the volume in pixels.
  fn projected_size_in_pixels(
    &self,
    corners: &[DVec3; 8],
    view_projection: &DMat4,
    screen_size: Vec2,
  ) -> Vec2;
}

impl<T: VisibilityOracle + ?Sized> VisibilityOracle for &T {
  fn is_visible(&self, corners: &[DVec3; 8], view_projection: &DMat4) -> bool {
    (**self).is_visible(corners, view_projection)
  }

  fn projected_size_in_pixels(
    &self,
    corners: &[DVec3; 8],
    view_projection: &DMat4,
    screen_size: Vec2,
  ) -> Vec2 {
    (**self).projected_size_in_pixels(corners, view_projection, screen_size)
  }
}
