//! Core data types shared by the builder, traversal and serializer.

use crate::constants::{COL_SIZE, POS_SIZE, VEL_SIZE};
use crate::error::{OctreeError, Result};

/// Which attribute arrays go into an emitted chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderOption {
  /// Positions only.
  Static,
  /// Positions and colors.
  Color,
  /// Positions, colors and velocities.
  #[default]
  Motion,
}

impl RenderOption {
  /// Whether colors are part of the chunk.
  #[inline]
  pub fn includes_color(self) -> bool {
    !matches!(self, RenderOption::Static)
  }

  /// Whether velocities are part of the chunk.
  #[inline]
  pub fn includes_velocity(self) -> bool {
    matches!(self, RenderOption::Motion)
  }
}

/// Per-star attribute widths, fixed for the lifetime of a tree.
///
/// A star is a flat vector `[pos.., col.., vel..]` of `values_per_star()`
/// floats. The first three position floats are x, y, z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StarLayout {
  /// Floats per position (at least 3).
  pub pos_size: usize,
  /// Floats per color.
  pub col_size: usize,
  /// Floats per velocity.
  pub vel_size: usize,
}

impl StarLayout {
  /// Create a layout, rejecting widths that cannot carry a position.
  pub fn new(pos_size: usize, col_size: usize, vel_size: usize) -> Result<Self> {
    let layout = Self {
      pos_size,
      col_size,
      vel_size,
    };
    layout.validate()?;
    Ok(layout)
  }

  /// Check that positions have at least x, y, z.
  pub fn validate(&self) -> Result<()> {
    if self.pos_size < 3 {
      return Err(OctreeError::InvalidLayout(format!(
        "pos_size must be at least 3, got {}",
        self.pos_size
      )));
    }
    Ok(())
  }

  /// Total floats per star.
  #[inline]
  pub fn values_per_star(&self) -> usize {
    self.pos_size + self.col_size + self.vel_size
  }

  /// Floats per star that a chunk carries for the given option.
  #[inline]
  pub fn values_for(&self, option: RenderOption) -> usize {
    let mut values = self.pos_size;
    if option.includes_color() {
      values += self.col_size;
    }
    if option.includes_velocity() {
      values += self.vel_size;
    }
    values
  }

  /// Split a flat star vector into (pos, col, vel) slices.
  ///
  /// The caller guarantees `star.len() == values_per_star()`.
  #[inline]
  pub fn split<'a>(&self, star: &'a [f32]) -> (&'a [f32], &'a [f32], &'a [f32]) {
    let (pos, rest) = star.split_at(self.pos_size);
    let (col, vel) = rest.split_at(self.col_size);
    (pos, col, vel)
  }
}

impl Default for StarLayout {
  fn default() -> Self {
    Self {
      pos_size: POS_SIZE,
      col_size: COL_SIZE,
      vel_size: VEL_SIZE,
    }
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
