//! Error types for the star octree.

use thiserror::Error;

/// Result type alias for octree operations.
pub type Result<T> = std::result::Result<T, OctreeError>;

/// Failure modes surfaced to the caller. None of them are retried internally.
#[derive(Error, Debug)]
pub enum OctreeError {
  /// A slot was requested while every slot of the output buffer is taken.
  /// The buffer is undersized for the current admission policy.
  #[error("slot allocator exhausted: all {capacity} slots are in use")]
  SlotsExhausted { capacity: u32 },

  /// The file header disagrees with the configured attribute layout.
  #[error("values per star mismatch: layout has {expected}, file has {found}")]
  FormatMismatch { expected: usize, found: i64 },

  /// A node record could not be decoded.
  #[error("corrupt octree file: {0}")]
  CorruptFile(String),

  /// An inserted sample does not match the tree's attribute layout.
  #[error("sample has {found} values, layout expects {expected}")]
  SampleWidth { expected: usize, found: usize },

  /// The attribute layout cannot describe a star.
  #[error("invalid star layout: {0}")]
  InvalidLayout(String),

  /// Inserting would subdivide past the configured maximum depth.
  #[error("insertion would subdivide past depth {depth}")]
  DepthLimit { depth: u32 },

  /// Underlying stream failure.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
