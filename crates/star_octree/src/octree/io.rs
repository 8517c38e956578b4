//! Binary pre-order octree format.
//!
//! ```text
//! header   i32 values_per_star
//!          i32 max_stars_per_node
//! node*    u8  is_leaf (0 or 1)
//!          i32 num_stars
//!          i32 count          floats in the payload that follows
//!          f32 * count        positions, then colors, then velocities
//! ```
//!
//! The 8 depth-1 octants are written in octant order, each followed by its
//! children recursively (inner nodes only). All values are little-endian.
//! The leaf capacity stored in the header takes precedence over the loading
//! config's `max_stars_per_node`.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use tracing::{info, warn};

use super::{OctreeConfig, OctreeNode, StarOctree};
use crate::constants::ROOT_CHILD_DEPTH;
use crate::error::{OctreeError, Result};
use crate::types::StarLayout;

impl StarOctree {
  /// Write the tree to `writer`.
  pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
    write_i32(writer, self.layout.values_per_star() as i32)?;
    write_i32(writer, self.config.max_stars_per_node as i32)?;

    let mut scratch = Vec::new();
    for octant in self.octants() {
      write_node(writer, octant, &mut scratch)?;
    }
    Ok(())
  }

  /// Read a tree written by [`write_to`](Self::write_to).
  ///
  /// The result is always a freshly built tree with no resident nodes; a
  /// failed read leaves nothing behind. Fails with `FormatMismatch` when the
  /// file's star width differs from `layout`.
  pub fn read_from<R: Read>(reader: &mut R, mut config: OctreeConfig, layout: StarLayout) -> Result<Self> {
    let values_per_star = read_i32(reader)?;
    let expected = layout.values_per_star();
    if values_per_star as i64 != expected as i64 {
      warn!(
        expected,
        found = values_per_star,
        "octree file has a different star layout"
      );
      return Err(OctreeError::FormatMismatch {
        expected,
        found: values_per_star as i64,
      });
    }

    let max_stars = read_i32(reader)?;
    if max_stars <= 0 {
      return Err(OctreeError::CorruptFile(format!(
        "max_stars_per_node must be positive, got {}",
        max_stars
      )));
    }
    config.max_stars_per_node = max_stars as u32;

    let mut octree = StarOctree::new(config, layout)?;
    let ctx = ReadContext {
      layout: &octree.layout,
      max_stars: octree.config.max_stars_per_node,
      max_depth: octree.config.max_depth,
    };
    if let Some(octants) = octree.root.children.as_deref_mut() {
      for octant in octants.iter_mut() {
        read_node(reader, &ctx, octant, ROOT_CHILD_DEPTH)?;
      }
    }
    octree.recompute_stats();
    Ok(octree)
  }

  /// Write the tree to a file.
  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    self.write_to(&mut writer)?;
    writer.flush()?;
    info!(
      path = %path.display(),
      stars = self.stats.num_stars,
      nodes = self.stats.total_nodes(),
      "octree saved"
    );
    Ok(())
  }

  /// Read a tree from a file.
  pub fn load(path: impl AsRef<Path>, config: OctreeConfig, layout: StarLayout) -> Result<Self> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let octree = Self::read_from(&mut reader, config, layout)?;
    info!(
      path = %path.display(),
      stars = octree.stats.num_stars,
      nodes = octree.stats.total_nodes(),
      depth = octree.stats.total_depth,
      "octree loaded"
    );
    Ok(octree)
  }
}

fn write_i32<W: Write>(writer: &mut W, value: i32) -> Result<()> {
  writer.write_all(&value.to_le_bytes())?;
  Ok(())
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
  let mut buf = [0u8; 4];
  reader.read_exact(&mut buf)?;
  Ok(i32::from_le_bytes(buf))
}

fn write_node<W: Write>(writer: &mut W, node: &OctreeNode, scratch: &mut Vec<u8>) -> Result<()> {
  let count = node.payload_len();
  scratch.clear();
  scratch.reserve(9 + count * 4);
  scratch.push(node.is_leaf() as u8);
  scratch.extend_from_slice(&(node.num_stars as i32).to_le_bytes());
  scratch.extend_from_slice(&(count as i32).to_le_bytes());
  for value in node.pos_data.iter().chain(&node.col_data).chain(&node.vel_data) {
    scratch.extend_from_slice(&value.to_le_bytes());
  }
  writer.write_all(scratch)?;

  if let Some(children) = node.children.as_deref() {
    for child in children {
      write_node(writer, child, scratch)?;
    }
  }
  Ok(())
}

struct ReadContext<'a> {
  layout: &'a StarLayout,
  max_stars: u32,
  max_depth: u32,
}

fn read_node<R: Read>(reader: &mut R, ctx: &ReadContext, node: &mut OctreeNode, depth: u32) -> Result<()> {
  let mut flag = [0u8; 1];
  reader.read_exact(&mut flag)?;
  let is_leaf = match flag[0] {
    0 => false,
    1 => true,
    other => {
      return Err(OctreeError::CorruptFile(format!(
        "invalid leaf flag {} at depth {}",
        other, depth
      )))
    }
  };

  let num_stars = read_i32(reader)?;
  let count = read_i32(reader)?;
  if num_stars < 0 || count < 0 {
    return Err(OctreeError::CorruptFile(format!(
      "negative size at depth {} (num_stars {}, count {})",
      depth, num_stars, count
    )));
  }

  let width = ctx.layout.values_per_star();
  let count = count as usize;
  let stars = count / width;
  if count % width != 0 || stars > ctx.max_stars as usize {
    return Err(OctreeError::CorruptFile(format!(
      "payload of {} floats at depth {} does not fit {} stars of width {}",
      count, depth, ctx.max_stars, width
    )));
  }
  if is_leaf && stars != num_stars as usize {
    return Err(OctreeError::CorruptFile(format!(
      "leaf at depth {} claims {} stars but stores {}",
      depth, num_stars, stars
    )));
  }

  // Grows with the data actually present, not with the declared count.
  let expected_bytes = count as u64 * 4;
  let mut bytes = Vec::new();
  reader.by_ref().take(expected_bytes).read_to_end(&mut bytes)?;
  if (bytes.len() as u64) < expected_bytes {
    return Err(OctreeError::Io(std::io::Error::new(
      ErrorKind::UnexpectedEof,
      format!(
        "payload at depth {} ends after {} of {} bytes",
        depth,
        bytes.len(),
        expected_bytes
      ),
    )));
  }
  let values: Vec<f32> = bytes
    .chunks_exact(4)
    .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    .collect();

  let pos_end = stars * ctx.layout.pos_size;
  let col_end = pos_end + stars * ctx.layout.col_size;
  node.num_stars = num_stars as u32;
  node.pos_data = values[..pos_end].to_vec();
  node.col_data = values[pos_end..col_end].to_vec();
  node.vel_data = values[col_end..].to_vec();

  if !is_leaf {
    if depth >= ctx.max_depth {
      return Err(OctreeError::CorruptFile(format!(
        "inner node at depth {} exceeds depth limit {}",
        depth, ctx.max_depth
      )));
    }
    let children = node.children.insert(OctreeNode::empty_children(&node.bounds));
    for child in children.iter_mut() {
      read_node(reader, ctx, child, depth + 1)?;
    }
  }
  Ok(())
}

#[cfg(test)]
#[path = "io_test.rs"]
mod io_test;
