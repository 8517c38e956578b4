//! Raw star files: little-endian `i32 values_per_star`, then
//! `values_per_star` f32 values per star until end of file.

use anyhow::{Context, Result};
use std::io::{ErrorKind, Read};

/// Streaming reader over a raw star file.
pub struct RawStarReader<R> {
	reader: R,
	bytes: Vec<u8>,
	star: Vec<f32>,
}

impl<R: Read> RawStarReader<R> {
	/// Read the header, which must declare `expected` values per star.
	pub fn new(mut reader: R, expected: usize) -> Result<Self> {
		let mut header = [0u8; 4];
		reader
			.read_exact(&mut header)
			.context("Raw star file is missing its header")?;
		let declared = i32::from_le_bytes(header);
		if declared < 3 {
			anyhow::bail!("Raw star file declares {} values per star", declared);
		}
		if declared as usize != expected {
			anyhow::bail!(
				"Raw star file has {} values per star, layout expects {}",
				declared,
				expected
			);
		}

		Ok(Self {
			reader,
			bytes: vec![0; expected * 4],
			star: vec![0.0; expected],
		})
	}

	/// Next star, or `None` at a clean end of file.
	pub fn next_star(&mut self) -> Result<Option<&[f32]>> {
		let mut filled = 0;
		while filled < self.bytes.len() {
			match self.reader.read(&mut self.bytes[filled..]) {
				Ok(0) => break,
				Ok(n) => filled += n,
				Err(e) if e.kind() == ErrorKind::Interrupted => continue,
				Err(e) => return Err(e).context("Failed to read raw star data"),
			}
		}

		if filled == 0 {
			return Ok(None);
		}
		if filled < self.bytes.len() {
			anyhow::bail!(
				"Raw star file ends inside a star ({} of {} bytes)",
				filled,
				self.bytes.len()
			);
		}

		for (value, b) in self.star.iter_mut().zip(self.bytes.chunks_exact(4)) {
			*value = f32::from_le_bytes([b[0], b[1], b[2], b[3]]);
		}
		Ok(Some(self.star.as_slice()))
	}
}

/// Encode stars in the raw format.
#[cfg(test)]
pub fn encode(values_per_star: i32, data: &[f32]) -> Vec<u8> {
	let mut bytes = values_per_star.to_le_bytes().to_vec();
	for value in data {
		bytes.extend_from_slice(&value.to_le_bytes());
	}
	bytes
}
