//! Rebuild thresholds for the slot allocator.
//!
//! Admission hands out the lowest free slot, but evictions leave holes, so
//! the high-water mark drifts upward while occupancy drops. When the buffer
//! looks fragmented (high-water mark far up, most slots free) the next
//! traversal resets the allocator and re-admits every visible node at a
//! compact slot.

/// A ratio of the buffer capacity, evaluated in integer arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fraction {
	/// Numerator.
	pub num: u32,
	/// Denominator (non-zero).
	pub den: u32,
}

impl Fraction {
	/// Create a fraction.
	pub const fn new(num: u32, den: u32) -> Self {
		Self { num, den }
	}

	/// `capacity * num / den`, truncated.
	#[inline]
	pub fn of(&self, capacity: u32) -> u64 {
		capacity as u64 * self.num as u64 / self.den.max(1) as u64
	}
}

/// Thresholds that trigger a defragmenting rebuild.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebuildPolicy {
	/// Rebuild only when the high-water mark exceeds this share of capacity.
	pub high_water: Fraction,
	/// ...and the free list also holds more than this share.
	pub free: Fraction,
}

impl RebuildPolicy {
	/// Default thresholds: high-water above 4/5, free above 5/6.
	pub const DEFAULT: Self = Self {
		high_water: Fraction::new(4, 5),
		free: Fraction::new(5, 6),
	};

	/// Never rebuild.
	pub const NEVER: Self = Self {
		high_water: Fraction::new(1, 1),
		free: Fraction::new(1, 1),
	};

	/// Check if the allocator state warrants a rebuild.
	#[inline]
	pub fn should_rebuild(&self, high_water_mark: u32, free_slots: usize, capacity: u32) -> bool {
		high_water_mark as u64 > self.high_water.of(capacity)
			&& free_slots as u64 > self.free.of(capacity)
	}
}

impl Default for RebuildPolicy {
	fn default() -> Self {
		Self::DEFAULT
	}
}
