//! SlotAllocator - free list over the output buffer's chunk slots.
//!
//! Released slots are never reusable immediately. They wait in a pending set
//! until [`SlotAllocator::reclaim_pending`] runs at the start of the next
//! frame, so a consumer still reading last frame's chunk at that slot never
//! sees it overwritten.
//!
//! ```text
//!   frame N                         frame N+1
//!   ───────                         ─────────
//!   acquire() ◄── free stack ◄───── reclaim_pending()
//!   release() ──► pending set ──────┘
//! ```

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{OctreeError, Result};

/// Index of a fixed-size chunk in the output buffer.
pub type Slot = u32;

/// Bounded free list with one-frame-delayed reclamation.
#[derive(Clone, Debug, Default)]
pub struct SlotAllocator {
  /// Immediately available slots; the top is handed out next.
  free: Vec<Slot>,
  /// Slots released this frame, reusable after the next reclaim.
  pending: BTreeSet<Slot>,
  /// Total number of slots.
  capacity: u32,
  /// One past the highest slot handed out since the last reset.
  high_water_mark: u32,
}

impl SlotAllocator {
  /// Create an allocator with every slot in `[0, capacity)` free.
  pub fn new(capacity: u32) -> Self {
    let mut allocator = Self::default();
    allocator.initialize(capacity);
    allocator
  }

  /// Reset to a full free stack `[capacity-1 .. 0]` (0 on top) and drop any
  /// pending releases.
  pub fn initialize(&mut self, capacity: u32) {
    self.free.clear();
    self.free.extend((0..capacity).rev());
    self.pending.clear();
    self.capacity = capacity;
    self.high_water_mark = 0;
    debug!(capacity, "slot allocator initialized");
  }

  /// Take the next free slot.
  ///
  /// Fails when every slot is taken or pending: the buffer is undersized.
  pub fn acquire(&mut self) -> Result<Slot> {
    let slot = self.free.pop().ok_or(OctreeError::SlotsExhausted {
      capacity: self.capacity,
    })?;
    self.high_water_mark = self.high_water_mark.max(slot + 1);
    Ok(slot)
  }

  /// Stage a slot for reuse after the next [`reclaim_pending`].
  ///
  /// [`reclaim_pending`]: SlotAllocator::reclaim_pending
  pub fn release(&mut self, slot: Slot) {
    debug_assert!(slot < self.capacity, "slot {} out of range", slot);
    let newly_pending = self.pending.insert(slot);
    debug_assert!(newly_pending, "slot {} released twice", slot);
  }

  /// Move every pending slot onto the free stack.
  ///
  /// Slots are pushed highest first, so the high-water mark can shrink past
  /// a run of consecutive released slots at the top.
  pub fn reclaim_pending(&mut self) -> usize {
    let reclaimed = self.pending.len();
    for &slot in self.pending.iter().rev() {
      if slot + 1 == self.high_water_mark {
        self.high_water_mark = slot;
      }
      self.free.push(slot);
    }
    self.pending.clear();
    reclaimed
  }

  /// One past the highest slot handed out and not yet reclaimed from the top.
  #[inline]
  pub fn high_water_mark(&self) -> u32 {
    self.high_water_mark
  }

  /// Total number of slots.
  #[inline]
  pub fn capacity(&self) -> u32 {
    self.capacity
  }

  /// Slots available to `acquire` right now.
  #[inline]
  pub fn free_count(&self) -> usize {
    self.free.len()
  }

  /// Slots released this frame.
  #[inline]
  pub fn pending_count(&self) -> usize {
    self.pending.len()
  }

  /// Check if a slot is waiting for reclamation.
  #[inline]
  pub fn is_pending(&self, slot: Slot) -> bool {
    self.pending.contains(&slot)
  }

  /// Slots currently handed out.
  #[inline]
  pub fn in_use(&self) -> usize {
    self.capacity as usize - self.free.len() - self.pending.len()
  }
}

#[cfg(test)]
#[path = "slots_test.rs"]
mod slots_test;
