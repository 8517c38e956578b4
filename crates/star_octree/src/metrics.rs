//! Traversal statistics for the star octree.
//!
//! Feature-gated and runtime-toggled so recording costs nothing when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use star_octree::metrics::COLLECT_METRICS;
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! let update = octree.traverse(&oracle, &view_projection, screen_size, option)?;
//! println!("avg traversal: {:.1} us", octree.metrics().avg_traversal_us());
//! ```

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;

use crate::octree::FrameUpdate;
use crate::slots::SlotAllocator;

/// Runtime toggle for metrics collection.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
    #[cfg(feature = "metrics")]
    {
        COLLECT_METRICS.load(Ordering::Relaxed)
    }
    #[cfg(not(feature = "metrics"))]
    {
        false
    }
}

/// Rolling window for storing recent values (e.g., timing history).
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// Create a new rolling window with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new value, evicting the oldest if at capacity.
    pub fn push(&mut self, value: T) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl RollingWindow<u64> {
    pub fn sum(&self) -> u64 {
        self.buffer.iter().sum()
    }

    /// Compute the average of all values.
    pub fn average(&self) -> f64 {
        if self.buffer.is_empty() {
            0.0
        } else {
            self.sum() as f64 / self.buffer.len() as f64
        }
    }
}

impl Default for RollingWindow<u64> {
    fn default() -> Self {
        Self::new(128) // ~2 seconds at 60fps
    }
}

/// Per-octree traversal statistics.
#[derive(Debug, Clone, Default)]
pub struct OctreeMetrics {
    /// Rolling window of traversal times in microseconds.
    pub traversal_timings: RollingWindow<u64>,

    // Last frame snapshot
    /// Last traversal time in microseconds.
    pub last_traversal_us: u64,
    /// Slots given a new chunk in the last frame.
    pub last_slots_written: u32,
    /// Slots cleared (empty payload) in the last frame.
    pub last_slots_cleared: u32,
    /// Slots held by resident nodes after the last frame.
    pub resident_slots: u32,
    /// Allocator high-water mark after the last frame.
    pub high_water_mark: u32,

    // Cumulative
    /// Traversals recorded.
    pub frames: u64,
    /// Traversals that reset the allocator.
    pub rebuilds: u64,
}

impl OctreeMetrics {
    /// Record one traversal's outcome.
    pub fn record_traversal(&mut self, update: &FrameUpdate, elapsed_us: u64, slots: &SlotAllocator) {
        if !is_enabled() {
            return;
        }

        self.traversal_timings.push(elapsed_us);
        self.last_traversal_us = elapsed_us;

        let cleared = update.slots.values().filter(|chunk| chunk.is_empty()).count() as u32;
        self.last_slots_cleared = cleared;
        self.last_slots_written = update.slots.len() as u32 - cleared;
        self.resident_slots = slots.in_use() as u32;
        self.high_water_mark = slots.high_water_mark();

        self.frames += 1;
        if update.rebuilt {
            self.rebuilds += 1;
        }
    }

    /// Get average traversal timing in microseconds.
    pub fn avg_traversal_us(&self) -> f64 {
        self.traversal_timings.average()
    }
}
