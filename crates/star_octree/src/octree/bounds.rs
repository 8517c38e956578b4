//! Cubic node bounds and the sign-based octant convention.

use glam::{DVec3, Vec3};

/// Cubic bounding volume of one octree node.
///
/// Octant `i` of a node lies on the negative side of the origin along x when
/// bit 0 is set, along y when bit 1 is set and along z when bit 2 is set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeBounds {
	/// Center of the cube.
	pub origin: Vec3,
	/// Half of the cube's edge length.
	pub half_dimension: f32,
}

impl NodeBounds {
	/// Create bounds from center and half dimension.
	pub fn new(origin: Vec3, half_dimension: f32) -> Self {
		debug_assert!(half_dimension > 0.0, "half dimension must be positive");
		Self {
			origin,
			half_dimension,
		}
	}

	/// Bounds of the whole domain `[-max_dist, max_dist]³`.
	pub fn domain(max_dist: f32) -> Self {
		Self::new(Vec3::ZERO, max_dist)
	}

	/// Octant of `pos` relative to this node's origin.
	#[inline]
	pub fn child_index(&self, pos: Vec3) -> usize {
		let mut index = 0;
		if pos.x < self.origin.x {
			index |= 1;
		}
		if pos.y < self.origin.y {
			index |= 2;
		}
		if pos.z < self.origin.z {
			index |= 4;
		}
		index
	}

	/// Bounds of the child in `octant`.
	#[inline]
	pub fn child(&self, octant: usize) -> Self {
		let half = self.half_dimension / 2.0;
		Self {
			origin: self.origin + octant_sign(octant) * half,
			half_dimension: half,
		}
	}

	/// The 8 corners, ordered by the octant convention.
	pub fn corners(&self) -> [Vec3; 8] {
		std::array::from_fn(|i| self.origin + octant_sign(i) * self.half_dimension)
	}

	/// Corners in double precision, multiplied by `scale`.
	pub fn world_corners(&self, scale: f64) -> [DVec3; 8] {
		self.corners().map(|c| c.as_dvec3() * scale)
	}

	/// Check if the cube contains a point (boundary inclusive).
	#[inline]
	pub fn contains_point(&self, pos: Vec3) -> bool {
		let d = (pos - self.origin).abs();
		d.x <= self.half_dimension && d.y <= self.half_dimension && d.z <= self.half_dimension
	}
}

/// Unit offset direction of an octant: `+1` on clear bits, `-1` on set bits.
#[inline]
fn octant_sign(octant: usize) -> Vec3 {
	let axis = |bit: usize| if octant & bit == 0 { 1.0 } else { -1.0 };
	Vec3::new(axis(1), axis(2), axis(4))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_child_index_all_positive_is_zero() {
		let bounds = NodeBounds::domain(10.0);
		assert_eq!(bounds.child_index(Vec3::new(1.0, 2.0, 3.0)), 0);
	}

	#[test]
	fn test_child_index_all_negative_is_seven() {
		let bounds = NodeBounds::domain(10.0);
		assert_eq!(bounds.child_index(Vec3::new(-1.0, -2.0, -3.0)), 7);
	}

	#[test]
	fn test_child_index_bits() {
		let bounds = NodeBounds::domain(10.0);
		assert_eq!(bounds.child_index(Vec3::new(-1.0, 1.0, 1.0)), 1);
		assert_eq!(bounds.child_index(Vec3::new(1.0, -1.0, 1.0)), 2);
		assert_eq!(bounds.child_index(Vec3::new(1.0, 1.0, -1.0)), 4);
	}

	/// A point on the origin plane goes to the non-negative side.
	#[test]
	fn test_child_index_on_origin() {
		let bounds = NodeBounds::domain(10.0);
		assert_eq!(bounds.child_index(Vec3::ZERO), 0);
	}

	/// Each child's own origin maps back to that child's octant.
	#[test]
	fn test_child_origin_matches_child_index() {
		let parent = NodeBounds::new(Vec3::new(2.5, -2.5, 2.5), 2.5);
		for octant in 0..8 {
			let child = parent.child(octant);
			assert_eq!(child.half_dimension, 1.25);
			assert_eq!(
				parent.child_index(child.origin),
				octant,
				"Octant {} origin {:?} maps elsewhere",
				octant,
				child.origin
			);
			assert!(parent.contains_point(child.origin));
		}
	}

	#[test]
	fn test_corners_ordered_by_octant() {
		let bounds = NodeBounds::new(Vec3::ZERO, 1.0);
		let corners = bounds.corners();
		assert_eq!(corners[0], Vec3::new(1.0, 1.0, 1.0));
		assert_eq!(corners[7], Vec3::new(-1.0, -1.0, -1.0));
		assert_eq!(corners[3], Vec3::new(-1.0, -1.0, 1.0));
	}

	#[test]
	fn test_world_corners_scaled() {
		let bounds = NodeBounds::new(Vec3::new(1.0, 0.0, 0.0), 1.0);
		let corners = bounds.world_corners(1000.0);
		assert_eq!(corners[0], DVec3::new(2000.0, 1000.0, 1000.0));
		assert_eq!(corners[1], DVec3::new(0.0, 1000.0, 1000.0));
	}

	#[test]
	fn test_contains_point() {
		let bounds = NodeBounds::new(Vec3::ZERO, 1.0);
		assert!(bounds.contains_point(Vec3::splat(0.5)));
		assert!(bounds.contains_point(Vec3::splat(1.0)));
		assert!(!bounds.contains_point(Vec3::new(1.1, 0.0, 0.0)));
	}
}
