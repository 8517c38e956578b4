use glam::Vec3;

use super::*;
use crate::octree::NodeBounds;
use crate::test_utils::{build, random_stars, small_config, star};
use crate::types::RenderOption;

/// The 9-star fixture: one star at each child origin of octant 0, plus a
/// second star in child 3.
fn octant_zero_fixture() -> Vec<[f32; 8]> {
  let octant = NodeBounds::domain(10.0).child(0);
  let mut stars: Vec<[f32; 8]> = (0..8)
    .map(|k| {
      let p = octant.child(k).origin;
      star(p.x, p.y, p.z)
    })
    .collect();
  let p = octant.child(3).origin + Vec3::splat(0.5);
  stars.push(star(p.x, p.y, p.z));
  stars
}

fn leaves(octree: &StarOctree) -> Vec<&OctreeNode> {
  fn collect<'a>(node: &'a OctreeNode, out: &mut Vec<&'a OctreeNode>) {
    match node.children.as_deref() {
      None => out.push(node),
      Some(children) => children.iter().for_each(|c| collect(c, out)),
    }
  }
  let mut out = Vec::new();
  for octant in octree.octants() {
    collect(octant, &mut out);
  }
  out
}

fn leaf_holds(node: &OctreeNode, s: &[f32; 8]) -> bool {
  let layout = StarLayout::default();
  (0..node.payload_stars(&layout)).any(|i| {
    node.pos_data[i * 3..i * 3 + 3] == s[0..3]
      && node.col_data[i * 2..i * 2 + 2] == s[3..5]
      && node.vel_data[i * 3..i * 3 + 3] == s[5..8]
  })
}

fn assert_counts_cumulative(node: &OctreeNode) {
  if let Some(children) = node.children.as_deref() {
    let sum: u32 = children.iter().map(|c| c.num_stars).sum();
    assert_eq!(node.num_stars, sum, "Inner node at {:?} miscounts", node.bounds);
    children.iter().for_each(assert_counts_cumulative);
  } else {
    assert_eq!(node.num_stars as usize, node.payload_stars(&StarLayout::default()));
  }
}

// =========================================================================
// Construction
// =========================================================================

#[test]
fn test_new_tree_has_eight_empty_octants() {
  let octree = StarOctree::new(OctreeConfig::default(), StarLayout::default()).unwrap();
  assert_eq!(octree.octants().len(), 8);
  assert!(octree.is_empty());
  assert_eq!(octree.stats().num_leaf_nodes, 8);
  assert_eq!(octree.stats().num_inner_nodes, 0);
  for (i, octant) in octree.octants().iter().enumerate() {
    assert!(octant.is_leaf());
    assert_eq!(octant.num_stars, 0);
    assert_eq!(octant.bounds, NodeBounds::domain(10.0).child(i));
  }
}

#[test]
fn test_new_rejects_invalid_config() {
  let config = OctreeConfig {
    max_stars_per_node: 0,
    ..OctreeConfig::default()
  };
  assert!(StarOctree::new(config, StarLayout::default()).is_err());
}

#[test]
fn test_insert_into_octant_leaf() {
  let mut octree = StarOctree::new(OctreeConfig::default(), StarLayout::default()).unwrap();
  octree.insert(&star(-1.0, 2.0, -3.0)).unwrap();

  let octant = &octree.octants()[5];
  assert_eq!(octant.num_stars, 1);
  assert_eq!(octant.pos_data, vec![-1.0, 2.0, -3.0]);
  assert_eq!(octree.stats().total_depth, 1);
  assert_eq!(octree.num_stars(), 1);
}

// =========================================================================
// Subdivision
// =========================================================================

/// 9 stars against a capacity of 8: one split, the other octants untouched.
#[test]
fn test_subdivision_exactly_at_overflow() {
  let stars = octant_zero_fixture();
  let mut octree = build(small_config(8), &stars[..8]);
  assert!(octree.octants()[0].is_leaf());
  assert_eq!(octree.octants()[0].num_stars, 8);

  octree.insert(&stars[8]).unwrap();

  let octant = &octree.octants()[0];
  assert!(!octant.is_leaf());
  assert_eq!(octant.num_stars, 9);
  let children = octant.children.as_deref().unwrap();
  let sum: u32 = children.iter().map(|c| c.num_stars).sum();
  assert_eq!(sum, 9);
  assert_eq!(children[3].num_stars, 2);
  assert!(children.iter().all(|c| c.is_leaf()));

  for other in &octree.octants()[1..] {
    assert!(other.is_leaf());
    assert_eq!(other.num_stars, 0);
  }

  let stats = octree.stats();
  assert_eq!(stats.subdivisions, 1);
  assert_eq!(stats.num_inner_nodes, 1);
  assert_eq!(stats.num_leaf_nodes, 15);
  assert_eq!(stats.total_depth, 2);
}

/// Closely spaced stars cascade through several splits in one insertion.
#[test]
fn test_cascading_subdivision() {
  let stars = [
    star(1.0, 1.0, 1.0),
    star(1.001, 1.0, 1.0),
    star(1.002, 1.0, 1.0),
  ];
  let octree = build(small_config(2), &stars);

  assert!(octree.stats().total_depth > 5);
  assert!(octree.stats().subdivisions > 4);
  let stored: u32 = leaves(&octree).iter().map(|l| l.num_stars).sum();
  assert_eq!(stored, 3);
  for s in &stars {
    assert_eq!(leaves(&octree).iter().filter(|l| leaf_holds(l, s)).count(), 1);
  }
}

/// Every star lands in exactly one leaf, and that leaf contains it.
#[test]
fn test_every_star_in_exactly_one_containing_leaf() {
  let stars = random_stars(7, 1500, 9.9);
  let octree = build(small_config(16), &stars);
  let all_leaves = leaves(&octree);

  for s in &stars {
    let holders: Vec<_> = all_leaves.iter().filter(|l| leaf_holds(l, s)).collect();
    assert_eq!(holders.len(), 1, "Star {:?} stored {} times", s, holders.len());
    assert!(holders[0].bounds.contains_point(Vec3::from_slice(&s[..3])));
  }

  for octant in octree.octants() {
    assert_counts_cumulative(octant);
  }
  assert_eq!(octree.num_stars(), 1500);
}

/// Maintained stats agree with a full recount.
#[test]
fn test_stats_match_recount() {
  let mut octree = build(small_config(16), &random_stars(11, 800, 9.0));
  let maintained = *octree.stats();
  octree.recompute_stats();
  assert_eq!(*octree.stats(), maintained);
  assert_eq!(maintained.num_leaf_nodes, 8 + 7 * maintained.subdivisions as usize);
}

// =========================================================================
// LOD caches
// =========================================================================

/// The rebuilt cache starts with the node origin and keeps only stars far
/// enough from the previously admitted one, up to capacity.
#[test]
fn test_lod_cache_built_on_subdivision() {
  let octree = build(small_config(8), &octant_zero_fixture());
  let octant = &octree.octants()[0];
  let layout = StarLayout::default();

  assert_eq!(octant.payload_stars(&layout), 8);
  assert_eq!(&octant.pos_data[..3], &[5.0, 5.0, 5.0]);
  assert_eq!(&octant.col_data[..2], &[0.0, 0.0]);
  // Child origins 0..=6 follow the seed; child 7 no longer fits.
  let child6 = NodeBounds::domain(10.0).child(0).child(6).origin;
  assert_eq!(octant.star_position(&layout, 7), child6);
}

#[test]
fn test_no_lod_cache_at_shallow_depth() {
  let config = OctreeConfig {
    max_stars_per_node: 8,
    ..OctreeConfig::default()
  };
  let octree = build(config, &octant_zero_fixture());
  let octant = &octree.octants()[0];
  assert!(!octant.is_leaf());
  assert!(octant.pos_data.is_empty());
  assert!(octant.col_data.is_empty());
  assert!(octant.vel_data.is_empty());
}

/// Stars passing through an inner node are offered to its cache.
#[test]
fn test_lod_admission_on_insert_path() {
  let stars = [
    star(4.0, 4.0, 4.0),
    star(6.0, 6.0, 6.0),
    star(4.0, 6.0, 4.0),
    star(6.0, 4.0, 6.0),
    star(4.5, 4.5, 4.5),
  ];
  let mut octree = build(small_config(4), &stars);
  // Everything sits within 2.5 of the seed.
  assert_eq!(octree.octants()[0].pos_data, vec![5.0, 5.0, 5.0]);

  octree.insert(&star(9.0, 9.0, 9.0)).unwrap();
  let octant = &octree.octants()[0];
  assert_eq!(octant.pos_data, vec![5.0, 5.0, 5.0, 9.0, 9.0, 9.0]);
  assert_eq!(octant.num_stars, 6);
  assert_eq!(octant.children.as_deref().unwrap()[0].num_stars, 2);
}

// =========================================================================
// Rejections
// =========================================================================

#[test]
fn test_sample_width_rejected() {
  let mut octree = StarOctree::new(OctreeConfig::default(), StarLayout::default()).unwrap();
  let err = octree.insert(&[1.0; 5]).unwrap_err();
  assert!(
    matches!(err, OctreeError::SampleWidth { expected: 8, found: 5 }),
    "Expected SampleWidth, got {:?}",
    err
  );
  assert!(octree.is_empty());
}

/// Identical positions can never be separated: refuse instead of recursing.
#[test]
fn test_depth_limit_on_identical_positions() {
  let config = OctreeConfig {
    max_depth: 6,
    ..small_config(4)
  };
  let mut octree = build(config, &[star(1.0, 2.0, 3.0); 4]);

  let err = octree.insert(&star(1.0, 2.0, 3.0)).unwrap_err();
  assert!(
    matches!(err, OctreeError::DepthLimit { depth: 6 }),
    "Expected DepthLimit, got {:?}",
    err
  );

  // Nothing changed.
  assert_eq!(octree.num_stars(), 4);
  assert_eq!(octree.stats().subdivisions, 0);
  assert!(octree.octants()[0].is_leaf());
  assert_eq!(octree.octants()[0].num_stars, 4);

  // A distinguishable star is still accepted.
  octree.insert(&star(9.0, 9.0, 9.0)).unwrap();
  assert_eq!(octree.num_stars(), 5);
}

/// Close stars separate only after a cascade down to depth 7: the split
/// chain is replayed level by level against the depth limit.
#[test]
fn test_depth_limit_at_cascade_bottom() {
  let stars = [star(1.0, 1.0, 1.0), star(1.1, 1.1, 1.1)];
  let deep_enough = OctreeConfig {
    max_depth: 7,
    ..small_config(2)
  };
  let mut octree = build(deep_enough, &stars);
  octree.insert(&star(1.05, 1.05, 1.05)).unwrap();
  assert_eq!(octree.num_stars(), 3);
  assert_eq!(octree.stats().total_depth, 7);
  assert_eq!(octree.stats().subdivisions, 6);

  let too_shallow = OctreeConfig {
    max_depth: 6,
    ..small_config(2)
  };
  let mut octree = build(too_shallow, &stars);
  let err = octree.insert(&star(1.05, 1.05, 1.05)).unwrap_err();
  assert!(matches!(err, OctreeError::DepthLimit { depth: 6 }), "Got {:?}", err);
  assert_eq!(octree.num_stars(), 2);
  assert_eq!(octree.stats().subdivisions, 0);
}

#[test]
fn test_depth_limit_default_config() {
  let mut octree = build(small_config(2), &[star(-3.0, -3.0, -3.0); 2]);
  let err = octree.insert(&star(-3.0, -3.0, -3.0)).unwrap_err();
  assert!(matches!(err, OctreeError::DepthLimit { depth: 32 }));
}

#[test]
fn test_insert_all() {
  let mut octree = StarOctree::new(small_config(4), StarLayout::default()).unwrap();
  let flat: Vec<f32> = random_stars(3, 10, 5.0).concat();
  octree.insert_all(&flat).unwrap();
  assert_eq!(octree.num_stars(), 10);

  assert!(octree.insert_all(&flat[..12]).is_err());
  assert_eq!(octree.num_stars(), 10);
}

// =========================================================================
// Inspection
// =========================================================================

#[test]
fn test_describe() {
  let config = OctreeConfig {
    max_stars_per_node: 8,
    ..OctreeConfig::default()
  };
  let octree = build(config, &octant_zero_fixture());
  let text = octree.describe();
  let lines: Vec<&str> = text.lines().collect();

  assert_eq!(lines.len(), 16);
  assert_eq!(lines[0], "{0} : 9 LOD: 0 - [Parent]");
  assert_eq!(lines[1], "  {0->0} : 1 - [Leaf]");
  assert_eq!(lines[4], "  {0->3} : 2 - [Leaf]");
  assert_eq!(lines[9], "{1} : 0 - [Leaf]");
}

#[test]
fn test_all_data_covers_every_leaf() {
  let octree = build(small_config(4), &[star(1.0, 1.0, 1.0), star(-1.0, -1.0, -1.0)]);

  let data = octree.all_data(RenderOption::Static);
  assert_eq!(data.len(), 8 * 3 * 4);
  assert_eq!(&data[..3], &[1.0, 1.0, 1.0]);
  assert!(data[12..84].iter().all(|v| *v == 0.0));
  assert_eq!(&data[84..87], &[-1.0, -1.0, -1.0]);

  assert_eq!(octree.all_data(RenderOption::Motion).len(), octree.chunk_len(RenderOption::Motion) * 8);
}
