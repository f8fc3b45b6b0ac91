use super::*;

#[test]
fn test_child_octant_layout() {
  let parent = OctreeNode::new(1, 2, 3, 2);

  let c0 = parent.child(0);
  assert_eq!((c0.x, c0.y, c0.z, c0.level), (2, 4, 6, 3));

  let c7 = parent.child(7);
  assert_eq!((c7.x, c7.y, c7.z, c7.level), (3, 5, 7, 3));

  // bit 1 is the Y offset
  let c2 = parent.child(2);
  assert_eq!((c2.x, c2.y, c2.z), (2, 5, 6));
}

#[test]
fn test_parent_inverts_child() {
  let node = OctreeNode::new(3, 1, 0, 4);
  for octant in 0..8u8 {
    assert_eq!(node.child(octant).parent(), Some(node));
  }
}

#[test]
fn test_parent_at_base_grid_is_none() {
  assert_eq!(OctreeNode::new(0, 0, 0, 0).parent(), None);
}

#[test]
fn test_ancestor_at() {
  let node = OctreeNode::new(13, 6, 1, 3);
  assert_eq!(node.ancestor_at(3), Some(node));
  assert_eq!(node.ancestor_at(1), Some(OctreeNode::new(3, 1, 0, 1)));
  assert_eq!(node.ancestor_at(0), Some(OctreeNode::new(1, 0, 0, 0)));
  assert_eq!(node.ancestor_at(4), None);
}

#[test]
fn test_corner_coords_bit_layout() {
  let node = OctreeNode::new(2, 3, 4, 2);
  assert_eq!(node.corner_coords(0), [2, 3, 4]);
  assert_eq!(node.corner_coords(1), [3, 3, 4]);
  assert_eq!(node.corner_coords(2), [2, 4, 4]);
  assert_eq!(node.corner_coords(4), [2, 3, 5]);
  assert_eq!(node.corner_coords(7), [3, 4, 5]);
}

#[test]
fn test_corner_key_is_level_invariant() {
  // The shared corner between a coarse cell and its child maps to the same
  // finest-grid key.
  let coarse = OctreeNode::new(1, 1, 1, 1);
  let child = coarse.child(0);
  assert_eq!(coarse.corner_key(0, 3), child.corner_key(0, 3));
  // Corner 7 of child 7 is corner 7 of the parent.
  assert_eq!(coarse.corner_key(7, 3), coarse.child(7).corner_key(7, 3));
}
