//! 2:1 balance enforcement.
//!
//! After every refinement pass, adjacent leaves may differ by more than one
//! level. Balancing splits the coarser side until no two adjacent leaves
//! differ by more than one. Adjacency here is the full 26-cell neighborhood
//! (faces, edges and corners); balancing over faces alone would satisfy the
//! mesh invariant but can leave hanging nodes whose interpolation masters
//! are themselves hanging, which the constraint resolver would then have to
//! chase through.

use std::collections::HashSet;

use super::{OctreeLeaves, OctreeNode};
use crate::grid::CellGrid;

/// Offsets for the 26 neighbors of a cell at its own level.
const NEIGHBOR_OFFSETS: [(i32, i32, i32); 26] = {
  let mut offsets = [(0, 0, 0); 26];
  let mut i = 0;
  let mut dx = -1;
  while dx <= 1 {
    let mut dy = -1;
    while dy <= 1 {
      let mut dz = -1;
      while dz <= 1 {
        if dx != 0 || dy != 0 || dz != 0 {
          offsets[i] = (dx, dy, dz);
          i += 1;
        }
        dz += 1;
      }
      dy += 1;
    }
    dx += 1;
  }
  offsets
};

/// Find the coarse leaf covering the neighbor position, if it violates the
/// 2:1 invariant against `node`.
///
/// The neighbor position is taken at `node`'s own level; ancestors at levels
/// `node.level - 2` and coarser are checked. At most one ancestor can be a
/// leaf, so scan order does not matter.
fn violating_neighbor(
  node: &OctreeNode,
  offset: (i32, i32, i32),
  leaves: &OctreeLeaves,
  grid: &CellGrid,
) -> Option<OctreeNode> {
  if node.level < 2 {
    return None;
  }
  let (nx, ny, nz) = (node.x + offset.0, node.y + offset.1, node.z + offset.2);
  if !grid.in_range(nx, ny, nz, node.level) {
    return None;
  }
  let probe = OctreeNode::new(nx, ny, nz, node.level);
  for level in (0..=node.level - 2).rev() {
    // ancestor_at never fails here: level < node.level
    let ancestor = probe.ancestor_at(level)?;
    if leaves.contains(&ancestor) {
      return Some(ancestor);
    }
  }
  None
}

/// Enforce the 2:1 invariant over the 26-neighborhood, splitting coarse
/// leaves until a fixed point is reached.
///
/// Returns the number of splits performed.
pub fn enforce_balance(leaves: &mut OctreeLeaves, grid: &CellGrid) -> usize {
  let mut splits = 0;

  loop {
    let mut to_split: HashSet<OctreeNode> = HashSet::new();

    for node in leaves.iter() {
      for offset in NEIGHBOR_OFFSETS {
        if let Some(coarse) = violating_neighbor(node, offset, leaves, grid) {
          to_split.insert(coarse);
        }
      }
    }

    if to_split.is_empty() {
      return splits;
    }

    for cell in to_split {
      if leaves.split(&cell) {
        splits += 1;
      }
    }
  }
}

/// Check the face-adjacent 2:1 invariant (the mesh-level guarantee).
///
/// Used by tests and debug assertions; `enforce_balance` establishes a
/// stronger property, so this must hold afterwards.
pub fn is_face_balanced(leaves: &OctreeLeaves, grid: &CellGrid) -> bool {
  const FACE_OFFSETS: [(i32, i32, i32); 6] = [
    (-1, 0, 0),
    (1, 0, 0),
    (0, -1, 0),
    (0, 1, 0),
    (0, 0, -1),
    (0, 0, 1),
  ];

  for node in leaves.iter() {
    if node.level < 2 {
      continue;
    }
    for offset in FACE_OFFSETS {
      let (nx, ny, nz) = (node.x + offset.0, node.y + offset.1, node.z + offset.2);
      if !grid.in_range(nx, ny, nz, node.level) {
        continue;
      }
      let probe = OctreeNode::new(nx, ny, nz, node.level);
      for level in (0..=node.level - 2).rev() {
        let Some(ancestor) = probe.ancestor_at(level) else {
          break;
        };
        if leaves.contains(&ancestor) {
          return false;
        }
      }
    }
  }
  true
}

#[cfg(test)]
#[path = "balance_test.rs"]
mod balance_test;
