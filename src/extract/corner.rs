//! Corner bookkeeping: finest-grid keys, hanging-corner decode and the
//! solver hex corner convention.
//!
//! A corner of a leaf is identified by its finest-grid key (its grid
//! coordinates at the finest level present in the forest). The key doubles
//! as the "local numbering" id during extraction: the same geometric point
//! reached from different leaves produces the same key.
//!
//! Hanging status is decoded from the key's parity at the leaf's own level.
//! A corner with odd coordinates on one axis sits on an edge midpoint of the
//! one-coarser grid; odd on two axes, on a face midpoint. It actually hangs
//! only if a coarser leaf exposes that edge or face, which is what the
//! candidate probe below checks.

use smallvec::SmallVec;

use crate::grid::CellGrid;
use crate::octree::{OctreeLeaves, OctreeNode};

/// Finest-grid corner key.
pub type CornerKey = [i32; 3];

/// Grid corner index (octant bit layout) for each slot of the solver hex
/// convention: bottom face counterclockwise, then top face.
pub const HEX_FROM_GRID: [usize; 8] = [0, 1, 3, 2, 4, 5, 7, 6];

/// Local faces of a hex element as slots into the solver corner convention,
/// each cycle ordered around the face.
///
/// Face order: -Z, +Z, -Y, +X, +Y, -X.
pub const HEX_FACES: [[usize; 4]; 6] = [
  [0, 3, 2, 1],
  [4, 5, 6, 7],
  [0, 1, 5, 4],
  [1, 2, 6, 5],
  [2, 3, 7, 6],
  [3, 0, 4, 7],
];

/// Outcome of decoding one leaf corner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CornerStatus {
  /// A regular grid point; gets a conforming id on first visit.
  Conforming,
  /// A hanging corner; interpolated from the given master corner keys
  /// (2 for an edge midpoint, 4 for a face midpoint).
  Hanging { masters: SmallVec<[CornerKey; 4]> },
}

/// Decode the hanging status of corner `corner` of `node`.
pub fn classify_corner(
  node: &OctreeNode,
  corner: usize,
  leaves: &OctreeLeaves,
  grid: &CellGrid,
  finest_level: u32,
) -> CornerStatus {
  if node.level == 0 {
    return CornerStatus::Conforming;
  }

  let c = node.corner_coords(corner);
  let odd = [c[0] & 1 == 1, c[1] & 1 == 1, c[2] & 1 == 1];
  let n_odd = odd.iter().filter(|&&o| o).count();

  // Even parity on all axes: the point exists on the one-coarser grid, so
  // no level-(l-1) cell can expose it mid-feature. Odd on all three would
  // put it strictly inside a coarser cell's volume, impossible for a leaf
  // corner since leaves are disjoint.
  if n_odd == 0 || n_odd == 3 {
    return CornerStatus::Conforming;
  }

  if !coarse_leaf_touches(&c, &odd, node.level - 1, leaves, grid) {
    return CornerStatus::Conforming;
  }

  let shift = finest_level - node.level;
  let key_of = |p: [i32; 3]| -> CornerKey { [p[0] << shift, p[1] << shift, p[2] << shift] };

  let mut masters: SmallVec<[CornerKey; 4]> = SmallVec::new();
  match n_odd {
    1 => {
      // Edge midpoint: masters are the edge endpoints.
      let axis = odd.iter().position(|&o| o).unwrap();
      for delta in [-1, 1] {
        let mut m = c;
        m[axis] += delta;
        masters.push(key_of(m));
      }
    }
    _ => {
      // Face midpoint: masters are the four face corners.
      let a = odd.iter().position(|&o| o).unwrap();
      let b = odd.iter().rposition(|&o| o).unwrap();
      for da in [-1, 1] {
        for db in [-1, 1] {
          let mut m = c;
          m[a] += da;
          m[b] += db;
          masters.push(key_of(m));
        }
      }
    }
  }

  CornerStatus::Hanging { masters }
}

/// Check whether any coarse leaf at `coarse_level` has the point `c` (given
/// at level `coarse_level + 1`) on its boundary.
fn coarse_leaf_touches(
  c: &[i32; 3],
  odd: &[bool; 3],
  coarse_level: u32,
  leaves: &OctreeLeaves,
  grid: &CellGrid,
) -> bool {
  !coarse_leaves_exposing(c, odd, coarse_level, leaves, grid).is_empty()
}

/// The coarse leaves at `coarse_level` that have the point `c` (given at
/// level `coarse_level + 1`) on their boundary.
///
/// Candidate cells: along odd axes the covering index is fixed at
/// `(c - 1) / 2`; along even axes the point lies on a grid line with a cell
/// on either side.
fn coarse_leaves_exposing(
  c: &[i32; 3],
  odd: &[bool; 3],
  coarse_level: u32,
  leaves: &OctreeLeaves,
  grid: &CellGrid,
) -> SmallVec<[OctreeNode; 4]> {
  let mut choices: [SmallVec<[i32; 2]>; 3] = Default::default();
  for axis in 0..3 {
    if odd[axis] {
      choices[axis].push((c[axis] - 1) >> 1);
    } else {
      choices[axis].push((c[axis] >> 1) - 1);
      choices[axis].push(c[axis] >> 1);
    }
  }

  let mut exposing = SmallVec::new();
  for &x in &choices[0] {
    for &y in &choices[1] {
      for &z in &choices[2] {
        if !grid.in_range(x, y, z, coarse_level) {
          continue;
        }
        let cell = OctreeNode::new(x, y, z, coarse_level);
        if leaves.contains(&cell) {
          exposing.push(cell);
        }
      }
    }
  }
  exposing
}

/// Classify every distinct corner key of the given leaves.
///
/// A grid point can be a corner of leaves at two adjacent levels, and only
/// the coarsest visit can detect a hang (finer visits see even parity), so
/// a Hanging verdict overrides a Conforming one from another visit.
pub fn classify_all_corners(
  sorted: &[OctreeNode],
  leaves: &OctreeLeaves,
  grid: &CellGrid,
  finest_level: u32,
) -> std::collections::HashMap<CornerKey, CornerStatus> {
  let mut status = std::collections::HashMap::new();
  for leaf in sorted {
    for corner in 0..8 {
      let key = leaf.corner_key(corner, finest_level);
      match status.get(&key) {
        Some(CornerStatus::Hanging { .. }) => continue,
        Some(CornerStatus::Conforming) if leaf.corner_coords(corner).iter().all(|c| c & 1 == 0) => {
          // Even parity cannot flip the verdict; skip the reclassification.
          continue;
        }
        _ => {}
      }
      let state = classify_corner(leaf, corner, leaves, grid, finest_level);
      if matches!(state, CornerStatus::Hanging { .. }) || !status.contains_key(&key) {
        status.insert(key, state);
      }
    }
  }
  status
}

/// Refine away hanging corners whose masters are themselves hanging.
///
/// A 26-neighbor balanced forest still admits chained constraints in one
/// configuration: the far endpoint of a hanging edge can hang on a yet
/// coarser leaf that no fine cell touches. Splitting that coarser leaf (and
/// rebalancing) turns the master into a regular grid point, so the
/// constraint resolver only ever sees conforming masters. Returns the number
/// of splits, including rebalancing.
pub fn enforce_independent_masters(leaves: &mut OctreeLeaves, grid: &CellGrid) -> usize {
  let mut splits = 0;

  loop {
    let finest = leaves.finest_level();
    let sorted = leaves.sorted();
    let status = classify_all_corners(&sorted, leaves, grid, finest);

    // Keys that serve as a master of some hanging corner.
    let mut master_keys: std::collections::HashSet<CornerKey> = std::collections::HashSet::new();
    for state in status.values() {
      if let CornerStatus::Hanging { masters } = state {
        master_keys.extend(masters.iter().copied());
      }
    }

    // A chained master hangs itself: split every coarse leaf exposing it.
    let mut to_split: std::collections::HashSet<OctreeNode> = std::collections::HashSet::new();
    for leaf in &sorted {
      if leaf.level == 0 {
        continue;
      }
      for corner in 0..8 {
        let key = leaf.corner_key(corner, finest);
        if !master_keys.contains(&key) {
          continue;
        }
        if !matches!(status.get(&key), Some(CornerStatus::Hanging { .. })) {
          continue;
        }
        let c = leaf.corner_coords(corner);
        let odd = [c[0] & 1 == 1, c[1] & 1 == 1, c[2] & 1 == 1];
        let n_odd = odd.iter().filter(|&&o| o).count();
        // Only the odd-parity visit sees the exposing coarse leaves; finer
        // leaves sharing the key observe even parity at their own level.
        if n_odd == 0 || n_odd == 3 {
          continue;
        }
        for cell in coarse_leaves_exposing(&c, &odd, leaf.level - 1, leaves, grid) {
          to_split.insert(cell);
        }
      }
    }

    if to_split.is_empty() {
      return splits;
    }
    log::debug!("splitting {} leaves to break constraint chains", to_split.len());
    for cell in to_split {
      if leaves.split(&cell) {
        splits += 1;
      }
    }
    splits += crate::octree::enforce_balance(leaves, grid);
  }
}

#[cfg(test)]
#[path = "corner_test.rs"]
mod corner_test;
