//! CellGrid - world coordinate mapping for the octree over the domain.
//!
//! The domain bounding box is divided into a base grid of `voxels` cells per
//! axis; octree level `l` subdivides each base cell `2^l` times. All world
//! positions handed to the classifier or written into the node table come
//! from this mapping.

use glam::DVec3;

use crate::octree::{Aabb3, OctreeNode};

/// Coordinate mapping between octree cells and world space.
#[derive(Clone, Debug)]
pub struct CellGrid {
  /// Domain bounding box.
  pub domain: Aabb3,
  /// Base voxel counts per axis.
  pub voxels: [u32; 3],
}

impl CellGrid {
  pub fn new(domain: Aabb3, voxels: [u32; 3]) -> Self {
    Self { domain, voxels }
  }

  /// Number of cells per axis at the given level.
  #[inline]
  pub fn cells_at(&self, level: u32) -> [i32; 3] {
    [
      (self.voxels[0] << level) as i32,
      (self.voxels[1] << level) as i32,
      (self.voxels[2] << level) as i32,
    ]
  }

  /// Check whether cell coordinates are inside the grid at `level`.
  #[inline]
  pub fn in_range(&self, x: i32, y: i32, z: i32, level: u32) -> bool {
    let n = self.cells_at(level);
    x >= 0 && y >= 0 && z >= 0 && x < n[0] && y < n[1] && z < n[2]
  }

  /// Cell size at the given level.
  #[inline]
  pub fn cell_size(&self, level: u32) -> DVec3 {
    let n = self.cells_at(level);
    self.domain.size() / DVec3::new(n[0] as f64, n[1] as f64, n[2] as f64)
  }

  /// World-space minimum corner of a cell.
  #[inline]
  pub fn node_min(&self, node: &OctreeNode) -> DVec3 {
    let size = self.cell_size(node.level);
    self.domain.min + size * DVec3::new(node.x as f64, node.y as f64, node.z as f64)
  }

  /// World-space center of a cell.
  #[inline]
  pub fn node_center(&self, node: &OctreeNode) -> DVec3 {
    self.node_min(node) + self.cell_size(node.level) * 0.5
  }

  /// World position of cell corner `corner` (0-7, octant bit layout).
  #[inline]
  pub fn corner_pos(&self, node: &OctreeNode, corner: usize) -> DVec3 {
    let c = node.corner_coords(corner);
    let size = self.cell_size(node.level);
    self.domain.min + size * DVec3::new(c[0] as f64, c[1] as f64, c[2] as f64)
  }

  /// World position of a finest-grid key.
  #[inline]
  pub fn key_pos(&self, key: [i32; 3], finest_level: u32) -> DVec3 {
    let size = self.cell_size(finest_level);
    self.domain.min + size * DVec3::new(key[0] as f64, key[1] as f64, key[2] as f64)
  }

  /// Whether a cell touches any of the 6 domain boundary planes.
  pub fn touches_boundary(&self, node: &OctreeNode) -> bool {
    let n = self.cells_at(node.level);
    node.x == 0
      || node.y == 0
      || node.z == 0
      || node.x + 1 == n[0]
      || node.y + 1 == n[1]
      || node.z + 1 == n[2]
  }

  /// Total number of grid points at the given level, the capacity of the
  /// conforming id range. Hanging ids start past this.
  pub fn point_capacity(&self, level: u32) -> u64 {
    let n = self.cells_at(level);
    (n[0] as u64 + 1) * (n[1] as u64 + 1) * (n[2] as u64 + 1)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn grid() -> CellGrid {
    CellGrid::new(
      Aabb3::new(DVec3::ZERO, DVec3::new(2.0, 4.0, 8.0)),
      [2, 2, 2],
    )
  }

  #[test]
  fn test_cell_size_halves_per_level() {
    let g = grid();
    assert_eq!(g.cell_size(0), DVec3::new(1.0, 2.0, 4.0));
    assert_eq!(g.cell_size(2), DVec3::new(0.25, 0.5, 1.0));
  }

  #[test]
  fn test_node_min_and_center() {
    let g = grid();
    let node = OctreeNode::new(1, 0, 1, 1);
    assert_eq!(g.node_min(&node), DVec3::new(0.5, 0.0, 2.0));
    assert_eq!(g.node_center(&node), DVec3::new(0.75, 0.5, 3.0));
  }

  #[test]
  fn test_corner_matches_key_position() {
    let g = grid();
    let node = OctreeNode::new(1, 2, 3, 2);
    for corner in 0..8 {
      let direct = g.corner_pos(&node, corner);
      let via_key = g.key_pos(node.corner_key(corner, 4), 4);
      assert!((direct - via_key).length() < 1e-12);
    }
  }

  #[test]
  fn test_touches_boundary() {
    let g = grid();
    assert!(g.touches_boundary(&OctreeNode::new(0, 1, 1, 1)));
    assert!(g.touches_boundary(&OctreeNode::new(3, 1, 1, 1)));
    assert!(!g.touches_boundary(&OctreeNode::new(1, 1, 1, 1)));
    assert!(!g.touches_boundary(&OctreeNode::new(2, 2, 2, 2)));
  }

  #[test]
  fn test_point_capacity() {
    let g = grid();
    // 5^3 grid points at level 1
    assert_eq!(g.point_capacity(1), 125);
  }
}
