//! Periodic boundary classification.
//!
//! Boundary-touching nodes are classified against the 6 planes of the
//! domain bounding box, in priority order vertex > edge > face, with a
//! tolerance of one quarter of the finest cell width per axis. The sets feed
//! an external periodic-equation writer, which also needs the total node
//! count to allocate auxiliary driver node ids.

use std::collections::{BTreeMap, BTreeSet};

use glam::DVec3;

use crate::extract::NodeId;
use crate::grid::CellGrid;

/// Classified boundary node sets.
///
/// Vertex index bits select the max plane per axis (bit 0 = +X, bit 1 = +Y,
/// bit 2 = +Z). Edges are grouped by running axis then by the (min/max)
/// combination of the two pinned axes, in axis order X, Y, Z. Faces come in
/// plane order -X, +X, -Y, +Y, -Z, +Z.
#[derive(Debug, Default)]
pub struct BoundarySets {
  /// 8 domain corners. A slot is None when no node coincides with that
  /// corner (possible only on degenerate configurations).
  pub vertices: [Option<NodeId>; 8],
  /// 12 domain edge sets, excluding the corner nodes.
  pub edges: [Vec<NodeId>; 12],
  /// 6 domain face sets, excluding edge and corner nodes.
  pub faces: [Vec<NodeId>; 6],
  /// Total node count of the mesh, for driver-node allocation downstream.
  pub total_nodes: usize,
}

impl BoundarySets {
  /// Number of classified boundary nodes.
  pub fn classified_count(&self) -> usize {
    self.vertices.iter().flatten().count()
      + self.edges.iter().map(Vec::len).sum::<usize>()
      + self.faces.iter().map(Vec::len).sum::<usize>()
  }
}

/// Classify the flagged boundary nodes of a mesh.
pub fn locate_boundaries(
  nodes: &BTreeMap<NodeId, DVec3>,
  boundary_nodes: &BTreeSet<NodeId>,
  grid: &CellGrid,
  finest_level: u32,
) -> BoundarySets {
  let tol = grid.cell_size(finest_level) * 0.25;
  let min = grid.domain.min;
  let max = grid.domain.max;

  let mut sets = BoundarySets {
    total_nodes: nodes.len(),
    ..Default::default()
  };

  for &id in boundary_nodes {
    let pos = nodes[&id];

    // Per axis: Some(false) on the min plane, Some(true) on the max plane.
    let mut planes = [None; 3];
    for axis in 0..3 {
      if (pos[axis] - min[axis]).abs() <= tol[axis] {
        planes[axis] = Some(false);
      } else if (pos[axis] - max[axis]).abs() <= tol[axis] {
        planes[axis] = Some(true);
      }
    }

    let pinned = planes.iter().flatten().count();
    match pinned {
      3 => {
        let idx = planes
          .iter()
          .enumerate()
          .fold(0usize, |acc, (axis, p)| acc | (usize::from(p == &Some(true)) << axis));
        sets.vertices[idx] = Some(id);
      }
      2 => {
        // The free axis is the one the edge runs along.
        let run_axis = planes.iter().position(Option::is_none).unwrap();
        let mut combo = 0;
        let mut bit = 0;
        for axis in 0..3 {
          if axis == run_axis {
            continue;
          }
          if planes[axis] == Some(true) {
            combo |= 1 << bit;
          }
          bit += 1;
        }
        sets.edges[run_axis * 4 + combo].push(id);
      }
      1 => {
        let axis = planes.iter().position(Option::is_some).unwrap();
        let side = usize::from(planes[axis] == Some(true));
        sets.faces[axis * 2 + side].push(id);
      }
      _ => {
        // Flagged during traversal but outside every plane tolerance;
        // nothing to classify.
        log::debug!("boundary-flagged node {id} matched no domain plane");
      }
    }
  }

  sets
}

#[cfg(test)]
#[path = "boundary_test.rs"]
mod boundary_test;
