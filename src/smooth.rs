//! Constrained Laplacian relaxation of interface nodes.
//!
//! Operates only on interface nodes, with each node's stencil restricted to
//! interface neighbors before smoothing starts. Two coefficients alternate
//! by iteration parity: equal coefficients give plain Laplacian smoothing, a
//! negative second coefficient gives Taubin shrink/unshrink behavior.
//!
//! Nodes whose original position lies on a domain bounding plane are pinned
//! on that axis. A quality guard rejects any update that would move a node
//! more than the finest cell diagonal in total, or more than half the finest
//! cell width along any axis, measured from the original position.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use glam::DVec3;

use crate::config::SmoothParams;
use crate::extract::NodeId;
use crate::grid::CellGrid;

/// Outcome counters for one smoothing run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SmoothStats {
  /// Interface nodes with a non-empty restricted stencil.
  pub active_nodes: usize,
  /// Updates applied across all iterations.
  pub accepted: usize,
  /// Updates reverted by the quality guard.
  pub rejected: usize,
}

/// Relax interface nodes in place.
///
/// `neighbors` is the geometric adjacency accumulated during extraction;
/// `duplicates` maps duplicate ids to their originals so both sides of a
/// duplicated interface move together and stay coincident.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
pub fn smooth_interfaces(
  nodes: &mut BTreeMap<NodeId, DVec3>,
  interface_nodes: &BTreeSet<NodeId>,
  neighbors: &HashMap<NodeId, Vec<NodeId>>,
  duplicates: &BTreeMap<NodeId, NodeId>,
  grid: &CellGrid,
  finest_level: u32,
  params: &SmoothParams,
) -> SmoothStats {
  let mut stats = SmoothStats::default();
  if !params.enabled || params.iterations == 0 {
    return stats;
  }

  let finest_size = grid.cell_size(finest_level);
  let plane_tol = finest_size * 0.25;
  let max_axis = finest_size * 0.5;
  let max_total = finest_size.length();

  // Restrict every stencil to interface nodes up front.
  let stencils: BTreeMap<NodeId, Vec<NodeId>> = interface_nodes
    .iter()
    .filter_map(|&id| {
      let restricted: Vec<NodeId> = neighbors
        .get(&id)?
        .iter()
        .copied()
        .filter(|n| interface_nodes.contains(n))
        .collect();
      (!restricted.is_empty()).then_some((id, restricted))
    })
    .collect();
  stats.active_nodes = stencils.len();

  // Original positions drive pinning and the cumulative guard.
  let originals: BTreeMap<NodeId, DVec3> = stencils
    .keys()
    .map(|&id| (id, nodes[&id]))
    .collect();

  let min = grid.domain.min;
  let max = grid.domain.max;

  for iteration in 0..params.iterations {
    let coef = if iteration % 2 == 0 {
      params.lambda
    } else {
      params.mu
    };

    // Compute all updates against this iteration's snapshot, then apply.
    let mut updates: Vec<(NodeId, DVec3)> = Vec::with_capacity(stencils.len());
    for (&id, stencil) in &stencils {
      let pos = nodes[&id];
      let centroid = stencil
        .iter()
        .map(|n| nodes[n])
        .fold(DVec3::ZERO, |a, b| a + b)
        / stencil.len() as f64;

      let mut displacement = (centroid - pos) * coef;

      let original = originals[&id];
      for axis in 0..3 {
        let on_plane = (original[axis] - min[axis]).abs() <= plane_tol[axis]
          || (original[axis] - max[axis]).abs() <= plane_tol[axis];
        if on_plane {
          displacement[axis] = 0.0;
        }
      }

      let new_pos = pos + displacement;
      let total = new_pos - original;
      let out_of_bounds = total.length() > max_total
        || (0..3).any(|axis| total[axis].abs() > max_axis[axis]);
      if out_of_bounds {
        stats.rejected += 1;
        continue;
      }

      stats.accepted += 1;
      updates.push((id, new_pos));
    }

    for (id, pos) in updates {
      nodes.insert(id, pos);
    }
  }

  // Keep duplicated interface copies coincident with their originals.
  for (&dup, orig) in duplicates {
    if let Some(&pos) = nodes.get(orig) {
      nodes.insert(dup, pos);
    }
  }

  log::debug!(
    "smoothing: {} active nodes, {} accepted, {} rejected updates",
    stats.active_nodes,
    stats.accepted,
    stats.rejected
  );

  stats
}

#[cfg(test)]
#[path = "smooth_test.rs"]
mod smooth_test;
