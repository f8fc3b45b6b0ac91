//! Extraction driver: leaves in, nodes/elements/constraints/adjacency out.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use glam::DVec3;
use smallvec::SmallVec;

use super::constraint::{Constraint, ConstraintResolver};
use super::corner::{classify_all_corners, CornerKey, CornerStatus, HEX_FROM_GRID};
use super::{Element, ElementId, NodeId};
use crate::error::{MeshError, Result};
use crate::octree::{OctreeLeaves, RefineContext};

/// Maximum depth when chasing a hanging master to conforming nodes. Chains
/// deeper than this indicate a broken forest.
const MAX_MASTER_CHAIN: usize = 4;

/// Everything extraction produces, handed on to the boundary locator,
/// interface builder and smoother.
pub struct ExtractedMesh {
  /// Node id to position, conforming and hanging nodes both.
  pub nodes: BTreeMap<NodeId, DVec3>,
  /// Hex elements in the solver corner convention.
  pub elements: Vec<Element>,
  /// Hanging-node constraint equations.
  pub constraints: Vec<Constraint>,
  /// Nodes lying on the domain boundary (within a quarter of the finest
  /// cell width), flagged during traversal.
  pub boundary_nodes: BTreeSet<NodeId>,
  /// Node to element adjacency, finest-level leaves only.
  pub node_elements: HashMap<NodeId, Vec<ElementId>>,
  /// Node to geometric-neighbor adjacency (3 axis neighbors per corner),
  /// finest-level leaves only. Used by the smoother.
  pub node_neighbors: HashMap<NodeId, Vec<NodeId>>,
  /// Finest refinement level present in the forest.
  pub finest_level: u32,
  /// Number of conforming nodes assigned.
  pub conforming_count: usize,
  /// Number of distinct hanging nodes assigned.
  pub hanging_count: usize,
}

impl ExtractedMesh {
  /// Total number of nodes in the table.
  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }
}

/// Walk the balanced forest and build the mesh entities.
///
/// Leaves are visited in finest-grid min-corner order, so node numbering is
/// deterministic for a given forest.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
pub fn extract_mesh(leaves: &OctreeLeaves, ctx: &mut RefineContext<'_>) -> Result<ExtractedMesh> {
  let grid = ctx.grid;
  let finest = leaves.finest_level();
  let sorted = leaves.sorted();
  let finest_size = grid.cell_size(finest);
  let boundary_tol = finest_size * 0.25;
  let coincident_tol = finest_size.min_element() * 1e-6;

  // Pass 1: decode the status of every distinct corner key.
  let status = classify_all_corners(&sorted, leaves, grid, finest);

  // Pass 2: conforming ids on first visit, in traversal order.
  let mut ids: HashMap<CornerKey, NodeId> = HashMap::new();
  let mut nodes: BTreeMap<NodeId, DVec3> = BTreeMap::new();
  let mut boundary_nodes: BTreeSet<NodeId> = BTreeSet::new();
  let mut next_id: NodeId = 1;

  for leaf in &sorted {
    for corner in 0..8 {
      let key = leaf.corner_key(corner, finest);
      if status[&key] != CornerStatus::Conforming || ids.contains_key(&key) {
        continue;
      }
      let id = next_id;
      next_id += 1;
      ids.insert(key, id);
      let pos = grid.key_pos(key, finest);
      nodes.insert(id, pos);
      if on_domain_boundary(pos, grid, boundary_tol) {
        boundary_nodes.insert(id);
      }
    }
  }
  let conforming_count = ids.len();

  // Pass 3: elements, constraints and adjacency.
  let mut resolver = ConstraintResolver::new(grid.point_capacity(finest) + 1, coincident_tol);
  let mut elements: Vec<Element> = Vec::with_capacity(sorted.len());
  let mut node_elements: HashMap<NodeId, Vec<ElementId>> = HashMap::new();
  let mut node_neighbors: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

  for leaf in &sorted {
    let mut grid_ids = [0 as NodeId; 8];
    for corner in 0..8 {
      let key = leaf.corner_key(corner, finest);
      grid_ids[corner] = match &status[&key] {
        CornerStatus::Conforming => ids[&key],
        CornerStatus::Hanging { masters } => {
          let mut master_ids: SmallVec<[NodeId; 4]> = SmallVec::new();
          for master in masters {
            collect_conforming_ids(*master, &status, &ids, 0, &mut master_ids)?;
          }
          let pos = grid.key_pos(key, finest);
          let id = resolver.resolve(&master_ids, pos)?;
          if !nodes.contains_key(&id) {
            nodes.insert(id, pos);
            if on_domain_boundary(pos, grid, boundary_tol) {
              boundary_nodes.insert(id);
            }
          }
          id
        }
      };
    }

    let element_id = elements.len() as ElementId;
    let mut element_nodes = [0 as NodeId; 8];
    for (slot, &grid_corner) in HEX_FROM_GRID.iter().enumerate() {
      element_nodes[slot] = grid_ids[grid_corner];
    }
    let material = ctx
      .cache
      .classify_point(ctx.classifier, grid.node_center(leaf));
    elements.push(Element {
      nodes: element_nodes,
      material,
    });

    // Adjacency only at the final refinement level.
    if leaf.level == finest {
      for corner in 0..8 {
        let id = grid_ids[corner];
        node_elements.entry(id).or_default().push(element_id);
        let neighbors = node_neighbors.entry(id).or_default();
        for axis_bit in [1usize, 2, 4] {
          neighbors.push(grid_ids[corner ^ axis_bit]);
        }
      }
    }
  }

  // Neighbor lists accumulate one entry per incident element; collapse them.
  for neighbors in node_neighbors.values_mut() {
    neighbors.sort_unstable();
    neighbors.dedup();
  }

  let hanging_count = resolver.len();
  let (constraints, _) = resolver.into_parts();

  log::debug!(
    "extracted {} conforming + {} hanging nodes, {} elements, {} constraints",
    conforming_count,
    hanging_count,
    elements.len(),
    constraints.len()
  );

  Ok(ExtractedMesh {
    nodes,
    elements,
    constraints,
    boundary_nodes,
    node_elements,
    node_neighbors,
    finest_level: finest,
    conforming_count,
    hanging_count,
  })
}

/// Resolve a master corner key to conforming node ids, chasing hanging
/// masters transitively.
fn collect_conforming_ids(
  key: CornerKey,
  status: &HashMap<CornerKey, CornerStatus>,
  ids: &HashMap<CornerKey, NodeId>,
  depth: usize,
  out: &mut SmallVec<[NodeId; 4]>,
) -> Result<()> {
  if depth > MAX_MASTER_CHAIN {
    return Err(MeshError::UnresolvedMaster { key });
  }
  match status.get(&key) {
    Some(CornerStatus::Conforming) => {
      let id = ids.get(&key).ok_or(MeshError::UnresolvedMaster { key })?;
      out.push(*id);
      Ok(())
    }
    Some(CornerStatus::Hanging { masters }) => {
      if depth == 0 {
        log::warn!("hanging master {key:?}; resolving through its own masters");
      }
      for master in masters.clone() {
        collect_conforming_ids(master, status, ids, depth + 1, out)?;
      }
      Ok(())
    }
    None => Err(MeshError::UnresolvedMaster { key }),
  }
}

fn on_domain_boundary(pos: DVec3, grid: &crate::grid::CellGrid, tol: DVec3) -> bool {
  let min = grid.domain.min;
  let max = grid.domain.max;
  (0..3).any(|axis| {
    (pos[axis] - min[axis]).abs() <= tol[axis] || (pos[axis] - max[axis]).abs() <= tol[axis]
  })
}

#[cfg(test)]
#[path = "nodes_test.rs"]
mod nodes_test;
