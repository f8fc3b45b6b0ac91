//! Optional decomposition of hexahedra into tetrahedra.
//!
//! Every element gets a new node at its centroid. Each of the 6 faces is
//! triangulated and every triangle is joined to the centroid. Faces without
//! hanging nodes split into 2 triangles; faces with hanging nodes build an
//! ordered loop of the 4 corners plus the edge hangers between their
//! masters, 5 to 9 nodes in all, and a face-center hanger (the 9-node case)
//! switches to an 8-triangle fan around the center.
//!
//! Triangulation is deterministic from node ids alone: loops without a
//! center node fan from their lowest id. Two elements sharing a face see the
//! same ids, so both sides triangulate identically and the mesh stays
//! crack-free.

use std::collections::{BTreeMap, HashMap};

use glam::DVec3;
use smallvec::SmallVec;

use crate::extract::{Constraint, Element, NodeId, HEX_FACES};
use crate::material::MaterialId;

/// One tetrahedron, positively oriented (node 3 on the positive side of the
/// plane through nodes 0-2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tet {
  pub nodes: [NodeId; 4],
  pub material: MaterialId,
}

/// Split hexahedra into tetrahedra, honoring hanging-node faces.
///
/// Centroid nodes are appended to `nodes`; ids continue past the current
/// maximum.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
pub fn split_to_tets(
  nodes: &mut BTreeMap<NodeId, DVec3>,
  elements: &[Element],
  constraints: &[Constraint],
) -> Vec<Tet> {
  // Hanging node on an edge, keyed by the sorted master pair; hanging node
  // at a face center, keyed by the sorted corner quad.
  let mut edge_hangers: HashMap<[NodeId; 2], NodeId> = HashMap::new();
  let mut face_hangers: HashMap<[NodeId; 4], NodeId> = HashMap::new();
  for constraint in constraints {
    match constraint.masters.as_slice() {
      &[a, b] => {
        edge_hangers.insert([a, b], constraint.hanging);
      }
      &[a, b, c, d] => {
        face_hangers.insert([a, b, c, d], constraint.hanging);
      }
      _ => {
        // Transitively resolved chains have no face geometry to honor.
      }
    }
  }

  let mut next_id = nodes.keys().next_back().map_or(1, |id| id + 1);
  let mut tets = Vec::with_capacity(elements.len() * 12);

  for element in elements {
    let centroid_pos = element
      .nodes
      .iter()
      .map(|id| nodes[id])
      .fold(DVec3::ZERO, |a, b| a + b)
      / 8.0;
    let centroid = next_id;
    next_id += 1;
    nodes.insert(centroid, centroid_pos);

    for face in &HEX_FACES {
      let corners = face.map(|slot| element.nodes[slot]);

      let mut quad = corners;
      quad.sort_unstable();
      let center = face_hangers.get(&quad).copied();

      // Ordered loop: corners with edge hangers spliced in between their
      // masters.
      let mut ring: SmallVec<[NodeId; 8]> = SmallVec::new();
      for i in 0..4 {
        ring.push(corners[i]);
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        let edge = if a < b { [a, b] } else { [b, a] };
        if let Some(&hanger) = edge_hangers.get(&edge) {
          ring.push(hanger);
        }
      }

      for (a, b, c) in triangulate(&ring, center) {
        tets.push(make_tet(nodes, a, b, c, centroid, element.material));
      }
    }
  }

  log::debug!("split {} elements into {} tetrahedra", elements.len(), tets.len());
  tets
}

/// Triangulate a face ring: fan around the face-center hanger when present,
/// otherwise fan from the lowest node id.
fn triangulate(ring: &[NodeId], center: Option<NodeId>) -> Vec<(NodeId, NodeId, NodeId)> {
  let k = ring.len();
  match center {
    Some(center) => (0..k)
      .map(|i| (center, ring[i], ring[(i + 1) % k]))
      .collect(),
    None => {
      let pivot = ring
        .iter()
        .enumerate()
        .min_by_key(|(_, &id)| id)
        .map(|(i, _)| i)
        .unwrap_or(0);
      (1..k - 1)
        .map(|i| {
          (
            ring[pivot],
            ring[(pivot + i) % k],
            ring[(pivot + i + 1) % k],
          )
        })
        .collect()
    }
  }
}

/// Build a positively oriented tetrahedron from a face triangle and the
/// element centroid.
fn make_tet(
  nodes: &BTreeMap<NodeId, DVec3>,
  a: NodeId,
  b: NodeId,
  c: NodeId,
  apex: NodeId,
  material: MaterialId,
) -> Tet {
  let (pa, pb, pc, pd) = (nodes[&a], nodes[&b], nodes[&c], nodes[&apex]);
  let volume = (pb - pa).cross(pc - pa).dot(pd - pa);
  let nodes = if volume >= 0.0 {
    [a, b, c, apex]
  } else {
    [a, c, b, apex]
  };
  Tet { nodes, material }
}

#[cfg(test)]
#[path = "tet_test.rs"]
mod tet_test;
