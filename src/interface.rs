//! Interface extraction: duplicated-node surfaces between materials.
//!
//! A node shared by elements of more than one material is split so each
//! side of the interface can carry an independent displacement field. The
//! minimum material index touching the node keeps the original; every other
//! material gets one duplicate, in first-seen order, and that material's
//! elements are rewritten to reference the duplicate. Per material the
//! builder also collects the surface node set and the (element, local face)
//! pairs bounding that material.
//!
//! Running the builder again on an already-duplicated mesh is a no-op: the
//! original then only touches the minimum material's elements, and each
//! duplicate touches exactly one material.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use glam::DVec3;

use crate::extract::{Element, ElementId, NodeId, HEX_FACES};
use crate::material::MaterialId;

/// Surface description of one material against all others.
#[derive(Debug, Default, Clone)]
pub struct InterfaceSet {
  /// Surface node ids, sorted and deduplicated.
  pub nodes: Vec<NodeId>,
  /// (element id, local face id) pairs bounding the material.
  pub faces: Vec<(ElementId, u8)>,
}

/// Result of interface extraction.
#[derive(Debug, Default)]
pub struct InterfaceOutput {
  /// Per-material surface sets.
  pub sets: BTreeMap<MaterialId, InterfaceSet>,
  /// Duplicate node id to the original it was copied from.
  pub duplicates: BTreeMap<NodeId, NodeId>,
  /// The original (kept) interface nodes; the smoother's working set.
  pub interface_nodes: BTreeSet<NodeId>,
}

impl InterfaceOutput {
  /// Number of duplicate nodes created.
  pub fn duplicate_count(&self) -> usize {
    self.duplicates.len()
  }
}

/// Duplicate multi-material nodes and derive per-material surface sets.
///
/// `nodes` and `elements` are rewritten in place.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
pub fn build_interfaces(
  nodes: &mut BTreeMap<NodeId, DVec3>,
  elements: &mut Vec<Element>,
) -> InterfaceOutput {
  // Materials per node, in first-seen element order.
  let mut node_materials: HashMap<NodeId, Vec<MaterialId>> = HashMap::new();
  for element in elements.iter() {
    for id in element.nodes {
      let materials = node_materials.entry(id).or_default();
      if !materials.contains(&element.material) {
        materials.push(element.material);
      }
    }
  }

  let mut output = InterfaceOutput::default();
  let mut next_id = nodes.keys().next_back().map_or(1, |id| id + 1);
  // (original node, material) -> replacement id for that material's elements.
  let mut replacement: HashMap<(NodeId, MaterialId), NodeId> = HashMap::new();

  // Iterate nodes in id order for deterministic duplicate numbering.
  let mut shared: Vec<(NodeId, Vec<MaterialId>)> = node_materials
    .iter()
    .filter(|(_, materials)| materials.len() > 1)
    .map(|(&id, materials)| (id, materials.clone()))
    .collect();
  shared.sort_by_key(|(id, _)| *id);

  for (id, materials) in shared {
    let Some(&keeper) = materials.iter().min() else {
      continue;
    };
    output.interface_nodes.insert(id);
    output
      .sets
      .entry(keeper)
      .or_default()
      .nodes
      .push(id);

    for &material in materials.iter().filter(|&&m| m != keeper) {
      let dup = next_id;
      next_id += 1;
      nodes.insert(dup, nodes[&id]);
      replacement.insert((id, material), dup);
      output.duplicates.insert(dup, id);
      output.sets.entry(material).or_default().nodes.push(dup);
    }
  }

  // Rewrite connectivity of the non-minimal materials.
  for element in elements.iter_mut() {
    for node in element.nodes.iter_mut() {
      if let Some(&dup) = replacement.get(&(*node, element.material)) {
        *node = dup;
      }
    }
  }

  collect_surface_faces(elements, &output.duplicates, &mut output.sets);

  for set in output.sets.values_mut() {
    set.nodes.sort_unstable();
    set.nodes.dedup();
  }

  log::debug!(
    "interface extraction: {} interface nodes, {} duplicates, {} materials",
    output.interface_nodes.len(),
    output.duplicates.len(),
    output.sets.len()
  );

  output
}

/// Collect, per material, the element faces bounding it.
///
/// A face qualifies when all 4 corners are in the material's surface node
/// set and a majority vote over the elements sharing those corners (matched
/// through the original ids, so both sides of a duplicated interface count
/// as coincident) confirms the opposite side is a different material.
fn collect_surface_faces(
  elements: &[Element],
  duplicates: &BTreeMap<NodeId, NodeId>,
  sets: &mut BTreeMap<MaterialId, InterfaceSet>,
) {
  let canonical = |id: NodeId| duplicates.get(&id).copied().unwrap_or(id);

  // Original-id adjacency across the whole mesh.
  let mut node_elements: HashMap<NodeId, Vec<usize>> = HashMap::new();
  for (index, element) in elements.iter().enumerate() {
    for id in element.nodes {
      let entry = node_elements.entry(canonical(id)).or_default();
      if entry.last() != Some(&index) {
        entry.push(index);
      }
    }
  }

  let surface_lookup: BTreeMap<MaterialId, BTreeSet<NodeId>> = sets
    .iter()
    .map(|(&m, set)| (m, set.nodes.iter().copied().collect()))
    .collect();

  for (index, element) in elements.iter().enumerate() {
    let Some(surface) = surface_lookup.get(&element.material) else {
      continue;
    };

    for (face_id, face) in HEX_FACES.iter().enumerate() {
      let corners = face.map(|slot| element.nodes[slot]);
      if !corners.iter().all(|id| surface.contains(id)) {
        continue;
      }

      // Majority vote over the elements sharing all 4 corners.
      let seed = &node_elements[&canonical(corners[0])];
      let mut same = 0usize;
      let mut different = 0usize;
      for &other in seed {
        if other == index {
          continue;
        }
        let other_element = &elements[other];
        let shares_all = corners.iter().all(|&c| {
          let want = canonical(c);
          other_element.nodes.iter().any(|&n| canonical(n) == want)
        });
        if !shares_all {
          continue;
        }
        if other_element.material == element.material {
          same += 1;
        } else {
          different += 1;
        }
      }

      if different > same {
        if let Some(set) = sets.get_mut(&element.material) {
          set.faces.push((index as ElementId, face_id as u8));
        }
      }
    }
  }
}

#[cfg(test)]
#[path = "interface_test.rs"]
mod interface_test;
