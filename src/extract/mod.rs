//! Node and element extraction from the balanced octree.
//!
//! Walks the leaves in a deterministic order, assigns conforming node ids on
//! first visit, resolves hanging corners into constraints, builds hex
//! elements in the solver corner convention and accumulates the adjacency
//! used later for smoothing.
//!
//! # Module Structure
//!
//! - [`corner`]: finest-grid corner keys, hanging decode, hex tables
//! - [`constraint`]: hanging-node constraints and the deduplicating resolver
//! - [`nodes`]: the extraction driver

pub mod constraint;
pub mod corner;
pub mod nodes;

use crate::material::MaterialId;

/// Node identifier. Conforming ids are 1-based; hanging ids start past the
/// finest-grid point capacity; duplicate and centroid ids follow on from the
/// highest id in use.
pub type NodeId = u64;

/// Element identifier: index into the element list.
pub type ElementId = u32;

/// One hexahedron in the solver corner convention (bottom face
/// counterclockwise, then top face), tagged with the material classified at
/// its centroid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Element {
  pub nodes: [NodeId; 8],
  pub material: MaterialId,
}

// Re-exports
pub use constraint::{Constraint, ConstraintResolver};
pub use corner::{
  classify_corner, enforce_independent_masters, CornerKey, CornerStatus, HEX_FACES, HEX_FROM_GRID,
};
pub use nodes::{extract_mesh, ExtractedMesh};
