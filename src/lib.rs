//! cellmesh - adaptive octree meshing of material-heterogeneous unit cells.
//!
//! Generates a conforming volumetric mesh of a unit cell (a textile embedded
//! in matrix) by adaptively refining an octree according to local material
//! boundaries, resolving hanging nodes into linear constraint equations,
//! classifying boundary nodes for periodic replication, and optionally
//! extracting duplicated-node interface surfaces between materials and
//! smoothing them.
//!
//! # Pipeline
//!
//! - **Octree refinement**: composable policies split cells at material
//!   boundaries; a 2:1 balance invariant is enforced after every pass
//! - **Extraction**: leaves become hex elements; hanging corners become
//!   constraint equations over 2 or 4 master nodes
//! - **Boundary classification**: 8 vertex / 12 edge / 6 face periodic sets
//! - **Interfaces**: nodes shared by several materials are duplicated per
//!   side and per-material surface sets are derived
//! - **Smoothing**: constrained Laplacian/Taubin relaxation of interface
//!   nodes
//! - **Tetrahedra** (optional): hexes split into tets, honoring hanging
//!   faces
//!
//! # Example
//!
//! ```
//! use cellmesh::{Aabb3, AdaptiveMesher, MaterialClassifier, MesherConfig};
//! use glam::DVec3;
//!
//! struct Sphere;
//!
//! impl MaterialClassifier for Sphere {
//!   fn classify(&self, points: &[DVec3]) -> Vec<u8> {
//!     points
//!       .iter()
//!       .map(|p| u8::from((*p - DVec3::splat(0.5)).length() < 0.3))
//!       .collect()
//!   }
//! }
//!
//! let config = MesherConfig::default().with_voxels(2, 2, 2).with_levels(1, 3);
//! let mesher = AdaptiveMesher::new(config, Aabb3::unit())?;
//! let mesh = mesher.generate(&Sphere)?;
//! assert!(!mesh.elements.is_empty());
//! # Ok::<(), cellmesh::MeshError>(())
//! ```

pub mod boundary;
pub mod config;
pub mod error;
pub mod extract;
pub mod grid;
pub mod interface;
pub mod material;
pub mod mesher;
pub mod octree;
pub mod smooth;
pub mod tet;

// Re-export commonly used items
pub use boundary::BoundarySets;
pub use config::{BoundaryKind, ElementKind, MesherConfig, SmoothParams};
pub use error::{MeshError, Result};
pub use extract::{Constraint, Element, ElementId, NodeId};
pub use grid::CellGrid;
pub use interface::InterfaceSet;
pub use material::{MaterialClassifier, MaterialId};
pub use mesher::{AdaptiveMesher, MeshOutput, MeshStats};
pub use octree::{Aabb3, OctreeLeaves, OctreeNode};
pub use tet::Tet;
