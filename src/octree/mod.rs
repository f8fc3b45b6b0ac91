//! Octree construction for adaptive unit-cell refinement.
//!
//! The octree is implicit: leaves define the tree structure, stored as a set
//! of [`OctreeNode`] values; parent/child relationships are computed on
//! demand via coordinate math. Level 0 is the base voxel grid, higher levels
//! are finer.
//!
//! # Module Structure
//!
//! - [`node`]: `OctreeNode` - immutable value type for octree positions
//! - [`bounds`]: `Aabb3` - the domain bounding box
//! - [`leaves`]: `OctreeLeaves` - implicit tree as a leaf set
//! - [`refine`]: refinement policies and the pass driver
//! - [`balance`]: 2:1 balance enforcement

pub mod balance;
pub mod bounds;
pub mod leaves;
pub mod node;
pub mod refine;

// Re-exports
pub use balance::{enforce_balance, is_face_balanced};
pub use bounds::Aabb3;
pub use leaves::OctreeLeaves;
pub use node::OctreeNode;
pub use refine::{
  refine_pass, HeterogeneityPolicy, ProbePolicy, RefineContext, RefinementPolicy, UniformPolicy,
};
