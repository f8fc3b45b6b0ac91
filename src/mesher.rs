//! AdaptiveMesher - the meshing run driver.
//!
//! Sequences the phases of one run: uniform refinement, heterogeneity
//! refinement, probe passes (each followed by 2:1 balancing), extraction,
//! boundary classification, interface extraction, smoothing and the
//! optional tetrahedral split. A run is an atomic batch computation;
//! results are only available once the whole pipeline completes.

use std::collections::BTreeMap;

use glam::DVec3;

use crate::boundary::{locate_boundaries, BoundarySets};
use crate::config::{BoundaryKind, ElementKind, MesherConfig};
use crate::error::{MeshError, Result};
use crate::extract::{enforce_independent_masters, extract_mesh, Constraint, Element, NodeId};
use crate::grid::CellGrid;
use crate::interface::{build_interfaces, InterfaceSet};
use crate::material::{MaterialClassifier, MaterialId};
use crate::octree::{
  enforce_balance, refine_pass, Aabb3, HeterogeneityPolicy, OctreeLeaves, ProbePolicy,
  RefineContext, UniformPolicy,
};
use crate::smooth::smooth_interfaces;
use crate::tet::{split_to_tets, Tet};

/// Counters describing one meshing run.
#[derive(Debug, Default, Clone)]
pub struct MeshStats {
  /// Splits performed by the uniform pass.
  pub uniform_splits: usize,
  /// Splits performed by the heterogeneity pass.
  pub heterogeneity_splits: usize,
  /// Splits performed across all probe passes.
  pub probe_splits: usize,
  /// Splits performed by balance enforcement.
  pub balance_splits: usize,
  /// Leaf count per level after refinement.
  pub leaves_per_level: Vec<usize>,
  /// Finest level present after refinement.
  pub finest_level: u32,
  /// Conforming node count.
  pub conforming_nodes: usize,
  /// Hanging node count.
  pub hanging_nodes: usize,
  /// Duplicate nodes created by interface extraction.
  pub duplicated_nodes: usize,
  /// Smoothing updates rejected by the quality guard.
  pub smoothing_rejected: usize,
}

/// Everything a meshing run produces for the solver-input writer.
pub struct MeshOutput {
  /// Node id to position.
  pub nodes: BTreeMap<NodeId, DVec3>,
  /// Hex elements in the solver corner convention, material-tagged.
  pub elements: Vec<Element>,
  /// Tetrahedra; empty unless [`ElementKind::Tetrahedral`] was selected.
  pub tets: Vec<Tet>,
  /// Hanging-node constraint equations.
  pub constraints: Vec<Constraint>,
  /// Periodic boundary sets; None when boundary classification is off.
  pub boundaries: Option<BoundarySets>,
  /// Per-material interface surface sets; empty unless surfaces were
  /// requested.
  pub interfaces: BTreeMap<MaterialId, InterfaceSet>,
  /// Run counters.
  pub stats: MeshStats,
}

/// Adaptive octree mesher for one domain.
pub struct AdaptiveMesher {
  config: MesherConfig,
  grid: CellGrid,
}

impl AdaptiveMesher {
  /// Validate the configuration and domain up front.
  ///
  /// Any failure here aborts before refinement starts; no partial mesh is
  /// ever returned.
  pub fn new(config: MesherConfig, domain: Aabb3) -> Result<Self> {
    config.validate().inspect_err(|e| log::error!("invalid mesher configuration: {e}"))?;
    if !domain.is_valid() {
      let err = MeshError::InvalidDomain {
        min: domain.min.to_array(),
        max: domain.max.to_array(),
      };
      log::error!("invalid meshing domain: {err}");
      return Err(err);
    }
    let grid = CellGrid::new(domain, config.voxels);
    Ok(Self { config, grid })
  }

  /// The grid mapping used by this mesher.
  pub fn grid(&self) -> &CellGrid {
    &self.grid
  }

  /// Run the full meshing pipeline.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
  pub fn generate(&self, classifier: &dyn MaterialClassifier) -> Result<MeshOutput> {
    let config = &self.config;
    let mut ctx = RefineContext::new(&self.grid, classifier);
    let mut stats = MeshStats::default();

    // Phase 1: refinement passes, each followed by balancing.
    let mut leaves = OctreeLeaves::new_base_grid(config.voxels);
    {
      #[cfg(feature = "tracing")]
      let _span = tracing::info_span!("refine").entered();

      let uniform = UniformPolicy {
        target_level: config.min_level,
      };
      stats.uniform_splits =
        refine_pass(&mut leaves, &mut ctx, &uniform, config.max_level, true);
      stats.balance_splits += enforce_balance(&mut leaves, &self.grid);

      stats.heterogeneity_splits = refine_pass(
        &mut leaves,
        &mut ctx,
        &HeterogeneityPolicy,
        config.max_level,
        true,
      );
      stats.balance_splits += enforce_balance(&mut leaves, &self.grid);

      for _ in 0..config.probe_passes {
        stats.probe_splits +=
          refine_pass(&mut leaves, &mut ctx, &ProbePolicy, config.max_level, false);
        stats.balance_splits += enforce_balance(&mut leaves, &self.grid);
      }

      // Hanging masters must be conforming before extraction numbers them.
      stats.balance_splits += enforce_independent_masters(&mut leaves, &self.grid);
    }
    stats.leaves_per_level = leaves.level_histogram();
    stats.finest_level = leaves.finest_level();
    log::info!(
      "refinement done: {} leaves, finest level {}, {} balance splits",
      leaves.len(),
      stats.finest_level,
      stats.balance_splits
    );

    // Phase 2: extraction.
    let extracted = extract_mesh(&leaves, &mut ctx)?;
    stats.conforming_nodes = extracted.conforming_count;
    stats.hanging_nodes = extracted.hanging_count;
    log::info!(
      "extraction done: {} nodes ({} hanging), {} elements, {} constraints",
      extracted.node_count(),
      extracted.hanging_count,
      extracted.elements.len(),
      extracted.constraints.len()
    );

    let mut nodes = extracted.nodes;
    let mut elements = extracted.elements;

    // Phase 3: boundary classification for the periodic-equation writer.
    let boundaries = match config.boundaries {
      BoundaryKind::None => None,
      BoundaryKind::Periodic => Some(locate_boundaries(
        &nodes,
        &extracted.boundary_nodes,
        &self.grid,
        extracted.finest_level,
      )),
    };

    // Phase 4: interface extraction and smoothing.
    let mut interfaces = BTreeMap::new();
    if config.surfaces {
      let output = build_interfaces(&mut nodes, &mut elements);
      stats.duplicated_nodes = output.duplicate_count();

      let smooth_stats = smooth_interfaces(
        &mut nodes,
        &output.interface_nodes,
        &extracted.node_neighbors,
        &output.duplicates,
        &self.grid,
        extracted.finest_level,
        &config.smoothing,
      );
      stats.smoothing_rejected = smooth_stats.rejected;
      interfaces = output.sets;
    }

    // Phase 5: optional tetrahedral split.
    let tets = match config.elements {
      ElementKind::Hexahedral => Vec::new(),
      ElementKind::Tetrahedral => split_to_tets(&mut nodes, &elements, &extracted.constraints),
    };

    Ok(MeshOutput {
      nodes,
      elements,
      tets,
      constraints: extracted.constraints,
      boundaries,
      interfaces,
      stats,
    })
  }
}

#[cfg(test)]
#[path = "mesher_test.rs"]
mod mesher_test;
