//! MesherConfig - configuration surface for a meshing run.
//!
//! Consumed as plain parameters; nothing here is parsed from files. The
//! builder methods mirror the rest of the crate's `with_*` convention and
//! [`MesherConfig::validate`] is called once, up front, by the mesher so an
//! invalid configuration aborts the run with no partial mesh.

use crate::error::{MeshError, Result};

/// Element type emitted at the module boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
  /// Hexahedra only (hanging nodes expressed as constraints).
  Hexahedral,
  /// Hexahedra split into tetrahedra, honoring hanging-node faces.
  Tetrahedral,
}

/// Boundary-condition variant selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryKind {
  /// No boundary classification is performed.
  None,
  /// Boundary nodes are classified into periodic vertex/edge/face sets.
  Periodic,
}

/// Parameters for constrained interface smoothing.
///
/// Two coefficients are alternated by iteration parity. Equal coefficients
/// give plain Laplacian smoothing; a negative `mu` gives Taubin-style
/// shrink/unshrink smoothing.
#[derive(Clone, Copy, Debug)]
pub struct SmoothParams {
  /// Whether smoothing runs at all.
  pub enabled: bool,
  /// Coefficient applied on even iterations. Must lie in (0, 1].
  pub lambda: f64,
  /// Coefficient applied on odd iterations. May be negative (Taubin);
  /// magnitude must not exceed 1.
  pub mu: f64,
  /// Number of smoothing iterations.
  pub iterations: usize,
}

impl Default for SmoothParams {
  fn default() -> Self {
    Self {
      enabled: false,
      lambda: 0.3,
      mu: -0.31,
      iterations: 10,
    }
  }
}

/// Configuration for one meshing run.
#[derive(Clone, Debug)]
pub struct MesherConfig {
  /// Base voxel counts per axis. The octree root grid has this many cells.
  pub voxels: [u32; 3],

  /// Every cell is refined at least to this level (level 0 = base grid).
  pub min_level: u32,

  /// No refinement predicate may split past this level.
  pub max_level: u32,

  /// Number of post-refinement probe passes.
  pub probe_passes: usize,

  /// Interface smoothing parameters.
  pub smoothing: SmoothParams,

  /// Whether interface/surface extraction (node duplication) runs.
  pub surfaces: bool,

  /// Boundary-condition variant.
  pub boundaries: BoundaryKind,

  /// Element type selector.
  pub elements: ElementKind,
}

impl Default for MesherConfig {
  fn default() -> Self {
    Self {
      voxels: [1, 1, 1],
      min_level: 1,
      max_level: 4,
      probe_passes: 3,
      smoothing: SmoothParams::default(),
      surfaces: false,
      boundaries: BoundaryKind::Periodic,
      elements: ElementKind::Hexahedral,
    }
  }
}

impl MesherConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_voxels(mut self, x: u32, y: u32, z: u32) -> Self {
    self.voxels = [x, y, z];
    self
  }

  pub fn with_levels(mut self, min_level: u32, max_level: u32) -> Self {
    self.min_level = min_level;
    self.max_level = max_level;
    self
  }

  pub fn with_probe_passes(mut self, passes: usize) -> Self {
    self.probe_passes = passes;
    self
  }

  pub fn with_smoothing(mut self, lambda: f64, mu: f64, iterations: usize) -> Self {
    self.smoothing = SmoothParams {
      enabled: true,
      lambda,
      mu,
      iterations,
    };
    self
  }

  pub fn with_surfaces(mut self, surfaces: bool) -> Self {
    self.surfaces = surfaces;
    self
  }

  pub fn with_boundaries(mut self, boundaries: BoundaryKind) -> Self {
    self.boundaries = boundaries;
    self
  }

  pub fn with_elements(mut self, elements: ElementKind) -> Self {
    self.elements = elements;
    self
  }

  /// Validate the configuration, failing fast on the first problem.
  pub fn validate(&self) -> Result<()> {
    for (axis, &n) in self.voxels.iter().enumerate() {
      if n == 0 {
        return Err(MeshError::invalid_param(
          "voxels",
          format!("axis {axis} = 0"),
          "voxel counts must be at least 1",
        ));
      }
    }

    if self.min_level > self.max_level {
      return Err(MeshError::InvalidLevels {
        min_level: self.min_level,
        max_level: self.max_level,
      });
    }

    // Finest-grid coordinates are kept in i32; 20 levels over any sane base
    // grid stays well within range.
    if self.max_level > 20 {
      return Err(MeshError::invalid_param(
        "max_level",
        self.max_level,
        "refinement past level 20 is not supported",
      ));
    }

    if self.smoothing.enabled {
      let s = &self.smoothing;
      if !s.lambda.is_finite() || s.lambda <= 0.0 || s.lambda > 1.0 {
        return Err(MeshError::invalid_param(
          "smoothing.lambda",
          s.lambda,
          "must lie in (0, 1]",
        ));
      }
      if !s.mu.is_finite() || s.mu.abs() > 1.0 {
        return Err(MeshError::invalid_param(
          "smoothing.mu",
          s.mu,
          "magnitude must not exceed 1",
        ));
      }
      if s.iterations == 0 {
        return Err(MeshError::invalid_param(
          "smoothing.iterations",
          s.iterations,
          "enabled smoothing needs at least one iteration",
        ));
      }
    }

    Ok(())
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
