//! Error types for cellmesh.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building a mesh.
///
/// Initialization errors are detected up front and abort the meshing call
/// with no partial mesh. Extraction anomalies are logged and resolved via
/// best-effort fallback where possible; [`MeshError::ConstraintAnomaly`] is
/// returned only when the fallback itself fails.
#[derive(Error, Debug)]
pub enum MeshError {
  /// The domain bounding box is degenerate (min >= max on some axis).
  #[error("degenerate domain bounding box: min {min:?}, max {max:?}")]
  InvalidDomain {
    /// Minimum corner of the rejected box.
    min: [f64; 3],
    /// Maximum corner of the rejected box.
    max: [f64; 3],
  },

  /// Minimum refinement level exceeds the maximum.
  #[error("min_level {min_level} exceeds max_level {max_level}")]
  InvalidLevels {
    /// Configured minimum level.
    min_level: u32,
    /// Configured maximum level.
    max_level: u32,
  },

  /// Invalid parameter value.
  #[error("invalid parameter: {name} = {value} ({reason})")]
  InvalidParameter {
    /// Parameter name.
    name: &'static str,
    /// The invalid value (as string).
    value: String,
    /// Reason the value is invalid.
    reason: &'static str,
  },

  /// A hanging-node constraint key collided with mismatched coordinates and
  /// no stored constraint matched the new corner's position.
  #[error(
    "constraint key {key} collides with node {stored} at mismatched \
     coordinates (stored {stored_pos:?}, new {new_pos:?})"
  )]
  ConstraintAnomaly {
    /// The sorted-master-id key that collided.
    key: String,
    /// Node id already stored under the key.
    stored: u64,
    /// Position of the stored node.
    stored_pos: [f64; 3],
    /// Position of the new corner.
    new_pos: [f64; 3],
  },

  /// A hanging corner's master could not be resolved to a conforming node.
  #[error("master corner {key:?} of a hanging node has no conforming id")]
  UnresolvedMaster {
    /// Finest-grid key of the unresolvable master.
    key: [i32; 3],
  },
}

impl MeshError {
  /// Create an invalid parameter error.
  pub fn invalid_param<T: std::fmt::Display>(
    name: &'static str,
    value: T,
    reason: &'static str,
  ) -> Self {
    MeshError::InvalidParameter {
      name,
      value: value.to_string(),
      reason,
    }
  }
}
