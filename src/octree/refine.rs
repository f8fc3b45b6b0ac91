//! Refinement passes driven by composable policies.
//!
//! The octree is refined in passes, each followed by 2:1 balancing:
//!
//! 1. Uniform refinement to the configured minimum level (unconditional).
//! 2. Heterogeneity refinement until stable: split cells whose corner,
//!    centroid or near-corner samples disagree on material, and force
//!    splitting of boundary-touching cells so periodic partner faces share
//!    identical refinement topology.
//! 3. Probe passes (typically 3): sample outside the cell along axis and
//!    corner directions; split where the samples straddle a material
//!    boundary. This removes hanging nodes that would otherwise remain
//!    exactly on an external surface.
//!
//! Every policy sees one cell at a time and answers should-refine; the
//! driver owns the max-level cap and the split loop. Policies are pure
//! against a [`RefineContext`], so each is unit-testable with a synthetic
//! classifier.

use glam::DVec3;

use super::{OctreeLeaves, OctreeNode};
use crate::grid::CellGrid;
use crate::material::{MaterialClassifier, SampleCache};

/// Shared state for refinement predicates: grid mapping, the classifier and
/// the per-run sample cache. Passed explicitly; nothing here is static.
pub struct RefineContext<'a> {
  pub grid: &'a CellGrid,
  pub classifier: &'a dyn MaterialClassifier,
  pub cache: SampleCache,
}

impl<'a> RefineContext<'a> {
  pub fn new(grid: &'a CellGrid, classifier: &'a dyn MaterialClassifier) -> Self {
    Self {
      grid,
      classifier,
      cache: SampleCache::new(),
    }
  }

  /// Classify a point set through the cache and report whether all samples
  /// agree on one material.
  fn uniform_material(&mut self, points: &[DVec3]) -> bool {
    let materials = self.cache.classify_points(self.classifier, points);
    materials.windows(2).all(|w| w[0] == w[1])
  }
}

/// A refinement predicate. The driver splits any leaf below the level cap
/// for which `should_refine` answers true.
pub trait RefinementPolicy {
  /// Short name used in log output.
  fn name(&self) -> &'static str;

  fn should_refine(&self, ctx: &mut RefineContext<'_>, node: &OctreeNode) -> bool;
}

/// Unconditional refinement of every cell below the target level.
pub struct UniformPolicy {
  pub target_level: u32,
}

impl RefinementPolicy for UniformPolicy {
  fn name(&self) -> &'static str {
    "uniform"
  }

  fn should_refine(&self, _ctx: &mut RefineContext<'_>, node: &OctreeNode) -> bool {
    node.level < self.target_level
  }
}

/// Split cells that straddle a material boundary.
///
/// Samples the 8 corners plus the centroid, then the 8 corners pulled 1%
/// toward the centroid. The second set catches thin slivers whose corners
/// all fall in one material but whose interior crosses a boundary. Cells
/// touching the domain boundary are always split so periodic partner faces
/// end up with identical refinement topology.
pub struct HeterogeneityPolicy;

impl RefinementPolicy for HeterogeneityPolicy {
  fn name(&self) -> &'static str {
    "heterogeneity"
  }

  fn should_refine(&self, ctx: &mut RefineContext<'_>, node: &OctreeNode) -> bool {
    if ctx.grid.touches_boundary(node) {
      return true;
    }

    let centroid = ctx.grid.node_center(node);
    let mut samples = [DVec3::ZERO; 9];
    for corner in 0..8 {
      samples[corner] = ctx.grid.corner_pos(node, corner);
    }
    samples[8] = centroid;
    if !ctx.uniform_material(&samples) {
      return true;
    }

    let mut shrunk = [DVec3::ZERO; 8];
    for corner in 0..8 {
      shrunk[corner] = centroid + (samples[corner] - centroid) * 0.99;
    }
    !ctx.uniform_material(&shrunk)
  }
}

/// Directions probed by [`ProbePolicy`]: 6 face directions then 8 corner
/// directions, as multiples of the cell half-extent.
const PROBE_DIRECTIONS: [(i32, i32, i32); 14] = [
  (-1, 0, 0),
  (1, 0, 0),
  (0, -1, 0),
  (0, 1, 0),
  (0, 0, -1),
  (0, 0, 1),
  (-1, -1, -1),
  (1, -1, -1),
  (-1, 1, -1),
  (1, 1, -1),
  (-1, -1, 1),
  (1, -1, 1),
  (-1, 1, 1),
  (1, 1, 1),
];

/// Offset factors applied along each probe direction, relative to the cell
/// half-extent. Both reach outside the cell.
const PROBE_SCALES: [f64; 2] = [1.25, 2.01];

/// Split cells whose surroundings straddle a material boundary.
///
/// Samples at 1.25x and 2.01x of the half-extent from the centroid along
/// each axis and corner direction (clamped into the domain), plus the
/// centroid itself; any disagreement splits the cell.
pub struct ProbePolicy;

impl RefinementPolicy for ProbePolicy {
  fn name(&self) -> &'static str {
    "probe"
  }

  fn should_refine(&self, ctx: &mut RefineContext<'_>, node: &OctreeNode) -> bool {
    let centroid = ctx.grid.node_center(node);
    let half = ctx.grid.cell_size(node.level) * 0.5;

    let mut samples = Vec::with_capacity(PROBE_DIRECTIONS.len() * PROBE_SCALES.len() + 1);
    samples.push(centroid);
    for (dx, dy, dz) in PROBE_DIRECTIONS {
      let dir = DVec3::new(dx as f64, dy as f64, dz as f64) * half;
      for scale in PROBE_SCALES {
        samples.push(ctx.grid.domain.clamp_point(centroid + dir * scale));
      }
    }

    !ctx.uniform_material(&samples)
  }
}

/// Run one policy over the leaves, splitting matches below `max_level`.
///
/// With `to_convergence`, sweeps repeat until no leaf matches (children are
/// re-examined); otherwise a single sweep over the current leaves runs.
/// Returns the number of splits.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, fields(policy = policy.name()))
)]
pub fn refine_pass(
  leaves: &mut OctreeLeaves,
  ctx: &mut RefineContext<'_>,
  policy: &dyn RefinementPolicy,
  max_level: u32,
  to_convergence: bool,
) -> usize {
  let mut splits = 0;

  loop {
    // Snapshot: cannot iterate while splitting.
    let snapshot: Vec<OctreeNode> = leaves.iter().copied().collect();
    let mut changed = false;

    for node in snapshot {
      if node.level >= max_level {
        continue;
      }
      if policy.should_refine(ctx, &node) && leaves.split(&node) {
        splits += 1;
        changed = true;
      }
    }

    if !changed || !to_convergence {
      break;
    }
  }

  log::debug!("{} pass split {} cells", policy.name(), splits);
  splits
}

#[cfg(test)]
#[path = "refine_test.rs"]
mod refine_test;
