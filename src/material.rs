//! Material classification boundary.
//!
//! The textile/domain geometry collaborator supplies point classification;
//! this module defines the trait the mesher consumes plus a per-run sample
//! cache so refinement passes do not re-query identical points. The cache is
//! an explicit context value owned by the refinement context, never static
//! state.

use std::collections::HashMap;

use glam::DVec3;

/// Material identifier. 0 = matrix, >= 1 = embedded (yarn) materials.
pub type MaterialId = u8;

/// Point-to-material classification supplied by the geometry collaborator.
///
/// Implementations must be deterministic for a given point: refinement
/// decisions and element tagging both rely on repeated queries agreeing.
pub trait MaterialClassifier {
  /// Classify a batch of sample points, one material index per point.
  fn classify(&self, points: &[DVec3]) -> Vec<MaterialId>;
}

/// Memoizes classifications keyed by coordinate bit patterns.
///
/// Refinement predicates sample cell corners that are shared with up to seven
/// neighboring cells and revisited on every pass, so the hit rate is high.
#[derive(Default)]
pub struct SampleCache {
  samples: HashMap<[u64; 3], MaterialId>,
}

impl SampleCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of cached samples.
  pub fn len(&self) -> usize {
    self.samples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  /// Classify a single point through the cache.
  pub fn classify_point(&mut self, classifier: &dyn MaterialClassifier, point: DVec3) -> MaterialId {
    let key = Self::key(point);
    if let Some(&mat) = self.samples.get(&key) {
      return mat;
    }
    let mat = classifier.classify(&[point])[0];
    self.samples.insert(key, mat);
    mat
  }

  /// Classify a batch of points through the cache.
  ///
  /// Cache misses are gathered into a single classifier call.
  pub fn classify_points(
    &mut self,
    classifier: &dyn MaterialClassifier,
    points: &[DVec3],
  ) -> Vec<MaterialId> {
    let mut out = vec![0; points.len()];
    let mut miss_points = Vec::new();
    let mut miss_slots = Vec::new();

    for (i, &p) in points.iter().enumerate() {
      match self.samples.get(&Self::key(p)) {
        Some(&mat) => out[i] = mat,
        None => {
          miss_points.push(p);
          miss_slots.push(i);
        }
      }
    }

    if !miss_points.is_empty() {
      let classified = classifier.classify(&miss_points);
      for ((&slot, &p), mat) in miss_slots.iter().zip(&miss_points).zip(classified) {
        self.samples.insert(Self::key(p), mat);
        out[slot] = mat;
      }
    }

    out
  }

  fn key(point: DVec3) -> [u64; 3] {
    [point.x.to_bits(), point.y.to_bits(), point.z.to_bits()]
  }
}
