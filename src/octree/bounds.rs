//! Axis-aligned bounding box for the meshing domain.

use glam::DVec3;

/// Double-precision axis-aligned bounding box.
///
/// Supplied by the geometry collaborator as the domain of the unit cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb3 {
  /// Minimum corner (inclusive).
  pub min: DVec3,
  /// Maximum corner (inclusive).
  pub max: DVec3,
}

impl Aabb3 {
  /// Create a new AABB from min and max corners.
  ///
  /// # Panics
  /// Debug-asserts that min <= max on all axes.
  pub fn new(min: DVec3, max: DVec3) -> Self {
    debug_assert!(
      min.x <= max.x && min.y <= max.y && min.z <= max.z,
      "AABB min must be <= max on all axes"
    );
    Self { min, max }
  }

  /// Create the unit box [0, 1]^3.
  pub fn unit() -> Self {
    Self {
      min: DVec3::ZERO,
      max: DVec3::ONE,
    }
  }

  /// Check if every axis extent is strictly positive.
  #[inline]
  pub fn is_valid(&self) -> bool {
    self.min.x < self.max.x && self.min.y < self.max.y && self.min.z < self.max.z
  }

  /// Check if this AABB contains a point.
  #[inline]
  pub fn contains_point(&self, point: DVec3) -> bool {
    point.x >= self.min.x
      && point.x <= self.max.x
      && point.y >= self.min.y
      && point.y <= self.max.y
      && point.z >= self.min.z
      && point.z <= self.max.z
  }

  /// Clamp a point into the box.
  #[inline]
  pub fn clamp_point(&self, point: DVec3) -> DVec3 {
    point.clamp(self.min, self.max)
  }

  /// Get the size of the AABB (max - min).
  #[inline]
  pub fn size(&self) -> DVec3 {
    self.max - self.min
  }

  /// Get the center of the AABB.
  #[inline]
  pub fn center(&self) -> DVec3 {
    (self.min + self.max) * 0.5
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_new() {
    let aabb = Aabb3::new(DVec3::new(-1.0, -2.0, -3.0), DVec3::new(1.0, 2.0, 3.0));
    assert_eq!(aabb.min, DVec3::new(-1.0, -2.0, -3.0));
    assert_eq!(aabb.max, DVec3::new(1.0, 2.0, 3.0));
  }

  #[test]
  fn test_is_valid() {
    assert!(Aabb3::unit().is_valid());
    let flat = Aabb3 {
      min: DVec3::ZERO,
      max: DVec3::new(1.0, 0.0, 1.0),
    };
    assert!(!flat.is_valid());
  }

  #[test]
  fn test_contains_point() {
    let aabb = Aabb3::new(DVec3::ZERO, DVec3::splat(10.0));

    assert!(aabb.contains_point(DVec3::splat(5.0)));
    assert!(aabb.contains_point(DVec3::ZERO));
    assert!(aabb.contains_point(DVec3::splat(10.0)));
    assert!(!aabb.contains_point(DVec3::splat(-1.0)));
    assert!(!aabb.contains_point(DVec3::splat(11.0)));
  }

  #[test]
  fn test_clamp_point() {
    let aabb = Aabb3::new(DVec3::ZERO, DVec3::ONE);
    assert_eq!(
      aabb.clamp_point(DVec3::new(2.0, 0.5, -1.0)),
      DVec3::new(1.0, 0.5, 0.0)
    );
  }

  #[test]
  fn test_size_and_center() {
    let aabb = Aabb3::new(DVec3::new(-1.0, -2.0, -3.0), DVec3::new(1.0, 2.0, 3.0));
    assert_eq!(aabb.size(), DVec3::new(2.0, 4.0, 6.0));
    assert_eq!(aabb.center(), DVec3::ZERO);
  }
}
