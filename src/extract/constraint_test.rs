use super::*;

#[test]
fn test_first_resolution_assigns_sequential_ids() {
  let mut resolver = ConstraintResolver::new(1000, 1e-9);

  let a = resolver.resolve(&[3, 7], DVec3::new(0.5, 0.0, 0.0)).unwrap();
  let b = resolver.resolve(&[7, 12], DVec3::new(1.0, 0.5, 0.0)).unwrap();

  assert_eq!(a, 1000);
  assert_eq!(b, 1001);
  assert_eq!(resolver.len(), 2);
}

#[test]
fn test_same_masters_same_position_deduplicates() {
  let mut resolver = ConstraintResolver::new(1000, 1e-9);
  let pos = DVec3::new(0.5, 0.0, 0.0);

  let a = resolver.resolve(&[7, 3], pos).unwrap();
  // Same corner reached from a neighboring leaf; master order differs.
  let b = resolver.resolve(&[3, 7], pos).unwrap();

  assert_eq!(a, b);
  assert_eq!(resolver.len(), 1);
}

#[test]
fn test_masters_are_sorted_and_deduplicated() {
  let mut resolver = ConstraintResolver::new(1000, 1e-9);
  resolver
    .resolve(&[12, 3, 12, 7], DVec3::ZERO)
    .unwrap();

  let (constraints, _) = resolver.into_parts();
  assert_eq!(constraints[0].masters.as_slice(), &[3, 7, 12]);
}

#[test]
fn test_weights_sum_to_zero() {
  let mut resolver = ConstraintResolver::new(1000, 1e-9);
  resolver.resolve(&[1, 2], DVec3::ZERO).unwrap();
  resolver.resolve(&[1, 2, 3, 4], DVec3::ONE).unwrap();

  let (constraints, _) = resolver.into_parts();
  for constraint in constraints {
    let sum = 1.0 + constraint.master_weight() * constraint.masters.len() as f64;
    assert!(sum.abs() < 1e-15);
  }
}

#[test]
fn test_key_collision_with_mismatched_coordinates_scans() {
  let mut resolver = ConstraintResolver::new(1000, 1e-9);

  let far = DVec3::new(9.0, 9.0, 9.0);
  let a = resolver.resolve(&[1, 2], DVec3::ZERO).unwrap();
  let b = resolver.resolve(&[5, 6], far).unwrap();
  assert_ne!(a, b);

  // Same key as the first constraint but coordinates matching the second:
  // the linear-scan fallback must find node `b`, not invent a value.
  let resolved = resolver.resolve(&[1, 2], far).unwrap();
  assert_eq!(resolved, b);
}

#[test]
fn test_key_collision_without_position_match_errors() {
  let mut resolver = ConstraintResolver::new(1000, 1e-9);
  resolver.resolve(&[1, 2], DVec3::ZERO).unwrap();

  let err = resolver.resolve(&[1, 2], DVec3::new(3.0, 0.0, 0.0));
  assert!(matches!(err, Err(MeshError::ConstraintAnomaly { .. })));
}
