use super::*;
use crate::octree::Aabb3;

fn unit_grid() -> CellGrid {
  CellGrid::new(Aabb3::new(DVec3::ZERO, DVec3::ONE), [1, 1, 1])
}

fn params(lambda: f64, mu: f64, iterations: usize) -> SmoothParams {
  SmoothParams {
    enabled: true,
    lambda,
    mu,
    iterations,
  }
}

/// One free node between two fixed interface anchors.
///
/// Only node 1 has a stencil; 2 and 3 are interface nodes without adjacency
/// entries, so they never move.
fn three_nodes(
  free_pos: DVec3,
) -> (
  BTreeMap<NodeId, DVec3>,
  BTreeSet<NodeId>,
  HashMap<NodeId, Vec<NodeId>>,
) {
  let mut nodes = BTreeMap::new();
  nodes.insert(1, free_pos);
  nodes.insert(2, DVec3::new(0.375, 0.5, 0.5));
  nodes.insert(3, DVec3::new(0.625, 0.5, 0.5));

  let interface: BTreeSet<NodeId> = [1, 2, 3].into();
  let mut neighbors = HashMap::new();
  neighbors.insert(1, vec![2, 3]);
  (nodes, interface, neighbors)
}

#[test]
fn test_disabled_smoothing_is_a_noop() {
  let (mut nodes, interface, neighbors) = three_nodes(DVec3::new(0.5, 0.5, 0.55));
  let before = nodes.clone();

  let mut p = params(0.5, 0.5, 5);
  p.enabled = false;
  let stats = smooth_interfaces(
    &mut nodes,
    &interface,
    &neighbors,
    &BTreeMap::new(),
    &unit_grid(),
    2,
    &p,
  );

  assert_eq!(nodes, before);
  assert_eq!(stats, SmoothStats::default());
}

#[test]
fn test_full_step_reaches_stencil_centroid() {
  let (mut nodes, interface, neighbors) = three_nodes(DVec3::new(0.5, 0.5, 0.55));

  smooth_interfaces(
    &mut nodes,
    &interface,
    &neighbors,
    &BTreeMap::new(),
    &unit_grid(),
    2,
    &params(1.0, 1.0, 1),
  );

  assert!((nodes[&1] - DVec3::new(0.5, 0.5, 0.5)).length() < 1e-12);
  // Anchors without stencils stay put.
  assert_eq!(nodes[&2], DVec3::new(0.375, 0.5, 0.5));
  assert_eq!(nodes[&3], DVec3::new(0.625, 0.5, 0.5));
}

#[test]
fn test_taubin_alternates_coefficients() {
  let (mut nodes, interface, neighbors) = three_nodes(DVec3::new(0.5, 0.5, 0.55));

  smooth_interfaces(
    &mut nodes,
    &interface,
    &neighbors,
    &BTreeMap::new(),
    &unit_grid(),
    2,
    &params(0.5, -0.5, 2),
  );

  // Iteration 1 (lambda): z = 0.55 - 0.5 * 0.05 = 0.525.
  // Iteration 2 (mu): z = 0.525 + 0.5 * (0.525 - 0.5) = 0.5375.
  assert!((nodes[&1].z - 0.5375).abs() < 1e-12);
}

#[test]
fn test_boundary_plane_axis_is_pinned() {
  let mut nodes = BTreeMap::new();
  nodes.insert(1, DVec3::new(0.5, 0.5, 0.0));
  nodes.insert(2, DVec3::new(0.625, 0.5, 0.25));
  let interface: BTreeSet<NodeId> = [1, 2].into();
  let mut neighbors = HashMap::new();
  neighbors.insert(1, vec![2]);

  smooth_interfaces(
    &mut nodes,
    &interface,
    &neighbors,
    &BTreeMap::new(),
    &unit_grid(),
    2,
    &params(0.5, 0.5, 3),
  );

  // Node 1 sits on the z = 0 plane: its z must not move, while x drifts
  // toward the neighbor.
  assert_eq!(nodes[&1].z, 0.0);
  assert!(nodes[&1].x > 0.5);
}

#[test]
fn test_guard_rejects_oversized_displacement() {
  let mut nodes = BTreeMap::new();
  nodes.insert(1, DVec3::new(0.5, 0.5, 0.5));
  nodes.insert(2, DVec3::new(0.9, 0.5, 0.5));
  let interface: BTreeSet<NodeId> = [1, 2].into();
  let mut neighbors = HashMap::new();
  neighbors.insert(1, vec![2]);

  // Finest level 2: half cell width 0.125, but the pull is 0.2.
  let stats = smooth_interfaces(
    &mut nodes,
    &interface,
    &neighbors,
    &BTreeMap::new(),
    &unit_grid(),
    2,
    &params(1.0, 1.0, 1),
  );

  assert_eq!(nodes[&1], DVec3::new(0.5, 0.5, 0.5));
  assert_eq!(stats.rejected, 1);
  assert_eq!(stats.accepted, 0);
}

#[test]
fn test_cumulative_displacement_stays_bounded() {
  let (mut nodes, interface, neighbors) = three_nodes(DVec3::new(0.56, 0.44, 0.5));
  let original = nodes[&1];

  smooth_interfaces(
    &mut nodes,
    &interface,
    &neighbors,
    &BTreeMap::new(),
    &unit_grid(),
    2,
    &params(1.0, 1.0, 20),
  );

  let total = nodes[&1] - original;
  let half = unit_grid().cell_size(2) * 0.5;
  for axis in 0..3 {
    assert!(total[axis].abs() <= half[axis] + 1e-12);
  }
}

#[test]
fn test_duplicates_follow_their_original() {
  let (mut nodes, interface, neighbors) = three_nodes(DVec3::new(0.5, 0.5, 0.55));
  nodes.insert(99, nodes[&1]);
  let mut duplicates = BTreeMap::new();
  duplicates.insert(99 as NodeId, 1 as NodeId);

  smooth_interfaces(
    &mut nodes,
    &interface,
    &neighbors,
    &duplicates,
    &unit_grid(),
    2,
    &params(0.5, 0.5, 4),
  );

  assert_eq!(nodes[&99], nodes[&1]);
  assert!(nodes[&1].z < 0.55);
}