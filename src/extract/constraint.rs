//! Hanging-node constraints and the deduplicating resolver.
//!
//! A hanging node carries no independent degree of freedom; its value is the
//! average of its 2 or 4 masters. The constraint row is +1 for the hanging
//! node and -1/N for each of the N masters, so the coefficients sum to zero.
//!
//! The same hanging corner is discovered once per fine leaf sharing it. The
//! resolver deduplicates through a key built by sorting and concatenating
//! the master ids into a string; a key hit with matching coordinates returns
//! the already-assigned id. A key hit with mismatched coordinates is a
//! topology anomaly: it is logged, a linear scan over the stored constraints
//! looks for a coordinate match, and if none exists the resolver returns an
//! error rather than an id.

use std::collections::HashMap;

use glam::DVec3;
use smallvec::SmallVec;

use super::NodeId;
use crate::error::{MeshError, Result};

/// One hanging-node constraint equation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
  /// The dependent (hanging) node.
  pub hanging: NodeId,
  /// Master nodes, sorted and deduplicated. 2 for an edge midpoint, 4 for a
  /// face midpoint.
  pub masters: SmallVec<[NodeId; 4]>,
}

impl Constraint {
  /// The implicit coefficient on each master.
  pub fn master_weight(&self) -> f64 {
    -1.0 / self.masters.len() as f64
  }
}

/// Assigns hanging-node ids and deduplicates coincident corners.
pub struct ConstraintResolver {
  next_id: NodeId,
  by_key: HashMap<String, NodeId>,
  constraints: Vec<Constraint>,
  positions: HashMap<NodeId, DVec3>,
  tolerance: f64,
}

impl ConstraintResolver {
  /// `first_id` is the start of the hanging id range; `tolerance` is the
  /// world-space distance under which two corners count as coincident.
  pub fn new(first_id: NodeId, tolerance: f64) -> Self {
    Self {
      next_id: first_id,
      by_key: HashMap::new(),
      constraints: Vec::new(),
      positions: HashMap::new(),
      tolerance,
    }
  }

  /// Number of distinct hanging nodes assigned so far.
  pub fn len(&self) -> usize {
    self.constraints.len()
  }

  pub fn is_empty(&self) -> bool {
    self.constraints.is_empty()
  }

  /// Resolve a hanging corner to its node id, assigning a fresh id and
  /// recording the constraint on first sight of the master set.
  pub fn resolve(&mut self, masters: &[NodeId], pos: DVec3) -> Result<NodeId> {
    let mut sorted: SmallVec<[NodeId; 4]> = SmallVec::from_slice(masters);
    sorted.sort_unstable();
    sorted.dedup();

    let key = sorted
      .iter()
      .map(|id| id.to_string())
      .collect::<Vec<_>>()
      .join("-");

    if let Some(&id) = self.by_key.get(&key) {
      let stored = self.positions[&id];
      if (stored - pos).length() <= self.tolerance {
        return Ok(id);
      }
      log::warn!(
        "constraint key {key} collides at mismatched coordinates \
         (stored {stored:?}, new {pos:?}); scanning stored constraints"
      );
      for constraint in &self.constraints {
        if (self.positions[&constraint.hanging] - pos).length() <= self.tolerance {
          return Ok(constraint.hanging);
        }
      }
      return Err(MeshError::ConstraintAnomaly {
        key,
        stored: id,
        stored_pos: stored.to_array(),
        new_pos: pos.to_array(),
      });
    }

    let id = self.next_id;
    self.next_id += 1;
    self.by_key.insert(key, id);
    self.positions.insert(id, pos);
    self.constraints.push(Constraint {
      hanging: id,
      masters: sorted,
    });
    Ok(id)
  }

  /// Consume the resolver, yielding the constraint table and the hanging
  /// node positions.
  pub fn into_parts(self) -> (Vec<Constraint>, HashMap<NodeId, DVec3>) {
    (self.constraints, self.positions)
  }
}

#[cfg(test)]
#[path = "constraint_test.rs"]
mod constraint_test;
