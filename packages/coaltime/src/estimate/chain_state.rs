use crate::estimate::coalescent_order::CoalescentOrder;
use crate::estimate::log_ratio::LogRatio;
use crate::tree::node::NodeId;
use crate::tree::topology::Topology;

/// Outcome of a single proposal
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
  /// The drawn proposal is not a valid move and the state is left unchanged
  Invalid,
  Rejected,
  /// The state changed. The listed nodes have new coordinates.
  Accepted { node: NodeId, partner: Option<NodeId> },
}

impl MoveOutcome {
  pub const fn is_accepted(&self) -> bool {
    matches!(self, Self::Accepted { .. })
  }

  /// Nodes whose coordinates changed
  pub fn touched(&self) -> impl Iterator<Item = NodeId> {
    let touched = match *self {
      Self::Accepted { node, partner } => [Some(node), partner],
      _ => [None, None],
    };
    touched.into_iter().flatten()
  }
}

/// Mutable state of the sampler for one tree.
///
/// Coordinates are node ages in coalescent units, leaves at 0. Branch lengths are kept equal to the coordinate
/// difference between a node and its parent; the root has none.
#[derive(Clone, Debug)]
pub struct ChainState {
  topology: Topology,
  order: CoalescentOrder,
  coordinates: Vec<f64>,
  branch_lengths: Vec<f64>,
  mut_rate: Vec<f64>,
  num_events: Vec<u32>,
}

impl ChainState {
  pub fn new(
    topology: Topology,
    order: CoalescentOrder,
    coordinates: Vec<f64>,
    mut_rate: Vec<f64>,
    num_events: Vec<u32>,
  ) -> Self {
    debug_assert!(order.is_linear_extension(&topology));
    let mut this = Self {
      branch_lengths: vec![0.0; coordinates.len()],
      topology,
      order,
      coordinates,
      mut_rate,
      num_events,
    };
    for node in 0..this.topology.num_nodes() {
      this.update_branch_length(node);
    }
    this
  }

  #[inline]
  pub const fn topology(&self) -> &Topology {
    &self.topology
  }

  #[inline]
  pub const fn order(&self) -> &CoalescentOrder {
    &self.order
  }

  #[inline]
  pub fn coordinates(&self) -> &[f64] {
    &self.coordinates
  }

  #[inline]
  pub fn branch_lengths(&self) -> &[f64] {
    &self.branch_lengths
  }

  #[inline]
  pub const fn num_leaves(&self) -> usize {
    self.topology.num_leaves()
  }

  #[inline]
  pub fn coordinate_at_rank(&self, rank: usize) -> f64 {
    self.coordinates[self.order.node(rank)]
  }

  /// Poisson log-likelihood ratio of the branch above `node` taking `new_length`
  #[inline]
  pub fn branch_log_ratio(&self, node: NodeId, new_length: f64) -> LogRatio {
    LogRatio::branch(
      self.mut_rate[node],
      self.num_events[node],
      self.branch_lengths[node],
      new_length,
    )
  }

  /// Poisson log-likelihood ratio of the branches adjacent to a node moving to `coordinate`: its own branch (unless it
  /// is the root) and the branches of both children.
  pub fn adjacent_branches_log_ratio(&self, node: NodeId, coordinate: f64) -> LogRatio {
    let mut ratio = LogRatio::ZERO;
    if !self.topology.is_root(node) {
      let parent = self.topology.parent(node);
      ratio += self.branch_log_ratio(node, self.coordinates[parent] - coordinate);
    }
    for child in self.topology.children(node) {
      ratio += self.branch_log_ratio(child, coordinate - self.coordinates[child]);
    }
    ratio
  }

  /// Move a coalescence event to a new time, keeping its rank
  pub(crate) fn set_coordinate(&mut self, node: NodeId, coordinate: f64) {
    self.coordinates[node] = coordinate;
    self.update_adjacent_branch_lengths(node);
  }

  /// Exchange ranks and coordinates of two coalescence events
  pub(crate) fn switch_events(&mut self, a: NodeId, b: NodeId) {
    self.order.swap(a, b);
    self.coordinates.swap(a, b);
    self.update_adjacent_branch_lengths(a);
    self.update_adjacent_branch_lengths(b);
    debug_assert!(self.order.is_linear_extension(&self.topology));
  }

  fn update_adjacent_branch_lengths(&mut self, node: NodeId) {
    self.update_branch_length(node);
    for child in self.topology.children(node) {
      self.update_branch_length(child);
    }
  }

  fn update_branch_length(&mut self, node: NodeId) {
    self.branch_lengths[node] = if self.topology.is_root(node) {
      0.0
    } else {
      self.coordinates[self.topology.parent(node)] - self.coordinates[node]
    };
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::estimate::coalescent_order::kingman_coordinates;
  use crate::tree::tree::Tree;
  use approx::assert_relative_eq;
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  /// State with the identity ranking and expected Kingman times, no mutations
  pub fn get_neutral_state(tree: &Tree) -> ChainState {
    let order = CoalescentOrder::identity(tree.num_leaves());
    let coordinates = kingman_coordinates(&order);
    get_state_with_coordinates(tree, order, coordinates)
  }

  pub fn get_state_with_coordinates(tree: &Tree, order: CoalescentOrder, coordinates: Vec<f64>) -> ChainState {
    let num_nodes = tree.num_nodes();
    ChainState::new(
      tree.topology().clone(),
      order,
      coordinates,
      vec![0.0; num_nodes],
      vec![0; num_nodes],
    )
  }

  #[rstest]
  fn derives_branch_lengths_from_coordinates() -> Result<(), eyre::Report> {
    let tree = crate::tree::examples::tests::get_four_leaf_tree()?;
    let state = get_neutral_state(&tree);
    assert_relative_eq!(state.branch_lengths()[0], 1.0 / 6.0, epsilon = 1e-12);
    assert_relative_eq!(state.branch_lengths()[3], 0.5, epsilon = 1e-12);
    assert_relative_eq!(state.branch_lengths()[4], 1.5 - 1.0 / 6.0, epsilon = 1e-12);
    assert_relative_eq!(state.branch_lengths()[6], 0.0);
    Ok(())
  }

  #[rstest]
  fn lists_touched_nodes() {
    let outcome = MoveOutcome::Accepted { node: 4, partner: Some(5) };
    assert_eq!(outcome.touched().collect::<Vec<_>>(), vec![4, 5]);
    assert_eq!(MoveOutcome::Rejected.touched().count(), 0);
    assert!(!MoveOutcome::Invalid.is_accepted());
  }
}
