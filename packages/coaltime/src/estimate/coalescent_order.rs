use crate::tree::node::NodeId;
use crate::tree::topology::Topology;
use rand::Rng;

/// Ranking of coalescence events.
///
/// `sorted_indices[rank]` is the node coalescing at `rank` and `order[node]` is its rank; the two are mutual
/// inverses. Leaves keep rank equal to their label, internal nodes occupy ranks `N..2N-1`. The ranking is always a
/// linear extension of the topology: every node is ranked above its children and below its parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoalescentOrder {
  num_leaves: usize,
  order: Vec<usize>,
  sorted_indices: Vec<NodeId>,
}

impl CoalescentOrder {
  /// Rank every node by its label. Valid for any validated tree, because parent labels exceed child labels.
  pub fn identity(num_leaves: usize) -> Self {
    let num_nodes = 2 * num_leaves - 1;
    Self {
      num_leaves,
      order: (0..num_nodes).collect(),
      sorted_indices: (0..num_nodes).collect(),
    }
  }

  /// Rank internal nodes by ascending coordinate, breaking ties by label.
  ///
  /// Coordinates must not decrease toward the root. Then ties only put parents after their children, and the result
  /// is a linear extension of the topology.
  pub fn from_coordinates(topology: &Topology, coordinates: &[f64]) -> Self {
    let num_leaves = topology.num_leaves();
    let mut internal: Vec<NodeId> = topology.internal_nodes().collect();
    internal.sort_by(|&a, &b| coordinates[a].total_cmp(&coordinates[b]).then(a.cmp(&b)));

    let mut this = Self::identity(num_leaves);
    for (offset, node) in internal.into_iter().enumerate() {
      let rank = num_leaves + offset;
      this.sorted_indices[rank] = node;
      this.order[node] = rank;
    }
    debug_assert!(this.is_linear_extension(topology));
    this
  }

  #[inline]
  pub const fn num_leaves(&self) -> usize {
    self.num_leaves
  }

  /// Rank of the node
  #[inline]
  pub fn rank(&self, node: NodeId) -> usize {
    self.order[node]
  }

  /// Node coalescing at the rank
  #[inline]
  pub fn node(&self, rank: usize) -> NodeId {
    self.sorted_indices[rank]
  }

  pub fn sorted_indices(&self) -> &[NodeId] {
    &self.sorted_indices
  }

  pub fn order(&self) -> &[usize] {
    &self.order
  }

  /// Exclusive rank bounds the node may move within without breaking the topology: its highest-ranked child (floored
  /// at `N-1`) and its parent. The root is bounded above by `2N-1`.
  pub fn window(&self, topology: &Topology, node: NodeId) -> (usize, usize) {
    let [left, right] = topology.children(node);
    let lower = self.order[left].max(self.order[right]).max(self.num_leaves - 1);
    let upper = if topology.is_root(node) {
      topology.num_nodes()
    } else {
      self.order[topology.parent(node)]
    };
    (lower, upper)
  }

  /// Exchange the ranks of two nodes
  pub fn swap(&mut self, a: NodeId, b: NodeId) {
    let (rank_a, rank_b) = (self.order[a], self.order[b]);
    self.order.swap(a, b);
    self.sorted_indices.swap(rank_a, rank_b);
  }

  /// Draw a partner to exchange ranks with the node at `rank`.
  ///
  /// The candidate rank is uniform inside the window of the node. Returns `None` when the window holds no other rank,
  /// when the draw lands on the node itself, or when the node's rank is outside the candidate's own window (the
  /// exchange would not be reversible).
  pub fn draw_switch_partner(&self, topology: &Topology, rank: usize, rng: &mut impl Rng) -> Option<NodeId> {
    let node = self.sorted_indices[rank];
    let (lower, upper) = self.window(topology, node);
    if upper - lower <= 2 {
      return None;
    }

    let candidate = rng.gen_range((lower + 1)..upper);
    if candidate == rank {
      return None;
    }

    let partner = self.sorted_indices[candidate];
    let (partner_lower, partner_upper) = self.window(topology, partner);
    (partner_lower < rank && rank < partner_upper).then_some(partner)
  }

  /// Decorrelate the ranking with `N * N` unconditional switches of random ranks in `[N, 2N-3]`.
  pub fn shuffle(&mut self, topology: &Topology, rng: &mut impl Rng) {
    let num_leaves = self.num_leaves;
    if num_leaves < 3 {
      return;
    }
    let last_switchable = 2 * num_leaves - 3;
    for _ in 0..(num_leaves * num_leaves) {
      let rank = rng.gen_range(num_leaves..=last_switchable);
      if let Some(partner) = self.draw_switch_partner(topology, rank, rng) {
        self.swap(self.sorted_indices[rank], partner);
      }
    }
  }

  /// Whether every node is ranked above its children and the two rank arrays are mutual inverses
  pub fn is_linear_extension(&self, topology: &Topology) -> bool {
    let inverse = (0..self.order.len()).all(|node| self.sorted_indices[self.order[node]] == node);
    let ordered = topology.internal_nodes().all(|node| {
      let [left, right] = topology.children(node);
      self.order[left] < self.order[node] && self.order[right] < self.order[node]
    });
    inverse && ordered
  }
}

/// Expected coalescence times under the standard coalescent, assigned along the given ranking.
///
/// The event at rank `k` waits `2 / (m (m - 1))` after the previous one, `m = 2N - k` being the number of lineages
/// before it. Leaves sit at time 0.
pub fn kingman_coordinates(order: &CoalescentOrder) -> Vec<f64> {
  let num_leaves = order.num_leaves();
  let num_nodes = 2 * num_leaves - 1;
  let mut coordinates = vec![0.0; num_nodes];
  for rank in num_leaves..num_nodes {
    let m = (2 * num_leaves - rank) as f64;
    coordinates[order.node(rank)] = coordinates[order.node(rank - 1)] + 2.0 / (m * (m - 1.0));
  }
  coordinates
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tree::examples::tests::{get_caterpillar_tree, get_four_leaf_tree, get_random_tree};
  use crate::utils::random::get_random_number_generator;
  use approx::assert_ulps_eq;
  use eyre::Report;
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  #[rstest]
  fn computes_windows() -> Result<(), Report> {
    let tree = get_four_leaf_tree()?;
    let order = CoalescentOrder::identity(4);
    assert_eq!(order.window(tree.topology(), 4), (3, 6));
    assert_eq!(order.window(tree.topology(), 5), (3, 6));
    assert_eq!(order.window(tree.topology(), 6), (5, 7));
    Ok(())
  }

  #[rstest]
  fn caterpillar_has_no_valid_switch() -> Result<(), Report> {
    let tree = get_caterpillar_tree(6)?;
    let order = CoalescentOrder::identity(6);
    let mut rng = get_random_number_generator(Some(1));
    for rank in 6..=9 {
      assert_eq!(order.draw_switch_partner(tree.topology(), rank, &mut rng), None);
    }
    Ok(())
  }

  #[rstest]
  fn swapping_twice_restores_order() -> Result<(), Report> {
    let tree = get_four_leaf_tree()?;
    let mut order = CoalescentOrder::identity(4);
    order.swap(4, 5);
    assert_eq!(order.sorted_indices(), &[0, 1, 2, 3, 5, 4, 6]);
    assert!(order.is_linear_extension(tree.topology()));
    order.swap(4, 5);
    assert_eq!(order, CoalescentOrder::identity(4));
    Ok(())
  }

  #[rstest]
  #[case(5, 1)]
  #[case(12, 2)]
  #[case(40, 3)]
  fn shuffle_keeps_linear_extension(#[case] num_leaves: usize, #[case] seed: u64) -> Result<(), Report> {
    let tree = get_random_tree(num_leaves, seed)?;
    let mut order = CoalescentOrder::identity(num_leaves);
    let mut rng = get_random_number_generator(Some(seed));
    order.shuffle(tree.topology(), &mut rng);
    assert!(order.is_linear_extension(tree.topology()));
    for node in 0..tree.num_nodes() {
      assert_eq!(order.node(order.rank(node)), node);
    }
    Ok(())
  }

  #[rstest]
  fn ranks_by_coordinate_with_label_ties() -> Result<(), Report> {
    let tree = get_four_leaf_tree()?;
    let coordinates = [0.0, 0.0, 0.0, 0.0, 2.0, 1.0, 2.0];
    let order = CoalescentOrder::from_coordinates(tree.topology(), &coordinates);
    assert_eq!(order.sorted_indices(), &[0, 1, 2, 3, 5, 4, 6]);
    Ok(())
  }

  #[rstest]
  fn assigns_kingman_expectations() {
    let coordinates = kingman_coordinates(&CoalescentOrder::identity(4));
    assert_ulps_eq!(coordinates[4], 1.0 / 6.0);
    assert_ulps_eq!(coordinates[5], 1.0 / 6.0 + 1.0 / 3.0);
    assert_ulps_eq!(coordinates[6], 1.0 / 6.0 + 1.0 / 3.0 + 1.0);
  }
}
