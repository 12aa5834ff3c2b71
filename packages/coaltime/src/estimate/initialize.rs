use crate::estimate::chain_state::ChainState;
use crate::estimate::coalescent_order::{kingman_coordinates, CoalescentOrder};
use crate::estimate::options::Initialization;
use crate::make_error;
use crate::tree::tree::Tree;
use eyre::Report;
use rand::Rng;

/// Build the starting state of the chain.
///
/// `CoalescentPrior` shuffles the label ranking with random switches and places events at their expected times under
/// the standard coalescent. `BranchLengths` reads times off the branch lengths of the tree.
pub fn initialize(
  tree: &Tree,
  mut_rate: Vec<f64>,
  initialization: Initialization,
  effective_size: f64,
  rng: &mut impl Rng,
) -> Result<ChainState, Report> {
  let topology = tree.topology().clone();
  let num_events = tree.nodes().iter().map(|node| node.num_events).collect();

  let (order, coordinates) = match initialization {
    Initialization::CoalescentPrior => {
      let mut order = CoalescentOrder::identity(tree.num_leaves());
      order.shuffle(&topology, rng);
      let coordinates = kingman_coordinates(&order);
      (order, coordinates)
    }
    Initialization::BranchLengths => {
      let coordinates = coordinates_from_branch_lengths(tree, effective_size)?;
      let order = CoalescentOrder::from_coordinates(&topology, &coordinates);
      (order, coordinates)
    }
  };

  Ok(ChainState::new(topology, order, coordinates, mut_rate, num_events))
}

/// Node times in coalescent units, from branch lengths in generations.
///
/// Each internal node is placed above its left child. A node that would end up below its right child (the tree is
/// not ultrametric) is lifted to the time of that child.
pub fn coordinates_from_branch_lengths(tree: &Tree, effective_size: f64) -> Result<Vec<f64>, Report> {
  let topology = tree.topology();

  if let Some(node) = tree
    .nodes()
    .iter()
    .find(|node| !node.is_root() && !(node.branch_length.is_finite() && node.branch_length >= 0.0))
  {
    return make_error!(
      "Cannot start from existing branch lengths: node {} has branch length {}",
      node.label,
      node.branch_length
    );
  }

  let mut coordinates = vec![0.0; tree.num_nodes()];
  for node in topology.internal_nodes() {
    let [left, right] = topology.children(node);
    let above_left = coordinates[left] + tree.branch_length(left) / effective_size;
    coordinates[node] = above_left.max(coordinates[right]);
  }

  let root_coordinate = coordinates[topology.root()];
  if root_coordinate <= 0.0 {
    return make_error!("Cannot start from existing branch lengths: the root is at time {root_coordinate}");
  }

  Ok(coordinates)
}
