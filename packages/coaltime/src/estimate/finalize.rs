use crate::tree::tree::Tree;

/// Write branch lengths in generations from averaged node times in coalescent units.
///
/// Every non-root node gets `Ne * (avg[parent] - avg[node])`; the root gets 0.
pub fn write_branch_lengths(tree: &mut Tree, averages: &[f64], effective_size: f64) {
  let topology = tree.topology().clone();
  for node in 0..topology.num_nodes() {
    let branch_length = if topology.is_root(node) {
      0.0
    } else {
      effective_size * (averages[topology.parent(node)] - averages[node])
    };
    tree.set_branch_length(node, branch_length);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tree::examples::tests::get_four_leaf_tree;
  use eyre::Report;
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  #[rstest]
  fn scales_average_differences() -> Result<(), Report> {
    let mut tree = get_four_leaf_tree()?;
    let averages = [0.0, 0.0, 0.0, 0.0, 0.25, 0.5, 1.0];
    write_branch_lengths(&mut tree, &averages, 100.0);
    let branch_lengths: Vec<f64> = tree.nodes().iter().map(|node| node.branch_length).collect();
    assert_eq!(branch_lengths, vec![25.0, 25.0, 50.0, 50.0, 75.0, 50.0, 0.0]);
    Ok(())
  }
}
