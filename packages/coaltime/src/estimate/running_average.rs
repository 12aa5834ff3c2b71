use crate::tree::node::NodeId;
use crate::tree::topology::Topology;
use serde::{Deserialize, Serialize};

/// Ergodic mean of every node coordinate, updated lazily.
///
/// A node's coordinate only enters the mean when the node is touched or on a full refresh: the time since the last
/// update is accounted for at once, using the coordinate the node held during that time.
#[derive(Clone, Debug)]
pub struct RunningAverage {
  count: u64,
  averages: Vec<f64>,
  last_update: Vec<u64>,
  last_coordinates: Vec<f64>,
}

impl RunningAverage {
  /// Start averaging from a single sample: the current coordinates
  pub fn seeded(coordinates: &[f64]) -> Self {
    Self {
      count: 1,
      averages: coordinates.to_vec(),
      last_update: vec![1; coordinates.len()],
      last_coordinates: coordinates.to_vec(),
    }
  }

  #[inline]
  pub const fn count(&self) -> u64 {
    self.count
  }

  #[inline]
  pub fn averages(&self) -> &[f64] {
    &self.averages
  }

  /// Account for one more sample of the chain
  #[inline]
  pub fn advance(&mut self) {
    self.count += 1;
  }

  /// Bring the mean of a node up to date, given its coordinate in the current sample
  pub fn update(&mut self, node: NodeId, coordinate: f64) {
    let count = self.count as f64;
    let num_stale = (self.count - self.last_update[node]) as f64;
    let last = self.last_coordinates[node];
    let average = &mut self.averages[node];
    *average += (num_stale * (last - *average) + coordinate - last) / count;
    self.last_update[node] = self.count;
    self.last_coordinates[node] = coordinate;
  }

  /// Bring the means of all internal nodes up to date
  pub fn refresh_all(&mut self, topology: &Topology, coordinates: &[f64]) {
    for node in topology.internal_nodes() {
      self.update(node, coordinates[node]);
    }
  }
}

/// Progress of a chain toward convergence
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
  /// Proposals are made, but not averaged
  Burning,
  /// Waiting for every event to be retimed often enough
  Mixing,
  /// Waiting for the averaged times to be consistent with the topology
  Ordering,
  Converged,
}

/// Decides when a chain has converged, from retime counts and averaged coordinates.
///
/// After burn-in, every rank must be the target of at least `mixing_threshold` retime proposals. Once that has
/// happened, the chain converges at the first full refresh whose averages put every node below its parent.
#[derive(Clone, Debug)]
pub struct ConvergenceMonitor {
  phase: Phase,
  num_leaves: usize,
  mixing_threshold: u64,
  retime_counts: Vec<u64>,
}

impl ConvergenceMonitor {
  pub fn new(num_leaves: usize, mixing_threshold: u64) -> Self {
    Self {
      phase: Phase::Burning,
      num_leaves,
      mixing_threshold,
      retime_counts: vec![0; num_leaves - 1],
    }
  }

  #[inline]
  pub const fn phase(&self) -> Phase {
    self.phase
  }

  pub fn end_burn_in(&mut self) {
    if self.phase == Phase::Burning {
      self.phase = Phase::Mixing;
    }
  }

  /// Count a retime proposal targeting `rank`. Proposals made during burn-in are not counted.
  pub fn record_retime(&mut self, rank: usize) {
    if self.phase != Phase::Burning {
      self.retime_counts[rank - self.num_leaves] += 1;
    }
  }

  /// Advance the phase after a full refresh of the averages
  pub fn on_refresh(&mut self, topology: &Topology, averages: &[f64]) -> Phase {
    if self.phase == Phase::Mixing && self.retime_counts.iter().all(|&count| count >= self.mixing_threshold) {
      self.phase = Phase::Ordering;
    }
    if self.phase == Phase::Ordering && is_monotone(topology, averages) {
      self.phase = Phase::Converged;
    }
    self.phase
  }
}

/// Whether every internal node is no older than its parent
pub fn is_monotone(topology: &Topology, values: &[f64]) -> bool {
  topology
    .internal_nodes()
    .filter(|&node| !topology.is_root(node))
    .all(|node| values[node] <= values[topology.parent(node)])
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tree::examples::tests::get_four_leaf_tree;
  use approx::assert_relative_eq;
  use eyre::Report;
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  #[rstest]
  fn lazy_mean_equals_eager_mean() {
    // coordinate of a single node over 6 samples: 1, 1, 1, 4, 4, 2
    let mut average = RunningAverage::seeded(&[1.0]);
    for _ in 0..2 {
      average.advance();
    }
    average.advance();
    average.update(0, 4.0);
    average.advance();
    average.advance();
    average.update(0, 2.0);
    assert_eq!(average.count(), 6);
    assert_relative_eq!(average.averages()[0], 13.0 / 6.0, epsilon = 1e-12);
  }

  #[rstest]
  fn refresh_accounts_for_unchanged_samples() -> Result<(), Report> {
    let tree = get_four_leaf_tree()?;
    let coordinates = [0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0];
    let mut average = RunningAverage::seeded(&coordinates);
    average.advance();
    average.update(4, 2.0);
    average.advance();
    average.advance();
    let current = [0.0, 0.0, 0.0, 0.0, 2.0, 2.0, 3.0];
    average.refresh_all(tree.topology(), &current);
    assert_relative_eq!(average.averages()[4], (1.0 + 2.0 * 3.0) / 4.0, epsilon = 1e-12);
    assert_relative_eq!(average.averages()[5], 2.0, epsilon = 1e-12);
    assert_relative_eq!(average.averages()[0], 0.0);
    Ok(())
  }

  #[rstest]
  fn moves_through_phases() -> Result<(), Report> {
    let tree = get_four_leaf_tree()?;
    let ordered = [0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0];
    let unordered = [0.0, 0.0, 0.0, 0.0, 4.0, 2.0, 3.0];
    let mut monitor = ConvergenceMonitor::new(4, 2);

    for rank in 4..=6 {
      monitor.record_retime(rank);
      monitor.record_retime(rank);
    }
    assert_eq!(monitor.phase(), Phase::Burning);
    monitor.end_burn_in();
    assert_eq!(monitor.on_refresh(tree.topology(), &ordered), Phase::Mixing);

    for rank in 4..=6 {
      monitor.record_retime(rank);
    }
    assert_eq!(monitor.on_refresh(tree.topology(), &ordered), Phase::Mixing);
    for rank in 4..=6 {
      monitor.record_retime(rank);
    }
    assert_eq!(monitor.on_refresh(tree.topology(), &unordered), Phase::Ordering);
    assert_eq!(monitor.on_refresh(tree.topology(), &ordered), Phase::Converged);
    Ok(())
  }

  #[rstest]
  #[case([0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0], true)]
  #[case([0.0, 0.0, 0.0, 0.0, 3.0, 2.0, 3.0], true)]
  #[case([0.0, 0.0, 0.0, 0.0, 1.0, 3.5, 3.0], false)]
  fn checks_monotone_averages(#[case] values: [f64; 7], #[case] expected: bool) -> Result<(), Report> {
    let tree = get_four_leaf_tree()?;
    assert_eq!(is_monotone(tree.topology(), &values), expected);
    Ok(())
  }
}
