use crate::estimate::acceptance::accept;
use crate::estimate::chain_state::{ChainState, MoveOutcome};
use crate::estimate::log_ratio::LogRatio;
use crate::estimate::population::{choose_two, CoalescentPrior};
use rand::Rng;

/// Propose a new time for the coalescence event at `rank`, keeping the ranking.
///
/// The root draws a new top interval `tau_new = -ln(U) * tau_old` (mean-preserving, with a Hastings correction). Any
/// other event draws its time uniformly between the neighboring events in the ranking.
pub fn retime(state: &mut ChainState, rank: usize, prior: CoalescentPrior, rng: &mut impl Rng) -> MoveOutcome {
  let num_leaves = state.num_leaves();
  let root_rank = 2 * num_leaves - 2;
  debug_assert!((num_leaves..=root_rank).contains(&rank));

  let node = state.order().node(rank);
  let previous = state.coordinate_at_rank(rank - 1);
  let old = state.coordinates()[node];

  let (new, mut ratio) = if rank == root_rank {
    let tau_old = old - previous;
    let tau_new = -(1.0 - rng.gen::<f64>()).ln() * tau_old;
    if tau_new <= 0.0 {
      return MoveOutcome::Rejected;
    }
    (previous + tau_new, LogRatio::Finite(hastings_correction(tau_old, tau_new)))
  } else {
    let next = state.coordinate_at_rank(rank + 1);
    (previous + rng.gen::<f64>() * (next - previous), LogRatio::ZERO)
  };

  ratio += prior_log_ratio(state, prior, rank, old, new);
  ratio += state.adjacent_branches_log_ratio(node, new);

  if accept(ratio, rng) {
    state.set_coordinate(node, new);
    MoveOutcome::Accepted { node, partner: None }
  } else {
    MoveOutcome::Rejected
  }
}

/// Log of `q(old | new) / q(new | old)` for the exponential proposal of the root interval
fn hastings_correction(tau_old: f64, tau_new: f64) -> f64 {
  (tau_old / tau_new).ln() + tau_new / tau_old - tau_old / tau_new
}

/// Log prior ratio of moving the event at `rank` from `old` to `new`.
///
/// Only the two inter-coalescence intervals adjacent to the event change: interval `rank` (`m` lineages, ending at
/// the event) and, below the root, interval `rank + 1` (`m - 1` lineages, ending at the next event).
pub(crate) fn prior_log_ratio(state: &ChainState, prior: CoalescentPrior, rank: usize, old: f64, new: f64) -> LogRatio {
  let num_leaves = state.num_leaves();
  let is_root = rank == 2 * num_leaves - 2;
  let num_lineages = num_leaves.min(2 * num_leaves - rank);

  match prior {
    CoalescentPrior::Constant => {
      let delta = new - old;
      if is_root {
        LogRatio::Finite(-choose_two(num_lineages) * delta)
      } else {
        LogRatio::Finite((choose_two(num_lineages - 1) - choose_two(num_lineages)) * delta)
      }
    }
    CoalescentPrior::Variable(history) => {
      let previous = state.coordinate_at_rank(rank - 1);
      let log_density = |time: f64| {
        let below = history.log_interval_density(num_lineages, previous, time)?;
        if is_root {
          return Some(below);
        }
        let next = state.coordinate_at_rank(rank + 1);
        let above = history.log_interval_density(num_lineages - 1, time, next)?;
        Some(below + above)
      };
      LogRatio::from_log_densities(log_density(new), log_density(old))
    }
  }
}
