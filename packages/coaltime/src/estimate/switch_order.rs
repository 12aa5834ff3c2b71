use crate::estimate::acceptance::accept;
use crate::estimate::chain_state::{ChainState, MoveOutcome};
use crate::estimate::log_ratio::LogRatio;
use crate::tree::node::NodeId;
use rand::Rng;

/// Propose exchanging the coalescence event at `rank` with another event inside its window.
///
/// The two nodes swap ranks and coordinates, so the multiset of event times is unchanged. Six branches change: the
/// own branch and both child branches of each node. The candidate is drawn from a window that looks the same from
/// both sides of the exchange, so no proposal correction applies.
pub fn switch_order(state: &mut ChainState, rank: usize, rng: &mut impl Rng) -> MoveOutcome {
  debug_assert!(rank >= state.num_leaves() && rank + 3 <= 2 * state.num_leaves());

  let Some(partner) = state.order().draw_switch_partner(state.topology(), rank, rng) else {
    return MoveOutcome::Invalid;
  };
  let node = state.order().node(rank);

  if accept(switch_log_ratio(state, node, partner), rng) {
    state.switch_events(node, partner);
    MoveOutcome::Accepted {
      node,
      partner: Some(partner),
    }
  } else {
    MoveOutcome::Rejected
  }
}

fn switch_log_ratio(state: &ChainState, node: NodeId, partner: NodeId) -> LogRatio {
  let coordinates = state.coordinates();
  state.adjacent_branches_log_ratio(node, coordinates[partner])
    + state.adjacent_branches_log_ratio(partner, coordinates[node])
}
