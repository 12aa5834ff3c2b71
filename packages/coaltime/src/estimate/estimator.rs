use crate::estimate::chain_state::{ChainState, MoveOutcome};
use crate::estimate::finalize::write_branch_lengths;
use crate::estimate::initialize::initialize;
use crate::estimate::mutation_rate::mutation_rates;
use crate::estimate::options::{EstimatorOptions, EstimatorParams};
use crate::estimate::population::{CoalescentPrior, PopulationHistory};
use crate::estimate::retime::retime;
use crate::estimate::running_average::{ConvergenceMonitor, Phase, RunningAverage};
use crate::estimate::switch_order::switch_order;
use crate::tree::tree::Tree;
use crate::utils::random::get_random_number_generator;
use eyre::{Report, WrapErr};
use getset::CopyGetters;
use log::{debug, trace, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Diagnostics of one estimation
#[must_use]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, CopyGetters)]
pub struct EstimationReport {
  /// Proposals made, burn-in included
  #[getset(get_copy = "pub")]
  num_proposals: u64,

  #[getset(get_copy = "pub")]
  num_accepted: u64,

  /// Full refreshes of the running averages
  #[getset(get_copy = "pub")]
  num_refreshes: u64,

  /// Whether the chain met the convergence criterion, rather than hitting the iteration cap
  #[getset(get_copy = "pub")]
  converged: bool,
}

impl EstimationReport {
  pub fn acceptance_rate(&self) -> f64 {
    if self.num_proposals == 0 {
      0.0
    } else {
      self.num_accepted as f64 / self.num_proposals as f64
    }
  }
}

/// Estimate the branch lengths of a tree with fixed topology from the mutations mapped onto its branches.
///
/// Samples coalescence times and their ranking with Metropolis-Hastings, and writes the ergodic means of the node
/// times, in generations, into the branch lengths of the tree. Without a population history, the population size
/// is constant.
pub fn estimate_branch_lengths(
  tree: &mut Tree,
  site_weights: &[f64],
  params: &EstimatorParams,
  options: &EstimatorOptions,
  history: Option<&PopulationHistory>,
  seed: Option<u64>,
) -> Result<EstimationReport, Report> {
  params.validate()?;
  options.validate()?;

  let mut rng = get_random_number_generator(seed);
  let mut_rate = mutation_rates(tree, site_weights, params.effective_size, params.mutation_rate)
    .wrap_err("When computing mutation rates")?;
  let state = initialize(
    tree,
    mut_rate,
    options.initialization,
    params.effective_size,
    &mut rng,
  )
  .wrap_err("When initializing the sampler")?;

  let prior = CoalescentPrior::from_history(history);
  let mut sampler = Sampler {
    state,
    prior,
    retime_probability: options.retime_probability(prior.is_variable()),
    rng,
    report: EstimationReport::default(),
  };

  let averages = run_chain(&mut sampler, options);
  write_branch_lengths(tree, averages.averages(), params.effective_size);
  Ok(sampler.report)
}

fn run_chain<R: Rng>(sampler: &mut Sampler<'_, R>, options: &EstimatorOptions) -> RunningAverage {
  let num_leaves = sampler.state.num_leaves();
  let variable_population = sampler.prior.is_variable();
  let delta = options.refresh_interval(num_leaves);
  let burn_in = options.burn_in(num_leaves);
  let mixing_threshold = options.mixing_threshold(num_leaves, variable_population);
  debug!(
    "Estimating branch lengths of a tree with {num_leaves} leaves: burn-in {burn_in}, refresh every {delta} proposals, \
     {mixing_threshold} retimes per event, {} population size",
    if variable_population { "variable" } else { "constant" }
  );

  let mut monitor = ConvergenceMonitor::new(num_leaves, mixing_threshold);
  for _ in 0..burn_in {
    sampler.step(&mut monitor);
  }
  monitor.end_burn_in();

  let mut averages = RunningAverage::seeded(sampler.state.coordinates());
  let mut num_sampled = 0_u64;
  let converged = loop {
    if let Some(max_iterations) = options.max_iterations {
      if num_sampled >= max_iterations {
        warn!(
          "Branch lengths did not converge within {max_iterations} proposals (phase: {:?}). Using the averages so far.",
          monitor.phase()
        );
        break false;
      }
    }

    averages.advance();
    let outcome = sampler.step(&mut monitor);
    for node in outcome.touched() {
      averages.update(node, sampler.state.coordinates()[node]);
    }
    num_sampled += 1;

    if averages.count() % delta == 0 {
      averages.refresh_all(sampler.state.topology(), sampler.state.coordinates());
      sampler.report.num_refreshes += 1;
      let phase = monitor.on_refresh(sampler.state.topology(), averages.averages());
      trace!("Refresh {}: phase {phase:?}", sampler.report.num_refreshes);
      if phase == Phase::Converged {
        break true;
      }
    }
  };

  averages.refresh_all(sampler.state.topology(), sampler.state.coordinates());
  sampler.report.converged = converged;
  debug!(
    "Finished after {} proposals ({} after burn-in), acceptance rate {:.3}, converged: {converged}",
    sampler.report.num_proposals,
    num_sampled,
    sampler.report.acceptance_rate()
  );
  averages
}

struct Sampler<'a, R: Rng> {
  state: ChainState,
  prior: CoalescentPrior<'a>,
  retime_probability: f64,
  rng: R,
  report: EstimationReport,
}

impl<'a, R: Rng> Sampler<'a, R> {
  /// Draw and decide one proposal: a switch of two events or a retime of one event
  fn step(&mut self, monitor: &mut ConvergenceMonitor) -> MoveOutcome {
    let num_leaves = self.state.num_leaves();
    let outcome = if self.rng.gen::<f64>() < 1.0 - self.retime_probability {
      if num_leaves < 3 {
        MoveOutcome::Invalid
      } else {
        let rank = self.rng.gen_range(num_leaves..=(2 * num_leaves - 3));
        switch_order(&mut self.state, rank, &mut self.rng)
      }
    } else {
      let rank = self.rng.gen_range(num_leaves..=(2 * num_leaves - 2));
      monitor.record_retime(rank);
      retime(&mut self.state, rank, self.prior, &mut self.rng)
    };

    self.report.num_proposals += 1;
    if outcome.is_accepted() {
      self.report.num_accepted += 1;
    }
    outcome
  }
}
