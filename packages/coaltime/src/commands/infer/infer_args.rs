use crate::constants::{BURN_IN_FACTOR, DEFAULT_EFFECTIVE_SIZE, DEFAULT_MUTATION_RATE, MIN_REFRESH_INTERVAL};
use crate::estimate::options::{EstimatorOptions, EstimatorParams, Initialization};
use clap::{Parser, ValueHint};
use std::fmt::Debug;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct CoaltimeInferArgs {
  /// Path to a section file (JSON) with tree topologies, mutation counts and site weights.
  ///
  /// Use `-` to read from standard input.
  #[clap(value_hint = ValueHint::FilePath)]
  pub input: PathBuf,

  /// Path to write the section with estimated branch lengths (JSON). Use `-` to write to standard output.
  #[clap(long, short = 'o')]
  #[clap(value_hint = ValueHint::FilePath)]
  pub output: PathBuf,

  /// Path to additionally write the dated trees in Newick format, one tree per line
  #[clap(long)]
  #[clap(value_hint = ValueHint::FilePath)]
  pub output_nwk: Option<PathBuf>,

  /// Coalescence rates through time (`.coal` file). If not provided, the population size is assumed constant.
  #[clap(long)]
  #[clap(value_hint = ValueHint::FilePath)]
  pub coal: Option<PathBuf>,

  /// Diploid effective population size
  #[clap(long, short = 'N', default_value_t = DEFAULT_EFFECTIVE_SIZE)]
  pub effective_size: f64,

  /// Mutation rate per base per generation
  #[clap(long, short = 'm', default_value_t = DEFAULT_MUTATION_RATE)]
  pub mutation_rate: f64,

  /// How to choose the starting point of the sampler
  #[clap(long, value_enum, default_value_t = Initialization::default())]
  pub initialization: Initialization,

  /// Probability of proposing a retime move rather than a reordering move.
  ///
  /// Must be positive. Defaults to 0.5 under a constant population size and to 0.8 with `--coal`.
  #[clap(long)]
  pub retime_probability: Option<f64>,

  /// Length of burn-in, in refresh intervals
  #[clap(long, default_value_t = BURN_IN_FACTOR)]
  pub burn_in_factor: u64,

  /// Number of retime proposals every event must receive before convergence is tested.
  ///
  /// Defaults to 100 under a constant population size and to the number of leaves with `--coal`.
  #[clap(long)]
  pub mixing_threshold: Option<u64>,

  /// Stop sampling a tree after this many proposals past burn-in, even if it has not converged
  #[clap(long)]
  pub max_iterations: Option<u64>,

  /// Lower bound on the number of proposals between convergence checks
  #[clap(long, default_value_t = MIN_REFRESH_INTERVAL)]
  pub min_delta: u64,

  /// Random seed of the pipeline. Together with chunk index and section, determines the seed of every tree.
  #[clap(long)]
  pub seed: Option<u64>,

  /// Index of the chunk the section belongs to
  #[clap(long, default_value_t = 0)]
  pub chunk_index: usize,

  /// Index of the section within its chunk
  #[clap(long, default_value_t = 0)]
  pub section: usize,
}

impl CoaltimeInferArgs {
  pub const fn params(&self) -> EstimatorParams {
    EstimatorParams {
      effective_size: self.effective_size,
      mutation_rate: self.mutation_rate,
    }
  }

  pub const fn options(&self) -> EstimatorOptions {
    EstimatorOptions {
      initialization: self.initialization,
      retime_probability: self.retime_probability,
      burn_in_factor: self.burn_in_factor,
      mixing_threshold: self.mixing_threshold,
      max_iterations: self.max_iterations,
      min_delta: self.min_delta,
    }
  }
}
