use crate::constants::{
  BURN_IN_FACTOR, DEFAULT_EFFECTIVE_SIZE, DEFAULT_MUTATION_RATE, MIN_REFRESH_INTERVAL, MIXING_THRESHOLD_CONSTANT,
  RETIME_PROBABILITY_CONSTANT, RETIME_PROBABILITY_VARIABLE,
};
use crate::make_error;
use clap::ValueEnum;
use eyre::Report;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

/// Population-genetic scaling between coalescent units and generations
#[derive(Copy, Clone, Debug, PartialEq, SmartDefault, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorParams {
  /// Diploid effective population size
  #[default(DEFAULT_EFFECTIVE_SIZE)]
  pub effective_size: f64,

  /// Mutation rate per base per generation
  #[default(DEFAULT_MUTATION_RATE)]
  pub mutation_rate: f64,
}

impl EstimatorParams {
  pub fn validate(&self) -> Result<(), Report> {
    if !(self.effective_size.is_finite() && self.effective_size > 0.0) {
      return make_error!(
        "Effective population size must be positive and finite, but found {}",
        self.effective_size
      );
    }
    if !(self.mutation_rate.is_finite() && self.mutation_rate > 0.0) {
      return make_error!("Mutation rate must be positive and finite, but found {}", self.mutation_rate);
    }
    Ok(())
  }
}

/// Starting state of the chain
#[derive(Copy, Clone, Debug, PartialEq, Eq, SmartDefault, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Initialization {
  /// Random ranking, expected coalescence times of the standard coalescent
  #[default]
  CoalescentPrior,

  /// Ranking and times derived from the branch lengths already present in the tree
  BranchLengths,
}

/// Tuning of the sampler. Unset values are derived from the tree size and the population model.
#[derive(Clone, Debug, PartialEq, SmartDefault, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorOptions {
  pub initialization: Initialization,

  /// Probability of proposing a retime move instead of a switch move, in `(0, 1]`. Only retimes advance mixing.
  pub retime_probability: Option<f64>,

  /// Length of burn-in, in refresh intervals
  #[default(BURN_IN_FACTOR)]
  pub burn_in_factor: u64,

  /// Retime proposals every rank must receive before convergence is tested
  pub mixing_threshold: Option<u64>,

  /// Maximum number of proposals after burn-in. The chain stops unconverged when it is reached.
  pub max_iterations: Option<u64>,

  /// Lower bound of the refresh interval
  #[default(MIN_REFRESH_INTERVAL)]
  pub min_delta: u64,
}

impl EstimatorOptions {
  pub fn validate(&self) -> Result<(), Report> {
    if let Some(p) = self.retime_probability {
      if !(p > 0.0 && p <= 1.0) {
        return make_error!("Retime probability must be within (0, 1], but found {p}.");
      }
    }
    if self.min_delta == 0 {
      return make_error!("Refresh interval lower bound must be at least 1");
    }
    Ok(())
  }

  pub fn retime_probability(&self, variable_population: bool) -> f64 {
    self.retime_probability.unwrap_or(if variable_population {
      RETIME_PROBABILITY_VARIABLE
    } else {
      RETIME_PROBABILITY_CONSTANT
    })
  }

  /// Number of proposals between full refreshes of the averages, `max(N / 10, min_delta)`
  pub fn refresh_interval(&self, num_leaves: usize) -> u64 {
    (num_leaves as u64 / 10).max(self.min_delta)
  }

  pub fn burn_in(&self, num_leaves: usize) -> u64 {
    self.burn_in_factor * self.refresh_interval(num_leaves)
  }

  pub fn mixing_threshold(&self, num_leaves: usize, variable_population: bool) -> u64 {
    self.mixing_threshold.unwrap_or(if variable_population {
      num_leaves as u64
    } else {
      MIXING_THRESHOLD_CONSTANT
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_ulps_eq;
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  #[rstest]
  #[case(4, 10, 1000)]
  #[case(100, 10, 1000)]
  #[case(250, 25, 2500)]
  fn derives_intervals_from_tree_size(#[case] num_leaves: usize, #[case] delta: u64, #[case] burn_in: u64) {
    let options = EstimatorOptions::default();
    assert_eq!(options.refresh_interval(num_leaves), delta);
    assert_eq!(options.burn_in(num_leaves), burn_in);
  }

  #[rstest]
  fn derives_population_dependent_defaults() {
    let options = EstimatorOptions::default();
    assert_ulps_eq!(options.retime_probability(false), 0.5);
    assert_ulps_eq!(options.retime_probability(true), 0.8);
    assert_eq!(options.mixing_threshold(50, false), 100);
    assert_eq!(options.mixing_threshold(50, true), 50);
  }

  #[rstest]
  fn reads_partial_options_from_json() -> Result<(), Report> {
    let options: EstimatorOptions = serde_json::from_str(r#"{ "initialization": "branch-lengths", "max_iterations": 5 }"#)?;
    assert_eq!(
      options,
      EstimatorOptions {
        initialization: Initialization::BranchLengths,
        max_iterations: Some(5),
        ..EstimatorOptions::default()
      }
    );
    Ok(())
  }

  #[rstest]
  #[case::zero(0.0)]
  #[case::negative(-0.1)]
  #[case::above_one(1.5)]
  #[case::nan(f64::NAN)]
  fn rejects_invalid_retime_probability(#[case] retime_probability: f64) {
    let options = EstimatorOptions {
      retime_probability: Some(retime_probability),
      ..EstimatorOptions::default()
    };
    assert!(options.validate().is_err());
  }

  #[rstest]
  #[case(0.05)]
  #[case(1.0)]
  fn accepts_valid_retime_probability(#[case] retime_probability: f64) -> Result<(), Report> {
    let options = EstimatorOptions {
      retime_probability: Some(retime_probability),
      ..EstimatorOptions::default()
    };
    options.validate()
  }

  #[rstest]
  fn rejects_invalid_values() {
    let params = EstimatorParams {
      effective_size: 0.0,
      ..EstimatorParams::default()
    };
    assert!(params.validate().is_err());
    let options = EstimatorOptions {
      retime_probability: Some(1.5),
      ..EstimatorOptions::default()
    };
    assert!(options.validate().is_err());
  }
}
