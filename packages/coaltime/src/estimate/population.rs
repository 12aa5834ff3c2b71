use crate::make_error;
use eyre::Report;
use serde::{Deserialize, Serialize};

/// Number of lineage pairs among `num_lineages` lineages, `C(m, 2)`.
#[inline]
pub fn choose_two(num_lineages: usize) -> f64 {
  let m = num_lineages as f64;
  m * (m - 1.0) / 2.0
}

/// Piecewise-constant coalescence rate through time, in coalescent units.
///
/// Epoch `i` covers `[epochs[i], epochs[i + 1])`, the last epoch is unbounded. A rate of zero marks an epoch in which no
/// coalescence may happen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationHistory {
  epochs: Vec<f64>,
  rates: Vec<f64>,
}

impl PopulationHistory {
  pub fn new(epochs: Vec<f64>, rates: Vec<f64>) -> Result<Self, Report> {
    if epochs.is_empty() {
      return make_error!("Population history requires at least one epoch");
    }
    if epochs.len() != rates.len() {
      return make_error!(
        "Population history has {} epochs, but {} coalescence rates",
        epochs.len(),
        rates.len()
      );
    }
    if epochs[0] != 0.0 {
      return make_error!("First epoch must start at time 0, but it starts at {}", epochs[0]);
    }
    if let Some(bad) = epochs.iter().find(|epoch| !epoch.is_finite()) {
      return make_error!("Epoch boundaries must be finite, but found {bad}");
    }
    if let Some(i) = (1..epochs.len()).find(|&i| epochs[i] <= epochs[i - 1]) {
      return make_error!(
        "Epoch boundaries must be strictly ascending, but epoch {i} starts at {} after {}",
        epochs[i],
        epochs[i - 1]
      );
    }
    if let Some(bad) = rates.iter().find(|rate| !rate.is_finite() || **rate < 0.0) {
      return make_error!("Coalescence rates must be finite and non-negative, but found {bad}");
    }
    if rates.iter().all(|&rate| rate == 0.0) {
      return make_error!("At least one epoch must have a positive coalescence rate");
    }
    Ok(Self { epochs, rates })
  }

  /// Constant population size: a single epoch with rate 1.
  pub fn constant() -> Self {
    Self {
      epochs: vec![0.0],
      rates: vec![1.0],
    }
  }

  pub fn epochs(&self) -> &[f64] {
    &self.epochs
  }

  pub fn rates(&self) -> &[f64] {
    &self.rates
  }

  /// Index of the epoch containing `time`. Times before the first boundary belong to the first epoch.
  pub fn epoch_index(&self, time: f64) -> usize {
    self.epochs.partition_point(|&epoch| epoch <= time).saturating_sub(1)
  }

  #[inline]
  pub fn rate_at(&self, time: f64) -> f64 {
    self.rates[self.epoch_index(time)]
  }

  /// Integral of the coalescence rate over `[start, end]`.
  pub fn integrated_rate(&self, start: f64, end: f64) -> f64 {
    if end <= start {
      return 0.0;
    }
    let first = self.epoch_index(start);
    let last = self.epoch_index(end);
    (first..=last)
      .map(|i| {
        let epoch_start = if i == first { start } else { self.epochs[i] };
        let epoch_end = if i == last { end } else { self.epochs[i + 1] };
        self.rates[i] * (epoch_end - epoch_start)
      })
      .sum()
  }

  /// Log-density of an inter-coalescence interval with `num_lineages` lineages, running from `start` and ending with a
  /// coalescence at `end`.
  ///
  /// Returns `None` when the interval ends inside a zero-rate epoch, where no coalescence can happen.
  pub fn log_interval_density(&self, num_lineages: usize, start: f64, end: f64) -> Option<f64> {
    let rate_at_end = self.rate_at(end);
    if rate_at_end == 0.0 {
      return None;
    }
    Some(-choose_two(num_lineages) * self.integrated_rate(start, end) + rate_at_end.ln())
  }
}

/// Coalescent prior over event times.
#[derive(Copy, Clone, Debug)]
pub enum CoalescentPrior<'a> {
  /// Constant population size, rate 1 in coalescent units
  Constant,
  Variable(&'a PopulationHistory),
}

impl<'a> CoalescentPrior<'a> {
  pub const fn from_history(history: Option<&'a PopulationHistory>) -> Self {
    match history {
      None => Self::Constant,
      Some(history) => Self::Variable(history),
    }
  }

  pub const fn is_variable(&self) -> bool {
    matches!(self, Self::Variable(_))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::{assert_relative_eq, assert_ulps_eq};
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  fn get_history() -> Result<PopulationHistory, Report> {
    PopulationHistory::new(vec![0.0, 1.0, 3.0], vec![2.0, 0.5, 1.0])
  }

  #[rstest]
  #[case::empty(vec![], vec![])]
  #[case::length_mismatch(vec![0.0, 1.0], vec![1.0])]
  #[case::late_start(vec![0.5, 1.0], vec![1.0, 1.0])]
  #[case::not_ascending(vec![0.0, 2.0, 1.0], vec![1.0, 1.0, 1.0])]
  #[case::duplicate_boundary(vec![0.0, 1.0, 1.0], vec![1.0, 1.0, 1.0])]
  #[case::negative_rate(vec![0.0, 1.0], vec![1.0, -1.0])]
  #[case::infinite_rate(vec![0.0], vec![f64::INFINITY])]
  #[case::all_zero(vec![0.0, 1.0], vec![0.0, 0.0])]
  fn rejects_invalid_history(#[case] epochs: Vec<f64>, #[case] rates: Vec<f64>) {
    assert!(PopulationHistory::new(epochs, rates).is_err());
  }

  #[rstest]
  #[case(0.0, 0)]
  #[case(0.999, 0)]
  #[case(1.0, 1)]
  #[case(2.5, 1)]
  #[case(3.0, 2)]
  #[case(100.0, 2)]
  fn finds_epoch(#[case] time: f64, #[case] expected: usize) -> Result<(), Report> {
    assert_eq!(get_history()?.epoch_index(time), expected);
    Ok(())
  }

  #[rstest]
  #[case::within_epoch(0.25, 0.75, 2.0 * 0.5)]
  #[case::across_one_boundary(0.5, 2.0, 2.0 * 0.5 + 0.5 * 1.0)]
  #[case::across_all_epochs(0.5, 4.0, 2.0 * 0.5 + 0.5 * 2.0 + 1.0 * 1.0)]
  #[case::empty(2.0, 2.0, 0.0)]
  fn integrates_rate(#[case] start: f64, #[case] end: f64, #[case] expected: f64) -> Result<(), Report> {
    assert_ulps_eq!(get_history()?.integrated_rate(start, end), expected);
    Ok(())
  }

  #[rstest]
  fn interval_density_includes_rate_at_end() -> Result<(), Report> {
    let density = get_history()?.log_interval_density(3, 0.5, 2.0);
    let expected = -3.0 * (2.0 * 0.5 + 0.5 * 1.0) + 0.5_f64.ln();
    assert_relative_eq!(density.unwrap_or(f64::NAN), expected, epsilon = 1e-12);
    Ok(())
  }

  #[rstest]
  fn interval_ending_in_zero_rate_epoch_is_impossible() -> Result<(), Report> {
    let history = PopulationHistory::new(vec![0.0, 0.5], vec![1.0, 0.0])?;
    assert_eq!(history.log_interval_density(2, 0.1, 0.7), None);
    assert!(history.log_interval_density(2, 0.1, 0.4).is_some());
    Ok(())
  }

  #[rstest]
  fn constant_history_matches_exponential_waiting_time() {
    let history = PopulationHistory::constant();
    let density = history.log_interval_density(4, 0.2, 0.7);
    assert_relative_eq!(density.unwrap_or(f64::NAN), -6.0 * 0.5, epsilon = 1e-12);
  }
}
