use crate::estimate::population::PopulationHistory;
use crate::io::fs::read_file_to_string;
use crate::make_error;
use eyre::{Report, WrapErr};
use std::path::Path;

/// Read a population history from a coalescence-rate (`.coal`) file.
///
/// The file has a header line with group names, a line of epoch starts in generations, and a line
/// `<group> <group> <rate>...` with per-generation coalescence rates. Epochs are rescaled to coalescent units by the
/// effective population size and rates by its inverse.
pub fn read_coal_file(filepath: impl AsRef<Path>, effective_size: f64) -> Result<PopulationHistory, Report> {
  let filepath = filepath.as_ref();
  let content = read_file_to_string(filepath)?;
  parse_coal(&content, effective_size)
    .wrap_err_with(|| format!("When reading coalescence rates from '{}'", filepath.display()))
}

pub fn parse_coal(content: &str, effective_size: f64) -> Result<PopulationHistory, Report> {
  let mut lines = content.lines().filter(|line| !line.trim().is_empty());

  if lines.next().is_none() {
    return make_error!("Expected a header line with group names, but the input is empty");
  }
  let Some(epoch_line) = lines.next() else {
    return make_error!("Expected a line with epoch boundaries");
  };
  let Some(rate_line) = lines.next() else {
    return make_error!("Expected a line with coalescence rates");
  };

  let epochs = parse_numbers(epoch_line.split_whitespace())
    .wrap_err("When parsing epoch boundaries")?
    .into_iter()
    .map(|epoch| epoch / effective_size)
    .collect();

  let mut rate_tokens = rate_line.split_whitespace();
  if rate_tokens.by_ref().take(2).count() < 2 {
    return make_error!("Expected two group labels before the coalescence rates");
  }
  let rates = parse_numbers(rate_tokens).wrap_err("When parsing coalescence rates")?;
  let rates = fill_zero_rates(&rates).into_iter().map(|rate| rate * effective_size).collect();

  PopulationHistory::new(epochs, rates)
}

fn parse_numbers<'a>(tokens: impl Iterator<Item = &'a str>) -> Result<Vec<f64>, Report> {
  tokens
    .map(|token| {
      token
        .parse::<f64>()
        .wrap_err_with(|| format!("Expected a number, but found '{token}'"))
    })
    .collect()
}

/// Replace unestimated (zero) rates.
///
/// A zero following a positive rate repeats the previous rate. Zeros before the first positive rate take the next
/// positive rate, or 1 if there is none.
fn fill_zero_rates(rates: &[f64]) -> Vec<f64> {
  let mut filled: Vec<f64> = Vec::with_capacity(rates.len());
  for &rate in rates {
    match filled.last() {
      Some(&previous) if rate == 0.0 && previous > 0.0 => filled.push(previous),
      _ => filled.push(rate),
    }
  }

  for i in (1..filled.len()).rev() {
    if filled[i - 1] == 0.0 {
      filled[i - 1] = if filled[i] > 0.0 { filled[i] } else { 1.0 };
    }
  }
  filled
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  #[rstest]
  #[case::no_zeros(vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0])]
  #[case::zero_after_positive(vec![1.0, 0.0, 0.0, 3.0], vec![1.0, 1.0, 1.0, 3.0])]
  #[case::leading_zeros(vec![0.0, 0.0, 2.0, 0.0], vec![2.0, 2.0, 2.0, 2.0])]
  #[case::all_zeros(vec![0.0, 0.0, 0.0], vec![1.0, 1.0, 0.0])]
  fn fills_zero_rates(#[case] rates: Vec<f64>, #[case] expected: Vec<f64>) {
    assert_eq!(fill_zero_rates(&rates), expected);
  }

  #[rstest]
  fn parses_coal_file() -> Result<(), Report> {
    let content = "0 1 2\n0 1000 5000\n0 0 0.0001 0 0.0004\n";
    let history = parse_coal(content, 10_000.0)?;
    assert_eq!(history.epochs().len(), 3);
    assert_relative_eq!(history.epochs()[1], 0.1, epsilon = 1e-12);
    assert_relative_eq!(history.epochs()[2], 0.5, epsilon = 1e-12);
    assert_relative_eq!(history.rates()[0], 1.0, epsilon = 1e-12);
    assert_relative_eq!(history.rates()[1], 1.0, epsilon = 1e-12);
    assert_relative_eq!(history.rates()[2], 4.0, epsilon = 1e-12);
    Ok(())
  }

  #[rstest]
  #[case::empty("")]
  #[case::missing_rates("0\n0 100\n")]
  #[case::mismatched_lengths("0\n0 100 200\n0 0 1e-4 1e-4\n")]
  #[case::not_a_number("0\n0 abc\n0 0 1e-4 1e-4\n")]
  #[case::missing_labels("0\n0\n0\n")]
  fn rejects_malformed_coal_file(#[case] content: &str) {
    assert!(parse_coal(content, 1.0).is_err());
  }
}
