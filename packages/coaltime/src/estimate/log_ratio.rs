use std::ops::{Add, AddAssign};

/// Log Metropolis-Hastings ratio of a proposal.
///
/// Degenerate proposals short-circuit the decision instead of producing infinities: `ForcedReject` dominates
/// `ForcedAccept`, which dominates any finite contribution.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LogRatio {
  Finite(f64),
  ForcedAccept,
  ForcedReject,
}

impl LogRatio {
  pub const ZERO: Self = Self::Finite(0.0);

  /// Poisson log-likelihood ratio of a single branch whose length changes from `old` to `new`, given the observed
  /// mutation `count` and the expected mutation `rate` per unit of time.
  pub fn branch(rate: f64, count: u32, old: f64, new: f64) -> Self {
    if new <= 0.0 {
      Self::ForcedReject
    } else if old == 0.0 {
      Self::ForcedAccept
    } else {
      Self::Finite(rate * (old - new) + f64::from(count) * (new / old).ln())
    }
  }

  /// Ratio from the log-densities of the new and the old state; `None` marks an impossible state.
  pub fn from_log_densities(new: Option<f64>, old: Option<f64>) -> Self {
    match (new, old) {
      (None, _) => Self::ForcedReject,
      (Some(_), None) => Self::ForcedAccept,
      (Some(new), Some(old)) => Self::Finite(new - old),
    }
  }
}

impl Default for LogRatio {
  fn default() -> Self {
    Self::ZERO
  }
}

impl Add for LogRatio {
  type Output = Self;

  fn add(self, rhs: Self) -> Self {
    match (self, rhs) {
      (Self::ForcedReject, _) | (_, Self::ForcedReject) => Self::ForcedReject,
      (Self::ForcedAccept, _) | (_, Self::ForcedAccept) => Self::ForcedAccept,
      (Self::Finite(a), Self::Finite(b)) => Self::Finite(a + b),
    }
  }
}

impl Add<f64> for LogRatio {
  type Output = Self;

  fn add(self, rhs: f64) -> Self {
    self + Self::Finite(rhs)
  }
}

impl AddAssign for LogRatio {
  fn add_assign(&mut self, rhs: Self) {
    *self = *self + rhs;
  }
}

impl AddAssign<f64> for LogRatio {
  fn add_assign(&mut self, rhs: f64) {
    *self = *self + rhs;
  }
}
