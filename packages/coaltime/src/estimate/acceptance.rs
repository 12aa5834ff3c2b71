use crate::estimate::log_ratio::LogRatio;
use rand::Rng;

/// Metropolis-Hastings decision.
///
/// Forced ratios are decided without touching the generator. A finite non-negative ratio is accepted outright,
/// otherwise a fresh uniform draw `u` accepts when `u <= exp(ratio)`.
pub fn accept(ratio: LogRatio, rng: &mut impl Rng) -> bool {
  match ratio {
    LogRatio::ForcedAccept => true,
    LogRatio::ForcedReject => false,
    LogRatio::Finite(ratio) if ratio >= 0.0 => true,
    LogRatio::Finite(ratio) => rng.gen::<f64>() <= ratio.exp(),
  }
}
