/// Diploid effective population size used when none is given.
pub const DEFAULT_EFFECTIVE_SIZE: f64 = 30_000.0;

/// Per-base, per-generation mutation rate used when none is given.
pub const DEFAULT_MUTATION_RATE: f64 = 1.25e-8;

/// Number of refresh intervals spent in burn-in.
pub const BURN_IN_FACTOR: u64 = 100;

/// Lower bound on the refresh interval; the interval is `max(N / 10, MIN_REFRESH_INTERVAL)`.
pub const MIN_REFRESH_INTERVAL: u64 = 10;

/// Retime moves every internal node must receive before the order check, under a constant population size.
pub const MIXING_THRESHOLD_CONSTANT: u64 = 100;

/// Probability of proposing a retime move (rather than a switch move) under a constant population size.
pub const RETIME_PROBABILITY_CONSTANT: f64 = 0.5;

/// Probability of proposing a retime move under a piecewise-constant population history.
pub const RETIME_PROBABILITY_VARIABLE: f64 = 0.8;

/// Distance between consecutive sections in the per-section seed stream.
pub const SECTION_SEED_STRIDE: usize = 100;
