/// National average tempo (possessions per game)
pub const AVG_TEMPO: f64 = 67.7;

/// Standard deviation of scoring margin
pub const SCORING_STDDEV: f64 = 11.0;

/// Points awarded per correct pick, First Round through Championship
pub const ROUND_POINTS: [f64; 6] = [10.0, 20.0, 40.0, 80.0, 160.0, 320.0];

/// Largest supported field (six rounds)
pub const MAX_FIELD_SIZE: usize = 64;

/// Number of regions in a full field
pub const NUM_REGIONS: usize = 4;

/// Upset factor handed to the most conservative entry
pub const BASE_UPSET_FACTOR: f64 = 0.1;

/// Width of the upset factor gradient across a pool's entries
pub const UPSET_FACTOR_SPREAD: f64 = 0.3;

/// Trials used to rank the entries of one pool
pub const DEFAULT_TRIALS: usize = 1000;

/// Pools between two progress reports
pub const PROGRESS_INTERVAL: usize = 100;

/// Evenly spaced upset factors for the entries of one pool.
///
/// `factor(j) = 0.1 + (j / entries) * 0.3`, strictly increasing in `j`.
pub fn upset_factors(entries: usize) -> Vec<f64> {
    (0..entries)
        .map(|j| BASE_UPSET_FACTOR + (j as f64 / entries as f64) * UPSET_FACTOR_SPREAD)
        .collect()
}
