#[cfg(feature = "python")]
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::HashSet;

use crate::error::{Result, SimError};
use crate::tournament::{Tournament, TournamentResult};

/// One entry's line in a ranked pool table.
#[cfg_attr(feature = "python", pyclass(get_all))]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolStanding {
    pub name: String,

    /// Mean score across trials
    pub avg_score: f64,

    /// Sample standard deviation of the score (NaN for a single trial)
    pub std_score: f64,

    /// Trials won; a shared top score splits the win
    pub wins: f64,

    pub win_pct: f64,
}

/// Score an entry's picks against one actual outcome.
///
/// Each correctly picked game winner earns the round's points.
pub fn score_bracket(picks: &TournamentResult, actual: &TournamentResult) -> f64 {
    actual
        .rounds()
        .iter()
        .map(|actual_round| {
            let Some(picked_round) = picks.round(actual_round.round) else {
                return 0.0;
            };
            let advanced: HashSet<&str> = actual_round.winners().map(|t| t.name.as_str()).collect();
            let hits = picked_round
                .winners()
                .filter(|t| advanced.contains(t.name.as_str()))
                .count();
            hits as f64 * actual_round.round.points()
        })
        .sum()
}

/// Ranks competing entries against an actual bracket.
///
/// The driver only relies on these operations, so any ranking engine can
/// stand in for [`Pool`].
pub trait BracketPool {
    type Bracket: Tournament;

    /// Register an entry. Names must be unique within the pool.
    fn add_entry(&mut self, name: &str, bracket: Self::Bracket) -> Result<()>;

    fn entries(&self) -> &[(String, Self::Bracket)];

    /// Rank the entries over `num_trials` trials, best first.
    fn simulate_pool(&mut self, num_trials: usize) -> Result<Vec<PoolStanding>>;

    /// Picks the named entry submitted in the last `simulate_pool` call.
    fn entry_picks(&self, name: &str) -> Option<&TournamentResult>;
}

/// Builds one pool around each actual bracket.
pub trait PoolFactory<B: Tournament> {
    type Pool: BracketPool<Bracket = B>;

    fn create_pool(&self, actual: B) -> Self::Pool;
}

/// Factory for the built-in [`Pool`].
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardPoolFactory;

impl<B: Tournament> PoolFactory<B> for StandardPoolFactory {
    type Pool = Pool<B>;

    fn create_pool(&self, actual: B) -> Pool<B> {
        Pool::new(actual)
    }
}

/// A bracket pool: one actual bracket and the entries competing against it.
#[derive(Clone, Debug)]
pub struct Pool<B: Tournament> {
    actual: B,
    entries: Vec<(String, B)>,
    picks: Vec<TournamentResult>,
}

impl<B: Tournament> Pool<B> {
    pub fn new(actual: B) -> Self {
        Pool {
            actual,
            entries: Vec::new(),
            picks: Vec::new(),
        }
    }
}

impl<B: Tournament> BracketPool for Pool<B> {
    type Bracket = B;

    fn add_entry(&mut self, name: &str, bracket: B) -> Result<()> {
        if self.entries.iter().any(|(n, _)| n == name) {
            return Err(SimError::InvalidConfig(format!("duplicate entry name {:?}", name)));
        }
        self.entries.push((name.to_string(), bracket));
        Ok(())
    }

    fn entries(&self) -> &[(String, B)] {
        &self.entries
    }

    fn entry_picks(&self, name: &str) -> Option<&TournamentResult> {
        self.entries
            .iter()
            .position(|(n, _)| n == name)
            .and_then(|i| self.picks.get(i))
    }

    /// Each entry's picks are drawn once from its own bracket; the actual
    /// bracket is replayed every trial. Rows come back sorted by win
    /// percentage, then average score, then name.
    fn simulate_pool(&mut self, num_trials: usize) -> Result<Vec<PoolStanding>> {
        if self.entries.is_empty() {
            return Err(SimError::EmptyPool);
        }
        if num_trials == 0 {
            return Err(SimError::InvalidTrials);
        }

        self.picks = self
            .entries
            .iter_mut()
            .map(|(_, bracket)| bracket.simulate_tournament())
            .collect::<Result<Vec<_>>>()?;

        let n = self.entries.len();
        let mut scores: Vec<Vec<f64>> = vec![Vec::with_capacity(num_trials); n];
        let mut wins = vec![0.0; n];

        for _ in 0..num_trials {
            let actual = self.actual.simulate_tournament()?;
            let trial: Vec<f64> = self.picks.iter().map(|p| score_bracket(p, &actual)).collect();

            let best = trial.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let leaders = trial.iter().filter(|&&s| s == best).count() as f64;
            for (i, &score) in trial.iter().enumerate() {
                scores[i].push(score);
                if score == best {
                    wins[i] += 1.0 / leaders;
                }
            }
        }

        let mut standings: Vec<PoolStanding> = self
            .entries
            .iter()
            .zip(scores.iter().zip(wins))
            .map(|((name, _), (entry_scores, entry_wins))| PoolStanding {
                name: name.clone(),
                avg_score: entry_scores.iter().mean(),
                std_score: entry_scores.iter().std_dev(),
                wins: entry_wins,
                win_pct: entry_wins / num_trials as f64,
            })
            .collect();

        standings.sort_by(|a, b| {
            b.win_pct
                .total_cmp(&a.win_pct)
                .then_with(|| b.avg_score.total_cmp(&a.avg_score))
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(standings)
    }
}
