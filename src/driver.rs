//! Multi-pool simulation driver.
//!
//! Runs many independent bracket pools, keeps the bracket of every pool
//! winner, and feeds those brackets to the aggregate reports.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::analysis::{
    champion_picks, common_underdogs, upset_summary, ChampionFrequency, UnderdogFrequency,
    UpsetSummary,
};
use crate::config::{AnalysisConfig, AnalysisMode, FailurePolicy};
use crate::constants::upset_factors;
use crate::error::{Result, SimError};
use crate::pool::{BracketPool, PoolFactory, PoolStanding, StandardPoolFactory};
use crate::report::{fmt_float, TableRow};
use crate::standings::Standings;
use crate::tournament::{BracketFactory, StandingsBracketFactory, Tournament, TournamentResult};

/// The entry that won one pool.
#[derive(Clone, Debug)]
pub struct WinningBracket<B> {
    pub pool_id: usize,
    pub entry_name: String,
    pub upset_factor: f64,
    pub bracket: B,
    /// Picks the entry submitted to its pool
    pub picks: TournamentResult,
}

/// One row of the cumulative results table: a pool standing tagged with
/// its pool index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolResult {
    #[serde(flatten)]
    pub standing: PoolStanding,
    pub pool_id: usize,
}

impl TableRow for PoolResult {
    const COLUMNS: &'static [&'static str] =
        &["name", "avg_score", "std_score", "wins", "win_pct", "pool_id"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.standing.name.clone(),
            fmt_float(self.standing.avg_score),
            fmt_float(self.standing.std_score),
            fmt_float(self.standing.wins),
            fmt_float(self.standing.win_pct),
            self.pool_id.to_string(),
        ]
    }
}

/// Outcome of a call to [`BracketAnalysis::simulate_pools`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub pools_requested: usize,
    pub pools_completed: usize,
    pub failed_pools: Vec<usize>,
    pub elapsed: Duration,
}

struct PoolOutcome<P: BracketPool> {
    pool: P,
    winner: WinningBracket<P::Bracket>,
    standings: Vec<PoolStanding>,
}

/// Simulates bracket pools and analyses the brackets that win them.
///
/// `pools`, `winning_brackets` and `all_results` accumulate over one run
/// and are cleared when the next run starts.
pub struct BracketAnalysis<
    F: BracketFactory = StandingsBracketFactory,
    P: PoolFactory<F::Bracket> = StandardPoolFactory,
> {
    standings: Standings,
    factory: F,
    pool_factory: P,
    config: AnalysisConfig,
    pools: Vec<P::Pool>,
    winning_brackets: Vec<WinningBracket<F::Bracket>>,
    all_results: Vec<PoolResult>,
    failed_pools: Vec<usize>,
}

impl BracketAnalysis<StandingsBracketFactory> {
    /// Analysis over brackets seeded straight from the standings.
    pub fn new(standings: Standings, config: AnalysisConfig) -> Result<Self> {
        let factory = StandingsBracketFactory {
            field_size: config.field_size,
        };
        Self::with_factory(standings, factory, config)
    }
}

impl<F: BracketFactory> BracketAnalysis<F> {
    pub fn with_factory(standings: Standings, factory: F, config: AnalysisConfig) -> Result<Self> {
        Self::with_pool_factory(standings, factory, StandardPoolFactory, config)
    }
}

impl<F: BracketFactory, P: PoolFactory<F::Bracket>> BracketAnalysis<F, P> {
    /// Analysis with both the bracket source and the pool ranking supplied
    /// by the caller.
    pub fn with_pool_factory(
        standings: Standings,
        factory: F,
        pool_factory: P,
        config: AnalysisConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(BracketAnalysis {
            standings,
            factory,
            pool_factory,
            config,
            pools: Vec::new(),
            winning_brackets: Vec::new(),
            all_results: Vec::new(),
            failed_pools: Vec::new(),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn standings(&self) -> &Standings {
        &self.standings
    }

    pub fn pools(&self) -> &[P::Pool] {
        &self.pools
    }

    pub fn winning_brackets(&self) -> &[WinningBracket<F::Bracket>] {
        &self.winning_brackets
    }

    /// Every pool's ranked table, tagged with `pool_id`.
    pub fn all_results(&self) -> &[PoolResult] {
        &self.all_results
    }

    /// Pools skipped under [`FailurePolicy::FailSoft`] in the last run.
    pub fn failed_pools(&self) -> &[usize] {
        &self.failed_pools
    }

    /// Pools that produced a winner; the denominator of every frequency.
    pub fn completed_pools(&self) -> usize {
        self.winning_brackets.len()
    }

    /// Drop everything accumulated by the last run.
    pub fn reset(&mut self) {
        self.pools.clear();
        self.winning_brackets.clear();
        self.all_results.clear();
        self.failed_pools.clear();
    }

    /// Simulate `num_pools` pools of `entries_per_pool` entries each.
    pub fn run(&mut self, num_pools: usize, entries_per_pool: usize) -> Result<RunSummary> {
        let config = AnalysisConfig {
            num_pools,
            entries_per_pool,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        self.simulate_pools()
    }

    /// Simulate the configured number of pools.
    ///
    /// Under [`FailurePolicy::FailFast`] the first pool that still fails
    /// after `max_retries` extra attempts aborts the run; under
    /// [`FailurePolicy::FailSoft`] it is logged and skipped.
    pub fn simulate_pools(&mut self) -> Result<RunSummary> {
        self.reset();

        let num_pools = self.config.num_pools;
        let mut rng = match self.config.seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        let started = Instant::now();

        info!(
            num_pools,
            entries_per_pool = self.config.entries_per_pool,
            trials_per_pool = self.config.trials_per_pool,
            "beginning simulation"
        );

        for pool_id in 0..num_pools {
            if (pool_id + 1) % self.config.progress_interval == 0 {
                info!(
                    pool = pool_id + 1,
                    num_pools,
                    elapsed_secs = started.elapsed().as_secs_f64(),
                    "simulation progress"
                );
            }

            let mut attempt = 0;
            let outcome = loop {
                match self.simulate_one_pool(pool_id, &mut rng) {
                    Ok(outcome) => break Ok(outcome),
                    Err(e) if attempt < self.config.max_retries => {
                        attempt += 1;
                        warn!(pool_id, attempt, error = %e, "retrying pool");
                    }
                    Err(e) => break Err(e.in_pool(pool_id)),
                }
            };

            match outcome {
                Ok(PoolOutcome {
                    pool,
                    winner,
                    standings,
                }) => {
                    debug!(pool_id, winner = %winner.entry_name, upset_factor = winner.upset_factor, "pool complete");
                    self.all_results.extend(
                        standings
                            .into_iter()
                            .map(|standing| PoolResult { standing, pool_id }),
                    );
                    self.winning_brackets.push(winner);
                    self.pools.push(pool);
                }
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::FailFast => return Err(e),
                    FailurePolicy::FailSoft => {
                        warn!(pool_id, error = %e, "skipping failed pool");
                        self.failed_pools.push(pool_id);
                    }
                },
            }
        }

        let summary = RunSummary {
            pools_requested: num_pools,
            pools_completed: self.completed_pools(),
            failed_pools: self.failed_pools.clone(),
            elapsed: started.elapsed(),
        };
        info!(
            completed = summary.pools_completed,
            failed = summary.failed_pools.len(),
            elapsed_secs = summary.elapsed.as_secs_f64(),
            "simulation finished"
        );
        Ok(summary)
    }

    fn simulate_one_pool(&self, pool_id: usize, rng: &mut ChaCha8Rng) -> Result<PoolOutcome<P::Pool>> {
        let actual = self.factory.create_bracket(&self.standings, rng.gen())?;
        let mut pool = self.pool_factory.create_pool(actual);

        let factors = upset_factors(self.config.entries_per_pool);
        for (j, &upset_factor) in factors.iter().enumerate() {
            let mut bracket = self.factory.create_bracket(&self.standings, rng.gen())?;
            bracket.set_upset_factor(upset_factor);
            pool.add_entry(&format!("Entry_{}", j + 1), bracket)?;
        }

        let standings = pool.simulate_pool(self.config.trials_per_pool)?;
        let name = standings
            .first()
            .map(|s| s.name.clone())
            .ok_or(SimError::EmptyPool)?;

        let not_found = || SimError::WinnerNotFound {
            pool_id,
            name: name.clone(),
        };
        let index = pool
            .entries()
            .iter()
            .position(|(n, _)| *n == name)
            .ok_or_else(not_found)?;
        let bracket = pool.entries()[index].1.clone();
        let picks = pool.entry_picks(&name).cloned().ok_or_else(not_found)?;

        let winner = WinningBracket {
            pool_id,
            entry_name: name.clone(),
            upset_factor: factors[index],
            bracket,
            picks,
        };

        Ok(PoolOutcome {
            pool,
            winner,
            standings,
        })
    }

    /// Tournament outcomes the reports are computed over, one per winning
    /// bracket, in pool order.
    pub fn tournament_results(&mut self) -> Result<Vec<TournamentResult>> {
        match self.config.mode {
            AnalysisMode::Snapshot => Ok(self
                .winning_brackets
                .iter()
                .map(|w| w.picks.clone())
                .collect()),
            AnalysisMode::Resample if self.config.parallel => self
                .winning_brackets
                .par_iter_mut()
                .map(|w| w.bracket.simulate_tournament().map_err(|e| e.in_pool(w.pool_id)))
                .collect(),
            AnalysisMode::Resample => self
                .winning_brackets
                .iter_mut()
                .map(|w| w.bracket.simulate_tournament().map_err(|e| e.in_pool(w.pool_id)))
                .collect(),
        }
    }

    /// Upset statistics by round over the winning brackets.
    pub fn analyze_upsets(&mut self) -> Result<Vec<UpsetSummary>> {
        let results = self.tournament_results()?;
        Ok(upset_summary(&results))
    }

    /// Teams that most often outran their seed in winning brackets.
    pub fn find_common_underdogs(&mut self) -> Result<Vec<UnderdogFrequency>> {
        let results = self.tournament_results()?;
        common_underdogs(&results, self.completed_pools())
    }

    /// Champions picked by winning brackets.
    pub fn analyze_champion_picks(&mut self) -> Result<Vec<ChampionFrequency>> {
        let results = self.tournament_results()?;
        champion_picks(&results, self.completed_pools())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standings::StandingsRow;
    use std::collections::BTreeMap;

    fn make_standings(n: usize) -> Standings {
        Standings::new(
            (0..n)
                .map(|i| StandingsRow {
                    team: format!("Team{}", i),
                    conference: format!("Conf{}", i % 6),
                    rating: 28.0 - i as f64 * 0.6,
                })
                .collect(),
        )
    }

    fn small_config() -> AnalysisConfig {
        AnalysisConfig {
            num_pools: 6,
            entries_per_pool: 3,
            trials_per_pool: 25,
            field_size: 16,
            seed: Some(2024),
            ..Default::default()
        }
    }

    #[test]
    fn test_run_fills_accumulators() {
        let mut analysis = BracketAnalysis::new(make_standings(40), small_config()).unwrap();
        let summary = analysis.simulate_pools().unwrap();

        assert_eq!(summary.pools_requested, 6);
        assert_eq!(summary.pools_completed, 6);
        assert!(summary.failed_pools.is_empty());
        assert_eq!(analysis.pools().len(), 6);
        assert_eq!(analysis.winning_brackets().len(), 6);
        assert_eq!(analysis.all_results().len(), 18);

        let mut rows_per_pool: BTreeMap<usize, usize> = BTreeMap::new();
        for row in analysis.all_results() {
            *rows_per_pool.entry(row.pool_id).or_insert(0) += 1;
        }
        assert_eq!(rows_per_pool.len(), 6);
        assert!(rows_per_pool.values().all(|&n| n == 3));
    }

    #[test]
    fn test_winner_is_top_ranked_entry() {
        let mut analysis = BracketAnalysis::new(make_standings(40), small_config()).unwrap();
        analysis.simulate_pools().unwrap();

        for winner in analysis.winning_brackets() {
            let top = analysis
                .all_results()
                .iter()
                .find(|r| r.pool_id == winner.pool_id)
                .unwrap();
            assert_eq!(top.standing.name, winner.entry_name);

            let j: usize = winner.entry_name.trim_start_matches("Entry_").parse().unwrap();
            assert!((winner.upset_factor - upset_factors(3)[j - 1]).abs() < 1e-12);
            assert!(winner
                .bracket
                .games()
                .iter()
                .all(|g| (g.upset_factor - winner.upset_factor).abs() < 1e-12));
        }
    }

    #[test]
    fn test_run_overrides_counts() {
        let mut analysis = BracketAnalysis::new(make_standings(40), small_config()).unwrap();
        analysis.run(2, 4).unwrap();
        assert_eq!(analysis.winning_brackets().len(), 2);
        assert_eq!(analysis.all_results().len(), 8);

        // A second run starts from a clean slate
        analysis.run(3, 2).unwrap();
        assert_eq!(analysis.winning_brackets().len(), 3);
        assert_eq!(analysis.all_results().len(), 6);
    }

    #[test]
    fn test_run_rejects_zero_entries() {
        let mut analysis = BracketAnalysis::new(make_standings(40), small_config()).unwrap();
        assert!(matches!(analysis.run(3, 0), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let mut first = BracketAnalysis::new(make_standings(40), small_config()).unwrap();
        let mut second = BracketAnalysis::new(make_standings(40), small_config()).unwrap();
        first.simulate_pools().unwrap();
        second.simulate_pools().unwrap();

        assert_eq!(first.all_results(), second.all_results());
        assert_eq!(first.analyze_upsets().unwrap(), second.analyze_upsets().unwrap());
        assert_eq!(
            first.find_common_underdogs().unwrap(),
            second.find_common_underdogs().unwrap()
        );
        assert_eq!(
            first.analyze_champion_picks().unwrap(),
            second.analyze_champion_picks().unwrap()
        );
    }

    #[test]
    fn test_snapshot_reports_are_stable() {
        let mut analysis = BracketAnalysis::new(make_standings(40), small_config()).unwrap();
        analysis.simulate_pools().unwrap();
        let a = analysis.analyze_champion_picks().unwrap();
        let b = analysis.analyze_champion_picks().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_resample_mode_reports() {
        for parallel in [false, true] {
            let config = AnalysisConfig {
                mode: AnalysisMode::Resample,
                parallel,
                ..small_config()
            };
            let mut analysis = BracketAnalysis::new(make_standings(40), config).unwrap();
            analysis.simulate_pools().unwrap();

            let upsets = analysis.analyze_upsets().unwrap();
            let rounds: Vec<_> = upsets.iter().map(|u| u.round).collect();
            assert_eq!(rounds, crate::round::Round::schedule(16).unwrap().to_vec());

            let champions = analysis.analyze_champion_picks().unwrap();
            let total: f64 = champions.iter().map(|c| c.frequency).sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reports_before_run_are_empty() {
        let mut analysis = BracketAnalysis::new(make_standings(40), small_config()).unwrap();
        assert!(analysis.analyze_upsets().unwrap().is_empty());
        assert!(analysis.find_common_underdogs().unwrap().is_empty());
        assert!(analysis.analyze_champion_picks().unwrap().is_empty());
    }

    #[test]
    fn test_bad_standings_fail_with_pool_index() {
        let mut analysis = BracketAnalysis::new(make_standings(10), small_config()).unwrap();
        let err = analysis.simulate_pools().unwrap_err();
        assert_eq!(err.pool_id(), Some(0));
        assert!(matches!(
            err,
            SimError::Collaborator { ref source, .. } if matches!(**source, SimError::InvalidStandings(_))
        ));
    }

    #[test]
    fn test_pool_result_columns() {
        let row = PoolResult {
            standing: PoolStanding {
                name: "Entry_1".to_string(),
                avg_score: 1.0,
                std_score: f64::NAN,
                wins: 2.0,
                win_pct: 0.5,
            },
            pool_id: 4,
        };
        assert_eq!(row.cells().len(), PoolResult::COLUMNS.len());
        assert_eq!(row.cells()[5], "4");
        assert_eq!(row.cells()[2], "NaN");
    }
}
