//! Python bindings for the pool driver and its reports.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::analysis::ChampionFrequency;
use crate::config::{AnalysisConfig, AnalysisMode, FailurePolicy};
use crate::driver::BracketAnalysis;
use crate::error::SimError;
use crate::pool::PoolStanding;
use crate::standings::{Standings, StandingsRow};
use crate::team::Team;
use crate::win_prob::upset_adjusted_win_prob;

impl From<SimError> for PyErr {
    fn from(err: SimError) -> PyErr {
        match err {
            SimError::InvalidConfig(_)
            | SimError::InvalidStandings(_)
            | SimError::InvalidBracket(_)
            | SimError::UnknownRound(_)
            | SimError::InvalidTrials => PyValueError::new_err(err.to_string()),
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

/// Pool simulation and trend analysis.
#[pyclass(name = "BracketAnalysis", unsendable)]
pub struct PyBracketAnalysis {
    inner: BracketAnalysis,
}

#[pymethods]
impl PyBracketAnalysis {
    /// `standings` is a list of `(team, conference, rating)` tuples.
    #[new]
    #[pyo3(signature = (
        standings,
        num_pools = 100,
        trials_per_pool = 1000,
        field_size = 64,
        seed = None,
        fail_soft = false,
        max_retries = 0,
        resample = false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        standings: Vec<(String, String, f64)>,
        num_pools: usize,
        trials_per_pool: usize,
        field_size: usize,
        seed: Option<u64>,
        fail_soft: bool,
        max_retries: usize,
        resample: bool,
    ) -> PyResult<Self> {
        let rows = standings
            .into_iter()
            .map(|(team, conference, rating)| StandingsRow {
                team,
                conference,
                rating,
            })
            .collect();
        let config = AnalysisConfig {
            num_pools,
            trials_per_pool,
            field_size,
            seed,
            failure_policy: if fail_soft {
                FailurePolicy::FailSoft
            } else {
                FailurePolicy::FailFast
            },
            max_retries,
            mode: if resample {
                AnalysisMode::Resample
            } else {
                AnalysisMode::Snapshot
            },
            ..Default::default()
        };
        Ok(PyBracketAnalysis {
            inner: BracketAnalysis::new(Standings::new(rows), config)?,
        })
    }

    /// Simulate the pools; returns the number of pools completed.
    #[pyo3(signature = (entries_per_pool = 10))]
    fn simulate_pools(&mut self, entries_per_pool: usize) -> PyResult<usize> {
        let num_pools = self.inner.config().num_pools;
        let summary = self.inner.run(num_pools, entries_per_pool)?;
        Ok(summary.pools_completed)
    }

    /// Rows of `(round, avg_upsets, std_upsets, min_upsets, max_upsets)`.
    fn analyze_upsets(&mut self) -> PyResult<Vec<(String, f64, f64, usize, usize)>> {
        Ok(self
            .inner
            .analyze_upsets()?
            .into_iter()
            .map(|r| (r.round.to_string(), r.avg_upsets, r.std_upsets, r.min_upsets, r.max_upsets))
            .collect())
    }

    /// Rows of `(make_it_to, seed, team, frequency)`.
    fn find_common_underdogs(&mut self) -> PyResult<Vec<(String, u32, String, f64)>> {
        Ok(self
            .inner
            .find_common_underdogs()?
            .into_iter()
            .map(|r| (r.make_it_to.to_string(), r.seed, r.team, r.frequency))
            .collect())
    }

    fn analyze_champion_picks(&mut self) -> PyResult<Vec<ChampionFrequency>> {
        Ok(self.inner.analyze_champion_picks()?)
    }

    /// Rows of `(pool_id, standing)` for every simulated pool.
    fn all_results(&self) -> Vec<(usize, PoolStanding)> {
        self.inner
            .all_results()
            .iter()
            .map(|r| (r.pool_id, r.standing.clone()))
            .collect()
    }

    /// Names of the winning entries, in pool order.
    fn winning_entries(&self) -> Vec<(usize, String, f64)> {
        self.inner
            .winning_brackets()
            .iter()
            .map(|w| (w.pool_id, w.entry_name.clone(), w.upset_factor))
            .collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "BracketAnalysis({} teams, {} pools completed)",
            self.inner.standings().len(),
            self.inner.completed_pools()
        )
    }
}

/// Probability of team1 beating team2 under an upset factor.
#[pyfunction]
#[pyo3(name = "upset_adjusted_win_prob", signature = (team1, team2, upset_factor = 0.0))]
fn py_upset_adjusted_win_prob(team1: &Team, team2: &Team, upset_factor: f64) -> f64 {
    upset_adjusted_win_prob(team1, team2, upset_factor)
}

#[pymethods]
impl Team {
    #[new]
    #[pyo3(signature = (name, seed, conference, region = 0, rating = 0.0))]
    fn py_new(name: &str, seed: u32, conference: &str, region: usize, rating: f64) -> Self {
        Team::new(name, seed, conference, region, rating)
    }

    fn __repr__(&self) -> String {
        format!("Team({:?}, seed={}, {:?})", self.name, self.seed, self.conference)
    }
}

/// Python module definition
#[pymodule]
fn bracket_trends(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Team>()?;
    m.add_class::<PoolStanding>()?;
    m.add_class::<ChampionFrequency>()?;
    m.add_class::<PyBracketAnalysis>()?;

    m.add_function(wrap_pyfunction!(py_upset_adjusted_win_prob, m)?)?;

    m.add("ROUND_POINTS", crate::constants::ROUND_POINTS.to_vec())?;
    m.add("DEFAULT_TRIALS", crate::constants::DEFAULT_TRIALS)?;

    Ok(())
}
