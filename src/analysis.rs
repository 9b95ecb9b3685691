//! Aggregate statistics over the tournaments won by pool winners.

#[cfg(feature = "python")]
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, SimError};
use crate::report::{fmt_float, TableRow};
use crate::round::Round;
use crate::tournament::TournamentResult;

/// Upset counts for one round across all winning brackets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpsetSummary {
    pub round: Round,
    pub avg_upsets: f64,
    /// Sample standard deviation; NaN with a single bracket
    pub std_upsets: f64,
    pub min_upsets: usize,
    pub max_upsets: usize,
}

/// How often a team reached a round its seed should not reach.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnderdogFrequency {
    pub make_it_to: Round,
    pub seed: u32,
    pub team: String,
    pub frequency: f64,
}

/// How often a team was the champion of a winning bracket.
#[cfg_attr(feature = "python", pyclass(get_all))]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChampionFrequency {
    pub seed: u32,
    pub team: String,
    pub conference: String,
    pub frequency: f64,
}

impl TableRow for UpsetSummary {
    const COLUMNS: &'static [&'static str] =
        &["round", "avg_upsets", "std_upsets", "min_upsets", "max_upsets"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.round.to_string(),
            fmt_float(self.avg_upsets),
            fmt_float(self.std_upsets),
            self.min_upsets.to_string(),
            self.max_upsets.to_string(),
        ]
    }
}

impl TableRow for UnderdogFrequency {
    const COLUMNS: &'static [&'static str] = &["make_it_to", "seed", "team", "frequency"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.make_it_to.to_string(),
            self.seed.to_string(),
            self.team.clone(),
            fmt_float(self.frequency),
        ]
    }
}

impl TableRow for ChampionFrequency {
    const COLUMNS: &'static [&'static str] = &["seed", "team", "conference", "frequency"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.seed.to_string(),
            self.team.clone(),
            self.conference.clone(),
            fmt_float(self.frequency),
        ]
    }
}

fn check_denominator(num_pools: usize, results: &[TournamentResult]) -> Result<()> {
    if num_pools == 0 && !results.is_empty() {
        return Err(SimError::InvalidConfig(
            "num_pools must be positive to normalise frequencies".to_string(),
        ));
    }
    if num_pools < results.len() {
        return Err(SimError::InvalidConfig(format!(
            "num_pools ({}) is smaller than the number of results ({})",
            num_pools,
            results.len()
        )));
    }
    Ok(())
}

/// Per-round upset statistics, one row per round in chronological order.
///
/// An upset is a game won by the team with the worse (numerically larger)
/// seed; each bracket contributes one count per round it played. Rounds
/// with no upsets still get a row.
pub fn upset_summary(results: &[TournamentResult]) -> Vec<UpsetSummary> {
    let mut samples: BTreeMap<Round, Vec<usize>> = BTreeMap::new();
    for result in results {
        for round in result.rounds() {
            samples.entry(round.round).or_default().push(round.upset_count());
        }
    }

    samples
        .into_iter()
        .map(|(round, counts)| {
            let values: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
            UpsetSummary {
                round,
                avg_upsets: values.iter().mean(),
                std_upsets: values.iter().std_dev(),
                min_upsets: Iterator::min(counts.iter().copied()).unwrap_or(0),
                max_upsets: Iterator::max(counts.iter().copied()).unwrap_or(0),
            }
        })
        .collect()
}

/// Teams that reached a round seeded worse than the round's expected
/// maximum seed.
///
/// `frequency = count / num_pools`. Rows are ordered by round, then by
/// frequency (highest first), then seed and team name.
pub fn common_underdogs(
    results: &[TournamentResult],
    num_pools: usize,
) -> Result<Vec<UnderdogFrequency>> {
    check_denominator(num_pools, results)?;

    let mut counts: HashMap<(Round, u32, &str), usize> = HashMap::new();
    for result in results {
        for round in result.rounds() {
            let threshold = round.round.expected_max_seed();
            for team in round.teams().filter(|t| t.seed > threshold) {
                *counts.entry((round.round, team.seed, team.name.as_str())).or_insert(0) += 1;
            }
        }
    }

    let mut rows: Vec<UnderdogFrequency> = counts
        .into_iter()
        .map(|((round, seed, team), count)| UnderdogFrequency {
            make_it_to: round,
            seed,
            team: team.to_string(),
            frequency: count as f64 / num_pools as f64,
        })
        .collect();

    rows.sort_by(|a, b| {
        a.make_it_to
            .cmp(&b.make_it_to)
            .then_with(|| b.frequency.total_cmp(&a.frequency))
            .then_with(|| a.seed.cmp(&b.seed))
            .then_with(|| a.team.cmp(&b.team))
    });

    Ok(rows)
}

/// Champion frequency per (seed, team, conference), most frequent first.
pub fn champion_picks(
    results: &[TournamentResult],
    num_pools: usize,
) -> Result<Vec<ChampionFrequency>> {
    check_denominator(num_pools, results)?;

    let mut counts: HashMap<(u32, &str, &str), usize> = HashMap::new();
    for result in results {
        let champion = result.champion();
        *counts
            .entry((champion.seed, champion.name.as_str(), champion.conference.as_str()))
            .or_insert(0) += 1;
    }

    let mut rows: Vec<ChampionFrequency> = counts
        .into_iter()
        .map(|((seed, team, conference), count)| ChampionFrequency {
            seed,
            team: team.to_string(),
            conference: conference.to_string(),
            frequency: count as f64 / num_pools as f64,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.frequency
            .total_cmp(&a.frequency)
            .then_with(|| a.seed.cmp(&b.seed))
            .then_with(|| a.team.cmp(&b.team))
    });

    Ok(rows)
}
