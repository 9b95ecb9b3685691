//! Bracket Trends - Monte Carlo analysis of NCAA tournament bracket pools.
//!
//! Simulates many independent bracket pools, keeps the bracket that wins
//! each pool, and reports which upsets, underdogs and champions those
//! winning brackets had in common. Python bindings are available behind
//! the `python` feature.

pub mod analysis;
pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod game;
pub mod pool;
pub mod report;
pub mod round;
pub mod standings;
pub mod team;
pub mod tournament;
pub mod win_prob;

#[cfg(feature = "python")]
mod python;

pub use analysis::{
    champion_picks, common_underdogs, upset_summary, ChampionFrequency, UnderdogFrequency,
    UpsetSummary,
};
pub use config::{AnalysisConfig, AnalysisMode, FailurePolicy};
pub use constants::{upset_factors, DEFAULT_TRIALS, PROGRESS_INTERVAL, ROUND_POINTS};
pub use driver::{BracketAnalysis, PoolResult, RunSummary, WinningBracket};
pub use error::{Result, SimError};
pub use game::Game;
pub use pool::{score_bracket, BracketPool, Pool, PoolFactory, PoolStanding, StandardPoolFactory};
pub use report::{render_table, top_per_group, TableRow};
pub use round::Round;
pub use standings::{Standings, StandingsRow};
pub use team::Team;
pub use tournament::{
    Bracket, BracketFactory, RoundResult, StandingsBracketFactory, Tournament, TournamentResult,
};
pub use win_prob::{calculate_win_prob, upset_adjusted_win_prob};
