use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::ROUND_POINTS;
use crate::error::SimError;

/// Rounds of a single-elimination field, in chronological order.
///
/// The derived `Ord` follows declaration order, so sorting by `Round`
/// sorts chronologically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Round {
    #[serde(rename = "First Round")]
    FirstRound,
    #[serde(rename = "Second Round")]
    SecondRound,
    #[serde(rename = "Sweet 16")]
    Sweet16,
    #[serde(rename = "Elite 8")]
    Elite8,
    #[serde(rename = "Final Four")]
    FinalFour,
    #[serde(rename = "Championship")]
    Championship,
}

impl Round {
    pub const ALL: [Round; 6] = [
        Round::FirstRound,
        Round::SecondRound,
        Round::Sweet16,
        Round::Elite8,
        Round::FinalFour,
        Round::Championship,
    ];

    /// Position in the canonical round order (0 = First Round).
    pub fn order(self) -> usize {
        match self {
            Round::FirstRound => 0,
            Round::SecondRound => 1,
            Round::Sweet16 => 2,
            Round::Elite8 => 3,
            Round::FinalFour => 4,
            Round::Championship => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Round::FirstRound => "First Round",
            Round::SecondRound => "Second Round",
            Round::Sweet16 => "Sweet 16",
            Round::Elite8 => "Elite 8",
            Round::FinalFour => "Final Four",
            Round::Championship => "Championship",
        }
    }

    /// Highest seed that reaches this round when every game goes chalk.
    pub fn expected_max_seed(self) -> u32 {
        match self {
            Round::FirstRound => 16,
            Round::SecondRound => 8,
            Round::Sweet16 => 4,
            Round::Elite8 => 2,
            Round::FinalFour => 1,
            Round::Championship => 1,
        }
    }

    /// Points for correctly picking the winner of a game in this round.
    pub fn points(self) -> f64 {
        ROUND_POINTS[self.order()]
    }

    /// Rounds played by a field of `num_teams`: the last `log2(num_teams)` rounds.
    pub fn schedule(num_teams: usize) -> Result<&'static [Round], SimError> {
        if num_teams < 2 || !num_teams.is_power_of_two() || num_teams > 64 {
            return Err(SimError::InvalidBracket(format!(
                "field size must be a power of two between 2 and 64, got {}",
                num_teams
            )));
        }
        static ORDER: [Round; 6] = Round::ALL;
        let num_rounds = num_teams.trailing_zeros() as usize;
        Ok(&ORDER[ORDER.len() - num_rounds..])
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Round {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Round::ALL
            .iter()
            .copied()
            .find(|round| round.label() == s)
            .ok_or_else(|| SimError::UnknownRound(s.to_string()))
    }
}
