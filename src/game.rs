use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::round::Round;
use crate::team::Team;
use crate::win_prob::upset_adjusted_win_prob;

/// One matchup of a bracket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub team1: Team,
    pub team2: Team,
    pub round: Round,

    /// Set once the game has been played; always one of `team1` / `team2`
    winner: Option<Team>,

    /// Bias toward the weaker seed, in [0, 1]
    pub upset_factor: f64,
}

impl Game {
    pub fn new(team1: Team, team2: Team, round: Round) -> Self {
        Game {
            team1,
            team2,
            round,
            winner: None,
            upset_factor: 0.0,
        }
    }

    pub fn with_upset_factor(mut self, upset_factor: f64) -> Self {
        self.upset_factor = upset_factor;
        self
    }

    pub fn winner(&self) -> Option<&Team> {
        self.winner.as_ref()
    }

    /// The team that did not win, once the game is resolved.
    pub fn loser(&self) -> Option<&Team> {
        self.winner.as_ref().map(|w| {
            if w.name == self.team1.name {
                &self.team2
            } else {
                &self.team1
            }
        })
    }

    /// Record team1 (`true`) or team2 (`false`) as the winner.
    pub fn resolve(&mut self, team1_wins: bool) -> &Team {
        let winner = if team1_wins { &self.team1 } else { &self.team2 };
        self.winner.insert(winner.clone())
    }

    /// Play the game with this game's upset factor.
    pub fn simulate<R: Rng>(&mut self, rng: &mut R) -> &Team {
        let prob = upset_adjusted_win_prob(&self.team1, &self.team2, self.upset_factor);
        let team1_wins = rng.gen::<f64>() < prob;
        self.resolve(team1_wins)
    }

    /// True when the winner is seeded worse than the team it beat.
    pub fn is_upset(&self) -> bool {
        match (self.winner(), self.loser()) {
            (Some(winner), Some(loser)) => winner.is_weaker_seed_than(loser),
            _ => false,
        }
    }
}
