use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::game::Game;
use crate::round::Round;
use crate::standings::Standings;
use crate::team::Team;

/// A bracket that can be played out to a champion.
///
/// Simulation is stateful: implementations may draw fresh outcomes on
/// every call.
pub trait Tournament: Clone + Send {
    /// First-round games, in bracket order.
    fn games(&self) -> &[Game];

    fn games_mut(&mut self) -> &mut [Game];

    /// Play every round and report who reached each one.
    fn simulate_tournament(&mut self) -> Result<TournamentResult>;

    /// Stamp every game with the same upset factor.
    fn set_upset_factor(&mut self, upset_factor: f64) {
        for game in self.games_mut() {
            game.upset_factor = upset_factor;
        }
    }
}

/// Builds a fresh bracket from a standings snapshot.
pub trait BracketFactory {
    type Bracket: Tournament;

    /// `seed` drives the bracket's game outcomes; the roster itself is
    /// deterministic for a given snapshot.
    fn create_bracket(&self, standings: &Standings, seed: u64) -> Result<Self::Bracket>;
}

/// Games played in one round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: Round,
    pub games: Vec<Game>,
}

impl RoundResult {
    /// Every team that made it to this round.
    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.games.iter().flat_map(|g| [&g.team1, &g.team2])
    }

    pub fn winners(&self) -> impl Iterator<Item = &Team> {
        self.games.iter().filter_map(|g| g.winner())
    }

    /// Games in this round won by the weaker seed.
    pub fn upset_count(&self) -> usize {
        self.games.iter().filter(|g| g.is_upset()).count()
    }
}

/// Outcome of one simulated tournament.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentResult {
    rounds: Vec<RoundResult>,
    champion: Team,
}

impl TournamentResult {
    /// Assemble a result from fully resolved rounds.
    ///
    /// Rounds must be in chronological order without repeats, every game
    /// must have a winner, and the last round must be a single game whose
    /// winner is the champion.
    pub fn from_rounds(rounds: Vec<RoundResult>) -> Result<Self> {
        if rounds.windows(2).any(|w| w[0].round >= w[1].round) {
            return Err(SimError::InvalidBracket(
                "rounds out of chronological order".to_string(),
            ));
        }
        for result in &rounds {
            if result.games.iter().any(|g| g.winner().is_none()) {
                return Err(SimError::InvalidBracket(format!(
                    "unplayed game in {}",
                    result.round
                )));
            }
        }

        let final_round = rounds
            .last()
            .ok_or_else(|| SimError::InvalidBracket("no rounds played".to_string()))?;
        let champion = match final_round.games.as_slice() {
            [game] => game.winner().cloned(),
            _ => None,
        }
        .ok_or_else(|| {
            SimError::InvalidBracket(format!(
                "{} must be a single game, found {}",
                final_round.round,
                final_round.games.len()
            ))
        })?;

        Ok(TournamentResult { rounds, champion })
    }

    pub fn rounds(&self) -> &[RoundResult] {
        &self.rounds
    }

    pub fn round(&self, round: Round) -> Option<&RoundResult> {
        self.rounds.iter().find(|r| r.round == round)
    }

    pub fn champion(&self) -> &Team {
        &self.champion
    }
}

/// Single-elimination bracket driven by the rating model.
#[derive(Clone, Debug)]
pub struct Bracket {
    games: Vec<Game>,
    rng: ChaCha8Rng,
}

impl Bracket {
    /// Build a bracket from teams in slot order; consecutive pairs meet in
    /// the first round.
    pub fn new(teams: Vec<Team>, seed: Option<u64>) -> Result<Self> {
        let rounds = Round::schedule(teams.len())?;
        let first = rounds[0];

        let mut games = Vec::with_capacity(teams.len() / 2);
        let mut iter = teams.into_iter();
        while let (Some(team1), Some(team2)) = (iter.next(), iter.next()) {
            games.push(Game::new(team1, team2, first));
        }

        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };

        Ok(Bracket { games, rng })
    }

    /// Regions are laid out in order, so regions 0-1 and 2-3 meet in the
    /// Final Four.
    pub fn from_regions(regions: Vec<Vec<Team>>, seed: Option<u64>) -> Result<Self> {
        Bracket::new(regions.into_iter().flatten().collect(), seed)
    }

    pub fn num_teams(&self) -> usize {
        self.games.len() * 2
    }
}

impl Tournament for Bracket {
    fn games(&self) -> &[Game] {
        &self.games
    }

    fn games_mut(&mut self) -> &mut [Game] {
        &mut self.games
    }

    fn simulate_tournament(&mut self) -> Result<TournamentResult> {
        let schedule = Round::schedule(self.num_teams())?;
        let mut current: Vec<Game> = self.games.clone();
        let mut results = Vec::with_capacity(schedule.len());

        for (i, &round) in schedule.iter().enumerate() {
            let mut winners = Vec::with_capacity(current.len());
            for game in current.iter_mut() {
                winners.push(game.simulate(&mut self.rng).clone());
            }

            let next_games = match schedule.get(i + 1) {
                Some(&next_round) => winners
                    .chunks(2)
                    .zip(current.chunks(2))
                    .map(|(pair, feeders)| {
                        Game::new(pair[0].clone(), pair[1].clone(), next_round)
                            .with_upset_factor(feeders[0].upset_factor)
                    })
                    .collect(),
                None => Vec::new(),
            };

            if i == 0 {
                self.games = current.clone();
            }
            results.push(RoundResult {
                round,
                games: std::mem::replace(&mut current, next_games),
            });
        }

        TournamentResult::from_rounds(results)
    }
}

/// Seeds the standings snapshot into a fresh [`Bracket`].
#[derive(Clone, Copy, Debug)]
pub struct StandingsBracketFactory {
    pub field_size: usize,
}

impl Default for StandingsBracketFactory {
    fn default() -> Self {
        StandingsBracketFactory { field_size: 64 }
    }
}

impl BracketFactory for StandingsBracketFactory {
    type Bracket = Bracket;

    fn create_bracket(&self, standings: &Standings, seed: u64) -> Result<Bracket> {
        let regions = standings.seeded_regions(self.field_size)?;
        Bracket::from_regions(regions, Some(seed))
    }
}
