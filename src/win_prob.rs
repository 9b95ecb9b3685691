use statrs::distribution::{ContinuousCDF, Normal};

use crate::constants::{AVG_TEMPO, SCORING_STDDEV};
use crate::team::Team;

/// Calculate the probability of team1 beating team2 on ratings alone.
///
/// The rating gap is converted to an expected point margin over an
/// average-tempo game and pushed through a normal CDF.
///
/// # Arguments
/// * `team1` - First team
/// * `team2` - Second team
///
/// # Returns
/// Probability of team1 winning (0.0-1.0)
pub fn calculate_win_prob(team1: &Team, team2: &Team) -> f64 {
    let point_diff = (team1.rating - team2.rating) * AVG_TEMPO / 100.0;

    match Normal::new(0.0, SCORING_STDDEV) {
        Ok(normal) => normal.cdf(point_diff),
        // SCORING_STDDEV is a positive constant
        Err(_) => 0.5,
    }
}

/// Probability of team1 winning once the game's upset factor is applied.
///
/// The better seed's probability `p` becomes `p * (1 - u) + (1 - p) * u`,
/// so `u = 0` keeps the rating model and `u = 0.5` is a coin flip.
/// Teams on the same seed line are left alone.
pub fn upset_adjusted_win_prob(team1: &Team, team2: &Team, upset_factor: f64) -> f64 {
    let p1 = calculate_win_prob(team1, team2);
    let u = upset_factor.clamp(0.0, 1.0);

    if team1.seed < team2.seed {
        p1 * (1.0 - u) + (1.0 - p1) * u
    } else if team2.seed < team1.seed {
        let p2 = 1.0 - p1;
        1.0 - (p2 * (1.0 - u) + (1.0 - p2) * u)
    } else {
        p1
    }
}
