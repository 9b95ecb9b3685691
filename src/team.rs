#[cfg(feature = "python")]
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A seeded tournament team.
///
/// `rating` is a net efficiency margin: points per 100 possessions better
/// than an average opponent.
#[cfg_attr(feature = "python", pyclass(get_all))]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,

    /// Rank within its region, 1 = strongest
    pub seed: u32,

    pub conference: String,

    /// Region index the team was placed in
    pub region: usize,

    pub rating: f64,
}

impl Team {
    pub fn new(name: &str, seed: u32, conference: &str, region: usize, rating: f64) -> Self {
        Team {
            name: name.to_string(),
            seed,
            conference: conference.to_string(),
            region,
            rating,
        }
    }

    /// True when this team is seeded worse than `other`.
    pub fn is_weaker_seed_than(&self, other: &Team) -> bool {
        self.seed > other.seed
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {} [{}]", self.seed, self.name, self.conference)
    }
}
