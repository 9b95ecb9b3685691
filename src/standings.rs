//! Read-only standings snapshot and tournament field selection.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::{MAX_FIELD_SIZE, NUM_REGIONS};
use crate::error::{Result, SimError};
use crate::team::Team;

/// One team's line in the standings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub team: String,
    pub conference: String,
    pub rating: f64,
}

/// Snapshot of season standings the roster is built from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Standings {
    pub rows: Vec<StandingsRow>,
}

impl Standings {
    pub fn new(rows: Vec<StandingsRow>) -> Self {
        Standings { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Select `field_size` teams: every conference's best team gets an
    /// automatic bid, the remaining spots go to the best-rated teams left.
    /// Returned rows are ordered by rating, best first.
    pub fn select_field(&self, field_size: usize) -> Result<Vec<&StandingsRow>> {
        if field_size < 2 || !field_size.is_power_of_two() || field_size > MAX_FIELD_SIZE {
            return Err(SimError::InvalidConfig(format!(
                "field size must be a power of two between 2 and {}, got {}",
                MAX_FIELD_SIZE, field_size
            )));
        }
        if self.rows.len() < field_size {
            return Err(SimError::InvalidStandings(format!(
                "{} teams in standings, need at least {}",
                self.rows.len(),
                field_size
            )));
        }

        let mut ranked: Vec<&StandingsRow> = self.rows.iter().collect();
        ranked.sort_by(|a, b| b.rating.total_cmp(&a.rating).then_with(|| a.team.cmp(&b.team)));

        let mut auto_bids: HashMap<&str, &StandingsRow> = HashMap::new();
        for &row in &ranked {
            auto_bids.entry(row.conference.as_str()).or_insert(row);
        }
        let mut bids: Vec<&StandingsRow> = auto_bids.into_values().collect();
        bids.sort_by(|a, b| b.rating.total_cmp(&a.rating).then_with(|| a.team.cmp(&b.team)));
        bids.truncate(field_size);

        for &row in &ranked {
            if bids.len() == field_size {
                break;
            }
            if !bids.iter().any(|b| b.team == row.team) {
                bids.push(row);
            }
        }

        bids.sort_by(|a, b| b.rating.total_cmp(&a.rating).then_with(|| a.team.cmp(&b.team)));
        Ok(bids)
    }

    /// Seed the selected field into regions.
    ///
    /// Returns one team list per region, each in bracket slot order
    /// (1 v 16, 8 v 9, 4 v 13, ...), so consecutive pairs meet in the
    /// first round.
    pub fn seeded_regions(&self, field_size: usize) -> Result<Vec<Vec<Team>>> {
        let field = self.select_field(field_size)?;
        let num_regions = if field_size >= 2 * NUM_REGIONS { NUM_REGIONS } else { 1 };
        let per_region = field_size / num_regions;

        let mut regions: Vec<Vec<Option<Team>>> = vec![vec![None; per_region]; num_regions];
        for (rank, row) in field.iter().enumerate() {
            let line = rank / num_regions;
            let pos = rank % num_regions;
            // S-curve: odd seed lines run back through the regions
            let region = if line % 2 == 0 { pos } else { num_regions - 1 - pos };
            let seed = line as u32 + 1;
            regions[region][line] = Some(Team::new(&row.team, seed, &row.conference, region, row.rating));
        }

        let order = slot_order(per_region);
        regions
            .into_iter()
            .map(|by_seed| {
                order
                    .iter()
                    .map(|&seed| {
                        by_seed[seed as usize - 1].clone().ok_or_else(|| {
                            SimError::InvalidStandings(format!("seed line {} left empty", seed))
                        })
                    })
                    .collect::<Result<Vec<Team>>>()
            })
            .collect()
    }
}

/// Standard bracket slot order for `size` seeds: 1, 16, 8, 9, 4, 13, ...
pub fn slot_order(size: usize) -> Vec<u32> {
    let mut order = vec![1u32];
    while order.len() < size {
        let next = (order.len() * 2 + 1) as u32;
        order = order.iter().flat_map(|&s| [s, next - s]).collect();
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standings(n: usize, conferences: usize) -> Standings {
        Standings::new(
            (0..n)
                .map(|i| StandingsRow {
                    team: format!("Team{:03}", i),
                    conference: format!("Conf{}", i % conferences),
                    rating: 40.0 - i as f64 * 0.5,
                })
                .collect(),
        )
    }

    #[test]
    fn test_slot_order() {
        assert_eq!(slot_order(1), vec![1]);
        assert_eq!(slot_order(4), vec![1, 4, 2, 3]);
        assert_eq!(
            slot_order(16),
            vec![1, 16, 8, 9, 4, 13, 5, 12, 2, 15, 7, 10, 3, 14, 6, 11]
        );
    }

    #[test]
    fn test_select_field_takes_best_ratings() {
        let s = standings(100, 4);
        let field = s.select_field(64).unwrap();
        assert_eq!(field.len(), 64);
        assert_eq!(field[0].team, "Team000");
        assert_eq!(field[63].team, "Team063");
    }

    #[test]
    fn test_auto_bids_make_the_field() {
        // A one-team conference far below the at-large cut line
        let mut s = standings(100, 10);
        s.rows.push(StandingsRow {
            team: "Minnow".to_string(),
            conference: "Tiny".to_string(),
            rating: -20.0,
        });
        let field = s.select_field(64).unwrap();
        assert_eq!(field.len(), 64);
        assert!(field.iter().any(|r| r.team == "Minnow"));
        assert_eq!(field.last().unwrap().team, "Minnow");
        assert!(!field.iter().any(|r| r.team == "Team063"));
    }

    #[test]
    fn test_select_field_errors() {
        let s = standings(10, 2);
        assert!(matches!(s.select_field(16), Err(SimError::InvalidStandings(_))));
        assert!(matches!(s.select_field(6), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_seeded_regions_full_field() {
        let s = standings(80, 8);
        let regions = s.seeded_regions(64).unwrap();
        assert_eq!(regions.len(), 4);
        for (r, region) in regions.iter().enumerate() {
            assert_eq!(region.len(), 16);
            let seeds: Vec<u32> = region.iter().map(|t| t.seed).collect();
            assert_eq!(seeds, slot_order(16));
            assert!(region.iter().all(|t| t.region == r));
        }
        // Overall number one sits atop region 0, number two atop region 1
        assert_eq!(regions[0][0].name, "Team000");
        assert_eq!(regions[1][0].name, "Team001");
        // S-curve: fifth overall is the best 2 seed, placed in region 3
        let two_seed = regions[3].iter().find(|t| t.seed == 2).unwrap();
        assert_eq!(two_seed.name, "Team004");
    }

    #[test]
    fn test_seeded_regions_tiny_field() {
        let s = standings(4, 2);
        let regions = s.seeded_regions(4).unwrap();
        assert_eq!(regions.len(), 1);
        let seeds: Vec<u32> = regions[0].iter().map(|t| t.seed).collect();
        assert_eq!(seeds, vec![1, 4, 2, 3]);
    }
}
