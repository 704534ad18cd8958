//! End Scoring
//!
//! Only stones touching the house count. The team with the stone nearest
//! the tee scores one point for every stone it has closer than the
//! opponent's nearest. Equal nearest distances make a blank end.

use serde::{Serialize, Deserialize};

use crate::game::geometry::{distance_to_tee, ShotSide, HOUSE_RADIUS, STONE_RADIUS};
use crate::game::state::{Team, STONES_PER_TEAM};
use crate::sim::{stone_index, SimStones};

/// Points scored by each team in one end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndScore {
    /// Team 0 points
    pub team0: u8,
    /// Team 1 points
    pub team1: u8,
}

impl EndScore {
    /// Points for one team.
    #[inline]
    pub fn for_team(&self, team: Team) -> u8 {
        match team {
            Team::Team0 => self.team0,
            Team::Team1 => self.team1,
        }
    }

    /// The team that scored, `None` for a blank end.
    pub fn scorer(&self) -> Option<Team> {
        if self.team0 > 0 {
            Some(Team::Team0)
        } else if self.team1 > 0 {
            Some(Team::Team1)
        } else {
            None
        }
    }

    /// Neither team scored.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.team0 == 0 && self.team1 == 0
    }

    /// As a per-team array, indexed by [`Team::index`].
    #[inline]
    pub fn as_array(&self) -> [u8; 2] {
        [self.team0, self.team1]
    }
}

/// Score an end from resting stones in the simulator frame.
pub fn compute_end_score(stones: &SimStones, side: ShotSide) -> EndScore {
    let distances = |team: Team| -> [f32; STONES_PER_TEAM] {
        let mut out = [f32::INFINITY; STONES_PER_TEAM];
        for (slot, d) in out.iter_mut().enumerate() {
            if let Some(stone) = &stones[stone_index(team, slot)] {
                *d = distance_to_tee(stone.position, side);
            }
        }
        out
    };
    let d0 = distances(Team::Team0);
    let d1 = distances(Team::Team1);

    let limit = HOUSE_RADIUS + STONE_RADIUS;
    let m0 = d0.iter().copied().fold(limit, f32::min);
    let m1 = d1.iter().copied().fold(limit, f32::min);

    let count_closer = |ds: &[f32; STONES_PER_TEAM], bound: f32| -> u8 {
        ds.iter().filter(|&&d| d < bound).count() as u8
    };

    if m0 < m1 {
        EndScore { team0: count_closer(&d0, m1), team1: 0 }
    } else if m1 < m0 {
        EndScore { team0: 0, team1: count_closer(&d1, m0) }
    } else {
        EndScore::default()
    }
}
