//! Match State Definitions
//!
//! Everything the engine persists between turns, plus the move and result
//! types that flow in and out of a turn. Every type here round-trips
//! through serde with `None` preserved for absent stones, unplayed ends,
//! and an unset result.

use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::vec2::Vector2;
use crate::game::setting::MatchSetting;

/// Stones each team delivers per end.
pub const STONES_PER_TEAM: usize = 8;

/// Deliveries per end.
pub const SHOTS_PER_END: u8 = 16;

/// Hard ceiling on the end index, extra ends included.
///
/// A match still tied when the end index reaches this value is a draw.
pub const END_MAX: u8 = 255;

// =============================================================================
// TEAM
// =============================================================================

/// One of the two competing teams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    /// First team
    Team0 = 0,
    /// Second team
    Team1 = 1,
}

impl Team {
    /// Both teams in index order.
    pub const ALL: [Team; 2] = [Team::Team0, Team::Team1];

    /// Array index for per-team tables.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The other team.
    #[inline]
    pub fn opponent(self) -> Team {
        match self {
            Team::Team0 => Team::Team1,
            Team::Team1 => Team::Team0,
        }
    }

    /// Get team from index (0-1).
    pub fn from_index(index: usize) -> Option<Team> {
        match index {
            0 => Some(Team::Team0),
            1 => Some(Team::Team1),
            _ => None,
        }
    }
}

// =============================================================================
// MOVES
// =============================================================================

/// Rotation given to a delivered stone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    /// Counter-clockwise (positive angular velocity)
    Ccw,
    /// Clockwise (negative angular velocity)
    Cw,
}

/// A delivery: release velocity in the canonical frame plus rotation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    /// Release velocity (m/s), canonical frame (+y is downrange)
    pub velocity: Vector2,
    /// Rotation direction
    pub rotation: Rotation,
}

impl Shot {
    /// Create a shot.
    pub fn new(velocity: Vector2, rotation: Rotation) -> Self {
        Self { velocity, rotation }
    }
}

/// What a team submits on its turn.
///
/// Running out of thinking time is not a move; the engine derives it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Move {
    /// Deliver a stone.
    Shot(Shot),
    /// Resign the match.
    Concede,
}

// =============================================================================
// RESULT
// =============================================================================

/// Why the match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResultReason {
    /// Higher total after the final end
    Score,
    /// A team resigned
    Concede,
    /// A team ran out of thinking time
    TimeLimit,
    /// Still tied at the end-count ceiling
    Draw,
}

/// Terminal outcome of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameResult {
    /// Winning team, `None` for a draw
    pub winner: Option<Team>,
    /// How the match ended
    pub reason: GameResultReason,
}

// =============================================================================
// STONES
// =============================================================================

/// A resting stone, canonical frame of the end being played.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct StoneCoord {
    /// Centre position (m)
    pub position: Vector2,
    /// Heading (rad)
    pub angle: f32,
}

impl StoneCoord {
    /// Create a stone coordinate.
    pub fn new(position: Vector2, angle: f32) -> Self {
        Self { position, angle }
    }
}

/// Per-team stone slots. Slot `n` holds the team's `n`th delivery of the end.
pub type TeamStones = [[Option<StoneCoord>; STONES_PER_TEAM]; 2];

// =============================================================================
// MATCH STATE
// =============================================================================

/// Complete authoritative state of a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    /// Current end (0-based; `>= max_end` means an extra end)
    pub end: u8,

    /// Current shot within the end (0..16)
    pub shot: u8,

    /// Team throwing last this end; `None` once the match is decided by
    /// concession or time limit
    pub hammer: Option<Team>,

    /// Resting stones, canonical frame
    pub stones: TeamStones,

    /// Regular-end scores; `None` until the end completes
    pub scores: [Vec<Option<u8>>; 2],

    /// Score of the deciding extra end; blank extra ends leave it unset
    pub extra_end_score: Option<[u8; 2]>,

    /// Thinking time left per team
    pub thinking_time_remaining: [Duration; 2],

    /// Set once, when the match ends
    pub game_result: Option<GameResult>,
}

impl MatchState {
    /// Initial state for a match played under `setting`.
    pub fn new(setting: &MatchSetting) -> Self {
        let max_end = setting.max_end as usize;
        Self {
            end: 0,
            shot: 0,
            hammer: Some(setting.initial_hammer),
            stones: Default::default(),
            scores: [vec![None; max_end], vec![None; max_end]],
            extra_end_score: None,
            thinking_time_remaining: setting.thinking_time,
            game_result: None,
        }
    }

    /// Check if match has ended.
    #[inline]
    pub fn is_over(&self) -> bool {
        self.game_result.is_some()
    }

    /// Team due to deliver next, `None` once the match is over.
    ///
    /// The hammer team throws the odd-numbered shots, so it throws last.
    pub fn team_to_move(&self) -> Option<Team> {
        if self.is_over() {
            return None;
        }
        let hammer = self.hammer?;
        Some(if self.shot % 2 == 1 { hammer } else { hammer.opponent() })
    }

    /// Sum of recorded regular-end scores plus any extra-end score.
    pub fn total_score(&self, team: Team) -> u32 {
        let regular: u32 = self.scores[team.index()]
            .iter()
            .flatten()
            .map(|&s| s as u32)
            .sum();
        let extra = self
            .extra_end_score
            .map(|scores| scores[team.index()] as u32)
            .unwrap_or(0);
        regular + extra
    }

    /// Number of stones currently resting on the sheet.
    pub fn stones_in_play(&self) -> usize {
        self.stones.iter().flatten().flatten().count()
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.end, self.shot, |hasher| {
            hasher.update_u8(self.hammer.map(|t| t as u8).unwrap_or(u8::MAX));

            for team in &self.stones {
                for slot in team {
                    match slot {
                        Some(stone) => {
                            hasher.update_bool(true);
                            hasher.update_vec2(stone.position);
                            hasher.update_f32(stone.angle);
                        }
                        None => hasher.update_bool(false),
                    }
                }
            }

            for team in &self.scores {
                hasher.update_u64(team.len() as u64);
                for &score in team {
                    hasher.update_opt_u8(score);
                }
            }

            match self.extra_end_score {
                Some([a, b]) => {
                    hasher.update_bool(true);
                    hasher.update_u8(a);
                    hasher.update_u8(b);
                }
                None => hasher.update_bool(false),
            }

            for remaining in &self.thinking_time_remaining {
                hasher.update_u64(remaining.as_nanos() as u64);
            }

            match self.game_result {
                Some(result) => {
                    hasher.update_bool(true);
                    hasher.update_u8(result.winner.map(|t| t as u8).unwrap_or(u8::MAX));
                    hasher.update_u8(result.reason as u8);
                }
                None => hasher.update_bool(false),
            }
        })
    }

    /// Encode to the compact binary record format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decode from the compact binary record format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

// =============================================================================
// TESTS
// =============================================================================
