//! Game Logic Module
//!
//! Rules of the match. Deterministic given a deterministic simulator and
//! a seeded randomizer.
//!
//! ## Module Structure
//!
//! - `geometry`: Sheet constants, frame transforms, zone predicates
//! - `state`: Match state, moves, results
//! - `setting`: Match configuration
//! - `randomizer`: Shared Gaussian shot perturbation
//! - `player`: Nominal-to-actual shot execution
//! - `score`: End scoring
//! - `turn`: Authoritative turn application

pub mod geometry;
pub mod state;
pub mod setting;
pub mod randomizer;
pub mod player;
pub mod score;
pub mod turn;

// Re-export key types
pub use geometry::ShotSide;
pub use state::{GameResult, GameResultReason, MatchState, Move, Rotation, Shot, Team};
pub use setting::{ConfigError, MatchSetting};
pub use randomizer::ShotRandomizer;
pub use player::Player;
pub use score::EndScore;
pub use turn::{apply_move, replay_match, AppliedMove, MoveRecord, TurnError, TurnOutcome};
