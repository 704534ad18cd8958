//! # Curling Judge
//!
//! Authoritative turn adjudication for two-agent digital curling.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CURLING JUDGE                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── vec2.rs     - 2D vector                                 │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Match rules                               │
//! │  ├── geometry.rs - Sheet frames and zones                    │
//! │  ├── state.rs    - Match state, moves, results               │
//! │  ├── setting.rs  - Match configuration                       │
//! │  ├── randomizer.rs - Thread-safe shot perturbation           │
//! │  ├── player.rs   - Shot execution                            │
//! │  ├── score.rs    - End scoring                               │
//! │  └── turn.rs     - Authoritative turn application            │
//! │                                                              │
//! │  sim/            - Simulator boundary                        │
//! │  └── friction.rs - Reference friction integrator             │
//! │                                                              │
//! │  registry.rs     - Simulator / player factories by tag       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! With a deterministic simulator and a seeded randomizer, identical
//! settings and move sequences produce identical states, checked through
//! [`MatchState::compute_hash`]. Stones are processed in slot order and
//! each thread draws from its own seeded Xorshift128+ engine.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod registry;
pub mod sim;

// Re-export commonly used types
pub use crate::core::rng::DeterministicRng;
pub use crate::core::vec2::Vector2;
pub use game::setting::{ConfigError, MatchSetting};
pub use game::state::{GameResult, GameResultReason, MatchState, Move, Rotation, Shot, Team};
pub use game::turn::{apply_move, replay_match, MoveRecord, TurnError, TurnOutcome};
pub use sim::{Simulator, TrajectoryObserver};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
