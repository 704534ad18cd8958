//! Core primitives.
//!
//! Value types, the deterministic PRNG and state hashing shared by the
//! game rules and the simulator boundary.

pub mod vec2;
pub mod rng;
pub mod hash;

// Re-export core types
pub use vec2::Vector2;
pub use rng::DeterministicRng;
pub use hash::{compute_state_hash, StateHash, StateHasher};
