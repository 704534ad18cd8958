//! Players
//!
//! A player turns the shot a team asked for into the shot actually
//! delivered. Players are called once per delivery, never concurrently.

use std::sync::Arc;

use crate::game::randomizer::ShotRandomizer;
use crate::game::state::Shot;

/// Executes a team's nominal shot.
pub trait Player: Send {
    /// Actual shot delivered for the requested one.
    fn play(&mut self, shot: &Shot) -> Shot;
}

/// Delivers every shot exactly as requested.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdenticalPlayer;

impl IdenticalPlayer {
    /// Registry tag.
    pub const KIND: &'static str = "identical";
}

impl Player for IdenticalPlayer {
    fn play(&mut self, shot: &Shot) -> Shot {
        *shot
    }
}

/// Adds Gaussian execution error from a shared [`ShotRandomizer`].
#[derive(Clone, Debug)]
pub struct NormalDistPlayer {
    randomizer: Arc<ShotRandomizer>,
}

impl NormalDistPlayer {
    /// Registry tag.
    pub const KIND: &'static str = "normal_dist";

    /// Create a player drawing from `randomizer`.
    pub fn new(randomizer: Arc<ShotRandomizer>) -> Self {
        Self { randomizer }
    }
}

impl Player for NormalDistPlayer {
    fn play(&mut self, shot: &Shot) -> Shot {
        Shot::new(self.randomizer.perturb(shot.velocity), shot.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Vector2;
    use crate::game::state::Rotation;

    #[test]
    fn test_identical_player() {
        let shot = Shot::new(Vector2::new(0.05, 2.4), Rotation::Ccw);
        assert_eq!(IdenticalPlayer.play(&shot), shot);
    }

    #[test]
    fn test_normal_dist_player_keeps_rotation() {
        let randomizer = Arc::new(ShotRandomizer::seeded(3, 0.05, 0.01).unwrap());
        let mut player = NormalDistPlayer::new(randomizer);
        let shot = Shot::new(Vector2::new(0.0, 2.4), Rotation::Cw);

        let actual = player.play(&shot);
        assert_eq!(actual.rotation, Rotation::Cw);
        assert_ne!(actual.velocity, shot.velocity);

        // Same seed, same perturbation
        let mut again = NormalDistPlayer::new(Arc::new(ShotRandomizer::seeded(3, 0.05, 0.01).unwrap()));
        assert_eq!(again.play(&shot), actual);
    }
}
