//! Simulator Boundary
//!
//! The physics integrator is an external collaborator. The turn engine only
//! needs to load stones, step one fixed tick at a time, read stones back,
//! and ask whether everything has come to rest.
//!
//! Stones are addressed by a flat index `team * 8 + slot`, see [`stone_index`].

pub mod friction;

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vector2;
use crate::game::state::{Team, STONES_PER_TEAM};

pub use friction::FrictionSimulator;

/// Total stones on the sheet (8 per team).
pub const TOTAL_STONES: usize = STONES_PER_TEAM * 2;

/// Full stone state in the simulator frame.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct StoneState {
    /// Centre position (m)
    pub position: Vector2,
    /// Heading (rad)
    pub angle: f32,
    /// Linear velocity (m/s)
    pub velocity: Vector2,
    /// Angular velocity (rad/s), counter-clockwise positive
    pub angular_velocity: f32,
}

impl StoneState {
    /// A stone at rest.
    pub fn at_rest(position: Vector2, angle: f32) -> Self {
        Self {
            position,
            angle,
            velocity: Vector2::ZERO,
            angular_velocity: 0.0,
        }
    }

    /// Stone has no linear or angular motion left.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.velocity == Vector2::ZERO && self.angular_velocity == 0.0
    }
}

/// Every stone slot on the sheet, absent stones as `None`.
pub type SimStones = [Option<StoneState>; TOTAL_STONES];

/// Flat simulator index for a team's stone slot.
#[inline]
pub fn stone_index(team: Team, slot: usize) -> usize {
    team.index() * STONES_PER_TEAM + slot
}

/// A deterministic stone-settlement integrator.
///
/// Implementations must produce identical output for identical input;
/// match reproducibility depends on it.
pub trait Simulator: Send {
    /// Replace every stone on the sheet.
    fn set_stones(&mut self, stones: &SimStones);

    /// Current stones, same layout as [`Simulator::set_stones`].
    fn stones(&self) -> SimStones;

    /// Advance one fixed tick.
    fn step(&mut self);

    /// No stone on the sheet is moving.
    fn are_all_stones_stopped(&self) -> bool;

    /// Radius used by the integrator (m). Must equal
    /// [`STONE_RADIUS`](crate::game::geometry::STONE_RADIUS).
    fn stone_radius(&self) -> f32;
}

/// Observes each physics tick of a delivery.
///
/// Purely observational: receives a shared reference and cannot alter
/// the simulation.
pub trait TrajectoryObserver {
    /// Called once after every tick while stones are in flight.
    fn on_tick(&mut self, simulator: &dyn Simulator);
}

impl<F> TrajectoryObserver for F
where
    F: FnMut(&dyn Simulator),
{
    fn on_tick(&mut self, simulator: &dyn Simulator) {
        self(simulator)
    }
}
