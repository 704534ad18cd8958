//! Reference Friction Simulator
//!
//! A small deterministic integrator: constant sliding friction, a fixed
//! lateral curl whose sign follows the stone's rotation, and equal-mass
//! elastic collisions between circles. Enough to drive the demo and the
//! determinism checks; it does not try to model real ice.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vector2;
use crate::game::geometry::{normalize_angle, STONE_RADIUS};
use crate::game::setting::ConfigError;
use super::{SimStones, Simulator, TOTAL_STONES};

/// Tunables for [`FrictionSimulator`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrictionParams {
    /// Sliding deceleration (m/s²)
    pub friction: f32,
    /// Lateral acceleration while rotating (m/s²)
    pub curl: f32,
    /// Fixed tick length (s)
    pub seconds_per_tick: f32,
}

impl Default for FrictionParams {
    fn default() -> Self {
        Self {
            friction: 0.069,
            curl: 0.0025,
            seconds_per_tick: 0.01,
        }
    }
}

/// Check if two circles overlap.
#[inline]
pub fn circles_overlap(pos_a: Vector2, radius_a: f32, pos_b: Vector2, radius_b: f32) -> bool {
    let combined_radius = radius_a + radius_b;
    pos_a.distance_squared(pos_b) < combined_radius * combined_radius
}

/// Deterministic friction-and-collision stone integrator.
#[derive(Clone, Debug)]
pub struct FrictionSimulator {
    params: FrictionParams,
    stones: SimStones,
}

impl Default for FrictionSimulator {
    fn default() -> Self {
        Self::new(FrictionParams::default())
    }
}

impl FrictionSimulator {
    /// Registry tag.
    pub const KIND: &'static str = "friction";

    /// Create an empty sheet with the given tunables.
    pub fn new(params: FrictionParams) -> Self {
        Self {
            params,
            stones: [None; TOTAL_STONES],
        }
    }

    /// Build from registry parameters (`null` means defaults).
    pub fn from_params(params: &serde_json::Value) -> Result<Self, ConfigError> {
        let params: FrictionParams = if params.is_null() {
            FrictionParams::default()
        } else {
            serde_json::from_value(params.clone())?
        };

        if !(params.friction > 0.0 && params.friction.is_finite()) {
            return Err(ConfigError::invalid("simulator.params.friction", "must be positive"));
        }
        if !(params.seconds_per_tick > 0.0 && params.seconds_per_tick.is_finite()) {
            return Err(ConfigError::invalid(
                "simulator.params.seconds_per_tick",
                "must be positive",
            ));
        }
        if !params.curl.is_finite() {
            return Err(ConfigError::invalid("simulator.params.curl", "must be finite"));
        }

        Ok(Self::new(params))
    }

    /// Active tunables.
    pub fn params(&self) -> &FrictionParams {
        &self.params
    }

    fn integrate(&mut self) {
        let dt = self.params.seconds_per_tick;
        let decel = self.params.friction * dt;

        for stone in self.stones.iter_mut().flatten() {
            let speed = stone.velocity.length();
            if speed <= decel {
                stone.velocity = Vector2::ZERO;
                stone.angular_velocity = 0.0;
                continue;
            }

            let dir = stone.velocity * (1.0 / speed);
            let spin = if stone.angular_velocity > 0.0 {
                1.0
            } else if stone.angular_velocity < 0.0 {
                -1.0
            } else {
                0.0
            };
            let lateral = Vector2::new(-dir.y, dir.x) * (self.params.curl * spin * dt);

            stone.velocity = stone.velocity - dir * decel + lateral;
            stone.position = stone.position + stone.velocity * dt;
            stone.angle = normalize_angle(stone.angle + stone.angular_velocity * dt);
        }
    }

    /// Pairwise in index order so results never depend on anything but input.
    fn resolve_collisions(&mut self) {
        let diameter = STONE_RADIUS * 2.0;

        for i in 0..TOTAL_STONES {
            for j in (i + 1)..TOTAL_STONES {
                let (Some(mut a), Some(mut b)) = (self.stones[i], self.stones[j]) else {
                    continue;
                };
                if !circles_overlap(a.position, STONE_RADIUS, b.position, STONE_RADIUS) {
                    continue;
                }

                let delta = b.position - a.position;
                let dist = delta.length();
                if dist == 0.0 {
                    continue;
                }
                let normal = delta * (1.0 / dist);

                // Separate the pair so they just touch
                let correction = normal * ((diameter - dist) * 0.5);
                a.position = a.position - correction;
                b.position = b.position + correction;

                // Equal masses: swap the normal velocity components
                let approach = (a.velocity - b.velocity).dot(normal);
                if approach > 0.0 {
                    a.velocity = a.velocity - normal * approach;
                    b.velocity = b.velocity + normal * approach;
                }

                self.stones[i] = Some(a);
                self.stones[j] = Some(b);
            }
        }
    }
}

impl Simulator for FrictionSimulator {
    fn set_stones(&mut self, stones: &SimStones) {
        self.stones = *stones;
    }

    fn stones(&self) -> SimStones {
        self.stones
    }

    fn step(&mut self) {
        self.integrate();
        self.resolve_collisions();
    }

    fn are_all_stones_stopped(&self) -> bool {
        self.stones.iter().flatten().all(|s| s.is_stopped())
    }

    fn stone_radius(&self) -> f32 {
        STONE_RADIUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::StoneState;

    fn moving(position: Vector2, velocity: Vector2) -> StoneState {
        StoneState {
            position,
            angle: 0.0,
            velocity,
            angular_velocity: 0.0,
        }
    }

    fn run_until_stopped(sim: &mut FrictionSimulator) -> usize {
        let mut ticks = 0;
        loop {
            sim.step();
            ticks += 1;
            if sim.are_all_stones_stopped() {
                return ticks;
            }
            assert!(ticks < 1_000_000, "simulation did not settle");
        }
    }

    #[test]
    fn test_circles_overlap() {
        let a = Vector2::ZERO;
        assert!(circles_overlap(a, 0.6, Vector2::new(1.0, 0.0), 0.6));
        assert!(!circles_overlap(a, 0.6, Vector2::new(2.0, 0.0), 0.6));
    }

    #[test]
    fn test_stone_slides_expected_distance() {
        let params = FrictionParams { curl: 0.0, ..FrictionParams::default() };
        let mut sim = FrictionSimulator::new(params);
        let speed = 2.0f32;
        let mut stones = [None; TOTAL_STONES];
        stones[0] = Some(moving(Vector2::ZERO, Vector2::new(0.0, speed)));
        sim.set_stones(&stones);

        run_until_stopped(&mut sim);

        let expected = speed * speed / (2.0 * params.friction);
        let stone = sim.stones()[0].unwrap();
        assert!((stone.position.y - expected).abs() < 0.1);
        assert_eq!(stone.position.x, 0.0);
        assert!(stone.is_stopped());
    }

    #[test]
    fn test_rotation_curls_stone() {
        let mut sim = FrictionSimulator::default();
        let mut stones = [None; TOTAL_STONES];
        let mut ccw = moving(Vector2::ZERO, Vector2::new(0.0, 2.0));
        ccw.angular_velocity = 1.0;
        let mut cw = moving(Vector2::new(1.0, 0.0), Vector2::new(0.0, 2.0));
        cw.angular_velocity = -1.0;
        stones[0] = Some(ccw);
        stones[8] = Some(cw);
        sim.set_stones(&stones);

        run_until_stopped(&mut sim);

        let out = sim.stones();
        // Counter-clockwise drifts to -x when travelling +y, clockwise to +x
        assert!(out[0].unwrap().position.x < 0.0);
        assert!(out[8].unwrap().position.x > 1.0);
    }

    #[test]
    fn test_head_on_collision_transfers_velocity() {
        let mut sim = FrictionSimulator::default();
        let mut stones = [None; TOTAL_STONES];
        stones[0] = Some(moving(Vector2::ZERO, Vector2::new(0.0, 1.0)));
        stones[9] = Some(StoneState::at_rest(Vector2::new(0.0, 0.295), 0.0));
        sim.set_stones(&stones);

        sim.step();

        let out = sim.stones();
        assert!(out[0].unwrap().velocity.length() < 1e-6);
        assert!(out[9].unwrap().velocity.y > 0.9);
    }

    #[test]
    fn test_empty_sheet_is_stopped() {
        let sim = FrictionSimulator::default();
        assert!(sim.are_all_stones_stopped());
    }

    #[test]
    fn test_from_params() {
        let sim = FrictionSimulator::from_params(&serde_json::Value::Null).unwrap();
        assert_eq!(*sim.params(), FrictionParams::default());

        let sim = FrictionSimulator::from_params(&serde_json::json!({ "friction": 0.1 })).unwrap();
        assert_eq!(sim.params().friction, 0.1);
        assert_eq!(sim.params().seconds_per_tick, 0.01);

        assert!(FrictionSimulator::from_params(&serde_json::json!({ "friction": -1.0 })).is_err());
        assert!(FrictionSimulator::from_params(&serde_json::json!({ "friction": "fast" })).is_err());
    }

    #[test]
    fn test_determinism() {
        let mut stones = [None; TOTAL_STONES];
        stones[0] = Some(moving(Vector2::new(0.0, -10.0), Vector2::new(0.02, 2.1)));
        stones[8] = Some(StoneState::at_rest(Vector2::new(0.0, 15.0), 0.0));
        stones[9] = Some(StoneState::at_rest(Vector2::new(0.1, 16.0), 0.0));

        let mut a = FrictionSimulator::default();
        let mut b = FrictionSimulator::default();
        a.set_stones(&stones);
        b.set_stones(&stones);
        run_until_stopped(&mut a);
        run_until_stopped(&mut b);
        assert_eq!(a.stones(), b.stones());
    }
}
