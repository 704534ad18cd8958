//! Sheet Geometry
//!
//! Curling rules are symmetric but the physical sheet is not: ends alternate
//! which side is downrange. Every rule predicate here takes a position in
//! the simulator (physical) frame plus the current [`ShotSide`], rotates it
//! into the canonical frame, and then tests a single set of constants.
//!
//! ## Canonical frame
//!
//! ```text
//!   y
//!   ^   back board ──────────────  22.860
//!   |   back line  ──────────────  19.2025
//!   |   tee line   ──────(·)─────  17.3735   house radius 1.829
//!   |   hog line   ──────────────  10.9725
//!   |
//!   +── sheet centre (0, 0) ──> x
//!   |
//!   |   delivery point (hack)      -21.0315
//! ```
//!
//! `ShotSide::A` maps the simulator frame onto the canonical frame
//! unchanged; `ShotSide::B` is a 180° rotation about the sheet centre.

use std::f32::consts::PI;
use serde::{Serialize, Deserialize};

use crate::core::vec2::Vector2;

/// Stone radius (m).
pub const STONE_RADIUS: f32 = 0.145;

/// House radius (m), measured to the outer edge of the twelve-foot ring.
pub const HOUSE_RADIUS: f32 = 1.829;

/// Tee line, canonical y (m).
pub const TEE_LINE_Y: f32 = 17.3735;

/// Hog line, canonical y (m).
pub const HOG_LINE_Y: f32 = TEE_LINE_Y - 6.401;

/// Back line, canonical y (m).
pub const BACK_LINE_Y: f32 = TEE_LINE_Y + 1.829;

/// Back board, canonical y (m). The near board sits at `-BACK_BOARD_Y`.
pub const BACK_BOARD_Y: f32 = 22.86;

/// Canonical y of the hack a stone is delivered from (m).
pub const DELIVERY_Y: f32 = -(TEE_LINE_Y + 3.658);

/// Default sheet width (m).
pub const DEFAULT_SHEET_WIDTH: f32 = 4.75;

/// Centre of the house in canonical coordinates.
pub const TEE: Vector2 = Vector2::new(0.0, TEE_LINE_Y);

/// Delivery point in canonical coordinates.
pub const DELIVERY_POINT: Vector2 = Vector2::new(0.0, DELIVERY_Y);

/// Which physical end of the sheet a delivery starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotSide {
    /// Even ends. Simulator frame equals canonical frame.
    A,
    /// Odd ends. Simulator frame is rotated 180°.
    B,
}

impl ShotSide {
    /// Shot side alternates with end parity.
    #[inline]
    pub fn for_end(end: u8) -> Self {
        if end % 2 == 0 {
            ShotSide::A
        } else {
            ShotSide::B
        }
    }
}

/// Free-function form of [`ShotSide::for_end`].
#[inline]
pub fn shot_side_for_end(end: u8) -> ShotSide {
    ShotSide::for_end(end)
}

/// Map a simulator-frame position (or velocity) into the canonical frame.
///
/// The mapping is an involution, so the same call also maps back.
#[inline]
pub fn to_canonical(v: Vector2, side: ShotSide) -> Vector2 {
    match side {
        ShotSide::A => v,
        ShotSide::B => -v,
    }
}

/// Map a canonical-frame position (or velocity) into the simulator frame.
#[inline]
pub fn from_canonical(v: Vector2, side: ShotSide) -> Vector2 {
    to_canonical(v, side)
}

/// Rotate a heading between frames, result wrapped into `(-π, π]`.
///
/// Angular velocity is unchanged by a 180° rotation and needs no transform.
#[inline]
pub fn transform_angle(angle: f32, side: ShotSide) -> f32 {
    match side {
        ShotSide::A => angle,
        ShotSide::B => normalize_angle(angle + PI),
    }
}

/// Wrap an angle into `(-π, π]`.
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a <= -PI {
        a += 2.0 * PI;
    }
    a
}

/// Distance from a simulator-frame position to the tee being played to.
#[inline]
pub fn distance_to_tee(pos: Vector2, side: ShotSide) -> f32 {
    to_canonical(pos, side).distance(TEE)
}

/// A moving stone is still live: fully inside the side lines, not wholly
/// past the back line, and not into the near back board.
pub fn in_flight_valid(pos: Vector2, sheet_width: f32, side: ShotSide) -> bool {
    let c = to_canonical(pos, side);
    c.x.abs() + STONE_RADIUS <= sheet_width * 0.5
        && c.y - STONE_RADIUS <= BACK_LINE_Y
        && c.y - STONE_RADIUS >= -BACK_BOARD_Y
}

/// A resting stone has entirely crossed the hog line.
///
/// Only meaningful once the stone has stopped.
#[inline]
pub fn settled_in_play(pos: Vector2, side: ShotSide) -> bool {
    to_canonical(pos, side).y - STONE_RADIUS > HOG_LINE_Y
}

/// Any part of the stone overlaps the house.
#[inline]
pub fn in_house(pos: Vector2, side: ShotSide) -> bool {
    distance_to_tee(pos, side) < HOUSE_RADIUS + STONE_RADIUS
}

/// Resting between the hog line and the tee line, outside the house.
pub fn in_free_guard_zone(pos: Vector2, side: ShotSide) -> bool {
    let c = to_canonical(pos, side);
    settled_in_play(pos, side) && c.y < TEE_LINE_Y && !in_house(pos, side)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn on_side(canonical: Vector2, side: ShotSide) -> Vector2 {
        from_canonical(canonical, side)
    }

    #[test]
    fn test_shot_side_alternates() {
        assert_eq!(shot_side_for_end(0), ShotSide::A);
        assert_eq!(shot_side_for_end(1), ShotSide::B);
        assert_eq!(shot_side_for_end(2), ShotSide::A);
        assert_eq!(shot_side_for_end(255), ShotSide::B);
    }

    #[test]
    fn test_side_b_is_rotation() {
        let p = Vector2::new(0.5, 3.0);
        assert_eq!(to_canonical(p, ShotSide::A), p);
        assert_eq!(to_canonical(p, ShotSide::B), Vector2::new(-0.5, -3.0));
    }

    #[test]
    fn test_transform_angle() {
        assert_eq!(transform_angle(0.3, ShotSide::A), 0.3);
        let flipped = transform_angle(0.0, ShotSide::B);
        assert!((flipped - PI).abs() < 1e-6);
        let back = transform_angle(flipped, ShotSide::B);
        assert!(back.abs() < 1e-5);
    }

    #[test]
    fn test_house_predicate_both_sides() {
        for side in [ShotSide::A, ShotSide::B] {
            assert!(in_house(on_side(TEE, side), side));
            let edge = Vector2::new(HOUSE_RADIUS + STONE_RADIUS - 0.01, TEE_LINE_Y);
            assert!(in_house(on_side(edge, side), side));
            let outside = Vector2::new(HOUSE_RADIUS + STONE_RADIUS + 0.01, TEE_LINE_Y);
            assert!(!in_house(on_side(outside, side), side));
        }
    }

    #[test]
    fn test_free_guard_zone() {
        let side = ShotSide::B;
        let guard = Vector2::new(0.0, 13.0);
        assert!(in_free_guard_zone(on_side(guard, side), side));

        // In the house, not a guard
        let biter = Vector2::new(0.0, TEE_LINE_Y - 1.5);
        assert!(!in_free_guard_zone(on_side(biter, side), side));

        // Corner of the zone beside the house but past the tee line
        let past_tee = Vector2::new(2.2, TEE_LINE_Y + 0.5);
        assert!(!in_free_guard_zone(on_side(past_tee, side), side));

        // Short of the hog line
        let hogged = Vector2::new(0.0, HOG_LINE_Y);
        assert!(!in_free_guard_zone(on_side(hogged, side), side));
    }

    #[test]
    fn test_hog_line() {
        let side = ShotSide::A;
        assert!(!settled_in_play(Vector2::new(0.0, HOG_LINE_Y + STONE_RADIUS * 0.5), side));
        assert!(settled_in_play(Vector2::new(0.0, HOG_LINE_Y + STONE_RADIUS + 0.01), side));
    }

    #[test]
    fn test_in_flight_bounds() {
        let width = DEFAULT_SHEET_WIDTH;
        for side in [ShotSide::A, ShotSide::B] {
            assert!(in_flight_valid(on_side(DELIVERY_POINT, side), width, side));
            assert!(in_flight_valid(on_side(TEE, side), width, side));

            let side_line = Vector2::new(width * 0.5, 5.0);
            assert!(!in_flight_valid(on_side(side_line, side), width, side));

            let through = Vector2::new(0.0, BACK_LINE_Y + STONE_RADIUS + 0.01);
            assert!(!in_flight_valid(on_side(through, side), width, side));

            // Touching the back line still live
            let biting = Vector2::new(0.0, BACK_LINE_Y);
            assert!(in_flight_valid(on_side(biting, side), width, side));
        }
    }

    proptest! {
        #[test]
        fn prop_canonical_round_trip(x in -3.0f32..3.0, y in -23.0f32..23.0) {
            let p = Vector2::new(x, y);
            for side in [ShotSide::A, ShotSide::B] {
                prop_assert_eq!(from_canonical(to_canonical(p, side), side), p);
            }
        }

        #[test]
        fn prop_predicates_symmetric(x in -3.0f32..3.0, y in -23.0f32..23.0) {
            let c = Vector2::new(x, y);
            let a = from_canonical(c, ShotSide::A);
            let b = from_canonical(c, ShotSide::B);
            prop_assert_eq!(in_house(a, ShotSide::A), in_house(b, ShotSide::B));
            prop_assert_eq!(
                in_free_guard_zone(a, ShotSide::A),
                in_free_guard_zone(b, ShotSide::B)
            );
            prop_assert_eq!(
                in_flight_valid(a, DEFAULT_SHEET_WIDTH, ShotSide::A),
                in_flight_valid(b, DEFAULT_SHEET_WIDTH, ShotSide::B)
            );
        }

        #[test]
        fn prop_guard_never_in_house(x in -3.0f32..3.0, y in 0.0f32..23.0) {
            let p = Vector2::new(x, y);
            prop_assert!(!(in_free_guard_zone(p, ShotSide::A) && in_house(p, ShotSide::A)));
        }
    }
}
