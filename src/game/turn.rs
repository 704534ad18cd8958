//! Authoritative Turn Application
//!
//! One call applies one submitted move to the match: time accounting,
//! delivery and settlement through the simulator, out-of-play culls, the
//! free guard zone rule, end scoring, and match resolution.
//!
//! # Determinism
//!
//! Given the same setting, state, move, elapsed time, a deterministic
//! simulator and a player drawing from the same seed, the resulting state
//! is bit-identical. Stone slots are always visited in index order.

use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::game::geometry::{
    from_canonical, in_flight_valid, in_free_guard_zone, settled_in_play, to_canonical,
    transform_angle, ShotSide, DELIVERY_POINT,
};
use crate::game::player::Player;
use crate::game::score::{compute_end_score, EndScore};
use crate::game::setting::MatchSetting;
use crate::game::state::{
    GameResult, GameResultReason, MatchState, Move, Rotation, Shot, StoneCoord, Team, TeamStones,
    END_MAX, SHOTS_PER_END, STONES_PER_TEAM,
};
use crate::sim::{stone_index, SimStones, Simulator, StoneState, TrajectoryObserver, TOTAL_STONES};

/// Angular velocity magnitude given to every delivery (rad/s).
pub const DELIVERY_ANGULAR_SPEED: f32 = FRAC_PI_2;

/// Shots protected by the free guard zone rule.
pub const FREE_GUARD_ZONE_SHOTS: u8 = 4;

/// Protected shots under the five-rock rule.
pub const FIVE_ROCK_SHOTS: u8 = 5;

// =============================================================================
// TYPES
// =============================================================================

/// State that cannot be advanced. Nothing is mutated when one is returned.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    /// A result has already been recorded.
    #[error("Match is already over")]
    MatchOver,

    /// Shot index outside `0..16`.
    #[error("Shot index {0} out of range")]
    ShotOutOfRange(u8),

    /// End index at or past the ceiling.
    #[error("End index {0} out of range")]
    EndOutOfRange(u8),

    /// A score table does not match the configured end count.
    #[error("Score table for {team:?} has {len} entries, expected {expected}")]
    ScoreTableSize {
        /// Team owning the table
        team: Team,
        /// Actual length
        len: usize,
        /// Configured end count
        expected: usize,
    },

    /// No hammer team on an ongoing match.
    #[error("Hammer is unset")]
    HammerUnset,
}

/// What the engine actually applied for a turn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppliedMove {
    /// The shot as delivered, after clamping and the player's own error.
    Shot(Shot),
    /// The moving team resigned.
    Concede,
    /// The moving team ran out of thinking time.
    TimeLimit,
}

/// Result of one turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurnOutcome {
    /// Team that moved
    pub team: Team,
    /// Effective move
    pub applied: AppliedMove,
    /// The delivery removed a protected guard and was undone
    pub free_guard_zone_foul: bool,
    /// Set when this turn completed an end
    pub end_score: Option<EndScore>,
    /// Whether the match ended this turn
    pub game_over: bool,
}

/// A submitted move and the thinking time it consumed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// The move as submitted
    pub mv: Move,
    /// Thinking time spent on it
    pub elapsed: Duration,
}

// =============================================================================
// TURN
// =============================================================================

/// Apply one move to the match.
///
/// # Arguments
///
/// * `setting` - Rules the match is played under
/// * `state` - The match state (mutated on success only)
/// * `simulator` - Its stones are overwritten
/// * `player` - The moving team's player
/// * `mv` - Submitted move
/// * `elapsed` - Thinking time spent on this move
/// * `observer` - Called after every physics tick of a delivery
pub fn apply_move(
    setting: &MatchSetting,
    state: &mut MatchState,
    simulator: &mut dyn Simulator,
    player: &mut dyn Player,
    mv: Move,
    elapsed: Duration,
    observer: Option<&mut dyn TrajectoryObserver>,
) -> Result<TurnOutcome, TurnError> {
    let hammer = validate(setting, state)?;

    // 1. Side and moving team
    let side = ShotSide::for_end(state.end);
    let team = if state.shot % 2 == 1 { hammer } else { hammer.opponent() };

    // 2. Thinking time
    let remaining = &mut state.thinking_time_remaining[team.index()];
    *remaining = remaining.saturating_sub(elapsed);
    let timed_out = remaining.is_zero();

    debug!(
        "End {} shot {}: {:?} moves {:?} ({:?} left)",
        state.end, state.shot, team, mv, state.thinking_time_remaining[team.index()]
    );

    // 3-4. Deliver, or leave the sheet as it is
    let mut free_guard_zone_foul = false;
    let (applied, resting) = match mv {
        _ if timed_out => (AppliedMove::TimeLimit, hold(state, simulator, side)),
        Move::Concede => (AppliedMove::Concede, hold(state, simulator, side)),
        Move::Shot(shot) => {
            let delivery = deliver(setting, state, simulator, player, team, side, &shot, observer);
            free_guard_zone_foul = delivery.foul;
            (AppliedMove::Shot(delivery.shot), delivery.stones)
        }
    };

    // 5-6. Persist, or score the end
    let mut end_score = None;
    if state.shot + 1 < SHOTS_PER_END {
        state.stones = to_state_stones(&resting, side);
        state.shot += 1;
    } else {
        let score = compute_end_score(&resting, side);
        finish_end(setting, state, score);
        end_score = Some(score);
    }

    // 7. Resignation and time loss override everything above
    let forfeit = match applied {
        AppliedMove::TimeLimit => Some(GameResultReason::TimeLimit),
        AppliedMove::Concede => Some(GameResultReason::Concede),
        AppliedMove::Shot(_) => None,
    };
    if let Some(reason) = forfeit {
        state.hammer = None;
        state.game_result = Some(GameResult {
            winner: Some(team.opponent()),
            reason,
        });
        info!("Match over: {:?} loses by {:?}", team, reason);
    }

    Ok(TurnOutcome {
        team,
        applied,
        free_guard_zone_foul,
        end_score,
        game_over: state.is_over(),
    })
}

/// Re-apply a recorded move list to a fresh match.
///
/// Players are indexed by team.
pub fn replay_match(
    setting: &MatchSetting,
    simulator: &mut dyn Simulator,
    players: &mut [Box<dyn Player>; 2],
    records: &[MoveRecord],
) -> Result<MatchState, TurnError> {
    let mut state = MatchState::new(setting);
    for record in records {
        let team = state.team_to_move().ok_or(TurnError::MatchOver)?;
        apply_move(
            setting,
            &mut state,
            simulator,
            players[team.index()].as_mut(),
            record.mv,
            record.elapsed,
            None,
        )?;
    }
    Ok(state)
}

/// Check preconditions, returning the hammer team.
fn validate(setting: &MatchSetting, state: &MatchState) -> Result<Team, TurnError> {
    if state.is_over() {
        return Err(TurnError::MatchOver);
    }
    if state.shot >= SHOTS_PER_END {
        return Err(TurnError::ShotOutOfRange(state.shot));
    }
    if state.end >= END_MAX {
        return Err(TurnError::EndOutOfRange(state.end));
    }
    let expected = setting.max_end as usize;
    for team in Team::ALL {
        let len = state.scores[team.index()].len();
        if len != expected {
            return Err(TurnError::ScoreTableSize { team, len, expected });
        }
    }
    state.hammer.ok_or(TurnError::HammerUnset)
}

// =============================================================================
// DELIVERY
// =============================================================================

struct Delivery {
    shot: Shot,
    stones: SimStones,
    foul: bool,
}

/// Load the resting stones unchanged.
fn hold(state: &MatchState, simulator: &mut dyn Simulator, side: ShotSide) -> SimStones {
    let stones = to_simulator_stones(&state.stones, side);
    simulator.set_stones(&stones);
    stones
}

#[allow(clippy::too_many_arguments)]
fn deliver(
    setting: &MatchSetting,
    state: &MatchState,
    simulator: &mut dyn Simulator,
    player: &mut dyn Player,
    team: Team,
    side: ShotSide,
    nominal: &Shot,
    mut observer: Option<&mut dyn TrajectoryObserver>,
) -> Delivery {
    let nominal = Shot::new(nominal.velocity.clamp_length(setting.max_shot_speed), nominal.rotation);
    let shot = player.play(&nominal);

    let pre_shot = to_simulator_stones(&state.stones, side);

    let mut stones = pre_shot;
    stones[stone_index(team, state.shot as usize / 2)] = Some(StoneState {
        position: from_canonical(DELIVERY_POINT, side),
        angle: transform_angle(0.0, side),
        velocity: from_canonical(shot.velocity, side),
        angular_velocity: match shot.rotation {
            Rotation::Ccw => DELIVERY_ANGULAR_SPEED,
            Rotation::Cw => -DELIVERY_ANGULAR_SPEED,
        },
    });
    simulator.set_stones(&stones);

    let mut ticks: u64 = 0;
    loop {
        simulator.step();
        ticks += 1;

        let mut stones = simulator.stones();
        let culled = cull(&mut stones, |s| in_flight_valid(s.position, setting.sheet_width, side));
        if culled > 0 {
            debug!("Tick {}: {} stone(s) left the sheet", ticks, culled);
            simulator.set_stones(&stones);
        }

        if let Some(observer) = observer.as_deref_mut() {
            observer.on_tick(&*simulator);
        }

        if simulator.are_all_stones_stopped() {
            break;
        }
    }

    let mut settled = simulator.stones();
    let hogged = cull(&mut settled, |s| settled_in_play(s.position, side));
    if hogged > 0 {
        debug!("{} stone(s) short of the hog line", hogged);
        simulator.set_stones(&settled);
    }

    let protected = if setting.five_rock_rule { FIVE_ROCK_SHOTS } else { FREE_GUARD_ZONE_SHOTS };
    let foul = state.shot < protected && {
        let opponent = team.opponent();
        (0..STONES_PER_TEAM).map(|slot| stone_index(opponent, slot)).any(|i| {
            let guarded = matches!(pre_shot[i], Some(s) if in_free_guard_zone(s.position, side));
            guarded && settled[i].is_none()
        })
    };

    let stones = if foul {
        debug!("Free guard zone foul by {:?}, restoring sheet", team);
        simulator.set_stones(&pre_shot);
        pre_shot
    } else {
        settled
    };

    debug!("Shot settled after {} ticks", ticks);
    Delivery { shot, stones, foul }
}

/// Remove every stone failing `keep`, returning how many were removed.
fn cull(stones: &mut SimStones, keep: impl Fn(&StoneState) -> bool) -> usize {
    let mut removed = 0;
    for slot in stones.iter_mut() {
        if matches!(slot, Some(stone) if !keep(stone)) {
            *slot = None;
            removed += 1;
        }
    }
    removed
}

// =============================================================================
// END OF END
// =============================================================================

fn finish_end(setting: &MatchSetting, state: &mut MatchState, score: EndScore) {
    let end = state.end as usize;
    if end < setting.max_end as usize {
        state.scores[Team::Team0.index()][end] = Some(score.team0);
        state.scores[Team::Team1.index()][end] = Some(score.team1);
    } else if !score.is_blank() {
        state.extra_end_score = Some(score.as_array());
    }

    if let Some(scorer) = score.scorer() {
        state.hammer = Some(scorer.opponent());
    }

    info!(
        "End {} scored {}-{} (totals {}-{})",
        state.end,
        score.team0,
        score.team1,
        state.total_score(Team::Team0),
        state.total_score(Team::Team1)
    );

    state.stones = TeamStones::default();
    state.shot = 0;
    state.end += 1;

    if state.end < setting.max_end {
        return;
    }

    let total0 = state.total_score(Team::Team0);
    let total1 = state.total_score(Team::Team1);
    if total0 != total1 {
        let winner = if total0 > total1 { Team::Team0 } else { Team::Team1 };
        state.game_result = Some(GameResult {
            winner: Some(winner),
            reason: GameResultReason::Score,
        });
        info!("Match over: {:?} wins {}-{}", winner, total0.max(total1), total0.min(total1));
    } else if state.end >= END_MAX {
        state.game_result = Some(GameResult {
            winner: None,
            reason: GameResultReason::Draw,
        });
        info!("Match over: draw at {}-{}", total0, total1);
    } else {
        state.thinking_time_remaining = setting.extra_end_thinking_time;
        info!("Tied at {}-{}, playing extra end {}", total0, total1, state.end);
    }
}

// =============================================================================
// FRAME CONVERSION
// =============================================================================

/// Resting stones in the simulator frame.
pub fn to_simulator_stones(stones: &TeamStones, side: ShotSide) -> SimStones {
    let mut out = [None; TOTAL_STONES];
    for team in Team::ALL {
        for (slot, stone) in stones[team.index()].iter().enumerate() {
            out[stone_index(team, slot)] = stone.map(|s| {
                StoneState::at_rest(from_canonical(s.position, side), transform_angle(s.angle, side))
            });
        }
    }
    out
}

/// Simulator stones back in the canonical frame, motion dropped.
pub fn to_state_stones(stones: &SimStones, side: ShotSide) -> TeamStones {
    let mut out = TeamStones::default();
    for team in Team::ALL {
        for (slot, stone) in out[team.index()].iter_mut().enumerate() {
            *stone = stones[stone_index(team, slot)].map(|s| {
                StoneCoord::new(to_canonical(s.position, side), transform_angle(s.angle, side))
            });
        }
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================
