//! Curling Judge
//!
//! Plays a demo match between two scripted teams and verifies that a
//! replay of the recorded moves reproduces the final state hash.
//!
//! Usage: `curling-judge [setting.json] [match-label]`
//!
//! A match label replaces the configured randomizer seed with one derived
//! from the label.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use curling_judge::{
    core::rng::derive_seed,
    game::{
        randomizer::ShotRandomizer,
        turn::{apply_move, replay_match, AppliedMove, MoveRecord},
    },
    registry::{PlayerContext, PlayerRegistry, SimulatorRegistry},
    sim::Simulator,
    MatchSetting, MatchState, Move, Rotation, Shot, Team, Vector2, VERSION,
};
use curling_judge::game::player::{NormalDistPlayer, Player};
use curling_judge::game::setting::ComponentSetting;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Curling Judge v{}", VERSION);

    let mut args = std::env::args().skip(1);
    let mut setting = match args.next() {
        Some(path) => MatchSetting::load(&path)
            .with_context(|| format!("Failed to load setting from {}", path))?,
        None => MatchSetting::default(),
    };
    if let Some(label) = args.next() {
        let seed = derive_seed(&label);
        info!("Match label {:?} -> seed {}", label, seed);
        setting.randomizer.seed = Some(seed);
    }
    info!(
        "Ends: {}, five-rock rule: {}, simulator: {}",
        setting.max_end, setting.five_rock_rule, setting.simulator.kind
    );

    demo_match(&setting)
}

/// Scripted shot for a turn: guards early, then draws and takeouts.
fn scripted_move(state: &MatchState) -> Move {
    let shot = state.shot;
    let offset = (((state.end as i32 * 7 + shot as i32 * 3) % 9) - 4) as f32 * 0.01;
    let speed = match shot {
        0..=3 => 2.2,
        4..=11 => 2.3,
        _ => 2.6,
    };
    let rotation = if shot % 2 == 0 { Rotation::Ccw } else { Rotation::Cw };
    Move::Shot(Shot::new(Vector2::new(offset, speed), rotation))
}

/// Thinking time a scripted team spends on a shot.
fn scripted_elapsed(state: &MatchState) -> Duration {
    Duration::from_millis(1500 + (state.shot as u64 % 7) * 100)
}

fn build_players(
    registry: &PlayerRegistry,
    ctx: &PlayerContext,
) -> anyhow::Result<[Box<dyn Player>; 2]> {
    let kind = ComponentSetting::new(NormalDistPlayer::KIND);
    Ok([registry.create(&kind, ctx)?, registry.create(&kind, ctx)?])
}

/// Run a full match, then replay it.
fn demo_match(setting: &MatchSetting) -> anyhow::Result<()> {
    info!("=== Starting Demo Match ===");

    let simulators = SimulatorRegistry::with_builtin();
    let players = PlayerRegistry::with_builtin();

    let randomizer = Arc::new(ShotRandomizer::new(&setting.randomizer)?);
    let ctx = PlayerContext { randomizer: Arc::clone(&randomizer) };

    let mut simulator: Box<dyn Simulator> = simulators.create(&setting.simulator)?;
    let mut team_players = build_players(&players, &ctx)?;

    let mut state = MatchState::new(setting);
    let mut records = Vec::new();
    let mut fouls = 0;
    let mut ticks: u64 = 0;

    while let Some(team) = state.team_to_move() {
        let record = MoveRecord {
            mv: scripted_move(&state),
            elapsed: scripted_elapsed(&state),
        };

        let mut count_ticks = |_: &dyn Simulator| ticks += 1;
        let outcome = apply_move(
            setting,
            &mut state,
            simulator.as_mut(),
            team_players[team.index()].as_mut(),
            record.mv,
            record.elapsed,
            Some(&mut count_ticks),
        )?;
        records.push(record);

        if outcome.free_guard_zone_foul {
            fouls += 1;
            warn!("Free guard zone foul by {:?}", outcome.team);
        }
        if let (Some(score), AppliedMove::Shot(_)) = (outcome.end_score, outcome.applied) {
            info!(
                "End {}: {}-{}, hammer {:?}",
                state.end,
                score.team0,
                score.team1,
                state.hammer
            );
        }
    }

    // Print final results
    info!("=== Match Results ===");
    info!("Shots: {}, physics ticks: {}, fouls: {}", records.len(), ticks, fouls);
    for team in Team::ALL {
        info!("{:?}: {}", team, state.total_score(team));
    }
    info!("Result: {:?}", state.game_result);

    let hash = state.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    if randomizer.seed().is_none() {
        warn!("Seedless randomizer, skipping replay verification");
        return Ok(());
    }
    let replay_ctx = PlayerContext {
        randomizer: Arc::new(ShotRandomizer::new(&setting.randomizer)?),
    };

    let mut replay_simulator = simulators.create(&setting.simulator)?;
    let mut replay_players = build_players(&players, &replay_ctx)?;
    let replayed = replay_match(setting, replay_simulator.as_mut(), &mut replay_players, &records)?;
    let replay_hash = replayed.compute_hash();

    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash != replay_hash {
        bail!("DETERMINISM FAILURE: Hashes differ!");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}
