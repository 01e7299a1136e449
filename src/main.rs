//! Driftwell headless demo
//!
//! Drives one arena through a scripted round with no renderer attached:
//! magnetize in bursts to reel the goal in, brake to shed the recoil speed,
//! and a gravity bomb dropped on the goal midway. Prints the final snapshot
//! as JSON so the run can be inspected or diffed.
//!
//! Usage: `driftwell [seed]`  (RUST_LOG=debug for per-event logging)

use driftwell::consts::SIM_DT;
use driftwell::sim::{Arena, ArenaEvent, Skill};
use driftwell::ArenaConfig;

/// Frames the demo waits before respawning a captured goal, standing in
/// for the presentation layer's eat animation.
const RESPAWN_DELAY_FRAMES: u64 = 45;

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xD21F7);
    let config = ArenaConfig {
        seed,
        ..Default::default()
    };
    let mut arena = Arena::new(config);
    log::info!("driftwell demo starting with seed {seed}");

    let mut respawn_at: Option<u64> = None;
    let mut bombs_dropped = 0u32;

    for frame in 0..3600u64 {
        // scripted control: magnetize for a second, coast for half, brake
        // for half, repeat
        let phase = frame % 120;
        let wanted = if phase < 60 {
            Skill::Magnetize
        } else if phase < 90 {
            Skill::None
        } else {
            Skill::Brake
        };
        if arena.active_skill() != wanted {
            if let Err(rejection) = arena.activate_skill(wanted, None) {
                log::debug!("skill {wanted:?} refused: {rejection}");
            }
        }

        // lob a bomb at the goal once a quarter of the round, if one is up
        if frame % 900 == 450 && bombs_dropped < 3 {
            let goal_pos = arena
                .snapshot()
                .bodies
                .iter()
                .find(|b| b.role == driftwell::sim::BodyRole::Goal)
                .map(|b| b.pos);
            if let Some(pos) = goal_pos {
                match arena.activate_skill(Skill::GravityWell, Some(pos)) {
                    Ok(()) => bombs_dropped += 1,
                    Err(rejection) => log::debug!("bomb refused: {rejection}"),
                }
            }
        }

        arena.advance_frame(SIM_DT);

        for event in arena.drain_events() {
            match event {
                ArenaEvent::GoalCaptured { score, .. } => {
                    log::info!("goal captured at frame {frame}, score {score}");
                    respawn_at = Some(frame + RESPAWN_DELAY_FRAMES);
                }
                ArenaEvent::WellSpawned { pos, .. } => {
                    log::info!("gravity well armed at {pos}");
                }
                ArenaEvent::WellExpired { .. } => log::info!("gravity well faded"),
                ArenaEvent::WellCollapsed { .. } => {
                    log::info!("gravity well collapsed at frame {frame}")
                }
            }
        }

        if respawn_at.is_some_and(|at| frame >= at) {
            arena.spawn_goal();
            respawn_at = None;
        }
    }

    let snapshot = arena.snapshot();
    log::info!(
        "demo finished: score {}, {:.1}s simulated, {:.1}s left on the clock",
        snapshot.score,
        snapshot.elapsed,
        snapshot.remaining
    );
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("snapshot serialization failed: {err}"),
    }
}
