//! Level progression: completion, bonus, countdown and regeneration.

use rand::Rng;
use tracing::info;

use crate::achievements::Progress;
use crate::constants::{COUNTDOWN_STEP_MS, LEVEL_COUNTDOWN_SECS};
use crate::entities::{GameEvent, GameState, LevelPhase};
use crate::{enemies, missiles, player, world};

pub fn progress(state: &GameState) -> Progress {
    Progress {
        total_diamonds: state.score,
        level: state.level,
        energy: state.player.energy,
        kills: state.kills,
    }
}

/// Run the achievement evaluator against the current counters.
pub fn record_achievements(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let progress = progress(state);
    for id in state.achievements.evaluate(progress) {
        info!(id, "achievement reached");
        events.push(GameEvent::AchievementReached { id });
    }
}

pub fn level_bonus(energy: f32, level: u32) -> u32 {
    (energy.max(0.0) * level as f32).floor() as u32
}

/// Award the bonus and start the countdown. No-op unless the level is still
/// being played.
pub fn complete_level(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.phase != LevelPhase::Playing {
        return;
    }
    let bonus = level_bonus(state.player.energy, state.level);
    state.score += bonus;
    state.phase = LevelPhase::Complete {
        countdown: LEVEL_COUNTDOWN_SECS,
        last_tick_at: state.now,
    };
    info!(level = state.level, bonus, score = state.score, "level complete");
    events.push(GameEvent::LevelComplete { bonus });
    record_achievements(state, events);
}

/// Tick the countdown once per elapsed second and roll over to the next level
/// when it runs out. Returns true on the step a new level starts.
pub fn advance_countdown(
    state: &mut GameState,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) -> bool {
    let LevelPhase::Complete {
        mut countdown,
        mut last_tick_at,
    } = state.phase
    else {
        return false;
    };

    while countdown > 0 && state.now.saturating_sub(last_tick_at) >= COUNTDOWN_STEP_MS {
        countdown -= 1;
        last_tick_at += COUNTDOWN_STEP_MS;
    }

    if countdown == 0 {
        start_next_level(state, rng, events);
        true
    } else {
        state.phase = LevelPhase::Complete {
            countdown,
            last_tick_at,
        };
        false
    }
}

/// Regenerate the world for the next level. Energy, score, kills and the
/// missile schedule carry over; enemies and in-flight effects do not, though
/// any enemy already destroyed is still counted as a kill.
pub fn start_next_level(state: &mut GameState, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    state.level += 1;
    let (grid, treasures) = world::generate(state.grid.width(), state.grid.height(), state.level, rng);
    state.grid = grid;
    state.treasures = treasures;

    player::reset_position(&mut state.player, &state.grid);
    state.kills += enemies::remove_destroyed(&mut state.enemies, events);
    state.enemies.clear();
    state.last_enemy_spawn = None;
    missiles::reset_for_level(&mut state.missiles, state.now, rng);
    state.phase = LevelPhase::Playing;

    info!(
        level = state.level,
        treasures = state.treasures.len(),
        "level started"
    );
    events.push(GameEvent::LevelStarted { level: state.level });
    record_achievements(state, events);
}
