//! Simulation clock and the per-tick driver.
//!
//! [`step`] is the only entry point the front-end needs: it applies the pause
//! toggle, asks the [`SimulationClock`] whether a frame is due, and runs
//! [`tick`]. All randomness comes through the injected `rng` so callers
//! control determinism.

use rand::Rng;
use tracing::{info, warn};

use crate::achievements::AchievementBook;
use crate::constants::{FPS, HIT_SUPPRESS_MS, MAX_STEP_MS};
use crate::entities::{GameEvent, GameState, GameStatus, InputIntent, LevelPhase, Vitality};
use crate::{enemies, level, missiles, player, world};

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Fixed-cadence driver. Calls that arrive inside the frame budget are
/// skipped rather than queued, and simulation time only advances while the
/// game is unpaused.
#[derive(Clone, Debug, Default)]
pub struct SimulationClock {
    last_frame_at: Option<u64>,
    sim_time: u64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds of unpaused play so far.
    pub fn sim_time(&self) -> u64 {
        self.sim_time
    }

    /// Returns the simulation timestamp for a step that should run now, or
    /// `None` if the frame is skipped (too early, or paused).
    pub fn advance(&mut self, wall_ms: u64, paused: bool) -> Option<u64> {
        let elapsed = match self.last_frame_at {
            None => {
                self.last_frame_at = Some(wall_ms);
                return None;
            }
            Some(last) => wall_ms.saturating_sub(last),
        };
        if elapsed * FPS < 1000 {
            return None;
        }
        self.last_frame_at = Some(wall_ms);
        if paused {
            return None;
        }
        self.sim_time += elapsed.min(MAX_STEP_MS);
        Some(self.sim_time)
    }
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the opening state for a world of `width × height` tiles.
pub fn init_state(width: usize, height: usize, start_level: u32, rng: &mut impl Rng) -> GameState {
    let level = start_level.max(1);
    let (grid, treasures) = world::generate(width, height, level, rng);
    let (x, y) = player::spawn_point(&grid);
    GameState {
        grid,
        treasures,
        player: player::new_player(x, y),
        enemies: Vec::new(),
        last_enemy_spawn: None,
        missiles: missiles::init_missile_system(0, rng),
        level,
        score: 0,
        kills: 0,
        phase: LevelPhase::Playing,
        status: GameStatus::Playing,
        achievements: AchievementBook::new(),
        paused: false,
        now: 0,
        frame: 0,
    }
}

// ── Driver ────────────────────────────────────────────────────────────────────

/// Apply the pause toggle, then run one tick if the clock says a frame is
/// due. Returns the events of that tick (empty when skipped).
pub fn step(
    state: &mut GameState,
    clock: &mut SimulationClock,
    input: &InputIntent,
    wall_ms: u64,
    rng: &mut impl Rng,
) -> Vec<GameEvent> {
    if input.pause && state.status == GameStatus::Playing {
        state.paused = !state.paused;
        info!(paused = state.paused, "pause toggled");
    }
    match clock.advance(wall_ms, state.paused) {
        Some(now) => tick(state, input, now, rng),
        None => Vec::new(),
    }
}

/// Advance the simulation to `now` (simulation milliseconds).
///
/// Order: death sequence → missiles → enemies → player → contact damage →
/// level transitions → achievements.
pub fn tick(
    state: &mut GameState,
    input: &InputIntent,
    now: u64,
    rng: &mut impl Rng,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.status == GameStatus::GameOver || state.paused {
        return events;
    }
    if now < state.now {
        warn!(now, last = state.now, "simulation time went backwards; ignoring step");
        return events;
    }
    state.now = now;
    state.frame += 1;

    if state.player.vitality != Vitality::Alive {
        if player::advance_death(&mut state.player, now) {
            state.status = GameStatus::GameOver;
            info!(level = state.level, score = state.score, kills = state.kills, "game over");
            events.push(GameEvent::GameOver);
        }
        return events;
    }

    let before = (state.score, state.kills);
    let level_complete = state.phase != LevelPhase::Playing;

    missiles::update_missiles(
        &mut state.missiles,
        &mut state.grid,
        &mut state.player,
        level_complete,
        now,
        rng,
        &mut events,
    );
    state.player.is_hidden = world::is_hidden(&state.grid, &state.player.body);

    match state.phase {
        LevelPhase::Playing => {
            state.kills += enemies::update_enemies(
                &mut state.enemies,
                &state.player,
                &state.grid,
                now,
                &mut events,
            );
            enemies::spawn_enemies(
                &mut state.enemies,
                &mut state.last_enemy_spawn,
                &state.grid,
                state.level,
                now,
                rng,
                &mut events,
            );

            if !missiles::hit_recently(&state.missiles, now, HIT_SUPPRESS_MS) {
                let update = player::update_player(
                    &mut state.player,
                    &mut state.grid,
                    &mut state.treasures,
                    &mut state.enemies,
                    input,
                    state.score,
                    &mut events,
                );
                state.score = update.score;
                if update.all_treasures_collected {
                    level::complete_level(state, &mut events);
                }
            }

            if state.phase == LevelPhase::Playing {
                enemies::check_collisions(&mut state.player, &mut state.enemies, now, &mut events);
            }
        }
        LevelPhase::Complete { .. } => {
            state.kills += enemies::remove_destroyed(&mut state.enemies, &mut events);
            level::advance_countdown(state, rng, &mut events);
        }
    }

    player::check_death(&mut state.player, now, &mut events);

    if (state.score, state.kills) != before {
        level::record_achievements(state, &mut events);
    }
    events
}
