//! Player controller: intent → velocity → collision → digging → pickups, plus
//! the energy model and the death sequence.

use crate::constants::{
    DEATH_ANIMATION_MS, DIG_DAMAGE, DIG_ENERGY_COST, DIG_HIT_RADIUS, DIG_KNOCKBACK,
    ENERGY_SPEED_DIVISOR, GRAVITY, GROUND_ROWS, JUMP_FORCE, MOVEMENT_SPEED, PLAYER_HEIGHT,
    PLAYER_WIDTH, STARTING_ENERGY, TILE_SIZE, TREASURE_ENERGY_SHARE,
};
use crate::entities::{
    Body, Enemy, GameEvent, InputIntent, Motion, Player, Treasure, Vitality,
};
use crate::kinematics;
use crate::world::{self, tile_index, TileGrid};

/// What the level controller needs back from one player update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerUpdate {
    /// False when the level has no treasures at all.
    pub all_treasures_collected: bool,
    pub score: u32,
}

// ── Constructors ─────────────────────────────────────────────────────────────

pub fn new_player(x: f32, y: f32) -> Player {
    Player {
        body: Body::new(x, y, PLAYER_WIDTH, PLAYER_HEIGHT),
        energy: STARTING_ENERGY,
        motion: Motion::Airborne,
        is_digging: false,
        facing_right: true,
        is_hidden: false,
        vitality: Vitality::Alive,
        jump_held: false,
    }
}

/// Mid-screen, two tiles above the dirt band.
pub fn spawn_point(grid: &TileGrid) -> (f32, f32) {
    let x = (grid.pixel_width() / 2.0).min(grid.pixel_width() - PLAYER_WIDTH).max(0.0);
    let dirt_top = grid.height().saturating_sub(GROUND_ROWS) as f32 * TILE_SIZE;
    let y = (dirt_top - PLAYER_HEIGHT - 2.0 * TILE_SIZE).max(0.0);
    (x, y)
}

/// Move the player back to the spawn point and stop it. Energy is kept.
pub fn reset_position(player: &mut Player, grid: &TileGrid) {
    let (x, y) = spawn_point(grid);
    player.body.x = x;
    player.body.y = y;
    player.body.velocity_x = 0.0;
    player.body.velocity_y = 0.0;
    player.motion = Motion::Airborne;
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// -1, 0 or +1. When both directions are held the later press wins.
pub fn horizontal_intent(input: &InputIntent) -> i32 {
    match (input.move_left, input.move_right) {
        (true, true) if input.left_pressed_at > input.right_pressed_at => -1,
        (true, true) => 1,
        (true, false) => -1,
        (false, true) => 1,
        (false, false) => 0,
    }
}

pub fn movement_speed(energy: f32) -> f32 {
    MOVEMENT_SPEED * (1.0 + energy / ENERGY_SPEED_DIVISOR)
}

// ── Per-tick update ───────────────────────────────────────────────────────────

/// Advance the player by one step. Does nothing unless the player is alive.
pub fn update_player(
    player: &mut Player,
    grid: &mut TileGrid,
    treasures: &mut [Treasure],
    enemies: &mut [Enemy],
    input: &InputIntent,
    score: u32,
    events: &mut Vec<GameEvent>,
) -> PlayerUpdate {
    if player.vitality != Vitality::Alive {
        return PlayerUpdate {
            all_treasures_collected: false,
            score,
        };
    }
    let mut score = score;

    match horizontal_intent(input) {
        -1 => {
            player.body.velocity_x = -movement_speed(player.energy);
            player.facing_right = false;
        }
        1 => {
            player.body.velocity_x = movement_speed(player.energy);
            player.facing_right = true;
        }
        _ => player.body.velocity_x = 0.0,
    }

    if input.jump && !player.jump_held && player.motion == Motion::Grounded {
        player.body.velocity_y = JUMP_FORCE;
        player.motion = Motion::Airborne;
        events.push(GameEvent::Jump);
    }
    player.jump_held = input.jump;

    player.is_digging = input.dig;
    if player.is_digging && player.energy > 0.0 {
        try_dig(player, grid, treasures, enemies, &mut score, events);
    }

    player.body.velocity_y += GRAVITY;
    kinematics::move_horizontal(&mut player.body, grid);
    kinematics::move_vertical(&mut player.body, grid, &mut player.motion);

    let all_treasures_collected = collect_treasures(player, treasures, &mut score, events);
    PlayerUpdate {
        all_treasures_collected,
        score,
    }
}

// ── Digging ───────────────────────────────────────────────────────────────────

/// The tile one step ahead of the player at foot level.
pub fn dig_target(player: &Player) -> (i64, i64) {
    let edge_x = if player.facing_right {
        player.body.right()
    } else {
        player.body.x - 1.0
    };
    (tile_index(edge_x), tile_index(player.body.bottom()))
}

/// Dig the target tile. On success this costs energy, collects any treasure
/// buried there and hits every enemy near the hole.
pub fn try_dig(
    player: &mut Player,
    grid: &mut TileGrid,
    treasures: &mut [Treasure],
    enemies: &mut [Enemy],
    score: &mut u32,
    events: &mut Vec<GameEvent>,
) -> bool {
    let (tx, ty) = dig_target(player);
    if tx < 0 || ty < 0 || !world::dig(grid, tx as usize, ty as usize) {
        return false;
    }
    player.energy -= DIG_ENERGY_COST;
    events.push(GameEvent::Dig {
        tile_x: tx as usize,
        tile_y: ty as usize,
    });

    let left = tx as f32 * TILE_SIZE;
    let top = ty as f32 * TILE_SIZE;
    if let Some(treasure) = treasures
        .iter_mut()
        .find(|t| !t.collected && t.x == left && t.y == top)
    {
        collect(player, treasure, score, events);
    }

    let hole_x = left + TILE_SIZE / 2.0;
    let hole_y = top + TILE_SIZE / 2.0;
    for enemy in enemies.iter_mut() {
        let dx = enemy.body.center_x() - hole_x;
        let dy = enemy.body.center_y() - hole_y;
        if (dx * dx + dy * dy).sqrt() > DIG_HIT_RADIUS {
            continue;
        }
        enemy.health = (enemy.health - DIG_DAMAGE).max(0);
        let away = if enemy.body.center_x() >= player.body.center_x() {
            1.0
        } else {
            -1.0
        };
        enemy.body.velocity_x = away * DIG_KNOCKBACK;
        kinematics::move_horizontal(&mut enemy.body, grid);
        enemy.body.velocity_x = 0.0;
        events.push(GameEvent::EnemyHit {
            x: enemy.body.center_x(),
            y: enemy.body.center_y(),
        });
    }
    true
}

// ── Treasure ──────────────────────────────────────────────────────────────────

fn collect(player: &mut Player, treasure: &mut Treasure, score: &mut u32, events: &mut Vec<GameEvent>) {
    treasure.collected = true;
    player.energy += treasure.value as f32 * TREASURE_ENERGY_SHARE;
    *score += treasure.value;
    events.push(GameEvent::TreasureCollected {
        value: treasure.value,
    });
}

/// Pick up every treasure the player overlaps. Returns whether the whole
/// (non-empty) set is now collected.
pub fn collect_treasures(
    player: &mut Player,
    treasures: &mut [Treasure],
    score: &mut u32,
    events: &mut Vec<GameEvent>,
) -> bool {
    for treasure in treasures.iter_mut().filter(|t| !t.collected) {
        if player
            .body
            .overlaps_rect(treasure.x, treasure.y, treasure.x + TILE_SIZE, treasure.y + TILE_SIZE)
        {
            collect(player, treasure, score, events);
        }
    }
    !treasures.is_empty() && treasures.iter().all(|t| t.collected)
}

// ── Energy & death ────────────────────────────────────────────────────────────

/// Start the death sequence once energy is spent. Energy never stays
/// negative.
pub fn check_death(player: &mut Player, now: u64, events: &mut Vec<GameEvent>) -> bool {
    if player.energy <= 0.0 {
        player.energy = 0.0;
        if player.vitality == Vitality::Alive {
            player.vitality = Vitality::Dying { since: now };
            player.body.velocity_x = 0.0;
            events.push(GameEvent::PlayerDied);
            return true;
        }
    }
    false
}

/// Finish the death sequence after `DEATH_ANIMATION_MS`. Returns true on the
/// step it completes.
pub fn advance_death(player: &mut Player, now: u64) -> bool {
    match player.vitality {
        Vitality::Dying { since } if now.saturating_sub(since) >= DEATH_ANIMATION_MS => {
            player.vitality = Vitality::Dead;
            true
        }
        _ => false,
    }
}
