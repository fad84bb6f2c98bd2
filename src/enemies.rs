//! Enemy robots: spawn policy, the patrol/chase machine, grounding and
//! contact damage.

use rand::Rng;
use tracing::debug;

use crate::constants::{
    ENEMY_ATTACK_COOLDOWN_MS, ENEMY_ATTACK_RANGE, ENEMY_CAP_BASE, ENEMY_CAP_MAX,
    ENEMY_CONTACT_KNOCKBACK_X, ENEMY_CONTACT_KNOCKBACK_Y, ENEMY_DAMAGE, ENEMY_DETECTION_RANGE,
    ENEMY_HEALTH, ENEMY_HEIGHT, ENEMY_PATROL_FACTOR, ENEMY_SPAWN_FLOOR_MS,
    ENEMY_SPAWN_INTERVAL_MS, ENEMY_SPAWN_STEP_MS, ENEMY_SPEED, ENEMY_WIDTH, TILE_SIZE,
};
use crate::entities::{Body, Enemy, EnemyMode, GameEvent, Player, Tile};
use crate::kinematics;
use crate::world::{self, tile_index, TileGrid};

/// Probe distance past the body edge when looking for ledges and walls.
const PROBE: f32 = 5.0;

// ── Difficulty tables ────────────────────────────────────────────────────────

pub fn spawn_interval_ms(level: u32) -> u64 {
    ENEMY_SPAWN_INTERVAL_MS
        .saturating_sub(u64::from(level) * ENEMY_SPAWN_STEP_MS)
        .max(ENEMY_SPAWN_FLOOR_MS)
}

pub fn max_enemies(level: u32) -> usize {
    (ENEMY_CAP_BASE + level as usize / 2).min(ENEMY_CAP_MAX)
}

// ── Constructors ─────────────────────────────────────────────────────────────

pub fn new_enemy(x: f32, y: f32, rng: &mut impl Rng) -> Enemy {
    Enemy {
        body: Body::new(x, y, ENEMY_WIDTH, ENEMY_HEIGHT),
        speed: ENEMY_SPEED,
        damage: ENEMY_DAMAGE,
        health: ENEMY_HEALTH,
        last_attack_at: None,
        mode: EnemyMode::Patrol,
        patrol_direction: if rng.gen_bool(0.5) { 1 } else { -1 },
        facing_right: rng.gen_bool(0.5),
        sees_player: false,
        attack_range: ENEMY_ATTACK_RANGE,
    }
}

pub fn cooldown_elapsed(enemy: &Enemy, now: u64) -> bool {
    enemy
        .last_attack_at
        .map_or(true, |at| now.saturating_sub(at) > ENEMY_ATTACK_COOLDOWN_MS)
}

// ── Spawning ──────────────────────────────────────────────────────────────────

/// Try to add one enemy on the surface of a random column. The spawn timer
/// only restarts when an enemy is actually placed.
pub fn spawn_enemies(
    enemies: &mut Vec<Enemy>,
    last_spawn: &mut Option<u64>,
    grid: &TileGrid,
    level: u32,
    now: u64,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    if let Some(at) = *last_spawn {
        if now.saturating_sub(at) < spawn_interval_ms(level) {
            return;
        }
    }
    if enemies.len() >= max_enemies(level) || grid.width() < 5 {
        return;
    }

    let column = rng.gen_range(2..grid.width() - 2);
    let Some(surface) = world::surface_row(grid, column) else {
        return;
    };
    if surface == 0 || grid.get(column, surface - 1) != Some(Tile::Air) {
        return;
    }

    let x = column as f32 * TILE_SIZE;
    let y = surface as f32 * TILE_SIZE - ENEMY_HEIGHT;
    enemies.push(new_enemy(x, y, rng));
    *last_spawn = Some(now);
    debug!(column, surface, count = enemies.len(), "enemy spawned");
    events.push(GameEvent::EnemySpawned { x, y });
}

// ── AI ────────────────────────────────────────────────────────────────────────

/// Drop every enemy whose health ran out. Returns how many were removed.
pub fn remove_destroyed(enemies: &mut Vec<Enemy>, events: &mut Vec<GameEvent>) -> u32 {
    let before = enemies.len();
    enemies.retain(|enemy| {
        if enemy.health > 0 {
            return true;
        }
        events.push(GameEvent::EnemyKilled {
            x: enemy.body.center_x(),
            y: enemy.body.center_y(),
        });
        false
    });
    (before - enemies.len()) as u32
}

/// Remove destroyed enemies, then run one step of the patrol/chase machine
/// for the rest. Returns the number of kills this step.
pub fn update_enemies(
    enemies: &mut Vec<Enemy>,
    player: &Player,
    grid: &TileGrid,
    now: u64,
    events: &mut Vec<GameEvent>,
) -> u32 {
    let kills = remove_destroyed(enemies, events);
    for enemy in enemies.iter_mut() {
        update_enemy(enemy, player, grid, now);
    }
    kills
}

pub fn can_see(enemy: &Enemy, player: &Player) -> bool {
    !player.is_hidden && enemy.body.distance_to(&player.body) < ENEMY_DETECTION_RANGE
}

fn update_enemy(enemy: &mut Enemy, player: &Player, grid: &TileGrid, now: u64) {
    enemy.mode = if can_see(enemy, player) {
        EnemyMode::Chase
    } else {
        EnemyMode::Patrol
    };
    enemy.sees_player = enemy.mode == EnemyMode::Chase;

    match enemy.mode {
        EnemyMode::Chase => chase(enemy, player, now),
        EnemyMode::Patrol => patrol(enemy, grid),
    }

    kinematics::move_horizontal(&mut enemy.body, grid);
    settle_on_ground(enemy, grid);

    let max_x = grid.pixel_width() - enemy.body.width;
    if enemy.body.x <= 0.0 && enemy.patrol_direction < 0 {
        enemy.body.x = 0.0;
        enemy.patrol_direction = 1;
    } else if enemy.body.x >= max_x && enemy.patrol_direction > 0 {
        enemy.body.x = max_x.max(0.0);
        enemy.patrol_direction = -1;
    }
}

fn chase(enemy: &mut Enemy, player: &Player, now: u64) {
    let dx = player.body.center_x() - enemy.body.center_x();
    enemy.facing_right = dx > 0.0;
    enemy.body.velocity_x = if dx.abs() > TILE_SIZE / 2.0 {
        dx.signum() * enemy.speed
    } else {
        0.0
    };

    // Damage lands in `check_collisions`; this only arms the cooldown.
    if enemy.body.distance_to(&player.body) < enemy.attack_range && cooldown_elapsed(enemy, now) {
        enemy.last_attack_at = Some(now);
    }
}

fn patrol(enemy: &mut Enemy, grid: &TileGrid) {
    let dir = enemy.patrol_direction as f32;
    enemy.body.velocity_x = dir * enemy.speed * ENEMY_PATROL_FACTOR;
    enemy.facing_right = enemy.patrol_direction > 0;

    if blocked_ahead(enemy, grid) {
        enemy.patrol_direction = -enemy.patrol_direction;
        enemy.facing_right = enemy.patrol_direction > 0;
    }
}

/// A ledge (no floor one step ahead), the world edge, or a wall at body
/// height that is not the enemy's own column.
fn blocked_ahead(enemy: &Enemy, grid: &TileGrid) -> bool {
    let probe_x = if enemy.patrol_direction > 0 {
        enemy.body.right() + PROBE
    } else {
        enemy.body.x - PROBE
    };
    let next_x = tile_index(probe_x);
    let body_y = tile_index(enemy.body.bottom() - PROBE);
    let own_x = tile_index(enemy.body.center_x());

    next_x < 0
        || next_x >= grid.width() as i64
        || body_y + 1 >= grid.height() as i64
        || !grid.is_solid(next_x, body_y + 1)
        || (grid.is_solid(next_x, body_y) && next_x != own_x)
}

/// Enemies do not fall: once nothing is left under any column of their
/// footprint they snap down onto the highest solid tile below it.
fn settle_on_ground(enemy: &mut Enemy, grid: &TileGrid) {
    let columns: Vec<i64> = kinematics::tile_span(enemy.body.x, enemy.body.width)
        .filter(|&tx| tx >= 0 && tx < grid.width() as i64)
        .collect();
    let foot = tile_index(enemy.body.bottom());
    if columns.is_empty() || foot < 0 || foot >= grid.height() as i64 - 1 {
        return;
    }
    let supported = |row: i64| columns.iter().any(|&tx| grid.is_solid(tx, row));
    if supported(foot) {
        return;
    }
    let mut ground = foot;
    while ground < grid.height() as i64 - 1 && !supported(ground) {
        ground += 1;
    }
    enemy.body.y = ground as f32 * TILE_SIZE - enemy.body.height;
}

// ── Contact damage ────────────────────────────────────────────────────────────

/// AABB contact between the player and each enemy. An enemy whose cooldown
/// has run out, or whose chase swing was armed this very step, drains energy
/// and knocks the player away.
pub fn check_collisions(
    player: &mut Player,
    enemies: &mut [Enemy],
    now: u64,
    events: &mut Vec<GameEvent>,
) {
    for enemy in enemies.iter_mut() {
        let swinging = enemy.last_attack_at == Some(now);
        if !player.body.overlaps(&enemy.body) || !(swinging || cooldown_elapsed(enemy, now)) {
            continue;
        }
        player.energy -= enemy.damage;
        enemy.last_attack_at = Some(now);

        let away = if player.body.x < enemy.body.x { -1.0 } else { 1.0 };
        player.body.velocity_x = away * ENEMY_CONTACT_KNOCKBACK_X;
        player.body.velocity_y = ENEMY_CONTACT_KNOCKBACK_Y;
        events.push(GameEvent::PlayerHit);
    }
}
