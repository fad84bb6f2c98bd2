//! Timed missile strikes plus the cosmetic war in the background.
//!
//! A strike runs `Idle → Warning → Flying → Idle`. The impact itself is the
//! Flying → Idle transition: it blasts a crater, may hurt the player and
//! reschedules the next strike.

use rand::Rng;
use tracing::{debug, info};

use crate::constants::{
    BACKGROUND_MISSILE_CAP, BACKGROUND_MISSILE_CHANCE, EXPLOSION_FRAMES, IMPACT_EXPLOSION_SIZE,
    MISSILE_ATTACK_INTERVAL_MAX_MS, MISSILE_ATTACK_INTERVAL_MIN_MS, MISSILE_DAMAGE,
    MISSILE_IMPACT_DISTANCE, MISSILE_IMPACT_RADIUS_TILES, MISSILE_JITTER, MISSILE_KNOCKBACK_X,
    MISSILE_KNOCKBACK_Y, MISSILE_SPAWN_Y, MISSILE_SPEED, TILE_SIZE, TRAIL_MAX_AGE,
    WARNING_DURATION_MS,
};
use crate::entities::{
    AttackPhase, Explosion, GameEvent, Missile, MissileSystem, Player, SmokeCloud, TrailPoint,
};
use crate::world::{self, tile_index, TileGrid};

// ── Constructors ─────────────────────────────────────────────────────────────

pub fn init_missile_system(now: u64, rng: &mut impl Rng) -> MissileSystem {
    MissileSystem {
        explosions: Vec::new(),
        missiles: Vec::new(),
        smoke_clouds: Vec::new(),
        next_attack_at: now + attack_interval(rng),
        attack: AttackPhase::Idle,
        player_hit_at: None,
    }
}

/// Uniform in `[MIN, MAX)` milliseconds.
pub fn attack_interval(rng: &mut impl Rng) -> u64 {
    rng.gen_range(MISSILE_ATTACK_INTERVAL_MIN_MS..MISSILE_ATTACK_INTERVAL_MAX_MS)
}

fn launch(x: f32, y: f32, target_x: f32, target_y: f32, speed: f32) -> Missile {
    Missile {
        x,
        y,
        target_x,
        target_y,
        speed,
        angle: (target_y - y).atan2(target_x - x),
        trail: Vec::new(),
        exploded: false,
    }
}

/// Drop the in-flight strike and all effects. An idle schedule survives; a
/// dropped strike is rescheduled from `now` so the next one does not fire on
/// the first step of the new level.
pub fn reset_for_level(system: &mut MissileSystem, now: u64, rng: &mut impl Rng) {
    if !matches!(system.attack, AttackPhase::Idle) {
        system.next_attack_at = now + attack_interval(rng);
    }
    system.attack = AttackPhase::Idle;
    system.missiles.clear();
    system.explosions.clear();
    system.smoke_clouds.clear();
    system.player_hit_at = None;
}

/// True while the player is still reeling from a strike.
pub fn hit_recently(system: &MissileSystem, now: u64, window_ms: u64) -> bool {
    system
        .player_hit_at
        .map_or(false, |at| now.saturating_sub(at) < window_ms)
}

// ── Targeting ─────────────────────────────────────────────────────────────────

/// Aim ahead of the player and open the warning window.
pub fn begin_attack(
    system: &mut MissileSystem,
    player: &Player,
    grid: &TileGrid,
    now: u64,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    if !matches!(system.attack, AttackPhase::Idle) {
        return;
    }
    let heading = if player.body.velocity_x > 0.0 {
        1.0
    } else if player.body.velocity_x < 0.0 {
        -1.0
    } else {
        0.0
    };
    let target_x = player.body.center_x()
        + heading * player.body.width * 2.0
        + rng.gen_range(-MISSILE_JITTER..=MISSILE_JITTER);
    let target_y = ground_below(grid, target_x).unwrap_or(0.0);
    let start_x = target_x + rng.gen_range(-MISSILE_JITTER..=MISSILE_JITTER);

    info!(target_x, target_y, "missile strike incoming");
    events.push(GameEvent::MissileWarning { target_x, target_y });
    system.attack = AttackPhase::Warning {
        started_at: now,
        missile: launch(start_x, MISSILE_SPAWN_Y, target_x, target_y, MISSILE_SPEED),
    };
}

/// Top edge of the first solid tile in the column under `world_x`.
pub fn ground_below(grid: &TileGrid, world_x: f32) -> Option<f32> {
    let tx = tile_index(world_x);
    if tx < 0 {
        return None;
    }
    world::surface_row(grid, tx as usize).map(|row| row as f32 * TILE_SIZE)
}

// ── Per-tick update ───────────────────────────────────────────────────────────

/// Advance strikes and effects by one step. `level_complete` holds off new
/// strikes but lets one already in the air land.
pub fn update_missiles(
    system: &mut MissileSystem,
    grid: &mut TileGrid,
    player: &mut Player,
    level_complete: bool,
    now: u64,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    let (view_w, view_h) = (grid.pixel_width(), grid.pixel_height());

    if system.missiles.len() < BACKGROUND_MISSILE_CAP && rng.gen_bool(BACKGROUND_MISSILE_CHANCE) {
        spawn_background_missile(system, view_w, view_h, rng);
    }

    if now >= system.next_attack_at && !level_complete {
        begin_attack(system, player, grid, now, rng, events);
    }

    update_background_missiles(system, view_w, view_h, rng);
    advance_attack(system, grid, player, now, rng, events);
    age_effects(system);
}

fn advance_attack(
    system: &mut MissileSystem,
    grid: &mut TileGrid,
    player: &mut Player,
    now: u64,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    let phase = std::mem::replace(&mut system.attack, AttackPhase::Idle);
    let mut missile = match phase {
        AttackPhase::Idle => return,
        AttackPhase::Warning { started_at, missile }
            if now.saturating_sub(started_at) < WARNING_DURATION_MS =>
        {
            system.attack = AttackPhase::Warning { started_at, missile };
            return;
        }
        AttackPhase::Warning { missile, .. } | AttackPhase::Flying { missile } => missile,
    };

    if !step_missile(&mut missile) {
        system.attack = AttackPhase::Flying { missile };
        return;
    }

    let (x, y) = (missile.target_x, missile.target_y);
    let destroyed = world::explode(grid, x, y, MISSILE_IMPACT_RADIUS_TILES, rng);
    add_explosion(system, x, y, IMPACT_EXPLOSION_SIZE, rng);
    debug!(x, y, destroyed = destroyed.len(), "missile impact");
    events.push(GameEvent::MissileImpact { x, y, destroyed });

    if check_player_hit(system, player, grid, x, y, now) {
        events.push(GameEvent::PlayerHit);
    }
    system.next_attack_at = now + attack_interval(rng);
}

/// Move one step along the heading and leave a trail sample. Returns true
/// when the missile has arrived.
fn step_missile(missile: &mut Missile) -> bool {
    missile.x += missile.angle.cos() * missile.speed;
    missile.y += missile.angle.sin() * missile.speed;
    missile.trail.push(TrailPoint {
        x: missile.x,
        y: missile.y,
        age: 0,
    });
    let dx = missile.target_x - missile.x;
    let dy = missile.target_y - missile.y;
    if (dx * dx + dy * dy).sqrt() < MISSILE_IMPACT_DISTANCE {
        missile.exploded = true;
    }
    missile.exploded
}

/// Blast damage for a player in range who is not under cover.
pub fn check_player_hit(
    system: &mut MissileSystem,
    player: &mut Player,
    grid: &TileGrid,
    impact_x: f32,
    impact_y: f32,
    now: u64,
) -> bool {
    let dx = player.body.center_x() - impact_x;
    let dy = player.body.center_y() - impact_y;
    let radius = MISSILE_IMPACT_RADIUS_TILES as f32 * TILE_SIZE;
    if (dx * dx + dy * dy).sqrt() >= radius || world::is_hidden(grid, &player.body) {
        return false;
    }

    system.player_hit_at = Some(now);
    let away = if dx < 0.0 { -1.0 } else { 1.0 };
    player.body.velocity_x = away * MISSILE_KNOCKBACK_X;
    player.body.velocity_y = MISSILE_KNOCKBACK_Y;
    player.energy = (player.energy - MISSILE_DAMAGE).max(0.0);
    info!(energy = player.energy, "player caught in missile blast");
    true
}

// ── Background war ────────────────────────────────────────────────────────────

fn spawn_background_missile(system: &mut MissileSystem, view_w: f32, view_h: f32, rng: &mut impl Rng) {
    let x = rng.gen::<f32>() * view_w;
    let target_x = rng.gen::<f32>() * view_w;
    let target_y = view_h * 0.4 + rng.gen::<f32>() * view_h * 0.1;
    let speed = 3.0 + rng.gen::<f32>() * 2.0;
    system.missiles.push(launch(x, -20.0, target_x, target_y, speed));
}

fn update_background_missiles(
    system: &mut MissileSystem,
    view_w: f32,
    view_h: f32,
    rng: &mut impl Rng,
) {
    let mut arrivals = Vec::new();
    system.missiles.retain_mut(|missile| {
        if missile.exploded {
            return false;
        }
        if step_missile(missile) {
            arrivals.push((missile.target_x, missile.target_y));
            return false;
        }
        missile.x >= -50.0 && missile.x <= view_w + 50.0 && missile.y <= view_h + 50.0
    });
    for (x, y) in arrivals {
        let size = 30.0 + rng.gen::<f32>() * 20.0;
        add_explosion(system, x, y, size, rng);
    }
}

/// A cosmetic blast plus three drifting smoke clouds.
pub fn add_explosion(system: &mut MissileSystem, x: f32, y: f32, size: f32, rng: &mut impl Rng) {
    system.explosions.push(Explosion {
        x,
        y,
        size,
        frame: 0,
        max_frames: EXPLOSION_FRAMES,
    });
    for _ in 0..3 {
        system.smoke_clouds.push(SmokeCloud {
            x: x + (rng.gen::<f32>() - 0.5) * size * 2.0,
            y: y + (rng.gen::<f32>() - 0.5) * size,
            size: size * 0.7 + rng.gen::<f32>() * size * 0.5,
            drift_x: (rng.gen::<f32>() - 0.5) * 0.5,
            life: rng.gen_range(100..300),
        });
    }
}

fn age_effects(system: &mut MissileSystem) {
    let strike = match &mut system.attack {
        AttackPhase::Warning { missile, .. } | AttackPhase::Flying { missile } => Some(missile),
        AttackPhase::Idle => None,
    };
    for missile in system.missiles.iter_mut().chain(strike) {
        missile.trail.retain_mut(|point| {
            point.age += 1;
            point.age < TRAIL_MAX_AGE
        });
    }

    system.explosions.retain_mut(|explosion| {
        explosion.frame += 1;
        explosion.frame < explosion.max_frames
    });
    system.smoke_clouds.retain_mut(|cloud| {
        cloud.x += cloud.drift_x;
        cloud.life = cloud.life.saturating_sub(1);
        cloud.life > 0
    });
}
