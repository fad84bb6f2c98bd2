//! Canonical tuning table. Every subsystem reads its numbers from here.

// ── World ─────────────────────────────────────────────────────────────────────

/// Edge length of one tile in world units.
pub const TILE_SIZE: f32 = 32.0;
/// Rows from the bottom that are not Air: five Dirt rows plus one Stone row.
pub const GROUND_ROWS: usize = 6;
pub const TREASURE_BASE_CHANCE: f64 = 0.10;
pub const TREASURE_CHANCE_PER_LEVEL: f64 = 0.01;
pub const TREASURE_BASE_VALUE: u32 = 5;
/// Tiles in the outer band of a crater survive with this probability.
pub const CRATER_EDGE_SURVIVAL: f64 = 0.3;
pub const CRATER_EDGE_BAND: f32 = 0.5;

// ── Clock ─────────────────────────────────────────────────────────────────────

pub const FPS: u64 = 60;
/// Shortest wall-clock gap between two steps: the frame budget rounded up
/// to whole milliseconds.
pub const FRAME_TIME_MS: u64 = (1000 + FPS - 1) / FPS;
/// Longest stretch of wall time a single step may add to simulation time.
pub const MAX_STEP_MS: u64 = 250;

// ── Player ────────────────────────────────────────────────────────────────────

pub const GRAVITY: f32 = 0.5;
pub const JUMP_FORCE: f32 = -12.0;
pub const MOVEMENT_SPEED: f32 = 5.0;
/// Energy divisor in the speed buff `1 + energy / ENERGY_SPEED_DIVISOR`.
pub const ENERGY_SPEED_DIVISOR: f32 = 50.0;
pub const PLAYER_WIDTH: f32 = TILE_SIZE;
pub const PLAYER_HEIGHT: f32 = TILE_SIZE * 1.5;
pub const STARTING_ENERGY: f32 = 10.0;
pub const DIG_ENERGY_COST: f32 = 0.1;
pub const DIG_DAMAGE: i32 = 13;
pub const DIG_HIT_RADIUS: f32 = TILE_SIZE * 1.5;
pub const DIG_KNOCKBACK: f32 = 12.0;
pub const TREASURE_ENERGY_SHARE: f32 = 1.0;
pub const DEATH_ANIMATION_MS: u64 = 2000;
/// Player input is ignored for this long after a missile hit.
pub const HIT_SUPPRESS_MS: u64 = 500;

// ── Enemies ───────────────────────────────────────────────────────────────────

pub const ENEMY_SPEED: f32 = 1.5;
pub const ENEMY_DAMAGE: f32 = 15.0;
pub const ENEMY_HEALTH: i32 = 40;
pub const ENEMY_WIDTH: f32 = TILE_SIZE;
pub const ENEMY_HEIGHT: f32 = TILE_SIZE * 1.2;
pub const ENEMY_ATTACK_COOLDOWN_MS: u64 = 1000;
pub const ENEMY_ATTACK_RANGE: f32 = TILE_SIZE * 3.0;
pub const ENEMY_DETECTION_RANGE: f32 = TILE_SIZE * 6.0;
pub const ENEMY_PATROL_FACTOR: f32 = 0.7;
pub const ENEMY_SPAWN_INTERVAL_MS: u64 = 12_000;
pub const ENEMY_SPAWN_STEP_MS: u64 = 1000;
pub const ENEMY_SPAWN_FLOOR_MS: u64 = 5000;
pub const ENEMY_CAP_BASE: usize = 2;
pub const ENEMY_CAP_MAX: usize = 8;
pub const ENEMY_CONTACT_KNOCKBACK_X: f32 = 10.0;
pub const ENEMY_CONTACT_KNOCKBACK_Y: f32 = -5.0;

// ── Missiles ──────────────────────────────────────────────────────────────────

pub const MISSILE_ATTACK_INTERVAL_MIN_MS: u64 = 8000;
pub const MISSILE_ATTACK_INTERVAL_MAX_MS: u64 = 12_000;
pub const WARNING_DURATION_MS: u64 = 3000;
pub const MISSILE_SPEED: f32 = 5.0;
pub const MISSILE_SPAWN_Y: f32 = -50.0;
pub const MISSILE_JITTER: f32 = 150.0;
pub const MISSILE_IMPACT_DISTANCE: f32 = 5.0;
pub const MISSILE_IMPACT_RADIUS_TILES: i32 = 3;
pub const MISSILE_DAMAGE: f32 = 25.0;
pub const MISSILE_KNOCKBACK_X: f32 = 15.0;
pub const MISSILE_KNOCKBACK_Y: f32 = -10.0;
pub const TRAIL_MAX_AGE: u32 = 20;
pub const BACKGROUND_MISSILE_CHANCE: f64 = 0.01;
pub const BACKGROUND_MISSILE_CAP: usize = 5;
pub const EXPLOSION_FRAMES: u32 = 20;
pub const IMPACT_EXPLOSION_SIZE: f32 = 80.0;

// ── Progression ───────────────────────────────────────────────────────────────

pub const LEVEL_COUNTDOWN_SECS: u32 = 3;
pub const COUNTDOWN_STEP_MS: u64 = 1000;
/// Diamond total at which diamond achievements start rescaling.
pub const ACHIEVEMENT_KNEE: u32 = 10;
pub const ACHIEVEMENT_SCALE_DIVISOR: f64 = 50.0;
