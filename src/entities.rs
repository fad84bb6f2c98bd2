//! Game state types. Plain data; behaviour lives in the subsystem modules.

use crate::achievements::AchievementBook;
use crate::world::TileGrid;

// ── Terrain ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Air,
    Dirt,
    Stone,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Treasure {
    /// Left edge of the tile the treasure sits in, world units.
    pub x: f32,
    /// Top edge of the tile the treasure sits in, world units.
    pub y: f32,
    pub collected: bool,
    pub value: u32,
}

// ── Bodies ────────────────────────────────────────────────────────────────────

/// Axis-aligned box with a velocity. `(x, y)` is the top-left corner and y
/// grows downward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Grounded,
    Airborne,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vitality {
    Alive,
    /// Death sequence running since the given simulation time.
    Dying { since: u64 },
    /// Death sequence finished.
    Dead,
}

// ── Player & enemy ────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    /// Spent by digging and damage, earned from treasure, and a speed buff.
    pub energy: f32,
    pub motion: Motion,
    pub is_digging: bool,
    pub facing_right: bool,
    /// Under an unbroken dirt ceiling; immune to missiles and unseen by enemies.
    pub is_hidden: bool,
    pub vitality: Vitality,
    /// Jump input level on the previous update, for edge detection.
    pub jump_held: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyMode {
    Patrol,
    Chase,
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub body: Body,
    pub speed: f32,
    pub damage: f32,
    pub health: i32,
    /// Simulation time of the last attack; `None` means ready.
    pub last_attack_at: Option<u64>,
    pub mode: EnemyMode,
    /// Either -1 (left) or +1 (right).
    pub patrol_direction: i32,
    pub facing_right: bool,
    pub sees_player: bool,
    pub attack_range: f32,
}

// ── Missiles ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
    pub x: f32,
    pub y: f32,
    pub age: u32,
}

#[derive(Clone, Debug)]
pub struct Missile {
    pub x: f32,
    pub y: f32,
    pub target_x: f32,
    pub target_y: f32,
    pub speed: f32,
    /// Heading in radians, fixed at launch.
    pub angle: f32,
    pub trail: Vec<TrailPoint>,
    pub exploded: bool,
}

/// Cosmetic blast. Lives for `max_frames` simulation steps.
#[derive(Clone, Debug)]
pub struct Explosion {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub frame: u32,
    pub max_frames: u32,
}

#[derive(Clone, Debug)]
pub struct SmokeCloud {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub drift_x: f32,
    pub life: u32,
}

#[derive(Clone, Debug)]
pub enum AttackPhase {
    Idle,
    /// Crosshair shown; the missile waits above the screen.
    Warning { started_at: u64, missile: Missile },
    Flying { missile: Missile },
}

#[derive(Clone, Debug)]
pub struct MissileSystem {
    pub explosions: Vec<Explosion>,
    /// Decorative background missiles. Never damage anything.
    pub missiles: Vec<Missile>,
    pub smoke_clouds: Vec<SmokeCloud>,
    pub next_attack_at: u64,
    pub attack: AttackPhase,
    /// When the player was last struck by a targeted missile.
    pub player_hit_at: Option<u64>,
}

// ── Progression ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelPhase {
    Playing,
    /// Every treasure is collected; the next level starts when `countdown`
    /// reaches zero.
    Complete { countdown: u32, last_tick_at: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

// ── Collaborator interfaces ───────────────────────────────────────────────────

/// One tick's worth of player intent. Timestamps are monotonic and only
/// compared against each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputIntent {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub dig: bool,
    /// Toggle request, not a level.
    pub pause: bool,
    pub left_pressed_at: u64,
    pub right_pressed_at: u64,
}

/// Discrete notifications for audio and HUD collaborators.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jump,
    Dig { tile_x: usize, tile_y: usize },
    TreasureCollected { value: u32 },
    EnemySpawned { x: f32, y: f32 },
    EnemyHit { x: f32, y: f32 },
    EnemyKilled { x: f32, y: f32 },
    PlayerHit,
    MissileWarning { target_x: f32, target_y: f32 },
    MissileImpact { x: f32, y: f32, destroyed: Vec<(f32, f32)> },
    LevelComplete { bonus: u32 },
    LevelStarted { level: u32 },
    AchievementReached { id: &'static str },
    PlayerDied,
    GameOver,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire simulation state, owned by the driver and mutated only by
/// [`crate::compute::step`].
#[derive(Clone, Debug)]
pub struct GameState {
    pub grid: TileGrid,
    pub treasures: Vec<Treasure>,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    /// Time of the last successful spawn; `None` makes the next one eligible
    /// immediately.
    pub last_enemy_spawn: Option<u64>,
    pub missiles: MissileSystem,
    pub level: u32,
    /// Diamonds collected plus level bonuses. Never decreases.
    pub score: u32,
    pub kills: u32,
    pub phase: LevelPhase,
    pub status: GameStatus,
    pub achievements: AchievementBook,
    pub paused: bool,
    /// Simulation time of the latest step.
    pub now: u64,
    pub frame: u64,
}
