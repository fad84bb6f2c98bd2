use dig_survive::constants::{
    MISSILE_ATTACK_INTERVAL_MAX_MS, MISSILE_ATTACK_INTERVAL_MIN_MS, MISSILE_SPAWN_Y, STARTING_ENERGY,
    TILE_SIZE, WARNING_DURATION_MS,
};
use dig_survive::entities::*;
use dig_survive::missiles::*;
use dig_survive::player::new_player;
use dig_survive::world::{generate, TileGrid};

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn strike_missile(system: &MissileSystem) -> Option<&Missile> {
    match &system.attack {
        AttackPhase::Idle => None,
        AttackPhase::Warning { missile, .. } | AttackPhase::Flying { missile } => Some(missile),
    }
}

// ── scheduling ────────────────────────────────────────────────────────────────

#[test]
fn attack_interval_is_eight_to_twelve_seconds() {
    let mut rng = seeded_rng();
    for _ in 0..500 {
        let interval = attack_interval(&mut rng);
        assert!((8000..12_000).contains(&interval), "{interval}");
    }
}

#[test]
fn new_system_is_idle_and_scheduled() {
    let mut rng = seeded_rng();
    let system = init_missile_system(1000, &mut rng);
    assert!(matches!(system.attack, AttackPhase::Idle));
    assert!(system.next_attack_at >= 9000 && system.next_attack_at < 13_000);
    assert!(system.missiles.is_empty());
    assert_eq!(system.player_hit_at, None);
}

#[test]
fn warning_targets_the_ground_near_the_player() {
    let mut rng = seeded_rng();
    let (grid, _) = generate(40, 12, 1, &mut rng);
    let mut system = init_missile_system(0, &mut rng);
    let mut player = new_player(20.0 * TILE_SIZE, 0.0);
    player.body.velocity_x = 5.0;
    let mut events = Vec::new();

    begin_attack(&mut system, &player, &grid, 500, &mut rng, &mut events);

    let AttackPhase::Warning { started_at, missile } = &system.attack else {
        panic!("expected a warning, got {:?}", system.attack);
    };
    assert_eq!(*started_at, 500);
    let aim = player.body.center_x() + 2.0 * player.body.width;
    assert!((missile.target_x - aim).abs() <= 150.0);
    assert_eq!(missile.target_y, 6.0 * TILE_SIZE);
    assert_eq!(missile.y, MISSILE_SPAWN_Y);
    assert!((missile.x - missile.target_x).abs() <= 150.0);
    assert!(matches!(events[0], GameEvent::MissileWarning { .. }));
}

#[test]
fn second_attack_is_ignored_while_one_is_running() {
    let mut rng = seeded_rng();
    let grid = TileGrid::filled(20, 10, Tile::Air);
    let mut system = init_missile_system(0, &mut rng);
    let player = new_player(100.0, 100.0);
    let mut events = Vec::new();

    begin_attack(&mut system, &player, &grid, 0, &mut rng, &mut events);
    begin_attack(&mut system, &player, &grid, 10, &mut rng, &mut events);
    assert_eq!(events.len(), 1);
    assert!(matches!(system.attack, AttackPhase::Warning { started_at: 0, .. }));
}

// ── strike lifecycle ──────────────────────────────────────────────────────────

#[test]
fn strike_over_empty_column_still_lands_after_the_warning() {
    let mut rng = seeded_rng();
    let mut grid = TileGrid::filled(30, 10, Tile::Air);
    let mut system = init_missile_system(0, &mut rng);
    let mut player = new_player(15.0 * TILE_SIZE, 5.0 * TILE_SIZE);
    let mut events = Vec::new();

    begin_attack(&mut system, &player, &grid, 0, &mut rng, &mut events);
    let target = strike_missile(&system).map(|m| (m.target_x, m.target_y));
    let (target_x, target_y) = target.expect("strike armed");
    assert_eq!(target_y, 0.0);

    let mut impact_at = None;
    let mut now = 0;
    while now < 10_000 && impact_at.is_none() {
        now += 16;
        events.clear();
        update_missiles(&mut system, &mut grid, &mut player, false, now, &mut rng, &mut events);
        if now < WARNING_DURATION_MS {
            assert!(matches!(system.attack, AttackPhase::Warning { .. }), "left warning at {now}");
        }
        for event in &events {
            if let GameEvent::MissileImpact { x, y, .. } = event {
                assert_eq!((*x, *y), (target_x, target_y));
                impact_at = Some(now);
            }
        }
    }

    let impact_at = impact_at.expect("missile never landed");
    assert!(impact_at >= WARNING_DURATION_MS);
    assert!(matches!(system.attack, AttackPhase::Idle));
    assert!(system.next_attack_at >= impact_at + 8000);
    assert!(!system.explosions.is_empty());
}

#[test]
fn flying_missile_leaves_a_trail() {
    let mut rng = seeded_rng();
    let mut grid = TileGrid::filled(30, 40, Tile::Air);
    let mut system = init_missile_system(0, &mut rng);
    system.next_attack_at = u64::MAX;
    let mut player = new_player(15.0 * TILE_SIZE, 0.0);
    let mut events = Vec::new();

    begin_attack(&mut system, &player, &grid, 0, &mut rng, &mut events);
    if let AttackPhase::Warning { missile, .. } = &mut system.attack {
        missile.target_y = 30.0 * TILE_SIZE;
        missile.angle = (missile.target_y - missile.y).atan2(missile.target_x - missile.x);
    }
    for step in 0..10 {
        update_missiles(&mut system, &mut grid, &mut player, false, 3000 + step * 16, &mut rng, &mut events);
    }
    let missile = strike_missile(&system).expect("still flying");
    assert!(matches!(system.attack, AttackPhase::Flying { .. }));
    assert_eq!(missile.trail.len(), 10);
    assert!(missile.trail.iter().all(|p| p.age < 20));
}

#[test]
fn impact_blasts_a_crater() {
    let mut rng = seeded_rng();
    let (mut grid, _) = generate(30, 12, 1, &mut rng);
    let dirt_before = grid.count(Tile::Dirt);
    let mut system = init_missile_system(0, &mut rng);
    let mut player = new_player(2.0 * TILE_SIZE, 0.0);
    let mut events = Vec::new();

    begin_attack(&mut system, &player, &grid, 0, &mut rng, &mut events);
    let mut now = 0;
    while !matches!(system.attack, AttackPhase::Idle) && now < 20_000 {
        now += 16;
        update_missiles(&mut system, &mut grid, &mut player, false, now, &mut rng, &mut events);
    }
    assert!(grid.count(Tile::Dirt) < dirt_before);
    let destroyed = events
        .iter()
        .find_map(|e| match e {
            GameEvent::MissileImpact { destroyed, .. } => Some(destroyed.len()),
            _ => None,
        })
        .expect("impact event");
    assert_eq!(grid.count(Tile::Dirt), dirt_before - destroyed);
}

#[test]
fn no_new_strike_while_level_is_complete() {
    let mut rng = seeded_rng();
    let mut grid = TileGrid::filled(20, 10, Tile::Air);
    let mut system = init_missile_system(0, &mut rng);
    let mut player = new_player(100.0, 100.0);
    let mut events = Vec::new();

    let due = system.next_attack_at;
    update_missiles(&mut system, &mut grid, &mut player, true, due + 1, &mut rng, &mut events);
    assert!(matches!(system.attack, AttackPhase::Idle));
    update_missiles(&mut system, &mut grid, &mut player, false, due + 20, &mut rng, &mut events);
    assert!(matches!(system.attack, AttackPhase::Warning { .. }));
}

// ── player damage ─────────────────────────────────────────────────────────────

#[test]
fn exposed_player_near_impact_is_hurt_and_knocked_back() {
    let mut rng = seeded_rng();
    let grid = TileGrid::filled(20, 10, Tile::Air);
    let mut system = init_missile_system(0, &mut rng);
    let mut player = new_player(100.0, 100.0);
    player.energy = 40.0;

    let hit = check_player_hit(&mut system, &mut player, &grid, 90.0, 124.0, 7000);
    assert!(hit);
    assert_eq!(player.energy, 15.0);
    assert_eq!(player.body.velocity_x, 15.0);
    assert_eq!(player.body.velocity_y, -10.0);
    assert_eq!(system.player_hit_at, Some(7000));
    assert!(hit_recently(&system, 7499, 500));
    assert!(!hit_recently(&system, 7500, 500));
}

#[test]
fn missile_damage_clamps_energy_at_zero() {
    let mut rng = seeded_rng();
    let grid = TileGrid::filled(20, 10, Tile::Air);
    let mut system = init_missile_system(0, &mut rng);
    let mut player = new_player(100.0, 100.0);
    assert!(check_player_hit(&mut system, &mut player, &grid, 116.0, 124.0, 0));
    assert_eq!(player.energy, 0.0);
}

#[test]
fn hidden_player_is_immune() {
    let mut rng = seeded_rng();
    let (grid, _) = generate(10, 8, 1, &mut rng);
    let mut system = init_missile_system(0, &mut rng);
    // Rows 2 and 3 of columns 5 and 6 are dirt overhead.
    let mut player = new_player(5.0 * TILE_SIZE, 4.0 * TILE_SIZE);
    let (cx, cy) = (player.body.center_x(), player.body.center_y());

    assert!(!check_player_hit(&mut system, &mut player, &grid, cx, cy, 0));
    assert_eq!(player.energy, STARTING_ENERGY);
    assert_eq!(system.player_hit_at, None);
}

#[test]
fn player_outside_blast_radius_is_safe() {
    let mut rng = seeded_rng();
    let grid = TileGrid::filled(40, 10, Tile::Air);
    let mut system = init_missile_system(0, &mut rng);
    let mut player = new_player(100.0, 100.0);
    let (cx, cy) = (player.body.center_x(), player.body.center_y());
    assert!(!check_player_hit(&mut system, &mut player, &grid, cx + 96.0, cy, 0));
    assert_eq!(player.energy, STARTING_ENERGY);
}

// ── background war ────────────────────────────────────────────────────────────

#[test]
fn background_missiles_never_hurt_anyone() {
    let mut rng = seeded_rng();
    let (mut grid, _) = generate(30, 16, 2, &mut rng);
    let before = grid.clone();
    let mut system = init_missile_system(0, &mut rng);
    system.next_attack_at = u64::MAX;
    let mut player = new_player(10.0 * TILE_SIZE, 9.0 * TILE_SIZE);
    let mut events = Vec::new();
    let mut seen_background = false;

    for step in 0..6000 {
        update_missiles(&mut system, &mut grid, &mut player, false, step * 16, &mut rng, &mut events);
        assert!(system.missiles.len() <= 5);
        seen_background |= !system.missiles.is_empty();
    }
    assert!(seen_background);
    assert_eq!(grid, before);
    assert_eq!(player.energy, STARTING_ENERGY);
    assert!(events.is_empty());
}

#[test]
fn effects_expire() {
    let mut rng = seeded_rng();
    let mut grid = TileGrid::filled(20, 10, Tile::Air);
    let mut system = init_missile_system(0, &mut rng);
    system.next_attack_at = u64::MAX;
    let mut player = new_player(0.0, 0.0);
    let mut events = Vec::new();

    add_explosion(&mut system, 100.0, 100.0, 40.0, &mut rng);
    assert_eq!(system.explosions.len(), 1);
    assert_eq!(system.smoke_clouds.len(), 3);
    assert!(system.smoke_clouds.iter().all(|c| (100..300).contains(&c.life)));

    // Background spawns would add fresh effects; keep them out of the count.
    for step in 0..300 {
        update_missiles(&mut system, &mut grid, &mut player, false, step, &mut rng, &mut events);
        system.missiles.clear();
        if step == 19 {
            assert!(system.explosions.is_empty());
        }
    }
    assert!(system.smoke_clouds.is_empty());
}

#[test]
fn reset_for_level_keeps_an_idle_schedule() {
    let mut rng = seeded_rng();
    let mut system = init_missile_system(0, &mut rng);
    add_explosion(&mut system, 1.0, 1.0, 10.0, &mut rng);
    system.player_hit_at = Some(5);
    let scheduled = system.next_attack_at;

    reset_for_level(&mut system, 1000, &mut rng);
    assert!(matches!(system.attack, AttackPhase::Idle));
    assert!(system.explosions.is_empty());
    assert!(system.smoke_clouds.is_empty());
    assert_eq!(system.player_hit_at, None);
    assert_eq!(system.next_attack_at, scheduled);
}

#[test]
fn reset_for_level_reschedules_a_dropped_strike() {
    let mut rng = seeded_rng();
    let grid = TileGrid::filled(20, 10, Tile::Air);
    let mut system = init_missile_system(0, &mut rng);
    let player = new_player(100.0, 100.0);
    let mut events = Vec::new();
    let started = system.next_attack_at;
    begin_attack(&mut system, &player, &grid, started, &mut rng, &mut events);

    let now = started + 2000;
    reset_for_level(&mut system, now, &mut rng);
    assert!(matches!(system.attack, AttackPhase::Idle));
    assert!(system.next_attack_at >= now + MISSILE_ATTACK_INTERVAL_MIN_MS);
    assert!(system.next_attack_at < now + MISSILE_ATTACK_INTERVAL_MAX_MS);
}
