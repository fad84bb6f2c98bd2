use dig_survive::constants::{GROUND_ROWS, TILE_SIZE};
use dig_survive::entities::{Body, Tile};
use dig_survive::world::*;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

// ── generate ──────────────────────────────────────────────────────────────────

#[test]
fn generate_lays_out_air_dirt_and_stone_bands() {
    let mut rng = seeded_rng();
    for height in 7..20 {
        let (grid, _) = generate(12, height, 1, &mut rng);
        let dirt_top = height - GROUND_ROWS;
        for y in 0..height {
            let expected = if y == height - 1 {
                Tile::Stone
            } else if y >= dirt_top {
                Tile::Dirt
            } else {
                Tile::Air
            };
            for x in 0..12 {
                assert_eq!(grid.get(x, y), Some(expected), "h={height} ({x},{y})");
            }
        }
    }
}

#[test]
fn generate_places_treasures_only_in_dirt() {
    let mut rng = seeded_rng();
    let (grid, treasures) = generate(30, 14, 4, &mut rng);
    assert!(!treasures.is_empty());
    for t in &treasures {
        let info = tile_at(&grid, t.x, t.y).expect("treasure inside the grid");
        assert_eq!(info.tile, Tile::Dirt);
        assert_eq!(info.left, t.x);
        assert_eq!(info.top, t.y);
        assert!(!t.collected);
        assert!((5..5 + 4).contains(&t.value), "value {}", t.value);
    }
}

#[test]
fn generate_is_reproducible_from_the_same_seed() {
    let (grid_a, treasures_a) = generate(20, 12, 3, &mut StdRng::seed_from_u64(7));
    let (grid_b, treasures_b) = generate(20, 12, 3, &mut StdRng::seed_from_u64(7));
    assert_eq!(grid_a, grid_b);
    assert_eq!(treasures_a, treasures_b);
}

#[test]
fn level_one_treasures_are_all_worth_five() {
    let mut rng = seeded_rng();
    let (_, treasures) = generate(40, 12, 1, &mut rng);
    assert!(treasures.iter().all(|t| t.value == 5));
}

// ── queries ───────────────────────────────────────────────────────────────────

#[test]
fn tile_at_reports_indices_and_edges() {
    let mut rng = seeded_rng();
    let (grid, _) = generate(10, 8, 1, &mut rng);
    let info = tile_at(&grid, 70.0, 100.0).unwrap();
    assert_eq!((info.x, info.y), (2, 3));
    assert_eq!(info.tile, Tile::Dirt);
    assert_eq!(info.left, 64.0);
    assert_eq!(info.top, 96.0);
    assert_eq!(info.right, 96.0);
    assert_eq!(info.bottom, 128.0);
}

#[test]
fn tile_at_out_of_bounds_is_none() {
    let mut rng = seeded_rng();
    let (grid, _) = generate(10, 8, 1, &mut rng);
    assert!(tile_at(&grid, -1.0, 10.0).is_none());
    assert!(tile_at(&grid, 10.0, -0.5).is_none());
    assert!(tile_at(&grid, 10.0 * TILE_SIZE, 10.0).is_none());
    assert!(tile_at(&grid, 10.0, 8.0 * TILE_SIZE).is_none());
}

#[test]
fn signed_lookup_outside_grid_reads_as_air() {
    let grid = TileGrid::filled(4, 4, Tile::Stone);
    assert_eq!(grid.tile(-1, 0), Tile::Air);
    assert_eq!(grid.tile(0, 4), Tile::Air);
    assert!(!grid.is_solid(4, 4));
    assert!(grid.is_solid(3, 3));
}

#[test]
fn surface_row_finds_first_solid_tile() {
    let mut grid = TileGrid::filled(3, 6, Tile::Air);
    grid.set(1, 4, Tile::Dirt);
    grid.set(1, 5, Tile::Stone);
    assert_eq!(surface_row(&grid, 0), None);
    assert_eq!(surface_row(&grid, 1), Some(4));
    assert_eq!(surface_row(&grid, 9), None);
}

#[test]
fn hidden_needs_dirt_over_both_columns() {
    let mut grid = TileGrid::filled(6, 6, Tile::Air);
    let body = Body::new(2.0 * TILE_SIZE, 3.0 * TILE_SIZE, TILE_SIZE, TILE_SIZE * 1.5);

    grid.set(2, 1, Tile::Dirt);
    assert!(!is_hidden(&grid, &body));

    grid.set(3, 1, Tile::Dirt);
    assert!(is_hidden(&grid, &body));

    // Stone is not cover.
    grid.set(2, 1, Tile::Stone);
    assert!(!is_hidden(&grid, &body));
}

// ── dig ───────────────────────────────────────────────────────────────────────

#[test]
fn dig_clears_exactly_one_dirt_tile() {
    let mut rng = seeded_rng();
    let (mut grid, _) = generate(10, 8, 1, &mut rng);
    let dirt_before = grid.count(Tile::Dirt);
    assert!(dig(&mut grid, 4, 4));
    assert_eq!(grid.get(4, 4), Some(Tile::Air));
    assert_eq!(grid.count(Tile::Dirt), dirt_before - 1);
}

#[test]
fn dig_leaves_air_stone_and_out_of_bounds_alone() {
    let mut rng = seeded_rng();
    let (mut grid, _) = generate(10, 8, 1, &mut rng);
    let before = grid.clone();
    assert!(!dig(&mut grid, 4, 0)); // air
    assert!(!dig(&mut grid, 4, 7)); // stone
    assert!(!dig(&mut grid, 10, 4));
    assert!(!dig(&mut grid, 4, 8));
    assert_eq!(grid, before);
}

// ── explode ───────────────────────────────────────────────────────────────────

fn tile_distance(ax: usize, ay: usize, bx: usize, by: usize) -> f32 {
    let dx = ax as f32 - bx as f32;
    let dy = ay as f32 - by as f32;
    (dx * dx + dy * dy).sqrt()
}

#[test]
fn explode_respects_radius_and_clears_the_core() {
    let mut rng = seeded_rng();
    for _ in 0..200 {
        let mut grid = TileGrid::filled(20, 14, Tile::Dirt);
        let cx = rng.gen_range(0..20);
        let cy = rng.gen_range(0..14);
        let radius = rng.gen_range(1..=4);
        let wx = cx as f32 * TILE_SIZE + rng.gen_range(0.0..TILE_SIZE);
        let wy = cy as f32 * TILE_SIZE + rng.gen_range(0.0..TILE_SIZE);

        let destroyed = explode(&mut grid, wx, wy, radius, &mut rng);

        let mut cleared = 0;
        for y in 0..14 {
            for x in 0..20 {
                let d = tile_distance(x, y, cx, cy);
                let tile = grid.get(x, y).unwrap();
                if d > radius as f32 {
                    assert_eq!(tile, Tile::Dirt, "cleared outside radius at ({x},{y})");
                } else if d <= radius as f32 - 0.5 {
                    assert_eq!(tile, Tile::Air, "core tile survived at ({x},{y})");
                }
                if tile == Tile::Air {
                    cleared += 1;
                }
            }
        }
        assert_eq!(destroyed.len(), cleared);
    }
}

#[test]
fn explode_never_touches_stone() {
    let mut rng = seeded_rng();
    let mut grid = TileGrid::filled(10, 10, Tile::Stone);
    let destroyed = explode(&mut grid, 160.0, 160.0, 3, &mut rng);
    assert!(destroyed.is_empty());
    assert_eq!(grid.count(Tile::Stone), 100);
}

#[test]
fn explode_reports_tile_centers() {
    let mut rng = seeded_rng();
    let mut grid = TileGrid::filled(5, 5, Tile::Air);
    grid.set(2, 2, Tile::Dirt);
    let destroyed = explode(&mut grid, 2.5 * TILE_SIZE, 2.5 * TILE_SIZE, 1, &mut rng);
    assert_eq!(destroyed, vec![(80.0, 80.0)]);
}

#[test]
fn explode_off_grid_edge_is_clipped() {
    let mut rng = seeded_rng();
    let mut grid = TileGrid::filled(6, 6, Tile::Dirt);
    let destroyed = explode(&mut grid, -10.0, -10.0, 2, &mut rng);
    assert!(destroyed.iter().all(|&(x, y)| x > 0.0 && y > 0.0));
    assert_eq!(grid.get(5, 5), Some(Tile::Dirt));
}
