//! Tile grid, terrain generation and destructive edits.
//!
//! Coordinates come in two flavours: tile indices (`usize`, row 0 at the top)
//! and world units (`f32`, `TILE_SIZE` per tile). Any lookup outside the grid
//! reads as Air.

use rand::Rng;

use crate::constants::{
    CRATER_EDGE_BAND, CRATER_EDGE_SURVIVAL, GROUND_ROWS, TILE_SIZE, TREASURE_BASE_CHANCE,
    TREASURE_BASE_VALUE, TREASURE_CHANCE_PER_LEVEL,
};
use crate::entities::{Body, Tile, Treasure};

#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
}

/// Result of a point query: the tile plus its indices and pixel edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileInfo {
    pub tile: Tile,
    pub x: usize,
    pub y: usize,
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl TileGrid {
    /// A grid of the given size filled with `fill`.
    pub fn filled(width: usize, height: usize, fill: Tile) -> Self {
        TileGrid {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Grid width in world units.
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * TILE_SIZE
    }

    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * TILE_SIZE
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Tile> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Signed lookup used by scans that may step off the grid.
    pub fn tile(&self, x: i64, y: i64) -> Tile {
        if x < 0 || y < 0 {
            return Tile::Air;
        }
        self.get(x as usize, y as usize).unwrap_or(Tile::Air)
    }

    pub fn is_solid(&self, x: i64, y: i64) -> bool {
        self.tile(x, y) != Tile::Air
    }

    /// Returns false when out of bounds.
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) -> bool {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = tile;
            true
        } else {
            false
        }
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.cells.iter().filter(|&&t| t == tile).count()
    }
}

/// Tile index containing world coordinate `v`. May be negative.
pub fn tile_index(v: f32) -> i64 {
    (v / TILE_SIZE).floor() as i64
}

// ── Generation ────────────────────────────────────────────────────────────────

/// Build the layered terrain for `level` and seed treasures in the dirt band.
///
/// Rows `[0, H-6)` are Air, `[H-6, H-1)` Dirt and row `H-1` Stone. Each dirt
/// cell hides a treasure with probability `0.10 + level * 0.01`.
pub fn generate(
    width: usize,
    height: usize,
    level: u32,
    rng: &mut impl Rng,
) -> (TileGrid, Vec<Treasure>) {
    let mut grid = TileGrid::filled(width, height, Tile::Air);
    let mut treasures = Vec::new();
    let dirt_top = height.saturating_sub(GROUND_ROWS);
    let chance = (TREASURE_BASE_CHANCE + f64::from(level) * TREASURE_CHANCE_PER_LEVEL).min(1.0);

    for y in 0..height {
        for x in 0..width {
            let tile = if y + 1 == height {
                Tile::Stone
            } else if y >= dirt_top {
                Tile::Dirt
            } else {
                Tile::Air
            };
            grid.set(x, y, tile);

            if tile == Tile::Dirt && rng.gen_bool(chance) {
                let bonus = (rng.gen::<f64>() * f64::from(level)).floor() as u32;
                treasures.push(Treasure {
                    x: x as f32 * TILE_SIZE,
                    y: y as f32 * TILE_SIZE,
                    collected: false,
                    value: bonus + TREASURE_BASE_VALUE,
                });
            }
        }
    }

    (grid, treasures)
}

// ── Queries ───────────────────────────────────────────────────────────────────

pub fn tile_at(grid: &TileGrid, world_x: f32, world_y: f32) -> Option<TileInfo> {
    let tx = tile_index(world_x);
    let ty = tile_index(world_y);
    if tx < 0 || ty < 0 {
        return None;
    }
    let (x, y) = (tx as usize, ty as usize);
    let tile = grid.get(x, y)?;
    let left = x as f32 * TILE_SIZE;
    let top = y as f32 * TILE_SIZE;
    Some(TileInfo {
        tile,
        x,
        y,
        left,
        top,
        right: left + TILE_SIZE,
        bottom: top + TILE_SIZE,
    })
}

/// First non-Air row in column `tile_x`, scanning downward.
pub fn surface_row(grid: &TileGrid, tile_x: usize) -> Option<usize> {
    (0..grid.height()).find(|&y| matches!(grid.get(tile_x, y), Some(t) if t != Tile::Air))
}

/// A body is hidden when some row above it holds Dirt in both its own tile
/// column and the next column to the right.
pub fn is_hidden(grid: &TileGrid, body: &Body) -> bool {
    let tx = tile_index(body.x);
    let ty = tile_index(body.y);
    (0..ty).any(|y| grid.tile(tx, y) == Tile::Dirt && grid.tile(tx + 1, y) == Tile::Dirt)
}

// ── Destruction ───────────────────────────────────────────────────────────────

/// Clear one Dirt tile. Air, Stone and out-of-bounds cells are left alone.
pub fn dig(grid: &mut TileGrid, tile_x: usize, tile_y: usize) -> bool {
    if grid.get(tile_x, tile_y) == Some(Tile::Dirt) {
        grid.set(tile_x, tile_y, Tile::Air)
    } else {
        false
    }
}

/// Blast a crater of `radius` tiles around a world point.
///
/// Dirt within the radius is cleared, except that tiles in the outer half-tile
/// band survive with a 30% chance. Stone is untouched. Returns the world
/// centers of the cleared tiles.
pub fn explode(
    grid: &mut TileGrid,
    world_x: f32,
    world_y: f32,
    radius: i32,
    rng: &mut impl Rng,
) -> Vec<(f32, f32)> {
    let cx = tile_index(world_x);
    let cy = tile_index(world_y);
    let r = i64::from(radius.max(0));
    let mut destroyed = Vec::new();

    for ty in (cy - r).max(0)..=(cy + r).min(grid.height() as i64 - 1) {
        for tx in (cx - r).max(0)..=(cx + r).min(grid.width() as i64 - 1) {
            let dx = (tx - cx) as f32;
            let dy = (ty - cy) as f32;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance > radius as f32 || grid.tile(tx, ty) != Tile::Dirt {
                continue;
            }
            if distance > radius as f32 - CRATER_EDGE_BAND && rng.gen_bool(CRATER_EDGE_SURVIVAL) {
                continue;
            }
            grid.set(tx as usize, ty as usize, Tile::Air);
            destroyed.push((
                tx as f32 * TILE_SIZE + TILE_SIZE / 2.0,
                ty as f32 * TILE_SIZE + TILE_SIZE / 2.0,
            ));
        }
    }

    destroyed
}
