//! Axis-separated collision against the tile grid, shared by the player and
//! enemies.
//!
//! Each axis is moved and resolved on its own, horizontal first. Only the tiles
//! under the swept box are inspected, so a fast body cannot skip over a thin
//! wall. A resolution that would push a body past its tentative position or
//! back behind where it started is rejected and the body is pinned at its
//! pre-move position instead.

use crate::constants::TILE_SIZE;
use crate::entities::{Body, Motion};
use crate::world::TileGrid;

/// Touching edges are not an overlap; neither are float crumbs below this.
const EPSILON: f32 = 1e-3;

impl Body {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Body {
            x,
            y,
            width,
            height,
            velocity_x: 0.0,
            velocity_y: 0.0,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Euclidean distance between the two centers.
    pub fn distance_to(&self, other: &Body) -> f32 {
        let dx = other.center_x() - self.center_x();
        let dy = other.center_y() - self.center_y();
        (dx * dx + dy * dy).sqrt()
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        self.overlaps_rect(other.x, other.y, other.right(), other.bottom())
    }

    pub fn overlaps_rect(&self, left: f32, top: f32, right: f32, bottom: f32) -> bool {
        self.right() > left + EPSILON
            && self.x < right - EPSILON
            && self.bottom() > top + EPSILON
            && self.y < bottom - EPSILON
    }

    pub fn overlaps_tile(&self, tile_x: i64, tile_y: i64) -> bool {
        let left = tile_x as f32 * TILE_SIZE;
        let top = tile_y as f32 * TILE_SIZE;
        self.overlaps_rect(left, top, left + TILE_SIZE, top + TILE_SIZE)
    }
}

/// Inclusive range of tile indices covered by the open span `[start, start + len]`.
pub fn tile_span(start: f32, len: f32) -> std::ops::RangeInclusive<i64> {
    let first = ((start + EPSILON) / TILE_SIZE).floor() as i64;
    let last = ((start + len - EPSILON) / TILE_SIZE).floor() as i64;
    first..=last.max(first)
}

/// Every solid tile the body currently overlaps.
pub fn overlapping_solids(body: &Body, grid: &TileGrid) -> Vec<(i64, i64)> {
    let mut hits = Vec::new();
    for ty in tile_span(body.y, body.height) {
        for tx in tile_span(body.x, body.width) {
            if grid.is_solid(tx, ty) && body.overlaps_tile(tx, ty) {
                hits.push((tx, ty));
            }
        }
    }
    hits
}

/// Keep the body between the left and right edges of the world.
/// Returns true when it had to be pushed back in.
pub fn clamp_to_world(body: &mut Body, grid: &TileGrid) -> bool {
    let max_x = (grid.pixel_width() - body.width).max(0.0);
    if body.x < 0.0 {
        body.x = 0.0;
        true
    } else if body.x > max_x {
        body.x = max_x;
        true
    } else {
        false
    }
}

// ── Horizontal ────────────────────────────────────────────────────────────────

/// Apply `velocity_x`, clamp to the world edges, then resolve against tiles.
/// Returns true when a tile stopped the body.
pub fn move_horizontal(body: &mut Body, grid: &TileGrid) -> bool {
    let start_x = body.x;
    body.x += body.velocity_x;
    clamp_to_world(body, grid);
    resolve_horizontal(body, grid, start_x)
}

/// Resolve a body whose `x` was already moved away from `start_x`.
pub fn resolve_horizontal(body: &mut Body, grid: &TileGrid, start_x: f32) -> bool {
    let moved_x = body.x;
    let delta = moved_x - start_x;
    if delta == 0.0 {
        return false;
    }

    let lo = start_x.min(moved_x);
    let hi = start_x.max(moved_x) + body.width;
    let mut stop: Option<f32> = None;

    for ty in tile_span(body.y, body.height) {
        for tx in tile_span(lo, hi - lo) {
            if !grid.is_solid(tx, ty) {
                continue;
            }
            let left = tx as f32 * TILE_SIZE;
            let right = left + TILE_SIZE;
            if delta > 0.0 {
                // Tiles already beside or behind the leading edge never block.
                if left < start_x + body.width - EPSILON || left >= moved_x + body.width - EPSILON {
                    continue;
                }
                let snap = left - body.width;
                stop = Some(stop.map_or(snap, |s: f32| s.min(snap)));
            } else {
                if right > start_x + EPSILON || right <= moved_x + EPSILON {
                    continue;
                }
                stop = Some(stop.map_or(right, |s: f32| s.max(right)));
            }
        }
    }

    let Some(snap) = stop else {
        return false;
    };
    body.x = guarded(start_x, moved_x, snap);
    body.velocity_x = 0.0;
    true
}

// ── Vertical ──────────────────────────────────────────────────────────────────

/// Apply `velocity_y` and resolve against tiles. A downward stop lands the
/// body (`Grounded`); otherwise `motion` is left as it was.
pub fn move_vertical(body: &mut Body, grid: &TileGrid, motion: &mut Motion) -> bool {
    let start_y = body.y;
    body.y += body.velocity_y;
    resolve_vertical(body, grid, start_y, motion)
}

pub fn resolve_vertical(
    body: &mut Body,
    grid: &TileGrid,
    start_y: f32,
    motion: &mut Motion,
) -> bool {
    let moved_y = body.y;
    let delta = moved_y - start_y;
    if delta == 0.0 {
        return false;
    }

    let lo = start_y.min(moved_y);
    let hi = start_y.max(moved_y) + body.height;
    let mut stop: Option<f32> = None;

    for ty in tile_span(lo, hi - lo) {
        for tx in tile_span(body.x, body.width) {
            if !grid.is_solid(tx, ty) {
                continue;
            }
            let top = ty as f32 * TILE_SIZE;
            let bottom = top + TILE_SIZE;
            if delta > 0.0 {
                if top < start_y + body.height - EPSILON || top >= moved_y + body.height - EPSILON {
                    continue;
                }
                let snap = top - body.height;
                stop = Some(stop.map_or(snap, |s: f32| s.min(snap)));
            } else {
                if bottom > start_y + EPSILON || bottom <= moved_y + EPSILON {
                    continue;
                }
                stop = Some(stop.map_or(bottom, |s: f32| s.max(bottom)));
            }
        }
    }

    let Some(snap) = stop else {
        return false;
    };
    body.y = guarded(start_y, moved_y, snap);
    body.velocity_y = 0.0;
    if delta > 0.0 {
        *motion = Motion::Grounded;
    }
    true
}

/// Accept `snap` only if it lies between the pre-move and tentative
/// positions; otherwise pin the body where it started.
fn guarded(start: f32, moved: f32, snap: f32) -> f32 {
    let (lo, hi) = if moved > start { (start, moved) } else { (moved, start) };
    if snap < lo || snap > hi {
        start
    } else {
        snap
    }
}
