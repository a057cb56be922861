/// Movement and collision against the tile grid.
///
/// ## Model
///
/// Bodies are axis-aligned rectangles in play-area pixels. A body may
/// overlap a tile only if that tile is passable. Overlap is half-open:
/// rectangles that merely touch along an edge do not collide.
///
/// Movement is axis-separated: the X step is tried and committed on its
/// own, then the Y step from the updated position. A diagonal push into a
/// wall therefore slides along it instead of stopping dead.
///
/// After moving, `edge_crossing` reports per axis whether the body has left
/// the play area. Overworld callers turn that into a screen scroll; interior
/// callers clamp instead.
///
/// ## Determinism
///
/// `newton_sqrt` runs a fixed ten iterations, so distances and unit vectors
/// come out bit-identical everywhere.

use super::tile::{TileGrid, GRID_H, GRID_W, PLAY_AREA_H, PLAY_AREA_W, TILE_SIZE};

/// Shrinks the far edge of a span so a box ending exactly on a tile
/// boundary does not reach into the next tile.
const EDGE_EPSILON: f64 = 0.01;

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect { x, y, w, h }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn at(self, x: f64, y: f64) -> Rect {
        Rect { x, y, ..self }
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        aabb_overlap(self, other)
    }

    /// Fully inside the play area.
    pub fn in_play_area(&self) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.x + self.w <= PLAY_AREA_W && self.y + self.h <= PLAY_AREA_H
    }
}

#[inline]
pub fn aabb_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// Does `r` overlap any non-passable tile?
///
/// Only in-grid tiles the box could touch are visited. The part of a box
/// hanging past the play area is not tested here: leaving the screen is
/// decided by `edge_crossing` (overworld) or by clamping (interiors).
pub fn tile_collision(grid: &TileGrid, r: &Rect) -> bool {
    let start_x = ((r.x / TILE_SIZE).floor() as i32).max(0);
    let start_y = ((r.y / TILE_SIZE).floor() as i32).max(0);
    let end_x = (((r.x + r.w - EDGE_EPSILON) / TILE_SIZE).floor() as i32).min(GRID_W as i32 - 1);
    let end_y = (((r.y + r.h - EDGE_EPSILON) / TILE_SIZE).floor() as i32).min(GRID_H as i32 - 1);

    for gy in start_y..=end_y {
        for gx in start_x..=end_x {
            if grid.tile_at(gx, gy).is_passable() {
                continue;
            }
            let tile = Rect::new(gx as f64 * TILE_SIZE, gy as f64 * TILE_SIZE, TILE_SIZE, TILE_SIZE);
            if aabb_overlap(r, &tile) {
                return true;
            }
        }
    }
    false
}

// ══════════════════════════════════════════════════════════════
// Axis-separated movement
// ══════════════════════════════════════════════════════════════

/// Per-axis play-area exit: -1 left/top, +1 right/bottom, 0 inside.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct EdgeCrossing {
    pub x: i32,
    pub y: i32,
}

impl EdgeCrossing {
    /// The one direction to act on. Horizontal wins when both axes signal.
    pub fn honored(self) -> Option<(i32, i32)> {
        if self.x != 0 {
            Some((self.x, 0))
        } else if self.y != 0 {
            Some((0, self.y))
        } else {
            None
        }
    }
}

pub fn edge_crossing(r: &Rect) -> EdgeCrossing {
    let x = if r.x < 0.0 {
        -1
    } else if r.x + r.w > PLAY_AREA_W {
        1
    } else {
        0
    };
    let y = if r.y < 0.0 {
        -1
    } else if r.y + r.h > PLAY_AREA_H {
        1
    } else {
        0
    };
    EdgeCrossing { x, y }
}

/// Try `(dx, dy)` one axis at a time. A step is committed when it leaves the
/// box off every solid tile and `accept` approves the candidate.
fn slide_with(grid: &TileGrid, r: Rect, dx: f64, dy: f64, accept: impl Fn(&Rect) -> bool) -> Rect {
    let mut out = r;
    if dx != 0.0 {
        let cand = out.at(out.x + dx, out.y);
        if accept(&cand) && !tile_collision(grid, &cand) {
            out = cand;
        }
    }
    if dy != 0.0 {
        let cand = out.at(out.x, out.y + dy);
        if accept(&cand) && !tile_collision(grid, &cand) {
            out = cand;
        }
    }
    out
}

/// Free movement that may leave the play area (the player on the overworld).
pub fn slide(grid: &TileGrid, r: Rect, dx: f64, dy: f64) -> Rect {
    slide_with(grid, r, dx, dy, |_| true)
}

/// Movement that additionally refuses any step ending outside the play area.
/// Used by enemies, who never change screens.
pub fn slide_within(grid: &TileGrid, r: Rect, dx: f64, dy: f64) -> Rect {
    slide_with(grid, r, dx, dy, Rect::in_play_area)
}

/// Move a body along unit intent `(ix, iy)` at `speed` for `dt`, then report
/// which play-area edges it now hangs over.
pub fn move_entity(grid: &TileGrid, r: Rect, ix: f64, iy: f64, speed: f64, dt: f64) -> (Rect, EdgeCrossing) {
    let dist = speed * dt;
    let moved = slide(grid, r, ix * dist, iy * dist);
    (moved, edge_crossing(&moved))
}

pub fn clamp_to_play_area(r: Rect) -> Rect {
    let max_x = PLAY_AREA_W - r.w;
    let max_y = PLAY_AREA_H - r.h;
    r.at(r.x.max(0.0).min(max_x), r.y.max(0.0).min(max_y))
}

// ══════════════════════════════════════════════════════════════
// Deterministic vector math
// ══════════════════════════════════════════════════════════════

/// Square root by ten Newton iterations from `x / 2`. Returns 0 for `x <= 0`.
pub fn newton_sqrt(x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let mut z = x / 2.0;
    for _ in 0..10 {
        z = (z + x / z) / 2.0;
    }
    z
}

pub fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    newton_sqrt(dx * dx + dy * dy)
}

/// Unit vector from `from` to `to`, or `None` when the points are closer than
/// `min_len`.
pub fn direction_to(from: (f64, f64), to: (f64, f64), min_len: f64) -> Option<(f64, f64)> {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let len = newton_sqrt(dx * dx + dy * dy);
    if len < min_len {
        return None;
    }
    Some((dx / len, dy / len))
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::Tile;
    use proptest::prelude::*;

    /// Build a grid from rows of level characters; missing cells are grass.
    fn grid_from(rows: &[&str]) -> TileGrid {
        let mut g = TileGrid::default();
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                g.set(x as i32, y as i32, Tile::from_char(ch).unwrap_or(Tile::Grass));
            }
        }
        g
    }

    fn body(x: f64, y: f64) -> Rect {
        Rect::new(x, y, 14.0, 14.0)
    }

    // ── overlap ──

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 16.0, 16.0);
        let b = Rect::new(16.0, 0.0, 16.0, 16.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&b.at(15.9, 0.0)));
    }

    // ── tile_collision ──

    #[test]
    fn box_on_grass_is_free() {
        let g = grid_from(&[]);
        assert!(!tile_collision(&g, &body(20.0, 20.0)));
    }

    #[test]
    fn box_touching_wall_edge_is_free() {
        let g = grid_from(&["..W"]);
        // Wall tile spans x 32..48; box ends exactly at 32.
        assert!(!tile_collision(&g, &body(18.0, 0.0)));
        assert!(tile_collision(&g, &body(18.5, 0.0)));
    }

    #[test]
    fn box_past_the_edge_only_tests_inside_tiles() {
        let g = grid_from(&[]);
        assert!(!tile_collision(&g, &body(PLAY_AREA_W - 10.0, 20.0)));
        assert!(!tile_collision(&g, &body(-0.5, 20.0)));
        let walled = grid_from(&["W"]);
        assert!(tile_collision(&walled, &body(-4.0, 0.0)));
    }

    // ── slide ──

    #[test]
    fn diagonal_into_wall_slides() {
        let g = grid_from(&["...", "..W"]);
        // Moving right would hit the wall at (2,1); moving down is clear.
        let start = body(17.0, 17.0);
        let out = slide(&g, start, 2.0, 3.0);
        assert_eq!(out.x, 17.0);
        assert_eq!(out.y, 20.0);
    }

    #[test]
    fn slide_within_refuses_leaving_play_area() {
        let g = grid_from(&[]);
        let start = body(1.0, 50.0);
        let out = slide_within(&g, start, -2.0, 0.0);
        assert_eq!(out.x, 1.0);
        let out = slide(&g, start, -2.0, 0.0);
        assert_eq!(out.x, -1.0);
    }

    #[test]
    fn move_entity_reports_east_crossing() {
        let g = grid_from(&[]);
        let start = body(PLAY_AREA_W - 14.5, 50.0);
        let (moved, cross) = move_entity(&g, start, 1.0, 0.0, 80.0, 0.016);
        assert!(moved.x > start.x);
        assert_eq!(cross, EdgeCrossing { x: 1, y: 0 });
    }

    #[test]
    fn horizontal_crossing_wins_ties() {
        let both = EdgeCrossing { x: -1, y: 1 };
        assert_eq!(both.honored(), Some((-1, 0)));
        assert_eq!(EdgeCrossing { x: 0, y: -1 }.honored(), Some((0, -1)));
        assert_eq!(EdgeCrossing::default().honored(), None);
    }

    #[test]
    fn clamp_pulls_back_inside() {
        let r = clamp_to_play_area(body(-3.0, PLAY_AREA_H));
        assert_eq!(r.x, 0.0);
        assert_eq!(r.y, PLAY_AREA_H - 14.0);
    }

    // ── math ──

    #[test]
    fn newton_sqrt_matches_known_roots() {
        assert_eq!(newton_sqrt(0.0), 0.0);
        assert_eq!(newton_sqrt(-4.0), 0.0);
        assert!((newton_sqrt(4.0) - 2.0).abs() < 1e-9);
        assert!((newton_sqrt(2.0) - std::f64::consts::SQRT_2).abs() < 1e-9);
        assert!((newton_sqrt(900.0) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn direction_to_rejects_coincident_points() {
        assert_eq!(direction_to((5.0, 5.0), (5.0, 5.0), 0.01), None);
        let (dx, dy) = direction_to((0.0, 0.0), (3.0, 4.0), 0.01).unwrap_or_default();
        assert!((dx - 0.6).abs() < 1e-9 && (dy - 0.8).abs() < 1e-9);
    }

    // ── properties ──

    fn walled_grid(mask: &[bool]) -> TileGrid {
        let mut g = TileGrid::default();
        for (i, wall) in mask.iter().enumerate() {
            if *wall {
                g.set((i % GRID_W) as i32, (i / GRID_W) as i32, Tile::Wall);
            }
        }
        g
    }

    proptest! {
        #[test]
        fn axis_steps_never_end_inside_walls(
            mask in proptest::collection::vec(proptest::bool::weighted(0.25), GRID_W * GRID_H),
            tx in 1usize..GRID_W - 1,
            ty in 1usize..GRID_H - 1,
            ix in -1i32..=1,
            iy in -1i32..=1,
            steps in 1usize..40,
        ) {
            let mut mask = mask;
            mask[ty * GRID_W + tx] = false;
            let g = walled_grid(&mask);
            let mut r = Rect::new(tx as f64 * TILE_SIZE + 1.0, ty as f64 * TILE_SIZE + 1.0, 14.0, 14.0);
            prop_assert!(!tile_collision(&g, &r));
            for _ in 0..steps {
                // 80 px/s at the capped 0.05 s frame: a 4 px step.
                r = slide_within(&g, r, ix as f64 * 4.0, iy as f64 * 4.0);
                prop_assert!(!tile_collision(&g, &r));
            }
        }
    }
}
