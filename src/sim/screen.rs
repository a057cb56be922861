/// Screens and the overworld screen graph.
///
/// A `Screen` is a tile grid plus its static spawn and warp tables. The
/// overworld is a sparse grid of screens addressed by `(x, y)` with a cursor
/// on the current one. Unmapped coordinates read as an empty grass screen but
/// can never be moved into.

use std::collections::HashMap;

use crate::domain::entity::{Direction, EnemyKind, ItemKind};
use crate::domain::quest::DialogueOption;
use crate::domain::tile::{Tile, TileGrid};

#[derive(Clone, Debug, PartialEq)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub tile_x: i32,
    pub tile_y: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemSpawn {
    pub kind: ItemKind,
    pub tile_x: i32,
    pub tile_y: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NpcSpawn {
    pub id: String,
    pub name: String,
    pub tile_x: i32,
    pub tile_y: i32,
    pub dir: Direction,
    pub lines: Vec<String>,
    pub options: Vec<DialogueOption>,
}

/// A doorway on this screen. `target` is `"interior:<id>"` on the overworld,
/// or an interior id / `"overworld"` inside interiors. Positions are pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Warp {
    pub tile_x: i32,
    pub tile_y: i32,
    pub target: String,
    pub spawn: (f64, f64),
    pub exit: (f64, f64),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Screen {
    pub grid: TileGrid,
    pub enemies: Vec<EnemySpawn>,
    pub items: Vec<ItemSpawn>,
    pub npcs: Vec<NpcSpawn>,
    pub warps: Vec<Warp>,
}

impl Screen {
    pub fn new(grid: TileGrid) -> Self {
        Screen { grid, ..Screen::default() }
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Tile {
        self.grid.tile_at(x, y)
    }
}

// ══════════════════════════════════════════════════════════════
// Screen graph
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct ScreenGraph {
    screens: HashMap<(i32, i32), Screen>,
    width: i32,
    height: i32,
    cursor: (i32, i32),
    /// Returned for an unmapped cursor.
    empty: Screen,
}

impl ScreenGraph {
    pub fn new(width: i32, height: i32) -> Self {
        ScreenGraph {
            screens: HashMap::new(),
            width,
            height,
            cursor: (0, 0),
            empty: Screen::default(),
        }
    }

    /// Add a screen. Out-of-bounds coordinates are ignored.
    pub fn insert(&mut self, x: i32, y: i32, screen: Screen) {
        if self.in_bounds(x, y) {
            self.screens.insert((x, y), screen);
        }
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    pub fn is_mapped(&self, x: i32, y: i32) -> bool {
        self.screens.contains_key(&(x, y))
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn cursor(&self) -> (i32, i32) {
        self.cursor
    }

    pub fn set_cursor(&mut self, x: i32, y: i32) {
        self.cursor = (x, y);
    }

    pub fn current_screen(&self) -> &Screen {
        self.screens.get(&self.cursor).unwrap_or(&self.empty)
    }

    /// Live screen at the cursor, for tile mutations. `None` when unmapped.
    pub fn current_screen_mut(&mut self) -> Option<&mut Screen> {
        self.screens.get_mut(&self.cursor)
    }

    pub fn screen_at(&self, x: i32, y: i32) -> Option<&Screen> {
        self.screens.get(&(x, y))
    }

    /// True iff the neighbour at `cursor + (dx, dy)` is inside the grid and mapped.
    pub fn can_move(&self, dx: i32, dy: i32) -> bool {
        let (x, y) = (self.cursor.0 + dx, self.cursor.1 + dy);
        self.in_bounds(x, y) && self.is_mapped(x, y)
    }

    /// Shift the cursor without checks. Call `can_move` first.
    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.cursor.0 += dx;
        self.cursor.1 += dy;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(i32, i32), &Screen)> {
        self.screens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walled() -> Screen {
        Screen::new(TileGrid::filled(Tile::Wall))
    }

    fn graph() -> ScreenGraph {
        // Mapped: (0,0) (1,0) (0,1); (1,1) left unmapped.
        let mut g = ScreenGraph::new(2, 2);
        g.insert(0, 0, walled());
        g.insert(1, 0, Screen::default());
        g.insert(0, 1, Screen::default());
        g
    }

    #[test]
    fn can_move_requires_bounds_and_mapping() {
        let mut g = graph();
        assert!(g.can_move(1, 0));
        assert!(g.can_move(0, 1));
        assert!(!g.can_move(-1, 0));
        assert!(!g.can_move(0, -1));

        g.move_by(1, 0);
        // (1,1) is in bounds but unmapped.
        assert!(!g.can_move(0, 1));
        assert!(!g.can_move(1, 0));
    }

    #[test]
    fn unmapped_cursor_reads_empty_screen() {
        let mut g = graph();
        g.set_cursor(1, 1);
        assert!(g.current_screen().tile_at(5, 5).is_passable());
        assert!(g.current_screen_mut().is_none());
    }

    #[test]
    fn move_by_is_unchecked() {
        let mut g = graph();
        g.move_by(-3, 7);
        assert_eq!(g.cursor(), (-3, 7));
    }

    #[test]
    fn insert_out_of_bounds_is_ignored() {
        let mut g = graph();
        g.insert(5, 5, Screen::default());
        assert!(!g.is_mapped(5, 5));
        assert_eq!(g.iter().count(), 3);
    }

    #[test]
    fn live_screen_edits_persist() {
        let mut g = graph();
        if let Some(s) = g.current_screen_mut() {
            s.grid.set(2, 2, Tile::DoorOpen);
        }
        assert_eq!(g.current_screen().tile_at(2, 2), Tile::DoorOpen);
    }
}
