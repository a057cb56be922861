/// Tile kinds, their static property table, and the screen-sized grid.
/// Properties live in one lookup (`Tile::props`) so tile semantics are
/// centralized here; the `is_*` helpers are thin views over it.

use super::entity::Direction;

/// Pixel edge length of one tile.
pub const TILE_SIZE: f64 = 16.0;
/// Screen grid dimensions, in tiles.
pub const GRID_W: usize = 16;
pub const GRID_H: usize = 12;
/// Play area dimensions, in pixels.
pub const PLAY_AREA_W: f64 = GRID_W as f64 * TILE_SIZE;
pub const PLAY_AREA_H: f64 = GRID_H as f64 * TILE_SIZE;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Tile {
    #[default]
    Grass,
    Wall,
    Water,
    Tree,
    Sand,
    Floor,
    Stairs,
    DoorLocked,
    DoorOpen,
    ShallowWater,
    CliffN,
    CliffS,
    CliffE,
    CliffW,
    Bridge,
    Pit,
    Bush,
    Rock,
    HeavyRock,
    Pot,
    Signpost,
    Chest,
    ChestOpen,
    OwlStatue,
    KeyBlock,
    CrackedWall,
    ConveyorN,
    ConveyorS,
    ConveyorE,
    ConveyorW,
    Spikes,
    Lava,
    Ice,
    SwitchOff,
    SwitchOn,
    WarpTile,
    BossLocked,
    Bombable,
    Torch,
    TorchLit,
    GrassFlower,
    PathH,
    PathV,
    HouseFront,
    Roof,
    Window,
    FenceH,
    FenceV,
}

/// Static behaviour record for a tile kind.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TileProps {
    pub passable: bool,
    /// Traversable only with swimming gear.
    pub swimmable: bool,
    /// A sword stroke clears it to grass.
    pub cuttable: bool,
    /// 0 = not liftable, otherwise the bracelet tier required.
    pub liftable: u8,
    pub bombable: bool,
    /// Hurts the player on contact.
    pub damaging: bool,
    /// Movement multiplier, 1.0 = normal speed.
    pub slow_factor: f64,
    pub slippery: bool,
    pub conveyor: Option<Direction>,
    /// One-way ledge; the direction of the jump.
    pub ledge: Option<Direction>,
}

const SOLID: TileProps = TileProps {
    passable: false,
    swimmable: false,
    cuttable: false,
    liftable: 0,
    bombable: false,
    damaging: false,
    slow_factor: 1.0,
    slippery: false,
    conveyor: None,
    ledge: None,
};

const GROUND: TileProps = TileProps { passable: true, ..SOLID };

/// Level-text character for every tile kind. One entry per variant.
const CHAR_TABLE: [(char, Tile); 48] = [
    ('.', Tile::Grass),
    ('W', Tile::Wall),
    ('~', Tile::Water),
    ('T', Tile::Tree),
    ('S', Tile::Sand),
    ('F', Tile::Floor),
    ('>', Tile::Stairs),
    ('D', Tile::DoorLocked),
    ('O', Tile::DoorOpen),
    ('w', Tile::ShallowWater),
    ('^', Tile::CliffN),
    ('v', Tile::CliffS),
    (')', Tile::CliffE),
    ('(', Tile::CliffW),
    ('=', Tile::Bridge),
    ('p', Tile::Pit),
    ('b', Tile::Bush),
    ('r', Tile::Rock),
    ('R', Tile::HeavyRock),
    ('u', Tile::Pot),
    ('s', Tile::Signpost),
    ('c', Tile::Chest),
    ('C', Tile::ChestOpen),
    ('A', Tile::OwlStatue),
    ('k', Tile::KeyBlock),
    ('x', Tile::CrackedWall),
    ('8', Tile::ConveyorN),
    ('2', Tile::ConveyorS),
    ('6', Tile::ConveyorE),
    ('4', Tile::ConveyorW),
    ('*', Tile::Spikes),
    ('L', Tile::Lava),
    ('I', Tile::Ice),
    ('o', Tile::SwitchOff),
    ('0', Tile::SwitchOn),
    ('@', Tile::WarpTile),
    ('B', Tile::BossLocked),
    ('X', Tile::Bombable),
    ('t', Tile::Torch),
    ('i', Tile::TorchLit),
    (',', Tile::GrassFlower),
    ('-', Tile::PathH),
    ('|', Tile::PathV),
    ('H', Tile::HouseFront),
    ('M', Tile::Roof),
    ('#', Tile::Window),
    ('_', Tile::FenceH),
    ('!', Tile::FenceV),
];

impl Tile {
    pub fn props(self) -> TileProps {
        use Tile::*;
        match self {
            Grass | Sand | Floor | Stairs | DoorOpen | Bridge | GrassFlower | PathH | PathV
            | ChestOpen | WarpTile | SwitchOff | SwitchOn => GROUND,

            Water => TileProps { swimmable: true, slow_factor: 0.5, ..SOLID },
            ShallowWater => TileProps { swimmable: true, slow_factor: 0.6, ..SOLID },

            Bush => TileProps { cuttable: true, ..SOLID },
            Rock | Pot => TileProps { liftable: 1, ..SOLID },
            HeavyRock => TileProps { liftable: 2, ..SOLID },

            CrackedWall | Bombable => TileProps { bombable: true, ..SOLID },
            ConveyorN => TileProps { conveyor: Some(Direction::Up), ..GROUND },
            ConveyorS => TileProps { conveyor: Some(Direction::Down), ..GROUND },
            ConveyorE => TileProps { conveyor: Some(Direction::Right), ..GROUND },
            ConveyorW => TileProps { conveyor: Some(Direction::Left), ..GROUND },
            Spikes => TileProps { damaging: true, ..GROUND },
            Lava => TileProps { damaging: true, ..SOLID },
            Ice => TileProps { slippery: true, ..GROUND },

            CliffN => TileProps { ledge: Some(Direction::Up), ..SOLID },
            CliffS => TileProps { ledge: Some(Direction::Down), ..SOLID },
            CliffE => TileProps { ledge: Some(Direction::Right), ..SOLID },
            CliffW => TileProps { ledge: Some(Direction::Left), ..SOLID },

            Wall | Tree | DoorLocked | Pit | Signpost | Chest | OwlStatue | KeyBlock
            | BossLocked | Torch | TorchLit | HouseFront | Roof | Window | FenceH | FenceV => SOLID,
        }
    }

    /// Can an entity's bounding box overlap this tile?
    pub fn is_passable(self) -> bool {
        self.props().passable
    }

    pub fn is_swimmable(self) -> bool {
        self.props().swimmable
    }

    pub fn is_damaging(self) -> bool {
        self.props().damaging
    }

    /// Tiles that trigger area travel when stood on.
    pub fn is_doorway(self) -> bool {
        matches!(self, Tile::Stairs | Tile::DoorOpen)
    }

    pub fn from_char(c: char) -> Option<Tile> {
        CHAR_TABLE.iter().find(|(ch, _)| *ch == c).map(|(_, t)| *t)
    }

    pub fn to_char(self) -> char {
        CHAR_TABLE
            .iter()
            .find(|(_, t)| *t == self)
            .map(|(c, _)| *c)
            .unwrap_or('?')
    }
}

// ══════════════════════════════════════════════════════════════
// Grid
// ══════════════════════════════════════════════════════════════

/// A fixed-size screen of tiles. Lookups outside the grid read as `Wall`,
/// so the boundary is closed without callers checking bounds.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TileGrid {
    cells: [[Tile; GRID_W]; GRID_H],
}

impl TileGrid {
    pub fn filled(tile: Tile) -> Self {
        TileGrid { cells: [[tile; GRID_W]; GRID_H] }
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Tile {
        if x < 0 || y < 0 || x >= GRID_W as i32 || y >= GRID_H as i32 {
            return Tile::Wall;
        }
        self.cells[y as usize][x as usize]
    }

    /// Out-of-range writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if x < 0 || y < 0 || x >= GRID_W as i32 || y >= GRID_H as i32 {
            return;
        }
        self.cells[y as usize][x as usize] = tile;
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile; GRID_W]> {
        self.cells.iter()
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        TileGrid::filled(Tile::Grass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn grid_reads_back_writes() {
        let mut g = TileGrid::default();
        g.set(3, 4, Tile::Tree);
        assert_eq!(g.tile_at(3, 4), Tile::Tree);
        assert_eq!(g.tile_at(4, 3), Tile::Grass);
        g.set(-1, 0, Tile::Tree);
        g.set(GRID_W as i32, 0, Tile::Tree);
        assert_eq!(g.rows().flatten().filter(|t| **t == Tile::Tree).count(), 1);
    }

    proptest! {
        #[test]
        fn outside_the_grid_is_never_passable(x in -1000i32..1000, y in -1000i32..1000) {
            prop_assume!(x < 0 || y < 0 || x >= GRID_W as i32 || y >= GRID_H as i32);
            let g = TileGrid::default();
            prop_assert!(!g.tile_at(x, y).is_passable());
        }
    }

    #[test]
    fn char_table_is_a_bijection() {
        let chars: HashSet<char> = CHAR_TABLE.iter().map(|(c, _)| *c).collect();
        let tiles: HashSet<Tile> = CHAR_TABLE.iter().map(|(_, t)| *t).collect();
        assert_eq!(chars.len(), CHAR_TABLE.len());
        assert_eq!(tiles.len(), CHAR_TABLE.len());
        for (c, t) in CHAR_TABLE {
            assert_eq!(Tile::from_char(c), Some(t));
            assert_eq!(t.to_char(), c);
        }
    }

    #[test]
    fn unknown_char_is_none() {
        assert_eq!(Tile::from_char('Z'), None);
    }

    #[test]
    fn doors_and_walls() {
        assert!(!Tile::Wall.is_passable());
        assert!(!Tile::DoorLocked.is_passable());
        assert!(Tile::DoorOpen.is_passable());
        assert!(Tile::DoorOpen.is_doorway());
        assert!(Tile::Stairs.is_doorway());
        assert!(!Tile::WarpTile.is_doorway());
    }

    #[test]
    fn hazard_properties() {
        assert!(Tile::Spikes.is_passable() && Tile::Spikes.is_damaging());
        assert!(!Tile::Lava.is_passable() && Tile::Lava.is_damaging());
        assert!(!Tile::Torch.is_passable());
        assert!(!Tile::TorchLit.is_passable());
    }

    #[test]
    fn water_is_slow_and_swimmable() {
        let deep = Tile::Water.props();
        assert!(deep.swimmable && !deep.passable);
        assert_eq!(deep.slow_factor, 0.5);
        assert_eq!(Tile::ShallowWater.props().slow_factor, 0.6);
        assert_eq!(Tile::Grass.props().slow_factor, 1.0);
    }

    #[test]
    fn lift_tiers_and_conveyors() {
        assert_eq!(Tile::Pot.props().liftable, 1);
        assert_eq!(Tile::HeavyRock.props().liftable, 2);
        assert_eq!(Tile::ConveyorE.props().conveyor, Some(Direction::Right));
        assert!(Tile::ConveyorE.is_passable());
        assert_eq!(Tile::CliffS.props().ledge, Some(Direction::Down));
    }
}
