/// WorldState: everything the tick loop owns.
///
/// ## Areas
///
/// The player is either on the overworld (the screen under the graph cursor)
/// or inside a named interior. Both kinds of area are plain `Screen`s whose
/// tile grid is the live one: unlocking a door edits it in place, and every
/// respawn re-applies the unlocked set from the progress store.
///
/// ## Active set
///
/// Enemies, projectiles, items and NPCs of the current area live in one
/// `ActiveSet`. It is replaced wholesale whenever the area changes, so no
/// entity survives a screen transition.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::config::{CombatConfig, GameConfig, SimConfig};
use crate::domain::entity::{Body, Enemy, EnemyKind, Item, Npc, Player, Projectile, ITEM_SIZE, PLAYER_SIZE};
use crate::domain::rng::Rng;
use crate::domain::tile::{Tile, TileGrid, GRID_H, GRID_W, TILE_SIZE};

use super::door::{AreaId, DoorLink, DoorTable, LinkTarget};
use super::event::{Hud, Outcome, RenderSnapshot, Sprite, SpriteKind, TransitionView};
use super::progress::{DoorKey, ItemKey, PlayerRecord, ProgressStore};
use super::screen::{Screen, ScreenGraph};
use super::transition::{Transition, TransitionKind};

/// Enemies and NPCs spawn one pixel into their tile, items two.
const ACTOR_SPAWN_INSET: f64 = 1.0;
const ITEM_SPAWN_INSET: f64 = 2.0;

/// Static world content handed to `WorldState::new`.
#[derive(Clone, Debug)]
pub struct WorldDef {
    pub overworld: ScreenGraph,
    pub interiors: HashMap<String, Screen>,
    pub start_screen: (i32, i32),
    pub start_pos: (f64, f64),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Location {
    Overworld,
    Interior(String),
}

/// Area swap committed when a Fade completes.
#[derive(Clone, PartialEq, Debug)]
pub enum PendingSwap {
    Enter(DoorLink),
    Exit,
}

#[derive(Clone, Debug, Default)]
pub struct ActiveSet {
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub items: Vec<Item>,
    pub npcs: Vec<Npc>,
}

impl ActiveSet {
    /// Fresh entities from a screen's spawn tables, minus collected items.
    pub fn spawn(screen: &Screen, area: &AreaId, progress: &dyn ProgressStore) -> Self {
        let tile_px = |t: i32, inset: f64| t as f64 * TILE_SIZE + inset;

        let enemies = screen
            .enemies
            .iter()
            .map(|s| Enemy::new(s.kind, tile_px(s.tile_x, ACTOR_SPAWN_INSET), tile_px(s.tile_y, ACTOR_SPAWN_INSET)))
            .collect();

        let items = screen
            .items
            .iter()
            .enumerate()
            .filter(|(i, _)| !progress.is_item_collected(&ItemKey::new(area, *i)))
            .map(|(i, s)| {
                Item::new(s.kind, tile_px(s.tile_x, ITEM_SPAWN_INSET), tile_px(s.tile_y, ITEM_SPAWN_INSET), Some(i))
            })
            .collect();

        let npcs = screen
            .npcs
            .iter()
            .map(|s| Npc {
                id: s.id.clone(),
                name: s.name.clone(),
                x: tile_px(s.tile_x, ACTOR_SPAWN_INSET),
                y: tile_px(s.tile_y, ACTOR_SPAWN_INSET),
                dir: s.dir,
                lines: s.lines.clone(),
                options: s.options.clone(),
            })
            .collect();

        ActiveSet { enemies, projectiles: Vec::new(), items, npcs }
    }

    pub fn boss(&self) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.kind == EnemyKind::Boss && !e.dead)
    }
}

pub struct WorldState {
    // ── Configuration ──
    pub sim: SimConfig,
    pub combat: CombatConfig,

    // ── Areas ──
    pub overworld: ScreenGraph,
    pub interiors: HashMap<String, Screen>,
    pub doors: DoorTable,
    pub location: Location,
    /// Overworld link the player came in through, while inside.
    pub return_link: Option<DoorLink>,
    pub pending: Option<PendingSwap>,

    // ── Entities ──
    pub player: Player,
    pub active: ActiveSet,

    // ── Flow ──
    pub transition: Transition,
    pub rng: Rng,
    pub outcome: Option<Outcome>,
    pub tick: u64,

    // ── Presentation timers ──
    pub shake_timer: f64,
    pub flash_timer: f64,

    pub progress: Box<dyn ProgressStore>,
}

/// Live screen for a location, for tile edits.
fn live_screen<'a>(
    overworld: &'a mut ScreenGraph,
    interiors: &'a mut HashMap<String, Screen>,
    location: &Location,
) -> Option<&'a mut Screen> {
    match location {
        Location::Overworld => overworld.current_screen_mut(),
        Location::Interior(id) => interiors.get_mut(id),
    }
}

// ── Construction ──

impl WorldState {
    pub fn new(def: WorldDef, cfg: &GameConfig, progress: Box<dyn ProgressStore>) -> Self {
        let mut overworld = def.overworld;
        overworld.set_cursor(def.start_screen.0, def.start_screen.1);
        let doors = DoorTable::build(&overworld, &def.interiors);
        info!(
            screens = overworld.iter().count(),
            interiors = def.interiors.len(),
            links = doors.len(),
            "world loaded"
        );

        let (px, py) = def.start_pos;
        let mut world = WorldState {
            sim: cfg.sim.clone(),
            combat: cfg.combat.clone(),
            overworld,
            interiors: def.interiors,
            doors,
            location: Location::Overworld,
            return_link: None,
            pending: None,
            player: Player::new(px, py, cfg.sim.player_speed, cfg.sim.player_max_hp),
            active: ActiveSet::default(),
            transition: Transition::new(cfg.sim.transition_duration),
            rng: Rng::new(cfg.sim.rng_seed),
            outcome: None,
            tick: 0,
            shake_timer: 0.0,
            flash_timer: 0.0,
            progress,
        };
        world.respawn();
        world
    }

    /// Re-enter the area and position from the store's player record.
    /// Returns false (state untouched) when there is no usable record.
    pub fn restore(&mut self) -> bool {
        let Some(rec) = self.progress.player_record() else {
            return false;
        };
        match &rec.area {
            AreaId::Overworld { x, y } => {
                if !self.overworld.is_mapped(*x, *y) {
                    warn!(area = %rec.area, "saved screen is not mapped; starting fresh");
                    return false;
                }
                self.overworld.set_cursor(*x, *y);
                self.location = Location::Overworld;
                self.return_link = None;
            }
            AreaId::Interior(id) => {
                if !self.interiors.contains_key(id) {
                    warn!(area = %rec.area, "saved interior does not exist; starting fresh");
                    return false;
                }
                self.return_link = self.doors.entrance_to(id).cloned();
                self.location = Location::Interior(id.clone());
            }
        }
        let p = &mut self.player;
        p.x = rec.x;
        p.y = rec.y;
        p.max_hp = rec.max_hp.max(1);
        p.hp = if rec.hp > 0 { rec.hp.min(p.max_hp) } else { p.max_hp };
        p.inventory = rec.inventory;
        self.respawn();
        info!(area = %rec.area, "progress restored");
        true
    }
}

// ── Area queries ──

impl WorldState {
    pub fn area_id(&self) -> AreaId {
        match &self.location {
            Location::Overworld => {
                let (x, y) = self.overworld.cursor();
                AreaId::Overworld { x, y }
            }
            Location::Interior(id) => AreaId::Interior(id.clone()),
        }
    }

    pub fn in_interior(&self) -> bool {
        matches!(self.location, Location::Interior(_))
    }

    pub fn current_screen(&self) -> &Screen {
        match &self.location {
            Location::Overworld => self.overworld.current_screen(),
            Location::Interior(id) => self.interiors.get(id).unwrap_or(self.overworld.current_screen()),
        }
    }

    pub fn current_grid(&self) -> &TileGrid {
        &self.current_screen().grid
    }

    /// The current grid borrowed alongside the mutable entity state.
    pub fn split_active(&mut self) -> (&TileGrid, &mut ActiveSet, &mut Rng) {
        let grid = match &self.location {
            Location::Overworld => &self.overworld.current_screen().grid,
            Location::Interior(id) => match self.interiors.get(id) {
                Some(s) => &s.grid,
                None => &self.overworld.current_screen().grid,
            },
        };
        (grid, &mut self.active, &mut self.rng)
    }

    /// Write a tile into the live grid of the current area.
    pub fn set_tile(&mut self, x: i32, y: i32, tile: Tile) {
        if let Some(s) = live_screen(&mut self.overworld, &mut self.interiors, &self.location) {
            s.grid.set(x, y, tile);
        }
    }
}

// ── Area changes ──

impl WorldState {
    /// Re-apply unlocked doors and replace the active set from the current
    /// area's spawn tables.
    pub fn respawn(&mut self) {
        let area = self.area_id();
        let progress = &*self.progress;

        if let Some(screen) = live_screen(&mut self.overworld, &mut self.interiors, &self.location) {
            for y in 0..GRID_H as i32 {
                for x in 0..GRID_W as i32 {
                    if screen.grid.tile_at(x, y) == Tile::DoorLocked
                        && progress.is_door_unlocked(&DoorKey::new(&area, x, y))
                    {
                        screen.grid.set(x, y, Tile::DoorOpen);
                    }
                }
            }
        }

        self.active = ActiveSet::spawn(self.current_screen(), &area, &*self.progress);
    }

    /// Apply the pending swap queued by a door. Returns the area entered.
    pub fn commit_swap(&mut self) -> Option<AreaId> {
        match self.pending.take()? {
            PendingSwap::Enter(link) => {
                let LinkTarget::Interior(id) = &link.target else {
                    return None;
                };
                if !self.interiors.contains_key(id) {
                    warn!(interior = %id, "door leads to a missing interior");
                    return None;
                }
                self.location = Location::Interior(id.clone());
                (self.player.x, self.player.y) = link.spawn;
                if !link.area.is_interior() {
                    self.return_link = Some(link);
                }
            }
            PendingSwap::Exit => {
                let link = self.return_link.take()?;
                if let AreaId::Overworld { x, y } = link.area {
                    self.overworld.set_cursor(x, y);
                }
                self.location = Location::Overworld;
                (self.player.x, self.player.y) = link.exit;
            }
        }
        self.respawn();
        self.record_player();
        let area = self.area_id();
        info!(area = %area, "entered area");
        Some(area)
    }

    pub fn record_player(&mut self) {
        let rec = PlayerRecord {
            area: self.area_id(),
            x: self.player.x,
            y: self.player.y,
            hp: self.player.hp,
            max_hp: self.player.max_hp,
            inventory: self.player.inventory,
        };
        self.progress.record_player(rec);
    }
}

// ── Snapshot ──

impl WorldState {
    pub fn snapshot(&self) -> RenderSnapshot {
        let mut sprites = Vec::new();
        let a = &self.active;

        for it in a.items.iter().filter(|i| !i.collected) {
            sprites.push(Sprite {
                kind: SpriteKind::Item(it.kind),
                x: it.x,
                y: it.y + it.bob_offset(),
                w: ITEM_SIZE,
                h: ITEM_SIZE,
                facing: it.facing(),
                frame: 0,
                hidden: false,
            });
        }
        for n in &a.npcs {
            let r = n.rect();
            sprites.push(Sprite {
                kind: SpriteKind::Npc,
                x: r.x,
                y: r.y,
                w: r.w,
                h: r.h,
                facing: n.dir,
                frame: 0,
                hidden: false,
            });
        }
        for e in a.enemies.iter().filter(|e| !e.dead) {
            sprites.push(Sprite {
                kind: SpriteKind::Enemy(e.kind),
                x: e.x,
                y: e.y,
                w: e.size,
                h: e.size,
                facing: e.dir,
                frame: e.anim.frame,
                hidden: e.is_invincible() && flicker(e.inv_timer),
            });
        }
        for p in a.projectiles.iter().filter(|p| !p.dead) {
            let r = p.rect();
            sprites.push(Sprite {
                kind: SpriteKind::Projectile,
                x: r.x,
                y: r.y,
                w: r.w,
                h: r.h,
                facing: p.facing(),
                frame: 0,
                hidden: false,
            });
        }

        let pl = &self.player;
        sprites.push(Sprite {
            kind: SpriteKind::Player,
            x: pl.x,
            y: pl.y,
            w: PLAYER_SIZE,
            h: PLAYER_SIZE,
            facing: pl.dir,
            frame: pl.anim.frame,
            hidden: pl.is_invincible() && flicker(pl.inv_timer),
        });
        if pl.sword.active {
            let b = pl.sword.hitbox(&pl.rect(), self.combat.sword_reach, self.combat.sword_width);
            sprites.push(Sprite {
                kind: SpriteKind::Sword,
                x: b.x,
                y: b.y,
                w: b.w,
                h: b.h,
                facing: pl.sword.dir,
                frame: (pl.sword.progress() * 3.0) as u8,
                hidden: false,
            });
        }

        let transition = self.transition.active.then(|| {
            let t = &self.transition;
            let amount = match t.kind {
                TransitionKind::Scroll => t.scroll_offset(),
                TransitionKind::Fade => t.fade_level(),
            };
            TransitionView { kind: t.kind, amount, dir: t.dir, from_screen: t.from_screen }
        });

        RenderSnapshot {
            area: self.area_id(),
            sprites,
            transition,
            shake: self.shake_timer > 0.0,
            flash: self.flash_timer > 0.0,
            hud: Hud {
                hp: pl.hp,
                max_hp: pl.max_hp,
                rupees: pl.inventory.rupees,
                keys: pl.inventory.keys,
                has_sword: pl.has_sword(),
                boss: a.boss().map(|b| (b.hp, b.max_hp)),
            },
            outcome: self.outcome,
        }
    }
}

/// Blink at 10 Hz while invincible.
fn flicker(timer: f64) -> bool {
    (timer * 10.0) as i64 % 2 == 1
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::domain::entity::{Direction, ItemKind};
    use crate::sim::progress::MemoryProgress;
    use crate::domain::quest::{Condition, DialogueOption};
    use crate::sim::screen::{EnemySpawn, ItemSpawn, NpcSpawn, Warp};

    pub fn screen_from(rows: &[&str]) -> Screen {
        let mut grid = TileGrid::default();
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if let Some(t) = Tile::from_char(c) {
                    grid.set(x as i32, y as i32, t);
                }
            }
        }
        Screen::new(grid)
    }

    pub fn grass_screen() -> Screen {
        Screen::default()
    }

    /// 2x1 overworld: (0,0) with a house door at tile (5,3) and a locked
    /// door at (8,3); (1,0) plain grass. The house holds a key and an exit
    /// at tile (7,10).
    pub fn small_world() -> WorldDef {
        let mut west = screen_from(&[
            "................",
            "................",
            "................",
            ".....>..D.......",
        ]);
        west.warps.push(Warp {
            tile_x: 5,
            tile_y: 3,
            target: "interior:house".into(),
            spawn: (120.0, 140.0),
            exit: (81.0, 66.0),
        });
        west.items.push(ItemSpawn { kind: ItemKind::Rupee, tile_x: 12, tile_y: 8 });
        west.npcs.push(NpcSpawn {
            id: "sage".into(),
            name: "Sage".into(),
            tile_x: 2,
            tile_y: 9,
            dir: Direction::Down,
            lines: vec!["It's dangerous to go alone.".into()],
            options: vec![DialogueOption {
                condition: Condition::parse("flag:got_sword").unwrap(),
                lines: vec!["That sword suits you.".into()],
            }],
        });

        let mut east = grass_screen();
        east.enemies.push(EnemySpawn { kind: EnemyKind::Octorok, tile_x: 10, tile_y: 5 });

        let mut house = screen_from(&[
            "WWWWWWWWWWWWWWWW",
            "WFFFFFFFFFFFFFFW",
            "WFFFFFFFFFFFFFFW",
            "WFFFFFFFFFFFFFFW",
            "WFFFFFFFFFFFFFFW",
            "WFFFFFFFFFFFFFFW",
            "WFFFFFFFFFFFFFFW",
            "WFFFFFFFFFFFFFFW",
            "WFFFFFFFFFFFFFFW",
            "WFFFFFFFFFFFFFFW",
            "WFFFFFF>FFFFFFFW",
            "WWWWWWWWWWWWWWWW",
        ]);
        house.warps.push(Warp {
            tile_x: 7,
            tile_y: 10,
            target: "overworld".into(),
            spawn: (0.0, 0.0),
            exit: (0.0, 0.0),
        });
        house.items.push(ItemSpawn { kind: ItemKind::Key, tile_x: 4, tile_y: 4 });

        let mut overworld = ScreenGraph::new(2, 1);
        overworld.insert(0, 0, west);
        overworld.insert(1, 0, east);
        let mut interiors = HashMap::new();
        interiors.insert("house".to_string(), house);

        WorldDef { overworld, interiors, start_screen: (0, 0), start_pos: (120.0, 120.0) }
    }

    pub fn world_with(def: WorldDef) -> WorldState {
        WorldState::new(def, &GameConfig::default(), Box::new(MemoryProgress::default()))
    }
}
