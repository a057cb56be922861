/// World loader.
///
/// ## Sources (priority order):
///   1. World file named by `general.world_file` (if set)
///   2. Built-in embedded world
///
/// ## World format (`.tqw`):
///   ```text
///   ## World Name
///   ## Size: 3,3
///   ## Start: 1,1 120,120
///   ---
///   # Screen 1,1
///   @ enemy octorok 4,3
///   <12 map rows of 16 tiles>
///   ---
///   # Interior house
///   <12 map rows>
///   ```
///
/// Sections are separated by a line containing only `---`. The first section
/// holds `##` metadata; every other section is one screen. Lines starting
/// with `@ ` are spawn/warp directives:
///   `@ enemy <kind> <tx>,<ty>`
///   `@ item <kind> <tx>,<ty>`
///   `@ npc <id> <tx>,<ty> <dir> <Name> | line | line ...`
///   `@ say <id> <condition> | line | line ...`
///   `@ warp <tx>,<ty> <target> [<sx>,<sy> [<ex>,<ey>]]`
/// Warp positions are pixels; targets are `interior:<id>` on the overworld
/// and `overworld` or another interior id inside. `say` adds a conditional
/// dialogue option to an NPC declared earlier in the same section; options
/// are tried in declaration order (see `domain::quest`).

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::domain::entity::{Direction, EnemyKind, ItemKind};
use crate::domain::quest::{Condition, DialogueOption};
use crate::domain::tile::{Tile, TileGrid, GRID_H, GRID_W};

use super::screen::{EnemySpawn, ItemSpawn, NpcSpawn, Screen, ScreenGraph, Warp};
use super::world::WorldDef;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("could not read world file: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad metadata line: {0}")]
    Metadata(String),
    #[error("bad section header: {0:?}")]
    Header(String),
    #[error("{section}: expected {GRID_H} rows, found {found}")]
    RowCount { section: String, found: usize },
    #[error("{section}: row {row} has {found} tiles, expected {GRID_W}")]
    RowWidth { section: String, row: usize, found: usize },
    #[error("{section}: unknown tile {ch:?} at ({col}, {row})")]
    UnknownTile { section: String, row: usize, col: usize, ch: char },
    #[error("{section}: bad directive {line:?}")]
    Directive { section: String, line: String },
    #[error("world has no overworld screens")]
    NoScreens,
    #[error("start screen {0:?} is not mapped")]
    BadStart((i32, i32)),
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// The world compiled into the binary.
pub fn builtin_world() -> Result<WorldDef, LevelError> {
    parse_world(BUILTIN_WORLD)
}

/// Read and parse a world file.
pub fn load_world_file(path: &Path) -> Result<WorldDef, LevelError> {
    let text = std::fs::read_to_string(path)?;
    let def = parse_world(&text)?;
    info!(path = %path.display(), "world file loaded");
    Ok(def)
}

pub fn parse_world(text: &str) -> Result<WorldDef, LevelError> {
    let mut sections = split_sections(text).into_iter();
    let meta = sections.next().unwrap_or_default();

    let mut size = (1, 1);
    let mut start_screen = (0, 0);
    let mut start_pos = (120.0, 88.0);
    for line in meta {
        let Some(body) = line.strip_prefix("##") else {
            return Err(LevelError::Metadata(line.to_string()));
        };
        let body = body.trim();
        if let Some(v) = body.strip_prefix("Size:") {
            size = pair_i32(v.trim()).ok_or_else(|| LevelError::Metadata(line.to_string()))?;
        } else if let Some(v) = body.strip_prefix("Start:") {
            let mut parts = v.split_whitespace();
            let screen = parts.next().and_then(pair_i32);
            let pos = parts.next().and_then(pair_f64);
            match (screen, pos) {
                (Some(s), Some(p)) => {
                    start_screen = s;
                    start_pos = p;
                }
                _ => return Err(LevelError::Metadata(line.to_string())),
            }
        }
        // Other `##` lines are free-form (name, author).
    }

    let mut overworld = ScreenGraph::new(size.0, size.1);
    let mut interiors = HashMap::new();
    for lines in sections {
        let Some((header, rest)) = lines.split_first() else {
            continue;
        };
        match parse_header(header)? {
            SectionKind::Screen(x, y) => {
                let screen = parse_screen(header, rest)?;
                overworld.insert(x, y, screen);
            }
            SectionKind::Interior(id) => {
                let screen = parse_screen(header, rest)?;
                interiors.insert(id, screen);
            }
        }
    }

    if overworld.iter().next().is_none() {
        return Err(LevelError::NoScreens);
    }
    if !overworld.is_mapped(start_screen.0, start_screen.1) {
        return Err(LevelError::BadStart(start_screen));
    }
    Ok(WorldDef { overworld, interiors, start_screen, start_pos })
}

// ══════════════════════════════════════════════════════════════
// Sections
// ══════════════════════════════════════════════════════════════

enum SectionKind {
    Screen(i32, i32),
    Interior(String),
}

/// Non-empty trimmed lines, grouped by `---` separators.
fn split_sections(text: &str) -> Vec<Vec<&str>> {
    let mut out = vec![Vec::new()];
    for line in text.lines().map(str::trim) {
        if line == "---" {
            out.push(Vec::new());
        } else if !line.is_empty() {
            if let Some(cur) = out.last_mut() {
                cur.push(line);
            }
        }
    }
    out
}

fn parse_header(line: &str) -> Result<SectionKind, LevelError> {
    let bad = || LevelError::Header(line.to_string());
    let body = line.strip_prefix("# ").ok_or_else(bad)?.trim();
    if let Some(coords) = body.strip_prefix("Screen") {
        let (x, y) = pair_i32(coords.trim()).ok_or_else(bad)?;
        return Ok(SectionKind::Screen(x, y));
    }
    if let Some(id) = body.strip_prefix("Interior") {
        let id = id.trim();
        if !id.is_empty() && !id.contains(char::is_whitespace) {
            return Ok(SectionKind::Interior(id.to_string()));
        }
    }
    Err(bad())
}

fn parse_screen(section: &str, lines: &[&str]) -> Result<Screen, LevelError> {
    let section_name = section.trim_start_matches('#').trim();
    let mut screen = Screen::default();
    let mut rows = Vec::new();

    for &line in lines {
        if let Some(directive) = line.strip_prefix("@ ") {
            parse_directive(&mut screen, directive).ok_or_else(|| LevelError::Directive {
                section: section_name.to_string(),
                line: line.to_string(),
            })?;
        } else {
            rows.push(line);
        }
    }

    if rows.len() != GRID_H {
        return Err(LevelError::RowCount { section: section_name.to_string(), found: rows.len() });
    }
    let mut grid = TileGrid::default();
    for (row, text) in rows.iter().enumerate() {
        let count = text.chars().count();
        if count != GRID_W {
            return Err(LevelError::RowWidth { section: section_name.to_string(), row, found: count });
        }
        for (col, ch) in text.chars().enumerate() {
            let tile = Tile::from_char(ch).ok_or_else(|| LevelError::UnknownTile {
                section: section_name.to_string(),
                row,
                col,
                ch,
            })?;
            grid.set(col as i32, row as i32, tile);
        }
    }
    screen.grid = grid;
    Ok(screen)
}

fn parse_directive(screen: &mut Screen, text: &str) -> Option<()> {
    let (head, tail) = match text.split_once('|') {
        Some((h, t)) => (h, Some(t)),
        None => (text, None),
    };
    let mut words = head.split_whitespace();

    match words.next()? {
        "enemy" => {
            let kind = EnemyKind::from_name(words.next()?)?;
            let (tile_x, tile_y) = pair_i32(words.next()?)?;
            screen.enemies.push(EnemySpawn { kind, tile_x, tile_y });
        }
        "item" => {
            let kind = ItemKind::from_name(words.next()?)?;
            let (tile_x, tile_y) = pair_i32(words.next()?)?;
            screen.items.push(ItemSpawn { kind, tile_x, tile_y });
        }
        "npc" => {
            let id = words.next()?.to_string();
            let (tile_x, tile_y) = pair_i32(words.next()?)?;
            let dir = parse_dir(words.next()?)?;
            let name = words.collect::<Vec<_>>().join(" ");
            let lines = split_lines(tail);
            let name = if name.is_empty() { id.clone() } else { name };
            screen.npcs.push(NpcSpawn { id, name, tile_x, tile_y, dir, lines, options: Vec::new() });
        }
        "say" => {
            let id = words.next()?;
            let condition = Condition::parse(words.next()?)?;
            let lines = split_lines(tail);
            if words.next().is_some() || lines.is_empty() {
                return None;
            }
            let npc = screen.npcs.iter_mut().rev().find(|n| n.id == id)?;
            npc.options.push(DialogueOption { condition, lines });
        }
        "warp" => {
            let (tile_x, tile_y) = pair_i32(words.next()?)?;
            let target = words.next()?.to_string();
            let spawn = match words.next() {
                Some(w) => pair_f64(w)?,
                None => (0.0, 0.0),
            };
            let exit = match words.next() {
                Some(w) => pair_f64(w)?,
                None => (0.0, 0.0),
            };
            screen.warps.push(Warp { tile_x, tile_y, target, spawn, exit });
        }
        _ => return None,
    }
    Some(())
}

fn split_lines(tail: Option<&str>) -> Vec<String> {
    tail.map(|t| t.split('|').map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect())
        .unwrap_or_default()
}

// ── Scalars ──

fn pair_i32(s: &str) -> Option<(i32, i32)> {
    let (a, b) = s.split_once(',')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

fn pair_f64(s: &str) -> Option<(f64, f64)> {
    let (a, b) = s.split_once(',')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

fn parse_dir(s: &str) -> Option<Direction> {
    match s.to_ascii_lowercase().as_str() {
        "up" => Some(Direction::Up),
        "down" => Some(Direction::Down),
        "left" => Some(Direction::Left),
        "right" => Some(Direction::Right),
        _ => None,
    }
}

// ══════════════════════════════════════════════════════════════
// Built-in world
// ══════════════════════════════════════════════════════════════

const BUILTIN_WORLD: &str = r##"
## TileQuest
## Size: 3,3
## Start: 1,1 120,120
---
# Screen 0,0
@ enemy octorok 4,3
@ enemy octorok 11,8
@ item rupee 13,2
TTTTTTTTTTTTTTTT
T..............T
T..b.....TT....T
T...........b..T
T...,,.........T
T...............
T...............
T.....b........T
T..........,,..T
T..TT..........T
T..............T
TTTTTTT..TTTTTTT
---
# Screen 1,0
@ enemy moblin 5,4
@ enemy keese 11,7
@ item heart 2,9
TTTTTTTTTTTTTTTT
T......|.......T
T......|..rr...T
T..r...|.......T
T......|.......T
----------------
----------------
T......|.......T
T..,,..|...r...T
T......|.......T
T......|.......T
TTTTTTT..TTTTTTT
---
# Screen 2,0
@ enemy stalfos 3,8
@ enemy stalfos 12,8
@ warp 8,3 interior:lair 113,145 129,65
TTTTTTTTTTTTTTTT
T..............T
T.....WWWWW....T
T.....WWDWW....T
T.....t...t....T
-..............T
-..............T
T..............T
T...,,.....,,..T
T..............T
T..............T
TTTTTTT..TTTTTTT
---
# Screen 0,1
@ enemy gel 9,4
@ enemy zol 11,9
@ warp 3,3 interior:cave 113,145 65,81
TTTTTTT..TTTTTTT
T..............T
T.rrrr.........T
T.r>.r.....b...T
T.r..r.........T
T...............
T...............
T.....~~~......T
T....~~~~~.....T
T.....~~~......T
T..............T
TTTTTTTTTTTTTTTT
---
# Screen 1,1
@ npc farmer 10,9 left Farmer | Monsters came down from the shrine in the north east. | The old man in the house knows more.
@ say farmer item:sword | A sword! The shrine door needs a key, though. | Try the cave to the west.
@ say farmer flag:met_oldman | So you've met the old man. Did he give you anything?
@ warp 5,3 interior:house 113,145 81,65
@ warp 6,3 interior:house 113,145 97,65
TTTTTTT..TTTTTTT
T..............T
T..MMMMM.......T
T..H#>>H...,,..T
T.......|......T
----------------
----------------
T.......|......T
T..,,...|...s..T
T.......|......T
T.......|......T
TTTTTTT..TTTTTTT
---
# Screen 2,1
@ enemy octorok 4,3
@ enemy moblin 10,8
@ item rupee 13,1
TTTTTTT..TTTTTTT
T..............T
T..rr......rr..T
T..............T
T....b....b....T
-..............T
-..............T
T..............T
T..bb......bb..T
T..............T
T..............T
TTTTTTT..TTTTTTT
---
# Screen 1,2
@ enemy octorok 12,9
@ item heart_container 13,10
TTTTTTT..TTTTTTT
T..............T
T..~~~~==~~~...T
T..~~~~==~~~...T
T..............T
T...............
T...............
T..~~~~~~~~~...T
T..~~~~~~~~~...T
T..............T
T....SSSS......T
TTTTTTTTTTTTTTTT
---
# Screen 2,2
@ enemy moblin 5,8
@ enemy moblin 11,4
@ item rupee 2,2
TTTTTTT..TTTTTTT
T..............T
T.,,......,,...T
T..............T
T...SS.........T
-..............T
-..............T
T..........rr..T
T..b...........T
T........b.....T
T..............T
TTTTTTTTTTTTTTTT
---
# Interior house
@ npc oldman 7,4 down Old Man | It's dangerous to go alone! | Take this.
@ say oldman flag:got_sword | Go now. The shrine lies to the north east.
@ item sword 7,6
@ warp 7,10 overworld
WWWWWWWWWWWWWWWW
WFFFFFFFFFFFFFFW
WFtFFFFFFFFFFtFW
WFFFFFFFFFFFFFFW
WFFFFFFFFFFFFFFW
WFFFFFFFFFFFFFFW
WFFFFFFFFFFFFFFW
WFFFFFFFFFFFFFFW
WFFFFFFFFFFFFFFW
WFFFFFFFFFFFFFFW
WFFFFFF>>FFFFFFW
WWWWWWWWWWWWWWWW
---
# Interior cave
@ enemy keese 10,3
@ enemy keese 12,6
@ item key 4,4
@ warp 7,10 overworld
WWWWWWWWWWWWWWWW
WFFFFFFFFFFFFFFW
WFFFFFFFFFFFFFFW
WFFFWWFFFFFFFFFW
WFFFFFFFFFFWWFFW
WFFFFFFFFFFFFFFW
WFFFFFFFFFFFFFFW
WFWWFFFFFFFFFFFW
WFFFFFFFFFFFFFFW
WFFFFFFFFFFFFFFW
WFFFFFF>>FFFFFFW
WWWWWWWWWWWWWWWW
---
# Interior lair
@ enemy boss 7,3
@ warp 7,10 overworld
WWWWWWWWWWWWWWWW
WFFFFFFFFFFFFFFW
WFiFFFFFFFFFFiFW
WFFFFFFFFFFFFFFW
WFFFFFFFFFFFFFFW
WFFFFFFFFFFFFFFW
WFFFFFFFFFFFFFFW
WFFFFFFFFFFFFFFW
WFiFFFFFFFFFFiFW
WFFFFFFFFFFFFFFW
WFFFFFF>>FFFFFFW
WWWWWWWWWWWWWWWW
"##;
