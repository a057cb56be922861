/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// Each frame:
///   1. Compose HUD, map, sprites and overlays into `front`
///   2. Diff against `back` (previous frame) and emit only changed cells
///   3. Swap buffers
///
/// A tile is two terminal columns wide and one row tall, so one terminal
/// column covers 8 pixels horizontally and one row covers 16 vertically.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Direction, EnemyKind, ItemKind};
use crate::domain::tile::{Tile, TileGrid, GRID_H, GRID_W, TILE_SIZE};
use crate::sim::event::{Hud, Outcome, RenderSnapshot, SpriteKind};
use crate::sim::transition::TransitionKind;
use crate::sim::world::WorldState;

const BASE_BG: Color = rgb(22, 22, 35);

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

// ── Cell / FrameBuffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BASE_BG };
    /// Never equal to a composed cell; forces a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            *self = FrameBuffer::new(w, h);
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell { ch, fg, bg });
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.set(xx, yy, Cell { ch: ' ', fg: Color::White, bg });
            }
        }
    }
}

// ── Layout ──

const CELL_W: usize = 2;
const MAP_COLS: usize = GRID_W * CELL_W;
const MAP_ROWS: usize = GRID_H;
const PX_PER_COL: f64 = TILE_SIZE / CELL_W as f64;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
/// Leftmost map column; column 0 holds the frame.
const MAP_COL: usize = 1;
const HELP_ROW: usize = MAP_ROW + MAP_ROWS + 1;

/// Modal layers drawn over the play field by the front-end.
pub enum Overlay<'a> {
    None,
    Paused,
    Dialog { name: &'a str, line: &'a str, more: bool },
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    frame: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            frame: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;
        self.sync_size()?;
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    fn sync_size(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h || self.front.cells.is_empty() {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
        }
        Ok(())
    }

    pub fn render(&mut self, world: &WorldState, overlay: &Overlay) -> io::Result<()> {
        self.sync_size()?;
        self.frame = self.frame.wrapping_add(1);

        let snap = world.snapshot();
        self.front.clear();

        self.compose_hud(&snap.hud);
        self.compose_frame(snap.flash);
        let shake = if snap.shake { (self.frame % 2) as i32 * 2 - 1 } else { 0 };
        let origin = scroll_origin(&snap);
        self.compose_map(world, &snap, origin, shake);
        self.compose_sprites(&snap, origin, shake);
        if let Some(t) = snap.transition.filter(|t| t.kind == TransitionKind::Fade) {
            self.darken_map(1.0 - t.amount);
        }
        self.compose_help();

        match overlay {
            Overlay::None => {}
            Overlay::Paused => self.compose_pause(),
            Overlay::Dialog { name, line, more } => self.compose_dialog(name, line, *more),
        }
        if let Some(outcome) = snap.outcome {
            self.compose_outcome(outcome);
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }
        self.writer.flush()
    }

    // ── Compose ──

    fn compose_hud(&mut self, hud: &Hud) {
        let mut x = 1;
        for (ch, fg) in hearts(hud.hp, hud.max_hp) {
            self.front.set(x, HUD_ROW, Cell { ch, fg, bg: BASE_BG });
            x += 1;
        }
        x += 2;
        let counters = format!("◆{:<3} ⚷{:<2}", hud.rupees, hud.keys);
        self.front.put_str(x, HUD_ROW, &counters, rgb(120, 220, 140), BASE_BG);
        x += counters.chars().count() + 1;
        if hud.has_sword {
            self.front.put_str(x, HUD_ROW, "[/]", rgb(200, 200, 255), BASE_BG);
        }
        x += 4;
        if let Some((hp, max)) = hud.boss {
            self.front.put_str(x, HUD_ROW, "BOSS ", rgb(255, 90, 90), BASE_BG);
            self.front.put_str(x + 5, HUD_ROW, &bar(hp, max, 10), rgb(255, 90, 90), BASE_BG);
        }
    }

    fn compose_frame(&mut self, flash: bool) {
        let fg = if flash { rgb(255, 240, 120) } else { rgb(70, 70, 90) };
        let right = MAP_COL + MAP_COLS;
        let bottom = MAP_ROW + MAP_ROWS;
        for x in MAP_COL..right {
            self.front.set(x, MAP_ROW - 1, Cell { ch: '─', fg, bg: BASE_BG });
            self.front.set(x, bottom, Cell { ch: '─', fg, bg: BASE_BG });
        }
        for y in MAP_ROW..bottom {
            self.front.set(MAP_COL - 1, y, Cell { ch: '│', fg, bg: BASE_BG });
            self.front.set(right, y, Cell { ch: '│', fg, bg: BASE_BG });
        }
        for (x, y, ch) in [
            (MAP_COL - 1, MAP_ROW - 1, '┌'),
            (right, MAP_ROW - 1, '┐'),
            (MAP_COL - 1, bottom, '└'),
            (right, bottom, '┘'),
        ] {
            self.front.set(x, y, Cell { ch, fg, bg: BASE_BG });
        }
    }

    fn compose_map(&mut self, world: &WorldState, snap: &RenderSnapshot, origin: (i32, i32), shake: i32) {
        let grid = world.current_grid();
        let dir = snap.transition.map(|t| t.dir).unwrap_or((0, 0));
        let old: Option<&TileGrid> = snap
            .transition
            .filter(|t| t.kind == TransitionKind::Scroll)
            .and_then(|t| t.from_screen)
            .and_then(|(x, y)| world.overworld.screen_at(x, y))
            .map(|s| &s.grid);

        for row in 0..MAP_ROWS {
            for col in 0..MAP_COLS {
                let lc = col as i32 - origin.0 - shake;
                let lr = row as i32 - origin.1;
                let in_new = (0..MAP_COLS as i32).contains(&lc) && (0..MAP_ROWS as i32).contains(&lr);
                let (tile, half) = if in_new {
                    (grid.tile_at(lc / 2, lr), lc.rem_euclid(2))
                } else if let Some(old) = old {
                    let oc = lc + dir.0 * MAP_COLS as i32;
                    let or = lr + dir.1 * MAP_ROWS as i32;
                    (old.tile_at(oc.div_euclid(2), or), oc.rem_euclid(2))
                } else {
                    (Tile::Pit, 0)
                };
                let (glyph, fg, bg) = tile_style(tile);
                let ch = glyph.chars().nth(half as usize).unwrap_or(' ');
                self.front.set(MAP_COL + col, MAP_ROW + row, Cell { ch, fg, bg });
            }
        }
    }

    fn compose_sprites(&mut self, snap: &RenderSnapshot, origin: (i32, i32), shake: i32) {
        for s in snap.sprites.iter().filter(|s| !s.hidden) {
            let (glyph, fg) = sprite_style(s.kind, s.facing);
            let c0 = (s.x / PX_PER_COL).floor() as i32;
            let c1 = ((s.x + s.w - 1.0) / PX_PER_COL).floor() as i32;
            let row = ((s.y + s.h / 2.0) / TILE_SIZE).floor() as i32 + origin.1;
            if !(0..MAP_ROWS as i32).contains(&row) {
                continue;
            }
            let chars: Vec<char> = glyph.chars().collect();
            for (i, c) in (c0..=c1).enumerate() {
                let col = c + origin.0 + shake;
                if !(0..MAP_COLS as i32).contains(&col) {
                    continue;
                }
                let (x, y) = (MAP_COL + col as usize, MAP_ROW + row as usize);
                let bg = self.front.get(x, y).bg;
                let ch = chars[i % chars.len()];
                self.front.set(x, y, Cell { ch, fg, bg });
            }
        }
    }

    fn darken_map(&mut self, k: f64) {
        for row in MAP_ROW..MAP_ROW + MAP_ROWS {
            for col in MAP_COL..MAP_COL + MAP_COLS {
                let c = self.front.get(col, row);
                self.front.set(col, row, Cell { ch: c.ch, fg: shade(c.fg, k), bg: shade(c.bg, k) });
            }
        }
    }

    fn compose_help(&mut self) {
        self.front.put_str(
            1,
            HELP_ROW,
            "←↑↓→/WASD move  Z sword  X item  E talk/open  P pause  Q quit",
            rgb(110, 110, 130),
            BASE_BG,
        );
    }

    fn compose_dialog(&mut self, name: &str, line: &str, more: bool) {
        let box_w = MAP_COLS - 2;
        let mut text = wrap(line, box_w - 2);
        text.truncate(MAP_ROWS - 2);
        let box_h = text.len() + 2;
        let x = MAP_COL + 1;
        let y = MAP_ROW + MAP_ROWS - box_h;
        let bg = rgb(20, 20, 60);
        self.front.fill_rect(x, y, box_w, box_h, bg);
        self.front.put_str(x + 1, y, name, rgb(255, 220, 80), bg);
        for (i, l) in text.iter().enumerate() {
            self.front.put_str(x + 1, y + 1 + i, l, Color::White, bg);
        }
        let prompt = if more { "▼" } else { "■" };
        if self.frame / 15 % 2 == 0 {
            self.front.put_str(x + box_w - 2, y + box_h - 1, prompt, rgb(180, 180, 255), bg);
        }
    }

    fn compose_pause(&mut self) {
        let bg = rgb(40, 40, 40);
        let (x, y) = (MAP_COL + 7, MAP_ROW + 3);
        self.front.fill_rect(x, y, 18, 5, bg);
        self.front.put_str(x + 5, y + 1, "PAUSED", rgb(255, 220, 50), bg);
        self.front.put_str(x + 1, y + 3, "P resume  Q quit", rgb(180, 180, 180), bg);
    }

    fn compose_outcome(&mut self, outcome: Outcome) {
        let (title, fg) = match outcome {
            Outcome::GameOver => ("GAME OVER", rgb(255, 60, 60)),
            Outcome::Victory => ("VICTORY!", rgb(255, 220, 50)),
        };
        let bg = rgb(10, 10, 10);
        let (x, y) = (MAP_COL + 6, MAP_ROW + 4);
        self.front.fill_rect(x, y, 20, 4, bg);
        self.front.put_str(x + (20 - title.len()) / 2, y + 1, title, fg, bg);
        self.front.put_str(x + 2, y + 2, "Enter / Q: exit", rgb(160, 160, 160), bg);
    }
}

// ══════════════════════════════════════════════════════════════
// Styling helpers
// ══════════════════════════════════════════════════════════════

/// Where the current area's (0, 0) cell lands in map columns/rows. Nonzero
/// only mid-scroll: the new screen slides in from `dir` as the old leaves.
fn scroll_origin(snap: &RenderSnapshot) -> (i32, i32) {
    match snap.transition {
        Some(t) if t.kind == TransitionKind::Scroll => {
            let rest = 1.0 - t.amount.clamp(0.0, 1.0);
            (
                (t.dir.0 as f64 * MAP_COLS as f64 * rest).round() as i32,
                (t.dir.1 as f64 * MAP_ROWS as f64 * rest).round() as i32,
            )
        }
        _ => (0, 0),
    }
}

fn shade(c: Color, k: f64) -> Color {
    let k = k.clamp(0.0, 1.0);
    match c {
        Color::Rgb { r, g, b } => {
            let f = |v: u8| (v as f64 * k).round() as u8;
            rgb(f(r), f(g), f(b))
        }
        other => other,
    }
}

/// Hit points are half-hearts.
fn hearts(hp: i32, max_hp: i32) -> Vec<(char, Color)> {
    let full = rgb(230, 40, 60);
    let half = rgb(140, 30, 40);
    let empty = rgb(80, 80, 80);
    (0..(max_hp + 1) / 2)
        .map(|i| match hp - i * 2 {
            n if n >= 2 => ('♥', full),
            1 => ('♥', half),
            _ => ('♡', empty),
        })
        .collect()
}

fn bar(value: i32, max: i32, width: usize) -> String {
    let filled = if max > 0 {
        ((value.max(0) as f64 / max as f64) * width as f64).ceil() as usize
    } else {
        0
    };
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Greedy word wrap. Words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !cur.is_empty() {
                lines.push(std::mem::take(&mut cur));
            }
            lines.push(word.drain(..width).collect());
        }
        let word: String = word.into_iter().collect();
        let needed = if cur.is_empty() { word.chars().count() } else { cur.chars().count() + 1 + word.chars().count() };
        if needed > width && !cur.is_empty() {
            lines.push(std::mem::take(&mut cur));
        }
        if !cur.is_empty() {
            cur.push(' ');
        }
        cur.push_str(&word);
    }
    if !cur.is_empty() || lines.is_empty() {
        lines.push(cur);
    }
    lines
}

fn tile_style(t: Tile) -> (&'static str, Color, Color) {
    const GRASS: Color = rgb(40, 110, 40);
    const FLOOR: Color = rgb(90, 70, 50);
    const PATH: Color = rgb(180, 160, 110);
    const WALL: Color = rgb(60, 60, 70);
    const CLIFF: Color = rgb(120, 90, 60);
    match t {
        Tile::Grass => ("  ", GRASS, GRASS),
        Tile::GrassFlower => ("*'", rgb(240, 200, 80), GRASS),
        Tile::Wall => ("▓▓", rgb(110, 110, 120), WALL),
        Tile::Water => ("~~", rgb(120, 170, 255), rgb(30, 60, 160)),
        Tile::ShallowWater => ("~ ", rgb(160, 200, 255), rgb(60, 110, 200)),
        Tile::Tree => ("▲▲", rgb(20, 60, 20), rgb(30, 90, 30)),
        Tile::Sand => ("..", rgb(190, 170, 110), rgb(220, 200, 140)),
        Tile::Floor => ("  ", FLOOR, FLOOR),
        Tile::Stairs => ("≡≡", Color::White, rgb(80, 80, 80)),
        Tile::DoorLocked => ("▐▌", rgb(220, 170, 40), rgb(90, 50, 20)),
        Tile::DoorOpen => ("  ", Color::White, rgb(15, 10, 8)),
        Tile::CliffN => ("▀▀", rgb(90, 60, 40), CLIFF),
        Tile::CliffS => ("▄▄", rgb(90, 60, 40), CLIFF),
        Tile::CliffE => (" ▐", rgb(90, 60, 40), CLIFF),
        Tile::CliffW => ("▌ ", rgb(90, 60, 40), CLIFF),
        Tile::Bridge => ("==", rgb(160, 110, 60), rgb(100, 70, 40)),
        Tile::Pit => ("  ", Color::Black, rgb(0, 0, 0)),
        Tile::Bush => ("%%", rgb(60, 170, 60), GRASS),
        Tile::Rock => ("()", rgb(150, 150, 150), GRASS),
        Tile::HeavyRock => ("[]", rgb(120, 120, 120), GRASS),
        Tile::Pot => ("()", rgb(170, 110, 60), FLOOR),
        Tile::Signpost => ("┬ ", rgb(170, 120, 70), GRASS),
        Tile::Chest => ("[]", rgb(230, 180, 40), FLOOR),
        Tile::ChestOpen => ("[_", rgb(150, 120, 40), FLOOR),
        Tile::OwlStatue => ("Ω ", rgb(170, 170, 190), GRASS),
        Tile::KeyBlock => ("[k", rgb(230, 180, 40), WALL),
        Tile::CrackedWall | Tile::Bombable => ("▒▒", rgb(110, 110, 120), WALL),
        Tile::ConveyorN => ("↑↑", rgb(200, 200, 200), FLOOR),
        Tile::ConveyorS => ("↓↓", rgb(200, 200, 200), FLOOR),
        Tile::ConveyorE => ("→→", rgb(200, 200, 200), FLOOR),
        Tile::ConveyorW => ("←←", rgb(200, 200, 200), FLOOR),
        Tile::Spikes => ("^^", rgb(220, 220, 220), FLOOR),
        Tile::Lava => ("≈≈", rgb(255, 220, 60), rgb(200, 40, 10)),
        Tile::Ice => ("  ", Color::White, rgb(170, 220, 240)),
        Tile::SwitchOff => ("o ", rgb(160, 160, 160), FLOOR),
        Tile::SwitchOn => ("● ", rgb(80, 230, 80), FLOOR),
        Tile::WarpTile => ("@@", rgb(230, 100, 230), FLOOR),
        Tile::BossLocked => ("▐▌", rgb(230, 60, 60), rgb(70, 10, 10)),
        Tile::Torch => ("i ", rgb(150, 150, 150), FLOOR),
        Tile::TorchLit => ("i ", rgb(255, 160, 40), FLOOR),
        Tile::PathH | Tile::PathV => ("  ", PATH, PATH),
        Tile::HouseFront => ("||", rgb(90, 50, 20), rgb(150, 100, 60)),
        Tile::Roof => ("▲▲", rgb(200, 60, 40), rgb(130, 40, 30)),
        Tile::Window => ("[]", rgb(150, 220, 255), rgb(150, 100, 60)),
        Tile::FenceH => ("──", rgb(200, 180, 140), GRASS),
        Tile::FenceV => ("│ ", rgb(200, 180, 140), GRASS),
    }
}

fn facing_arrow(d: Direction) -> char {
    match d {
        Direction::Up => '^',
        Direction::Down => 'v',
        Direction::Left => '<',
        Direction::Right => '>',
    }
}

fn sprite_style(kind: SpriteKind, facing: Direction) -> (String, Color) {
    let (glyph, fg) = match kind {
        SpriteKind::Player => return (format!("@{}", facing_arrow(facing)), rgb(90, 255, 90)),
        SpriteKind::Sword => match facing {
            Direction::Left | Direction::Right => ("─", rgb(230, 230, 255)),
            Direction::Up | Direction::Down => ("│", rgb(230, 230, 255)),
        },
        SpriteKind::Enemy(EnemyKind::Octorok) => ("Oc", rgb(255, 110, 110)),
        SpriteKind::Enemy(EnemyKind::Moblin) => ("Mb", rgb(255, 160, 60)),
        SpriteKind::Enemy(EnemyKind::Stalfos) => ("St", rgb(235, 235, 235)),
        SpriteKind::Enemy(EnemyKind::Boss) => ("BB", rgb(255, 40, 200)),
        SpriteKind::Enemy(EnemyKind::Keese) => ("vv", rgb(170, 120, 255)),
        SpriteKind::Enemy(EnemyKind::Gel) => ("gl", rgb(110, 230, 230)),
        SpriteKind::Enemy(EnemyKind::Zol) => ("Zl", rgb(60, 190, 190)),
        SpriteKind::Projectile => ("•", rgb(255, 230, 120)),
        SpriteKind::Item(ItemKind::Heart) => ("♥", rgb(255, 60, 90)),
        SpriteKind::Item(ItemKind::Rupee) => ("◆", rgb(80, 230, 120)),
        SpriteKind::Item(ItemKind::Key) => ("⚷", rgb(240, 200, 60)),
        SpriteKind::Item(ItemKind::Sword) => ("/", rgb(200, 200, 255)),
        SpriteKind::Item(ItemKind::HeartContainer) => ("♥+", rgb(255, 90, 120)),
        SpriteKind::Npc => ("&&", rgb(120, 200, 255)),
    };
    (glyph.to_string(), fg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::event::TransitionView;
    use crate::sim::door::AreaId;

    fn snap_with(transition: Option<TransitionView>) -> RenderSnapshot {
        RenderSnapshot {
            area: AreaId::Overworld { x: 0, y: 0 },
            sprites: vec![],
            transition,
            shake: false,
            flash: false,
            hud: Hud::default(),
            outcome: None,
        }
    }

    #[test]
    fn every_tile_glyph_is_two_columns() {
        for ch in "W.~TSF>DOw^v)(=pbrRuscCAkx8264*LIo0@BXti,-|HM#_!".chars() {
            let tile = Tile::from_char(ch).unwrap();
            assert_eq!(tile_style(tile).0.chars().count(), 2, "{tile:?}");
        }
    }

    #[test]
    fn scroll_origin_slides_from_direction() {
        let view = |amount| TransitionView { kind: TransitionKind::Scroll, amount, dir: (1, 0), from_screen: Some((0, 0)) };
        assert_eq!(scroll_origin(&snap_with(Some(view(0.0)))), (MAP_COLS as i32, 0));
        assert_eq!(scroll_origin(&snap_with(Some(view(0.5)))), (MAP_COLS as i32 / 2, 0));
        assert_eq!(scroll_origin(&snap_with(Some(view(1.0)))), (0, 0));

        let fade = TransitionView { kind: TransitionKind::Fade, amount: 0.7, dir: (0, 1), from_screen: None };
        assert_eq!(scroll_origin(&snap_with(Some(fade))), (0, 0));
        assert_eq!(scroll_origin(&snap_with(None)), (0, 0));
    }

    #[test]
    fn hearts_count_halves() {
        let h: Vec<char> = hearts(3, 6).into_iter().map(|(c, _)| c).collect();
        assert_eq!(h, vec!['♥', '♥', '♡']);
        assert_eq!(hearts(3, 6)[1].1, rgb(140, 30, 40));
        assert_eq!(hearts(0, 7).len(), 4);
    }

    #[test]
    fn boss_bar_rounds_up() {
        assert_eq!(bar(1, 8, 4), "█░░░");
        assert_eq!(bar(8, 8, 4), "████");
        assert_eq!(bar(0, 8, 4), "░░░░");
    }

    #[test]
    fn wrap_breaks_on_words() {
        assert_eq!(wrap("It's dangerous to go alone!", 12), vec!["It's", "dangerous to", "go alone!"]);
        assert_eq!(wrap("", 10), vec![String::new()]);
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn shade_scales_rgb_only() {
        assert_eq!(shade(rgb(100, 50, 0), 0.5), rgb(50, 25, 0));
        assert_eq!(shade(Color::White, 0.0), Color::White);
    }
}
