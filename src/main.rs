/// Entry point and frame loop.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tilequest::config::GameConfig;
use tilequest::sim::event::{GameEvent, InputIntent};
use tilequest::sim::level::{self, LevelError};
use tilequest::sim::save::{self, FileProgress};
use tilequest::sim::step::step;
use tilequest::sim::world::{WorldDef, WorldState};
use tilequest::ui::gamepad::GamepadState;
use tilequest::ui::input::{AxisLatch, InputState};
use tilequest::ui::renderer::{Overlay, Renderer};
use tilequest::ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();
    init_logging(&config.general.log_file);

    let def = match load_world(&config) {
        Ok(def) => def,
        Err(e) => {
            error!("{e}");
            eprintln!("Could not load world: {e}");
            return;
        }
    };

    let progress = FileProgress::open_or_fresh(save::save_path(&config.general.save_file));
    info!(save = %progress.path().display(), "progress store ready");
    let mut world = WorldState::new(def, &config, Box::new(progress));
    if world.restore() {
        info!(area = %world.area_id(), "resuming saved game");
    }

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let mut kb = InputState::new();
    if let Err(e) = kb.request_release_events() {
        warn!("keyboard enhancement: {e}");
    }

    let sound = SoundEngine::new();
    let result = game_loop(&mut world, &mut renderer, &mut kb, sound.as_ref(), &config);
    world.record_player();

    if let Err(e) = kb.restore_terminal() {
        warn!("keyboard restore: {e}");
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        error!("game loop: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing TileQuest!");
    let inv = world.player.inventory;
    println!("Rupees: {}   Keys: {}", inv.rupees, inv.keys);
}

/// Logs go to a file; the terminal belongs to the renderer.
fn init_logging(path: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match File::create(path) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .init();
        }
        Err(e) => eprintln!("Logging disabled ({path}: {e})"),
    }
}

fn load_world(config: &GameConfig) -> Result<WorldDef, LevelError> {
    let file = config.general.world_file.trim();
    if file.is_empty() {
        return level::builtin_world();
    }
    match level::load_world_file(Path::new(file)) {
        Ok(def) => Ok(def),
        Err(LevelError::Io(e)) => {
            warn!(path = file, "world file unreadable ({e}); using built-in world");
            level::builtin_world()
        }
        Err(e) => Err(e),
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_PRIMARY: &[KeyCode] = &[KeyCode::Char('z'), KeyCode::Char('Z'), KeyCode::Char(' ')];
const KEYS_SECONDARY: &[KeyCode] = &[KeyCode::Char('x'), KeyCode::Char('X')];
const KEYS_INTERACT: &[KeyCode] = &[KeyCode::Char('e'), KeyCode::Char('E'), KeyCode::Enter];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P'), KeyCode::Esc];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

/// An open conversation. The simulation is frozen while one is showing.
struct Dialog {
    name: String,
    lines: Vec<String>,
    index: usize,
}

/// Edge-triggered actions seen since the last tick.
#[derive(Default)]
struct Pending {
    interact: bool,
    primary: bool,
    secondary: bool,
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    kb: &mut InputState,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut gp = GamepadState::new(&config.gamepad);
    let mut axis_x = AxisLatch::default();
    let mut axis_y = AxisLatch::default();
    let tick_rate = Duration::from_millis(config.general.tick_rate_ms.max(1));
    let mut last_tick = Instant::now();

    let mut pending = Pending::default();
    let mut dialog: Option<Dialog> = None;
    let mut paused = false;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
            break;
        }
        let interact = kb.any_pressed(KEYS_INTERACT) || gp.interact_pressed();
        let primary = kb.any_pressed(KEYS_PRIMARY) || gp.primary_pressed();
        let secondary = kb.any_pressed(KEYS_SECONDARY) || gp.secondary_pressed();

        if world.outcome.is_some() {
            if interact {
                break;
            }
        } else if let Some(d) = &mut dialog {
            if interact || primary {
                d.index += 1;
                if d.index >= d.lines.len() {
                    dialog = None;
                }
            }
        } else if kb.any_pressed(KEYS_PAUSE) || gp.pause_pressed() {
            paused = !paused;
            info!(paused, "pause toggled");
        } else if !paused {
            pending.interact |= interact;
            pending.primary |= primary;
            pending.secondary |= secondary;
        }

        let pad_fresh: Vec<(i8, i8)> = gp.fresh_dirs().collect();
        let pad = |d: (i8, i8)| pad_fresh.contains(&d);
        let move_x = axis_x.resolve(
            kb.any_held(KEYS_LEFT) || gp.left_held(),
            kb.any_held(KEYS_RIGHT) || gp.right_held(),
            kb.any_pressed(KEYS_LEFT) || pad((-1, 0)),
            kb.any_pressed(KEYS_RIGHT) || pad((1, 0)),
        );
        let move_y = axis_y.resolve(
            kb.any_held(KEYS_UP) || gp.up_held(),
            kb.any_held(KEYS_DOWN) || gp.down_held(),
            kb.any_pressed(KEYS_UP) || pad((0, -1)),
            kb.any_pressed(KEYS_DOWN) || pad((0, 1)),
        );

        let elapsed = last_tick.elapsed();
        if elapsed >= tick_rate {
            last_tick = Instant::now();
            if !paused && dialog.is_none() {
                let intent = InputIntent {
                    move_x,
                    move_y,
                    interact: pending.interact,
                    primary: pending.primary,
                    secondary: pending.secondary,
                };
                pending = Pending::default();

                for event in step(world, &intent, elapsed.as_secs_f64()) {
                    if let (Some(sfx), Some(cue)) = (sound, event.cue()) {
                        sfx.play(cue);
                    }
                    if let GameEvent::Talk { name, lines, .. } = event {
                        if !lines.is_empty() {
                            dialog = Some(Dialog { name, lines, index: 0 });
                        }
                    }
                }
            }
        }

        let overlay = match &dialog {
            Some(d) => Overlay::Dialog {
                name: &d.name,
                line: &d.lines[d.index],
                more: d.index + 1 < d.lines.len(),
            },
            None if paused => Overlay::Paused,
            None => Overlay::None,
        };
        renderer.render(world, &overlay)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}
