/// Gamepad input via gilrs.
///
/// Button roles come from the `[gamepad]` config section. Defaults:
///   D-pad / Left Stick  →  Movement
///   A / R1              →  Primary action (sword)
///   B / L1              →  Secondary action
///   X / Y               →  Interact
///   Start               →  Pause
///   Select              →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
#[cfg(feature = "gamepad")]
use tracing::info;
use tracing::warn;

use crate::config::GamepadConfig;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Face, shoulder and menu buttons.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

const BTN_COUNT: usize = 10;

impl Btn {
    pub fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "L2" | "LT" => Some(Btn::L2),
            "R2" | "RT" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        Some(match btn {
            Button::South => Btn::A,
            Button::East => Btn::B,
            Button::West => Btn::X,
            Button::North => Btn::Y,
            Button::LeftTrigger => Btn::L1,
            Button::RightTrigger => Btn::R1,
            Button::LeftTrigger2 => Btn::L2,
            Button::RightTrigger2 => Btn::R2,
            Button::Start => Btn::Start,
            Button::Select => Btn::Select,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Role → buttons.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionMap {
    pub primary: Vec<Btn>,
    pub secondary: Vec<Btn>,
    pub interact: Vec<Btn>,
    pub pause: Vec<Btn>,
    pub quit: Vec<Btn>,
}

impl ActionMap {
    /// Unknown names are logged and skipped; a role left empty keeps its
    /// default binding.
    pub fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse(role: &str, names: &[String], fallback: Vec<Btn>) -> Vec<Btn> {
            let btns: Vec<Btn> = names
                .iter()
                .filter_map(|n| {
                    let b = Btn::from_name(n);
                    if b.is_none() {
                        warn!(role, button = %n, "unknown gamepad button");
                    }
                    b
                })
                .collect();
            if btns.is_empty() { fallback } else { btns }
        }
        let d = ActionMap::default();
        ActionMap {
            primary: parse("attack", &cfg.attack, d.primary),
            secondary: parse("item", &cfg.item, d.secondary),
            interact: parse("interact", &cfg.interact, d.interact),
            pause: parse("pause", &cfg.pause, d.pause),
            quit: parse("quit", &cfg.quit, d.quit),
        }
    }
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            primary: vec![Btn::A, Btn::R1],
            secondary: vec![Btn::B, Btn::L1],
            interact: vec![Btn::X, Btn::Y],
            pause: vec![Btn::Start],
            quit: vec![Btn::Select],
        }
    }
}

// Directional slots: D-pad up/down/left/right, then stick up/down/left/right.
const DIR_UP: usize = 0;
const DIR_DOWN: usize = 1;
const DIR_LEFT: usize = 2;
const DIR_RIGHT: usize = 3;
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK: usize = 4;

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,
    buttons: [BtnState; BTN_COUNT],
    dirs: [BtnState; 8],
    stick: (f32, f32),
    map: ActionMap,
    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                if has_pad {
                    info!("gamepad detected");
                }
                (Some(g), has_pad)
            }
            Err(e) => {
                warn!("gamepad support unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            buttons: [BtnState::default(); BTN_COUNT],
            dirs: [BtnState::default(); 8],
            stick: (0.0, 0.0),
            map: ActionMap::from_config(cfg),
            connected,
        }
    }

    /// Poll once per frame before reading any query.
    pub fn update(&mut self) {
        for b in self.buttons.iter_mut().chain(self.dirs.iter_mut()) {
            b.just_pressed = false;
        }

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = &mut self.gilrs else {
            return;
        };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => self.set_button(btn, true),
                EventType::ButtonReleased(btn, _) => self.set_button(btn, false),
                EventType::AxisChanged(Axis::LeftStickX, v, _) => self.stick.0 = v,
                EventType::AxisChanged(Axis::LeftStickY, v, _) => self.stick.1 = v,
                EventType::Connected => self.connected = true,
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                    continue;
                }
                _ => continue,
            }
            self.connected = true;
        }

        let (sx, sy) = self.stick;
        self.dirs[STICK + DIR_UP].set(sy > STICK_DEADZONE);
        self.dirs[STICK + DIR_DOWN].set(sy < -STICK_DEADZONE);
        self.dirs[STICK + DIR_LEFT].set(sx < -STICK_DEADZONE);
        self.dirs[STICK + DIR_RIGHT].set(sx > STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, btn: Button, held: bool) {
        let slot = match btn {
            Button::DPadUp => Some(DIR_UP),
            Button::DPadDown => Some(DIR_DOWN),
            Button::DPadLeft => Some(DIR_LEFT),
            Button::DPadRight => Some(DIR_RIGHT),
            _ => None,
        };
        if let Some(i) = slot {
            self.dirs[i].set(held);
        } else if let Some(b) = Btn::from_gilrs(btn) {
            self.buttons[b as usize].set(held);
        }
    }

    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BTN_COUNT];
        self.dirs = [BtnState::default(); 8];
        self.stick = (0.0, 0.0);
    }

    // ── Queries ──

    fn pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    fn dir_held(&self, slot: usize) -> bool {
        self.dirs[slot].held || self.dirs[slot + 4].held
    }

    fn dir_pressed(&self, slot: usize) -> bool {
        self.dirs[slot].just_pressed || self.dirs[slot + 4].just_pressed
    }

    pub fn primary_pressed(&self) -> bool {
        self.pressed(&self.map.primary)
    }
    pub fn secondary_pressed(&self) -> bool {
        self.pressed(&self.map.secondary)
    }
    pub fn interact_pressed(&self) -> bool {
        self.pressed(&self.map.interact)
    }
    pub fn pause_pressed(&self) -> bool {
        self.pressed(&self.map.pause)
    }
    pub fn quit_pressed(&self) -> bool {
        self.pressed(&self.map.quit)
    }

    pub fn up_held(&self) -> bool {
        self.dir_held(DIR_UP)
    }
    pub fn down_held(&self) -> bool {
        self.dir_held(DIR_DOWN)
    }
    pub fn left_held(&self) -> bool {
        self.dir_held(DIR_LEFT)
    }
    pub fn right_held(&self) -> bool {
        self.dir_held(DIR_RIGHT)
    }

    /// Directions that went down this frame, as (dx, dy) unit steps.
    pub fn fresh_dirs(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        [(DIR_UP, (0, -1)), (DIR_DOWN, (0, 1)), (DIR_LEFT, (-1, 0)), (DIR_RIGHT, (1, 0))]
            .into_iter()
            .filter(|&(slot, _)| self.dir_pressed(slot))
            .map(|(_, d)| d)
    }
}
