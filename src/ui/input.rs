/// Keyboard state tracker.
///
/// Keeps which keys are held so movement is continuous, reports fresh
/// presses for one-shot actions, and resolves opposing directions per axis
/// to the most recently pressed one (`AxisLatch`).
///
/// When the terminal supports the kitty keyboard protocol, release events
/// are requested and a key stays held until its release arrives. Otherwise a key counts as released once
/// `HOLD_TIMEOUT` passes without a press or auto-repeat.

use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use tracing::{debug, info};

const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

#[derive(Clone, Copy, Debug)]
struct KeyState {
    seen: Instant,
}

pub struct InputState {
    keys: HashMap<KeyCode, KeyState>,
    fresh: Vec<KeyCode>,
    ctrl_c: bool,
    releases_reported: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            keys: HashMap::with_capacity(16),
            fresh: Vec::with_capacity(8),
            ctrl_c: false,
            releases_reported: false,
        }
    }

    /// Ask the terminal for press/release reporting. Returns whether it
    /// was granted; without it the hold timeout decides releases.
    pub fn request_release_events(&mut self) -> io::Result<bool> {
        if !terminal::supports_keyboard_enhancement().unwrap_or(false) {
            info!("keyboard enhancement unavailable; using hold timeout");
            return Ok(false);
        }
        execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
        self.releases_reported = true;
        info!("keyboard release events enabled");
        Ok(true)
    }

    /// Undo `request_release_events`. A no-op when it was never granted.
    pub fn restore_terminal(&mut self) -> io::Result<()> {
        if self.releases_reported {
            execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
            self.releases_reported = false;
        }
        Ok(())
    }

    /// Drain pending terminal events without blocking. Once per frame.
    pub fn drain_events(&mut self) {
        self.fresh.clear();
        self.ctrl_c = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.apply(key, Instant::now());
            }
        }

        if !self.releases_reported {
            let now = Instant::now();
            self.keys.retain(|_, k| now.duration_since(k.seen) < HOLD_TIMEOUT);
        }
    }

    fn live(&self, k: &KeyState, now: Instant) -> bool {
        self.releases_reported || now.duration_since(k.seen) < HOLD_TIMEOUT
    }

    fn apply(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c' | 'C')) {
            self.ctrl_c = true;
        }
        match key.kind {
            KeyEventKind::Release => {
                if self.releases_reported {
                    self.keys.remove(&key.code);
                }
            }
            _ => {
                let held = self.keys.get(&key.code).is_some_and(|k| self.live(k, now));
                if !held {
                    debug!(key = ?key.code, "key down");
                    self.fresh.push(key.code);
                }
                self.keys.insert(key.code, KeyState { seen: now });
            }
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.keys.get(&code).is_some_and(|k| self.live(k, Instant::now()))
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh.contains(c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.ctrl_c
    }
}

/// One movement axis. With both sides held, the side pressed last wins;
/// releasing it hands control back to the other.
#[derive(Clone, Copy, Debug, Default)]
pub struct AxisLatch {
    last: i8,
}

impl AxisLatch {
    pub fn resolve(&mut self, neg_held: bool, pos_held: bool, neg_fresh: bool, pos_fresh: bool) -> i8 {
        match (neg_fresh, pos_fresh) {
            (true, false) => self.last = -1,
            (false, true) => self.last = 1,
            _ => {}
        }
        self.last = match (neg_held, pos_held) {
            (true, true) => self.last,
            (true, false) => -1,
            (false, true) => 1,
            (false, false) => 0,
        };
        self.last
    }
}
