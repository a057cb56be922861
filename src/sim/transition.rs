/// Screen transition state machine: Idle, Scrolling, Fading.
///
/// At most one transition runs at a time. Starting another while one is
/// active leaves the state untouched.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TransitionKind {
    Scroll,
    Fade,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Idle,
    Scrolling,
    Fading,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub active: bool,
    pub kind: TransitionKind,
    pub elapsed: f64,
    pub duration: f64,
    /// Scroll direction, one axis set to ±1.
    pub dir: (i32, i32),
    /// Overworld screen being left, kept for drawing the outgoing frame.
    pub from_screen: Option<(i32, i32)>,
}

/// Symmetric quadratic ease-in-out on `[0, 1]`.
pub fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u / 2.0
    }
}

impl Transition {
    pub fn new(duration: f64) -> Self {
        Transition {
            active: false,
            kind: TransitionKind::Fade,
            elapsed: 0.0,
            duration,
            dir: (0, 0),
            from_screen: None,
        }
    }

    pub fn phase(&self) -> Phase {
        match (self.active, self.kind) {
            (false, _) => Phase::Idle,
            (true, TransitionKind::Scroll) => Phase::Scrolling,
            (true, TransitionKind::Fade) => Phase::Fading,
        }
    }

    /// Begin scrolling. Returns false (and changes nothing) if busy.
    pub fn start_scroll(&mut self, dir: (i32, i32), from: (i32, i32)) -> bool {
        self.start(TransitionKind::Scroll, dir, Some(from))
    }

    pub fn start_fade(&mut self) -> bool {
        self.start(TransitionKind::Fade, (0, 0), None)
    }

    fn start(&mut self, kind: TransitionKind, dir: (i32, i32), from: Option<(i32, i32)>) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.kind = kind;
        self.elapsed = 0.0;
        self.dir = dir;
        self.from_screen = from;
        true
    }

    /// Advance by `dt`. Returns the kind that finished on this call, if any.
    pub fn advance(&mut self, dt: f64) -> Option<TransitionKind> {
        if !self.active {
            return None;
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.active = false;
            self.from_screen = None;
            return Some(self.kind);
        }
        None
    }

    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Eased slide fraction for Scroll.
    pub fn scroll_offset(&self) -> f64 {
        ease_in_out(self.progress())
    }

    /// 0 → 1 → 0 darkness envelope for Fade.
    pub fn fade_level(&self) -> f64 {
        let t = self.progress();
        if t < 0.5 { t * 2.0 } else { (1.0 - t) * 2.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_runs_to_completion() {
        let mut t = Transition::new(0.5);
        assert_eq!(t.phase(), Phase::Idle);
        assert!(t.start_scroll((1, 0), (1, 1)));
        assert_eq!(t.phase(), Phase::Scrolling);

        for _ in 0..7 {
            assert_eq!(t.advance(0.0625), None);
        }
        assert_eq!(t.advance(0.0625), Some(TransitionKind::Scroll));
        assert_eq!(t.phase(), Phase::Idle);
        assert_eq!(t.from_screen, None);
        assert_eq!(t.advance(0.0625), None);
    }

    #[test]
    fn second_start_is_a_noop() {
        let mut t = Transition::new(0.5);
        t.start_scroll((0, -1), (2, 2));
        t.advance(0.1);
        let before = t.clone();
        assert!(!t.start_fade());
        assert!(!t.start_scroll((1, 0), (0, 0)));
        assert_eq!(t, before);
    }

    #[test]
    fn ease_curve_is_symmetric() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(0.5), 0.5);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!((ease_in_out(0.25) - 0.125).abs() < 1e-12);
        assert!((ease_in_out(0.75) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn fade_envelope_peaks_midway() {
        let mut t = Transition::new(1.0);
        t.start_fade();
        assert_eq!(t.fade_level(), 0.0);
        t.advance(0.25);
        assert!((t.fade_level() - 0.5).abs() < 1e-12);
        t.advance(0.25);
        assert!((t.fade_level() - 1.0).abs() < 1e-12);
        t.advance(0.25);
        assert!((t.fade_level() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let mut t = Transition::new(0.0);
        t.start_fade();
        assert_eq!(t.progress(), 1.0);
        assert_eq!(t.advance(0.0), Some(TransitionKind::Fade));
    }
}
