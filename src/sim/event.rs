/// Everything that crosses the simulation boundary each tick.
///
/// In: `InputIntent`. Out: `GameEvent`s (each may map to an `AudioCue`),
/// a terminal `Outcome` once reached, and a `RenderSnapshot` on demand.

use crate::domain::entity::{Direction, EnemyKind, ItemKind};

use super::door::AreaId;
use super::transition::TransitionKind;

/// One tick of player intent. Axes are -1, 0 or 1, already collapsed to the
/// last-pressed key per axis by the front-end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputIntent {
    pub move_x: i8,
    pub move_y: i8,
    pub interact: bool,
    pub primary: bool,
    pub secondary: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    SwordSwung { dir: Direction },
    EnemyHit { kind: EnemyKind },
    EnemyKilled { kind: EnemyKind, x: f64, y: f64 },
    ProjectileDeflected,
    PlayerHurt { hp: i32 },
    PlayerDied,
    ItemPicked { kind: ItemKind },
    DoorUnlocked { tile_x: i32, tile_y: i32 },
    Talk { npc: String, name: String, lines: Vec<String> },
    ScreenScroll { dx: i32, dy: i32 },
    DoorEntered { target: AreaId },
    AreaEntered { area: AreaId },
    BossDefeated,
}

/// Named sound triggers. No audio data crosses this boundary.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum AudioCue {
    SwordSwing,
    EnemyHit,
    EnemyDie,
    PlayerHit,
    ItemPickup,
    DoorOpen,
    GameOver,
}

impl GameEvent {
    pub fn cue(&self) -> Option<AudioCue> {
        match self {
            GameEvent::SwordSwung { .. } => Some(AudioCue::SwordSwing),
            GameEvent::EnemyHit { .. } => Some(AudioCue::EnemyHit),
            GameEvent::EnemyKilled { .. } => Some(AudioCue::EnemyDie),
            GameEvent::PlayerHurt { .. } => Some(AudioCue::PlayerHit),
            GameEvent::PlayerDied => Some(AudioCue::GameOver),
            GameEvent::ItemPicked { .. } => Some(AudioCue::ItemPickup),
            GameEvent::DoorUnlocked { .. } | GameEvent::DoorEntered { .. } => Some(AudioCue::DoorOpen),
            GameEvent::ProjectileDeflected
            | GameEvent::Talk { .. }
            | GameEvent::ScreenScroll { .. }
            | GameEvent::AreaEntered { .. }
            | GameEvent::BossDefeated => None,
        }
    }
}

/// Terminal simulation results. Once set, `step` does nothing further.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    GameOver,
    Victory,
}

// ══════════════════════════════════════════════════════════════
// Render snapshot
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SpriteKind {
    Player,
    Sword,
    Enemy(EnemyKind),
    Projectile,
    Item(ItemKind),
    Npc,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub facing: Direction,
    /// Walk frame, or swing progress scaled to 0..=3 for the sword.
    pub frame: u8,
    /// Invincibility flicker: draw nothing this frame.
    pub hidden: bool,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TransitionView {
    pub kind: TransitionKind,
    /// Eased slide fraction for Scroll, darkness envelope for Fade.
    pub amount: f64,
    pub dir: (i32, i32),
    pub from_screen: Option<(i32, i32)>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Hud {
    pub hp: i32,
    pub max_hp: i32,
    pub rupees: u32,
    pub keys: u32,
    pub has_sword: bool,
    /// (hp, max_hp) of a live boss in the active set.
    pub boss: Option<(i32, i32)>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct RenderSnapshot {
    pub area: AreaId,
    pub sprites: Vec<Sprite>,
    pub transition: Option<TransitionView>,
    pub shake: bool,
    pub flash: bool,
    pub hud: Hud,
    pub outcome: Option<Outcome>,
}
