/// Entities: Player, Enemy, Projectile, Item, Npc.
/// Everything that occupies space implements `Body` (position, box, facing).
/// Per-entity countdowns (sword, invincibility, knockback) are plain scalars
/// cleared at zero.

use super::combat::Knockback;
use super::physics::Rect;
use super::quest::DialogueOption;

pub const PLAYER_SIZE: f64 = 14.0;
pub const ITEM_SIZE: f64 = 12.0;
pub const NPC_SIZE: f64 = 14.0;
pub const PROJECTILE_SIZE: f64 = 4.0;

pub const PLAYER_WALK_FRAME_TIME: f64 = 0.12;
pub const PLAYER_WALK_FRAMES: u8 = 4;
pub const ENEMY_WALK_FRAME_TIME: f64 = 0.15;
pub const ENEMY_WALK_FRAMES: u8 = 2;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Direction {
    #[default]
    Down,
    Up,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn dx(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            _ => 0,
        }
    }

    pub fn dy(self) -> i32 {
        match self {
            Direction::Up => -1,
            Direction::Down => 1,
            _ => 0,
        }
    }
}

/// Capability shared by every entity variant.
pub trait Body {
    fn rect(&self) -> Rect;
    fn facing(&self) -> Direction;

    fn center(&self) -> (f64, f64) {
        self.rect().center()
    }
}

/// Looping walk-cycle counter.
#[derive(Clone, Copy, Debug, Default)]
pub struct WalkAnim {
    pub frame: u8,
    timer: f64,
}

impl WalkAnim {
    pub fn update(&mut self, moving: bool, dt: f64, frame_time: f64, frames: u8) {
        if !moving {
            self.frame = 0;
            self.timer = 0.0;
            return;
        }
        self.timer += dt;
        if self.timer >= frame_time {
            self.timer -= frame_time;
            self.frame = (self.frame + 1) % frames.max(1);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Sword
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default)]
pub struct SwordSwing {
    pub active: bool,
    pub timer: f64,
    pub duration: f64,
    pub dir: Direction,
}

impl SwordSwing {
    pub fn start(&mut self, dir: Direction, duration: f64) {
        *self = SwordSwing { active: true, timer: 0.0, duration, dir };
    }

    pub fn update(&mut self, dt: f64) {
        if !self.active {
            return;
        }
        self.timer += dt;
        if self.timer >= self.duration {
            self.active = false;
        }
    }

    /// 0 → 1 through the swing.
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.timer / self.duration).min(1.0)
    }

    /// Blade rectangle projected from the wielder's box, centered across the
    /// facing side.
    pub fn hitbox(&self, owner: &Rect, reach: f64, width: f64) -> Rect {
        let Rect { x, y, w, h } = *owner;
        match self.dir {
            Direction::Up => Rect::new(x + (w - width) / 2.0, y - reach, width, reach),
            Direction::Down => Rect::new(x + (w - width) / 2.0, y + h, width, reach),
            Direction::Left => Rect::new(x - reach, y + (h - width) / 2.0, reach, width),
            Direction::Right => Rect::new(x + w, y + (h - width) / 2.0, reach, width),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

/// What an action button is bound to.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, serde::Serialize, serde::Deserialize)]
pub enum Equip {
    #[default]
    None,
    Sword,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Inventory {
    pub rupees: u32,
    pub keys: u32,
    pub sword_level: u8,
    pub button_a: Equip,
    pub button_b: Equip,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f64,
    pub y: f64,
    pub dir: Direction,
    pub speed: f64,
    pub hp: i32,
    pub max_hp: i32,
    pub moving: bool,
    pub anim: WalkAnim,
    pub sword: SwordSwing,
    pub inv_timer: f64,
    pub inventory: Inventory,
}

impl Player {
    pub fn new(x: f64, y: f64, speed: f64, max_hp: i32) -> Self {
        Player {
            x,
            y,
            dir: Direction::Down,
            speed,
            hp: max_hp,
            max_hp,
            moving: false,
            anim: WalkAnim::default(),
            sword: SwordSwing::default(),
            inv_timer: 0.0,
            inventory: Inventory::default(),
        }
    }

    pub fn set_rect(&mut self, r: Rect) {
        self.x = r.x;
        self.y = r.y;
    }

    pub fn has_sword(&self) -> bool {
        self.inventory.sword_level > 0
    }

    pub fn is_invincible(&self) -> bool {
        self.inv_timer > 0.0
    }
}

impl Body for Player {
    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, PLAYER_SIZE, PLAYER_SIZE)
    }

    fn facing(&self) -> Direction {
        self.dir
    }
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

/// Behaviour tag; `ai::update_enemy` dispatches on it.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AiCategory {
    /// Random cardinal walks, nothing else.
    Wander,
    /// Walks toward the player when within range, wanders otherwise.
    Chase { range: f64 },
    /// Wanders and fires at the player on a cooldown.
    Shooter,
    /// Multi-phase state machine (see `BossPhase`).
    Boss,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub enum EnemyKind {
    Octorok,
    Moblin,
    Stalfos,
    Boss,
    Keese,
    Gel,
    Zol,
}

/// Static per-kind definition.
#[derive(Clone, Copy, Debug)]
pub struct EnemyDef {
    pub name: &'static str,
    pub size: f64,
    pub hp: i32,
    pub speed: f64,
    pub ai: AiCategory,
    /// Delay before the first shot; 0 for kinds that never shoot.
    pub first_shot: f64,
    pub contact_damage: i32,
    /// Wander re-decision interval: `base + (rng % steps) / 100` seconds.
    pub wander_base: f64,
    pub wander_steps: u32,
    /// A wander roll may pick "stand still" as a fifth option.
    pub wander_stops: bool,
}

impl EnemyKind {
    pub fn def(self) -> EnemyDef {
        use EnemyKind::*;
        match self {
            Octorok => EnemyDef {
                name: "Octorok",
                size: 14.0,
                hp: 2,
                speed: 30.0,
                ai: AiCategory::Shooter,
                first_shot: 2.0,
                contact_damage: 1,
                wander_base: 1.0,
                wander_steps: 200,
                wander_stops: false,
            },
            Moblin => EnemyDef {
                name: "Moblin",
                size: 14.0,
                hp: 3,
                speed: 35.0,
                ai: AiCategory::Chase { range: 80.0 },
                first_shot: 0.0,
                contact_damage: 1,
                wander_base: 1.0,
                wander_steps: 200,
                wander_stops: true,
            },
            Stalfos => EnemyDef {
                name: "Stalfos",
                size: 14.0,
                hp: 2,
                speed: 45.0,
                ai: AiCategory::Chase { range: 48.0 },
                first_shot: 0.0,
                contact_damage: 1,
                wander_base: 0.5,
                wander_steps: 150,
                wander_stops: false,
            },
            Boss => EnemyDef {
                name: "Boss",
                size: 20.0,
                hp: 10,
                speed: 25.0,
                ai: AiCategory::Boss,
                first_shot: 0.0,
                contact_damage: 2,
                wander_base: 3.0,
                wander_steps: 100,
                wander_stops: false,
            },
            Keese => EnemyDef {
                name: "Keese",
                size: 12.0,
                hp: 1,
                speed: 50.0,
                ai: AiCategory::Wander,
                first_shot: 0.0,
                contact_damage: 1,
                wander_base: 0.5,
                wander_steps: 100,
                wander_stops: false,
            },
            Gel => EnemyDef {
                name: "Gel",
                size: 10.0,
                hp: 1,
                speed: 20.0,
                ai: AiCategory::Chase { range: 40.0 },
                first_shot: 0.0,
                contact_damage: 1,
                wander_base: 1.0,
                wander_steps: 200,
                wander_stops: true,
            },
            Zol => EnemyDef {
                name: "Zol",
                size: 14.0,
                hp: 2,
                speed: 15.0,
                ai: AiCategory::Chase { range: 48.0 },
                first_shot: 0.0,
                contact_damage: 1,
                wander_base: 1.0,
                wander_steps: 200,
                wander_stops: true,
            },
        }
    }

    pub fn from_name(name: &str) -> Option<EnemyKind> {
        use EnemyKind::*;
        [Octorok, Moblin, Stalfos, Boss, Keese, Gel, Zol]
            .into_iter()
            .find(|k| k.def().name.eq_ignore_ascii_case(name))
    }
}

/// Boss state machine. Charge keeps the unit vector captured when it began.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum BossPhase {
    #[default]
    Wander,
    Charge { dx: f64, dy: f64 },
    Burst { fired: u8 },
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub dir: Direction,
    pub speed: f64,
    pub hp: i32,
    pub max_hp: i32,
    pub inv_timer: f64,
    pub knockback: Knockback,
    pub ai_timer: f64,
    pub shoot_timer: f64,
    pub moving: bool,
    pub dead: bool,
    pub anim: WalkAnim,
    pub boss: BossPhase,
}

impl Enemy {
    pub fn new(kind: EnemyKind, x: f64, y: f64) -> Self {
        let def = kind.def();
        Enemy {
            kind,
            x,
            y,
            size: def.size,
            dir: Direction::Down,
            speed: def.speed,
            hp: def.hp,
            max_hp: def.hp,
            inv_timer: 0.0,
            knockback: Knockback::default(),
            ai_timer: 0.0,
            shoot_timer: def.first_shot,
            moving: false,
            dead: false,
            anim: WalkAnim::default(),
            boss: BossPhase::Wander,
        }
    }

    pub fn set_rect(&mut self, r: Rect) {
        self.x = r.x;
        self.y = r.y;
    }

    pub fn ai(&self) -> AiCategory {
        self.kind.def().ai
    }

    pub fn is_invincible(&self) -> bool {
        self.inv_timer > 0.0
    }
}

impl Body for Enemy {
    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }

    fn facing(&self) -> Direction {
        self.dir
    }
}

// ══════════════════════════════════════════════════════════════
// Projectiles, items, NPCs
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct Projectile {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub speed: f64,
    pub damage: i32,
    pub from_enemy: bool,
    pub dead: bool,
}

impl Projectile {
    /// Enemy shot centered on `(cx, cy)` travelling along unit `(dx, dy)`.
    pub fn enemy_shot(cx: f64, cy: f64, dx: f64, dy: f64, speed: f64) -> Self {
        Projectile {
            x: cx,
            y: cy,
            dx,
            dy,
            speed,
            damage: 1,
            from_enemy: true,
            dead: false,
        }
    }

    fn dir_facing(&self) -> Direction {
        if self.dx.abs() > self.dy.abs() {
            if self.dx > 0.0 { Direction::Right } else { Direction::Left }
        } else if self.dy < 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

impl Body for Projectile {
    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, PROJECTILE_SIZE, PROJECTILE_SIZE)
    }

    fn facing(&self) -> Direction {
        self.dir_facing()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub enum ItemKind {
    Heart,
    Rupee,
    Key,
    Sword,
    HeartContainer,
}

impl ItemKind {
    pub fn from_name(name: &str) -> Option<ItemKind> {
        match name.to_ascii_lowercase().as_str() {
            "heart" => Some(ItemKind::Heart),
            "rupee" => Some(ItemKind::Rupee),
            "key" => Some(ItemKind::Key),
            "sword" => Some(ItemKind::Sword),
            "heart_container" | "heartcontainer" => Some(ItemKind::HeartContainer),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Item {
    pub kind: ItemKind,
    pub x: f64,
    pub y: f64,
    pub collected: bool,
    /// Index into the area's item spawn table; `None` for enemy drops,
    /// which are never persisted.
    pub spawn_index: Option<usize>,
    pub bob_timer: f64,
}

impl Item {
    pub fn new(kind: ItemKind, x: f64, y: f64, spawn_index: Option<usize>) -> Self {
        Item { kind, x, y, collected: false, spawn_index, bob_timer: 0.0 }
    }

    /// Vertical bob for presentation, in pixels.
    pub fn bob_offset(&self) -> f64 {
        (self.bob_timer * 4.0).sin()
    }
}

impl Body for Item {
    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, ITEM_SIZE, ITEM_SIZE)
    }

    fn facing(&self) -> Direction {
        Direction::Down
    }
}

#[derive(Clone, Debug)]
pub struct Npc {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub dir: Direction,
    pub lines: Vec<String>,
    /// Checked in order before falling back to `lines`.
    pub options: Vec<DialogueOption>,
}

impl Body for Npc {
    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, NPC_SIZE, NPC_SIZE)
    }

    fn facing(&self) -> Direction {
        self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_box() -> Rect {
        Rect::new(100.0, 100.0, 14.0, 14.0)
    }

    #[test]
    fn sword_hitbox_per_direction() {
        let mut s = SwordSwing::default();
        let p = player_box();

        s.start(Direction::Up, 0.25);
        assert_eq!(s.hitbox(&p, 14.0, 8.0), Rect::new(103.0, 86.0, 8.0, 14.0));
        s.start(Direction::Down, 0.25);
        assert_eq!(s.hitbox(&p, 14.0, 8.0), Rect::new(103.0, 114.0, 8.0, 14.0));
        s.start(Direction::Left, 0.25);
        assert_eq!(s.hitbox(&p, 14.0, 8.0), Rect::new(86.0, 103.0, 14.0, 8.0));
        s.start(Direction::Right, 0.25);
        assert_eq!(s.hitbox(&p, 14.0, 8.0), Rect::new(114.0, 103.0, 14.0, 8.0));
    }

    #[test]
    fn sword_swing_expires() {
        let mut s = SwordSwing::default();
        s.start(Direction::Right, 0.25);
        s.update(0.1);
        assert!(s.active);
        assert!((s.progress() - 0.4).abs() < 1e-9);
        s.update(0.2);
        assert!(!s.active);
        assert_eq!(s.progress(), 1.0);
    }

    #[test]
    fn walk_anim_cycles_and_resets() {
        let mut a = WalkAnim::default();
        for _ in 0..4 {
            a.update(true, 0.13, PLAYER_WALK_FRAME_TIME, PLAYER_WALK_FRAMES);
        }
        assert_eq!(a.frame, 0);
        a.update(true, 0.13, PLAYER_WALK_FRAME_TIME, PLAYER_WALK_FRAMES);
        assert_eq!(a.frame, 1);
        a.update(false, 0.13, PLAYER_WALK_FRAME_TIME, PLAYER_WALK_FRAMES);
        assert_eq!(a.frame, 0);
    }

    #[test]
    fn registry_values() {
        let boss = Enemy::new(EnemyKind::Boss, 0.0, 0.0);
        assert_eq!(boss.hp, 10);
        assert_eq!(boss.rect().w, 20.0);
        assert_eq!(EnemyKind::Boss.def().contact_damage, 2);

        let octo = Enemy::new(EnemyKind::Octorok, 0.0, 0.0);
        assert_eq!(octo.shoot_timer, 2.0);
        assert_eq!(octo.ai(), AiCategory::Shooter);
        assert_eq!(EnemyKind::Moblin.def().ai, AiCategory::Chase { range: 80.0 });
    }

    #[test]
    fn names_resolve() {
        assert_eq!(EnemyKind::from_name("stalfos"), Some(EnemyKind::Stalfos));
        assert_eq!(EnemyKind::from_name("dragon"), None);
        assert_eq!(ItemKind::from_name("heart_container"), Some(ItemKind::HeartContainer));
    }
}
