/// Combat resolution: sword hits, knockback, projectiles, player damage.
///
/// Knockback travels a fixed distance over a fixed time. The last tick of a
/// knockback only integrates the time that was left, so the total
/// displacement is the configured distance whatever the frame rate.

use crate::config::CombatConfig;

use super::entity::{Body, Enemy, Player, Projectile};
use super::physics::{self, Rect};
use super::tile::{TileGrid, PLAY_AREA_H, PLAY_AREA_W};

/// Projectiles survive this far past the play area before despawning.
const PROJECTILE_MARGIN: f64 = 10.0;

/// Below this squared distance the hit direction is undefined.
const MIN_KNOCKBACK_DIST_SQ: f64 = 0.01;

// ══════════════════════════════════════════════════════════════
// Knockback
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Knockback {
    pub vx: f64,
    pub vy: f64,
    pub timer: f64,
}

impl Knockback {
    /// Push `target` directly away from `source`. Coincident centers push
    /// straight down.
    pub fn away_from(source: (f64, f64), target: (f64, f64), dist: f64, time: f64) -> Self {
        if time <= 0.0 {
            return Knockback::default();
        }
        let mut dx = target.0 - source.0;
        let mut dy = target.1 - source.1;
        let d2 = dx * dx + dy * dy;
        if d2 < MIN_KNOCKBACK_DIST_SQ {
            dx = 0.0;
            dy = 1.0;
        } else {
            let inv = 1.0 / physics::newton_sqrt(d2);
            dx *= inv;
            dy *= inv;
        }
        let speed = dist / time;
        Knockback { vx: dx * speed, vy: dy * speed, timer: time }
    }

    pub fn is_active(&self) -> bool {
        self.timer > 0.0
    }

    /// Integrate one tick and return the moved box. The push is clamped to
    /// the play area and resolved per axis against solid tiles.
    pub fn advance(&mut self, grid: &TileGrid, r: Rect, dt: f64) -> Rect {
        if !self.is_active() {
            return r;
        }
        let step = dt.min(self.timer);
        let goal = physics::clamp_to_play_area(r.at(r.x + self.vx * step, r.y + self.vy * step));
        self.timer -= dt;
        if self.timer <= 0.0 {
            *self = Knockback::default();
        }
        physics::slide(grid, r, goal.x - r.x, goal.y - r.y)
    }
}

// ══════════════════════════════════════════════════════════════
// Melee
// ══════════════════════════════════════════════════════════════

/// One enemy struck by a sword stroke.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SwordHit {
    pub index: usize,
    pub killed: bool,
}

/// Damage every live, non-invincible enemy under the active sword.
/// Returns the struck enemies in slice order.
pub fn resolve_sword(player: &Player, enemies: &mut [Enemy], cfg: &CombatConfig) -> Vec<SwordHit> {
    if !player.sword.active {
        return Vec::new();
    }
    let blade = player.sword.hitbox(&player.rect(), cfg.sword_reach, cfg.sword_width);
    let source = player.center();
    let mut hits = Vec::new();

    for (index, e) in enemies.iter_mut().enumerate() {
        if e.dead || e.is_invincible() || !blade.overlaps(&e.rect()) {
            continue;
        }
        e.hp -= 1;
        e.inv_timer = cfg.enemy_inv_time;
        e.knockback = Knockback::away_from(source, e.center(), cfg.knockback_dist, cfg.knockback_time);
        let killed = e.hp <= 0;
        if killed {
            e.dead = true;
        }
        hits.push(SwordHit { index, killed });
    }
    hits
}

/// Kill enemy projectiles touching the active sword. Returns how many.
pub fn deflect_projectiles(player: &Player, projectiles: &mut [Projectile], cfg: &CombatConfig) -> usize {
    if !player.sword.active {
        return 0;
    }
    let blade = player.sword.hitbox(&player.rect(), cfg.sword_reach, cfg.sword_width);
    let mut n = 0;
    for p in projectiles.iter_mut().filter(|p| !p.dead && p.from_enemy) {
        if blade.overlaps(&p.rect()) {
            p.dead = true;
            n += 1;
        }
    }
    n
}

// ══════════════════════════════════════════════════════════════
// Projectiles
// ══════════════════════════════════════════════════════════════

/// Fly one tick. Dies past the margin or on a solid tile.
pub fn advance_projectile(p: &mut Projectile, grid: &TileGrid, dt: f64) {
    if p.dead {
        return;
    }
    p.x += p.dx * p.speed * dt;
    p.y += p.dy * p.speed * dt;

    let outside = p.x < -PROJECTILE_MARGIN
        || p.x > PLAY_AREA_W + PROJECTILE_MARGIN
        || p.y < -PROJECTILE_MARGIN
        || p.y > PLAY_AREA_H + PROJECTILE_MARGIN;
    if outside || physics::tile_collision(grid, &p.rect()) {
        p.dead = true;
    }
}

/// First enemy projectile overlapping the player is consumed; its damage is
/// returned. Nothing happens while the player is invincible.
pub fn projectile_strike(player: &Player, projectiles: &mut [Projectile]) -> Option<i32> {
    if player.is_invincible() {
        return None;
    }
    let body = player.rect();
    let p = projectiles
        .iter_mut()
        .find(|p| !p.dead && p.from_enemy && body.overlaps(&p.rect()))?;
    p.dead = true;
    Some(p.damage)
}

// ══════════════════════════════════════════════════════════════
// Player damage
// ══════════════════════════════════════════════════════════════

/// Contact damage of the first live enemy touching the player, if any.
pub fn enemy_contact(player: &Player, enemies: &[Enemy]) -> Option<i32> {
    if player.is_invincible() {
        return None;
    }
    let body = player.rect();
    enemies
        .iter()
        .find(|e| !e.dead && body.overlaps(&e.rect()))
        .map(|e| e.kind.def().contact_damage)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Damage {
    Hurt,
    Killed,
}

/// Apply damage. A surviving player becomes invincible for a while; a killed
/// player is pinned at 0 HP.
pub fn damage_player(player: &mut Player, amount: i32, cfg: &CombatConfig) -> Damage {
    player.hp -= amount;
    if player.hp <= 0 {
        player.hp = 0;
        return Damage::Killed;
    }
    player.inv_timer = cfg.player_inv_time;
    Damage::Hurt
}
