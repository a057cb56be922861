/// Enemy AI: one decision function per `AiCategory`.
///
/// Per tick, for each live enemy:
///   1. Invincibility countdown.
///   2. Knockback, if active, moves the enemy and ends the tick; no AI runs.
///   3. The decision timer counts down, then the category routine runs.
///
/// All randomness comes from the shared `Rng`, in a fixed draw order, so a
/// seed replays the same decisions.
///
/// ## Boss
///
/// ```text
///   Wander ──timer, near & coin──▶ Charge ──timer──▶ Wander (1.0 s)
///     │                                              ▲
///     └──timer, in burst range──▶ Burst ──4 shots──▶─┘ (2.0 s)
/// ```

use tracing::debug;

use super::entity::{AiCategory, Body, BossPhase, Direction, Enemy, Projectile, ENEMY_WALK_FRAMES, ENEMY_WALK_FRAME_TIME};
use super::physics;
use super::rng::Rng;
use super::tile::TileGrid;

const BOSS_CHARGE_RANGE: f64 = 80.0;
const BOSS_BURST_RANGE: f64 = 120.0;
const BOSS_CHARGE_SPEED: f64 = 120.0;
const BOSS_CHARGE_TIME: f64 = 1.0;
const BOSS_AFTER_CHARGE: f64 = 1.0;
const BOSS_BURST_INTERVAL: f64 = 0.3;
const BOSS_BURST_SHOTS: u8 = 4;
const BOSS_AFTER_BURST: f64 = 2.0;

/// Shooter cooldown after a shot: `2.0 + (rng % 100) / 100` seconds.
const SHOOT_BASE: f64 = 2.0;
const SHOOT_STEPS: u32 = 100;

/// Aim is undefined closer than this.
const MIN_AIM_DIST: f64 = 0.01;

/// What the AI may read about the world this tick.
pub struct AiContext<'a> {
    pub grid: &'a TileGrid,
    pub player_center: (f64, f64),
    pub projectile_speed: f64,
}

/// Advance one enemy by `dt`. Returns a projectile if it fired.
pub fn update_enemy(e: &mut Enemy, ctx: &AiContext, rng: &mut Rng, dt: f64) -> Option<Projectile> {
    if e.dead {
        return None;
    }

    if e.inv_timer > 0.0 {
        e.inv_timer = (e.inv_timer - dt).max(0.0);
    }

    if e.knockback.is_active() {
        let r = e.knockback.advance(ctx.grid, e.rect(), dt);
        e.set_rect(r);
        return None;
    }

    e.ai_timer -= dt;

    match e.ai() {
        AiCategory::Wander => {
            if e.ai_timer <= 0.0 {
                wander_roll(e, rng);
            }
            walk(e, ctx.grid, dt);
            None
        }
        AiCategory::Chase { range } => {
            update_chaser(e, ctx, rng, dt, range);
            None
        }
        AiCategory::Shooter => update_shooter(e, ctx, rng, dt),
        AiCategory::Boss => update_boss(e, ctx, rng, dt),
    }
}

// ── Shared movement ──

/// New wander interval and heading. Kinds that may stop roll a fifth option.
fn wander_roll(e: &mut Enemy, rng: &mut Rng) {
    let def = e.kind.def();
    e.ai_timer = rng.timer(def.wander_base, def.wander_steps);
    let choices = if def.wander_stops { 5 } else { 4 };
    match Direction::ALL.get(rng.below(choices) as usize) {
        Some(&dir) => {
            e.dir = dir;
            e.moving = true;
        }
        None => e.moving = false,
    }
}

/// Step along the facing direction, staying inside the play area.
fn walk(e: &mut Enemy, grid: &TileGrid, dt: f64) {
    if e.moving {
        let dist = e.speed * dt;
        let r = physics::slide_within(grid, e.rect(), e.dir.dx() as f64 * dist, e.dir.dy() as f64 * dist);
        e.set_rect(r);
    }
    e.anim.update(e.moving, dt, ENEMY_WALK_FRAME_TIME, ENEMY_WALK_FRAMES);
}

/// Face the dominant axis of the displacement to the player.
fn face_player(e: &mut Enemy, player_center: (f64, f64)) {
    let (ex, ey) = e.center();
    let dx = player_center.0 - ex;
    let dy = player_center.1 - ey;
    e.dir = if dx.abs() > dy.abs() {
        if dx > 0.0 { Direction::Right } else { Direction::Left }
    } else if dy > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    };
}

/// A shot from the enemy's center toward the player, unless they coincide.
pub fn fire_at(e: &Enemy, player_center: (f64, f64), speed: f64) -> Option<Projectile> {
    let (cx, cy) = e.center();
    let (dx, dy) = physics::direction_to((cx, cy), player_center, MIN_AIM_DIST)?;
    Some(Projectile::enemy_shot(cx, cy, dx, dy, speed))
}

// ── Categories ──

fn update_chaser(e: &mut Enemy, ctx: &AiContext, rng: &mut Rng, dt: f64, range: f64) {
    let dist = physics::distance(e.center(), ctx.player_center);
    if dist < range {
        face_player(e, ctx.player_center);
        e.moving = true;
    } else if e.ai_timer <= 0.0 {
        wander_roll(e, rng);
    }
    walk(e, ctx.grid, dt);
}

fn update_shooter(e: &mut Enemy, ctx: &AiContext, rng: &mut Rng, dt: f64) -> Option<Projectile> {
    if e.ai_timer <= 0.0 {
        wander_roll(e, rng);
    }
    walk(e, ctx.grid, dt);

    e.shoot_timer -= dt;
    if e.shoot_timer > 0.0 {
        return None;
    }
    e.shoot_timer = rng.timer(SHOOT_BASE, SHOOT_STEPS);
    fire_at(e, ctx.player_center, ctx.projectile_speed)
}

fn update_boss(e: &mut Enemy, ctx: &AiContext, rng: &mut Rng, dt: f64) -> Option<Projectile> {
    match e.boss {
        BossPhase::Wander => {
            if e.ai_timer <= 0.0 && boss_decide(e, ctx, rng) {
                return None;
            }
            walk(e, ctx.grid, dt);
            None
        }
        BossPhase::Charge { dx, dy } => {
            if e.ai_timer <= 0.0 {
                e.boss = BossPhase::Wander;
                e.ai_timer = BOSS_AFTER_CHARGE;
                e.moving = false;
                debug!(x = e.x, y = e.y, "boss charge over");
                return None;
            }
            let step = BOSS_CHARGE_SPEED * dt;
            let r = physics::slide_within(ctx.grid, e.rect(), dx * step, dy * step);
            e.set_rect(r);
            e.moving = true;
            e.anim.update(true, dt, ENEMY_WALK_FRAME_TIME, ENEMY_WALK_FRAMES);
            None
        }
        BossPhase::Burst { fired } => {
            e.moving = false;
            e.anim.update(false, dt, ENEMY_WALK_FRAME_TIME, ENEMY_WALK_FRAMES);
            if fired >= BOSS_BURST_SHOTS {
                e.boss = BossPhase::Wander;
                e.ai_timer = BOSS_AFTER_BURST;
                debug!("boss burst over");
                return None;
            }
            if e.ai_timer > 0.0 {
                return None;
            }
            e.boss = BossPhase::Burst { fired: fired + 1 };
            e.ai_timer = BOSS_BURST_INTERVAL;
            fire_at(e, ctx.player_center, ctx.projectile_speed)
        }
    }
}

/// Decision point at the end of a wander interval. Returns true when the
/// boss left Wander (and so must not walk this tick).
fn boss_decide(e: &mut Enemy, ctx: &AiContext, rng: &mut Rng) -> bool {
    let def = e.kind.def();
    e.ai_timer = rng.timer(def.wander_base, def.wander_steps);
    let dist = physics::distance(e.center(), ctx.player_center);

    if dist < BOSS_CHARGE_RANGE && rng.below(2) == 0 {
        let (dx, dy) = physics::direction_to(e.center(), ctx.player_center, MIN_AIM_DIST).unwrap_or((0.0, 0.0));
        e.boss = BossPhase::Charge { dx, dy };
        e.ai_timer = BOSS_CHARGE_TIME;
        debug!(dx, dy, "boss charges");
        return true;
    }
    if dist < BOSS_BURST_RANGE {
        e.boss = BossPhase::Burst { fired: 0 };
        e.ai_timer = BOSS_BURST_INTERVAL;
        e.moving = false;
        debug!(dist, "boss burst");
        return true;
    }

    e.dir = Direction::ALL[rng.below(4) as usize];
    e.moving = true;
    false
}
