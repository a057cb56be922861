/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Transition (exclusive: nothing else runs while one is active)
///   2. Timers (shake, flash, sword, player invincibility)
///   3. Interaction (talk, unlock)
///   4. Action buttons (sword swing)
///   5. Melee and deflection
///   6. Player movement, edge crossing, door entry
///   7. Enemy AI and projectiles
///   8. Items: bob and pickup
///   9. Damage to the player
///  10. Player animation
///
/// dt is clamped to `[0, max_dt]` before anything reads it. Starting a
/// transition, talking, unlocking a door or reaching a terminal outcome ends
/// the tick early.

use tracing::{debug, info};

use crate::domain::ai::{self, AiContext};
use crate::domain::combat::{self, Damage};
use crate::domain::entity::{Body, Direction, EnemyKind, Equip, Item, ItemKind, Player, PLAYER_WALK_FRAMES, PLAYER_WALK_FRAME_TIME};
use crate::domain::physics;
use crate::domain::quest;
use crate::domain::tile::{Tile, PLAY_AREA_H, PLAY_AREA_W, TILE_SIZE};

use super::door::{AreaId, LinkTarget};
use super::event::{GameEvent, InputIntent, Outcome};
use super::progress::{DoorKey, ItemKey};
use super::transition::TransitionKind;
use super::world::{PendingSwap, WorldState};

/// Enemy death drops: roll below 25 is a heart, below 50 a rupee.
const DROP_HEART_BELOW: u32 = 25;
const DROP_RUPEE_BELOW: u32 = 50;

const HEART_HEAL: i32 = 2;
const CONTAINER_HP: i32 = 2;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: &InputIntent, dt: f64) -> Vec<GameEvent> {
    if world.outcome.is_some() {
        return vec![];
    }
    let dt = if dt.is_finite() { dt.clamp(0.0, world.sim.max_dt) } else { 0.0 };

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    if world.transition.active {
        resolve_transition(world, dt, &mut events);
        return events;
    }

    resolve_timers(world, dt);
    if resolve_interact(world, input, &mut events) { return events; }
    resolve_actions(world, input, &mut events);
    if resolve_melee(world, &mut events) { return events; }
    resolve_deflect(world, &mut events);
    if resolve_player_movement(world, input, dt, &mut events) { return events; }
    if resolve_door_entry(world, &mut events) { return events; }
    resolve_enemies(world, dt);
    resolve_projectiles(world, dt);
    resolve_items(world, dt, &mut events);
    if resolve_player_damage(world, &mut events) { return events; }

    let p = &mut world.player;
    p.anim.update(p.moving, dt, PLAYER_WALK_FRAME_TIME, PLAYER_WALK_FRAMES);

    events
}

// ══════════════════════════════════════════════════════════════
// Transition
// ══════════════════════════════════════════════════════════════

fn resolve_transition(world: &mut WorldState, dt: f64, events: &mut Vec<GameEvent>) {
    if world.transition.advance(dt) == Some(TransitionKind::Fade) {
        if let Some(area) = world.commit_swap() {
            events.push(GameEvent::AreaEntered { area });
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Timers
// ══════════════════════════════════════════════════════════════

fn tick_down(t: &mut f64, dt: f64) {
    if *t > 0.0 {
        *t = (*t - dt).max(0.0);
    }
}

fn resolve_timers(world: &mut WorldState, dt: f64) {
    tick_down(&mut world.shake_timer, dt);
    tick_down(&mut world.flash_timer, dt);
    world.player.sword.update(dt);
    tick_down(&mut world.player.inv_timer, dt);
}

// ══════════════════════════════════════════════════════════════
// Interaction
// ══════════════════════════════════════════════════════════════

/// Talk to the first NPC in range, else try the faced door.
/// Returns true (ending the tick) if either happened.
fn resolve_interact(world: &mut WorldState, input: &InputIntent, events: &mut Vec<GameEvent>) -> bool {
    if !input.interact {
        return false;
    }

    let me = world.player.center();
    let radius = world.combat.interact_radius;
    let Some(npc) = world.active.npcs.iter().find(|n| physics::distance(me, n.center()) <= radius) else {
        return try_unlock_door(world, events);
    };

    let progress = &world.progress;
    let lines = quest::pick_dialogue(&npc.options, &npc.lines, |f| progress.has_flag(f), &world.player.inventory);
    let talk = GameEvent::Talk { npc: npc.id.clone(), name: npc.name.clone(), lines: lines.to_vec() };
    let flag = quest::met_flag(&npc.id);
    debug!(npc = %npc.id, "talk");

    world.progress.set_flag(&flag);
    events.push(talk);
    true
}

/// Open the locked door the player faces, spending a key.
fn try_unlock_door(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    if world.player.inventory.keys == 0 {
        return false;
    }
    let (tx, ty) = center_tile(&world.player);
    let dir = world.player.dir;
    let (fx, fy) = (tx + dir.dx(), ty + dir.dy());
    if world.current_grid().tile_at(fx, fy) != Tile::DoorLocked {
        return false;
    }

    world.set_tile(fx, fy, Tile::DoorOpen);
    world.player.inventory.keys -= 1;
    let key = DoorKey::new(&world.area_id(), fx, fy);
    info!(door = %key, "door unlocked");
    world.progress.mark_door_unlocked(key);
    world.record_player();
    events.push(GameEvent::DoorUnlocked { tile_x: fx, tile_y: fy });
    true
}

fn center_tile(p: &Player) -> (i32, i32) {
    let (cx, cy) = p.center();
    ((cx / TILE_SIZE).floor() as i32, (cy / TILE_SIZE).floor() as i32)
}

// ══════════════════════════════════════════════════════════════
// Actions and melee
// ══════════════════════════════════════════════════════════════

fn resolve_actions(world: &mut WorldState, input: &InputIntent, events: &mut Vec<GameEvent>) {
    let p = &mut world.player;
    if p.sword.active {
        return;
    }
    let pressed = [(input.primary, p.inventory.button_a), (input.secondary, p.inventory.button_b)];
    for (down, equip) in pressed {
        if down && use_equip(p, equip, world.combat.sword_duration) {
            events.push(GameEvent::SwordSwung { dir: p.dir });
            return;
        }
    }
}

/// Returns true if the equipment did something.
fn use_equip(p: &mut Player, equip: Equip, sword_duration: f64) -> bool {
    match equip {
        Equip::Sword if p.has_sword() => {
            p.sword.start(p.dir, sword_duration);
            true
        }
        Equip::Sword | Equip::None => false,
    }
}

/// Returns true when the boss died.
fn resolve_melee(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    let hits = combat::resolve_sword(&world.player, &mut world.active.enemies, &world.combat);
    for hit in hits {
        let e = &world.active.enemies[hit.index];
        let (kind, x, y) = (e.kind, e.x, e.y);
        if !hit.killed {
            events.push(GameEvent::EnemyHit { kind });
            continue;
        }

        debug!(enemy = kind.def().name, x, y, "enemy killed");
        events.push(GameEvent::EnemyKilled { kind, x, y });
        if kind == EnemyKind::Boss {
            world.outcome = Some(Outcome::Victory);
            world.record_player();
            info!("boss defeated");
            events.push(GameEvent::BossDefeated);
            return true;
        }
        roll_drop(world, x, y);
    }
    world.active.enemies.retain(|e| !e.dead);
    false
}

fn roll_drop(world: &mut WorldState, x: f64, y: f64) {
    let roll = world.rng.below(100);
    let kind = if roll < DROP_HEART_BELOW {
        ItemKind::Heart
    } else if roll < DROP_RUPEE_BELOW {
        ItemKind::Rupee
    } else {
        return;
    };
    world.active.items.push(Item::new(kind, x, y, None));
}

fn resolve_deflect(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let n = combat::deflect_projectiles(&world.player, &mut world.active.projectiles, &world.combat);
    for _ in 0..n {
        events.push(GameEvent::ProjectileDeflected);
    }
}

// ══════════════════════════════════════════════════════════════
// Player movement and navigation
// ══════════════════════════════════════════════════════════════

/// Returns true when a scroll started.
fn resolve_player_movement(world: &mut WorldState, input: &InputIntent, dt: f64, events: &mut Vec<GameEvent>) -> bool {
    let ix = input.move_x.signum();
    let iy = input.move_y.signum();
    let p = &mut world.player;
    p.moving = ix != 0 || iy != 0;
    if !p.moving {
        return false;
    }

    p.dir = match (ix, iy) {
        (1, _) => Direction::Right,
        (-1, _) => Direction::Left,
        (_, -1) => Direction::Up,
        _ => Direction::Down,
    };

    let speed = world.player.speed;
    let (moved, crossing) = physics::move_entity(world.current_grid(), world.player.rect(), ix as f64, iy as f64, speed, dt);
    if world.in_interior() {
        world.player.set_rect(physics::clamp_to_play_area(moved));
        return false;
    }
    world.player.set_rect(moved);
    match crossing.honored() {
        Some((dx, dy)) => cross_edge(world, dx, dy, events),
        None => false,
    }
}

/// Scroll to the neighbouring screen, or stop at the edge of the mapped world.
fn cross_edge(world: &mut WorldState, dx: i32, dy: i32, events: &mut Vec<GameEvent>) -> bool {
    if !world.overworld.can_move(dx, dy) {
        let r = physics::clamp_to_play_area(world.player.rect());
        world.player.set_rect(r);
        return false;
    }

    let from = world.overworld.cursor();
    world.overworld.move_by(dx, dy);

    let r = world.player.rect();
    let p = &mut world.player;
    match dx {
        1 => p.x = 1.0,
        -1 => p.x = PLAY_AREA_W - r.w - 1.0,
        _ => {}
    }
    match dy {
        1 => p.y = 1.0,
        -1 => p.y = PLAY_AREA_H - r.h - 1.0,
        _ => {}
    }

    world.transition.start_scroll((dx, dy), from);
    world.respawn();
    world.record_player();
    info!(from = ?from, to = ?world.overworld.cursor(), "screen scroll");
    events.push(GameEvent::ScreenScroll { dx, dy });
    true
}

/// Standing on a doorway with a link starts a fade. Returns true if one did.
fn resolve_door_entry(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    let (tx, ty) = center_tile(&world.player);
    if !world.current_grid().tile_at(tx, ty).is_doorway() {
        return false;
    }

    let area = world.area_id();
    let enter = world.doors.resolve(&area, tx, ty).and_then(|link| match &link.target {
        LinkTarget::Interior(id) if world.interiors.contains_key(id) => Some(PendingSwap::Enter(link.clone())),
        _ => None,
    });
    // Inside, every other doorway leads back out: overworld links, links to
    // a missing interior, and unlinked doorways.
    let swap = match enter {
        Some(swap) => Some(swap),
        None if world.in_interior() => exit_swap(world),
        None => None,
    };
    let Some(swap) = swap else {
        return false;
    };
    let target = match &swap {
        PendingSwap::Enter(link) => match &link.target {
            LinkTarget::Interior(id) => AreaId::Interior(id.clone()),
            LinkTarget::Overworld => area.clone(),
        },
        PendingSwap::Exit => world.return_link.as_ref().map_or(area.clone(), |l| l.area.clone()),
    };

    if !world.transition.start_fade() {
        return false;
    }
    debug!(from = %area, to = %target, "door entered");
    world.pending = Some(swap);
    events.push(GameEvent::DoorEntered { target });
    true
}

fn exit_swap(world: &WorldState) -> Option<PendingSwap> {
    world.return_link.is_some().then_some(PendingSwap::Exit)
}

// ══════════════════════════════════════════════════════════════
// Enemies and projectiles
// ══════════════════════════════════════════════════════════════

fn resolve_enemies(world: &mut WorldState, dt: f64) {
    let player_center = world.player.center();
    let projectile_speed = world.combat.projectile_speed;
    let (grid, active, rng) = world.split_active();
    let ctx = AiContext { grid, player_center, projectile_speed };
    for e in active.enemies.iter_mut() {
        if let Some(shot) = ai::update_enemy(e, &ctx, rng, dt) {
            active.projectiles.push(shot);
        }
    }
}

fn resolve_projectiles(world: &mut WorldState, dt: f64) {
    let (grid, active, _) = world.split_active();
    for p in active.projectiles.iter_mut() {
        combat::advance_projectile(p, grid, dt);
    }
    active.projectiles.retain(|p| !p.dead);
}

// ══════════════════════════════════════════════════════════════
// Items
// ══════════════════════════════════════════════════════════════

fn resolve_items(world: &mut WorldState, dt: f64, events: &mut Vec<GameEvent>) {
    for it in world.active.items.iter_mut() {
        it.bob_timer += dt;
    }

    let body = world.player.rect();
    let area = world.area_id();
    let mut picked = false;

    for it in world.active.items.iter_mut() {
        if it.collected || !body.overlaps(&it.rect()) {
            continue;
        }
        it.collected = true;
        let kind = it.kind;
        if let Some(index) = it.spawn_index {
            let key = ItemKey::new(&area, index);
            if world.progress.is_item_collected(&key) {
                continue;
            }
            world.progress.mark_item_collected(key);
        }
        apply_item(&mut world.player, kind);
        if kind == ItemKind::Sword {
            world.progress.set_flag(quest::FLAG_GOT_SWORD);
        }
        world.flash_timer = world.combat.flash_duration;
        events.push(GameEvent::ItemPicked { kind });
        picked = true;
    }

    if picked {
        world.record_player();
    }
}

pub fn apply_item(p: &mut Player, kind: ItemKind) {
    let inv = &mut p.inventory;
    match kind {
        ItemKind::Heart => p.hp = (p.hp + HEART_HEAL).min(p.max_hp),
        ItemKind::Rupee => inv.rupees += 1,
        ItemKind::Key => inv.keys += 1,
        ItemKind::Sword => {
            inv.sword_level = inv.sword_level.max(1);
            if inv.button_a == Equip::None {
                inv.button_a = Equip::Sword;
            }
        }
        ItemKind::HeartContainer => {
            p.max_hp += CONTAINER_HP;
            p.hp = p.max_hp;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Player damage
// ══════════════════════════════════════════════════════════════

/// Enemy contact, then enemy shots. Returns true if the player died.
fn resolve_player_damage(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    if let Some(amount) = combat::enemy_contact(&world.player, &world.active.enemies) {
        if hurt_player(world, amount, events) {
            return true;
        }
    }
    if let Some(amount) = combat::projectile_strike(&world.player, &mut world.active.projectiles) {
        if hurt_player(world, amount, events) {
            return true;
        }
    }
    false
}

fn hurt_player(world: &mut WorldState, amount: i32, events: &mut Vec<GameEvent>) -> bool {
    let result = combat::damage_player(&mut world.player, amount, &world.combat);
    world.shake_timer = world.combat.shake_duration;
    events.push(GameEvent::PlayerHurt { hp: world.player.hp });
    if result == Damage::Killed {
        world.outcome = Some(Outcome::GameOver);
        info!(area = %world.area_id(), "player died");
        events.push(GameEvent::PlayerDied);
        return true;
    }
    false
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{BossPhase, Enemy};
    use crate::sim::screen::{Screen, ScreenGraph, Warp};
    use crate::sim::transition::Phase;
    use crate::sim::world::fixtures::*;
    use crate::sim::world::{Location, WorldDef};
    use std::collections::HashMap;

    const DT: f64 = 0.05;

    fn idle() -> InputIntent {
        InputIntent::default()
    }

    fn walk(x: i8, y: i8) -> InputIntent {
        InputIntent { move_x: x, move_y: y, ..InputIntent::default() }
    }

    fn grass_world(w: i32, h: i32, start: (f64, f64)) -> WorldState {
        let mut overworld = ScreenGraph::new(w, h);
        for y in 0..h {
            for x in 0..w {
                overworld.insert(x, y, grass_screen());
            }
        }
        world_with(WorldDef { overworld, interiors: HashMap::new(), start_screen: (0, 0), start_pos: start })
    }

    fn armed(w: &mut WorldState) {
        apply_item(&mut w.player, ItemKind::Sword);
    }

    fn finish_transition(w: &mut WorldState) {
        let mut guard = 0;
        while w.transition.active && guard < 100 {
            step(w, &idle(), DT);
            guard += 1;
        }
        assert!(!w.transition.active);
    }

    // ── Navigation ──

    #[test]
    fn walking_east_scrolls_to_next_screen() {
        let mut w = grass_world(2, 1, (1.0, 1.0));
        let mut events = vec![];
        for _ in 0..200 {
            events = step(&mut w, &walk(1, 0), DT);
            if w.transition.active {
                break;
            }
        }
        assert_eq!(w.transition.phase(), Phase::Scrolling);
        assert_eq!(w.transition.dir, (1, 0));
        assert_eq!(w.transition.from_screen, Some((0, 0)));
        assert!(events.contains(&GameEvent::ScreenScroll { dx: 1, dy: 0 }));

        finish_transition(&mut w);
        assert_eq!(w.overworld.cursor(), (1, 0));
        assert_eq!(w.player.x, 1.0);
        assert_eq!(w.area_id(), AreaId::Overworld { x: 1, y: 0 });
    }

    #[test]
    fn diagonal_exit_honors_horizontal_first() {
        let mut w = grass_world(2, 2, (241.0, 177.0));
        step(&mut w, &walk(1, 1), DT);
        assert!(w.transition.active);
        assert_eq!(w.transition.dir, (1, 0));
        assert_eq!(w.overworld.cursor(), (1, 0));
    }

    #[test]
    fn unmapped_neighbour_is_a_wall() {
        let mut w = grass_world(1, 1, (2.0, 50.0));
        for _ in 0..5 {
            step(&mut w, &walk(-1, 0), DT);
        }
        assert!(!w.transition.active);
        assert_eq!(w.player.x, 0.0);
        assert_eq!(w.overworld.cursor(), (0, 0));
    }

    #[test]
    fn transition_is_modal() {
        let mut w = grass_world(2, 1, (241.0, 50.0));
        step(&mut w, &walk(1, 0), DT);
        assert!(w.transition.active);
        let (x, y) = (w.player.x, w.player.y);
        let elapsed = w.transition.elapsed;

        let busy = InputIntent { move_x: -1, move_y: 1, interact: true, primary: true, secondary: true };
        let events = step(&mut w, &busy, 0.01);
        assert!(events.is_empty());
        assert_eq!((w.player.x, w.player.y), (x, y));
        assert!(!w.player.sword.active);
        assert_eq!(w.transition.kind, TransitionKind::Scroll);
        assert!((w.transition.elapsed - elapsed - 0.01).abs() < 1e-12);
    }

    #[test]
    fn door_fades_into_interior_and_back() {
        let mut w = world_with(small_world());
        // Center on the house doorway at tile (5,3).
        w.player.x = 81.0;
        w.player.y = 49.0;
        let events = step(&mut w, &idle(), DT);
        assert_eq!(w.transition.phase(), Phase::Fading);
        assert!(events.contains(&GameEvent::DoorEntered { target: AreaId::Interior("house".into()) }));
        assert!(!w.in_interior());

        finish_transition(&mut w);
        assert_eq!(w.area_id(), AreaId::Interior("house".into()));
        assert_eq!((w.player.x, w.player.y), (120.0, 140.0));
        assert_eq!(w.active.items.len(), 1);

        // Stairs at tile (7,10) lead out.
        w.player.x = 113.0;
        w.player.y = 161.0;
        step(&mut w, &idle(), DT);
        assert_eq!(w.transition.phase(), Phase::Fading);
        finish_transition(&mut w);
        assert_eq!(w.area_id(), AreaId::Overworld { x: 0, y: 0 });
        assert_eq!((w.player.x, w.player.y), (81.0, 66.0));
        assert!(w.return_link.is_none());
    }

    #[test]
    fn dangling_interior_link_leads_back_out() {
        let mut def = small_world();
        let house = def.interiors.get_mut("house").unwrap();
        house.grid.set(3, 10, Tile::Stairs);
        house.warps.push(Warp { tile_x: 3, tile_y: 10, target: "cellar".into(), spawn: (0.0, 0.0), exit: (0.0, 0.0) });
        let mut w = world_with(def);

        w.player.x = 81.0;
        w.player.y = 49.0;
        step(&mut w, &idle(), DT);
        finish_transition(&mut w);
        assert_eq!(w.area_id(), AreaId::Interior("house".into()));

        // Tile (3,10) links to an interior that does not exist.
        w.player.x = 49.0;
        w.player.y = 161.0;
        step(&mut w, &idle(), DT);
        assert_eq!(w.transition.phase(), Phase::Fading);
        finish_transition(&mut w);
        assert_eq!(w.area_id(), AreaId::Overworld { x: 0, y: 0 });
        assert_eq!((w.player.x, w.player.y), (81.0, 66.0));
    }

    #[test]
    fn interior_walls_clamp_instead_of_crossing() {
        let mut interiors = HashMap::new();
        interiors.insert("open".to_string(), Screen::default());
        let mut overworld = ScreenGraph::new(2, 1);
        overworld.insert(0, 0, grass_screen());
        overworld.insert(1, 0, grass_screen());
        let mut w = world_with(WorldDef { overworld, interiors, start_screen: (0, 0), start_pos: (0.0, 0.0) });
        w.location = Location::Interior("open".into());
        w.player.x = 240.0;
        w.player.y = 50.0;
        for _ in 0..5 {
            step(&mut w, &walk(1, 0), DT);
        }
        assert!(!w.transition.active);
        assert_eq!(w.player.x, PLAY_AREA_W - 14.0);
        assert!(w.in_interior());
    }

    // ── Interaction ──

    #[test]
    fn key_opens_faced_door_once() {
        let mut w = world_with(small_world());
        w.player.x = 113.0;
        w.player.y = 49.0;
        w.player.dir = Direction::Right;
        w.player.inventory.keys = 1;
        let press = InputIntent { interact: true, ..InputIntent::default() };

        // The unlock ends the tick, so the held direction is not applied.
        let events = step(&mut w, &InputIntent { move_y: 1, ..press }, DT);
        assert_eq!(events, vec![GameEvent::DoorUnlocked { tile_x: 8, tile_y: 3 }]);
        assert_eq!(w.player.y, 49.0);
        assert_eq!(w.current_grid().tile_at(8, 3), Tile::DoorOpen);
        assert_eq!(w.player.inventory.keys, 0);
        assert!(w.progress.is_door_unlocked(&DoorKey::new(&AreaId::Overworld { x: 0, y: 0 }, 8, 3)));

        let events = step(&mut w, &press, DT);
        assert!(events.is_empty());
    }

    #[test]
    fn talk_to_nearby_npc() {
        let mut w = world_with(small_world());
        w.player.x = 40.0;
        w.player.y = 140.0;
        let events = step(&mut w, &InputIntent { interact: true, ..InputIntent::default() }, DT);
        match events.as_slice() {
            [GameEvent::Talk { npc, lines, .. }] => {
                assert_eq!(npc, "sage");
                assert_eq!(lines.len(), 1);
            }
            other => panic!("unexpected events {other:?}"),
        }
        assert!(w.progress.has_flag("met_sage"));
    }

    #[test]
    fn dialogue_changes_after_sword_pickup() {
        let mut w = world_with(small_world());
        w.player.x = 40.0;
        w.player.y = 140.0;
        let talk = InputIntent { interact: true, ..InputIntent::default() };
        let lines_of = |events: Vec<GameEvent>| match events.into_iter().next() {
            Some(GameEvent::Talk { lines, .. }) => lines,
            other => panic!("expected talk, got {other:?}"),
        };

        assert_eq!(lines_of(step(&mut w, &talk, DT)), vec!["It's dangerous to go alone.".to_string()]);
        assert!(!w.progress.has_flag(quest::FLAG_GOT_SWORD));

        w.active.items.push(Item::new(ItemKind::Sword, 40.0, 140.0, None));
        let events = step(&mut w, &idle(), DT);
        assert!(events.contains(&GameEvent::ItemPicked { kind: ItemKind::Sword }));
        assert!(w.progress.has_flag(quest::FLAG_GOT_SWORD));

        assert_eq!(lines_of(step(&mut w, &talk, DT)), vec!["That sword suits you.".to_string()]);
    }

    // ── Combat ──

    #[test]
    fn sword_hit_wounds_and_knocks_back() {
        let mut w = grass_world(1, 1, (100.0, 100.0));
        armed(&mut w);
        w.player.dir = Direction::Right;
        w.active.enemies = vec![Enemy::new(EnemyKind::Octorok, 116.0, 100.0)];

        // dt = 0 so nothing decays after the hit.
        let events = step(&mut w, &InputIntent { primary: true, ..InputIntent::default() }, 0.0);
        assert_eq!(events[0], GameEvent::SwordSwung { dir: Direction::Right });
        assert!(events.contains(&GameEvent::EnemyHit { kind: EnemyKind::Octorok }));

        let e = &w.active.enemies[0];
        assert_eq!(e.hp, 1);
        assert_eq!(e.inv_timer, w.combat.enemy_inv_time);
        assert!(e.knockback.vx > 0.0);
        assert_eq!(e.knockback.vy, 0.0);
    }

    #[test]
    fn no_sword_no_swing() {
        let mut w = grass_world(1, 1, (100.0, 100.0));
        w.player.inventory.button_a = Equip::Sword;
        let events = step(&mut w, &InputIntent { primary: true, ..InputIntent::default() }, DT);
        assert!(events.is_empty());
        assert!(!w.player.sword.active);
    }

    #[test]
    fn killing_the_boss_is_victory() {
        let mut w = grass_world(1, 1, (100.0, 100.0));
        armed(&mut w);
        w.player.dir = Direction::Right;
        let mut boss = Enemy::new(EnemyKind::Boss, 116.0, 97.0);
        boss.hp = 1;
        w.active.enemies = vec![boss];

        let events = step(&mut w, &InputIntent { primary: true, ..InputIntent::default() }, DT);
        assert_eq!(w.outcome, Some(Outcome::Victory));
        assert_eq!(events.last(), Some(&GameEvent::BossDefeated));
        assert!(step(&mut w, &idle(), DT).is_empty());
    }

    #[test]
    fn far_boss_stays_in_wander() {
        let mut w = grass_world(1, 1, (10.0, 10.0));
        let mut boss = Enemy::new(EnemyKind::Boss, 220.0, 160.0);
        boss.ai_timer = 0.001;
        w.active.enemies = vec![boss];
        for _ in 0..3 {
            step(&mut w, &idle(), 0.01);
            assert_eq!(w.active.enemies[0].boss, BossPhase::Wander);
        }
        assert!(w.active.enemies[0].ai_timer > 0.0);
    }

    #[test]
    fn contact_damage_then_game_over() {
        let mut w = grass_world(1, 1, (100.0, 100.0));
        w.player.hp = 3;
        w.active.enemies = vec![Enemy::new(EnemyKind::Boss, 97.0, 97.0)];

        let events = step(&mut w, &idle(), 0.0);
        assert!(events.contains(&GameEvent::PlayerHurt { hp: 1 }));
        assert!(w.player.is_invincible());
        assert!(w.shake_timer > 0.0);
        assert!(w.outcome.is_none());

        w.player.inv_timer = 0.0;
        let events = step(&mut w, &idle(), 0.0);
        assert_eq!(events, vec![GameEvent::PlayerHurt { hp: 0 }, GameEvent::PlayerDied]);
        assert_eq!(w.outcome, Some(Outcome::GameOver));
        assert!(step(&mut w, &walk(1, 0), DT).is_empty());
    }

    // ── Items ──

    #[test]
    fn pickup_is_idempotent_per_spawn_key() {
        let mut w = world_with(small_world());
        let (ix, iy) = (w.active.items[0].x, w.active.items[0].y);
        w.player.x = ix;
        w.player.y = iy;

        let events = step(&mut w, &idle(), DT);
        assert_eq!(events, vec![GameEvent::ItemPicked { kind: ItemKind::Rupee }]);
        assert_eq!(w.player.inventory.rupees, 1);
        assert!(w.flash_timer > 0.0);

        // Still standing on it.
        assert!(step(&mut w, &idle(), DT).is_empty());

        // A stale copy with the same spawn key grants nothing.
        w.active.items.push(Item::new(ItemKind::Rupee, ix, iy, Some(0)));
        assert!(step(&mut w, &idle(), DT).is_empty());
        assert_eq!(w.player.inventory.rupees, 1);

        w.respawn();
        assert!(w.active.items.is_empty());
    }

    #[test]
    fn item_effects() {
        let mut p = Player::new(0.0, 0.0, 80.0, 6);
        p.hp = 5;
        apply_item(&mut p, ItemKind::Heart);
        assert_eq!(p.hp, 6);
        apply_item(&mut p, ItemKind::HeartContainer);
        assert_eq!((p.hp, p.max_hp), (8, 8));
        apply_item(&mut p, ItemKind::Sword);
        assert_eq!(p.inventory.button_a, Equip::Sword);
        assert!(p.has_sword());
        apply_item(&mut p, ItemKind::Key);
        assert_eq!(p.inventory.keys, 1);
    }

    // ── Timing ──

    #[test]
    fn dt_is_clamped() {
        let mut w = grass_world(1, 1, (100.0, 100.0));
        step(&mut w, &walk(1, 0), 10.0);
        assert!((w.player.x - 104.0).abs() < 1e-9);
        step(&mut w, &walk(1, 0), -1.0);
        assert!((w.player.x - 104.0).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_run() {
        let run = || {
            let mut w = grass_world(1, 1, (20.0, 20.0));
            w.active.enemies = vec![
                Enemy::new(EnemyKind::Octorok, 150.0, 100.0),
                Enemy::new(EnemyKind::Moblin, 60.0, 120.0),
            ];
            for i in 0..300 {
                let x = if i % 40 < 20 { 1 } else { -1 };
                step(&mut w, &walk(x, 0), 1.0 / 60.0);
            }
            (
                w.player.x,
                w.player.hp,
                w.active.enemies.iter().map(|e| (e.x, e.y)).collect::<Vec<_>>(),
                w.rng.state(),
            )
        };
        assert_eq!(run(), run());
    }
}
