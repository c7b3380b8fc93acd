//! Fixed timestep simulation tick
//!
//! Advances a [`World`] by one step: input, weapons, entity and AI updates,
//! one collision pass, then the game-state step.

use glam::Vec2;

use super::collision::{
    enemy_bullet_collision, player_bullet_collision, player_enemy_collision,
    player_powerup_collision,
};
use super::entities::{
    Bullet, BulletKind, Enemy, EnemyState, HitOutcome, Owner, PowerUp, PowerUpKind,
};
use super::pool::Pool;
use super::rng::RandomSource;
use super::state::{GamePhase, WaveKind};
use super::world::World;
use crate::consts::*;

/// Percent chance a shot-down enemy drops a power-up
const POWERUP_DROP_CHANCE: u32 = 15;
/// Per-tick chance (out of the divisor) that a formation enemy fires
const ENEMY_SHOOT_CHANCE: u32 = 5;
const ENEMY_SHOOT_CHANCE_DIVISOR: u32 = 1000;

const SPECIAL_SPREAD: usize = 5;
const HOMING_GAIN: f32 = 4.0;
const HOMING_MAX_VX: f32 = 20.0;
const LIGHTNING_RANGE: f32 = 8.0;
const TIME_SLOW_FACTOR: f32 = 0.5;

/// Input intents for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Horizontal intent, -1..=1
    pub move_x: i8,
    /// Vertical intent, -1..=1 (negative is up)
    pub move_y: i8,
    /// Fire held
    pub shoot: bool,
    /// Edge-triggered: spend a bomb
    pub bomb: bool,
    /// Edge-triggered: discharge the special weapon
    pub special: bool,
    /// Edge-triggered: flip god-mode
    pub god_mode_toggle: bool,
    /// Edge-triggered: pause toggle
    pub pause: bool,
}

/// Advance the world by one fixed timestep
pub fn tick<R: RandomSource>(world: &mut World<R>, input: &TickInput, dt: f32) {
    if input.god_mode_toggle {
        world.player.god_mode = !world.player.god_mode;
        log::debug!("god mode {}", if world.player.god_mode { "on" } else { "off" });
    }

    if input.pause {
        world.state.toggle_pause();
    }
    if world.state.phase == GamePhase::Paused {
        return;
    }

    world.time_ticks += 1;

    let arena = world.arena;
    for star in &mut world.stars {
        star.update(dt, arena);
    }

    match world.state.phase {
        GamePhase::Menu => {
            if input.shoot {
                begin_wave(world);
            }
        }
        GamePhase::Playing => step_playing(world, input, dt),
        GamePhase::BonusStage => step_bonus(world, input, dt),
        GamePhase::WaveTransition | GamePhase::GameOver | GamePhase::Paused => {}
    }

    world.state.update(dt);
}

/// Start the next wave, arming the bonus stage when it comes up
fn begin_wave<R: RandomSource>(world: &mut World<R>) {
    if world.state.start_wave(&mut world.formation, world.arena) == WaveKind::Bonus {
        world.bonus.start();
    }
}

/// Time-slow halves the clock of everything hostile
fn enemy_dt<R>(world: &World<R>, dt: f32) -> f32 {
    if world.player.time_slow.active {
        dt * TIME_SLOW_FACTOR
    } else {
        dt
    }
}

/// Movement and fire, shared by both active modes
fn steer_player<R: RandomSource>(world: &mut World<R>, input: &TickInput) {
    world.player.set_intent(input.move_x, input.move_y);
    if input.shoot {
        world.player.shoot(&mut world.bullets);
    }
}

fn step_playing<R: RandomSource>(world: &mut World<R>, input: &TickInput, dt: f32) {
    let arena = world.arena;

    steer_player(world, input);
    if input.bomb {
        detonate_bomb(world);
    }
    if input.special {
        fire_special(world);
    }
    world.player.update(dt, arena);

    let enemy_dt = enemy_dt(world, dt);
    world.formation.update_formation(enemy_dt);
    world.formation.trigger_dive(enemy_dt, &mut world.rng);
    world.formation.trigger_capture(enemy_dt, &world.player);
    world.formation.update_dives(enemy_dt, &mut world.player, arena);
    enemy_fire(world, enemy_dt);

    steer_homing(&mut world.bullets, &world.formation.enemies, dt);
    move_bullets(world, dt, enemy_dt);
    for (_, powerup) in world.powerups.iter_active_mut() {
        powerup.update(dt, arena);
    }

    resolve_formation_hits(world);
    resolve_enemy_fire(world);
    resolve_body_collisions(world);
    collect_powerups(world);

    if world.formation.count_active() == 0 {
        world.state.complete_wave();
        begin_wave(world);
    }

    world.state.check_game_over(world.player.lives);
}

fn step_bonus<R: RandomSource>(world: &mut World<R>, input: &TickInput, dt: f32) {
    let arena = world.arena;
    let enemy_dt = enemy_dt(world, dt);

    world.bonus.update(dt, enemy_dt, arena);

    steer_player(world, input);
    world.player.update(dt, arena);

    steer_homing(&mut world.bullets, &world.bonus.enemies, dt);
    move_bullets(world, dt, enemy_dt);
    for (_, powerup) in world.powerups.iter_active_mut() {
        powerup.update(dt, arena);
    }

    resolve_bonus_hits(world);
    resolve_enemy_fire(world);
    collect_powerups(world);

    if world.bonus.is_complete() {
        let payout = world.bonus.calculate_score();
        world.state.add_score(payout);
        log::info!(
            "bonus stage complete: {}/{} destroyed (+{payout})",
            world.bonus.destroyed,
            world.bonus.spawned
        );
        begin_wave(world);
    }

    world.state.check_game_over(world.player.lives);
}

/// Wipe out the formation and every enemy bullet for reduced points
fn detonate_bomb<R: RandomSource>(world: &mut World<R>) {
    if !world.player.take_bomb() {
        return;
    }

    let mut points = 0;
    let mut destroyed = 0;
    let mut held_captive = false;
    for (_, enemy) in world.formation.enemies.iter_active_mut() {
        enemy.active = false;
        points += enemy.kind.bomb_points();
        destroyed += 1;
        held_captive |= enemy.has_captured_player;
    }
    world.state.add_score(points);
    if held_captive {
        world.player.free();
        log::debug!("captor destroyed, player freed");
    }

    for (_, bullet) in world.bullets.iter_active_mut() {
        if !bullet.is_player() {
            bullet.active = false;
        }
    }
    log::debug!(
        "bomb destroyed {destroyed} enemies (+{points}), {} left",
        world.player.bomb_count
    );
}

/// Five-way mega-laser spread with heavy pierce
fn fire_special<R: RandomSource>(world: &mut World<R>) {
    if !world.player.take_special() {
        return;
    }

    let muzzle = Vec2::new(world.player.pos.x, world.player.pos.y - 1.0);
    let mut fired = 0;
    for i in 0..SPECIAL_SPREAD {
        let spread = -0.4 + 0.2 * i as f32;
        let vel = Vec2::new(spread * BULLET_SPEED, -BULLET_SPEED);
        let mut bullet = Bullet::player(muzzle, vel, BulletKind::MegaLaser);
        bullet.pierce = SPECIAL_PIERCE;
        if world.bullets.spawn(bullet).is_none() {
            break;
        }
        fired += 1;
    }
    log::debug!("special fired {fired} lasers");
}

/// Step enemy animation and cooldowns; enemies holding formation may fire
fn enemy_fire<R: RandomSource>(world: &mut World<R>, dt: f32) {
    for index in 0..world.formation.enemies.capacity() {
        let enemy = &mut world.formation.enemies[index];
        if !enemy.active {
            continue;
        }
        enemy.update(dt);
        if enemy.state == EnemyState::Formation
            && world.rng.chance(ENEMY_SHOOT_CHANCE, ENEMY_SHOOT_CHANCE_DIVISOR)
        {
            enemy.shoot(&mut world.bullets, &mut world.rng);
        }
    }
}

/// Player shots run on the real clock, enemy shots on the enemy clock
fn move_bullets<R>(world: &mut World<R>, dt: f32, enemy_dt: f32) {
    let arena = world.arena;
    for (_, bullet) in world.bullets.iter_active_mut() {
        let step = if bullet.is_player() { dt } else { enemy_dt };
        bullet.update(step, arena);
    }
}

/// Nearest active enemy above `from`, ties broken by slot order
fn nearest_enemy_above(enemies: &Pool<Enemy>, from: Vec2) -> Option<usize> {
    enemies
        .iter_active()
        .filter(|(_, e)| e.pos.y < from.y)
        .min_by(|(ia, a), (ib, b)| {
            a.pos
                .distance_squared(from)
                .total_cmp(&b.pos.distance_squared(from))
                .then(ia.cmp(ib))
        })
        .map(|(i, _)| i)
}

/// Keep every homing bullet locked on a live target and bend toward it
fn steer_homing(bullets: &mut Pool<Bullet>, enemies: &Pool<Enemy>, dt: f32) {
    for (_, bullet) in bullets.iter_active_mut() {
        if bullet.kind != BulletKind::Homing || !bullet.is_player() {
            continue;
        }

        let locked = bullet
            .target
            .filter(|&t| enemies.get(t).is_some_and(|e| e.active));
        bullet.target = locked.or_else(|| nearest_enemy_above(enemies, bullet.pos));

        if let Some(target) = bullet.target {
            bullet.steer_toward(enemies[target].pos.x, HOMING_GAIN, HOMING_MAX_VX, dt);
        }
    }
}

/// Decide whether a player bullet survives its hit. Returns the lightning
/// chain length when the bullet arcs.
fn spend_bullet(bullet: &mut Bullet) -> Option<u8> {
    match bullet.kind {
        BulletKind::MegaLaser if bullet.pierce > 0 => {
            bullet.pierce -= 1;
            None
        }
        BulletKind::Lightning => {
            bullet.active = false;
            Some(bullet.chain)
        }
        _ => {
            bullet.active = false;
            None
        }
    }
}

/// First active enemy the bullet overlaps, by slot order
fn first_enemy_hit(enemies: &Pool<Enemy>, bullet: &Bullet) -> Option<usize> {
    enemies
        .iter_active()
        .find(|(_, e)| enemy_bullet_collision(e, bullet))
        .map(|(i, _)| i)
}

/// Player bullets against the formation. Each bullet hits at most one
/// enemy per tick.
fn resolve_formation_hits<R: RandomSource>(world: &mut World<R>) {
    for bullet_index in 0..world.bullets.capacity() {
        let bullet = &world.bullets[bullet_index];
        if !bullet.active || !bullet.is_player() {
            continue;
        }
        let Some(enemy_index) = first_enemy_hit(&world.formation.enemies, bullet) else {
            continue;
        };

        let origin = world.formation.enemies[enemy_index].pos;
        shoot_down(world, enemy_index);

        if let Some(chain) = spend_bullet(&mut world.bullets[bullet_index]) {
            chain_lightning(world, origin, chain);
        }
    }
}

/// Score a kill: combo multiplier, captive release, possible drop
fn shoot_down<R: RandomSource>(world: &mut World<R>, enemy_index: usize) {
    let enemy = &mut world.formation.enemies[enemy_index];
    enemy.active = false;
    let (kind, pos, held_captive) = (enemy.kind, enemy.pos, enemy.has_captured_player);

    if held_captive {
        world.player.free();
        log::debug!("captive rescued, dual fighter docked");
    }

    drop_powerup(world, pos);

    let multiplier = world.player.register_kill();
    world.state.add_score(kind.points() * multiplier as u64);
    world.state.record_kill();
}

fn drop_powerup<R: RandomSource>(world: &mut World<R>, pos: Vec2) {
    if !world.rng.chance(POWERUP_DROP_CHANCE, 100) {
        return;
    }
    let Some(slot) = world.powerups.free_slot() else {
        log::trace!("power-up drop lost, no free slot");
        return;
    };
    let kind = PowerUpKind::roll(&mut world.rng);
    world.powerups.put(slot, PowerUp::new(pos, kind));
}

/// Arc from a struck enemy to the nearest others in range
fn chain_lightning<R: RandomSource>(world: &mut World<R>, origin: Vec2, chain: u8) {
    let mut targets: Vec<(usize, f32)> = world
        .formation
        .enemies
        .iter_active()
        .map(|(i, e)| (i, e.pos.distance(origin)))
        .filter(|&(_, d)| d <= LIGHTNING_RANGE)
        .collect();
    targets.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    for (index, _) in targets.into_iter().take(chain as usize) {
        shoot_down(world, index);
    }
}

/// Player bullets against bonus stage enemies. The payout comes at the end.
fn resolve_bonus_hits<R>(world: &mut World<R>) {
    for bullet_index in 0..world.bullets.capacity() {
        let bullet = &world.bullets[bullet_index];
        if !bullet.active || !bullet.is_player() {
            continue;
        }
        let Some(enemy_index) = first_enemy_hit(&world.bonus.enemies, bullet) else {
            continue;
        };
        world.bonus.destroy(enemy_index);
        spend_bullet(&mut world.bullets[bullet_index]);
    }
}

/// Enemy bullets against the player. The reflect shield turns them around.
fn resolve_enemy_fire<R>(world: &mut World<R>) {
    for bullet_index in 0..world.bullets.capacity() {
        if !player_bullet_collision(&world.player, &world.bullets[bullet_index]) {
            continue;
        }

        if world.player.reflect_shield.active {
            let bullet = &mut world.bullets[bullet_index];
            bullet.owner = Owner::Player;
            bullet.vel = Vec2::new(0.0, -BULLET_SPEED);
            bullet.kind = BulletKind::Normal;
            continue;
        }

        world.bullets[bullet_index].active = false;
        damage_player(world);
    }
}

/// Ramming: the player takes a hit and the enemy breaks up unless the
/// player is shielded or in god-mode
fn resolve_body_collisions<R>(world: &mut World<R>) {
    for enemy_index in 0..world.formation.enemies.capacity() {
        if !player_enemy_collision(&world.player, &world.formation.enemies[enemy_index]) {
            continue;
        }
        damage_player(world);
        if !world.player.god_mode && !world.player.shield.active {
            let enemy = &mut world.formation.enemies[enemy_index];
            enemy.active = false;
            if enemy.has_captured_player {
                world.player.free();
                log::debug!("captor {enemy_index} rammed, player freed");
            }
        }
    }
}

fn collect_powerups<R>(world: &mut World<R>) {
    for (_, powerup) in world.powerups.iter_active_mut() {
        if player_powerup_collision(&world.player, powerup) {
            log::debug!("picked up {:?}", powerup.kind);
            powerup.apply(&mut world.player);
        }
    }
}

fn damage_player<R>(world: &mut World<R>) {
    if world.player.hit() == HitOutcome::LifeLost {
        world.state.player_died();
        log::info!("life lost, {} remaining", world.player.lives);
    }
}
