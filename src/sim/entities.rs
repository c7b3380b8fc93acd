//! Entity records and their per-tick update rules
//!
//! Every entity is a plain value updated in place. Nothing here reaches
//! outside the entity except the explicit pool handed to the shooting
//! helpers.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pool::{Pool, Slot};
use super::rng::RandomSource;
use crate::Arena;
use crate::consts::*;

// Player sprite extents relative to its position
const PLAYER_EDGE_MARGIN: f32 = 1.0;
const PLAYER_TOP_MARGIN: f32 = 3.0;
const PLAYER_SPRITE_LEFT: f32 = 1.0;
const PLAYER_SPRITE_RIGHT: f32 = 1.0;
const PLAYER_SPRITE_BOTTOM: f32 = 1.0;
const PLAYER_BOTTOM_SAFETY: f32 = 3.0;
const DUAL_FIGHTER_EXTRA_WIDTH: f32 = 2.0;

/// Ally drone hovers this far right of the ship
const DRONE_OFFSET: Vec2 = Vec2::new(3.0, 0.0);
const DRONE_FOLLOW_RATE: f32 = 5.0;

/// A boolean power-up flag paired with its countdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimedEffect {
    pub active: bool,
    pub remaining: f32,
}

impl TimedEffect {
    /// Activate (or re-activate) with a fresh full duration. Never stacks.
    pub fn refresh(&mut self, duration: f32) {
        self.active = true;
        self.remaining = duration;
    }

    pub fn clear(&mut self) {
        self.active = false;
        self.remaining = 0.0;
    }

    /// Count down; returns true on the tick the effect expires
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.clear();
            return true;
        }
        false
    }
}

/// Result of a [`Player::hit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// God-mode, shield, or invincibility absorbed the hit
    Ignored,
    /// Health dropped but the life survives
    Damaged,
    /// Health ran out: one life consumed, health restored
    LifeLost,
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Movement intent per axis, each in -1..=1
    pub vel: Vec2,
    pub lives: u8,
    pub health: u8,
    pub max_health: u8,
    pub captured: bool,
    pub dual_fighter: bool,
    pub shoot_cooldown: f32,
    pub god_mode: bool,
    pub invincibility_timer: f32,

    pub shield: TimedEffect,
    pub speed: TimedEffect,
    pub dual_shot: TimedEffect,
    pub mega_laser: TimedEffect,
    pub homing: TimedEffect,
    pub lightning: TimedEffect,
    pub reflect_shield: TimedEffect,
    pub time_slow: TimedEffect,
    pub ally_drone: TimedEffect,
    pub drone_pos: Vec2,

    pub bomb_count: u8,

    pub combo_count: u32,
    pub combo_timer: f32,
    pub score_multiplier: u32,

    /// Special weapon charge, 0..=100
    pub special_charge: f32,
    pub special_ready: bool,
}

impl Player {
    /// Spawn centred near the bottom of the arena with full lives and health
    pub fn new(arena: Arena) -> Self {
        let (min, max) = Self::bounds(arena, false);
        let pos = Vec2::new((min.x + max.x) / 2.0, max.y - 1.0);

        Self {
            pos,
            vel: Vec2::ZERO,
            lives: PLAYER_STARTING_LIVES,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            captured: false,
            dual_fighter: false,
            shoot_cooldown: 0.0,
            god_mode: false,
            invincibility_timer: 0.0,
            shield: TimedEffect::default(),
            speed: TimedEffect::default(),
            dual_shot: TimedEffect::default(),
            mega_laser: TimedEffect::default(),
            homing: TimedEffect::default(),
            lightning: TimedEffect::default(),
            reflect_shield: TimedEffect::default(),
            time_slow: TimedEffect::default(),
            ally_drone: TimedEffect::default(),
            drone_pos: pos + DRONE_OFFSET,
            bomb_count: 0,
            combo_count: 0,
            combo_timer: 0.0,
            score_multiplier: 1,
            special_charge: 0.0,
            special_ready: false,
        }
    }

    /// Set the movement intent from discrete axes
    pub fn set_intent(&mut self, move_x: i8, move_y: i8) {
        self.vel = Vec2::new(move_x.signum() as f32, move_y.signum() as f32);
    }

    /// Legal positions for the ship's centre. The dual fighter sprite is
    /// wider on the right.
    fn bounds(arena: Arena, dual_fighter: bool) -> (Vec2, Vec2) {
        let mut right = PLAYER_SPRITE_RIGHT;
        if dual_fighter {
            right += DUAL_FIGHTER_EXTRA_WIDTH;
        }
        let min = Vec2::new(PLAYER_SPRITE_LEFT + PLAYER_EDGE_MARGIN, PLAYER_TOP_MARGIN);
        let max = Vec2::new(
            arena.width_f() - right - PLAYER_EDGE_MARGIN,
            arena.height_f() - PLAYER_SPRITE_BOTTOM - PLAYER_BOTTOM_SAFETY,
        );
        (min, max)
    }

    /// Advance movement, cooldowns and every power-up timer
    pub fn update(&mut self, dt: f32, arena: Arena) {
        let (speed_x, speed_y) = if self.speed.active {
            (PLAYER_SPEED_BOOST_X, PLAYER_SPEED_BOOST_Y)
        } else {
            (PLAYER_SPEED_X, PLAYER_SPEED_Y)
        };
        self.pos += self.vel * Vec2::new(speed_x, speed_y) * dt;

        let (min, max) = Self::bounds(arena, self.dual_fighter);
        self.pos = self.pos.max(min).min(max);

        self.shoot_cooldown = (self.shoot_cooldown - dt).max(0.0);
        self.invincibility_timer = (self.invincibility_timer - dt).max(0.0);

        self.shield.tick(dt);
        self.speed.tick(dt);
        self.dual_shot.tick(dt);
        self.mega_laser.tick(dt);
        self.homing.tick(dt);
        self.lightning.tick(dt);
        self.reflect_shield.tick(dt);
        self.time_slow.tick(dt);
        self.ally_drone.tick(dt);
        if self.ally_drone.active {
            let target = self.pos + DRONE_OFFSET;
            self.drone_pos += (target - self.drone_pos) * DRONE_FOLLOW_RATE * dt;
        }

        if self.combo_timer > 0.0 {
            self.combo_timer -= dt;
            if self.combo_timer <= 0.0 {
                self.combo_timer = 0.0;
                self.combo_count = 0;
                self.score_multiplier = 1;
            }
        }

        if !self.special_ready && self.special_charge < SPECIAL_CHARGE_MAX {
            self.special_charge += SPECIAL_CHARGE_RATE * dt;
            if self.special_charge >= SPECIAL_CHARGE_MAX {
                self.special_charge = SPECIAL_CHARGE_MAX;
                self.special_ready = true;
            }
        }
    }

    /// Projectile type from the highest-priority weapon power-up
    pub fn bullet_kind(&self) -> BulletKind {
        if self.mega_laser.active {
            BulletKind::MegaLaser
        } else if self.homing.active {
            BulletKind::Homing
        } else if self.lightning.active {
            BulletKind::Lightning
        } else {
            BulletKind::Normal
        }
    }

    /// Fire if the cooldown allows. Dual-shot, dual-fighter and the ally
    /// drone each add one more bullet in the next free slot. Returns the
    /// number of bullets actually spawned.
    pub fn shoot(&mut self, bullets: &mut Pool<Bullet>) -> usize {
        if self.shoot_cooldown > 0.0 {
            return 0;
        }

        let kind = self.bullet_kind();
        let muzzle = Vec2::new(self.pos.x, self.pos.y - 1.0);
        let vel = Vec2::new(0.0, -BULLET_SPEED);

        if bullets.spawn(Bullet::player(muzzle, vel, kind)).is_none() {
            return 0;
        }
        self.shoot_cooldown = PLAYER_SHOOT_COOLDOWN;

        let mut extras = Vec::with_capacity(3);
        if self.dual_shot.active {
            extras.push(Bullet::player(muzzle - Vec2::X, vel, kind));
        }
        if self.dual_fighter {
            extras.push(Bullet::player(muzzle + Vec2::new(2.0, 0.0), vel, kind));
        }
        if self.ally_drone.active {
            let drone_muzzle = Vec2::new(self.drone_pos.x, self.drone_pos.y - 1.0);
            extras.push(Bullet::player(drone_muzzle, vel, BulletKind::Normal));
        }

        1 + extras
            .into_iter()
            .filter_map(|b| bullets.spawn(b))
            .count()
    }

    /// True while hits are ignored
    pub fn is_protected(&self) -> bool {
        self.god_mode || self.shield.active || self.invincibility_timer > 0.0
    }

    /// Take one point of damage
    pub fn hit(&mut self) -> HitOutcome {
        if self.is_protected() {
            return HitOutcome::Ignored;
        }

        self.health = self.health.saturating_sub(1);
        self.invincibility_timer = INVINCIBILITY_TIME_HIT;

        if self.health > 0 {
            return HitOutcome::Damaged;
        }

        self.lives = self.lives.saturating_sub(1);
        self.health = self.max_health;
        self.dual_fighter = false;
        self.dual_shot.clear();
        self.speed.clear();
        self.invincibility_timer = INVINCIBILITY_TIME_DEATH;
        HitOutcome::LifeLost
    }

    /// Taken by a boss tractor beam
    pub fn capture(&mut self) {
        self.captured = true;
    }

    /// Rescued: the recovered ship docks alongside as a dual fighter
    pub fn free(&mut self) {
        self.captured = false;
        self.dual_fighter = true;
    }

    /// Count a kill toward the combo and return the multiplier to apply
    pub fn register_kill(&mut self) -> u32 {
        self.combo_count += 1;
        self.combo_timer = COMBO_WINDOW;
        self.score_multiplier = match self.combo_count {
            n if n >= 5 => 4,
            3 | 4 => 2,
            _ => 1,
        };
        self.score_multiplier
    }

    /// Spend a bomb if one is available
    pub fn take_bomb(&mut self) -> bool {
        if self.bomb_count == 0 {
            return false;
        }
        self.bomb_count -= 1;
        true
    }

    /// Discharge the special weapon if fully charged
    pub fn take_special(&mut self) -> bool {
        if !self.special_ready {
            return false;
        }
        self.special_ready = false;
        self.special_charge = 0.0;
        true
    }

    /// Special charge as 0..=1 for the HUD
    pub fn special_fraction(&self) -> f32 {
        self.special_charge / SPECIAL_CHARGE_MAX
    }
}

/// Which side fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Owner {
    #[default]
    Player,
    Enemy,
}

/// Projectile behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BulletKind {
    #[default]
    Normal,
    /// Passes through `pierce` enemies before being consumed
    MegaLaser,
    /// Steers toward a target enemy
    Homing,
    /// Arcs to up to `chain` nearby enemies on impact
    Lightning,
}

/// A projectile slot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub active: bool,
    pub owner: Owner,
    pub kind: BulletKind,
    pub pierce: u8,
    pub chain: u8,
    /// Enemy slot a homing bullet is tracking
    pub target: Option<usize>,
}

impl Slot for Bullet {
    fn is_active(&self) -> bool {
        self.active
    }
}

impl Bullet {
    /// A plain bullet with every special field reset
    pub fn new(pos: Vec2, vel: Vec2, owner: Owner) -> Self {
        Self {
            pos,
            vel,
            active: true,
            owner,
            kind: BulletKind::Normal,
            pierce: 0,
            chain: 0,
            target: None,
        }
    }

    /// A player bullet of the given kind with its default pierce/chain
    pub fn player(pos: Vec2, vel: Vec2, kind: BulletKind) -> Self {
        let mut bullet = Self::new(pos, vel, Owner::Player);
        bullet.kind = kind;
        match kind {
            BulletKind::MegaLaser => bullet.pierce = MEGA_LASER_PIERCE,
            BulletKind::Lightning => bullet.chain = LIGHTNING_CHAIN,
            _ => {}
        }
        bullet
    }

    /// A downward enemy shot
    pub fn enemy(pos: Vec2) -> Self {
        Self::new(pos, Vec2::new(0.0, ENEMY_BULLET_SPEED), Owner::Enemy)
    }

    #[inline]
    pub fn is_player(&self) -> bool {
        self.owner == Owner::Player
    }

    /// Move and retire once off-screen
    pub fn update(&mut self, dt: f32, arena: Arena) {
        if !self.active {
            return;
        }
        self.pos += self.vel * dt;
        if !arena.contains(self.pos.x, self.pos.y) {
            self.active = false;
        }
    }

    /// Bend horizontal velocity toward `target_x`
    pub fn steer_toward(&mut self, target_x: f32, gain: f32, max_vx: f32, dt: f32) {
        let desired = ((target_x - self.pos.x) * gain).clamp(-max_vx, max_vx);
        let max_step = max_vx * gain * dt;
        self.vel.x += (desired - self.vel.x).clamp(-max_step, max_step);
    }
}

/// Enemy species: fixed combat role and sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyKind {
    #[default]
    Bee,
    Butterfly,
    Boss,
}

impl EnemyKind {
    /// Points for shooting one down (before the combo multiplier)
    pub fn points(&self) -> u64 {
        match self {
            EnemyKind::Bee => 100,
            EnemyKind::Butterfly => 150,
            EnemyKind::Boss => 300,
        }
    }

    /// Reduced points when wiped out by a bomb
    pub fn bomb_points(&self) -> u64 {
        match self {
            EnemyKind::Bee => 50,
            EnemyKind::Butterfly => 75,
            EnemyKind::Boss => 150,
        }
    }
}

/// Enemy flight state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyState {
    #[default]
    Formation,
    Diving,
    Returning,
    /// Reserved for escorting a captured ship; no rule enters it yet
    CapturedEscort,
}

/// An enemy slot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: EnemyKind,
    pub state: EnemyState,
    pub active: bool,
    pub formation_index: usize,
    /// Grid slot the enemy departs from and returns to
    pub anchor: Vec2,
    pub dive_timer: f32,
    pub shoot_cooldown: f32,
    pub dive_path_index: u8,
    pub has_captured_player: bool,
    pub animation_frame: u8,
    pub animation_timer: f32,
}

impl Slot for Enemy {
    fn is_active(&self) -> bool {
        self.active
    }
}

impl Enemy {
    /// Active enemy parked on its anchor in formation
    pub fn new(kind: EnemyKind, formation_index: usize, anchor: Vec2) -> Self {
        Self {
            pos: anchor,
            vel: Vec2::ZERO,
            kind,
            state: EnemyState::Formation,
            active: true,
            formation_index,
            anchor,
            dive_timer: 0.0,
            shoot_cooldown: 0.0,
            dive_path_index: 0,
            has_captured_player: false,
            animation_frame: 0,
            animation_timer: 0.0,
        }
    }

    /// Animate, integrate velocity, decay the shot cooldown
    pub fn update(&mut self, dt: f32) {
        if !self.active {
            return;
        }

        self.animation_timer += dt;
        if self.animation_timer >= ENEMY_ANIMATION_FRAME_TIME {
            self.animation_frame = (self.animation_frame + 1) % ENEMY_ANIMATION_FRAMES;
            self.animation_timer = 0.0;
        }

        self.pos += self.vel * dt;

        if self.shoot_cooldown > 0.0 {
            self.shoot_cooldown = (self.shoot_cooldown - dt).max(0.0);
        }
    }

    /// Leave formation on the given dive pattern
    pub fn start_dive(&mut self, pattern: u8) {
        self.state = EnemyState::Diving;
        self.dive_timer = 0.0;
        self.dive_path_index = pattern;
    }

    /// Drop a bullet below the sprite if the cooldown is clear. The next
    /// cooldown gets random jitter so the formation does not fire in sync.
    pub fn shoot(&mut self, bullets: &mut Pool<Bullet>, rng: &mut impl RandomSource) -> bool {
        if !self.active || self.shoot_cooldown > 0.0 {
            return false;
        }
        let muzzle = Vec2::new(self.pos.x, self.pos.y + 1.0);
        if bullets.spawn(Bullet::enemy(muzzle)).is_none() {
            return false;
        }
        let jitter = rng.below(100) as f32 / (100.0 / ENEMY_SHOOT_COOLDOWN_JITTER);
        self.shoot_cooldown = ENEMY_SHOOT_COOLDOWN_MIN + jitter;
        true
    }
}

/// The ten power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PowerUpKind {
    #[default]
    DualShot,
    Shield,
    Speed,
    MegaLaser,
    Bomb,
    Homing,
    Lightning,
    ReflectShield,
    TimeSlow,
    AllyDrone,
}

/// Drop weights out of 100, in roll order
const POWERUP_WEIGHTS: [(PowerUpKind, u32); 10] = [
    (PowerUpKind::DualShot, 15),
    (PowerUpKind::Shield, 15),
    (PowerUpKind::Speed, 10),
    (PowerUpKind::MegaLaser, 10),
    (PowerUpKind::Bomb, 10),
    (PowerUpKind::Homing, 10),
    (PowerUpKind::Lightning, 8),
    (PowerUpKind::ReflectShield, 8),
    (PowerUpKind::TimeSlow, 8),
    (PowerUpKind::AllyDrone, 6),
];

impl PowerUpKind {
    /// Weighted pick; the ally drone is the rarest
    pub fn roll(rng: &mut impl RandomSource) -> Self {
        Self::from_roll(rng.below(100))
    }

    /// Map a 0..100 roll onto the weight table
    pub fn from_roll(roll: u32) -> Self {
        let mut threshold = 0;
        for (kind, weight) in POWERUP_WEIGHTS {
            threshold += weight;
            if roll < threshold {
                return kind;
            }
        }
        PowerUpKind::AllyDrone
    }

    /// Nominal effect duration, `None` for instant pickups
    pub fn duration(&self) -> Option<f32> {
        match self {
            PowerUpKind::DualShot => Some(DUAL_SHOT_DURATION),
            PowerUpKind::Shield => Some(SHIELD_DURATION),
            PowerUpKind::Speed => Some(SPEED_BOOST_DURATION),
            PowerUpKind::MegaLaser => Some(MEGA_LASER_DURATION),
            PowerUpKind::Bomb => None,
            PowerUpKind::Homing => Some(HOMING_DURATION),
            PowerUpKind::Lightning => Some(LIGHTNING_DURATION),
            PowerUpKind::ReflectShield => Some(REFLECT_SHIELD_DURATION),
            PowerUpKind::TimeSlow => Some(TIME_SLOW_DURATION),
            PowerUpKind::AllyDrone => Some(ALLY_DRONE_DURATION),
        }
    }
}

/// A falling pickup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerUp {
    pub pos: Vec2,
    pub vel_y: f32,
    pub kind: PowerUpKind,
    pub active: bool,
    pub lifetime: f32,
}

impl Slot for PowerUp {
    fn is_active(&self) -> bool {
        self.active
    }
}

impl PowerUp {
    pub fn new(pos: Vec2, kind: PowerUpKind) -> Self {
        Self {
            pos,
            vel_y: POWERUP_FALL_SPEED,
            kind,
            active: true,
            lifetime: POWERUP_LIFETIME,
        }
    }

    /// Fall; expire off the bottom or when the lifetime runs out
    pub fn update(&mut self, dt: f32, arena: Arena) {
        if !self.active {
            return;
        }
        self.pos.y += self.vel_y * dt;
        self.lifetime -= dt;
        if self.pos.y >= arena.height_f() || self.lifetime <= 0.0 {
            self.active = false;
        }
    }

    /// Grant the effect to the player and consume the pickup
    pub fn apply(&mut self, player: &mut Player) {
        let duration = self.kind.duration().unwrap_or_default();
        match self.kind {
            PowerUpKind::DualShot => player.dual_shot.refresh(duration),
            PowerUpKind::Shield => player.shield.refresh(duration),
            PowerUpKind::Speed => player.speed.refresh(duration),
            PowerUpKind::MegaLaser => player.mega_laser.refresh(duration),
            PowerUpKind::Bomb => {
                player.bomb_count = (player.bomb_count + BOMBS_PER_PICKUP).min(MAX_BOMBS);
            }
            PowerUpKind::Homing => player.homing.refresh(duration),
            PowerUpKind::Lightning => player.lightning.refresh(duration),
            PowerUpKind::ReflectShield => player.reflect_shield.refresh(duration),
            PowerUpKind::TimeSlow => player.time_slow.refresh(duration),
            PowerUpKind::AllyDrone => {
                player.ally_drone.refresh(duration);
                player.drone_pos = player.pos + DRONE_OFFSET;
            }
        }
        self.active = false;
    }
}

/// Background star
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub bright: bool,
}

const STAR_BOTTOM_MARGIN: u32 = 5;
const STAR_SPEED_BRIGHT: f32 = 4.0;
const STAR_SPEED_DIM: f32 = 2.0;

impl Star {
    /// Scatter a star above the bottom margin; one in three is bright
    pub fn random(arena: Arena, rng: &mut impl RandomSource) -> Self {
        let x = rng.below(arena.width as u32) as f32;
        let rows = (arena.height as u32).saturating_sub(STAR_BOTTOM_MARGIN).max(1);
        let y = rng.below(rows) as f32;
        let bright = rng.below(3) == 0;
        Self {
            pos: Vec2::new(x, y),
            bright,
        }
    }

    /// Drift down, wrapping back to the top row
    pub fn update(&mut self, dt: f32, arena: Arena) {
        let speed = if self.bright {
            STAR_SPEED_BRIGHT
        } else {
            STAR_SPEED_DIM
        };
        self.pos.y += speed * dt;
        if self.pos.y >= arena.height_f() {
            self.pos.y -= arena.height_f();
        }
    }
}
