//! Bonus stage mini-mode
//!
//! Every third wave swaps the formation for twenty bees streaming across
//! the screen. Nothing shoots back; the score is paid out on completion.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entities::{Enemy, EnemyKind};
use super::pool::Pool;
use crate::Arena;

pub const BONUS_ENEMIES: usize = 20;
pub const BONUS_STAGE_DURATION: f32 = 20.0;

const BONUS_ENEMY_SPEED: f32 = 20.0;
const SPAWN_INTERVAL: f32 = 0.5;
const EDGE_INSET: f32 = 5.0;
const FIRST_ROW: f32 = 5.0;
const ROW_SPACING: f32 = 2.0;
const BOB_FREQUENCY: f32 = 0.2;
const BOB_AMPLITUDE: f32 = 3.0;
/// Enemies further than this past either edge are gone
const EXIT_MARGIN: f32 = 5.0;

const POINTS_PER_KILL: u64 = 500;
const PERFECT_BONUS: u64 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusStage {
    pub enemies: Pool<Enemy>,
    pub timer: f32,
    pub destroyed: u32,
    pub active: bool,
    pub spawn_timer: f32,
    pub spawned: u32,
}

impl Default for BonusStage {
    fn default() -> Self {
        Self {
            enemies: Pool::new(BONUS_ENEMIES),
            timer: BONUS_STAGE_DURATION,
            destroyed: 0,
            active: false,
            spawn_timer: 0.0,
            spawned: 0,
        }
    }
}

impl BonusStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset and begin a new run
    pub fn start(&mut self) {
        self.enemies.clear();
        self.timer = BONUS_STAGE_DURATION;
        self.destroyed = 0;
        self.active = true;
        self.spawn_timer = 0.0;
        self.spawned = 0;
    }

    /// Run the stage clock on `dt` and the fliers on `motion_dt`, so time
    /// slow stretches their flight but never the stage length.
    pub fn update(&mut self, dt: f32, motion_dt: f32, arena: Arena) {
        if !self.active {
            return;
        }

        self.timer -= dt;
        self.spawn_timer -= dt;

        if self.spawn_timer <= 0.0 && (self.spawned as usize) < BONUS_ENEMIES {
            self.spawn_next(arena);
        }

        let max_x = arena.width_f() + EXIT_MARGIN;
        for (_, enemy) in self.enemies.iter_active_mut() {
            enemy.update(motion_dt);
            enemy.pos.y = enemy.anchor.y + (enemy.pos.x * BOB_FREQUENCY).sin() * BOB_AMPLITUDE;
            if enemy.pos.x < -EXIT_MARGIN || enemy.pos.x > max_x {
                enemy.active = false;
            }
        }

        if self.timer <= 0.0 {
            self.active = false;
            log::debug!("bonus stage over: {}/{BONUS_ENEMIES} destroyed", self.destroyed);
        }
    }

    /// Even spawns enter from the left, odd ones from the right, each pair
    /// one row lower than the last
    fn spawn_next(&mut self, arena: Arena) {
        let n = self.spawned;
        let from_left = n % 2 == 0;
        let x = if from_left {
            EDGE_INSET
        } else {
            arena.width_f() - EDGE_INSET
        };
        let anchor = Vec2::new(x, FIRST_ROW + (n / 2) as f32 * ROW_SPACING);

        let mut enemy = Enemy::new(EnemyKind::Bee, n as usize, anchor);
        enemy.vel.x = if from_left {
            BONUS_ENEMY_SPEED
        } else {
            -BONUS_ENEMY_SPEED
        };
        self.enemies.put(n as usize, enemy);

        self.spawned += 1;
        self.spawn_timer = SPAWN_INTERVAL;
    }

    /// Shoot down the enemy in `index`. Returns false if it was not alive.
    pub fn destroy(&mut self, index: usize) -> bool {
        match self.enemies.get_mut(index) {
            Some(enemy) if enemy.active => {
                enemy.active = false;
                self.destroyed += 1;
                true
            }
            _ => false,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.active
    }

    /// 500 per kill plus 10000 for a clean sweep
    pub fn calculate_score(&self) -> u64 {
        let mut score = self.destroyed as u64 * POINTS_PER_KILL;
        if self.destroyed as usize == BONUS_ENEMIES {
            score += PERFECT_BONUS;
        }
        score
    }
}
