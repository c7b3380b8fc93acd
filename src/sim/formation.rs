//! Enemy formation AI
//!
//! Owns the wave's enemy pool and drives the formation sweep, dive
//! scheduling, the boss capture beam, and the dive/return flight paths.

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entities::{Enemy, EnemyKind, EnemyState, Player};
use super::pool::Pool;
use super::rng::RandomSource;
use crate::Arena;
use crate::consts::MAX_ENEMIES;

// Grid layout
const FORMATION_ROWS: usize = 5;
const FORMATION_COLS: usize = 10;
const FORMATION_SPACING_X: f32 = 6.0;
const FORMATION_SPACING_Y: f32 = 3.0;
const FORMATION_START_Y: f32 = 3.0;

// Sweep
const FORMATION_MOVE_SPEED: f32 = 15.0;
const FORMATION_SWEEP_LIMIT: f32 = 10.0;

// Scheduling
const DIVE_INTERVAL_BASE: f32 = 3.0;
const DIVE_INTERVAL_MIN: f32 = 0.5;
const CAPTURE_INTERVAL: f32 = 15.0;
/// Dive path index reserved for the capture beam run
pub const CAPTURE_PATTERN: u8 = 3;
const DIVE_PATTERNS: u32 = 3;

// Flight
const CAPTURE_RANGE: f32 = 2.0;
const DIVE_FLOOR_OFFSET: f32 = 5.0;
const DIVE_EXIT_OFFSET: f32 = 5.0;
const DIVE_RETURN_PROGRESS: f32 = 1.25;
const EASE_RATE: f32 = 2.0;
const SNAP_DISTANCE: f32 = 1.0;

/// Side-arc amplitude for each regular dive pattern
fn dive_arc_amplitude(pattern: u8) -> f32 {
    match pattern {
        0 => 15.0,
        1 => -15.0,
        _ => 8.0,
    }
}

/// The wave's enemies plus the timers that decide who attacks next
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyFormation {
    pub enemies: Pool<Enemy>,
    /// Horizontal sweep offset, always within +/-10
    pub offset_x: f32,
    pub direction: f32,
    pub dive_spawn_timer: f32,
    pub capture_beam_timer: f32,
    /// Equal to the wave number
    pub difficulty: u32,
}

impl Default for EnemyFormation {
    fn default() -> Self {
        Self {
            enemies: Pool::new(MAX_ENEMIES),
            offset_x: 0.0,
            direction: 1.0,
            dive_spawn_timer: DIVE_INTERVAL_BASE,
            capture_beam_timer: CAPTURE_INTERVAL,
            difficulty: 0,
        }
    }
}

impl EnemyFormation {
    /// A freshly laid-out formation for `wave`
    pub fn new(arena: Arena, wave: u32) -> Self {
        let mut formation = Self::default();
        formation.init(arena, wave);
        formation
    }

    /// Reset timers and fill the 5x10 grid, centred horizontally.
    /// Row 0 is bosses, rows 1-2 butterflies, rows 3-4 bees.
    pub fn init(&mut self, arena: Arena, wave: u32) {
        self.enemies.clear();
        self.offset_x = 0.0;
        self.direction = 1.0;
        self.dive_spawn_timer = DIVE_INTERVAL_BASE;
        self.capture_beam_timer = CAPTURE_INTERVAL;
        self.difficulty = wave;

        let formation_width = FORMATION_COLS as f32 * FORMATION_SPACING_X;
        let start_x = (arena.width_f() - formation_width) / 2.0;

        let capacity = self.enemies.capacity();
        for row in 0..FORMATION_ROWS {
            let kind = match row {
                0 => EnemyKind::Boss,
                1 | 2 => EnemyKind::Butterfly,
                _ => EnemyKind::Bee,
            };
            for col in 0..FORMATION_COLS {
                let index = row * FORMATION_COLS + col;
                if index >= capacity {
                    return;
                }
                let anchor = Vec2::new(
                    start_x + col as f32 * FORMATION_SPACING_X,
                    FORMATION_START_Y + row as f32 * FORMATION_SPACING_Y,
                );
                self.enemies.put(index, Enemy::new(kind, index, anchor));
            }
        }
    }

    /// Sweep the grid side to side and weave enemies still in formation
    pub fn update_formation(&mut self, dt: f32) {
        let speed_multiplier = 1.0 + self.difficulty as f32 * 0.1;
        self.offset_x += self.direction * FORMATION_MOVE_SPEED * speed_multiplier * dt;

        if self.offset_x > FORMATION_SWEEP_LIMIT {
            self.offset_x = FORMATION_SWEEP_LIMIT;
            self.direction = -1.0;
        } else if self.offset_x < -FORMATION_SWEEP_LIMIT {
            self.offset_x = -FORMATION_SWEEP_LIMIT;
            self.direction = 1.0;
        }

        let offset = self.offset_x;
        for (_, enemy) in self.enemies.iter_active_mut() {
            if enemy.state != EnemyState::Formation {
                continue;
            }
            let weave = (enemy.anchor.x * 0.5 + offset * 0.1).sin() * 1.5;
            enemy.pos.x = enemy.anchor.x + offset + weave;
            enemy.pos.y = enemy.anchor.y + (offset * 0.3).cos() * 0.5;
        }
    }

    /// Count down the dive scheduler and, on expiry, send 1-3 (2-4 past
    /// wave 3) distinct formation enemies diving. Returns how many left.
    pub fn trigger_dive(&mut self, dt: f32, rng: &mut impl RandomSource) -> usize {
        self.dive_spawn_timer -= dt;
        if self.dive_spawn_timer > 0.0 {
            return 0;
        }
        self.dive_spawn_timer =
            (DIVE_INTERVAL_BASE - self.difficulty as f32 * 0.2).max(DIVE_INTERVAL_MIN);

        let mut available: Vec<usize> = self
            .enemies
            .iter_active()
            .filter(|(_, e)| e.state == EnemyState::Formation)
            .map(|(i, _)| i)
            .collect();
        if available.is_empty() {
            return 0;
        }

        let base = if self.difficulty > 3 { 2 } else { 1 };
        let dive_count = (base + rng.below(3)) as usize;

        let mut launched = 0;
        while launched < dive_count && !available.is_empty() {
            let pick = rng.below(available.len() as u32) as usize;
            let index = available.swap_remove(pick);
            let pattern = rng.below(DIVE_PATTERNS) as u8;
            self.enemies[index].start_dive(pattern);
            log::debug!("enemy {index} dives on pattern {pattern}");
            launched += 1;
        }
        launched
    }

    /// Count down the capture beam and send the first boss in formation on a
    /// capture run. Paused while the player is captured or already dual.
    pub fn trigger_capture(&mut self, dt: f32, player: &Player) -> Option<usize> {
        if player.captured || player.dual_fighter {
            return None;
        }

        self.capture_beam_timer -= dt;
        if self.capture_beam_timer > 0.0 {
            return None;
        }
        self.capture_beam_timer = CAPTURE_INTERVAL;

        let (index, boss) = self
            .enemies
            .iter_active_mut()
            .find(|(_, e)| e.kind == EnemyKind::Boss && e.state == EnemyState::Formation)?;
        boss.start_dive(CAPTURE_PATTERN);
        log::debug!("boss {index} starts a capture run");
        Some(index)
    }

    /// Fly diving enemies toward the player and ease returning ones home
    pub fn update_dives(&mut self, dt: f32, player: &mut Player, arena: Arena) {
        let speed_multiplier = 1.0 + self.difficulty as f32 * 0.15;

        for (index, enemy) in self.enemies.iter_active_mut() {
            match enemy.state {
                EnemyState::Diving => {
                    enemy.dive_timer += dt;
                    let progress = enemy.dive_timer * speed_multiplier * 0.5;

                    if progress < 1.0 {
                        let target = Vec2::new(player.pos.x, arena.height_f() - DIVE_FLOOR_OFFSET);
                        let line = enemy.anchor + (target - enemy.anchor) * progress;

                        if enemy.kind == EnemyKind::Boss && !enemy.has_captured_player {
                            enemy.pos = line;
                            let gap = (enemy.pos - player.pos).abs();
                            if gap.x < CAPTURE_RANGE
                                && gap.y < CAPTURE_RANGE
                                && !player.captured
                                && !player.dual_fighter
                            {
                                player.capture();
                                enemy.has_captured_player = true;
                                log::debug!("boss {index} captured the player");
                            }
                        } else {
                            let amplitude = dive_arc_amplitude(enemy.dive_path_index);
                            let arc = (progress * PI).sin() * amplitude;
                            let side = if enemy.pos.x < target.x { 1.0 } else { -1.0 };
                            enemy.pos = Vec2::new(line.x + arc * side, line.y);
                        }
                    } else {
                        let exit_y = arena.height_f() + DIVE_EXIT_OFFSET;
                        enemy.pos.y += (exit_y - enemy.pos.y) * dt * EASE_RATE;

                        if progress > DIVE_RETURN_PROGRESS {
                            enemy.state = EnemyState::Returning;
                            enemy.dive_timer = 0.0;
                        }
                    }
                }
                EnemyState::Returning => {
                    let delta = enemy.anchor - enemy.pos;
                    enemy.pos += delta * dt * EASE_RATE;

                    if delta.x.abs() < SNAP_DISTANCE && delta.y.abs() < SNAP_DISTANCE {
                        enemy.state = EnemyState::Formation;
                        enemy.pos = enemy.anchor;
                    }
                }
                EnemyState::Formation | EnemyState::CapturedEscort => {}
            }
        }
    }

    /// Active enemies left in the wave; zero means the wave is clear
    pub fn count_active(&self) -> usize {
        self.enemies.active_count()
    }
}
