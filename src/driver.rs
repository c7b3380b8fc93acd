//! Headless driving helpers
//!
//! `FixedStep` turns variable frame times into fixed simulation steps and
//! `Autopilot` plays the game from the world state alone.

use crate::consts::MAX_SUBSTEPS;
use crate::sim::{Enemy, EnemyState, GamePhase, Pool, TickInput, World};

/// Accumulates frame time and releases it in fixed steps
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: f32,
    max_frame_time: f32,
    accumulator: f32,
}

impl FixedStep {
    pub fn new(step: f32, max_frame_time: f32) -> Self {
        Self {
            step,
            max_frame_time,
            accumulator: 0.0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Feed one frame's elapsed time; returns how many steps to simulate.
    /// Stalls are clamped and at most `MAX_SUBSTEPS` run per frame.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, self.max_frame_time);

        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < MAX_SUBSTEPS {
            self.accumulator -= self.step;
            substeps += 1;
        }
        substeps
    }
}

/// Frames between autopilot bombs
const BOMB_COOLDOWN_FRAMES: u32 = 90;
/// Divers within this many rows of the ship count as a threat
const THREAT_ROWS: f32 = 8.0;
const THREAT_COUNT: usize = 3;
/// Close enough horizontally to stop tracking
const AIM_TOLERANCE: f32 = 0.5;

/// Simple bot: track the nearest enemy column and hold fire
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    bomb_cooldown: u32,
}

impl Autopilot {
    pub fn decide<R>(&mut self, world: &World<R>) -> TickInput {
        self.bomb_cooldown = self.bomb_cooldown.saturating_sub(1);

        let enemies = match world.state.phase {
            GamePhase::Menu => {
                return TickInput {
                    shoot: true,
                    ..Default::default()
                };
            }
            GamePhase::Playing => &world.formation.enemies,
            GamePhase::BonusStage => &world.bonus.enemies,
            _ => return TickInput::default(),
        };

        let player = &world.player;
        let move_x = match nearest_column(enemies, player.pos.x) {
            Some(x) if x > player.pos.x + AIM_TOLERANCE => 1,
            Some(x) if x < player.pos.x - AIM_TOLERANCE => -1,
            _ => 0,
        };

        let threats = enemies
            .iter_active()
            .filter(|(_, e)| e.state == EnemyState::Diving)
            .filter(|(_, e)| (player.pos.y - e.pos.y).abs() < THREAT_ROWS)
            .count();
        let bomb = world.state.phase == GamePhase::Playing
            && player.bomb_count > 0
            && self.bomb_cooldown == 0
            && threats >= THREAT_COUNT;
        if bomb {
            self.bomb_cooldown = BOMB_COOLDOWN_FRAMES;
        }

        TickInput {
            move_x,
            move_y: 0,
            shoot: true,
            bomb,
            special: player.special_ready,
            ..Default::default()
        }
    }
}

fn nearest_column(enemies: &Pool<Enemy>, x: f32) -> Option<f32> {
    enemies
        .iter_active()
        .map(|(_, e)| e.pos.x)
        .min_by(|a, b| (a - x).abs().total_cmp(&(b - x).abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Arena;
    use crate::consts::SIM_DT;
    use crate::sim::{ScriptedRandom, tick};

    #[test]
    fn test_fixed_step_accumulates() {
        let mut clock = FixedStep::new(0.1, 1.0);
        assert_eq!(clock.advance(0.05), 0);
        assert_eq!(clock.advance(0.06), 1);
        assert_eq!(clock.advance(0.2), 2);
    }

    #[test]
    fn test_fixed_step_clamps_stalls() {
        let mut clock = FixedStep::new(SIM_DT, 0.1);
        // A 5 s stall only releases the clamped 0.1 s
        assert_eq!(clock.advance(5.0), 3);
        assert!(clock.advance(0.0) <= 1);
    }

    #[test]
    fn test_fixed_step_substep_cap() {
        let mut clock = FixedStep::new(0.01, 1.0);
        assert_eq!(clock.advance(0.5), MAX_SUBSTEPS);
    }

    #[test]
    fn test_autopilot_starts_game() {
        let world = World::with_rng(Arena::default(), ScriptedRandom::zeros());
        let input = Autopilot::default().decide(&world);
        assert!(input.shoot);
        assert_eq!(input.move_x, 0);
    }

    #[test]
    fn test_autopilot_tracks_nearest_column() {
        let mut world = World::with_rng(Arena::default(), ScriptedRandom::new(vec![999]));
        world.state.start_wave(&mut world.formation, world.arena);
        world.state.phase = GamePhase::Playing;
        for (i, enemy) in world.formation.enemies.iter_mut().enumerate() {
            enemy.active = i == 0;
        }

        let input = Autopilot::default().decide(&world);
        // The only enemy sits at x = 10, left of the ship
        assert_eq!(input.move_x, -1);
        assert!(input.shoot);
        assert!(!input.bomb);
    }

    #[test]
    fn test_autopilot_bombs_when_swarmed() {
        let mut world = World::with_rng(Arena::default(), ScriptedRandom::new(vec![999]));
        world.state.start_wave(&mut world.formation, world.arena);
        world.state.phase = GamePhase::Playing;
        world.player.bomb_count = 2;
        let near = world.player.pos - glam::Vec2::new(0.0, 3.0);
        for index in 0..THREAT_COUNT {
            let enemy = &mut world.formation.enemies[index];
            enemy.start_dive(0);
            enemy.pos = near;
        }

        let mut pilot = Autopilot::default();
        assert!(pilot.decide(&world).bomb);
        // Cooldown stops a second bomb on the next frame
        assert!(!pilot.decide(&world).bomb);
    }

    #[test]
    fn test_autopilot_run_is_stable() {
        let mut world = World::new(7);
        let mut pilot = Autopilot::default();
        for _ in 0..900 {
            let input = pilot.decide(&world);
            tick(&mut world, &input, SIM_DT);
        }
        assert_ne!(world.state.phase, GamePhase::Menu);
        assert!(world.state.wave >= 1);
        assert!(world.time_ticks > 0);
    }
}
