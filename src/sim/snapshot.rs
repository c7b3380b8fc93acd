//! Read-only render view of a world
//!
//! A front end draws from the snapshot alone; it never touches the world.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entities::{BulletKind, EnemyKind, EnemyState, Owner, PowerUpKind};
use super::state::GamePhase;
use super::world::World;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub captured: bool,
    pub dual_fighter: bool,
    pub god_mode: bool,
    pub invincible: bool,
    pub shield: bool,
    pub speed: bool,
    pub dual_shot: bool,
    pub mega_laser: bool,
    pub homing: bool,
    pub lightning: bool,
    pub reflect_shield: bool,
    pub time_slow: bool,
    /// Ally drone position while the drone is out
    pub drone: Option<Vec2>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub slot: usize,
    pub pos: Vec2,
    pub kind: EnemyKind,
    pub state: EnemyState,
    pub frame: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletView {
    pub slot: usize,
    pub pos: Vec2,
    pub owner: Owner,
    pub kind: BulletKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpView {
    pub slot: usize,
    pub pos: Vec2,
    pub kind: PowerUpKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarView {
    pub pos: Vec2,
    pub bright: bool,
}

/// Everything a renderer and HUD need for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub phase: GamePhase,
    pub wave: u32,
    pub score: u64,
    pub lives: u8,
    pub health: u8,
    pub max_health: u8,
    pub combo: u32,
    pub multiplier: u32,
    /// Special weapon charge as 0..=1
    pub special: f32,
    pub special_ready: bool,
    pub bombs: u8,
    pub wave_transition_timer: f32,
    /// Seconds left while a bonus stage runs
    pub bonus_timer: Option<f32>,
    pub player: PlayerView,
    /// Bonus stage enemies during a bonus stage, the formation otherwise
    pub enemies: Vec<EnemyView>,
    pub bullets: Vec<BulletView>,
    pub powerups: Vec<PowerUpView>,
    pub stars: Vec<StarView>,
}

impl<R> World<R> {
    pub fn snapshot(&self) -> RenderSnapshot {
        let player = &self.player;
        let in_bonus = self.state.phase == GamePhase::BonusStage
            || (self.state.phase == GamePhase::Paused
                && self.state.paused_from == Some(GamePhase::BonusStage));

        let enemy_pool = if in_bonus {
            &self.bonus.enemies
        } else {
            &self.formation.enemies
        };
        let enemies = enemy_pool
            .iter_active()
            .map(|(slot, e)| EnemyView {
                slot,
                pos: e.pos,
                kind: e.kind,
                state: e.state,
                frame: e.animation_frame,
            })
            .collect();

        let bullets = self
            .bullets
            .iter_active()
            .map(|(slot, b)| BulletView {
                slot,
                pos: b.pos,
                owner: b.owner,
                kind: b.kind,
            })
            .collect();

        let powerups = self
            .powerups
            .iter_active()
            .map(|(slot, p)| PowerUpView {
                slot,
                pos: p.pos,
                kind: p.kind,
            })
            .collect();

        let stars = self
            .stars
            .iter()
            .map(|s| StarView {
                pos: s.pos,
                bright: s.bright,
            })
            .collect();

        RenderSnapshot {
            phase: self.state.phase,
            wave: self.state.wave,
            score: self.state.score,
            lives: player.lives,
            health: player.health,
            max_health: player.max_health,
            combo: player.combo_count,
            multiplier: player.score_multiplier,
            special: player.special_fraction(),
            special_ready: player.special_ready,
            bombs: player.bomb_count,
            wave_transition_timer: self.state.wave_transition_timer.max(0.0),
            bonus_timer: in_bonus.then_some(self.bonus.timer.max(0.0)),
            player: PlayerView {
                pos: player.pos,
                captured: player.captured,
                dual_fighter: player.dual_fighter,
                god_mode: player.god_mode,
                invincible: player.invincibility_timer > 0.0,
                shield: player.shield.active,
                speed: player.speed.active,
                dual_shot: player.dual_shot.active,
                mega_laser: player.mega_laser.active,
                homing: player.homing.active,
                lightning: player.lightning.active,
                reflect_shield: player.reflect_shield.active,
                time_slow: player.time_slow.active,
                drone: player.ally_drone.active.then_some(player.drone_pos),
            },
            enemies,
            bullets,
            powerups,
            stars,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Arena;
    use crate::sim::entities::Bullet;
    use crate::sim::rng::ScriptedRandom;

    fn world() -> World<ScriptedRandom> {
        World::with_rng(Arena::default(), ScriptedRandom::new(vec![999]))
    }

    #[test]
    fn test_snapshot_lists_active_slots_only() {
        let mut world = world();
        world.state.start_wave(&mut world.formation, world.arena);
        world.formation.enemies[4].active = false;
        world.bullets.put(7, Bullet::enemy(Vec2::new(3.0, 3.0)));

        let snap = world.snapshot();
        assert_eq!(snap.phase, GamePhase::WaveTransition);
        assert_eq!(snap.wave, 1);
        assert_eq!(snap.enemies.len(), 49);
        assert!(snap.enemies.iter().all(|e| e.slot != 4));
        assert_eq!(snap.bullets.len(), 1);
        assert_eq!(snap.bullets[0].slot, 7);
        assert_eq!(snap.bullets[0].owner, Owner::Enemy);
        assert_eq!(snap.bonus_timer, None);
    }

    #[test]
    fn test_snapshot_hud_fields() {
        let mut world = world();
        world.player.bomb_count = 2;
        world.player.special_charge = 50.0;
        world.player.ally_drone.refresh(5.0);

        let snap = world.snapshot();
        assert_eq!(snap.lives, 3);
        assert_eq!(snap.bombs, 2);
        assert_eq!(snap.special, 0.5);
        assert_eq!(snap.player.drone, Some(world.player.drone_pos));
        assert!(!snap.player.shield);
    }

    #[test]
    fn test_snapshot_shows_bonus_enemies() {
        let mut world = world();
        world.state.phase = GamePhase::BonusStage;
        world.bonus.start();
        world.bonus.update(0.1, 0.1, world.arena);

        let snap = world.snapshot();
        assert_eq!(snap.enemies.len(), 1);
        assert!(snap.bonus_timer.is_some());
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let json = serde_json::to_string(&world().snapshot()).unwrap();
        assert!(json.contains("\"phase\":\"Menu\""));
    }
}
