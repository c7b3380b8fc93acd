//! The simulation aggregate
//!
//! One `World` holds every piece of mutable game state. Independent worlds
//! share nothing, so several can run side by side.

use rand_pcg::Pcg32;

use super::bonus::BonusStage;
use super::entities::{Bullet, Player, PowerUp, Star};
use super::formation::EnemyFormation;
use super::pool::Pool;
use super::rng::{self, RandomSource};
use super::state::GameState;
use crate::consts::{MAX_BULLETS, MAX_POWERUPS, MAX_STARS};
use crate::{Arena, Settings};

#[derive(Debug, Clone)]
pub struct World<R = Pcg32> {
    pub arena: Arena,
    pub player: Player,
    /// Player and enemy shots share one pool
    pub bullets: Pool<Bullet>,
    pub powerups: Pool<PowerUp>,
    pub stars: Vec<Star>,
    pub formation: EnemyFormation,
    pub bonus: BonusStage,
    pub state: GameState,
    /// Ticks simulated outside of pause
    pub time_ticks: u64,
    pub rng: R,
}

impl World<Pcg32> {
    /// A seeded world on the default 80x24 arena
    pub fn new(seed: u64) -> Self {
        Self::with_rng(Arena::default(), rng::seeded(seed))
    }

    /// A seeded world shaped by the driver settings
    pub fn from_settings(settings: &Settings, seed: u64) -> Self {
        let mut world = Self::with_rng(settings.arena(), rng::seeded(seed));
        world.player.god_mode = settings.god_mode;
        world
    }
}

impl<R: RandomSource> World<R> {
    /// A world in the menu with a scattered starfield
    pub fn with_rng(arena: Arena, mut rng: R) -> Self {
        let stars = (0..MAX_STARS).map(|_| Star::random(arena, &mut rng)).collect();
        Self {
            arena,
            player: Player::new(arena),
            bullets: Pool::new(MAX_BULLETS),
            powerups: Pool::new(MAX_POWERUPS),
            stars,
            formation: EnemyFormation::default(),
            bonus: BonusStage::new(),
            state: GameState::new(),
            time_ticks: 0,
            rng,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::ScriptedRandom;
    use crate::sim::state::GamePhase;

    #[test]
    fn test_new_world_starts_in_menu() {
        let world = World::new(1);
        assert_eq!(world.state.phase, GamePhase::Menu);
        assert_eq!(world.stars.len(), MAX_STARS);
        assert_eq!(world.bullets.capacity(), MAX_BULLETS);
        assert_eq!(world.powerups.capacity(), MAX_POWERUPS);
        assert_eq!(world.formation.count_active(), 0);
        assert!(world
            .stars
            .iter()
            .all(|s| world.arena.contains(s.pos.x, s.pos.y)));
    }

    #[test]
    fn test_settings_apply_to_world() {
        let settings = Settings {
            screen_width: 100,
            screen_height: 30,
            god_mode: true,
            ..Default::default()
        };
        let world = World::from_settings(&settings, 3);
        assert_eq!(world.arena, Arena::new(100, 30));
        assert!(world.player.god_mode);
    }

    #[test]
    fn test_worlds_are_independent() {
        let mut a = World::with_rng(Arena::default(), ScriptedRandom::zeros());
        let b = World::with_rng(Arena::default(), ScriptedRandom::zeros());
        a.state.add_score(100);
        a.player.lives = 1;
        assert_eq!(b.state.score, 0);
        assert_eq!(b.player.lives, 3);
    }
}
