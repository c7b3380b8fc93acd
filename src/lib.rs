//! Swarm Strike - A formation-swarm arcade shooter simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, enemy AI, collisions, progression)
//! - `settings`: Runtime configuration for the headless driver
//! - `driver`: Fixed-step frame clock and autopilot for headless runs

pub mod driver;
pub mod settings;
pub mod sim;

pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (30 Hz, one tick per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 30.0;
    /// Largest frame delta the driver may feed the engine after a stall
    pub const MAX_FRAME_TIME: f32 = 0.1;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Smallest playfield the simulation is tuned for
    pub const MIN_SCREEN_WIDTH: u16 = 80;
    pub const MIN_SCREEN_HEIGHT: u16 = 24;

    /// Pool capacities
    pub const MAX_ENEMIES: usize = 50;
    pub const MAX_BULLETS: usize = 100;
    pub const MAX_POWERUPS: usize = 5;
    pub const MAX_STARS: usize = 50;

    /// Player defaults
    pub const PLAYER_STARTING_LIVES: u8 = 3;
    pub const PLAYER_MAX_HEALTH: u8 = 3;
    /// Per-axis speeds differ to compensate for tall terminal cells
    pub const PLAYER_SPEED_X: f32 = 35.0;
    pub const PLAYER_SPEED_Y: f32 = 20.0;
    pub const PLAYER_SPEED_BOOST_X: f32 = 50.0;
    pub const PLAYER_SPEED_BOOST_Y: f32 = 30.0;
    pub const PLAYER_SHOOT_COOLDOWN: f32 = 0.15;
    pub const INVINCIBILITY_TIME_HIT: f32 = 1.0;
    pub const INVINCIBILITY_TIME_DEATH: f32 = 2.0;
    pub const MAX_BOMBS: u8 = 9;
    pub const BOMBS_PER_PICKUP: u8 = 3;

    /// Projectiles
    pub const BULLET_SPEED: f32 = 30.0;
    pub const ENEMY_BULLET_SPEED: f32 = 20.0;
    pub const MEGA_LASER_PIERCE: u8 = 3;
    pub const SPECIAL_PIERCE: u8 = 10;
    pub const LIGHTNING_CHAIN: u8 = 4;
    pub const ENEMY_SHOOT_COOLDOWN_MIN: f32 = 1.5;
    pub const ENEMY_SHOOT_COOLDOWN_JITTER: f32 = 2.0;

    /// Power-ups
    pub const POWERUP_FALL_SPEED: f32 = 10.0;
    pub const POWERUP_LIFETIME: f32 = 8.0;
    pub const SHIELD_DURATION: f32 = 5.0;
    pub const SPEED_BOOST_DURATION: f32 = 10.0;
    pub const DUAL_SHOT_DURATION: f32 = 15.0;
    pub const MEGA_LASER_DURATION: f32 = 10.0;
    pub const HOMING_DURATION: f32 = 12.0;
    pub const LIGHTNING_DURATION: f32 = 8.0;
    pub const REFLECT_SHIELD_DURATION: f32 = 7.0;
    pub const TIME_SLOW_DURATION: f32 = 6.0;
    pub const ALLY_DRONE_DURATION: f32 = 20.0;

    /// Combo and special weapon
    pub const COMBO_WINDOW: f32 = 2.0;
    pub const SPECIAL_CHARGE_RATE: f32 = 10.0;
    pub const SPECIAL_CHARGE_MAX: f32 = 100.0;

    /// Enemy animation
    pub const ENEMY_ANIMATION_FRAME_TIME: f32 = 0.2;
    pub const ENEMY_ANIMATION_FRAMES: u8 = 2;
}

/// Playfield dimensions in cells. Positions outside are legal but off-screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Arena {
    pub width: u16,
    pub height: u16,
}

impl Arena {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn width_f(&self) -> f32 {
        self.width as f32
    }

    #[inline]
    pub fn height_f(&self) -> f32 {
        self.height as f32
    }

    /// True if the point lies inside the visible cell grid
    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && x < self.width_f() && y >= 0.0 && y < self.height_f()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(consts::MIN_SCREEN_WIDTH, consts::MIN_SCREEN_HEIGHT)
    }
}
