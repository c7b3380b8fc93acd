//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Injected RNG only
//! - Stable iteration order (by pool slot)
//! - No rendering or terminal dependencies

pub mod bonus;
pub mod collision;
pub mod entities;
pub mod formation;
pub mod pool;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod world;

pub use bonus::BonusStage;
pub use collision::Aabb;
pub use entities::{
    Bullet, BulletKind, Enemy, EnemyKind, EnemyState, HitOutcome, Owner, Player, PowerUp,
    PowerUpKind, Star, TimedEffect,
};
pub use formation::EnemyFormation;
pub use pool::{Pool, Slot};
pub use rng::{RandomSource, ScriptedRandom};
pub use snapshot::RenderSnapshot;
pub use state::{GamePhase, GameState, WaveKind};
pub use tick::{TickInput, tick};
pub use world::World;
