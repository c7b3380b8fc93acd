//! Game progression state machine
//!
//! Tracks the mode, the wave counter and the score. Score only ever grows,
//! and only through [`GameState::add_score`].

use serde::{Deserialize, Serialize};

use super::formation::EnemyFormation;
use crate::Arena;

pub const WAVE_TRANSITION_TIME: f32 = 3.0;
pub const GAME_OVER_TIME: f32 = 3.0;
const WAVE_CLEAR_POINTS: u64 = 1000;
const BONUS_WAVE_INTERVAL: u32 = 3;

/// Current mode of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for the first shot
    #[default]
    Menu,
    /// Countdown before a formation wave goes live
    WaveTransition,
    Playing,
    BonusStage,
    /// Run ended; terminal once the countdown elapses
    GameOver,
    Paused,
}

/// What kind of wave [`GameState::start_wave`] set up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveKind {
    Formation,
    Bonus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub wave: u32,
    pub score: u64,
    pub wave_complete: bool,
    pub wave_transition_timer: f32,
    pub game_over_timer: f32,
    pub kills_this_wave: u32,
    /// Cleared when a life is lost during the wave
    pub perfect_wave: bool,
    /// Mode to resume when unpausing
    pub paused_from: Option<GamePhase>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Menu,
            wave: 0,
            score: 0,
            wave_complete: false,
            wave_transition_timer: 0.0,
            game_over_timer: 0.0,
            kills_this_wave: 0,
            perfect_wave: true,
            paused_from: None,
        }
    }

    /// Run the countdowns of the timed modes
    pub fn update(&mut self, dt: f32) {
        match self.phase {
            GamePhase::WaveTransition => {
                self.wave_transition_timer -= dt;
                if self.wave_transition_timer <= 0.0 {
                    self.phase = GamePhase::Playing;
                    log::info!("wave {} live", self.wave);
                }
            }
            GamePhase::GameOver => {
                self.game_over_timer -= dt;
            }
            _ => {}
        }
    }

    /// Advance to the next wave. Every third wave is a bonus stage; the
    /// rest lay out a fresh formation behind a transition countdown.
    pub fn start_wave(&mut self, formation: &mut EnemyFormation, arena: Arena) -> WaveKind {
        self.wave += 1;
        self.wave_complete = false;
        self.kills_this_wave = 0;
        self.perfect_wave = true;

        if self.should_spawn_bonus_stage() {
            self.phase = GamePhase::BonusStage;
            log::info!("wave {}: bonus stage", self.wave);
            WaveKind::Bonus
        } else {
            formation.init(arena, self.wave);
            self.phase = GamePhase::WaveTransition;
            self.wave_transition_timer = WAVE_TRANSITION_TIME;
            log::info!("wave {} incoming", self.wave);
            WaveKind::Formation
        }
    }

    /// Pay the wave clear bonus, doubled for a perfect wave. Returns the
    /// amount awarded.
    pub fn complete_wave(&mut self) -> u64 {
        self.wave_complete = true;
        let mut bonus = WAVE_CLEAR_POINTS * self.wave as u64;
        if self.perfect_wave {
            bonus *= 2;
        }
        self.add_score(bonus);
        log::info!(
            "wave {} cleared (+{bonus}{})",
            self.wave,
            if self.perfect_wave { ", perfect" } else { "" }
        );
        bonus
    }

    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    pub fn record_kill(&mut self) {
        self.kills_this_wave += 1;
    }

    /// A life was lost this wave
    pub fn player_died(&mut self) {
        self.perfect_wave = false;
    }

    pub fn should_spawn_bonus_stage(&self) -> bool {
        self.wave > 0 && self.wave % BONUS_WAVE_INTERVAL == 0
    }

    /// Enter game over once the lives run out. Returns true when the run
    /// is finished for good.
    pub fn check_game_over(&mut self, lives: u8) -> bool {
        if lives == 0 && self.phase != GamePhase::GameOver {
            self.phase = GamePhase::GameOver;
            self.game_over_timer = GAME_OVER_TIME;
            log::info!("game over on wave {} with {} points", self.wave, self.score);
        }
        self.is_terminal()
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == GamePhase::GameOver && self.game_over_timer <= 0.0
    }

    /// Toggle between an active mode and paused, resuming exactly the mode
    /// that was paused. Other modes ignore the request.
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing | GamePhase::BonusStage => {
                self.paused_from = Some(self.phase);
                self.phase = GamePhase::Paused;
            }
            GamePhase::Paused => {
                self.phase = self.paused_from.take().unwrap_or(GamePhase::Playing);
            }
            _ => {}
        }
    }
}
