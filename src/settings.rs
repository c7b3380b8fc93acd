//! Runtime settings for the headless driver
//!
//! Loaded from an optional JSON file. Missing fields take their defaults.

use std::path::Path;

use anyhow::{Context, ensure};
use serde::{Deserialize, Serialize};

use crate::Arena;
use crate::consts::{MAX_FRAME_TIME, MIN_SCREEN_HEIGHT, MIN_SCREEN_WIDTH};

/// Driver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed; `None` seeds from the clock
    pub seed: Option<u64>,

    // === Playfield ===
    pub screen_width: u16,
    pub screen_height: u16,

    // === Timing ===
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Largest frame delta fed to the accumulator after a stall (seconds)
    pub max_frame_time: f32,

    // === Debug ===
    /// Start with god-mode on
    pub god_mode: bool,
    /// Frames the autopilot plays when no count is given on the command line
    pub demo_ticks: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            screen_width: MIN_SCREEN_WIDTH,
            screen_height: MIN_SCREEN_HEIGHT,
            tick_rate: 30,
            max_frame_time: MAX_FRAME_TIME,
            god_mode: false,
            demo_ticks: 1800,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid settings JSON")
    }

    /// Load settings from a JSON file, falling back to defaults when the
    /// file is missing or malformed
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let loaded = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))
            .and_then(|json| Self::from_json(&json));

        match loaded {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("Using default settings: {err:#}");
                Self::default()
            }
        }
    }

    /// Reject playfields smaller than 80x24 and a zero tick rate
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.screen_width >= MIN_SCREEN_WIDTH && self.screen_height >= MIN_SCREEN_HEIGHT,
            "screen {}x{} is too small, need at least {MIN_SCREEN_WIDTH}x{MIN_SCREEN_HEIGHT}",
            self.screen_width,
            self.screen_height
        );
        ensure!(self.tick_rate > 0, "tick_rate must be positive");
        ensure!(
            self.max_frame_time > 0.0,
            "max_frame_time must be positive, got {}",
            self.max_frame_time
        );
        Ok(())
    }

    pub fn arena(&self) -> Arena {
        Arena::new(self.screen_width, self.screen_height)
    }

    /// Fixed step length in seconds
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.arena(), Arena::new(80, 24));
        assert!((settings.tick_dt() - 1.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "seed": 7, "screen_width": 120 }"#).unwrap();
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.screen_width, 120);
        assert_eq!(settings.screen_height, MIN_SCREEN_HEIGHT);
        assert_eq!(settings.tick_rate, 30);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Settings::from_json("{ seed: ").is_err());
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let settings = Settings::load("/definitely/not/here/settings.json");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_validate_rejects_small_screen() {
        let settings = Settings {
            screen_width: 60,
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("too small"));
    }

    #[test]
    fn test_validate_rejects_zero_tick_rate() {
        let settings = Settings {
            tick_rate: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
