//! Game settings
//!
//! Defaults cover everything; an optional `astrobelt.json` next to the
//! working directory overrides them. No CLI flags, no environment variables
//! beyond `RUST_LOG`.

use std::fs;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Scheduling policy for the fixed-tick thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TickStyle {
    /// Busy-wait until each tick deadline. Lowest jitter, burns a core.
    Spin,
    /// Block on the control-input queue with a deadline timeout. Same
    /// external timing contract, wakes early on input, nearly idle CPU.
    #[default]
    Sleep,
}

/// Simulation/runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Window width in pixels
    pub window_width: u32,
    /// Window height in pixels
    pub window_height: u32,
    /// Fixed simulation rate (ticks per second)
    pub tick_hz: u32,
    /// Tick-thread scheduling policy
    pub tick_style: TickStyle,
    /// Render/event loop frame cap (frames per second)
    pub frame_cap_hz: u32,
    /// Minimum delay between asteroid spawns (milliseconds)
    pub spawn_interval_min_ms: u64,
    /// Maximum delay between asteroid spawns (milliseconds)
    pub spawn_interval_max_ms: u64,
    /// Minimum time between player shots (milliseconds)
    pub shot_cooldown_ms: u64,
    /// RNG seed; `None` draws one from entropy
    pub rng_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_width: 500,
            window_height: 500,
            tick_hz: 550,
            tick_style: TickStyle::Sleep,
            frame_cap_hz: 120,
            spawn_interval_min_ms: 1000,
            spawn_interval_max_ms: 2000,
            shot_cooldown_ms: 250,
            rng_seed: None,
        }
    }
}

impl Settings {
    const FILE_NAME: &'static str = "astrobelt.json";

    /// Load settings, falling back to defaults when no override file exists
    /// or it fails to parse.
    pub fn load() -> Self {
        match fs::read_to_string(Self::FILE_NAME) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", Self::FILE_NAME);
                    settings
                }
                Err(err) => {
                    log::warn!("Ignoring malformed {}: {err}", Self::FILE_NAME);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Duration of one simulation tick.
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_hz.max(1)))
    }

    /// Seconds per tick, for integration.
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_hz.max(1) as f32
    }

    /// Duration of one render frame under the cap.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_cap_hz.max(1)))
    }

    pub fn shot_cooldown(&self) -> Duration {
        Duration::from_millis(self.shot_cooldown_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_sane() {
        let s = Settings::default();
        assert!(s.tick_hz >= 500);
        assert!(s.spawn_interval_min_ms <= s.spawn_interval_max_ms);
        assert_eq!(s.tick_style, TickStyle::Sleep);
    }

    #[test]
    fn test_tick_duration_matches_rate() {
        let s = Settings {
            tick_hz: 500,
            ..Default::default()
        };
        assert_eq!(s.tick_duration(), Duration::from_millis(2));
        assert!((s.tick_dt() - 0.002).abs() < 1e-7);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s: Settings = serde_json::from_str(r#"{"tick_hz": 600}"#).unwrap();
        assert_eq!(s.tick_hz, 600);
        assert_eq!(s.window_width, Settings::default().window_width);
    }
}
