//! Sandbox configuration. Loaded from sandbox.ron at startup.

use physics::SceneConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which content to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneChoice {
    /// A box dropped onto a plane, printed every step.
    Basic,
    /// Rugby pitch with goal, ball and catapult.
    Pitch,
    /// Jointed objects: swing, driven catapult arm, spring, knights.
    Playground,
}

/// Persistent sandbox settings. Loaded from `sandbox.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    #[serde(default = "default_scene")]
    pub scene: SceneChoice,
    /// Simulation steps per simulated second.
    #[serde(default = "default_step_rate")]
    pub step_rate_hz: f64,
    /// Stop after this many steps. 0 runs until interrupted.
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,
    /// Print the tracked actor every N steps.
    #[serde(default = "default_print_every")]
    pub print_every: u64,
    /// Pace steps against the wall clock instead of running flat out.
    #[serde(default)]
    pub realtime: bool,
    /// Gravity and visualization flags.
    #[serde(default)]
    pub physics: SceneConfig,
}

fn default_scene() -> SceneChoice {
    SceneChoice::Basic
}
fn default_step_rate() -> f64 {
    60.0
}
fn default_max_steps() -> u64 {
    600
}
fn default_print_every() -> u64 {
    1
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            scene: default_scene(),
            step_rate_hz: default_step_rate(),
            max_steps: default_max_steps(),
            print_every: default_print_every(),
            realtime: false,
            physics: SceneConfig::default(),
        }
    }
}

impl SandboxConfig {
    /// Load config from `sandbox.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(data) => match Self::from_ron(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            },
            Err(_) => log::info!("No config at {:?}, using defaults", path),
        }
        Self::default()
    }

    pub fn from_ron(data: &str) -> Result<Self, ron::error::SpannedError> {
        let mut config: Self = ron::from_str(data)?;
        if !(config.step_rate_hz.is_finite() && config.step_rate_hz > 0.0) {
            log::warn!(
                "step_rate_hz {} is not usable, falling back to {}",
                config.step_rate_hz,
                default_step_rate()
            );
            config.step_rate_hz = default_step_rate();
        }
        config.print_every = config.print_every.max(1);
        Ok(config)
    }

    /// Fixed time step in seconds.
    pub fn dt(&self) -> f32 {
        (1.0 / self.step_rate_hz) as f32
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("sandbox.ron")
}
