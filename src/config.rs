//! Scene tuning
//!
//! Defaults come from [`crate::consts`]. Overrides are read once at startup
//! (a JSON `data-config` attribute on the canvas in the browser, the file named
//! by `NEON_V_CONFIG` natively) and never written back.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Tunable animation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Logo rotation per tick (radians)
    pub rotation_step: f32,
    /// Chance per idle tick that a bolt strikes (0-1)
    pub lightning_chance: f32,
    /// Countdown value a new bolt starts with
    pub lightning_duration: f32,
    /// Countdown decrement per tick
    pub lightning_decay: f32,
    /// Midpoint-displacement depth
    pub bolt_iterations: u32,
    /// Initial sideways jitter of the bolt
    pub bolt_displacement: f32,
    /// World-to-background scale for the impact point
    pub explosion_scale: f32,
    /// Fixed RNG seed; a time-based seed is used when absent
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            rotation_step: ROTATION_STEP,
            lightning_chance: LIGHTNING_CHANCE,
            lightning_duration: LIGHTNING_DURATION,
            lightning_decay: LIGHTNING_DECAY,
            bolt_iterations: BOLT_ITERATIONS,
            bolt_displacement: BOLT_DISPLACEMENT,
            explosion_scale: EXPLOSION_SCALE,
            seed: None,
        }
    }
}

impl SceneConfig {
    /// Environment variable naming a JSON config file (native only)
    pub const ENV_VAR: &'static str = "NEON_V_CONFIG";

    /// Parse a JSON object; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    fn validate(mut self) -> Result<Self, ConfigError> {
        if self.bolt_iterations > MAX_BOLT_ITERATIONS {
            return Err(ConfigError::TooManyIterations(self.bolt_iterations));
        }
        // A bolt must count down to zero or lightning stops for good
        for (field, value) in [
            ("lightning_duration", self.lightning_duration),
            ("lightning_decay", self.lightning_decay),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        self.lightning_chance = self.lightning_chance.clamp(0.0, 1.0);
        Ok(self)
    }

    /// Read the config file named by `NEON_V_CONFIG`, if set
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(path) = std::env::var_os(Self::ENV_VAR) else {
            return Ok(None);
        };
        Self::from_file(path).map(Some)
    }

    /// Read and validate a JSON config file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load overrides, falling back to defaults on any error
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::or_default(Self::from_env())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn or_default(loaded: Result<Option<Self>, ConfigError>) -> Self {
        match loaded {
            Ok(Some(config)) => {
                log::info!("Loaded scene config from ${}", Self::ENV_VAR);
                config
            }
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("Ignoring scene config: {e}");
                Self::default()
            }
        }
    }

    /// Load overrides from the canvas `data-config` attribute
    #[cfg(target_arch = "wasm32")]
    pub fn load(canvas: &web_sys::Element) -> Self {
        let Some(json) = canvas.get_attribute("data-config") else {
            return Self::default();
        };
        match Self::from_json(&json) {
            Ok(config) => {
                log::info!("Loaded scene config from data-config");
                config
            }
            Err(e) => {
                log::warn!("Ignoring scene config: {e}");
                Self::default()
            }
        }
    }
}
