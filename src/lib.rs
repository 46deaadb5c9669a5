//! Neon V - animated logo with procedural lightning over a retro grid
//!
//! Core modules:
//! - `math`: Column-major 4x4 transform library
//! - `geometry`: Static logo mesh and midpoint-displacement lightning bolts
//! - `scene`: Animation state, fixed-step tick and per-frame transforms
//! - `background`: Retro grid background and its explosion trigger
//! - `renderer`: WebGPU render pipelines
//! - `config`: Tunable scene parameters

pub mod background;
pub mod config;
pub mod error;
pub mod geometry;
pub mod math;
pub mod renderer;
pub mod scene;

pub use background::{BackgroundEffect, ExplosionTarget};
pub use config::SceneConfig;
pub use error::{ConfigError, InitError, MatrixError};
pub use scene::Scene;

/// Scene configuration constants
pub mod consts {
    use std::f32::consts::FRAC_PI_4;

    /// Fixed animation timestep (the per-tick constants below assume 60 Hz)
    pub const TICK_DT: f32 = 1.0 / 60.0;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Camera
    pub const FOV_Y: f32 = FRAC_PI_4;
    pub const Z_NEAR: f32 = 0.1;
    pub const Z_FAR: f32 = 100.0;
    pub const CAMERA_DISTANCE: f32 = 3.0;

    /// Logo rotation per tick (radians)
    pub const ROTATION_STEP: f32 = 0.02;

    /// Phong lighting inputs for the logo
    pub const LOGO_COLOR: [f32; 3] = [0.0, 0.7, 1.0];
    pub const LIGHT_POSITION: [f32; 3] = [2.0, 2.0, 5.0];
    pub const VIEW_POSITION: [f32; 3] = [0.0, 0.0, CAMERA_DISTANCE];

    /// Chance per idle tick that a bolt strikes
    pub const LIGHTNING_CHANCE: f32 = 0.02;
    /// Bolt countdown start value and per-tick decrement
    pub const LIGHTNING_DURATION: f32 = 1.0;
    pub const LIGHTNING_DECAY: f32 = 0.05;

    /// Bolt generation
    pub const BOLT_ITERATIONS: u32 = 5;
    pub const BOLT_DISPLACEMENT: f32 = 2.0;
    /// Upper bound for `BOLT_ITERATIONS` overrides (sizes the GPU line buffer)
    pub const MAX_BOLT_ITERATIONS: u32 = 8;

    /// Bolt endpoint bounds: start is high and behind, end is near the ground
    pub const BOLT_SPREAD_X: f32 = 10.0;
    pub const BOLT_START_Y: f32 = 5.0;
    pub const BOLT_START_Z: f32 = -5.0;
    pub const BOLT_END_Y: f32 = -2.0;
    pub const BOLT_END_Z: f32 = -2.0;
    pub const BOLT_DEPTH_SPREAD: f32 = 5.0;

    /// Bolt flash palette
    pub const BOLT_CYAN: [f32; 3] = [0.0, 1.0, 1.0];
    pub const BOLT_MAGENTA: [f32; 3] = [1.0, 0.0, 1.0];

    /// World-to-background scale for the impact point
    pub const EXPLOSION_SCALE: f32 = 0.1;
    /// Explosion lifetime in seconds
    pub const EXPLOSION_DURATION: f32 = 1.0;
}
