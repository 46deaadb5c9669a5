//! Scene orchestration
//!
//! The [`Scene`] owns the animation state and runs it at a fixed timestep.
//! This module must stay free of GPU and platform dependencies:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Explosions leave through [`ExplosionTarget`], never shared state

pub mod state;
pub mod tick;

pub use state::{ActiveBolt, AnimationState, LightningPhase};
pub use tick::tick;

use crate::background::ExplosionTarget;
use crate::config::SceneConfig;
use crate::consts::*;
use crate::math::{Matrix4, normal_matrix};

/// Matrices for one rendered frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransforms {
    pub projection: Matrix4,
    pub view: Matrix4,
    /// Logo model matrix (rotation about Y)
    pub model: Matrix4,
    /// Inverse-transpose of `model`
    pub normal: Matrix4,
    /// Bolt points are already in world space
    pub bolt_model: Matrix4,
}

/// Fixed-step driver for the animation
pub struct Scene {
    state: AnimationState,
    config: SceneConfig,
    accumulator: f32,
}

impl Scene {
    /// `seed` is used unless the config pins one
    pub fn new(config: SceneConfig, seed: u64) -> Self {
        let seed = config.seed.unwrap_or(seed);
        log::info!("Scene seeded with {}", seed);
        Self {
            state: AnimationState::new(seed),
            config,
            accumulator: 0.0,
        }
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    /// Run as many ticks as `dt` seconds cover, forwarding explosions to
    /// `target`. Returns the number of ticks run.
    pub fn update<T: ExplosionTarget + ?Sized>(&mut self, dt: f32, target: &mut T) -> u32 {
        let dt = dt.clamp(0.0, 0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= TICK_DT && substeps < MAX_SUBSTEPS {
            if let Some(trigger) = tick(&mut self.state, &self.config, TICK_DT) {
                target.trigger_explosion(trigger);
            }
            self.accumulator -= TICK_DT;
            substeps += 1;
        }

        // Drop backlog we could not catch up on
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(TICK_DT);
        }

        substeps
    }

    /// Camera and model matrices for the current state
    pub fn transforms(&self, aspect: f32) -> FrameTransforms {
        let mut projection = Matrix4::new();
        projection.perspective(FOV_Y, aspect, Z_NEAR, Z_FAR);

        let mut view = Matrix4::IDENTITY;
        view.translate(0.0, 0.0, -CAMERA_DISTANCE);

        let mut model = Matrix4::IDENTITY;
        model.rotate_y(self.state.rotation);

        let normal = normal_matrix(&model).unwrap_or_else(|e| {
            log::warn!("Normal matrix unavailable ({e}), using identity");
            Matrix4::IDENTITY
        });

        FrameTransforms {
            projection,
            view,
            model,
            normal,
            bolt_model: Matrix4::IDENTITY,
        }
    }
}
