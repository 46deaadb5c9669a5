//! Retro grid background and its explosion effect
//!
//! The grid itself is animated entirely in the fragment shader from the
//! current time and resolution. The only thing the rest of the demo can do to
//! it is set off an explosion at a screen-space point.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::consts::EXPLOSION_DURATION;

/// Command sent from the scene to the background when a bolt lands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionTrigger {
    /// Impact point in background coordinates
    pub x: f32,
    pub y: f32,
    /// Scene time of the impact, in seconds
    pub time: f32,
}

/// Anything that can play an explosion
pub trait ExplosionTarget {
    fn trigger_explosion(&mut self, trigger: ExplosionTrigger);
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Explosion {
    pos: Vec2,
    start_time: f32,
}

/// Uniform block for the background shader (must match background.wgsl)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BackgroundGlobals {
    pub resolution: [f32; 2], // offset 0
    pub time: f32,            // offset 8
    /// Seconds since the last explosion, or -1 when none is playing
    pub explosion_age: f32, // offset 12
    pub explosion_pos: [f32; 2], // offset 16
    pub _pad: [f32; 2],          // pad to 32 bytes
}

/// CPU-side state of the background effect
#[derive(Debug, Clone, Default)]
pub struct BackgroundEffect {
    resolution: (u32, u32),
    time: f32,
    explosion: Option<Explosion>,
}

impl BackgroundEffect {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            resolution: (width, height),
            time: 0.0,
            explosion: None,
        }
    }

    /// Take the current frame time and viewport size
    pub fn advance(&mut self, time: f32, width: u32, height: u32) {
        self.time = time;
        self.resolution = (width, height);
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Seconds into the current explosion, if one is still playing at `time`
    pub fn explosion_age(&self, time: f32) -> Option<f32> {
        let explosion = self.explosion?;
        let age = time - explosion.start_time;
        (0.0..EXPLOSION_DURATION).contains(&age).then_some(age)
    }

    /// Impact point of the most recent explosion
    pub fn explosion_pos(&self) -> Option<Vec2> {
        self.explosion.map(|e| e.pos)
    }

    /// Pack the uniform block for the current frame
    pub fn globals(&self) -> BackgroundGlobals {
        let (w, h) = self.resolution;
        let age = self.explosion_age(self.time);
        BackgroundGlobals {
            resolution: [w as f32, h as f32],
            time: self.time,
            explosion_age: age.unwrap_or(-1.0),
            explosion_pos: self.explosion_pos().unwrap_or(Vec2::ZERO).to_array(),
            _pad: [0.0; 2],
        }
    }
}

impl ExplosionTarget for BackgroundEffect {
    fn trigger_explosion(&mut self, trigger: ExplosionTrigger) {
        log::debug!(
            "Explosion at ({:.2}, {:.2}), t={:.2}s",
            trigger.x,
            trigger.y,
            trigger.time
        );
        self.explosion = Some(Explosion {
            pos: Vec2::new(trigger.x, trigger.y),
            start_time: trigger.time,
        });
    }
}
