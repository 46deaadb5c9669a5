//! Animation state
//!
//! Everything that changes from tick to tick lives here, owned by the
//! [`Scene`](super::Scene) and mutated only through [`tick`](super::tick).

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

/// A bolt currently on screen
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveBolt {
    /// Sequential bolt number (1-based), used to detect new geometry
    pub id: u64,
    /// World-space polyline from sky to ground
    pub points: Vec<Vec3>,
    /// Countdown; the bolt goes away on the tick after it reaches zero
    pub timer: f32,
    /// Flash color for this tick
    pub color: [f32; 3],
}

impl ActiveBolt {
    /// Where the bolt hits the ground
    pub fn impact(&self) -> Vec3 {
        self.points.last().copied().unwrap_or(Vec3::ZERO)
    }
}

/// Lightning state machine
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LightningPhase {
    /// No bolt; each tick rolls for a strike
    #[default]
    Idle,
    /// Bolt visible until its timer runs out
    Active(ActiveBolt),
}

/// Complete animation state
#[derive(Debug, Clone)]
pub struct AnimationState {
    /// Seed the RNG was created from
    pub seed: u64,
    /// Logo rotation about Y (radians, grows without bound)
    pub rotation: f32,
    /// Lightning phase
    pub lightning: LightningPhase,
    /// Scene time in seconds
    pub elapsed: f32,
    /// Tick counter
    pub ticks: u64,
    /// Bolts generated so far
    pub bolts_struck: u64,
    pub(crate) rng: Pcg32,
}

impl AnimationState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rotation: 0.0,
            lightning: LightningPhase::Idle,
            elapsed: 0.0,
            ticks: 0,
            bolts_struck: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn is_lightning_active(&self) -> bool {
        matches!(self.lightning, LightningPhase::Active(_))
    }

    /// The bolt to draw this frame, if any
    pub fn active_bolt(&self) -> Option<&ActiveBolt> {
        match &self.lightning {
            LightningPhase::Active(bolt) => Some(bolt),
            LightningPhase::Idle => None,
        }
    }
}
