//! Fixed timestep animation tick
//!
//! Advances rotation and the lightning state machine by one step. Striking
//! bolts are reported back as an [`ExplosionTrigger`] for the caller to route to
//! the background.

use glam::Vec3;
use rand::Rng;

use super::state::{ActiveBolt, AnimationState, LightningPhase};
use crate::background::ExplosionTrigger;
use crate::config::SceneConfig;
use crate::consts::*;
use crate::geometry::generate_bolt;

/// Advance the animation state by one fixed timestep.
///
/// Order within a tick: rotate, retire an expired bolt, roll for a new
/// strike while idle, then flash and count down the active bolt. A bolt is
/// therefore still visible on the tick its timer reaches zero.
pub fn tick(state: &mut AnimationState, config: &SceneConfig, dt: f32) -> Option<ExplosionTrigger> {
    state.rotation += config.rotation_step;

    let expired = matches!(&state.lightning, LightningPhase::Active(bolt) if bolt.timer <= 0.0);
    if expired {
        log::trace!("Bolt {} faded", state.bolts_struck);
        state.lightning = LightningPhase::Idle;
    }

    let mut trigger = None;
    if !state.is_lightning_active() && state.rng.random::<f32>() < config.lightning_chance {
        trigger = Some(strike(state, config));
    }

    if let LightningPhase::Active(bolt) = &mut state.lightning {
        bolt.color = if state.rng.random::<f32>() > 0.5 {
            BOLT_CYAN
        } else {
            BOLT_MAGENTA
        };
        bolt.timer -= config.lightning_decay;
    }

    state.elapsed += dt;
    state.ticks += 1;

    trigger
}

/// Random bolt endpoints: start high and behind, end near the ground and closer
fn random_endpoints<R: Rng>(rng: &mut R) -> (Vec3, Vec3) {
    let start = Vec3::new(
        (rng.random::<f32>() - 0.5) * BOLT_SPREAD_X,
        BOLT_START_Y,
        BOLT_START_Z - rng.random::<f32>() * BOLT_DEPTH_SPREAD,
    );
    let end = Vec3::new(
        (rng.random::<f32>() - 0.5) * BOLT_SPREAD_X,
        BOLT_END_Y,
        BOLT_END_Z - rng.random::<f32>() * BOLT_DEPTH_SPREAD,
    );
    (start, end)
}

/// Generate a new bolt and build the explosion command for its impact point
fn strike(state: &mut AnimationState, config: &SceneConfig) -> ExplosionTrigger {
    let (start, end) = random_endpoints(&mut state.rng);
    let points = generate_bolt(
        start,
        end,
        config.bolt_displacement,
        config.bolt_iterations,
        &mut state.rng,
    );

    state.bolts_struck += 1;
    log::debug!(
        "Bolt {} strikes ({:.2}, {:.2}, {:.2}) with {} points",
        state.bolts_struck,
        end.x,
        end.y,
        end.z,
        points.len()
    );

    state.lightning = LightningPhase::Active(ActiveBolt {
        id: state.bolts_struck,
        points,
        timer: config.lightning_duration,
        color: BOLT_CYAN,
    });

    // The background works in a scaled-down ground plane: X across, Z as depth
    ExplosionTrigger {
        x: end.x * config.explosion_scale,
        y: end.z * config.explosion_scale,
        time: state.elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always_strike() -> SceneConfig {
        SceneConfig {
            lightning_chance: 1.0,
            ..Default::default()
        }
    }

    fn never_strike() -> SceneConfig {
        SceneConfig {
            lightning_chance: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_rotation_advances_every_tick() {
        let mut state = AnimationState::new(1);
        let config = SceneConfig::default();
        for _ in 0..10 {
            tick(&mut state, &config, TICK_DT);
        }
        assert!((state.rotation - 0.2).abs() < 1e-5);
        assert_eq!(state.ticks, 10);
        assert!((state.elapsed - 10.0 * TICK_DT).abs() < 1e-5);
    }

    #[test]
    fn test_idle_without_chance() {
        let mut state = AnimationState::new(5);
        let config = never_strike();
        for _ in 0..500 {
            assert_eq!(tick(&mut state, &config, TICK_DT), None);
        }
        assert!(!state.is_lightning_active());
        assert_eq!(state.bolts_struck, 0);
    }

    #[test]
    fn test_strike_emits_mapped_explosion() {
        let mut state = AnimationState::new(77);
        tick(&mut state, &never_strike(), TICK_DT);
        let now = state.elapsed;

        let trigger = tick(&mut state, &always_strike(), TICK_DT).expect("bolt should strike");
        let bolt = state.active_bolt().expect("bolt should be active");
        let impact = bolt.impact();

        assert_eq!(bolt.id, 1);
        assert_eq!(bolt.points.len(), 33);
        assert_eq!(trigger.x, impact.x * EXPLOSION_SCALE);
        assert_eq!(trigger.y, impact.z * EXPLOSION_SCALE);
        assert_eq!(trigger.time, now);
    }

    #[test]
    fn test_bolt_lifecycle() {
        let mut state = AnimationState::new(3);
        assert!(tick(&mut state, &always_strike(), TICK_DT).is_some());

        // Countdown from 1.0 by 0.05, visible through the tick that hits zero
        let config = never_strike();
        let mut active_ticks = 1;
        while state.is_lightning_active() {
            assert_eq!(tick(&mut state, &config, TICK_DT), None);
            if state.is_lightning_active() {
                active_ticks += 1;
            }
            assert!(active_ticks <= 21, "bolt never expired");
        }
        assert!((20..=21).contains(&active_ticks), "active for {active_ticks} ticks");
    }

    #[test]
    fn test_no_retrigger_while_active() {
        let mut state = AnimationState::new(11);
        let config = always_strike();
        let triggers = (0..15)
            .filter_map(|_| tick(&mut state, &config, TICK_DT))
            .count();
        assert_eq!(triggers, 1);
        assert_eq!(state.bolts_struck, 1);
    }

    #[test]
    fn test_retriggers_after_expiry() {
        let mut state = AnimationState::new(12);
        let config = always_strike();
        let triggers = (0..100)
            .filter_map(|_| tick(&mut state, &config, TICK_DT))
            .count();
        // One bolt every 20-21 ticks
        assert!((4..=5).contains(&triggers), "{triggers} strikes");
    }

    #[test]
    fn test_endpoints_stay_in_bounds() {
        let mut state = AnimationState::new(2024);
        let config = always_strike();
        let mut seen = 0;
        for _ in 0..2000 {
            if tick(&mut state, &config, TICK_DT).is_none() {
                continue;
            }
            seen += 1;
            let bolt = state.active_bolt().unwrap();
            let (start, end) = (bolt.points[0], bolt.impact());

            assert_eq!(start.y, BOLT_START_Y);
            assert!((-5.0..=5.0).contains(&start.x));
            assert!(start.z <= -5.0 && start.z > -10.0);

            assert_eq!(end.y, BOLT_END_Y);
            assert!((-5.0..=5.0).contains(&end.x));
            assert!(end.z <= -2.0 && end.z > -7.0);
        }
        assert!(seen > 50);
    }

    #[test]
    fn test_flash_color_from_palette() {
        let mut state = AnimationState::new(9);
        let config = always_strike();
        let mut colors = Vec::new();
        for _ in 0..200 {
            tick(&mut state, &config, TICK_DT);
            if let Some(bolt) = state.active_bolt() {
                assert!(bolt.color == BOLT_CYAN || bolt.color == BOLT_MAGENTA);
                colors.push(bolt.color);
            }
        }
        assert!(colors.contains(&BOLT_CYAN));
        assert!(colors.contains(&BOLT_MAGENTA));
    }

    #[test]
    fn test_determinism() {
        // Same seed, same bolts
        let config = SceneConfig {
            lightning_chance: 0.1,
            ..Default::default()
        };
        let mut state1 = AnimationState::new(99999);
        let mut state2 = AnimationState::new(99999);

        for _ in 0..300 {
            let a = tick(&mut state1, &config, TICK_DT);
            let b = tick(&mut state2, &config, TICK_DT);
            assert_eq!(a, b);
        }

        assert_eq!(state1.bolts_struck, state2.bolts_struck);
        assert_eq!(state1.lightning, state2.lightning);
        assert_eq!(state1.rotation, state2.rotation);
    }
}
