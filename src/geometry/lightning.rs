//! Midpoint-displacement lightning bolts
//!
//! A segment is split at its midpoint, the midpoint is nudged sideways (X and
//! Z only, so the bolt keeps falling steadily), and both halves are split again
//! with half the displacement. Shrinking the jitter at each level gives the
//! self-similar jagged look.

use glam::Vec3;
use rand::Rng;

use crate::consts::MAX_BOLT_ITERATIONS;

/// Pending segment on the work list
struct Segment {
    start: Vec3,
    end: Vec3,
    displacement: f32,
    depth: u32,
}

/// Number of points produced for a given recursion depth.
///
/// Saturates at `usize::MAX` once `2^iterations` no longer fits.
#[inline]
pub const fn bolt_point_count(iterations: u32) -> usize {
    match 1usize.checked_shl(iterations) {
        Some(n) => n.saturating_add(1),
        None => usize::MAX,
    }
}

/// Generate a bolt polyline from `start` to `end`.
///
/// Returns `2^iterations + 1` points; the first is exactly `start` and the
/// last exactly `end`. Offsets are uniform in `[-d/2, d/2]` and are drawn
/// depth-first, left half before right half. Depths above
/// [`MAX_BOLT_ITERATIONS`] are capped.
pub fn generate_bolt<R: Rng>(
    start: Vec3,
    end: Vec3,
    displacement: f32,
    iterations: u32,
    rng: &mut R,
) -> Vec<Vec3> {
    let iterations = iterations.min(MAX_BOLT_ITERATIONS);
    let mut points = Vec::with_capacity(bolt_point_count(iterations));
    points.push(start);

    let mut work = vec![Segment {
        start,
        end,
        displacement,
        depth: iterations,
    }];

    while let Some(seg) = work.pop() {
        if seg.depth == 0 {
            points.push(seg.end);
            continue;
        }

        let mut mid = (seg.start + seg.end) / 2.0;
        mid.x += (rng.random::<f32>() - 0.5) * seg.displacement;
        mid.z += (rng.random::<f32>() - 0.5) * seg.displacement;

        let half = seg.displacement / 2.0;
        // Right half first so the left half is popped next
        work.push(Segment {
            start: mid,
            end: seg.end,
            displacement: half,
            depth: seg.depth - 1,
        });
        work.push(Segment {
            start: seg.start,
            end: mid,
            displacement: half,
            depth: seg.depth - 1,
        });
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BOLT_DISPLACEMENT, BOLT_ITERATIONS};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Straightforward recursive formulation, used as a reference
    fn recursive_bolt(start: Vec3, end: Vec3, d: f32, n: u32, rng: &mut Pcg32) -> Vec<Vec3> {
        if n == 0 {
            return vec![start, end];
        }
        let mut mid = (start + end) / 2.0;
        mid.x += (rng.random::<f32>() - 0.5) * d;
        mid.z += (rng.random::<f32>() - 0.5) * d;
        let mut left = recursive_bolt(start, mid, d / 2.0, n - 1, rng);
        let right = recursive_bolt(mid, end, d / 2.0, n - 1, rng);
        left.extend_from_slice(&right[1..]);
        left
    }

    #[test]
    fn test_zero_iterations() {
        let mut rng = Pcg32::seed_from_u64(1);
        let start = Vec3::new(1.0, 2.0, 3.0);
        let end = Vec3::new(-1.0, -2.0, -3.0);
        assert_eq!(generate_bolt(start, end, 2.0, 0, &mut rng), vec![start, end]);
    }

    #[test]
    fn test_default_bolt_scenario() {
        let mut rng = Pcg32::seed_from_u64(42);
        let start = Vec3::new(0.0, 5.0, -5.0);
        let end = Vec3::new(0.0, -2.0, -2.0);
        let bolt = generate_bolt(start, end, BOLT_DISPLACEMENT, BOLT_ITERATIONS, &mut rng);

        assert_eq!(bolt.len(), 33);
        assert_eq!(bolt[0], start);
        assert_eq!(bolt[32], end);

        // Cumulative jitter is d/2 + d/4 + ... < d
        let reach = BOLT_DISPLACEMENT;
        let lo = start.min(end) - Vec3::new(reach, 0.0, reach);
        let hi = start.max(end) + Vec3::new(reach, 0.0, reach);
        for p in &bolt {
            assert!(p.cmpge(lo - 1e-4).all() && p.cmple(hi + 1e-4).all(), "{p:?} escaped");
        }
    }

    #[test]
    fn test_y_is_interpolated() {
        // Y is never jittered, so every point lies on the straight-line Y ramp
        let mut rng = Pcg32::seed_from_u64(7);
        let start = Vec3::new(0.0, 4.0, 0.0);
        let end = Vec3::new(0.0, -4.0, 0.0);
        let bolt = generate_bolt(start, end, 2.0, 3, &mut rng);
        for (i, p) in bolt.iter().enumerate() {
            let expected = 4.0 - 8.0 * i as f32 / 8.0;
            assert!((p.y - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_matches_recursive_definition() {
        let start = Vec3::new(-3.0, 5.0, -8.0);
        let end = Vec3::new(2.0, -2.0, -4.0);
        let mut a = Pcg32::seed_from_u64(2024);
        let mut b = Pcg32::seed_from_u64(2024);
        assert_eq!(
            generate_bolt(start, end, 2.0, 5, &mut a),
            recursive_bolt(start, end, 2.0, 5, &mut b)
        );
    }

    #[test]
    fn test_zero_displacement_is_straight() {
        let mut rng = Pcg32::seed_from_u64(3);
        let start = Vec3::new(0.0, 1.0, 0.0);
        let end = Vec3::new(4.0, -1.0, 8.0);
        let bolt = generate_bolt(start, end, 0.0, 2, &mut rng);
        assert_eq!(bolt[2], (start + end) / 2.0);
    }

    #[test]
    fn test_point_count_saturates() {
        assert_eq!(bolt_point_count(5), 33);
        assert_eq!(bolt_point_count(usize::BITS - 1), (1usize << (usize::BITS - 1)) + 1);
        assert_eq!(bolt_point_count(usize::BITS), usize::MAX);
        assert_eq!(bolt_point_count(u32::MAX), usize::MAX);
    }

    #[test]
    fn test_depth_is_capped() {
        let mut rng = Pcg32::seed_from_u64(8);
        let start = Vec3::new(0.0, 5.0, -5.0);
        let end = Vec3::new(1.0, -2.0, -3.0);
        let bolt = generate_bolt(start, end, 2.0, 200, &mut rng);
        assert_eq!(bolt.len(), bolt_point_count(MAX_BOLT_ITERATIONS));
        assert_eq!(*bolt.last().unwrap(), end);
    }

    proptest! {
        #[test]
        fn prop_point_count_and_endpoints(
            seed in any::<u64>(),
            iterations in 0u32..7,
            sx in -10.0f32..10.0,
            sz in -10.0f32..0.0,
            ex in -10.0f32..10.0,
            ez in -10.0f32..0.0,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let start = Vec3::new(sx, 5.0, sz);
            let end = Vec3::new(ex, -2.0, ez);
            let bolt = generate_bolt(start, end, 2.0, iterations, &mut rng);
            prop_assert_eq!(bolt.len(), bolt_point_count(iterations));
            prop_assert_eq!(bolt[0], start);
            prop_assert_eq!(*bolt.last().unwrap(), end);
        }
    }
}
