//! Input smoothing
//!
//! Pressure is smoothed once, when a point is appended. Positions are never
//! modified in place; geometry is built from a smoothed snapshot instead.

use glam::Vec3;

use crate::brush::lerp;
use crate::constants::PRESSURE_DECAY_BASE;
use crate::types::ControlPoint;

/// Distance-weighted exponential pressure smoothing.
///
/// `k = 0.1 ^ (distance / window)`: the further the input moved since the
/// previous sample, the less the previous value is kept. A non-positive
/// window disables smoothing.
pub fn smooth_pressure(current: f32, previous: f32, distance: f32, window: f32) -> f32 {
    if window <= 0.0 {
        return current;
    }
    let k = PRESSURE_DECAY_BASE.powf(distance / window);
    lerp(current, previous, k)
}

/// The (.25, .5, .25) kernel applied to one interior point
pub fn smooth_position(prev: Vec3, current: Vec3, next: Vec3) -> Vec3 {
    prev * 0.25 + current * 0.5 + next * 0.25
}

/// Write the smoothed position snapshot for `points` into `out`.
///
/// Endpoints pass through unchanged; with fewer than three points (or when
/// `enabled` is false) the positions are copied as-is. `out` is cleared first
/// and reused, so steady-state regeneration does not allocate.
pub fn smoothed_positions(points: &[ControlPoint], enabled: bool, out: &mut Vec<Vec3>) {
    out.clear();
    out.extend(points.iter().map(|p| p.position));

    if !enabled || points.len() < 3 {
        return;
    }

    for i in 1..points.len() - 1 {
        out[i] = smooth_position(
            points[i - 1].position,
            points[i].position,
            points[i + 1].position,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn point(x: f32, y: f32) -> ControlPoint {
        ControlPoint::new(Vec3::new(x, y, 0.0), Quat::IDENTITY, 1.0)
    }

    #[test]
    fn test_pressure_smoothing_decays_with_distance() {
        // No movement keeps the previous value
        assert!((smooth_pressure(1.0, 0.0, 0.0, 0.02) - 0.0).abs() < 1e-6);

        // One window of movement keeps 10% of the previous value
        let p = smooth_pressure(1.0, 0.0, 0.02, 0.02);
        assert!((p - 0.9).abs() < 1e-5);

        // Slow motion smooths more than fast motion
        let slow = smooth_pressure(1.0, 0.0, 0.002, 0.02);
        let fast = smooth_pressure(1.0, 0.0, 0.04, 0.02);
        assert!(slow < fast);
    }

    #[test]
    fn test_pressure_smoothing_disabled() {
        assert_eq!(smooth_pressure(0.7, 0.1, 0.001, 0.0), 0.7);
    }

    #[test]
    fn test_position_kernel() {
        let p = smooth_position(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        assert!((p - Vec3::new(0.5, 0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_snapshot_keeps_endpoints() {
        let points = vec![point(0.0, 0.0), point(1.0, 1.0), point(2.0, 0.0), point(3.0, 1.0)];
        let mut out = Vec::new();
        smoothed_positions(&points, true, &mut out);

        assert_eq!(out.len(), 4);
        assert_eq!(out[0], points[0].position);
        assert_eq!(out[3], points[3].position);
        assert!((out[1] - Vec3::new(1.0, 0.5, 0.0)).length() < 1e-6);
        // Source points are untouched
        assert_eq!(points[1].position, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_snapshot_disabled_below_three_points() {
        let points = vec![point(0.0, 0.0), point(1.0, 1.0)];
        let mut out = vec![Vec3::splat(9.0); 8];
        smoothed_positions(&points, true, &mut out);
        assert_eq!(out, vec![points[0].position, points[1].position]);

        let three = vec![point(0.0, 0.0), point(1.0, 1.0), point(2.0, 0.0)];
        smoothed_positions(&three, false, &mut out);
        assert_eq!(out[1], three[1].position);
    }
}
