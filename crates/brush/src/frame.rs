//! Orientation frames along a stroke path
//!
//! Tube, hull and slice geometry need a cross-section basis at every point.
//! [`FrameTransport`] carries an "up" vector from point to point with the
//! smallest rotation that keeps it perpendicular to the tangent (parallel
//! transport), so the cross-section does not visibly twist.

use glam::{Mat3, Quat, Vec3};

use crate::constants::FRAME_EPSILON;

/// Orthonormal cross-section basis at one path point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub tangent: Vec3,
    pub up: Vec3,
    pub right: Vec3,
}

/// Transport `previous_up` onto the plane perpendicular to `tangent`.
///
/// When the tangent is (nearly) parallel to `previous_up`, world forward and
/// then world right are tried instead.
pub fn compute_frame(tangent: Vec3, previous_up: Vec3) -> Vec3 {
    let mut right = tangent.cross(previous_up);

    if right.length_squared() < FRAME_EPSILON {
        right = tangent.cross(Vec3::Z);
        if right.length_squared() < FRAME_EPSILON {
            right = tangent.cross(Vec3::X);
        }
    }

    right.normalize_or_zero().cross(tangent).normalize_or_zero()
}

/// Running parallel-transport state for one regeneration pass
#[derive(Debug, Clone, Copy)]
pub struct FrameTransport {
    last_up: Vec3,
}

impl Default for FrameTransport {
    fn default() -> Self {
        Self { last_up: Vec3::Y }
    }
}

impl FrameTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new pass from world up
    pub fn reset(&mut self) {
        self.last_up = Vec3::Y;
    }

    pub fn last_up(&self) -> Vec3 {
        self.last_up
    }

    /// Advance along a (unit) tangent and return the frame there
    pub fn advance(&mut self, tangent: Vec3) -> Frame {
        let up = compute_frame(tangent, self.last_up);
        self.last_up = up;
        Frame {
            tangent,
            up,
            right: tangent.cross(up).normalize_or_zero(),
        }
    }
}

/// Rotation whose +Z axis points along `forward` with +Y as close to `up` as
/// possible. Falls back to the shortest arc from +Z when `up` is parallel.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let z = forward.normalize_or_zero();
    if z == Vec3::ZERO {
        return Quat::IDENTITY;
    }

    let x = up.cross(z);
    if x.length_squared() < FRAME_EPSILON {
        return Quat::from_rotation_arc(Vec3::Z, z);
    }
    let x = x.normalize();
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}

/// Keep only the heading of a rotation (zero pitch and roll), so geometry
/// built from it stays upright
pub fn yaw_only(rotation: Quat) -> Quat {
    let forward = rotation * Vec3::Z;
    let flat = Vec3::new(forward.x, 0.0, forward.z);
    if flat.length_squared() < FRAME_EPSILON {
        return Quat::IDENTITY;
    }
    look_rotation(flat, Vec3::Y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_frame_is_perpendicular_and_unit() {
        let tangent = Vec3::new(1.0, 0.3, -0.2).normalize();
        let up = compute_frame(tangent, Vec3::Y);
        assert!(up.dot(tangent).abs() < 1e-5);
        assert!((up.length() - 1.0).abs() < 1e-5);
        // Stays on the same side as the previous up
        assert!(up.dot(Vec3::Y) > 0.0);
    }

    #[test]
    fn test_frame_keeps_perpendicular_up() {
        let up = compute_frame(Vec3::X, Vec3::Y);
        assert!(approx(up, Vec3::Y));
    }

    #[test]
    fn test_degenerate_tangent_uses_fallback_axes() {
        // Tangent parallel to previous up -> world forward fallback
        let up = compute_frame(Vec3::Y, Vec3::Y);
        assert!(up.is_finite());
        assert!((up.length() - 1.0).abs() < 1e-5);
        assert!(up.dot(Vec3::Y).abs() < 1e-5);

        // Tangent parallel to previous up and world forward -> world right fallback
        let up = compute_frame(Vec3::Z, Vec3::Z);
        assert!((up.length() - 1.0).abs() < 1e-5);
        assert!(up.dot(Vec3::Z).abs() < 1e-5);
    }

    #[test]
    fn test_transport_has_no_twist_on_straight_path() {
        let mut transport = FrameTransport::new();
        let tangent = Vec3::new(0.0, 0.0, 1.0);
        let first = transport.advance(tangent);
        for _ in 0..10 {
            let frame = transport.advance(tangent);
            assert!(approx(frame.up, first.up));
            assert!(approx(frame.right, first.right));
        }
    }

    #[test]
    fn test_transport_reset() {
        let mut transport = FrameTransport::new();
        transport.advance(Vec3::X);
        transport.advance(Vec3::new(0.0, 0.0, 1.0));
        transport.reset();
        assert_eq!(transport.last_up(), Vec3::Y);
    }

    #[test]
    fn test_look_rotation_axes() {
        let forward = Vec3::new(1.0, 0.0, 1.0).normalize();
        let q = look_rotation(forward, Vec3::Y);
        assert!(approx(q * Vec3::Z, forward));
        assert!(approx(q * Vec3::Y, Vec3::Y));

        let q = look_rotation(Vec3::Y, Vec3::Y);
        assert!(approx(q * Vec3::Z, Vec3::Y));
    }

    #[test]
    fn test_yaw_only_levels_rotation() {
        let tilted = Quat::from_rotation_y(0.7) * Quat::from_rotation_x(0.4);
        let level = yaw_only(tilted);
        assert!(approx(level * Vec3::Y, Vec3::Y));
        let heading = level * Vec3::Z;
        assert!(heading.y.abs() < 1e-5);
        assert!(approx(heading, Quat::from_rotation_y(0.7) * Vec3::Z));
    }
}
