//! One upright billboard per control point

use rand::Rng;

use super::{GeneratorInput, push_billboard};
use crate::frame::yaw_only;
use crate::pool::GeometryBuffer;

pub(super) fn generate(input: &GeneratorInput<'_>, buffer: &mut GeometryBuffer) {
    let n = input.len();
    let backfaces = input.descriptor.render_backfaces;
    buffer.ensure_capacity(n * 4, n * if backfaces { 12 } else { 6 });

    let variance = input.descriptor.size_variance.clamp(0.0, 1.0);
    let rotation_range = input.descriptor.particle_rotation_range.to_radians();
    let mut rng = input.rng();

    for (point, &center) in input.points.iter().zip(input.positions) {
        // Same number of draws per point, so earlier particles never change
        // as points are appended
        let jitter: f32 = rng.random_range(-1.0..=1.0);
        let spin: f32 = rng.random();

        let size = input.pressured_size(point.pressure) * (1.0 + variance * jitter);
        push_billboard(
            buffer,
            center,
            yaw_only(point.orientation),
            size * 0.5,
            spin * rotation_range,
            input.color_for(point.pressure),
            backfaces,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::brush::BrushDescriptor;
    use crate::types::GeometryKind;
    use glam::Vec3;

    #[test]
    fn test_one_quad_per_point() {
        let brush = BrushDescriptor::default();
        let buffer = run(GeometryKind::Particle, &brush, &arc(7));
        assert_eq!(buffer.vertex_count(), 7 * 4);
        assert_eq!(buffer.triangle_count(), 7 * 2);

        let single = run(GeometryKind::Particle, &brush, &arc(1));
        assert_eq!(single.vertex_count(), 4);
    }

    #[test]
    fn test_size_stays_within_variance() {
        let brush = BrushDescriptor {
            size_variance: 0.5,
            ..Default::default()
        };
        let pts = points(&[Vec3::ZERO; 20], 1.0);
        let buffer = run(GeometryKind::Particle, &brush, &pts);

        // Full pressure size 0.02, jittered by up to 50%
        for quad in buffer.vertices.chunks(4) {
            let diagonal = quad[0].distance(quad[2]);
            let side = diagonal / std::f32::consts::SQRT_2;
            assert!((0.01 - 1e-5..=0.03 + 1e-5).contains(&side), "side {}", side);
        }
    }

    #[test]
    fn test_appending_points_keeps_earlier_particles() {
        let brush = BrushDescriptor {
            size_variance: 0.8,
            ..Default::default()
        };
        let pts = points(
            &[Vec3::ZERO, Vec3::new(0.1, 0.0, 0.0), Vec3::new(0.2, 0.0, 0.0)],
            0.6,
        );
        let short = run(GeometryKind::Particle, &brush, &pts[..2]);
        let long = run(GeometryKind::Particle, &brush, &pts);

        // Endpoint positions pass through smoothing, so the first quad matches
        assert_eq!(short.vertices[..4], long.vertices[..4]);
    }

    #[test]
    fn test_billboards_stay_upright() {
        let brush = BrushDescriptor {
            particle_rotation_range: 0.0,
            ..Default::default()
        };
        let mut pts = points(&[Vec3::ZERO], 1.0);
        pts[0].orientation = glam::Quat::from_rotation_x(0.6) * glam::Quat::from_rotation_z(0.3);
        let buffer = run(GeometryKind::Particle, &brush, &pts);
        // Facing along -Z after leveling, so the normal has no vertical part
        assert!(buffer.normals[0].y.abs() < 1e-5);
    }
}
