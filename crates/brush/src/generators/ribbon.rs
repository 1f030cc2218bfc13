//! Flat ribbon: two vertices per point, spread across the controller's up axis

use glam::{Vec2, Vec3};

use super::GeneratorInput;
use crate::constants::TANGENT_EPSILON;
use crate::pool::GeometryBuffer;

pub(super) fn generate(input: &GeneratorInput<'_>, buffer: &mut GeometryBuffer) {
    let n = input.len();
    let backfaces = input.descriptor.render_backfaces;
    let quads = n - 1;
    buffer.ensure_capacity(n * 2, quads * if backfaces { 12 } else { 6 });

    // World "right" until a usable side vector shows up
    let mut previous_side = Vec3::X;

    for i in 0..n {
        let point = &input.points[i];
        let center = input.positions[i];
        let forward = input.tangent(i);

        let mut side = forward.cross(point.up());
        if side.length_squared() < TANGENT_EPSILON {
            side = previous_side;
        } else {
            side = side.normalize();
        }
        previous_side = side;

        let normal = side.cross(forward).normalize_or(Vec3::Y);
        let half = input.pressured_size(point.pressure) * 0.5;
        let color = input.color_for(point.pressure);
        let v = input.arc_fraction(i);

        buffer.push_vertex(center + side * half, normal, Vec2::new(0.0, v), color);
        buffer.push_vertex(center - side * half, normal, Vec2::new(1.0, v), color);
    }

    for i in 0..quads as u32 {
        let b = i * 2;
        buffer.push_triangle(b, b + 2, b + 1);
        buffer.push_triangle(b + 1, b + 2, b + 3);
        if backfaces {
            buffer.push_triangle(b, b + 1, b + 2);
            buffer.push_triangle(b + 1, b + 3, b + 2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::brush::BrushDescriptor;
    use crate::types::GeometryKind;
    use glam::Vec3;

    fn colinear() -> Vec<crate::types::ControlPoint> {
        points(
            &[Vec3::ZERO, Vec3::new(0.0, 0.0, 0.1), Vec3::new(0.0, 0.0, 0.2)],
            1.0,
        )
    }

    #[test]
    fn test_three_points_make_two_quads() {
        let brush = BrushDescriptor::default();
        let buffer = run(GeometryKind::Ribbon, &brush, &colinear());
        assert_eq!(buffer.vertex_count(), 6);
        assert_eq!(buffer.triangle_count(), 4);
    }

    #[test]
    fn test_backfaces_double_triangles() {
        let brush = BrushDescriptor {
            render_backfaces: true,
            ..Default::default()
        };
        let buffer = run(GeometryKind::Ribbon, &brush, &colinear());
        assert_eq!(buffer.vertex_count(), 6);
        assert_eq!(buffer.triangle_count(), 8);
    }

    #[test]
    fn test_width_follows_pressure_and_faces_up() {
        let brush = BrushDescriptor::default();
        let buffer = run(GeometryKind::Ribbon, &brush, &colinear());

        // Full pressure: width = pressure_range[1] * base size
        let width = buffer.vertices[0].distance(buffer.vertices[1]);
        assert!((width - 0.02).abs() < 1e-5);

        for n in &buffer.normals {
            assert!((*n - Vec3::Y).length() < 1e-5);
        }

        // First triangle winds toward its normal
        let [a, b, c] = [0, 1, 2].map(|k| buffer.vertices[buffer.indices[k] as usize]);
        assert!((b - a).cross(c - a).dot(Vec3::Y) > 0.0);
    }

    #[test]
    fn test_uvs_run_along_length() {
        let brush = BrushDescriptor::default();
        let buffer = run(GeometryKind::Ribbon, &brush, &colinear());
        assert_eq!(buffer.uvs[0].y, 0.0);
        assert!((buffer.uvs[2].y - 0.5).abs() < 1e-5);
        assert!((buffer.uvs[5].y - 1.0).abs() < 1e-5);
        assert_eq!(buffer.uvs[0].x, 0.0);
        assert_eq!(buffer.uvs[1].x, 1.0);
    }

    #[test]
    fn test_vertex_alpha_tracks_pressure() {
        let brush = BrushDescriptor::default();
        let soft = run(
            GeometryKind::Ribbon,
            &brush,
            &points(&[Vec3::ZERO, Vec3::new(0.0, 0.0, 0.1)], 0.0),
        );
        let hard = run(GeometryKind::Ribbon, &brush, &colinear());
        // opacity_range (0.5, 1.0)
        assert_eq!(soft.colors[0].a, 127);
        assert_eq!(hard.colors[0].a, 255);
    }
}
