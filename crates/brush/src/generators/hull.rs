//! Faceted hull: a hexagonal cross-section with flat-shaded sides and capped
//! ends. Every face gets its own vertices so normals stay per-face.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use super::{GeneratorInput, ring_offset};
use crate::constants::HULL_SIDES;
use crate::frame::{Frame, FrameTransport};
use crate::pool::GeometryBuffer;
use crate::types::Rgba8;

/// One cross-section along the path
#[derive(Clone, Copy)]
struct Section {
    center: Vec3,
    frame: Frame,
    radius: f32,
    color: Rgba8,
    v: f32,
}

impl Section {
    fn corner(&self, j: usize) -> Vec3 {
        let offset = ring_offset(self.frame.right, self.frame.up, j % HULL_SIDES, HULL_SIDES);
        self.center + offset * self.radius
    }
}

pub(super) fn generate(input: &GeneratorInput<'_>, buffer: &mut GeometryBuffer) {
    let n = input.len();
    let side_vertices = (n - 1) * HULL_SIDES * 4;
    let cap_vertices = 2 * HULL_SIDES * 3;
    let indices = (n - 1) * HULL_SIDES * 6 + cap_vertices;
    buffer.ensure_capacity(side_vertices + cap_vertices, indices);

    let mut transport = FrameTransport::new();
    let mut section_at = |i: usize| {
        let point = &input.points[i];
        Section {
            center: input.positions[i],
            frame: transport.advance(input.tangent(i)),
            radius: input.pressured_size(point.pressure) * 0.5,
            color: input.color_for(point.pressure),
            v: input.arc_fraction(i),
        }
    };

    let first = section_at(0);
    push_cap(buffer, &first, false);

    let mut previous = first;
    for i in 1..n {
        let current = section_at(i);
        for j in 0..HULL_SIDES {
            push_facet(buffer, &previous, &current, j);
        }
        previous = current;
    }

    push_cap(buffer, &previous, true);
}

/// Side face `j` between two sections
fn push_facet(buffer: &mut GeometryBuffer, a: &Section, b: &Section, j: usize) {
    let corners = [a.corner(j), b.corner(j), b.corner(j + 1), a.corner(j + 1)];
    let normal = (corners[1] - corners[0])
        .cross(corners[3] - corners[0])
        .normalize_or(a.frame.up);

    let u0 = j as f32 / HULL_SIDES as f32;
    let u1 = (j + 1) as f32 / HULL_SIDES as f32;
    let uvs = [
        Vec2::new(u0, a.v),
        Vec2::new(u0, b.v),
        Vec2::new(u1, b.v),
        Vec2::new(u1, a.v),
    ];
    let colors = [a.color, b.color, b.color, a.color];

    let v = [0, 1, 2, 3].map(|k| buffer.push_vertex(corners[k], normal, uvs[k], colors[k]));
    buffer.push_quad(v, false);
}

/// Fan-triangulated end cap facing back along the path (start) or forward
/// along it (end)
fn push_cap(buffer: &mut GeometryBuffer, section: &Section, end: bool) {
    let normal = if end {
        section.frame.tangent
    } else {
        -section.frame.tangent
    };
    let hub = Vec2::splat(0.5);
    let rim_uv = |j: usize| {
        let angle = (j % HULL_SIDES) as f32 * TAU / HULL_SIDES as f32;
        hub + 0.5 * Vec2::new(angle.cos(), angle.sin())
    };

    for j in 0..HULL_SIDES {
        let (first, second) = if end { (j + 1, j) } else { (j, j + 1) };
        let a = buffer.push_vertex(section.center, normal, hub, section.color);
        let b = buffer.push_vertex(section.corner(first), normal, rim_uv(first), section.color);
        let c = buffer.push_vertex(section.corner(second), normal, rim_uv(second), section.color);
        buffer.push_triangle(a, b, c);
    }
}
