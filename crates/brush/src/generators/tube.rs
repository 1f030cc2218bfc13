//! Smooth tube: one ring of `sides` vertices per point, carried along the path
//! with parallel transport

use glam::Vec2;

use super::{GeneratorInput, ring_offset};
use crate::frame::FrameTransport;
use crate::pool::GeometryBuffer;

pub(super) fn generate(input: &GeneratorInput<'_>, buffer: &mut GeometryBuffer) {
    let n = input.len();
    let sides = input.descriptor.sides();
    buffer.ensure_capacity(n * sides, (n - 1) * sides * 6);

    let mut transport = FrameTransport::new();
    for i in 0..n {
        let point = &input.points[i];
        let frame = transport.advance(input.tangent(i));
        let radius = input.pressured_size(point.pressure) * 0.5;
        let color = input.color_for(point.pressure);
        let v = input.arc_fraction(i);

        for j in 0..sides {
            let offset = ring_offset(frame.right, frame.up, j, sides);
            buffer.push_vertex(
                input.positions[i] + offset * radius,
                offset.normalize_or(frame.up),
                Vec2::new(j as f32 / sides as f32, v),
                color,
            );
        }
    }

    let s = sides as u32;
    for i in 0..(n - 1) as u32 {
        let ring = i * s;
        let next = ring + s;
        for j in 0..s {
            let j1 = (j + 1) % s;
            buffer.push_triangle(ring + j, next + j, ring + j1);
            buffer.push_triangle(ring + j1, next + j, next + j1);
        }
    }
}
