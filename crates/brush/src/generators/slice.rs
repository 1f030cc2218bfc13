//! Slices: one square per point, perpendicular to the direction of motion

use glam::Vec2;

use super::GeneratorInput;
use crate::frame::FrameTransport;
use crate::pool::GeometryBuffer;

pub(super) fn generate(input: &GeneratorInput<'_>, buffer: &mut GeometryBuffer) {
    let n = input.len();
    let backfaces = input.descriptor.render_backfaces;
    buffer.ensure_capacity(n * 4, n * if backfaces { 12 } else { 6 });

    let mut transport = FrameTransport::new();
    for i in 0..n {
        let point = &input.points[i];
        let center = input.positions[i];
        let frame = transport.advance(input.tangent(i));
        let half = input.pressured_size(point.pressure) * 0.5;
        let right = frame.right * half;
        let up = frame.up * half;
        let color = input.color_for(point.pressure);

        let corners = [
            (center - right - up, Vec2::new(0.0, 0.0)),
            (center - right + up, Vec2::new(0.0, 1.0)),
            (center + right + up, Vec2::new(1.0, 1.0)),
            (center + right - up, Vec2::new(1.0, 0.0)),
        ];
        let v = corners.map(|(position, uv)| buffer.push_vertex(position, frame.tangent, uv, color));
        buffer.push_quad(v, backfaces);
    }
}
