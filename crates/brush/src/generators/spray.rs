//! Spray: billboards scattered in a disk around the path, distributed evenly
//! by arc length

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use super::{GeneratorInput, push_billboard};
use crate::brush::lerp;
use crate::constants::{SPRAY_MIN_OPACITY, SPRAY_RADIUS_SCALE};
use crate::frame::{compute_frame, yaw_only};
use crate::pool::GeometryBuffer;
use crate::types::Rgba8;

pub(super) fn generate(input: &GeneratorInput<'_>, buffer: &mut GeometryBuffer) {
    let total = input.path_length();
    let count = (total * input.descriptor.particle_rate.max(0.0)).ceil() as usize;
    if count == 0 {
        return;
    }

    let backfaces = input.descriptor.render_backfaces;
    buffer.ensure_capacity(count * 4, count * if backfaces { 12 } else { 6 });

    let variance = input.descriptor.size_variance.clamp(0.0, 1.0);
    let rotation_range = input.descriptor.particle_rotation_range.to_radians();
    let radius = input.base_size * SPRAY_RADIUS_SCALE;
    let mut rng = input.rng();

    let positions = input.positions;
    let mut segment = 0;
    let mut segment_start = 0.0;

    for k in 0..count {
        let target = (k as f32 + 0.5) / count as f32 * total;

        // Walk forward to the segment containing `target`
        let mut segment_length = positions[segment].distance(positions[segment + 1]);
        while segment_start + segment_length < target && segment + 2 < positions.len() {
            segment_start += segment_length;
            segment += 1;
            segment_length = positions[segment].distance(positions[segment + 1]);
        }

        let t = if segment_length > 0.0 {
            ((target - segment_start) / segment_length).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let a = &input.points[segment];
        let b = &input.points[segment + 1];
        let center = positions[segment].lerp(positions[segment + 1], t);
        let pressure = lerp(a.pressure, b.pressure, t);

        let tangent = (positions[segment + 1] - positions[segment]).normalize_or(Vec3::Z);
        let up = compute_frame(tangent, Vec3::Y);
        let right = tangent.cross(up);

        let r = radius * rng.random::<f32>().sqrt();
        let theta = rng.random::<f32>() * TAU;
        let jitter: f32 = rng.random_range(-1.0..=1.0);
        let spin: f32 = rng.random();
        let fade: f32 = rng.random_range(SPRAY_MIN_OPACITY..=1.0);

        let offset = right * (r * theta.cos()) + up * (r * theta.sin());
        let size = input.pressured_size(pressure) * (1.0 + variance * jitter);
        let opacity = input.pressured_opacity(pressure) * fade;

        push_billboard(
            buffer,
            center + offset,
            yaw_only(a.orientation.slerp(b.orientation, t)),
            size * 0.5,
            spin * rotation_range,
            Rgba8::with_opacity(input.color, opacity),
            backfaces,
        );
    }
}
