//! Geometry generators
//!
//! One module per [`GeometryKind`]. Every generator reads the same
//! [`GeneratorInput`] and appends into a [`GeometryBuffer`] the caller has
//! already cleared. Output is a pure function of the input: the pseudo-random
//! generators reseed from the brush id on every call.

mod hull;
mod particle;
mod ribbon;
mod slice;
mod spray;
mod tube;

use glam::{Quat, Vec2, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use tracing::debug;

use crate::brush::BrushDescriptor;
use crate::constants::TANGENT_EPSILON;
use crate::pool::GeometryBuffer;
use crate::types::{ControlPoint, GeometryKind, Rgba8};

/// Everything a generator may read
#[derive(Debug, Clone, Copy)]
pub struct GeneratorInput<'a> {
    /// Smoothed positions, one per control point
    pub positions: &'a [Vec3],
    /// Stored control points (pressure and orientation)
    pub points: &'a [ControlPoint],
    /// Cumulative arc length at each smoothed position, see [`arc_lengths`]
    pub lengths: &'a [f32],
    pub descriptor: &'a BrushDescriptor,
    /// Stroke color (RGBA, 0.0-1.0)
    pub color: [f32; 4],
    /// Stroke size in meters
    pub base_size: f32,
}

impl<'a> GeneratorInput<'a> {
    pub fn len(&self) -> usize {
        self.positions
            .len()
            .min(self.points.len())
            .min(self.lengths.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unit direction of travel at point `i`.
    ///
    /// Forward difference at the start, backward at the end, central in
    /// between; world forward when the difference vanishes.
    pub fn tangent(&self, i: usize) -> Vec3 {
        let n = self.len();
        if n < 2 {
            return Vec3::Z;
        }
        let p = self.positions;
        let delta = if i == 0 {
            p[1] - p[0]
        } else if i == n - 1 {
            p[i] - p[i - 1]
        } else {
            p[i + 1] - p[i - 1]
        };
        let tangent = delta.normalize_or_zero();
        if tangent.length_squared() < TANGENT_EPSILON {
            Vec3::Z
        } else {
            tangent
        }
    }

    /// Length of the smoothed path
    pub fn path_length(&self) -> f32 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    /// Fraction of the path covered at point `i`
    pub fn arc_fraction(&self, i: usize) -> f32 {
        let total = self.path_length();
        if total > 0.0 { self.lengths[i] / total } else { 0.0 }
    }

    pub fn pressured_size(&self, pressure: f32) -> f32 {
        self.descriptor.pressured_size(self.base_size, pressure)
    }

    pub fn pressured_opacity(&self, pressure: f32) -> f32 {
        self.descriptor.pressured_opacity(pressure)
    }

    /// Vertex color for a pressure
    pub fn color_for(&self, pressure: f32) -> Rgba8 {
        Rgba8::with_opacity(self.color, self.pressured_opacity(pressure))
    }

    /// Pseudo-random stream for this brush, identical on every call
    pub(crate) fn rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.descriptor.seed())
    }
}

/// Write the mesh for `kind` into `buffer`.
///
/// Fewer points than the kind requires leaves the buffer untouched.
pub fn generate(kind: GeometryKind, input: &GeneratorInput<'_>, buffer: &mut GeometryBuffer) {
    if input.len() < kind.min_points() {
        return;
    }

    match kind {
        GeometryKind::Ribbon => ribbon::generate(input, buffer),
        GeometryKind::Tube => tube::generate(input, buffer),
        GeometryKind::Hull => hull::generate(input, buffer),
        GeometryKind::Particle => particle::generate(input, buffer),
        GeometryKind::Spray => spray::generate(input, buffer),
        GeometryKind::Slice => slice::generate(input, buffer),
    }

    debug!(
        "generate: {:?} from {} points -> {} vertices, {} triangles",
        kind,
        input.len(),
        buffer.vertex_count(),
        buffer.triangle_count()
    );
}

/// Cumulative arc length at each position, written into `out`
pub fn arc_lengths(positions: &[Vec3], out: &mut Vec<f32>) {
    out.clear();
    let mut total = 0.0;
    for (i, p) in positions.iter().enumerate() {
        if i > 0 {
            total += p.distance(positions[i - 1]);
        }
        out.push(total);
    }
}

/// Offset of vertex `j` of an `sides`-gon in the plane of `right`/`up`
fn ring_offset(right: Vec3, up: Vec3, j: usize, sides: usize) -> Vec3 {
    let angle = j as f32 * std::f32::consts::TAU / sides as f32;
    right * angle.cos() + up * angle.sin()
}

/// A camera-facing quad centered at `center`.
///
/// The quad lies in the plane of `basis`' right/up axes, rotated in-plane by
/// `angle` radians, and faces back along `basis`' forward axis.
fn push_billboard(
    buffer: &mut GeometryBuffer,
    center: Vec3,
    basis: Quat,
    half_size: f32,
    angle: f32,
    color: Rgba8,
    backfaces: bool,
) {
    let spin = basis * Quat::from_rotation_z(angle);
    let right = spin * Vec3::X * half_size;
    let up = spin * Vec3::Y * half_size;
    let normal = -(basis * Vec3::Z);

    let corners = [
        (center - right - up, Vec2::new(0.0, 0.0)),
        (center - right + up, Vec2::new(0.0, 1.0)),
        (center + right + up, Vec2::new(1.0, 1.0)),
        (center + right - up, Vec2::new(1.0, 0.0)),
    ];
    let v = corners.map(|(position, uv)| buffer.push_vertex(position, normal, uv, color));
    buffer.push_quad(v, backfaces);
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::smoothing::smoothed_positions;

    /// Control points along `positions` with identity orientation
    pub fn points(positions: &[Vec3], pressure: f32) -> Vec<ControlPoint> {
        positions
            .iter()
            .map(|&p| ControlPoint::new(p, Quat::IDENTITY, pressure))
            .collect()
    }

    /// Points on a gentle arc in the XZ plane
    pub fn arc(n: usize) -> Vec<ControlPoint> {
        let positions: Vec<Vec3> = (0..n)
            .map(|i| {
                let t = i as f32 * 0.1;
                Vec3::new(t.sin(), 0.05 * i as f32, t.cos() * 0.5)
            })
            .collect();
        points(&positions, 0.8)
    }

    /// Run a generator over freshly smoothed points
    pub fn run(kind: GeometryKind, brush: &BrushDescriptor, pts: &[ControlPoint]) -> GeometryBuffer {
        let mut positions = Vec::new();
        let mut lengths = Vec::new();
        smoothed_positions(pts, true, &mut positions);
        arc_lengths(&positions, &mut lengths);
        let input = GeneratorInput {
            positions: &positions,
            points: pts,
            lengths: &lengths,
            descriptor: brush,
            color: [1.0, 0.5, 0.25, 1.0],
            base_size: 0.02,
        };
        let mut pool = crate::pool::GeometryBufferPool::default();
        let mut buffer = pool.acquire();
        generate(kind, &input, &mut buffer);
        buffer
    }
}
