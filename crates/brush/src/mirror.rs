//! Symmetry copies of finished strokes
//!
//! A [`MirrorTransform`] maps a finished stroke's control points through one
//! or more reflections or rotations. Every resulting point set becomes a new,
//! independent [`Stroke`] that runs the normal generator pipeline.

use glam::{Quat, Vec3};
use thiserror::Error;
use tracing::debug;

use crate::constants::{FRAME_EPSILON, MAX_RADIAL_COUNT, MIN_RADIAL_COUNT, TANGENT_EPSILON};
use crate::frame::look_rotation;
use crate::pool::GeometryBufferPool;
use crate::stroke::Stroke;
use crate::types::ControlPoint;

/// Errors from building symmetry copies
#[derive(Debug, Error, PartialEq)]
pub enum MirrorError {
    #[error("Only finalized strokes can be mirrored")]
    NotFinalized,

    #[error("Mirror plane normal {0} has no direction")]
    DegenerateNormal(Vec3),

    #[error("Radial axis {0} has no direction")]
    DegenerateAxis(Vec3),
}

/// Which symmetry to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MirrorMode {
    #[default]
    Off,
    /// Reflect across one plane
    SinglePlane,
    /// Reflect across two planes and their composition
    DoublePlane,
    /// N-fold rotation around an axis
    Radial,
}

impl MirrorMode {
    /// The mode after this one, wrapping back to `Off`
    pub fn next(self) -> Self {
        match self {
            MirrorMode::Off => MirrorMode::SinglePlane,
            MirrorMode::SinglePlane => MirrorMode::DoublePlane,
            MirrorMode::DoublePlane => MirrorMode::Radial,
            MirrorMode::Radial => MirrorMode::Off,
        }
    }
}

/// Symmetry settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorTransform {
    pub mode: MirrorMode,
    /// Point on every mirror plane and on the radial axis
    pub center: Vec3,
    pub plane_normal: Vec3,
    /// Second plane for [`MirrorMode::DoublePlane`]
    pub second_plane_normal: Vec3,
    pub radial_axis: Vec3,
    /// Total copies around the axis including the original (clamped to 2-12)
    pub radial_count: u32,
}

impl Default for MirrorTransform {
    fn default() -> Self {
        Self {
            mode: MirrorMode::Off,
            center: Vec3::ZERO,
            plane_normal: Vec3::X,
            second_plane_normal: Vec3::Z,
            radial_axis: Vec3::Y,
            radial_count: 4,
        }
    }
}

impl MirrorTransform {
    pub fn new(mode: MirrorMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.mode != MirrorMode::Off
    }

    pub fn set_radial_count(&mut self, count: u32) {
        self.radial_count = count.clamp(MIN_RADIAL_COUNT, MAX_RADIAL_COUNT);
    }

    pub fn cycle_mode(&mut self) {
        self.mode = self.mode.next();
    }

    /// Map `points` through the current symmetry.
    ///
    /// Returns one point set per copy, not including the original; empty
    /// when mirroring is off.
    pub fn apply(&self, points: &[ControlPoint]) -> Result<Vec<Vec<ControlPoint>>, MirrorError> {
        let copies = match self.mode {
            MirrorMode::Off => Vec::new(),
            MirrorMode::SinglePlane => {
                let n = plane_normal(self.plane_normal)?;
                vec![self.reflect_all(points, n)]
            }
            MirrorMode::DoublePlane => {
                let n1 = plane_normal(self.plane_normal)?;
                let n2 = plane_normal(self.second_plane_normal)?;
                let first = self.reflect_all(points, n1);
                let second = self.reflect_all(points, n2);
                let both = self.reflect_all(&first, n2);
                vec![first, second, both]
            }
            MirrorMode::Radial => {
                let axis = self.radial_axis.normalize_or_zero();
                if axis.length_squared() < FRAME_EPSILON {
                    return Err(MirrorError::DegenerateAxis(self.radial_axis));
                }
                let count = self.radial_count.clamp(MIN_RADIAL_COUNT, MAX_RADIAL_COUNT);
                let step = std::f32::consts::TAU / count as f32;
                (1..count)
                    .map(|i| {
                        let rotation = Quat::from_axis_angle(axis, step * i as f32);
                        self.rotate_all(points, rotation)
                    })
                    .collect()
            }
        };
        Ok(copies)
    }

    /// Build a finalized stroke for every copy of `stroke`
    pub fn spawn_strokes(
        &self,
        stroke: &Stroke,
        pool: &mut GeometryBufferPool,
    ) -> Result<Vec<Stroke>, MirrorError> {
        if !stroke.is_finalized() {
            return Err(MirrorError::NotFinalized);
        }

        let copies = self.apply(stroke.points())?;
        debug!(
            "MirrorTransform::spawn_strokes: {:?} -> {} copies of {} points",
            self.mode,
            copies.len(),
            stroke.point_count()
        );

        Ok(copies
            .into_iter()
            .map(|points| {
                Stroke::new(
                    stroke.descriptor().clone(),
                    stroke.color(),
                    stroke.base_size(),
                    pool,
                )
                .with_smoothing(stroke.smoothing())
                .with_layer(stroke.layer())
                .with_recorded_points(points)
            })
            .collect())
    }

    fn reflect_all(&self, points: &[ControlPoint], normal: Vec3) -> Vec<ControlPoint> {
        points
            .iter()
            .map(|p| ControlPoint {
                position: reflect_point(p.position, self.center, normal),
                orientation: reflect_rotation(p.orientation, normal),
                ..*p
            })
            .collect()
    }

    fn rotate_all(&self, points: &[ControlPoint], rotation: Quat) -> Vec<ControlPoint> {
        points
            .iter()
            .map(|p| ControlPoint {
                position: self.center + rotation * (p.position - self.center),
                orientation: (rotation * p.orientation).normalize(),
                ..*p
            })
            .collect()
    }
}

fn plane_normal(normal: Vec3) -> Result<Vec3, MirrorError> {
    let n = normal.normalize_or_zero();
    if n.length_squared() < FRAME_EPSILON {
        return Err(MirrorError::DegenerateNormal(normal));
    }
    Ok(n)
}

/// Reflect `point` across the plane through `center` with unit `normal`
pub fn reflect_point(point: Vec3, center: Vec3, normal: Vec3) -> Vec3 {
    point - 2.0 * (point - center).dot(normal) * normal
}

/// Reflect a direction across a plane with unit `normal`
fn reflect_vector(v: Vec3, normal: Vec3) -> Vec3 {
    v - 2.0 * v.dot(normal) * normal
}

/// Orientation whose forward and up axes are the reflections of `rotation`'s.
///
/// A reflection is not a rotation, so the result is re-derived as a look
/// rotation; the original is kept when the reflected forward vanishes.
pub fn reflect_rotation(rotation: Quat, normal: Vec3) -> Quat {
    let forward = reflect_vector(rotation * Vec3::Z, normal);
    let up = reflect_vector(rotation * Vec3::Y, normal);
    if forward.length_squared() <= TANGENT_EPSILON {
        return rotation;
    }
    look_rotation(forward, up)
}
