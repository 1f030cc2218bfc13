//! A single brush stroke and its generated mesh
//!
//! A stroke collects control points while it is active, regenerates its mesh
//! into a pooled [`GeometryBuffer`] whenever it is dirty, and becomes
//! immutable once finalized. Its buffer goes back to the pool through
//! [`Stroke::release`], which consumes the stroke. Dropping a stroke without
//! releasing it leaves the buffer on loan and logs a warning.

use std::sync::Arc;
use std::time::Instant;

use brushwork_config::SmoothingConfig;
use glam::{Quat, Vec3};
use tracing::{debug, trace, warn};

use crate::brush::BrushDescriptor;
use crate::generators::{self, GeneratorInput, arc_lengths};
use crate::pool::{GeometryBuffer, GeometryBufferPool};
use crate::smoothing::{smooth_pressure, smoothed_positions};
use crate::types::ControlPoint;

/// One continuous brush stroke
#[derive(Debug)]
#[must_use = "a stroke holds a pooled buffer until `release` is called"]
pub struct Stroke {
    descriptor: Arc<BrushDescriptor>,
    /// Stroke color (RGBA, 0.0-1.0)
    color: [f32; 4],
    /// Stroke size in meters
    base_size: f32,
    /// Index into the scene's layer list
    layer: usize,
    points: Vec<ControlPoint>,
    finalized: bool,
    dirty: bool,
    smoothing: SmoothingConfig,
    buffer: GeometryBuffer,
    /// Smoothed position snapshot, reused between regenerations
    positions: Vec<Vec3>,
    /// Arc lengths along `positions`, reused between regenerations
    lengths: Vec<f32>,
    started: Instant,
}

impl Stroke {
    /// Start an empty stroke, borrowing a buffer from `pool`
    pub fn new(
        descriptor: Arc<BrushDescriptor>,
        color: [f32; 4],
        base_size: f32,
        pool: &mut GeometryBufferPool,
    ) -> Self {
        Self {
            descriptor,
            color,
            base_size,
            layer: 0,
            points: Vec::new(),
            finalized: false,
            dirty: false,
            smoothing: SmoothingConfig::default(),
            buffer: pool.acquire(),
            positions: Vec::new(),
            lengths: Vec::new(),
            started: Instant::now(),
        }
    }

    /// Rebuild a finished stroke from recorded points.
    ///
    /// The points are taken as-is (no spacing filter or pressure smoothing)
    /// and the mesh is generated immediately.
    pub fn from_points(
        descriptor: Arc<BrushDescriptor>,
        color: [f32; 4],
        base_size: f32,
        points: Vec<ControlPoint>,
        pool: &mut GeometryBufferPool,
    ) -> Self {
        Self::new(descriptor, color, base_size, pool).with_recorded_points(points)
    }

    pub fn with_smoothing(mut self, smoothing: SmoothingConfig) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn with_layer(mut self, layer: usize) -> Self {
        self.layer = layer;
        self
    }

    /// Replace the points with a recorded set and finalize
    pub fn with_recorded_points(mut self, points: Vec<ControlPoint>) -> Self {
        self.points = points;
        self.finalized = true;
        self.regenerate_mesh();
        self
    }

    /// Append a control point, timestamped relative to the stroke start.
    ///
    /// Returns false (and changes nothing) when the stroke is finalized or the
    /// point is closer than the brush's minimum segment length to the last one.
    pub fn add_point(&mut self, position: Vec3, orientation: Quat, pressure: f32) -> bool {
        let timestamp = self.started.elapsed().as_secs_f32();
        self.add_point_at(position, orientation, pressure, timestamp)
    }

    /// [`Stroke::add_point`] with an explicit timestamp in seconds
    pub fn add_point_at(
        &mut self,
        position: Vec3,
        orientation: Quat,
        pressure: f32,
        timestamp: f32,
    ) -> bool {
        if self.finalized {
            trace!("add_point: stroke is finalized, rejecting");
            return false;
        }
        if !is_finite_input(position, orientation, pressure) {
            trace!("add_point: non-finite input, rejecting");
            return false;
        }

        let pressure = match self.points.last() {
            Some(last) => match self.spaced_pressure(last, position, pressure) {
                Some(p) => p,
                None => return false,
            },
            None => pressure,
        };

        self.points.push(ControlPoint {
            position,
            orientation,
            pressure: pressure.clamp(0.0, 1.0),
            timestamp,
        });
        self.dirty = true;
        true
    }

    /// Replace the most recent point, e.g. to follow the cursor between
    /// accepted samples. Subject to the same rules as [`Stroke::add_point`].
    pub fn update_last_point(&mut self, position: Vec3, orientation: Quat, pressure: f32) -> bool {
        if self.finalized || !is_finite_input(position, orientation, pressure) {
            return false;
        }

        let count = self.points.len();
        if count == 0 {
            return false;
        }

        let pressure = if count >= 2 {
            let previous = self.points[count - 2];
            match self.spaced_pressure(&previous, position, pressure) {
                Some(p) => p,
                None => return false,
            }
        } else {
            pressure
        };

        let timestamp = self.started.elapsed().as_secs_f32();
        self.points[count - 1] = ControlPoint {
            position,
            orientation,
            pressure: pressure.clamp(0.0, 1.0),
            timestamp,
        };
        self.dirty = true;
        true
    }

    /// Smoothed pressure for a point following `last`, or None when the new
    /// position is too close
    fn spaced_pressure(&self, last: &ControlPoint, position: Vec3, pressure: f32) -> Option<f32> {
        let distance = position.distance(last.position);
        if distance < self.descriptor.min_segment_length {
            trace!(
                "add_point: {:.4} m from previous point (minimum {:.4}), rejecting",
                distance, self.descriptor.min_segment_length
            );
            return None;
        }
        Some(smooth_pressure(
            pressure,
            last.pressure,
            distance,
            self.smoothing.pressure_window,
        ))
    }

    /// Freeze the point list and generate the final mesh. Idempotent.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;
        self.regenerate_mesh();
        debug!(
            "Stroke::finalize: '{}' with {} points, {} triangles",
            self.descriptor.id,
            self.points.len(),
            self.buffer.triangle_count()
        );
    }

    /// Rebuild the mesh from the current points and clear the dirty flag
    pub fn regenerate_mesh(&mut self) {
        self.buffer.clear();
        smoothed_positions(&self.points, self.smoothing.smooth_positions, &mut self.positions);
        arc_lengths(&self.positions, &mut self.lengths);

        let input = GeneratorInput {
            positions: &self.positions,
            points: &self.points,
            lengths: &self.lengths,
            descriptor: &self.descriptor,
            color: self.color,
            base_size: self.base_size,
        };
        generators::generate(self.descriptor.kind, &input, &mut self.buffer);
        self.dirty = false;
    }

    /// Hand the buffer back to `pool`
    pub fn release(mut self, pool: &mut GeometryBufferPool) {
        pool.release(self.take_buffer());
    }

    fn take_buffer(&mut self) -> GeometryBuffer {
        std::mem::replace(&mut self.buffer, GeometryBuffer::detached())
    }

    /// Whether points changed since the last regeneration
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// The most recently generated mesh
    pub fn mesh(&self) -> &GeometryBuffer {
        &self.buffer
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Length of the path through the stored (unsmoothed) points
    pub fn total_length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|w| w[0].position.distance(w[1].position))
            .sum()
    }

    pub fn descriptor(&self) -> &Arc<BrushDescriptor> {
        &self.descriptor
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    pub fn base_size(&self) -> f32 {
        self.base_size
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn set_layer(&mut self, layer: usize) {
        self.layer = layer;
    }

    pub fn smoothing(&self) -> SmoothingConfig {
        self.smoothing
    }
}

impl Drop for Stroke {
    fn drop(&mut self) {
        if !self.buffer.is_detached() {
            warn!(
                "Stroke dropped without release: buffer {} stays on loan",
                self.buffer.id()
            );
        }
    }
}

fn is_finite_input(position: Vec3, orientation: Quat, pressure: f32) -> bool {
    position.is_finite() && orientation.is_finite() && pressure.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeometryKind;

    fn ribbon() -> Arc<BrushDescriptor> {
        Arc::new(BrushDescriptor::new("flat", "Flat", GeometryKind::Ribbon))
    }

    fn stroke(pool: &mut GeometryBufferPool) -> Stroke {
        Stroke::new(ribbon(), [1.0, 1.0, 1.0, 1.0], 0.02, pool)
    }

    #[test]
    fn test_minimum_spacing() {
        let mut pool = GeometryBufferPool::default();
        let mut s = stroke(&mut pool);

        assert!(s.add_point(Vec3::ZERO, Quat::IDENTITY, 1.0));
        // 1 mm is below the 2 mm minimum
        assert!(!s.add_point(Vec3::new(0.001, 0.0, 0.0), Quat::IDENTITY, 1.0));
        assert!(s.add_point(Vec3::new(0.003, 0.0, 0.0), Quat::IDENTITY, 1.0));
        assert_eq!(s.point_count(), 2);

        for w in s.points().windows(2) {
            assert!(w[0].position.distance(w[1].position) >= s.descriptor().min_segment_length);
        }
        s.release(&mut pool);
    }

    #[test]
    fn test_pressure_smoothing_on_ingest() {
        let mut pool = GeometryBufferPool::default();
        let mut s = stroke(&mut pool);

        // First point stores the clamped raw value
        assert!(s.add_point(Vec3::ZERO, Quat::IDENTITY, 1.7));
        assert_eq!(s.points()[0].pressure, 1.0);

        // One window away: k = 0.1, smoothed = lerp(0.0, 1.0, 0.1)
        assert!(s.add_point(Vec3::new(0.02, 0.0, 0.0), Quat::IDENTITY, 0.0));
        assert!((s.points()[1].pressure - 0.1).abs() < 1e-5);
        s.release(&mut pool);
    }

    #[test]
    fn test_pressure_smoothing_can_be_disabled() {
        let mut pool = GeometryBufferPool::default();
        let mut s = stroke(&mut pool).with_smoothing(SmoothingConfig {
            pressure_window: 0.0,
            smooth_positions: false,
        });
        s.add_point(Vec3::ZERO, Quat::IDENTITY, 1.0);
        s.add_point(Vec3::new(0.01, 0.0, 0.0), Quat::IDENTITY, 0.25);
        assert_eq!(s.points()[1].pressure, 0.25);
        s.release(&mut pool);
    }

    #[test]
    fn test_finalized_stroke_rejects_points() {
        let mut pool = GeometryBufferPool::default();
        let mut s = stroke(&mut pool);
        s.add_point(Vec3::ZERO, Quat::IDENTITY, 1.0);
        s.add_point(Vec3::new(0.0, 0.0, 0.1), Quat::IDENTITY, 1.0);
        s.finalize();

        assert!(s.is_finalized());
        assert!(!s.is_dirty());
        assert!(!s.add_point(Vec3::new(0.0, 0.0, 0.2), Quat::IDENTITY, 1.0));
        assert!(!s.update_last_point(Vec3::new(0.0, 0.0, 0.2), Quat::IDENTITY, 1.0));
        assert_eq!(s.point_count(), 2);
        assert_eq!(s.mesh().triangle_count(), 2);
        s.release(&mut pool);
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let mut pool = GeometryBufferPool::default();
        let mut s = stroke(&mut pool);
        assert!(!s.add_point(Vec3::new(f32::NAN, 0.0, 0.0), Quat::IDENTITY, 1.0));
        assert!(!s.add_point(Vec3::ZERO, Quat::IDENTITY, f32::INFINITY));
        let nan = Quat::from_xyzw(f32::NAN, 0.0, 0.0, 1.0);
        assert!(!s.add_point(Vec3::ZERO, nan, 1.0));
        assert_eq!(s.point_count(), 0);

        assert!(s.add_point(Vec3::ZERO, Quat::IDENTITY, 1.0));
        assert!(s.add_point(Vec3::new(0.0, 0.0, 0.1), Quat::IDENTITY, 1.0));
        assert!(!s.update_last_point(Vec3::new(0.0, 0.0, 0.2), nan, 1.0));
        assert!(s.points().iter().all(|p| p.orientation.is_finite()));
        s.release(&mut pool);
    }

    #[test]
    fn test_colinear_ribbon_through_ingestion() {
        let mut pool = GeometryBufferPool::default();
        let mut s = stroke(&mut pool);
        assert_eq!(s.descriptor().min_segment_length, 0.002);
        for i in 0..3 {
            assert!(s.add_point(Vec3::new(0.0, 0.0, i as f32 * 0.01), Quat::IDENTITY, 1.0));
        }
        s.regenerate_mesh();
        assert_eq!(s.mesh().vertex_count(), 6);
        assert_eq!(s.mesh().triangle_count(), 4);
        s.release(&mut pool);

        let backfaced = Arc::new(BrushDescriptor {
            render_backfaces: true,
            ..BrushDescriptor::new("flat", "Flat", GeometryKind::Ribbon)
        });
        let mut s = Stroke::new(backfaced, [1.0; 4], 0.02, &mut pool);
        for i in 0..3 {
            s.add_point(Vec3::new(0.0, 0.0, i as f32 * 0.01), Quat::IDENTITY, 1.0);
        }
        s.finalize();
        assert_eq!(s.mesh().vertex_count(), 6);
        assert_eq!(s.mesh().triangle_count(), 8);
        s.release(&mut pool);
    }

    #[test]
    fn test_dirty_until_regenerated() {
        let mut pool = GeometryBufferPool::default();
        let mut s = stroke(&mut pool);
        assert!(!s.is_dirty());

        s.add_point(Vec3::ZERO, Quat::IDENTITY, 1.0);
        s.add_point(Vec3::new(0.0, 0.0, 0.1), Quat::IDENTITY, 1.0);
        assert!(s.is_dirty());
        assert!(s.mesh().is_empty());

        s.regenerate_mesh();
        assert!(!s.is_dirty());
        assert_eq!(s.mesh().vertex_count(), 4);

        // A rejected point leaves the flag alone
        assert!(!s.add_point(Vec3::new(0.0, 0.0, 0.1), Quat::IDENTITY, 1.0));
        assert!(!s.is_dirty());
        s.release(&mut pool);
    }

    #[test]
    fn test_update_last_point() {
        let mut pool = GeometryBufferPool::default();
        let mut s = stroke(&mut pool);
        assert!(!s.update_last_point(Vec3::ZERO, Quat::IDENTITY, 1.0));

        s.add_point(Vec3::ZERO, Quat::IDENTITY, 1.0);
        s.add_point(Vec3::new(0.0, 0.0, 0.1), Quat::IDENTITY, 1.0);
        assert!(s.update_last_point(Vec3::new(0.0, 0.0, 0.15), Quat::IDENTITY, 1.0));
        assert_eq!(s.point_count(), 2);
        assert_eq!(s.points()[1].position, Vec3::new(0.0, 0.0, 0.15));

        // Would collapse onto the previous point
        assert!(!s.update_last_point(Vec3::new(0.0, 0.0, 0.001), Quat::IDENTITY, 1.0));
        assert_eq!(s.points()[1].position, Vec3::new(0.0, 0.0, 0.15));
        s.release(&mut pool);
    }

    #[test]
    fn test_from_points_is_finalized_with_mesh() {
        let mut pool = GeometryBufferPool::default();
        let points = vec![
            ControlPoint::new(Vec3::ZERO, Quat::IDENTITY, 0.5),
            ControlPoint::new(Vec3::new(0.0, 0.0, 0.1), Quat::IDENTITY, 0.5),
            ControlPoint::new(Vec3::new(0.0, 0.0, 0.2), Quat::IDENTITY, 0.5),
        ];
        let s = Stroke::from_points(ribbon(), [1.0; 4], 0.02, points.clone(), &mut pool);

        assert!(s.is_finalized());
        assert_eq!(s.points(), &points[..]);
        assert_eq!(s.mesh().triangle_count(), 4);
        assert!((s.total_length() - 0.2).abs() < 1e-5);
        s.release(&mut pool);
    }

    #[test]
    fn test_release_returns_buffer() {
        let mut pool = GeometryBufferPool::default();
        let s = stroke(&mut pool);
        let id = s.mesh().id();
        assert!(pool.is_on_loan(id));

        s.release(&mut pool);
        assert!(!pool.is_on_loan(id));
        assert_eq!(pool.stats().unused, 1);

        // The next stroke reuses it
        let again = stroke(&mut pool);
        assert_eq!(again.mesh().id(), id);
        assert_eq!(pool.stats().total_allocated, 1);
        again.release(&mut pool);
    }

    #[test]
    fn test_release_detaches_buffer() {
        let mut pool = GeometryBufferPool::default();
        let mut s = stroke(&mut pool);
        let id = s.mesh().id();

        let buffer = s.take_buffer();
        assert!(s.mesh().is_detached());
        assert!(pool.is_on_loan(id));
        pool.release(buffer);
        drop(s);

        let stats = pool.stats();
        assert_eq!(stats.in_use, 0);
        assert_eq!(stats.unused, 1);
    }
}
