//! Stroke lifecycle for the painting session

use glam::{Quat, Vec3};
use tracing::{debug, info, warn};

use crate::stroke::Stroke;

use super::{PaintSession, SessionError};

impl PaintSession {
    /// Begin a stroke at the given pose, ending any stroke still in progress
    pub fn begin_stroke(
        &mut self,
        position: Vec3,
        orientation: Quat,
        pressure: f32,
    ) -> Result<(), SessionError> {
        let brush = self.brush.clone().ok_or(SessionError::NoBrushSelected)?;

        if self.active.is_some() {
            self.end_stroke()?;
        }

        let mut stroke = Stroke::new(brush, self.color, self.size, &mut self.pool)
            .with_smoothing(self.config.smoothing)
            .with_layer(self.active_layer);
        let pressure = modulate(&stroke, self.audio_level, pressure);
        stroke.add_point(position, orientation, pressure);

        info!(
            "Stroke started with {} (size {:.3})",
            stroke.descriptor().display_name,
            self.size
        );
        self.active = Some(stroke);
        Ok(())
    }

    /// Feed the next input sample to the active stroke.
    ///
    /// Returns whether the point was accepted.
    pub fn update_stroke(
        &mut self,
        position: Vec3,
        orientation: Quat,
        pressure: f32,
    ) -> Result<bool, SessionError> {
        let level = self.audio_level;
        let stroke = self.active.as_mut().ok_or(SessionError::NoActiveStroke)?;
        let pressure = modulate(stroke, level, pressure);
        Ok(stroke.add_point(position, orientation, pressure))
    }

    /// Finalize the active stroke and add any mirror copies
    pub fn end_stroke(&mut self) -> Result<(), SessionError> {
        let mut stroke = self.active.take().ok_or(SessionError::NoActiveStroke)?;
        stroke.finalize();
        info!("Stroke ended with {} points", stroke.point_count());

        if self.mirror.is_enabled() {
            match self.mirror.spawn_strokes(&stroke, &mut self.pool) {
                Ok(copies) => {
                    debug!("end_stroke: added {} mirror copies", copies.len());
                    self.strokes.push(stroke);
                    self.strokes.extend(copies);
                    return Ok(());
                }
                Err(e) => warn!("end_stroke: mirror request rejected: {}", e),
            }
        }

        self.strokes.push(stroke);
        Ok(())
    }

    /// Drop the active stroke without keeping it. Returns false when there
    /// was nothing to cancel.
    pub fn cancel_stroke(&mut self) -> bool {
        match self.active.take() {
            Some(stroke) => {
                stroke.release(&mut self.pool);
                info!("Stroke cancelled");
                true
            }
            None => false,
        }
    }

    /// Regenerate every dirty stroke. Call once per frame.
    ///
    /// Returns the number of strokes regenerated.
    pub fn update(&mut self) -> usize {
        let mut regenerated = 0;
        for stroke in self.active.iter_mut().chain(self.strokes.iter_mut()) {
            if stroke.is_dirty() {
                stroke.regenerate_mesh();
                regenerated += 1;
            }
        }
        regenerated
    }

    /// Add mirror copies of the finished stroke at `index` using the current
    /// mirror settings. Returns the number of copies added.
    pub fn mirror_stroke(&mut self, index: usize) -> Result<usize, SessionError> {
        let len = self.strokes.len();
        let source = self
            .strokes
            .get(index)
            .ok_or(SessionError::StrokeIndexOutOfRange { index, len })?;
        let copies = self.mirror.spawn_strokes(source, &mut self.pool)?;
        let count = copies.len();
        self.strokes.extend(copies);
        Ok(count)
    }
}

/// Scale pressure by the audio level when the stroke's brush asks for it
fn modulate(stroke: &Stroke, level: f32, pressure: f32) -> f32 {
    match &stroke.descriptor().audio {
        Some(audio) if audio.modulate_size => pressure * audio.size_multiplier(level),
        _ => pressure,
    }
}
