//! Painting session
//!
//! [`PaintSession`] is the front door for an application: it owns the brush
//! catalog, the buffer pool and every stroke, and turns input events into
//! stroke operations:
//! - Brush, color, size and audio-level state
//! - Stroke lifecycle (`begin_stroke`, `update_stroke`, `end_stroke`)
//! - History (undo, delete, clear)
//! - Layers and scene save/load
//!
//! The session is single-threaded; an application calls [`PaintSession::update`]
//! once per frame to regenerate whatever changed.

mod history;
mod scene;
mod stroke;

use std::sync::Arc;

use brushwork_config::EngineConfig;
use thiserror::Error;
use tracing::{info, warn};

use crate::brush::{BrushCatalog, BrushDescriptor};
use crate::mirror::{MirrorError, MirrorTransform};
use crate::pool::GeometryBufferPool;
use crate::record::{LayerRecord, RecordError};
use crate::stroke::Stroke;

/// Errors from session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No brush selected")]
    NoBrushSelected,

    #[error("Unknown brush '{0}'")]
    UnknownBrush(String),

    #[error("No active stroke - call begin_stroke() first")]
    NoActiveStroke,

    #[error("Stroke index {index} out of range ({len} strokes)")]
    StrokeIndexOutOfRange { index: usize, len: usize },

    #[error("Layer index {index} out of range ({len} layers)")]
    LayerIndexOutOfRange { index: usize, len: usize },

    #[error("Scene record error: {0}")]
    Record(#[from] RecordError),

    #[error("Mirror error: {0}")]
    Mirror(#[from] MirrorError),
}

/// Brush state, strokes and buffers for one painting
#[derive(Debug)]
pub struct PaintSession {
    pub(crate) config: EngineConfig,
    pub(crate) catalog: BrushCatalog,
    pub(crate) pool: GeometryBufferPool,
    /// Finished strokes, oldest first
    pub(crate) strokes: Vec<Stroke>,
    /// Stroke being drawn, if any
    pub(crate) active: Option<Stroke>,
    pub(crate) brush: Option<Arc<BrushDescriptor>>,
    /// Current color (RGBA, 0.0-1.0)
    pub(crate) color: [f32; 4],
    /// Current stroke size in meters
    pub(crate) size: f32,
    /// Latest audio level (0.0-1.0) from the host
    pub(crate) audio_level: f32,
    pub(crate) mirror: MirrorTransform,
    pub(crate) layers: Vec<LayerRecord>,
    pub(crate) active_layer: usize,
}

impl PaintSession {
    /// Create a session with the given configuration and brushes.
    ///
    /// Selects `config.session.default_brush` when the catalog has it.
    pub fn new(config: EngineConfig, catalog: BrushCatalog) -> Self {
        let config = config.validated();
        let brush = catalog.get(&config.session.default_brush);
        if brush.is_none() {
            warn!(
                "PaintSession::new: default brush '{}' not in catalog",
                config.session.default_brush
            );
        }
        let size = match &brush {
            Some(b) => b.clamp_size(config.session.default_size),
            None => config.session.default_size,
        };

        Self {
            pool: GeometryBufferPool::new(config.pool),
            color: config.session.default_color,
            size,
            config,
            catalog,
            strokes: Vec::new(),
            active: None,
            brush,
            audio_level: 0.0,
            mirror: MirrorTransform::default(),
            layers: vec![LayerRecord::default()],
            active_layer: 0,
        }
    }

    /// Session with default configuration and the built-in brushes
    pub fn with_builtin_brushes() -> Self {
        Self::new(EngineConfig::default(), BrushCatalog::builtin())
    }

    /// Select a brush by id. The current size is re-clamped to its range.
    pub fn set_brush(&mut self, id: &str) -> Result<(), SessionError> {
        let brush = self
            .catalog
            .get(id)
            .ok_or_else(|| SessionError::UnknownBrush(id.to_string()))?;
        self.size = brush.clamp_size(self.size);
        info!("Brush changed to: {}", brush.display_name);
        self.brush = Some(brush);
        Ok(())
    }

    pub fn current_brush(&self) -> Option<&Arc<BrushDescriptor>> {
        self.brush.as_ref()
    }

    pub fn set_color(&mut self, color: [f32; 4]) {
        self.color = color;
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    /// Set the stroke size, clamped to the current brush's range
    pub fn set_size(&mut self, size: f32) {
        self.size = match &self.brush {
            Some(b) => b.clamp_size(size),
            None => size,
        };
    }

    /// Nudge the size by a fraction of the current brush's size range
    pub fn adjust_size(&mut self, delta01: f32) {
        let Some(range) = self.brush.as_ref().map(|b| b.size_range[1] - b.size_range[0]) else {
            return;
        };
        self.set_size(self.size + delta01 * range);
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Feed the latest audio level (clamped to 0.0-1.0)
    pub fn set_audio_level(&mut self, level: f32) {
        self.audio_level = if level.is_finite() {
            level.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn audio_level(&self) -> f32 {
        self.audio_level
    }

    pub fn mirror(&self) -> &MirrorTransform {
        &self.mirror
    }

    pub fn set_mirror(&mut self, mirror: MirrorTransform) {
        self.mirror = mirror;
    }

    pub fn catalog(&self) -> &BrushCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Finished strokes, oldest first
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn active_stroke(&self) -> Option<&Stroke> {
        self.active.as_ref()
    }

    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for PaintSession {
    fn drop(&mut self) {
        self.clear_all_strokes();
    }
}
