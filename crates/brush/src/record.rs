//! Saved-scene format
//!
//! A [`SceneRecord`] is the JSON document a painting is saved as: a
//! deduplicated table of brush ids, one entry per finished stroke with its
//! control points, the layer list and an optional camera pose. Arrays are
//! kept as plain `Vec<f32>` so that one malformed stroke fails on its own
//! during [`SceneRecord::restore`] instead of rejecting the whole file.

use std::collections::HashMap;

use brushwork_config::SmoothingConfig;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::brush::BrushCatalog;
use crate::constants::{DEFAULT_LAYER_NAME, FRAME_EPSILON, SCENE_FORMAT_VERSION};
use crate::pool::GeometryBufferPool;
use crate::stroke::Stroke;
use crate::types::ControlPoint;

/// Errors from reading or restoring a scene record
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Field '{field}' has {actual} values, expected {expected}")]
    ShortArray {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Brush index {index} out of range (brush table has {len} entries)")]
    BrushIndexOutOfRange { index: i64, len: usize },

    #[error("Unknown brush '{0}'")]
    UnknownBrush(String),

    #[error("Layer index {index} out of range (scene has {len} layers)")]
    LayerIndexOutOfRange { index: i64, len: usize },

    #[error("Field '{0}' is not a finite number")]
    NonFiniteValue(&'static str),
}

/// A saved painting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRecord {
    pub version: String,
    /// RFC 3339 creation time
    pub created_at: String,
    /// Brush ids referenced by `StrokeRecord::brush_idx`
    pub brush_index: Vec<String>,
    pub strokes: Vec<StrokeRecord>,
    #[serde(default)]
    pub layers: Vec<LayerRecord>,
    #[serde(default)]
    pub camera: Option<CameraRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeRecord {
    pub brush_idx: i64,
    /// RGBA, 0.0-1.0
    #[serde(default)]
    pub color: Vec<f32>,
    pub size: f32,
    #[serde(default)]
    pub layer_idx: i64,
    #[serde(default)]
    pub points: Vec<PointRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    /// x, y, z
    #[serde(default)]
    pub pos: Vec<f32>,
    /// x, y, z, w
    #[serde(default)]
    pub rot: Vec<f32>,
    pub pressure: f32,
}

/// Layer visibility/lock state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub name: String,
    pub visible: bool,
    pub locked: bool,
}

impl LayerRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            locked: false,
        }
    }
}

impl Default for LayerRecord {
    fn default() -> Self {
        Self::new(DEFAULT_LAYER_NAME)
    }
}

/// Viewer pose at save time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraRecord {
    pub position: Vec<f32>,
    pub rotation: Vec<f32>,
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl CameraRecord {
    pub fn new(position: Vec3, rotation: Quat, fov: f32) -> Self {
        Self {
            position: position.to_array().to_vec(),
            rotation: rotation.to_array().to_vec(),
            fov,
        }
    }
}

/// Strokes rebuilt from a record, plus the entries that failed
#[derive(Debug, Default)]
#[must_use = "restored strokes hold pooled buffers until released"]
pub struct RestoreReport {
    pub strokes: Vec<Stroke>,
    /// (stroke index in the record, reason)
    pub failures: Vec<(usize, RecordError)>,
}

impl SceneRecord {
    /// Snapshot the finalized strokes among `strokes`.
    ///
    /// Brush ids are deduplicated in first-seen order. An empty `layers`
    /// slice records a single default layer.
    pub fn from_strokes<'a>(
        strokes: impl IntoIterator<Item = &'a Stroke>,
        layers: &[LayerRecord],
        camera: Option<CameraRecord>,
    ) -> Self {
        let mut brush_index = Vec::new();
        let mut brush_to_index: HashMap<&str, i64> = HashMap::new();
        let mut records = Vec::new();

        for stroke in strokes.into_iter().filter(|s| s.is_finalized()) {
            let id = stroke.descriptor().id.as_str();
            let brush_idx = *brush_to_index.entry(id).or_insert_with(|| {
                brush_index.push(id.to_string());
                (brush_index.len() - 1) as i64
            });
            records.push(StrokeRecord::from_stroke(stroke, brush_idx));
        }

        let layers = if layers.is_empty() {
            vec![LayerRecord::default()]
        } else {
            layers.to_vec()
        };

        Self {
            version: SCENE_FORMAT_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            brush_index,
            strokes: records,
            layers,
            camera,
        }
    }

    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Rebuild every stroke with default smoothing
    pub fn restore(&self, catalog: &BrushCatalog, pool: &mut GeometryBufferPool) -> RestoreReport {
        self.restore_with_smoothing(catalog, pool, SmoothingConfig::default())
    }

    /// Rebuild every stroke; failures are collected per stroke and the rest
    /// still load
    pub fn restore_with_smoothing(
        &self,
        catalog: &BrushCatalog,
        pool: &mut GeometryBufferPool,
        smoothing: SmoothingConfig,
    ) -> RestoreReport {
        let mut report = RestoreReport::default();

        for (index, record) in self.strokes.iter().enumerate() {
            match self.restore_stroke(record, catalog, pool, smoothing) {
                Ok(stroke) => report.strokes.push(stroke),
                Err(e) => {
                    warn!("SceneRecord::restore: skipping stroke {}: {}", index, e);
                    report.failures.push((index, e));
                }
            }
        }

        info!(
            "SceneRecord::restore: {} strokes restored, {} skipped",
            report.strokes.len(),
            report.failures.len()
        );
        report
    }

    fn restore_stroke(
        &self,
        record: &StrokeRecord,
        catalog: &BrushCatalog,
        pool: &mut GeometryBufferPool,
        smoothing: SmoothingConfig,
    ) -> Result<Stroke, RecordError> {
        let brush_id = usize::try_from(record.brush_idx)
            .ok()
            .and_then(|i| self.brush_index.get(i))
            .ok_or(RecordError::BrushIndexOutOfRange {
                index: record.brush_idx,
                len: self.brush_index.len(),
            })?;
        let descriptor = catalog
            .get(brush_id)
            .ok_or_else(|| RecordError::UnknownBrush(brush_id.clone()))?;

        let layer_count = self.layers.len().max(1);
        let layer = usize::try_from(record.layer_idx)
            .ok()
            .filter(|&l| l < layer_count)
            .ok_or(RecordError::LayerIndexOutOfRange {
                index: record.layer_idx,
                len: layer_count,
            })?;

        let color = record.color()?;
        if !record.size.is_finite() {
            return Err(RecordError::NonFiniteValue("size"));
        }
        let points = record.control_points()?;

        // Only build the stroke once everything validated, so a failure
        // never leaves a buffer on loan
        Ok(Stroke::new(descriptor, color, record.size, pool)
            .with_smoothing(smoothing)
            .with_layer(layer)
            .with_recorded_points(points))
    }
}

impl StrokeRecord {
    pub fn from_stroke(stroke: &Stroke, brush_idx: i64) -> Self {
        Self {
            brush_idx,
            color: stroke.color().to_vec(),
            size: stroke.base_size(),
            layer_idx: stroke.layer() as i64,
            points: stroke.points().iter().map(PointRecord::from).collect(),
        }
    }

    /// Validated RGBA color
    pub fn color(&self) -> Result<[f32; 4], RecordError> {
        fixed(&self.color, "color")
    }

    /// Validated control points
    pub fn control_points(&self) -> Result<Vec<ControlPoint>, RecordError> {
        self.points.iter().map(PointRecord::to_control_point).collect()
    }
}

impl PointRecord {
    pub fn to_control_point(&self) -> Result<ControlPoint, RecordError> {
        let position = Vec3::from_array(fixed::<3>(&self.pos, "pos")?);
        let rotation = Quat::from_array(fixed::<4>(&self.rot, "rot")?);
        if !self.pressure.is_finite() {
            return Err(RecordError::NonFiniteValue("pressure"));
        }

        let rotation = if rotation.length_squared() < FRAME_EPSILON {
            Quat::IDENTITY
        } else {
            rotation.normalize()
        };
        Ok(ControlPoint::new(position, rotation, self.pressure))
    }
}

impl From<&ControlPoint> for PointRecord {
    fn from(point: &ControlPoint) -> Self {
        Self {
            pos: point.position.to_array().to_vec(),
            rot: point.orientation.to_array().to_vec(),
            pressure: point.pressure,
        }
    }
}

/// First `N` finite values of `values`
fn fixed<const N: usize>(values: &[f32], field: &'static str) -> Result<[f32; N], RecordError> {
    if values.len() < N {
        return Err(RecordError::ShortArray {
            field,
            expected: N,
            actual: values.len(),
        });
    }
    let mut out = [0.0; N];
    out.copy_from_slice(&values[..N]);
    if out.iter().any(|v| !v.is_finite()) {
        return Err(RecordError::NonFiniteValue(field));
    }
    Ok(out)
}
