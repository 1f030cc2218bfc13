//! Layers, scene persistence and pool housekeeping for the painting session

use tracing::info;

use crate::pool::PoolStats;
use crate::record::{CameraRecord, LayerRecord, RecordError, SceneRecord};

use super::{PaintSession, SessionError};

impl PaintSession {
    pub fn layers(&self) -> &[LayerRecord] {
        &self.layers
    }

    /// Append a layer and return its index
    pub fn add_layer(&mut self, name: impl Into<String>) -> usize {
        self.layers.push(LayerRecord::new(name));
        self.layers.len() - 1
    }

    /// Layer that new strokes are drawn on
    pub fn set_active_layer(&mut self, index: usize) -> Result<(), SessionError> {
        if index >= self.layers.len() {
            return Err(SessionError::LayerIndexOutOfRange {
                index,
                len: self.layers.len(),
            });
        }
        self.active_layer = index;
        Ok(())
    }

    pub fn active_layer(&self) -> usize {
        self.active_layer
    }

    /// Snapshot every finished stroke
    pub fn save_scene(&self, camera: Option<CameraRecord>) -> SceneRecord {
        let record = SceneRecord::from_strokes(&self.strokes, &self.layers, camera);
        info!(
            "Scene saved: {} strokes, {} brushes",
            record.strokes.len(),
            record.brush_index.len()
        );
        record
    }

    pub fn save_scene_json(&self, camera: Option<CameraRecord>) -> Result<String, SessionError> {
        Ok(self.save_scene(camera).to_json_pretty()?)
    }

    /// Replace all strokes and layers with the contents of `record`.
    ///
    /// Strokes that fail to restore are skipped and returned with their
    /// index in the record.
    pub fn load_scene(&mut self, record: &SceneRecord) -> Vec<(usize, RecordError)> {
        self.clear_all_strokes();

        self.layers = if record.layers.is_empty() {
            vec![LayerRecord::default()]
        } else {
            record.layers.clone()
        };
        self.active_layer = 0;

        let report = record.restore_with_smoothing(&self.catalog, &mut self.pool, self.config.smoothing);
        self.strokes = report.strokes;
        info!(
            "Scene loaded: {} strokes, {} layers",
            self.strokes.len(),
            self.layers.len()
        );
        report.failures
    }

    pub fn load_scene_json(&mut self, json: &str) -> Result<Vec<(usize, RecordError)>, SessionError> {
        let record = SceneRecord::from_json(json)?;
        Ok(self.load_scene(&record))
    }

    /// Drop idle pooled buffers beyond the configured cache size
    pub fn trim_pool(&mut self) {
        self.pool.trim_to_config();
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}
