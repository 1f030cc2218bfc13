//! Undo and stroke removal for the painting session

use tracing::info;

use super::{PaintSession, SessionError};

impl PaintSession {
    /// Undo the most recent stroke.
    ///
    /// Cancels the stroke being drawn if there is one; otherwise removes the
    /// newest finished stroke. Returns false when there was nothing to undo.
    pub fn undo_last_stroke(&mut self) -> bool {
        if self.cancel_stroke() {
            return true;
        }
        match self.strokes.pop() {
            Some(stroke) => {
                stroke.release(&mut self.pool);
                info!("Last stroke undone ({} remain)", self.strokes.len());
                true
            }
            None => false,
        }
    }

    /// Remove the finished stroke at `index`
    pub fn delete_stroke(&mut self, index: usize) -> Result<(), SessionError> {
        let len = self.strokes.len();
        if index >= len {
            return Err(SessionError::StrokeIndexOutOfRange { index, len });
        }
        self.strokes.remove(index).release(&mut self.pool);
        Ok(())
    }

    /// Remove every stroke, including the one being drawn
    pub fn clear_all_strokes(&mut self) {
        self.cancel_stroke();
        let count = self.strokes.len();
        for stroke in self.strokes.drain(..) {
            stroke.release(&mut self.pool);
        }
        info!("All strokes cleared ({} removed)", count);
    }
}
