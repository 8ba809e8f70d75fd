//! Pointer-driven annotation engine for the currently active image.
//!
//! Per active image the engine is a two-state machine: `Idle` until
//! pointer-down, `Drawing` while the drag is in progress. Pointer-up
//! (or the pointer leaving the canvas) commits the stroke if it has at
//! least two points, otherwise discards it. Committing appends the
//! stroke to the image item and swaps in a freshly rasterized working
//! bitmap; the store stays the single owner of all image state.

use tracing::debug;

use fieldscope_core::{FieldscopeError, Point, Stroke};
use fieldscope_store::ImageStore;
use image::RgbaImage;

use crate::raster;
use crate::viewport::Viewport;

#[derive(Debug, Clone)]
enum PointerState {
    Idle,
    Drawing(Stroke),
}

/// What happened to the in-progress stroke on pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeOutcome {
    /// Stroke committed and the working bitmap replaced.
    Committed,
    /// Fewer than two points, or no drag in progress: a no-op.
    Discarded,
}

/// Canvas engine bound to at most one active image at a time. Bitmaps
/// are borrowed from the store per operation, never retained.
#[derive(Debug)]
pub struct CanvasEngine {
    active: Option<usize>,
    viewport: Option<Viewport>,
    pointer: PointerState,
}

impl CanvasEngine {
    pub fn new() -> Self {
        Self {
            active: None,
            viewport: None,
            pointer: PointerState::Idle,
        }
    }

    /// Make the item at `index` the annotation target, displayed through
    /// `viewport`. Any in-progress stroke on the previous image is
    /// discarded; committed strokes never carry across images.
    pub fn activate(
        &mut self,
        store: &ImageStore,
        index: usize,
        viewport: Viewport,
    ) -> Result<(), FieldscopeError> {
        if store.get(index).is_none() {
            return Err(FieldscopeError::IndexOutOfRange {
                index,
                len: store.len(),
            });
        }
        if matches!(self.pointer, PointerState::Drawing(_)) {
            debug!(active = ?self.active, "Discarding in-progress stroke on image switch");
        }
        self.pointer = PointerState::Idle;
        self.active = Some(index);
        self.viewport = Some(viewport);
        Ok(())
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Begin a drag. Ignored when no image is active.
    pub fn pointer_down(&mut self, pointer: Point) {
        let Some(viewport) = self.viewport else {
            debug!("Pointer-down with no active image");
            return;
        };
        let mut stroke = Stroke::new();
        stroke.push(viewport.to_image(pointer));
        self.pointer = PointerState::Drawing(stroke);
    }

    /// Extend the drag. Ignored while idle.
    pub fn pointer_move(&mut self, pointer: Point) {
        if let (PointerState::Drawing(stroke), Some(viewport)) =
            (&mut self.pointer, self.viewport)
        {
            stroke.push(viewport.to_image(pointer));
        }
    }

    /// End the drag: commit a drawable stroke, rasterize the composite
    /// and replace the working bitmap, or discard a degenerate one.
    pub fn pointer_up(&mut self, store: &mut ImageStore) -> Result<StrokeOutcome, FieldscopeError> {
        let state = std::mem::replace(&mut self.pointer, PointerState::Idle);
        let PointerState::Drawing(stroke) = state else {
            return Ok(StrokeOutcome::Discarded);
        };
        let Some(index) = self.active else {
            return Ok(StrokeOutcome::Discarded);
        };
        if !stroke.is_drawable() {
            debug!(index, points = stroke.points.len(), "Discarding degenerate stroke");
            return Ok(StrokeOutcome::Discarded);
        }

        store.push_stroke(index, stroke)?;
        let item = store.get(index).ok_or(FieldscopeError::IndexOutOfRange {
            index,
            len: store.len(),
        })?;
        let composite = raster::compose(item.original(), item.strokes());
        store.replace_working_bitmap(index, composite)?;
        debug!(index, "Committed stroke");
        Ok(StrokeOutcome::Committed)
    }

    /// Pointer leaving the canvas ends the drag the same way as
    /// pointer-up.
    pub fn pointer_leave(
        &mut self,
        store: &mut ImageStore,
    ) -> Result<StrokeOutcome, FieldscopeError> {
        self.pointer_up(store)
    }

    /// Full-resolution frame for display: original, committed strokes,
    /// then the in-progress stroke on top.
    pub fn preview(&self, store: &ImageStore) -> Result<RgbaImage, FieldscopeError> {
        let index = self.active.ok_or(FieldscopeError::EmptySession)?;
        let item = store.get(index).ok_or(FieldscopeError::IndexOutOfRange {
            index,
            len: store.len(),
        })?;
        let mut frame = raster::compose(item.original(), item.strokes());
        if let PointerState::Drawing(stroke) = &self.pointer {
            raster::draw_stroke(&mut frame, stroke);
        }
        Ok(frame)
    }
}

impl Default for CanvasEngine {
    fn default() -> Self {
        Self::new()
    }
}
