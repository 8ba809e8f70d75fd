//! The Image Store owns every uploaded photograph for the session:
//! the immutable original, the working (annotated) copy actually sent
//! for assessment, the free-text note, and the committed strokes.
//!
//! Items are append-only and identified by position.

use image::RgbaImage;
use tracing::{debug, warn};

use fieldscope_core::{FieldscopeError, Stroke};

/// One uploaded photograph plus its annotation state.
#[derive(Debug, Clone)]
pub struct ImageItem {
    name: String,
    original: RgbaImage,
    working: RgbaImage,
    description: String,
    strokes: Vec<Stroke>,
}

impl ImageItem {
    fn new(name: impl Into<String>, original: RgbaImage) -> Self {
        let working = original.clone();
        Self {
            name: name.into(),
            original,
            working,
            description: String::new(),
            strokes: Vec::new(),
        }
    }

    /// Source file name, for captions and logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bitmap exactly as uploaded. Never mutated.
    pub fn original(&self) -> &RgbaImage {
        &self.original
    }

    /// The bitmap submitted for assessment, with all committed strokes
    /// baked in.
    pub fn working(&self) -> &RgbaImage {
        &self.working
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Committed strokes in pointer-up order.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }
}

/// An undecoded upload: file name plus raw bytes.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImageSource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Per-batch ingest result. Files that fail to decode never enter the
/// store; they are reported here instead.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub added: usize,
    pub rejected: Vec<(String, FieldscopeError)>,
}

/// Ordered, append-only collection of image items. Sole owner of all
/// bitmaps for the session.
#[derive(Debug, Default)]
pub struct ImageStore {
    items: Vec<ImageItem>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Decode and append new items, preserving the order of `sources`
    /// and appending after all existing items.
    pub fn ingest(&mut self, sources: Vec<ImageSource>) -> IngestOutcome {
        let mut outcome = IngestOutcome::default();
        for source in sources {
            match image::load_from_memory(&source.bytes) {
                Ok(decoded) => {
                    self.items.push(ImageItem::new(&source.name, decoded.to_rgba8()));
                    outcome.added += 1;
                }
                Err(e) => {
                    warn!(file = %source.name, error = %e, "Rejecting undecodable upload");
                    outcome.rejected.push((
                        source.name.clone(),
                        FieldscopeError::DecodeFailed {
                            name: source.name,
                            reason: e.to_string(),
                        },
                    ));
                }
            }
        }
        debug!(
            added = outcome.added,
            rejected = outcome.rejected.len(),
            total = self.items.len(),
            "Ingest batch complete"
        );
        outcome
    }

    /// Append an already-decoded bitmap. Used by callers that produce
    /// bitmaps in memory rather than from files.
    pub fn add_decoded(&mut self, name: impl Into<String>, bitmap: RgbaImage) -> usize {
        self.items.push(ImageItem::new(name, bitmap));
        self.items.len() - 1
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageItem> {
        self.items.iter()
    }

    fn item_mut(&mut self, index: usize) -> Result<&mut ImageItem, FieldscopeError> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(FieldscopeError::IndexOutOfRange { index, len })
    }

    /// Replace the free-text note of the item at `index`.
    pub fn update_description(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), FieldscopeError> {
        self.item_mut(index)?.description = text.into();
        Ok(())
    }

    /// Swap in a freshly rasterized working bitmap. The original is
    /// untouched.
    pub fn replace_working_bitmap(
        &mut self,
        index: usize,
        bitmap: RgbaImage,
    ) -> Result<(), FieldscopeError> {
        self.item_mut(index)?.working = bitmap;
        Ok(())
    }

    /// Append a committed stroke to the item at `index`.
    pub fn push_stroke(&mut self, index: usize, stroke: Stroke) -> Result<(), FieldscopeError> {
        self.item_mut(index)?.strokes.push(stroke);
        Ok(())
    }

    /// Drop every item. Used on session reset.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
