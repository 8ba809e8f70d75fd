//! Annotation scripts: recorded pointer input replayed through the
//! canvas engine, so headless runs produce the same working bitmaps an
//! interactive session would.
//!
//! A script is a JSON array with one entry per image, in upload order:
//!
//! ```json
//! [
//!   {
//!     "description": "rusted flange",
//!     "display": [400.0, 300.0],
//!     "strokes": [[[10.0, 10.0], [40.0, 25.0], [80.0, 60.0]]]
//!   }
//! ]
//! ```
//!
//! `display` is the canvas size the strokes were recorded at; when
//! absent the strokes are taken as native image-pixel coordinates.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use fieldscope_annotate::{CanvasEngine, Viewport};
use fieldscope_core::Point;
use fieldscope_store::ImageStore;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ImageScript {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub display: Option<[f32; 2]>,
    #[serde(default)]
    pub strokes: Vec<Vec<[f32; 2]>>,
}

pub fn parse(json: &str) -> Result<Vec<ImageScript>> {
    serde_json::from_str(json).context("Failed to parse annotation script")
}

/// Replay a script against the store. Entries beyond the item count
/// are ignored with a warning from the caller's ingest summary.
pub fn apply(scripts: &[ImageScript], store: &mut ImageStore) -> Result<()> {
    let mut engine = CanvasEngine::new();

    for (index, script) in scripts.iter().enumerate().take(store.len()) {
        if let Some(description) = &script.description {
            store.update_description(index, description.clone())?;
        }
        if script.strokes.is_empty() {
            continue;
        }

        let Some(item) = store.get(index) else {
            break;
        };
        let viewport = match script.display {
            Some([w, h]) => Viewport::for_image(item.original(), w, h),
            None => Viewport::one_to_one(item.original()),
        };
        engine.activate(store, index, viewport)?;

        for polyline in &script.strokes {
            let mut points = polyline.iter().map(|&[x, y]| Point::new(x, y));
            let Some(first) = points.next() else {
                continue;
            };
            engine.pointer_down(first);
            for point in points {
                engine.pointer_move(point);
            }
            engine.pointer_up(store)?;
        }
        debug!(index, strokes = script.strokes.len(), "Replayed annotation script entry");
    }
    Ok(())
}
