pub mod engine;
pub mod raster;
pub mod viewport;

pub use engine::{CanvasEngine, StrokeOutcome};
pub use viewport::Viewport;
