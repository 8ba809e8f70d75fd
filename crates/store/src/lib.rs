pub mod store;

pub use store::{ImageItem, ImageSource, ImageStore, IngestOutcome};
