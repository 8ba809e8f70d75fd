use anyhow::Result;
use async_trait::async_trait;
use image::RgbaImage;

use crate::types::{AssessmentResult, ReportText};

/// Remote service that grades the condition of one component image.
///
/// One call per image; calls are independent and may run concurrently.
#[async_trait]
pub trait ComponentAssessor: Send + Sync {
    /// Service name used in logs and error messages.
    fn name(&self) -> &str;

    /// Assess a (possibly annotated) bitmap with its free-text note.
    async fn assess(&self, image: &RgbaImage, description: &str) -> Result<AssessmentResult>;
}

/// Remote service that writes the report introduction and summary from
/// the full result set plus the site address.
#[async_trait]
pub trait NarrativeWriter: Send + Sync {
    fn name(&self) -> &str;

    async fn compose(&self, address: &str, components: &[AssessmentResult]) -> Result<ReportText>;
}

/// Injected address-completion capability. Initialized once per session
/// and torn down on session reset, so the sequencer never depends on a
/// concrete widget or geocoding client.
#[async_trait]
pub trait AddressSuggester: Send + Sync {
    async fn suggest(&self, partial: &str) -> Result<String>;
}
