//! Offline gateway implementations for tests and `--mock` runs.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use image::RgbaImage;

use fieldscope_core::{
    AddressSuggester, AssessmentResult, ComponentAssessor, ConditionGrade, NarrativeWriter,
    ReportText,
};

/// Deterministic assessor. The component type is derived from the bitmap
/// dimensions so callers can correlate results with inputs, and a call
/// fails when the description contains `fail_marker`.
pub struct MockAssessor {
    grade: ConditionGrade,
    fail_marker: Option<String>,
    calls: AtomicUsize,
}

impl MockAssessor {
    pub fn new() -> Self {
        Self {
            grade: ConditionGrade::Fair,
            fail_marker: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_grade(mut self, grade: ConditionGrade) -> Self {
        self.grade = grade;
        self
    }

    /// Fail any call whose description contains `marker`.
    pub fn failing_on(mut self, marker: impl Into<String>) -> Self {
        self.fail_marker = Some(marker.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockAssessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ComponentAssessor for MockAssessor {
    fn name(&self) -> &str {
        "mock-assessment"
    }

    async fn assess(&self, image: &RgbaImage, description: &str) -> Result<AssessmentResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(marker) = &self.fail_marker {
            if description.contains(marker) {
                anyhow::bail!("mock assessor failure on '{}'", description);
            }
        }
        Ok(AssessmentResult {
            component_type: format!("{}x{} component", image.width(), image.height()),
            condition_grade: self.grade,
            condition_description: if description.is_empty() {
                "No visible defects.".to_string()
            } else {
                format!("Inspector noted: {}.", description)
            },
            maintenance_recommendations: "Follow the regular maintenance schedule.".to_string(),
        })
    }
}

/// Canned narrative writer; fails on demand.
pub struct MockWriter {
    fail: bool,
}

impl MockWriter {
    pub fn new() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl Default for MockWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NarrativeWriter for MockWriter {
    fn name(&self) -> &str {
        "mock-report"
    }

    async fn compose(&self, address: &str, components: &[AssessmentResult]) -> Result<ReportText> {
        if self.fail {
            anyhow::bail!("mock narrative failure");
        }
        Ok(ReportText {
            introduction: format!(
                "The assessment for {} covers {} components.",
                address,
                components.len()
            ),
            summary: format!("Overall, the building at {} is in working order.", address),
        })
    }
}

/// Address suggester that completes every partial to a fixed address.
pub struct StaticSuggester {
    address: String,
}

impl StaticSuggester {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[async_trait]
impl AddressSuggester for StaticSuggester {
    async fn suggest(&self, _partial: &str) -> Result<String> {
        Ok(self.address.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_assessor_success_and_failure() {
        let assessor = MockAssessor::new().failing_on("broken");
        let img = RgbaImage::new(10, 20);

        let ok = assessor.assess(&img, "rusted flange").await.unwrap();
        assert_eq!(ok.component_type, "10x20 component");
        assert!(ok.condition_description.contains("rusted flange"));

        assert!(assessor.assess(&img, "broken valve").await.is_err());
        assert_eq!(assessor.calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_writer_mentions_address() {
        let writer = MockWriter::new();
        let text = writer.compose("123 Main Street", &[]).await.unwrap();
        assert!(text.introduction.contains("123 Main Street"));
        assert!(MockWriter::failing().compose("x", &[]).await.is_err());
    }
}
