//! The workflow sequencer: Upload → Annotating → Analyzing → Report,
//! with the transient GeneratingReport sub-state. Owns the image store,
//! the collected results and the generated narrative, and guards every
//! remote outcome with a session generation so answers that arrive
//! after a reset are dropped instead of being applied to an unrelated
//! session.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use fieldscope_core::{
    AddressSuggester, AssessmentResult, ComponentAssessor, FieldscopeError, NarrativeWriter,
    ReportText,
};
use fieldscope_store::{ImageSource, ImageStore, IngestOutcome};

use crate::sweep::{
    run_narrative, run_sweep, NarrativeOutcome, ReportTicket, SweepOutcome, SweepTicket,
};

/// Visual sub-state of the Analyzing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    /// Sweep issued, nothing to show yet. Navigation is disabled.
    InFlight,
    /// The whole sweep resolved; results are on screen.
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Upload,
    Annotating,
    Analyzing(AnalysisPhase),
    GeneratingReport,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Upload => write!(f, "upload"),
            Stage::Annotating => write!(f, "annotating"),
            Stage::Analyzing(AnalysisPhase::InFlight) => write!(f, "analyzing (in flight)"),
            Stage::Analyzing(AnalysisPhase::Ready) => write!(f, "analyzing (results ready)"),
            Stage::GeneratingReport => write!(f, "generating report"),
            Stage::Report => write!(f, "report"),
        }
    }
}

pub struct Sequencer {
    session_id: Uuid,
    generation: u64,
    stage: Stage,
    cursor: usize,
    selected: usize,
    store: ImageStore,
    results: Vec<AssessmentResult>,
    report: Option<ReportText>,
    suggester: Option<Arc<dyn AddressSuggester>>,
}

impl Sequencer {
    pub fn new() -> Self {
        let session_id = Uuid::new_v4();
        info!(session = %session_id, "New inspection session");
        Self {
            session_id,
            generation: 0,
            stage: Stage::Upload,
            cursor: 0,
            selected: 0,
            store: ImageStore::new(),
            results: Vec::new(),
            report: None,
            suggester: None,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// Mutable store access for the annotation canvas and description
    /// editing. Gateways and the report compiler only ever read.
    pub fn store_mut(&mut self) -> &mut ImageStore {
        &mut self.store
    }

    pub fn results(&self) -> &[AssessmentResult] {
        &self.results
    }

    pub fn report(&self) -> Option<&ReportText> {
        self.report.as_ref()
    }

    fn invalid(&self, action: &'static str) -> FieldscopeError {
        FieldscopeError::InvalidTransition {
            action,
            stage: self.stage.to_string(),
        }
    }

    // Upload / Annotating

    /// First file selection: decode, append, and move to Annotating
    /// with the cursor on the first image. Stays in Upload when nothing
    /// decodes.
    pub fn ingest(&mut self, sources: Vec<ImageSource>) -> Result<IngestOutcome, FieldscopeError> {
        if self.stage != Stage::Upload {
            return Err(self.invalid("ingest files"));
        }
        let outcome = self.store.ingest(sources);
        if outcome.added > 0 {
            self.cursor = 0;
            self.stage = Stage::Annotating;
            info!(images = self.store.len(), "Session entering annotation");
        }
        Ok(outcome)
    }

    /// Append more files mid-annotation without resetting the cursor.
    pub fn add_more(
        &mut self,
        sources: Vec<ImageSource>,
    ) -> Result<IngestOutcome, FieldscopeError> {
        if self.stage != Stage::Annotating {
            return Err(self.invalid("add more files"));
        }
        Ok(self.store.ingest(sources))
    }

    /// Index of the current annotation target.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the annotation cursor forward, clamped to the last item.
    pub fn next(&mut self) {
        if self.stage != Stage::Annotating {
            debug!(stage = %self.stage, "Ignoring navigation outside annotation");
            return;
        }
        if self.cursor + 1 < self.store.len() {
            self.cursor += 1;
        }
    }

    /// Move the annotation cursor back, clamped to the first item.
    pub fn previous(&mut self) {
        if self.stage != Stage::Annotating {
            debug!(stage = %self.stage, "Ignoring navigation outside annotation");
            return;
        }
        self.cursor = self.cursor.saturating_sub(1);
    }

    // Analyzing

    /// Leave Annotating and issue the sweep ticket: one (working
    /// bitmap, description) pair per item, tagged with the current
    /// generation.
    pub fn begin_analysis(&mut self) -> Result<SweepTicket, FieldscopeError> {
        if self.stage != Stage::Annotating {
            return Err(self.invalid("begin analysis"));
        }
        if self.store.is_empty() {
            return Err(FieldscopeError::EmptySession);
        }
        self.stage = Stage::Analyzing(AnalysisPhase::InFlight);
        Ok(SweepTicket {
            generation: self.generation,
            inputs: self
                .store
                .iter()
                .map(|item| (item.working().clone(), item.description().to_string()))
                .collect(),
        })
    }

    /// Apply a sweep outcome. Outcomes from a reset session are dropped
    /// silently; a failed sweep returns the session to Annotating so
    /// the user can retry.
    pub fn complete_analysis(&mut self, outcome: SweepOutcome) -> Result<(), FieldscopeError> {
        if outcome.generation != self.generation {
            debug!(
                got = outcome.generation,
                current = self.generation,
                "Dropping sweep outcome from a reset session"
            );
            return Ok(());
        }
        if self.stage != Stage::Analyzing(AnalysisPhase::InFlight) {
            return Err(self.invalid("complete analysis"));
        }
        match outcome.result {
            Ok(results) => {
                self.results = results;
                self.selected = 0;
                self.stage = Stage::Analyzing(AnalysisPhase::Ready);
                Ok(())
            }
            Err(e) => {
                self.results.clear();
                self.stage = Stage::Annotating;
                Err(e)
            }
        }
    }

    /// Issue-and-apply convenience for callers that hold the sequencer
    /// across the await.
    pub async fn analyze(
        &mut self,
        assessor: &dyn ComponentAssessor,
    ) -> Result<(), FieldscopeError> {
        let ticket = self.begin_analysis()?;
        let outcome = run_sweep(assessor, &ticket).await;
        self.complete_analysis(outcome)
    }

    /// Image selected on the result-review screen.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Select a result to review, clamped to the result count.
    pub fn select_result(&mut self, index: usize) {
        if self.stage != Stage::Analyzing(AnalysisPhase::Ready) {
            debug!(stage = %self.stage, "Ignoring result selection outside review");
            return;
        }
        self.selected = index.min(self.results.len().saturating_sub(1));
    }

    // Report

    /// Leave result review and issue the narrative ticket.
    pub fn begin_report(&mut self, address: &str) -> Result<ReportTicket, FieldscopeError> {
        if self.stage != Stage::Analyzing(AnalysisPhase::Ready) {
            return Err(self.invalid("generate report"));
        }
        self.stage = Stage::GeneratingReport;
        Ok(ReportTicket {
            generation: self.generation,
            address: address.to_string(),
            components: self.results.clone(),
        })
    }

    /// Apply the narrative outcome. Failure returns to result review
    /// rather than hanging in the transient state.
    pub fn complete_report(&mut self, outcome: NarrativeOutcome) -> Result<(), FieldscopeError> {
        if outcome.generation != self.generation {
            debug!(
                got = outcome.generation,
                current = self.generation,
                "Dropping narrative outcome from a reset session"
            );
            return Ok(());
        }
        if self.stage != Stage::GeneratingReport {
            return Err(self.invalid("complete report"));
        }
        match outcome.result {
            Ok(text) => {
                self.report = Some(text);
                self.stage = Stage::Report;
                Ok(())
            }
            Err(e) => {
                self.stage = Stage::Analyzing(AnalysisPhase::Ready);
                Err(e)
            }
        }
    }

    pub async fn generate_report(
        &mut self,
        writer: &dyn NarrativeWriter,
        address: &str,
    ) -> Result<(), FieldscopeError> {
        let ticket = self.begin_report(address)?;
        let outcome = run_narrative(writer, &ticket).await;
        self.complete_report(outcome)
    }

    /// "Back" from the rendered report to result review. The narrative
    /// is discarded so a later failed regeneration cannot expose it.
    pub fn back(&mut self) -> Result<(), FieldscopeError> {
        if self.stage != Stage::Report {
            return Err(self.invalid("go back"));
        }
        self.report = None;
        self.stage = Stage::Analyzing(AnalysisPhase::Ready);
        Ok(())
    }

    /// "New Analysis": discard everything and return to Upload. Bumps
    /// the generation so in-flight outcomes from this session are
    /// dropped when they land.
    pub fn reset(&mut self) {
        info!(session = %self.session_id, "Resetting session");
        self.generation += 1;
        self.stage = Stage::Upload;
        self.cursor = 0;
        self.selected = 0;
        self.store.clear();
        self.results.clear();
        self.report = None;
        self.suggester = None;
    }

    // Address suggestion

    /// Install the per-session address-completion capability.
    pub fn set_address_suggester(&mut self, suggester: Arc<dyn AddressSuggester>) {
        self.suggester = Some(suggester);
    }

    pub async fn suggest_address(&self, partial: &str) -> Result<String, FieldscopeError> {
        let suggester = self
            .suggester
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no address suggester configured"))?;
        Ok(suggester.suggest(partial).await?)
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldscope_gateway::{MockAssessor, MockWriter, StaticSuggester};
    use image::RgbaImage;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::new(width, height);
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        bytes
    }

    fn sequencer_with(count: usize) -> Sequencer {
        let mut seq = Sequencer::new();
        for i in 0..count {
            seq.store_mut()
                .add_decoded(format!("{i}.png"), RgbaImage::new(4 + i as u32, 4));
        }
        // Items seeded directly; enter Annotating the way ingest would.
        seq.stage = Stage::Annotating;
        seq
    }

    #[test]
    fn test_navigation_clamps_at_both_ends() {
        let mut seq = sequencer_with(3);
        seq.previous();
        assert_eq!(seq.cursor(), 0);

        seq.next();
        seq.next();
        assert_eq!(seq.cursor(), 2);
        seq.next();
        assert_eq!(seq.cursor(), 2);
    }

    #[test]
    fn test_add_more_keeps_cursor() {
        let mut seq = sequencer_with(2);
        seq.next();
        assert_eq!(seq.cursor(), 1);

        let outcome = seq
            .add_more(vec![ImageSource::new("more.png", png_bytes(8, 8))])
            .unwrap();
        assert_eq!(outcome.added, 1);
        assert_eq!(seq.cursor(), 1);
        assert_eq!(seq.store().len(), 3);

        // Undecodable batch: nothing added, cursor still untouched.
        let outcome = seq
            .add_more(vec![ImageSource::new("junk.bin", vec![0, 1, 2])])
            .unwrap();
        assert_eq!(outcome.added, 0);
        assert_eq!(seq.cursor(), 1);
        assert_eq!(seq.store().len(), 3);
    }

    #[tokio::test]
    async fn test_navigation_is_ignored_while_sweep_in_flight() {
        let mut seq = sequencer_with(3);
        seq.next();
        assert_eq!(seq.cursor(), 1);

        let ticket = seq.begin_analysis().unwrap();
        assert_eq!(seq.stage(), Stage::Analyzing(AnalysisPhase::InFlight));

        seq.next();
        seq.previous();
        assert_eq!(seq.cursor(), 1);

        let outcome = crate::sweep::run_sweep(&MockAssessor::new(), &ticket).await;
        seq.complete_analysis(outcome).unwrap();
        assert_eq!(seq.stage(), Stage::Analyzing(AnalysisPhase::Ready));
    }

    #[tokio::test]
    async fn test_sweep_success_moves_to_ready() {
        let mut seq = sequencer_with(2);
        let assessor = MockAssessor::new();
        seq.analyze(&assessor).await.unwrap();

        assert_eq!(seq.stage(), Stage::Analyzing(AnalysisPhase::Ready));
        assert_eq!(seq.results().len(), 2);
        assert_eq!(seq.results()[0].component_type, "4x4 component");
        assert_eq!(seq.results()[1].component_type, "5x4 component");
    }

    #[tokio::test]
    async fn test_sweep_failure_is_all_or_nothing_and_retryable() {
        let mut seq = sequencer_with(3);
        seq.store_mut().update_description(1, "broken pipe").unwrap();

        let assessor = MockAssessor::new().failing_on("broken");
        let err = seq.analyze(&assessor).await.unwrap_err();
        assert!(matches!(err, FieldscopeError::GatewayError { .. }));

        // No partial results, and the session is back in a retryable stage.
        assert!(seq.results().is_empty());
        assert_eq!(seq.stage(), Stage::Annotating);

        // Retry succeeds after the note is fixed.
        seq.store_mut().update_description(1, "pipe").unwrap();
        seq.analyze(&assessor).await.unwrap();
        assert_eq!(seq.results().len(), 3);
    }

    #[tokio::test]
    async fn test_stale_sweep_outcome_is_dropped() {
        let mut seq = sequencer_with(1);
        let assessor = MockAssessor::new();

        let ticket = seq.begin_analysis().unwrap();
        let outcome = crate::sweep::run_sweep(&assessor, &ticket).await;

        // User resets while the sweep is in flight.
        seq.reset();
        seq.complete_analysis(outcome).unwrap();

        assert_eq!(seq.stage(), Stage::Upload);
        assert!(seq.results().is_empty());
    }

    #[tokio::test]
    async fn test_report_failure_returns_to_review() {
        let mut seq = sequencer_with(1);
        seq.analyze(&MockAssessor::new()).await.unwrap();

        let err = seq
            .generate_report(&MockWriter::failing(), "123 Main Street")
            .await
            .unwrap_err();
        assert!(matches!(err, FieldscopeError::GatewayError { .. }));
        assert_eq!(seq.stage(), Stage::Analyzing(AnalysisPhase::Ready));
        assert!(seq.report().is_none());

        // Retry on the same results.
        seq.generate_report(&MockWriter::new(), "123 Main Street")
            .await
            .unwrap();
        assert_eq!(seq.stage(), Stage::Report);
        assert!(seq.report().unwrap().introduction.contains("123 Main Street"));
    }

    #[tokio::test]
    async fn test_stale_narrative_outcome_is_dropped() {
        let mut seq = sequencer_with(1);
        seq.analyze(&MockAssessor::new()).await.unwrap();

        let ticket = seq.begin_report("9 Dock Road").unwrap();
        let outcome = crate::sweep::run_narrative(&MockWriter::new(), &ticket).await;

        seq.reset();
        seq.complete_report(outcome).unwrap();
        assert_eq!(seq.stage(), Stage::Upload);
        assert!(seq.report().is_none());
    }

    #[tokio::test]
    async fn test_back_and_reset() {
        let mut seq = sequencer_with(1);
        seq.analyze(&MockAssessor::new()).await.unwrap();
        seq.generate_report(&MockWriter::new(), "1 Plant Way")
            .await
            .unwrap();

        seq.back().unwrap();
        assert_eq!(seq.stage(), Stage::Analyzing(AnalysisPhase::Ready));
        // The old narrative is gone; a failed regeneration must not
        // leave it reachable.
        assert!(seq.report().is_none());
        assert!(seq
            .generate_report(&MockWriter::failing(), "1 Plant Way")
            .await
            .is_err());
        assert!(seq.report().is_none());

        seq.reset();
        assert_eq!(seq.stage(), Stage::Upload);
        assert!(seq.store().is_empty());
        assert!(seq.results().is_empty());
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let mut seq = Sequencer::new();
        assert!(seq.begin_analysis().is_err());
        assert!(seq.begin_report("x").is_err());
        assert!(seq.back().is_err());
        assert!(seq.add_more(Vec::new()).is_err());
    }

    #[tokio::test]
    async fn test_address_suggester_lifecycle() {
        let mut seq = sequencer_with(1);
        assert!(seq.suggest_address("123").await.is_err());

        seq.set_address_suggester(Arc::new(StaticSuggester::new("123 Main Street")));
        assert_eq!(seq.suggest_address("123").await.unwrap(), "123 Main Street");

        // Torn down on reset.
        seq.reset();
        assert!(seq.suggest_address("123").await.is_err());
    }
}
