//! The assessment sweep and the narrative call.
//!
//! Both remote operations are split into issue and apply halves: the
//! sequencer hands out a ticket tagged with the session generation and
//! owning clones of everything the call needs, the call runs without
//! borrowing the sequencer, and the outcome carries the tag back so an
//! answer from a reset session can be recognized and dropped.

use futures::future::try_join_all;
use image::RgbaImage;
use tracing::{info, warn};

use fieldscope_core::{
    AssessmentResult, ComponentAssessor, FieldscopeError, NarrativeWriter, ReportText,
};

/// Inputs for one assessment sweep: a (working bitmap, description)
/// pair per image item, in upload order.
#[derive(Debug)]
pub struct SweepTicket {
    pub(crate) generation: u64,
    pub(crate) inputs: Vec<(RgbaImage, String)>,
}

/// Result of a sweep, still tagged with the generation it was issued
/// under. All-or-nothing: one failed call fails the whole sweep.
#[derive(Debug)]
pub struct SweepOutcome {
    pub(crate) generation: u64,
    pub(crate) result: Result<Vec<AssessmentResult>, FieldscopeError>,
}

/// Issue every assessment call concurrently and wait for all of them.
/// The first rejection aborts the sweep; no partial results survive.
pub async fn run_sweep(assessor: &dyn ComponentAssessor, ticket: &SweepTicket) -> SweepOutcome {
    info!(images = ticket.inputs.len(), service = assessor.name(), "Starting assessment sweep");

    let calls = ticket
        .inputs
        .iter()
        .map(|(image, description)| assessor.assess(image, description));

    let result = match try_join_all(calls).await {
        Ok(results) => {
            info!(results = results.len(), "Sweep complete");
            Ok(results)
        }
        Err(e) => {
            warn!(error = %e, "Sweep aborted");
            Err(FieldscopeError::GatewayError {
                service: assessor.name().to_string(),
                message: e.to_string(),
            })
        }
    };

    SweepOutcome {
        generation: ticket.generation,
        result,
    }
}

/// Inputs for the narrative call: address plus the full result set.
#[derive(Debug)]
pub struct ReportTicket {
    pub(crate) generation: u64,
    pub(crate) address: String,
    pub(crate) components: Vec<AssessmentResult>,
}

#[derive(Debug)]
pub struct NarrativeOutcome {
    pub(crate) generation: u64,
    pub(crate) result: Result<ReportText, FieldscopeError>,
}

/// Request the report introduction and summary.
pub async fn run_narrative(writer: &dyn NarrativeWriter, ticket: &ReportTicket) -> NarrativeOutcome {
    info!(
        components = ticket.components.len(),
        service = writer.name(),
        "Requesting report narrative"
    );

    let result = writer
        .compose(&ticket.address, &ticket.components)
        .await
        .map_err(|e| {
            warn!(error = %e, "Narrative call failed");
            FieldscopeError::GatewayError {
                service: writer.name().to_string(),
                message: e.to_string(),
            }
        });

    NarrativeOutcome {
        generation: ticket.generation,
        result,
    }
}
