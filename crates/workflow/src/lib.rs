pub mod sequencer;
pub mod sweep;

pub use sequencer::{AnalysisPhase, Sequencer, Stage};
pub use sweep::{run_narrative, run_sweep, NarrativeOutcome, ReportTicket, SweepOutcome, SweepTicket};
