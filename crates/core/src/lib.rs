pub mod error;
pub mod traits;
pub mod types;

pub use error::FieldscopeError;
pub use traits::{AddressSuggester, ComponentAssessor, NarrativeWriter};
pub use types::{
    AssessmentResult, ConditionGrade, Point, ReportText, Stroke, STROKE_COLOR, STROKE_WIDTH,
};
