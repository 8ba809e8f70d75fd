pub mod encode;
pub mod mock;
pub mod openai;
pub mod prompts;

pub use mock::{MockAssessor, MockWriter, StaticSuggester};
pub use openai::OpenAiGateway;
