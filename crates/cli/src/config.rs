/// Fieldscope runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI API key for the assessment and narrative calls
    pub openai_api_key: Option<String>,
    /// Model requested for both calls
    pub model: String,
    /// Override for the API base URL
    pub base_url: Option<String>,
    /// Log level
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            model: std::env::var("FIELDSCOPE_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            base_url: std::env::var("FIELDSCOPE_BASE_URL").ok(),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}
