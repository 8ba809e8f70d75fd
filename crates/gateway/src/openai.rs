//! OpenAI chat-completions client backing both remote services: the
//! per-image condition assessment and the report narrative. Both calls
//! use a strict JSON-schema response format, so the message content is
//! parsed straight into the typed result.

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::RgbaImage;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use fieldscope_core::{AssessmentResult, ComponentAssessor, NarrativeWriter, ReportText};

use crate::encode::png_data_uri;
use crate::prompts::{ASSESSMENT_PROMPT, REPORT_PROMPT};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";

pub struct OpenAiGateway {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiGateway {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn chat(&self, body: serde_json::Value) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("OpenAI HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI returned {}: {}", status, error_body);
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI response")?;
        message_content(chat)
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn message_content(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .context("OpenAI response contained no message content")
}

fn assessment_schema() -> serde_json::Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "condition_assessment",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "component_type": {
                        "type": "string",
                        "description": "The type of component being evaluated."
                    },
                    "condition_grade": {
                        "type": "string",
                        "description": "One of: 'Poor', 'Fair', 'Good'."
                    },
                    "condition_description": {
                        "type": "string",
                        "description": "A textual description of the component's condition."
                    },
                    "maintenance_recommendations": {
                        "type": "string",
                        "description": "Maintenance recommendations for the component."
                    }
                },
                "required": [
                    "component_type",
                    "condition_grade",
                    "condition_description",
                    "maintenance_recommendations"
                ],
                "additionalProperties": false
            }
        }
    })
}

fn report_schema() -> serde_json::Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "report_narrative",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "introduction": {
                        "type": "string",
                        "description": "Introductory paragraph for the report."
                    },
                    "summary": {
                        "type": "string",
                        "description": "Concluding summary paragraph."
                    }
                },
                "required": ["introduction", "summary"],
                "additionalProperties": false
            }
        }
    })
}

#[async_trait]
impl ComponentAssessor for OpenAiGateway {
    fn name(&self) -> &str {
        "openai-assessment"
    }

    async fn assess(&self, image: &RgbaImage, description: &str) -> Result<AssessmentResult> {
        let image_url = png_data_uri(image)?;

        let mut user_content = vec![json!({
            "type": "image_url",
            "image_url": { "url": image_url }
        })];
        if !description.is_empty() {
            user_content.push(json!({
                "type": "text",
                "text": format!("Inspector note: {}", description)
            }));
        }

        debug!(
            model = %self.model,
            width = image.width(),
            height = image.height(),
            "Requesting condition assessment"
        );

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "developer", "content": [{ "type": "text", "text": ASSESSMENT_PROMPT }] },
                { "role": "user", "content": user_content }
            ],
            "response_format": assessment_schema(),
            "temperature": 0.0
        });

        let content = self.chat(body).await?;
        serde_json::from_str(&content).context("Assessment response was not valid JSON")
    }
}

#[async_trait]
impl NarrativeWriter for OpenAiGateway {
    fn name(&self) -> &str {
        "openai-report"
    }

    async fn compose(&self, address: &str, components: &[AssessmentResult]) -> Result<ReportText> {
        let components_json =
            serde_json::to_string(components).context("Failed to serialize results")?;

        debug!(
            model = %self.model,
            components = components.len(),
            "Requesting report narrative"
        );

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "developer", "content": [{ "type": "text", "text": REPORT_PROMPT }] },
                { "role": "user", "content": [{
                    "type": "text",
                    "text": format!("Address: {}\n\nComponents: {}", address, components_json)
                }] }
            ],
            "response_format": report_schema()
        });

        let content = self.chat(body).await?;
        serde_json::from_str(&content).context("Narrative response was not valid JSON")
    }
}
