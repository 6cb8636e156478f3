//! Chat-completion client for drafting journeys.

use crate::config::GenerationConfig;
use crate::error::{Result, SyncError};
use crate::supabase::error_message;
use jf_core::generate::{GenerateError, GeneratedJourney, GenerationRequest, parse_response, system_prompt};
use serde::Deserialize;

/// Something that turns a journey description into a validated draft.
#[async_trait::async_trait]
pub trait JourneyGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedJourney>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone().unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub fn chat_body(&self, request: &GenerationRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt() },
                { "role": "user", "content": request.user_message() },
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }
}

/// The assistant text of a chat-completion response body.
pub fn completion_text(body: &str) -> Result<String> {
    let completion: ChatCompletion = serde_json::from_str(body)?;
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(SyncError::Generate(GenerateError::EmptyResponse))
}

/// Map a failed completion call to an error the user can act on.
fn remote_error(status: u16, body: &str) -> SyncError {
    let message = if status == 429 {
        "Too many requests. Please wait a moment and try again.".to_string()
    } else {
        error_message(body)
    };
    SyncError::Remote { status, message }
}

#[async_trait::async_trait]
impl JourneyGenerator for OpenAiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedJourney> {
        request.validate()?;
        log::info!("generating journey ({} mode) with {}", request.mode.as_str(), self.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.chat_body(request))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            log::error!("generation failed with {status}");
            return Err(remote_error(status.as_u16(), &body));
        }

        let text = completion_text(&body)?;
        let journey = parse_response(&text)?;
        log::info!(
            "generated {} steps, {} explicit connections",
            journey.steps.len(),
            journey.connections.len()
        );
        Ok(journey)
    }
}
