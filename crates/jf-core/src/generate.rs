//! AI-drafted journeys: request shaping, response validation, and turning a
//! validated response into real steps and connections.
//!
//! The transport (an HTTP call to a chat-completion service) lives in
//! `jf-sync`; everything here is pure so that the wasm bridge can validate a
//! payload fetched by the host page with exactly the same rules.
//!
//! A response is applied all-or-nothing: [`parse_response`] either yields a
//! complete [`GeneratedJourney`] or an error, never a partial result.

use crate::id::StepId;
use crate::layout::grid_origins;
use crate::model::{Connection, Step, StepColor, StepType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("please enter a description of the customer journey")]
    EmptyPrompt,
    #[error("the generation service returned an empty response")]
    EmptyResponse,
    #[error("AI response was not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("AI response has no `steps` array")]
    MissingSteps,
    #[error("generation service error: {0}")]
    Service(String),
}

impl GenerateError {
    /// Whether asking again can reasonably succeed. Everything except a
    /// missing prompt is a transient or model-side failure.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GenerateError::EmptyPrompt)
    }
}

// ─── Request ─────────────────────────────────────────────────────────────

/// Extra context supplied in advanced mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvancedContext {
    pub persona: String,
    pub scenario: String,
    pub goals: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationMode {
    Basic,
    Advanced(AdvancedContext),
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Basic => "basic",
            GenerationMode::Advanced(_) => "advanced",
        }
    }
}

/// A free-text journey description plus mode.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub mode: GenerationMode,
}

/// Body posted to a generation route: `{prompt, mode, persona?, scenario?, goals?}`.
#[derive(Debug, Serialize)]
struct RequestBody<'a> {
    prompt: &'a str,
    mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    persona: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    goals: Option<&'a str>,
}

impl GenerationRequest {
    pub fn basic(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            mode: GenerationMode::Basic,
        }
    }

    pub fn advanced(prompt: impl Into<String>, context: AdvancedContext) -> Self {
        Self {
            prompt: prompt.into(),
            mode: GenerationMode::Advanced(context),
        }
    }

    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.prompt.trim().is_empty() {
            return Err(GenerateError::EmptyPrompt);
        }
        Ok(())
    }

    /// The user turn sent to the model.
    pub fn user_message(&self) -> String {
        let mut message = self.prompt.trim().to_string();
        if let GenerationMode::Advanced(ctx) = &self.mode {
            for (label, value) in [
                ("Persona", &ctx.persona),
                ("Scenario", &ctx.scenario),
                ("Goals", &ctx.goals),
            ] {
                let value = value.trim();
                if !value.is_empty() {
                    message.push_str(&format!("\n\n{label}: {value}"));
                }
            }
        }
        message
    }

    /// JSON body for a host-side generation route.
    pub fn to_json(&self) -> serde_json::Value {
        let (persona, scenario, goals) = match &self.mode {
            GenerationMode::Basic => (None, None, None),
            GenerationMode::Advanced(ctx) => (
                Some(ctx.persona.as_str()),
                Some(ctx.scenario.as_str()),
                Some(ctx.goals.as_str()),
            ),
        };
        let body = RequestBody {
            prompt: &self.prompt,
            mode: self.mode.as_str(),
            persona,
            scenario,
            goals,
        };
        serde_json::to_value(body).unwrap_or(serde_json::Value::Null)
    }
}

fn category_guideline(t: StepType) -> &'static str {
    match t {
        StepType::Action => {
            "Customer performs an action or task (clicking buttons, filling forms, making purchases)"
        }
        StepType::Decision => "Customer makes a choice that impacts the journey path",
        StepType::Wait => "Waiting period or delay in the process",
        StepType::Email => "Email communication sent or received",
        StepType::Sms => "SMS/text message sent or received",
        StepType::Webhook => "Automated system-to-system notification or integration",
        StepType::Feedback => "Customer expresses feelings, ratings, or reviews",
        StepType::Discovery => "Customer discovers or learns about something new",
        StepType::Support => "Customer service or self-service interactions",
        StepType::Milestone => "Significant achievement or desired outcome",
        StepType::Internal => "Backend or internal process that influences the experience",
    }
}

/// System prompt describing the response contract and the category catalogue.
pub fn system_prompt() -> String {
    let mut prompt = String::from(
        "You are an expert customer journey mapper. Based on the user's description, \
generate a detailed customer journey map with properly categorized steps.\n\n\
Return ONLY a valid JSON object (no markdown, no commentary) with this structure:\n\
{\n  \"journeyTitle\": \"Optional overall title\",\n  \"steps\": [\n    \
{ \"tempId\": \"s1\", \"title\": \"Step Title\", \"description\": \"Short description.\", \
\"stepType\": \"action\", \"stepColor\": \"#10b981\" }\n  ],\n  \"connections\": [\n    \
{ \"fromTempId\": \"s1\", \"toTempId\": \"s2\" }\n  ]\n}\n\n\
Step types (use the exact tag and HEX color):\n",
    );
    for t in StepType::ALL {
        prompt.push_str(&format!(
            "- \"{}\": {} [{} {}]\n",
            t.id(),
            category_guideline(t),
            t.icon(),
            t.color()
        ));
    }
    prompt.push_str(
        "\nGuidelines:\n\
- Each step title should be 2-4 words\n\
- Each description should be 1-2 short sentences\n\
- Always include both stepType and stepColor for each step\n\
- Connections are optional; without them steps are connected sequentially\n\
- If no suitable journey can be generated, return an empty steps array.",
    );
    prompt
}

// ─── Response ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedStep {
    #[serde(default)]
    pub temp_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub step_type: Option<String>,
    #[serde(default)]
    pub step_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedConnection {
    pub from_temp_id: String,
    pub to_temp_id: String,
}

/// A validated generation response. Identifiers are still the model's
/// temporary per-response ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedJourney {
    #[serde(default)]
    pub journey_title: Option<String>,
    pub steps: Vec<GeneratedStep>,
    #[serde(default)]
    pub connections: Vec<GeneratedConnection>,
}

/// Remove surrounding Markdown code fences (```` ```json ... ``` ````).
pub fn strip_code_fences(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        s = rest.strip_prefix("json").unwrap_or(rest);
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Validate raw model (or route) output into a [`GeneratedJourney`].
pub fn parse_response(text: &str) -> Result<GeneratedJourney, GenerateError> {
    let cleaned = strip_code_fences(text);
    if cleaned.is_empty() {
        return Err(GenerateError::EmptyResponse);
    }
    let value: serde_json::Value = serde_json::from_str(cleaned)?;
    if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
        return Err(GenerateError::Service(message.to_string()));
    }
    if !value.get("steps").is_some_and(|s| s.is_array()) {
        log::warn!("generation response without steps array: {cleaned}");
        return Err(GenerateError::MissingSteps);
    }
    Ok(serde_json::from_value(value)?)
}

impl GeneratedJourney {
    /// Materialize the journey: fresh step ids, grid placement around
    /// `view_center`, categories and colors copied verbatim.
    ///
    /// Connections: every consecutive pair `step[i] → step[i+1]`, followed by
    /// the response's explicit connections whose temp ids resolve and which
    /// don't repeat an already-created pair in either direction.
    pub fn instantiate(&self, view_center: (f64, f64)) -> (Vec<Step>, Vec<Connection>) {
        let origins = grid_origins(self.steps.len(), view_center);
        let mut temp_ids: HashMap<&str, StepId> = HashMap::new();

        let steps: Vec<Step> = self
            .steps
            .iter()
            .zip(origins)
            .map(|(generated, (x, y))| {
                let id = StepId::generate();
                if let Some(temp) = generated.temp_id.as_deref() {
                    temp_ids.insert(temp, id);
                }
                let step_type = StepType::from_id_lossy(generated.step_type.as_deref());
                let step_color = generated
                    .step_color
                    .as_deref()
                    .map(StepColor::from)
                    .unwrap_or_else(|| StepColor::from(step_type.color()));
                let mut step = Step::new(id, x, y);
                step.title = generated.title.clone();
                step.description = generated.description.clone();
                step.step_type = step_type;
                step.step_color = step_color;
                step
            })
            .collect();

        let mut connections: Vec<Connection> = steps
            .windows(2)
            .map(|pair| Connection::new(pair[0].id, pair[1].id))
            .collect();

        for explicit in &self.connections {
            let (Some(&from), Some(&to)) = (
                temp_ids.get(explicit.from_temp_id.as_str()),
                temp_ids.get(explicit.to_temp_id.as_str()),
            ) else {
                log::debug!(
                    "dropping generated connection {} -> {}: unresolved temp id",
                    explicit.from_temp_id,
                    explicit.to_temp_id
                );
                continue;
            };
            if from == to || connections.iter().any(|c| c.joins(from, to)) {
                continue;
            }
            connections.push(Connection::new(from, to));
        }

        (steps, connections)
    }
}
