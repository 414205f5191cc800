//! OpenAI chat-completions client, the fallback for AI-assisted parsing.

use anyhow::Context;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use veridoc_core::extract::build_prompt;
use veridoc_core::models::config::ExtractionConfig;
use veridoc_core::DocumentClass;

const BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ReplyMessage>,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl OpenAiClient {
    /// Build on an existing HTTP client so both providers share one pool.
    pub fn new(client: Client, api_key: impl Into<String>, config: &ExtractionConfig) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
            api_key: api_key.into(),
            model: config.fallback_model.clone(),
            temperature: config.ai_temperature,
            max_tokens: config.fallback_max_tokens,
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Ask for the class's fields as a JSON object. Returns the raw reply.
    pub async fn parse_fields(&self, class: DocumentClass, text: &str) -> anyhow::Result<String> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user",
                content: build_prompt(class, text),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(model = %self.model, "sending request to OpenAI");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("OpenAI HTTP request failed")?;

        let status = response.status();
        let reply: ChatResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse OpenAI response ({})", status))?;

        if let Some(error) = reply.error {
            anyhow::bail!("OpenAI returned {}: {}", status, error.message);
        }
        if !status.is_success() {
            anyhow::bail!("OpenAI API failed with status {}", status);
        }

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("No generated text in OpenAI response"))
    }
}
