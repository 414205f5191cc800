//! Gemini client used for image text extraction and AI-assisted parsing.

use std::time::Duration;

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use veridoc_core::extract::build_prompt;
use veridoc_core::models::config::ExtractionConfig;
use veridoc_core::DocumentClass;

use crate::openai::OpenAiClient;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const IMAGE_TEXT_PROMPT: &str = "Extract all text from this document image. \
     Focus on identity information, numbers, dates, and addresses. \
     Return only the extracted text without any formatting or analysis.";

/// Minimal client for the `generateContent` endpoint. Field parsing falls
/// back to OpenAI when a backup key is configured.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    fallback: Option<OpenAiClient>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Inline { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, config: &ExtractionConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("veridoc-cli/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            api_key: api_key.into(),
            model: config.ai_model.clone(),
            temperature: config.ai_temperature,
            max_output_tokens: config.ai_max_output_tokens,
            fallback: None,
        })
    }

    /// Use OpenAI for field parsing when Gemini fails.
    pub fn with_fallback(mut self, backup_key: impl Into<String>, config: &ExtractionConfig) -> Self {
        self.fallback = Some(OpenAiClient::new(self.client.clone(), backup_key, config));
        self
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Read the text printed on a scanned document.
    pub async fn image_text(&self, bytes: &[u8], mime_type: &str) -> anyhow::Result<String> {
        let parts = vec![
            Part::Text {
                text: IMAGE_TEXT_PROMPT.to_string(),
            },
            Part::Inline {
                inline_data: InlineData {
                    mime_type: mime_type.to_string(),
                    data: STANDARD.encode(bytes),
                },
            },
        ];
        self.generate(parts).await
    }

    /// Ask for the class's fields as a JSON object. Returns the raw reply.
    pub async fn parse_fields(&self, class: DocumentClass, text: &str) -> anyhow::Result<String> {
        let parts = vec![Part::Text {
            text: build_prompt(class, text),
        }];
        let gemini_error = match self.generate(parts).await {
            Ok(reply) => return Ok(reply),
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            return Err(gemini_error);
        };
        warn!("Gemini parsing failed, trying OpenAI: {:#}", gemini_error);

        fallback.parse_fields(class, text).await.map_err(|openai_error| {
            anyhow::anyhow!("Gemini: {:#}. OpenAI: {:#}", gemini_error, openai_error)
        })
    }

    async fn generate(&self, parts: Vec<Part>) -> anyhow::Result<String> {
        let body = GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        debug!(model = %self.model, "sending request to Gemini");

        let response = self
            .client
            .post(format!(
                "{}/{}:generateContent?key={}",
                self.base_url, self.model, self.api_key
            ))
            .json(&body)
            .send()
            .await
            .context("Gemini HTTP request failed")?;

        let status = response.status();
        let reply: GenerateResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse Gemini response ({})", status))?;

        if let Some(error) = reply.error {
            anyhow::bail!("Gemini returned {}: {}", status, error.message);
        }
        if !status.is_success() {
            anyhow::bail!("Gemini API failed with status {}", status);
        }

        reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("No generated text in Gemini response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer one HTTP request with a canned JSON body.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}", addr)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&request);
            let Some(head_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let length = text[..head_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if request.len() >= head_end + 4 + length {
                return;
            }
        }
    }

    #[tokio::test]
    async fn test_parse_fields_falls_back_to_openai() {
        let gemini_url = serve_once(
            "429 Too Many Requests",
            r#"{"error":{"message":"quota exhausted"}}"#,
        )
        .await;
        let openai_url = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"content":"{\"panNumber\":\"ABCDE1234F\"}"}}]}"#,
        )
        .await;

        let config = ExtractionConfig::default();
        let mut client = GeminiClient::new("gemini-key", &config)
            .unwrap()
            .with_base_url(gemini_url)
            .with_fallback("openai-key", &config);
        client.fallback = client.fallback.map(|f| f.with_base_url(openai_url));

        let reply = client
            .parse_fields(DocumentClass::TaxCard, "ABCDE1234F")
            .await
            .unwrap();
        assert_eq!(reply, r#"{"panNumber":"ABCDE1234F"}"#);
    }

    #[tokio::test]
    async fn test_parse_fields_without_fallback_reports_gemini_error() {
        let gemini_url = serve_once(
            "500 Internal Server Error",
            r#"{"error":{"message":"backend unavailable"}}"#,
        )
        .await;

        let client = GeminiClient::new("gemini-key", &ExtractionConfig::default())
            .unwrap()
            .with_base_url(gemini_url);

        let error = client
            .parse_fields(DocumentClass::TaxCard, "ABCDE1234F")
            .await
            .unwrap_err();
        assert!(error.to_string().contains("backend unavailable"));
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: "read".to_string(),
                    },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: "image/png".to_string(),
                            data: "AAAA".to_string(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                max_output_tokens: 2048,
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "read");
        assert_eq!(
            json["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "image/png"
        );
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn test_reply_text_path() {
        let reply: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"name\":\"A\"}"}]}}]}"#,
        )
        .unwrap();
        let text = reply.candidates[0].content.as_ref().unwrap().parts[0]
            .text
            .as_deref();
        assert_eq!(text, Some("{\"name\":\"A\"}"));
    }
}
