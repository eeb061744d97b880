//! LLM client for the content studio.
//!
//! Every studio call to the Anthropic Messages API goes through `LlmClient`.
//! Rate limits and 5xx responses are retried with exponential backoff; other
//! failures are returned immediately.
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all content generation calls.
pub const MODEL: &str = "claude-sonnet-4-5";
/// Long-form categories run to ~1500 words plus JSON framing.
const MAX_TOKENS: u32 = 8192;
const TEMPERATURE: f32 = 0.7;
const MAX_ATTEMPTS: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<LlmError> },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM output hit the token limit and is incomplete")]
    Truncated,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Text of the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn is_truncated(&self) -> bool {
        self.stop_reason.as_deref() == Some("max_tokens")
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Delay before retry number `attempt` (1-based): 1s, 2s, 4s, ...
fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1 << attempt.saturating_sub(1).min(5))
}

/// Wraps the Anthropic Messages API with retry logic and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, api_key })
    }

    /// One round trip. `Err((retryable, error))` on failure.
    async fn send_once(&self, body: &MessagesRequest<'_>) -> Result<LlmResponse, (bool, LlmError)> {
        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| (e.is_timeout() || e.is_connect(), LlmError::Http(e)))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<LlmResponse>()
                .await
                .map_err(|e| (false, LlmError::Http(e)));
        }

        let raw = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorEnvelope>(&raw)
            .map(|e| e.error.message)
            .unwrap_or(raw);
        Err((
            is_retryable(status),
            LlmError::Api {
                status: status.as_u16(),
                message,
            },
        ))
    }

    /// Sends a single-turn request and returns the full response.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let body = MessagesRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let mut attempt = 1;
        loop {
            match self.send_once(&body).await {
                Ok(response) => {
                    debug!(
                        "LLM call succeeded on attempt {attempt}: input_tokens={}, output_tokens={}",
                        response.usage.input_tokens, response.usage.output_tokens
                    );
                    return Ok(response);
                }
                Err((true, err)) if attempt < MAX_ATTEMPTS => {
                    let delay = backoff(attempt);
                    warn!(
                        "LLM attempt {attempt}/{MAX_ATTEMPTS} failed ({err}); retrying in {}ms",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err((true, err)) => {
                    return Err(LlmError::Exhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    })
                }
                Err((false, err)) => return Err(err),
            }
        }
    }

    /// Calls the model and deserializes its text as JSON.
    /// The prompt must instruct the model to return a single JSON object.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let response = self.call(prompt, system).await?;
        if response.is_truncated() {
            return Err(LlmError::Truncated);
        }
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        Ok(serde_json::from_str(extract_json(text))?)
    }
}

/// The JSON object inside model output: code fences and any prose around the
/// outermost braces are dropped.
fn extract_json(text: &str) -> &str {
    let text = text.trim();
    let unfenced = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .map(|rest| rest.trim_end().trim_end_matches("```").trim())
        .unwrap_or(text);

    match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => &unfenced[start..=end],
        _ => unfenced,
    }
}
