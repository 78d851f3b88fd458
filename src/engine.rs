//! Classification engine abstraction and implementations.
//!
//! Defines the [`ClassificationEngine`] trait and concrete implementations:
//! - **[`DisabledEngine`]**: returns errors; used when no engine is configured.
//! - **[`AnthropicEngine`]**: calls the Anthropic Messages API with the page
//!   attachments, with retry and backoff.
//!
//! An engine only transports: it returns the raw reply text, and all
//! validation happens in [`crate::parser`].
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 6s, 12s, 24s, 48s, then 60s (capped)

use anyhow::{bail, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::ClassifierConfig;
use crate::contract::SYSTEM_PROMPT;
use crate::models::{ClassificationRequest, MediaType, PageImage};

const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[async_trait]
pub trait ClassificationEngine: Send + Sync {
    /// Returns the engine/model identifier for logs.
    fn name(&self) -> &str;

    /// Submit one request and return the engine's raw reply text.
    async fn complete(&self, request: &ClassificationRequest) -> Result<String>;
}

// ============ Disabled Engine ============

/// An engine that refuses every request.
pub struct DisabledEngine;

#[async_trait]
impl ClassificationEngine for DisabledEngine {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _request: &ClassificationRequest) -> Result<String> {
        bail!("Classification engine is disabled (set [classifier].engine in the config)")
    }
}

// ============ Anthropic Engine ============

pub struct AnthropicEngine {
    api_key: String,
    model: String,
    max_tokens: u32,
    max_retries: u32,
    client: reqwest::Client,
}

impl AnthropicEngine {
    /// Create a new engine from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `model` is not set or `ANTHROPIC_API_KEY` is not
    /// in the environment.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("classifier.model required for Anthropic engine"))?;
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow::anyhow!("ANTHROPIC_API_KEY environment variable not set"))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            api_key,
            model,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            client,
        })
    }

    fn request_body(&self, request: &ClassificationRequest) -> Value {
        let mut content = vec![json!({
            "type": "text",
            "text": request.version.prompt(),
        })];
        content.extend(request.pages.iter().map(page_block));

        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": 0,
            "system": SYSTEM_PROMPT,
            "messages": [{ "role": "user", "content": content }],
        })
    }
}

#[async_trait]
impl ClassificationEngine for AnthropicEngine {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ClassificationRequest) -> Result<String> {
        let body = self.request_body(request);
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                tracing::info!(
                    "Retrying classification in {}s (attempt {})",
                    delay.as_secs(),
                    attempt + 1
                );
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(ANTHROPIC_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: Value = response.json().await?;
                        tracing::debug!("Engine response: {}", json);
                        return reply_text(&json);
                    }

                    // Rate limited or server error, retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        tracing::warn!("Anthropic API error {}: {}", status, body_text);
                        last_err = Some(anyhow::anyhow!(
                            "Anthropic API error {}: {}",
                            status,
                            body_text
                        ));
                        continue;
                    }

                    // Client error (not 429), no retry
                    let body_text = response.text().await.unwrap_or_default();
                    bail!("Anthropic API error {}: {}", status, body_text);
                }
                Err(e) => {
                    tracing::warn!("Anthropic request failed: {}", e);
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Classification failed after retries")))
    }
}

/// Delay before retry number `attempt` (1-based): 6s doubling, capped at 60s.
fn backoff_delay(attempt: u32) -> Duration {
    let secs = 6u64.saturating_mul(1 << (attempt - 1).min(5));
    Duration::from_secs(secs.min(60))
}

fn page_block(page: &PageImage) -> Value {
    let block_type = match page.media_type {
        MediaType::Pdf => "document",
        MediaType::Jpeg | MediaType::Png => "image",
    };
    json!({
        "type": block_type,
        "source": {
            "type": "base64",
            "media_type": page.media_type.as_str(),
            "data": BASE64.encode(&page.data),
        },
    })
}

/// Pull the first text block out of a Messages API response.
fn reply_text(json: &Value) -> Result<String> {
    json.get("content")
        .and_then(|c| c.as_array())
        .and_then(|blocks| {
            blocks
                .iter()
                .find(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
        })
        .and_then(|b| b.get("text"))
        .and_then(|t| t.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Invalid Anthropic response: no text content"))
}

/// Create the appropriate [`ClassificationEngine`] based on configuration.
///
/// | Config Value | Engine |
/// |-------------|--------|
/// | `"disabled"` | [`DisabledEngine`] |
/// | `"anthropic"` | [`AnthropicEngine`] |
pub fn create_engine(config: &ClassifierConfig) -> Result<Box<dyn ClassificationEngine>> {
    match config.engine.as_str() {
        "disabled" => Ok(Box::new(DisabledEngine)),
        "anthropic" => Ok(Box::new(AnthropicEngine::new(config)?)),
        other => bail!("Unknown classifier engine: {}", other),
    }
}
