use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Model-size hint for a derivation: fast/cheap vs slower/higher-quality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Fast,
    Quality,
}

/// Configuration for the text-generation client.
///
/// Model identifiers are injected per tier rather than hard-coded at
/// the call sites, so derivations are testable against stub models.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model used for Fast-tier derivations
    pub fast_model: String,
    /// Model used for Quality-tier derivations
    pub quality_model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
    /// Per-call timeout; on expiry the derivation falls back locally
    pub timeout: Duration,
}

impl GenerationConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY environment variable not set")?;

        Ok(Self {
            api_key,
            fast_model: "claude-3-5-haiku-20241022".to_string(),
            quality_model: "claude-sonnet-4-20250514".to_string(),
            temperature: 0.3,
            max_tokens: 1024,
            timeout: Duration::from_secs(20),
        })
    }

    fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.fast_model,
            ModelTier::Quality => &self.quality_model,
        }
    }
}

/// A text-generation service: prompt in, free-form text out.
///
/// The text is expected (not guaranteed) to contain one JSON payload;
/// callers run lenient extraction and fall back on failure.
pub trait TextGenerator {
    fn generate(
        &self,
        tier: ModelTier,
        system: &str,
        user: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Anthropic messages-API client
pub struct AnthropicClient {
    client: Client,
    config: GenerationConfig,
}

impl AnthropicClient {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

impl TextGenerator for AnthropicClient {
    async fn generate(&self, tier: ModelTier, system: &str, user: &str) -> Result<String> {
        let request = MessagesRequest {
            model: self.config.model_for(tier).to_string(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(system.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API error: {} - {}", status, body);
        }

        let response: MessagesResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic API response")?;

        // Extract text from the first text content block
        response
            .content
            .iter()
            .find(|c| c.content_type == "text")
            .map(|c| c.text.clone())
            .context("No text content in response")
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}
