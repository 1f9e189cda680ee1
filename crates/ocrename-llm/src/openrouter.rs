//! OpenRouter Provider Implementation
//!
//! Chat-completions client for OpenRouter, used both with a text model
//! (document text in the prompt) and a vision model (first page attached as
//! a PNG data URL).
//!
//! # Features
//!
//! - Bearer-token authentication
//! - Separate text and vision models
//! - Per-request timeout and bounded retry with increasing backoff
//! - Replies without a JSON object are retried like transport failures
//! - Optional attribution headers (`HTTP-Referer`, `X-Title`)
//!
//! # Examples
//!
//! ```no_run
//! use ocrename_llm::{OpenRouterConfig, OpenRouterProvider};
//! use ocrename_domain::traits::LlmProvider;
//!
//! let provider = OpenRouterProvider::new("sk-or-...", OpenRouterConfig::default()).unwrap();
//! let reply = provider.complete("Devuelve un objeto JSON vacío").unwrap();
//! ```

use crate::retry::RetryPolicy;
use crate::LlmError;
use base64::{engine::general_purpose::STANDARD, Engine};
use ocrename_domain::traits::LlmProvider as LlmProviderTrait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default OpenRouter API endpoint
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default text model
pub const DEFAULT_TEXT_MODEL: &str = "deepseek/deepseek-r1:free";

/// Default vision model
pub const DEFAULT_VISION_MODEL: &str = "meta-llama/llama-3.2-11b-vision-instruct:free";

/// Site URL value that means "not configured"
pub const SITE_URL_PLACEHOLDER: &str = "YOUR_SITE_URL_HERE";

/// Settings of the OpenRouter client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRouterConfig {
    /// API base URL
    pub base_url: String,

    /// Model used for text queries (empty disables them)
    pub text_model: String,

    /// Model used for vision queries (empty disables them)
    pub vision_model: String,

    /// Timeout of a single request (seconds)
    pub timeout_secs: u64,

    /// Total attempts per query, including the first one
    pub max_attempts: u32,

    /// Base backoff after a transient failure (seconds)
    pub backoff_base_secs: u64,

    /// Base backoff after a rate-limit response (seconds)
    pub rate_limit_backoff_secs: u64,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens in the reply
    pub max_tokens: u32,

    /// Site URL sent as `HTTP-Referer`
    pub site_url: Option<String>,

    /// Site title sent as `X-Title`
    pub site_title: Option<String>,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            timeout_secs: 10,
            max_attempts: 2,
            backoff_base_secs: 3,
            rate_limit_backoff_secs: 10,
            temperature: 0.1,
            max_tokens: 350,
            site_url: None,
            site_title: None,
        }
    }
}

impl OpenRouterConfig {
    /// Retry policy described by this configuration
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: Duration::from_secs(self.backoff_base_secs),
            rate_limit_backoff: Duration::from_secs(self.rate_limit_backoff_secs),
        }
    }

    /// Attribution headers, when a real site URL is configured
    pub fn attribution(&self) -> Option<(&str, &str)> {
        let url = self.site_url.as_deref()?.trim();
        if url.is_empty() || url == SITE_URL_PLACEHOLDER {
            return None;
        }
        let title = self.site_title.as_deref().unwrap_or("OCRename");
        Some((url, title))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!("temperature {} out of range [0.0, 2.0]", self.temperature));
        }
        Ok(())
    }
}

/// OpenRouter API provider
///
/// The provider owns a single-threaded Tokio runtime so that the blocking
/// [`LlmProviderTrait`] methods can drive the async HTTP client. Call the
/// trait methods from synchronous code only.
pub struct OpenRouterProvider {
    api_key: String,
    config: OpenRouterConfig,
    client: reqwest::Client,
    retry: RetryPolicy,
    runtime: tokio::runtime::Runtime,
}

/// Request body for the chat-completions API
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

/// Either a plain prompt or a multi-part prompt with an image
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

/// Response from the chat-completions API
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenRouterProvider {
    /// Create a new OpenRouter provider
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` for an empty API key and `Other` when the
    /// HTTP client or runtime cannot be built.
    pub fn new(api_key: impl Into<String>, config: OpenRouterConfig) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::NotConfigured("OPENROUTER_API_KEY is empty".to_string()));
        }
        config.validate().map_err(LlmError::NotConfigured)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build runtime: {}", e)))?;

        info!(
            "OpenRouter client ready (text model: '{}', vision model: '{}')",
            config.text_model, config.vision_model
        );

        Ok(Self {
            api_key,
            retry: config.retry_policy(),
            config,
            client,
            runtime,
        })
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &OpenRouterConfig {
        &self.config
    }

    /// Ask the text model
    pub async fn ask_text(&self, prompt: &str) -> Result<String, LlmError> {
        let model = self.config.text_model.as_str();
        self.chat(model, MessageContent::Text(prompt.to_string())).await
    }

    /// Ask the vision model about a PNG image
    pub async fn ask_vision(&self, prompt: &str, png: &[u8]) -> Result<String, LlmError> {
        let model = self.config.vision_model.as_str();
        self.chat(model, vision_content(prompt, png)).await
    }

    async fn chat(&self, model: &str, content: MessageContent) -> Result<String, LlmError> {
        if model.trim().is_empty() {
            return Err(LlmError::NotConfigured("no model configured".to_string()));
        }

        let request = ChatRequest {
            model,
            messages: vec![ChatMessage { role: "user", content }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        let request = &request;
        let label = format!("openrouter:{}", model);

        info!("Sending request to model '{}'", model);
        self.retry.run(&label, |_| self.send_once(request)).await
    }

    async fn send_once(&self, request: &ChatRequest<'_>) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let mut builder = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request);
        if let Some((site_url, site_title)) = self.config.attribution() {
            builder = builder
                .header("HTTP-Referer", site_url)
                .header("X-Title", site_title);
        }

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let response = tokio::time::timeout(timeout, builder.send())
            .await
            .map_err(|_| LlmError::Timeout(self.config.timeout_secs))?
            .map_err(|e| map_transport_error(e, self.config.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_status(status.as_u16(), &body, request.model));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("Response has no choices".to_string()))?
            .message
            .content;

        let Some(text) = content else {
            warn!("Model '{}' returned a null message", request.model);
            return Err(LlmError::InvalidResponse("Reply has no content".to_string()));
        };
        debug!("Raw reply from '{}': {}", request.model, text);

        if !contains_json_object(&text) {
            return Err(LlmError::InvalidResponse(format!(
                "Reply holds no JSON object: {}",
                text.chars().take(120).collect::<String>()
            )));
        }
        Ok(text)
    }
}

impl LlmProviderTrait for OpenRouterProvider {
    type Error = LlmError;

    fn complete(&self, prompt: &str) -> Result<String, Self::Error> {
        self.runtime.block_on(self.ask_text(prompt))
    }

    fn complete_with_image(&self, prompt: &str, png: &[u8]) -> Result<String, Self::Error> {
        self.runtime.block_on(self.ask_vision(prompt, png))
    }

    fn has_text_model(&self) -> bool {
        !self.config.text_model.trim().is_empty()
    }

    fn has_vision_model(&self) -> bool {
        !self.config.vision_model.trim().is_empty()
    }
}

fn vision_content(prompt: &str, png: &[u8]) -> MessageContent {
    let data_url = format!("data:image/png;base64,{}", STANDARD.encode(png));
    MessageContent::Parts(vec![
        ContentPart::Text { text: prompt.to_string() },
        ContentPart::ImageUrl { image_url: ImageUrl { url: data_url } },
    ])
}

/// Whether `text` holds a JSON object somewhere, fenced or inline
fn contains_json_object(text: &str) -> bool {
    text.match_indices('{').any(|(index, _)| {
        let mut stream = serde_json::Deserializer::from_str(&text[index..]).into_iter::<serde_json::Value>();
        matches!(stream.next(), Some(Ok(serde_json::Value::Object(_))))
    })
}

/// Map a non-success HTTP status to an error
fn classify_status(status: u16, body: &str, model: &str) -> LlmError {
    match status {
        401 | 403 => LlmError::Authentication(format!("HTTP {}: {}", status, body)),
        404 => LlmError::ModelNotAvailable(model.to_string()),
        408 | 504 => LlmError::Communication(format!("HTTP {} (gateway timeout)", status)),
        429 => LlmError::RateLimited,
        500..=599 => LlmError::Communication(format!("HTTP {}: {}", status, body)),
        _ => LlmError::Other(format!("HTTP {}: {}", status, body)),
    }
}

fn map_transport_error(e: reqwest::Error, timeout_secs: u64) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout(timeout_secs)
    } else {
        LlmError::Communication(format!("Request failed: {}", e))
    }
}
