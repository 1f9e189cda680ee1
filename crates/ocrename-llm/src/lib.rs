//! OCRename LLM Provider Layer
//!
//! Language-model providers used as the last-resort fallback of the
//! extraction pipeline.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` trait from
//! `ocrename-domain`. Providers return the raw model reply; turning that
//! reply into a record is the extractor's job.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic scripted provider for testing
//! - `OpenRouterProvider`: OpenRouter chat-completions API, text and vision
//!
//! # Examples
//!
//! ```
//! use ocrename_llm::MockProvider;
//! use ocrename_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new(r#"{"id_type": "CC", "id_number": "1", "acta_no": null}"#);
//! let reply = provider.complete("prompt").unwrap();
//! assert!(reply.contains("id_number"));
//! ```

#![warn(missing_docs)]

pub mod openrouter;
pub mod retry;

use ocrename_domain::traits::{LlmProvider as LlmProviderTrait, ProviderError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use openrouter::{OpenRouterConfig, OpenRouterProvider};
pub use retry::RetryPolicy;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The API rejected the credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider is missing an API key or model
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether another attempt may succeed
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            LlmError::Authentication(_) | LlmError::ModelNotAvailable(_) | LlmError::NotConfigured(_)
        )
    }
}

impl ProviderError for LlmError {
    fn is_authentication(&self) -> bool {
        matches!(self, LlmError::Authentication(_))
    }
}

/// Mock LLM provider for deterministic testing
///
/// Replies come from a script of queued results first and fall back to a
/// fixed reply once the script is exhausted. Text and vision calls are
/// counted separately.
///
/// # Examples
///
/// ```
/// use ocrename_llm::{LlmError, MockProvider};
/// use ocrename_domain::traits::LlmProvider;
///
/// let provider = MockProvider::new("fallback");
/// provider.push_error(LlmError::RateLimited);
/// provider.push_response("first");
///
/// assert!(provider.complete("p").is_err());
/// assert_eq!(provider.complete("p").unwrap(), "first");
/// assert_eq!(provider.complete("p").unwrap(), "fallback");
/// assert_eq!(provider.text_calls(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    script: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    text_calls: Arc<Mutex<usize>>,
    vision_calls: Arc<Mutex<usize>>,
    last_image_len: Arc<Mutex<Option<usize>>>,
    text_model: bool,
    vision_model: bool,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed reply for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            text_calls: Arc::new(Mutex::new(0)),
            vision_calls: Arc::new(Mutex::new(0)),
            last_image_len: Arc::new(Mutex::new(None)),
            text_model: true,
            vision_model: true,
        }
    }

    /// Queue a reply for the next call
    pub fn push_response(&self, response: impl Into<String>) {
        self.script.lock().unwrap().push_back(Ok(response.into()));
    }

    /// Queue an error for the next call
    pub fn push_error(&self, error: LlmError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Pretend no vision model is configured
    pub fn without_vision_model(mut self) -> Self {
        self.vision_model = false;
        self
    }

    /// Pretend no text model is configured
    pub fn without_text_model(mut self) -> Self {
        self.text_model = false;
        self
    }

    /// Number of text completions requested
    pub fn text_calls(&self) -> usize {
        *self.text_calls.lock().unwrap()
    }

    /// Number of vision completions requested
    pub fn vision_calls(&self) -> usize {
        *self.vision_calls.lock().unwrap()
    }

    /// Size of the last image sent to the vision model
    pub fn last_image_len(&self) -> Option<usize> {
        *self.last_image_len.lock().unwrap()
    }

    fn next_reply(&self) -> Result<String, LlmError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.default_response.clone()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn complete(&self, _prompt: &str) -> Result<String, Self::Error> {
        *self.text_calls.lock().unwrap() += 1;
        self.next_reply()
    }

    fn complete_with_image(&self, _prompt: &str, png: &[u8]) -> Result<String, Self::Error> {
        *self.vision_calls.lock().unwrap() += 1;
        *self.last_image_len.lock().unwrap() = Some(png.len());
        self.next_reply()
    }

    fn has_text_model(&self) -> bool {
        self.text_model
    }

    fn has_vision_model(&self) -> bool {
        self.vision_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        assert_eq!(provider.complete("any prompt").unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_script_order() {
        let provider = MockProvider::default();
        provider.push_response("one");
        provider.push_response("two");

        assert_eq!(provider.complete("a").unwrap(), "one");
        assert_eq!(provider.complete_with_image("b", &[1, 2, 3]).unwrap(), "two");
        assert_eq!(provider.complete("c").unwrap(), "Default mock response");
    }

    #[test]
    fn test_mock_provider_call_counts() {
        let provider = MockProvider::new("x");
        provider.complete("p").unwrap();
        provider.complete_with_image("p", &[0u8; 16]).unwrap();
        provider.complete_with_image("p", &[0u8; 4]).unwrap();

        assert_eq!(provider.text_calls(), 1);
        assert_eq!(provider.vision_calls(), 2);
        assert_eq!(provider.last_image_len(), Some(4));
    }

    #[test]
    fn test_mock_provider_error() {
        let provider = MockProvider::default();
        provider.push_error(LlmError::Authentication("bad key".to_string()));

        let err = provider.complete("p").unwrap_err();
        assert!(err.is_authentication());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.complete("test").unwrap();
        assert_eq!(provider2.text_calls(), 1);
    }

    #[test]
    fn test_model_flags() {
        let provider = MockProvider::default().without_vision_model();
        assert!(provider.has_text_model());
        assert!(!provider.has_vision_model());
    }

    #[test]
    fn test_error_classification() {
        assert!(LlmError::RateLimited.is_transient());
        assert!(LlmError::Timeout(10).is_transient());
        assert!(LlmError::Communication("reset".into()).is_transient());
        assert!(LlmError::Other("boom".into()).is_transient());
        assert!(!LlmError::NotConfigured("no key".into()).is_transient());
        assert!(!LlmError::RateLimited.is_authentication());
    }
}
