/*!
 * Mock translator for testing.
 *
 * This module provides a deterministic in-process translator that simulates
 * different provider behaviors without any network traffic:
 * - `MockProvider::working()` - Always succeeds with a tagged copy of the text
 * - `MockProvider::fail_first(n)` - Fails the first `n` calls, then succeeds
 * - `MockProvider::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::{ProviderError, TranslationError};
use crate::translation::core::TextTranslator;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails the first `count` calls, then succeeds
    FailFirst { count: usize },
    /// Always fails with an error
    Failing,
    /// Fails every call whose text contains the marker
    FailOnText { marker: String },
    /// Returns an empty response
    Empty,
    /// Succeeds after a delay
    Slow { delay_ms: u64 },
}

/// Mock translator for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of translate calls received
    request_count: AtomicUsize,
    /// Texts received, in call order
    seen: Mutex<Vec<String>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that fails its first `count` calls
    pub fn fail_first(count: usize) -> Self {
        Self::new(MockBehavior::FailFirst { count })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that fails on texts containing `marker`
    pub fn fail_on_text(marker: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailOnText { marker: marker.into() })
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that answers after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// The translation the working mock produces for `text`
    pub fn expected_translation(text: &str, target_language: &str) -> String {
        format!("[{}] {}", target_language, text)
    }

    /// Number of calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Texts received so far
    pub fn seen_texts(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl TextTranslator for MockProvider {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        let call = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.seen.lock().push(text.to_string());

        match &self.behavior {
            MockBehavior::Working => {}
            MockBehavior::FailFirst { count } => {
                if call <= *count {
                    return Err(ProviderError::RateLimitExceeded(format!("mock failure {}", call)).into());
                }
            }
            MockBehavior::Failing => {
                return Err(ProviderError::ConnectionError("mock provider is down".to_string()).into());
            }
            MockBehavior::FailOnText { marker } => {
                if text.contains(marker.as_str()) {
                    return Err(ProviderError::ApiError {
                        status_code: 400,
                        message: format!("mock rejected text containing {}", marker),
                    }
                    .into());
                }
            }
            MockBehavior::Empty => return Err(TranslationError::EmptyResponse),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
            }
        }

        Ok(Self::expected_translation(text, target_language))
    }
}
