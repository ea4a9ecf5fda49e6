/*!
 * Fixed-budget retry for fallible async operations.
 *
 * Retries are immediate: any pacing comes from whatever the retried
 * operation does itself (for provider calls, the rate limiter). After the
 * last attempt the final error is returned as is.
 */

use async_trait::async_trait;
use log::{debug, warn};
use std::fmt::Display;
use std::future::Future;

use crate::errors::TranslationError;

use super::core::TextTranslator;

/// Retry budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts: max_attempts.max(1) }
    }

    /// A policy that never retries
    pub fn no_retry() -> Self {
        Self::new(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(10)
    }
}

/// Run `operation` until it succeeds or the attempt budget is spent
pub async fn retry<T, E, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("Succeeded on attempt {}/{}", attempt, policy.max_attempts);
                }
                return Ok(value);
            }
            Err(e) if attempt < policy.max_attempts => {
                warn!("Attempt {}/{} failed: {}", attempt, policy.max_attempts, e);
                attempt += 1;
            }
            Err(e) => {
                warn!("Giving up after {} attempt(s): {}", attempt, e);
                return Err(e);
            }
        }
    }
}

/// Decorator that retries the wrapped translator
pub struct Retrying<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> Retrying<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }
}

#[async_trait]
impl<T: TextTranslator> TextTranslator for Retrying<T> {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        retry(self.policy, || self.inner.translate(text, target_language)).await
    }
}
