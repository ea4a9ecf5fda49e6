/*!
 * Tests for the retry and rate limit decorators and their composition
 */

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::time::Instant;

use crate::common;
use crate::common::mock_providers::AlwaysRateLimited;
use dataset_translator::errors::{ProviderError, TranslationError};
use dataset_translator::providers::mock::MockProvider;
use dataset_translator::translation::{
    self, RateLimited, RateLimiter, RetryPolicy, Retrying, TextTranslator,
};

#[tokio::test]
async fn test_retrying_withNineFailuresAndBudgetTen_shouldSucceed() {
    common::init_logging();
    let mock = Arc::new(MockProvider::fail_first(9));
    let translator = Retrying::new(Arc::clone(&mock), RetryPolicy::new(10));

    let result = translator.translate("Hello", "fr").await;

    assert_eq!(result.unwrap(), MockProvider::expected_translation("Hello", "fr"));
    assert_eq!(mock.request_count(), 10);
}

#[tokio::test]
async fn test_retrying_withPersistentFailure_shouldStopAtBudgetAndKeepLastError() {
    let inner = Arc::new(AlwaysRateLimited::default());
    let translator = Retrying::new(Arc::clone(&inner), RetryPolicy::new(4));

    let result = translator.translate("Hello", "fr").await;

    assert_eq!(inner.attempts.load(Ordering::SeqCst), 4);
    match result {
        Err(TranslationError::Provider(ProviderError::RateLimitExceeded(message))) => {
            assert_eq!(message, "attempt 4");
        }
        other => panic!("Expected the last rate limit error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_retrying_withEmptyResponses_shouldRetryThem() {
    let mock = Arc::new(MockProvider::empty());
    let translator = Retrying::new(Arc::clone(&mock), RetryPolicy::new(3));

    let result = translator.translate("Hello", "fr").await;

    assert!(matches!(result, Err(TranslationError::EmptyResponse)));
    assert_eq!(mock.request_count(), 3);
}

#[tokio::test]
async fn test_retrying_withNoRetryPolicy_shouldCallOnce() {
    let mock = Arc::new(MockProvider::failing());
    let translator = Retrying::new(Arc::clone(&mock), RetryPolicy::no_retry());

    assert!(translator.translate("Hello", "fr").await.is_err());
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rateLimited_sharedLimiter_shouldBoundBothTranslators() {
    let limiter = Arc::new(RateLimiter::new(2, Duration::from_secs(1)));
    let first = RateLimited::new(MockProvider::working(), Arc::clone(&limiter));
    let second = RateLimited::new(MockProvider::working(), Arc::clone(&limiter));
    let start = Instant::now();

    first.translate("a", "fr").await.unwrap();
    second.translate("b", "fr").await.unwrap();
    assert!(start.elapsed() < Duration::from_millis(10));

    // Third call in the same window waits for the first slot to free up
    first.translate("c", "fr").await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_stack_retries_shouldReenterRateLimiter() {
    let mock = Arc::new(MockProvider::fail_first(2));
    let limiter = Arc::new(RateLimiter::new(1, Duration::from_secs(1)));
    let stack = translation::build_stack(Arc::clone(&mock), Arc::clone(&limiter), RetryPolicy::new(3));
    let start = Instant::now();

    let result = stack.translate("Hello", "fr").await;

    assert!(result.is_ok());
    assert_eq!(mock.request_count(), 3);
    // Three admissions at one per second: t=0, t=1, t=2
    assert!(start.elapsed() >= Duration::from_secs(2));
}

#[tokio::test]
async fn test_stackFromConfig_shouldUseConfiguredBudgets() {
    let temp_dir = common::create_temp_dir().unwrap();
    let mut config = common::test_config(temp_dir.path(), 10);
    config.retry.max_attempts = 7;
    config.rate_limit.max_calls = 5;
    config.rate_limit.window_secs = 30;

    let stack = translation::stack_from_config(MockProvider::working(), &config);

    assert_eq!(stack.policy().max_attempts, 7);
    let translated = stack.translate("Hello", "fr").await.unwrap();
    assert_eq!(translated, MockProvider::expected_translation("Hello", "fr"));
}
