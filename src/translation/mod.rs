/*!
 * Translation of dataset records through a completion provider.
 *
 * - `core`: the `TextTranslator` seam, the provider-backed translator and
 *   the record translator
 * - `rate_limit`: shared rolling-window limiter and its decorator
 * - `retry`: fixed-budget retry helper and its decorator
 * - `prompts`: prompt text sent with every field
 */

use std::sync::Arc;

use crate::app_config::Config;

pub use self::core::{ChatTranslator, RecordTranslator, TextTranslator};
pub use self::rate_limit::{RateLimited, RateLimiter};
pub use self::retry::{RetryPolicy, Retrying, retry};

pub mod core;
pub mod prompts;
pub mod rate_limit;
pub mod retry;

/// The decorated translator a job runs with: retry around rate limit around the provider
pub type TranslatorStack<T> = Retrying<RateLimited<T>>;

/// Compose the job's translator stack around a base translator
///
/// Each retry re-enters the rate limiter, so retried calls count against the
/// same budget as first attempts.
pub fn build_stack<T: TextTranslator>(
    base: T,
    limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
) -> TranslatorStack<T> {
    Retrying::new(RateLimited::new(base, limiter), policy)
}

/// Build the stack from configuration, creating the shared limiter
pub fn stack_from_config<T: TextTranslator>(base: T, config: &Config) -> TranslatorStack<T> {
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit.max_calls,
        config.rate_limit.window(),
    ));
    build_stack(base, limiter, RetryPolicy::new(config.retry.max_attempts))
}
