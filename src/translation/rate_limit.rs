/*!
 * Rolling-window rate limiting for outbound provider calls.
 *
 * A single `RateLimiter` is shared by every worker of a job. It admits at
 * most `max_calls` calls within any trailing `window`; callers over budget
 * are suspended until the oldest admission ages out, never rejected.
 */

use async_trait::async_trait;
use log::trace;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::errors::TranslationError;

use super::core::TextTranslator;

/// Sliding-window log limiter
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    /// Admission instants inside the current window, oldest first
    admitted: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter admitting `max_calls` per `window`
    ///
    /// `max_calls` must be positive; configuration validation rejects zero.
    pub fn new(max_calls: u32, window: Duration) -> Self {
        let max_calls = max_calls.max(1) as usize;
        Self {
            max_calls,
            window,
            admitted: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Try to admit a call now; on refusal, return how long until a slot frees up
    fn try_admit(&self, now: Instant) -> Result<(), Duration> {
        let mut admitted = self.admitted.lock();

        while let Some(oldest) = admitted.front() {
            if now.duration_since(*oldest) >= self.window {
                admitted.pop_front();
            } else {
                break;
            }
        }

        if admitted.len() < self.max_calls {
            admitted.push_back(now);
            return Ok(());
        }

        // Full window, so front() is Some
        let oldest = admitted.front().copied().unwrap_or(now);
        Err((oldest + self.window).saturating_duration_since(now))
    }

    /// Wait until the call may proceed
    pub async fn acquire(&self) {
        loop {
            match self.try_admit(Instant::now()) {
                Ok(()) => return,
                Err(wait) => {
                    trace!("Rate limit reached, waiting {:?}", wait);
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Run a one-off call under the same budget as translated fields
    pub async fn throttle<F: Future>(&self, call: F) -> F::Output {
        self.acquire().await;
        call.await
    }

    /// Number of admissions still inside the window
    pub fn in_flight_window(&self) -> usize {
        let now = Instant::now();
        self.admitted
            .lock()
            .iter()
            .filter(|at| now.duration_since(**at) < self.window)
            .count()
    }
}

/// Decorator that passes every call through a shared `RateLimiter`
pub struct RateLimited<T> {
    inner: T,
    limiter: Arc<RateLimiter>,
}

impl<T> RateLimited<T> {
    pub fn new(inner: T, limiter: Arc<RateLimiter>) -> Self {
        Self { inner, limiter }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }
}

#[async_trait]
impl<T: TextTranslator> TextTranslator for RateLimited<T> {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        self.limiter.acquire().await;
        self.inner.translate(text, target_language).await
    }
}
