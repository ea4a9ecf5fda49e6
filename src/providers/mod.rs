/*!
 * Provider implementations for the completion service.
 *
 * This module contains client implementations for the text-generation
 * backends a job can translate through:
 * - OpenAI: OpenAI-compatible chat completion API
 * - Mock: deterministic in-process translator for tests and benchmarks
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// A completion backend reachable over the network
///
/// `Request` and `Response` are the backend's own wire types; translating a
/// field value into a request and back is left to the caller
/// (see `translation::core::ChatTranslator`).
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    type Request: Send + Sync;
    type Response: Send + Sync;

    /// Send one request and wait for its response
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Issue a minimal request to check the endpoint and credentials
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Generated text of a response, or an empty string when there is none
    fn extract_text(response: &Self::Response) -> String;
}

pub mod mock;
pub mod openai;
