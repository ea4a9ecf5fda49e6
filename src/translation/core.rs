/*!
 * Field and record translation.
 *
 * `TextTranslator` is the seam between the job and the completion service:
 * one call turns one field value into its translation. Rate limiting and
 * retries are layered on top of it as decorators (see `rate_limit` and
 * `retry`), and `RecordTranslator` applies the stack to every field of a
 * record.
 */

use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use crate::app_config::ProviderConfig;
use crate::dataset::Record;
use crate::errors::TranslationError;
use crate::providers::Provider;
use crate::providers::openai::{OpenAI, OpenAIRequest, OpenAIResponse};

use super::prompts;

/// Translate one piece of text into a target language
///
/// Implementations perform at most one outbound call per invocation and
/// treat the returned text as opaque.
#[async_trait]
pub trait TextTranslator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError>;
}

#[async_trait]
impl<T: TextTranslator + ?Sized> TextTranslator for Arc<T> {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        (**self).translate(text, target_language).await
    }
}

#[async_trait]
impl<T: TextTranslator + ?Sized> TextTranslator for Box<T> {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        (**self).translate(text, target_language).await
    }
}

/// Translator backed by a chat completion provider
#[derive(Debug)]
pub struct ChatTranslator {
    client: OpenAI,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl ChatTranslator {
    /// Create a translator from provider settings
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            client: OpenAI::new(
                config.api_key.clone(),
                config.endpoint.clone(),
                config.model.clone(),
                config.timeout_secs,
            ),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Build the completion request for one field value
    pub fn build_request(&self, text: &str, target_language: &str) -> OpenAIRequest {
        OpenAIRequest::new(self.model.clone())
            .add_message("system", prompts::system_prompt(target_language))
            .add_message("user", prompts::user_prompt(text, target_language))
            .max_tokens(self.max_tokens)
            .temperature(self.temperature)
    }

    /// Verify credentials and endpoint with a minimal request
    pub async fn test_connection(&self) -> Result<(), TranslationError> {
        self.client.test_connection().await?;
        Ok(())
    }
}

#[async_trait]
impl TextTranslator for ChatTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        let request = self.build_request(text, target_language);
        let response = self.client.complete(request).await?;

        let translated = response_text(&response)?;

        debug!("Translated {} chars into {} chars", text.chars().count(), translated.chars().count());
        Ok(translated)
    }
}

/// Trimmed text of the first choice
///
/// A response without choices is malformed; a blank first choice is empty.
fn response_text(response: &OpenAIResponse) -> Result<String, TranslationError> {
    if response.choices.is_empty() {
        return Err(TranslationError::MalformedResponse(
            "response contained no choices".to_string(),
        ));
    }

    let translated = OpenAI::extract_text(response);
    if translated.is_empty() {
        return Err(TranslationError::EmptyResponse);
    }
    Ok(translated)
}

/// Applies a `TextTranslator` to every field of a record
pub struct RecordTranslator<T> {
    translator: T,
    target_language: String,
}

impl<T: TextTranslator> RecordTranslator<T> {
    pub fn new(translator: T, target_language: impl Into<String>) -> Self {
        Self {
            translator,
            target_language: target_language.into(),
        }
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Translate every field of a record, keeping keys and their order
    ///
    /// Empty values are echoed as empty strings without calling the
    /// translator. The first field that fails fails the whole record.
    pub async fn translate_record(&self, record: &Record) -> Result<Record, TranslationError> {
        let mut translated = Record::with_capacity(record.len());

        for (key, value) in record {
            let output = if value.is_empty() {
                String::new()
            } else {
                self.translator.translate(value, &self.target_language).await?
            };
            translated.insert(key.clone(), output);
        }

        Ok(translated)
    }
}
