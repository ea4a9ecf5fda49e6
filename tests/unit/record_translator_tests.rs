/*!
 * Tests for record translation
 */

use anyhow::Result;
use std::sync::Arc;

use crate::common;
use dataset_translator::errors::TranslationError;
use dataset_translator::providers::mock::MockProvider;
use dataset_translator::translation::RecordTranslator;

#[tokio::test]
async fn test_translateRecord_withEmptyField_shouldSkipTranslator() -> Result<()> {
    let translator = RecordTranslator::new(MockProvider::working(), "fr");
    let source = common::record(&[
        ("instruction", "Name a color."),
        ("input", ""),
        ("output", "Blue"),
    ]);

    let translated = translator.translate_record(&source).await?;

    assert_eq!(translated["input"], "");
    assert_eq!(translated["instruction"], MockProvider::expected_translation("Name a color.", "fr"));
    assert_eq!(translated["output"], MockProvider::expected_translation("Blue", "fr"));
    Ok(())
}

#[tokio::test]
async fn test_translateRecord_shouldNotSendEmptyValues() -> Result<()> {
    let mock = Arc::new(MockProvider::working());
    let translator = RecordTranslator::new(Arc::clone(&mock), "fr");
    let source = common::record(&[("instruction", "Hello"), ("input", ""), ("output", "")]);

    translator.translate_record(&source).await?;

    assert_eq!(mock.request_count(), 1);
    assert_eq!(mock.seen_texts(), vec!["Hello".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_translateRecord_shouldPreserveKeyOrder() -> Result<()> {
    let translator = RecordTranslator::new(MockProvider::working(), "de");
    let source = common::record(&[("output", "b"), ("instruction", "a"), ("input", "c")]);

    let translated = translator.translate_record(&source).await?;

    let keys: Vec<&String> = translated.keys().collect();
    assert_eq!(keys, vec!["output", "instruction", "input"]);
    Ok(())
}

#[tokio::test]
async fn test_translateRecord_withFailingField_shouldFailWholeRecord() {
    let translator = RecordTranslator::new(MockProvider::fail_on_text("BOOM"), "fr");
    let source = common::record(&[("instruction", "fine"), ("output", "BOOM")]);

    let result = translator.translate_record(&source).await;

    assert!(matches!(result, Err(TranslationError::Provider(_))));
}

#[tokio::test]
async fn test_translateRecord_withAllFieldsEmpty_shouldNotCallTranslator() -> Result<()> {
    let mock = Arc::new(MockProvider::failing());
    let translator = RecordTranslator::new(Arc::clone(&mock), "fr");
    let source = common::record(&[("instruction", ""), ("input", "")]);

    let translated = translator.translate_record(&source).await?;

    assert_eq!(translated, source);
    assert_eq!(mock.request_count(), 0);
    Ok(())
}
