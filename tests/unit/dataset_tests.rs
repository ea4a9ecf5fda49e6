/*!
 * Tests for dataset loading
 */

use anyhow::Result;

use crate::common;
use dataset_translator::dataset::{self, Dataset};
use dataset_translator::errors::AppError;

#[test]
fn test_fromJson_withAlpacaRecords_shouldKeepFieldOrder() -> Result<()> {
    let dataset = Dataset::from_json(
        r#"[
            {"instruction": "Give three tips.", "input": "", "output": "1. Eat well."},
            {"output": "Paris", "instruction": "Capital of France?", "input": ""}
        ]"#,
    )?;

    assert_eq!(dataset.len(), 2);
    let keys: Vec<&str> = dataset.records()[1].keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["output", "instruction", "input"]);
    Ok(())
}

#[test]
fn test_fromJson_withNullValue_shouldLoadEmptyString() -> Result<()> {
    let dataset = Dataset::from_json(r#"[{"instruction": "Hi", "input": null}]"#)?;

    assert_eq!(dataset.records()[0]["input"], "");
    Ok(())
}

#[test]
fn test_fromJson_withNonArray_shouldFailAsDatasetError() {
    let result = Dataset::from_json(r#"{"instruction": "Hi"}"#);
    assert!(matches!(result, Err(AppError::Dataset(_))));
}

#[test]
fn test_slice_withRangePastEnd_shouldClamp() {
    let dataset = Dataset::from_records(common::sample_records(5));

    assert_eq!(dataset.slice(4, 10).len(), 1);
    assert!(dataset.slice(7, 10).is_empty());
    assert_eq!(dataset.slice(0, 2)[1]["instruction"], "Instruction 1");
}

#[test]
fn test_load_withMissingFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    assert!(Dataset::load(temp_dir.path().join("missing.json")).is_err());
    Ok(())
}

#[tokio::test]
async fn test_ensureLocal_withExistingFile_shouldNotDownload() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::write_dataset(temp_dir.path(), &common::sample_records(2))?;

    // An unroutable URL proves no request is made
    dataset::ensure_local(&path, Some("http://127.0.0.1:9/never")).await?;

    assert_eq!(Dataset::load(&path)?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_ensureLocal_withoutFileOrUrl_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = dataset::ensure_local(&temp_dir.path().join("missing.json"), None).await;
    assert!(matches!(result, Err(AppError::Dataset(_))));
    Ok(())
}

#[tokio::test]
async fn test_download_withUnreachableHost_shouldFailWithoutWriting() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("alpaca_data.json");

    let result = dataset::download("http://127.0.0.1:9/alpaca_data.json", &path).await;

    assert!(result.is_err());
    assert!(!path.exists());
    Ok(())
}
