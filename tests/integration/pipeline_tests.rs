/*!
 * End-to-end job runs against mock translators
 *
 * Each test loads a dataset file from a temporary directory, runs a complete
 * translation job with progress bars disabled, and inspects the files left
 * behind.
 */

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use crate::common;
use dataset_translator::errors::AppError;
use dataset_translator::pipeline::{CheckpointStore, ChunkRange, PlannedChunk, describe_plan};
use dataset_translator::providers::mock::MockProvider;
use dataset_translator::translation;
use dataset_translator::{Config, Dataset, TranslationJob};

fn load_dataset(dir: &Path, count: usize) -> Result<Dataset> {
    let path = common::write_dataset(dir, &common::sample_records(count))?;
    Ok(Dataset::load(path)?)
}

fn checkpoint_ranges(dir: &Path) -> Result<Vec<ChunkRange>> {
    Ok(CheckpointStore::new(dir).list()?.into_iter().map(|c| c.range).collect())
}

fn job_with(config: &Config, mock: &Arc<MockProvider>) -> TranslationJob<translation::TranslatorStack<Arc<MockProvider>>> {
    let stack = translation::stack_from_config(Arc::clone(mock), config);
    TranslationJob::new(config.clone(), stack).with_progress(false)
}

#[tokio::test]
async fn test_run_withFiveRecordsAndChunkTwo_shouldWriteThreeCheckpointsAndCombine() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let dataset = load_dataset(temp_dir.path(), 5)?;
    let config = common::test_config(temp_dir.path(), 2);
    let mock = Arc::new(MockProvider::working());

    let summary = job_with(&config, &mock).run(&dataset).await?;

    assert_eq!(
        checkpoint_ranges(temp_dir.path())?,
        vec![ChunkRange::new(0, 2), ChunkRange::new(2, 4), ChunkRange::new(4, 5)]
    );
    assert_eq!(summary.chunks_translated, 3);
    assert_eq!(summary.records_translated, 5);

    let combine = summary.combine.expect("combine should have run");
    assert_eq!(combine.records, 5);
    assert!(combine.is_contiguous());

    // Combined output holds every record exactly once, translated field by field
    let combined = CheckpointStore::new(temp_dir.path()).load(&config.output.combined_path())?;
    let instructions: BTreeSet<String> = combined.iter().map(|r| r["instruction"].clone()).collect();
    let expected: BTreeSet<String> = (0..5)
        .map(|i| MockProvider::expected_translation(&format!("Instruction {}", i), "fr"))
        .collect();
    assert_eq!(instructions, expected);
    assert!(combined.iter().all(|r| r.keys().eq(["instruction", "input", "output"].iter())));
    assert_eq!(combined.iter().filter(|r| r["input"].is_empty()).count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_run_withFailingChunk_shouldStopAndKeepEarlierCheckpoints() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let dataset = load_dataset(temp_dir.path(), 5)?;
    let config = common::test_config(temp_dir.path(), 2);
    let mock = Arc::new(MockProvider::fail_on_text("Instruction 3"));

    let result = job_with(&config, &mock).run(&dataset).await;

    match result {
        Err(AppError::Chunk { start, end, failed, .. }) => {
            assert_eq!((start, end, failed), (2, 4, 1));
        }
        other => panic!("Expected a chunk failure, got {:?}", other),
    }
    assert_eq!(checkpoint_ranges(temp_dir.path())?, vec![ChunkRange::new(0, 2)]);
    assert!(!config.output.combined_path().exists());
    // The failing field used its whole retry budget; the last chunk never started
    assert!(!mock.seen_texts().iter().any(|t| t == "Instruction 4"));
    assert_eq!(mock.seen_texts().iter().filter(|t| *t == "Instruction 3").count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_run_withAutoResume_shouldSkipExistingCheckpoints() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dataset = load_dataset(temp_dir.path(), 5)?;
    let store = CheckpointStore::new(temp_dir.path());
    let done = vec![
        common::record(&[("instruction", "done 0")]),
        common::record(&[("instruction", "done 1")]),
    ];
    store.persist(ChunkRange::new(0, 2), &done)?;
    store.persist(ChunkRange::new(4, 5), &done[..1])?;

    let mut config = common::test_config(temp_dir.path(), 2);
    config.job.auto_resume = true;
    let mock = Arc::new(MockProvider::working());

    let summary = job_with(&config, &mock).run(&dataset).await?;

    assert_eq!(summary.start_offset, 2);
    assert_eq!(summary.chunks_translated, 1);
    assert_eq!(summary.chunks_skipped, 1);
    let seen: BTreeSet<String> = mock.seen_texts().into_iter().collect();
    assert!(seen.contains("Instruction 2"));
    assert!(seen.contains("Instruction 3"));
    assert!(!seen.contains("Instruction 0"));
    assert!(!seen.contains("Instruction 4"));
    assert_eq!(summary.combine.map(|c| c.records), Some(5));
    Ok(())
}

#[tokio::test]
async fn test_run_withoutAutoResume_shouldRetranslateFromStartOffset() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dataset = load_dataset(temp_dir.path(), 4)?;
    let store = CheckpointStore::new(temp_dir.path());
    store.persist(ChunkRange::new(0, 2), &common::sample_records(2))?;

    let config = common::test_config(temp_dir.path(), 2);
    let mock = Arc::new(MockProvider::working());

    let summary = job_with(&config, &mock).run(&dataset).await?;

    assert_eq!(summary.chunks_translated, 2);
    let rewritten = store.load(&store.path_for(ChunkRange::new(0, 2)))?;
    assert!(rewritten.iter().all(|r| r["instruction"].starts_with("[fr] ")));
    Ok(())
}

#[tokio::test]
async fn test_run_withOffsets_shouldOnlyTranslateRequestedRange() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dataset = load_dataset(temp_dir.path(), 10)?;
    let mut config = common::test_config(temp_dir.path(), 2);
    config.job.start_offset = 1;
    config.job.end_offset = Some(4);
    config.job.combine = false;
    let mock = Arc::new(MockProvider::working());

    let summary = job_with(&config, &mock).run(&dataset).await?;

    assert_eq!(
        checkpoint_ranges(temp_dir.path())?,
        vec![ChunkRange::new(1, 3), ChunkRange::new(3, 4)]
    );
    assert_eq!((summary.start_offset, summary.end_offset), (1, 4));
    assert!(summary.combine.is_none());
    assert!(!config.output.combined_path().exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withEndPastDataset_shouldClampToDatasetLength() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dataset = load_dataset(temp_dir.path(), 3)?;
    let mut config = common::test_config(temp_dir.path(), 1000);
    config.job.end_offset = Some(5000);
    let mock = Arc::new(MockProvider::working());

    let summary = job_with(&config, &mock).run(&dataset).await?;

    assert_eq!(checkpoint_ranges(temp_dir.path())?, vec![ChunkRange::new(0, 3)]);
    assert_eq!(summary.end_offset, 3);
    Ok(())
}

#[test]
fn test_describePlan_shouldMarkChunksWithCheckpoints() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = CheckpointStore::new(temp_dir.path());
    store.persist(ChunkRange::new(2, 4), &common::sample_records(2))?;
    let config = common::test_config(temp_dir.path(), 2);

    let plan = describe_plan(&config.job, &store, 5)?;

    assert_eq!(
        plan,
        vec![
            PlannedChunk { range: ChunkRange::new(0, 2), done: false },
            PlannedChunk { range: ChunkRange::new(2, 4), done: true },
            PlannedChunk { range: ChunkRange::new(4, 5), done: false },
        ]
    );
    Ok(())
}
