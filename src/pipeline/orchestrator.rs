/*!
 * Job orchestration: plan, translate, checkpoint, combine.
 *
 * Chunks run strictly one after another. Within a chunk, records are
 * translated concurrently by the `BatchExecutor`; the chunk is persisted only
 * once every record in it has been translated.
 */

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{Config, JobConfig};
use crate::dataset::Dataset;
use crate::errors::AppError;
use crate::translation::{RecordTranslator, TextTranslator};

use super::checkpoint::CheckpointStore;
use super::combiner::{CombineSummary, Combiner};
use super::executor::BatchExecutor;
use super::planner::{ChunkPlanner, ChunkRange};

/// Outcome of a job run
#[derive(Debug, Clone, Default)]
pub struct JobSummary {
    /// Offset the plan started from
    pub start_offset: usize,
    /// Exclusive end of the plan
    pub end_offset: usize,
    /// Chunks translated and persisted by this run
    pub chunks_translated: usize,
    /// Chunks skipped because a checkpoint already existed
    pub chunks_skipped: usize,
    /// Records translated by this run
    pub records_translated: usize,
    /// Result of the final combine, when it ran
    pub combine: Option<CombineSummary>,
    pub elapsed: Duration,
}

/// A planned chunk and whether its checkpoint is already on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChunk {
    pub range: ChunkRange,
    pub done: bool,
}

/// A configured translation job
pub struct TranslationJob<T> {
    config: Config,
    executor: BatchExecutor<T>,
    store: CheckpointStore,
    show_progress: bool,
}

/// Build the chunk plan for a dataset of `dataset_len` records
///
/// With auto-resume enabled, the plan starts after the checkpoints that
/// continue contiguously from the configured start offset.
pub fn build_planner(
    job: &JobConfig,
    store: &CheckpointStore,
    dataset_len: usize,
) -> Result<ChunkPlanner, AppError> {
    let end = job.end_offset.map_or(dataset_len, |end| end.min(dataset_len));

    let mut start = job.start_offset;
    if job.auto_resume {
        let resumed = store.resume_offset(start)?;
        if resumed != start {
            info!("Resuming at record {} (checkpoints cover [{}, {}))", resumed, start, resumed);
        }
        start = resumed;
    }

    ChunkPlanner::new(start, end, job.chunk_size)
}

/// The chunk plan annotated with checkpoint presence, without translating anything
pub fn describe_plan(
    job: &JobConfig,
    store: &CheckpointStore,
    dataset_len: usize,
) -> Result<Vec<PlannedChunk>, AppError> {
    Ok(build_planner(job, store, dataset_len)?
        .map(|range| PlannedChunk { range, done: store.exists(range) })
        .collect())
}

impl<T: TextTranslator> TranslationJob<T> {
    /// Create a job around a fully decorated translator
    pub fn new(config: Config, translator: T) -> Self {
        let record_translator = Arc::new(RecordTranslator::new(translator, config.target_language.clone()));
        let executor = BatchExecutor::new(record_translator, config.job.workers);
        let store = CheckpointStore::new(config.output.dir.clone());

        Self {
            config,
            executor,
            store,
            show_progress: true,
        }
    }

    /// Enable or disable progress bars
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Build the chunk plan for a dataset of `dataset_len` records
    pub fn planner(&self, dataset_len: usize) -> Result<ChunkPlanner, AppError> {
        build_planner(&self.config.job, &self.store, dataset_len)
    }

    /// Translate every planned chunk, then combine the checkpoints
    pub async fn run(&self, dataset: &Dataset) -> Result<JobSummary, AppError> {
        let started = Instant::now();
        let planner = self.planner(dataset.len())?;
        let total_chunks = planner.len();

        let mut summary = JobSummary {
            start_offset: planner.next_start(),
            end_offset: self.config.job.end_offset.map_or(dataset.len(), |e| e.min(dataset.len())),
            ..Default::default()
        };

        info!(
            "Translating records [{}, {}) of {} into {} ({} chunk(s) of up to {}, {} workers)",
            summary.start_offset,
            summary.end_offset,
            dataset.len(),
            self.config.target_language,
            total_chunks,
            planner.chunk_size(),
            self.executor.workers()
        );

        let multi_progress = if self.show_progress {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };
        let chunk_pb = multi_progress.add(ProgressBar::new(total_chunks as u64));
        chunk_pb.set_style(bar_style("chunks"));

        for range in planner {
            if self.config.job.auto_resume && self.store.exists(range) {
                info!("Skipping chunk {}, checkpoint already exists", range);
                summary.chunks_skipped += 1;
                chunk_pb.inc(1);
                continue;
            }

            let records = dataset.slice(range.start, range.end);
            let record_pb = multi_progress.add(ProgressBar::new(records.len() as u64));
            record_pb.set_style(bar_style("records"));
            record_pb.set_message(range.to_string());

            let result = self.executor.execute(records, Some(&record_pb)).await;
            record_pb.finish_and_clear();
            multi_progress.remove(&record_pb);

            let translated = match result {
                Ok(translated) => translated,
                Err(failure) => {
                    error!(
                        "Chunk {} failed: {} record(s) could not be translated (first at index {}): {}",
                        range,
                        failure.failed,
                        range.start + failure.first_index,
                        failure.first_error
                    );
                    error!("Nothing was saved for this chunk; rerun with --start {} to resume", range.start);
                    chunk_pb.abandon();
                    return Err(AppError::Chunk {
                        start: range.start,
                        end: range.end,
                        failed: failure.failed,
                        source: failure.first_error,
                    });
                }
            };

            self.store.persist(range, &translated)?;
            summary.chunks_translated += 1;
            summary.records_translated += translated.len();
            chunk_pb.inc(1);
        }

        chunk_pb.finish_and_clear();

        if self.config.job.combine {
            let combiner = Combiner::new(self.store.clone(), self.config.output.combined_path());
            let combine = combiner.combine()?;
            if !combine.is_contiguous() {
                warn!("Combined output does not form a contiguous range; see warnings above");
            }
            summary.combine = Some(combine);
        }

        summary.elapsed = started.elapsed();
        info!(
            "Translation complete: {} chunk(s), {} record(s) in {:?}",
            summary.chunks_translated, summary.records_translated, summary.elapsed
        );

        Ok(summary)
    }
}

fn bar_style(unit: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
            unit
        ))
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
}
