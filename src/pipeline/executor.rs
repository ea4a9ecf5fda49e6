/*!
 * Parallel translation of one chunk.
 *
 * Records are dispatched onto a bounded set of concurrently running futures
 * and collected in completion order. A chunk either translates completely or
 * fails as a whole.
 */

use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use log::{debug, error};
use std::sync::Arc;
use std::time::Instant;

use crate::dataset::Record;
use crate::errors::TranslationError;
use crate::translation::{RecordTranslator, TextTranslator};

/// Why a chunk could not be translated
#[derive(Debug)]
pub struct ChunkFailure {
    /// Number of records whose translation failed
    pub failed: usize,
    /// Index (within the chunk) and error of the first failure observed
    pub first_index: usize,
    pub first_error: TranslationError,
}

/// Batch executor for translating the records of a chunk
pub struct BatchExecutor<T> {
    /// Record translator shared by every in-flight record
    translator: Arc<RecordTranslator<T>>,

    /// Maximum number of records translated concurrently
    workers: usize,
}

impl<T: TextTranslator> BatchExecutor<T> {
    /// Create a new batch executor
    pub fn new(translator: Arc<RecordTranslator<T>>, workers: usize) -> Self {
        Self {
            translator,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Translate every record, returning results in completion order
    ///
    /// Waits for every dispatched record to finish before returning. If any
    /// record fails, the whole chunk fails and no results are returned.
    pub async fn execute(
        &self,
        records: &[Record],
        progress: Option<&ProgressBar>,
    ) -> Result<Vec<Record>, ChunkFailure> {
        let start_time = Instant::now();

        let results = stream::iter(records.iter().enumerate())
            .map(|(index, record)| {
                let translator = self.translator.clone();
                async move {
                    let result = translator.translate_record(record).await;
                    if let Some(pb) = progress {
                        pb.inc(1);
                    }
                    (index, result)
                }
            })
            .buffer_unordered(self.workers)
            .collect::<Vec<_>>()
            .await;

        let mut translated = Vec::with_capacity(records.len());
        let mut failure: Option<ChunkFailure> = None;

        for (index, result) in results {
            match result {
                Ok(record) => translated.push(record),
                Err(e) => {
                    error!("Record {} failed: {}", index, e);
                    match failure.as_mut() {
                        Some(f) => f.failed += 1,
                        None => {
                            failure = Some(ChunkFailure {
                                failed: 1,
                                first_index: index,
                                first_error: e,
                            })
                        }
                    }
                }
            }
        }

        if let Some(failure) = failure {
            return Err(failure);
        }

        debug!(
            "Translated {} records with {} workers in {:?}",
            translated.len(),
            self.workers,
            start_time.elapsed()
        );
        Ok(translated)
    }
}
