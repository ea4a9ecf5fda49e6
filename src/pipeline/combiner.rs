/*!
 * Merging of checkpoint files into the combined output.
 */

use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::errors::PersistenceError;
use crate::file_utils::FileManager;

use super::checkpoint::{CheckpointStore, to_pretty_json};
use super::planner::ChunkRange;

/// Outcome of a combine run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombineSummary {
    /// Checkpoint files merged
    pub files: usize,
    /// Records written to the combined file
    pub records: usize,
    /// Index ranges between checkpoints that no checkpoint covers
    pub gaps: Vec<ChunkRange>,
    /// Checkpoints whose range overlaps the previous one
    pub overlaps: Vec<ChunkRange>,
    /// Path of the combined file
    pub output: PathBuf,
}

impl CombineSummary {
    pub fn is_contiguous(&self) -> bool {
        self.gaps.is_empty() && self.overlaps.is_empty()
    }
}

/// Concatenates every checkpoint into one JSON array
pub struct Combiner {
    store: CheckpointStore,
    output: PathBuf,
}

impl Combiner {
    pub fn new(store: CheckpointStore, output: impl Into<PathBuf>) -> Self {
        Self { store, output: output.into() }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Merge all checkpoints currently on disk
    ///
    /// Checkpoints are concatenated by start index. Gaps and overlaps are
    /// reported but do not stop the combine.
    pub fn combine(&self) -> Result<CombineSummary, PersistenceError> {
        let checkpoints = self.store.list()?;
        let mut combined = Vec::new();
        let mut gaps = Vec::new();
        let mut overlaps = Vec::new();
        let mut covered_until: Option<usize> = None;

        for checkpoint in &checkpoints {
            let records = self.store.load(&checkpoint.path)?;
            if records.len() != checkpoint.range.len() {
                warn!(
                    "Checkpoint {:?} holds {} records but its range {} spans {}",
                    checkpoint.path,
                    records.len(),
                    checkpoint.range,
                    checkpoint.range.len()
                );
            }
            combined.extend(records);

            if let Some(until) = covered_until {
                if checkpoint.range.start > until {
                    gaps.push(ChunkRange::new(until, checkpoint.range.start));
                } else if checkpoint.range.start < until {
                    overlaps.push(checkpoint.range);
                }
            }
            covered_until = Some(covered_until.map_or(checkpoint.range.end, |u| u.max(checkpoint.range.end)));
        }

        for gap in &gaps {
            warn!("No checkpoint covers records {}; combined output is incomplete", gap);
        }
        for overlap in &overlaps {
            warn!("Checkpoint {} overlaps an earlier checkpoint; records may be duplicated", overlap);
        }

        let json = to_pretty_json(&combined).map_err(|source| PersistenceError::Serialize {
            path: self.output.clone(),
            source,
        })?;
        FileManager::write_atomic(&self.output, &json)
            .map_err(|e| PersistenceError::io(&self.output, e))?;

        info!(
            "Combined {} records from {} checkpoint(s) into {:?}",
            combined.len(),
            checkpoints.len(),
            self.output
        );

        Ok(CombineSummary {
            files: checkpoints.len(),
            records: combined.len(),
            gaps,
            overlaps,
            output: self.output.clone(),
        })
    }
}
