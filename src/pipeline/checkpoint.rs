/*!
 * Chunk checkpoint files.
 *
 * Each completed chunk is written to its own JSON file whose name embeds the
 * chunk's index range. The file's presence is the only record that the chunk
 * is done, so writes go through a temporary file and a rename.
 */

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dataset::Record;
use crate::errors::PersistenceError;
use crate::file_utils::FileManager;

use super::planner::ChunkRange;

const CHECKPOINT_PREFIX: &str = "translated_data_up_to_";

static CHECKPOINT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^translated_data_up_to_(\d+)_to_(\d+)\.json$").expect("checkpoint pattern is valid")
});

/// A checkpoint file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub range: ChunkRange,
    pub path: PathBuf,
}

/// Serialize records as a JSON array indented by four spaces
pub fn to_pretty_json(records: &[Record]) -> Result<Vec<u8>, serde_json::Error> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    records.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Directory of chunk checkpoint files
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a chunk
    pub fn file_name(range: ChunkRange) -> String {
        format!("{}{}_to_{}.json", CHECKPOINT_PREFIX, range.start, range.end)
    }

    /// Recover the chunk range from a checkpoint file name
    pub fn parse_file_name(name: &str) -> Option<ChunkRange> {
        let captures = CHECKPOINT_NAME.captures(name)?;
        let start = captures[1].parse().ok()?;
        let end = captures[2].parse().ok()?;
        (start < end).then_some(ChunkRange { start, end })
    }

    pub fn path_for(&self, range: ChunkRange) -> PathBuf {
        self.dir.join(Self::file_name(range))
    }

    pub fn exists(&self, range: ChunkRange) -> bool {
        FileManager::file_exists(self.path_for(range))
    }

    /// Write a chunk's records, creating or replacing its checkpoint
    pub fn persist(&self, range: ChunkRange, records: &[Record]) -> Result<PathBuf, PersistenceError> {
        let path = self.path_for(range);
        let json = to_pretty_json(records)
            .map_err(|source| PersistenceError::Serialize { path: path.clone(), source })?;

        FileManager::write_atomic(&path, &json).map_err(|e| PersistenceError::io(&path, e))?;

        info!("Saved {} records for chunk {} to {:?}", records.len(), range, path);
        Ok(path)
    }

    /// Read back the records of a checkpoint file
    pub fn load(&self, path: &Path) -> Result<Vec<Record>, PersistenceError> {
        let content = fs::read_to_string(path).map_err(|e| PersistenceError::io(path, e))?;
        serde_json::from_str(&content).map_err(|source| PersistenceError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// All checkpoints in the directory, ordered by start index
    pub fn list(&self) -> Result<Vec<Checkpoint>, PersistenceError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let files = FileManager::list_files(&self.dir)
            .map_err(|e| PersistenceError::io(&self.dir, std::io::Error::other(format!("{:#}", e))))?;

        let mut checkpoints: Vec<Checkpoint> = files
            .into_iter()
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?;
                let range = Self::parse_file_name(name)?;
                Some(Checkpoint { range, path })
            })
            .collect();

        checkpoints.sort_by_key(|c| c.range);
        debug!("Found {} checkpoint(s) in {:?}", checkpoints.len(), self.dir);
        Ok(checkpoints)
    }

    /// First index at or after `from` not covered by contiguous checkpoints
    ///
    /// Follows checkpoints chained end-to-start beginning at `from`; a
    /// checkpoint that merely overlaps `from` does not count.
    pub fn resume_offset(&self, from: usize) -> Result<usize, PersistenceError> {
        let checkpoints = self.list()?;
        let mut cursor = from;

        loop {
            let next = checkpoints
                .iter()
                .filter(|c| c.range.start == cursor)
                .map(|c| c.range.end)
                .max();
            match next {
                Some(end) => cursor = end,
                None => return Ok(cursor),
            }
        }
    }
}
