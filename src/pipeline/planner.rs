/*!
 * Chunk planning over the dataset index range.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::AppError;

/// Half-open index range `[start, end)` into the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkRange {
    pub start: usize,
    pub end: usize,
}

impl ChunkRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl fmt::Display for ChunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Lazy sequence of contiguous chunk ranges
///
/// Yields `[start, start+size), [start+size, start+2*size), ...` with the last
/// range clipped to `end`. Empty when `start >= end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlanner {
    next_start: usize,
    end: usize,
    chunk_size: usize,
}

impl ChunkPlanner {
    /// Create a planner; `chunk_size` must be positive
    pub fn new(start: usize, end: usize, chunk_size: usize) -> Result<Self, AppError> {
        if chunk_size == 0 {
            return Err(AppError::Config("chunk size must be greater than zero".to_string()));
        }

        Ok(Self {
            next_start: start,
            end,
            chunk_size,
        })
    }

    /// Start of the next range to be yielded
    pub fn next_start(&self) -> usize {
        self.next_start
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of chunks left to yield
    pub fn len(&self) -> usize {
        if self.next_start >= self.end {
            0
        } else {
            (self.end - self.next_start).div_ceil(self.chunk_size)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Iterator for ChunkPlanner {
    type Item = ChunkRange;

    fn next(&mut self) -> Option<ChunkRange> {
        if self.next_start >= self.end {
            return None;
        }

        let start = self.next_start;
        let end = start.saturating_add(self.chunk_size).min(self.end);
        self.next_start = end;
        Some(ChunkRange { start, end })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ChunkPlanner {}

impl std::iter::FusedIterator for ChunkPlanner {}
