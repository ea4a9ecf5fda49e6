/*!
 * Chunked, resumable batch pipeline.
 *
 * - `planner`: splits the dataset index range into chunks
 * - `executor`: translates one chunk's records concurrently
 * - `checkpoint`: writes and discovers per-chunk checkpoint files
 * - `combiner`: merges checkpoints into the final output
 * - `orchestrator`: runs the whole job
 */

pub use self::checkpoint::{Checkpoint, CheckpointStore};
pub use self::combiner::{CombineSummary, Combiner};
pub use self::executor::{BatchExecutor, ChunkFailure};
pub use self::orchestrator::{JobSummary, PlannedChunk, TranslationJob, build_planner, describe_plan};
pub use self::planner::{ChunkPlanner, ChunkRange};

pub mod checkpoint;
pub mod combiner;
pub mod executor;
pub mod orchestrator;
pub mod planner;
