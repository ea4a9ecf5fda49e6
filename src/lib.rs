/*!
 * # dataset-translator
 *
 * A Rust library for translating instruction/response datasets with AI.
 *
 * ## Features
 *
 * - Translate every field of a JSON dataset through an OpenAI-compatible API
 * - Rolling-window rate limiting shared by all workers
 * - Fixed-budget retries on failed calls
 * - Chunked processing with one checkpoint file per chunk
 * - Manual or automatic resume from existing checkpoints
 * - Final merge of all checkpoints into one output file
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `dataset`: Loading and downloading the source dataset
 * - `translation`: Field and record translation:
 *   - `translation::core`: The translator seam and record translator
 *   - `translation::rate_limit`: Shared rate limiter
 *   - `translation::retry`: Retry wrapper
 * - `pipeline`: Chunk planning, parallel execution, checkpoints, combining
 * - `providers`: Client implementations for completion providers
 * - `file_utils`: File system operations
 * - `language_utils`: Language tag utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod dataset;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod pipeline;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use dataset::{Dataset, Record};
pub use errors::{AppError, DownloadError, PersistenceError, ProviderError, TranslationError};
pub use pipeline::{ChunkPlanner, ChunkRange, CheckpointStore, Combiner, TranslationJob};
pub use translation::{RecordTranslator, TextTranslator};
