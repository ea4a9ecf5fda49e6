use anyhow::{Context, Result, anyhow};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::file_utils::FileManager;

/// Application configuration module
/// This module handles the job configuration including loading,
/// validating and saving configuration settings.
/// Represents the job configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language tag (e.g. "zh-Hant")
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Source dataset location
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Where checkpoints and the combined file go
    #[serde(default)]
    pub output: OutputConfig,

    /// Chunking and parallelism
    #[serde(default)]
    pub job: JobConfig,

    /// Outbound call budget
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Retry budget per field
    #[serde(default)]
    pub retry: RetryConfig,

    /// Completion API settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Source dataset configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatasetConfig {
    // @field: Local dataset file
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,

    // @field: Download URL used when the local file is missing
    #[serde(default = "default_dataset_url")]
    pub url: Option<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            url: default_dataset_url(),
        }
    }
}

/// Output configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    // @field: Directory holding checkpoint files
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    // @field: File name of the combined output, relative to `dir`
    #[serde(default = "default_combined_file")]
    pub combined_file: String,
}

impl OutputConfig {
    /// Full path of the combined output file
    pub fn combined_path(&self) -> PathBuf {
        self.dir.join(&self.combined_file)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            combined_file: default_combined_file(),
        }
    }
}

/// Job shape configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobConfig {
    /// Maximum number of records translated concurrently within a chunk
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Number of records per checkpoint file
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// First dataset index to process
    #[serde(default)]
    pub start_offset: usize,

    /// Exclusive upper bound; the dataset length when unset
    #[serde(default)]
    pub end_offset: Option<usize>,

    /// Continue after the last contiguous checkpoint instead of `start_offset`
    #[serde(default)]
    pub auto_resume: bool,

    /// Merge checkpoints into the combined file once all chunks are done
    #[serde(default = "default_true")]
    pub combine: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            chunk_size: default_chunk_size(),
            start_offset: 0,
            end_offset: None,
            auto_resume: false,
            combine: true,
        }
    }
}

/// Rolling-window call budget
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RateLimitConfig {
    /// Calls admitted per window
    #[serde(default = "default_max_calls")]
    pub max_calls: u32,

    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls: default_max_calls(),
            window_secs: default_window_secs(),
        }
    }
}

/// Retry configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RetryConfig {
    /// Total attempts per field, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

/// Completion provider configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: API key; normally supplied through the environment
    #[serde(default, skip_serializing)]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,

    // @field: Model name
    #[serde(default = "default_openai_model")]
    pub model: String,

    // @field: Completion token cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    // @field: Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_openai_endpoint(),
            model: default_openai_model(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_target_language() -> String {
    "zh-Hant".to_string()
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("alpaca_data.json")
}

fn default_dataset_url() -> Option<String> {
    Some("https://raw.githubusercontent.com/tatsu-lab/stanford_alpaca/main/alpaca_data.json".to_string())
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_combined_file() -> String {
    "translated_data.json".to_string()
}

fn default_workers() -> usize {
    100
}

fn default_chunk_size() -> usize {
    1000
}

// Stay just under a 60 RPM account tier
fn default_max_calls() -> u32 {
    58
}

fn default_window_secs() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    10
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load the configuration file, or write a default one when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        FileManager::write_to_file(path, &config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_tag(&self.target_language)?;

        if self.job.workers == 0 {
            return Err(anyhow!("job.workers must be greater than zero"));
        }
        if self.job.chunk_size == 0 {
            return Err(anyhow!("job.chunk_size must be greater than zero"));
        }
        if let Some(end) = self.job.end_offset {
            if end <= self.job.start_offset {
                return Err(anyhow!(
                    "job.end_offset ({}) must be greater than job.start_offset ({})",
                    end, self.job.start_offset
                ));
            }
        }

        if self.rate_limit.max_calls == 0 {
            return Err(anyhow!("rate_limit.max_calls must be greater than zero"));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(anyhow!("rate_limit.window_secs must be greater than zero"));
        }
        if self.retry.max_attempts == 0 {
            return Err(anyhow!("retry.max_attempts must be at least 1"));
        }

        Url::parse(&self.provider.endpoint)
            .with_context(|| format!("Invalid provider endpoint: {}", self.provider.endpoint))?;
        if let Some(url) = &self.dataset.url {
            Url::parse(url).with_context(|| format!("Invalid dataset URL: {}", url))?;
        }

        if self.output.combined_file.trim().is_empty() {
            return Err(anyhow!("output.combined_file must not be empty"));
        }

        Ok(())
    }

    /// Check that everything needed to call the provider is present
    pub fn validate_credentials(&self) -> Result<()> {
        if self.provider.api_key.trim().is_empty() {
            return Err(anyhow!(
                "Translation API key is required (set OPENAI_API_KEY or pass --api-key)"
            ));
        }
        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            dataset: DatasetConfig::default(),
            output: OutputConfig::default(),
            job: JobConfig::default(),
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
            provider: ProviderConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
