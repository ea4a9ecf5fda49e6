// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use dataset_translator::app_config::{self, Config};
use dataset_translator::dataset::{self, Dataset};
use dataset_translator::language_utils;
use dataset_translator::pipeline::{CheckpointStore, Combiner, TranslationJob, describe_plan};
use dataset_translator::translation::{self, ChatTranslator, RateLimiter, RetryPolicy};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate the dataset and combine the results (default command)
    Translate(TranslateArgs),

    /// Merge existing checkpoint files into the combined output
    Combine(CombineArgs),

    /// Show the chunk plan and which chunks already have checkpoints
    Plan(PlanArgs),

    /// Generate shell completions for dataset-translator
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by every job command
#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json")]
    config_path: PathBuf,

    /// Directory for checkpoint files and the combined output
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Options selecting the part of the dataset to work on
#[derive(Args, Debug, Clone)]
struct RangeArgs {
    /// Input dataset file (JSON array of records)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Records per chunk / checkpoint file
    #[arg(long)]
    chunk_size: Option<usize>,

    /// First record index to process (resume offset)
    #[arg(short, long)]
    start: Option<usize>,

    /// Stop before this record index
    #[arg(short, long)]
    end: Option<usize>,

    /// Resume after the last contiguous checkpoint and skip chunks already saved
    #[arg(long)]
    auto_resume: bool,
}

#[derive(Args, Debug, Clone)]
struct TranslateArgs {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    range: RangeArgs,

    /// Target language tag (e.g. 'zh-Hant', 'fr', 'pt-BR')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Maximum number of records translated concurrently
    #[arg(short, long)]
    workers: Option<usize>,

    /// Calls admitted per rate-limit window
    #[arg(long)]
    max_calls: Option<u32>,

    /// Rate-limit window length in seconds
    #[arg(long)]
    window_secs: Option<u64>,

    /// Total attempts per field before giving up
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// API base URL of the completion service
    #[arg(long)]
    endpoint: Option<String>,

    /// API key for the completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Do not merge checkpoints after the last chunk
    #[arg(long)]
    no_combine: bool,

    /// Hide progress bars
    #[arg(long)]
    no_progress: bool,

    /// Start translating without a test request to the completion service
    #[arg(long)]
    skip_connection_check: bool,
}

#[derive(Args, Debug, Clone)]
struct CombineArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Combined output file name (inside the output directory)
    #[arg(long)]
    output: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct PlanArgs {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    range: RangeArgs,
}

/// dataset-translator - translate instruction datasets with AI
///
/// Translates every field of a JSON dataset through an OpenAI-compatible API,
/// chunk by chunk, saving a checkpoint file per chunk and combining them at the end.
#[derive(Parser, Debug)]
#[command(name = "dataset-translator")]
#[command(version)]
#[command(about = "Chunked, rate-limited dataset translation")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "dataset-translator translates instruction/response datasets with AI providers.

EXAMPLES:
    dataset-translator                                  # Translate using conf.json
    dataset-translator -t fr --chunk-size 500           # Translate to French, 500 records per chunk
    dataset-translator --start 40000 --end 55000        # Translate a slice of the dataset
    dataset-translator --auto-resume                    # Continue after existing checkpoints
    dataset-translator combine                          # Merge checkpoints only
    dataset-translator plan --auto-resume               # Show what a run would do
    dataset-translator completions bash > dt.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created. The API key is read from OPENAI_API_KEY or --api-key
    and is never written to the configuration file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger; the level can be changed later with `log::set_max_level`
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the configuration tells us otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "dataset-translator", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        Some(Commands::Combine(args)) => run_combine(args),
        Some(Commands::Plan(args)) => run_plan(args),
        None => run_translate(cli.translate).await,
    }
}

/// Load the configuration file and apply the options every command shares
fn load_config(common: &CommonArgs) -> Result<Config> {
    // Apply a command line log level before anything is logged
    if let Some(level) = &common.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&common.config_path)?;

    if let Some(output_dir) = &common.output_dir {
        config.output.dir = output_dir.clone();
    }
    match &common.log_level {
        Some(level) => config.log_level = level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    Ok(config)
}

fn apply_range(config: &mut Config, range: &RangeArgs) {
    if let Some(input) = &range.input {
        config.dataset.path = input.clone();
    }
    if let Some(chunk_size) = range.chunk_size {
        config.job.chunk_size = chunk_size;
    }
    if let Some(start) = range.start {
        config.job.start_offset = start;
    }
    if range.end.is_some() {
        config.job.end_offset = range.end;
    }
    if range.auto_resume {
        config.job.auto_resume = true;
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    let mut config = load_config(&options.common)?;
    apply_range(&mut config, &options.range);

    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(workers) = options.workers {
        config.job.workers = workers;
    }
    if let Some(max_calls) = options.max_calls {
        config.rate_limit.max_calls = max_calls;
    }
    if let Some(window_secs) = options.window_secs {
        config.rate_limit.window_secs = window_secs;
    }
    if let Some(max_attempts) = options.max_attempts {
        config.retry.max_attempts = max_attempts;
    }
    if let Some(model) = &options.model {
        config.provider.model = model.clone();
    }
    if let Some(endpoint) = &options.endpoint {
        config.provider.endpoint = endpoint.clone();
    }
    if let Some(api_key) = &options.api_key {
        config.provider.api_key = api_key.clone();
    }
    if options.no_combine {
        config.job.combine = false;
    }

    config.validate().context("Configuration validation failed")?;
    config.validate_credentials()?;

    dataset::ensure_local(&config.dataset.path, config.dataset.url.as_deref()).await?;
    let dataset = Dataset::load(&config.dataset.path)?;

    info!(
        "Translating into {} ({}) with {} ({} calls / {}s, {} attempts per field)",
        language_utils::get_language_name(&config.target_language),
        config.target_language,
        config.provider.model,
        config.rate_limit.max_calls,
        config.rate_limit.window_secs,
        config.retry.max_attempts
    );

    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit.max_calls,
        config.rate_limit.window(),
    ));
    let translator = ChatTranslator::new(&config.provider);
    if !options.skip_connection_check {
        // The check is a real completion call, so it takes a slot in the window
        limiter
            .throttle(translator.test_connection())
            .await
            .context("Could not reach the completion service (use --skip-connection-check to bypass)")?;
        info!("Connection to {} verified", config.provider.endpoint);
    }

    let stack = translation::build_stack(
        translator,
        limiter,
        RetryPolicy::new(config.retry.max_attempts),
    );
    let job = TranslationJob::new(config, stack).with_progress(!options.no_progress);
    let summary = job.run(&dataset).await?;

    if summary.chunks_skipped > 0 {
        info!("Skipped {} chunk(s) with existing checkpoints", summary.chunks_skipped);
    }
    if let Some(combine) = &summary.combine {
        info!("Combined output: {:?} ({} records)", combine.output, combine.records);
    }

    Ok(())
}

fn run_combine(options: CombineArgs) -> Result<()> {
    let mut config = load_config(&options.common)?;
    if let Some(output) = &options.output {
        config.output.combined_file = output.clone();
    }

    let combiner = Combiner::new(
        CheckpointStore::new(config.output.dir.clone()),
        config.output.combined_path(),
    );
    let summary = combiner.combine()?;

    if summary.files == 0 {
        warn!("No checkpoint files found in {:?}", config.output.dir);
    }
    println!(
        "Combined {} records from {} checkpoint file(s) into {}",
        summary.records,
        summary.files,
        summary.output.display()
    );

    Ok(())
}

fn run_plan(options: PlanArgs) -> Result<()> {
    let mut config = load_config(&options.common)?;
    apply_range(&mut config, &options.range);
    config.validate().context("Configuration validation failed")?;

    let dataset = Dataset::load(&config.dataset.path)?;
    let store = CheckpointStore::new(config.output.dir.clone());
    let plan = describe_plan(&config.job, &store, dataset.len())?;
    let done = plan.iter().filter(|c| c.done).count();
    for chunk in &plan {
        println!(
            "{:>24}  {}  {}",
            chunk.range.to_string(),
            if chunk.done { "done   " } else { "pending" },
            CheckpointStore::file_name(chunk.range)
        );
    }
    println!("{} chunk(s) planned, {} already checkpointed", plan.len(), done);

    Ok(())
}
