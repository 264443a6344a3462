// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use doctrans::app_config::{Config, LogLevel};
use doctrans::app_controller::Controller;
use doctrans::file_utils::FileManager;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a document or a directory of documents (default command)
    #[command(alias = "translate")]
    Translate(TranslateArgs),

    /// Generate shell completions for doctrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input document or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output directory for translated documents
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Extra tokens to protect from translation (repeatable)
    #[arg(long = "protect", value_name = "TOKEN")]
    protect_tokens: Vec<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// doctrans - Structure-Preserving AI Document Translation
///
/// Translates DOCX documents with an AI provider while keeping formatting,
/// tables, headings, and protected identifiers intact.
#[derive(Parser, Debug)]
#[command(name = "doctrans")]
#[command(version = "0.3.0")]
#[command(about = "AI-powered structure-preserving document translation")]
#[command(long_about = "doctrans translates the text of DOCX documents while preserving their
structure: run formatting, table layout, and heading levels survive, and
protected tokens (platform names, protocols, project identifiers) pass
through translation verbatim.

EXAMPLES:
    doctrans report.docx -t fr                  # Translate one document to French
    doctrans -f report.docx -t de               # Force overwrite existing output
    doctrans docs/ -t es -o out/                # Translate a whole directory
    doctrans --protect MyProduct report.docx -t fr
    doctrans --log-level debug report.docx -t ja
    doctrans completions bash > doctrans.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input document or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Output directory for translated documents
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Extra tokens to protect from translation (repeatable)
    #[arg(long = "protect", value_name = "TOKEN")]
    protect_tokens: Vec<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Timestamped, colorized stderr logger
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    fn decoration_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌ "),
            Level::Warn => ("1;33", "🚧 "),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍 "),
            Level::Trace => ("1;35", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, emoji) = Self::decoration_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                emoji,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "doctrans", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Default behavior - use top-level args for a bare invocation
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

            let translate_args = TranslateArgs {
                input_path,
                output_dir: cli.output_dir,
                force_overwrite: cli.force_overwrite,
                model: cli.model,
                source_language: cli.source_language,
                target_language: cli.target_language,
                protect_tokens: cli.protect_tokens,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_translate(translate_args).await
        }
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: LogLevel = cmd_log_level.clone().into();
        log::set_max_level(to_level_filter(config_log_level));
    }

    let config_path = &options.config_path;
    let mut config = if std::path::Path::new(config_path).exists() {
        Config::from_file(config_path)
            .context(format!("Failed to load config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config
            .save(config_path)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    // Override config with CLI options if provided
    if let Some(model) = &options.model {
        config.translation.model = model.clone();
    }
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    config
        .protection
        .custom_tokens
        .extend(options.protect_tokens.iter().cloned());
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(to_level_filter(config.log_level));
    }

    let controller = Controller::with_config(config)?;

    if FileManager::dir_exists(&options.input_path) {
        controller
            .run_folder(options.input_path, options.output_dir, options.force_overwrite)
            .await
    } else {
        controller
            .run(options.input_path, options.output_dir, options.force_overwrite)
            .await
    }
}

fn to_level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}
