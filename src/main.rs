// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use weblingo::app_config::{Config, LogLevel, TranslationProvider};
use weblingo::app_controller::Controller;

/// CLI wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    OpenAI,
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

/// CLI wrapper for LogLevel to implement ValueEnum
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

/// weblingo - AI translation for static HTML sites
///
/// Translates every HTML document under the input directory into the
/// configured target languages, producing one output subtree per language.
#[derive(Parser, Debug)]
#[command(name = "weblingo")]
#[command(version = "0.1.0")]
#[command(about = "AI-powered static site translation")]
#[command(long_about = "weblingo extracts translatable content from static HTML documents, \
translates it through an LLM provider and writes one output subtree per target language.

EXAMPLES:
    weblingo                                  # Translate using weblingo.json
    weblingo -i site -o translated            # Override input and output directories
    weblingo -t es,fr,de                      # Override target languages
    weblingo -p openai -m gpt-4o              # Use specific provider and model
    weblingo --force                          # Ignore cached documents
    weblingo --log-level debug                # Verbose logging

CONFIGURATION:
    Configuration is stored in weblingo.json by default. You can specify a
    different config file with --config-path. If the config file doesn't
    exist, a default one will be created for you to fill in.

SUPPORTED PROVIDERS:
    openai    - OpenAI API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    /// Configuration file path
    #[arg(short, long, default_value = "weblingo.json")]
    config_path: String,

    /// Directory containing the source HTML documents
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Directory receiving the translated subtrees
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Comma-separated target language codes (e.g., 'es,fr,pt-BR')
    #[arg(short, long)]
    target_languages: Option<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// API key for the active provider
    #[arg(long, env = "WEBLINGO_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Retranslate everything, ignoring cached documents
    #[arg(short, long)]
    force: bool,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
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
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default.
    // The level is updated after loading the config if needed.
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &cli.log_level {
        let level: LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    // Load or create configuration
    let config = if Path::new(&cli.config_path).exists() {
        Config::from_file(&cli.config_path)
            .with_context(|| format!("Failed to load config file: {}", cli.config_path))?
    } else {
        warn!(
            "Config file not found at '{}', creating a default one. \
             Fill in the provider API key before running again.",
            cli.config_path
        );
        let config = Config::default();
        config.save_to_file(&cli.config_path)?;
        return Ok(());
    };

    let config = apply_overrides(config, &cli);

    // If log level was not set via command line, update it from config now
    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?.force_retranslation(cli.force);
    let report = controller.run().await?;

    if report.failed > 0 {
        warn!(
            "{} of {} tasks failed; see the run report for details",
            report.failed, report.total_tasks
        );
        std::process::exit(1);
    }

    Ok(())
}

/// Override config values with CLI options if provided
fn apply_overrides(mut config: Config, cli: &CommandLineOptions) -> Config {
    if let Some(input_dir) = &cli.input_dir {
        config.input_dir = input_dir.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(target_languages) = &cli.target_languages {
        config.target_languages = target_languages
            .split(',')
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
    }
    if let Some(provider) = &cli.provider {
        config.translation.provider = provider.clone().into();
    }

    let provider_str = config.translation.provider.to_lowercase_string();
    if let Some(model) = &cli.model {
        if let Some(provider_config) = config
            .translation
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            provider_config.model = model.clone();
        }
    }
    if let Some(api_key) = &cli.api_key {
        if let Some(provider_config) = config
            .translation
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            provider_config.api_key = api_key.clone();
        }
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    config
}
