// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use ai_translator::app_config::{self, Config, TranslationProvider};
use ai_translator::app_controller::Controller;
use ai_translator::file_utils::FileManager;

/// Debug log written next to the working directory on every run
const LOG_FILE: &str = "logs/translation.log";

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "chatglm", alias = "glm")]
    ChatGlm,
    #[value(name = "openai")]
    OpenAI,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::ChatGlm => TranslationProvider::ChatGlm,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
        }
    }
}

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
    /// Generate shell completions for ai-translator
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Translation model backend
    #[arg(short = 'm', long, value_enum)]
    model_type: Option<CliTranslationProvider>,

    /// URL of the ChatGLM model service
    #[arg(long)]
    chatglm_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// OpenAI model name (e.g., 'gpt-3.5-turbo')
    #[arg(long)]
    openai_model: Option<String>,

    /// OpenAI API key (defaults to OPENAI_API_KEY)
    #[arg(long)]
    openai_api_key: Option<String>,

    /// PDF file to translate
    #[arg(short, long)]
    book: Option<String>,

    /// Output format: pdf or markdown
    #[arg(short, long)]
    file_format: Option<String>,

    /// Output file path (default: <book>_translated.<ext>)
    #[arg(short, long)]
    output: Option<String>,

    /// Translate only the first N pages
    #[arg(short, long)]
    pages: Option<usize>,

    /// Target language code or name (e.g., 'zh', 'fr', 'Simplified Chinese')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Maximum number of requests in flight
    #[arg(long)]
    concurrency: Option<usize>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// AI Translator - translate PDF books with language models
#[derive(Parser, Debug)]
#[command(name = "ai-translator")]
#[command(version)]
#[command(about = "Translate PDF books with ChatGLM or OpenAI models")]
#[command(long_about = "AI Translator extracts the text and tables of a PDF book, translates them with a language model and writes the result as PDF or Markdown.

EXAMPLES:
    ai-translator --book tests/test.pdf                         # Translate using default config
    ai-translator -m openai --openai-model gpt-4o-mini -b a.pdf # Use a specific OpenAI model
    ai-translator -m chatglm --chatglm-url http://gpu:8000      # Use a local ChatGLM service
    ai-translator -b a.pdf -f pdf -t ja --pages 3               # First 3 pages to Japanese PDF
    ai-translator completions bash > ai-translator.bash         # Generate bash completions

CONFIGURATION:
    Configuration is stored in config.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically. Command line flags override config values.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    args: TranslateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
    file: Option<Mutex<File>>,
}

impl CustomLogger {
    // @initializes: Global logger; the file sink records debug output regardless of `level`
    fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
        let file = match log_file {
            Some(path) => match Self::open_log_file(path) {
                Ok(file) => Some(Mutex::new(file)),
                Err(e) => {
                    eprintln!("Cannot open log file {}: {}", path.display(), e);
                    None
                }
            },
            None => None,
        };

        let max_level = if file.is_some() { level.max(LevelFilter::Debug) } else { level };
        log::set_boxed_logger(Box::new(CustomLogger { level, file }))?;
        log::set_max_level(max_level);
        Ok(())
    }

    fn open_log_file(path: &Path) -> std::io::Result<File> {
        if let Some(parent) = path.parent() {
            FileManager::ensure_dir(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }

    /// Dependencies log HTTP internals at debug level; keep those out of the file
    fn is_own_or_important(record: &Record) -> bool {
        record.level() <= Level::Info || record.target().starts_with("ai_translator")
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level || (self.file.is_some() && metadata.level() <= Level::Debug)
    }

    fn log(&self, record: &Record) {
        if record.level() <= self.level {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }

        if let Some(file) = &self.file {
            if record.level() <= Level::Debug && Self::is_own_or_important(record) {
                let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                let _ = writeln!(file.lock(), "{} - {} - {}", now, record.level(), record.args());
            }
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
        if let Some(file) = &self.file {
            let _ = file.lock().flush();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "ai-translator", &mut std::io::stdout());
        return Ok(());
    }

    run_translate(cli.args).await
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    let created_config = !options.config.exists();
    let mut config = Config::load_or_create(&options.config)?;
    apply_overrides(&mut config, &options);

    CustomLogger::init(config.log_level.to_level_filter(), Some(Path::new(LOG_FILE)))?;

    if created_config {
        warn!(
            "Config file not found at '{}', created default config.",
            options.config.display()
        );
    }

    config.validate().context("Configuration validation failed")?;

    info!(
        "Translating {} into {} with {} ({})",
        config.book,
        config.target_language,
        config.translation.provider.display_name(),
        config.translation.get_model()
    );

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, abandoning requests in flight");
            interrupt.cancel();
        }
    });

    let controller = Controller::with_config(config)?;
    match controller.run(cancel).await {
        Ok(path) => {
            info!("Success: {}", path.display());
            Ok(())
        }
        Err(e) => {
            error!("{:#}", e);
            Err(e)
        }
    }
}

/// Command line values take precedence over the config file
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(provider) = &options.model_type {
        config.translation.provider = provider.clone().into();
    }

    if let Some(url) = &options.chatglm_url {
        config.translation.provider_config_mut(TranslationProvider::ChatGlm).endpoint = url.clone();
    }

    if let Some(model) = &options.openai_model {
        config.translation.provider_config_mut(TranslationProvider::OpenAI).model = model.clone();
    }

    if let Some(api_key) = &options.openai_api_key {
        config.translation.provider_config_mut(TranslationProvider::OpenAI).api_key = api_key.clone();
    }

    if let Some(timeout) = options.timeout {
        config.translation.active_provider_config_mut().timeout_secs = timeout;
    }

    if let Some(book) = &options.book {
        config.book = book.clone();
    }

    if let Some(file_format) = &options.file_format {
        config.file_format = file_format.clone();
    }

    if let Some(output) = &options.output {
        config.output_file = Some(output.clone());
    }

    if let Some(pages) = options.pages {
        config.pages = Some(pages);
    }

    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }

    if let Some(concurrency) = options.concurrency {
        config.translation.common.concurrent_requests = Some(concurrency);
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}
