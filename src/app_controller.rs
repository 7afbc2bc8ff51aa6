use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::app_config::Config;
use crate::extraction::extract_book;
use crate::file_utils::FileManager;
use crate::logging::{SharedLog, StdLogSink};
use crate::translation::{create_model, BookTranslator, ProviderProfile, TranslationModel};
use crate::writer::{FileFormat, Writer};

// @module: Application controller for book translation

/// Main application controller: extract, translate, write
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Diagnostics sink handed to every component
    log: SharedLog,
    // @field: Whether to draw a progress bar on the terminal
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            log: StdLogSink::shared(),
            show_progress: true,
        })
    }

    pub fn with_log(mut self, log: SharedLog) -> Self {
        self.log = log;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run with the model selected by the configuration
    pub async fn run(&self, cancel: CancellationToken) -> Result<PathBuf> {
        let model = create_model(&self.config, self.log.clone())?;
        self.run_with_model(model, cancel).await
    }

    /// Translate the configured book with `model` and write the result.
    ///
    /// Returns the path of the written file. An unsupported output format is
    /// reported before the source is even opened.
    pub async fn run_with_model(&self, model: Arc<dyn TranslationModel>, cancel: CancellationToken) -> Result<PathBuf> {
        let start_time = Instant::now();
        let format: FileFormat = self.config.file_format.parse()?;

        let source = PathBuf::from(&self.config.book);
        if !FileManager::file_exists(&source) {
            return Err(anyhow!("Input file not found: {}", source.display()));
        }
        let pages = self.config.pages;
        let mut book = {
            let owned = source.clone();
            tokio::task::spawn_blocking(move || extract_book(&owned, pages))
                .await
                .context("Extraction task failed")?
                .with_context(|| format!("Failed to extract {}", source.display()))?
        };
        self.log.info(&format!(
            "Parsed {} pages ({} content units) from {}",
            book.page_count(),
            book.content_count(),
            source.display()
        ));

        let concurrency = ProviderProfile::for_provider(self.config.translation.provider)
            .effective_concurrent_requests(self.config.translation.common.concurrent_requests);

        let progress_bar = self.progress_bar(book.content_count() as u64);
        let bar = progress_bar.clone();
        let translator = BookTranslator::new(model, self.config.target_language.clone(), self.log.clone())
            .with_concurrency(concurrency)
            .with_cancellation(cancel)
            .with_progress(Arc::new(move |done: usize, total: usize| {
                bar.set_length(total as u64);
                bar.set_position(done as u64);
            }));

        let translation_start_time = Instant::now();
        let result = translator.translate_book(&mut book).await;
        progress_bar.finish_and_clear();
        let summary = result?;

        self.log.info(&format!(
            "Translated {} units ({} failed, {} skipped) in {}",
            summary.translated,
            summary.failed,
            summary.skipped,
            Self::format_duration(translation_start_time.elapsed())
        ));

        let writer = Writer::new(self.log.clone()).with_font_path(self.config.output.font_path.as_ref().map(PathBuf::from));
        let output = self.config.output_file.as_ref().map(PathBuf::from);
        let path = writer.save_as(&book, format, output.as_deref())?;

        self.log.info(&format!(
            "Finished in {}: {}",
            Self::format_duration(start_time.elapsed()),
            path.display()
        ));
        Ok(path)
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(total);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} units ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
