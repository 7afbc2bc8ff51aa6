/*!
 * Book translation orchestrator.
 *
 * Walks a `Book` in document order, asks the model for a prompt per content
 * unit, submits it and records the outcome on that unit. Per-unit failures
 * are absorbed: the unit is marked failed and the walk continues. Only a
 * fatal provider error (rate limit budget exhausted) or cancellation stops
 * the run.
 *
 * With a concurrency above one, requests are dispatched through
 * `buffer_unordered`. Each result carries its `(page, index)` position, so
 * the book ends up exactly as a sequential run would leave it.
 */

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::book::{Book, ContentState};
use crate::errors::{ProviderError, TranslationError};
use crate::logging::SharedLog;
use crate::translation::model::TranslationModel;

/// Called with `(completed, total)` after every recorded unit
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Outcome counts of a translation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationSummary {
    /// Units that now carry a validated translation
    pub translated: usize,
    /// Units whose request or validation failed
    pub failed: usize,
    /// Units that were not submitted (images, or already processed)
    pub skipped: usize,
}

/// A prompt waiting to be submitted
#[derive(Debug, Clone)]
struct Job {
    page: usize,
    index: usize,
    prompt: String,
}

/// What recording a result means for the rest of the run
enum Outcome {
    Recorded,
    Cancelled,
    Fatal(ProviderError),
}

/// Drives a `TranslationModel` over a whole book
pub struct BookTranslator {
    model: Arc<dyn TranslationModel>,
    target_language: String,
    concurrency: usize,
    log: SharedLog,
    cancel: CancellationToken,
    progress: Option<ProgressCallback>,
}

impl BookTranslator {
    pub fn new(model: Arc<dyn TranslationModel>, target_language: impl Into<String>, log: SharedLog) -> Self {
        Self {
            model,
            target_language: target_language.into(),
            concurrency: 1,
            log,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    /// Maximum number of requests in flight; 1 keeps the walk strictly sequential
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Use an externally owned token, e.g. one cancelled on Ctrl-C
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Translate every pending unit of `book` in place
    pub async fn translate_book(&self, book: &mut Book) -> Result<TranslationSummary, TranslationError> {
        let mut summary = TranslationSummary::default();
        let jobs = self.collect_jobs(book, &mut summary);

        self.log.info(&format!(
            "Translating {} content units into {} with {} ({} concurrent)",
            jobs.len(),
            self.target_language,
            self.model.name(),
            self.concurrency
        ));

        if self.concurrency <= 1 {
            self.run_sequential(book, jobs, &mut summary).await?;
        } else {
            self.run_concurrent(book, jobs, &mut summary).await?;
        }

        self.log.info(&format!(
            "Translation finished: {} translated, {} failed, {} skipped",
            summary.translated, summary.failed, summary.skipped
        ));
        Ok(summary)
    }

    fn collect_jobs(&self, book: &Book, summary: &mut TranslationSummary) -> Vec<Job> {
        let mut jobs = Vec::new();

        for ((page, index), content) in book.contents() {
            if content.state() != ContentState::Pending {
                summary.skipped += 1;
                continue;
            }
            match self.model.make_prompt(content, &self.target_language) {
                Some(prompt) => {
                    self.log.debug(&prompt);
                    jobs.push(Job { page, index, prompt });
                }
                None => summary.skipped += 1,
            }
        }

        jobs
    }

    async fn run_sequential(
        &self,
        book: &mut Book,
        jobs: Vec<Job>,
        summary: &mut TranslationSummary,
    ) -> Result<(), TranslationError> {
        let total = jobs.len();

        for (done, job) in jobs.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(cancelled(summary));
            }

            let result = self.model.make_request(&job.prompt, &self.cancel).await;
            match self.record(book, job.page, job.index, result, summary) {
                Outcome::Recorded => self.report_progress(done + 1, total),
                Outcome::Cancelled => return Err(cancelled(summary)),
                Outcome::Fatal(error) => {
                    self.cancel.cancel();
                    return Err(TranslationError::Provider(error));
                }
            }
        }

        Ok(())
    }

    async fn run_concurrent(
        &self,
        book: &mut Book,
        jobs: Vec<Job>,
        summary: &mut TranslationSummary,
    ) -> Result<(), TranslationError> {
        let total = jobs.len();
        let model = &self.model;
        let cancel = &self.cancel;

        let mut results = stream::iter(jobs.into_iter().map(|job| async move {
            let result = if cancel.is_cancelled() {
                Err(ProviderError::Cancelled)
            } else {
                model.make_request(&job.prompt, cancel).await
            };
            (job.page, job.index, result)
        }))
        .buffer_unordered(self.concurrency);

        let mut done = 0;
        let mut fatal = None;
        let mut was_cancelled = false;

        while let Some((page, index, result)) = results.next().await {
            match self.record(book, page, index, result, summary) {
                Outcome::Recorded => {
                    done += 1;
                    self.report_progress(done, total);
                }
                Outcome::Cancelled => was_cancelled = true,
                Outcome::Fatal(error) => {
                    // Units still queued resolve to Cancelled without a request.
                    self.cancel.cancel();
                    if fatal.is_none() {
                        fatal = Some(error);
                    }
                }
            }
        }

        match fatal {
            Some(error) => Err(TranslationError::Provider(error)),
            None if was_cancelled => Err(cancelled(summary)),
            None => Ok(()),
        }
    }

    /// Write one request outcome back onto its content unit
    fn record(
        &self,
        book: &mut Book,
        page: usize,
        index: usize,
        result: Result<String, ProviderError>,
        summary: &mut TranslationSummary,
    ) -> Outcome {
        let Some(content) = book.content_mut(page, index) else {
            return Outcome::Recorded;
        };
        let location = format!("page {}, item {}", page + 1, index + 1);

        match result {
            Ok(text) => {
                self.log.debug(&text);
                match content.set_translation(text, true) {
                    Ok(()) if content.status() => summary.translated += 1,
                    Ok(()) => {
                        summary.failed += 1;
                        let reason = content
                            .rejection()
                            .map(|e| e.to_string())
                            .unwrap_or_else(|| "invalid response".to_string());
                        self.log.warn(&format!("Rejected {} translation on {}: {}", content.kind(), location, reason));
                    }
                    Err(e) => {
                        self.log.error(&format!("Cannot record translation on {}: {}", location, e));
                        content.mark_failed();
                        summary.failed += 1;
                    }
                }
                Outcome::Recorded
            }
            Err(ProviderError::Cancelled) => Outcome::Cancelled,
            Err(error) if error.is_fatal() => {
                self.log.error(&format!("{} failed: {}", location, error));
                Outcome::Fatal(error)
            }
            Err(error) => {
                self.log.warn(&format!("Translation of {} failed: {}", location, error));
                if let Err(e) = content.set_translation(String::new(), false) {
                    self.log.error(&format!("Cannot record failure on {}: {}", location, e));
                    content.mark_failed();
                }
                summary.failed += 1;
                Outcome::Recorded
            }
        }
    }

    fn report_progress(&self, done: usize, total: usize) {
        if let Some(progress) = &self.progress {
            progress(done, total);
        }
    }
}

fn cancelled(summary: &TranslationSummary) -> TranslationError {
    TranslationError::Cancelled {
        translated: summary.translated,
        failed: summary.failed,
    }
}
