/*!
 * Tests for translating whole books through a mock-backed model
 */

use log::Level;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ai_translator::book::{Book, Content, ContentState, Page};
use ai_translator::errors::{ProviderError, TranslationError};
use ai_translator::logging::CaptureLog;
use ai_translator::providers::mock::{MockProvider, MockRequest};
use ai_translator::translation::{BookTranslator, RetryPolicy};

use crate::common::{mock_model, price_table, text_and_table_book};

fn fast_rate_limited() -> RetryPolicy {
    RetryPolicy::rate_limited(3, Duration::from_millis(5), Duration::from_millis(1))
}

fn numbered_book(pages: usize, per_page: usize) -> Book {
    let pages = (0..pages)
        .map(|p| {
            Page::with_contents(
                (0..per_page)
                    .map(|i| Content::text(format!("unit {}-{}", p, i)))
                    .collect(),
            )
        })
        .collect();
    Book::with_pages("numbered.pdf", pages)
}

fn translated_texts(book: &Book) -> Vec<String> {
    book.contents()
        .filter_map(|(_, c)| c.translated_text().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_translateBook_withEchoModel_shouldRoundTripTables() {
    let mut book = text_and_table_book();
    let translator = BookTranslator::new(
        mock_model(MockProvider::working(), RetryPolicy::single_attempt()),
        "zh",
        Arc::new(CaptureLog::new()),
    );

    let summary = translator.translate_book(&mut book).await.unwrap();

    assert_eq!(summary.translated, 2);
    let table = book.pages()[0].contents()[1].translated_table().unwrap();
    assert_eq!(table, &price_table());
}

/// Throttling that never ends stops the run after three requests
#[tokio::test]
async fn test_translateBook_withConstantRateLimit_shouldStopAfterThreeCalls() {
    let provider = MockProvider::rate_limited();
    let mut book = text_and_table_book();
    let translator = BookTranslator::new(
        mock_model(provider.clone(), fast_rate_limited()),
        "zh",
        Arc::new(CaptureLog::new()),
    );

    let result = translator.translate_book(&mut book).await;

    assert!(matches!(
        result,
        Err(TranslationError::Provider(ProviderError::RateLimitExceeded { attempts: 3 }))
    ));
    assert_eq!(provider.request_count(), 3);
    assert_eq!(book.state_counts(), (2, 0, 0));
}

#[tokio::test]
async fn test_translateBook_withRecoveringRateLimit_shouldSucceed() {
    let provider = MockProvider::rate_limited_times(2);
    let mut book = Book::with_pages("a.pdf", vec![Page::with_contents(vec![Content::text("Hello")])]);
    let log = CaptureLog::new();
    let translator = BookTranslator::new(mock_model(provider.clone(), fast_rate_limited()), "zh", Arc::new(log));

    let summary = translator.translate_book(&mut book).await.unwrap();

    assert_eq!(summary.translated, 1);
    assert_eq!(provider.request_count(), 3);
    assert_eq!(translated_texts(&book), vec!["Hello"]);
}

/// Prose in place of a grid fails the table only
#[tokio::test]
async fn test_translateBook_withMalformedTableResponse_shouldFailTableSoftly() {
    let mut book = text_and_table_book();
    let log = CaptureLog::new();
    let translator = BookTranslator::new(
        mock_model(MockProvider::malformed(), RetryPolicy::single_attempt()),
        "zh",
        Arc::new(log.clone()),
    );

    let summary = translator.translate_book(&mut book).await.unwrap();

    assert_eq!(summary.translated, 1);
    assert_eq!(summary.failed, 1);
    let contents = book.pages()[0].contents();
    assert!(contents[0].status());
    assert_eq!(contents[1].state(), ContentState::Failed);
    assert!(log.contains(Level::Warn, "Rejected table translation on page 1, item 2"));
}

#[tokio::test]
async fn test_translateBook_withServerErrors_shouldAbsorbFailures() {
    let mut book = numbered_book(2, 2);
    let translator = BookTranslator::new(
        mock_model(MockProvider::intermittent(2), RetryPolicy::single_attempt()),
        "zh",
        Arc::new(CaptureLog::new()),
    );

    let summary = translator.translate_book(&mut book).await.unwrap();

    assert_eq!((summary.translated, summary.failed), (2, 2));
    assert_eq!(translated_texts(&book), vec!["unit 0-0", "unit 1-0"]);
}

/// Earlier units answer last, so completions arrive in reverse dispatch order
#[tokio::test]
async fn test_translateBook_concurrently_withReversedCompletion_shouldPreserveOrder() {
    static COMPLETED: Mutex<Vec<String>> = Mutex::new(Vec::new());

    fn tagged(request: &MockRequest) -> String {
        format!("[zh] {}", request.payload())
    }

    fn tagged_and_recorded(request: &MockRequest) -> String {
        COMPLETED.lock().unwrap().push(request.payload().to_string());
        tagged(request)
    }

    // "unit p-i" on a 3x4 book: unit 0-0 waits longest, unit 2-3 shortest
    fn reverse_index_delay(request: &MockRequest) -> u64 {
        let (page, item) = request
            .payload()
            .trim_start_matches("unit ")
            .split_once('-')
            .unwrap();
        let index: u64 = page.parse::<u64>().unwrap() * 4 + item.parse::<u64>().unwrap();
        (12 - index) * 4
    }

    let mut sequential = numbered_book(3, 4);
    let mut concurrent = sequential.clone();

    BookTranslator::new(
        mock_model(MockProvider::working().with_custom_response(tagged), RetryPolicy::single_attempt()),
        "zh",
        Arc::new(CaptureLog::new()),
    )
    .translate_book(&mut sequential)
    .await
    .unwrap();

    let provider = MockProvider::working()
        .with_delay(reverse_index_delay)
        .with_custom_response(tagged_and_recorded);
    BookTranslator::new(
        mock_model(provider, RetryPolicy::single_attempt()),
        "zh",
        Arc::new(CaptureLog::new()),
    )
    .with_concurrency(4)
    .translate_book(&mut concurrent)
    .await
    .unwrap();

    let completed = COMPLETED.lock().unwrap().clone();
    assert_eq!(completed.len(), 12);
    assert_eq!(completed[0], "unit 0-3");
    assert_ne!(completed[0], "unit 0-0");

    assert_eq!(translated_texts(&concurrent), translated_texts(&sequential));
    assert_eq!(translated_texts(&concurrent)[0], "[zh] unit 0-0");
    assert_eq!(translated_texts(&concurrent)[5], "[zh] unit 1-1");
}

/// An empty reply fails its unit instead of translating it to nothing
#[tokio::test]
async fn test_translateBook_withEmptyReplies_shouldMarkUnitsFailed() {
    let mut book = numbered_book(1, 2);
    let translator = BookTranslator::new(
        mock_model(MockProvider::empty(), RetryPolicy::single_attempt()),
        "zh",
        Arc::new(CaptureLog::new()),
    );

    let summary = translator.translate_book(&mut book).await.unwrap();

    assert_eq!((summary.translated, summary.failed), (0, 2));
    assert_eq!(book.state_counts(), (0, 0, 2));
    assert!(translated_texts(&book).is_empty());
}

#[tokio::test]
async fn test_translateBook_withCancelledToken_shouldLeaveUnitsPending() {
    let provider = MockProvider::working();
    let mut book = numbered_book(1, 3);
    let translator = BookTranslator::new(
        mock_model(provider.clone(), RetryPolicy::single_attempt()),
        "zh",
        Arc::new(CaptureLog::new()),
    );
    translator.cancellation_token().cancel();

    let result = translator.translate_book(&mut book).await;

    assert!(matches!(result, Err(TranslationError::Cancelled { translated: 0, failed: 0 })));
    assert_eq!(provider.request_count(), 0);
    assert_eq!(book.state_counts(), (3, 0, 0));
}

/// A second run only sends what the first one left pending
#[tokio::test]
async fn test_translateBook_twice_shouldSkipProcessedUnits() {
    let provider = MockProvider::working();
    let mut book = numbered_book(1, 2);
    let translator = BookTranslator::new(
        mock_model(provider.clone(), RetryPolicy::single_attempt()),
        "zh",
        Arc::new(CaptureLog::new()),
    );

    translator.translate_book(&mut book).await.unwrap();
    let summary = translator.translate_book(&mut book).await.unwrap();

    assert_eq!(summary.skipped, 2);
    assert_eq!(provider.request_count(), 2);
}
