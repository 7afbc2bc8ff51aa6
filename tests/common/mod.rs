/*!
 * Common test utilities for the ai-translator test suite
 */

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use ai_translator::app_config::Config;
use ai_translator::book::{Book, Content, Page, Table};
use ai_translator::file_utils::FileManager;
use ai_translator::logging::CaptureLog;
use ai_translator::providers::mock::MockProvider;
use ai_translator::translation::{ModelTranslator, RetryPolicy, TranslationModel};

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    FileManager::write_to_file(&file_path, content)?;
    Ok(file_path)
}

/// Writes a page dump of `pages` pages; page 1 also carries a price table
pub fn create_test_book(dir: &Path, filename: &str, pages: usize) -> Result<PathBuf> {
    let dump: Vec<serde_json::Value> = (1..=pages)
        .map(|n| {
            if n == 1 {
                serde_json::json!({
                    "text": "Page 1 text\nName Price\nApple 3",
                    "tables": [[["Name", "Price"], ["Apple", "3"]]]
                })
            } else {
                serde_json::json!({ "text": format!("Page {} text", n) })
            }
        })
        .collect();
    create_test_file(dir, filename, &serde_json::to_string_pretty(&dump)?)
}

/// Config pointing at `book`, writing Markdown
pub fn test_config(book: &Path) -> Config {
    let mut config = Config::default();
    config.book = book.display().to_string();
    config.file_format = "markdown".to_string();
    config
}

pub fn table(rows: &[&[&str]]) -> Table {
    Table::new(rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect())
        .expect("test table should be rectangular")
}

pub fn price_table() -> Table {
    table(&[&["Name", "Price"], &["Apple", "3"], &["Pear", "5"]])
}

/// One page with a text unit followed by a table unit
pub fn text_and_table_book() -> Book {
    Book::with_pages(
        "book.pdf",
        vec![Page::with_contents(vec![
            Content::text("Hello"),
            Content::table(price_table()),
        ])],
    )
}

/// A mock-backed model with a fast retry policy
pub fn mock_model(provider: MockProvider, policy: RetryPolicy) -> Arc<dyn TranslationModel> {
    Arc::new(ModelTranslator::new("Mock", provider, policy, Arc::new(CaptureLog::new())))
}
