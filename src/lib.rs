/*!
 * # AI Translator - PDF book translation with language models
 *
 * A Rust library that extracts the text and tables of a PDF book, translates
 * them with a language model and writes the translation as PDF or Markdown.
 *
 * ## Features
 *
 * - Extract pages from PDF files (or pre-extracted JSON page dumps)
 * - Translate text and tables using:
 *   - ChatGLM (local model service)
 *   - OpenAI API (chat and legacy completion models)
 * - Tables round-trip through a strict CSV exchange format
 * - Rate-limit aware retries and optional bounded concurrency
 * - Markdown and PDF output
 *
 * ## Architecture
 *
 * - `book`: Content and document model (`Book`, `Page`, `Content`, `Table`)
 * - `extraction`: Source document readers and page assembly
 * - `providers`: HTTP clients for the supported backends
 * - `translation`: Prompts, retry policy, translation model and the book orchestrator
 * - `writer`: Layout and rendering of translated books
 * - `logging`: Injected logging capability
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![cfg_attr(test, allow(non_snake_case))]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod book;
pub mod errors;
pub mod extraction;
pub mod file_utils;
pub mod language_utils;
pub mod logging;
pub mod providers;
pub mod translation;
pub mod writer;

// Re-export main types for easier usage
pub use app_config::Config;
pub use book::{Book, Content, ContentKind, ContentState, ContentValue, Page, Table};
pub use errors::{AppError, ContentError, ExtractionError, ProviderError, TranslationError, WriterError};
pub use language_utils::{get_language_name, normalize_to_part2t};
pub use translation::{BookTranslator, TranslationModel, TranslationSummary};
pub use writer::{FileFormat, Writer};
