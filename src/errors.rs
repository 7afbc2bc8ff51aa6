/*!
 * Error types for the ai-translator application.
 *
 * This module contains custom error types for the different stages of a run
 * (extraction, content validation, provider calls, orchestration and writing),
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// A single throttled response, may be retried
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Throttling persisted through every attempt of the retry budget
    #[error("Rate limit reached. Maximum attempts exceeded ({attempts} attempts)")]
    RateLimitExceeded {
        /// Number of attempts made before giving up
        attempts: u32,
    },

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The run was cancelled while the request was pending
    #[error("Request cancelled")]
    Cancelled,
}

impl ProviderError {
    /// Whether this error must terminate the whole run instead of a single content unit
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::RateLimitExceeded { .. } | Self::Cancelled)
    }

    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::Timeout(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

/// Errors raised by the content model when a translation does not fit its content kind
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    /// The value kind does not match the content kind
    #[error("Type mismatch: expected {expected} translation, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A translated table has a different column count than the original
    #[error("Column mismatch: expected {expected} columns, found {found}")]
    ColumnMismatch { expected: usize, found: usize },

    /// A row of a table does not have the table's column count
    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// The response could not be read as a delimited grid
    #[error("Malformed table: {0}")]
    MalformedTable(String),

    /// A table with no rows or no columns
    #[error("Table has no rows or columns")]
    EmptyTable,

    /// A table operation was attempted on non-table content
    #[error("Content is not a table")]
    NotATable,

    /// The original grid cannot change once the unit has been processed
    #[error("Original content is locked after translation")]
    OriginalLocked,

    /// A translated table was requested but none has been recorded
    #[error("No translation recorded")]
    MissingTranslation,

    /// Cell coordinates outside the table
    #[error("Cell ({row}, {col}) is outside a {rows}x{columns} table")]
    CellOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        columns: usize,
    },
}

/// Errors that can occur while turning a source document into a book
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// More pages were requested than the source document has
    #[error("Page out of range: Book has {book_pages} pages, but {requested_pages} pages were requested.")]
    PageOutOfRange {
        book_pages: usize,
        requested_pages: usize,
    },

    /// The source file extension has no extractor
    #[error("Unsupported source document: {0}")]
    UnsupportedSource(String),

    /// The source document could not be parsed
    #[error("Failed to parse source document: {0}")]
    Parse(String),

    /// Error reading the source document
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while writing the translated book
#[derive(Error, Debug)]
pub enum WriterError {
    /// The requested output format is not supported
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Error producing the output document
    #[error("Render error: {0}")]
    Render(String),

    /// Error writing the output file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run-level errors that stop the translation of a book
#[derive(Error, Debug)]
pub enum TranslationError {
    /// A provider error that cannot be absorbed per content unit
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The run was cancelled before every content unit was processed
    #[error("Translation cancelled after {translated} translated and {failed} failed units")]
    Cancelled { translated: usize, failed: usize },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from extraction
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the content model
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from the writer
    #[error("Writer error: {0}")]
    Writer(#[from] WriterError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
