/*!
 * Output of translated books.
 *
 * Writing happens in two steps. `layout` flattens a book into a list of
 * blocks holding only the units whose translation succeeded, with a page
 * break between consecutive pages. A `Renderer` then turns those blocks into
 * the bytes of one output format.
 */

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::book::{Book, ContentValue, Table};
use crate::errors::WriterError;
use crate::file_utils::FileManager;
use crate::logging::SharedLog;

pub mod markdown;
pub mod pdf;

pub use self::markdown::MarkdownRenderer;
pub use self::pdf::PdfRenderer;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Pdf,
    Markdown,
}

impl FileFormat {
    /// File extension used for derived output paths
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Markdown => "md",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Markdown => "markdown",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = WriterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(WriterError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// One element of the flattened output
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutBlock<'a> {
    Paragraph(&'a str),
    Table(&'a Table),
    PageBreak,
}

/// Flatten the successfully translated content of `book`, in document order
pub fn layout(book: &Book) -> Vec<LayoutBlock<'_>> {
    let pages = book.pages();
    let mut blocks = Vec::new();

    for (index, page) in pages.iter().enumerate() {
        for content in page.contents().iter().filter(|c| c.status()) {
            match content.translation() {
                Some(ContentValue::Text(text)) => blocks.push(LayoutBlock::Paragraph(text)),
                Some(ContentValue::Table(table)) => blocks.push(LayoutBlock::Table(table)),
                Some(ContentValue::Image(_)) | None => {}
            }
        }
        if index + 1 < pages.len() {
            blocks.push(LayoutBlock::PageBreak);
        }
    }

    blocks
}

/// Turns layout blocks into a complete output document
pub trait Renderer {
    fn render(&self, blocks: &[LayoutBlock<'_>]) -> Result<Vec<u8>, WriterError>;
}

/// Saves translated books to disk
#[derive(Debug, Clone)]
pub struct Writer {
    log: SharedLog,
    font_path: Option<PathBuf>,
}

impl Writer {
    pub fn new(log: SharedLog) -> Self {
        Self { log, font_path: None }
    }

    /// TrueType font for PDF output; the built-in Helvetica cannot show CJK text
    pub fn with_font_path(mut self, font_path: Option<PathBuf>) -> Self {
        self.font_path = font_path;
        self
    }

    /// Save `book` in the named format.
    ///
    /// The format is checked before anything is rendered or written. Without
    /// an explicit `output`, the file goes next to the source as
    /// `<stem>_translated.<ext>`.
    pub fn save_translated_book(
        &self,
        book: &Book,
        file_format: &str,
        output: Option<&Path>,
    ) -> Result<PathBuf, WriterError> {
        let format = file_format.parse::<FileFormat>()?;
        self.save_as(book, format, output)
    }

    pub fn save_as(&self, book: &Book, format: FileFormat, output: Option<&Path>) -> Result<PathBuf, WriterError> {
        let path = match output {
            Some(path) => path.to_path_buf(),
            None => FileManager::translated_output_path(book.source_path(), format.extension()),
        };

        self.log.info(&format!("Source: {}", book.source_path().display()));
        self.log.info(&format!("Writing {} output to {}", format, path.display()));

        let blocks = layout(book);
        let bytes = match format {
            FileFormat::Markdown => MarkdownRenderer.render(&blocks)?,
            FileFormat::Pdf => {
                if self.font_path.is_none() && pdf::needs_unicode_font(&blocks) {
                    self.log.warn("Output contains characters Helvetica cannot show; set output.font_path to a TrueType font");
                }
                PdfRenderer::new(self.font_path.clone()).render(&blocks)?
            }
        };

        FileManager::write_bytes(&path, &bytes)?;
        self.log.info(&format!("Translation saved: {}", path.display()));
        Ok(path)
    }
}
