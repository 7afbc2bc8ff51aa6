/*!
 * Turning a source document into a `Book`.
 *
 * Extractors only report raw per-page text, tables and images through the
 * `DocumentExtractor` trait. `parse_book` owns the shared rules: the page
 * range check, removal of table text from the page text, and the order of
 * content units within a page.
 *
 * - `pdf`: PDF documents, read with unpdf
 * - `json`: pre-extracted page dumps
 */

use log::debug;
use std::path::Path;

use crate::book::{Book, Content, ImageData, Page, Table};
use crate::errors::ExtractionError;

pub mod json;
pub mod pdf;

pub use json::JsonExtractor;
pub use pdf::PdfExtractor;

/// Raw content of one source page, before assembly into content units
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPage {
    /// Page text, possibly still containing the text of its tables
    pub text: String,
    /// Tables in source order; rows may be ragged
    pub tables: Vec<Vec<Vec<String>>>,
    /// Embedded images in source order
    pub images: Vec<ImageData>,
}

/// Source of raw page content
pub trait DocumentExtractor {
    /// Total number of pages in the source document
    fn page_count(&self) -> Result<usize, ExtractionError>;

    /// Raw content of the first `count` pages
    fn extract_pages(&self, count: usize) -> Result<Vec<ExtractedPage>, ExtractionError>;
}

/// Pick an extractor from the source file extension
pub fn extractor_for(path: &Path) -> Result<Box<dyn DocumentExtractor>, ExtractionError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => Ok(Box::new(PdfExtractor::new(path))),
        "json" => Ok(Box::new(JsonExtractor::open(path)?)),
        _ => Err(ExtractionError::UnsupportedSource(path.display().to_string())),
    }
}

/// Extract a book from the file at `path`, limited to the first `pages` pages
pub fn extract_book(path: &Path, pages: Option<usize>) -> Result<Book, ExtractionError> {
    let extractor = extractor_for(path)?;
    parse_book(path, extractor.as_ref(), pages)
}

/// Build a book from an extractor
///
/// The page range is checked before any page content is extracted.
pub fn parse_book(
    source_path: &Path,
    extractor: &dyn DocumentExtractor,
    pages: Option<usize>,
) -> Result<Book, ExtractionError> {
    let book_pages = extractor.page_count()?;
    let requested_pages = pages.unwrap_or(book_pages);

    if requested_pages > book_pages {
        return Err(ExtractionError::PageOutOfRange {
            book_pages,
            requested_pages,
        });
    }

    let mut book = Book::new(source_path);
    for (index, raw) in extractor.extract_pages(requested_pages)?.into_iter().take(requested_pages).enumerate() {
        let page = assemble_page(raw);
        debug!("Page {}: {} content units", index + 1, page.len());
        book.push_page(page);
    }

    Ok(book)
}

/// Text first, then one unit per table, then images
fn assemble_page(raw: ExtractedPage) -> Page {
    let tables: Vec<Table> = raw.tables.into_iter().filter_map(Table::padded).collect();

    let mut text = raw.text;
    for cell in tables.iter().flat_map(Table::cell_texts) {
        text = text.replacen(cell.trim(), "", 1);
    }

    let mut page = Page::new();
    let text = clean_text(&text);
    if !text.is_empty() {
        page.push(Content::text(text));
    }
    for table in tables {
        page.push(Content::table(table));
    }
    for image in raw.images {
        page.push(Content::image(image));
    }
    page
}

/// Trim every line and drop blank ones
fn clean_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
