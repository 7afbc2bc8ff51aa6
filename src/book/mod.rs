/*!
 * Document model: a book made of pages made of content units.
 *
 * - `content`: typed content units and their translation state
 * - `table`: rectangular string tables and their delimited text form
 */

use std::path::{Path, PathBuf};

pub mod content;
pub mod table;

pub use content::{Content, ContentKind, ContentState, ContentValue, ImageData, TableSource};
pub use table::Table;

/// An ordered sequence of content units, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    contents: Vec<Content>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: Vec<Content>) -> Self {
        Self { contents }
    }

    pub fn push(&mut self, content: Content) {
        self.contents.push(content);
    }

    pub fn contents(&self) -> &[Content] {
        &self.contents
    }

    pub fn contents_mut(&mut self) -> &mut [Content] {
        &mut self.contents
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// A source document and its pages
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    source_path: PathBuf,
    pages: Vec<Page>,
}

impl Book {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            pages: Vec::new(),
        }
    }

    pub fn with_pages(source_path: impl Into<PathBuf>, pages: Vec<Page>) -> Self {
        Self {
            source_path: source_path.into(),
            pages,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn push_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total number of content units across all pages
    pub fn content_count(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    /// Every content unit with its `(page, index)` position, in document order
    pub fn contents(&self) -> impl Iterator<Item = ((usize, usize), &Content)> {
        self.pages.iter().enumerate().flat_map(|(p, page)| {
            page.contents().iter().enumerate().map(move |(c, content)| ((p, c), content))
        })
    }

    /// Content unit at a `(page, index)` position
    pub fn content_mut(&mut self, page: usize, index: usize) -> Option<&mut Content> {
        self.pages.get_mut(page)?.contents.get_mut(index)
    }

    /// Count of content units in each state: `(pending, translated, failed)`
    pub fn state_counts(&self) -> (usize, usize, usize) {
        self.contents().fold((0, 0, 0), |(pending, translated, failed), (_, content)| {
            match content.state() {
                ContentState::Pending => (pending + 1, translated, failed),
                ContentState::Translated => (pending, translated + 1, failed),
                ContentState::Failed => (pending, translated, failed + 1),
            }
        })
    }
}
