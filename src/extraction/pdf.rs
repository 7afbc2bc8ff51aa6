/*!
 * PDF extraction backed by unpdf.
 *
 * Paragraph and raw blocks become page text, table blocks become tables and
 * image blocks carry their embedded resource bytes.
 */

use std::path::{Path, PathBuf};

use unpdf::{Block, Document, PageSelection, ParseOptions, PdfParser};

use crate::book::ImageData;
use crate::errors::ExtractionError;
use crate::extraction::{DocumentExtractor, ExtractedPage};

/// Extractor for PDF files
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    path: PathBuf,
}

impl PdfExtractor {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn open(&self, options: ParseOptions) -> Result<PdfParser, ExtractionError> {
        if !self.path.exists() {
            return Err(ExtractionError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Source document does not exist: {}", self.path.display()),
            )));
        }

        PdfParser::open_with_options(&self.path, options).map_err(|e| ExtractionError::Parse(e.to_string()))
    }
}

impl DocumentExtractor for PdfExtractor {
    fn page_count(&self) -> Result<usize, ExtractionError> {
        let parser = self.open(ParseOptions::new().text_only())?;
        Ok(parser.page_count() as usize)
    }

    fn extract_pages(&self, count: usize) -> Result<Vec<ExtractedPage>, ExtractionError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let last = u32::try_from(count).map_err(|_| ExtractionError::Parse(format!("Too many pages: {}", count)))?;
        let parser = self.open(ParseOptions::new().with_pages(PageSelection::Range(1..=last)))?;
        let document = parser.parse().map_err(|e| ExtractionError::Parse(e.to_string()))?;

        Ok(pages_from_document(&document))
    }
}

fn pages_from_document(document: &Document) -> Vec<ExtractedPage> {
    document
        .pages
        .iter()
        .map(|page| {
            let mut extracted = ExtractedPage::default();
            let mut lines = Vec::new();

            for block in &page.elements {
                match block {
                    Block::Paragraph(paragraph) => lines.push(paragraph.plain_text()),
                    Block::Raw { content } => lines.push(content.clone()),
                    Block::Table(table) => extracted.tables.push(
                        table
                            .rows
                            .iter()
                            .map(|row| row.cells.iter().map(|cell| cell.plain_text().trim().to_string()).collect())
                            .collect(),
                    ),
                    Block::Image { resource_id, .. } => {
                        if let Some(resource) = document.resources.get(resource_id) {
                            extracted.images.push(ImageData {
                                bytes: resource.data.clone(),
                                mime_type: Some(resource.mime_type.clone()),
                                width: resource.width,
                                height: resource.height,
                            });
                        }
                    }
                    _ => {}
                }
            }

            extracted.text = lines.join("\n");
            extracted
        })
        .collect()
}
