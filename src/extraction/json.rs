/*!
 * Extraction from a JSON page dump.
 *
 * The dump is an array with one object per page:
 *
 * ```json
 * [{"text": "Page text", "tables": [[["Name", "Price"], ["Apple", "3"]]]}]
 * ```
 *
 * Both fields are optional. This lets documents extracted by another tool go
 * through the same translation pipeline.
 */

use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::ExtractionError;
use crate::extraction::{DocumentExtractor, ExtractedPage};

#[derive(Debug, Deserialize)]
struct DumpPage {
    #[serde(default)]
    text: String,
    #[serde(default)]
    tables: Vec<Vec<Vec<String>>>,
}

/// Extractor over pages already held in memory
#[derive(Debug, Clone, Default)]
pub struct JsonExtractor {
    pages: Vec<ExtractedPage>,
}

impl JsonExtractor {
    /// Read a page dump from disk
    pub fn open(path: &Path) -> Result<Self, ExtractionError> {
        let reader = BufReader::new(File::open(path)?);
        let dump: Vec<DumpPage> = serde_json::from_reader(reader)
            .map_err(|e| ExtractionError::Parse(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_dump(dump))
    }

    /// Parse a page dump from a string
    pub fn from_json(json: &str) -> Result<Self, ExtractionError> {
        let dump: Vec<DumpPage> = serde_json::from_str(json).map_err(|e| ExtractionError::Parse(e.to_string()))?;
        Ok(Self::from_dump(dump))
    }

    pub fn from_pages(pages: Vec<ExtractedPage>) -> Self {
        Self { pages }
    }

    fn from_dump(dump: Vec<DumpPage>) -> Self {
        let pages = dump
            .into_iter()
            .map(|page| ExtractedPage {
                text: page.text,
                tables: page.tables,
                images: Vec::new(),
            })
            .collect();
        Self { pages }
    }
}

impl DocumentExtractor for JsonExtractor {
    fn page_count(&self) -> Result<usize, ExtractionError> {
        Ok(self.pages.len())
    }

    fn extract_pages(&self, count: usize) -> Result<Vec<ExtractedPage>, ExtractionError> {
        Ok(self.pages.iter().take(count).cloned().collect())
    }
}
