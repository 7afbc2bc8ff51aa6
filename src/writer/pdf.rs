/*!
 * PDF rendering with `printpdf`.
 *
 * Blocks are laid out top to bottom on A4 pages. Text is wrapped by a
 * character budget derived from the font size, counting East Asian wide
 * characters double. Tables use equal-width columns with a bold header row.
 */

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::book::Table;
use crate::errors::WriterError;
use crate::writer::{LayoutBlock, Renderer};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const FONT_SIZE: f32 = 11.0;
const HEADER_FONT_SIZE: f32 = 12.0;
const CELL_PADDING: f32 = 2.0;
const MM_PER_POINT: f32 = 0.3528;
const LAYER_NAME: &str = "Layer 1";

/// Renders layout blocks as an A4 PDF document
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    font_path: Option<PathBuf>,
}

impl PdfRenderer {
    pub fn new(font_path: Option<PathBuf>) -> Self {
        Self { font_path }
    }

    fn load_fonts(&self, doc: &PdfDocumentReference) -> Result<(IndirectFontRef, IndirectFontRef), WriterError> {
        match &self.font_path {
            Some(path) => {
                let font = doc
                    .add_external_font(BufReader::new(File::open(path)?))
                    .map_err(|e| WriterError::Render(format!("{}: {}", path.display(), e)))?;
                Ok((font.clone(), font))
            }
            None => {
                let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(render_error)?;
                let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(render_error)?;
                Ok((regular, bold))
            }
        }
    }
}

impl Renderer for PdfRenderer {
    fn render(&self, blocks: &[LayoutBlock<'_>]) -> Result<Vec<u8>, WriterError> {
        let (doc, page, layer) = PdfDocument::new("Translated book", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        let (regular, bold) = self.load_fonts(&doc)?;

        {
            let mut canvas = Canvas {
                layer: doc.get_page(page).get_layer(layer),
                doc: &doc,
                y: PAGE_HEIGHT - MARGIN,
            };

            for block in blocks {
                match block {
                    LayoutBlock::Paragraph(text) => canvas.paragraph(text, &regular),
                    LayoutBlock::Table(table) => canvas.table(table, &regular, &bold),
                    LayoutBlock::PageBreak => canvas.new_page(),
                }
            }
        }

        doc.save_to_bytes().map_err(render_error)
    }
}

fn render_error(error: printpdf::Error) -> WriterError {
    WriterError::Render(error.to_string())
}

/// Write position on the current page
struct Canvas<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    /// Baseline of the last written line, in mm from the bottom edge
    y: f32,
}

impl Canvas<'_> {
    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height < MARGIN {
            self.new_page();
        }
    }

    fn paragraph(&mut self, text: &str, font: &IndirectFontRef) {
        let line_height = line_height(FONT_SIZE);
        for line in wrap_text(text, char_budget(CONTENT_WIDTH, FONT_SIZE)) {
            self.ensure_space(line_height);
            self.y -= line_height;
            self.layer.use_text(line, FONT_SIZE, Mm(MARGIN), Mm(self.y), font);
        }
        self.y -= line_height / 2.0;
    }

    fn table(&mut self, table: &Table, regular: &IndirectFontRef, bold: &IndirectFontRef) {
        let columns = table.column_count().max(1);
        let column_width = CONTENT_WIDTH / columns as f32;

        for (row_index, row) in table.rows().iter().enumerate() {
            let (font, size) = if row_index == 0 {
                (bold, HEADER_FONT_SIZE)
            } else {
                (regular, FONT_SIZE)
            };
            let budget = char_budget(column_width - CELL_PADDING, size);
            let line_height = line_height(size);

            let cells: Vec<Vec<String>> = row.iter().map(|cell| wrap_text(cell, budget)).collect();
            let row_lines = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
            let row_height = (row_lines as f32 * line_height).min(PAGE_HEIGHT - 2.0 * MARGIN);

            self.ensure_space(row_height);
            let top = self.y;
            for (column, lines) in cells.iter().enumerate() {
                let x = MARGIN + column as f32 * column_width;
                for (line_index, line) in lines.iter().enumerate() {
                    let y = top - (line_index + 1) as f32 * line_height;
                    if y < MARGIN {
                        break;
                    }
                    self.layer.use_text(line.as_str(), size, Mm(x), Mm(y), font);
                }
            }
            self.y = top - row_height;
        }
        self.y -= line_height(FONT_SIZE);
    }
}

fn line_height(font_size: f32) -> f32 {
    font_size * MM_PER_POINT * 1.4
}

/// Number of narrow characters that fit in `width` mm at `font_size`
fn char_budget(width: f32, font_size: f32) -> usize {
    let narrow_width = font_size * MM_PER_POINT * 0.5;
    ((width / narrow_width).floor() as usize).max(1)
}

/// East Asian wide characters take two units of the line budget
fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x3FFFD)
}

fn char_units(c: char) -> usize {
    if is_wide(c) { 2 } else { 1 }
}

/// Whether any text in `blocks` is outside what the built-in fonts can show
pub fn needs_unicode_font(blocks: &[LayoutBlock<'_>]) -> bool {
    let non_latin = |text: &str| text.chars().any(|c| c as u32 > 0xFF);
    blocks.iter().any(|block| match block {
        LayoutBlock::Paragraph(text) => non_latin(text),
        LayoutBlock::Table(table) => table.cell_texts().any(non_latin),
        LayoutBlock::PageBreak => false,
    })
}

/// Split text into words, whitespace runs and single wide characters
fn tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut previous: Option<(bool, bool)> = None;

    for (index, c) in text.char_indices() {
        let class = (c.is_whitespace(), is_wide(c));
        if let Some(prev) = previous {
            if prev != class || class.1 {
                tokens.push(&text[start..index]);
                start = index;
            }
        }
        previous = Some(class);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }

    tokens
}

/// Greedy wrap of `text` into lines of at most `budget` units
pub fn wrap_text(text: &str, budget: usize) -> Vec<String> {
    let budget = budget.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        let mut width = 0;

        for token in tokens(paragraph) {
            let blank = token.chars().all(char::is_whitespace);
            let token_width: usize = token.chars().map(char_units).sum();

            if width + token_width > budget && width > 0 {
                lines.push(line.trim_end().to_string());
                line.clear();
                width = 0;
            }
            if blank && width == 0 {
                continue;
            }

            if token_width > budget {
                for c in token.chars() {
                    let units = char_units(c);
                    if width + units > budget && width > 0 {
                        lines.push(std::mem::take(&mut line));
                        width = 0;
                    }
                    line.push(c);
                    width += units;
                }
            } else {
                line.push_str(token);
                width += token_width;
            }
        }

        if !line.trim().is_empty() {
            lines.push(line.trim_end().to_string());
        }
    }

    lines
}
