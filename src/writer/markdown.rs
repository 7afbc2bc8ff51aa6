use crate::book::Table;
use crate::errors::WriterError;
use crate::writer::{LayoutBlock, Renderer};

/// Renders layout blocks as Markdown
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    pub fn render_to_string(&self, blocks: &[LayoutBlock<'_>]) -> String {
        let mut output = String::new();

        for block in blocks {
            match block {
                LayoutBlock::Paragraph(text) => {
                    output.push_str(text);
                    output.push_str("\n\n");
                }
                LayoutBlock::Table(table) => {
                    write_table(&mut output, table);
                    output.push('\n');
                }
                LayoutBlock::PageBreak => output.push_str("---\n\n"),
            }
        }

        output
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, blocks: &[LayoutBlock<'_>]) -> Result<Vec<u8>, WriterError> {
        Ok(self.render_to_string(blocks).into_bytes())
    }
}

fn write_table(output: &mut String, table: &Table) {
    let Some(header) = table.header() else {
        return;
    };

    write_row(output, header.iter().map(String::as_str));
    write_row(output, header.iter().map(|_| "---"));
    for row in table.body() {
        write_row(output, row.iter().map(String::as_str));
    }
}

fn write_row<'a>(output: &mut String, cells: impl Iterator<Item = &'a str>) {
    let cells: Vec<String> = cells.map(escape_cell).collect();
    output.push_str("| ");
    output.push_str(&cells.join(" | "));
    output.push_str(" |\n");
}

/// Pipes would end the cell and line breaks the row
fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace("\r\n", " ").replace('\n', " ")
}
