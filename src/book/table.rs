/*!
 * Rectangular tables of string cells and their delimited text form.
 *
 * Tables travel through text-only translation requests as RFC 4180 CSV:
 * comma delimiter, double-quote quoting, one record per line, first record
 * is the header row. `Table::to_delimited` and `Table::from_delimited` are the
 * two halves of that exchange.
 */

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::errors::ContentError;

/// A table with a fixed column count; every row has exactly that many cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: usize,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, rejecting empty input and rows of differing width
    pub fn new(rows: Vec<Vec<String>>) -> Result<Self, ContentError> {
        let columns = match rows.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(ContentError::EmptyTable),
        };

        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns) {
            return Err(ContentError::RaggedRow {
                row,
                expected: columns,
                found: cells.len(),
            });
        }

        Ok(Self { columns, rows })
    }

    /// Build a table from rows of uneven width by padding short rows with empty cells
    ///
    /// Returns `None` when there is no non-empty row.
    pub fn padded(rows: Vec<Vec<String>>) -> Option<Self> {
        let rows: Vec<Vec<String>> = rows.into_iter().filter(|r| !r.is_empty()).collect();
        let columns = rows.iter().map(Vec::len).max()?;

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(columns, String::new());
                row
            })
            .collect();

        Some(Self { columns, rows })
    }

    /// Parse a delimited grid returned by a translation backend
    ///
    /// A surrounding Markdown code fence and blank lines are ignored. Cells are trimmed.
    pub fn from_delimited(text: &str) -> Result<Self, ContentError> {
        let body = strip_code_fence(text);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(body.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ContentError::MalformedTable(e.to_string()))?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        Self::new(rows).map_err(|e| match e {
            ContentError::EmptyTable => ContentError::MalformedTable("no rows in response".to_string()),
            other => other,
        })
    }

    /// Serialize the table as CSV, one record per line, without a trailing newline
    pub fn to_delimited(&self) -> String {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        for row in &self.rows {
            // In-memory writes only fail on I/O, which a Vec never reports
            let _ = writer.write_record(row);
        }

        let bytes = writer.into_inner().unwrap_or_default();
        let text = String::from_utf8_lossy(&bytes);
        text.trim_end_matches('\n').to_string()
    }

    /// Number of rows, header included
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// First row, treated as the header
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Rows after the header
    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or_default()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }

    /// Replace a single cell in place
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<(), ContentError> {
        let (rows, columns) = (self.rows.len(), self.columns);
        let cell = self
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(ContentError::CellOutOfRange { row, col, rows, columns })?;
        *cell = value.into();
        Ok(())
    }

    /// Lazily walk every cell in row-major order
    pub fn cells(&self) -> Cells<'_> {
        Cells { table: self, row: 0, col: 0 }
    }

    /// Text of every cell in row-major order, skipping blanks
    pub fn cell_texts(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(String::as_str).filter(|c| !c.trim().is_empty())
    }
}

/// Row-major cell iterator yielding `(row, column, value)`
#[derive(Debug, Clone)]
pub struct Cells<'a> {
    table: &'a Table,
    row: usize,
    col: usize,
}

impl<'a> Iterator for Cells<'a> {
    type Item = (usize, usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.table.cell(self.row, self.col)?;
        let item = (self.row, self.col, value);

        self.col += 1;
        if self.col == self.table.columns {
            self.col = 0;
            self.row += 1;
        }

        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let total = self.table.rows.len() * self.table.columns;
        let done = self.row * self.table.columns + self.col;
        let remaining = total.saturating_sub(done);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Cells<'_> {}

impl fmt::Display for Table {
    /// Space-aligned grid, used in log output
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths: Vec<usize> = (0..self.columns)
            .map(|c| self.rows.iter().map(|r| r[c].chars().count()).max().unwrap_or(0))
            .collect();

        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect();
            write!(f, "{}", line.join("  ").trim_end())?;
        }
        Ok(())
    }
}

/// Pattern for a Markdown code fence wrapped around the whole response
static CODE_FENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```\s*$").expect("Invalid code fence regex")
});

/// Return the body of a fenced block, or the trimmed input
fn strip_code_fence(text: &str) -> &str {
    match CODE_FENCE_PATTERN.captures(text).and_then(|c| c.get(1)) {
        Some(body) => body.as_str(),
        None => text.trim(),
    }
}
