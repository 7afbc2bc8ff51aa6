/*!
 * Typed content units and their translation state.
 *
 * A `Content` holds an immutable original value of one kind (text, table or
 * image) and, once the orchestrator has processed it, either a validated
 * translation of the same kind or a failure marker.
 *
 * Validation is asymmetric. A table whose translated grid cannot be read back,
 * or has the wrong column count, records a soft failure (`Ok`, status false,
 * no translation). Handing a text or image unit a value of another kind is a
 * hard `ContentError::TypeMismatch` that leaves the unit untouched.
 */

use std::fmt;

use crate::book::table::{Cells, Table};
use crate::errors::ContentError;

/// Kind tag of a content unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Text,
    Table,
    Image,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Table => "table",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw image payload carried through untranslated
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageData {
    /// Encoded image bytes
    pub bytes: Vec<u8>,
    /// MIME type when known (e.g. "image/jpeg")
    pub mime_type: Option<String>,
    /// Width in pixels
    pub width: Option<u32>,
    /// Height in pixels
    pub height: Option<u32>,
}

/// A value of one content kind, used for both originals and translations
#[derive(Debug, Clone, PartialEq)]
pub enum ContentValue {
    Text(String),
    Table(Table),
    Image(ImageData),
}

impl ContentValue {
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Text(_) => ContentKind::Text,
            Self::Table(_) => ContentKind::Table,
            Self::Image(_) => ContentKind::Image,
        }
    }
}

impl From<String> for ContentValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ContentValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Table> for ContentValue {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

/// Per-unit translation state; `Pending` moves to exactly one of the other two
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentState {
    #[default]
    Pending,
    Translated,
    Failed,
}

/// Which grid of a table content to address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    Original,
    Translation,
}

/// A single unit of document content
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    original: ContentValue,
    translation: Option<ContentValue>,
    state: ContentState,
    rejection: Option<ContentError>,
}

impl Content {
    pub fn new(original: ContentValue) -> Self {
        Self {
            original,
            translation: None,
            state: ContentState::Pending,
            rejection: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(ContentValue::Text(text.into()))
    }

    pub fn table(table: Table) -> Self {
        Self::new(ContentValue::Table(table))
    }

    pub fn image(image: ImageData) -> Self {
        Self::new(ContentValue::Image(image))
    }

    pub fn kind(&self) -> ContentKind {
        self.original.kind()
    }

    pub fn original(&self) -> &ContentValue {
        &self.original
    }

    pub fn translation(&self) -> Option<&ContentValue> {
        self.translation.as_ref()
    }

    pub fn state(&self) -> ContentState {
        self.state
    }

    /// True only after a validated translation was recorded
    pub fn status(&self) -> bool {
        self.state == ContentState::Translated
    }

    /// Translated text, for text content with a successful translation
    pub fn translated_text(&self) -> Option<&str> {
        match &self.translation {
            Some(ContentValue::Text(text)) if self.status() => Some(text),
            _ => None,
        }
    }

    /// Translated table, for table content with a successful translation
    pub fn translated_table(&self) -> Option<&Table> {
        match &self.translation {
            Some(ContentValue::Table(table)) if self.status() => Some(table),
            _ => None,
        }
    }

    /// Record the outcome of a translation request
    ///
    /// `value` is validated against this unit's kind. Tables accept either an
    /// already built `Table` or the raw delimited text returned by a backend.
    /// With `success == false` the unit is marked failed and no translation is kept.
    pub fn set_translation(&mut self, value: impl Into<ContentValue>, success: bool) -> Result<(), ContentError> {
        let value = value.into();

        match self.kind() {
            ContentKind::Table => {
                self.set_table_translation(value, success);
                Ok(())
            }
            kind if kind != value.kind() => Err(ContentError::TypeMismatch {
                expected: kind.as_str(),
                found: value.kind().as_str(),
            }),
            _ if success => {
                self.translation = Some(value);
                self.state = ContentState::Translated;
                self.rejection = None;
                Ok(())
            }
            _ => {
                self.mark_failed();
                Ok(())
            }
        }
    }

    /// Soft validation path for tables; never returns an error
    fn set_table_translation(&mut self, value: ContentValue, success: bool) {
        if !success {
            self.mark_failed();
            return;
        }

        let expected = match &self.original {
            ContentValue::Table(original) => original.column_count(),
            _ => return self.mark_failed(),
        };

        let parsed = match value {
            ContentValue::Table(table) => Ok(table),
            ContentValue::Text(text) => Table::from_delimited(&text),
            ContentValue::Image(_) => Err(ContentError::TypeMismatch {
                expected: ContentKind::Table.as_str(),
                found: ContentKind::Image.as_str(),
            }),
        };

        let validated = parsed.and_then(|table| match table.column_count() {
            found if found == expected => Ok(table),
            found => Err(ContentError::ColumnMismatch { expected, found }),
        });

        match validated {
            Ok(table) => {
                self.translation = Some(ContentValue::Table(table));
                self.state = ContentState::Translated;
                self.rejection = None;
            }
            Err(reason) => {
                self.mark_failed();
                self.rejection = Some(reason);
            }
        }
    }

    /// Mark the unit failed and drop any translation
    pub fn mark_failed(&mut self) {
        self.translation = None;
        self.state = ContentState::Failed;
        self.rejection = None;
    }

    /// Why the last table translation was rejected, if it was
    pub fn rejection(&self) -> Option<&ContentError> {
        self.rejection.as_ref()
    }

    /// Canonical text form of the original, used to build prompts
    ///
    /// Tables are flattened to their delimited form; images have no text form.
    pub fn get_original_as_text(&self) -> String {
        match &self.original {
            ContentValue::Text(text) => text.clone(),
            ContentValue::Table(table) => table.to_delimited(),
            ContentValue::Image(_) => String::new(),
        }
    }

    /// Lazily iterate `(row, column, value)` over the original or translated grid
    pub fn iter_items(&self, source: TableSource) -> Result<Cells<'_>, ContentError> {
        self.table_ref(source).map(Table::cells)
    }

    /// Replace one cell of the original or translated grid
    ///
    /// The original grid is only editable while the unit is still pending.
    pub fn update_item(
        &mut self,
        row: usize,
        col: usize,
        value: impl Into<String>,
        source: TableSource,
    ) -> Result<(), ContentError> {
        if source == TableSource::Original && self.state != ContentState::Pending {
            return Err(ContentError::OriginalLocked);
        }
        self.table_mut(source)?.set_cell(row, col, value)
    }

    fn table_ref(&self, source: TableSource) -> Result<&Table, ContentError> {
        if self.kind() != ContentKind::Table {
            return Err(ContentError::NotATable);
        }
        let value = match source {
            TableSource::Original => Some(&self.original),
            TableSource::Translation => self.translation.as_ref(),
        };
        match value {
            Some(ContentValue::Table(table)) => Ok(table),
            _ => Err(ContentError::MissingTranslation),
        }
    }

    fn table_mut(&mut self, source: TableSource) -> Result<&mut Table, ContentError> {
        if self.kind() != ContentKind::Table {
            return Err(ContentError::NotATable);
        }
        let value = match source {
            TableSource::Original => Some(&mut self.original),
            TableSource::Translation => self.translation.as_mut(),
        };
        match value {
            Some(ContentValue::Table(table)) => Ok(table),
            _ => Err(ContentError::MissingTranslation),
        }
    }
}
