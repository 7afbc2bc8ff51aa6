/*!
 * Prompt construction.
 *
 * Every prompt ends with `:\n` followed by the material to translate. Table
 * prompts carry the table in the same CSV form the response must come back
 * in, so the reply can be parsed with `Table::from_delimited`.
 */

use crate::book::{Content, ContentValue, Table};
use crate::language_utils::display_language;

/// Prompt for a block of running text
pub fn text_prompt(text: &str, language: &str) -> String {
    format!(
        "Translate the following text into {}:\n{}",
        display_language(language),
        text
    )
}

/// Prompt for a table; demands a reply in the round-trip CSV format
pub fn table_prompt(table: &Table, language: &str) -> String {
    format!(
        "Translate the following table into {language}. Keep exactly {rows} rows and {columns} columns \
         with the header as the first row. Reply with the table only, as CSV: comma-separated fields, \
         fields containing commas, double quotes or line breaks enclosed in double quotes, \
         double quotes inside a field doubled, no spaces around delimiters, \
         no explanations and no code fences.\nOriginal table:\n{csv}",
        language = display_language(language),
        rows = table.row_count(),
        columns = table.column_count(),
        csv = table.to_delimited(),
    )
}

/// The prompt for a content unit, or `None` for kinds that are not translated
pub fn prompt_for(content: &Content, language: &str) -> Option<String> {
    match content.original() {
        ContentValue::Text(text) => Some(text_prompt(text, language)),
        ContentValue::Table(table) => Some(table_prompt(table, language)),
        ContentValue::Image(_) => None,
    }
}
