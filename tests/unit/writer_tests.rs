/*!
 * Tests for writing translated books
 */

use std::sync::Arc;

use ai_translator::book::{Book, Content, Page};
use ai_translator::errors::WriterError;
use ai_translator::logging::CaptureLog;
use ai_translator::writer::{layout, FileFormat, LayoutBlock, MarkdownRenderer, Writer};

use crate::common::{create_temp_dir, price_table, table};

fn writer() -> Writer {
    Writer::new(Arc::new(CaptureLog::new()))
}

/// Only units with a successful translation reach the output
#[test]
fn test_saveAs_markdown_shouldRenderOnlySuccessfulUnits() {
    let dir = create_temp_dir().unwrap();
    let mut text = Content::text("Hello");
    text.set_translation("你好", true).unwrap();
    let mut failed_table = Content::table(price_table());
    failed_table.set_translation("", false).unwrap();
    let book = Book::with_pages(dir.path().join("greeting.pdf"), vec![Page::with_contents(vec![text, failed_table])]);

    let path = writer().save_as(&book, FileFormat::Markdown, None).unwrap();
    let output = std::fs::read_to_string(&path).unwrap();

    assert_eq!(output, "你好\n\n");
    assert!(!output.contains("Apple"));
    assert!(!output.contains('|'));
}

#[test]
fn test_markdown_withTablesAndPages_shouldSeparatePagesOnly() {
    let mut first = Content::text("Fruit");
    first.set_translation("水果", true).unwrap();
    let mut grid = Content::table(price_table());
    grid.set_translation(table(&[&["名称", "价格"], &["苹果", "3"], &["梨", "5"]]), true)
        .unwrap();
    let mut last = Content::text("End");
    last.set_translation("完", true).unwrap();

    let book = Book::with_pages(
        "fruit.pdf",
        vec![Page::with_contents(vec![first, grid]), Page::with_contents(vec![last])],
    );

    let markdown = MarkdownRenderer.render_to_string(&layout(&book));

    assert_eq!(
        markdown,
        "水果\n\n| 名称 | 价格 |\n| --- | --- |\n| 苹果 | 3 |\n| 梨 | 5 |\n\n---\n\n完\n\n"
    );
}

#[test]
fn test_layout_withEmptyMiddlePage_shouldKeepSeparators() {
    let mut a = Content::text("a");
    a.set_translation("A", true).unwrap();
    let mut b = Content::text("b");
    b.set_translation("B", true).unwrap();
    let book = Book::with_pages(
        "a.pdf",
        vec![Page::with_contents(vec![a]), Page::new(), Page::with_contents(vec![b])],
    );

    assert_eq!(
        layout(&book),
        vec![
            LayoutBlock::Paragraph("A"),
            LayoutBlock::PageBreak,
            LayoutBlock::PageBreak,
            LayoutBlock::Paragraph("B"),
        ]
    );
}

/// An unsupported format is reported before any file is created
#[test]
fn test_saveTranslatedBook_withDocx_shouldFailFast() {
    let dir = create_temp_dir().unwrap();
    let output = dir.path().join("out").join("book.docx");
    let book = Book::with_pages(dir.path().join("book.pdf"), vec![Page::new()]);

    let result = writer().save_translated_book(&book, "docx", Some(&output));

    match result {
        Err(WriterError::UnsupportedFormat(format)) => assert_eq!(format, "docx"),
        other => panic!("expected UnsupportedFormat, got {:?}", other),
    }
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_saveAs_pdf_shouldWriteDocumentNextToSource() {
    let dir = create_temp_dir().unwrap();
    let mut text = Content::text("Hello");
    text.set_translation("Bonjour", true).unwrap();
    let mut grid = Content::table(price_table());
    grid.set_translation(price_table(), true).unwrap();
    let book = Book::with_pages(
        dir.path().join("report.pdf"),
        vec![Page::with_contents(vec![text, grid]), Page::new()],
    );

    let path = writer().save_as(&book, FileFormat::Pdf, None).unwrap();

    assert_eq!(path, dir.path().join("report_translated.pdf"));
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}
