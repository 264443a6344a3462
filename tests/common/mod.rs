/*!
 * Common test utilities for the doctrans test suite
 */

use anyhow::Result;
use tempfile::TempDir;

use doctrans::app_config::Config;
use doctrans::docx::{
    serialize_document_xml, Block, DocxDocument, DocxPackage, Paragraph, Run, RunProps, Table,
    TableCell, TableRow,
};

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// A configuration suitable for mock-backed tests: no entity detection,
/// single fast retry, small batches
pub fn test_config(target_language: &str) -> Config {
    let mut config = Config {
        target_language: target_language.to_string(),
        ..Config::default()
    };
    config.protection.entity_detection = false;
    config.translation.retry_count = 2;
    config.translation.retry_backoff_ms = 1;
    config.translation.concurrent_requests = 2;
    config.translation.batch_char_threshold = 40;
    config.translation.batch_max_units = 4;
    config
}

/// Wrap a document model into an in-memory package
pub fn package_from_document(document: &DocxDocument) -> DocxPackage {
    let xml = serialize_document_xml(document).expect("document should serialize");
    DocxPackage::from_entries(vec![
        ("[Content_Types].xml".to_string(), b"<Types/>".to_vec()),
        ("word/document.xml".to_string(), xml),
    ])
}

/// Extract the document model back out of a package
pub fn document_from_package(package: &DocxPackage) -> DocxDocument {
    let xml = package.document_xml().expect("package should hold document.xml");
    doctrans::docx::parse_document_xml(xml).expect("document.xml should parse")
}

/// A paragraph with one bold run and one plain run
pub fn two_run_paragraph(bold_text: &str, plain_text: &str) -> Paragraph {
    Paragraph {
        style_name: "Normal".to_string(),
        runs: vec![
            Run {
                text: bold_text.to_string(),
                props: RunProps {
                    bold: true,
                    ..RunProps::default()
                },
            },
            Run {
                text: plain_text.to_string(),
                props: RunProps::default(),
            },
        ],
        ..Paragraph::default()
    }
}

/// A table with the given cell texts, one row per inner slice
pub fn table_of(rows: &[&[&str]]) -> Table {
    Table {
        rows: rows
            .iter()
            .map(|cells| TableRow {
                cells: cells.iter().map(|text| TableCell::with_text(text)).collect(),
            })
            .collect(),
    }
}

/// A small document with three paragraphs, one mentioning GitHub
pub fn sample_document() -> DocxDocument {
    DocxDocument {
        blocks: vec![
            Block::Paragraph(Paragraph {
                style_name: "Heading 1".to_string(),
                ..Paragraph::with_text("Project Overview")
            }),
            Block::Paragraph(Paragraph::with_text("The source code lives on GitHub.")),
            Block::Paragraph(Paragraph::with_text("Releases ship every month.")),
        ],
    }
}
