/*!
 * Package-level read/write tests through real zip bytes on disk.
 */

use doctrans::docx::{Block, DocxDocument, DocxPackage, Paragraph};

use crate::common;

/// Test that writing and re-reading a package preserves untouched entries
#[test]
fn test_package_writeAndRead_shouldCarryEntriesThrough() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("doc.docx");

    let mut package = common::package_from_document(&common::sample_document());
    package.set_document_xml(package.document_xml().unwrap().to_vec());
    package.write(&path).unwrap();

    let reread = DocxPackage::read(&path).unwrap();
    assert_eq!(
        reread.document_xml().unwrap(),
        package.document_xml().unwrap()
    );

    let document = common::document_from_package(&reread);
    assert_eq!(document.paragraphs().count(), 3);
}

/// Test that a zip without word/document.xml is rejected at read time
#[test]
fn test_package_read_withoutDocumentXml_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("broken.docx");

    let package = DocxPackage::from_entries(vec![(
        "[Content_Types].xml".to_string(),
        b"<Types/>".to_vec(),
    )]);
    package.write(&path).unwrap();

    assert!(DocxPackage::read(&path).is_err());
}

/// Test that a non-zip file is rejected
#[test]
fn test_package_read_nonZipFile_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("plain.docx");
    std::fs::write(&path, b"this is not a zip archive").unwrap();

    assert!(DocxPackage::read(&path).is_err());
}

/// Test the model survives a full serialize/parse cycle with styles intact
#[test]
fn test_document_serializeParse_shouldPreserveStylesAndTables() {
    let document = DocxDocument {
        blocks: vec![
            Block::Paragraph(Paragraph {
                style_name: "Heading 1".to_string(),
                ..Paragraph::with_text("Title")
            }),
            Block::Paragraph(common::two_run_paragraph("Bold ", "plain")),
            Block::Table(common::table_of(&[&["a", "b"], &["c", "d"]])),
        ],
    };

    let package = common::package_from_document(&document);
    let parsed = common::document_from_package(&package);

    let first = parsed.paragraphs().next().unwrap();
    assert_eq!(first.style_name, "Heading 1");

    let second = parsed.paragraphs().nth(1).unwrap();
    assert_eq!(second.runs.len(), 2);
    assert!(second.runs[0].props.bold);
    assert_eq!(second.text(), "Bold plain");

    let table = parsed.tables().next().unwrap();
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[1].cells[0].text(), "c");
}
