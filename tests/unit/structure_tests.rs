/*!
 * Tests for structural decomposition of documents
 */

use doctrans::docx::{Block, DocxDocument, Paragraph};
use doctrans::structure::{StructuralParser, UnitKind};

use crate::common;

fn parse(document: &DocxDocument) -> doctrans::structure::DocumentStructure {
    StructuralParser::new().parse(document, &[])
}

/// Test that anchors follow reading order across paragraphs and tables
#[test]
fn test_parse_mixedDocument_shouldAssignAnchorsInReadingOrder() {
    let document = DocxDocument {
        blocks: vec![
            Block::Paragraph(Paragraph::with_text("Intro")),
            Block::Table(common::table_of(&[&["A", "B"]])),
            Block::Paragraph(Paragraph::with_text("Outro")),
        ],
    };

    let structure = parse(&document);
    let anchors: Vec<&str> = structure.content.iter().map(|u| u.anchor.as_str()).collect();

    assert_eq!(anchors, vec![
        "para_0",
        "table_0_row_0_col_0",
        "table_0_row_0_col_1",
        "para_1",
    ]);
}

/// Test that anchors are unique across the whole document
#[test]
fn test_parse_largeDocument_shouldProduceUniqueAnchors() {
    let mut blocks = Vec::new();
    for i in 0..20 {
        blocks.push(Block::Paragraph(Paragraph::with_text(&format!("p{}", i))));
    }
    blocks.push(Block::Table(common::table_of(&[&["x", "x"], &["x", "x"]])));
    blocks.push(Block::Table(common::table_of(&[&["x"]])));
    let document = DocxDocument { blocks };

    let structure = parse(&document);
    let mut anchors: Vec<&str> = structure.content.iter().map(|u| u.anchor.as_str()).collect();
    let total = anchors.len();
    anchors.sort();
    anchors.dedup();

    assert_eq!(anchors.len(), total);
    assert_eq!(total, 20 + 4 + 1);
}

/// Test that repeated cell text yields distinct units per coordinate
#[test]
fn test_parse_duplicateCellText_shouldKeepBothUnits() {
    let document = DocxDocument {
        blocks: vec![Block::Table(common::table_of(&[
            &["Feature", "Ready"],
            &["Parser", "Yes"],
            &["Writer", "Yes"],
        ]))],
    };

    let structure = parse(&document);
    let yes_units: Vec<_> = structure
        .content
        .iter()
        .filter(|u| u.text == "Yes")
        .collect();

    assert_eq!(yes_units.len(), 2);
    assert_ne!(yes_units[0].table_coordinates, yes_units[1].table_coordinates);
}

/// Test that the format layer mirrors the content layer exactly
#[test]
fn test_parse_formattedParagraph_shouldAlignFormatLayerWithContent() {
    let document = DocxDocument {
        blocks: vec![Block::Paragraph(common::two_run_paragraph("Bold ", "plain"))],
    };

    let structure = parse(&document);
    let unit = &structure.content[0];
    let format = structure.format_for(&unit.anchor).unwrap();

    let concatenated: String = format.runs.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(concatenated, unit.text);
    assert!(format.runs[0].bold);
    assert!(!format.runs[1].bold);
}

/// Test heading levels and the layout layer
#[test]
fn test_parse_headings_shouldRecordLevelsInLayoutLayer() {
    let document = DocxDocument {
        blocks: vec![
            Block::Paragraph(Paragraph {
                style_name: "Heading 2".to_string(),
                ..Paragraph::with_text("Section")
            }),
            Block::Paragraph(Paragraph::with_text("Body")),
        ],
    };

    let structure = parse(&document);
    let heading_layout = structure.layout_for(&structure.content[0].anchor).unwrap();
    let body_layout = structure.layout_for(&structure.content[1].anchor).unwrap();

    assert!(heading_layout.is_heading);
    assert_eq!(heading_layout.heading_level, 2);
    assert!(!body_layout.is_heading);
    assert_eq!(body_layout.heading_level, 0);
}

/// Test that image entries are counted but never offered for translation
#[test]
fn test_parse_withMediaEntries_shouldCountImagesAsNonTranslatable() {
    let document = DocxDocument {
        blocks: vec![Block::Paragraph(Paragraph::with_text("Text"))],
    };
    let media = vec!["word/media/image1.png".to_string()];

    let structure = StructuralParser::new().parse(&document, &media);

    assert_eq!(structure.metadata.total_images, 1);
    assert!(structure
        .content
        .iter()
        .any(|u| u.kind == UnitKind::Image));
    assert!(structure
        .translatable_units()
        .all(|u| u.kind != UnitKind::Image));
}
