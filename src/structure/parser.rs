/*!
 * Structural parser: one traversal producing the content, format, and
 * layout layers plus metadata counts.
 *
 * Traversal follows the document's natural reading order. Paragraph anchors
 * are assigned from the paragraph's position in the full body sequence, so
 * the same enumeration locates the node again at reconstruction time.
 * Cell uniqueness is enforced by coordinate-keyed deduplication; a
 * seen-text set would incorrectly drop legitimately repeated cell content.
 */

use std::collections::HashSet;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::docx::{DocxDocument, Paragraph, TableCell};

use super::layers::{
    Anchor, ContentUnit, DocumentMetadata, DocumentStructure, FormatDescriptor, LayoutDescriptor,
    RunFormat, TableCoordinates, UnitKind,
};

/// Matches "Heading 1" style names as well as "Heading1" style IDs.
static HEADING_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Heading ?([1-6])").expect("valid heading style regex"));

/// Parser producing the three structural layers.
#[derive(Debug, Default)]
pub struct StructuralParser;

impl StructuralParser {
    pub fn new() -> Self {
        Self
    }

    /// Decompose a document into anchored layers. `media_targets` are the
    /// package's image entries, recorded as non-translatable units.
    pub fn parse(&self, doc: &DocxDocument, media_targets: &[String]) -> DocumentStructure {
        let mut content = Vec::new();
        let mut format = Vec::new();
        let mut layout = Vec::new();
        let mut metadata = DocumentMetadata::default();

        // Single pass over the body in block order, so anchors come out in
        // reading order. The paragraph anchor index counts every body
        // paragraph, while empty paragraphs produce no unit.
        let mut paragraph_index = 0;
        let mut table_index = 0;
        for block in &doc.blocks {
            match block {
                crate::docx::Block::Paragraph(para) => {
                    let index = paragraph_index;
                    paragraph_index += 1;
                    if para.is_empty() {
                        continue;
                    }
                    let anchor = Anchor::paragraph(index);

                    content.push(ContentUnit {
                        anchor: anchor.clone(),
                        text: para.text(),
                        kind: UnitKind::Paragraph,
                        table_coordinates: None,
                    });
                    format.push(Self::format_descriptor(anchor.clone(), para));
                    layout.push(Self::layout_descriptor(anchor, para, None));
                    metadata.total_paragraphs += 1;
                }
                crate::docx::Block::Table(table) => {
                    let current_table = table_index;
                    table_index += 1;
                    let mut seen_coordinates: HashSet<TableCoordinates> = HashSet::new();

                    for (row_index, row) in table.rows.iter().enumerate() {
                        for (col_index, cell) in row.cells.iter().enumerate() {
                            let coords = TableCoordinates {
                                table: current_table,
                                row: row_index,
                                col: col_index,
                            };
                            // Merged-cell representations can present the same
                            // cell twice; the key is the coordinate, never the
                            // text
                            if !seen_coordinates.insert(coords) {
                                continue;
                            }

                            let text = cell.text();
                            if text.trim().is_empty() {
                                continue;
                            }

                            let anchor =
                                Anchor::table_cell(current_table, row_index, col_index);
                            content.push(ContentUnit {
                                anchor: anchor.clone(),
                                text,
                                kind: UnitKind::TableCell,
                                table_coordinates: Some(coords),
                            });
                            format.push(Self::cell_format_descriptor(anchor.clone(), cell));
                            layout.push(LayoutDescriptor {
                                anchor,
                                is_heading: false,
                                heading_level: 0,
                                table_coordinates: Some(coords),
                            });
                        }
                    }
                    metadata.total_tables += 1;
                }
            }
        }

        // Images: counted and anchored, never translated.
        for (index, target) in media_targets.iter().enumerate() {
            content.push(ContentUnit {
                anchor: Anchor::image(index),
                text: target.clone(),
                kind: UnitKind::Image,
                table_coordinates: None,
            });
            metadata.total_images += 1;
        }

        debug!(
            "Parsed document: {} paragraphs, {} tables, {} images, {} units",
            metadata.total_paragraphs,
            metadata.total_tables,
            metadata.total_images,
            content.len()
        );

        DocumentStructure { content, format, layout, metadata }
    }

    /// Heading level from a style name: `Heading N` -> N, anything else -> 0.
    pub fn heading_level(style_name: &str) -> u8 {
        HEADING_STYLE
            .captures(style_name)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    }

    fn format_descriptor(anchor: Anchor, para: &Paragraph) -> FormatDescriptor {
        FormatDescriptor {
            anchor,
            style_name: para.style_name.clone(),
            alignment: para.alignment.clone(),
            runs: para
                .runs
                .iter()
                .map(|r| RunFormat {
                    text: r.text.clone(),
                    bold: r.props.bold,
                    italic: r.props.italic,
                    underline: r.props.underline,
                    font_name: r.props.font_name.clone(),
                    font_size: r.props.font_size,
                })
                .collect(),
        }
    }

    fn cell_format_descriptor(anchor: Anchor, cell: &TableCell) -> FormatDescriptor {
        let first = cell.paragraphs.first();
        FormatDescriptor {
            anchor,
            style_name: first.map(|p| p.style_name.clone()).unwrap_or_default(),
            alignment: first.and_then(|p| p.alignment.clone()),
            runs: cell
                .paragraphs
                .iter()
                .flat_map(|p| p.runs.iter())
                .map(|r| RunFormat {
                    text: r.text.clone(),
                    bold: r.props.bold,
                    italic: r.props.italic,
                    underline: r.props.underline,
                    font_name: r.props.font_name.clone(),
                    font_size: r.props.font_size,
                })
                .collect(),
        }
    }

    fn layout_descriptor(
        anchor: Anchor,
        para: &Paragraph,
        table_coordinates: Option<TableCoordinates>,
    ) -> LayoutDescriptor {
        let level = Self::heading_level(&para.style_name);
        LayoutDescriptor {
            anchor,
            is_heading: level > 0,
            heading_level: level,
            table_coordinates,
        }
    }
}
