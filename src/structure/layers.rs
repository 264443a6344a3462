/*!
 * The three structural layers and their shared anchor type.
 *
 * Anchors are assigned once at parse time and are the only handle used to
 * relate content, format, and layout entries and to write translated text
 * back into the document. All layer types are immutable after parsing.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable, document-scoped identifier for one document node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Anchor(String);

impl Anchor {
    /// Anchor for the body paragraph at position `index` in the full
    /// paragraph sequence (empty paragraphs consume an index too).
    pub fn paragraph(index: usize) -> Self {
        Self(format!("para_{}", index))
    }

    /// Anchor for a table cell by coordinates.
    pub fn table_cell(table: usize, row: usize, col: usize) -> Self {
        Self(format!("table_{}_row_{}_col_{}", table, row, col))
    }

    /// Anchor for an image relationship.
    pub fn image(index: usize) -> Self {
        Self(format!("img_{}", index))
    }

    /// The anchor's string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of a content unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Paragraph,
    TableCell,
    Image,
}

/// Coordinates of a table cell. Uniqueness of a cell unit is keyed on these
/// coordinates, never on the cell text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableCoordinates {
    pub table: usize,
    pub row: usize,
    pub col: usize,
}

/// One translatable piece of text. Invariant: `text` is non-empty after
/// trimming (empty nodes never produce a unit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentUnit {
    pub anchor: Anchor,
    pub text: String,
    pub kind: UnitKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_coordinates: Option<TableCoordinates>,
}

/// Formatting of one run, captured at parse time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFormat {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
}

/// Per-unit style and run formatting. Invariant: the concatenation of
/// `runs[].text` equals the unit's text at parse time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub anchor: Anchor,
    pub style_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
    pub runs: Vec<RunFormat>,
}

/// Per-unit structural role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutDescriptor {
    pub anchor: Anchor,
    pub is_heading: bool,
    /// Heading level in `[0, 6]`; 0 means "not a heading"
    pub heading_level: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_coordinates: Option<TableCoordinates>,
}

/// Document-level counts gathered during parsing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub total_paragraphs: usize,
    pub total_tables: usize,
    pub total_images: usize,
}

/// The complete parse result: three anchor-aligned layers plus metadata.
///
/// Created once per document; immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStructure {
    pub content: Vec<ContentUnit>,
    pub format: Vec<FormatDescriptor>,
    pub layout: Vec<LayoutDescriptor>,
    pub metadata: DocumentMetadata,
}

impl DocumentStructure {
    /// Units that are sent to translation (paragraphs and table cells).
    pub fn translatable_units(&self) -> impl Iterator<Item = &ContentUnit> {
        self.content
            .iter()
            .filter(|u| matches!(u.kind, UnitKind::Paragraph | UnitKind::TableCell))
    }

    /// Look up the format descriptor for an anchor.
    pub fn format_for(&self, anchor: &Anchor) -> Option<&FormatDescriptor> {
        self.format.iter().find(|f| &f.anchor == anchor)
    }

    /// Look up the layout descriptor for an anchor.
    pub fn layout_for(&self, anchor: &Anchor) -> Option<&LayoutDescriptor> {
        self.layout.iter().find(|l| &l.anchor == anchor)
    }
}
