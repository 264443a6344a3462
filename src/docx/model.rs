/*!
 * In-memory model of the translatable parts of a word-processing document.
 *
 * The model captures exactly the fields the pipeline reads and writes:
 * paragraph style and alignment, run text and run-level formatting, and
 * table structure. Anything else in `word/document.xml` is left alone by
 * the rewriting writer, and the rest of the package is passed through at
 * the zip level.
 */

use serde::{Deserialize, Serialize};

/// A parsed document body: paragraphs and tables in reading order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocxDocument {
    /// Body blocks in document order
    pub blocks: Vec<Block>,
}

/// A top-level body block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Block {
    /// A body paragraph
    Paragraph(Paragraph),
    /// A table of rows and cells
    Table(Table),
}

/// A paragraph with its style and formatted runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Style name (e.g. "Normal", "Heading 1")
    pub style_name: String,

    /// Paragraph alignment as found in the source (e.g. "center"), if any
    pub alignment: Option<String>,

    /// Formatted runs whose texts concatenate to the paragraph text
    pub runs: Vec<Run>,

    /// Marked for removal; the writer drops the paragraph. Marking instead
    /// of deleting keeps block positions aligned with the source document.
    #[serde(default)]
    pub removed: bool,
}

/// A contiguous span of identically formatted text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Run {
    /// The run text
    pub text: String,

    /// Run-level formatting
    pub props: RunProps,
}

/// Run-level formatting flags and font info.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunProps {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub font_name: Option<String>,
    /// Font size in points
    pub font_size: Option<f32>,
}

/// A table: rows of cells, each cell holding paragraphs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

/// One table row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

/// One table cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
}

impl Paragraph {
    /// Create a plain paragraph with a single unformatted run.
    pub fn with_text(text: &str) -> Self {
        Self {
            style_name: "Normal".to_string(),
            runs: vec![Run { text: text.to_string(), props: RunProps::default() }],
            ..Self::default()
        }
    }

    /// The paragraph text: concatenation of all run texts.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Whether the trimmed paragraph text is empty.
    pub fn is_empty(&self) -> bool {
        self.text().trim().is_empty()
    }

    /// Replace the paragraph text keeping per-run formatting granularity:
    /// the new text goes into the first run, all later runs are cleared.
    pub fn set_text_in_first_run(&mut self, text: &str) {
        if self.runs.is_empty() {
            self.runs.push(Run { text: text.to_string(), props: RunProps::default() });
            return;
        }
        self.runs[0].text = text.to_string();
        for run in self.runs.iter_mut().skip(1) {
            run.text.clear();
        }
    }

    /// Replace the paragraph text as a single run, keeping the first run's
    /// formatting for the whole text.
    pub fn set_text_single_run(&mut self, text: &str) {
        let props = self.runs.first().map(|r| r.props.clone()).unwrap_or_default();
        self.runs = vec![Run { text: text.to_string(), props }];
    }
}

impl TableCell {
    /// Create a cell with one plain paragraph.
    pub fn with_text(text: &str) -> Self {
        Self { paragraphs: vec![Paragraph::with_text(text)] }
    }

    /// The cell text: paragraph texts joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace the cell text. The text goes into the first paragraph (first
    /// run preserved or single run, per `granular`); any further paragraphs
    /// are emptied.
    pub fn set_text(&mut self, text: &str, granular: bool) {
        if self.paragraphs.is_empty() {
            self.paragraphs.push(Paragraph::with_text(text));
            return;
        }
        if granular {
            self.paragraphs[0].set_text_in_first_run(text);
        } else {
            self.paragraphs[0].set_text_single_run(text);
        }
        for para in self.paragraphs.iter_mut().skip(1) {
            for run in &mut para.runs {
                run.text.clear();
            }
        }
    }
}

impl DocxDocument {
    /// Iterate body paragraphs (table cell paragraphs are not included),
    /// in document order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    /// Mutable variant of [`paragraphs`](Self::paragraphs).
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.blocks.iter_mut().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    /// Iterate tables in document order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    /// Mutable variant of [`tables`](Self::tables).
    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.blocks.iter_mut().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }
}
