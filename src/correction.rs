/*!
 * Post-reconstruction format correction.
 *
 * Detection is a pure scan producing findings; applying fixes is a separate
 * step so callers can report without touching the document. Findings are
 * advisory and never fail a job. Fixing is idempotent: a corrected document
 * yields no further fixable findings.
 */

use log::debug;

use crate::docx::{Block, DocxDocument};
use crate::structure::{Anchor, StructuralParser};

/// One detected formatting problem.
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    /// A table cell line exceeds the length limit without a line break.
    /// Fixable when the line has whitespace to wrap at.
    OverlongCellLine {
        anchor: Anchor,
        line_length: usize,
        fixable: bool,
    },

    /// A heading paragraph with no text. Always fixable by removal.
    EmptyHeading { anchor: Anchor, level: u8 },
}

impl Finding {
    pub fn is_fixable(&self) -> bool {
        match self {
            Self::OverlongCellLine { fixable, .. } => *fixable,
            Self::EmptyHeading { .. } => true,
        }
    }
}

/// Outcome of a correction pass.
#[derive(Debug, Default, Clone)]
pub struct CorrectionReport {
    /// Findings as detected before any fix
    pub findings: Vec<Finding>,

    /// Number of findings actually fixed
    pub fixes_applied: usize,
}

/// Detects and repairs formatting problems introduced by translation.
#[derive(Debug, Clone)]
pub struct FormatCorrector {
    /// Cell lines longer than this are flagged
    max_cell_line_length: usize,
}

impl Default for FormatCorrector {
    fn default() -> Self {
        Self::new(100)
    }
}

impl FormatCorrector {
    pub fn new(max_cell_line_length: usize) -> Self {
        Self {
            max_cell_line_length,
        }
    }

    /// Scan the document without modifying it.
    pub fn detect(&self, document: &DocxDocument) -> Vec<Finding> {
        let mut findings = Vec::new();

        let mut paragraph_index = 0;
        let mut table_index = 0;

        for block in &document.blocks {
            match block {
                Block::Paragraph(paragraph) => {
                    let level = StructuralParser::heading_level(&paragraph.style_name);
                    if !paragraph.removed && level > 0 && paragraph.is_empty() {
                        findings.push(Finding::EmptyHeading {
                            anchor: Anchor::paragraph(paragraph_index),
                            level,
                        });
                    }
                    paragraph_index += 1;
                }
                Block::Table(table) => {
                    for (row_index, row) in table.rows.iter().enumerate() {
                        for (col_index, cell) in row.cells.iter().enumerate() {
                            for line in cell.text().lines() {
                                let length = line.chars().count();
                                if length > self.max_cell_line_length {
                                    findings.push(Finding::OverlongCellLine {
                                        anchor: Anchor::table_cell(table_index, row_index, col_index),
                                        line_length: length,
                                        fixable: line.trim().contains(char::is_whitespace),
                                    });
                                }
                            }
                        }
                    }
                    table_index += 1;
                }
            }
        }

        findings
    }

    /// Detect and apply every fixable finding.
    pub fn correct(&self, document: &mut DocxDocument) -> CorrectionReport {
        let findings = self.detect(document);
        let mut fixes_applied = 0;

        // Wrap overlong cell lines
        for table in document.tables_mut() {
            for row in &mut table.rows {
                for cell in &mut row.cells {
                    let text = cell.text();
                    let wrapped = self.wrap_text(&text);
                    if wrapped != text {
                        cell.set_text(&wrapped, true);
                    }
                }
            }
        }
        fixes_applied += findings
            .iter()
            .filter(|f| matches!(f, Finding::OverlongCellLine { fixable: true, .. }))
            .count();

        // Empty headings are marked removed rather than deleted, so block
        // positions stay aligned with the source document for the writer
        for paragraph in document.paragraphs_mut() {
            if !paragraph.removed
                && StructuralParser::heading_level(&paragraph.style_name) > 0
                && paragraph.is_empty()
            {
                paragraph.removed = true;
                fixes_applied += 1;
            }
        }

        if fixes_applied > 0 {
            debug!("Format correction applied {} fixes", fixes_applied);
        }

        CorrectionReport {
            findings,
            fixes_applied,
        }
    }

    /// Re-wrap every line of `text` to the length limit. Lines without
    /// whitespace are left alone.
    fn wrap_text(&self, text: &str) -> String {
        text.lines()
            .map(|line| self.wrap_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Greedy wrap at whitespace; a single word longer than the limit stays
    /// unbroken.
    fn wrap_line(&self, line: &str) -> String {
        if line.chars().count() <= self.max_cell_line_length {
            return line.to_string();
        }

        let mut wrapped = String::with_capacity(line.len());
        let mut current_len = 0;

        for word in line.split_whitespace() {
            let word_len = word.chars().count();
            if current_len == 0 {
                wrapped.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= self.max_cell_line_length {
                wrapped.push(' ');
                wrapped.push_str(word);
                current_len += 1 + word_len;
            } else {
                wrapped.push('\n');
                wrapped.push_str(word);
                current_len = word_len;
            }
        }

        wrapped
    }
}
