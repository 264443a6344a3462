/*!
 * Writing translated text back into the document model.
 *
 * The length delta between original and translated text decides the run
 * strategy for each unit. Below the threshold the translation lands in the
 * first run and later runs are emptied, keeping that run's character
 * formatting; at or above it the distribution of formatting across runs is
 * meaningless for the new text, so the unit collapses to a single run.
 *
 * Anchors are re-derived by walking the body in the same order the parser
 * did, so a unit found at parse time is always found again here. A result
 * anchor with no counterpart in the document means the caller mixed up
 * documents, and the whole pass fails.
 */

use std::collections::HashMap;

use log::debug;

use crate::docx::{Block, DocxDocument};
use crate::errors::ReconstructionError;
use crate::structure::Anchor;

/// Counters describing one reconstruction pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReconstructionStats {
    /// Units whose text was replaced
    pub units_applied: usize,

    /// Of those, units collapsed to a single run
    pub single_run_rewrites: usize,
}

/// Applies translated text to a document, choosing a run strategy per unit.
#[derive(Debug, Clone)]
pub struct SmartReconstructor {
    /// Relative length change at which formatting granularity is dropped
    delta_threshold: f64,
}

impl Default for SmartReconstructor {
    fn default() -> Self {
        Self {
            delta_threshold: 0.5,
        }
    }
}

impl SmartReconstructor {
    pub fn new(delta_threshold: f64) -> Self {
        Self { delta_threshold }
    }

    /// Replace unit texts in place. Anchors absent from `results` stay
    /// untouched; anchors in `results` absent from the document fail the
    /// pass.
    pub fn apply(
        &self,
        document: &mut DocxDocument,
        results: &HashMap<Anchor, String>,
    ) -> Result<ReconstructionStats, ReconstructionError> {
        let mut stats = ReconstructionStats::default();
        let mut seen_anchors: Vec<Anchor> = Vec::new();

        let mut paragraph_index = 0;
        let mut table_index = 0;

        for block in &mut document.blocks {
            match block {
                Block::Paragraph(paragraph) => {
                    let anchor = Anchor::paragraph(paragraph_index);
                    paragraph_index += 1;

                    if let Some(translated) = results.get(&anchor) {
                        let original = paragraph.text();
                        if self.keeps_granularity(&original, translated) {
                            paragraph.set_text_in_first_run(translated);
                        } else {
                            paragraph.set_text_single_run(translated);
                            stats.single_run_rewrites += 1;
                        }
                        stats.units_applied += 1;
                    }
                    seen_anchors.push(anchor);
                }
                Block::Table(table) => {
                    for (row_index, row) in table.rows.iter_mut().enumerate() {
                        for (col_index, cell) in row.cells.iter_mut().enumerate() {
                            let anchor = Anchor::table_cell(table_index, row_index, col_index);

                            if let Some(translated) = results.get(&anchor) {
                                let original = cell.text();
                                let granular = self.keeps_granularity(&original, translated);
                                cell.set_text(translated, granular);
                                if !granular {
                                    stats.single_run_rewrites += 1;
                                }
                                stats.units_applied += 1;
                            }
                            seen_anchors.push(anchor);
                        }
                    }
                    table_index += 1;
                }
            }
        }

        // Every result anchor must have been consumed by the walk
        for anchor in results.keys() {
            if !seen_anchors.contains(anchor) {
                return Err(ReconstructionError::AnchorNotFound(anchor.as_str().to_string()));
            }
        }

        debug!(
            "Reconstruction applied {} units ({} single-run rewrites)",
            stats.units_applied, stats.single_run_rewrites
        );
        Ok(stats)
    }

    /// Whether the translated text is close enough in length to keep the
    /// original run structure.
    fn keeps_granularity(&self, original: &str, translated: &str) -> bool {
        let old_len = original.chars().count();
        let new_len = translated.chars().count();
        if old_len == 0 {
            return new_len == 0;
        }
        let delta = (new_len as f64 - old_len as f64).abs() / old_len as f64;
        delta < self.delta_threshold
    }
}
