/*!
 * The document translation pipeline.
 *
 * Stages run strictly in order: Parse, Protect, Translate, Restore,
 * Reconstruct, Correct. Every stage consumes the previous stage's
 * anchor-keyed output; nothing backtracks. Unit-level failures degrade
 * that unit to its original text and are summarized in the report; only a
 * parse failure or a reconstruction inconsistency aborts the document.
 *
 * All mutation happens on an in-memory working copy of the document, so a
 * cancelled or failed run never leaves a half-translated package behind.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{info, warn};

use crate::app_config::Config;
use crate::correction::{Finding, FormatCorrector};
use crate::docx::{parse_document_xml, rewrite_document_xml, DocxPackage};
use crate::errors::{AppError, ProtectionAnomaly};
use crate::protection::{builtin_lexicon, TokenProtector};
use crate::providers::Provider;
use crate::reconstruction::{ReconstructionStats, SmartReconstructor};
use crate::structure::{Anchor, StructuralParser};
use crate::translation::{
    prompts, BatchTranslator, ProtectedUnit, TranslationPromptBuilder, TranslationService,
};

/// How many leading units feed the per-request context excerpt.
const CONTEXT_EXCERPT_UNITS: usize = 10;
const CONTEXT_EXCERPT_CHARS: usize = 600;

/// Pipeline progress through its stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Parsed,
    Protected,
    Translated,
    Restored,
    Reconstructed,
    Corrected,
    Done,
    /// Terminal: the document could not be parsed, or the run was cancelled
    /// before any output was committed.
    Aborted,
}

/// One translation run, holding its cancellation flag.
///
/// In-flight pipeline progress belongs to this job, not to any global
/// state; cloning the handle lets a UI thread cancel a running job.
#[derive(Debug, Clone, Default)]
pub struct TranslationJob {
    cancel: Arc<AtomicBool>,
}

impl TranslationJob {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; no new provider calls are issued afterwards.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }
}

/// Summary of one pipeline run.
#[derive(Debug)]
pub struct PipelineReport {
    /// Final state reached
    pub state: PipelineState,

    /// Translatable units found in the document
    pub total_units: usize,

    /// Units whose translation was committed
    pub translated_units: usize,

    /// Units that fell back to their original text, with the reason
    pub degraded_units: Vec<(Anchor, String)>,

    /// Format findings detected after reconstruction
    pub findings: Vec<Finding>,

    /// Format fixes applied
    pub fixes_applied: usize,

    /// Run strategy counters from reconstruction
    pub reconstruction: ReconstructionStats,

    /// Wall-clock duration in milliseconds
    pub duration_ms: u128,
}

impl PipelineReport {
    pub fn is_degraded(&self) -> bool {
        !self.degraded_units.is_empty()
    }
}

/// Result of a run: the rewritten package (absent when cancelled) plus the
/// report.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub package: Option<DocxPackage>,
    pub report: PipelineReport,
}

/// Sequences the stages and owns the per-stage collaborators.
pub struct TranslationPipeline {
    config: Config,
    service: Arc<TranslationService>,
    parser: StructuralParser,
    protector: TokenProtector,
    reconstructor: SmartReconstructor,
    corrector: FormatCorrector,
}

impl TranslationPipeline {
    /// Build a pipeline backed by the configured HTTP provider.
    pub fn new(config: Config) -> Self {
        let service = Arc::new(TranslationService::new(config.translation.clone()));
        Self::with_service(config, service)
    }

    /// Build a pipeline with an explicit provider.
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Self {
        let service = Arc::new(TranslationService::with_provider(
            provider,
            config.translation.clone(),
        ));
        Self::with_service(config, service)
    }

    pub fn with_service(config: Config, service: Arc<TranslationService>) -> Self {
        let protector = TokenProtector::new(config.protection.require_word_boundaries);
        let corrector = FormatCorrector::new(config.correction.max_cell_line_length);
        Self {
            config,
            service,
            parser: StructuralParser::new(),
            protector,
            reconstructor: SmartReconstructor::default(),
            corrector,
        }
    }

    pub fn service(&self) -> Arc<TranslationService> {
        self.service.clone()
    }

    /// Run the full pipeline over one package.
    ///
    /// `progress_callback` receives (units done, units total) during the
    /// Translate stage.
    pub async fn run(
        &self,
        package: &DocxPackage,
        job: &TranslationJob,
        progress_callback: impl Fn(usize, usize) + Send + Sync,
    ) -> Result<PipelineOutcome, AppError> {
        let started = Instant::now();

        // Parse (fatal on failure)
        let xml = package.document_xml()?;
        let mut document = parse_document_xml(xml)?;
        let mut state = PipelineState::Parsed;
        log::debug!("Pipeline state: {:?}", state);

        let media_targets = package.media_entries();
        let structure = self.parser.parse(&document, &media_targets);
        let units: Vec<_> = structure.translatable_units().cloned().collect();
        info!(
            "Parsed document: {} translatable units, {} paragraphs, {} tables, {} images",
            units.len(),
            structure.metadata.total_paragraphs,
            structure.metadata.total_tables,
            structure.metadata.total_images
        );

        let target_language = &self.config.target_language;
        let prompt = self.build_prompt(&units);

        // Protect
        let mut protected_units = Vec::with_capacity(units.len());
        for unit in &units {
            if job.is_cancelled() {
                return Ok(self.aborted(units.len(), started));
            }

            let mut tokens: Vec<String> =
                builtin_lexicon().iter().map(|t| t.to_string()).collect();
            tokens.extend(self.config.protection.custom_tokens.iter().cloned());
            if self.config.protection.entity_detection {
                tokens.extend(self.service.identify_entities(&unit.text).await);
            }

            let (protected_text, map) = self.protector.protect(&unit.text, &tokens);
            protected_units.push(ProtectedUnit {
                anchor: unit.anchor.clone(),
                kind: unit.kind,
                original_text: unit.text.clone(),
                protected_text,
                map,
            });
        }
        state = PipelineState::Protected;
        log::debug!("Pipeline state: {:?}", state);

        // Translate
        let batcher = BatchTranslator::new(self.service.clone());
        let outcome = batcher
            .translate_units(
                &protected_units,
                target_language,
                &prompt,
                job.cancel_handle(),
                progress_callback,
            )
            .await;

        if outcome.cancelled {
            info!("Run cancelled during translation, discarding partial results");
            return Ok(self.aborted(units.len(), started));
        }
        state = PipelineState::Translated;
        log::debug!("Pipeline state: {:?}", state);

        let mut degraded_units: Vec<(Anchor, String)> = outcome
            .degraded
            .iter()
            .map(|(anchor, reason)| (anchor.clone(), reason.to_string()))
            .collect();

        // Restore placeholders; a failed round trip degrades the unit
        let mut results: HashMap<Anchor, String> = HashMap::new();
        for unit in &protected_units {
            let Some(translated) = outcome.results.get(&unit.anchor) else {
                continue;
            };
            match self.protector.restore(translated, &unit.map) {
                Ok(restored) => {
                    results.insert(unit.anchor.clone(), restored);
                }
                Err(e) => {
                    let anomaly = ProtectionAnomaly {
                        anchor: unit.anchor.as_str().to_string(),
                        placeholder: e.placeholder,
                    };
                    warn!("Unit kept untranslated: {}", anomaly);
                    degraded_units.push((unit.anchor.clone(), anomaly.to_string()));
                }
            }
        }
        state = PipelineState::Restored;
        log::debug!("Pipeline state: {:?}", state);

        // Reconstruct (fatal on anchor inconsistency)
        let reconstruction = self.reconstructor.apply(&mut document, &results)?;
        state = PipelineState::Reconstructed;
        log::debug!("Pipeline state: {:?}", state);

        // Correct (never fatal)
        let (findings, fixes_applied) = if self.config.correction.autofix {
            let report = self.corrector.correct(&mut document);
            (report.findings, report.fixes_applied)
        } else {
            (self.corrector.detect(&document), 0)
        };
        state = PipelineState::Corrected;
        log::debug!("Pipeline state: {:?}", state);

        // Commit the working copy back into the package. Rewriting the
        // original part keeps everything the model does not capture.
        let new_xml = rewrite_document_xml(xml, &document)?;
        let mut output = package.clone();
        output.set_document_xml(new_xml);
        state = PipelineState::Done;
        log::debug!("Pipeline state: {:?}", state);

        let translated_units = results.len();
        if !degraded_units.is_empty() {
            warn!(
                "{} of {} units fell back to their original text",
                degraded_units.len(),
                units.len()
            );
        }

        Ok(PipelineOutcome {
            package: Some(output),
            report: PipelineReport {
                state,
                total_units: units.len(),
                translated_units,
                degraded_units,
                findings,
                fixes_applied,
                reconstruction,
                duration_ms: started.elapsed().as_millis(),
            },
        })
    }

    fn build_prompt(&self, units: &[crate::structure::ContentUnit]) -> TranslationPromptBuilder {
        let excerpt = prompts::context_excerpt(units, CONTEXT_EXCERPT_UNITS, CONTEXT_EXCERPT_CHARS);

        let target_name = crate::language_utils::get_language_name(&self.config.target_language)
            .unwrap_or_else(|_| self.config.target_language.clone());

        TranslationPromptBuilder::new(&target_name)
            .with_context_excerpt(&excerpt)
            .with_terminology(&self.config.terminology)
            .with_style_exemplars(&self.config.style_exemplars)
    }

    fn aborted(&self, total_units: usize, started: Instant) -> PipelineOutcome {
        PipelineOutcome {
            package: None,
            report: PipelineReport {
                state: PipelineState::Aborted,
                total_units,
                translated_units: 0,
                degraded_units: Vec::new(),
                findings: Vec::new(),
                fixes_applied: 0,
                reconstruction: ReconstructionStats::default(),
                duration_ms: started.elapsed().as_millis(),
            },
        }
    }
}
