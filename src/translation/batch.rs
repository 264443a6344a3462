/*!
 * Concurrent translation of a document's protected units.
 *
 * Small units are packed into marker-delimited batch requests to cut
 * per-request overhead; large units travel alone. Jobs run concurrently
 * under a semaphore. A batch whose response does not split back into the
 * expected number of segments is retried unit by unit, so one malformed
 * response never corrupts neighbouring units.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use tokio::sync::Semaphore;

use crate::errors::TranslationError;
use crate::structure::Anchor;

use super::core::{Degradation, ProtectedUnit, TranslationService};
use super::prompts::TranslationPromptBuilder;

/// Marker opening segment `n` of a batch payload.
fn segment_marker(index: usize) -> String {
    format!("<<SEG_{}>>", index)
}

/// Marker closing a batch payload.
const BATCH_END_MARKER: &str = "<<SEG_END>>";

/// Outcome of translating a set of units.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Successfully translated protected text, keyed by anchor
    pub results: HashMap<Anchor, String>,

    /// Units that exhausted their attempts, with the reason
    pub degraded: Vec<(Anchor, Degradation)>,

    /// Whether a cancellation request cut the run short
    pub cancelled: bool,
}

/// One unit of scheduled work.
enum Job {
    Single(ProtectedUnit),
    Batch(Vec<ProtectedUnit>),
}

impl Job {
    fn unit_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(units) => units.len(),
        }
    }
}

/// Result of one finished job.
struct JobResult {
    translated: Vec<(Anchor, String)>,
    degraded: Vec<(Anchor, Degradation)>,
    cancelled: bool,
}

/// Schedules protected units across concurrent provider requests.
pub struct BatchTranslator {
    service: Arc<TranslationService>,
}

impl BatchTranslator {
    pub fn new(service: Arc<TranslationService>) -> Self {
        Self { service }
    }

    /// Translate every unit, reporting progress as (units done, total).
    ///
    /// Cached units are resolved synchronously up front; only misses are
    /// scheduled. When `cancel` flips, in-flight jobs finish but no new job
    /// starts, and the outcome is flagged cancelled.
    pub async fn translate_units(
        &self,
        units: &[ProtectedUnit],
        target_language: &str,
        prompt: &TranslationPromptBuilder,
        cancel: Arc<AtomicBool>,
        progress_callback: impl Fn(usize, usize) + Send + Sync,
    ) -> BatchOutcome {
        let total = units.len();
        let mut outcome = BatchOutcome::default();

        // Cache pass first, so repeated content costs one request total
        let mut pending: Vec<ProtectedUnit> = Vec::new();
        for unit in units {
            match self
                .service
                .cache()
                .get(&unit.protected_text, unit.kind, target_language)
            {
                Some(cached) => {
                    outcome.results.insert(unit.anchor.clone(), cached);
                }
                None => pending.push(unit.clone()),
            }
        }
        let done = Arc::new(AtomicUsize::new(outcome.results.len()));
        progress_callback(done.load(Ordering::SeqCst), total);

        let jobs = self.plan_jobs(pending);
        debug!(
            "Scheduling {} jobs for {} uncached units ({} cache hits)",
            jobs.len(),
            total - outcome.results.len(),
            outcome.results.len()
        );

        let semaphore = Arc::new(Semaphore::new(
            self.service.config().concurrent_requests.max(1),
        ));

        let job_results: Vec<JobResult> = stream::iter(jobs)
            .map(|job| {
                let semaphore = semaphore.clone();
                let cancel = cancel.clone();
                let done = done.clone();
                let progress = &progress_callback;
                async move {
                    // Closed semaphore cannot happen; treat it as cancellation
                    let _permit = match semaphore.acquire().await {
                        Ok(permit) => permit,
                        Err(_) => {
                            return JobResult {
                                translated: Vec::new(),
                                degraded: Vec::new(),
                                cancelled: true,
                            };
                        }
                    };

                    if cancel.load(Ordering::SeqCst) {
                        return JobResult {
                            translated: Vec::new(),
                            degraded: Vec::new(),
                            cancelled: true,
                        };
                    }

                    let unit_count = job.unit_count();
                    let result = match job {
                        Job::Single(unit) => self.run_single(unit, target_language, prompt).await,
                        Job::Batch(units) => self.run_batch(units, target_language, prompt).await,
                    };

                    let current = done.fetch_add(unit_count, Ordering::SeqCst) + unit_count;
                    progress(current, total);
                    result
                }
            })
            .buffer_unordered(self.service.config().concurrent_requests.max(1))
            .collect()
            .await;

        for job_result in job_results {
            outcome.cancelled |= job_result.cancelled;
            for (anchor, text) in job_result.translated {
                outcome.results.insert(anchor, text);
            }
            outcome.degraded.extend(job_result.degraded);
        }

        outcome
    }

    /// Group small units into batches; large units go out alone.
    fn plan_jobs(&self, pending: Vec<ProtectedUnit>) -> Vec<Job> {
        let threshold = self.service.config().batch_char_threshold;
        let max_units = self.service.config().batch_max_units.max(1);

        let mut jobs = Vec::new();
        let mut current_batch: Vec<ProtectedUnit> = Vec::new();

        for unit in pending {
            if unit.protected_text.chars().count() >= threshold {
                jobs.push(Job::Single(unit));
                continue;
            }
            current_batch.push(unit);
            if current_batch.len() >= max_units {
                jobs.push(Job::Batch(std::mem::take(&mut current_batch)));
            }
        }
        match current_batch.len() {
            0 => {}
            1 => jobs.push(Job::Single(current_batch.remove(0))),
            _ => jobs.push(Job::Batch(current_batch)),
        }

        jobs
    }

    async fn run_single(
        &self,
        unit: ProtectedUnit,
        target_language: &str,
        prompt: &TranslationPromptBuilder,
    ) -> JobResult {
        match self
            .service
            .translate_protected(&unit.protected_text, unit.kind, target_language, prompt)
            .await
        {
            Ok(translated) => JobResult {
                translated: vec![(unit.anchor, translated)],
                degraded: Vec::new(),
                cancelled: false,
            },
            Err(e) => JobResult {
                translated: Vec::new(),
                degraded: vec![(unit.anchor, Degradation::TranslationFailure(e.to_string()))],
                cancelled: false,
            },
        }
    }

    /// Translate a batch in one request; fall back to per-unit requests when
    /// the response does not split back cleanly.
    async fn run_batch(
        &self,
        units: Vec<ProtectedUnit>,
        target_language: &str,
        prompt: &TranslationPromptBuilder,
    ) -> JobResult {
        let payload = Self::assemble_batch(&units);

        match self
            .service
            .request_with_retries(&prompt.build_system_prompt(), &payload)
            .await
        {
            Ok(response) => {
                let segments = Self::split_batch_response(&response);
                if segments.len() == units.len() {
                    let mut translated = Vec::with_capacity(units.len());
                    for (unit, segment) in units.into_iter().zip(segments) {
                        self.service.cache().store(
                            &unit.protected_text,
                            unit.kind,
                            target_language,
                            &segment,
                        );
                        translated.push((unit.anchor, segment));
                    }
                    JobResult {
                        translated,
                        degraded: Vec::new(),
                        cancelled: false,
                    }
                } else {
                    warn!(
                        "Batch returned {} segments for {} units, retrying per unit: {}",
                        segments.len(),
                        units.len(),
                        TranslationError::BatchCardinalityMismatch {
                            returned: segments.len(),
                            expected: units.len(),
                        }
                    );
                    self.fallback_per_unit(units, target_language, prompt).await
                }
            }
            Err(e) => {
                warn!("Batch request failed, retrying per unit: {}", e);
                self.fallback_per_unit(units, target_language, prompt).await
            }
        }
    }

    async fn fallback_per_unit(
        &self,
        units: Vec<ProtectedUnit>,
        target_language: &str,
        prompt: &TranslationPromptBuilder,
    ) -> JobResult {
        let mut result = JobResult {
            translated: Vec::new(),
            degraded: Vec::new(),
            cancelled: false,
        };
        for unit in units {
            let single = self.run_single(unit, target_language, prompt).await;
            result.translated.extend(single.translated);
            result.degraded.extend(single.degraded);
        }
        result
    }

    /// Combine unit texts under numbered markers.
    fn assemble_batch(units: &[ProtectedUnit]) -> String {
        let mut payload = String::new();
        for (index, unit) in units.iter().enumerate() {
            payload.push_str(&segment_marker(index));
            payload.push('\n');
            payload.push_str(&unit.protected_text);
            payload.push('\n');
        }
        payload.push_str(BATCH_END_MARKER);
        payload
    }

    /// Split a batch response back into per-unit texts, in marker order.
    fn split_batch_response(response: &str) -> Vec<String> {
        let mut segments: Vec<String> = Vec::new();
        let mut current: Option<String> = None;

        for line in response.lines() {
            let trimmed = line.trim();
            if trimmed == BATCH_END_MARKER {
                break;
            }
            if trimmed.starts_with("<<SEG_") && trimmed.ends_with(">>") {
                if let Some(segment) = current.take() {
                    segments.push(segment.trim().to_string());
                }
                current = Some(String::new());
                continue;
            }
            if let Some(segment) = current.as_mut() {
                if !segment.is_empty() {
                    segment.push('\n');
                }
                segment.push_str(line);
            }
        }
        if let Some(segment) = current.take() {
            segments.push(segment.trim().to_string());
        }

        segments
    }
}
