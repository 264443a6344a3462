/*!
 * Translation subsystem.
 *
 * - `core`: the provider-backed service with retries and cache integration
 * - `batch`: concurrent scheduling and marker-based batching of units
 * - `cache`: the process-wide memoization layer
 * - `prompts`: system prompt and entity-identification prompt construction
 */

pub use self::batch::{BatchOutcome, BatchTranslator};
pub use self::cache::TranslationCache;
pub use self::core::{Degradation, ProtectedUnit, TranslationService};
pub use self::prompts::TranslationPromptBuilder;

pub mod batch;
pub mod cache;
pub mod core;
pub mod prompts;
