/*!
 * # doctrans - Structure-Preserving AI Document Translation
 *
 * A Rust library for translating the textual content of DOCX documents
 * while preserving their formatting, layout, and protected tokens.
 *
 * ## Features
 *
 * - Decompose a document into content, format, and layout layers addressed
 *   by stable anchors
 * - Protect substrings that must survive translation verbatim (platform
 *   names, protocols, project identifiers)
 * - Translate through any OpenAI-compatible chat completion API, with
 *   caching, batching, and bounded retries
 * - Write translations back with a length-aware run strategy so character
 *   formatting survives where it still makes sense
 * - Detect and repair fidelity defects introduced by translation (table
 *   overflow, orphaned empty headings)
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `docx`: Package I/O and the document model (reader, writer)
 * - `structure`: Anchored three-layer decomposition of a document
 * - `protection`: Reversible masking of protected tokens
 * - `translation`: AI-powered translation services:
 *   - `translation::core`: Provider-backed service with retries and cache
 *   - `translation::batch`: Concurrent scheduling and batching of units
 *   - `translation::cache`: Process-wide translation cache
 *   - `translation::prompts`: Prompt construction
 * - `reconstruction`: Writing translated text back into the document
 * - `correction`: Post-reconstruction format findings and fixes
 * - `pipeline`: The stage-sequencing orchestrator
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for completion providers
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod correction;
pub mod docx;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod pipeline;
pub mod protection;
pub mod providers;
pub mod reconstruction;
pub mod structure;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use docx::DocxPackage;
pub use errors::{AppError, ParseError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use pipeline::{PipelineOutcome, PipelineReport, TranslationJob, TranslationPipeline};
pub use structure::{Anchor, ContentUnit, DocumentStructure, StructuralParser};
pub use translation::TranslationService;
