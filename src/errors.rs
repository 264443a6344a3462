/*!
 * Error types for the doctrans application.
 *
 * This module contains custom error types for different parts of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 *
 * The taxonomy distinguishes failures by blast radius: parse and
 * reconstruction errors abort the whole document, everything else is
 * contained at the unit or batch boundary and degrades the affected result.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Fatal errors raised while opening or decomposing the input document.
///
/// A parse error aborts the whole document-level operation.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The package could not be opened or is not a zip archive
    #[error("Failed to open document package: {0}")]
    Package(String),

    /// A required package entry is missing
    #[error("Missing package entry: {0}")]
    MissingEntry(String),

    /// The document XML could not be parsed
    #[error("Failed to parse document XML: {0}")]
    Xml(String),
}

/// Errors that can occur during translation of a single unit or batch.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// All retry attempts for a unit were exhausted
    #[error("Translation failed after {attempts} attempts: {message}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Last error message
        message: String
    },

    /// A batched response did not split back into the same number of segments
    #[error("Batch returned {returned} segments, expected {expected}")]
    BatchCardinalityMismatch {
        /// Number of segments recovered from the response
        returned: usize,
        /// Number of segments sent
        expected: usize
    },
}

/// A protected-token round trip failed verification for one unit.
///
/// Non-fatal: the affected unit keeps its original text.
#[derive(Error, Debug)]
#[error("Protection anomaly for unit {anchor}: placeholder {placeholder} missing from translated text")]
pub struct ProtectionAnomaly {
    /// Anchor of the affected unit
    pub anchor: String,
    /// The placeholder that was dropped or mangled by the translator
    pub placeholder: String,
}

/// Fatal inconsistency found while writing translations back.
#[derive(Error, Debug)]
pub enum ReconstructionError {
    /// A translated anchor no longer exists in the document
    #[error("Anchor {0} present in translation result but absent from document")]
    AnchorNotFound(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error parsing the input document
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error during document reconstruction
    #[error("Reconstruction error: {0}")]
    Reconstruction(#[from] ReconstructionError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
