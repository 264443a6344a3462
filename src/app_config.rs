use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Token protection config
    #[serde(default)]
    pub protection: ProtectionConfig,

    /// Format correction config
    #[serde(default)]
    pub correction: CorrectionConfig,

    /// Required source term -> target term translations
    #[serde(default)]
    pub terminology: BTreeMap<String, String>,

    /// Sample sentences in the target language fixing the register
    #[serde(default)]
    pub style_exemplars: Vec<String>,

    /// Options for the external format-conversion fallback, when one is
    /// wired in
    #[serde(default)]
    pub conversion: Option<ConversionOptions>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider settings (OpenAI-compatible chat completion API)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// API key for the provider
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Endpoint override; None means the public OpenAI API
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output token cap per request
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Number of attempts per request before giving up
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff time, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Maximum concurrent in-flight requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Units shorter than this (in chars) are batched together
    #[serde(default = "default_batch_char_threshold")]
    pub batch_char_threshold: usize,

    /// Maximum units per batch request
    #[serde(default = "default_batch_max_units")]
    pub batch_max_units: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: String::new(),
            endpoint: None,
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            concurrent_requests: default_concurrent_requests(),
            batch_char_threshold: default_batch_char_threshold(),
            batch_max_units: default_batch_max_units(),
        }
    }
}

/// Token protection settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProtectionConfig {
    /// Require word boundaries around protected-token matches
    #[serde(default)]
    pub require_word_boundaries: bool,

    /// Ask the provider to identify document-specific proper nouns
    #[serde(default = "default_true")]
    pub entity_detection: bool,

    /// Extra tokens to protect, on top of the builtin lexicon
    #[serde(default)]
    pub custom_tokens: Vec<String>,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        Self {
            require_word_boundaries: false,
            entity_detection: default_true(),
            custom_tokens: Vec::new(),
        }
    }
}

/// Format correction settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CorrectionConfig {
    /// A table cell line longer than this without a break is a finding
    #[serde(default = "default_max_cell_line_length")]
    pub max_cell_line_length: usize,

    /// Apply fixes automatically instead of only reporting findings
    #[serde(default = "default_true")]
    pub autofix: bool,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            max_cell_line_length: default_max_cell_line_length(),
            autofix: default_true(),
        }
    }
}

/// Options passed to the external whole-document format converter.
///
/// Every recognized option is an explicit field; unknown keys in the config
/// file are rejected instead of being silently ignored.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConversionOptions {
    /// Produce a standalone document
    #[serde(default = "default_true")]
    pub standalone: bool,

    /// Emit a table of contents
    #[serde(default)]
    pub toc: bool,

    /// Heading depth of the table of contents
    #[serde(default = "default_toc_depth")]
    pub toc_depth: u8,

    /// Number sections in the output
    #[serde(default)]
    pub number_sections: bool,

    /// Embed linked resources into the output document
    #[serde(default)]
    pub embed_resources: bool,

    /// Keep literal tabs instead of expanding them
    #[serde(default = "default_true")]
    pub preserve_tabs: bool,

    /// Line-wrapping mode ("none", "auto", "preserve")
    #[serde(default = "default_wrap")]
    pub wrap: String,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            standalone: default_true(),
            toc: false,
            toc_depth: default_toc_depth(),
            number_sections: false,
            embed_resources: false,
            preserve_tabs: default_true(),
            wrap: default_wrap(),
        }
    }
}

/// Log level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_output_tokens() -> u32 {
    4096
}

fn default_retry_count() -> u32 {
    3 // Default to 3 retries
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_batch_char_threshold() -> usize {
    120
}

fn default_batch_max_units() -> usize {
    8
}

fn default_max_cell_line_length() -> usize {
    100
}

fn default_toc_depth() -> u8 {
    6
}

fn default_wrap() -> String {
    "none".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_language: "fr".to_string(),
            translation: TranslationConfig::default(),
            protection: ProtectionConfig::default(),
            correction: CorrectionConfig::default(),
            terminology: BTreeMap::new(),
            style_exemplars: Vec::new(),
            conversion: None,
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref()).map_err(|e| {
            anyhow!("Failed to open config file {}: {}", path.as_ref().display(), e)
        })?;
        let reader = std::io::BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .map_err(|e| anyhow!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file if it exists, otherwise use defaults
    pub fn from_file_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;
        std::fs::write(path.as_ref(), config_json)
            .map_err(|e| anyhow!("Failed to write config file: {}", e))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        if self.translation.model.is_empty() {
            return Err(anyhow!("Translation model name must not be empty"));
        }
        if let Some(endpoint) = &self.translation.endpoint {
            url::Url::parse(endpoint)
                .map_err(|e| anyhow!("Invalid endpoint URL '{}': {}", endpoint, e))?;
        }
        if self.translation.retry_count == 0 {
            return Err(anyhow!("retry_count must be at least 1"));
        }
        if self.translation.concurrent_requests == 0 {
            return Err(anyhow!("concurrent_requests must be at least 1"));
        }
        if self.translation.batch_max_units == 0 {
            return Err(anyhow!("batch_max_units must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.translation.temperature) {
            return Err(anyhow!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.translation.temperature
            ));
        }
        if self.correction.max_cell_line_length == 0 {
            return Err(anyhow!("max_cell_line_length must be at least 1"));
        }
        if let Some(conversion) = &self.conversion {
            if !(1..=6).contains(&conversion.toc_depth) {
                return Err(anyhow!(
                    "toc_depth must be between 1 and 6, got {}",
                    conversion.toc_depth
                ));
            }
            if !matches!(conversion.wrap.as_str(), "none" | "auto" | "preserve") {
                return Err(anyhow!(
                    "wrap must be one of none, auto, preserve; got '{}'",
                    conversion.wrap
                ));
            }
        }

        Ok(())
    }

    /// Convert the log level to the `log` crate's filter
    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.log_level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_shouldValidate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.translation.retry_count, 3);
        assert_eq!(config.correction.max_cell_line_length, 100);
        assert!(config.protection.entity_detection);
    }

    #[test]
    fn test_config_invalidLanguage_shouldFailValidation() {
        let config = Config {
            target_language: "xx-not-a-language".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_zeroRetries_shouldFailValidation() {
        let mut config = Config::default();
        config.translation.retry_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_conversionOptions_unknownKey_shouldBeRejected() {
        let json = r#"{
            "target_language": "de",
            "conversion": { "toc": true, "pdf_engine": "xelatex" }
        }"#;
        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_conversionOptions_badTocDepth_shouldFailValidation() {
        let config = Config {
            conversion: Some(ConversionOptions { toc_depth: 0, ..Default::default() }),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_fromJson_shouldFillDefaults() {
        let json = r#"{ "target_language": "de", "translation": { "model": "gpt-4o" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.source_language, "en");
        assert_eq!(config.target_language, "de");
        assert_eq!(config.translation.model, "gpt-4o");
        assert_eq!(config.translation.concurrent_requests, 4);
    }
}
