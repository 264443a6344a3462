/*!
 * Core translation service.
 *
 * One service instance wraps a provider with retries, caching, and prompt
 * construction. It works exclusively on protected text: masking happens
 * before a unit reaches this module and restoration after, so the cache key
 * and the wire payload always agree.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::app_config::TranslationConfig;
use crate::errors::TranslationError;
use crate::providers::openai::OpenAI;
use crate::providers::{ChatRequest, Provider};
use crate::protection::ProtectionMap;
use crate::structure::{Anchor, UnitKind};

use super::cache::TranslationCache;
use super::prompts::{self, TranslationPromptBuilder};

/// Process-wide memo for entity identification, keyed by unit text. The
/// same phrase repeated across a document (or across runs) costs one
/// provider call; failures are not memoized so a recovered provider gets
/// asked again.
static ENTITY_MEMO: Lazy<RwLock<HashMap<String, Vec<String>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// A content unit after masking, ready for translation.
#[derive(Debug, Clone)]
pub struct ProtectedUnit {
    /// Anchor of the underlying content unit
    pub anchor: Anchor,

    /// Kind of the underlying content unit
    pub kind: UnitKind,

    /// Original unit text, kept for fallback
    pub original_text: String,

    /// Text with protected tokens replaced by placeholders
    pub protected_text: String,

    /// Reversible substitution map for this unit
    pub map: ProtectionMap,
}

/// Why a unit fell back to its original text.
#[derive(Debug, Clone, PartialEq)]
pub enum Degradation {
    /// Every translation attempt failed
    TranslationFailure(String),

    /// The translator mangled a protection placeholder
    ProtectionAnomaly(String),
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TranslationFailure(message) => write!(f, "translation failed: {}", message),
            Self::ProtectionAnomaly(placeholder) => {
                write!(f, "placeholder {} lost in translation", placeholder)
            }
        }
    }
}

/// Translation service wrapping a provider with retries and caching.
pub struct TranslationService {
    /// The provider backing requests
    provider: Arc<dyn Provider>,

    /// Translation configuration
    config: TranslationConfig,

    /// Shared translation cache
    cache: TranslationCache,
}

impl TranslationService {
    /// Create a service backed by the configured HTTP provider and the
    /// process-wide cache.
    pub fn new(config: TranslationConfig) -> Self {
        let provider = Arc::new(OpenAI::new(
            config.api_key.clone(),
            config.endpoint.clone().unwrap_or_default(),
            config.model.clone(),
        ));
        Self::with_provider(provider, config)
    }

    /// Create a service with an explicit provider (used by tests and by
    /// callers wiring a non-default backend).
    pub fn with_provider(provider: Arc<dyn Provider>, config: TranslationConfig) -> Self {
        Self {
            provider,
            config,
            cache: TranslationCache::global(),
        }
    }

    /// Swap the shared cache for a private one (tests).
    pub fn with_cache(mut self, cache: TranslationCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Translate one protected text, consulting the cache first.
    ///
    /// Callers restore placeholders afterwards; the cached value is the raw
    /// provider response with placeholders intact.
    pub async fn translate_protected(
        &self,
        protected_text: &str,
        kind: UnitKind,
        target_language: &str,
        prompt: &TranslationPromptBuilder,
    ) -> Result<String, TranslationError> {
        if let Some(cached) = self.cache.get(protected_text, kind, target_language) {
            return Ok(cached);
        }

        let translated = self
            .request_with_retries(&prompt.build_system_prompt(), protected_text)
            .await?;

        self.cache.store(protected_text, kind, target_language, &translated);
        Ok(translated)
    }

    /// Ask the provider which proper nouns in `text` must not be translated.
    ///
    /// Best-effort: any failure degrades to an empty list with a warning,
    /// since the builtin lexicon still applies.
    pub async fn identify_entities(&self, text: &str) -> Vec<String> {
        if let Some(entities) = ENTITY_MEMO.read().get(text) {
            debug!("Entity memo hit for '{}'", text.chars().take(30).collect::<String>());
            return entities.clone();
        }

        let (system, user) = prompts::entity_identification_prompt(text);
        let request = ChatRequest::new(system, user)
            .temperature(0.0)
            .max_tokens(256);

        match self.provider.complete(request).await {
            Ok(response) => {
                let entities = prompts::parse_entity_response(&response, text);
                ENTITY_MEMO.write().insert(text.to_string(), entities.clone());
                entities
            }
            Err(e) => {
                warn!("Entity identification unavailable, using lexicon only: {}", e);
                Vec::new()
            }
        }
    }

    /// Send one request, retrying transient failures with exponential
    /// backoff. Batch requests go through here directly since their
    /// combined payload is not a cacheable unit.
    pub(crate) async fn request_with_retries(
        &self,
        system_prompt: &str,
        user_text: &str,
    ) -> Result<String, TranslationError> {
        let attempts = self.config.retry_count.max(1);
        let mut last_error = String::new();

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.config.retry_backoff_ms * (1 << (attempt - 1).min(6)) as u64;
                debug!("Retry {}/{} after {}ms", attempt + 1, attempts, delay);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            let request = ChatRequest::new(system_prompt, user_text)
                .temperature(self.config.temperature)
                .max_tokens(self.config.max_output_tokens);

            match self.provider.complete(request).await {
                Ok(response) => return Ok(response.trim().to_string()),
                Err(e) => {
                    warn!("Translation request failed (attempt {}/{}): {}", attempt + 1, attempts, e);
                    last_error = e.to_string();
                }
            }
        }

        Err(TranslationError::RetriesExhausted {
            attempts,
            message: last_error,
        })
    }
}

impl std::fmt::Debug for TranslationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationService")
            .field("provider", &self.provider)
            .field("model", &self.config.model)
            .finish()
    }
}
