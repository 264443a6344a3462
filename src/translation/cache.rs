/*!
 * Translation caching functionality.
 *
 * Requests are memoized by normalized (protected_text, kind, target_lang)
 * key so identical content (a phrase repeated across cells, say) is
 * translated once. The cache is process-wide and append-only for the
 * lifetime of the process; entries are idempotent, so racing two writes of
 * the same key is harmless. Growth is unbounded (documented open concern).
 */

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::structure::UnitKind;

/// Cache key combining protected source text, unit kind, and target language
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    /// Protected source text (placeholders included)
    protected_text: String,

    /// Kind of the content unit
    kind: UnitKind,

    /// Target language code
    target_language: String,
}

impl CacheKey {
    fn new(protected_text: &str, kind: UnitKind, target_language: &str) -> Self {
        Self {
            protected_text: protected_text.to_string(),
            kind,
            target_language: target_language.to_string(),
        }
    }
}

/// Translation cache for storing and retrieving translations
pub struct TranslationCache {
    /// Internal cache storage
    cache: Arc<RwLock<HashMap<CacheKey, String>>>,

    /// Cache hit counter
    hits: Arc<RwLock<usize>>,

    /// Cache miss counter
    misses: Arc<RwLock<usize>>,

    /// Whether caching is enabled
    enabled: bool,
}

static GLOBAL_CACHE: Lazy<TranslationCache> = Lazy::new(|| TranslationCache::new(true));

impl TranslationCache {
    /// Create a new translation cache
    pub fn new(enabled: bool) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
            enabled,
        }
    }

    /// Handle to the shared process-wide cache
    pub fn global() -> Self {
        GLOBAL_CACHE.clone()
    }

    /// Get a translation from the cache
    pub fn get(&self, protected_text: &str, kind: UnitKind, target_language: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let key = CacheKey::new(protected_text, kind, target_language);
        let cache = self.cache.read();

        match cache.get(&key) {
            Some(translation) => {
                let mut hits = self.hits.write();
                *hits += 1;

                debug!(
                    "Cache hit for '{}' ({:?} -> {})",
                    truncate_text(protected_text, 30),
                    kind,
                    target_language
                );

                Some(translation.clone())
            }
            None => {
                let mut misses = self.misses.write();
                *misses += 1;

                debug!(
                    "Cache miss for '{}' ({:?} -> {})",
                    truncate_text(protected_text, 30),
                    kind,
                    target_language
                );

                None
            }
        }
    }

    /// Store a translation in the cache
    pub fn store(&self, protected_text: &str, kind: UnitKind, target_language: &str, translation: &str) {
        if !self.enabled {
            return;
        }

        let key = CacheKey::new(protected_text, kind, target_language);
        let mut cache = self.cache.write();

        cache.insert(key, translation.to_string());

        debug!(
            "Cached translation for '{}' ({:?} -> {})",
            truncate_text(protected_text, 30),
            kind,
            target_language
        );
    }

    /// Get cache statistics: (hits, misses, hit rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = *self.hits.read();
        let misses = *self.misses.read();
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Clear the cache
    pub fn clear(&self) {
        let mut cache = self.cache.write();
        cache.clear();

        let mut hits = self.hits.write();
        *hits = 0;

        let mut misses = self.misses.write();
        *misses = 0;

        debug!("Translation cache cleared");
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Check if the cache is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Clone for TranslationCache {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            hits: self.hits.clone(),
            misses: self.misses.clone(),
            enabled: self.enabled,
        }
    }
}

/// Truncate text to a maximum length with ellipsis
fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_length).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_storeAndGet_shouldRoundTrip() {
        let cache = TranslationCache::new(true);
        cache.store("hello", UnitKind::Paragraph, "fr", "bonjour");

        assert_eq!(cache.get("hello", UnitKind::Paragraph, "fr"), Some("bonjour".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_keyIncludesKind_shouldNotCrossMatch() {
        let cache = TranslationCache::new(true);
        cache.store("hello", UnitKind::Paragraph, "fr", "bonjour");

        assert_eq!(cache.get("hello", UnitKind::TableCell, "fr"), None);
    }

    #[test]
    fn test_cache_disabled_shouldReturnNone() {
        let cache = TranslationCache::new(false);
        cache.store("hello", UnitKind::Paragraph, "fr", "bonjour");

        assert_eq!(cache.get("hello", UnitKind::Paragraph, "fr"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_stats_shouldTrackHitsAndMisses() {
        let cache = TranslationCache::new(true);
        cache.store("hello", UnitKind::Paragraph, "fr", "bonjour");

        let _ = cache.get("hello", UnitKind::Paragraph, "fr");
        let _ = cache.get("other", UnitKind::Paragraph, "fr");

        let (hits, misses, rate) = cache.stats();
        assert_eq!(hits, 1);
        assert_eq!(misses, 1);
        assert!((rate - 0.5).abs() < f64::EPSILON);
    }
}
