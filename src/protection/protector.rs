/*!
 * Reversible token masking.
 *
 * Matching is longest-first over a single pass of the source text: every
 * candidate token claims non-overlapping spans, and the protected string is
 * assembled once from those claims. Because the text is never re-scanned
 * after a substitution, a short token can neither corrupt an inserted
 * placeholder nor shadow a longer token it is a prefix of.
 */

use std::collections::HashMap;
use thiserror::Error;

/// A placeholder whose token could not be restored (the translator dropped
/// or mangled it).
#[derive(Error, Debug, Clone)]
#[error("placeholder {placeholder} missing from translated text")]
pub struct RestoreError {
    pub placeholder: String,
}

/// Reversible substitution table for one protection round.
///
/// Bijection placeholder -> token; every occurrence of a token shares one
/// placeholder. Created and discarded per translation request.
#[derive(Debug, Clone, Default)]
pub struct ProtectionMap {
    entries: Vec<(String, String)>,
}

impl ProtectionMap {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate (placeholder, token) pairs in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, t)| (p.as_str(), t.as_str()))
    }

    fn push(&mut self, placeholder: String, token: String) {
        self.entries.push((placeholder, token));
    }
}

/// Masks and restores protected tokens.
#[derive(Debug, Clone)]
pub struct TokenProtector {
    /// When true, a token only matches if not flanked by alphanumerics.
    /// Off by default: policy knob, see DESIGN.md.
    require_word_boundaries: bool,
}

impl Default for TokenProtector {
    fn default() -> Self {
        Self::new(false)
    }
}

impl TokenProtector {
    pub fn new(require_word_boundaries: bool) -> Self {
        Self { require_word_boundaries }
    }

    /// Replace every occurrence of every candidate token with a placeholder.
    ///
    /// Candidates from all sources (lexicon, custom, AI-identified) are
    /// merged by the caller; this function sorts them longest-first and
    /// claims non-overlapping spans in one pass.
    pub fn protect<I, S>(&self, text: &str, tokens: I) -> (String, ProtectionMap)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // Dedupe and order: longest first, then lexicographic for determinism
        let mut candidates: Vec<String> = tokens
            .into_iter()
            .map(|t| t.as_ref().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        candidates.sort();
        candidates.dedup();
        candidates.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        // Claim spans: (start, end, candidate index), longest tokens first
        let mut claims: Vec<(usize, usize, usize)> = Vec::new();
        for (token_idx, token) in candidates.iter().enumerate() {
            for (start, matched) in text.match_indices(token.as_str()) {
                let end = start + matched.len();
                if self.require_word_boundaries && !Self::at_word_boundary(text, start, end) {
                    continue;
                }
                let overlaps = claims.iter().any(|&(s, e, _)| start < e && s < end);
                if !overlaps {
                    claims.push((start, end, token_idx));
                }
            }
        }
        claims.sort_by_key(|&(start, _, _)| start);

        // Assemble the protected text; all occurrences of one token share
        // a single placeholder so the map stays a bijection
        let mut map = ProtectionMap::default();
        let mut placeholder_by_token: HashMap<usize, String> = HashMap::new();
        let mut protected = String::with_capacity(text.len());
        let mut cursor = 0;

        for (start, end, token_idx) in claims {
            protected.push_str(&text[cursor..start]);
            let placeholder = placeholder_by_token
                .entry(token_idx)
                .or_insert_with(|| {
                    let placeholder = format!("__KEEP_{}__", map.len());
                    map.push(placeholder.clone(), candidates[token_idx].clone());
                    placeholder
                })
                .clone();
            protected.push_str(&placeholder);
            cursor = end;
        }
        protected.push_str(&text[cursor..]);

        (protected, map)
    }

    /// Swap placeholders back for their tokens.
    ///
    /// Fails if any placeholder is missing from the input; the caller then
    /// discards this unit's translation in favor of the original text.
    pub fn restore(&self, text: &str, map: &ProtectionMap) -> Result<String, RestoreError> {
        let mut restored = text.to_string();
        for (placeholder, token) in map.iter() {
            if !restored.contains(placeholder) {
                return Err(RestoreError { placeholder: placeholder.to_string() });
            }
            restored = restored.replace(placeholder, token);
        }
        Ok(restored)
    }

    fn at_word_boundary(text: &str, start: usize, end: usize) -> bool {
        let before_ok = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = text[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    }
}
