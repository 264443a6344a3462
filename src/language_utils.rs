use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// This module provides functions for validating and normalizing ISO 639-1
/// (2-letter) and ISO 639-2 (3-letter) language codes, and for resolving a
/// code to the English language name used in prompts.
/// ISO 639-2/B codes that differ from their 639-2/T equivalents
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("fre", "fra"), // French
    ("ger", "deu"), // German
    ("dut", "nld"), // Dutch
    ("gre", "ell"), // Greek
    ("chi", "zho"), // Chinese
    ("cze", "ces"), // Czech
    ("ice", "isl"), // Icelandic
    ("alb", "sqi"), // Albanian
    ("arm", "hye"), // Armenian
    ("baq", "eus"), // Basque
    ("bur", "mya"), // Burmese
    ("per", "fas"), // Persian
    ("geo", "kat"), // Georgian
    ("may", "msa"), // Malay
    ("mac", "mkd"), // Macedonian
    ("rum", "ron"), // Romanian
    ("slo", "slk"), // Slovak
    ("wel", "cym"), // Welsh
];

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    // 2-letter codes convert directly
    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    }
    // 3-letter codes may already be 639-2/T, or a 639-2/B variant
    else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some((_, part2t)) = PART2B_TO_PART2T
            .iter()
            .find(|(part2b, _)| *part2b == normalized_code)
        {
            return Ok((*part2t).to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Validate that a language code is a recognized ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<()> {
    normalize_to_part2t(code).map(|_| ())
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(normalized1), Ok(normalized2)) => normalized1 == normalized2,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}
