/*!
 * Prompt construction for document translation.
 *
 * This module provides:
 * - The system prompt template for structure-preserving translation
 * - Dynamic prompt construction with document context, terminology, and
 *   style exemplars
 * - The auxiliary entity-identification prompt
 */

use std::collections::BTreeMap;

use crate::structure::ContentUnit;

/// System prompt template for document translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt for document translation.
    pub const DOCUMENT_TRANSLATOR: &'static str = r#"You are an expert technical document translator producing {target_language}.

## Your Role
- Translate the given text naturally while preserving meaning and tone
- The text is one unit of a larger document; keep register consistent
- Return ONLY the translated text, with no commentary or labels

## Hard Rules
- Tokens of the form __KEEP_<number>__ are placeholders. Reproduce every
  placeholder EXACTLY as written, character for character, in a position
  matching its role in the sentence. Never translate, alter, or drop one.
- Lines of the form <<SEG_<number>>> and <<SEG_END>> are segment markers.
  Reproduce every marker line unchanged and keep each translation under
  its own marker.
- Preserve line breaks within the text.
- Numbers, URLs, and email addresses stay as-is."#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default document translator template.
    pub fn document_translator() -> Self {
        Self::new(Self::DOCUMENT_TRANSLATOR)
    }

    /// Render the template with the given variables.
    pub fn render(&self, target_language: &str) -> String {
        self.template.replace("{target_language}", target_language)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::document_translator()
    }
}

/// Builder for constructing translation prompts with document context.
#[derive(Debug, Clone, Default)]
pub struct TranslationPromptBuilder {
    target_language: String,
    context_excerpt: Option<String>,
    terminology: BTreeMap<String, String>,
    style_exemplars: Vec<String>,
}

impl TranslationPromptBuilder {
    /// Create a new prompt builder.
    pub fn new(target_language: &str) -> Self {
        Self {
            target_language: target_language.to_string(),
            ..Self::default()
        }
    }

    /// Set the document context excerpt.
    pub fn with_context_excerpt(mut self, excerpt: &str) -> Self {
        if !excerpt.is_empty() {
            self.context_excerpt = Some(excerpt.to_string());
        }
        self
    }

    /// Set the terminology map (source term -> required translation).
    pub fn with_terminology(mut self, terminology: &BTreeMap<String, String>) -> Self {
        self.terminology = terminology.clone();
        self
    }

    /// Set style exemplar sentences in the target language.
    pub fn with_style_exemplars(mut self, exemplars: &[String]) -> Self {
        self.style_exemplars = exemplars.to_vec();
        self
    }

    /// Build the system prompt.
    pub fn build_system_prompt(&self) -> String {
        let mut prompt = PromptTemplate::document_translator().render(&self.target_language);

        if let Some(excerpt) = &self.context_excerpt {
            prompt.push_str("\n\n## Document Context\nThe unit belongs to a document that opens:\n");
            prompt.push_str(excerpt);
        }

        if !self.terminology.is_empty() {
            prompt.push_str("\n\n## Terminology\nUse these translations verbatim:\n");
            for (source, target) in &self.terminology {
                prompt.push_str(&format!("- {} -> {}\n", source, target));
            }
        }

        if !self.style_exemplars.is_empty() {
            prompt.push_str("\n\n## Style\nMatch the register of these sample sentences:\n");
            for exemplar in &self.style_exemplars {
                prompt.push_str(&format!("- {}\n", exemplar));
            }
        }

        prompt
    }
}

/// Build the context excerpt sent with every request: the opening units of
/// the document, truncated to a small budget.
pub fn context_excerpt(units: &[ContentUnit], max_units: usize, max_chars: usize) -> String {
    let mut excerpt = String::new();
    for unit in units.iter().take(max_units) {
        if excerpt.len() + unit.text.len() + 1 > max_chars {
            break;
        }
        excerpt.push_str(&unit.text);
        excerpt.push('\n');
    }
    excerpt.trim_end().to_string()
}

/// Build the entity-identification prompt pair (system, user).
///
/// The response is expected to be one name per line; `parse_entity_response`
/// filters it back against the source text.
pub fn entity_identification_prompt(text: &str) -> (String, String) {
    let system = "You identify proper nouns that must never be translated: \
product names, company names, project names, personal names, and technical \
identifiers. Respond with one name per line, copied exactly from the input. \
If there are none, respond with an empty line."
        .to_string();
    (system, text.to_string())
}

/// Parse an entity-identification response into candidate tokens.
///
/// Only names that literally occur in the source text survive; everything
/// else is a hallucination and is dropped.
pub fn parse_entity_response(response: &str, source_text: &str) -> Vec<String> {
    let mut names: Vec<String> = response
        .lines()
        .map(|line| line.trim().trim_matches(|c| c == '-' || c == '*').trim().to_string())
        .filter(|line| !line.is_empty() && line.len() < 80 && source_text.contains(line.as_str()))
        .collect();
    names.sort();
    names.dedup();
    names
}
