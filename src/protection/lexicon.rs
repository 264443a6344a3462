/*!
 * Builtin lexicon of tokens that must never be translated.
 *
 * Grouped by origin: platforms and companies, open source projects,
 * protocols and standards, academic institutions. User-supplied custom
 * tokens and AI-identified tokens are merged with this list at protection
 * time.
 */

/// Platforms, companies, and well-known products.
const PLATFORMS: &[&str] = &[
    "GitHub", "Google", "Microsoft", "Apple", "Amazon", "Facebook", "Meta",
    "Twitter", "LinkedIn", "Instagram", "YouTube", "Netflix", "Spotify",
    "OpenAI", "Anthropic", "Claude", "ChatGPT", "GPT", "DALL-E",
    "Streamlit", "Docker", "Kubernetes", "React", "Vue", "Angular",
    "Node.js", "Python", "JavaScript", "TypeScript", "Java", "C++",
    "TensorFlow", "PyTorch", "Scikit-learn", "Pandas", "NumPy",
];

/// Open source projects and tooling.
const OPEN_SOURCE: &[&str] = &[
    "Linux", "Apache", "Nginx", "MySQL", "PostgreSQL", "MongoDB",
    "Redis", "Elasticsearch", "Kibana", "Grafana", "Prometheus",
    "Jenkins", "GitLab", "Bitbucket", "Jira", "Confluence",
];

/// Protocols and standards.
const PROTOCOLS: &[&str] = &[
    "HTTP", "HTTPS", "FTP", "SSH", "SMTP", "POP3", "IMAP",
    "TCP", "UDP", "IP", "DNS", "SSL", "TLS", "OAuth", "JWT",
    "REST", "GraphQL", "WebSocket", "gRPC", "JSON", "XML", "YAML",
];

/// Academic institutions.
const INSTITUTIONS: &[&str] = &[
    "MIT", "Stanford", "Harvard", "Berkeley", "CMU", "Oxford",
    "Cambridge", "Yale", "Princeton", "Caltech", "UCLA", "NYU",
];

/// The full builtin lexicon.
pub fn builtin_lexicon() -> Vec<&'static str> {
    PLATFORMS
        .iter()
        .chain(OPEN_SOURCE)
        .chain(PROTOCOLS)
        .chain(INSTITUTIONS)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtinLexicon_shouldContainCoreEntries() {
        let lexicon = builtin_lexicon();
        assert!(lexicon.contains(&"GitHub"));
        assert!(lexicon.contains(&"HTTP"));
        assert!(lexicon.contains(&"PostgreSQL"));
    }

    #[test]
    fn test_builtinLexicon_shouldHaveNoDuplicates() {
        let lexicon = builtin_lexicon();
        let unique: std::collections::HashSet<_> = lexicon.iter().collect();
        assert_eq!(unique.len(), lexicon.len());
    }
}
