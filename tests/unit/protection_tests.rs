/*!
 * Tests for protected-token masking scenarios
 */

use doctrans::protection::{builtin_lexicon, TokenProtector};

/// Test that lexicon tokens in running text are masked and restored
#[test]
fn test_protect_withBuiltinLexicon_shouldRoundTripSentence() {
    let protector = TokenProtector::default();
    let text = "We host on GitHub, deploy to Kubernetes, and talk HTTP to Google.";

    let (protected, map) = protector.protect(text, builtin_lexicon());

    assert!(!protected.contains("GitHub"));
    assert!(!protected.contains("Kubernetes"));
    assert!(protected.contains("__KEEP_"));

    let restored = protector.restore(&protected, &map).unwrap();
    assert_eq!(restored, text);
}

/// Test that custom tokens merge with the lexicon
#[test]
fn test_protect_withCustomTokens_shouldMaskBothSources() {
    let protector = TokenProtector::default();
    let text = "MyProduct integrates with GitHub.";

    let mut tokens: Vec<String> = builtin_lexicon().iter().map(|t| t.to_string()).collect();
    tokens.push("MyProduct".to_string());

    let (protected, map) = protector.protect(text, &tokens);

    assert!(!protected.contains("MyProduct"));
    assert!(!protected.contains("GitHub"));
    assert_eq!(map.len(), 2);
}

/// Test nested substring tokens: the longer one wins, both restore
#[test]
fn test_protect_withNestedTokens_shouldRestoreEveryTokenOnce() {
    let protector = TokenProtector::default();
    let text = "Use GitHub Actions or GitHub directly.";

    let (protected, map) = protector.protect(text, ["GitHub", "GitHub Actions"]);

    let restored = protector.restore(&protected, &map).unwrap();
    assert_eq!(restored, text);
    // Two distinct tokens, two placeholders
    assert_eq!(map.len(), 2);
}

/// Test that slug-like identifiers survive as single tokens
#[test]
fn test_protect_withRepoSlug_shouldMaskWholeSlug() {
    let protector = TokenProtector::default();
    let text = "Clone owner/repo-name and run it.";

    let (protected, map) = protector.protect(text, ["owner/repo-name"]);

    assert!(!protected.contains("owner/repo-name"));
    let restored = protector.restore(&protected, &map).unwrap();
    assert_eq!(restored, text);
}

/// Test that restoration reports which placeholder went missing
#[test]
fn test_restore_withMangledPlaceholder_shouldNameIt() {
    let protector = TokenProtector::default();
    let (protected, map) = protector.protect("Docker is great", ["Docker"]);
    assert!(protected.starts_with("__KEEP_0__"));

    let err = protector.restore("KEEP_0 is great", &map).unwrap_err();
    assert_eq!(err.placeholder, "__KEEP_0__");
}
