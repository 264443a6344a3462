/*!
 * Protected-token handling.
 *
 * Certain substrings (platform names, protocols, repository slugs) must
 * survive translation verbatim. Before a unit is sent out, every known
 * token is replaced by a placeholder the translator is unlikely to touch;
 * after the response comes back, placeholders are swapped back for the
 * original tokens and the round trip is verified.
 *
 * - `lexicon`: builtin token list
 * - `protector`: masking, restoration, and the reversible protection map
 */

pub use self::lexicon::builtin_lexicon;
pub use self::protector::{ProtectionMap, RestoreError, TokenProtector};

pub mod lexicon;
pub mod protector;
