//! Glob Patterns
//!
//! Redis `KEYS`-style glob matching and escaping. The memory backend compiles
//! lookup patterns with `compile_pattern`; the key builder uses `escape_glob`
//! so user-supplied components are always matched literally.

use globset::{GlobBuilder, GlobMatcher};

use crate::error::BackendError;

// `{` and `}` are literal in Redis but start alternation in globset
const GLOB_SPECIAL: [char; 7] = ['*', '?', '[', ']', '{', '}', '\\'];

/// Escapes every glob metacharacter in `s` with a backslash.
pub fn escape_glob(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if GLOB_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Compiles a Redis-style glob into a matcher.
///
/// `*` and `?` match any character, `/` included, and a backslash makes the
/// next character literal.
pub fn compile_pattern(pattern: &str) -> Result<GlobMatcher, BackendError> {
    GlobBuilder::new(pattern)
        .literal_separator(false)
        .backslash_escape(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|error| {
            BackendError::Rejected(format!("Invalid key pattern '{}': {}", pattern, error))
        })
}
