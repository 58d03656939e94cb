//! Key Construction
//!
//! Deterministic key derivation for the stats and cursor namespaces, and the
//! VIP fingerprint used as the stats discriminator.
//!
//! Key layout: `<prefix><user_id>:<discriminator>`. Components may not be
//! empty or contain the separator, so each (user, discriminator) pair maps to
//! exactly one key and distinct pairs never collide.

use std::fmt;

use crate::backend::pattern::escape_glob;
use crate::error::KeyError;

/// Separator between the user id and the discriminator.
pub const KEY_SEPARATOR: char = ':';

/// Fingerprint of an empty VIP set. Real fingerprints are non-blank
/// identifiers joined by the VIP joiner, so a bare joiner can never be one.
pub const EMPTY_VIP_FINGERPRINT: &str = ",";

const VIP_JOINER: &str = ",";

// == VIP Fingerprint ==
/// Case-insensitive, order-independent representation of a VIP set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VipFingerprint(String);

impl VipFingerprint {
    /// Normalizes a collection of VIP identifiers.
    ///
    /// Identifiers are trimmed and lowercased, comma-separated entries are
    /// split, blank entries are dropped, and the rest are sorted and
    /// deduplicated.
    pub fn from_vips<I, S>(vips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for vip in vips {
            normalized.extend(
                vip.as_ref()
                    .split(VIP_JOINER)
                    .map(|part| part.trim().to_lowercase())
                    .filter(|part| !part.is_empty()),
            );
        }

        if normalized.is_empty() {
            return Self::empty();
        }

        normalized.sort();
        normalized.dedup();
        Self(normalized.join(VIP_JOINER))
    }

    /// The sentinel fingerprint of the empty set.
    pub fn empty() -> Self {
        Self(EMPTY_VIP_FINGERPRINT.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0 == EMPTY_VIP_FINGERPRINT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VipFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Component Validation ==
/// Checks that a key component is non-empty and free of the separator.
pub fn validate_component<'a>(
    component: &'static str,
    value: &'a str,
) -> Result<&'a str, KeyError> {
    if value.is_empty() {
        return Err(KeyError::Empty { component });
    }
    if value.contains(KEY_SEPARATOR) {
        return Err(KeyError::ContainsSeparator {
            component,
            separator: KEY_SEPARATOR,
        });
    }
    Ok(value)
}

// == Key Builder ==
/// Builds stats keys, cursor keys, and per-user invalidation patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBuilder {
    stats_prefix: String,
    cursor_prefix: String,
}

impl KeyBuilder {
    /// Creates a builder for the two namespaces.
    ///
    /// Fails if either prefix is empty or one is a prefix of the other,
    /// since a stats pattern could then match cursor keys.
    pub fn new(
        stats_prefix: impl Into<String>,
        cursor_prefix: impl Into<String>,
    ) -> Result<Self, KeyError> {
        let stats_prefix = stats_prefix.into();
        let cursor_prefix = cursor_prefix.into();

        if stats_prefix.is_empty() {
            return Err(KeyError::Empty {
                component: "stats prefix",
            });
        }
        if cursor_prefix.is_empty() {
            return Err(KeyError::Empty {
                component: "cursor prefix",
            });
        }
        if stats_prefix.starts_with(&cursor_prefix) || cursor_prefix.starts_with(&stats_prefix) {
            return Err(KeyError::OverlappingPrefixes(stats_prefix, cursor_prefix));
        }

        Ok(Self {
            stats_prefix,
            cursor_prefix,
        })
    }

    pub fn stats_prefix(&self) -> &str {
        &self.stats_prefix
    }

    pub fn cursor_prefix(&self) -> &str {
        &self.cursor_prefix
    }

    /// `<stats_prefix><user_id>:<fingerprint>`
    pub fn stats_key(&self, user_id: &str, vips: &VipFingerprint) -> Result<String, KeyError> {
        Ok(compose(
            &self.stats_prefix,
            validate_component("user id", user_id)?,
            validate_component("VIP fingerprint", vips.as_str())?,
        ))
    }

    /// `<cursor_prefix><user_id>:<source>`
    pub fn cursor_key(&self, user_id: &str, source: &str) -> Result<String, KeyError> {
        Ok(compose(
            &self.cursor_prefix,
            validate_component("user id", user_id)?,
            validate_component("source", source)?,
        ))
    }

    /// Glob matching every stats key of `user_id`.
    pub fn user_stats_pattern(&self, user_id: &str) -> Result<String, KeyError> {
        user_pattern(&self.stats_prefix, user_id)
    }

    /// Glob matching every cursor key of `user_id`.
    pub fn user_cursor_pattern(&self, user_id: &str) -> Result<String, KeyError> {
        user_pattern(&self.cursor_prefix, user_id)
    }
}

impl Default for KeyBuilder {
    fn default() -> Self {
        Self {
            stats_prefix: "mailstats:stats:".to_string(),
            cursor_prefix: "mailstats:cursor:".to_string(),
        }
    }
}

fn compose(prefix: &str, user_id: &str, discriminator: &str) -> String {
    let mut key = String::with_capacity(prefix.len() + user_id.len() + discriminator.len() + 1);
    key.push_str(prefix);
    key.push_str(user_id);
    key.push(KEY_SEPARATOR);
    key.push_str(discriminator);
    key
}

fn user_pattern(prefix: &str, user_id: &str) -> Result<String, KeyError> {
    let user_id = validate_component("user id", user_id)?;
    Ok(format!(
        "{}{}{}*",
        escape_glob(prefix),
        escape_glob(user_id),
        KEY_SEPARATOR
    ))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::pattern::compile_pattern;

    fn glob_matches(pattern: &str, key: &str) -> bool {
        compile_pattern(pattern).unwrap().is_match(key)
    }

    #[test]
    fn test_fingerprint_is_case_and_order_insensitive() {
        let a = VipFingerprint::from_vips(["Bob", "alice"]);
        let b = VipFingerprint::from_vips(["ALICE", "bob"]);

        assert_eq!(a, b);
        assert_eq!(a.as_str(), "alice,bob");
    }

    #[test]
    fn test_fingerprint_empty_set_is_sentinel() {
        let empty = VipFingerprint::from_vips(Vec::<String>::new());

        assert!(empty.is_empty());
        assert_eq!(empty.as_str(), EMPTY_VIP_FINGERPRINT);
        assert_eq!(empty, VipFingerprint::empty());
    }

    #[test]
    fn test_fingerprint_punctuation_identifiers_are_real_vips() {
        let dash = VipFingerprint::from_vips(["-"]);
        assert!(!dash.is_empty());
        assert_ne!(dash, VipFingerprint::empty());
        assert_eq!(dash.as_str(), "-");

        let with_symbols = VipFingerprint::from_vips(["alice", "+++"]);
        assert_ne!(with_symbols, VipFingerprint::from_vips(["alice"]));
        assert_eq!(with_symbols.as_str(), "+++,alice");
    }

    #[test]
    fn test_fingerprint_blank_identifiers_are_empty_set() {
        let blank = VipFingerprint::from_vips(["", "  ", " , "]);
        assert!(blank.is_empty());
        assert_eq!(blank, VipFingerprint::empty());
    }

    #[test]
    fn test_fingerprint_trims_splits_and_dedups() {
        let fp = VipFingerprint::from_vips([" Bob ", "alice, carol", "BOB", ""]);
        assert_eq!(fp.as_str(), "alice,bob,carol");
    }

    #[test]
    fn test_stats_key_layout() {
        let keys = KeyBuilder::default();
        let fp = VipFingerprint::from_vips(["bob@x.io", "alice@x.io"]);

        assert_eq!(
            keys.stats_key("user-1", &fp).unwrap(),
            "mailstats:stats:user-1:alice@x.io,bob@x.io"
        );
        assert_eq!(
            keys.stats_key("user-1", &VipFingerprint::empty()).unwrap(),
            "mailstats:stats:user-1:,"
        );
    }

    #[test]
    fn test_cursor_key_layout() {
        let keys = KeyBuilder::default();
        assert_eq!(
            keys.cursor_key("user-1", "gmail").unwrap(),
            "mailstats:cursor:user-1:gmail"
        );
    }

    #[test]
    fn test_components_with_separator_rejected() {
        let keys = KeyBuilder::default();

        assert_eq!(
            keys.cursor_key("user:1", "gmail"),
            Err(KeyError::ContainsSeparator {
                component: "user id",
                separator: ':'
            })
        );
        assert!(keys.cursor_key("user-1", "gmail:inbox").is_err());
        assert!(keys
            .stats_key("u", &VipFingerprint::from_vips(["a:b"]))
            .is_err());
    }

    #[test]
    fn test_empty_components_rejected() {
        let keys = KeyBuilder::default();
        assert_eq!(
            keys.cursor_key("", "gmail"),
            Err(KeyError::Empty {
                component: "user id"
            })
        );
        assert!(keys.cursor_key("u", "").is_err());
        assert!(keys.user_stats_pattern("").is_err());
    }

    #[test]
    fn test_overlapping_prefixes_rejected() {
        assert!(matches!(
            KeyBuilder::new("cache:", "cache:cursor:"),
            Err(KeyError::OverlappingPrefixes(_, _))
        ));
        assert!(KeyBuilder::new("same:", "same:").is_err());
        assert!(KeyBuilder::new("", "cursor:").is_err());
        assert!(KeyBuilder::new("stats:", "cursor:").is_ok());
    }

    #[test]
    fn test_user_pattern_does_not_match_other_users() {
        let keys = KeyBuilder::default();
        let pattern = keys.user_stats_pattern("u1").unwrap();

        assert_eq!(pattern, "mailstats:stats:u1:*");
        assert!(glob_matches(&pattern, "mailstats:stats:u1:,"));
        assert!(glob_matches(&pattern, "mailstats:stats:u1:alice,bob"));
        assert!(!glob_matches(&pattern, "mailstats:stats:u10:,"));
        assert!(!glob_matches(&pattern, "mailstats:cursor:u1:gmail"));
    }

    #[test]
    fn test_user_pattern_escapes_glob_characters() {
        let keys = KeyBuilder::default();
        let pattern = keys.user_cursor_pattern("u*").unwrap();

        assert!(glob_matches(&pattern, "mailstats:cursor:u*:gmail"));
        assert!(!glob_matches(&pattern, "mailstats:cursor:u2:gmail"));
    }
}
