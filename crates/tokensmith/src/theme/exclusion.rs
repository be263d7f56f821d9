//! Deletion sentinel handling.
//!
//! A declaration whose resolved value is `initial` removes matching entries
//! accumulated so far in the same build:
//!
//! | name | removes |
//! |------|---------|
//! | `--*` | everything |
//! | `--color-*` | the whole `colors` tree |
//! | `--color-red-*` | `colors.red` and flat keys starting `red-` |
//! | `--color-red-500` | the value at `colors.red.500` |

use serde::Serialize;

use crate::namespace::{parse_namespace_key, parse_nested_path, NestingPolicy, MARKER};

/// The sentinel value.
pub const DELETION_SENTINEL: &str = "initial";

/// Namespace of a bare `--*` rule.
pub const ALL_NAMESPACES: &str = "*";

/// True when a resolved value is the deletion sentinel.
pub fn is_deletion_sentinel(value: &str) -> bool {
    value.trim() == DELETION_SENTINEL
}

/// A deletion derived from a sentinel declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionRule {
    /// Namespace, or [`ALL_NAMESPACES`].
    pub namespace: String,
    /// Key, or key prefix when wildcard; empty for namespace-wide rules.
    pub key_pattern: String,
    pub is_wildcard: bool,
}

impl ExclusionRule {
    /// Derives a rule from the raw declaration name.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.strip_prefix(MARKER)? == "*" {
            return Some(Self {
                namespace: ALL_NAMESPACES.to_string(),
                key_pattern: String::new(),
                is_wildcard: true,
            });
        }

        let parsed = parse_namespace_key(name)?;
        let (key_pattern, is_wildcard) = match parsed.key.strip_suffix('*') {
            Some(prefix) => (prefix.trim_end_matches('-').to_string(), true),
            None => (parsed.key, false),
        };
        Some(Self {
            namespace: parsed.namespace,
            key_pattern,
            is_wildcard,
        })
    }

    pub fn covers_everything(&self) -> bool {
        self.namespace == ALL_NAMESPACES
    }

    /// True when the rule clears its whole namespace.
    pub fn covers_namespace(&self) -> bool {
        self.is_wildcard && self.key_pattern.is_empty()
    }

    /// Whether a flat key (font sizes, defaults) in `namespace` matches.
    pub fn matches_flat_key(&self, namespace: &str, key: &str) -> bool {
        if self.covers_everything() {
            return true;
        }
        if self.namespace != namespace {
            return false;
        }
        if self.is_wildcard {
            self.key_pattern.is_empty()
                || key == self.key_pattern
                || key.starts_with(&format!("{}-", self.key_pattern))
        } else {
            key == self.key_pattern
        }
    }

    /// Path segments addressed by the key pattern under `policy`.
    pub fn pattern_segments(&self, policy: &NestingPolicy) -> Option<Vec<String>> {
        parse_nested_path(&self.key_pattern, policy).into_segments()
    }
}
