//! Splitting declaration names into `(namespace, key)`.

use serde::{Deserialize, Serialize};

/// Marker prefix every custom property carries.
pub const MARKER: &str = "--";

/// Namespaces spelled with two tokens. Checked before the generic split so
/// `--font-weight-bold` lands in `font-weight`, not `font` with key
/// `weight-bold`.
const MULTI_WORD_NAMESPACES: &[&str] =
    &["font-weight", "inset-shadow", "drop-shadow", "text-shadow"];

/// Legacy singular names and the key they now map to.
const LEGACY_SINGULARS: &[(&str, &str)] = &[("spacing", "base"), ("text", "base")];

/// Key assigned to singular names without a legacy mapping.
pub const SINGULAR_KEY: &str = "default";

/// Notice attached to a legacy singular name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Deprecation {
    /// The name as written, e.g. `--spacing`.
    pub name: String,
    /// The spelling to use instead, e.g. `--spacing-base`.
    pub replacement: String,
    pub message: String,
}

/// A declaration name split into its namespace and key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub namespace: String,
    pub key: String,
    pub deprecation: Option<Deprecation>,
}

impl ParsedName {
    fn new(namespace: &str, key: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            key: key.to_string(),
            deprecation: None,
        }
    }
}

/// Splits `--namespace-key` into its parts.
///
/// Returns `None` for names without the marker prefix and for degenerate
/// names such as `--`, `---x` or `--color-`.
///
/// ```rust
/// use tokensmith::namespace::parse_namespace_key;
///
/// let parsed = parse_namespace_key("--color-red-500").unwrap();
/// assert_eq!(parsed.namespace, "color");
/// assert_eq!(parsed.key, "red-500");
///
/// let parsed = parse_namespace_key("--font-weight-bold").unwrap();
/// assert_eq!(parsed.namespace, "font-weight");
/// assert_eq!(parsed.key, "bold");
/// ```
pub fn parse_namespace_key(name: &str) -> Option<ParsedName> {
    let body = name.strip_prefix(MARKER)?;
    if body.is_empty() {
        return None;
    }

    for namespace in MULTI_WORD_NAMESPACES {
        if body == *namespace {
            return Some(singular(name, namespace));
        }
        if let Some(key) = body
            .strip_prefix(namespace)
            .and_then(|rest| rest.strip_prefix('-'))
        {
            if key.is_empty() {
                return None;
            }
            return Some(ParsedName::new(namespace, key));
        }
    }

    match body.split_once('-') {
        Some((namespace, key)) => {
            if namespace.is_empty() || key.is_empty() {
                None
            } else {
                Some(ParsedName::new(namespace, key))
            }
        }
        None => Some(singular(name, body)),
    }
}

fn singular(name: &str, namespace: &str) -> ParsedName {
    match LEGACY_SINGULARS.iter().find(|(legacy, _)| *legacy == namespace) {
        Some((_, key)) => {
            let replacement = format!("{}{}-{}", MARKER, namespace, key);
            ParsedName {
                namespace: namespace.to_string(),
                key: key.to_string(),
                deprecation: Some(Deprecation {
                    name: name.to_string(),
                    message: format!("'{}' is deprecated, use '{}' instead", name, replacement),
                    replacement,
                }),
            }
        }
        None => ParsedName::new(namespace, SINGULAR_KEY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_split() {
        let parsed = parse_namespace_key("--radius-2xl").unwrap();
        assert_eq!(parsed.namespace, "radius");
        assert_eq!(parsed.key, "2xl");
        assert!(parsed.deprecation.is_none());
    }

    #[test]
    fn test_multi_word_namespace_wins() {
        let parsed = parse_namespace_key("--drop-shadow-lg").unwrap();
        assert_eq!(parsed.namespace, "drop-shadow");
        assert_eq!(parsed.key, "lg");

        let parsed = parse_namespace_key("--text-shadow-2xs").unwrap();
        assert_eq!(parsed.namespace, "text-shadow");
        assert_eq!(parsed.key, "2xs");
    }

    #[test]
    fn test_text_namespace_not_confused_with_text_shadow() {
        let parsed = parse_namespace_key("--text-xl").unwrap();
        assert_eq!(parsed.namespace, "text");
        assert_eq!(parsed.key, "xl");
    }

    #[test]
    fn test_legacy_singular_has_deprecation() {
        let parsed = parse_namespace_key("--spacing").unwrap();
        assert_eq!(parsed.namespace, "spacing");
        assert_eq!(parsed.key, "base");
        let deprecation = parsed.deprecation.unwrap();
        assert_eq!(deprecation.replacement, "--spacing-base");
        assert!(deprecation.message.contains("--spacing-base"));
    }

    #[test]
    fn test_unknown_singular_maps_to_default() {
        let parsed = parse_namespace_key("--shadow").unwrap();
        assert_eq!(parsed.key, SINGULAR_KEY);
        assert!(parsed.deprecation.is_none());

        let parsed = parse_namespace_key("--inset-shadow").unwrap();
        assert_eq!(parsed.namespace, "inset-shadow");
        assert_eq!(parsed.key, SINGULAR_KEY);
    }

    #[test]
    fn test_degenerate_names() {
        assert!(parse_namespace_key("color-red").is_none());
        assert!(parse_namespace_key("--").is_none());
        assert!(parse_namespace_key("---x").is_none());
        assert!(parse_namespace_key("--color-").is_none());
        assert!(parse_namespace_key("--font-weight-").is_none());
    }

    #[test]
    fn test_wildcard_key_passes_through() {
        let parsed = parse_namespace_key("--color-*").unwrap();
        assert_eq!(parsed.namespace, "color");
        assert_eq!(parsed.key, "*");
    }
}
