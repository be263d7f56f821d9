//! Nesting policies and key → path parsing.
//!
//! Keys are untyped dash-delimited strings (`red-500`, `brand-accent-light`).
//! A [`NestingPolicy`] decides how deep they nest and what happens at the
//! edges: doubled dashes and tokens past the depth limit.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How doubled dashes (`a--b`) inside a key are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsecutiveDashes {
    /// Reject the key entirely.
    Exclude,
    /// Treat `--` as a single dash.
    #[default]
    Collapse,
    /// Camel-merge the token after the gap into the previous one: `a--b` → `aB`.
    MergeCamel,
    /// Keep the dash on the previous token: `a--b` → `a-`, `b`.
    Literal,
}

/// How tokens beyond `max_depth` are joined into the terminal segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowMode {
    #[default]
    CamelCase,
    Literal,
}

/// Per-namespace nesting rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NestingPolicy {
    /// Number of nesting levels; `None` is unbounded, `Some(0)` keeps keys flat.
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default)]
    pub consecutive_dashes: ConsecutiveDashes,
    #[serde(default)]
    pub overflow: OverflowMode,
}

impl NestingPolicy {
    /// Unbounded nesting, the default for color palettes.
    pub const fn nested() -> Self {
        Self {
            max_depth: None,
            consecutive_dashes: ConsecutiveDashes::Collapse,
            overflow: OverflowMode::CamelCase,
        }
    }

    /// Whole keys as single segments (`in-out`, `2xl`).
    pub const fn flat() -> Self {
        Self {
            max_depth: Some(0),
            consecutive_dashes: ConsecutiveDashes::Literal,
            overflow: OverflowMode::Literal,
        }
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_consecutive_dashes(mut self, behavior: ConsecutiveDashes) -> Self {
        self.consecutive_dashes = behavior;
        self
    }

    pub fn with_overflow(mut self, mode: OverflowMode) -> Self {
        self.overflow = mode;
        self
    }
}

impl Default for NestingPolicy {
    fn default() -> Self {
        Self::nested()
    }
}

/// Namespaces that nest by default.
const NESTED_NAMESPACES: &[&str] = &["color"];

/// Policy lookup with per-namespace overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NestingPolicies {
    overrides: IndexMap<String, NestingPolicy>,
}

impl NestingPolicies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the policy for one namespace, returning `self` for chaining.
    pub fn with(mut self, namespace: impl Into<String>, policy: NestingPolicy) -> Self {
        self.overrides.insert(namespace.into(), policy);
        self
    }

    pub fn set(&mut self, namespace: impl Into<String>, policy: NestingPolicy) {
        self.overrides.insert(namespace.into(), policy);
    }

    /// Returns the policy in effect for `namespace`.
    pub fn policy_for(&self, namespace: &str) -> NestingPolicy {
        if let Some(policy) = self.overrides.get(namespace) {
            return *policy;
        }
        if NESTED_NAMESPACES.contains(&namespace) {
            NestingPolicy::nested()
        } else {
            NestingPolicy::flat()
        }
    }
}

/// Result of parsing a key under a policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParsedKey {
    /// A single segment.
    Flat(String),
    /// Two or more segments, outermost first.
    Nested(Vec<String>),
    /// Degenerate or excluded; writing it is a no-op.
    Rejected,
}

impl ParsedKey {
    /// Returns the path segments, or `None` for a rejected key.
    pub fn into_segments(self) -> Option<Vec<String>> {
        match self {
            ParsedKey::Flat(segment) => Some(vec![segment]),
            ParsedKey::Nested(segments) => Some(segments),
            ParsedKey::Rejected => None,
        }
    }
}

/// Parses a key into nested path segments.
///
/// ```rust
/// use tokensmith::namespace::{parse_nested_path, NestingPolicy, OverflowMode, ParsedKey};
///
/// let policy = NestingPolicy::nested().with_max_depth(Some(2));
/// assert_eq!(
///     parse_nested_path("a-b-c-d", &policy),
///     ParsedKey::Nested(vec!["a".into(), "b".into(), "cD".into()]),
/// );
///
/// let policy = policy.with_overflow(OverflowMode::Literal);
/// assert_eq!(
///     parse_nested_path("a-b-c-d", &policy),
///     ParsedKey::Nested(vec!["a".into(), "b".into(), "c-d".into()]),
/// );
/// ```
pub fn parse_nested_path(key: &str, policy: &NestingPolicy) -> ParsedKey {
    // Edge dashes leave an empty segment no dash policy can name.
    if key.is_empty() || key.starts_with('-') || key.ends_with('-') {
        return ParsedKey::Rejected;
    }
    if !key.contains('-') {
        return ParsedKey::Flat(key.to_string());
    }

    let tokens = match canonical_tokens(key, policy.consecutive_dashes) {
        Some(tokens) if !tokens.is_empty() => tokens,
        _ => return ParsedKey::Rejected,
    };

    let depth = policy.max_depth.unwrap_or(usize::MAX);
    let mut segments = if depth >= tokens.len() {
        tokens
    } else {
        let (head, tail) = tokens.split_at(depth);
        let mut segments = head.to_vec();
        segments.push(join_tokens(tail, policy.overflow));
        segments
    };

    if segments.len() == 1 {
        ParsedKey::Flat(segments.remove(0))
    } else {
        ParsedKey::Nested(segments)
    }
}

/// Splits on dashes, resolving empty splits per `behavior`.
fn canonical_tokens(key: &str, behavior: ConsecutiveDashes) -> Option<Vec<String>> {
    let raw: Vec<&str> = key.split('-').collect();
    if behavior == ConsecutiveDashes::Exclude && raw.iter().any(|t| t.is_empty()) {
        return None;
    }

    let mut tokens: Vec<String> = Vec::with_capacity(raw.len());
    let mut merge_next = false;
    let mut pending_dashes = String::new();

    for token in raw {
        if token.is_empty() {
            match behavior {
                ConsecutiveDashes::Exclude | ConsecutiveDashes::Collapse => {}
                ConsecutiveDashes::MergeCamel => merge_next = !tokens.is_empty(),
                ConsecutiveDashes::Literal => match tokens.last_mut() {
                    Some(last) => last.push('-'),
                    None => pending_dashes.push('-'),
                },
            }
            continue;
        }

        if merge_next {
            merge_next = false;
            if let Some(last) = tokens.last_mut() {
                last.push_str(&capitalize(token));
                continue;
            }
        }

        let mut owned = std::mem::take(&mut pending_dashes);
        owned.push_str(token);
        tokens.push(owned);
    }

    Some(tokens)
}

fn join_tokens(tokens: &[String], mode: OverflowMode) -> String {
    match mode {
        OverflowMode::Literal => tokens.join("-"),
        OverflowMode::CamelCase => {
            let mut joined = String::new();
            for (i, token) in tokens.iter().enumerate() {
                if i == 0 {
                    joined.push_str(token);
                } else {
                    joined.push_str(&capitalize(token));
                }
            }
            joined
        }
    }
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Camel-cases a dash-delimited key: `transition-duration` → `transitionDuration`.
pub fn camel_case(key: &str) -> String {
    let tokens: Vec<String> = key
        .split('-')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    join_tokens(&tokens, OverflowMode::CamelCase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested(segments: &[&str]) -> ParsedKey {
        ParsedKey::Nested(segments.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_no_dash_is_flat() {
        assert_eq!(
            parse_nested_path("primary", &NestingPolicy::nested()),
            ParsedKey::Flat("primary".into())
        );
    }

    #[test]
    fn test_unbounded_nesting() {
        assert_eq!(
            parse_nested_path("brand-accent-light", &NestingPolicy::nested()),
            nested(&["brand", "accent", "light"])
        );
    }

    #[test]
    fn test_overflow_camel_case() {
        let policy = NestingPolicy::nested().with_max_depth(Some(2));
        assert_eq!(parse_nested_path("a-b-c-d", &policy), nested(&["a", "b", "cD"]));
        assert_eq!(parse_nested_path("a-b-c", &policy), nested(&["a", "b", "c"]));
    }

    #[test]
    fn test_overflow_literal() {
        let policy = NestingPolicy::nested()
            .with_max_depth(Some(2))
            .with_overflow(OverflowMode::Literal);
        assert_eq!(parse_nested_path("a-b-c-d", &policy), nested(&["a", "b", "c-d"]));
    }

    #[test]
    fn test_zero_depth_flattens() {
        assert_eq!(
            parse_nested_path("in-out", &NestingPolicy::flat()),
            ParsedKey::Flat("in-out".into())
        );
        let camel = NestingPolicy::flat().with_overflow(OverflowMode::CamelCase);
        assert_eq!(
            parse_nested_path("in-out", &camel),
            ParsedKey::Flat("inOut".into())
        );
    }

    #[test]
    fn test_consecutive_exclude() {
        let policy = NestingPolicy::nested().with_consecutive_dashes(ConsecutiveDashes::Exclude);
        assert_eq!(parse_nested_path("a--b", &policy), ParsedKey::Rejected);
        assert_eq!(parse_nested_path("a-b", &policy), nested(&["a", "b"]));
    }

    #[test]
    fn test_consecutive_collapse() {
        let policy = NestingPolicy::nested().with_consecutive_dashes(ConsecutiveDashes::Collapse);
        assert_eq!(parse_nested_path("a--b-c", &policy), nested(&["a", "b", "c"]));
    }

    #[test]
    fn test_consecutive_merge_camel() {
        let policy = NestingPolicy::nested().with_consecutive_dashes(ConsecutiveDashes::MergeCamel);
        assert_eq!(parse_nested_path("a--b-c", &policy), nested(&["aB", "c"]));
        assert_eq!(parse_nested_path("a--b", &policy), ParsedKey::Flat("aB".into()));
    }

    #[test]
    fn test_consecutive_literal() {
        let policy = NestingPolicy::nested().with_consecutive_dashes(ConsecutiveDashes::Literal);
        assert_eq!(parse_nested_path("a--b", &policy), nested(&["a-", "b"]));
    }

    #[test]
    fn test_degenerate_keys_rejected() {
        let policy = NestingPolicy::nested();
        assert_eq!(parse_nested_path("", &policy), ParsedKey::Rejected);
        assert_eq!(parse_nested_path("---", &policy), ParsedKey::Rejected);
    }

    #[test]
    fn test_edge_dashes_rejected_under_every_policy() {
        let behaviors = [
            ConsecutiveDashes::Exclude,
            ConsecutiveDashes::Collapse,
            ConsecutiveDashes::MergeCamel,
            ConsecutiveDashes::Literal,
        ];
        for behavior in behaviors {
            for policy in [NestingPolicy::nested(), NestingPolicy::flat()] {
                let policy = policy.with_consecutive_dashes(behavior);
                assert_eq!(parse_nested_path("red-", &policy), ParsedKey::Rejected);
                assert_eq!(parse_nested_path("-blue", &policy), ParsedKey::Rejected);
                assert_eq!(parse_nested_path("-red-500-", &policy), ParsedKey::Rejected);
            }
        }
    }

    #[test]
    fn test_policy_defaults_by_namespace() {
        let policies = NestingPolicies::new();
        assert_eq!(policies.policy_for("color"), NestingPolicy::nested());
        assert_eq!(policies.policy_for("ease"), NestingPolicy::flat());

        let policies = policies.with("spacing", NestingPolicy::nested());
        assert_eq!(policies.policy_for("spacing"), NestingPolicy::nested());
    }

    #[test]
    fn test_camel_case_helper() {
        assert_eq!(camel_case("transition-duration"), "transitionDuration");
        assert_eq!(camel_case("font-family"), "fontFamily");
        assert_eq!(camel_case("mono"), "mono");
    }
}
