//! Conflicts between literal style rules and variant themes.
//!
//! A stylesheet may restyle a utility inside a variant directly, e.g.
//! `.dark .bg-primary { background-color: #000 }`, instead of redefining the
//! token. When the themed path (`colors.primary` in the `dark` variant)
//! holds a different value, that is a [`Conflict`].
//!
//! Each conflict is scored. Only a single, unqualified class selector with no
//! pseudo-class or combinator, outside any media query, with a static value
//! and at most [`MAX_SIMPLE_DECLARATIONS`] declarations is
//! [`Confidence::High`]. One disqualifying trait drops it to `Medium`; more,
//! or a structurally complex rule, give `Low`. High-confidence conflicts
//! can be written back into the variant theme.

mod mapping;
mod selector;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

pub use mapping::{property_target, theme_path_for};
pub use selector::{analyze_selector, SelectorInfo};

use crate::cache::KeyCache;
use crate::namespace::NestingPolicies;
use crate::resolve::is_dynamic;
use crate::theme::ThemePath;
use crate::variant::Variant;

/// Most declarations a rule may carry and still score `High`.
pub const MAX_SIMPLE_DECLARATIONS: usize = 3;

/// Structural class of a rule's selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Complexity {
    #[default]
    Simple,
    Complex,
}

/// A literal declaration inside a variant-scoped rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOverride {
    pub variant_id: String,
    pub selector: String,
    pub property: String,
    pub value: String,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub in_media_query: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_query: Option<String>,
    /// Declarations in the enclosing rule, this one included.
    #[serde(default = "one")]
    pub declaration_count: usize,
}

fn one() -> usize {
    1
}

impl RuleOverride {
    /// Creates an override, classifying the selector.
    pub fn new(
        variant_id: impl Into<String>,
        selector: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let selector = selector.into();
        let info = analyze_selector(&selector);
        let (complexity, reason) = if info.is_complex() {
            let reason = if info.is_list { "selector list" } else { "combinator" };
            (Complexity::Complex, Some(reason.to_string()))
        } else {
            (Complexity::Simple, None)
        };
        Self {
            variant_id: variant_id.into(),
            selector,
            property: property.into(),
            value: value.into(),
            complexity,
            reason,
            in_media_query: false,
            media_query: None,
            declaration_count: 1,
        }
    }

    pub fn with_media_query(mut self, query: impl Into<String>) -> Self {
        self.in_media_query = true;
        self.media_query = Some(query.into());
        self
    }

    pub fn with_declaration_count(mut self, count: usize) -> Self {
        self.declaration_count = count;
        self
    }
}

/// How safe a conflict is to resolve automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// A themed path whose variant value disagrees with a literal rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub variant_id: String,
    pub theme_property: String,
    /// Dotted key below the property, e.g. `red.500`.
    pub theme_key: String,
    pub rule_override: RuleOverride,
    pub variable_value: String,
    pub rule_value: String,
    pub confidence: Confidence,
    pub auto_applicable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip)]
    path: Option<ThemePath>,
}

impl Conflict {
    /// The theme path this conflict addresses.
    pub fn path(&self) -> Option<&ThemePath> {
        self.path.as_ref()
    }
}

/// Scores a rule, returning the confidence and the disqualifying traits.
pub fn score(rule: &RuleOverride) -> (Confidence, Vec<&'static str>) {
    let info = analyze_selector(&rule.selector);
    let mut traits = Vec::new();
    if info.is_list {
        traits.push("multiple selectors");
    }
    if info.is_qualified {
        traits.push("qualified selector");
    }
    if info.has_pseudo {
        traits.push("pseudo-class");
    }
    if info.has_combinator {
        traits.push("combinator");
    }
    if rule.in_media_query {
        traits.push("inside media query");
    }
    if is_dynamic(&rule.value) {
        traits.push("dynamic value");
    }
    if rule.declaration_count > MAX_SIMPLE_DECLARATIONS {
        traits.push("too many declarations");
    }

    let confidence = match (rule.complexity, traits.len()) {
        (Complexity::Complex, _) => Confidence::Low,
        (_, 0) => Confidence::High,
        (_, 1) => Confidence::Medium,
        _ => Confidence::Low,
    };
    (confidence, traits)
}

fn normalize(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Finds conflicts between rule overrides and variant themes.
pub struct ConflictDetector<'a> {
    policies: &'a NestingPolicies,
}

impl<'a> ConflictDetector<'a> {
    pub fn new(policies: &'a NestingPolicies) -> Self {
        Self { policies }
    }

    /// Emits one conflict per override whose themed path holds a different
    /// value in its variant.
    pub fn detect(
        &self,
        overrides: &[RuleOverride],
        variants: &IndexMap<String, Variant>,
        keys: &mut KeyCache,
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        for rule in overrides {
            let Some(variant) = variants.get(&rule.variant_id) else {
                debug!("override for unknown variant '{}'", rule.variant_id);
                continue;
            };
            let info = analyze_selector(&rule.selector);
            let Some(path) = theme_path_for(&rule.property, &info.classes, self.policies, keys)
            else {
                continue;
            };
            let Some(current) = variant.theme.get(&path) else {
                continue;
            };
            if normalize(current) == normalize(&rule.value) {
                continue;
            }

            let (confidence, traits) = score(rule);
            let reason = match (&rule.reason, traits.is_empty()) {
                (_, false) => Some(traits.join(", ")),
                (Some(reason), true) => Some(reason.clone()),
                (None, true) => None,
            };
            conflicts.push(Conflict {
                variant_id: rule.variant_id.clone(),
                theme_property: path.property.name().to_string(),
                theme_key: path.segments.join("."),
                rule_override: rule.clone(),
                variable_value: current.to_string(),
                rule_value: rule.value.clone(),
                confidence,
                auto_applicable: confidence == Confidence::High,
                reason,
                path: Some(path),
            });
        }
        conflicts
    }

    /// Writes every auto-applicable conflict's rule value into its variant.
    /// Returns the number applied.
    pub fn apply(conflicts: &[Conflict], variants: &mut IndexMap<String, Variant>) -> usize {
        let mut applied = 0;
        for conflict in conflicts.iter().filter(|c| c.auto_applicable) {
            let (Some(path), Some(variant)) =
                (conflict.path(), variants.get_mut(&conflict.variant_id))
            else {
                continue;
            };
            if variant.theme.set(path, conflict.rule_value.clone()) {
                debug!("applied {} = {} in '{}'", path, conflict.rule_value, conflict.variant_id);
                applied += 1;
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;

    fn variants(path: &str, value: &str) -> IndexMap<String, Variant> {
        let mut theme = Theme::new();
        theme.set(&ThemePath::parse(path).unwrap(), value);
        IndexMap::from([(
            "dark".to_string(),
            Variant {
                id: "dark".to_string(),
                selector: ".dark".to_string(),
                theme,
            },
        )])
    }

    fn detect(rule: RuleOverride, variants: &IndexMap<String, Variant>) -> Vec<Conflict> {
        let policies = NestingPolicies::new();
        let mut keys = KeyCache::new(16);
        ConflictDetector::new(&policies).detect(&[rule], variants, &mut keys)
    }

    #[test]
    fn test_simple_rule_is_high_and_applied() {
        let mut vs = variants("colors.primary", "#111");
        let rule = RuleOverride::new("dark", ".bg-primary", "background-color", "#000");
        let conflicts = detect(rule, &vs);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].confidence, Confidence::High);
        assert_eq!(conflicts[0].theme_key, "primary");
        assert_eq!(conflicts[0].variable_value, "#111");

        assert_eq!(ConflictDetector::apply(&conflicts, &mut vs), 1);
        assert_eq!(vs["dark"].theme.lookup("colors.primary"), Some("#000"));
    }

    #[test]
    fn test_same_value_is_not_a_conflict() {
        let vs = variants("colors.primary", "#000");
        let rule = RuleOverride::new("dark", ".bg-primary", "background-color", " #000 ");
        assert!(detect(rule, &vs).is_empty());
    }

    #[test]
    fn test_one_trait_is_medium() {
        let vs = variants("colors.primary", "#111");
        let rule = RuleOverride::new("dark", ".bg-primary:hover", "background-color", "#000");
        let conflicts = detect(rule, &vs);
        assert_eq!(conflicts[0].confidence, Confidence::Medium);
        assert_eq!(conflicts[0].reason.as_deref(), Some("pseudo-class"));
        assert!(!conflicts[0].auto_applicable);
    }

    #[test]
    fn test_media_and_dynamic_is_low() {
        let vs = variants("colors.primary", "#111");
        let rule = RuleOverride::new("dark", ".bg-primary", "background-color", "var(--x)")
            .with_media_query("(prefers-color-scheme: dark)");
        assert_eq!(detect(rule, &vs)[0].confidence, Confidence::Low);
    }

    #[test]
    fn test_declaration_count_limit() {
        let rule = RuleOverride::new("dark", ".bg-primary", "background-color", "#000")
            .with_declaration_count(4);
        assert_eq!(score(&rule).0, Confidence::Medium);
        let rule = rule.with_declaration_count(3);
        assert_eq!(score(&rule).0, Confidence::High);
    }

    #[test]
    fn test_complex_rule_is_low() {
        let rule = RuleOverride::new("dark", ".card .bg-primary", "background-color", "#000");
        assert_eq!(rule.complexity, Complexity::Complex);
        assert_eq!(rule.reason.as_deref(), Some("combinator"));
        assert_eq!(score(&rule).0, Confidence::Low);

        let rule = RuleOverride::new("dark", ".bg-primary, .bg-x", "background-color", "#000");
        assert_eq!(rule.reason.as_deref(), Some("selector list"));
        assert_eq!(score(&rule).0, Confidence::Low);

        let rule = RuleOverride::new("dark", ".bg-primary", "background-color", "#000");
        assert_eq!(rule.complexity, Complexity::Simple);
        assert!(rule.reason.is_none());
    }

    #[test]
    fn test_unknown_variant_and_unmapped_path_skipped() {
        let vs = variants("colors.primary", "#111");
        let other_variant = RuleOverride::new("ocean", ".bg-primary", "background-color", "#000");
        assert!(detect(other_variant, &vs).is_empty());
        let unknown_utility = RuleOverride::new("dark", ".bg-missing", "background-color", "#000");
        assert!(detect(unknown_utility, &vs).is_empty());
        assert!(detect(RuleOverride::new("dark", ".p-4", "padding", "1rem"), &vs).is_empty());
    }
}
