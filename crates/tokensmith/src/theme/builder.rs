//! Building one theme from an ordered declaration list.
//!
//! The builder makes a single pass. Each value is resolved against the
//! scope's [`ReferenceIndex`], then either applied as a deletion (when it is
//! the sentinel) or routed through the namespace table into the tree.
//! Font-size line heights are collected on the side and merged once the pass
//! is done, so `--text-xl--line-height` may appear before `--text-xl`.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use super::exclusion::{is_deletion_sentinel, ExclusionRule};
use super::theme::{Theme, ThemeProperty};
use super::tree::{keys_from_segments, ThemeKey};
use crate::cache::KeyCache;
use crate::declaration::{Declaration, Origin};
use crate::error::Result;
use crate::namespace::{
    camel_case, namespace_target, Deprecation, NamespaceTarget, NestingPolicies, Writer,
};
use crate::resolve::{bare_reference, referenced_names, resolve_declaration, ReferenceIndex};

/// Suffix marking a font size's line-height companion.
pub const LINE_HEIGHT_SUFFIX: &str = "--line-height";

/// A declaration after reference resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDeclaration {
    pub name: String,
    pub raw: String,
    pub resolved: String,
    pub origin: Origin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
}

/// A value that still holds references after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedVariable {
    /// Variant being built, `None` for the base theme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub name: String,
    /// The value as written into the theme, residual references included.
    pub value: String,
    pub references: Vec<String>,
}

/// Where a referenced-but-unmapped name gets written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub target: NamespaceTarget,
    pub namespace: String,
    pub key: String,
}

/// Indirection for two-layer token systems.
///
/// `--color-background: var(--bg)` in the base scope makes `--bg` an alias
/// of `colors.background`: a variant that redefines `--bg` then writes
/// `colors.background` instead of being dropped for its unmapped namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceMap {
    routes: IndexMap<String, Route>,
}

impl ReferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects routes from base declarations that are bare references to
    /// names without a namespace mapping of their own.
    pub fn from_base<'a>(
        declarations: impl IntoIterator<Item = &'a Declaration>,
        keys: &mut KeyCache,
    ) -> Self {
        let mut routes = IndexMap::new();
        for declaration in declarations {
            let Some(reference) = bare_reference(&declaration.value) else {
                continue;
            };
            let target_is_mapped = keys
                .parse_name(reference.name)
                .is_some_and(|parsed| namespace_target(&parsed.namespace).is_some());
            if target_is_mapped {
                continue;
            }
            let Some(parsed) = keys.parse_name(&declaration.name) else {
                continue;
            };
            let Some(target) = namespace_target(&parsed.namespace) else {
                continue;
            };
            routes.insert(
                reference.name.to_string(),
                Route {
                    target,
                    namespace: parsed.namespace,
                    key: parsed.key,
                },
            );
        }
        Self { routes }
    }

    pub fn route(&self, name: &str) -> Option<&Route> {
        self.routes.get(name)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Everything one build produces.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub theme: Theme,
    pub resolved: Vec<ResolvedDeclaration>,
    pub unresolved: Vec<UnresolvedVariable>,
    pub deprecations: Vec<Deprecation>,
}

struct PendingLineHeight {
    key: String,
    value: String,
}

/// Builds a [`Theme`] from declarations in order.
pub struct ThemeBuilder<'a> {
    index: &'a ReferenceIndex,
    policies: &'a NestingPolicies,
    reference_map: &'a ReferenceMap,
    keys: &'a mut KeyCache,
    scope: Option<String>,
}

impl<'a> ThemeBuilder<'a> {
    pub fn new(
        index: &'a ReferenceIndex,
        policies: &'a NestingPolicies,
        reference_map: &'a ReferenceMap,
        keys: &'a mut KeyCache,
    ) -> Self {
        Self {
            index,
            policies,
            reference_map,
            keys,
            scope: None,
        }
    }

    /// Labels diagnostics with the variant being built.
    pub fn scope(mut self, variant_id: impl Into<String>) -> Self {
        self.scope = Some(variant_id.into());
        self
    }

    /// Runs the pass over `declarations`.
    pub fn build<'d>(
        mut self,
        declarations: impl IntoIterator<Item = &'d Declaration>,
    ) -> Result<BuildOutput> {
        let mut output = BuildOutput::default();
        let mut pending: Vec<PendingLineHeight> = Vec::new();
        let mut seen_deprecations: HashSet<String> = HashSet::new();

        for declaration in declarations {
            let resolved = resolve_declaration(&declaration.name, &declaration.value, self.index)?;

            let residual = referenced_names(&resolved);
            if !residual.is_empty() {
                output.unresolved.push(UnresolvedVariable {
                    scope: self.scope.clone(),
                    name: declaration.name.clone(),
                    value: resolved.clone(),
                    references: residual,
                });
            }
            output.resolved.push(ResolvedDeclaration {
                name: declaration.name.clone(),
                raw: declaration.value.clone(),
                resolved: resolved.clone(),
                origin: declaration.origin,
                variant_id: declaration.variant_id.clone(),
            });

            if is_deletion_sentinel(&resolved) {
                match ExclusionRule::from_name(&declaration.name) {
                    Some(rule) => self.apply_exclusion(&rule, &mut output.theme, &mut pending),
                    None => debug!("ignoring deletion with malformed name {}", declaration.name),
                }
                continue;
            }

            let parsed = self.keys.parse_name(&declaration.name);
            if let Some(deprecation) = parsed.as_ref().and_then(|p| p.deprecation.clone()) {
                if seen_deprecations.insert(deprecation.name.clone()) {
                    output.deprecations.push(deprecation);
                }
            }

            let mapped = parsed
                .and_then(|p| namespace_target(&p.namespace).map(|t| (t, p.namespace, p.key)));
            let (target, namespace, key) = match mapped {
                Some(mapped) => mapped,
                None => match self.reference_map.route(&declaration.name) {
                    Some(route) => (route.target, route.namespace.clone(), route.key.clone()),
                    None => {
                        debug!("dropping {}: namespace is not mapped", declaration.name);
                        continue;
                    }
                },
            };

            self.write(target, &namespace, &key, resolved, &mut output.theme, &mut pending);
        }

        for line_height in pending {
            match output.theme.font_sizes_mut().get_mut(&line_height.key) {
                Some(entry) => entry.line_height = Some(line_height.value),
                None => debug!("dropping line height for unknown font size '{}'", line_height.key),
            }
        }
        output.theme.prune_empty();
        Ok(output)
    }

    fn write(
        &mut self,
        target: NamespaceTarget,
        namespace: &str,
        key: &str,
        value: String,
        theme: &mut Theme,
        pending: &mut Vec<PendingLineHeight>,
    ) {
        match target.writer {
            Writer::Nested => {
                let policy = self.policies.policy_for(namespace);
                let Some(segments) = self.keys.parse_path(key, &policy).into_segments() else {
                    debug!("rejected key '{}' in namespace '{}'", key, namespace);
                    return;
                };
                theme
                    .tree_mut(target.property)
                    .insert_path(&keys_from_segments(&segments), value);
            }
            Writer::FontSize => {
                if let Some(size_key) = key.strip_suffix(LINE_HEIGHT_SUFFIX) {
                    if !size_key.is_empty() {
                        pending.push(PendingLineHeight {
                            key: size_key.to_string(),
                            value,
                        });
                    }
                } else if key.contains("--") {
                    debug!("ignoring font-size companion '{}'", key);
                } else {
                    theme.font_sizes_mut().entry(key.to_string()).or_default().size = value;
                }
            }
            Writer::Defaults => {
                theme
                    .tree_mut(ThemeProperty::Defaults)
                    .insert_path(&[ThemeKey::Name(camel_case(key))], value);
            }
        }
    }

    fn apply_exclusion(
        &mut self,
        rule: &ExclusionRule,
        theme: &mut Theme,
        pending: &mut Vec<PendingLineHeight>,
    ) {
        if rule.covers_everything() {
            theme.clear();
            pending.clear();
            return;
        }
        let Some(target) = namespace_target(&rule.namespace) else {
            debug!("deletion for unmapped namespace '{}'", rule.namespace);
            return;
        };

        match target.writer {
            Writer::FontSize => {
                if let Some(size_key) = rule.key_pattern.strip_suffix(LINE_HEIGHT_SUFFIX) {
                    pending.retain(|p| p.key != size_key);
                    if let Some(entry) = theme.font_sizes_mut().get_mut(size_key) {
                        entry.line_height = None;
                    }
                } else {
                    theme
                        .font_sizes_mut()
                        .retain(|key, _| !rule.matches_flat_key(&rule.namespace, key));
                    pending.retain(|p| !rule.matches_flat_key(&rule.namespace, &p.key));
                }
            }
            Writer::Defaults => {
                if rule.covers_namespace() {
                    theme.clear_property(ThemeProperty::Defaults);
                } else {
                    let key = camel_case(&rule.key_pattern);
                    let tree = theme.tree_mut(ThemeProperty::Defaults);
                    tree.remove_value(&[ThemeKey::Name(key.clone())]);
                    if rule.is_wildcard {
                        tree.remove_prefixed(&[], &key);
                    }
                }
            }
            Writer::Nested => {
                if rule.covers_namespace() {
                    theme.clear_property(target.property);
                    return;
                }
                let policy = self.policies.policy_for(&rule.namespace);
                let Some(segments) = rule.pattern_segments(&policy) else {
                    return;
                };
                let keys = keys_from_segments(&segments);
                let tree = theme.tree_mut(target.property);
                if rule.is_wildcard {
                    tree.remove_subtree(&keys);
                    if let (Some(last), Some((_, parent))) = (segments.last(), keys.split_last()) {
                        tree.remove_prefixed(parent, &format!("{}-", last));
                    }
                } else {
                    tree.remove_value(&keys);
                }
            }
        }
        theme.prune_empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(declarations: &[Declaration]) -> BuildOutput {
        let mut index = ReferenceIndex::new();
        index.extend(declarations);
        let policies = NestingPolicies::new();
        let mut keys = KeyCache::new(64);
        let map = ReferenceMap::from_base(declarations, &mut keys);
        ThemeBuilder::new(&index, &policies, &map, &mut keys)
            .build(declarations)
            .unwrap()
    }

    #[test]
    fn test_simple_color() {
        let out = build(&[Declaration::base("--color-primary", "#3b82f6")]);
        assert_eq!(out.theme.lookup("colors.primary"), Some("#3b82f6"));
    }

    #[test]
    fn test_nested_color() {
        let out = build(&[Declaration::base("--color-red-500", "#ef4444")]);
        assert_eq!(out.theme.lookup("colors.red.500"), Some("#ef4444"));
    }

    #[test]
    fn test_flat_namespace_keeps_key() {
        let out = build(&[Declaration::base("--ease-in-out", "cubic-bezier(0.4, 0, 0.2, 1)")]);
        let easing = out.theme.tree(ThemeProperty::Easing).unwrap();
        assert_eq!(
            easing.value_at(&[ThemeKey::Name("in-out".into())]),
            Some("cubic-bezier(0.4, 0, 0.2, 1)")
        );
    }

    #[test]
    fn test_wildcard_then_specific() {
        let out = build(&[
            Declaration::base("--color-brand-dark", "#111"),
            Declaration::base("--color-brand-*", "initial"),
            Declaration::base("--color-brand-light", "#eee"),
        ]);
        assert!(out.theme.lookup("colors.brand.dark").is_none());
        assert_eq!(out.theme.lookup("colors.brand.light"), Some("#eee"));
    }

    #[test]
    fn test_specific_then_wildcard() {
        let out = build(&[
            Declaration::base("--color-brand-light", "#eee"),
            Declaration::base("--color-brand-*", "initial"),
        ]);
        assert!(out.theme.lookup("colors.brand.light").is_none());
        assert!(out.theme.colors().is_none());
    }

    #[test]
    fn test_namespace_wildcard_and_bare_wildcard() {
        let out = build(&[
            Declaration::base("--color-a", "1"),
            Declaration::base("--radius-sm", "2px"),
            Declaration::base("--color-*", "initial"),
        ]);
        assert!(out.theme.colors().is_none());
        assert_eq!(out.theme.lookup("radius.sm"), Some("2px"));

        let out = build(&[
            Declaration::base("--color-a", "1"),
            Declaration::base("--text-sm", "0.875rem"),
            Declaration::base("--*", "initial"),
            Declaration::base("--radius-sm", "2px"),
        ]);
        assert!(out.theme.colors().is_none());
        assert!(out.theme.font_sizes().is_empty());
        assert_eq!(out.theme.lookup("radius.sm"), Some("2px"));
    }

    #[test]
    fn test_font_size_line_height_companion() {
        let out = build(&[
            Declaration::base("--text-xl--line-height", "1.75rem"),
            Declaration::base("--text-xl", "1.25rem"),
            Declaration::base("--text-orphan--line-height", "1"),
        ]);
        let xl = &out.theme.font_sizes()["xl"];
        assert_eq!(xl.size, "1.25rem");
        assert_eq!(xl.line_height.as_deref(), Some("1.75rem"));
        assert!(!out.theme.font_sizes().contains_key("orphan"));
    }

    #[test]
    fn test_font_size_deletion_drops_pending_companion() {
        let out = build(&[
            Declaration::base("--text-xl--line-height", "1.75rem"),
            Declaration::base("--text-*", "initial"),
            Declaration::base("--text-xl", "2rem"),
        ]);
        assert_eq!(out.theme.font_sizes()["xl"].line_height, None);
    }

    #[test]
    fn test_defaults_bucket_camel_cases() {
        let out = build(&[Declaration::base("--default-transition-duration", "150ms")]);
        assert_eq!(out.theme.lookup("defaults.transitionDuration"), Some("150ms"));
    }

    #[test]
    fn test_unmapped_namespace_dropped() {
        let out = build(&[Declaration::base("--tw-ring-offset", "0px")]);
        assert!(out.theme.is_empty());
        assert_eq!(out.resolved.len(), 1);
    }

    #[test]
    fn test_unresolved_still_written() {
        let out = build(&[Declaration::base("--color-x", "var(--nowhere)")]);
        assert_eq!(out.theme.lookup("colors.x"), Some("var(--nowhere)"));
        assert_eq!(out.unresolved.len(), 1);
        assert_eq!(out.unresolved[0].references, vec!["--nowhere"]);
    }

    #[test]
    fn test_legacy_singular_deprecation_recorded_once() {
        let out = build(&[
            Declaration::base("--spacing", "0.25rem"),
            Declaration::base("--spacing", "0.5rem"),
        ]);
        assert_eq!(out.theme.lookup("spacing.base"), Some("0.5rem"));
        assert_eq!(out.deprecations.len(), 1);
        assert_eq!(out.deprecations[0].replacement, "--spacing-base");
    }

    #[test]
    fn test_reference_map_routes_alias() {
        let base = vec![Declaration::base("--color-background", "var(--bg)")];
        let mut keys = KeyCache::new(16);
        let map = ReferenceMap::from_base(&base, &mut keys);
        let route = map.route("--bg").unwrap();
        assert_eq!(route.target.property, ThemeProperty::Colors);
        assert_eq!(route.key, "background");

        let mut index = ReferenceIndex::new();
        index.insert("--bg", "#000");
        let policies = NestingPolicies::new();
        let scoped = [
            base[0].clone(),
            Declaration::variant("dark", ".dark", "--bg", "#0a0a0a"),
        ];
        let out = ThemeBuilder::new(&index, &policies, &map, &mut keys)
            .scope("dark")
            .build(&scoped)
            .unwrap();
        assert_eq!(out.theme.lookup("colors.background"), Some("#0a0a0a"));
    }

    #[test]
    fn test_reference_to_mapped_name_is_not_routed() {
        let base = vec![Declaration::base("--color-accent", "var(--color-primary)")];
        let mut keys = KeyCache::new(16);
        assert!(ReferenceMap::from_base(&base, &mut keys).is_empty());
    }
}
