//! The resolution pipeline.
//!
//! [`Engine::resolve`] runs, in order:
//!
//! 1. the structural check (an input without any declaration is an error);
//! 2. manual overrides injected as synthetic declarations, so other tokens
//!    can reference them;
//! 3. the base theme build;
//! 4. variant composition;
//! 5. conflict detection, applying high-confidence conflicts when enabled;
//! 6. manual overrides written directly into the built trees.
//!
//! The engine owns its caches. Resolving the same input twice reuses reference
//! indexes and key parses from the first run.

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::cache::{CacheStats, IndexKey, ResolutionCache};
use crate::config::{EngineConfig, BASE_SCOPE};
use crate::conflict::{Conflict, ConflictDetector};
use crate::declaration::{Declaration, Origin, ThemeInput};
use crate::error::{Result, ThemeError};
use crate::extract::{self, SourceLoader};
use crate::namespace::{namespace_for, Deprecation};
use crate::resolve::ReferenceIndex;
use crate::theme::{
    ReferenceMap, ResolvedDeclaration, Theme, ThemeBuilder, ThemePath, ThemeProperty,
    UnresolvedVariable, LINE_HEIGHT_SEGMENT, LINE_HEIGHT_SUFFIX,
};
use crate::variant::{Variant, VariantComposer};

/// Everything one resolution produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTheme {
    pub base: Theme,
    pub variants: IndexMap<String, Variant>,
    pub deprecations: Vec<Deprecation>,
    pub conflicts: Vec<Conflict>,
    pub unresolved: Vec<UnresolvedVariable>,
    pub declarations: Vec<ResolvedDeclaration>,
}

impl ResolvedTheme {
    pub fn variant(&self, id: &str) -> Option<&Variant> {
        self.variants.get(id)
    }

    /// Pretty-printed JSON for downstream generators.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Resolves [`ThemeInput`]s under one configuration.
pub struct Engine {
    config: EngineConfig,
    cache: ResolutionCache,
}

impl Engine {
    /// Creates an engine, validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let cache = ResolutionCache::new(config.cache.index_capacity, config.cache.key_capacity);
        Ok(Self { config, cache })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Extracts and resolves a stylesheet.
    pub fn resolve_css(&mut self, css: &str) -> Result<ResolvedTheme> {
        let input = extract::parse_css(css);
        self.resolve(&input)
    }

    /// Loads an entry stylesheet, inlining imports, and resolves it.
    pub fn resolve_entry(
        &mut self,
        path: &Path,
        loader: &dyn SourceLoader,
    ) -> Result<ResolvedTheme> {
        let input = extract::load_entry(path, loader)?;
        self.resolve(&input)
    }

    /// Runs the full pipeline over `input`.
    pub fn resolve(&mut self, input: &ThemeInput) -> Result<ResolvedTheme> {
        if input.is_empty() {
            return Err(ThemeError::NoDeclarations);
        }
        let input = self.inject_overrides(input);

        let factory: Vec<&Declaration> = input.factory_defaults.iter().collect();
        let base: Vec<&Declaration> = input.by_origin(Origin::Base).collect();
        let root: Vec<&Declaration> = input.by_origin(Origin::RootScope).collect();
        let layers = [&factory, &base, &root];

        let reference_map = ReferenceMap::from_base(base.iter().copied(), self.cache.keys());
        let key = IndexKey::for_layers(None, layers.iter().map(|layer| layer.iter().copied()));
        let index = self.cache.index_for(key, || {
            ReferenceIndex::layered(layers.iter().map(|layer| layer.iter().copied()))
        });

        let nesting = &self.config.nesting;
        let base_output = ThemeBuilder::new(&index, nesting, &reference_map, self.cache.keys())
            .build(base.iter().copied())?;

        let mut resolved = ResolvedTheme {
            base: base_output.theme,
            unresolved: base_output.unresolved,
            declarations: base_output.resolved,
            ..ResolvedTheme::default()
        };
        resolved.base.set_keyframes(input.keyframes.clone());
        let mut seen: HashSet<String> = HashSet::new();
        push_deprecations(&mut resolved.deprecations, &mut seen, base_output.deprecations);

        let composed = VariantComposer::new(&self.config.nesting, &reference_map)
            .compose(&input, &mut self.cache)?;
        for (variant, output) in composed {
            push_deprecations(&mut resolved.deprecations, &mut seen, output.deprecations);
            resolved.unresolved.extend(output.unresolved);
            resolved.declarations.extend(output.resolved.into_iter().filter(|d| {
                d.origin == Origin::VariantScope
                    && d.variant_id.as_deref() == Some(variant.id.as_str())
            }));
            resolved.variants.insert(variant.id.clone(), variant);
        }

        resolved.conflicts = ConflictDetector::new(&self.config.nesting).detect(
            &input.rule_overrides,
            &resolved.variants,
            self.cache.keys(),
        );
        if self.config.auto_apply {
            let applied = ConflictDetector::apply(&resolved.conflicts, &mut resolved.variants);
            debug!("applied {} of {} conflicts", applied, resolved.conflicts.len());
        }

        self.apply_overrides(&mut resolved);
        debug!(
            "resolved {} declarations into base and {} variants",
            resolved.declarations.len(),
            resolved.variants.len()
        );
        Ok(resolved)
    }

    /// Appends manual overrides as synthetic declarations.
    fn inject_overrides(&self, input: &ThemeInput) -> ThemeInput {
        let mut input = input.clone();
        for (scope, values) in &self.config.overrides {
            let selector = selector_for_scope(&input, scope);
            for (path, value) in values {
                let Some(name) = ThemePath::parse(path).as_ref().and_then(declaration_name) else {
                    continue;
                };
                let declaration = if scope == BASE_SCOPE {
                    Declaration::base(name, value.as_str())
                } else {
                    Declaration::variant(scope.as_str(), selector.as_str(), name, value.as_str())
                };
                input.declarations.push(declaration);
            }
        }
        input
    }

    fn apply_overrides(&self, resolved: &mut ResolvedTheme) {
        for scope in self.config.overrides.keys() {
            let theme = if scope == BASE_SCOPE {
                Some(&mut resolved.base)
            } else {
                resolved.variants.get_mut(scope).map(|variant| &mut variant.theme)
            };
            let Some(theme) = theme else {
                debug!("override scope '{}' matches no variant", scope);
                continue;
            };
            for (path, value) in self.config.overrides_for(scope) {
                theme.set(&path, value);
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        let config = EngineConfig::default();
        let cache = ResolutionCache::new(config.cache.index_capacity, config.cache.key_capacity);
        Self { config, cache }
    }
}

fn push_deprecations(
    into: &mut Vec<Deprecation>,
    seen: &mut HashSet<String>,
    from: Vec<Deprecation>,
) {
    for deprecation in from {
        if seen.insert(deprecation.name.clone()) {
            into.push(deprecation);
        }
    }
}

/// The custom property name that writes `path`.
fn declaration_name(path: &ThemePath) -> Option<String> {
    let namespace = namespace_for(path.property);
    if namespace.is_empty() {
        return None;
    }
    if path.property == ThemeProperty::FontSize {
        return match path.segments.as_slice() {
            [key] => Some(format!("--{}-{}", namespace, key)),
            [key, segment] if segment == LINE_HEIGHT_SEGMENT => {
                Some(format!("--{}-{}{}", namespace, key, LINE_HEIGHT_SUFFIX))
            }
            _ => None,
        };
    }
    Some(format!("--{}-{}", namespace, path.segments.join("-")))
}

fn selector_for_scope(input: &ThemeInput, scope: &str) -> String {
    input
        .declarations
        .iter()
        .filter(|d| d.variant_id.as_deref() == Some(scope))
        .find_map(|d| d.selector.clone())
        .unwrap_or_else(|| format!(".{}", scope))
}
