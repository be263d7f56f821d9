//! The ordered declaration stream consumed by the engine.
//!
//! Declarations arrive from an extraction layer (see [`crate::extract`]) or
//! from a host that tokenizes sources itself. Order is significant: deletion
//! semantics replay the stream front to back, so every container here keeps
//! insertion order.

use serde::{Deserialize, Serialize};

use crate::conflict::RuleOverride;

/// Where a declaration was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Inside the theme block (`@theme { ... }`).
    Base,
    /// On `:root` or `html`, visible to references but not themed directly.
    RootScope,
    /// On a variant selector such as `.dark` or `[data-theme="ocean"]`.
    VariantScope,
}

/// One custom-property assignment plus provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Full property name including the `--` marker.
    pub name: String,
    /// Raw value text, never validated.
    pub value: String,
    pub origin: Origin,
    /// Selector of the enclosing rule. For compound variants this is the
    /// innermost modifier only, e.g. `&.compact`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Variant id for `VariantScope` declarations, dot-joined when nested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
}

impl Declaration {
    /// Creates a declaration in the base theme scope.
    pub fn base(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            origin: Origin::Base,
            selector: None,
            variant_id: None,
        }
    }

    /// Creates a `:root` declaration.
    pub fn root(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            origin: Origin::RootScope,
            selector: Some(":root".to_string()),
            variant_id: None,
        }
    }

    /// Creates a variant-scoped declaration.
    pub fn variant(
        variant_id: impl Into<String>,
        selector: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            origin: Origin::VariantScope,
            selector: Some(selector.into()),
            variant_id: Some(variant_id.into()),
        }
    }
}

/// Raw `@keyframes` block carried through to the theme untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyframes {
    pub name: String,
    /// Full block text, `@keyframes name { ... }`.
    pub css: String,
}

/// Everything the engine needs for one resolution run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeInput {
    /// Factory defaults, lowest precedence in every reference index.
    #[serde(default)]
    pub factory_defaults: Vec<Declaration>,
    /// The ordered declaration stream, all origins interleaved.
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    /// Literal style rules found inside variant scopes.
    #[serde(default)]
    pub rule_overrides: Vec<RuleOverride>,
    #[serde(default)]
    pub keyframes: Vec<Keyframes>,
}

impl ThemeInput {
    /// Creates an input from a declaration stream.
    pub fn new(declarations: Vec<Declaration>) -> Self {
        Self {
            declarations,
            ..Self::default()
        }
    }

    /// Sets the factory defaults, returning `self` for chaining.
    pub fn with_factory_defaults(mut self, defaults: Vec<Declaration>) -> Self {
        self.factory_defaults = defaults;
        self
    }

    /// Appends literal rule overrides, returning `self` for chaining.
    pub fn with_rule_overrides(mut self, overrides: Vec<RuleOverride>) -> Self {
        self.rule_overrides.extend(overrides);
        self
    }

    /// Appends another input after this one, preserving order.
    pub fn append(&mut self, other: ThemeInput) {
        self.factory_defaults.extend(other.factory_defaults);
        self.declarations.extend(other.declarations);
        self.rule_overrides.extend(other.rule_overrides);
        self.keyframes.extend(other.keyframes);
    }

    /// Returns true if there is nothing to resolve.
    pub fn is_empty(&self) -> bool {
        self.factory_defaults.is_empty() && self.declarations.is_empty()
    }

    /// Iterates declarations of one origin, in stream order.
    pub fn by_origin(&self, origin: Origin) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(move |d| d.origin == origin)
    }
}
