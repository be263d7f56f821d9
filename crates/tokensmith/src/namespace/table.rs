//! Static namespace dispatch.
//!
//! Each namespace maps to one theme sub-tree and the writer that knows how
//! to store its keys. Anything not listed here is unmapped and contributes
//! nothing to the theme.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::theme::ThemeProperty;

/// How values for a namespace are written into the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Writer {
    /// Keys are parsed into nested paths under the namespace's policy.
    Nested,
    /// Size leaves paired with `--line-height` companions.
    FontSize,
    /// Free-form bucket: camelCased keys, no nesting.
    Defaults,
}

/// Where a namespace's values land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamespaceTarget {
    pub property: ThemeProperty,
    pub writer: Writer,
}

const NAMESPACE_TABLE: &[(&str, ThemeProperty, Writer)] = &[
    ("color", ThemeProperty::Colors, Writer::Nested),
    ("spacing", ThemeProperty::Spacing, Writer::Nested),
    ("font", ThemeProperty::Fonts, Writer::Nested),
    ("text", ThemeProperty::FontSize, Writer::FontSize),
    ("font-weight", ThemeProperty::FontWeight, Writer::Nested),
    ("tracking", ThemeProperty::Tracking, Writer::Nested),
    ("leading", ThemeProperty::Leading, Writer::Nested),
    ("breakpoint", ThemeProperty::Breakpoints, Writer::Nested),
    ("container", ThemeProperty::Containers, Writer::Nested),
    ("radius", ThemeProperty::Radius, Writer::Nested),
    ("shadow", ThemeProperty::Shadows, Writer::Nested),
    ("inset-shadow", ThemeProperty::InsetShadows, Writer::Nested),
    ("drop-shadow", ThemeProperty::DropShadows, Writer::Nested),
    ("text-shadow", ThemeProperty::TextShadows, Writer::Nested),
    ("blur", ThemeProperty::Blur, Writer::Nested),
    ("perspective", ThemeProperty::Perspective, Writer::Nested),
    ("aspect", ThemeProperty::Aspect, Writer::Nested),
    ("ease", ThemeProperty::Easing, Writer::Nested),
    ("animate", ThemeProperty::Animations, Writer::Nested),
    ("default", ThemeProperty::Defaults, Writer::Defaults),
];

static NAMESPACES: Lazy<HashMap<&'static str, NamespaceTarget>> = Lazy::new(|| {
    NAMESPACE_TABLE
        .iter()
        .map(|(namespace, property, writer)| {
            (
                *namespace,
                NamespaceTarget {
                    property: *property,
                    writer: *writer,
                },
            )
        })
        .collect()
});

/// Looks up the theme target for a namespace.
pub fn namespace_target(namespace: &str) -> Option<NamespaceTarget> {
    NAMESPACES.get(namespace).copied()
}

/// Returns the namespace that feeds `property`.
pub fn namespace_for(property: ThemeProperty) -> &'static str {
    NAMESPACE_TABLE
        .iter()
        .find(|(_, p, _)| *p == property)
        .map(|(namespace, _, _)| *namespace)
        .unwrap_or_default()
}
