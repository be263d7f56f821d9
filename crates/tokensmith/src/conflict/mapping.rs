//! CSS property to theme path mapping for utility-class rules.

use crate::cache::KeyCache;
use crate::namespace::{namespace_for, NestingPolicies};
use crate::theme::{ThemePath, ThemeProperty};

/// CSS property, the theme property it reads, and the utility class prefix
/// that names the token.
const PROPERTY_TABLE: &[(&str, ThemeProperty, &str)] = &[
    ("background-color", ThemeProperty::Colors, "bg-"),
    ("background", ThemeProperty::Colors, "bg-"),
    ("color", ThemeProperty::Colors, "text-"),
    ("border-color", ThemeProperty::Colors, "border-"),
    ("outline-color", ThemeProperty::Colors, "outline-"),
    ("text-decoration-color", ThemeProperty::Colors, "decoration-"),
    ("accent-color", ThemeProperty::Colors, "accent-"),
    ("caret-color", ThemeProperty::Colors, "caret-"),
    ("fill", ThemeProperty::Colors, "fill-"),
    ("stroke", ThemeProperty::Colors, "stroke-"),
    ("font-size", ThemeProperty::FontSize, "text-"),
    ("font-family", ThemeProperty::Fonts, "font-"),
    ("font-weight", ThemeProperty::FontWeight, "font-"),
    ("letter-spacing", ThemeProperty::Tracking, "tracking-"),
    ("line-height", ThemeProperty::Leading, "leading-"),
    ("border-radius", ThemeProperty::Radius, "rounded-"),
    ("box-shadow", ThemeProperty::Shadows, "shadow-"),
    ("transition-timing-function", ThemeProperty::Easing, "ease-"),
    ("animation", ThemeProperty::Animations, "animate-"),
    ("aspect-ratio", ThemeProperty::Aspect, "aspect-"),
    ("perspective", ThemeProperty::Perspective, "perspective-"),
];

/// Theme property and utility prefix for a CSS property.
pub fn property_target(property: &str) -> Option<(ThemeProperty, &'static str)> {
    let property = property.trim().to_ascii_lowercase();
    PROPERTY_TABLE
        .iter()
        .find(|(name, _, _)| *name == property)
        .map(|(_, theme_property, prefix)| (*theme_property, *prefix))
}

/// Resolves the theme path a utility rule writes.
///
/// The first class carrying the property's prefix names the token. Variant
/// prefixes such as `dark:` are stripped first. The key is split under the
/// namespace's nesting policy, so `.bg-red-500` with `background-color`
/// addresses `colors.red.500`.
pub fn theme_path_for(
    property: &str,
    classes: &[String],
    policies: &NestingPolicies,
    keys: &mut KeyCache,
) -> Option<ThemePath> {
    let (theme_property, prefix) = property_target(property)?;
    let key = classes.iter().find_map(|class| {
        let utility = class.rsplit(':').next().unwrap_or(class);
        utility.strip_prefix(prefix).filter(|key| !key.is_empty())
    })?;

    let policy = policies.policy_for(namespace_for(theme_property));
    let segments = keys.parse_path(key, &policy).into_segments()?;
    Some(ThemePath::new(theme_property, segments))
}
