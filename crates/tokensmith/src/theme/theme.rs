//! The resolved theme: a fixed set of named sub-trees.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::tree::{keys_from_segments, ThemeKey, ThemeTree};
use crate::declaration::Keyframes;

/// The theme sub-trees, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThemeProperty {
    Colors,
    Spacing,
    Fonts,
    FontSize,
    FontWeight,
    Tracking,
    Leading,
    Breakpoints,
    Containers,
    Radius,
    Shadows,
    InsetShadows,
    DropShadows,
    TextShadows,
    Blur,
    Perspective,
    Aspect,
    Easing,
    Animations,
    Defaults,
}

impl ThemeProperty {
    pub const ALL: &'static [ThemeProperty] = &[
        ThemeProperty::Colors,
        ThemeProperty::Spacing,
        ThemeProperty::Fonts,
        ThemeProperty::FontSize,
        ThemeProperty::FontWeight,
        ThemeProperty::Tracking,
        ThemeProperty::Leading,
        ThemeProperty::Breakpoints,
        ThemeProperty::Containers,
        ThemeProperty::Radius,
        ThemeProperty::Shadows,
        ThemeProperty::InsetShadows,
        ThemeProperty::DropShadows,
        ThemeProperty::TextShadows,
        ThemeProperty::Blur,
        ThemeProperty::Perspective,
        ThemeProperty::Aspect,
        ThemeProperty::Easing,
        ThemeProperty::Animations,
        ThemeProperty::Defaults,
    ];

    /// The camelCase name used in theme paths and serialized output.
    pub fn name(self) -> &'static str {
        match self {
            ThemeProperty::Colors => "colors",
            ThemeProperty::Spacing => "spacing",
            ThemeProperty::Fonts => "fonts",
            ThemeProperty::FontSize => "fontSize",
            ThemeProperty::FontWeight => "fontWeight",
            ThemeProperty::Tracking => "tracking",
            ThemeProperty::Leading => "leading",
            ThemeProperty::Breakpoints => "breakpoints",
            ThemeProperty::Containers => "containers",
            ThemeProperty::Radius => "radius",
            ThemeProperty::Shadows => "shadows",
            ThemeProperty::InsetShadows => "insetShadows",
            ThemeProperty::DropShadows => "dropShadows",
            ThemeProperty::TextShadows => "textShadows",
            ThemeProperty::Blur => "blur",
            ThemeProperty::Perspective => "perspective",
            ThemeProperty::Aspect => "aspect",
            ThemeProperty::Easing => "easing",
            ThemeProperty::Animations => "animations",
            ThemeProperty::Defaults => "defaults",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }
}

impl fmt::Display for ThemeProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A font size with its optional companion line height.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSize {
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<String>,
}

/// Segment addressing a font size's line height in a [`ThemePath`].
pub const LINE_HEIGHT_SEGMENT: &str = "lineHeight";

/// A dotted address into a theme, e.g. `colors.red.500`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThemePath {
    pub property: ThemeProperty,
    pub segments: Vec<String>,
}

impl ThemePath {
    pub fn new(property: ThemeProperty, segments: Vec<String>) -> Self {
        Self { property, segments }
    }

    /// Parses `property.seg.seg`. The property must be known and at least
    /// one segment present.
    pub fn parse(path: &str) -> Option<Self> {
        let mut parts = path.split('.');
        let property = ThemeProperty::from_name(parts.next()?)?;
        let segments: Vec<String> = parts.map(str::to_string).collect();
        if segments.is_empty() || segments.iter().any(String::is_empty) {
            return None;
        }
        Some(Self { property, segments })
    }

    pub fn keys(&self) -> Vec<ThemeKey> {
        keys_from_segments(&self.segments)
    }
}

impl fmt::Display for ThemePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.property)?;
        for segment in &self.segments {
            write!(f, ".{}", segment)?;
        }
        Ok(())
    }
}

/// A fully built theme.
///
/// Every sub-tree is insertion ordered. Font sizes live apart from the
/// generic trees because each entry pairs a size with a line height.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(flatten)]
    trees: BTreeMap<ThemeProperty, ThemeTree>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    font_size: IndexMap<String, FontSize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    keyframes: Vec<Keyframes>,
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sub-tree for `property`, if anything was written to it.
    pub fn tree(&self, property: ThemeProperty) -> Option<&ThemeTree> {
        self.trees.get(&property)
    }

    /// Returns the sub-tree for `property`, creating it when missing.
    pub fn tree_mut(&mut self, property: ThemeProperty) -> &mut ThemeTree {
        self.trees.entry(property).or_default()
    }

    pub fn colors(&self) -> Option<&ThemeTree> {
        self.tree(ThemeProperty::Colors)
    }

    pub fn font_sizes(&self) -> &IndexMap<String, FontSize> {
        &self.font_size
    }

    pub fn font_sizes_mut(&mut self) -> &mut IndexMap<String, FontSize> {
        &mut self.font_size
    }

    pub fn keyframes(&self) -> &[Keyframes] {
        &self.keyframes
    }

    pub fn set_keyframes(&mut self, keyframes: Vec<Keyframes>) {
        self.keyframes = keyframes;
    }

    /// Removes every entry under `property`.
    pub fn clear_property(&mut self, property: ThemeProperty) {
        if property == ThemeProperty::FontSize {
            self.font_size.clear();
        } else {
            self.trees.remove(&property);
        }
    }

    /// Removes everything, keyframes included.
    pub fn clear(&mut self) {
        self.trees.clear();
        self.font_size.clear();
        self.keyframes.clear();
    }

    /// Drops sub-trees left empty by deletions.
    pub(crate) fn prune_empty(&mut self) {
        self.trees.retain(|_, tree| !tree.is_empty());
    }

    /// Looks up a value by dotted path.
    ///
    /// ```rust
    /// use tokensmith::{Theme, ThemePath};
    ///
    /// let mut theme = Theme::new();
    /// theme.set(&ThemePath::parse("colors.red.500").unwrap(), "#ef4444");
    /// assert_eq!(theme.lookup("colors.red.500"), Some("#ef4444"));
    /// ```
    pub fn lookup(&self, path: &str) -> Option<&str> {
        self.get(&ThemePath::parse(path)?)
    }

    /// Looks up a value by parsed path.
    pub fn get(&self, path: &ThemePath) -> Option<&str> {
        if path.property == ThemeProperty::FontSize {
            let entry = self.font_size.get(path.segments.first()?)?;
            return match path.segments.get(1).map(String::as_str) {
                None => Some(entry.size.as_str()),
                Some(LINE_HEIGHT_SEGMENT) if path.segments.len() == 2 => {
                    entry.line_height.as_deref()
                }
                Some(_) => None,
            };
        }
        self.tree(path.property)?.value_at(&path.keys())
    }

    /// Writes a value by parsed path. Returns false when the path cannot
    /// address a value (e.g. nested font-size segments).
    pub fn set(&mut self, path: &ThemePath, value: impl Into<String>) -> bool {
        let value = value.into();
        if path.property == ThemeProperty::FontSize {
            let Some(key) = path.segments.first().cloned() else {
                return false;
            };
            return match path.segments.get(1).map(String::as_str) {
                None => {
                    self.font_size.entry(key).or_default().size = value;
                    true
                }
                Some(LINE_HEIGHT_SEGMENT) if path.segments.len() == 2 => {
                    self.font_size.entry(key).or_default().line_height = Some(value);
                    true
                }
                Some(_) => false,
            };
        }
        self.tree_mut(path.property).insert_path(&path.keys(), value);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.trees.values().all(ThemeTree::is_empty) && self.font_size.is_empty()
    }
}
