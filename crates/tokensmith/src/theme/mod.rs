//! Theme trees and the builder that fills them.
//!
//! A [`Theme`] holds one [`ThemeTree`] per [`ThemeProperty`] plus the
//! font-size table. [`ThemeBuilder`] produces one from an ordered list of
//! declarations, honoring the `initial` deletion sentinel along the way.

mod builder;
mod exclusion;
#[allow(clippy::module_inception)]
mod theme;
mod tree;

pub use builder::{
    BuildOutput, ReferenceMap, ResolvedDeclaration, Route, ThemeBuilder, UnresolvedVariable,
    LINE_HEIGHT_SUFFIX,
};
pub use exclusion::{is_deletion_sentinel, ExclusionRule, ALL_NAMESPACES, DELETION_SENTINEL};
pub use theme::{FontSize, Theme, ThemePath, ThemeProperty, LINE_HEIGHT_SEGMENT};
pub use tree::{keys_from_segments, ThemeKey, ThemeNode, ThemeTree, DEFAULT_KEY};
