//! Name → value tables used to resolve references in one scope.

use std::collections::HashMap;

use crate::declaration::Declaration;

/// The reference table for one scope.
///
/// Built by layering declaration lists; a later layer wins by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceIndex {
    values: HashMap<String, String>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from layers, lowest precedence first.
    pub fn layered<'a, L, I>(layers: L) -> Self
    where
        L: IntoIterator<Item = I>,
        I: IntoIterator<Item = &'a Declaration>,
    {
        let mut index = Self::new();
        for layer in layers {
            index.extend(layer);
        }
        index
    }

    /// Adds declarations, overwriting existing names.
    pub fn extend<'a>(&mut self, declarations: impl IntoIterator<Item = &'a Declaration>) {
        for declaration in declarations {
            self.values
                .insert(declaration.name.clone(), declaration.value.clone());
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
