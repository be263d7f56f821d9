//! Reference resolution.
//!
//! Values may reference other custom properties through `var()`. Two shapes
//! are handled differently:
//!
//! - A **bare reference** (`var(--bg)`) is replaced by the target's resolved
//!   value. The target may itself be a reference or a function expression,
//!   so resolution recurses into it.
//! - A **composite value** (`calc(var(--spacing) * 4)`,
//!   `0 1px var(--shadow-color)`) has each embedded reference substituted in
//!   place, iterating until nothing changes. The loop is capped at
//!   [`MAX_SUBSTITUTION_ITERATIONS`].
//!
//! ## Cycles
//!
//! Every top-level call threads a set of in-flight names. Meeting one of
//! them again leaves that reference unexpanded, so cyclic graphs terminate
//! without a separate detection pass:
//!
//! ```rust
//! use std::collections::HashSet;
//! use tokensmith::resolve::{resolve, ReferenceIndex};
//!
//! let mut index = ReferenceIndex::new();
//! index.insert("--a", "var(--b)");
//! index.insert("--b", "var(--a)");
//!
//! let mut visited = HashSet::from(["--a".to_string()]);
//! let value = resolve("var(--b)", &index, &mut visited).unwrap();
//! assert_eq!(value, "var(--a)");
//! ```
//!
//! Unresolvable references use their fallback when one is given and are
//! otherwise left verbatim.

mod index;
mod reference;

use std::collections::HashSet;

use log::{debug, warn};

pub use index::ReferenceIndex;
pub use reference::{
    bare_reference, find_references, is_dynamic, referenced_names, Reference, DYNAMIC_FUNCTIONS,
};

use crate::error::{Result, ThemeError};

/// Upper bound on substitution passes over one composite value.
pub const MAX_SUBSTITUTION_ITERATIONS: usize = 100;

/// Resolves `value` against `index`.
///
/// `visited` holds the names currently being expanded; it is restored to its
/// original contents before returning.
pub fn resolve(
    value: &str,
    index: &ReferenceIndex,
    visited: &mut HashSet<String>,
) -> Result<String> {
    if let Some(reference) = bare_reference(value) {
        return Ok(expand(&reference, index, visited)?.unwrap_or_else(|| value.trim().to_string()));
    }
    if !value.contains("var(") {
        return Ok(value.to_string());
    }
    substitute(value, index, visited, MAX_SUBSTITUTION_ITERATIONS)
}

/// Resolves the value of the declaration `name`, treating `name` itself as
/// in flight so self references stay unexpanded.
pub fn resolve_declaration(name: &str, value: &str, index: &ReferenceIndex) -> Result<String> {
    let mut visited = HashSet::from([name.to_string()]);
    resolve(value, index, &mut visited)
}

/// Expands one reference. `None` means leave it verbatim.
fn expand(
    reference: &Reference<'_>,
    index: &ReferenceIndex,
    visited: &mut HashSet<String>,
) -> Result<Option<String>> {
    if visited.contains(reference.name) {
        debug!("reference cycle through {}, leaving unexpanded", reference.name);
        return Ok(None);
    }

    match index.get(reference.name) {
        Some(target) => {
            visited.insert(reference.name.to_string());
            let resolved = resolve(target, index, visited);
            visited.remove(reference.name);
            resolved.map(Some)
        }
        None => match reference.fallback {
            Some(fallback) => resolve(fallback, index, visited).map(Some),
            None => Ok(None),
        },
    }
}

/// Substitutes embedded references until the value settles, in at most
/// `limit` passes.
///
/// Every pass past the first must expand a name no earlier pass expanded,
/// so the pass count stays within the number of distinct names involved.
fn substitute(
    value: &str,
    index: &ReferenceIndex,
    visited: &mut HashSet<String>,
    limit: usize,
) -> Result<String> {
    let mut current = value.to_string();
    // Spans left verbatim, and names already expanded by an earlier pass.
    // A name resurfacing after its own expansion is cycle residue.
    let mut settled: HashSet<String> = HashSet::new();
    let mut expanded: HashSet<String> = HashSet::new();

    for pass in 0..limit {
        let references = find_references(&current);
        let mut next = String::with_capacity(current.len());
        let mut last = 0;
        let mut changed = false;
        let mut expanded_now = Vec::new();

        for reference in &references {
            next.push_str(&current[last..reference.start]);
            let span = &current[reference.start..reference.end];
            let frozen = pass > 0 && expanded.contains(reference.name);
            let replacement = if settled.contains(span) || frozen {
                None
            } else {
                expand(reference, index, visited)?
            };
            match replacement {
                Some(text) => {
                    next.push_str(&text);
                    expanded_now.push(reference.name.to_string());
                    changed = true;
                }
                None => {
                    settled.insert(span.to_string());
                    next.push_str(span);
                }
            }
            last = reference.end;
        }

        if !changed {
            return Ok(current);
        }
        next.push_str(&current[last..]);
        expanded.extend(expanded_now);
        current = next;
    }

    warn!("reference substitution in '{}' hit the {} pass limit", value, limit);
    Err(ThemeError::SubstitutionLimit {
        value: value.to_string(),
        iterations: limit,
    })
}
