//! Variant composition.
//!
//! Variant-scoped declarations are grouped by id in first-appearance order.
//! A compound id such as `dark.compact` names a modifier nested inside the
//! `dark` scope; its ancestors are every dot prefix of the id, outermost
//! first.
//!
//! Each variant theme is built over
//! `Base ++ ancestor declarations (outermost to innermost) ++ own`, so an
//! inner ancestor overrides an outer one and the variant's own declarations
//! override everything. Its reference index layers the same lists on top of
//! factory defaults and root-scope declarations.

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::cache::{IndexKey, ResolutionCache};
use crate::declaration::{Declaration, Origin, ThemeInput};
use crate::error::Result;
use crate::namespace::NestingPolicies;
use crate::resolve::ReferenceIndex;
use crate::theme::{BuildOutput, ReferenceMap, Theme, ThemeBuilder};

/// Separator between the segments of a compound variant id.
pub const COMPOUND_SEPARATOR: char = '.';

/// A named, selector-scoped theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub id: String,
    pub selector: String,
    pub theme: Theme,
}

/// Groups variant-scoped declarations by id, preserving order.
pub fn group_variants<'a>(
    declarations: impl IntoIterator<Item = &'a Declaration>,
) -> IndexMap<&'a str, Vec<&'a Declaration>> {
    let mut groups: IndexMap<&str, Vec<&Declaration>> = IndexMap::new();
    for declaration in declarations {
        if declaration.origin != Origin::VariantScope {
            continue;
        }
        let Some(id) = declaration.variant_id.as_deref() else {
            debug!("variant declaration {} has no id", declaration.name);
            continue;
        };
        groups.entry(id).or_default().push(declaration);
    }
    groups
}

/// Ancestor ids of a compound id, outermost first.
///
/// ```rust
/// use tokensmith::variant::ancestors;
///
/// assert_eq!(ancestors("dark.compact.large"), vec!["dark", "dark.compact"]);
/// assert!(ancestors("dark").is_empty());
/// ```
pub fn ancestors(id: &str) -> Vec<&str> {
    id.match_indices(COMPOUND_SEPARATOR)
        .map(|(at, _)| &id[..at])
        .filter(|prefix| !prefix.is_empty())
        .collect()
}

/// Appends a nested modifier onto the first compound segment of `parent`.
///
/// A leading `&` on the child is stripped. Trailing descendant segments of
/// the parent are kept in place, and each item of a selector list on either
/// side is composed on its own:
///
/// ```rust
/// use tokensmith::variant::compose_selector;
///
/// assert_eq!(compose_selector(".dark", "&.compact"), ".dark.compact");
/// assert_eq!(
///     compose_selector("[data-theme=dark] .app", "&.compact"),
///     "[data-theme=dark].compact .app"
/// );
/// assert_eq!(
///     compose_selector(".dark, [data-theme=dark]", "&.compact"),
///     ".dark.compact, [data-theme=dark].compact"
/// );
/// ```
pub fn compose_selector(parent: &str, child: &str) -> String {
    let modifiers: Vec<&str> = split_top_level(child, |c| c == ',')
        .into_iter()
        .map(|item| item.trim().trim_start_matches('&').trim_start())
        .collect();

    let mut composed = Vec::new();
    for item in split_top_level(parent, |c| c == ',') {
        let item = item.trim();
        let (first, rest) = match split_top_level(item, char::is_whitespace).first() {
            Some(first) if first.len() < item.len() => {
                (*first, Some(item[first.len()..].trim_start()))
            }
            _ => (item, None),
        };
        for modifier in &modifiers {
            composed.push(match rest {
                Some(rest) => format!("{}{} {}", first, modifier, rest),
                None => format!("{}{}", first, modifier),
            });
        }
    }
    composed.join(", ")
}

/// Splits on `sep` outside brackets, parentheses and quoted strings.
fn split_top_level(selector: &str, sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (at, c) in selector.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth = depth.saturating_sub(1),
            (None, _) if depth == 0 && sep(c) => {
                parts.push(&selector[start..at]);
                start = at + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&selector[start..]);
    parts
}

/// Builds every variant of an input.
pub struct VariantComposer<'a> {
    policies: &'a NestingPolicies,
    reference_map: &'a ReferenceMap,
}

impl<'a> VariantComposer<'a> {
    pub fn new(policies: &'a NestingPolicies, reference_map: &'a ReferenceMap) -> Self {
        Self {
            policies,
            reference_map,
        }
    }

    /// Builds one theme per variant id, in first-appearance order.
    pub fn compose(
        &self,
        input: &ThemeInput,
        cache: &mut ResolutionCache,
    ) -> Result<Vec<(Variant, BuildOutput)>> {
        let groups = group_variants(&input.declarations);
        let base: Vec<&Declaration> = input.by_origin(Origin::Base).collect();
        let root: Vec<&Declaration> = input.by_origin(Origin::RootScope).collect();
        let factory: Vec<&Declaration> = input.factory_defaults.iter().collect();

        let mut selectors: IndexMap<&str, String> = IndexMap::new();
        let mut built = Vec::with_capacity(groups.len());

        for (&id, own) in &groups {
            let chain = ancestors(id);

            let mut layers: Vec<Vec<&Declaration>> =
                vec![factory.clone(), base.clone(), root.clone()];
            for ancestor in &chain {
                layers.push(groups.get(ancestor).cloned().unwrap_or_default());
            }
            layers.push(own.clone());

            let key =
                IndexKey::for_layers(Some(id), layers.iter().map(|layer| layer.iter().copied()));
            let index = cache.index_for(key, || {
                ReferenceIndex::layered(layers.iter().map(|layer| layer.iter().copied()))
            });

            // Base, then ancestors outermost first, then own.
            let ordered = layers[1..2]
                .iter()
                .chain(layers[3..].iter())
                .flat_map(|layer| layer.iter().copied());
            let output = ThemeBuilder::new(&index, self.policies, self.reference_map, cache.keys())
                .scope(id)
                .build(ordered)?;

            let selector = self.selector_for(id, &groups, &mut selectors);
            debug!("built variant '{}' ({})", id, selector);
            built.push((
                Variant {
                    id: id.to_string(),
                    selector,
                    theme: output.theme.clone(),
                },
                output,
            ));
        }
        Ok(built)
    }

    fn selector_for<'g>(
        &self,
        id: &'g str,
        groups: &IndexMap<&'g str, Vec<&'g Declaration>>,
        memo: &mut IndexMap<&'g str, String>,
    ) -> String {
        if let Some(selector) = memo.get(id) {
            return selector.clone();
        }
        let own = groups
            .get(id)
            .and_then(|decls| decls.iter().find_map(|d| d.selector.as_deref()));
        let last = id.rsplit(COMPOUND_SEPARATOR).next().unwrap_or(id);

        let selector = match id.rfind(COMPOUND_SEPARATOR) {
            Some(at) if at > 0 => {
                let parent = self.selector_for(&id[..at], groups, memo);
                let child = own.map(str::to_string).unwrap_or_else(|| format!("&.{}", last));
                compose_selector(&parent, &child)
            }
            _ => own.map(str::to_string).unwrap_or_else(|| format!(".{}", last)),
        };
        memo.insert(id, selector.clone());
        selector
    }
}
