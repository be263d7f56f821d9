//! Stylesheet → [`ThemeInput`].
//!
//! Built on `cssparser`, the tokenizer and rule-list machinery used by
//! Firefox. One parser type implements every rule-level trait so a single
//! scope stack threads through the whole sheet, nested blocks included.
//!
//! ## Mapping
//!
//! | Source | Result |
//! |--------|--------|
//! | `@theme { --x: v }` | `Base` declaration |
//! | `@theme { @keyframes spin { ... } }` | carried keyframes |
//! | `:root { --x: v }`, `html { ... }` | `RootScope` declaration |
//! | `.dark { --x: v }`, `[data-theme=dark] { ... }` | `VariantScope`, id `dark` |
//! | `.dark { &.compact { --x: v } }` | `VariantScope`, id `dark.compact` |
//! | `@media (prefers-color-scheme: dark) { :root { ... } }` | `VariantScope`, id `dark` |
//! | `.dark { .bg-primary { background-color: #000 } }` | [`RuleOverride`] |
//! | `.dark .bg-primary { background-color: #000 }` | [`RuleOverride`] |
//!
//! `@layer` and `@supports` blocks are transparent. Anything else is
//! skipped; malformed rules never abort the sheet.

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, Token,
};
use log::debug;

use crate::conflict::{analyze_selector, RuleOverride};
use crate::declaration::{Declaration, Keyframes, ThemeInput};

const IMPORTANT: &str = "!important";

/// Scope a declaration is read in.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    Top,
    Theme,
    Root,
    Media {
        id: String,
        query: String,
    },
    Variant {
        id: String,
        selector: String,
        media: Option<String>,
    },
    Ignored,
}

/// Where the literal declarations of a rule are reported.
struct OverrideTarget {
    variant_id: String,
    selector: String,
    media: Option<String>,
}

enum Item {
    Custom,
    Property(String, String),
    Nested,
}

enum AtPrelude {
    Theme,
    Media { id: String, query: String },
    Keyframes(String),
    Transparent,
}

/// Parses a stylesheet into declarations, rule overrides and keyframes.
pub fn parse_css(css: &str) -> ThemeInput {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut sheet = SheetParser {
        output: ThemeInput::default(),
        scopes: vec![Scope::Top],
    };

    for result in cssparser::StyleSheetParser::new(&mut parser, &mut sheet) {
        if let Err((err, slice)) = result {
            debug!("skipping rule {:?}: {:?}", slice.trim(), err.kind);
        }
    }

    let mut output = sheet.output;
    let declared: Vec<String> = output
        .declarations
        .iter()
        .filter_map(|d| d.variant_id.clone())
        .collect();
    output
        .rule_overrides
        .retain(|rule| declared.iter().any(|id| *id == rule.variant_id));
    output
}

struct SheetParser {
    output: ThemeInput,
    scopes: Vec<Scope>,
}

impl SheetParser {
    fn scope(&self) -> &Scope {
        static TOP: Scope = Scope::Top;
        self.scopes.last().unwrap_or(&TOP)
    }

    fn enter_rule(&self, selector: &str) -> (Scope, Option<OverrideTarget>) {
        match self.scope() {
            Scope::Top => {
                if is_root_selector(selector) {
                    return (Scope::Root, None);
                }
                let (first, rest) = split_first_segment(selector);
                let id = variant_id_for(first);
                let target = rest.map(|rest| OverrideTarget {
                    variant_id: id.clone(),
                    selector: rest.to_string(),
                    media: None,
                });
                let scope = Scope::Variant {
                    id,
                    selector: selector.to_string(),
                    media: None,
                };
                (scope, target)
            }
            Scope::Media { id, query } => {
                let scope = Scope::Variant {
                    id: id.clone(),
                    selector: format!("@media {}", query),
                    media: Some(query.clone()),
                };
                let target = (!is_root_selector(selector)).then(|| OverrideTarget {
                    variant_id: id.clone(),
                    selector: selector.to_string(),
                    media: Some(query.clone()),
                });
                (scope, target)
            }
            Scope::Variant { id, media, .. } => {
                let scope = Scope::Variant {
                    id: format!("{}.{}", id, variant_id_for(selector)),
                    selector: selector.to_string(),
                    media: media.clone(),
                };
                let target = OverrideTarget {
                    variant_id: id.clone(),
                    selector: selector.to_string(),
                    media: media.clone(),
                };
                (scope, Some(target))
            }
            Scope::Theme | Scope::Root | Scope::Ignored => (Scope::Ignored, None),
        }
    }

    fn record_custom(&mut self, name: &str, value: &str) {
        let declaration = match self.scope() {
            Scope::Theme => Declaration::base(name, value),
            Scope::Root => Declaration::root(name, value),
            Scope::Variant { id, selector, .. } => {
                Declaration::variant(id.as_str(), selector.as_str(), name, value)
            }
            Scope::Top | Scope::Media { .. } | Scope::Ignored => {
                debug!("ignoring {} outside a theme scope", name);
                return;
            }
        };
        self.output.declarations.push(declaration);
    }

    fn record_overrides(&mut self, target: OverrideTarget, items: &[Item]) {
        let count = items
            .iter()
            .filter(|item| !matches!(item, Item::Nested))
            .count();
        for item in items {
            let Item::Property(property, value) = item else {
                continue;
            };
            let mut rule = RuleOverride::new(
                target.variant_id.as_str(),
                target.selector.as_str(),
                property.as_str(),
                value.as_str(),
            )
            .with_declaration_count(count);
            if let Some(query) = &target.media {
                rule = rule.with_media_query(query.as_str());
            }
            self.output.rule_overrides.push(rule);
        }
    }
}

impl<'i> QualifiedRuleParser<'i> for SheetParser {
    type Prelude = String;
    type QualifiedRule = Item;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let selector = consume_raw(input).to_string();
        if selector.is_empty() {
            return Err(input.new_custom_error::<(), ()>(()));
        }
        Ok(selector)
    }

    fn parse_block<'t>(
        &mut self,
        selector: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let (scope, target) = self.enter_rule(&selector);
        self.scopes.push(scope);
        let items: Vec<Item> = RuleBodyParser::new(input, &mut *self)
            .filter_map(|result| result.ok())
            .collect();
        self.scopes.pop();

        if let Some(target) = target {
            self.record_overrides(target, &items);
        }
        Ok(Item::Nested)
    }
}

impl<'i> AtRuleParser<'i> for SheetParser {
    type Prelude = AtPrelude;
    type AtRule = Item;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "theme" => {
                consume_raw(input);
                Ok(AtPrelude::Theme)
            }
            "media" => {
                let query = consume_raw(input).to_string();
                let id = color_scheme(&query).unwrap_or_else(|| slug(&query));
                Ok(AtPrelude::Media { id, query })
            }
            "keyframes" | "-webkit-keyframes" if *self.scope() == Scope::Theme => {
                let keyframes = consume_raw(input)
                    .trim_matches(|c| c == '"' || c == '\'')
                    .to_string();
                if keyframes.is_empty() {
                    return Err(input.new_custom_error::<(), ()>(()));
                }
                Ok(AtPrelude::Keyframes(keyframes))
            }
            "layer" | "supports" => {
                consume_raw(input);
                Ok(AtPrelude::Transparent)
            }
            _ => Err(input.new_custom_error::<(), ()>(())),
        }
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        match prelude {
            AtPrelude::Theme => {
                self.scopes.push(Scope::Theme);
                for _ in RuleBodyParser::new(input, &mut *self) {}
                self.scopes.pop();
            }
            AtPrelude::Media { id, query } => {
                self.scopes.push(Scope::Media { id, query });
                for _ in cssparser::StyleSheetParser::new(input, &mut *self) {}
                self.scopes.pop();
            }
            AtPrelude::Keyframes(name) => {
                let body = consume_raw(input);
                self.output.keyframes.push(Keyframes {
                    css: format!("@keyframes {} {{ {} }}", name, body),
                    name,
                });
            }
            AtPrelude::Transparent => {
                for _ in cssparser::StyleSheetParser::new(input, &mut *self) {}
            }
        }
        Ok(Item::Nested)
    }
}

impl<'i> DeclarationParser<'i> for SheetParser {
    type Declaration = Item;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let raw = consume_raw(input);
        let value = raw.strip_suffix(IMPORTANT).map(str::trim_end).unwrap_or(raw);
        if name.starts_with("--") {
            self.record_custom(&name, value);
            Ok(Item::Custom)
        } else {
            Ok(Item::Property(name.to_ascii_lowercase(), value.to_string()))
        }
    }
}

impl<'i> RuleBodyItemParser<'i, Item, ()> for SheetParser {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        true
    }
}

/// Consumes the rest of `input`, returning its source text trimmed.
fn consume_raw<'i>(input: &mut Parser<'i, '_>) -> &'i str {
    let start = input.position();
    while input.next_including_whitespace_and_comments().is_ok() {}
    input.slice_from(start).trim()
}

fn is_root_selector(selector: &str) -> bool {
    selector
        .split(',')
        .all(|part| matches!(part.trim(), ":root" | "html" | ":host"))
}

/// Splits off the first compound selector, returning the descendant rest.
fn split_first_segment(selector: &str) -> (&str, Option<&str>) {
    let selector = selector.trim();
    match selector.split_once(char::is_whitespace) {
        Some((first, rest)) if !selector.contains(',') => {
            let rest = rest.trim_start().trim_start_matches(['>', '+', '~']).trim_start();
            (first, (!rest.is_empty()).then_some(rest))
        }
        _ => (selector, None),
    }
}

/// Derives a variant id from a selector segment: an attribute value, else
/// the first class, else the sanitized selector.
pub fn variant_id_for(selector: &str) -> String {
    let info = analyze_selector(selector);
    let raw = info
        .attribute_value
        .or_else(|| info.classes.into_iter().next())
        .unwrap_or_else(|| selector.to_string());
    slug(&raw)
}

/// `dark` for `(prefers-color-scheme: dark)`.
fn color_scheme(query: &str) -> Option<String> {
    let mut input = ParserInput::new(query);
    let mut parser = Parser::new(&mut input);
    loop {
        let is_block = match parser.next() {
            Ok(token) => matches!(token, Token::ParenthesisBlock),
            Err(_) => return None,
        };
        if !is_block {
            continue;
        }
        let scheme = parser.parse_nested_block(|block| {
            block.expect_ident_matching("prefers-color-scheme")?;
            block.expect_colon()?;
            let value = block.expect_ident()?.to_string();
            Ok::<_, ParseError<'_, ()>>(value)
        });
        if let Ok(scheme) = scheme {
            return Some(scheme.to_ascii_lowercase());
        }
    }
}

/// Lowercase, dash-separated identifier.
fn slug(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let out = out.trim_matches('-');
    if out.is_empty() {
        "variant".to_string()
    } else {
        out.to_string()
    }
}
