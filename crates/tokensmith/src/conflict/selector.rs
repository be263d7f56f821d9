//! Narrow selector analysis on top of the `cssparser` tokenizer.
//!
//! This is not selector matching. It only answers the questions conflict
//! scoring asks: is the selector a list, does it combine compounds, does it
//! use pseudo-classes, is the utility class qualified by anything else.

use cssparser::{Parser, ParserInput, Token};
use serde::Serialize;

/// Structural traits of one selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorInfo {
    /// Class names in order of appearance, unescaped.
    pub classes: Vec<String>,
    /// First `[attr=value]` value, unquoted.
    pub attribute_value: Option<String>,
    pub has_pseudo: bool,
    pub has_combinator: bool,
    /// A comma-separated selector list.
    pub is_list: bool,
    /// More than one simple selector in some compound (`button.bg-x`).
    pub is_qualified: bool,
}

impl SelectorInfo {
    /// Structurally complex selectors are lists or use combinators.
    pub fn is_complex(&self) -> bool {
        self.is_list || self.has_combinator
    }
}

/// Tokenizes `selector` and records its traits.
pub fn analyze_selector(selector: &str) -> SelectorInfo {
    let mut input = ParserInput::new(selector);
    let mut parser = Parser::new(&mut input);
    let mut info = SelectorInfo::default();

    let mut started = false;
    let mut pending_space = false;
    let mut simple = 0usize;

    loop {
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::WhiteSpace(_) => {
                pending_space = started;
                continue;
            }
            Token::Comma => {
                info.is_list = true;
                started = false;
                pending_space = false;
                simple = 0;
                continue;
            }
            Token::Delim('>') | Token::Delim('+') | Token::Delim('~') => {
                info.has_combinator = true;
                pending_space = false;
                simple = 0;
                continue;
            }
            _ => {}
        }

        if pending_space {
            info.has_combinator = true;
            pending_space = false;
            simple = 0;
        }

        match token {
            Token::Delim('.') => {
                if let Ok(Token::Ident(name)) = parser.next_including_whitespace() {
                    info.classes.push(name.to_string());
                }
                simple += 1;
            }
            Token::Colon => {
                info.has_pseudo = true;
                // Swallow the pseudo name. A function's block is skipped by
                // the next call to the tokenizer.
                let double = matches!(parser.next_including_whitespace(), Ok(Token::Colon));
                if double {
                    let _ = parser.next_including_whitespace();
                }
            }
            Token::SquareBracketBlock => {
                let value = parser.parse_nested_block(|block| {
                    let mut value = None;
                    while let Ok(token) = block.next() {
                        match token {
                            Token::Ident(v) | Token::QuotedString(v) if value.is_some() => {
                                value = Some(Some(v.to_string()));
                            }
                            Token::Delim('=') => value = Some(None),
                            _ => {}
                        }
                    }
                    Ok::<_, cssparser::ParseError<'_, ()>>(value.flatten())
                });
                if info.attribute_value.is_none() {
                    info.attribute_value = value.ok().flatten();
                }
                simple += 1;
            }
            Token::Ident(_) | Token::IDHash(_) | Token::Hash(_) | Token::Delim('*') => simple += 1,
            _ => {}
        }

        started = true;
        if simple > 1 {
            info.is_qualified = true;
        }
    }

    info
}
