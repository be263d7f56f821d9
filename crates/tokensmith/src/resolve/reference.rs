//! Locating `var()` references inside opaque values.
//!
//! Values are never parsed as CSS. The scanner only needs to find
//! `var(--name)` and `var(--name, fallback)` spans with balanced
//! parentheses so they can be spliced.

/// Functions whose result depends on runtime context.
pub const DYNAMIC_FUNCTIONS: &[&str] = &["var", "calc", "env", "min", "max", "clamp", "attr"];

/// One `var()` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<'a> {
    /// Byte offset of the `v` in `var(`.
    pub start: usize,
    /// Byte offset just past the closing parenthesis.
    pub end: usize,
    /// Referenced property, including the `--` marker.
    pub name: &'a str,
    pub fallback: Option<&'a str>,
}

/// Finds every top-level `var()` reference in `value`, left to right.
///
/// References nested inside another reference's fallback are part of that
/// reference and are not reported separately.
pub fn find_references(value: &str) -> Vec<Reference<'_>> {
    let bytes = value.as_bytes();
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = value[cursor..].find("var(") {
        let start = cursor + offset;
        cursor = start + 4;

        if start > 0 && is_ident_byte(bytes[start - 1]) {
            continue;
        }

        let Some(close) = matching_paren(value, start + 3) else {
            break;
        };
        let inner = &value[start + 4..close];
        if let Some(reference) = parse_inner(inner, start, close + 1) {
            found.push(reference);
            cursor = close + 1;
        }
    }

    found
}

/// Returns the reference when `value` is nothing but a single `var()`.
pub fn bare_reference(value: &str) -> Option<Reference<'_>> {
    let trimmed = value.trim();
    let lead = value.len() - value.trim_start().len();
    let reference = find_references(trimmed).into_iter().next()?;
    if reference.start == 0 && reference.end == trimmed.len() {
        Some(Reference {
            start: reference.start + lead,
            end: reference.end + lead,
            ..reference
        })
    } else {
        None
    }
}

/// True when `value` calls any of [`DYNAMIC_FUNCTIONS`].
pub fn is_dynamic(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    DYNAMIC_FUNCTIONS.iter().any(|function| {
        let needle = format!("{}(", function);
        lower.match_indices(&needle).any(|(at, _)| {
            at == 0 || !is_ident_byte(lower.as_bytes()[at - 1])
        })
    })
}

/// Names of every reference left in `value`.
pub fn referenced_names(value: &str) -> Vec<String> {
    find_references(value)
        .into_iter()
        .map(|r| r.name.to_string())
        .collect()
}

fn parse_inner(inner: &str, start: usize, end: usize) -> Option<Reference<'_>> {
    let body = inner.trim_start();
    if !body.starts_with("--") {
        return None;
    }
    let name_len = body
        .bytes()
        .position(|b| !is_ident_byte(b))
        .unwrap_or(body.len());
    let name = &body[..name_len];
    if name.len() <= 2 {
        return None;
    }

    let rest = body[name_len..].trim();
    let fallback = match rest.strip_prefix(',') {
        Some(fallback) => Some(fallback.trim()),
        None if rest.is_empty() => None,
        None => return None,
    };

    Some(Reference {
        start,
        end,
        name,
        fallback,
    })
}

/// Finds the `)` matching the `(` at byte offset `open`. Quoted strings are
/// skipped so a `)` inside `"..."` does not close the call.
fn matching_paren(value: &str, open: usize) -> Option<usize> {
    let bytes = value.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'(' => depth += 1,
                b')' => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_single_reference() {
        let refs = find_references("var(--bg)");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "--bg");
        assert_eq!(refs[0].fallback, None);
        assert_eq!((refs[0].start, refs[0].end), (0, 9));
    }

    #[test]
    fn test_find_with_fallback() {
        let refs = find_references("var( --a , var(--b, #fff) )");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "--a");
        assert_eq!(refs[0].fallback, Some("var(--b, #fff)"));
    }

    #[test]
    fn test_find_inside_function() {
        let refs = find_references("calc(var(--spacing) * 4 + var(--gap))");
        let names: Vec<_> = refs.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["--spacing", "--gap"]);
    }

    #[test]
    fn test_ignores_lookalikes() {
        assert!(find_references("somevar(--x)").is_empty());
        assert!(find_references("var(x)").is_empty());
        assert!(find_references("var(--)").is_empty());
        assert!(find_references("var(--x").is_empty());
    }

    #[test]
    fn test_bare_reference() {
        assert!(bare_reference("  var(--bg) ").is_some());
        assert!(bare_reference("var(--bg) 1px").is_none());
        assert!(bare_reference("calc(var(--bg))").is_none());
        assert!(bare_reference("#fff").is_none());
    }

    #[test]
    fn test_is_dynamic() {
        assert!(is_dynamic("calc(100% - 1rem)"));
        assert!(is_dynamic("var(--x)"));
        assert!(is_dynamic("env(safe-area-inset-top)"));
        assert!(!is_dynamic("#3b82f6"));
        assert!(!is_dynamic("oklch(0.5 0.2 240)"));
    }

    #[test]
    fn test_quoted_paren_does_not_close() {
        let refs = find_references(r#"var(--font, "a)b")"#);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].fallback, Some(r#""a)b""#));
    }
}
