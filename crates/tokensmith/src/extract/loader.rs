//! Source loading and `@import` inlining.
//!
//! Imports are inlined textually before parsing, so an imported sheet's
//! declarations land exactly where its `@import` appeared and stream order
//! is preserved. Only top-level imports are recognized.
//!
//! Inlining is bounded three ways:
//!
//! - nesting deeper than [`MAX_IMPORT_DEPTH`] aborts with
//!   [`ThemeError::ImportDepthExceeded`];
//! - a file already inlined once is skipped, which also breaks cycles;
//! - an import the loader cannot read is dropped with a warning.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Component, Path, PathBuf};

use cssparser::{ParseError, Parser, ParserInput, Token};
use log::{debug, warn};

use crate::error::{Result, ThemeError};

/// Deepest allowed `@import` nesting below the entry file.
pub const MAX_IMPORT_DEPTH: usize = 16;

/// Where stylesheet text comes from.
pub trait SourceLoader {
    /// Reads the stylesheet at `path`.
    fn load(&self, path: &Path) -> io::Result<String>;

    /// Resolves an import specifier relative to the importing file.
    fn resolve(&self, from: &Path, specifier: &str) -> PathBuf {
        let base = from.parent().unwrap_or_else(|| Path::new(""));
        normalize(&base.join(specifier))
    }
}

/// Reads stylesheets from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Serves stylesheets registered in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `content` under `path`, returning `self` for chaining.
    pub fn with(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.add(path, content);
        self
    }

    pub fn add(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files.insert(normalize(path.as_ref()), content.into());
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| {
                let message = format!("{} not registered", path.display());
                io::Error::new(io::ErrorKind::NotFound, message)
            })
    }
}

/// Lexically removes `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// One top-level `@import` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRule {
    /// Byte span of the whole rule, semicolon included.
    pub start: usize,
    pub end: usize,
    pub specifier: String,
}

/// Finds top-level `@import` rules.
pub fn find_imports(source: &str) -> Vec<ImportRule> {
    let mut input = ParserInput::new(source);
    let mut parser = Parser::new(&mut input);
    let mut imports = Vec::new();

    loop {
        let start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        let Token::AtKeyword(name) = token else {
            continue;
        };
        if !name.eq_ignore_ascii_case("import") {
            continue;
        }

        let mut specifier = None;
        loop {
            let token = match parser.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };
            match token {
                Token::Semicolon => break,
                Token::QuotedString(value) | Token::UnquotedUrl(value) if specifier.is_none() => {
                    specifier = Some(value.to_string());
                }
                Token::Function(function)
                    if function.eq_ignore_ascii_case("url") && specifier.is_none() =>
                {
                    specifier = url_argument(&mut parser);
                }
                _ => {}
            }
        }

        match specifier {
            Some(specifier) => imports.push(ImportRule {
                start: start.byte_index(),
                end: parser.position().byte_index(),
                specifier,
            }),
            None => debug!("ignoring @import without a specifier"),
        }
    }

    imports
}

fn url_argument<'i>(parser: &mut Parser<'i, '_>) -> Option<String> {
    parser
        .parse_nested_block(|block| {
            let value = block.expect_string()?.to_string();
            Ok::<_, ParseError<'i, ()>>(value)
        })
        .ok()
}

/// Replaces every import in `source` with the imported text, recursively.
pub fn inline_imports(path: &Path, source: &str, loader: &dyn SourceLoader) -> Result<String> {
    let mut seen = HashSet::from([normalize(path)]);
    inline(path, source, loader, 0, &mut seen)
}

fn inline(
    path: &Path,
    source: &str,
    loader: &dyn SourceLoader,
    depth: usize,
    seen: &mut HashSet<PathBuf>,
) -> Result<String> {
    let imports = find_imports(source);
    if imports.is_empty() {
        return Ok(source.to_string());
    }
    if depth >= MAX_IMPORT_DEPTH {
        return Err(ThemeError::ImportDepthExceeded {
            path: path.to_path_buf(),
            depth: depth + 1,
        });
    }

    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    for import in imports {
        out.push_str(&source[last..import.start]);
        last = import.end;

        let target = loader.resolve(path, &import.specifier);
        if !seen.insert(target.clone()) {
            debug!("skipping {}: already imported", target.display());
            continue;
        }
        match loader.load(&target) {
            Ok(text) => out.push_str(&inline(&target, &text, loader, depth + 1, seen)?),
            Err(err) => warn!(
                "dropping import '{}' from {}: {}",
                import.specifier,
                path.display(),
                err
            ),
        }
    }
    out.push_str(&source[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_imports() {
        let css = r#"@import "a.css"; @import url("b.css"); @import url(c.css) layer(x);
            .x { color: red }"#;
        let specifiers: Vec<_> = find_imports(css).into_iter().map(|i| i.specifier).collect();
        assert_eq!(specifiers, vec!["a.css", "b.css", "c.css"]);
    }

    #[test]
    fn test_nested_import_not_top_level() {
        assert!(find_imports(r#".x { @import "a.css"; }"#).is_empty());
    }

    #[test]
    fn test_inline_in_place() {
        let loader = MemoryLoader::new()
            .with(
                "styles/main.css",
                r#"@theme { --color-a: 1; }
                @import "colors.css";
                @theme { --color-c: 3; }"#,
            )
            .with("styles/colors.css", "@theme { --color-b: 2; }");
        let main = loader.load(Path::new("styles/main.css")).unwrap();
        let out = inline_imports(Path::new("styles/main.css"), &main, &loader).unwrap();
        let a = out.find("--color-a").unwrap();
        let b = out.find("--color-b").unwrap();
        let c = out.find("--color-c").unwrap();
        assert!(a < b && b < c);
        assert!(!out.contains("@import"));
    }

    #[test]
    fn test_cycle_skipped() {
        let loader = MemoryLoader::new()
            .with("a.css", r#"@import "b.css"; @theme { --color-a: 1; }"#)
            .with("b.css", r#"@import "a.css"; @theme { --color-b: 2; }"#);
        let a = loader.load(Path::new("a.css")).unwrap();
        let out = inline_imports(Path::new("a.css"), &a, &loader).unwrap();
        assert_eq!(out.matches("--color-a").count(), 1);
        assert_eq!(out.matches("--color-b").count(), 1);
    }

    #[test]
    fn test_missing_import_dropped() {
        let loader = MemoryLoader::new();
        let css = r#"@import "gone.css"; .x {}"#;
        let out = inline_imports(Path::new("main.css"), css, &loader).unwrap();
        assert_eq!(out.trim(), ".x {}");
    }

    #[test]
    fn test_depth_exceeded() {
        let mut loader = MemoryLoader::new();
        for level in 0..=MAX_IMPORT_DEPTH + 1 {
            loader.add(format!("{}.css", level), format!(r#"@import "{}.css";"#, level + 1));
        }
        let entry = loader.load(Path::new("0.css")).unwrap();
        let err = inline_imports(Path::new("0.css"), &entry, &loader).unwrap_err();
        assert!(matches!(err, ThemeError::ImportDepthExceeded { .. }));
    }

    #[test]
    fn test_relative_resolution() {
        let loader = FsLoader;
        assert_eq!(
            loader.resolve(Path::new("styles/theme/main.css"), "../base.css"),
            PathBuf::from("styles/base.css")
        );
    }

    #[test]
    fn test_fs_loader() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.css"), r#"@import "tokens.css";"#).unwrap();
        std::fs::write(dir.path().join("tokens.css"), "@theme { --color-a: 1; }").unwrap();

        let entry = dir.path().join("main.css");
        let source = FsLoader.load(&entry).unwrap();
        let out = inline_imports(&entry, &source, &FsLoader).unwrap();
        assert!(out.contains("--color-a: 1"));
    }
}
